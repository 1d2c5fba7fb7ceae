pub mod follow;
pub mod like;
pub mod message;
pub mod session;
pub mod user;
