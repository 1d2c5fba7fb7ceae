pub mod cors;
pub mod home;
pub mod message;
pub mod user;
