use bcrypt::{hash, verify};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use thiserror::Error;

use crate::entity::{follow, user};

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

#[derive(Debug, Error)]
pub enum SignupError {
    /// Rejected before any hashing or persistence happens.
    #[error("password cannot be empty")]
    EmptyPassword,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    /// Constraint violations (duplicate username/email) land here at insert.
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl SignupError {
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Db(err) => {
                let msg = err.to_string();
                msg.contains("Duplicate") || msg.contains("UNIQUE")
            }
            _ => false,
        }
    }
}

pub struct SignupData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

pub async fn signup(
    db: &DatabaseConnection,
    data: SignupData,
    bcrypt_cost: u32,
) -> Result<user::Model, SignupError> {
    if data.password.trim().is_empty() {
        return Err(SignupError::EmptyPassword);
    }
    let password_hash = hash(&data.password, bcrypt_cost)?;

    let image_url = data
        .image_url
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

    let model = user::ActiveModel {
        username: Set(data.username),
        email: Set(data.email),
        password_hash: Set(password_hash),
        image_url: Set(Some(image_url)),
        header_image_url: Set(Some(DEFAULT_HEADER_IMAGE_URL.to_string())),
        created: Set(Some(Utc::now())),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Returns the user when the username exists and the password matches its
/// hash, `None` otherwise. Bad credentials are a result, never an error.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>, DbErr> {
    let found = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    let found = match found {
        Some(found) => found,
        None => return Ok(None),
    };

    let ok = verify(password, &found.password_hash).map_err(|e| DbErr::Custom(e.to_string()))?;
    if ok {
        Ok(Some(found))
    } else {
        Ok(None)
    }
}

/// True iff `user_id` follows `other_id`.
pub async fn is_following(
    db: &DatabaseConnection,
    user_id: i32,
    other_id: i32,
) -> Result<bool, DbErr> {
    let edge = follow::Entity::find()
        .filter(follow::Column::FollowerId.eq(user_id))
        .filter(follow::Column::FolloweeId.eq(other_id))
        .one(db)
        .await?;
    Ok(edge.is_some())
}

/// True iff `other_id` follows `user_id`.
pub async fn is_followed_by(
    db: &DatabaseConnection,
    user_id: i32,
    other_id: i32,
) -> Result<bool, DbErr> {
    is_following(db, other_id, user_id).await
}

/// Inserts a follow edge. A duplicate edge violates the composite unique
/// constraint and surfaces as `DbErr`.
pub async fn follow(
    db: &DatabaseConnection,
    follower_id: i32,
    followee_id: i32,
) -> Result<(), DbErr> {
    let edge = follow::ActiveModel {
        follower_id: Set(follower_id),
        followee_id: Set(followee_id),
        created: Set(Some(Utc::now())),
        ..Default::default()
    };
    edge.insert(db).await?;
    Ok(())
}

pub async fn unfollow(
    db: &DatabaseConnection,
    follower_id: i32,
    followee_id: i32,
) -> Result<(), DbErr> {
    follow::Entity::delete_many()
        .filter(follow::Column::FollowerId.eq(follower_id))
        .filter(follow::Column::FolloweeId.eq(followee_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Deletes the user row; messages, likes, follow edges and sessions go with
/// it through the `ON DELETE CASCADE` constraints in the schema.
pub async fn delete_user(db: &DatabaseConnection, user_id: i32) -> Result<(), DbErr> {
    user::Entity::delete_by_id(user_id).exec(db).await?;
    Ok(())
}
