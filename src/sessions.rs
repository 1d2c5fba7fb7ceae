use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::entity::{session, user};

/// Issues a fresh token for `user_id` and persists it.
pub async fn create(db: &DatabaseConnection, user_id: i32) -> Result<String, DbErr> {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect();

    let model = session::ActiveModel {
        token: Set(token.clone()),
        user_id: Set(user_id),
        created: Set(Some(Utc::now())),
        ..Default::default()
    };
    model.insert(db).await?;
    Ok(token)
}

/// Resolves a token to its user. Unknown tokens and tokens whose user no
/// longer exists both come back as `None`.
pub async fn lookup(db: &DatabaseConnection, token: &str) -> Result<Option<user::Model>, DbErr> {
    let found = session::Entity::find()
        .filter(session::Column::Token.eq(token))
        .one(db)
        .await?;

    match found {
        Some(found) => user::Entity::find_by_id(found.user_id).one(db).await,
        None => Ok(None),
    }
}

pub async fn destroy(db: &DatabaseConnection, token: &str) -> Result<(), DbErr> {
    session::Entity::delete_many()
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}
