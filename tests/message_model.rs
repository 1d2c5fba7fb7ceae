mod common;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set, Statement,
};

use warbler::entity::{like, message};

async fn post_message(db: &sea_orm::DatabaseConnection, user_id: i32, text: &str) -> message::Model {
    let m = message::ActiveModel {
        user_id: Set(user_id),
        text: Set(text.to_string()),
        created: Set(Utc::now()),
        ..Default::default()
    };
    m.insert(db).await.expect("message insert failed")
}

#[actix_web::test]
async fn message_belongs_to_its_author_and_gets_a_timestamp() {
    let db = common::test_db().await;
    let u1 = common::signup_user(&db, "messi10", "messi@fcb.es", "G.O.A.T").await;

    let before = Utc::now();
    let m = post_message(&db, u1.id, "Yo solo sé que no sé nada").await;

    let found = message::Entity::find_by_id(m.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.text, "Yo solo sé que no sé nada");
    assert_eq!(found.user_id, u1.id);
    assert!(found.created >= before);

    let count = message::Entity::find()
        .filter(message::Column::UserId.eq(u1.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[actix_web::test]
async fn null_text_is_rejected_by_the_store() {
    let db = common::test_db().await;
    let u1 = common::signup_user(&db, "messi10", "messi@fcb.es", "G.O.A.T").await;

    let sql = format!(
        "insert into t_message (user_id, text, created) values ({}, null, '2026-01-01 00:00:00')",
        u1.id
    );
    let result = db
        .execute(Statement::from_string(db.get_database_backend(), sql))
        .await;
    assert!(result.is_err());

    // the store is still consistent and accepts valid rows
    assert_eq!(message::Entity::find().count(&db).await.unwrap(), 0);
    post_message(&db, u1.id, "still works").await;
    assert_eq!(message::Entity::find().count(&db).await.unwrap(), 1);
}

#[actix_web::test]
async fn message_without_owner_is_rejected_by_the_store() {
    let db = common::test_db().await;

    let result = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "insert into t_message (user_id, text, created) values (999, 'orphan', '2026-01-01 00:00:00')",
        ))
        .await;
    assert!(result.is_err());
}

#[actix_web::test]
async fn likes_are_recorded_per_user_and_message() {
    let db = common::test_db().await;
    let u1 = common::signup_user(&db, "messi10", "messi@fcb.es", "G.O.A.T").await;
    let u2 = common::signup_user(&db, "terstegen1", "terstegen@fcb.es", "W.A.L.L").await;
    let m = post_message(&db, u1.id, "Yo solo sé que no sé nada").await;

    let l = like::ActiveModel {
        user_id: Set(u2.id),
        message_id: Set(m.id),
        ..Default::default()
    };
    l.insert(&db).await.unwrap();

    let likes = like::Entity::find()
        .filter(like::Column::UserId.eq(u2.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].message_id, m.id);
}

#[actix_web::test]
async fn duplicate_like_is_rejected() {
    let db = common::test_db().await;
    let u1 = common::signup_user(&db, "messi10", "messi@fcb.es", "G.O.A.T").await;
    let u2 = common::signup_user(&db, "terstegen1", "terstegen@fcb.es", "W.A.L.L").await;
    let m = post_message(&db, u1.id, "Yo solo sé que no sé nada").await;

    let l = like::ActiveModel {
        user_id: Set(u2.id),
        message_id: Set(m.id),
        ..Default::default()
    };
    l.insert(&db).await.unwrap();

    let dup = like::ActiveModel {
        user_id: Set(u2.id),
        message_id: Set(m.id),
        ..Default::default()
    };
    let err = dup.insert(&db).await.unwrap_err();
    assert!(err.to_string().contains("UNIQUE"));

    assert_eq!(like::Entity::find().count(&db).await.unwrap(), 1);
}

#[actix_web::test]
async fn deleting_a_message_removes_its_likes() {
    let db = common::test_db().await;
    let u1 = common::signup_user(&db, "messi10", "messi@fcb.es", "G.O.A.T").await;
    let u2 = common::signup_user(&db, "terstegen1", "terstegen@fcb.es", "W.A.L.L").await;
    let m = post_message(&db, u1.id, "Yo solo sé que no sé nada").await;

    let l = like::ActiveModel {
        user_id: Set(u2.id),
        message_id: Set(m.id),
        ..Default::default()
    };
    l.insert(&db).await.unwrap();

    message::Entity::delete_by_id(m.id).exec(&db).await.unwrap();

    assert_eq!(like::Entity::find().count(&db).await.unwrap(), 0);
}
