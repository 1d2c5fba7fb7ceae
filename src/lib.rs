pub mod accounts;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod response;
pub mod routes;
pub mod sessions;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{middleware, web, App};
use sea_orm::DatabaseConnection;

use config::AppConfig;

/// Assembles the application; shared by `main` and the test suite so both
/// run the exact same routes, middleware and error handling.
pub fn build_app(
    config: AppConfig,
    db: DatabaseConnection,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(db))
        .app_data(web::JsonConfig::default().error_handler(response::json_error_handler))
        .wrap(middleware::Logger::default())
        .wrap(middleware::from_fn(routes::cors::cors_handler))
        .service(
            web::scope("/api")
                .service(web::scope("/users").configure(routes::user::config))
                .service(web::scope("/messages").configure(routes::message::config)),
        )
        .configure(routes::home::config)
}
