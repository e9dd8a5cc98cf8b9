use actix_web::web;

use crate::handlers;

pub fn scoped_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(web::resource("/register").route(web::post().to(handlers::auth::register)))
            .service(web::resource("/login").route(web::post().to(handlers::auth::login))),
    )
    .service(
        web::scope("/payments")
            .service(
                web::resource("")
                    .route(web::post().to(handlers::payments::create))
                    .route(web::get().to(handlers::payments::index)),
            )
            .service(
                web::resource("/summary").route(web::get().to(handlers::payments::summary)),
            )
            .service(
                web::resource("/{id}/status")
                    .route(web::put().to(handlers::payments::update_status)),
            ),
    )
    .service(
        web::scope("/payment-intents").service(
            web::resource("").route(web::post().to(handlers::payments::create_intent)),
        ),
    )
    .service(
        web::scope("/documents")
            .service(
                web::resource("")
                    .route(web::post().to(handlers::documents::create))
                    .route(web::get().to(handlers::documents::index)),
            )
            .service(
                web::resource("/{id}/status")
                    .route(web::put().to(handlers::documents::update_status)),
            ),
    )
    .service(
        web::scope("/users").service(
            web::resource("")
                .route(web::post().to(handlers::users::create))
                .route(web::get().to(handlers::users::index)),
        ),
    );
}
