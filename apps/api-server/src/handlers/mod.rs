//! HTTP handlers and route configuration.

mod auth;
mod feed;
mod health;
mod posts;
mod profile;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/home", web::get().to(feed::home))
            .route("/trending", web::get().to(feed::trending))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/password", web::post().to(auth::change_password)),
            )
            // Profile routes
            .service(
                web::scope("/profile")
                    .route("", web::get().to(profile::me))
                    .route("", web::put().to(profile::update)),
            )
            // Post routes; the /id/ routes are registered first so that the
            // catch-all slug route cannot shadow them
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/id/{id}", web::get().to(posts::get_by_id))
                    .route("/id/{id}", web::put().to(posts::update))
                    .route("/id/{id}", web::delete().to(posts::delete))
                    .route("/id/{id}/like", web::post().to(posts::toggle_like))
                    .route("/id/{id}/comments", web::get().to(posts::list_comments))
                    .route("/id/{id}/comments", web::post().to(posts::add_comment))
                    .route("/{slug}", web::get().to(posts::get_by_slug)),
            ),
    );
}
