//! HTTP handlers and route configuration.

mod auth;
mod blog;
mod health;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::{AppError, POST_NOT_FOUND};
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

/// Register shared state, extractor configuration and all routes.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(web::Data::new(state.clone()))
        .app_data(
            web::JsonConfig::default()
                .limit(1 << 20)
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        // A malformed id is just another id that does not exist.
        .app_data(
            web::PathConfig::default()
                .error_handler(|_err, _req| AppError::NotFound(POST_NOT_FOUND.to_string()).into()),
        )
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/blogs")
                        .route("", web::get().to(blog::list_published))
                        .route("/{id}", web::get().to(blog::get_post)),
                )
                // Auth routes
                .service(
                    web::scope("/auth")
                        .service(
                            web::resource("/register")
                                .wrap(RateLimitMiddleware::new(
                                    state.rate_limiter.clone(),
                                    &state.settings.trusted_proxies,
                                ))
                                .route(web::post().to(auth::register)),
                        )
                        .service(
                            web::resource("/login")
                                .wrap(RateLimitMiddleware::new(
                                    state.rate_limiter.clone(),
                                    &state.settings.trusted_proxies,
                                ))
                                .route(web::post().to(auth::login)),
                        )
                        .route("/me", web::get().to(auth::me)),
                )
                // Admin dashboard routes
                .service(
                    web::scope("/admin/blogs")
                        .route("", web::get().to(blog::list_own))
                        .route("", web::post().to(blog::create_post))
                        .route("/{id}", web::put().to(blog::update_post))
                        .route("/{id}", web::delete().to(blog::delete_post))
                        .route("/{id}/publish", web::patch().to(blog::set_published)),
                ),
        );
}
