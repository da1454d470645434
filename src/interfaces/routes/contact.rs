use actix_web::{
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
        Method,
    },
    middleware::DefaultHeaders,
    web,
};

use crate::{
    constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN, MAX_CONTACT_BODY_BYTES},
    handlers::contact,
};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/submit-contact")
            .app_data(web::PayloadConfig::new(MAX_CONTACT_BODY_BYTES))
            .route(web::post().to(contact::submit_contact))
            .route(web::method(Method::OPTIONS).to(contact::contact_preflight))
            .default_service(web::route().to(contact::method_not_allowed))
            .wrap(cors_headers())
    );
}

/// Applied to every response of the route, errors included.
fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((ACCESS_CONTROL_ALLOW_ORIGIN, CORS_ALLOW_ORIGIN))
        .add((ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS))
        .add((ACCESS_CONTROL_ALLOW_METHODS, CORS_ALLOW_METHODS))
}
