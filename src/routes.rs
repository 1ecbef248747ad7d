use crate::{
    api::{attendance, employee},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public route
    cfg.service(
        web::resource("/login")
            .wrap(login_limiter)
            .route(web::post().to(handlers::login)),
    );

    // Protected routes
    cfg.service(
        web::scope("")
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::resource("/employees")
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            .service(
                web::resource("/employees/{id}")
                    .route(web::put().to(employee::update_employee))
                    .route(web::delete().to(employee::delete_employee)),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    .service(web::resource("/report").route(web::get().to(attendance::report))),
            ),
    );
}
