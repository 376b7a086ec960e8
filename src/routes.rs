use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

use crate::{
    api::{admin, auth, divisions, forms, lookups, notifications, time_keeping, users},
    auth::middleware::auth_middleware,
    config::Config,
};

/// Per-IP limiter replenishing `requests_per_min` tokens a minute.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    // finish() only rejects a zero period or burst
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = build_limiter(config.rate_login_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(auth::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .route("/me", web::get().to(auth::me))
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .route(web::post().to(users::create))
                            .route(web::get().to(users::list)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(users::get))
                            .route(web::put().to(users::update))
                            .route(web::delete().to(users::delete)),
                    ),
            )
            .service(
                web::scope("/divisions")
                    .service(
                        web::resource("")
                            .route(web::post().to(divisions::create_division))
                            .route(web::get().to(divisions::list_divisions)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(divisions::get_division))
                            .route(web::put().to(divisions::update_division))
                            .route(web::delete().to(divisions::delete_division)),
                    )
                    .service(
                        web::resource("/{id}/ancestors")
                            .route(web::get().to(divisions::ancestors)),
                    ),
            )
            .service(
                web::scope("/positions")
                    .service(
                        web::resource("")
                            .route(web::post().to(lookups::create_position))
                            .route(web::get().to(lookups::list_positions)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(lookups::delete_position)),
                    ),
            )
            .service(
                web::scope("/skills")
                    .service(
                        web::resource("")
                            .route(web::post().to(lookups::create_skill))
                            .route(web::get().to(lookups::list_skills)),
                    )
                    .service(web::resource("/{id}").route(web::delete().to(lookups::delete_skill))),
            )
            .service(
                web::scope("/forms")
                    .service(
                        web::resource("")
                            .route(web::post().to(forms::create_form))
                            .route(web::get().to(forms::list_forms)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(forms::get_form))
                            .route(web::delete().to(forms::delete_form)),
                    )
                    .service(
                        web::resource("/{id}/status").route(web::put().to(forms::update_status)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("").route(web::get().to(notifications::list_notifications)),
                    )
                    .service(
                        web::resource("/unread-count")
                            .route(web::get().to(notifications::unread_count)),
                    )
                    .service(
                        web::resource("/{id}/read")
                            .route(web::put().to(notifications::read_notification)),
                    ),
            )
            .service(
                web::scope("/timekeeping")
                    .service(
                        web::resource("").route(web::get().to(time_keeping::list_time_keeping)),
                    )
                    .service(
                        web::resource("/check-in")
                            .route(web::post().to(time_keeping::check_in_today)),
                    )
                    .service(
                        web::resource("/check-out")
                            .route(web::put().to(time_keeping::check_out_today)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .service(web::resource("/registry").route(web::get().to(admin::registry)))
                    .service(
                        web::resource("/registry/{entity}")
                            .route(web::get().to(admin::registry_entry)),
                    ),
            ),
    );
}
