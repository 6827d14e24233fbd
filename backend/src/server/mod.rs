//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use sieve::Trace;
use sieve::domain::TRACE_ID_HEADER;
#[cfg(debug_assertions)]
use sieve::doc::ApiDoc;
use sieve::inbound::http::health::{HealthState, live, ready};
use sieve::inbound::http::primes::{nth_prime, path_config};
use sieve::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cors_origins: Arc<[String]>,
}

/// Cross-origin policy for browser clients.
///
/// Only `GET` is allowed and the `trace-id` header is exposed. With no
/// origins configured every cross-origin request is refused; requests
/// without an `Origin` header are unaffected.
fn cors_policy(origins: &[String]) -> Cors {
    let policy = Cors::default()
        .allowed_methods(["GET"])
        .allowed_header(header::ACCEPT)
        .expose_headers([TRACE_ID_HEADER])
        .max_age(3600);
    origins.iter().fold(policy, |policy, origin| {
        if origin == "*" {
            policy.allow_any_origin()
        } else {
            policy.allowed_origin(origin)
        }
    })
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        cors_origins,
    } = deps;

    let api = web::scope("/v1").app_data(path_config()).service(nth_prime);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(cors_policy(&cors_origins))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server serving prime lookups.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is bound.
/// - `http_state`: handler dependencies, shared across workers.
/// - `config`: binding, CORS origins and optional metrics settings.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        cors_origins,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;
    if cors_origins.is_empty() {
        warn!("no CORS origins configured; cross-origin browser requests will be refused");
    } else {
        info!(origins = ?cors_origins, "CORS origins configured");
    }
    let cors_origins: Arc<[String]> = cors_origins.into();

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cors_origins: Arc::clone(&cors_origins),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?;

    for addr in server.addrs() {
        info!(%addr, "listening");
    }
    let server = server.run();

    health_state.mark_ready();
    Ok(server)
}
