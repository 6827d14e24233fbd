//! Prime lookup API handlers.
//!
//! ```text
//! GET /v1/prime/nth/{n}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};
use serde_json::json;

use crate::domain::{Error, NEGATIVE_INDEX_MESSAGE};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Path extractor configuration rejecting non-integer indices with the
/// standard error payload instead of Actix's plain-text 404.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req: &HttpRequest| {
        Error::invalid_request("n must be a 64-bit signed integer")
            .with_details(json!({
                "field": "n",
                "code": "invalid_integer",
                "reason": err.to_string(),
            }))
            .into()
    })
}

/// Return the prime at the 0-based index `n`; `n = 0` is 2.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use sieve::domain::ports::FixturePrimeQuery;
/// use sieve::inbound::http::primes::{nth_prime, path_config};
/// use sieve::inbound::http::state::HttpState;
///
/// let state = HttpState::new(Arc::new(FixturePrimeQuery));
/// let _app = App::new()
///     .app_data(web::Data::new(state))
///     .app_data(path_config())
///     .service(web::scope("/v1").service(nth_prime));
/// ```
#[utoipa::path(
    get,
    path = "/v1/prime/nth/{n}",
    params(("n" = i64, Path, description = "0-based index into the ascending primes", example = 5)),
    responses(
        (status = 200, description = "The prime at index n", body = i64, example = 13),
        (status = 400, description = "Negative, non-integer, or too large index", body = ErrorSchema,
            example = json!({
                "code": "invalid_request",
                "message": NEGATIVE_INDEX_MESSAGE,
                "details": {"field": "n", "code": "negative_index", "value": -1}
            })),
        (status = 500, description = "Lookup exceeded its search bound or the 64-bit range", body = ErrorSchema),
        (status = 503, description = "Lookup was cancelled or could not reserve memory", body = ErrorSchema)
    ),
    tags = ["primes"],
    operation_id = "nthPrime"
)]
#[get("/prime/nth/{n}")]
pub async fn nth_prime(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let index = path.into_inner();
    let prime = state.primes.nth_prime(index).await?;
    Ok(HttpResponse::Ok().json(prime))
}
