//! Behavioural tests for the n-th prime endpoint.
//!
//! Each request runs against a freshly initialised in-process app backed by
//! the real locator, wrapped in the trace middleware.

use std::sync::{Arc, Mutex};

use actix_web::{App, test as actix_test, web};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use sieve::Trace;
use sieve::domain::primes::{DEFAULT_MAX_UPPER_BOUND, LocatorConfig, PrimeCache, PrimeLocator};
use sieve::domain::{NEGATIVE_INDEX_MESSAGE, PrimeLocatorService, TRACE_ID_HEADER};
use sieve::inbound::http::primes::{nth_prime, path_config};
use sieve::inbound::http::state::HttpState;

#[derive(Default)]
struct PrimeWorld {
    locator: Option<Arc<PrimeLocator>>,
    status: Option<u16>,
    trace_id: Option<String>,
    body: Option<Value>,
}

impl std::fmt::Debug for PrimeWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimeWorld")
            .field("status", &self.status)
            .field("trace_id", &self.trace_id)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PrimeWorld {
    fn request(&mut self, path: &str) {
        let locator = self.locator.clone().expect("prime service configured");
        let (status, trace_id, body) = actix_rt::System::new().block_on(async move {
            let state = HttpState::new(Arc::new(PrimeLocatorService::new(locator)));
            let app = actix_test::init_service(
                App::new()
                    .wrap(Trace)
                    .app_data(web::Data::new(state))
                    .service(web::scope("/v1").app_data(path_config()).service(nth_prime)),
            )
            .await;
            let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(path).to_request()).await;
            let status = res.status().as_u16();
            let trace_id = res
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body: Value = actix_test::read_body_json(res).await;
            (status, trace_id, body)
        });
        self.status = Some(status);
        self.trace_id = trace_id;
        self.body = Some(body);
    }

    fn body(&self) -> &Value {
        self.body.as_ref().expect("response body")
    }
}

#[fixture]
fn world() -> Mutex<PrimeWorld> {
    Mutex::new(PrimeWorld::default())
}

#[given("a prime service backed by the segmented sieve")]
fn a_prime_service_backed_by_the_segmented_sieve(world: &Mutex<PrimeWorld>) {
    let locator = PrimeLocator::new(LocatorConfig::default())
        .with_cache(Arc::new(PrimeCache::new(1_024)));
    world.lock().expect("world lock").locator = Some(Arc::new(locator));
}

#[given("a prime service limited to a single attempt with a tight margin")]
fn a_prime_service_limited_to_a_single_attempt(world: &Mutex<PrimeWorld>) {
    let config = LocatorConfig::new(1_000, 0.01, 1).expect("valid config");
    world.lock().expect("world lock").locator = Some(Arc::new(PrimeLocator::new(config)));
}

#[when("the client requests prime index {index}")]
fn the_client_requests_prime_index(world: &Mutex<PrimeWorld>, index: i64) {
    world
        .lock()
        .expect("world lock")
        .request(&format!("/v1/prime/nth/{index}"));
}

#[when("the client requests the path {path}")]
fn the_client_requests_the_path(world: &Mutex<PrimeWorld>, path: String) {
    world.lock().expect("world lock").request(&path);
}

#[then("the response is ok")]
fn the_response_is_ok(world: &Mutex<PrimeWorld>) {
    assert_eq!(world.lock().expect("world lock").status, Some(200));
}

#[then("the response body is the prime {prime}")]
fn the_response_body_is_the_prime(world: &Mutex<PrimeWorld>, prime: i64) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.body().as_i64(), Some(prime));
}

#[then("the response is a bad request")]
fn the_response_is_a_bad_request(world: &Mutex<PrimeWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.status, Some(400));
    assert_eq!(
        world.body().get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
}

#[then("the error explains that negative indices are not allowed")]
fn the_error_explains_negative_indices(world: &Mutex<PrimeWorld>) {
    let world = world.lock().expect("world lock");
    let body = world.body();
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some(NEGATIVE_INDEX_MESSAGE)
    );
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("negative_index")
    );
}

#[then("the error reports that the index is too large")]
fn the_error_reports_the_index_is_too_large(world: &Mutex<PrimeWorld>) {
    let world = world.lock().expect("world lock");
    let body = world.body();
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("index_too_large")
    );
    assert_eq!(
        body.pointer("/details/limit").and_then(Value::as_u64),
        Some(DEFAULT_MAX_UPPER_BOUND)
    );
}

#[then("the error carries the response trace id")]
fn the_error_carries_the_response_trace_id(world: &Mutex<PrimeWorld>) {
    let world = world.lock().expect("world lock");
    let header = world.trace_id.as_deref().expect("trace-id header");
    assert_eq!(
        world.body().get("traceId").and_then(Value::as_str),
        Some(header)
    );
}

#[then("the response is an internal server error")]
fn the_response_is_an_internal_server_error(world: &Mutex<PrimeWorld>) {
    let world = world.lock().expect("world lock");
    assert_eq!(world.status, Some(500));
    assert_eq!(
        world.body().get("code").and_then(Value::as_str),
        Some("internal_error")
    );
}

#[then("the error message is redacted")]
fn the_error_message_is_redacted(world: &Mutex<PrimeWorld>) {
    let world = world.lock().expect("world lock");
    let body = world.body();
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );
    assert!(body.get("details").is_none());
}

#[scenario(path = "tests/features/nth_prime.feature", index = 0)]
fn prime_at_index_zero(world: Mutex<PrimeWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/nth_prime.feature", index = 1)]
fn larger_indices(world: Mutex<PrimeWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/nth_prime.feature", index = 2)]
fn negative_indices(world: Mutex<PrimeWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/nth_prime.feature", index = 3)]
fn non_integer_indices(world: Mutex<PrimeWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/nth_prime.feature", index = 4)]
fn exhausted_retry_budget(world: Mutex<PrimeWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/nth_prime.feature", index = 5)]
fn indices_beyond_the_ceiling(world: Mutex<PrimeWorld>) {
    drop(world);
}
