//! Domain primitives, ports, and services.
//!
//! Purpose: hold the prime-location core and the transport-agnostic types
//! around it. Adapters depend on this module; it depends on no adapter.
//!
//! Public surface:
//! - Error / ErrorCode: error payload shared by every adapter.
//! - TraceId: request correlation identifier.
//! - primes: the bounded segmented sieve and its supporting types.
//! - PrimeLocatorService: async service implementing `ports::PrimeQuery`.

pub mod error;
pub mod ports;
pub mod prime_service;
pub mod primes;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::prime_service::{NEGATIVE_INDEX_MESSAGE, PrimeLocatorService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
