//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod prime_query;

#[cfg(test)]
pub use prime_query::MockPrimeQuery;
pub use prime_query::{FixturePrimeQuery, PrimeQuery};
