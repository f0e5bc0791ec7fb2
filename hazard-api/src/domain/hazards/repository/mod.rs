//! Hazard repository implementations.

#[cfg(test)]
mod mock;
mod postgres;

#[cfg(test)]
pub use mock::MockHazardRepository;
pub use postgres::PgHazardRepository;
