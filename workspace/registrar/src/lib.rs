//! Domain logic for the academic records backend.
//!
//! The HTTP handlers stay thin; everything with a business rule in it lives
//! here: the faculty assignment reconciler, the marksheet authorization and
//! upsert engine, the dashboard aggregator, the registration approval
//! workflow and the lazy faculty/profile materialization they all share.

pub mod approval;
pub mod dashboard;
pub mod error;
pub mod faculty_link;
pub mod marksheet;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{RegistrarError, Result};
