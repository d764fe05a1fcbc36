//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod runtime;
pub mod auth;
pub mod demand;
pub mod deliverable_service;
pub mod availability_service;
pub mod directory_service;
pub mod setup_service;
#[cfg(test)]
pub mod test_support;
