//! Demand workflow: repository abstraction, business service and the pure
//! deadline helpers the dashboard relies on.

pub mod repository;
pub mod schedule;
pub mod service;

pub use service::DemandService;
