//! Core types shared across listkit facilities
//!
//! This crate provides foundational types used by the error handling and
//! logging facilities as well as the retry engine:
//!
//! - **Correlation types**: CorrelationId for tying one retry sequence together
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::CorrelationId;
