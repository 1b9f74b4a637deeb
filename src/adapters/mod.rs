//! Infrastructure adapters. Implement outbound ports.
//!
//! SQLite storage, mail transports, tracing. Map errors to DomainError.

pub mod mail;
pub mod observability;
pub mod persistence;

pub use observability::TracingObserver;
