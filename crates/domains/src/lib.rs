//! taskboard/crates/domains/src/lib.rs
//!
//! Domain models, the project access policy and the port traits that every
//! adapter implements. Nothing in this crate performs I/O.

pub mod errors;
pub mod models;
pub mod policy;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use policy::*;
pub use ports::*;
