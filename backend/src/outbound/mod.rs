//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: process-local repositories for development and tests
//! - **credentials**: Argon2id password hashing
//!
//! Adapters translate between domain records and their storage format and
//! carry no business rules.

pub mod credentials;
pub mod memory;
pub mod persistence;
