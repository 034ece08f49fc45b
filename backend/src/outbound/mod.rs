//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL record store using Diesel ORM
//! - **memory**: volatile record store for local runs and tests
//! - **credentials**: salted SHA-256 secret hashing
//!
//! Adapters translate between domain records and their storage form. They
//! hold no business rules.

pub mod credentials;
pub mod memory;
pub mod persistence;
