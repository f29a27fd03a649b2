//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Only PostgreSQL is reached from here: tables through Diesel and the
//! analytics scoring functions through raw `SELECT` calls. Adapters translate
//! between rows and domain types and contain no business logic.

pub mod persistence;
