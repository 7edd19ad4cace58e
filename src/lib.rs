//! Rook writes SQL for MySQL, PostgreSQL and SQLite from one builder API, manages schemas with
//! dry-run DDL and tracks row edits in a unit of work flushed as single-row statements.
//!
//! Drivers live in their own crates, `rook-sqlite` ships with the workspace.

pub use rook_core::*;
