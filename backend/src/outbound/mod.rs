//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits for various infrastructure concerns:
//!
//! - **persistence**: PostgreSQL-backed repositories and the vote ledger
//! - **cache**: Redis-backed token store for password resets
//! - **crypto**: Argon2id password hashing
//! - **notifier**: reset link delivery through the structured log
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod crypto;
pub mod notifier;
pub mod persistence;
