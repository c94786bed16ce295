//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: define the forum's entities (users, posts, votes), the rules
//! that govern them, and the ports through which adapters reach them. Types
//! here never import HTTP or database crates.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User / UserId / UserView: accounts and their public projection.
//! - RegistrationDetails / LoginCredentials / NewPassword / ResetToken /
//!   FieldError / AccountOutcome: account rules.
//! - Post / PostId / PostDraft / PostEdit / PostDetails: posts.
//! - VoteValue / VoteTransition: the vote ledger rule.
//! - AccountService / PostService: implementations of the driving ports.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod trace_id;
pub mod user;
pub mod vote;

pub use self::account_service::AccountService;
pub use self::auth::{
    AccountOutcome, FieldError, LoginCredentials, LoginIdentifier, NewPassword,
    PASSWORD_MIN_EXCLUSIVE, RESET_TOKEN_PREFIX, RESET_TOKEN_TTL, RegistrationDetails, ResetToken,
    USERNAME_MIN_EXCLUSIVE,
};
pub use self::error::{Error, ErrorCode};
pub use self::post::{Post, PostDetails, PostDraft, PostEdit, PostId, SNIPPET_CHARS};
pub use self::post_service::PostService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{User, UserId, UserValidationError, UserView};
pub use self::vote::{InvalidVoteValue, VoteTransition, VoteValue};
