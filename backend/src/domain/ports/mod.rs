//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`VoteLedger`], [`PasswordHasher`],
//! [`TokenStore`], [`PasswordResetNotifier`]) are implemented by outbound
//! adapters. Driving ports ([`AccountCommand`], [`AccountQuery`],
//! [`PostCommand`], [`PostQuery`]) are implemented by domain services and
//! called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod password_hasher;
mod password_reset_notifier;
mod post_command;
mod post_query;
mod post_repository;
mod token_store;
mod user_repository;
mod vote_ledger;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, ChangePasswordRequest, LoginRequest, RegisterRequest};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use password_reset_notifier::MockPasswordResetNotifier;
pub use password_reset_notifier::{PasswordResetNotifier, ResetNotificationError};
#[cfg(test)]
pub use post_command::MockPostCommand;
pub use post_command::{CreatePostRequest, PostCommand, UpdatePostRequest, VoteRequest};
#[cfg(test)]
pub use post_query::MockPostQuery;
pub use post_query::PostQuery;
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostPersistenceError, PostRepository};
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{TokenStore, TokenStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UniqueUserField, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use vote_ledger::MockVoteLedger;
pub use vote_ledger::{VoteLedger, VoteLedgerError};
