//! Builders wiring outbound adapters into the domain services behind
//! [`HttpState`].

use std::sync::Arc;

use mockable::Clock;

use backend::domain::ports::{
    AccountCommand, AccountQuery, PasswordHasher, PasswordResetNotifier, PostCommand, PostQuery,
    PostRepository, TokenStore, UserRepository, VoteLedger,
};
use backend::domain::{AccountService, PostService};
use backend::inbound::http::state::HttpState;
use backend::outbound::cache::RedisTokenStore;
use backend::outbound::crypto::Argon2PasswordHasher;
use backend::outbound::notifier::TracingResetNotifier;
use backend::outbound::persistence::{
    DbPool, DieselPostRepository, DieselUserRepository, DieselVoteLedger,
};

/// One adapter per driven port.
pub struct ForumAdapters<U, P, V, T, H, N> {
    pub users: Arc<U>,
    pub posts: Arc<P>,
    pub ledger: Arc<V>,
    pub tokens: Arc<T>,
    pub hasher: Arc<H>,
    pub notifier: Arc<N>,
}

/// Adapter set used in production.
pub type ProductionAdapters = ForumAdapters<
    DieselUserRepository,
    DieselPostRepository,
    DieselVoteLedger,
    RedisTokenStore,
    Argon2PasswordHasher,
    TracingResetNotifier,
>;

/// PostgreSQL repositories, the Redis token store, Argon2id hashing, and
/// the logging reset notifier.
pub fn production_adapters(pool: &DbPool, tokens: RedisTokenStore) -> ProductionAdapters {
    ForumAdapters {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        posts: Arc::new(DieselPostRepository::new(pool.clone())),
        ledger: Arc::new(DieselVoteLedger::new(pool.clone())),
        tokens: Arc::new(tokens),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        notifier: Arc::new(TracingResetNotifier),
    }
}

/// Build the account and post services and expose each through both of its
/// driving ports.
pub fn build_http_state<U, P, V, T, H, N>(
    adapters: ForumAdapters<U, P, V, T, H, N>,
    clock: Arc<dyn Clock>,
    reset_link_base: &str,
) -> HttpState
where
    U: UserRepository + 'static,
    P: PostRepository + 'static,
    V: VoteLedger + 'static,
    T: TokenStore + 'static,
    H: PasswordHasher + 'static,
    N: PasswordResetNotifier + 'static,
{
    let ForumAdapters {
        users,
        posts,
        ledger,
        tokens,
        hasher,
        notifier,
    } = adapters;

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        tokens,
        hasher,
        notifier,
        clock.clone(),
        reset_link_base,
    ));
    let post_service = Arc::new(PostService::new(posts, users, ledger, clock));

    HttpState::new(
        accounts.clone() as Arc<dyn AccountCommand>,
        accounts as Arc<dyn AccountQuery>,
        post_service.clone() as Arc<dyn PostCommand>,
        post_service as Arc<dyn PostQuery>,
    )
}
