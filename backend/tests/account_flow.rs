//! Account lifecycle through `AccountService` backed by the in-memory
//! adapters: registration, login, and the password reset round trip.

use std::sync::Arc;

use backend::domain::ports::{
    AccountCommand, AccountQuery, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UserRepository,
};
use backend::domain::{AccountOutcome, AccountService, FieldError};
use backend::test_support::{FixtureClock, InMemoryForum, PlaintextHasher, RecordingNotifier};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

type Accounts = AccountService<InMemoryForum, InMemoryForum, PlaintextHasher, RecordingNotifier>;

struct World {
    forum: InMemoryForum,
    notifier: RecordingNotifier,
    accounts: Accounts,
}

#[fixture]
fn world() -> World {
    let forum = InMemoryForum::new();
    let notifier = RecordingNotifier::default();
    let now = Utc
        .with_ymd_and_hms(2021, 8, 9, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    let accounts = AccountService::new(
        Arc::new(forum.clone()),
        Arc::new(forum.clone()),
        Arc::new(PlaintextHasher),
        Arc::new(notifier.clone()),
        Arc::new(FixtureClock::at(now)),
        "https://forum.example",
    );
    World {
        forum,
        notifier,
        accounts,
    }
}

fn register_request(email: &str, username: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_owned(),
        username: username.to_owned(),
        password: password.to_owned(),
    }
}

fn rejection(outcome: AccountOutcome) -> FieldError {
    match outcome {
        AccountOutcome::Rejected(error) => error,
        AccountOutcome::Authenticated(user) => panic!("unexpected success for {}", user.username()),
    }
}

#[rstest]
#[tokio::test]
async fn registration_stores_a_hash_and_signs_in(world: World) {
    let outcome = world
        .accounts
        .register(register_request("a@b.com", "bob", "secret"))
        .await
        .expect("register");

    let user = outcome.user().expect("authenticated").clone();
    assert_eq!(user.username(), "bob");
    assert_ne!(user.password_hash(), "secret");

    let stored = world
        .forum
        .find_by_username("bob")
        .await
        .expect("lookup")
        .expect("stored user");
    assert_eq!(stored.id(), user.id());

    let me = world.accounts.me(&user.id()).await.expect("me");
    assert_eq!(me.map(|found| found.id()), Some(user.id()));
}

#[rstest]
#[tokio::test]
async fn duplicate_username_is_reported_on_the_field(world: World) {
    world
        .accounts
        .register(register_request("a@b.com", "bob", "secret"))
        .await
        .expect("first registration");

    let outcome = world
        .accounts
        .register(register_request("other@b.com", "bob", "secret"))
        .await
        .expect("second registration");

    assert_eq!(
        rejection(outcome),
        FieldError::new("username", "username already taken")
    );
}

#[rstest]
#[case("bob", "secret", true)]
#[case("a@b.com", "secret", true)]
#[case("bob", "wrong", false)]
#[case("nobody", "secret", false)]
#[tokio::test]
async fn login_accepts_username_or_email(
    world: World,
    #[case] identifier: &str,
    #[case] password: &str,
    #[case] accepted: bool,
) {
    world
        .accounts
        .register(register_request("a@b.com", "bob", "secret"))
        .await
        .expect("register");

    let outcome = world
        .accounts
        .login(LoginRequest {
            username_or_email: identifier.to_owned(),
            password: password.to_owned(),
        })
        .await
        .expect("login");

    assert_eq!(outcome.user().is_some(), accepted);
}

#[rstest]
#[tokio::test]
async fn reset_token_changes_the_password_once(world: World) {
    world
        .accounts
        .register(register_request("a@b.com", "bob", "secret"))
        .await
        .expect("register");

    assert!(world
        .accounts
        .forgot_password("a@b.com")
        .await
        .expect("forgot password"));
    let sent = world.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent
        .first()
        .is_some_and(|(_, link)| link.starts_with("https://forum.example/change-password/")));
    let token = world.notifier.last_token().expect("token in link");

    let changed = world
        .accounts
        .change_password(ChangePasswordRequest {
            token: token.clone(),
            new_password: "better-secret".to_owned(),
        })
        .await
        .expect("change password");
    assert!(changed.user().is_some());

    let reused = world
        .accounts
        .change_password(ChangePasswordRequest {
            token,
            new_password: "another-secret".to_owned(),
        })
        .await
        .expect("reuse token");
    assert_eq!(rejection(reused), FieldError::new("token", "token expired"));

    let login = world
        .accounts
        .login(LoginRequest {
            username_or_email: "bob".to_owned(),
            password: "better-secret".to_owned(),
        })
        .await
        .expect("login");
    assert!(login.user().is_some());
}

#[rstest]
#[tokio::test]
async fn concurrent_redemptions_of_one_token_succeed_once(world: World) {
    world
        .accounts
        .register(register_request("a@b.com", "bob", "secret"))
        .await
        .expect("register");
    world
        .accounts
        .forgot_password("a@b.com")
        .await
        .expect("forgot password");
    let token = world.notifier.last_token().expect("token in link");

    let (first, second) = tokio::join!(
        world.accounts.change_password(ChangePasswordRequest {
            token: token.clone(),
            new_password: "first-secret".to_owned(),
        }),
        world.accounts.change_password(ChangePasswordRequest {
            token,
            new_password: "second-secret".to_owned(),
        }),
    );
    let outcomes = [
        first.expect("first redemption"),
        second.expect("second redemption"),
    ];

    let accepted = outcomes.iter().filter(|o| o.user().is_some()).count();
    assert_eq!(accepted, 1);
    assert!(outcomes.into_iter().any(|outcome| match outcome {
        AccountOutcome::Rejected(error) => error == FieldError::new("token", "token expired"),
        AccountOutcome::Authenticated(_) => false,
    }));
}

#[rstest]
#[tokio::test]
async fn unknown_email_reset_reports_success_without_sending(world: World) {
    let accepted = world
        .accounts
        .forgot_password("ghost@example.com")
        .await
        .expect("forgot password");

    assert!(accepted);
    assert!(world.notifier.sent().is_empty());
}
