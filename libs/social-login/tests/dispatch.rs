//! Dispatcher behavior: load-once memoization, failure policy and routing

mod common;

use chrono::Utc;
use common::{CountingScripts, FakeAmazon};
use futures::future::join_all;
use social_login::providers::AmazonProvider;
use social_login::{
    Error, ErrorKind, LoadOptions, LoadPolicy, LoadState, ProviderId, SocialLogin,
};
use std::sync::Arc;

fn amazon_client(
    sdk: Arc<FakeAmazon>,
    scripts: Arc<CountingScripts>,
    policy: LoadPolicy,
) -> SocialLogin {
    SocialLogin::builder()
        .register_provider(AmazonProvider::new(sdk, scripts))
        .with_load_policy(policy)
        .build()
}

#[tokio::test]
async fn test_concurrent_logins_share_one_load() {
    let scripts = Arc::new(CountingScripts::new());
    let client = amazon_client(
        Arc::new(FakeAmazon::new(3600)),
        scripts.clone(),
        LoadPolicy::Poison,
    );
    let options = LoadOptions::new("amzn-app");

    let results =
        join_all((0..8).map(|_| client.social_login(ProviderId::Amazon, &options))).await;

    assert_eq!(scripts.attempts(), 1);
    for result in results {
        assert_eq!(result.unwrap().profile.id, "amzn1.account.TEST");
    }
    assert_eq!(client.load_state(ProviderId::Amazon), LoadState::Loaded);
}

#[tokio::test]
async fn test_failed_load_is_replayed_without_reloading() {
    let scripts = Arc::new(CountingScripts::failing());
    let client = amazon_client(
        Arc::new(FakeAmazon::new(3600)),
        scripts.clone(),
        LoadPolicy::default(),
    );
    let options = LoadOptions::new("amzn-app");

    let concurrent =
        join_all((0..4).map(|_| client.load_provider_once(ProviderId::Amazon, &options))).await;
    let later = client
        .social_login(ProviderId::Amazon, &options)
        .await
        .unwrap_err();

    let first = later.as_social().cloned().unwrap();
    assert_eq!(first.kind, ErrorKind::Load);
    assert_eq!(first.provider, ProviderId::Amazon);
    for outcome in concurrent {
        assert_eq!(outcome.err().unwrap().as_social(), Some(&first));
    }

    assert_eq!(scripts.attempts(), 1);
    assert_eq!(
        client.load_state(ProviderId::Amazon),
        LoadState::Failed(first)
    );
}

#[tokio::test]
async fn test_retry_policy_loads_again_after_failure() {
    let scripts = Arc::new(CountingScripts::failing());
    let client = amazon_client(
        Arc::new(FakeAmazon::new(3600)),
        scripts.clone(),
        LoadPolicy::RetryOnNextCall,
    );
    let options = LoadOptions::new("amzn-app");

    assert!(client.social_login(ProviderId::Amazon, &options).await.is_err());
    assert!(client.social_login(ProviderId::Amazon, &options).await.is_err());

    assert_eq!(scripts.attempts(), 2);
    assert_eq!(client.load_state(ProviderId::Amazon), LoadState::Unloaded);
}

#[tokio::test]
async fn test_first_caller_options_win() {
    let sdk = Arc::new(FakeAmazon::new(3600));
    let client = amazon_client(
        sdk.clone(),
        Arc::new(CountingScripts::new()),
        LoadPolicy::Poison,
    );

    client
        .load_provider_once(ProviderId::Amazon, &LoadOptions::new("first-app"))
        .await
        .unwrap();
    client
        .load_provider_once(ProviderId::Amazon, &LoadOptions::new("second-app"))
        .await
        .unwrap();

    assert_eq!(sdk.client_id().as_deref(), Some("first-app"));
}

#[tokio::test]
async fn test_amazon_login_normalizes_user() {
    let client = amazon_client(
        Arc::new(FakeAmazon::new(3600)),
        Arc::new(CountingScripts::new()),
        LoadPolicy::Poison,
    );

    let before = Utc::now().timestamp_millis();
    let user = client
        .social_login(ProviderId::Amazon, &LoadOptions::new("amzn-app"))
        .await
        .unwrap();
    let after = Utc::now().timestamp_millis();

    assert_eq!(user.profile.id, "amzn1.account.TEST");
    assert_eq!(user.profile.name, "Test Customer");
    assert_eq!(user.profile.email.as_deref(), Some("customer@example.com"));
    assert_eq!(user.token.access_token, "Atza|IwEB");

    let expires_at = user.token.expires_at.timestamp_millis().unwrap();
    assert!(expires_at >= before + 3_600_000);
    assert!(expires_at <= after + 3_600_000);
}

#[tokio::test]
async fn test_logout_loads_first() {
    let sdk = Arc::new(FakeAmazon::new(3600));
    let scripts = Arc::new(CountingScripts::new());
    let client = amazon_client(sdk.clone(), scripts.clone(), LoadPolicy::Poison);

    client
        .social_logout(ProviderId::Amazon, &LoadOptions::new("amzn-app"))
        .await
        .unwrap();

    assert_eq!(scripts.attempts(), 1);
    assert_eq!(sdk.logouts(), 1);
    assert!(client.load_state(ProviderId::Amazon).is_loaded());
}

#[tokio::test]
async fn test_unregistered_provider_fails_fast() {
    let client = amazon_client(
        Arc::new(FakeAmazon::new(3600)),
        Arc::new(CountingScripts::new()),
        LoadPolicy::Poison,
    );

    let err = client
        .social_login(ProviderId::Facebook, &LoadOptions::new("fb-app"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProviderNotRegistered(ProviderId::Facebook)));
    assert_eq!(client.load_state(ProviderId::Facebook), LoadState::Unloaded);
}

#[test]
fn test_login_from_blocking_context() {
    let client = amazon_client(
        Arc::new(FakeAmazon::new(60)),
        Arc::new(CountingScripts::new()),
        LoadPolicy::Poison,
    );
    assert_eq!(client.load_state(ProviderId::Amazon), LoadState::Unloaded);

    let user = tokio_test::block_on(
        client.social_login(ProviderId::Amazon, &LoadOptions::new("amzn-app")),
    )
    .unwrap();
    assert_eq!(user.profile.first_name, "Test Customer");
}
