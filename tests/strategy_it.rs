use std::collections::HashMap;

use etsy_oauth1::{
    AuthOutcome, AuthRequest, AuthenticateOptions, Error, EtsyStrategy, RequestToken,
    StrategyOptions, DEFAULT_SESSION_KEY,
};
use httpmock::prelude::*;

const CONSUMER_KEY: &str = "consumer-it";
const CONSUMER_SECRET: &str = "secret-it";
const BOB: &str = r#"{
    "count": 1,
    "results": [{"user_id": "42", "login_name": "bob", "primary_email": "bob@x.com"}],
    "params": {"user_id": "42"},
    "type": "User",
    "pagination": {}
}"#;

fn options(server: &MockServer) -> StrategyOptions {
    StrategyOptions::new(CONSUMER_KEY, CONSUMER_SECRET)
        .request_token_url(server.url("/oauth/request_token"))
        .access_token_url(server.url("/oauth/access_token"))
        .user_authorization_url(server.url("/oauth/signin"))
        .user_profile_url(server.url("/users/__SELF__"))
        .callback_url("https://app.example.com/auth/etsy/callback")
}

fn params(user_id: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    params.insert("user_id".to_string(), user_id.to_string());
    params
}

#[tokio::test]
async fn full_login_round_trip() {
    let server = MockServer::start_async().await;
    let request_token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/request_token")
                .query_param("scope", "email_r")
                .header_exists("authorization");
            then.status(200).body(
                "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
            );
        })
        .await;
    let access_token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/access_token")
                .header_exists("authorization");
            then.status(200)
                .body("oauth_token=acc-token&oauth_token_secret=acc-secret&user_id=42");
        })
        .await;
    let profile = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/__SELF__")
                .query_param("user_id", "42")
                .header_exists("authorization");
            then.status(200)
                .header("content-type", "application/json")
                .body(BOB);
        })
        .await;

    let strategy = EtsyStrategy::new(&options(&server).scope(vec!["email_r"]))
        .expect("Strategy should build from valid options.");
    let mut session: HashMap<String, RequestToken> = HashMap::new();

    let redirect = strategy
        .authenticate(&AuthRequest::default(), &mut session, &AuthenticateOptions::new())
        .await
        .expect("Request phase should succeed.");
    match redirect {
        AuthOutcome::Redirect(url) => {
            assert_eq!(url.path(), "/oauth/signin");
            assert_eq!(url.query(), Some("oauth_token=req-token"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    request_token.assert_async().await;
    assert!(session.contains_key(DEFAULT_SESSION_KEY));

    let callback = AuthRequest::from_query("oauth_token=req-token&oauth_verifier=v3r1f13r");
    let outcome = strategy
        .authenticate(&callback, &mut session, &AuthenticateOptions::new())
        .await
        .expect("Callback phase should succeed.");
    access_token.assert_async().await;
    profile.assert_async().await;

    let user = match outcome {
        AuthOutcome::Success(user) => user,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(user.token, "acc-token");
    assert_eq!(user.token_secret, "acc-secret");
    assert_eq!(user.profile.provider, "etsy");
    assert_eq!(user.profile.id, "42");
    assert_eq!(user.profile.username, "bob");
    assert_eq!(user.profile.emails.as_deref(), Some("bob@x.com"));
    assert_eq!(user.profile.raw.as_deref(), Some(BOB));
    assert_eq!(
        user.profile.json.as_ref().and_then(|json| json["type"].as_str()),
        Some("User")
    );
    assert!(session.is_empty());
}

#[tokio::test]
async fn user_profile_is_normalized() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/__SELF__")
                .query_param("user_id", "42");
            then.status(200).body(
                r#"{"results":[{"user_id":"42","login_name":"bob","primary_email":"bob@x.com"}]}"#,
            );
        })
        .await;
    let strategy = EtsyStrategy::new(&options(&server)).expect("Strategy should build.");

    let profile = strategy
        .user_profile("token", "token-secret", &params("42"))
        .await
        .expect("Profile should be fetched.");

    mock.assert_async().await;
    assert_eq!(profile.id, "42");
    assert_eq!(profile.username, "bob");
    assert_eq!(profile.emails.as_deref(), Some("bob@x.com"));
    assert_eq!(profile.provider, "etsy");
}

#[tokio::test]
async fn provider_errors_are_structured() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/__SELF__");
            then.status(400)
                .body(r#"{"errors":[{"message":"m","code":"c"}]}"#);
        })
        .await;
    let strategy = EtsyStrategy::new(&options(&server)).expect("Strategy should build.");

    match strategy
        .user_profile("token", "token-secret", &params("42"))
        .await
    {
        Err(Error::Api(err)) => {
            assert_eq!(err.message, "m");
            assert_eq!(err.code, "c");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn plain_text_failures_are_internal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/__SELF__");
            then.status(500).body("Internal Server Error");
        })
        .await;
    let strategy = EtsyStrategy::new(&options(&server)).expect("Strategy should build.");

    match strategy
        .user_profile("token", "token-secret", &params("42"))
        .await
    {
        Err(Error::InternalOAuth { message, source }) => {
            assert_eq!(message, "Failed to fetch user profile");
            assert_eq!(source.and_then(|s| s.status), Some(500));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn rejected_request_token_surfaces_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/request_token");
            then.status(401).body("oauth_problem=signature_invalid");
        })
        .await;
    let strategy = EtsyStrategy::new(&options(&server)).expect("Strategy should build.");
    let mut session: HashMap<String, RequestToken> = HashMap::new();

    match strategy
        .authenticate(&AuthRequest::default(), &mut session, &AuthenticateOptions::new())
        .await
    {
        Err(Error::ProviderResponse { status, body }) => {
            assert_eq!(status, Some(401));
            assert_eq!(body, "oauth_problem=signature_invalid");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(session.is_empty());
}

#[tokio::test]
async fn denial_never_reaches_the_provider() {
    // nothing listens on the discard port, so any request would fail
    let options = StrategyOptions::new(CONSUMER_KEY, CONSUMER_SECRET)
        .request_token_url("http://127.0.0.1:9/oauth/request_token")
        .access_token_url("http://127.0.0.1:9/oauth/access_token")
        .user_profile_url("http://127.0.0.1:9/users/__SELF__");
    let strategy = EtsyStrategy::new(&options).expect("Strategy should build.");
    let mut session: HashMap<String, RequestToken> = HashMap::new();

    let outcome = strategy
        .authenticate(
            &AuthRequest::from_query("denied=req-token"),
            &mut session,
            &AuthenticateOptions::new(),
        )
        .await
        .expect("Denial is not an error.");

    assert!(matches!(outcome, AuthOutcome::Denied));
    assert!(session.is_empty());
}
