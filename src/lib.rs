/*!
etsy-oauth1: sign in with Etsy over OAuth 1.0a.

# Overview

This library lets a web application hand user login over to Etsy. The OAuth 1.0a
signature itself is computed by [oauth1-request](https://crates.io/crates/oauth1-request)
and requests are sent with [reqwest](https://crates.io/crates/reqwest); this crate
holds Etsy's endpoints, the redirect/callback dance, and the mapping of Etsy's
`users` payload into a [`Profile`].

# How to use

```no_run
use std::collections::HashMap;

use etsy_oauth1::{
    AuthOutcome, AuthRequest, AuthenticateOptions, EtsyStrategy, RequestToken, StrategyOptions,
};

# async fn run() -> etsy_oauth1::Result<()> {
let options = StrategyOptions::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
    .callback_url("https://app.example.com/auth/etsy/callback")
    .scope(vec!["email_r"]);
let strategy = EtsyStrategy::new(&options)?;

// usually the web framework's session
let mut session: HashMap<String, RequestToken> = HashMap::new();

// step 1: no oauth_token in the query yet, so the user is sent to Etsy
let first = AuthRequest::from_query("");
if let AuthOutcome::Redirect(url) =
    strategy.authenticate(&first, &mut session, &AuthenticateOptions::new()).await?
{
    println!("please access to: {}", url);
}

// step 2: Etsy calls back with the authorized token and its verifier
let callback = AuthRequest::from_query("oauth_token=[TOKEN]&oauth_verifier=[VERIFIER]");
match strategy.authenticate(&callback, &mut session, &AuthenticateOptions::new()).await? {
    AuthOutcome::Success(user) => println!("hello, {}", user.profile.username),
    AuthOutcome::Denied => println!("the user said no"),
    other => println!("{:?}", other),
}
# Ok(())
# }
```
*/
mod client;
mod config;
mod error;
pub mod profile;
mod secrets;
mod session;
mod signer;
mod strategy;
mod token_reader;

// exposed to external program
pub use client::{OAuth1Client, ReqwestOAuth1Client};
pub use config::{
    StrategyConfig, StrategyOptions, DEFAULT_ACCESS_TOKEN_URL, DEFAULT_REQUEST_TOKEN_URL,
    DEFAULT_SESSION_KEY, DEFAULT_USER_AUTHORIZATION_URL, DEFAULT_USER_PROFILE_URL,
};
pub use error::{
    ApiError, Error, ErrorCode, Result, TokenReaderError, TokenReaderResult, TransportError,
};
pub use profile::Profile;
pub use secrets::{Secrets, SecretsProvider};
pub use session::{RequestToken, SessionStore};
pub use signer::{OAuthParameters, Signer};
pub use strategy::{
    AuthOutcome, AuthRequest, Authenticated, AuthenticateOptions, EtsyStrategy, DENIED_KEY,
    FORCE_LOGIN_KEY, SCREEN_NAME_KEY, USER_ID_KEY,
};
pub use token_reader::{TokenReader, TokenResponse};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
