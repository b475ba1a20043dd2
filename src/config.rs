use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_REQUEST_TOKEN_URL: &str = "https://openapi.etsy.com/v2/oauth/request_token";
pub const DEFAULT_ACCESS_TOKEN_URL: &str = "https://openapi.etsy.com/v2/oauth/access_token";
pub const DEFAULT_USER_AUTHORIZATION_URL: &str = "https://www.etsy.com/oauth/signin";
pub const DEFAULT_USER_PROFILE_URL: &str = "https://openapi.etsy.com/v2/users/__SELF__";
pub const DEFAULT_SESSION_KEY: &str = "oauth:etsy";

const SCOPE_KEY: &str = "scope";

/// Strategy configuration as supplied by the application.
///
/// Deserializes from camelCase keys; the `requestTokenURL` style spellings are
/// accepted too.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOptions {
    #[serde(alias = "requestTokenURL")]
    pub request_token_url: Option<String>,
    #[serde(alias = "accessTokenURL")]
    pub access_token_url: Option<String>,
    #[serde(alias = "userAuthorizationURL")]
    pub user_authorization_url: Option<String>,
    #[serde(alias = "userProfileURL")]
    pub user_profile_url: Option<String>,
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(alias = "callbackURL")]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub skip_extended_user_profile: bool,
    pub session_key: Option<String>,
}

impl StrategyOptions {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        StrategyOptions {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            ..Default::default()
        }
    }

    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip_extended_user_profile(mut self, skip: bool) -> Self {
        self.skip_extended_user_profile = skip;
        self
    }

    pub fn request_token_url(mut self, url: impl Into<String>) -> Self {
        self.request_token_url = Some(url.into());
        self
    }

    pub fn access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = Some(url.into());
        self
    }

    pub fn user_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.user_authorization_url = Some(url.into());
        self
    }

    pub fn user_profile_url(mut self, url: impl Into<String>) -> Self {
        self.user_profile_url = Some(url.into());
        self
    }

    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = Some(key.into());
        self
    }

    /// Validates the options and fills in Etsy's defaults.
    ///
    /// The options are left untouched, so resolving twice gives the same
    /// configuration.
    pub fn resolve(&self) -> Result<StrategyConfig> {
        if self.consumer_key.is_empty() {
            return Err(Error::MissingOption("consumerKey"));
        }
        if self.consumer_secret.is_empty() {
            return Err(Error::MissingOption("consumerSecret"));
        }

        let request_token_url = with_scope(
            parse_url(
                "requestTokenURL",
                self.request_token_url.as_deref(),
                DEFAULT_REQUEST_TOKEN_URL,
            )?,
            &self.scope,
        );

        Ok(StrategyConfig {
            request_token_url,
            access_token_url: parse_url(
                "accessTokenURL",
                self.access_token_url.as_deref(),
                DEFAULT_ACCESS_TOKEN_URL,
            )?,
            user_authorization_url: parse_url(
                "userAuthorizationURL",
                self.user_authorization_url.as_deref(),
                DEFAULT_USER_AUTHORIZATION_URL,
            )?,
            user_profile_url: parse_url(
                "userProfileURL",
                self.user_profile_url.as_deref(),
                DEFAULT_USER_PROFILE_URL,
            )?,
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            callback_url: self.callback_url.clone(),
            skip_extended_user_profile: self.skip_extended_user_profile,
            session_key: self
                .session_key
                .clone()
                .unwrap_or_else(|| DEFAULT_SESSION_KEY.to_string()),
        })
    }
}

impl std::fmt::Debug for StrategyOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyOptions")
            .field("request_token_url", &self.request_token_url)
            .field("access_token_url", &self.access_token_url)
            .field("user_authorization_url", &self.user_authorization_url)
            .field("user_profile_url", &self.user_profile_url)
            .field("consumer_key", &self.consumer_key)
            .field("callback_url", &self.callback_url)
            .field("scope", &self.scope)
            .field("skip_extended_user_profile", &self.skip_extended_user_profile)
            .field("session_key", &self.session_key)
            .finish()
    }
}

/// Resolved, read-only configuration of a strategy.
#[derive(Clone)]
pub struct StrategyConfig {
    pub request_token_url: Url,
    pub access_token_url: Url,
    pub user_authorization_url: Url,
    pub user_profile_url: Url,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub callback_url: Option<String>,
    pub skip_extended_user_profile: bool,
    pub session_key: String,
}

impl std::fmt::Debug for StrategyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyConfig")
            .field("request_token_url", &self.request_token_url.as_str())
            .field("access_token_url", &self.access_token_url.as_str())
            .field("user_authorization_url", &self.user_authorization_url.as_str())
            .field("user_profile_url", &self.user_profile_url.as_str())
            .field("consumer_key", &self.consumer_key)
            .field("callback_url", &self.callback_url)
            .field("skip_extended_user_profile", &self.skip_extended_user_profile)
            .field("session_key", &self.session_key)
            .finish()
    }
}

fn parse_url(option: &'static str, value: Option<&str>, default: &str) -> Result<Url> {
    Url::parse(value.unwrap_or(default)).map_err(|source| Error::InvalidUrl { option, source })
}

/// Appends `scope=<a b ...>` with the space written as `%20`.
///
/// `Url::query_pairs_mut` would encode the space as `+`, which Etsy does not
/// read as a separator.
fn with_scope(mut url: Url, scope: &[String]) -> Url {
    if scope.is_empty() {
        return url;
    }
    let joined = scope
        .iter()
        .map(|s| {
            url::form_urlencoded::byte_serialize(s.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
        })
        .collect::<Vec<_>>()
        .join("%20");
    let query = match url.query() {
        None | Some("") => format!("{}={}", SCOPE_KEY, joined),
        Some(existing) => format!("{}&{}={}", existing, SCOPE_KEY, joined),
    };
    url.set_query(Some(&query));
    url
}
