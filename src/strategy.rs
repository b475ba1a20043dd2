use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    profile, ApiError, Error, ErrorCode, OAuth1Client, Profile, ReqwestOAuth1Client, RequestToken, Result,
    SessionStore, StrategyConfig, StrategyOptions, TransportError, OAUTH_TOKEN_KEY,
    OAUTH_VERIFIER_KEY,
};

/// Query parameter Etsy adds to the callback when the user declines.
pub const DENIED_KEY: &str = "denied";
pub const USER_ID_KEY: &str = "user_id";
pub const SCREEN_NAME_KEY: &str = "screen_name";
pub const FORCE_LOGIN_KEY: &str = "force_login";

const UNVERIFIED_REQUEST: &str = "Unable to verify authorization request";

/// Incoming request as far as the strategy cares: its query string.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    query: HashMap<String, String>,
}

impl AuthRequest {
    pub fn new(query: HashMap<String, String>) -> Self {
        AuthRequest { query }
    }

    /// Reads a raw query string such as `oauth_token=...&oauth_verifier=...`.
    pub fn from_query(query: &str) -> Self {
        AuthRequest {
            query: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Per-request knobs of [`EtsyStrategy::authenticate`].
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOptions {
    /// Overrides the configured callback URL.
    pub callback_url: Option<String>,
    /// Makes Etsy ask for credentials even with a live session.
    pub force_login: bool,
    /// Pre-fills the sign-in form.
    pub screen_name: Option<String>,
}

impl AuthenticateOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn force_login(mut self, force: bool) -> Self {
        self.force_login = force;
        self
    }

    pub fn screen_name(mut self, name: impl Into<String>) -> Self {
        self.screen_name = Some(name.into());
        self
    }
}

/// Successful login: the access token and who it belongs to.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub token: String,
    pub token_secret: String,
    /// Extra parameters of the access token response.
    pub params: HashMap<String, String>,
    pub profile: Profile,
}

#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Send the user to this URL.
    Redirect(url::Url),
    Success(Box<Authenticated>),
    /// The user declined on Etsy's side.
    Denied,
    /// The callback does not belong to an authorization this session started.
    Rejected(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<Value>,
}

/// Sign in with Etsy.
///
/// The strategy is read-only once built; share it behind an `Arc`.
#[derive(Debug)]
pub struct EtsyStrategy<C = ReqwestOAuth1Client> {
    config: StrategyConfig,
    client: C,
}

impl EtsyStrategy<ReqwestOAuth1Client> {
    pub fn new(options: &StrategyOptions) -> Result<Self> {
        let config = options.resolve()?;
        let client = ReqwestOAuth1Client::new(
            config.consumer_key.clone(),
            config.consumer_secret.clone(),
            config.request_token_url.clone(),
            config.access_token_url.clone(),
        );
        Ok(EtsyStrategy { config, client })
    }
}

impl<C> EtsyStrategy<C>
where
    C: OAuth1Client,
{
    /// Builds the strategy on top of another `OAuth1Client`.
    pub fn with_client(options: &StrategyOptions, client: C) -> Result<Self> {
        Ok(EtsyStrategy {
            config: options.resolve()?,
            client,
        })
    }

    pub fn name(&self) -> &'static str {
        profile::PROVIDER
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Drives one step of the OAuth 1.0a dance for `request`.
    ///
    /// Without `oauth_token` in the query a request token is obtained, parked
    /// in `session` and a redirect to Etsy is returned. With it, the parked
    /// token is traded for an access token and the user's profile is fetched.
    pub async fn authenticate<S>(
        &self,
        request: &AuthRequest,
        session: &mut S,
        options: &AuthenticateOptions,
    ) -> Result<AuthOutcome>
    where
        S: SessionStore + ?Sized,
    {
        if request.param(DENIED_KEY).is_some() {
            debug!("etsy authorization denied by user");
            return Ok(AuthOutcome::Denied);
        }

        let key = self.config.session_key.as_str();

        if let Some(token) = request.param(OAUTH_TOKEN_KEY) {
            let stored = match session.load(key) {
                Some(stored) if stored.token == token => stored,
                _ => {
                    warn!(session_key = key, "no matching request token in session");
                    return Ok(AuthOutcome::Rejected(UNVERIFIED_REQUEST.to_string()));
                }
            };

            let verifier = request
                .param(OAUTH_VERIFIER_KEY)
                .ok_or(Error::MissingParameter(OAUTH_VERIFIER_KEY))?;
            session.remove(key);

            debug!("exchanging etsy request token for access token");
            let access = self
                .client
                .access_token(&stored.token, &stored.token_secret, verifier)
                .await
                .map_err(|e| self.oauth_error("Failed to obtain access token", e))?;

            let profile = self
                .user_profile(&access.oauth_token, &access.oauth_token_secret, &access.remain)
                .await?;
            debug!(user_id = %profile.id, "etsy user authenticated");

            return Ok(AuthOutcome::Success(Box::new(Authenticated {
                token: access.oauth_token,
                token_secret: access.oauth_token_secret,
                params: access.remain,
                profile,
            })));
        }

        let callback_url = options
            .callback_url
            .as_deref()
            .or_else(|| self.config.callback_url.as_deref());
        debug!(callback_url, "obtaining etsy request token");
        let issued = self
            .client
            .request_token(callback_url)
            .await
            .map_err(|e| self.oauth_error("Failed to obtain request token", e))?;

        let url = self.client.authorize_url(
            &self.config.user_authorization_url,
            &issued.oauth_token,
            &self.user_authorization_params(options),
        );
        session.store(
            key,
            RequestToken {
                token: issued.oauth_token,
                token_secret: issued.oauth_token_secret,
            },
        );
        Ok(AuthOutcome::Redirect(url))
    }

    /// Loads the profile of the user `token` was issued to.
    ///
    /// `params` are the extra access token parameters and must carry
    /// `user_id`. When the extended profile is skipped the username comes
    /// from `screen_name`, and is left empty if Etsy did not send one.
    pub async fn user_profile(
        &self,
        token: &str,
        token_secret: &str,
        params: &HashMap<String, String>,
    ) -> Result<Profile> {
        let user_id = params
            .get(USER_ID_KEY)
            .ok_or(Error::MissingParameter(USER_ID_KEY))?;

        if self.config.skip_extended_user_profile {
            let screen_name = match params.get(SCREEN_NAME_KEY) {
                Some(screen_name) => screen_name.as_str(),
                None => {
                    warn!(user_id = %user_id, "access token response lacks screen_name");
                    ""
                }
            };
            return Ok(Profile::minimal(user_id.as_str(), screen_name));
        }

        let mut url = self.config.user_profile_url.clone();
        url.query_pairs_mut().append_pair(USER_ID_KEY, user_id);
        debug!(%url, "fetching etsy profile");

        let body = match self.client.get(&url, token, token_secret).await {
            Ok(body) => body,
            Err(Error::Transport(err)) => return Err(profile_fetch_error(err)),
            Err(err) => return Err(err),
        };
        let json: Value = serde_json::from_str(&body)?;
        let mut profile = profile::parse(&json)?;
        profile.raw = Some(body);
        profile.json = Some(json);
        Ok(profile)
    }

    /// Extra parameters for the Etsy sign-in page.
    pub fn user_authorization_params(
        &self,
        options: &AuthenticateOptions,
    ) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if options.force_login {
            params.push((FORCE_LOGIN_KEY, "true".to_string()));
        }
        if let Some(ref screen_name) = options.screen_name {
            params.push((SCREEN_NAME_KEY, screen_name.clone()));
        }
        params
    }

    /// Turns a token endpoint's error body into an error.
    ///
    /// The body is passed through as is; its format is not interpreted.
    pub fn parse_error_response(&self, body: &str, status: Option<u16>) -> Error {
        Error::ProviderResponse {
            status,
            body: body.to_string(),
        }
    }

    fn oauth_error(&self, message: &'static str, err: Error) -> Error {
        match err {
            Error::Transport(TransportError {
                status: Some(status),
                body: Some(body),
                ..
            }) => self.parse_error_response(&body, Some(status)),
            Error::Transport(err) => Error::internal(message, err),
            other => other,
        }
    }
}

fn profile_fetch_error(err: TransportError) -> Error {
    let reported = err
        .body
        .as_deref()
        .and_then(|body| serde_json::from_str::<ErrorBody>(body).ok())
        .and_then(|body| body.errors.into_iter().next())
        .map(reported_error);
    match reported {
        Some(api_error) => {
            warn!(
                code = %api_error.code,
                reason = %api_error.message,
                "etsy reported an API error"
            );
            Error::Api(api_error)
        }
        None => Error::internal("Failed to fetch user profile", err),
    }
}

/// Reads one entry of an `errors` list. A missing or null `code` becomes an
/// empty one.
fn reported_error(entry: Value) -> ApiError {
    let (message, code) = match entry {
        Value::Object(mut fields) => (fields.remove("message"), fields.remove("code")),
        message => (Some(message), None),
    };
    let message = match message {
        Some(Value::String(message)) => message,
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };
    let code = match code {
        Some(Value::String(code)) => ErrorCode::Text(code),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(ErrorCode::Number)
            .unwrap_or_else(|| ErrorCode::Text(n.to_string())),
        _ => ErrorCode::default(),
    };
    ApiError::new(message, code)
}
