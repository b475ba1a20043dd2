use std::borrow::Cow;

use http::Method;
use oauth1_request::signer::Signer as OAuthSigner;
use oauth1_request::{HmacSha1, Options};
use url::Url;

use crate::{SecretsProvider, OAUTH_KEY_PREFIX};

/// Renders the `Authorization: OAuth ...` header of a single request.
///
/// The HMAC-SHA1 base string, nonce and timestamp are produced by
/// `oauth1-request`; this type only feeds it the request parameters in the
/// order it expects.
#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a>,
}

impl<'a, TSecretsProvider> Signer<'a, TSecretsProvider>
where
    TSecretsProvider: SecretsProvider,
{
    pub fn new(secrets: &'a TSecretsProvider, parameters: OAuthParameters<'a>) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Signs `method url`. Query parameters of `url` are signed as such; when
    /// the URL has no query, `form_body` is signed as an urlencoded body.
    pub fn authorization_header(&self, method: &Method, url: &Url, form_body: &str) -> String {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();
        let options = self.parameters.build_options(token);

        let (signed_url, payload, is_url_query) = match url.query() {
            None | Some("") => (url.clone(), form_body, false),
            Some(query) => {
                let mut bare = url.clone();
                bare.set_query(None);
                (bare, query, true)
            }
        };

        // oauth1-request wants every parameter in ascending order, with the
        // oauth_* block inserted where it sorts.
        let mut params: Vec<(Cow<str>, Cow<str>)> =
            url::form_urlencoded::parse(payload.as_bytes())
                .filter(|(k, _)| !k.starts_with(OAUTH_KEY_PREFIX))
                .collect();
        params.sort();
        let split = params.partition_point(|(k, _)| &**k < OAUTH_KEY_PREFIX);
        let (before, after) = params.split_at(split);

        let mut signer = if is_url_query {
            OAuthSigner::with_signature_method(
                HmacSha1,
                method.as_str(),
                signed_url,
                consumer_secret,
                token_secret,
            )
        } else {
            OAuthSigner::form_with_signature_method(
                HmacSha1,
                method.as_str(),
                signed_url,
                consumer_secret,
                token_secret,
            )
        };
        for (key, value) in before {
            signer.parameter(key, value);
        }
        let mut signer = signer.oauth_parameters(consumer_key, &options);
        for (key, value) in after {
            signer.parameter(key, value);
        }

        signer.finish().authorization
    }
}

/// The `oauth_*` values a request carries besides the credentials.
#[derive(Debug, Clone, Default)]
pub struct OAuthParameters<'a> {
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
    version: bool,
}

impl<'a> OAuthParameters<'a> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets `oauth_callback`, sent when asking for a request token.
    pub fn callback<T>(self, callback: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// Fixes `oauth_nonce`; a random one is generated otherwise.
    pub fn nonce<T>(self, nonce: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// Fixes `oauth_timestamp`; the current time is used otherwise.
    pub fn timestamp<T>(self, timestamp: T) -> Self
    where
        T: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// Sets `oauth_verifier`, sent when trading a request token.
    pub fn verifier<T>(self, verifier: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// When `true`, `oauth_version="1.0"` is sent; otherwise it is omitted.
    pub fn version(self, version: bool) -> Self {
        OAuthParameters { version, ..self }
    }

    fn build_options<'o>(&'o self, token: Option<&'o str>) -> Options<'o> {
        let mut opt = Options::new();

        // NOTE: items must be added by alphabetical order
        if let Some(ref callback) = self.callback {
            opt.callback(callback.as_ref());
        }
        if let Some(ref nonce) = self.nonce {
            opt.nonce(nonce.as_ref());
        }
        if let Some(timestamp) = self.timestamp {
            opt.timestamp(timestamp);
        }
        if let Some(token) = token {
            opt.token(token);
        }
        if let Some(ref verifier) = self.verifier {
            opt.verifier(verifier.as_ref());
        }
        opt.version(self.version);

        opt
    }
}
