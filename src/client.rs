use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::Method;
use reqwest::Client as ReqwestClient;
use url::Url;

use crate::{
    OAuthParameters, Result, Secrets, Signer, TokenReader, TokenResponse, TransportError,
    OAUTH_TOKEN_KEY,
};

/// The OAuth 1.0a operations a strategy needs from its transport.
///
/// `ReqwestOAuth1Client` is the stock implementation; tests and callers with
/// their own HTTP stack plug in a different one.
#[async_trait]
pub trait OAuth1Client: Send + Sync {
    /// Obtains a temporary request token.
    async fn request_token(&self, callback_url: Option<&str>) -> Result<TokenResponse>;

    /// Trades an authorized request token and its verifier for an access token.
    async fn access_token(
        &self,
        token: &str,
        token_secret: &str,
        verifier: &str,
    ) -> Result<TokenResponse>;

    /// Signed `GET`, returning the response body on success.
    ///
    /// # Errors
    ///
    /// A non-success status yields `Error::Transport` carrying the status and
    /// the body the server sent.
    async fn get(&self, url: &Url, token: &str, token_secret: &str) -> Result<String>;

    /// Builds the page the user is sent to for authorizing `token`.
    fn authorize_url(&self, base: &Url, token: &str, params: &[(&str, String)]) -> Url {
        let mut url = base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(OAUTH_TOKEN_KEY, token);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

/// `OAuth1Client` over `reqwest`, signing every call with the consumer
/// credentials it was built with.
#[derive(Debug, Clone)]
pub struct ReqwestOAuth1Client {
    inner: ReqwestClient,
    consumer: Secrets<'static>,
    request_token_url: Url,
    access_token_url: Url,
}

impl ReqwestOAuth1Client {
    pub fn new<K, S>(
        consumer_key: K,
        consumer_secret: S,
        request_token_url: Url,
        access_token_url: Url,
    ) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Self::new_with_client(
            ReqwestClient::new(),
            consumer_key,
            consumer_secret,
            request_token_url,
            access_token_url,
        )
    }

    /// Constructs a new `ReqwestOAuth1Client` with specifying inner `reqwest::Client`.
    pub fn new_with_client<K, S>(
        client: ReqwestClient,
        consumer_key: K,
        consumer_secret: S,
        request_token_url: Url,
        access_token_url: Url,
    ) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        ReqwestOAuth1Client {
            inner: client,
            consumer: Secrets::new(consumer_key.into(), consumer_secret.into()),
            request_token_url,
            access_token_url,
        }
    }

    async fn post_for_token(
        &self,
        url: &Url,
        secrets: &Secrets<'_>,
        params: OAuthParameters<'_>,
    ) -> Result<TokenResponse> {
        let header = Signer::new(secrets, params).authorization_header(&Method::POST, url, "");
        self.inner
            .request(Method::POST, url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await?
            .parse_oauth_token()
            .await
    }
}

#[async_trait]
impl OAuth1Client for ReqwestOAuth1Client {
    async fn request_token(&self, callback_url: Option<&str>) -> Result<TokenResponse> {
        let params = match callback_url {
            Some(callback) => OAuthParameters::new().callback(callback),
            // out-of-band, the user copies the verifier by hand
            None => OAuthParameters::new().callback("oob"),
        };
        self.post_for_token(&self.request_token_url, &self.consumer, params)
            .await
    }

    async fn access_token(
        &self,
        token: &str,
        token_secret: &str,
        verifier: &str,
    ) -> Result<TokenResponse> {
        let secrets = self.consumer.consumer().token(token, token_secret);
        let params = OAuthParameters::new().verifier(verifier);
        self.post_for_token(&self.access_token_url, &secrets, params)
            .await
    }

    async fn get(&self, url: &Url, token: &str, token_secret: &str) -> Result<String> {
        let secrets = self.consumer.consumer().token(token, token_secret);
        let header =
            Signer::new(&secrets, OAuthParameters::new()).authorization_header(&Method::GET, url, "");
        let resp = self
            .inner
            .request(Method::GET, url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(TransportError::status(status.as_u16(), body).into())
        }
    }
}
