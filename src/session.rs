use std::collections::HashMap;

/// Request token kept between the redirect to Etsy and the callback.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub token: String,
    pub token_secret: String,
}

impl std::fmt::Debug for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestToken")
            .field("token", &self.token)
            .finish()
    }
}

/// Per-user storage the strategy parks its request token in.
///
/// Usually backed by the web framework's session; `HashMap` works for tests
/// and single-process setups.
pub trait SessionStore {
    fn load(&self, key: &str) -> Option<RequestToken>;

    fn store(&mut self, key: &str, token: RequestToken);

    fn remove(&mut self, key: &str);
}

impl SessionStore for HashMap<String, RequestToken> {
    fn load(&self, key: &str) -> Option<RequestToken> {
        self.get(key).cloned()
    }

    fn store(&mut self, key: &str, token: RequestToken) {
        self.insert(key.to_string(), token);
    }

    fn remove(&mut self, key: &str) {
        HashMap::remove(self, key);
    }
}
