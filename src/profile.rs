//! Etsy user payload → [`Profile`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

pub const PROVIDER: &str = "etsy";

/// Normalized identity of an Etsy user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub provider: &'static str,
    pub id: String,
    pub username: String,
    /// `primary_email`, only sent by Etsy when the `email_r` scope was granted.
    pub emails: Option<String>,
    /// Response body the profile was read from.
    #[serde(skip)]
    pub raw: Option<String>,
    #[serde(skip)]
    pub json: Option<Value>,
}

impl Profile {
    /// Profile built from the access token parameters alone.
    pub fn minimal(id: impl Into<String>, username: impl Into<String>) -> Self {
        Profile {
            provider: PROVIDER,
            id: id.into(),
            username: username.into(),
            emails: None,
            raw: None,
            json: None,
        }
    }
}

/// What [`parse`] reads from.
#[derive(Debug, Clone, Copy)]
pub enum ProfileInput<'a> {
    Text(&'a str),
    Json(&'a Value),
}

impl<'a> From<&'a str> for ProfileInput<'a> {
    fn from(text: &'a str) -> Self {
        ProfileInput::Text(text)
    }
}

impl<'a> From<&'a String> for ProfileInput<'a> {
    fn from(text: &'a String) -> Self {
        ProfileInput::Text(text)
    }
}

impl<'a> From<&'a Value> for ProfileInput<'a> {
    fn from(json: &'a Value) -> Self {
        ProfileInput::Json(json)
    }
}

#[derive(Deserialize)]
struct UsersResponse {
    results: Vec<User>,
}

#[derive(Deserialize)]
struct User {
    user_id: UserId,
    login_name: String,
    #[serde(default)]
    primary_email: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserId {
    Number(u64),
    Text(String),
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        match id {
            UserId::Number(n) => n.to_string(),
            UserId::Text(s) => s,
        }
    }
}

/// Reads the first entry of `results` from an Etsy `users` response.
///
/// # Errors
///
/// `Error::Parse` when text input is not JSON, `Error::MalformedProfile` when
/// the JSON has no usable user in it.
pub fn parse<'a>(input: impl Into<ProfileInput<'a>>) -> Result<Profile> {
    let owned;
    let json = match input.into() {
        ProfileInput::Text(text) => {
            owned = serde_json::from_str::<Value>(text)?;
            &owned
        }
        ProfileInput::Json(json) => json,
    };

    let response: UsersResponse = serde_path_to_error::deserialize(json)
        .map_err(|e| Error::MalformedProfile(format!("{} at `{}`", e.inner(), e.path())))?;
    let user = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedProfile("`results` is empty".to_string()))?;

    Ok(Profile {
        provider: PROVIDER,
        id: user.user_id.into(),
        username: user.login_name,
        emails: user.primary_email,
        raw: None,
        json: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOB: &str = r#"{
        "count": 1,
        "results": [{
            "user_id": 42,
            "login_name": "bob",
            "primary_email": "bob@x.com",
            "creation_tsz": 1282269739,
            "referred_by_user_id": null,
            "feedback_info": {"count": 0, "score": null}
        }],
        "params": {"user_id": "__SELF__"},
        "type": "User",
        "pagination": {}
    }"#;

    #[test]
    fn parses_text_and_value_alike() {
        let from_text = parse(BOB).unwrap();
        let value: Value = serde_json::from_str(BOB).unwrap();
        let from_value = parse(&value).unwrap();

        assert_eq!(from_text, from_value);
        assert_eq!(from_text.provider, "etsy");
        assert_eq!(from_text.id, "42");
        assert_eq!(from_text.username, "bob");
        assert_eq!(from_text.emails.as_deref(), Some("bob@x.com"));
    }

    #[test]
    fn string_user_id_is_kept_verbatim() {
        let profile = parse(
            r#"{"results":[{"user_id":"42","login_name":"bob","primary_email":"bob@x.com"}]}"#,
        )
        .unwrap();
        assert_eq!(profile.id, "42");
    }

    #[test]
    fn missing_email_is_none() {
        let profile = parse(r#"{"results":[{"user_id":7,"login_name":"alice"}]}"#).unwrap();
        assert_eq!(profile.emails, None);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(parse("{\"results\": ["), Err(Error::Parse(_))));
    }

    #[test]
    fn empty_results_is_malformed() {
        match parse(r#"{"count":0,"results":[]}"#) {
            Err(Error::MalformedProfile(reason)) => assert!(reason.contains("empty")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn wrong_shape_names_the_path() {
        match parse(r#"{"results":[{"user_id":1,"login_name":5}]}"#) {
            Err(Error::MalformedProfile(reason)) => {
                assert!(reason.contains("results[0].login_name"), "{}", reason)
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
