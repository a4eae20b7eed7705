//! Firebase ID-token verification through the Identity Toolkit REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{AuthError, IdentityVerifier};

const LOOKUP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    disabled: bool,
}

impl LookupResponse {
    fn into_user_id(self) -> Result<String, AuthError> {
        let user = self
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::InvalidToken)?;
        if user.disabled || user.local_id.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(user.local_id)
    }
}

#[derive(Clone)]
pub struct FirebaseVerifier {
    client: Client,
    api_key: String,
}

impl FirebaseVerifier {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(LOOKUP_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&LookupRequest { id_token: token })
            .send()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;

        let status = response.status();
        // Identity Toolkit answers 400 INVALID_ID_TOKEN for bad or expired tokens.
        if status == StatusCode::BAD_REQUEST {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Identity lookup returned {status}: {body}");
            return Err(AuthError::Upstream(format!("status {status}")));
        }

        let lookup: LookupResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;
        lookup.into_user_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(json: &str) -> Result<String, AuthError> {
        serde_json::from_str::<LookupResponse>(json)
            .unwrap()
            .into_user_id()
    }

    #[test]
    fn test_local_id_is_user_id() {
        let uid = lookup(r#"{"kind": "identitytoolkit#GetAccountInfoResponse",
            "users": [{"localId": "uid42", "email": "a@example.com"}]}"#)
        .unwrap();
        assert_eq!(uid, "uid42");
    }

    #[test]
    fn test_disabled_or_missing_user_is_invalid() {
        assert!(matches!(
            lookup(r#"{"users": [{"localId": "uid42", "disabled": true}]}"#),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(lookup("{}"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_request_uses_id_token_field() {
        let json = serde_json::to_value(LookupRequest { id_token: "t" }).unwrap();
        assert_eq!(json["idToken"], "t");
    }
}
