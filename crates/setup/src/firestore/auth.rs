//! Google OAuth2 access tokens for service accounts.
//!
//! Uses the JWT bearer grant: a self-signed RS256 assertion is exchanged at
//! the account's token endpoint for a short-lived access token.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::credentials::ServiceAccount;
use crate::store::StoreError;

/// OAuth2 scope granting Firestore read/write.
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Lifetime requested for the signed assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Short-lived bearer token for Firestore requests.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer token value.
    pub token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl AccessToken {
    /// Check if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        // Consider expired if less than 60 seconds remaining
        now >= self.expires_at - 60
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Build the signed assertion for `account`, issued at `now`.
///
/// # Errors
///
/// Returns `StoreError::Authentication` if the private key is not a usable
/// RSA PEM key.
pub fn sign_assertion(account: &ServiceAccount, now: i64) -> Result<String, StoreError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&account.private_key_id);

    let claims = Claims {
        iss: &account.client_email,
        scope: DATASTORE_SCOPE,
        aud: &account.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let key = EncodingKey::from_rsa_pem(account.private_key.expose_secret().as_bytes())
        .map_err(|e| StoreError::Authentication(format!("invalid private key: {e}")))?;

    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| StoreError::Authentication(format!("could not sign assertion: {e}")))
}

/// Exchange a signed assertion for an access token.
///
/// # Errors
///
/// Returns `StoreError::Authentication` if the key cannot sign or Google
/// rejects the assertion, and `StoreError::Http` on transport failure.
#[instrument(skip(client, account), fields(client_email = %account.client_email))]
pub async fn fetch_access_token(
    client: &reqwest::Client,
    account: &ServiceAccount,
) -> Result<AccessToken, StoreError> {
    let now = chrono::Utc::now().timestamp();
    let assertion = sign_assertion(account, now)?;

    let response = client
        .post(&account.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = response.status();

    if status.is_success() {
        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "Obtained Firestore access token");

        Ok(AccessToken {
            token: SecretString::from(token.access_token),
            expires_at: now + token.expires_in,
        })
    } else {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(StoreError::Authentication(describe_token_error(
            status.as_u16(),
            &body,
        )))
    }
}

fn describe_token_error(status: u16, body: &str) -> String {
    serde_json::from_str::<TokenErrorResponse>(body)
        .ok()
        .and_then(|err| err.error_description.or(err.error))
        .map_or_else(
            || format!("HTTP {status}: {body}"),
            |message| format!("HTTP {status}: {message}"),
        )
}
