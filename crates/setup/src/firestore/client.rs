//! Cloud Firestore REST v1 client.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::instrument;

use super::auth::{AccessToken, fetch_access_token};
use super::credentials::ServiceAccount;
use super::value::{decode_fields, encode_document, parse_integer};
use crate::config::FirestoreConfig;
use crate::store::{DocRef, Document, DocumentStore, StoreError, WriteBatch, WriteOp};

/// Production REST endpoint.
const FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Token the emulator accepts as an administrator.
const EMULATOR_TOKEN: &str = "owner";

/// Firestore client for a single project database.
///
/// # Authentication
///
/// Against Google, requests carry an OAuth2 access token minted from the
/// service account. The token is cached in memory and re-minted shortly
/// before it expires. Against the emulator, the fixed `owner` token is used.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    account: ServiceAccount,
    base_url: String,
    /// `projects/{project}/databases/{database}`
    database: String,
    auth: AuthMode,
}

enum AuthMode {
    ServiceAccount {
        /// In-memory token cache
        token: RwLock<Option<AccessToken>>,
    },
    Emulator,
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("base_url", &self.inner.base_url)
            .field("database", &self.inner.database)
            .field(
                "emulator",
                &matches!(self.inner.auth, AuthMode::Emulator),
            )
            .finish_non_exhaustive()
    }
}

impl FirestoreClient {
    /// Create a client for the account's project.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Http` if the HTTP client cannot be built.
    pub fn new(account: ServiceAccount, config: &FirestoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let (base_url, auth) = config.emulator_host.as_ref().map_or_else(
            || {
                (
                    FIRESTORE_ENDPOINT.to_string(),
                    AuthMode::ServiceAccount {
                        token: RwLock::new(None),
                    },
                )
            },
            |host| (format!("http://{host}/v1"), AuthMode::Emulator),
        );

        let database = format!(
            "projects/{}/databases/{}",
            account.project_id, config.database_id
        );

        Ok(Self {
            inner: Arc::new(FirestoreClientInner {
                client,
                account,
                base_url,
                database,
                auth,
            }),
        })
    }

    /// Project the client writes to.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.inner.account.project_id
    }

    /// Fully qualified resource name of a document.
    fn document_name(&self, doc_ref: &DocRef) -> String {
        format!(
            "{}/documents/{}/{}",
            self.inner.database, doc_ref.collection, doc_ref.id
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Bearer token for the next request, minting a new one if needed.
    async fn bearer(&self) -> Result<String, StoreError> {
        let AuthMode::ServiceAccount { token } = &self.inner.auth else {
            return Ok(EMULATOR_TOKEN.to_string());
        };

        if let Some(cached) = token.read().await.as_ref()
            && !cached.is_expired()
        {
            return Ok(cached.token.expose_secret().to_string());
        }

        let mut slot = token.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(cached) = slot.as_ref()
            && !cached.is_expired()
        {
            return Ok(cached.token.expose_secret().to_string());
        }

        let fresh = fetch_access_token(&self.inner.client, &self.inner.account).await?;
        let value = fresh.token.expose_secret().to_string();
        *slot = Some(fresh);
        Ok(value)
    }

    /// Build the JSON body of a `:commit` request.
    fn commit_body(&self, batch: &WriteBatch) -> Result<Value, StoreError> {
        let writes = batch
            .ops()
            .iter()
            .map(|op| match op {
                WriteOp::Set(doc_ref, document) => {
                    let encoded = encode_document(document)?;
                    let mut write = json!({
                        "update": {
                            "name": self.document_name(doc_ref),
                            "fields": encoded.fields,
                        }
                    });
                    if !encoded.server_timestamps.is_empty() {
                        write["updateTransforms"] = encoded
                            .server_timestamps
                            .iter()
                            .map(|path| json!({ "fieldPath": path, "setToServerValue": "REQUEST_TIME" }))
                            .collect();
                    }
                    Ok(write)
                }
                WriteOp::Delete(doc_ref) => Ok(json!({ "delete": self.document_name(doc_ref) })),
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(json!({ "writes": writes }))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let token = self.bearer().await?;
        let response = request
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(rejection(status.as_u16(), &body))
    }
}

/// Turn a non-success response into a `StoreError`.
///
/// Google's error envelope is `{"error": {"code", "message", "status"}}`,
/// sometimes wrapped in a one-element array.
fn rejection(status: u16, body: &str) -> StoreError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let envelope = match &parsed {
        Some(Value::Array(items)) => items.first(),
        other => other.as_ref(),
    };

    let message = envelope
        .and_then(|e| e.get("error"))
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map_or_else(|| format!("HTTP {status}: {body}"), ToString::to_string);

    if status == 401 {
        return StoreError::Authentication(message);
    }
    if status == 503 {
        return StoreError::Unavailable(message);
    }
    StoreError::Rejected { status, message }
}

/// Read the count out of a `:runAggregationQuery` response stream.
fn aggregate_count(response: &Value) -> Result<u64, StoreError> {
    let invalid = || StoreError::InvalidResponse(format!("no count in aggregation result: {response}"));

    response
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .find_map(|part| part.pointer("/result/aggregateFields/count/integerValue"))
        .and_then(parse_integer)
        .and_then(|count| u64::try_from(count).ok())
        .ok_or_else(invalid)
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[instrument(skip(self, batch), fields(writes = batch.len()))]
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let body = self.commit_body(&batch)?;
        let url = self.url(&format!("{}/documents:commit", self.inner.database));

        self.send(self.inner.client.post(url).json(&body)).await?;
        tracing::debug!("Firestore commit applied");
        Ok(())
    }

    #[instrument(skip(self), fields(doc = %doc_ref))]
    async fn get(&self, doc_ref: &DocRef) -> Result<Option<Document>, StoreError> {
        let url = self.url(&self.document_name(doc_ref));

        let response = match self.send(self.inner.client.get(url)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let body: Value = response.json().await?;
        match body.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Some),
            None => Ok(Some(Document::new())),
            Some(other) => Err(StoreError::InvalidResponse(format!(
                "document fields are not an object: {other}"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let url = self.url(&format!("{}/documents:runAggregationQuery", self.inner.database));
        let body = json!({
            "structuredAggregationQuery": {
                "structuredQuery": { "from": [{ "collectionId": collection }] },
                "aggregations": [{ "alias": "count", "count": {} }]
            }
        });

        let response = self.send(self.inner.client.post(url).json(&body)).await?;
        let result: Value = response.json().await?;
        aggregate_count(&result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::store::FieldValue;

    fn account() -> ServiceAccount {
        ServiceAccount {
            project_id: "shukku-list".to_string(),
            client_email: "sa@shukku-list.iam.gserviceaccount.com".to_string(),
            private_key: SecretString::from("unused"),
            private_key_id: None,
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    fn client(emulator: Option<&str>) -> FirestoreClient {
        let config = FirestoreConfig {
            emulator_host: emulator.map(ToString::to_string),
            ..FirestoreConfig::default()
        };
        FirestoreClient::new(account(), &config).unwrap()
    }

    #[test]
    fn test_document_urls() {
        let prod = client(None);
        let doc_ref = DocRef::new("users", "giash_uid");
        assert_eq!(
            prod.url(&prod.document_name(&doc_ref)),
            "https://firestore.googleapis.com/v1/projects/shukku-list/databases/(default)/documents/users/giash_uid"
        );

        let emulator = client(Some("localhost:8080"));
        assert_eq!(
            emulator.url(&emulator.document_name(&doc_ref)),
            "http://localhost:8080/v1/projects/shukku-list/databases/(default)/documents/users/giash_uid"
        );
        assert_eq!(emulator.project_id(), "shukku-list");
    }

    #[tokio::test]
    async fn test_emulator_uses_owner_token() {
        let emulator = client(Some("localhost:8080"));
        assert_eq!(emulator.bearer().await.unwrap(), "owner");
    }

    #[test]
    fn test_commit_body() {
        let firestore = client(None);
        let mut batch = WriteBatch::new();
        batch
            .delete(DocRef::new("pairs", "giash_rina_home"))
            .set(
                DocRef::new("users", "rina_uid"),
                Document::new()
                    .with("name", "Rina")
                    .with("createdAt", FieldValue::ServerTimestamp),
            );

        let body = firestore.commit_body(&batch).unwrap();
        let prefix = "projects/shukku-list/databases/(default)/documents";
        assert_eq!(
            body,
            json!({
                "writes": [
                    { "delete": format!("{prefix}/pairs/giash_rina_home") },
                    {
                        "update": {
                            "name": format!("{prefix}/users/rina_uid"),
                            "fields": { "name": { "stringValue": "Rina" } }
                        },
                        "updateTransforms": [
                            { "fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME" }
                        ]
                    }
                ]
            })
        );
        // Full replace: no update mask
        assert!(body["writes"][1].get("updateMask").is_none());
    }

    #[test]
    fn test_rejection_messages() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        let err = rejection(403, body);
        assert_eq!(err.to_string(), "Missing or insufficient permissions.");
        assert!(matches!(err, StoreError::Rejected { status: 403, .. }));

        let wrapped = r#"[{"error":{"code":404,"message":"Document not found","status":"NOT_FOUND"}}]"#;
        assert!(rejection(404, wrapped).is_not_found());

        assert!(matches!(
            rejection(401, "{}"),
            StoreError::Authentication(m) if m == "HTTP 401: {}"
        ));
        assert!(matches!(rejection(503, "down"), StoreError::Unavailable(_)));
    }

    #[test]
    fn test_aggregate_count() {
        let response = json!([{
            "result": { "aggregateFields": { "count": { "integerValue": "2" } } },
            "readTime": "2026-10-19T12:00:00Z"
        }]);
        assert_eq!(aggregate_count(&response).unwrap(), 2);

        let empty = json!([{ "readTime": "2026-10-19T12:00:00Z" }]);
        assert!(matches!(
            aggregate_count(&empty),
            Err(StoreError::InvalidResponse(_))
        ));
    }
}
