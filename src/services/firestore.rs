use crate::config::FirestoreSettings;
use crate::models::UserData;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to Firestore
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid or expired access token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),
}

/// Firestore REST client for the users collection
///
/// Handles all communication with the document store including:
/// - Paging through the whole archive
/// - Point reads by uid and lookups by public code
/// - Writing a submitted record
pub struct FirestoreClient {
    documents_url: String,
    collection: String,
    access_token: Option<String>,
    page_size: u32,
    client: Client,
}

impl FirestoreClient {
    pub fn new(settings: &FirestoreSettings) -> Result<Self, FirestoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.unwrap_or(30)))
            .build()?;

        Ok(Self {
            documents_url: format!(
                "{}/projects/{}/databases/{}/documents",
                settings.endpoint.trim_end_matches('/'),
                settings.project_id,
                settings.database_id
            ),
            collection: settings.users_collection.clone(),
            access_token: settings.access_token.clone(),
            page_size: settings.page_size.max(1),
            client,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn document_url(&self, uid: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url,
            self.collection,
            urlencoding::encode(uid)
        )
    }

    /// Fetch every record in the users collection
    ///
    /// Documents that do not decode as a user record are skipped and logged.
    pub async fn list_users(&self) -> Result<Vec<UserData>, FirestoreError> {
        let mut users = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/{}?pageSize={}",
                self.documents_url, self.collection, self.page_size
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(&urlencoding::encode(token));
            }

            let response = self.authorized(self.client.get(&url)).send().await?;
            let json = check_response(response, "list users").await?;

            if let Some(documents) = json.get("documents").and_then(|d| d.as_array()) {
                for document in documents {
                    match decode_user(document) {
                        Ok(user) => users.push(user),
                        Err(e) => tracing::warn!(
                            "Skipping malformed user document {}: {}",
                            document.get("name").and_then(|n| n.as_str()).unwrap_or("?"),
                            e
                        ),
                    }
                }
            }

            page_token = json
                .get("nextPageToken")
                .and_then(|t| t.as_str())
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                break;
            }
        }

        tracing::debug!("Fetched {} users from Firestore", users.len());
        Ok(users)
    }

    /// Point read by account uid
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserData>, FirestoreError> {
        let response = self
            .authorized(self.client.get(self.document_url(uid)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let json = check_response(response, "get user").await?;
        decode_user(&json).map(Some)
    }

    /// Structured query on the `code` field
    pub async fn find_by_code(&self, code: &str) -> Result<Option<UserData>, FirestoreError> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "code" },
                        "op": "EQUAL",
                        "value": { "stringValue": code }
                    }
                },
                "limit": 1
            }
        });

        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let json = check_response(response, "query by code").await?;

        // runQuery streams one entry per result; entries without a document carry only a readTime
        let rows = json
            .as_array()
            .ok_or_else(|| FirestoreError::InvalidResponse("Expected an array of query results".into()))?;

        rows.iter()
            .find_map(|row| row.get("document"))
            .map(decode_user)
            .transpose()
    }

    /// Create or replace the record stored under `user.uid`
    pub async fn save_user(&self, user: &UserData) -> Result<(), FirestoreError> {
        let plain = serde_json::to_value(user)
            .map_err(|e| FirestoreError::UnsupportedValue(e.to_string()))?;
        let fields = match encode_value(&plain) {
            Value::Object(mut typed) => typed
                .remove("mapValue")
                .and_then(|m| m.get("fields").cloned())
                .unwrap_or_else(|| json!({})),
            _ => return Err(FirestoreError::UnsupportedValue("user record is not an object".into())),
        };

        let response = self
            .authorized(self.client.patch(self.document_url(&user.uid)))
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check_response(response, "save user").await?;

        tracing::debug!("Saved user {} with code {}", user.uid, user.code);
        Ok(())
    }
}

async fn check_response(response: reqwest::Response, action: &str) -> Result<Value, FirestoreError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FirestoreError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Firestore {} failed: {} - {}", action, status, body);
        return Err(FirestoreError::ApiError(format!("Failed to {}: {}", action, status)));
    }
    Ok(response.json().await?)
}

/// Decode a Firestore document (`{ name, fields }`) into a user record
pub fn decode_user(document: &Value) -> Result<UserData, FirestoreError> {
    let fields = document
        .get("fields")
        .ok_or_else(|| FirestoreError::InvalidResponse("Document has no fields".into()))?;
    let plain = decode_fields(fields)?;
    serde_json::from_value(plain)
        .map_err(|e| FirestoreError::InvalidResponse(format!("Failed to parse user: {}", e)))
}

/// Convert plain JSON into a Firestore typed value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Convert a Firestore typed value back into plain JSON
pub fn decode_value(value: &Value) -> Result<Value, FirestoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| FirestoreError::UnsupportedValue(value.to_string()))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| FirestoreError::UnsupportedValue("empty value".into()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "integerValue" => {
            // int64 values arrive as decimal strings
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| FirestoreError::UnsupportedValue(format!("integerValue {}", inner)))
        }
        "arrayValue" => inner
            .get("values")
            .and_then(|v| v.as_array())
            .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        "mapValue" => inner
            .get("fields")
            .map(decode_fields)
            .unwrap_or_else(|| Ok(Value::Object(Map::new()))),
        other => Err(FirestoreError::UnsupportedValue(other.to_string())),
    }
}

fn decode_fields(fields: &Value) -> Result<Value, FirestoreError> {
    let fields = fields
        .as_object()
        .ok_or_else(|| FirestoreError::InvalidResponse("fields is not an object".into()))?;
    fields
        .iter()
        .map(|(k, v)| decode_value(v).map(|plain| (k.clone(), plain)))
        .collect::<Result<Map<_, _>, _>>()
        .map(Value::Object)
}
