use super::{Document, DocumentStore, Fields, StoreError};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_DATABASE: &str = "(default)";
const LIST_PAGE_SIZE: &str = "300";

/// Connection settings for the Firestore REST API
#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub database: String,
    pub api_key: Option<String>,
    /// Overridden when talking to the local emulator.
    pub base_url: String,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
}

impl FirestoreSettings {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// Document store backed by Cloud Firestore over its REST interface.
#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    settings: FirestoreSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirestoreStore {
    pub fn new(settings: FirestoreSettings) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, settings })
    }

    fn collection_url(&self, collection: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|e| StoreError::Transport(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport("base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.settings.project_id.as_str(),
                "databases",
                self.settings.database.as_str(),
                "documents",
                collection,
            ]);
        if let Some(key) = &self.settings.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn document_url(&self, collection: &str, key: &str) -> Result<Url, StoreError> {
        let mut url = self.collection_url(collection)?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport("base url cannot carry a path".into()))?
            .push(key);
        Ok(url)
    }

    async fn rejection(response: reqwest::Response, context: &str) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        if status == StatusCode::NOT_FOUND {
            return StoreError::NotFound(format!("{context}: {message}"));
        }
        error!(status = status.as_u16(), %message, context, "Firestore request rejected");
        StoreError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    #[instrument(skip(self))]
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let base = self.collection_url(collection)?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = base.clone();
            url.query_pairs_mut().append_pair("pageSize", LIST_PAGE_SIZE);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(Self::rejection(response, collection).await);
            }
            let page: ListDocumentsResponse = response.json().await?;

            for raw in page.documents {
                let key = document_key(&raw.name)?;
                let fields = decode_fields(&raw.fields)?;
                documents.push(Document::new(key, fields));
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(collection, count = documents.len(), "listed Firestore collection");
        Ok(documents)
    }

    #[instrument(skip(self, fields))]
    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let mut url = self.document_url(collection, key)?;
        {
            let mut query = url.query_pairs_mut();
            for field in fields.keys() {
                query.append_pair("updateMask.fieldPaths", field);
            }
            query.append_pair("currentDocument.exists", "true");
        }

        let body = json!({ "fields": encode_fields(&fields) });
        let response = self.client.patch(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response, &format!("{collection}/{key}")).await);
        }
        Ok(())
    }
}

/// Last path segment of a full resource name
/// (`projects/p/databases/d/documents/orders/abc` -> `abc`).
fn document_key(name: &str) -> Result<String, StoreError> {
    name.rsplit('/')
        .next()
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Decode(format!("document name without key: {name}")))
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, StoreError> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

/// Converts a Firestore typed value (`{"stringValue": "x"}`) to plain JSON.
fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let (kind, raw) = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| StoreError::Decode(format!("untyped value: {value}")))?;

    let decoded = match (kind.as_str(), raw) {
        ("nullValue", _) => Value::Null,
        ("booleanValue", Value::Bool(b)) => Value::Bool(*b),
        ("integerValue", Value::String(raw)) => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| StoreError::Decode(format!("integerValue {raw}: {e}")))?,
        ("integerValue", Value::Number(n)) => Value::Number(n.clone()),
        ("doubleValue", Value::Number(n)) => Value::Number(n.clone()),
        ("doubleValue", Value::String(raw)) => {
            // NaN and the infinities arrive as strings and have no JSON form.
            warn!(raw = %raw, "non-finite doubleValue decoded as null");
            Value::Null
        }
        ("stringValue", Value::String(s))
        | ("timestampValue", Value::String(s))
        | ("referenceValue", Value::String(s))
        | ("bytesValue", Value::String(s)) => Value::String(s.clone()),
        ("geoPointValue", point) => point.clone(),
        ("mapValue", inner) => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Value::Object(decode_fields(&fields)?)
        }
        ("arrayValue", inner) => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Value::Array(values)
        }
        (kind, raw) => {
            return Err(StoreError::Decode(format!("unsupported {kind}: {raw}")));
        }
    };
    Ok(decoded)
}

fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => encode_number(n),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

fn encode_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        json!({ "integerValue": i.to_string() })
    } else {
        json!({ "doubleValue": n.as_f64().unwrap_or_default() })
    }
}
