//! # Remote Sequence Service
//!
//! The backend that owns authoritative numbering.
//!
//! ## Wire Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST {base}/api/sequences/next-number                                  │
//! │       { "companyId": "7", "documentType": "invoice", "series": "F001" } │
//! │   ◄── { "formattedNumber": "F001-000042" }                              │
//! │                                                                         │
//! │  GET  {base}/api/sequences?companyId=7                                  │
//! │   ◄── { "data": [ { "id": 1, "documentType": "invoice",                 │
//! │                     "series": "F001", "currentNumber": 41 } ] }         │
//! │                                                                         │
//! │  Authorization: Bearer <token>   (when configured)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use facturador_core::{CompanyId, DocumentType};

use crate::config::ApiSettings;
use crate::error::{EngineError, EngineResult};

// =============================================================================
// Wire Types
// =============================================================================

/// Body of the next-number request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberRequest {
    pub company_id: String,
    /// Remote identifier (`invoice`, `receipt`, ...).
    pub document_type: String,
    pub series: String,
}

impl NextNumberRequest {
    pub fn new(company_id: &CompanyId, doc_type: DocumentType, series: impl Into<String>) -> Self {
        NextNumberRequest {
            company_id: company_id.as_str().to_string(),
            document_type: doc_type.remote_id().to_string(),
            series: series.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextNumberResponse {
    formatted_number: Option<String>,
}

/// A sequence as the backend lists it. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteSequence {
    pub id: Option<serde_json::Value>,
    pub document_type: Option<String>,
    pub series: Option<String>,
    pub current_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SequenceListResponse {
    #[serde(default)]
    data: Vec<RemoteSequence>,
}

// =============================================================================
// Service Trait
// =============================================================================

/// Client side of the remote sequence service.
#[async_trait]
pub trait SequenceService: Send + Sync {
    /// Allocates the next number. Returns the formatted number as sent.
    async fn next_number(&self, request: &NextNumberRequest) -> EngineResult<String>;

    /// Lists the sequences configured for `company_id`.
    async fn list_sequences(&self, company_id: &CompanyId) -> EngineResult<Vec<RemoteSequence>>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// [`SequenceService`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpSequenceService {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSequenceService {
    /// Builds the client with the configured timeouts.
    pub fn from_settings(settings: &ApiSettings) -> EngineResult<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| EngineError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(HttpSequenceService {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl SequenceService for HttpSequenceService {
    async fn next_number(&self, request: &NextNumberRequest) -> EngineResult<String> {
        debug!(
            company_id = %request.company_id,
            document_type = %request.document_type,
            series = %request.series,
            "Requesting next number"
        );

        let response = self
            .authorize(self.client.post(self.endpoint("/api/sequences/next-number")))
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body: NextNumberResponse = response.json().await?;

        body.formatted_number
            .ok_or_else(|| EngineError::MalformedResponse("missing formattedNumber".into()))
    }

    async fn list_sequences(&self, company_id: &CompanyId) -> EngineResult<Vec<RemoteSequence>> {
        let response = self
            .authorize(self.client.get(self.endpoint("/api/sequences")))
            .query(&[("companyId", company_id.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: SequenceListResponse = response.json().await?;
        debug!(count = body.data.len(), "Sequences listed");
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_remote_identifier() {
        let req = NextNumberRequest::new(&CompanyId::from(7_i64), DocumentType::Boletas, "B001");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"companyId": "7", "documentType": "receipt", "series": "B001"})
        );
    }

    #[test]
    fn test_sequence_list_is_lenient() {
        let body: SequenceListResponse =
            serde_json::from_str(r#"{"data":[{"id":"a"},{"series":"F001","currentNumber":3,"extra":true}]}"#)
                .unwrap();
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[1].current_number, Some(3));

        let empty: SequenceListResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.data.is_empty());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let settings = ApiSettings {
            base_url: "http://localhost:8000/".into(),
            ..ApiSettings::default()
        };
        let service = HttpSequenceService::from_settings(&settings).unwrap();
        assert_eq!(
            service.endpoint("/api/sequences"),
            "http://localhost:8000/api/sequences"
        );
    }
}
