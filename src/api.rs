/// Client for the remote URL-analysis endpoint
use crate::analysis::AnalysisResult;
use crate::error::TransportError;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Body of `POST /api/analyze-url`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeUrlRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_db: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
}

impl AnalyzeUrlRequest {
    pub fn new(url: &str) -> Self {
        AnalyzeUrlRequest {
            url: url.to_string(),
            skip_db: None,
            html_content: None,
        }
    }

    pub fn skip_db(mut self, skip: bool) -> Self {
        self.skip_db = skip.then_some(true);
        self
    }

    /// Attach a page snapshot, cut to at most `max_bytes` on a char boundary
    pub fn html(mut self, html: Option<String>, max_bytes: usize) -> Self {
        self.html_content = html.map(|mut html| {
            if html.len() > max_bytes {
                let mut end = max_bytes;
                while !html.is_char_boundary(end) {
                    end -= 1;
                }
                html.truncate(end);
            }
            html
        });
        self
    }
}

/// The remote analysis service, as seen by the tab monitor
#[allow(async_fn_in_trait)]
pub trait AnalysisApi {
    async fn analyze(&self, request: &AnalyzeUrlRequest) -> Result<AnalysisResult, TransportError>;
}

/// Map a raw HTTP status and body to a result or a transport failure
pub fn decode_response(status: u16, body: &str) -> Result<AnalysisResult, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::Status(status));
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))?;

    AnalysisResult::from_value(value)
        .ok_or_else(|| TransportError::Malformed("expected a JSON object".to_string()))
}

pub struct HttpAnalysisApi {
    client: Client,
    endpoint: Url,
}

impl HttpAnalysisApi {
    pub fn new(endpoint: Url) -> Self {
        HttpAnalysisApi {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl AnalysisApi for HttpAnalysisApi {
    async fn analyze(&self, request: &AnalyzeUrlRequest) -> Result<AnalysisResult, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        decode_response(status, &body)
    }
}
