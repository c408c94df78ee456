use crate::error::Result;
use crate::types::HttpResponse;
use reqwest::Response;
use std::collections::BTreeMap;

/// Converts reqwest responses into captured [`HttpResponse`]s
#[derive(Clone)]
pub struct ResponseConverterImpl;

impl ResponseConverterImpl {
    /// Create a new response converter
    pub fn new() -> Self {
        Self
    }

    /// Capture status, headers and the body bytes verbatim
    pub async fn convert_response(&self, response: Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(name.to_string(), value_str.to_string());
            }
        }

        // bytes, not text: encoding is decided later by the post process stage
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
            url,
        })
    }
}

impl Default for ResponseConverterImpl {
    fn default() -> Self {
        Self::new()
    }
}
