use crate::config::{QueryConfig, Request};
use crate::error::Result;
use crate::http::{RequestBuilderImpl, ResponseConverterImpl};
use crate::traits::ResponseFetcher;
use crate::types::HttpResponse;
use log::debug;
use reqwest::Client;
use std::time::Duration;

/// Response fetcher backed by reqwest
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    request_builder: RequestBuilderImpl,
    response_converter: ResponseConverterImpl,
}

impl HttpFetcher {
    /// Create a new fetcher from the query settings
    pub fn new(query: &QueryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(query.timeout_seconds))
            .redirect(if query.follow_redirects {
                reqwest::redirect::Policy::default()
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;

        let request_builder = RequestBuilderImpl::new(client.clone(), query)?;
        let response_converter = ResponseConverterImpl::new();

        Ok(Self {
            client,
            request_builder,
            response_converter,
        })
    }
}

impl ResponseFetcher for HttpFetcher {
    async fn fetch(&self, server: &str, request: &Request) -> Result<HttpResponse> {
        let http_request = self.request_builder.build_request(server, request)?;
        debug!("{} {}", http_request.method(), http_request.url());

        let response = self.client.execute(http_request).await?;

        self.response_converter.convert_response(response).await
    }
}
