use crate::config::{BodyEncoding, QueryConfig, Request};
use crate::error::{QueryDiffError, Result};
use reqwest::{Client, Method};
use std::collections::BTreeMap;

/// Builds the HTTP request sent to each server
#[derive(Clone)]
pub struct RequestBuilderImpl {
    client: Client,
    method: Method,
    encoding: BodyEncoding,
    headers: BTreeMap<String, String>,
}

impl RequestBuilderImpl {
    /// Create a new request builder
    pub fn new(client: Client, query: &QueryConfig) -> Result<Self> {
        let method = Method::from_bytes(query.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| QueryDiffError::invalid_config(format!("Invalid HTTP method: {}", query.method)))?;

        Ok(Self {
            client,
            method,
            encoding: query.body,
            headers: query.headers.clone(),
        })
    }

    /// Encoding actually used for this builder's method
    pub fn effective_encoding(&self) -> BodyEncoding {
        if self.method == Method::GET || self.method == Method::HEAD {
            BodyEncoding::Query
        } else {
            self.encoding
        }
    }

    /// Build the request for `server`, passing parameters and headers through
    pub fn build_request(&self, server: &str, request: &Request) -> Result<reqwest::Request> {
        let url = url::Url::parse(server)?;
        let mut request_builder = self.client.request(self.method.clone(), url);

        // Query headers first, request headers take precedence
        let mut headers = self.headers.clone();
        if let Some(request_headers) = &request.header {
            headers.extend(request_headers.clone());
        }
        for (key, value) in headers {
            request_builder = request_builder.header(key, value);
        }

        if !request.parameter.is_empty() {
            request_builder = match self.effective_encoding() {
                BodyEncoding::Json => request_builder.json(&request.parameter),
                BodyEncoding::Form => request_builder.form(&parameter_pairs(&request.parameter)?),
                BodyEncoding::Query => request_builder.query(&parameter_pairs(&request.parameter)?),
            };
        }

        request_builder.build().map_err(Into::into)
    }
}

/// Flatten a parameter table into key/value pairs; arrays repeat the key
pub fn parameter_pairs(parameter: &toml::Table) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(parameter.len());

    for (key, value) in parameter {
        match value {
            toml::Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar_text(key, item)?));
                }
            }
            other => pairs.push((key.clone(), scalar_text(key, other)?)),
        }
    }

    Ok(pairs)
}

fn scalar_text(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(QueryDiffError::invalid_config(format!(
            "Parameter '{}' is nested; nested parameters need `body = \"json\"`",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(parameter: &str) -> Request {
        let mut request = Request::new("case");
        request.parameter = toml::from_str(parameter).unwrap();
        request
    }

    fn builder(method: &str, body: BodyEncoding) -> RequestBuilderImpl {
        let query = QueryConfig {
            method: method.to_string(),
            body,
            ..QueryConfig::default()
        };
        RequestBuilderImpl::new(Client::new(), &query).unwrap()
    }

    fn body_text(request: &reqwest::Request) -> String {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_form_body() {
        let request = request_with("q = \"hello world\"\nlimit = 10");
        let built = builder("POST", BodyEncoding::Form)
            .build_request("http://a.example/api", &request)
            .unwrap();

        assert_eq!(built.method(), Method::POST);
        assert_eq!(body_text(&built), "limit=10&q=hello+world");
        assert_eq!(
            built.headers().get("content-type").unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_json_body_keeps_structure() {
        let request = request_with("q = \"x\"\n[filter]\nkind = \"book\"");
        let built = builder("POST", BodyEncoding::Json)
            .build_request("http://a.example/api", &request)
            .unwrap();

        let body: serde_json::Value = serde_json::from_str(&body_text(&built)).unwrap();
        assert_eq!(body["q"], "x");
        assert_eq!(body["filter"]["kind"], "book");
    }

    #[test]
    fn test_get_uses_query_string() {
        let request = request_with("tag = [\"a\", \"b\"]");
        let built = builder("get", BodyEncoding::Form)
            .build_request("http://a.example/api", &request)
            .unwrap();

        assert_eq!(built.method(), Method::GET);
        assert_eq!(built.url().query(), Some("tag=a&tag=b"));
        assert!(built.body().is_none());
    }

    #[test]
    fn test_empty_parameter_sends_no_body() {
        let built = builder("POST", BodyEncoding::Form)
            .build_request("http://a.example/api", &Request::new("smoke"))
            .unwrap();

        assert!(built.body().is_none());
        assert_eq!(built.url().as_str(), "http://a.example/api");
    }

    #[test]
    fn test_request_headers_override_query_headers() {
        let mut query = QueryConfig::default();
        query.headers.insert("X-Env".to_string(), "global".to_string());
        query.headers.insert("Accept".to_string(), "text/xml".to_string());
        let builder = RequestBuilderImpl::new(Client::new(), &query).unwrap();

        let mut request = Request::new("case");
        let mut header = BTreeMap::new();
        header.insert("X-Env".to_string(), "request".to_string());
        request.header = Some(header);

        let built = builder.build_request("http://a.example", &request).unwrap();
        assert_eq!(built.headers().get("x-env").unwrap(), "request");
        assert_eq!(built.headers().get("accept").unwrap(), "text/xml");
    }

    #[test]
    fn test_nested_form_parameter_is_rejected() {
        let request = request_with("[filter]\nkind = \"book\"");
        let result = builder("POST", BodyEncoding::Form).build_request("http://a.example", &request);

        assert!(matches!(result, Err(QueryDiffError::InvalidConfig { .. })));
    }

    #[test]
    fn test_invalid_method() {
        let query = QueryConfig {
            method: "BAD METHOD".to_string(),
            ..QueryConfig::default()
        };
        assert!(RequestBuilderImpl::new(Client::new(), &query).is_err());
    }
}
