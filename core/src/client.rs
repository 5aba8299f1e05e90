//! Stateless HTTP request builder and response parser for the business-unit
//! collection.
//!
//! # Design
//! `BusinessUnitApi` holds only the collection endpoint and an optional bearer
//! token. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! endpoint construction and status/error normalization stay deterministic and
//! testable without a network. `ResourceClient` joins the two halves with a
//! `Transport`.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{BusinessUnit, UnitId};

/// Error bodies longer than this are cut before landing in a `TransportError`.
const MAX_ERROR_BODY: usize = 512;

/// Request builder and response parser for one resource collection.
#[derive(Clone)]
pub struct BusinessUnitApi {
    endpoint: String,
    bearer_token: Option<String>,
}

impl fmt::Debug for BusinessUnitApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessUnitApi")
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl BusinessUnitApi {
    pub fn new(base_url: &str, collection: &str) -> Self {
        Self {
            endpoint: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                collection.trim_matches('/')
            ),
            bearer_token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let api = Self::new(&config.base_url, &config.collection);
        match &config.bearer_token {
            Some(token) => api.with_bearer_token(token),
            None => api,
        }
    }

    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Absolute URL of the collection, e.g. `https://api.example/business-units`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn item_url(&self, id: UnitId) -> String {
        format!("{}/{id}", self.endpoint)
    }

    pub fn build_list(&self) -> HttpRequest {
        self.request(HttpMethod::Get, self.endpoint.clone(), None)
    }

    pub fn build_create(&self, unit: &BusinessUnit) -> Result<HttpRequest, TransportError> {
        let url = self.endpoint.clone();
        let body = encode(HttpMethod::Post, &url, unit)?;
        Ok(self.request(HttpMethod::Post, url, Some(body)))
    }

    pub fn build_update(
        &self,
        id: UnitId,
        unit: &BusinessUnit,
    ) -> Result<HttpRequest, TransportError> {
        let url = self.item_url(id);
        let body = encode(HttpMethod::Put, &url, unit)?;
        Ok(self.request(HttpMethod::Put, url, Some(body)))
    }

    pub fn build_delete(&self, id: UnitId) -> HttpRequest {
        self.request(HttpMethod::Delete, self.item_url(id), None)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<BusinessUnit>, TransportError> {
        check_status(HttpMethod::Get, &self.endpoint, &response)?;
        decode(HttpMethod::Get, &self.endpoint, &response)
    }

    /// Parse a create response. A `204 No Content` echoes `submitted` back,
    /// since the caller supplied the identifier.
    pub fn parse_create(
        &self,
        response: HttpResponse,
        submitted: &BusinessUnit,
    ) -> Result<BusinessUnit, TransportError> {
        check_status(HttpMethod::Post, &self.endpoint, &response)?;
        decode_or_echo(HttpMethod::Post, &self.endpoint, &response, submitted)
    }

    pub fn parse_update(
        &self,
        id: UnitId,
        response: HttpResponse,
        submitted: &BusinessUnit,
    ) -> Result<BusinessUnit, TransportError> {
        let url = self.item_url(id);
        check_status(HttpMethod::Put, &url, &response)?;
        decode_or_echo(HttpMethod::Put, &url, &response, submitted)
    }

    pub fn parse_delete(&self, id: UnitId, response: HttpResponse) -> Result<bool, TransportError> {
        check_status(HttpMethod::Delete, &self.item_url(id), &response)?;
        Ok(true)
    }

    fn request(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = &self.bearer_token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }
}

fn encode(method: HttpMethod, url: &str, unit: &BusinessUnit) -> Result<String, TransportError> {
    serde_json::to_string(unit).map_err(|e| TransportError::Encode {
        method,
        endpoint: url.to_string(),
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(
    method: HttpMethod,
    url: &str,
    response: &HttpResponse,
) -> Result<T, TransportError> {
    serde_json::from_str(&response.body).map_err(|e| TransportError::Decode {
        method,
        endpoint: url.to_string(),
        status: response.status,
        message: e.to_string(),
    })
}

fn decode_or_echo(
    method: HttpMethod,
    url: &str,
    response: &HttpResponse,
    submitted: &BusinessUnit,
) -> Result<BusinessUnit, TransportError> {
    if response.status == 204 || response.body.trim().is_empty() {
        return Ok(submitted.clone());
    }
    decode(method, url, response)
}

/// Map any non-2xx status to `TransportError::Status`.
fn check_status(method: HttpMethod, url: &str, response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    Err(TransportError::Status {
        method,
        endpoint: url.to_string(),
        status: response.status,
        body: truncate(&response.body, MAX_ERROR_BODY),
    })
}

fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::boulders_copenhagen;

    fn api() -> BusinessUnitApi {
        BusinessUnitApi::new("http://localhost:3000", "business-units")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_produces_get_on_collection() {
        let req = api().build_list();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/business-units");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_create_posts_json_body() {
        let unit = boulders_copenhagen();
        let req = api().build_create(&unit).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/business-units");
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], 1);
        assert_eq!(body["companyNameForInvoice"], "Boulders Denmark A/S");
        assert_eq!(body["address"]["postalCode"], "1620");
    }

    #[test]
    fn build_update_puts_to_item_url() {
        let unit = boulders_copenhagen();
        let req = api().build_update(1, &unit).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/business-units/1");
        assert!(req.body.is_some());
    }

    #[test]
    fn build_delete_targets_item_url() {
        let req = api().build_delete(42);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/business-units/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn bearer_token_is_sent_as_authorization_header() {
        let req = api().with_bearer_token("secret").build_list();
        assert!(req
            .headers
            .contains(&("authorization".to_string(), "Bearer secret".to_string())));
    }

    #[test]
    fn debug_output_hides_bearer_token() {
        let printed = format!("{:?}", api().with_bearer_token("secret"));
        assert!(!printed.contains("secret"));
        assert!(printed.contains("http://localhost:3000/business-units"));
    }

    #[test]
    fn slashes_are_normalized() {
        let api = BusinessUnitApi::new("http://localhost:3000/", "/business-units/");
        assert_eq!(api.endpoint(), "http://localhost:3000/business-units");
    }

    #[test]
    fn parse_list_success() {
        let units = api()
            .parse_list(response(200, r#"[{"id":1,"name":"Test"},{"id":2,"name":"Other"}]"#))
            .unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].name, "Other");
    }

    #[test]
    fn parse_list_non_2xx_carries_status_and_endpoint() {
        let err = api().parse_list(response(503, "unavailable")).unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.endpoint(), "http://localhost:3000/business-units");
        assert_eq!(err.method(), HttpMethod::Get);
    }

    #[test]
    fn parse_list_bad_json() {
        let err = api().parse_list(response(200, "not json")).unwrap_err();
        assert!(matches!(err, TransportError::Decode { status: 200, .. }));
    }

    #[test]
    fn parse_create_accepts_any_2xx() {
        let unit = boulders_copenhagen();
        let body = serde_json::to_string(&unit).unwrap();
        assert_eq!(api().parse_create(response(201, &body), &unit).unwrap(), unit);
        assert_eq!(api().parse_create(response(200, &body), &unit).unwrap(), unit);
    }

    #[test]
    fn parse_create_no_content_echoes_submitted_record() {
        let unit = boulders_copenhagen();
        let created = api().parse_create(response(204, ""), &unit).unwrap();
        assert_eq!(created, unit);
    }

    #[test]
    fn parse_update_failure_names_item_url() {
        let unit = boulders_copenhagen();
        let err = api()
            .parse_update(1, response(500, "internal error"), &unit)
            .unwrap_err();
        assert_eq!(err.endpoint(), "http://localhost:3000/business-units/1");
        assert!(matches!(err, TransportError::Status { status: 500, .. }));
    }

    #[test]
    fn parse_delete_success_and_not_found() {
        assert!(api().parse_delete(3, response(204, "")).unwrap());
        let err = api().parse_delete(3, response(404, "")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "æ".repeat(400);
        let err = api().parse_list(response(500, &body)).unwrap_err();
        let TransportError::Status { body, .. } = err else {
            panic!("expected status error");
        };
        assert!(body.len() <= MAX_ERROR_BODY + 3);
        assert!(body.ends_with("..."));
    }
}
