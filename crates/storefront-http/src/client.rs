//! Thin JSON client over `reqwest` shared by both gateways.
//!
//! Every failure is translated into a `StorefrontError` here so the gateways
//! only deal with payloads.

use std::fmt;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storefront_core::error::StorefrontError;
use tracing::debug;

use crate::config::HttpConfig;

/// Longest error body quoted back in a `StorefrontError` message.
const MAX_ERROR_BODY: usize = 200;

/// JSON client bound to one API root.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if the base URL is blank or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: &HttpConfig) -> Result<Self, StorefrontError> {
        let base_url = config.base_url.trim();
        if base_url.is_empty() {
            return Err(StorefrontError::Validation("API base URL is empty".into()));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorefrontError::Validation(format!("invalid HTTP client settings: {e}")))?;
        Ok(Self {
            http,
            base_url: format!("{}/", base_url.trim_end_matches('/')),
            auth_token: config.auth_token.clone(),
        })
    }

    /// The API root, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, StorefrontError> {
        let request = self.request(Method::GET, path);
        let (status, body) = self.dispatch(request, &Method::GET, path).await?;
        decode(status, &body)
    }

    pub(crate) async fn post<B, T>(&self, path: &str, payload: &B) -> Result<T, StorefrontError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(payload);
        let (status, body) = self.dispatch(request, &Method::POST, path).await?;
        decode(status, &body)
    }

    pub(crate) async fn patch<B>(&self, path: &str, payload: &B) -> Result<(), StorefrontError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request = self.request(Method::PATCH, path).json(payload);
        self.dispatch(request, &Method::PATCH, path).await?;
        Ok(())
    }

    /// Sends a request without a body and ignores the response body.
    pub(crate) async fn send(&self, method: Method, path: &str) -> Result<(), StorefrontError> {
        let request = self.request(method.clone(), path);
        self.dispatch(request, &method, path).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        let request = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch(
        &self,
        request: RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<(StatusCode, String), StorefrontError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        debug!(%method, path, status = status.as_u16(), "backend responded");
        if status.is_success() {
            Ok((status, body))
        } else {
            Err(status_error(status, &body))
        }
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, StorefrontError> {
    serde_json::from_str(body).map_err(|e| StorefrontError::Server {
        status: Some(status.as_u16()),
        message: format!("unreadable response body: {e}"),
    })
}

fn transport_error(err: reqwest::Error) -> StorefrontError {
    if err.is_timeout() {
        StorefrontError::Network(format!("request timed out: {err}"))
    } else {
        StorefrontError::Network(err.to_string())
    }
}

/// Maps a non-success response onto the error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: &str) -> StorefrontError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned()
    });
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorefrontError::Auth(message),
        StatusCode::NOT_FOUND => StorefrontError::NotFound(message),
        _ => StorefrontError::Server {
            status: Some(status.as_u16()),
            message,
        },
    }
}

/// The backend reports failures as `{"error": "..."}`; anything else is
/// quoted as plain text.
fn error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return Some(parsed.error);
    }
    let text = body.trim();
    (!text.is_empty()).then(|| text.chars().take(MAX_ERROR_BODY).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_and_forbidden_map_to_auth() {
        let unauthorized = status_error(StatusCode::UNAUTHORIZED, r#"{"error":"token expired"}"#);
        let forbidden = status_error(StatusCode::FORBIDDEN, "");

        assert_eq!(unauthorized, StorefrontError::Auth("token expired".into()));
        assert_eq!(forbidden, StorefrontError::Auth("Forbidden".into()));
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err = status_error(StatusCode::NOT_FOUND, r#"{"error":"cart item not found"}"#);

        assert_eq!(err, StorefrontError::NotFound("cart item not found".into()));
    }

    #[test]
    fn test_other_statuses_map_to_server_with_status() {
        let err = status_error(StatusCode::BAD_REQUEST, "cart is empty\n");

        assert_eq!(
            err,
            StorefrontError::Server {
                status: Some(400),
                message: "cart is empty".into(),
            }
        );
    }

    #[test]
    fn test_long_plain_bodies_are_truncated() {
        let body = "x".repeat(1000);

        let err = status_error(StatusCode::BAD_GATEWAY, &body);

        match err {
            StorefrontError::Server { message, .. } => assert_eq!(message.len(), MAX_ERROR_BODY),
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let client = ApiClient::new(&HttpConfig::new("http://api.test/api/v1")).unwrap();

        assert_eq!(client.base_url(), "http://api.test/api/v1/");
    }

    #[test]
    fn test_blank_base_url_is_rejected() {
        let result = ApiClient::new(&HttpConfig::new("  "));

        assert!(matches!(result, Err(StorefrontError::Validation(_))));
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let config = HttpConfig::new("http://api.test/").with_auth_token(Some("secret".into()));
        let client = ApiClient::new(&config).unwrap();

        let printed = format!("{client:?}");

        assert!(!printed.contains("secret"));
        assert!(printed.contains("redacted"));
    }
}
