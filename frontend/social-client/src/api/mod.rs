//! REST client for the social backend
//!
//! Every endpoint answers with `{ success, message, ...payload }`. A non-2xx
//! status or `success: false` becomes [`ClientError::Rejected`] carrying the
//! backend's message, so callers only ever see the payload on success.

use std::time::Duration;

use event_schema::ApiEnvelope;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{ClientError, Result};

pub mod messages;
pub mod posts;
pub mod users;

pub use messages::{ConversationBody, SendMessageBody};
pub use posts::{CommentBody, PostBody};
pub use users::SuggestedUsersBody;

/// Payload-less acknowledgement (`{success, message}`)
pub type Ack = Value;

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    origin: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_origin(
            &config.api_origin,
            config.auth_token.as_deref(),
            config.request_timeout(),
        )
    }

    pub fn with_origin(origin: &str, auth_token: Option<&str>, timeout: Duration) -> Result<Self> {
        let origin = Url::parse(origin)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = auth_token {
            let mut cookie = HeaderValue::from_str(&format!("token={token}"))
                .map_err(|e| ClientError::Config(format!("invalid auth token: {e}")))?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Absolute URL for `segments`; each segment is percent-encoded, so ids
    /// containing `/`, `?` or `#` stay inside their own segment
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.origin.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| ClientError::Config("api origin cannot be a base url".into()))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.get(self.url(segments)?))
    }

    pub(crate) fn post(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.post(self.url(segments)?))
    }

    pub(crate) fn delete(&self, segments: &[&str]) -> Result<RequestBuilder> {
        Ok(self.client.delete(self.url(segments)?))
    }

    /// Send `request` and unwrap the backend envelope
    pub(crate) async fn execute<T>(&self, request: RequestBuilder) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), len = body.len(), "API response");

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|v| backend_message(&v))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = serde_json::from_slice(&body)?;
        if value.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: backend_message(&value)
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        Ok(serde_json::from_value(value)?)
    }
}

fn backend_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_origin() {
        let api =
            ApiClient::with_origin("http://localhost:8000", Some("abc"), Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            api.url(&["api", "v1", "user", "logout"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/user/logout"
        );
    }

    #[test]
    fn test_ids_are_encoded_as_one_segment() {
        let api = ApiClient::with_origin("http://localhost:8000/", None, Duration::from_secs(1))
            .unwrap();
        let url = api.url(&["api", "v1", "post", "delete", "a/b?c#d"]).unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/post/delete/a%2Fb%3Fc%23d"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
        assert_eq!(url.path_segments().unwrap().count(), 5);
    }

    #[test]
    fn test_mailto_origin_is_rejected_when_building_urls() {
        let api = ApiClient::with_origin("mailto:ops@example.com", None, Duration::from_secs(1))
            .unwrap();
        let err = api.url(&["api"]).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_origin() {
        let err = ApiClient::with_origin("not a url", None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
