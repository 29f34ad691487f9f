use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::analysis::model::Location;
use crate::error::ApiError;
use crate::weather::LiveWeather;

/// The two remote collaborators: the site analysis service and the
/// live-weather service. Both take a point and return JSON.
pub trait AssessmentApi {
    /// Raw analysis document for a point, expected in the API dialect.
    fn analyze(&self, at: Location) -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn live_weather(
        &self,
        at: Location,
    ) -> impl Future<Output = Result<LiveWeather, ApiError>> + Send;
}

/// `AssessmentApi` over HTTP: `POST {base}/analyze` and
/// `POST {base}/live-weather`, each with body `{lat, lon}`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(|source| ApiError::Request {
            endpoint: base_url.clone(),
            source,
        })?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, path: &str, at: Location) -> Result<Value, ApiError> {
        let endpoint = format!("{}/{}", self.base_url, path);
        debug!(%endpoint, lat = at.lat, lon = at.lon, "POST");

        let request_failed = |source| ApiError::Request {
            endpoint: endpoint.clone(),
            source,
        };

        let resp = self
            .client
            .post(&endpoint)
            .json(&at)
            .send()
            .await
            .map_err(request_failed)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body: Value = resp.json().await.map_err(request_failed)?;
        if !body.is_object() {
            return Err(ApiError::Body { endpoint });
        }
        Ok(body)
    }
}

impl AssessmentApi for HttpApi {
    async fn analyze(&self, at: Location) -> Result<Value, ApiError> {
        self.post("analyze", at).await
    }

    async fn live_weather(&self, at: Location) -> Result<LiveWeather, ApiError> {
        let body = self.post("live-weather", at).await?;
        Ok(LiveWeather::from_value(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpApi::new("http://localhost:8000/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_request_error() {
        let api = HttpApi::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        let err = api.analyze(Location::new(12.9, 80.2)).await.unwrap_err();
        assert!(matches!(err, ApiError::Request { .. }));
    }
}
