// src/detector.rs
//
// Client side of the contract with the external vision process. One GET
// per cycle returns the current frame's detections as a JSON array; an
// empty array is a valid frame. The payload schema is strict — if any
// element is malformed the whole fetch fails and the cycle is skipped.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;

use crate::types::RawDetection;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("detection source unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("detection source returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed detection payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can produce one frame's worth of raw detections.
///
/// The aggregation loop is generic over this so tests can drive it with a
/// scripted source instead of a live HTTP endpoint.
pub trait DetectionSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<RawDetection>, FetchError>> + Send;
}

/// reqwest-backed source polling the detector's HTTP endpoint.
#[derive(Debug, Clone)]
pub struct DetectorClient {
    http: reqwest::Client,
    url: String,
}

impl DetectorClient {
    /// `timeout` bounds the whole request, so the loop cadence survives an
    /// unreachable collaborator.
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DetectionSource for DetectorClient {
    async fn fetch(&self) -> Result<Vec<RawDetection>, FetchError> {
        let response = self.http.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;
        let detections: Vec<RawDetection> = serde_json::from_str(&body)?;
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_array_is_a_valid_frame() {
        let detections: Vec<RawDetection> = serde_json::from_str("[]").unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn frame_payload_parses() {
        let detections: Vec<RawDetection> = serde_json::from_str(
            r#"[{"x": 200.0, "y": 450.5, "type": "car"}, {"x": 12.0, "y": 9.0}]"#,
        )
        .unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].kind.as_deref(), Some("car"));
        assert_eq!(detections[1].kind, None);
    }

    #[test]
    fn one_bad_element_rejects_the_whole_payload() {
        let result: Result<Vec<RawDetection>, _> =
            serde_json::from_str(r#"[{"x": 1.0, "y": 2.0}, {"x": "oops", "y": 2.0}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let result: Result<Vec<RawDetection>, _> =
            serde_json::from_str(r#"{"vehicles": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn client_builds_with_a_timeout() {
        let client = DetectorClient::new("http://127.0.0.1:5000/detections", Duration::from_secs(1))
            .unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:5000/detections");
    }
}
