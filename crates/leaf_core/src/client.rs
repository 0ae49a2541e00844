//! Blocking HTTP client for the diagnosis service.
//!
//! Calls are meant to run on a worker thread; the GUI never waits on them.

use crate::config::{AppConfig, UploadMode};
use crate::error::ClientError;
use crate::media::SelectedFile;
use crate::model::{ClassCatalog, HealthReport, PredictionResponse};
use reqwest::Url;
use reqwest::blocking::{Client, Response, multipart};
use serde::Deserialize;
use std::time::Duration;

pub const PREDICT_PATH: &str = "api/predict";
pub const PREDICT_BASE64_PATH: &str = "api/predict_base64";
pub const HEALTH_PATH: &str = "api/health";
pub const INFO_PATH: &str = "api/info";
pub const CLASSES_PATH: &str = "api/classes";

/// A prediction body, typed and as received.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionReply {
    pub response: PredictionResponse,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct DiagnosisClient {
    base: Url,
    http: Client,
}

impl DiagnosisClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: server_url.to_string(),
            reason,
        };
        let mut base = Url::parse(server_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) address".into()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base, http })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ClientError> {
        Self::new(&cfg.server_url, cfg.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(|e| ClientError::InvalidUrl {
            url: format!("{}{path}", self.base),
            reason: e.to_string(),
        })
    }

    /// Submit `file` the way `mode` asks for.
    pub fn submit(&self, file: &SelectedFile, mode: UploadMode) -> Result<PredictionReply, ClientError> {
        match mode {
            UploadMode::Multipart => self.predict(file),
            UploadMode::Base64 => self.predict_base64(file),
        }
    }

    /// `POST /api/predict` with the image in multipart field `file`.
    pub fn predict(&self, file: &SelectedFile) -> Result<PredictionReply, ClientError> {
        let part = multipart::Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.media_type())?;
        let form = multipart::Form::new().part("file", part);
        let url = self.endpoint(PREDICT_PATH)?;
        tracing::debug!("POST {url} ({} bytes)", file.len());
        let resp = self.http.post(url).multipart(form).send()?;
        read_prediction(resp)
    }

    /// `POST /api/predict_base64` with `{"image": "<data URL>"}`.
    pub fn predict_base64(&self, file: &SelectedFile) -> Result<PredictionReply, ClientError> {
        let body = serde_json::json!({ "image": file.to_data_url() });
        let url = self.endpoint(PREDICT_BASE64_PATH)?;
        tracing::debug!("POST {url} ({} bytes, base64)", file.len());
        let resp = self.http.post(url).json(&body).send()?;
        read_prediction(resp)
    }

    /// `GET /api/health`.
    pub fn health(&self) -> Result<HealthReport, ClientError> {
        self.get_json(HEALTH_PATH)
    }

    /// `GET /api/info`; the shape is not fixed so it stays untyped.
    pub fn info(&self) -> Result<serde_json::Value, ClientError> {
        self.get_json(INFO_PATH)
    }

    /// `GET /api/classes`.
    pub fn classes(&self) -> Result<ClassCatalog, ClientError> {
        self.get_json(CLASSES_PATH)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {url}");
        let resp = self.http.get(url).send()?;
        let (_, raw) = read_body(resp)?;
        Ok(T::deserialize(&raw)?)
    }
}

/// The service reports application errors as JSON with a 4xx/5xx status,
/// so the status code alone does not decide success.
fn read_body(resp: Response) -> Result<(reqwest::StatusCode, serde_json::Value), ClientError> {
    let status = resp.status();
    let text = resp.text()?;
    if !status.is_success() {
        tracing::debug!("service answered {status}");
    }
    let raw: serde_json::Value = serde_json::from_str(&text)?;
    Ok((status, raw))
}

fn read_prediction(resp: Response) -> Result<PredictionReply, ClientError> {
    let (status, raw) = read_body(resp)?;
    let response = PredictionResponse::deserialize(&raw)?;
    if !status.is_success() && response.success {
        tracing::warn!("service answered {status} but reported success");
    }
    Ok(PredictionReply { response, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_under_base_path() {
        let c = DiagnosisClient::new("http://example.test:5000/leaf", Duration::from_secs(1)).unwrap();
        assert_eq!(
            c.endpoint(PREDICT_PATH).unwrap().as_str(),
            "http://example.test:5000/leaf/api/predict"
        );
        let c = DiagnosisClient::new("http://example.test:5000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            c.endpoint(HEALTH_PATH).unwrap().as_str(),
            "http://example.test:5000/api/health"
        );
    }

    #[test]
    fn rejects_unusable_addresses() {
        for bad in ["", "not a url", "mailto:a@b.c", "ftp://example.test/"] {
            let err = DiagnosisClient::new(bad, Duration::from_secs(1)).unwrap_err();
            assert!(matches!(err, ClientError::InvalidUrl { .. }), "{bad}");
        }
    }
}
