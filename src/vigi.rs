use crate::constants::{CONTROL_PORT, PASSWORD_HASH_PREFIX, describe_error_code};
use crate::error::{Result, VigiError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use tokio::time::Duration;

/// Connection settings for a single camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub host: String,
    pub username: String,
    pub password: String,
}

pub struct VigiCam {
    pub(crate) config: CameraConfig,
    pub(crate) control_port: u16,
    pub(crate) timeout: Duration,
    pub(crate) stok: Option<String>,
    pub(crate) http: reqwest::Client,

    // The camera accepts manual alarm commands only after its automatic
    // alarms have been disabled and the speaker unmuted once per session.
    pub(crate) alarm_primed: AtomicBool,
}

impl VigiCam {
    pub fn new(config: CameraConfig) -> Self {
        let timeout = Duration::from_secs(10);

        Self {
            config,
            control_port: CONTROL_PORT,
            timeout,
            stok: None,
            http: build_http_client(timeout),
            alarm_primed: AtomicBool::new(false),
        }
    }

    pub fn with_control_port(mut self, port: u16) -> Self {
        self.control_port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.http = build_http_client(timeout);
        self
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn control_url(&self) -> String {
        format!("https://{}:{}", self.config.host, self.control_port)
    }

    pub(crate) fn session_base(&self) -> Result<String> {
        let stok = self.stok.as_deref().ok_or_else(|| {
            VigiError::AuthenticationError(
                "not authenticated, call authenticate() first".to_string(),
            )
        })?;
        Ok(format!("{}/stok={}", self.control_url(), stok))
    }

    /// POST a JSON payload to a control URL and parse the reply.
    pub(crate) async fn post_json(&self, url: &str, payload: &Value) -> Result<Value> {
        log::debug!("POST {url}: {payload}");

        let response = self.http.post(url).json(payload).send().await?;
        let reply: Value = response.json().await.map_err(|e| {
            VigiError::SerializationError(format!("invalid JSON from camera: {e}"))
        })?;

        log::debug!("camera reply: {reply}");
        Ok(reply)
    }

    /// Send an authenticated request to the `/ds` control endpoint and check
    /// the vendor error code.
    pub(crate) async fn send_request(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/ds", self.session_base()?);
        let reply = self.post_json(&url, &payload).await?;
        check_error_code(&reply)?;
        Ok(reply)
    }

    pub(crate) fn hashed_password(&self) -> String {
        hash_password(&self.config.password)
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // The camera serves a self-signed certificate on its IP address.
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(timeout)
        .build()
        .expect("failed to build HTTP client")
}

/// The firmware's password hash: MD5 over a fixed prefix plus the password,
/// rendered as uppercase hex.
pub(crate) fn hash_password(password: &str) -> String {
    let digest = md5::compute(format!("{PASSWORD_HASH_PREFIX}{password}"));
    format!("{digest:x}").to_uppercase()
}

/// The camera reports `error_code` as either a number or a string.
pub(crate) fn error_code(reply: &Value) -> i64 {
    match reply.get("error_code") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(-1),
        Some(Value::String(s)) => s.parse().unwrap_or(-1),
        _ => -1,
    }
}

pub(crate) fn check_error_code(reply: &Value) -> Result<()> {
    let code = error_code(reply);
    if code == 0 {
        return Ok(());
    }

    Err(VigiError::DeviceError(format!(
        "code {code}: {}",
        describe_error_code(code)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_hash_shape() {
        let hash = hash_password("123456");
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash.to_uppercase());
        // Deterministic, and sensitive to the input.
        assert_eq!(hash, hash_password("123456"));
        assert_ne!(hash, hash_password("1234567"));
    }

    #[test]
    fn error_code_accepts_number_and_string() {
        assert_eq!(error_code(&json!({"error_code": 0})), 0);
        assert_eq!(error_code(&json!({"error_code": "0"})), 0);
        assert_eq!(error_code(&json!({"error_code": -40401})), -40401);
        assert_eq!(error_code(&json!({"error_code": "-40401"})), -40401);
        assert_eq!(error_code(&json!({})), -1);
    }

    #[test]
    fn nonzero_code_becomes_device_error() {
        assert!(check_error_code(&json!({"error_code": 0})).is_ok());

        let err = check_error_code(&json!({"error_code": -40401})).unwrap_err();
        match err {
            VigiError::DeviceError(msg) => {
                assert!(msg.contains("-40401"));
                assert!(msg.contains("Invalid stok value"));
            }
            other => panic!("expected DeviceError, got {other:?}"),
        }
    }

    #[test]
    fn session_base_requires_token() {
        let cam = VigiCam::new(CameraConfig {
            host: "192.0.2.1".to_string(),
            username: "admin".to_string(),
            password: "123456".to_string(),
        });
        assert!(matches!(
            cam.session_base(),
            Err(VigiError::AuthenticationError(_))
        ));
    }
}
