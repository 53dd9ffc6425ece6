use crate::constants::describe_error_code;
use crate::error::{Result, VigiError};
use crate::vigi::{VigiCam, error_code};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::percent_decode_str;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use serde_json::json;
use std::sync::atomic::Ordering;

#[async_trait]
pub trait Authentication: Send + Sync {
    /// Establish a session with the camera
    async fn authenticate(&mut self) -> Result<()>;

    /// Drop the current session token
    async fn logout(&mut self) -> Result<()>;

    /// Check if a session token is held
    fn is_authenticated(&self) -> bool;

    /// Get the current session token
    fn session_token(&self) -> Option<&str>;
}

#[async_trait]
impl Authentication for VigiCam {
    async fn authenticate(&mut self) -> Result<()> {
        let url = format!("{}/", self.control_url());

        // Phase one: fetch the login nonce and the camera's RSA public key.
        let payload = json!({
            "method": "do",
            "user_management": { "get_encrypt_info": null },
        });
        let reply = self
            .post_json(&url, &payload)
            .await
            .map_err(auth_unreachable)?;

        let data = reply.get("data").ok_or_else(|| {
            VigiError::AuthenticationError("camera sent no encrypt info".to_string())
        })?;
        let nonce = data.get("nonce").and_then(|n| n.as_str()).ok_or_else(|| {
            VigiError::AuthenticationError("encrypt info is missing the nonce".to_string())
        })?;
        let key = data.get("key").and_then(|k| k.as_str()).ok_or_else(|| {
            VigiError::AuthenticationError("encrypt info is missing the public key".to_string())
        })?;

        // Phase two: log in with the RSA-wrapped password hash.
        let encrypted = encrypt_login_secret(key, &self.hashed_password(), nonce)?;
        let payload = json!({
            "method": "do",
            "login": {
                "username": self.config.username,
                "password": encrypted,
                "passwdType": "md5",
                "encrypt_type": "2",
            },
        });
        let reply = self
            .post_json(&url, &payload)
            .await
            .map_err(auth_unreachable)?;

        let code = error_code(&reply);
        if code == 0
            && let Some(stok) = reply.get("stok").and_then(|s| s.as_str())
        {
            self.stok = Some(stok.to_string());
            log::info!("authenticated against {}", self.config.host);
            return Ok(());
        }

        Err(VigiError::AuthenticationError(format!(
            "login rejected, code {code}: {}",
            describe_error_code(code)
        )))
    }

    async fn logout(&mut self) -> Result<()> {
        // The vendor API has no logout endpoint; dropping the token
        // invalidates every session-gated call on our side.
        self.stok = None;
        self.alarm_primed.store(false, Ordering::Release);
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.stok.is_some()
    }

    fn session_token(&self) -> Option<&str> {
        self.stok.as_deref()
    }
}

fn auth_unreachable(err: VigiError) -> VigiError {
    match err {
        VigiError::HttpError(e) => {
            VigiError::AuthenticationError(format!("camera unreachable: {e}"))
        }
        other => other,
    }
}

/// Wrap `<password-hash>:<nonce>` with the camera's public key, the only
/// password transport the login endpoint accepts. The key arrives
/// URL-encoded base64 DER.
pub(crate) fn encrypt_login_secret(key: &str, password_hash: &str, nonce: &str) -> Result<String> {
    let decoded_key = percent_decode_str(key).decode_utf8_lossy();
    let der = BASE64
        .decode(decoded_key.as_bytes())
        .map_err(|e| VigiError::AuthenticationError(format!("malformed public key: {e}")))?;
    let public_key = RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| VigiError::AuthenticationError(format!("malformed public key: {e}")))?;

    let secret = format!("{password_hash}:{nonce}");
    let encrypted = public_key
        .encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, secret.as_bytes())
        .map_err(|e| VigiError::AuthenticationError(format!("login encryption failed: {e}")))?;

    Ok(BASE64.encode(encrypted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vigi::CameraConfig;

    fn offline_cam() -> VigiCam {
        VigiCam::new(CameraConfig {
            host: "192.0.2.1".to_string(),
            username: "admin".to_string(),
            password: "123456".to_string(),
        })
    }

    #[test]
    fn fresh_client_holds_no_session() {
        let cam = offline_cam();
        assert!(!cam.is_authenticated());
        assert!(cam.session_token().is_none());
    }

    #[tokio::test]
    async fn logout_clears_the_token() {
        let mut cam = offline_cam();
        cam.stok = Some("abc123".to_string());
        assert!(cam.is_authenticated());

        cam.logout().await.unwrap();
        assert!(!cam.is_authenticated());
        assert!(matches!(
            cam.session_base(),
            Err(VigiError::AuthenticationError(_))
        ));
    }

    #[test]
    fn garbage_public_key_is_rejected() {
        let err = encrypt_login_secret("not-a-key", "AABB", "nonce").unwrap_err();
        assert!(matches!(err, VigiError::AuthenticationError(_)));

        // Valid base64, but not a DER-encoded key.
        let err = encrypt_login_secret("aGVsbG8=", "AABB", "nonce").unwrap_err();
        assert!(matches!(err, VigiError::AuthenticationError(_)));
    }
}
