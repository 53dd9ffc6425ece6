use crate::constants::{CUSTOM_AUDIO_SLOTS, MAX_AUDIO_BYTES, UPLOAD_TIMEOUT, is_custom_audio_slot};
use crate::error::{Result, VigiError};
use crate::vigi::{VigiCam, check_error_code};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tokio::fs;

/// One uploaded sound as reported by the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAudio {
    pub id: u32,
    pub name: String,
}

/// Per-file result of `sync_custom_audios`.
#[derive(Debug)]
pub struct SyncOutcome {
    pub file: PathBuf,
    /// Target slot, or `None` when the file did not fit any slot.
    pub slot: Option<u32>,
    pub outcome: Result<()>,
}

#[async_trait]
pub trait AudioLibrary: Send + Sync {
    /// List the custom sounds currently on the camera
    async fn get_custom_audio_list(&self) -> Result<Vec<CustomAudio>>;

    /// Upload a G.711 file into a slot, overwriting its previous content
    async fn upload_custom_audio(
        &self,
        file_path: &Path,
        slot_id: u32,
        name: Option<&str>,
    ) -> Result<()>;

    /// Upload one file per slot in fixed slot order, reporting per file
    async fn sync_custom_audios(&self, files: &[PathBuf]) -> Vec<SyncOutcome>;

    /// Change the display name of a slot
    async fn rename_custom_audio(&self, slot_id: u32, new_name: &str) -> Result<()>;

    /// Remove the sound stored in a slot
    async fn delete_custom_audio(&self, slot_id: u32) -> Result<()>;
}

#[async_trait]
impl AudioLibrary for VigiCam {
    async fn get_custom_audio_list(&self) -> Result<Vec<CustomAudio>> {
        let payload = json!({
            "usr_def_audio_alarm": { "table": ["usr_def_audio"] },
            "method": "get",
        });
        let reply = self.send_request(payload).await?;
        Ok(parse_custom_audio_list(&reply))
    }

    async fn upload_custom_audio(
        &self,
        file_path: &Path,
        slot_id: u32,
        name: Option<&str>,
    ) -> Result<()> {
        validate_slot(slot_id)?;
        let upload_url = format!("{}/admin/system/upload_usr_def_audio", self.session_base()?);

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                VigiError::UploadError(format!("invalid file path {}", file_path.display()))
            })?
            .to_string();
        let display_name = match name {
            Some(n) => n.to_string(),
            None => file_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&file_name)
                .to_string(),
        };

        let data = fs::read(file_path).await.map_err(|e| {
            VigiError::UploadError(format!("cannot read {}: {e}", file_path.display()))
        })?;
        if data.len() > MAX_AUDIO_BYTES {
            return Err(VigiError::UploadError(format!(
                "{} is {} bytes, camera limit is {MAX_AUDIO_BYTES}",
                file_path.display(),
                data.len()
            )));
        }

        // Stage one: push the raw bytes to the staging endpoint.
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| VigiError::UploadError(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("filename", part);

        let reply: Value = self
            .http
            .post(&upload_url)
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VigiError::UploadError(format!("upload request failed: {e}")))?
            .json()
            .await
            .map_err(|e| VigiError::UploadError(format!("invalid upload reply: {e}")))?;
        check_error_code(&reply).map_err(upload_rejected)?;

        // Stage two: assign the staged file to its slot and display name.
        let payload = json!({
            "system": {
                "upload_usr_def_audio": { "id": slot_id, "name": display_name },
            },
            "method": "do",
        });
        self.send_request(payload).await.map_err(upload_rejected)?;

        log::info!("uploaded {} into slot {slot_id}", file_path.display());
        Ok(())
    }

    async fn sync_custom_audios(&self, files: &[PathBuf]) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let Some(&slot) = CUSTOM_AUDIO_SLOTS.get(index) else {
                outcomes.push(SyncOutcome {
                    file: file.clone(),
                    slot: None,
                    outcome: Err(VigiError::CapacityError(format!(
                        "no free slot for {}, camera has {} slots",
                        file.display(),
                        CUSTOM_AUDIO_SLOTS.len()
                    ))),
                });
                continue;
            };

            // One bad file must not block the rest of the batch.
            let outcome = self.upload_custom_audio(file, slot, None).await;
            if let Err(err) = &outcome {
                log::warn!("sync of {} into slot {slot} failed: {err}", file.display());
            }
            outcomes.push(SyncOutcome {
                file: file.clone(),
                slot: Some(slot),
                outcome,
            });
        }

        outcomes
    }

    async fn rename_custom_audio(&self, slot_id: u32, new_name: &str) -> Result<()> {
        validate_slot(slot_id)?;
        if new_name.is_empty() {
            return Err(VigiError::InvalidParameterError(
                "new name must not be empty".to_string(),
            ));
        }

        // id and name are parallel arrays even for a single entry.
        let payload = json!({
            "usr_def_audio_alarm": {
                "modify_audio": { "id": [slot_id], "name": [new_name] },
            },
            "method": "do",
        });
        self.send_request(payload).await?;
        Ok(())
    }

    async fn delete_custom_audio(&self, slot_id: u32) -> Result<()> {
        validate_slot(slot_id)?;

        let payload = json!({
            "usr_def_audio_alarm": {
                "delete_audio": { "id": [slot_id] },
            },
            "method": "do",
        });
        self.send_request(payload).await?;
        Ok(())
    }
}

/// The camera wraps each list entry under a dynamic `file_N` key and
/// percent-encodes display names.
pub(crate) fn parse_custom_audio_list(reply: &Value) -> Vec<CustomAudio> {
    let entries = reply
        .get("usr_def_audio_alarm")
        .and_then(|a| a.get("usr_def_audio"))
        .and_then(|l| l.as_array());

    let mut audios = Vec::new();
    let Some(entries) = entries else {
        return audios;
    };

    for wrapper in entries {
        let Some(info) = wrapper.as_object().and_then(|o| o.values().next()) else {
            continue;
        };
        let Some(id) = parse_slot_id(info.get("id")) else {
            continue;
        };
        let name = info
            .get("name")
            .and_then(|n| n.as_str())
            .map(|n| percent_decode_str(n).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        audios.push(CustomAudio { id, name });
    }

    audios
}

fn parse_slot_id(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn validate_slot(slot_id: u32) -> Result<()> {
    if !is_custom_audio_slot(slot_id) {
        return Err(VigiError::InvalidParameterError(format!(
            "slot ID must be one of {CUSTOM_AUDIO_SLOTS:?}, got {slot_id}"
        )));
    }
    Ok(())
}

fn upload_rejected(err: VigiError) -> VigiError {
    match err {
        VigiError::DeviceError(msg) => {
            VigiError::UploadError(format!("camera rejected upload: {msg}"))
        }
        other => other,
    }
}
