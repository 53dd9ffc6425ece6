use crate::constants::{MAX_VOLUME, MIN_VOLUME, is_known_sound_id};
use crate::error::{Result, VigiError};
use crate::vigi::VigiCam;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::Ordering;
use strum_macros::AsRefStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AlarmAction {
    Start,
    Stop,
}

#[async_trait]
pub trait Alarm: Send + Sync {
    /// Trigger or stop the sound and light alarm
    async fn trigger_manual_alarm(
        &self,
        action: AlarmAction,
        sound_id: Option<u32>,
        volume: Option<u8>,
    ) -> Result<()>;

    /// Play a sound once through the speaker
    async fn test_audio_alarm(&self, sound_id: u32) -> Result<()>;

    /// Set the speaker volume
    async fn set_volume(&self, volume: u8) -> Result<()>;

    /// Select the sound the alarm plays
    async fn set_alarm_sound_type(&self, sound_id: u32) -> Result<()>;
}

#[async_trait]
impl Alarm for VigiCam {
    async fn trigger_manual_alarm(
        &self,
        action: AlarmAction,
        sound_id: Option<u32>,
        volume: Option<u8>,
    ) -> Result<()> {
        if action == AlarmAction::Start {
            let sound_id = sound_id.ok_or_else(|| {
                VigiError::InvalidParameterError(
                    "starting the alarm requires a sound ID".to_string(),
                )
            })?;
            let volume = volume.ok_or_else(|| {
                VigiError::InvalidParameterError("starting the alarm requires a volume".to_string())
            })?;
            validate_volume(volume)?;
            validate_sound_id(sound_id)?;

            self.prime_alarm_settings().await?;
            self.set_volume(volume).await?;
            self.set_alarm_sound_type(sound_id).await?;
        } else {
            self.prime_alarm_settings().await?;
        }

        let payload = json!({
            "msg_alarm": {
                "manual_msg_alarm": { "action": action.as_ref() },
            },
            "method": "do",
        });
        self.send_request(payload).await?;

        log::info!("manual alarm {}", action.as_ref());
        Ok(())
    }

    async fn test_audio_alarm(&self, sound_id: u32) -> Result<()> {
        validate_sound_id(sound_id)?;

        let payload = json!({
            "usr_def_audio_alarm": {
                "test_audio": { "id": sound_id },
            },
            "method": "do",
        });
        self.send_request(payload).await?;
        Ok(())
    }

    async fn set_volume(&self, volume: u8) -> Result<()> {
        validate_volume(volume)?;

        // The API wants numeric settings as strings.
        let payload = json!({
            "audio_config": {
                "speaker": { "system_volume": volume.to_string() },
            },
            "method": "set",
        });
        self.send_request(payload).await?;
        Ok(())
    }

    async fn set_alarm_sound_type(&self, sound_id: u32) -> Result<()> {
        validate_sound_id(sound_id)?;

        let payload = json!({
            "msg_alarm": {
                "chn1_msg_alarm_info": { "alarm_type": sound_id.to_string() },
            },
            "method": "set",
        });
        self.send_request(payload).await?;
        Ok(())
    }
}

impl VigiCam {
    /// Disable the camera's automatic sound/light alarms and unmute the
    /// speaker; the firmware requires this once before manual alarm
    /// commands are accepted.
    pub(crate) async fn prime_alarm_settings(&self) -> Result<()> {
        if self.alarm_primed.load(Ordering::Acquire) {
            return Ok(());
        }

        let payload = json!({
            "msg_alarm": {
                "chn1_msg_alarm_info": {
                    "sound_alarm_enabled": "off",
                    "light_alarm_enabled": "off",
                    "alarm_type": "1",
                },
            },
            "audio_config": {
                "speaker": { "mute": "off", "system_volume": "10" },
            },
            "method": "set",
        });
        self.send_request(payload).await?;

        self.alarm_primed.store(true, Ordering::Release);
        Ok(())
    }
}

fn validate_volume(volume: u8) -> Result<()> {
    if !(MIN_VOLUME..=MAX_VOLUME).contains(&volume) {
        return Err(VigiError::InvalidParameterError(format!(
            "volume must be between {MIN_VOLUME} and {MAX_VOLUME}, got {volume}"
        )));
    }
    Ok(())
}

fn validate_sound_id(sound_id: u32) -> Result<()> {
    if !is_known_sound_id(sound_id) {
        return Err(VigiError::InvalidParameterError(format!(
            "unknown sound ID {sound_id}"
        )));
    }
    Ok(())
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
    fn alarm_action_wire_strings() {
        assert_eq!(AlarmAction::Start.as_ref(), "start");
        assert_eq!(AlarmAction::Stop.as_ref(), "stop");
    }

    #[tokio::test]
    async fn start_rejects_out_of_range_volume() {
        let cam = offline_cam();
        for volume in [0u8, 101, 255] {
            let err = cam
                .trigger_manual_alarm(AlarmAction::Start, Some(1), Some(volume))
                .await
                .unwrap_err();
            assert!(
                matches!(err, VigiError::InvalidParameterError(_)),
                "volume {volume} should be rejected before any request"
            );
        }
    }

    #[tokio::test]
    async fn start_requires_sound_and_volume() {
        let cam = offline_cam();

        let err = cam
            .trigger_manual_alarm(AlarmAction::Start, None, Some(30))
            .await
            .unwrap_err();
        assert!(matches!(err, VigiError::InvalidParameterError(_)));

        let err = cam
            .trigger_manual_alarm(AlarmAction::Start, Some(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, VigiError::InvalidParameterError(_)));
    }

    #[tokio::test]
    async fn start_rejects_unknown_sound() {
        let cam = offline_cam();
        let err = cam
            .trigger_manual_alarm(AlarmAction::Start, Some(42), Some(30))
            .await
            .unwrap_err();
        assert!(matches!(err, VigiError::InvalidParameterError(_)));
    }

    #[tokio::test]
    async fn alarm_calls_are_session_gated() {
        let cam = offline_cam();

        let err = cam
            .trigger_manual_alarm(AlarmAction::Stop, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, VigiError::AuthenticationError(_)));

        let err = cam
            .trigger_manual_alarm(AlarmAction::Start, Some(1), Some(30))
            .await
            .unwrap_err();
        assert!(matches!(err, VigiError::AuthenticationError(_)));

        let err = cam.test_audio_alarm(101).await.unwrap_err();
        assert!(matches!(err, VigiError::AuthenticationError(_)));

        let err = cam.set_volume(30).await.unwrap_err();
        assert!(matches!(err, VigiError::AuthenticationError(_)));
    }
}
