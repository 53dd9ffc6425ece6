use crate::constants::{G711_BYTES_PER_SECOND, MAX_AUDIO_BYTES};
use crate::error::{Result, VigiError};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;

/// Produces camera-compatible audio payloads from arbitrary input files by
/// delegating to an external `ffmpeg`: G.711 A-law, 8 kHz, mono.
pub struct AudioConverter {
    max_bytes: usize,
}

impl Default for AudioConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioConverter {
    pub fn new() -> Self {
        Self {
            max_bytes: MAX_AUDIO_BYTES,
        }
    }

    /// Override the output size cap (the camera rejects larger uploads).
    pub fn with_size_limit(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Transcode `input` and return the raw A-law payload.
    pub async fn convert(&self, input: &Path) -> Result<Vec<u8>> {
        if !fs::try_exists(input).await.unwrap_or(false) {
            return Err(VigiError::ConversionError(format!(
                "input file {} not found",
                input.display()
            )));
        }

        let output = Command::new("ffmpeg")
            .args(self.ffmpeg_args(input))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => VigiError::ConversionError(
                    "ffmpeg not found in PATH, install ffmpeg and try again".to_string(),
                ),
                _ => VigiError::ConversionError(format!("failed to run ffmpeg: {e}")),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VigiError::ConversionError(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let mut bytes = output.stdout;
        if bytes.len() > self.max_bytes {
            log::warn!("converted audio truncated to {} bytes", self.max_bytes);
            bytes.truncate(self.max_bytes);
        }
        Ok(bytes)
    }

    /// Transcode `input` and write the payload to a timestamped `.g711` file
    /// under `output_dir`.
    pub async fn convert_to_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let bytes = self.convert(input).await?;

        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let output_path = output_dir.join(format!("{stem}_{stamp}.g711"));

        fs::create_dir_all(output_dir).await?;
        fs::write(&output_path, &bytes).await?;

        log::info!(
            "converted {} to {} ({} bytes)",
            input.display(),
            output_path.display(),
            bytes.len()
        );
        Ok(output_path)
    }

    // -t bounds the duration so the payload fits the size cap; G.711 is one
    // byte per sample at 8 kHz.
    fn ffmpeg_args(&self, input: &Path) -> Vec<String> {
        let max_duration = self.max_bytes as f64 / G711_BYTES_PER_SECOND as f64;
        vec![
            "-hide_banner".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-t".to_string(),
            max_duration.to_string(),
            "-acodec".to_string(),
            "pcm_alaw".to_string(),
            "-ar".to_string(),
            "8000".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-f".to_string(),
            "alaw".to_string(),
            "-".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffmpeg_args_pin_the_camera_format() {
        let converter = AudioConverter::new();
        let args = converter.ffmpeg_args(Path::new("input.wav"));

        for expected in ["pcm_alaw", "8000", "alaw"] {
            assert!(args.iter().any(|a| a == expected), "missing {expected}");
        }
        // Mono, streamed to stdout.
        let ac = args.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(args[ac + 1], "1");
        assert_eq!(args.last().unwrap(), "-");
    }

    #[test]
    fn duration_bound_matches_size_cap() {
        let converter = AudioConverter::new();
        let args = converter.ffmpeg_args(Path::new("input.wav"));
        let t = args.iter().position(|a| a == "-t").unwrap();
        // 128 KiB at 8000 bytes per second.
        assert_eq!(args[t + 1], "16.384");

        let short = AudioConverter::new().with_size_limit(8000);
        let args = short.ffmpeg_args(Path::new("input.wav"));
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "1");
    }

    #[tokio::test]
    async fn missing_input_fails_before_running_the_tool() {
        let converter = AudioConverter::new();
        let err = converter
            .convert(Path::new("/nonexistent/audio.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, VigiError::ConversionError(_)));
    }
}
