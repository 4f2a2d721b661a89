//! Client configuration. Every field has a default so a partial object (or
//! none at all) is accepted.

use serde::{Deserialize, Serialize};

use crate::constraints::{CaptureConstraints, FacingMode, Resolution};
use crate::error::{CamError, Result};
use crate::media::{DB_NAME, DB_VERSION};
use crate::recorder::DEFAULT_MIME_TYPE;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub downloads: DownloadConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_db_version")]
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub facing_mode: FacingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_video_filename")]
    pub video_filename: String,
    #[serde(default = "default_image_filename")]
    pub image_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,
}

fn default_db_name() -> String {
    DB_NAME.to_string()
}

fn default_db_version() -> u32 {
    DB_VERSION
}

fn default_width() -> u32 {
    Resolution::HD.width
}

fn default_height() -> u32 {
    Resolution::HD.height
}

fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

fn default_video_filename() -> String {
    "video.mp4".to_string()
}

fn default_image_filename() -> String {
    "image.png".to_string()
}

fn default_duration_ms() -> u32 {
    2000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: default_db_name(),
            version: default_db_version(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            facing_mode: FacingMode::default(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            mime_type: default_mime_type(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            video_filename: default_video_filename(),
            image_filename: default_image_filename(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json).map_err(|e| CamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(CamError::Config(format!(
                "capture size must be non-zero, got {}x{}",
                self.capture.width, self.capture.height
            )));
        }
        if self.database.version == 0 {
            return Err(CamError::Config("database version must be at least 1".to_string()));
        }
        if self.recording.mime_type.is_empty() {
            return Err(CamError::Config("recording mime_type is empty".to_string()));
        }
        Ok(())
    }

    /// Initial constraints of the capture session
    pub fn constraints(&self) -> CaptureConstraints {
        CaptureConstraints::new(
            Resolution {
                width: self.capture.width,
                height: self.capture.height,
            },
            self.capture.facing_mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.name, "myDataBase");
        assert_eq!(config.database.version, 1);
        assert_eq!(config.recording.mime_type, "video/mp4");
        assert_eq!(config.downloads.video_filename, "video.mp4");
        assert_eq!(config.downloads.image_filename, "image.png");
        assert_eq!(config.notifications.duration_ms, 2000);
        assert_eq!(config.constraints(), CaptureConstraints::default());
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_json(
            r#"{"capture": {"width": 1920, "facing_mode": "environment"}, "recording": {"mime_type": "video/webm"}}"#,
        )
        .unwrap();

        assert_eq!(config.capture.width, 1920);
        assert_eq!(config.capture.height, 720);
        assert_eq!(config.capture.facing_mode, FacingMode::Environment);
        assert_eq!(config.recording.mime_type, "video/webm");
        assert_eq!(config.constraints().resolution.to_string(), "1920x720");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(AppConfig::from_json("not json"), Err(CamError::Config(_))));
        assert!(matches!(
            AppConfig::from_json(r#"{"capture": {"height": 0}}"#),
            Err(CamError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"database": {"version": 0}}"#),
            Err(CamError::Config(_))
        ));
    }
}
