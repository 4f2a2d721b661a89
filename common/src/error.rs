//! Error types shared by the camera core and its browser bindings.

use thiserror::Error;

/// Errors that can occur while capturing, recording or storing media
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CamError {
    /// Capture device missing or unusable
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// User or platform refused access to a device
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No usable media storage on this platform
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A storage request failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record does not exist in its collection
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Identifier without a known kind prefix
    #[error("Invalid media id: {0}")]
    InvalidId(String),

    /// Resolution string not of the form `WIDTHxHEIGHT`
    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    /// Recording source could not be acquired or the recorder refused to start
    #[error("Failed to start recording: {0}")]
    RecordingStart(String),

    #[error("Recorder is already recording")]
    AlreadyRecording,

    #[error("Recorder is not recording")]
    NotRecording,

    /// Capture constraints are locked while a recording uses the stream
    #[error("Capture settings cannot change while recording")]
    RecordingActive,

    /// Operation needs a live stream and there is none
    #[error("No active stream")]
    NoStream,

    /// Frame could not be rasterized or encoded
    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CamError {
    /// Text shown to the user in a transient notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            CamError::DeviceUnavailable(_) | CamError::PermissionDenied(_) => {
                "Camera access denied or not available"
            }
            CamError::StorageUnavailable(_) => "Media storage is not available",
            CamError::Storage(_) | CamError::NotFound(_) | CamError::InvalidId(_) => {
                "Could not access saved media"
            }
            CamError::InvalidResolution(_) => "Unsupported resolution",
            CamError::RecordingStart(_) => "Failed to start recording. Screen sharing may not be supported.",
            CamError::AlreadyRecording => "A recording is already in progress",
            CamError::RecordingActive => "Stop recording before changing camera settings",
            CamError::NotRecording => "No recording in progress",
            CamError::NoStream => "Camera is not ready",
            CamError::Snapshot(_) | CamError::InvalidDataUri(_) => "Failed to capture photo",
            CamError::Config(_) => "Invalid configuration",
        }
    }
}

/// Result type for camera operations
pub type Result<T> = std::result::Result<T, CamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = CamError::InvalidId("abc".to_string());
        assert_eq!(err.to_string(), "Invalid media id: abc");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CamError::PermissionDenied("NotAllowedError".into()).user_message(),
            "Camera access denied or not available"
        );
        assert_eq!(
            CamError::RecordingStart("no display media".into()).user_message(),
            "Failed to start recording. Screen sharing may not be supported."
        );
        assert_eq!(
            CamError::AlreadyRecording.user_message(),
            "A recording is already in progress"
        );
        assert_ne!(
            CamError::AlreadyRecording.user_message(),
            CamError::RecordingStart(String::new()).user_message()
        );
    }
}
