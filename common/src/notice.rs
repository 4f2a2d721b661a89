//! User-visible outcome messages.

use serde::Serialize;

use crate::error::CamError;
use crate::session::CaptureMode;

pub const PHOTO_CAPTURED: &str = "Photo captured successfully!";
pub const VIDEO_RECORDED: &str = "Video recorded successfully!";
pub const SETTINGS_UPDATED: &str = "Camera settings updated";
pub const SETTINGS_FAILED: &str = "Failed to update camera settings";
pub const DEVICES_UNAVAILABLE: &str = "Unable to access media devices";

/// Name used when a filter swatch carries no title
pub const DEFAULT_FILTER_TITLE: &str = "Filter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice::Success(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    /// CSS modifier of the toast element
    pub fn class_name(&self) -> &'static str {
        match self {
            Notice::Success(_) => "success-message",
            Notice::Error(_) => "error-message",
        }
    }

    pub fn filter_applied(title: Option<&str>) -> Self {
        let title = title.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_FILTER_TITLE);
        Notice::success(format!("{} applied", title))
    }

    pub fn mode_switched(mode: CaptureMode) -> Self {
        Notice::success(format!("Switched to {} mode", mode.display_name()))
    }
}

impl From<&CamError> for Notice {
    fn from(err: &CamError) -> Self {
        Notice::error(err.user_message())
    }
}

impl From<CamError> for Notice {
    fn from(err: CamError) -> Self {
        Notice::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notice_uses_user_message() {
        let notice = Notice::from(CamError::PermissionDenied("NotAllowedError".into()));
        assert!(notice.is_error());
        assert_eq!(notice.message(), "Camera access denied or not available");
        assert_eq!(notice.class_name(), "error-message");
    }

    #[test]
    fn test_formatted_notices() {
        assert_eq!(Notice::filter_applied(Some("Orange")).message(), "Orange applied");
        assert_eq!(Notice::filter_applied(Some("")).message(), "Filter applied");
        assert_eq!(Notice::filter_applied(None).message(), "Filter applied");
        assert_eq!(
            Notice::mode_switched(CaptureMode::Screen).message(),
            "Switched to Screen mode"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(Notice::success(PHOTO_CAPTURED)).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "success", "message": "Photo captured successfully!" }));
    }
}
