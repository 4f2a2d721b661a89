//! Capture parameters handed to the platform's media acquisition calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = CamError;

    /// Parse selector values such as `1920x1080`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CamError::InvalidResolution(s.to_string());
        let (w, h) = s.trim().split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.parse().map_err(|_| invalid())?;
        let height: u32 = h.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Resolution { width, height })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera
    #[default]
    User,
    /// Back camera
    Environment,
}

/// Audio part of the request: any microphone, or one exact device
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AudioSource {
    #[default]
    Default,
    Device(String),
}

/// Current camera constraints of a capture session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureConstraints {
    pub resolution: Resolution,
    pub facing_mode: FacingMode,
    pub video_device: Option<String>,
    pub audio: AudioSource,
}

impl CaptureConstraints {
    pub fn new(resolution: Resolution, facing_mode: FacingMode) -> Self {
        Self {
            resolution,
            facing_mode,
            ..Default::default()
        }
    }

    /// Request body for the user-media call
    pub fn to_request(&self) -> MediaRequest {
        MediaRequest {
            video: VideoRequest {
                width: Ideal {
                    ideal: self.resolution.width,
                },
                height: Ideal {
                    ideal: self.resolution.height,
                },
                facing_mode: self.facing_mode,
                device_id: self.video_device.clone().map(|exact| Exact { exact }),
            },
            audio: match &self.audio {
                AudioSource::Default => AudioRequest::Enabled(true),
                AudioSource::Device(id) => AudioRequest::Device {
                    device_id: Exact { exact: id.clone() },
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ideal<T> {
    pub ideal: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exact {
    pub exact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub width: Ideal<u32>,
    pub height: Ideal<u32>,
    pub facing_mode: FacingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Exact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AudioRequest {
    Enabled(bool),
    Device {
        #[serde(rename = "deviceId")]
        device_id: Exact,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRequest {
    pub video: VideoRequest,
    pub audio: AudioRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayVideoRequest {
    pub media_source: &'static str,
}

/// Request body for the display-media (screen share) call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRequest {
    pub video: DisplayVideoRequest,
    pub audio: bool,
}

impl Default for DisplayRequest {
    fn default() -> Self {
        Self {
            video: DisplayVideoRequest {
                media_source: "screen",
            },
            audio: true,
        }
    }
}
