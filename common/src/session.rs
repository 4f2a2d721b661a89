//! Capture session: owns the live camera stream and the screen stream used
//! while recording, and re-acquires under new constraints.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constraints::{AudioSource, CaptureConstraints, DisplayRequest, Resolution};
use crate::device::{DeviceInfo, DeviceList};
use crate::error::{CamError, Result};

/// What a recording captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Camera,
    Screen,
    /// Camera composited over screen. Not implemented: records the screen only.
    Both,
}

impl CaptureMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            CaptureMode::Camera => "Camera",
            CaptureMode::Screen => "Screen",
            CaptureMode::Both => "Both",
        }
    }
}

impl FromStr for CaptureMode {
    type Err = CamError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "camera" => Ok(CaptureMode::Camera),
            "screen" => Ok(CaptureMode::Screen),
            "both" => Ok(CaptureMode::Both),
            other => Err(CamError::Config(format!("unknown capture mode: {}", other))),
        }
    }
}

/// Platform media API: device listing and stream acquisition
#[allow(async_fn_in_trait)]
pub trait MediaBackend {
    type Stream: Clone;

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>>;

    async fn user_media(&self, constraints: &CaptureConstraints) -> Result<Self::Stream>;

    async fn display_media(&self, request: &DisplayRequest) -> Result<Self::Stream>;

    /// Stop every track of `stream`
    fn stop_stream(&self, stream: &Self::Stream);
}

/// Stream to record, plus a notice for the user when the mode is degraded
#[derive(Debug, Clone)]
pub struct RecordingSource<S> {
    pub stream: S,
    pub notice: Option<&'static str>,
}

pub const BOTH_MODE_NOTICE: &str = "Recording screen (camera overlay not implemented in this demo)";

pub struct CaptureSession<B: MediaBackend> {
    backend: B,
    constraints: CaptureConstraints,
    mode: CaptureMode,
    devices: DeviceList,
    camera_stream: Option<B::Stream>,
    screen_stream: Option<B::Stream>,
    recording: bool,
}

impl<B: MediaBackend> CaptureSession<B> {
    pub fn new(backend: B, constraints: CaptureConstraints) -> Self {
        Self {
            backend,
            constraints,
            mode: CaptureMode::default(),
            devices: DeviceList::default(),
            camera_stream: None,
            screen_stream: None,
            recording: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn constraints(&self) -> &CaptureConstraints {
        &self.constraints
    }

    pub fn devices(&self) -> &DeviceList {
        &self.devices
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        log::info!("Capture mode set to {:?}", mode);
        self.mode = mode;
    }

    /// Live camera stream, if acquired
    pub fn camera_stream(&self) -> Option<&B::Stream> {
        self.camera_stream.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.camera_stream.is_some()
    }

    /// True between `recording_source` and `end_recording`
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.recording {
            return Err(CamError::RecordingActive);
        }
        Ok(())
    }

    pub async fn refresh_devices(&mut self) -> Result<&DeviceList> {
        let devices = self.backend.enumerate_devices().await?;
        self.devices = DeviceList::from_devices(devices);
        log::debug!(
            "Found {} cameras, {} microphones",
            self.devices.cameras.len(),
            self.devices.microphones.len()
        );
        Ok(&self.devices)
    }

    /// Tear down the current camera stream (if any) and acquire a new one
    /// with the current constraints. On failure the session has no stream.
    /// Refused while recording, since the recorder holds the camera stream.
    pub async fn acquire(&mut self) -> Result<&B::Stream> {
        self.ensure_idle()?;
        self.release();
        match self.backend.user_media(&self.constraints).await {
            Ok(stream) => Ok(&*self.camera_stream.insert(stream)),
            Err(e) => {
                log::error!("Error accessing camera: {}", e);
                Err(e)
            }
        }
    }

    /// Stop the camera stream's tracks
    pub fn release(&mut self) {
        if let Some(stream) = self.camera_stream.take() {
            self.backend.stop_stream(&stream);
        }
    }

    pub async fn switch_camera(&mut self, device_id: &str) -> Result<()> {
        if device_id.is_empty() {
            return Ok(());
        }
        self.ensure_idle()?;
        self.constraints.video_device = Some(device_id.to_string());
        self.acquire().await.map(|_| ())
    }

    pub async fn switch_microphone(&mut self, device_id: &str) -> Result<()> {
        if device_id.is_empty() {
            return Ok(());
        }
        self.ensure_idle()?;
        self.constraints.audio = AudioSource::Device(device_id.to_string());
        self.acquire().await.map(|_| ())
    }

    /// Apply a `WIDTHxHEIGHT` selector value; a bad value leaves the session untouched
    pub async fn change_resolution(&mut self, resolution: &str) -> Result<()> {
        self.ensure_idle()?;
        let resolution: Resolution = resolution.parse()?;
        self.constraints.resolution = resolution;
        self.acquire().await.map(|_| ())
    }

    /// Stream to hand to the recorder for the current mode. Locks the
    /// constraints until `end_recording`.
    pub async fn recording_source(&mut self) -> Result<RecordingSource<B::Stream>> {
        let source = match self.mode {
            CaptureMode::Camera => RecordingSource {
                stream: self.camera_stream.clone().ok_or(CamError::NoStream)?,
                notice: None,
            },
            CaptureMode::Screen => RecordingSource {
                stream: self.acquire_screen().await?,
                notice: None,
            },
            CaptureMode::Both => RecordingSource {
                stream: self.acquire_screen().await?,
                notice: Some(BOTH_MODE_NOTICE),
            },
        };
        self.recording = true;
        Ok(source)
    }

    async fn acquire_screen(&mut self) -> Result<B::Stream> {
        self.release_screen();
        let stream = self
            .backend
            .display_media(&DisplayRequest::default())
            .await
            .map_err(|e| CamError::RecordingStart(e.to_string()))?;
        self.screen_stream = Some(stream.clone());
        Ok(stream)
    }

    /// Unlock the constraints and stop the screen stream once a recording
    /// ends or fails to start
    pub fn end_recording(&mut self) {
        self.recording = false;
        self.release_screen();
    }

    fn release_screen(&mut self) {
        if let Some(stream) = self.screen_stream.take() {
            self.backend.stop_stream(&stream);
        }
    }
}

impl<B: MediaBackend> Drop for CaptureSession<B> {
    fn drop(&mut self) {
        self.release_screen();
        self.release();
    }
}
