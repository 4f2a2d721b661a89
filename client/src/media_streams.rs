use procam_common::constraints::{CaptureConstraints, DisplayRequest};
use procam_common::device::{DeviceInfo, DeviceKind};
use procam_common::{CamError, MediaBackend, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    DisplayMediaStreamConstraints, MediaDeviceInfo, MediaDeviceKind, MediaDevices, MediaStream, MediaStreamConstraints,
    MediaStreamTrack,
};

use crate::utils::media_error;

/// `navigator.mediaDevices` behind the capture session
pub struct WebMediaBackend {
    devices: MediaDevices,
}

impl WebMediaBackend {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| CamError::DeviceUnavailable("no window".to_string()))?;
        let devices = window.navigator().media_devices().map_err(media_error)?;
        Ok(Self { devices })
    }

    /// Call `callback` whenever a device is plugged in or removed
    pub fn on_device_change(&self, callback: impl FnMut() + 'static) {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        self.devices.set_ondevicechange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }
}

fn device_info(info: MediaDeviceInfo) -> Option<DeviceInfo> {
    let kind = match info.kind() {
        MediaDeviceKind::Videoinput => DeviceKind::VideoInput,
        MediaDeviceKind::Audioinput => DeviceKind::AudioInput,
        MediaDeviceKind::Audiooutput => DeviceKind::AudioOutput,
        _ => return None,
    };
    Some(DeviceInfo {
        device_id: info.device_id(),
        kind,
        label: info.label(),
    })
}

fn to_constraints<T: serde::Serialize, C: JsCast>(request: &T) -> Result<C> {
    serde_wasm_bindgen::to_value(request)
        .map(|value| value.unchecked_into::<C>())
        .map_err(|e| CamError::DeviceUnavailable(e.to_string()))
}

impl MediaBackend for WebMediaBackend {
    type Stream = MediaStream;

    async fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>> {
        let promise = self.devices.enumerate_devices().map_err(media_error)?;
        let list: js_sys::Array = JsFuture::from(promise)
            .await
            .map_err(media_error)?
            .dyn_into()
            .map_err(media_error)?;

        Ok(list
            .iter()
            .filter_map(|value| value.dyn_into::<MediaDeviceInfo>().ok())
            .filter_map(device_info)
            .collect())
    }

    async fn user_media(&self, constraints: &CaptureConstraints) -> Result<MediaStream> {
        let constraints: MediaStreamConstraints = to_constraints(&constraints.to_request())?;
        let promise = self
            .devices
            .get_user_media_with_constraints(&constraints)
            .map_err(media_error)?;
        let stream = JsFuture::from(promise).await.map_err(media_error)?;
        Ok(MediaStream::from(stream))
    }

    async fn display_media(&self, request: &DisplayRequest) -> Result<MediaStream> {
        let constraints: DisplayMediaStreamConstraints = to_constraints(request)?;
        let promise = self
            .devices
            .get_display_media_with_constraints(&constraints)
            .map_err(media_error)?;
        let stream = JsFuture::from(promise).await.map_err(media_error)?;
        Ok(MediaStream::from(stream))
    }

    fn stop_stream(&self, stream: &MediaStream) {
        let tracks = stream.get_tracks();
        for i in 0..tracks.length() {
            let track = MediaStreamTrack::from(tracks.get(i));
            track.stop();
        }
    }
}
