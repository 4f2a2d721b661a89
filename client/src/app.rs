use std::cell::RefCell;
use std::rc::Rc;

use futures::future::FutureExt;
use gloo_timers::callback::Interval;
use procam_common::notice::{DEVICES_UNAVAILABLE, PHOTO_CAPTURED, SETTINGS_FAILED, SETTINGS_UPDATED, VIDEO_RECORDED};
use procam_common::timer::RecordingTimer;
use procam_common::{snapshot, AppConfig, CamError, CaptureMode, CaptureSession, Filter, Notice, Result, StorageManager};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::media_recorder::Recorder;
use crate::media_streams::WebMediaBackend;
use crate::snapshot::CanvasCapture;
use crate::storage::{open_storage, IdbStore};
use crate::ui::{spawn_action, UiController};
use crate::utils::{document, now_ms, to_js};

pub struct AppState {
    config: AppConfig,
    ui: UiController,
    storage: StorageManager<IdbStore>,
    session: CaptureSession<WebMediaBackend>,
    capture: CanvasCapture,
    filter: Filter,
    recorder: Option<Recorder>,
    timer: Rc<RefCell<RecordingTimer>>,
    timer_handle: Option<Interval>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> std::result::Result<Rc<RefCell<Self>>, JsValue> {
        let document = document()?;
        let ui = UiController::new(document.clone())?;
        let capture = CanvasCapture::new(document, ui.preview().clone());
        let storage = open_storage(&config.database).await;
        let backend = WebMediaBackend::new().map_err(to_js)?;
        let session = CaptureSession::new(backend, config.constraints());

        Ok(Rc::new(RefCell::new(Self {
            config,
            ui,
            storage,
            session,
            capture,
            filter: Filter::default(),
            recorder: None,
            timer: Rc::new(RefCell::new(RecordingTimer::new())),
            timer_handle: None,
        })))
    }

    pub fn ui(&self) -> &UiController {
        &self.ui
    }

    fn notify(&self, notice: Notice) {
        self.ui.show_notice(&notice, self.config.notifications.duration_ms);
    }

    fn notify_error(&self, err: &CamError) {
        log::error!("{}", err);
        self.notify(Notice::from(err));
    }

    /// List devices, then start the preview
    pub async fn initialize(&mut self) {
        self.refresh_devices().await;
        if let Err(e) = self.attach_camera().await {
            self.notify_error(&e);
        }
    }

    pub async fn refresh_devices(&mut self) {
        match self.session.refresh_devices().await {
            Ok(devices) => self.ui.populate_devices(devices),
            Err(e) => {
                log::error!("Error enumerating devices: {}", e);
                self.notify(Notice::error(DEVICES_UNAVAILABLE));
            }
        }
    }

    async fn attach_camera(&mut self) -> Result<()> {
        let result = self.session.acquire().await.map(|stream| self.ui.set_preview(Some(stream)));
        if result.is_err() {
            self.ui.set_preview(None);
        }
        result
    }

    /// Apply a constraint change that already re-acquired the camera
    fn settings_changed(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                self.ui.set_preview(self.session.camera_stream());
                self.notify(Notice::success(SETTINGS_UPDATED));
            }
            Err(e @ CamError::RecordingActive) => self.notify_error(&e),
            Err(e) => {
                log::error!("Error reinitializing camera: {}", e);
                self.ui.set_preview(self.session.camera_stream());
                self.notify(Notice::error(SETTINGS_FAILED));
            }
        }
    }

    pub async fn switch_camera(&mut self, device_id: String) {
        if device_id.is_empty() {
            return;
        }
        let result = self.session.switch_camera(&device_id).await;
        self.settings_changed(result);
    }

    pub async fn switch_microphone(&mut self, device_id: String) {
        if device_id.is_empty() {
            return;
        }
        let result = self.session.switch_microphone(&device_id).await;
        self.settings_changed(result);
    }

    pub async fn change_resolution(&mut self, resolution: String) {
        let result = self.session.change_resolution(&resolution).await;
        self.settings_changed(result);
    }

    pub fn set_mode(&mut self, mode: CaptureMode, button: &HtmlElement) {
        self.session.set_mode(mode);
        self.ui.show_mode(button);
        self.notify(Notice::mode_switched(mode));
    }

    pub fn apply_filter(&mut self, filter: Filter, swatch: &HtmlElement) {
        self.filter = filter;
        self.ui.show_filter(filter, swatch);
        let title = swatch.get_attribute("title");
        self.notify(Notice::filter_applied(title.as_deref()));
    }

    pub async fn capture_photo(&mut self) {
        self.ui.flash_capture();
        let result = match snapshot::capture(&self.capture, self.filter) {
            Ok(url) => self.storage.save_image(url, now_ms() as i64).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => self.notify(Notice::success(PHOTO_CAPTURED)),
            Err(e) => self.notify_error(&e),
        }
    }

    pub async fn toggle_recording(&mut self) {
        if self.recorder.is_some() {
            self.stop_recording().await;
        } else {
            self.start_recording().await;
        }
    }

    async fn start_recording(&mut self) {
        if let Err(e) = self.try_start_recording().await {
            self.session.end_recording();
            self.notify_error(&e);
        }
    }

    async fn try_start_recording(&mut self) -> Result<()> {
        let source = self.session.recording_source().await?;
        if let Some(notice) = source.notice {
            self.notify(Notice::success(notice));
        }

        let recorder = Recorder::new(&source.stream, &self.config.recording.mime_type)?;
        recorder.start()?;
        self.recorder = Some(recorder);

        self.ui.set_recording(true);
        self.start_timer();
        Ok(())
    }

    fn start_timer(&mut self) {
        let text = self.timer.borrow_mut().reset();
        self.ui.show_timer(&text);

        let timer = self.timer.clone();
        let element = self.ui.timer_element();
        self.timer_handle = Some(Interval::new(1000, move || {
            let text = timer.borrow_mut().tick();
            element.set_text_content(Some(&text));
        }));
    }

    fn stop_timer(&mut self) {
        self.timer_handle = None;
        let text = self.timer.borrow_mut().reset();
        self.ui.hide_timer(&text);
    }

    async fn stop_recording(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let finished = recorder.stop().await;
        self.session.end_recording();
        self.ui.set_recording(false);
        self.stop_timer();

        let result = match finished {
            Ok(recording) => {
                log::info!(
                    "Recorded {:.1}s in {} chunks",
                    recording.duration_ms / 1000.0,
                    recording.chunk_count
                );
                self.storage.save_video(recording.media, now_ms() as i64).await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => self.notify(Notice::success(VIDEO_RECORDED)),
            Err(e) => self.notify_error(&e),
        }
    }
}

/// Re-enumerate devices whenever the platform reports a change
pub fn watch_devices(app: &Rc<RefCell<AppState>>) {
    let handle = app.clone();
    app.borrow().session.backend().on_device_change(move || {
        spawn_action(&handle, "device refresh", |state| state.refresh_devices().boxed_local());
    });
}
