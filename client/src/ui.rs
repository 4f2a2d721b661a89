use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use gloo_timers::callback::Timeout;
use procam_common::device::{DeviceKind, DeviceList, SelectOption};
use procam_common::{CaptureMode, Filter, Notice};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, EventTarget, HtmlElement, HtmlOptionElement, HtmlSelectElement, HtmlVideoElement, MediaStream};

use crate::app::AppState;
use crate::utils::{get_element_by_id, navigate, query_selector, show_toast};

const CAPTURE_FLASH_MS: u32 = 500;

/// Handles to the camera page's elements
#[derive(Clone)]
pub struct UiController {
    document: Document,
    preview: HtmlVideoElement,
    capture_btn_cont: HtmlElement,
    capture_btn: HtmlElement,
    record_btn_cont: HtmlElement,
    record_btn: HtmlElement,
    timer: HtmlElement,
    filter_layer: HtmlElement,
    filters: Vec<HtmlElement>,
    gallery_btn: HtmlElement,
    settings_btn: HtmlElement,
    controls_panel: HtmlElement,
    close_controls: HtmlElement,
    camera_select: HtmlSelectElement,
    mic_select: HtmlSelectElement,
    resolution_select: HtmlSelectElement,
    mode_buttons: Vec<HtmlElement>,
}

fn all_elements(document: &Document, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

fn on_event(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Run `op` on the app state unless another action currently holds it
pub fn spawn_action<F>(app: &Rc<RefCell<AppState>>, action: &'static str, op: F)
where
    F: for<'a> FnOnce(&'a mut AppState) -> LocalBoxFuture<'a, ()> + 'static,
{
    let app = app.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let Ok(mut state) = app.try_borrow_mut() else {
            log::debug!("Ignoring {} while another action is running", action);
            return;
        };
        op(&mut state).await;
    });
}

impl UiController {
    pub fn new(document: Document) -> Result<Self, JsValue> {
        Ok(Self {
            preview: query_selector(&document, "video")?,
            capture_btn_cont: query_selector(&document, ".capture-btn-cont")?,
            capture_btn: query_selector(&document, ".capture-btn")?,
            record_btn_cont: query_selector(&document, ".record-btn-cont")?,
            record_btn: query_selector(&document, ".record-btn")?,
            timer: query_selector(&document, ".timer")?,
            filter_layer: query_selector(&document, ".filter-layer")?,
            filters: all_elements(&document, ".filter")?,
            gallery_btn: query_selector(&document, ".gallery")?,
            settings_btn: get_element_by_id(&document, "settingsBtn")?,
            controls_panel: get_element_by_id(&document, "controlsPanel")?,
            close_controls: get_element_by_id(&document, "closeControls")?,
            camera_select: get_element_by_id(&document, "cameraSelect")?,
            mic_select: get_element_by_id(&document, "micSelect")?,
            resolution_select: get_element_by_id(&document, "resolutionSelect")?,
            mode_buttons: all_elements(&document, ".mode-btn")?,
            document,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn preview(&self) -> &HtmlVideoElement {
        &self.preview
    }

    pub fn set_preview(&self, stream: Option<&MediaStream>) {
        self.preview.set_src_object(stream);
    }

    pub fn show_notice(&self, notice: &Notice, duration_ms: u32) {
        show_toast(&self.document, notice, duration_ms);
    }

    fn populate_select(select: &HtmlSelectElement, options: &[SelectOption]) -> Result<(), JsValue> {
        select.set_inner_html("");
        for option in options {
            let element = HtmlOptionElement::new_with_text_and_value(&option.label, &option.value)?;
            element.set_selected(option.selected);
            select.append_child(&element)?;
        }
        Ok(())
    }

    pub fn populate_devices(&self, devices: &DeviceList) {
        let selectors = [
            (&self.camera_select, DeviceKind::VideoInput),
            (&self.mic_select, DeviceKind::AudioInput),
        ];
        for (select, kind) in selectors {
            if let Err(e) = Self::populate_select(select, &devices.options(kind)) {
                log::error!("Failed to fill {:?} selector: {:?}", kind, e);
            }
        }
    }

    pub fn flash_capture(&self) {
        let _ = self.capture_btn.class_list().add_1("scale-capture");
        let button = self.capture_btn.clone();
        Timeout::new(CAPTURE_FLASH_MS, move || {
            let _ = button.class_list().remove_1("scale-capture");
        })
        .forget();
    }

    pub fn set_recording(&self, recording: bool) {
        let classes = self.record_btn.class_list();
        let _ = classes.toggle_with_force("scale-record", recording);
        let _ = classes.toggle_with_force("recording", recording);
    }

    pub fn timer_element(&self) -> HtmlElement {
        self.timer.clone()
    }

    pub fn show_timer(&self, text: &str) {
        self.timer.set_text_content(Some(text));
        let _ = self.timer.style().set_property("display", "block");
    }

    pub fn hide_timer(&self, text: &str) {
        self.timer.set_text_content(Some(text));
        let _ = self.timer.style().set_property("display", "none");
    }

    pub fn show_filter(&self, filter: Filter, selected: &HtmlElement) {
        for element in &self.filters {
            let _ = element.class_list().remove_1("active");
        }
        let _ = selected.class_list().add_1("active");
        let _ = self
            .filter_layer
            .style()
            .set_property("background-color", filter.css_color());
    }

    pub fn show_mode(&self, selected: &HtmlElement) {
        for button in &self.mode_buttons {
            let _ = button.class_list().remove_1("active");
        }
        let _ = selected.class_list().add_1("active");
    }

    fn set_panel_open(&self, open: bool) {
        let _ = self.controls_panel.class_list().toggle_with_force("active", open);
    }

    pub fn register_event_listeners(&self, app: Rc<RefCell<AppState>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            on_event(&self.capture_btn_cont, "click", move |_| {
                spawn_action(&app, "photo capture", |state| state.capture_photo().boxed_local());
            })?;
        }

        {
            let app = app.clone();
            on_event(&self.record_btn_cont, "click", move |_| {
                spawn_action(&app, "record toggle", |state| state.toggle_recording().boxed_local());
            })?;
        }

        on_event(&self.gallery_btn, "click", |_| navigate("./gallery.html"))?;

        {
            let ui = self.clone();
            on_event(&self.settings_btn, "click", move |_| ui.set_panel_open(true))?;
        }
        {
            let ui = self.clone();
            on_event(&self.close_controls, "click", move |_| ui.set_panel_open(false))?;
        }
        {
            let ui = self.clone();
            on_event(&self.controls_panel, "click", move |event| {
                let on_backdrop = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlElement>().ok())
                    .is_some_and(|t| t == ui.controls_panel);
                if on_backdrop {
                    ui.set_panel_open(false);
                }
            })?;
        }

        {
            let app = app.clone();
            let select = self.camera_select.clone();
            on_event(&self.camera_select, "change", move |_| {
                let device_id = select.value();
                spawn_action(&app, "camera switch", move |state| {
                    state.switch_camera(device_id).boxed_local()
                });
            })?;
        }
        {
            let app = app.clone();
            let select = self.mic_select.clone();
            on_event(&self.mic_select, "change", move |_| {
                let device_id = select.value();
                spawn_action(&app, "microphone switch", move |state| {
                    state.switch_microphone(device_id).boxed_local()
                });
            })?;
        }
        {
            let app = app.clone();
            let select = self.resolution_select.clone();
            on_event(&self.resolution_select, "change", move |_| {
                let resolution = select.value();
                spawn_action(&app, "resolution change", move |state| {
                    state.change_resolution(resolution).boxed_local()
                });
            })?;
        }

        for button in &self.mode_buttons {
            let mode = match button.get_attribute("data-mode").map(|m| m.parse::<CaptureMode>()) {
                Some(Ok(mode)) => mode,
                Some(Err(e)) => {
                    log::warn!("Skipping mode button: {}", e);
                    continue;
                }
                None => continue,
            };
            let app = app.clone();
            let selected = button.clone();
            on_event(button, "click", move |_| match app.try_borrow_mut() {
                Ok(mut state) => state.set_mode(mode, &selected),
                Err(_) => log::debug!("Ignoring mode switch while another action is running"),
            })?;
        }

        for element in &self.filters {
            let filter = Filter::from_class_list(&element.class_name());
            let app = app.clone();
            let selected = element.clone();
            on_event(element, "click", move |_| match app.try_borrow_mut() {
                Ok(mut state) => state.apply_filter(filter, &selected),
                Err(_) => log::debug!("Ignoring filter change while another action is running"),
            })?;
        }

        log::info!("Camera page listeners registered");
        Ok(())
    }
}
