use gloo_timers::callback::Timeout;
use procam_common::{CamError, Notice};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?.document().ok_or_else(|| JsValue::from_str("No document"))
}

pub fn get_element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("#{} not found", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{} has unexpected type", id)))
}

pub fn query_selector<T: JsCast>(document: &Document, selector: &str) -> Result<T, JsValue> {
    document
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("{} not found", selector)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("{} has unexpected type", selector)))
}

pub fn navigate(path: &str) {
    if let Err(e) = window().and_then(|w| w.location().assign(path)) {
        log::error!("Navigation to {} failed: {:?}", path, e);
    }
}

/// Transient toast, removed after `duration_ms`
pub fn show_toast(document: &Document, notice: &Notice, duration_ms: u32) {
    if notice.is_error() {
        log::warn!("{}", notice.message());
    } else {
        log::info!("{}", notice.message());
    }

    let (Some(body), Ok(toast)) = (document.body(), document.create_element("div")) else {
        return;
    };
    toast.set_class_name(notice.class_name());
    toast.set_text_content(Some(notice.message()));
    if body.append_child(&toast).is_ok() {
        Timeout::new(duration_ms, move || toast.remove()).forget();
    }
}

/// Name and message of a thrown JS value
fn describe(err: &JsValue) -> (String, String) {
    let field = |key: &str| {
        js_sys::Reflect::get(err, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_string())
    };
    let name = field("name").unwrap_or_default();
    let message = field("message")
        .filter(|m| !m.is_empty())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    (name, message)
}

fn classify_media(name: &str, message: String) -> CamError {
    match name {
        "NotAllowedError" | "SecurityError" => CamError::PermissionDenied(message),
        _ => CamError::DeviceUnavailable(message),
    }
}

/// Failure of a media-device call
pub fn media_error(err: JsValue) -> CamError {
    let (name, message) = describe(&err);
    classify_media(&name, message)
}

/// Failure of an IndexedDB call
pub fn storage_error(err: JsValue) -> CamError {
    let (name, message) = describe(&err);
    if name.is_empty() {
        CamError::Storage(message)
    } else {
        CamError::Storage(format!("{}: {}", name, message))
    }
}

pub fn snapshot_error(err: JsValue) -> CamError {
    CamError::Snapshot(describe(&err).1)
}

pub fn recorder_error(err: JsValue) -> CamError {
    CamError::RecordingStart(describe(&err).1)
}

/// Error value for `#[wasm_bindgen]` exports
pub fn to_js(err: CamError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_media() {
        assert!(matches!(
            classify_media("NotAllowedError", "denied".into()),
            CamError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_media("NotFoundError", "no camera".into()),
            CamError::DeviceUnavailable(_)
        ));
        assert!(matches!(
            classify_media("OverconstrainedError", "width".into()),
            CamError::DeviceUnavailable(_)
        ));
    }
}
