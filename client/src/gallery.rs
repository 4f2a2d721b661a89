//! Gallery page: DOM rendering of stored media, delete and download.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use procam_common::gallery::{Download, DownloadPayload, GalleryController, GalleryView};
use procam_common::{AppConfig, MediaId, MediaRecord, Notice};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, Document, Element, HtmlAnchorElement, HtmlElement};

use crate::storage::{open_storage, IdbStore};
use crate::utils::{get_element_by_id, navigate, query_selector, show_toast};

const REVOKE_DELAY_MS: i32 = 1000;

pub type Gallery = GalleryController<IdbStore, DomGalleryView>;

pub struct DomGalleryView {
    document: Document,
    container: HtmlElement,
    empty_message: HtmlElement,
    object_urls: HashMap<MediaId, String>,
}

impl DomGalleryView {
    pub fn new(document: Document) -> Result<Self, JsValue> {
        Ok(Self {
            container: query_selector(&document, ".gallery-cont")?,
            empty_message: get_element_by_id(&document, "emptyGalleryMessage")?,
            document,
            object_urls: HashMap::new(),
        })
    }

    fn media_element(&mut self, record: &MediaRecord<Blob>) -> Result<Element, JsValue> {
        match record {
            MediaRecord::Video(video) => {
                let url = web_sys::Url::create_object_url_with_blob(&video.blob_data)?;
                let element = self.document.create_element("video")?;
                element.set_attribute("autoplay", "")?;
                element.set_attribute("loop", "")?;
                element.set_attribute("src", &url)?;
                self.object_urls.insert(video.id.clone(), url);
                Ok(element)
            }
            MediaRecord::Image(image) => {
                let element = self.document.create_element("img")?;
                element.set_attribute("src", &image.url)?;
                element.set_attribute("alt", "Captured image")?;
                Ok(element)
            }
        }
    }

    fn build_entry(&mut self, record: &MediaRecord<Blob>) -> Result<(), JsValue> {
        let entry = self.document.create_element("div")?;
        entry.set_class_name("media-cont");
        entry.set_id(&record.id().to_key());

        let frame = self.document.create_element("div")?;
        frame.set_class_name("media");
        let media: Element = self.media_element(record)?;
        frame.append_child(&media)?;
        entry.append_child(&frame)?;

        for (class, label) in [("delete action-btn", "DELETE"), ("download action-btn", "DOWNLOAD")] {
            let button = self.document.create_element("div")?;
            button.set_class_name(class);
            button.set_text_content(Some(label));
            entry.append_child(&button)?;
        }

        self.container.append_child(&entry)?;
        Ok(())
    }

    fn revoke(&mut self, id: &MediaId) {
        if let Some(url) = self.object_urls.remove(id) {
            let _ = web_sys::Url::revoke_object_url(&url);
        }
    }
}

impl GalleryView<Blob> for DomGalleryView {
    fn render_entry(&mut self, record: &MediaRecord<Blob>) {
        if let Err(e) = self.build_entry(record) {
            log::error!("Failed to render {}: {:?}", record.id(), e);
            self.revoke(record.id());
        }
    }

    fn remove_entry(&mut self, id: &MediaId) {
        if let Some(element) = self.document.get_element_by_id(&id.to_key()) {
            element.remove();
        }
        self.revoke(id);
    }

    fn set_empty_state(&mut self, visible: bool) {
        let display = if visible { "flex" } else { "none" };
        let _ = self.empty_message.style().set_property("display", display);
    }
}

/// Save a download through a temporary anchor
fn save(document: &Document, download: Download<Blob>) -> Result<(), JsValue> {
    let (href, object_url) = match download.payload {
        DownloadPayload::Blob(blob) => {
            let url = web_sys::Url::create_object_url_with_blob(&blob)?;
            (url.clone(), Some(url))
        }
        DownloadPayload::DataUri(uri) => (uri, None),
    };

    let a: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    a.set_href(&href);
    a.set_download(&download.filename);
    a.click();

    if let Some(url) = object_url {
        let closure = Closure::wrap(Box::new(move || {
            let _ = web_sys::Url::revoke_object_url(&url);
        }) as Box<dyn Fn()>);
        crate::utils::window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            REVOKE_DELAY_MS,
        )?;
        closure.forget();
    }
    Ok(())
}

enum Action {
    Delete,
    Download,
}

/// Entry id and action of a click inside the gallery container
fn clicked_action(event: &web_sys::Event) -> Option<(Action, MediaId)> {
    let target: Element = event.target()?.dyn_into().ok()?;
    let (action, button) = if let Ok(Some(button)) = target.closest(".delete") {
        (Action::Delete, button)
    } else if let Ok(Some(button)) = target.closest(".download") {
        (Action::Download, button)
    } else {
        return None;
    };

    let entry = button.closest(".media-cont").ok()??;
    match MediaId::parse(&entry.id()) {
        Ok(id) => Some((action, id)),
        Err(e) => {
            log::warn!("Ignoring click on entry with bad id: {}", e);
            None
        }
    }
}

fn register_event_listeners(
    gallery: Rc<RefCell<Gallery>>,
    document: &Document,
    config: &AppConfig,
) -> Result<(), JsValue> {
    let container: HtmlElement = query_selector(document, ".gallery-cont")?;
    let duration_ms = config.notifications.duration_ms;
    let doc = document.clone();

    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let Some((action, id)) = clicked_action(&event) else {
            return;
        };
        let gallery = gallery.clone();
        let doc = doc.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let Ok(mut gallery) = gallery.try_borrow_mut() else {
                log::debug!("Ignoring gallery click while another action is running");
                return;
            };
            let result = match action {
                Action::Delete => gallery.delete(&id).await.map(|_| ()),
                Action::Download => match gallery.download(&id).await {
                    Ok(download) => save(&doc, download).map_err(|e| {
                        procam_common::CamError::Storage(format!("download failed: {:?}", e))
                    }),
                    Err(e) => Err(e),
                },
            };
            if let Err(e) = result {
                log::error!("Gallery action on {} failed: {}", id, e);
                show_toast(&doc, &Notice::from(&e), duration_ms);
            }
        });
    }) as Box<dyn FnMut(_)>);
    container.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();

    if let Some(back) = document.query_selector(".back")? {
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            navigate("./index.html");
        }) as Box<dyn FnMut(_)>);
        back.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

pub async fn start(config: AppConfig) -> Result<(), JsValue> {
    let document = crate::utils::document()?;
    let view = DomGalleryView::new(document.clone())?;
    let storage = open_storage(&config.database).await;

    let gallery = Rc::new(RefCell::new(GalleryController::new(
        storage,
        view,
        config.downloads.clone(),
    )));
    register_event_listeners(gallery.clone(), &document, &config)?;

    let count = gallery.borrow_mut().load().await;
    log::info!("Gallery ready with {} entries", count);
    Ok(())
}
