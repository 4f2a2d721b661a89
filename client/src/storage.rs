//! IndexedDB backend for the media collections.

use js_sys::{Array, Object, Promise, Reflect};
use procam_common::config::DatabaseConfig;
use procam_common::media::KEY_PATH;
use procam_common::store::missing_stores;
use procam_common::{CamError, ImageRecord, MediaId, MediaKind, MediaRecord, MediaStore, Result, StorageManager, VideoRecord};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, IdbDatabase, IdbObjectStore, IdbObjectStoreParameters, IdbOpenDbRequest, IdbRequest, IdbTransactionMode,
    IdbVersionChangeEvent,
};

use crate::utils::storage_error;

pub struct IdbStore {
    db: IdbDatabase,
}

type EventHandler = Closure<dyn FnMut(web_sys::Event)>;

/// Resolve once `request` fires `success`, reject on `error`. Both handlers
/// live until the request settles and are detached afterwards.
async fn await_request(request: &IdbRequest) -> std::result::Result<JsValue, JsValue> {
    let mut handlers: Option<(EventHandler, EventHandler)> = None;
    let promise = Promise::new(&mut |resolve: js_sys::Function, reject: js_sys::Function| {
        let success_request = request.clone();
        let on_success: EventHandler = Closure::once(move |_event: web_sys::Event| {
            let result = success_request.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });

        let error_request = request.clone();
        let on_error: EventHandler = Closure::once(move |_event: web_sys::Event| {
            let error = error_request
                .error()
                .ok()
                .flatten()
                .map(JsValue::from)
                .unwrap_or(JsValue::NULL);
            let _ = reject.call1(&JsValue::NULL, &error);
        });

        request.set_onsuccess(Some(on_success.as_ref().unchecked_ref()));
        request.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        handlers = Some((on_success, on_error));
    });

    let result = JsFuture::from(promise).await;
    request.set_onsuccess(None);
    request.set_onerror(None);
    drop(handlers);
    result
}

fn create_missing_stores(request: &IdbOpenDbRequest) -> std::result::Result<(), JsValue> {
    let db: IdbDatabase = request.result()?.dyn_into()?;
    let names = db.object_store_names();
    let existing: Vec<String> = (0..names.length()).filter_map(|i| names.get(i)).collect();

    for name in missing_stores(&existing) {
        let params = IdbObjectStoreParameters::new();
        params.set_key_path(&JsValue::from_str(KEY_PATH));
        db.create_object_store_with_optional_parameters(name, &params)?;
        log::info!("Created object store {}", name);
    }
    Ok(())
}

fn record_to_js(record: &MediaRecord<Blob>) -> std::result::Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"id".into(), &JsValue::from_str(&record.id().to_key()))?;
    match record {
        MediaRecord::Video(video) => {
            Reflect::set(&obj, &"blobData".into(), &video.blob_data)?;
        }
        MediaRecord::Image(image) => {
            Reflect::set(&obj, &"url".into(), &JsValue::from_str(&image.url))?;
        }
    }
    if let Some(timestamp) = record.timestamp() {
        Reflect::set(&obj, &"timestamp".into(), &JsValue::from_f64(timestamp as f64))?;
    }
    Ok(obj.into())
}

fn record_from_js(kind: MediaKind, value: &JsValue) -> Result<MediaRecord<Blob>> {
    let get = |key: &str| Reflect::get(value, &JsValue::from_str(key)).map_err(storage_error);

    let raw_id = get("id")?
        .as_string()
        .ok_or_else(|| CamError::Storage(format!("{} record without id", kind)))?;
    let id = MediaId::parse(&raw_id)?;
    if id.kind() != kind {
        return Err(CamError::InvalidId(raw_id));
    }
    let timestamp = get("timestamp")?.as_f64().map(|t| t as i64);

    Ok(match kind {
        MediaKind::Video => {
            let blob_data: Blob = get("blobData")?
                .dyn_into()
                .map_err(|_| CamError::Storage(format!("{} has no blob", id)))?;
            MediaRecord::Video(VideoRecord {
                id,
                blob_data,
                timestamp,
            })
        }
        MediaKind::Image => {
            let url = get("url")?
                .as_string()
                .ok_or_else(|| CamError::Storage(format!("{} has no url", id)))?;
            MediaRecord::Image(ImageRecord { id, url, timestamp })
        }
    })
}

impl IdbStore {
    pub async fn open(name: &str, version: u32) -> Result<Self> {
        let unavailable = |e: JsValue| CamError::StorageUnavailable(format!("{:?}", e));

        let window = web_sys::window().ok_or_else(|| CamError::StorageUnavailable("no window".to_string()))?;
        let factory = window
            .indexed_db()
            .map_err(unavailable)?
            .ok_or_else(|| CamError::StorageUnavailable("IndexedDB not supported".to_string()))?;

        let request = factory.open_with_u32(name, version).map_err(unavailable)?;

        let upgrade_request = request.clone();
        let on_upgrade = Closure::wrap(Box::new(move |_event: IdbVersionChangeEvent| {
            if let Err(e) = create_missing_stores(&upgrade_request) {
                log::error!("Schema upgrade failed: {:?}", e);
            }
        }) as Box<dyn FnMut(_)>);
        request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));

        let opened = await_request(&request).await;
        request.set_onupgradeneeded(None);

        let db: IdbDatabase = opened.map_err(unavailable)?.dyn_into().map_err(unavailable)?;
        log::info!("Opened database {} v{}", name, version);
        Ok(Self { db })
    }

    fn object_store(&self, kind: MediaKind, mode: IdbTransactionMode) -> Result<IdbObjectStore> {
        let name = kind.store_name();
        self.db
            .transaction_with_str_and_mode(name, mode)
            .and_then(|tx| tx.object_store(name))
            .map_err(storage_error)
    }
}

impl MediaStore for IdbStore {
    type Blob = Blob;

    async fn add(&self, record: MediaRecord<Blob>) -> Result<()> {
        let store = self.object_store(record.kind(), IdbTransactionMode::Readwrite)?;
        let value = record_to_js(&record).map_err(storage_error)?;
        let request = store.add(&value).map_err(storage_error)?;
        await_request(&request).await.map_err(storage_error)?;
        Ok(())
    }

    async fn get(&self, id: &MediaId) -> Result<Option<MediaRecord<Blob>>> {
        let store = self.object_store(id.kind(), IdbTransactionMode::Readonly)?;
        let request = store.get(&JsValue::from_str(&id.to_key())).map_err(storage_error)?;
        let value = await_request(&request).await.map_err(storage_error)?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        record_from_js(id.kind(), &value).map(Some)
    }

    async fn get_all(&self, kind: MediaKind) -> Result<Vec<MediaRecord<Blob>>> {
        let store = self.object_store(kind, IdbTransactionMode::Readonly)?;
        let request = store.get_all().map_err(storage_error)?;
        let values: Array = await_request(&request)
            .await
            .map_err(storage_error)?
            .dyn_into()
            .map_err(storage_error)?;

        let mut records = Vec::with_capacity(values.length() as usize);
        for value in values.iter() {
            match record_from_js(kind, &value) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping unreadable {} record: {}", kind, e),
            }
        }
        Ok(records)
    }

    async fn delete(&self, id: &MediaId) -> Result<()> {
        let store = self.object_store(id.kind(), IdbTransactionMode::Readwrite)?;
        let request = store.delete(&JsValue::from_str(&id.to_key())).map_err(storage_error)?;
        await_request(&request).await.map_err(storage_error)?;
        Ok(())
    }
}

/// Open the configured database; without IndexedDB the manager is unavailable
pub async fn open_storage(config: &DatabaseConfig) -> StorageManager<IdbStore> {
    match IdbStore::open(&config.name, config.version).await {
        Ok(store) => StorageManager::new(store),
        Err(e) => {
            log::warn!("Media storage disabled: {}", e);
            StorageManager::unavailable()
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    async fn fresh_store() -> IdbStore {
        let name = format!("procam-test-{}", js_sys::Date::now());
        IdbStore::open(&name, 1).await.unwrap()
    }

    fn image(key: &str) -> MediaRecord<Blob> {
        MediaRecord::Image(ImageRecord {
            id: MediaId::parse(key).unwrap(),
            url: "data:image/png;base64,AAAA".to_string(),
            timestamp: Some(1),
        })
    }

    #[wasm_bindgen_test]
    async fn test_handlers_detached_after_success() {
        let store = fresh_store().await;
        let request = store
            .object_store(MediaKind::Image, IdbTransactionMode::Readonly)
            .unwrap()
            .count()
            .unwrap();

        let count = await_request(&request).await.unwrap();
        assert_eq!(count.as_f64(), Some(0.0));
        assert!(request.onsuccess().is_none());
        assert!(request.onerror().is_none());
    }

    #[wasm_bindgen_test]
    async fn test_handlers_detached_after_error() {
        let store = fresh_store().await;
        store.add(image("img-dup")).await.unwrap();

        let value = record_to_js(&image("img-dup")).unwrap();
        let request = store
            .object_store(MediaKind::Image, IdbTransactionMode::Readwrite)
            .unwrap()
            .add(&value)
            .unwrap();

        assert!(await_request(&request).await.is_err());
        assert!(request.onsuccess().is_none());
        assert!(request.onerror().is_none());
    }

    #[wasm_bindgen_test]
    async fn test_add_get_delete() {
        let store = fresh_store().await;
        store.add(image("img-one")).await.unwrap();

        let id = MediaId::parse("img-one").unwrap();
        assert!(matches!(store.get(&id).await.unwrap(), Some(MediaRecord::Image(_))));
        assert_eq!(store.get_all(MediaKind::Image).await.unwrap().len(), 1);

        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
    }
}
