//! Local media persistence: two independent collections, `video` and `image`.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::data_uri::DataUri;
use crate::error::{CamError, Result};
use crate::media::{ImageRecord, MediaId, MediaKind, MediaRecord, VideoRecord};

/// Key-value backend holding both collections.
///
/// Every method routes on the record's or id's explicit [`MediaKind`].
#[allow(async_fn_in_trait)]
pub trait MediaStore {
    /// Binary payload type of video records
    type Blob: Clone;

    /// Insert a new record; an existing id is an error
    async fn add(&self, record: MediaRecord<Self::Blob>) -> Result<()>;

    async fn get(&self, id: &MediaId) -> Result<Option<MediaRecord<Self::Blob>>>;

    /// Every record of `kind`, in backend order
    async fn get_all(&self, kind: MediaKind) -> Result<Vec<MediaRecord<Self::Blob>>>;

    async fn delete(&self, id: &MediaId) -> Result<()>;
}

/// Collections a database must create to reach the current schema, given
/// the ones it already has. Running it again after an upgrade yields nothing.
pub fn missing_stores<S: AsRef<str>>(existing: &[S]) -> Vec<&'static str> {
    MediaKind::ALL
        .iter()
        .map(|kind| kind.store_name())
        .filter(|name| !existing.iter().any(|e| e.as_ref() == *name))
        .collect()
}

/// In-memory backend, ordered by key within each collection
pub struct MemoryStore<B> {
    collections: RefCell<BTreeMap<MediaKind, BTreeMap<String, MediaRecord<B>>>>,
}

impl<B> MemoryStore<B> {
    pub fn new() -> Self {
        Self {
            collections: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn len(&self, kind: MediaKind) -> usize {
        self.collections.borrow().get(&kind).map_or(0, |c| c.len())
    }
}

impl<B> Default for MemoryStore<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Clone> MediaStore for MemoryStore<B> {
    type Blob = B;

    async fn add(&self, record: MediaRecord<B>) -> Result<()> {
        let key = record.id().to_key();
        let mut collections = self.collections.borrow_mut();
        let collection = collections.entry(record.kind()).or_default();
        if collection.contains_key(&key) {
            return Err(CamError::Storage(format!("key already exists: {}", key)));
        }
        collection.insert(key, record);
        Ok(())
    }

    async fn get(&self, id: &MediaId) -> Result<Option<MediaRecord<B>>> {
        Ok(self
            .collections
            .borrow()
            .get(&id.kind())
            .and_then(|c| c.get(&id.to_key()))
            .cloned())
    }

    async fn get_all(&self, kind: MediaKind) -> Result<Vec<MediaRecord<B>>> {
        Ok(self
            .collections
            .borrow()
            .get(&kind)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, id: &MediaId) -> Result<()> {
        if let Some(collection) = self.collections.borrow_mut().get_mut(&id.kind()) {
            collection.remove(&id.to_key());
        }
        Ok(())
    }
}

/// Front door to media persistence.
///
/// Built over a backend when storage opened, or [`StorageManager::unavailable`]
/// when the platform has none: listing then yields nothing and writes fail
/// with [`CamError::StorageUnavailable`].
pub struct StorageManager<S> {
    store: Option<S>,
}

impl<S: MediaStore> StorageManager<S> {
    pub fn new(store: S) -> Self {
        Self { store: Some(store) }
    }

    pub fn unavailable() -> Self {
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    fn backend(&self) -> Result<&S> {
        self.store
            .as_ref()
            .ok_or_else(|| CamError::StorageUnavailable("no media storage on this platform".to_string()))
    }

    /// Persist a finished recording under a fresh `vid-` id
    pub async fn save_video(&self, blob: S::Blob, timestamp: i64) -> Result<MediaId> {
        let id = MediaId::generate(MediaKind::Video);
        self.add(MediaRecord::Video(VideoRecord {
            id: id.clone(),
            blob_data: blob,
            timestamp: Some(timestamp),
        }))
        .await?;
        log::info!("Saved video {}", id);
        Ok(id)
    }

    /// Persist a snapshot data URI under a fresh `img-` id
    pub async fn save_image(&self, url: String, timestamp: i64) -> Result<MediaId> {
        DataUri::parse(&url)?;
        let id = MediaId::generate(MediaKind::Image);
        self.add(MediaRecord::Image(ImageRecord {
            id: id.clone(),
            url,
            timestamp: Some(timestamp),
        }))
        .await?;
        log::info!("Saved image {}", id);
        Ok(id)
    }

    pub async fn add(&self, record: MediaRecord<S::Blob>) -> Result<()> {
        self.backend()?.add(record).await
    }

    pub async fn get(&self, id: &MediaId) -> Result<MediaRecord<S::Blob>> {
        self.backend()?
            .get(id)
            .await?
            .ok_or_else(|| CamError::NotFound(id.to_key()))
    }

    pub async fn get_all(&self, kind: MediaKind) -> Result<Vec<MediaRecord<S::Blob>>> {
        match &self.store {
            Some(store) => store.get_all(kind).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn delete(&self, id: &MediaId) -> Result<()> {
        self.backend()?.delete(id).await?;
        log::info!("Deleted {} from {}", id, id.kind().store_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_uri::png_header;
    use futures::executor::block_on;

    fn png_uri() -> String {
        DataUri::encode("image/png", &png_header(4, 4))
    }

    #[test]
    fn test_missing_stores() {
        let none: [&str; 0] = [];
        assert_eq!(missing_stores(&none), vec!["video", "image"]);
        assert_eq!(missing_stores(&["video"]), vec!["image"]);
        assert!(missing_stores(&["image".to_string(), "video".to_string()]).is_empty());
    }

    #[test]
    fn test_save_and_list() {
        let manager = StorageManager::new(MemoryStore::<Vec<u8>>::new());

        block_on(async {
            let vid = manager.save_video(vec![1, 2, 3], 10).await.unwrap();
            let img = manager.save_image(png_uri(), 20).await.unwrap();

            assert_eq!(vid.kind(), MediaKind::Video);
            assert_eq!(img.kind(), MediaKind::Image);

            let videos = manager.get_all(MediaKind::Video).await.unwrap();
            let images = manager.get_all(MediaKind::Image).await.unwrap();
            assert_eq!(videos.len(), 1);
            assert_eq!(images.len(), 1);
            assert_eq!(videos[0].timestamp(), Some(10));

            match manager.get(&vid).await.unwrap() {
                MediaRecord::Video(v) => assert_eq!(v.blob_data, vec![1, 2, 3]),
                other => panic!("expected video, got {:?}", other),
            }
        });
    }

    #[test]
    fn test_delete_routes_by_kind() {
        let store = MemoryStore::<Vec<u8>>::new();
        block_on(async {
            store
                .add(MediaRecord::Video(VideoRecord {
                    id: MediaId::parse("vid-abc123").unwrap(),
                    blob_data: vec![],
                    timestamp: None,
                }))
                .await
                .unwrap();
            store
                .add(MediaRecord::Image(ImageRecord {
                    id: MediaId::parse("img-xyz789").unwrap(),
                    url: png_uri(),
                    timestamp: None,
                }))
                .await
                .unwrap();

            let manager = StorageManager::new(store);
            manager.delete(&MediaId::parse("vid-abc123").unwrap()).await.unwrap();

            let store = manager.store().unwrap();
            assert_eq!(store.len(MediaKind::Video), 0);
            assert_eq!(store.len(MediaKind::Image), 1);

            manager.delete(&MediaId::parse("img-xyz789").unwrap()).await.unwrap();
            assert_eq!(store.len(MediaKind::Image), 0);
        });
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let store = MemoryStore::<Vec<u8>>::new();
        block_on(async {
            store
                .add(MediaRecord::Video(VideoRecord {
                    id: MediaId::new(MediaKind::Video, "same"),
                    blob_data: vec![],
                    timestamp: None,
                }))
                .await
                .unwrap();
            let again = store
                .add(MediaRecord::Video(VideoRecord {
                    id: MediaId::new(MediaKind::Video, "same"),
                    blob_data: vec![9],
                    timestamp: None,
                }))
                .await;
            assert!(matches!(again, Err(CamError::Storage(_))));
        });
    }

    #[test]
    fn test_get_missing_record() {
        let manager = StorageManager::new(MemoryStore::<Vec<u8>>::new());
        let id = MediaId::parse("img-nothere").unwrap();
        let result = block_on(manager.get(&id));
        assert_eq!(result, Err(CamError::NotFound("img-nothere".to_string())));
    }

    #[test]
    fn test_save_image_rejects_non_data_uri() {
        let manager = StorageManager::new(MemoryStore::<Vec<u8>>::new());
        let result = block_on(manager.save_image("https://example.com/a.png".to_string(), 0));
        assert!(matches!(result, Err(CamError::InvalidDataUri(_))));
        assert_eq!(manager.store().unwrap().len(MediaKind::Image), 0);
    }

    #[test]
    fn test_unavailable_storage() {
        let manager: StorageManager<MemoryStore<Vec<u8>>> = StorageManager::unavailable();
        assert!(!manager.is_available());

        block_on(async {
            assert!(manager.get_all(MediaKind::Video).await.unwrap().is_empty());
            assert!(manager.get_all(MediaKind::Image).await.unwrap().is_empty());
            assert!(matches!(
                manager.save_video(vec![0], 1).await,
                Err(CamError::StorageUnavailable(_))
            ));
            assert!(matches!(
                manager.delete(&MediaId::parse("vid-1").unwrap()).await,
                Err(CamError::StorageUnavailable(_))
            ));
        });
    }
}
