//! Gallery: lists both collections, keeps the rendered list in step with
//! storage, and serves downloads.

use std::collections::BTreeSet;

use crate::config::DownloadConfig;
use crate::error::Result;
use crate::media::{MediaId, MediaKind, MediaRecord};
use crate::store::{MediaStore, StorageManager};

/// Rendering surface of the gallery page
pub trait GalleryView<B> {
    fn render_entry(&mut self, record: &MediaRecord<B>);

    fn remove_entry(&mut self, id: &MediaId);

    fn set_empty_state(&mut self, visible: bool);
}

/// Payload handed to the browser for saving
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadPayload<B> {
    Blob(B),
    DataUri(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Download<B> {
    pub filename: String,
    pub payload: DownloadPayload<B>,
}

pub struct GalleryController<S, V> {
    storage: StorageManager<S>,
    view: V,
    downloads: DownloadConfig,
    shown: BTreeSet<MediaId>,
}

impl<S, V> GalleryController<S, V>
where
    S: MediaStore,
    V: GalleryView<S::Blob>,
{
    pub fn new(storage: StorageManager<S>, view: V, downloads: DownloadConfig) -> Self {
        Self {
            storage,
            view,
            downloads,
            shown: BTreeSet::new(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn storage(&self) -> &StorageManager<S> {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }

    /// Query both collections together, render every record, then decide the
    /// empty state once both queries are done. A failed query counts as empty.
    pub async fn load(&mut self) -> usize {
        let (videos, images) = futures::join!(
            self.storage.get_all(MediaKind::Video),
            self.storage.get_all(MediaKind::Image)
        );

        for (kind, result) in [(MediaKind::Video, videos), (MediaKind::Image, images)] {
            match result {
                Ok(records) => {
                    for record in records {
                        self.show(&record);
                    }
                }
                Err(e) => log::warn!("Failed to load {} records: {}", kind, e),
            }
        }

        self.view.set_empty_state(self.shown.is_empty());
        log::info!("Gallery loaded {} records", self.shown.len());
        self.shown.len()
    }

    /// Render a record added after the initial load
    pub fn insert(&mut self, record: &MediaRecord<S::Blob>) {
        self.show(record);
        self.view.set_empty_state(false);
    }

    fn show(&mut self, record: &MediaRecord<S::Blob>) {
        if self.shown.insert(record.id().clone()) {
            self.view.render_entry(record);
        }
    }

    /// Delete from storage, then from the view. Returns true when the gallery
    /// became empty.
    pub async fn delete(&mut self, id: &MediaId) -> Result<bool> {
        self.storage.delete(id).await?;

        if self.shown.remove(id) {
            self.view.remove_entry(id);
        }
        let empty = self.shown.is_empty();
        if empty {
            self.view.set_empty_state(true);
        }
        Ok(empty)
    }

    pub async fn download(&self, id: &MediaId) -> Result<Download<S::Blob>> {
        let record = self.storage.get(id).await?;
        Ok(match record {
            MediaRecord::Video(video) => Download {
                filename: self.downloads.video_filename.clone(),
                payload: DownloadPayload::Blob(video.blob_data),
            },
            MediaRecord::Image(image) => Download {
                filename: self.downloads.image_filename.clone(),
                payload: DownloadPayload::DataUri(image.url),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CamError;
    use crate::media::{ImageRecord, VideoRecord};
    use crate::store::MemoryStore;
    use futures::executor::block_on;

    #[derive(Default)]
    struct FakeView {
        entries: Vec<String>,
        empty_state: Option<bool>,
        empty_state_calls: usize,
    }

    impl GalleryView<Vec<u8>> for FakeView {
        fn render_entry(&mut self, record: &MediaRecord<Vec<u8>>) {
            self.entries.push(record.id().to_key());
        }

        fn remove_entry(&mut self, id: &MediaId) {
            self.entries.retain(|e| *e != id.to_key());
        }

        fn set_empty_state(&mut self, visible: bool) {
            self.empty_state = Some(visible);
            self.empty_state_calls += 1;
        }
    }

    /// Store whose video collection cannot be read
    struct BrokenVideoStore(MemoryStore<Vec<u8>>);

    impl MediaStore for BrokenVideoStore {
        type Blob = Vec<u8>;

        async fn add(&self, record: MediaRecord<Vec<u8>>) -> Result<()> {
            self.0.add(record).await
        }

        async fn get(&self, id: &MediaId) -> Result<Option<MediaRecord<Vec<u8>>>> {
            self.0.get(id).await
        }

        async fn get_all(&self, kind: MediaKind) -> Result<Vec<MediaRecord<Vec<u8>>>> {
            match kind {
                MediaKind::Video => Err(CamError::Storage("transaction aborted".into())),
                MediaKind::Image => self.0.get_all(kind).await,
            }
        }

        async fn delete(&self, id: &MediaId) -> Result<()> {
            self.0.delete(id).await
        }
    }

    fn video(key: &str) -> MediaRecord<Vec<u8>> {
        MediaRecord::Video(VideoRecord {
            id: MediaId::new(MediaKind::Video, key),
            blob_data: vec![0xde, 0xad],
            timestamp: Some(1),
        })
    }

    fn image(key: &str) -> MediaRecord<Vec<u8>> {
        MediaRecord::Image(ImageRecord {
            id: MediaId::new(MediaKind::Image, key),
            url: "data:image/png;base64,AAAA".to_string(),
            timestamp: Some(2),
        })
    }

    fn controller(records: Vec<MediaRecord<Vec<u8>>>) -> GalleryController<MemoryStore<Vec<u8>>, FakeView> {
        let store = MemoryStore::new();
        for record in records {
            block_on(store.add(record)).unwrap();
        }
        GalleryController::new(StorageManager::new(store), FakeView::default(), DownloadConfig::default())
    }

    #[test]
    fn test_empty_gallery_shows_empty_state() {
        let mut gallery = controller(vec![]);
        assert_eq!(block_on(gallery.load()), 0);
        assert_eq!(gallery.view().empty_state, Some(true));
        assert_eq!(gallery.view().empty_state_calls, 1);
    }

    #[test]
    fn test_single_record_of_either_kind_hides_empty_state() {
        for record in [video("v1"), image("i1")] {
            let mut gallery = controller(vec![record]);
            assert_eq!(block_on(gallery.load()), 1);
            assert_eq!(gallery.view().empty_state, Some(false));
        }
    }

    #[test]
    fn test_empty_state_decided_after_both_queries() {
        let mut gallery = controller(vec![video("v1"), image("i1"), image("i2")]);
        block_on(gallery.load());
        assert_eq!(gallery.view().entries, vec!["vid-v1", "img-i1", "img-i2"]);
        assert_eq!(gallery.view().empty_state_calls, 1);
    }

    #[test]
    fn test_failed_query_counts_as_empty() {
        let inner = MemoryStore::new();
        block_on(inner.add(video("v1"))).unwrap();
        let mut gallery = GalleryController::new(
            StorageManager::new(BrokenVideoStore(inner)),
            FakeView::default(),
            DownloadConfig::default(),
        );

        assert_eq!(block_on(gallery.load()), 0);
        assert_eq!(gallery.view().empty_state, Some(true));
    }

    #[test]
    fn test_unavailable_storage_shows_empty_state() {
        let mut gallery: GalleryController<MemoryStore<Vec<u8>>, FakeView> =
            GalleryController::new(StorageManager::unavailable(), FakeView::default(), DownloadConfig::default());
        assert_eq!(block_on(gallery.load()), 0);
        assert_eq!(gallery.view().empty_state, Some(true));
    }

    #[test]
    fn test_delete_removes_from_store_and_view() {
        let mut gallery = controller(vec![video("abc123"), image("xyz789")]);
        block_on(gallery.load());

        let became_empty = block_on(gallery.delete(&MediaId::parse("vid-abc123").unwrap())).unwrap();
        assert!(!became_empty);
        assert_eq!(gallery.view().entries, vec!["img-xyz789"]);
        assert_eq!(gallery.view().empty_state, Some(false));

        let store = gallery.storage().store().unwrap();
        assert_eq!(store.len(MediaKind::Video), 0);
        assert_eq!(store.len(MediaKind::Image), 1);

        let became_empty = block_on(gallery.delete(&MediaId::parse("img-xyz789").unwrap())).unwrap();
        assert!(became_empty);
        assert!(gallery.view().entries.is_empty());
        assert_eq!(gallery.view().empty_state, Some(true));
        assert_eq!(gallery.storage().store().unwrap().len(MediaKind::Image), 0);
    }

    #[test]
    fn test_insert_after_load_hides_empty_state() {
        let mut gallery = controller(vec![]);
        block_on(gallery.load());
        gallery.insert(&image("new"));
        assert_eq!(gallery.view().empty_state, Some(false));
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn test_download_names_and_payloads() {
        let mut gallery = controller(vec![video("v1"), image("i1")]);
        block_on(gallery.load());

        let vid = block_on(gallery.download(&MediaId::parse("vid-v1").unwrap())).unwrap();
        assert_eq!(vid.filename, "video.mp4");
        assert_eq!(vid.payload, DownloadPayload::Blob(vec![0xde, 0xad]));

        let img = block_on(gallery.download(&MediaId::parse("img-i1").unwrap())).unwrap();
        assert_eq!(img.filename, "image.png");
        assert_eq!(img.payload, DownloadPayload::DataUri("data:image/png;base64,AAAA".to_string()));

        let missing = block_on(gallery.download(&MediaId::parse("img-gone").unwrap()));
        assert!(matches!(missing, Err(CamError::NotFound(_))));
    }
}
