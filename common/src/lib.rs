pub mod config;
pub mod constraints;
pub mod data_uri;
pub mod device;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod media;
pub mod notice;
pub mod recorder;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod timer;

pub use config::AppConfig;
pub use error::{CamError, Result};
pub use filter::Filter;
pub use media::{ImageRecord, MediaId, MediaKind, MediaRecord, VideoRecord};
pub use notice::Notice;
pub use session::{CaptureMode, CaptureSession, MediaBackend};
pub use store::{MediaStore, StorageManager};
