//! Still-frame capture: plan the raster surface, let the platform draw it.

use crate::data_uri::DataUri;
use crate::error::{CamError, Result};
use crate::filter::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// What to rasterize: a surface at the video's native size, the current
/// frame drawn edge to edge, then the filter tint over the whole surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPlan {
    pub size: FrameSize,
    pub overlay: Option<&'static str>,
}

impl SnapshotPlan {
    pub fn new(frame: FrameSize, filter: Filter) -> Result<Self> {
        if frame.is_empty() {
            return Err(CamError::Snapshot("video not ready".to_string()));
        }
        Ok(Self {
            size: frame,
            overlay: filter.overlay(),
        })
    }
}

/// Platform rasterizer for the current video frame
pub trait FrameCapture {
    /// Native size of the frame currently shown
    fn frame_size(&self) -> FrameSize;

    /// Draw the plan and encode it as a data URI
    fn render(&self, plan: &SnapshotPlan) -> Result<String>;
}

/// Capture the current frame with `filter` applied
pub fn capture<C: FrameCapture>(capturer: &C, filter: Filter) -> Result<String> {
    let plan = SnapshotPlan::new(capturer.frame_size(), filter)?;
    let url = capturer.render(&plan)?;

    // A PNG payload must carry the planned size; other encodings are trusted.
    if let Ok(uri) = DataUri::parse(&url) {
        if let Some(size) = uri.image_size() {
            if size != plan.size {
                return Err(CamError::Snapshot(format!(
                    "encoded {}x{}, expected {}x{}",
                    size.width, size.height, plan.size.width, plan.size.height
                )));
            }
        }
    } else {
        return Err(CamError::InvalidDataUri("rasterizer returned a non data URI".to_string()));
    }

    log::debug!(
        "Captured {}x{} snapshot (overlay: {:?})",
        plan.size.width,
        plan.size.height,
        plan.overlay
    );
    Ok(url)
}
