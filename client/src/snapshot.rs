use procam_common::snapshot::{FrameCapture, FrameSize, SnapshotPlan};
use procam_common::Result;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlVideoElement};

use crate::utils::snapshot_error;

/// Rasterizes the preview video onto an offscreen canvas
pub struct CanvasCapture {
    document: Document,
    video: HtmlVideoElement,
}

impl CanvasCapture {
    pub fn new(document: Document, video: HtmlVideoElement) -> Self {
        Self { document, video }
    }

    fn draw(&self, plan: &SnapshotPlan) -> std::result::Result<String, JsValue> {
        let canvas: HtmlCanvasElement = self.document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(plan.size.width);
        canvas.set_height(plan.size.height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into()?;

        let width = plan.size.width as f64;
        let height = plan.size.height as f64;
        ctx.draw_image_with_html_video_element_and_dw_and_dh(&self.video, 0.0, 0.0, width, height)?;

        if let Some(color) = plan.overlay {
            ctx.set_fill_style(&JsValue::from_str(color));
            ctx.fill_rect(0.0, 0.0, width, height);
        }

        canvas.to_data_url()
    }
}

impl FrameCapture for CanvasCapture {
    fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.video.video_width(), self.video.video_height())
    }

    fn render(&self, plan: &SnapshotPlan) -> Result<String> {
        self.draw(plan).map_err(snapshot_error)
    }
}
