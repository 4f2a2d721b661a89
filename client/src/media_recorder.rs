use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use procam_common::recorder::{ChunkRecorder, FinishedRecording, MediaChunk};
use procam_common::{CamError, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobEvent, BlobPropertyBag, MediaRecorder, MediaRecorderOptions, MediaStream, RecordingState};

use crate::utils::{now_ms, recorder_error};

/// Encoded piece of a recording as delivered by `dataavailable`
#[derive(Clone)]
pub struct BlobChunk(pub Blob);

impl MediaChunk for BlobChunk {
    fn byte_len(&self) -> u64 {
        self.0.size() as u64
    }

    fn concat(chunks: Vec<Self>, mime_type: &str) -> Result<Self> {
        let parts = js_sys::Array::new();
        for chunk in &chunks {
            parts.push(&chunk.0);
        }
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);
        Blob::new_with_blob_sequence_and_options(&parts, &options)
            .map(BlobChunk)
            .map_err(|e| CamError::Storage(format!("failed to build recording blob: {:?}", e)))
    }
}

/// `MediaRecorder` feeding a [`ChunkRecorder`]
pub struct Recorder {
    inner: MediaRecorder,
    chunks: Rc<RefCell<ChunkRecorder<BlobChunk>>>,
    _on_data: Closure<dyn FnMut(BlobEvent)>,
}

impl Recorder {
    pub fn new(stream: &MediaStream, mime_type: &str) -> Result<Self> {
        let inner = if MediaRecorder::is_type_supported(mime_type) {
            let options = MediaRecorderOptions::new();
            options.set_mime_type(mime_type);
            MediaRecorder::new_with_media_stream_and_media_recorder_options(stream, &options)
        } else {
            log::debug!("{} not supported by MediaRecorder, using its default", mime_type);
            MediaRecorder::new_with_media_stream(stream)
        }
        .map_err(recorder_error)?;

        let chunks = Rc::new(RefCell::new(ChunkRecorder::new(mime_type)));
        let sink = chunks.clone();
        let on_data = Closure::wrap(Box::new(move |event: BlobEvent| {
            if let Some(blob) = event.data() {
                sink.borrow_mut().push(BlobChunk(blob));
            }
        }) as Box<dyn FnMut(BlobEvent)>);
        inner.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));

        Ok(Self {
            inner,
            chunks,
            _on_data: on_data,
        })
    }

    pub fn is_recording(&self) -> bool {
        self.chunks.borrow().is_recording()
    }

    pub fn start(&self) -> Result<()> {
        self.chunks.borrow_mut().start(now_ms())?;
        if let Err(e) = self.inner.start() {
            // Roll the buffer back to idle so a later start is accepted
            let _ = self.chunks.borrow_mut().finish(now_ms());
            return Err(recorder_error(e));
        }
        Ok(())
    }

    /// Stop the platform recorder and wait for its final chunk
    pub async fn stop(&self) -> Result<FinishedRecording<Blob>> {
        if self.inner.state() != RecordingState::Inactive {
            let (tx, rx) = oneshot::channel::<()>();
            let on_stop = Closure::once_into_js(move |_event: web_sys::Event| {
                let _ = tx.send(());
            });
            self.inner.set_onstop(Some(on_stop.unchecked_ref()));
            self.inner.stop().map_err(recorder_error)?;
            rx.await.map_err(|_| CamError::NotRecording)?;
            self.inner.set_onstop(None);
        }

        let finished = self.chunks.borrow_mut().finish(now_ms())?;
        Ok(FinishedRecording {
            media: finished.media.0,
            chunk_count: finished.chunk_count,
            duration_ms: finished.duration_ms,
        })
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.inner.set_ondataavailable(None);
    }
}
