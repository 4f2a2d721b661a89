//! Recording state machine: `Idle -> Recording -> Idle`.
//!
//! The platform encoder pushes encoded chunks while recording; on stop they
//! are concatenated into a single media object.

use serde::Serialize;

use crate::error::{CamError, Result};

/// Default container type of finished recordings
pub const DEFAULT_MIME_TYPE: &str = "video/mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

/// An encoded piece of media that can be joined with its siblings
pub trait MediaChunk: Sized {
    fn byte_len(&self) -> u64;

    /// Join chunks, in order, into one object of `mime_type`
    fn concat(chunks: Vec<Self>, mime_type: &str) -> Result<Self>;
}

impl MediaChunk for Vec<u8> {
    fn byte_len(&self) -> u64 {
        self.len() as u64
    }

    fn concat(chunks: Vec<Self>, _mime_type: &str) -> Result<Self> {
        Ok(chunks.concat())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinishedRecording<C> {
    pub media: C,
    pub chunk_count: usize,
    pub duration_ms: f64,
}

pub struct ChunkRecorder<C> {
    state: RecorderState,
    chunks: Vec<C>,
    mime_type: String,
    started_at: f64,
}

impl<C: MediaChunk> ChunkRecorder<C> {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            state: RecorderState::Idle,
            chunks: Vec::new(),
            mime_type: mime_type.into(),
            started_at: 0.0,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Begin a recording at `now_ms`, dropping anything buffered before
    pub fn start(&mut self, now_ms: f64) -> Result<()> {
        if self.is_recording() {
            return Err(CamError::AlreadyRecording);
        }
        self.chunks.clear();
        self.started_at = now_ms;
        self.state = RecorderState::Recording;
        log::info!("Recording started");
        Ok(())
    }

    /// Buffer a chunk; chunks arriving while idle are dropped
    pub fn push(&mut self, chunk: C) {
        if !self.is_recording() {
            log::debug!("Dropping {} byte chunk delivered while idle", chunk.byte_len());
            return;
        }
        self.chunks.push(chunk);
    }

    pub fn buffered_bytes(&self) -> u64 {
        self.chunks.iter().map(MediaChunk::byte_len).sum()
    }

    /// End the recording and join the buffered chunks
    pub fn finish(&mut self, now_ms: f64) -> Result<FinishedRecording<C>> {
        if !self.is_recording() {
            return Err(CamError::NotRecording);
        }
        self.state = RecorderState::Idle;

        let chunks = std::mem::take(&mut self.chunks);
        let chunk_count = chunks.len();
        let media = C::concat(chunks, &self.mime_type)?;
        let duration_ms = (now_ms - self.started_at).max(0.0);

        log::info!(
            "Recording finished: {} chunks, {} bytes, {:.1}s",
            chunk_count,
            media.byte_len(),
            duration_ms / 1000.0
        );
        Ok(FinishedRecording {
            media,
            chunk_count,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_concatenate_in_order() {
        let mut recorder = ChunkRecorder::<Vec<u8>>::new(DEFAULT_MIME_TYPE);
        recorder.start(1_000.0).unwrap();
        recorder.push(vec![1, 2]);
        recorder.push(vec![]);
        recorder.push(vec![3]);
        assert_eq!(recorder.buffered_bytes(), 3);

        let finished = recorder.finish(3_500.0).unwrap();
        assert_eq!(finished.media, vec![1, 2, 3]);
        assert_eq!(finished.chunk_count, 3);
        assert_eq!(finished.duration_ms, 2_500.0);
        assert_eq!(recorder.state(), RecorderState::Idle);
        assert_eq!(recorder.buffered_bytes(), 0);
    }

    #[test]
    fn test_start_clears_previous_chunks() {
        let mut recorder = ChunkRecorder::<Vec<u8>>::new(DEFAULT_MIME_TYPE);
        recorder.start(0.0).unwrap();
        recorder.push(vec![9, 9]);
        recorder.finish(1.0).unwrap();

        recorder.start(2.0).unwrap();
        recorder.push(vec![7]);
        assert_eq!(recorder.finish(3.0).unwrap().media, vec![7]);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut recorder = ChunkRecorder::<Vec<u8>>::new(DEFAULT_MIME_TYPE);
        assert_eq!(recorder.finish(0.0), Err(CamError::NotRecording));

        recorder.start(0.0).unwrap();
        assert_eq!(recorder.start(1.0), Err(CamError::AlreadyRecording));
        assert!(recorder.is_recording());
    }

    #[test]
    fn test_idle_chunks_are_dropped() {
        let mut recorder = ChunkRecorder::<Vec<u8>>::new("video/webm");
        recorder.push(vec![1, 2, 3]);
        recorder.start(0.0).unwrap();
        assert_eq!(recorder.buffered_bytes(), 0);
        assert_eq!(recorder.mime_type(), "video/webm");
    }

    #[test]
    fn test_empty_recording() {
        let mut recorder = ChunkRecorder::<Vec<u8>>::new(DEFAULT_MIME_TYPE);
        recorder.start(5.0).unwrap();
        let finished = recorder.finish(5.0).unwrap();
        assert!(finished.media.is_empty());
        assert_eq!(finished.chunk_count, 0);
    }
}
