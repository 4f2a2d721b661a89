//! Minimal `data:` URI handling for captured photos.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{CamError, Result};
use crate::snapshot::FrameSize;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl DataUri {
    /// Parse `data:[<mime>][;base64],<payload>`
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| CamError::InvalidDataUri("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CamError::InvalidDataUri("missing payload separator".to_string()))?;

        let (mime_type, is_base64) = match header.strip_suffix(";base64") {
            Some(mime) => (mime, true),
            None => (header, false),
        };
        let mime_type = if mime_type.is_empty() {
            "text/plain".to_string()
        } else {
            mime_type.to_string()
        };

        let data = if is_base64 {
            STANDARD
                .decode(payload)
                .map_err(|e| CamError::InvalidDataUri(e.to_string()))?
        } else {
            payload.as_bytes().to_vec()
        };

        Ok(Self { mime_type, data })
    }

    /// Encode bytes as a base64 data URI
    pub fn encode(mime_type: &str, data: &[u8]) -> String {
        format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
    }

    /// Pixel size when the payload is a PNG image
    pub fn image_size(&self) -> Option<FrameSize> {
        if self.mime_type == "image/png" {
            png_dimensions(&self.data)
        } else {
            None
        }
    }
}

/// Width and height from a PNG's IHDR chunk
pub fn png_dimensions(bytes: &[u8]) -> Option<FrameSize> {
    // signature, IHDR length (4), "IHDR", width (4), height (4)
    if bytes.len() < 24 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some(FrameSize::new(width, height))
}

#[cfg(test)]
pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    // bit depth, color type, compression, filter, interlace
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes
}
