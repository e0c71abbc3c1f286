//! Length-prefixed frames
//!
//! A log file is a plain sequence of frames:
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ u32 LE length N  │ N bytes of encoded record │ ...
//! └──────────────────┴──────────────────────────┘
//! ```
//!
//! There is no header, checksum or version tag. The file must end exactly
//! on a frame boundary; anything else is a truncated frame.

use std::io::{self, Write};

use thiserror::Error;

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX: usize = 4;

/// A frame that could not be read back
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("truncated length prefix at byte {offset}: {available} of 4 bytes present")]
    TruncatedPrefix { offset: u64, available: usize },

    #[error("truncated frame at byte {offset}: expected {expected} bytes, found {available}")]
    TruncatedBody {
        offset: u64,
        expected: usize,
        available: usize,
    },
}

impl FrameError {
    /// Byte offset of the frame that failed
    pub fn offset(&self) -> u64 {
        match self {
            FrameError::TruncatedPrefix { offset, .. } => *offset,
            FrameError::TruncatedBody { offset, .. } => *offset,
        }
    }
}

/// Build the bytes of one frame (prefix + payload).
///
/// Returns `None` if the payload does not fit a u32 length.
pub fn encode_frame(payload: &[u8]) -> Option<Vec<u8>> {
    let len = u32::try_from(payload.len()).ok()?;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(payload);
    Some(frame)
}

/// Write one frame with a single `write_all`
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<usize> {
    let frame = encode_frame(payload).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("record of {} bytes exceeds the frame size limit", payload.len()),
        )
    })?;
    writer.write_all(&frame)?;
    Ok(frame.len())
}

/// Iterator over the frames of an in-memory log image.
///
/// Yields `(offset, payload)` pairs. After the first error the iterator
/// is exhausted.
pub struct Frames<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Frames<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<(u64, &'a [u8]), FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos == self.data.len() {
            return None;
        }

        let offset = self.pos as u64;
        let remaining = &self.data[self.pos..];

        if remaining.len() < LENGTH_PREFIX {
            self.failed = true;
            return Some(Err(FrameError::TruncatedPrefix {
                offset,
                available: remaining.len(),
            }));
        }

        let mut prefix = [0u8; LENGTH_PREFIX];
        prefix.copy_from_slice(&remaining[..LENGTH_PREFIX]);
        let len = u32::from_le_bytes(prefix) as usize;

        let body = &remaining[LENGTH_PREFIX..];
        if body.len() < len {
            self.failed = true;
            return Some(Err(FrameError::TruncatedBody {
                offset,
                expected: len,
                available: body.len(),
            }));
        }

        self.pos += LENGTH_PREFIX + len;
        Some(Ok((offset, &body[..len])))
    }
}

/// Split a log image into frame payloads, failing on the first bad frame
pub fn split_frames(data: &[u8]) -> Result<Vec<(u64, &[u8])>, FrameError> {
    Frames::new(data).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(payloads: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        for payload in payloads {
            write_frame(&mut data, payload).unwrap();
        }
        data
    }

    #[test]
    fn test_prefix_is_little_endian() {
        let frame = encode_frame(b"abc").unwrap();
        assert_eq!(&frame[..4], &[3, 0, 0, 0]);
        assert_eq!(&frame[4..], b"abc");
    }

    #[test]
    fn test_split_frames_in_order() {
        let data = image(&[b"first", b"", b"third"]);
        let frames = split_frames(&data).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], (0, &b"first"[..]));
        assert_eq!(frames[1], (9, &b""[..]));
        assert_eq!(frames[2], (13, &b"third"[..]));
    }

    #[test]
    fn test_empty_image_has_no_frames() {
        assert!(split_frames(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_body_is_an_error() {
        let mut data = image(&[b"complete", b"cut short"]);
        data.truncate(data.len() - 3);

        let err = split_frames(&data).unwrap_err();
        assert_eq!(
            err,
            FrameError::TruncatedBody {
                offset: 12,
                expected: 9,
                available: 6
            }
        );
    }

    #[test]
    fn test_truncated_prefix_is_an_error() {
        let mut data = image(&[b"complete"]);
        data.extend_from_slice(&[1, 0]);

        let err = split_frames(&data).unwrap_err();
        assert_eq!(err.offset(), 12);
        assert!(matches!(err, FrameError::TruncatedPrefix { available: 2, .. }));
    }
}
