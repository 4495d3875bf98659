use thiserror::Error;

/// Bytes per pixel of a [`Frame`] (RGBA8)
pub const BYTES_PER_PIXEL: usize = 4;

/// Largest width or height a [`Frame`] may have
pub const MAX_FRAME_DIMENSION: usize = 8192;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame is {width}x{height} but carries {actual} bytes (expected {expected})")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("frame has a zero dimension ({width}x{height})")]
    Empty { width: usize, height: usize },

    #[error("frame of {width}x{height} exceeds {MAX_FRAME_DIMENSION} pixels per side")]
    TooLarge { width: usize, height: usize },
}

/// Byte length of a `width` x `height` RGBA8 buffer
pub fn frame_len(width: usize, height: usize) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::Empty { width, height });
    }
    if width > MAX_FRAME_DIMENSION || height > MAX_FRAME_DIMENSION {
        return Err(FrameError::TooLarge { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or(FrameError::TooLarge { width, height })
}

/// One snapshot of the machine's display.
///
/// Frames are never retained by the worker: the pixel buffer is moved into the
/// `frame` reply and owned by the foreground until it has been painted.
/// The fields are open to cores, so anything received from one goes through
/// [`Frame::validate`] before it is trusted.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, FrameError> {
        let frame = Self {
            width,
            height,
            pixels,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Checks the buffer length against the dimensions
    pub fn validate(&self) -> Result<(), FrameError> {
        let expected = frame_len(self.width, self.height)?;
        if self.pixels.len() != expected {
            return Err(FrameError::SizeMismatch {
                width: self.width,
                height: self.height,
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    /// Opaque black frame of the given size
    pub fn blank(width: usize, height: usize) -> Result<Self, FrameError> {
        let mut pixels = vec![0u8; frame_len(width, height)?];
        for px in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px[3] = 0xFF;
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Packs `0x00RRGGBB` words into RGBA8 bytes
    pub fn from_rgb_words(width: usize, height: usize, words: &[u32]) -> Result<Self, FrameError> {
        let mut pixels = Vec::with_capacity(words.len() * BYTES_PER_PIXEL);
        for &word in words {
            let [_, r, g, b] = word.to_be_bytes();
            pixels.extend_from_slice(&[r, g, b, 0xFF]);
        }
        Self::new(width, height, pixels)
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }
}

// Pixel dumps are useless in logs
impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_pixel_buffer() {
        let err = Frame::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            FrameError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn rejects_zero_dimension() {
        assert!(matches!(
            Frame::new(0, 4, Vec::new()),
            Err(FrameError::Empty { .. })
        ));
    }

    #[test]
    fn oversized_dimensions_are_an_error_not_an_overflow() {
        assert_eq!(
            Frame::new(usize::MAX / 2, 3, Vec::new()),
            Err(FrameError::TooLarge {
                width: usize::MAX / 2,
                height: 3
            })
        );
        assert!(matches!(
            Frame::blank(3, usize::MAX),
            Err(FrameError::TooLarge { .. })
        ));
        assert!(Frame::blank(MAX_FRAME_DIMENSION, 1).is_ok());
    }

    #[test]
    fn hand_built_frame_is_revalidated() {
        let frame = Frame {
            width: 160,
            height: 128,
            pixels: vec![0; 4],
        };
        assert!(matches!(
            frame.validate(),
            Err(FrameError::SizeMismatch { expected: 81920, .. })
        ));
    }

    #[test]
    fn packs_rgb_words_as_opaque_rgba() {
        let frame = Frame::from_rgb_words(2, 1, &[0x00112233, 0x00FFFFFF]).unwrap();
        assert_eq!(frame.pixels, vec![0x11, 0x22, 0x33, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn blank_frame_is_opaque() {
        let frame = Frame::blank(3, 2).unwrap();
        assert_eq!(frame.pixels.len(), 24);
        assert!(frame.pixels.chunks(4).all(|px| px == [0, 0, 0, 0xFF]));
    }
}
