//! Byte sources the decoder reads from.
//!
//! The decoder never seeks and never reads past the terminator of the value
//! it is decoding, so a source can hold several concatenated values.

use std::io::{self, Read};

/// A forward-only byte source.
pub trait Source {
    /// Fill `buf` from the source.
    ///
    /// Returns the number of bytes written into `buf`. A count below
    /// `buf.len()` means the source is exhausted; the decoder treats that as
    /// a premature end of input.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Input around `position`, for error previews.
    ///
    /// Returns the window and the index of `position` inside it. Sources that
    /// do not retain consumed input return `None`.
    fn window(&self, _position: usize) -> Option<(&[u8], usize)> {
        None
    }
}

impl<R: Read> Source for R {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

/// Bytes either side of the error position shown in previews.
const PREVIEW_RADIUS: usize = 20;

/// An in-memory source over a byte slice.
///
/// Unlike a plain `&[u8]` reader it keeps the whole input, so decode errors
/// carry a preview of the bytes around the failure.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl Source for SliceSource<'_> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn window(&self, position: usize) -> Option<(&[u8], usize)> {
        let position = position.min(self.data.len());
        let start = position.saturating_sub(PREVIEW_RADIUS);
        let end = (position + PREVIEW_RADIUS).min(self.data.len());
        Some((&self.data[start..end], position - start))
    }
}
