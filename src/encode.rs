//! Wire Encoding Primitives
//!
//! A byte-buffer builder for the device's canonical wire form. All integers
//! are big-endian. The checked variants validate that a value fits the
//! declared bit width and fail with `OutOfRange` before anything is sent to
//! the device.
//!
//! The writer also records named spans: callers wrap logical fields in
//! [`Writer::spanned`] and the staged dispatcher later slices the finished
//! buffer by field name instead of re-deriving offsets.

use crate::error::{SignerError, SignerResult};
use std::ops::Range;

/// A named window into the encoded buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<F> {
    pub field: F,
    pub range: Range<usize>,
}

/// Byte-buffer builder with range-checked integer encoders
#[derive(Debug, Clone)]
pub struct Writer<F> {
    buf: Vec<u8>,
    spans: Vec<Span<F>>,
}

impl<F: Copy + PartialEq> Writer<F> {
    pub fn new() -> Self {
        Self { buf: Vec::new(), spans: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity), spans: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // --- typed encoders -----------------------------------------------------

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    // --- range-checked encoders ---------------------------------------------

    pub fn checked_u8(&mut self, v: u64) -> SignerResult<()> {
        self.put_u8(narrow(v, 8)? as u8);
        Ok(())
    }

    pub fn checked_u16(&mut self, v: u64) -> SignerResult<()> {
        self.put_u16(narrow(v, 16)? as u16);
        Ok(())
    }

    pub fn checked_u32(&mut self, v: u64) -> SignerResult<()> {
        self.put_u32(narrow(v, 32)? as u32);
        Ok(())
    }

    pub fn checked_i8(&mut self, v: i64) -> SignerResult<()> {
        self.put_i8(narrow_signed(v, 8)? as i8);
        Ok(())
    }

    pub fn checked_i32(&mut self, v: i64) -> SignerResult<()> {
        self.put_i32(narrow_signed(v, 32)? as i32);
        Ok(())
    }

    /// Length-prefixed blob: u16 length followed by the raw bytes.
    pub fn put_blob16(&mut self, bytes: &[u8]) -> SignerResult<()> {
        self.checked_u16(bytes.len() as u64)?;
        self.put_bytes(bytes);
        Ok(())
    }

    // --- spans ---------------------------------------------------------------

    /// Run `f` and record the bytes it wrote under `field`.
    pub fn spanned(
        &mut self,
        field: F,
        f: impl FnOnce(&mut Self) -> SignerResult<()>,
    ) -> SignerResult<()> {
        let start = self.buf.len();
        f(self)?;
        self.spans.push(Span { field, range: start..self.buf.len() });
        Ok(())
    }

    /// Append another writer's buffer, re-basing its spans.
    pub fn absorb(&mut self, other: Writer<F>) {
        let base = self.buf.len();
        self.buf.extend_from_slice(&other.buf);
        self.spans.extend(other.spans.into_iter().map(|s| Span {
            field: s.field,
            range: s.range.start + base..s.range.end + base,
        }));
    }

    pub fn finish(self) -> (Vec<u8>, Vec<Span<F>>) {
        (self.buf, self.spans)
    }
}

impl<F: Copy + PartialEq> Default for Writer<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn narrow(v: u64, width: u8) -> SignerResult<u64> {
    let max = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
    if v > max {
        return Err(SignerError::OutOfRange { value: v, width });
    }
    Ok(v)
}

fn narrow_signed(v: i64, width: u8) -> SignerResult<i64> {
    let min = -(1i64 << (width - 1));
    let max = (1i64 << (width - 1)) - 1;
    if v < min || v > max {
        return Err(SignerError::OutOfRange { value: v as u64, width });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        A,
        B,
    }

    #[test]
    fn test_big_endian_layout() {
        let mut w: Writer<Tag> = Writer::new();
        w.put_u16(0x0102);
        w.put_u32(0x03040506);
        w.put_u64(0x0708090A0B0C0D0E);
        let (bytes, _) = w.finish();
        assert_eq!(
            bytes,
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E]
        );
    }

    #[test]
    fn test_checked_boundaries() {
        let mut w: Writer<Tag> = Writer::new();
        assert!(w.checked_u32((1u64 << 32) - 1).is_ok());
        assert_eq!(
            w.checked_u32(1u64 << 32),
            Err(SignerError::OutOfRange { value: 1 << 32, width: 32 })
        );
        assert!(w.checked_u8(255).is_ok());
        assert!(w.checked_u8(256).is_err());
        assert!(w.checked_u16(65535).is_ok());
        assert!(w.checked_u16(65536).is_err());
    }

    #[test]
    fn test_checked_signed_boundaries() {
        let mut w: Writer<Tag> = Writer::new();
        assert!(w.checked_i8(-128).is_ok());
        assert!(w.checked_i8(127).is_ok());
        assert!(w.checked_i8(128).is_err());
        assert!(w.checked_i32(i32::MIN as i64).is_ok());
        assert!(w.checked_i32(i32::MAX as i64 + 1).is_err());
    }

    #[test]
    fn test_blob16_prefix_matches_length() {
        let mut w: Writer<Tag> = Writer::new();
        w.put_blob16(&[0xAA; 300]).unwrap();
        let (bytes, _) = w.finish();
        assert_eq!(&bytes[..2], &300u16.to_be_bytes());
        assert_eq!(bytes.len(), 302);
    }

    #[test]
    fn test_blob16_rejects_oversized() {
        let mut w: Writer<Tag> = Writer::new();
        let oversized = vec![0u8; 65536];
        assert!(w.put_blob16(&oversized).is_err());
    }

    #[test]
    fn test_spans_cover_written_bytes() {
        let mut w: Writer<Tag> = Writer::new();
        w.put_u8(0xFF);
        w.spanned(Tag::A, |w| {
            w.put_u16(7);
            Ok(())
        })
        .unwrap();
        w.spanned(Tag::B, |w| {
            w.put_bytes(b"xyz");
            Ok(())
        })
        .unwrap();
        let (bytes, spans) = w.finish();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].range, 1..3);
        assert_eq!(spans[1].range, 3..6);
        assert_eq!(&bytes[spans[1].range.clone()], b"xyz");
    }

    #[test]
    fn test_absorb_rebases_spans() {
        let mut inner: Writer<Tag> = Writer::new();
        inner
            .spanned(Tag::A, |w| {
                w.put_u32(9);
                Ok(())
            })
            .unwrap();

        let mut outer: Writer<Tag> = Writer::new();
        outer.put_u64(0);
        outer.absorb(inner);
        let (_, spans) = outer.finish();
        assert_eq!(spans[0].range, 8..12);
    }
}
