//! XDR primitives
//!
//! Minimal big-endian XDR (RFC 4506) reader and writer covering what the
//! contract spec entries need: 32-bit integers, bounded variable-length
//! opaque data, and bounded arrays. Decoding is strict: padding must be
//! zero, declared maxima are enforced, and [`ReadXdr::from_xdr`] rejects
//! any bytes left over after the value.

use thiserror::Error;

/// Default nesting limit for recursive type definitions
pub const DEFAULT_DEPTH_LIMIT: u32 = 500;

/// Error while reading XDR
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XdrError {
    #[error("Unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    #[error("Length {len} exceeds declared maximum {max}")]
    LengthExceedsLimit { len: u32, max: u32 },

    #[error("Invalid {what} discriminant: {value}")]
    InvalidDiscriminant { what: &'static str, value: i64 },

    #[error("Non-zero padding byte")]
    NonZeroPadding,

    #[error("Type nesting exceeds depth limit {0}")]
    DepthLimitExceeded(u32),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

/// Result type for XDR operations
pub type XdrResult<T> = Result<T, XdrError>;

/// Resource limits applied while reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of recursive values
    pub depth: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH_LIMIT,
        }
    }
}

impl Limits {
    pub fn with_depth(depth: u32) -> Self {
        Self { depth }
    }
}

fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Cursor over an XDR byte slice
pub struct XdrReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth_limit: u32,
    depth_remaining: u32,
}

impl<'a> XdrReader<'a> {
    pub fn new(bytes: &'a [u8], limits: Limits) -> Self {
        Self {
            bytes,
            pos: 0,
            depth_limit: limits.depth,
            depth_remaining: limits.depth,
        }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> XdrResult<&'a [u8]> {
        let available = self.remaining();
        if available < n {
            return Err(XdrError::UnexpectedEof {
                needed: n,
                available,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u32(&mut self) -> XdrResult<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn read_i32(&mut self) -> XdrResult<i32> {
        let raw = self.take(4)?;
        Ok(i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// Read `opaque<max>` / `string<max>`: length prefix, data, zero padding
    pub fn read_var_opaque(&mut self, max: u32) -> XdrResult<Vec<u8>> {
        let len = self.read_u32()?;
        if len > max {
            return Err(XdrError::LengthExceedsLimit { len, max });
        }
        let len = len as usize;
        let data = self.take(len)?.to_vec();
        let padding = self.take(padding_for(len))?;
        if padding.iter().any(|b| *b != 0) {
            return Err(XdrError::NonZeroPadding);
        }
        Ok(data)
    }

    /// Read the element count of a variable array `T<max>`
    pub fn read_array_len(&mut self, max: u32) -> XdrResult<usize> {
        let len = self.read_u32()?;
        if len > max {
            return Err(XdrError::LengthExceedsLimit { len, max });
        }
        Ok(len as usize)
    }

    /// Read a bounded array, decoding each element with `read`
    pub fn read_array<T>(
        &mut self,
        max: u32,
        mut read: impl FnMut(&mut Self) -> XdrResult<T>,
    ) -> XdrResult<Vec<T>> {
        let len = self.read_array_len(max)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Run `f` one nesting level deeper, failing once the depth limit is spent
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> XdrResult<T>) -> XdrResult<T> {
        if self.depth_remaining == 0 {
            return Err(XdrError::DepthLimitExceeded(self.depth_limit));
        }
        self.depth_remaining -= 1;
        let result = f(self);
        self.depth_remaining += 1;
        result
    }

    /// Require that every byte was consumed
    pub fn finish(self) -> XdrResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(XdrError::TrailingBytes(n)),
        }
    }
}

/// Growable XDR output buffer
///
/// The writer does not enforce declared maxima, so tests can build
/// buffers the reader must reject.
#[derive(Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_var_opaque(&mut self, data: &[u8]) {
        self.write_u32(data.len() as u32);
        self.buf.extend_from_slice(data);
        self.buf
            .extend(std::iter::repeat(0u8).take(padding_for(data.len())));
    }

    pub fn write_array<T>(&mut self, items: &[T], mut write: impl FnMut(&mut Self, &T)) {
        self.write_u32(items.len() as u32);
        for item in items {
            write(self, item);
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Types decodable from XDR
pub trait ReadXdr: Sized {
    fn read_xdr(reader: &mut XdrReader<'_>) -> XdrResult<Self>;

    /// Decode a value that must occupy exactly `bytes`
    fn from_xdr(bytes: &[u8], limits: Limits) -> XdrResult<Self> {
        let mut reader = XdrReader::new(bytes, limits);
        let value = Self::read_xdr(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// Types encodable to XDR
pub trait WriteXdr {
    fn write_xdr(&self, writer: &mut XdrWriter);

    fn to_xdr(&self) -> Vec<u8> {
        let mut writer = XdrWriter::new();
        self.write_xdr(&mut writer);
        writer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u32_big_endian() {
        let mut reader = XdrReader::new(&[0x00, 0x00, 0x01, 0x02], Limits::default());
        assert_eq!(reader.read_u32().unwrap(), 258);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_read_u32_eof() {
        let mut reader = XdrReader::new(&[0x00, 0x01], Limits::default());
        assert_eq!(
            reader.read_u32(),
            Err(XdrError::UnexpectedEof {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_var_opaque_padding() {
        let mut writer = XdrWriter::new();
        writer.write_var_opaque(b"abcde");
        let bytes = writer.into_bytes();
        // 4-byte length, 5 data bytes, 3 padding bytes
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[9..], &[0, 0, 0]);

        let mut reader = XdrReader::new(&bytes, Limits::default());
        assert_eq!(reader.read_var_opaque(32).unwrap(), b"abcde".to_vec());
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_var_opaque_rejects_nonzero_padding() {
        let bytes = [0, 0, 0, 1, b'x', 0, 7, 0];
        let mut reader = XdrReader::new(&bytes, Limits::default());
        assert_eq!(reader.read_var_opaque(32), Err(XdrError::NonZeroPadding));
    }

    #[test]
    fn test_var_opaque_enforces_maximum() {
        let mut writer = XdrWriter::new();
        writer.write_var_opaque(&[b'a'; 40]);
        let bytes = writer.into_bytes();

        let mut reader = XdrReader::new(&bytes, Limits::default());
        assert_eq!(
            reader.read_var_opaque(32),
            Err(XdrError::LengthExceedsLimit { len: 40, max: 32 })
        );
    }

    #[test]
    fn test_array_len_checked_before_allocation() {
        let bytes = u32::MAX.to_be_bytes();
        let mut reader = XdrReader::new(&bytes, Limits::default());
        assert!(matches!(
            reader.read_array(10, |r| r.read_u32()),
            Err(XdrError::LengthExceedsLimit { .. })
        ));
    }

    #[test]
    fn test_nested_depth_limit() {
        fn descend(reader: &mut XdrReader<'_>, levels: u32) -> XdrResult<()> {
            if levels == 0 {
                return Ok(());
            }
            reader.nested(|r| descend(r, levels - 1))
        }

        let mut reader = XdrReader::new(&[], Limits::with_depth(3));
        assert!(descend(&mut reader, 3).is_ok());
        assert_eq!(
            descend(&mut reader, 4),
            Err(XdrError::DepthLimitExceeded(3))
        );
    }

    #[test]
    fn test_finish_reports_trailing_bytes() {
        let mut reader = XdrReader::new(&[0, 0, 0, 1, 9, 9], Limits::default());
        reader.read_u32().unwrap();
        assert_eq!(reader.finish(), Err(XdrError::TrailingBytes(2)));
    }
}
