//! Little-endian wire codec
//!
//! The ROS1 binary layout: fields in declaration order, fixed-width
//! primitives in little-endian byte order, `string` and variable-length
//! arrays preceded by a 4-byte count, fixed-length arrays written without
//! a count.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::time::{Duration, Time};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Growable output buffer for message serialization
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: Vec<u8>,
}

macro_rules! write_fixed {
    ($($name:ident: $ty:ty => $write:ident, $size:expr;)*) => {
        $(
            #[doc = concat!("Write a `", stringify!($ty), "` in little-endian order")]
            pub fn $name(&mut self, value: $ty) {
                let mut bytes = [0u8; $size];
                LittleEndian::$write(&mut bytes, value);
                self.buf.extend_from_slice(&bytes);
            }
        )*
    };
}

impl WireWriter {
    /// Create an empty writer
    #[must_use]
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with room for `capacity` bytes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the written bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return the encoded bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Write a `bool` as a single byte
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Write a `u8`
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write an `i8`
    pub fn write_i8(&mut self, value: i8) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    write_fixed! {
        write_u16: u16 => write_u16, 2;
        write_i16: i16 => write_i16, 2;
        write_u32: u32 => write_u32, 4;
        write_i32: i32 => write_i32, 4;
        write_u64: u64 => write_u64, 8;
        write_i64: i64 => write_i64, 8;
        write_f32: f32 => write_f32, 4;
        write_f64: f64 => write_f64, 8;
    }

    /// Write a 4-byte length prefix
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthOverflow`] if `len` does not fit in a `u32`.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| Error::LengthOverflow { length: len })?;
        self.write_u32(len);
        Ok(())
    }

    /// Write a length-prefixed UTF-8 string
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthOverflow`] if the byte length does not fit in a `u32`.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_len(value.len())?;
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Write a `time` value (secs then nsecs)
    pub fn write_time(&mut self, value: &Time) {
        self.write_u32(value.secs);
        self.write_u32(value.nsecs);
    }

    /// Write a `duration` value (secs then nsecs)
    pub fn write_duration(&mut self, value: &Duration) {
        self.write_i32(value.secs);
        self.write_i32(value.nsecs);
    }

    /// Write raw bytes without a prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}

/// Cursor over an encoded message
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

macro_rules! read_fixed {
    ($($name:ident: $ty:ty => $read:ident, $size:expr;)*) => {
        $(
            #[doc = concat!("Read a little-endian `", stringify!($ty), "`")]
            ///
            /// # Errors
            ///
            /// Returns [`Error::UnexpectedEof`] if the buffer is too short.
            pub fn $name(&mut self) -> Result<$ty> {
                let bytes = self.read_bytes($size)?;
                Ok(LittleEndian::$read(bytes))
            }
        )*
    };
}

impl<'a> WireReader<'a> {
    /// Create a reader positioned at the start of `buf`
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read offset
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail unless every byte has been consumed
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrailingBytes`] if bytes remain.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(Error::TrailingBytes { remaining }),
        }
    }

    /// Read `len` raw bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(Error::UnexpectedEof {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a `bool`; any non-zero byte is `true`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if the buffer is exhausted.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a `u8`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if the buffer is exhausted.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read an `i8`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if the buffer is exhausted.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes([self.read_u8()?]))
    }

    read_fixed! {
        read_u16: u16 => read_u16, 2;
        read_i16: i16 => read_i16, 2;
        read_u32: u32 => read_u32, 4;
        read_i32: i32 => read_i32, 4;
        read_u64: u64 => read_u64, 8;
        read_i64: i64 => read_i64, 8;
        read_f32: f32 => read_f32, 4;
        read_f64: f64 => read_f64, 8;
    }

    /// Read a 4-byte length prefix
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if the buffer is too short.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_u32()?;
        usize::try_from(len).map_err(|_| Error::LengthOverflow {
            length: usize::MAX,
        })
    }

    /// Read a length-prefixed UTF-8 string
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too short or the payload is not UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let bytes = self.read_bytes(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Read a `time` value
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if the buffer is too short.
    pub fn read_time(&mut self) -> Result<Time> {
        let secs = self.read_u32()?;
        let nsecs = self.read_u32()?;
        Ok(Time { secs, nsecs })
    }

    /// Read a `duration` value
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if the buffer is too short.
    pub fn read_duration(&mut self) -> Result<Duration> {
        let secs = self.read_i32()?;
        let nsecs = self.read_i32()?;
        Ok(Duration { secs, nsecs })
    }

    /// Read a length-prefixed sequence, decoding each element with `read`
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the prefix read or by `read`.
    pub fn read_sequence<T, F>(&mut self, mut read: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let len = self.read_len()?;
        // A hostile prefix must not trigger a huge allocation up front.
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Read `N` elements with no length prefix
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `read`.
    pub fn read_array<T, const N: usize, F>(&mut self, mut read: F) -> Result<[T; N]>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(read(self)?);
        }
        items.try_into().map_err(|items: Vec<T>| Error::ArrayLength {
            expected: N,
            actual: items.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_are_little_endian() {
        let mut writer = WireWriter::new();
        writer.write_u16(0x0102);
        writer.write_i32(-2);
        writer.write_bool(true);
        assert_eq!(
            writer.as_bytes(),
            &[0x02, 0x01, 0xfe, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn test_string_is_length_prefixed() {
        let mut writer = WireWriter::new();
        writer.write_string("abc").unwrap();
        assert_eq!(writer.as_bytes(), &[3, 0, 0, 0, b'a', b'b', b'c']);

        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "abc");
        reader.finish().unwrap();
    }

    #[test]
    fn test_read_past_end() {
        let mut reader = WireReader::new(&[1, 2]);
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEof {
                needed: 4,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut reader = WireReader::new(&[2, 0, 0, 0, 0xc3, 0x28]);
        assert!(matches!(reader.read_string(), Err(Error::InvalidUtf8(_))));
    }

    #[test]
    fn test_sequence_with_oversized_prefix() {
        // count claims 1000 elements but only two bytes follow
        let mut reader = WireReader::new(&[0xe8, 0x03, 0, 0, 1, 2]);
        let result = reader.read_sequence(WireReader::read_u8);
        assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_fixed_array_has_no_prefix() {
        let mut reader = WireReader::new(&[7, 0, 0, 0, 0xf9, 0xff, 0xff, 0xff]);
        let pair: [i32; 2] = reader.read_array(WireReader::read_i32).unwrap();
        assert_eq!(pair, [7, -7]);
        reader.finish().unwrap();
    }

    #[test]
    fn test_trailing_bytes() {
        let mut reader = WireReader::new(&[1, 2]);
        reader.read_u8().unwrap();
        assert!(matches!(
            reader.finish(),
            Err(Error::TrailingBytes { remaining: 1 })
        ));
    }

    #[test]
    fn test_time_and_duration() {
        let mut writer = WireWriter::new();
        writer.write_time(&Time::new(1, 2));
        writer.write_duration(&Duration::new(-1, 0));
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 16);

        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_time().unwrap(), Time::new(1, 2));
        assert_eq!(reader.read_duration().unwrap(), Duration::new(-1, 0));
    }
}
