//! Byte-order codec
//!
//! DIS is big-endian on the wire. Writing goes through `bytes::BufMut`, whose
//! `put_*` methods already emit network order. Reading goes through
//! `DisReader`, a positioned cursor whose typed reads are bounds-checked and
//! surface truncation as `DisError::BufferTooShort` instead of panicking.

use bytes::{Buf, BufMut};

use dis_core::{DisError, DisResult};

/// Positioned big-endian reader over a byte slice
#[derive(Clone, Copy, Debug)]
pub struct DisReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

macro_rules! read_be {
    ($(#[$doc:meta])* $name:ident, $peek:ident, $ty:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self) -> DisResult<$ty> {
            const N: usize = std::mem::size_of::<$ty>();
            let bytes = self.read_array::<N>()?;
            Ok(<$ty>::from_be_bytes(bytes))
        }

        /// Read without consuming
        #[inline]
        pub fn $peek(&self) -> DisResult<$ty> {
            let mut probe = *self;
            probe.$name()
        }
    };
}

impl<'a> DisReader<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        DisReader { buf, pos: 0 }
    }

    /// Current offset from the start of the underlying buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute offset (clamped to the buffer end)
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    /// Bytes left to read
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Total length of the underlying buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Unread part of the buffer
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    fn ensure(&self, n: usize) -> DisResult<()> {
        if self.remaining() < n {
            return Err(DisError::BufferTooShort {
                expected: self.pos + n,
                actual: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Consume `n` bytes, borrowing them from the buffer
    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> DisResult<&'a [u8]> {
        self.ensure(n)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> DisResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Skip padding or unused bytes
    #[inline]
    pub fn skip(&mut self, n: usize) -> DisResult<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    read_be!(read_u8, peek_u8, u8);
    read_be!(read_i8, peek_i8, i8);
    read_be!(read_u16, peek_u16, u16);
    read_be!(read_i16, peek_i16, i16);
    read_be!(read_u32, peek_u32, u32);
    read_be!(read_i32, peek_i32, i32);
    read_be!(read_u64, peek_u64, u64);
    read_be!(read_i64, peek_i64, i64);
    read_be!(read_f32, peek_f32, f32);
    read_be!(read_f64, peek_f64, f64);
}

impl Buf for DisReader<'_> {
    fn remaining(&self) -> usize {
        DisReader::remaining(self)
    }

    fn chunk(&self) -> &[u8] {
        self.rest()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(cnt <= DisReader::remaining(self), "advance past end of DisReader");
        self.pos += cnt;
    }
}

/// Write `n` zero bytes of padding
#[inline]
pub fn put_padding(dst: &mut impl BufMut, n: usize) {
    dst.put_bytes(0, n);
}

/// A record with a self-contained big-endian encoding
pub trait Record: Sized {
    /// Encoded size in bytes
    fn wire_size(&self) -> usize;

    /// Append the encoding to `dst`
    fn encode(&self, dst: &mut impl BufMut);

    /// Decode one record, advancing `src` past it
    fn decode(src: &mut DisReader<'_>) -> DisResult<Self>;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_size());
        self.encode(&mut buf);
        buf
    }

    fn from_bytes(buf: &[u8]) -> DisResult<Self> {
        Self::decode(&mut DisReader::new(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_network_order() {
        let mut buf = Vec::new();
        buf.put_u16(0x0102);
        buf.put_u32(0x0304_0506);
        buf.put_f32(1.0);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x3F, 0x80, 0x00, 0x00]);

        let mut r = DisReader::new(&buf);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
        assert_eq!(r.read_u32().unwrap(), 0x0304_0506);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_short_buffer() {
        let buf = [0u8; 3];
        let mut r = DisReader::new(&buf);
        assert!(matches!(
            r.read_u32(),
            Err(DisError::BufferTooShort {
                expected: 4,
                actual: 3
            })
        ));
        // A failed read does not move the cursor
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u16().unwrap(), 0);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let buf = [0xAB, 0xCD, 0xEF];
        let mut r = DisReader::new(&buf);
        assert_eq!(r.peek_u8().unwrap(), 0xAB);
        assert_eq!(r.peek_u16().unwrap(), 0xABCD);
        assert_eq!(r.position(), 0);
        r.skip(1).unwrap();
        assert_eq!(r.peek_u16().unwrap(), 0xCDEF);
        assert!(r.peek_u32().is_err());
    }

    #[test]
    fn test_set_position_clamps() {
        let buf = [1u8, 2, 3];
        let mut r = DisReader::new(&buf);
        r.set_position(10);
        assert_eq!(r.position(), 3);
        assert!(r.is_empty());
        r.set_position(1);
        assert_eq!(r.rest(), &[2, 3]);
    }

    #[test]
    fn test_buf_impl() {
        let buf = [0u8, 1, 0, 2];
        let mut r = DisReader::new(&buf);
        assert_eq!(r.get_u16(), 1);
        assert_eq!(Buf::remaining(&r), 2);
        assert_eq!(r.position(), 2);
    }

    proptest! {
        #[test]
        fn prop_u16(v in any::<u16>()) {
            let mut buf = Vec::new();
            buf.put_u16(v);
            prop_assert_eq!(DisReader::new(&buf).read_u16().unwrap(), v);
        }

        #[test]
        fn prop_i16(v in any::<i16>()) {
            let mut buf = Vec::new();
            buf.put_i16(v);
            prop_assert_eq!(DisReader::new(&buf).read_i16().unwrap(), v);
        }

        #[test]
        fn prop_u32(v in any::<u32>()) {
            let mut buf = Vec::new();
            buf.put_u32(v);
            prop_assert_eq!(DisReader::new(&buf).read_u32().unwrap(), v);
        }

        #[test]
        fn prop_i32(v in any::<i32>()) {
            let mut buf = Vec::new();
            buf.put_i32(v);
            prop_assert_eq!(DisReader::new(&buf).read_i32().unwrap(), v);
        }

        #[test]
        fn prop_u64(v in any::<u64>()) {
            let mut buf = Vec::new();
            buf.put_u64(v);
            prop_assert_eq!(DisReader::new(&buf).read_u64().unwrap(), v);
        }

        #[test]
        fn prop_i64(v in any::<i64>()) {
            let mut buf = Vec::new();
            buf.put_i64(v);
            prop_assert_eq!(DisReader::new(&buf).read_i64().unwrap(), v);
        }

        #[test]
        fn prop_f32_bits(bits in any::<u32>()) {
            let v = f32::from_bits(bits);
            let mut buf = Vec::new();
            buf.put_f32(v);
            prop_assert_eq!(DisReader::new(&buf).read_f32().unwrap().to_bits(), bits);
        }

        #[test]
        fn prop_f64_bits(bits in any::<u64>()) {
            let v = f64::from_bits(bits);
            let mut buf = Vec::new();
            buf.put_f64(v);
            prop_assert_eq!(DisReader::new(&buf).read_f64().unwrap().to_bits(), bits);
        }
    }
}
