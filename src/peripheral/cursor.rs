use strum_macros::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// A field did not fit into the remaining bytes of the buffer.
    Truncated { offset: usize, needed: usize, len: usize },
    /// A received buffer does not have the fixed report size.
    WrongLength { expected: usize, actual: usize },
    /// A scaled field could not be mapped into its byte range.
    Scale,
}

impl std::error::Error for FrameError {}

impl From<crate::util::ScaleError> for FrameError {
    fn from(_: crate::util::ScaleError) -> Self { FrameError::Scale }
}

/// A fixed-width value with a little-endian wire representation.
pub trait WireValue: Sized {
    const SIZE: usize;
    fn put(self, out: &mut [u8]);
    fn take(bytes: &[u8]) -> Self;
}

macro_rules! wire_value {
    ($($t:ty),*) => {
        $(
            impl WireValue for $t {
                const SIZE: usize = size_of::<$t>();
                fn put(self, out: &mut [u8]) { out.copy_from_slice(&self.to_le_bytes()); }
                fn take(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }
            }
        )*
    };
}

wire_value!(u8, u16, u32, i16, i32, f32);

/// Appends values to a fixed buffer, checking every write against its end.
pub struct FrameWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FrameWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self { Self { buf, pos: 0 } }

    pub fn put<T: WireValue>(&mut self, value: T) -> Result<(), FrameError> {
        let end = self.reserve(T::SIZE)?;
        value.put(&mut self.buf[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        let end = self.reserve(bytes.len())?;
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    pub fn position(&self) -> usize { self.pos }

    fn reserve(&self, needed: usize) -> Result<usize, FrameError> {
        let end = self.pos + needed;
        if end > self.buf.len() {
            return Err(FrameError::Truncated { offset: self.pos, needed, len: self.buf.len() });
        }
        Ok(end)
    }
}

/// Reads values positionally from a received buffer.
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    pub fn take<T: WireValue>(&mut self) -> Result<T, FrameError> {
        let bytes = self.take_bytes(T::SIZE)?;
        Ok(T::take(bytes))
    }

    pub fn take_bytes(&mut self, len: usize) -> Result<&'a [u8], FrameError> {
        let end = self.pos + len;
        if end > self.buf.len() {
            return Err(FrameError::Truncated { offset: self.pos, needed: len, len: self.buf.len() });
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), FrameError> { self.take_bytes(len).map(|_| ()) }

    pub fn position(&self) -> usize { self.pos }
}
