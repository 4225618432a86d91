//! Byte stream interface used by the deserializers.

use std::io::{self, Read, Seek, SeekFrom};

/// A seekable source of texture bytes.
///
/// Every read of untrusted length is preceded by [`TextureStream::check_read_ahead`],
/// so a truncated stream fails before any buffer is allocated for it.
pub trait TextureStream {
    /// Fills `buf` completely or fails.
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Moves to the absolute position `pos`.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// The current absolute position.
    fn tell(&mut self) -> io::Result<u64>;

    /// Number of bytes between the current position and the end of the stream.
    fn remaining(&mut self) -> io::Result<u64>;

    /// Advances by `count` bytes.
    fn skip(&mut self, count: u64) -> io::Result<()> {
        let pos = self.tell()?;
        self.seek(pos.saturating_add(count))
    }

    /// Fails with [`io::ErrorKind::UnexpectedEof`] when fewer than `count`
    /// bytes remain. Never consumes input.
    fn check_read_ahead(&mut self, count: u64) -> io::Result<()> {
        let remaining = self.remaining()?;
        if remaining < count {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{count} bytes requested, {remaining} remain"),
            ));
        }
        Ok(())
    }
}

impl<T: Read + Seek> TextureStream for T {
    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        Read::read_exact(self, buf)
    }

    #[inline]
    fn seek(&mut self, pos: u64) -> io::Result<()> {
        Seek::seek(self, SeekFrom::Start(pos)).map(|_| ())
    }

    #[inline]
    fn tell(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    fn remaining(&mut self) -> io::Result<u64> {
        let pos = self.stream_position()?;
        let end = Seek::seek(self, SeekFrom::End(0))?;
        Seek::seek(self, SeekFrom::Start(pos))?;
        Ok(end.saturating_sub(pos))
    }

    #[inline]
    fn skip(&mut self, count: u64) -> io::Result<()> {
        let offset = i64::try_from(count)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "skip distance too large"))?;
        Seek::seek(self, SeekFrom::Current(offset)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_prelude::*;
    use std::io::Cursor;

    #[test]
    fn read_ahead_does_not_consume() {
        let mut stream = Cursor::new(vec![1u8, 2, 3, 4]);
        assert!(TextureStream::check_read_ahead(&mut stream, 4).is_ok());
        let err = TextureStream::check_read_ahead(&mut stream, 5).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        assert_eq!(TextureStream::tell(&mut stream).unwrap(), 0);
    }

    #[test]
    fn skip_and_remaining_track_position() {
        let mut stream = Cursor::new(vec![0u8; 10]);
        TextureStream::skip(&mut stream, 3).unwrap();
        assert_eq!(TextureStream::remaining(&mut stream).unwrap(), 7);
        let mut buf = [0u8; 2];
        TextureStream::read_exact(&mut stream, &mut buf).unwrap();
        assert_eq!(TextureStream::tell(&mut stream).unwrap(), 5);
    }
}
