//! Caller-selected byte order for multi-byte fields.
//!
//! Native textures are little endian, but the block codec can write its
//! fields in either order so the same blocks can be produced for big
//! endian consoles.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// The byte order of the machine running this code.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    #[inline]
    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Self::Little => LittleEndian::read_u16(buf),
            Self::Big => BigEndian::read_u16(buf),
        }
    }

    #[inline]
    pub fn write_u16(self, buf: &mut [u8], value: u16) {
        match self {
            Self::Little => LittleEndian::write_u16(buf, value),
            Self::Big => BigEndian::write_u16(buf, value),
        }
    }

    #[inline]
    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Self::Little => LittleEndian::read_u32(buf),
            Self::Big => BigEndian::read_u32(buf),
        }
    }

    #[inline]
    pub fn write_u32(self, buf: &mut [u8], value: u32) {
        match self {
            Self::Little => LittleEndian::write_u32(buf, value),
            Self::Big => BigEndian::write_u32(buf, value),
        }
    }

    /// Reads an unsigned integer of `nbytes` bytes (1 to 8).
    #[inline]
    pub fn read_uint(self, buf: &[u8], nbytes: usize) -> u64 {
        match self {
            Self::Little => LittleEndian::read_uint(buf, nbytes),
            Self::Big => BigEndian::read_uint(buf, nbytes),
        }
    }

    /// Writes the low `nbytes` bytes (1 to 8) of `value`.
    #[inline]
    pub fn write_uint(self, buf: &mut [u8], value: u64, nbytes: usize) {
        match self {
            Self::Little => LittleEndian::write_uint(buf, value, nbytes),
            Self::Big => BigEndian::write_uint(buf, value, nbytes),
        }
    }
}
