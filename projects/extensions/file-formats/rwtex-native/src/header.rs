//! The fixed 88 byte header shared by all native texture layouts.
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0x00 | 4 | platform id |
//! | 0x04 | 4 | [`TextureFormatInfo`] |
//! | 0x08 | 32 | name |
//! | 0x28 | 32 | mask name |
//! | 0x48 | 4 | [`RasterFlags`] |
//! | 0x4C | 4 | platform format field |
//! | 0x50 | 2 | width |
//! | 0x52 | 2 | height |
//! | 0x54 | 1 | depth |
//! | 0x55 | 1 | mip count |
//! | 0x56 | 1 | raster type |
//! | 0x57 | 1 | platform flags field |
//!
//! All fields are little endian.

use bitfield::bitfield;
use byteorder::{ByteOrder, LittleEndian};
use rwtex_common::format::RasterFlags;

pub const HEADER_SIZE: usize = 0x58;

const PLATFORM_OFFSET: usize = 0x00;
const FORMAT_INFO_OFFSET: usize = 0x04;
const NAME_OFFSET: usize = 0x08;
const MASK_NAME_OFFSET: usize = 0x28;
const RASTER_FLAGS_OFFSET: usize = 0x48;
const PLATFORM_FORMAT_OFFSET: usize = 0x4C;
const WIDTH_OFFSET: usize = 0x50;
const HEIGHT_OFFSET: usize = 0x52;
const DEPTH_OFFSET: usize = 0x54;
const MIP_COUNT_OFFSET: usize = 0x55;
const RASTER_TYPE_OFFSET: usize = 0x56;
const PLATFORM_FLAGS_OFFSET: usize = 0x57;

/// Length of the NUL padded name fields.
pub const NAME_LENGTH: usize = 32;

bitfield! {
    /// Sampler state stored with the texture.
    ///
    /// Bit layout:
    /// - Bits 0-7: Filter mode
    /// - Bits 8-11: U addressing
    /// - Bits 12-15: V addressing
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureFormatInfo(u32);
    impl Debug;
    u32;

    pub filter_mode, set_filter_mode: 7, 0;
    pub u_addressing, set_u_addressing: 11, 8;
    pub v_addressing, set_v_addressing: 15, 12;
}

impl TextureFormatInfo {
    #[inline]
    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// The header fields as stored, before any platform specific interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NativeHeader {
    pub platform_id: u32,
    pub format_info: TextureFormatInfo,
    pub name: String,
    pub mask_name: String,
    pub raster_flags: RasterFlags,
    /// D3D8: has-alpha, D3D9: D3DFORMAT, mobile: GL internal format.
    pub platform_format: u32,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub mip_count: u8,
    pub raster_type: u8,
    /// D3D8: compression, D3D9 and mobile: flag bits.
    pub platform_flags: u8,
}

impl NativeHeader {
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            platform_id: LittleEndian::read_u32(&bytes[PLATFORM_OFFSET..]),
            format_info: TextureFormatInfo::from_raw(LittleEndian::read_u32(
                &bytes[FORMAT_INFO_OFFSET..],
            )),
            name: read_name(&bytes[NAME_OFFSET..NAME_OFFSET + NAME_LENGTH]),
            mask_name: read_name(&bytes[MASK_NAME_OFFSET..MASK_NAME_OFFSET + NAME_LENGTH]),
            raster_flags: RasterFlags::from_raw(LittleEndian::read_u32(
                &bytes[RASTER_FLAGS_OFFSET..],
            )),
            platform_format: LittleEndian::read_u32(&bytes[PLATFORM_FORMAT_OFFSET..]),
            width: LittleEndian::read_u16(&bytes[WIDTH_OFFSET..]),
            height: LittleEndian::read_u16(&bytes[HEIGHT_OFFSET..]),
            depth: bytes[DEPTH_OFFSET],
            mip_count: bytes[MIP_COUNT_OFFSET],
            raster_type: bytes[RASTER_TYPE_OFFSET],
            platform_flags: bytes[PLATFORM_FLAGS_OFFSET],
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        LittleEndian::write_u32(&mut bytes[PLATFORM_OFFSET..], self.platform_id);
        LittleEndian::write_u32(&mut bytes[FORMAT_INFO_OFFSET..], self.format_info.raw());
        write_name(&mut bytes[NAME_OFFSET..NAME_OFFSET + NAME_LENGTH], &self.name);
        write_name(
            &mut bytes[MASK_NAME_OFFSET..MASK_NAME_OFFSET + NAME_LENGTH],
            &self.mask_name,
        );
        LittleEndian::write_u32(&mut bytes[RASTER_FLAGS_OFFSET..], self.raster_flags.raw());
        LittleEndian::write_u32(&mut bytes[PLATFORM_FORMAT_OFFSET..], self.platform_format);
        LittleEndian::write_u16(&mut bytes[WIDTH_OFFSET..], self.width);
        LittleEndian::write_u16(&mut bytes[HEIGHT_OFFSET..], self.height);
        bytes[DEPTH_OFFSET] = self.depth;
        bytes[MIP_COUNT_OFFSET] = self.mip_count;
        bytes[RASTER_TYPE_OFFSET] = self.raster_type;
        bytes[PLATFORM_FLAGS_OFFSET] = self.platform_flags;
        bytes
    }
}

/// Reads a NUL terminated name. Invalid UTF-8 is replaced.
fn read_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Writes `name` NUL padded, truncated so at least one NUL remains.
fn write_name(field: &mut [u8], name: &str) {
    let bytes = name.as_bytes();
    let len = bytes.len().min(field.len() - 1);
    field[..len].copy_from_slice(&bytes[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[test]
    fn parses_known_offsets() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0x00] = 9;
        bytes[0x04..0x08].copy_from_slice(&0x1102u32.to_le_bytes());
        bytes[0x08..0x0D].copy_from_slice(b"brick");
        bytes[0x28..0x2C].copy_from_slice(b"mask");
        bytes[0x48..0x4C].copy_from_slice(&0x8500u32.to_le_bytes());
        bytes[0x4C..0x50].copy_from_slice(&21u32.to_le_bytes());
        bytes[0x50..0x52].copy_from_slice(&256u16.to_le_bytes());
        bytes[0x52..0x54].copy_from_slice(&128u16.to_le_bytes());
        bytes[0x54] = 32;
        bytes[0x55] = 9;
        bytes[0x56] = 4;
        bytes[0x57] = 0x01;

        let header = NativeHeader::parse(&bytes);
        assert_eq!(header.platform_id, 9);
        assert_eq!(header.format_info.filter_mode(), 2);
        assert_eq!(header.format_info.u_addressing(), 1);
        assert_eq!(header.format_info.v_addressing(), 1);
        assert_eq!(header.name, "brick");
        assert_eq!(header.mask_name, "mask");
        assert_eq!(header.raster_flags.raster_format(), Some(RasterFormat::Format8888));
        assert!(header.raster_flags.mipmap());
        assert_eq!(header.platform_format, 21);
        assert_eq!((header.width, header.height), (256, 128));
        assert_eq!((header.depth, header.mip_count, header.raster_type), (32, 9, 4));
        assert_eq!(header.platform_flags, 1);

        assert_eq!(header.to_bytes(), bytes);
    }

    #[test]
    fn long_names_keep_a_terminator() {
        let header = NativeHeader {
            name: "x".repeat(40),
            ..Default::default()
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes[NAME_OFFSET + NAME_LENGTH - 1], 0);
        assert_eq!(NativeHeader::parse(&bytes).name.len(), NAME_LENGTH - 1);
    }
}
