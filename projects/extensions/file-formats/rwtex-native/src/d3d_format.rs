//! D3DFORMAT codes stored by D3D9 textures and their pixel layouts.

use rwtex_common::format::{ColorOrder, CompressionType, RasterFormat};

/// Packs four ASCII characters the way D3D stores FOURCC codes.
pub const fn make_fourcc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

pub const D3DFMT_R8G8B8: u32 = 20;
pub const D3DFMT_A8R8G8B8: u32 = 21;
pub const D3DFMT_X8R8G8B8: u32 = 22;
pub const D3DFMT_R5G6B5: u32 = 23;
pub const D3DFMT_X1R5G5B5: u32 = 24;
pub const D3DFMT_A1R5G5B5: u32 = 25;
pub const D3DFMT_A4R4G4B4: u32 = 26;
pub const D3DFMT_A8B8G8R8: u32 = 32;
pub const D3DFMT_X8B8G8R8: u32 = 33;
pub const D3DFMT_P8: u32 = 41;
pub const D3DFMT_L8: u32 = 50;
pub const D3DFMT_A8L8: u32 = 51;
pub const D3DFMT_A4L4: u32 = 52;
pub const D3DFMT_D32: u32 = 71;
pub const D3DFMT_D16: u32 = 80;
pub const D3DFMT_DXT1: u32 = make_fourcc(b'D', b'X', b'T', b'1');
pub const D3DFMT_DXT2: u32 = make_fourcc(b'D', b'X', b'T', b'2');
pub const D3DFMT_DXT3: u32 = make_fourcc(b'D', b'X', b'T', b'3');
pub const D3DFMT_DXT4: u32 = make_fourcc(b'D', b'X', b'T', b'4');
pub const D3DFMT_DXT5: u32 = make_fourcc(b'D', b'X', b'T', b'5');

/// Uncompressed D3DFORMATs with their raster format, depth and channel order.
const RAW_FORMATS: [(u32, RasterFormat, u32, ColorOrder); 14] = [
    (D3DFMT_R8G8B8, RasterFormat::Format888, 24, ColorOrder::Bgra),
    (D3DFMT_A8R8G8B8, RasterFormat::Format8888, 32, ColorOrder::Bgra),
    (D3DFMT_X8R8G8B8, RasterFormat::Format888, 32, ColorOrder::Bgra),
    (D3DFMT_R5G6B5, RasterFormat::Format565, 16, ColorOrder::Bgra),
    (D3DFMT_X1R5G5B5, RasterFormat::Format555, 16, ColorOrder::Bgra),
    (D3DFMT_A1R5G5B5, RasterFormat::Format1555, 16, ColorOrder::Bgra),
    (D3DFMT_A4R4G4B4, RasterFormat::Format4444, 16, ColorOrder::Bgra),
    (D3DFMT_A8B8G8R8, RasterFormat::Format8888, 32, ColorOrder::Rgba),
    (D3DFMT_X8B8G8R8, RasterFormat::Format888, 32, ColorOrder::Rgba),
    (D3DFMT_L8, RasterFormat::Luminance, 8, ColorOrder::Bgra),
    (D3DFMT_A8L8, RasterFormat::LuminanceAlpha, 16, ColorOrder::Bgra),
    (D3DFMT_A4L4, RasterFormat::LuminanceAlpha, 8, ColorOrder::Bgra),
    (D3DFMT_D16, RasterFormat::Depth16, 16, ColorOrder::Bgra),
    (D3DFMT_D32, RasterFormat::Depth32, 32, ColorOrder::Bgra),
];

/// Layout of an uncompressed, unpalettized D3DFORMAT.
pub fn raw_layout(code: u32) -> Option<(RasterFormat, u32, ColorOrder)> {
    RAW_FORMATS
        .iter()
        .find(|(known, ..)| *known == code)
        .map(|&(_, raster_format, depth, order)| (raster_format, depth, order))
}

/// The D3DFORMAT storing the given uncompressed layout.
pub fn code_for_raw(raster_format: RasterFormat, depth: u32, order: ColorOrder) -> Option<u32> {
    RAW_FORMATS
        .iter()
        .find(|&&(_, rf, d, o)| rf == raster_format && d == depth && o == order)
        .map(|&(code, ..)| code)
}

pub fn compression_for_code(code: u32) -> Option<CompressionType> {
    match code {
        D3DFMT_DXT1 => Some(CompressionType::Dxt1),
        D3DFMT_DXT2 => Some(CompressionType::Dxt2),
        D3DFMT_DXT3 => Some(CompressionType::Dxt3),
        D3DFMT_DXT4 => Some(CompressionType::Dxt4),
        D3DFMT_DXT5 => Some(CompressionType::Dxt5),
        _ => None,
    }
}

pub fn code_for_compression(compression: CompressionType) -> Option<u32> {
    match compression {
        CompressionType::None => None,
        CompressionType::Dxt1 => Some(D3DFMT_DXT1),
        CompressionType::Dxt2 => Some(D3DFMT_DXT2),
        CompressionType::Dxt3 => Some(D3DFMT_DXT3),
        CompressionType::Dxt4 => Some(D3DFMT_DXT4),
        CompressionType::Dxt5 => Some(D3DFMT_DXT5),
    }
}

/// Whether the D3D9 codec understands `code` without an external handler.
#[inline]
pub fn is_known_code(code: u32) -> bool {
    code == D3DFMT_P8 || raw_layout(code).is_some() || compression_for_code(code).is_some()
}

/// Sizing for a D3DFORMAT the D3D9 codec does not understand itself.
///
/// Mips of such formats are read and written as opaque bytes. The raster
/// format cross-check is skipped for them.
pub trait D3dFormatHandler: Send + Sync {
    /// Human readable name of the format.
    fn name(&self) -> &str;

    /// Bytes one `width` x `height` mip of this format occupies.
    fn format_data_size(&self, width: u32, height: u32) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    #[test]
    fn fourcc_matches_ascii_bytes() {
        assert_eq!(D3DFMT_DXT1.to_le_bytes(), *b"DXT1");
        assert_eq!(D3DFMT_DXT5, 0x3554_5844);
    }

    #[test]
    fn raw_table_is_invertible() {
        for (code, raster_format, depth, order) in RAW_FORMATS {
            assert_eq!(raw_layout(code), Some((raster_format, depth, order)));
            assert_eq!(code_for_raw(raster_format, depth, order), Some(code));
        }
    }

    #[rstest]
    #[case(D3DFMT_P8, true)]
    #[case(D3DFMT_DXT3, true)]
    #[case(D3DFMT_A4R4G4B4, true)]
    #[case(make_fourcc(b'A', b'T', b'I', b'2'), false)]
    #[case(0, false)]
    fn known_codes(#[case] code: u32, #[case] known: bool) {
        assert_eq!(is_known_code(code), known);
    }

    #[test]
    fn compression_codes_round_trip() {
        for &compression in CompressionType::all_values() {
            if let Some(code) = code_for_compression(compression) {
                assert_eq!(compression_for_code(code), Some(compression));
            }
        }
    }
}
