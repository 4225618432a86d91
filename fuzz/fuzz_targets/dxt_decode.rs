#![no_main]

// Decodes arbitrary blocks of every variant and checks the alpha rules
// that hold regardless of the color endpoints.

use libfuzzer_sys::{arbitrary, fuzz_target};
use rwtex_common::endian::Endianness;
use rwtex_dxt::{decode_block, DxtVariant};

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct Block {
    pub variant: u8,
    pub big_endian: bool,
    pub bytes: [u8; 16],
}

fuzz_target!(|block: Block| {
    let variants = DxtVariant::all_values();
    let variant = variants[block.variant as usize % variants.len()];
    let order = if block.big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    };

    let decoded = decode_block(variant, &block.bytes, order).expect("16 bytes fit every variant");

    match variant {
        DxtVariant::Dxt1 => {
            let (c0, c1) = match order {
                Endianness::Little => (
                    u16::from_le_bytes([block.bytes[0], block.bytes[1]]),
                    u16::from_le_bytes([block.bytes[2], block.bytes[3]]),
                ),
                Endianness::Big => (
                    u16::from_be_bytes([block.bytes[0], block.bytes[1]]),
                    u16::from_be_bytes([block.bytes[2], block.bytes[3]]),
                ),
            };
            for pixel in decoded.pixels {
                assert!(pixel.a == 0 || pixel.a == 255);
                if c0 > c1 {
                    assert_eq!(pixel.a, 255, "four color blocks are opaque");
                }
            }
        }
        DxtVariant::Dxt3 => {
            for pixel in decoded.pixels {
                assert_eq!(pixel.a % 17, 0, "explicit alpha expands 4 bits");
            }
        }
        _ => {}
    }

    // A truncated block is an error, never a panic.
    assert!(decode_block(variant, &block.bytes[..7], order).is_err());
});
