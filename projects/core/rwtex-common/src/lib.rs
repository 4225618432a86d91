#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod allocate;
pub mod color_565;
pub mod color_8888;
pub mod decoded_4x4_block;
pub mod endian;
pub mod error;
pub mod format;
pub mod warning;

#[cfg(test)]
pub mod test_prelude;
