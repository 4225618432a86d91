//! Common test imports and utilities
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]

pub use rstest::rstest;
pub use std::{format, string::String, vec, vec::Vec};

pub use crate::compressor::*;
pub use crate::decode::*;
pub use crate::encode::*;
pub use crate::error::*;
pub use crate::layer::*;
pub use crate::size::*;
pub use crate::variant::DxtVariant;

pub use rwtex_common::color_565::Color565;
pub use rwtex_common::color_8888::Color8888;
pub use rwtex_common::decoded_4x4_block::Decoded4x4Block;
pub use rwtex_common::endian::Endianness;
pub use rwtex_common::format::*;
