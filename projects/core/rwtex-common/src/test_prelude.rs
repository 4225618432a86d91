//! Common test imports and utilities
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]

pub use rstest::rstest;
pub use std::{format, string::String, vec, vec::Vec};

pub use crate::allocate::*;
pub use crate::color_565::Color565;
pub use crate::color_8888::Color8888;
pub use crate::decoded_4x4_block::Decoded4x4Block;
pub use crate::endian::Endianness;
pub use crate::error::*;
pub use crate::format::*;
pub use crate::warning::*;
