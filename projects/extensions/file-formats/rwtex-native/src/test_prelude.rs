//! Common test imports and utilities
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]

pub use rstest::rstest;
pub use std::io::Cursor;
pub use std::sync::Arc;
pub use std::{format, string::String, vec, vec::Vec};

pub use crate::codec::NativeCodec;
pub use crate::d3d_format::D3dFormatHandler;
pub use crate::header::*;
pub use crate::kind::*;
pub use crate::stream::TextureStream;
pub use crate::texture::*;

pub use rwtex_common::allocate::*;
pub use rwtex_common::error::*;
pub use rwtex_common::format::*;
pub use rwtex_common::warning::*;
pub use rwtex_pixels::{ConversionConfig, MipmapLayer, PixelDataTraversal, TextureContext};
