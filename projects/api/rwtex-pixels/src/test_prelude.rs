//! Common test imports and utilities
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]

pub use rstest::rstest;
pub use std::sync::Arc;
pub use std::{format, string::String, vec, vec::Vec};

pub use crate::config::ConversionConfig;
pub use crate::context::TextureContext;
pub use crate::convert::{convert_pixel_data, remap_to_palette};
pub use crate::layer::MipmapLayer;
pub use crate::mipmaps::generate_mipmaps;
pub use crate::sizing::*;
pub use crate::traversal::PixelDataTraversal;

pub use rwtex_common::allocate::*;
pub use rwtex_common::color_8888::Color8888;
pub use rwtex_common::error::*;
pub use rwtex_common::format::*;
pub use rwtex_common::warning::*;
pub use rwtex_dxt::DxtVariant;
pub use rwtex_palette::PaletteRuntime;
