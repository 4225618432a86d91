//! Common test imports and utilities
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]

pub use rstest::rstest;
pub use std::{format, string::String, vec, vec::Vec};

pub use crate::builder::*;
pub use crate::error::*;
pub use crate::external::*;
pub use crate::hsv::*;
pub use crate::native::*;
pub use crate::palette::*;

pub use rwtex_common::color_8888::Color8888;
pub use rwtex_common::format::PaletteType;
