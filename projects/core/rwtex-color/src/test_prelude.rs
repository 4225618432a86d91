//! Common test imports and utilities
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]

pub use rstest::rstest;
pub use std::{format, string::String, vec, vec::Vec};

pub use crate::abstract_color::{luminance_of, AbstractColor, ColorF32};
pub use crate::dispatcher::ColorDispatcher;
pub use crate::error::*;
pub use crate::palette_index::*;
pub use crate::scale::*;
pub use crate::sizing::*;

pub use rwtex_common::color_565::Color565;
pub use rwtex_common::color_8888::Color8888;
pub use rwtex_common::format::*;
