use rwtex_common::error::TextureError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DxtError {
    #[error("unknown DXT variant {0}")]
    UnknownVariant(u32),

    #[error("block data is too short: needs {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
}

pub type DxtResult<T> = Result<T, DxtError>;

impl From<DxtError> for TextureError {
    fn from(value: DxtError) -> Self {
        match value {
            DxtError::UnknownVariant(_) => TextureError::Unsupported(value.to_string()),
            DxtError::BufferTooSmall { .. } => TextureError::CorruptData(value.to_string()),
        }
    }
}
