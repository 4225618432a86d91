use rwtex_common::error::TextureError;
use rwtex_common::format::PaletteType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("cannot build a palette for palette type '{0}'")]
    InvalidTarget(PaletteType),

    #[error("palette budget must be between 1 and 256 colors, got {0}")]
    InvalidBudget(usize),

    #[error("external quantizer '{name}' failed: {message}")]
    External { name: String, message: String },
}

pub type PaletteResult<T> = Result<T, PaletteError>;

impl From<PaletteError> for TextureError {
    fn from(value: PaletteError) -> Self {
        match value {
            PaletteError::External { .. } => TextureError::CorruptData(value.to_string()),
            _ => TextureError::Unsupported(value.to_string()),
        }
    }
}
