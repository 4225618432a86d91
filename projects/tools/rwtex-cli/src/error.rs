use rwtex_common::error::TextureError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error("{path}: {source}")]
    File {
        path: String,
        #[source]
        source: TextureError,
    },
    /// The source texture is already in the requested format and layout.
    #[error("nothing to convert")]
    Unchanged,
}
