use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write rendered output: {0}")]
    Io(#[from] io::Error),
}

/// Reasons an image could not be shown. The renderer logs these and falls back to text.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image location: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported image scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("image location `{0}` is not a local path")]
    InvalidPath(String),
    #[error("failed to read image: {0}")]
    Io(#[from] io::Error),
    #[error("failed to fetch image: {0}")]
    Http(Box<ureq::Error>),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl From<ureq::Error> for ImageError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(Box::new(err))
    }
}
