use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use crate::error::AssetError;

/// Where an asset's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Path(PathBuf),
    Url(String),
}

impl AssetSource {
    /// `http://` and `https://` locations become URLs; everything else is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }

    /// Fetch the full contents.
    pub fn read(&self) -> Result<Vec<u8>, AssetError> {
        match self {
            Self::Path(path) => Ok(std::fs::read(path)?),
            Self::Url(url) => {
                let mut response = reqwest::blocking::get(url)?.error_for_status()?;
                let mut bytes = Vec::with_capacity(initial_capacity(response.content_length()));
                response.read_to_end(&mut bytes)?;
                tracing::debug!(url = %url, bytes = bytes.len(), "fetched remote asset");
                Ok(bytes)
            }
        }
    }
}

/// Upper bound on the buffer reserved from an advertised `Content-Length`.
/// Larger bodies still load; the buffer grows as bytes arrive.
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length.map_or(0, |len| len.min(MAX_PREALLOCATION) as usize)
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

impl From<&str> for AssetSource {
    fn from(location: &str) -> Self {
        Self::parse(location)
    }
}
