use std::path::{Path, PathBuf};

use url::Url;

use super::status::TileFault;

/// A user supplied source string, classified once per connect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReference {
    /// Anything that parses as an absolute URI (rtsp, http, udp, file, ...).
    Network(Url),
    /// An existing local file, as an absolute path.
    File(PathBuf),
}

impl SourceReference {
    /// Classify an already trimmed, non-empty source string.
    ///
    /// Absolute URIs win. Everything else is a filesystem path, resolved
    /// against the working directory; the file has to exist.
    pub fn classify(input: &str) -> Result<Self, TileFault> {
        if let Some(url) = parse_absolute_uri(input) {
            return Ok(SourceReference::Network(url));
        }

        let path = std::path::absolute(Path::new(input)).map_err(|e| {
            TileFault::OpenOrPlayFailure(format!("Cannot resolve path {input:?}: {e}"))
        })?;

        if !path.is_file() {
            return Err(TileFault::FileNotFound(path));
        }

        Ok(SourceReference::File(path))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceReference::Network(_) => "network",
            SourceReference::File(_) => "file",
        }
    }
}

fn parse_absolute_uri(input: &str) -> Option<Url> {
    let url = Url::parse(input).ok()?;
    // `C:\videos\a.mp4` parses with scheme "c"
    if url.scheme().len() == 1 {
        return None;
    }
    Some(url)
}
