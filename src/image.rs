// Calibration image loading.
//
// A loaded image is the file's bytes verbatim; nothing is decoded or
// transformed here. The file handle is scoped to the read and released on
// every exit path. With the `checksums` feature a SHA-256 fingerprint is
// computed at load time for display in diff headers.

use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "checksums")]
use sha2::{Digest, Sha256};

/// An immutable calibration image buffer plus where it came from.
#[derive(Debug, Clone)]
pub struct RomImage {
    path: PathBuf,
    data: Vec<u8>,
    #[cfg(feature = "checksums")]
    sha256: [u8; 32],
}

impl RomImage {
    /// Read the whole image into memory.
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = std::fs::read(path)?;
        log::debug!("loaded {} ({} bytes)", path.display(), data.len());
        #[cfg(feature = "checksums")]
        let sha256 = {
            let mut h = Sha256::new();
            h.update(&data);
            h.finalize().into()
        };
        Ok(Self {
            path: path.to_path_buf(),
            data,
            #[cfg(feature = "checksums")]
            sha256,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bare file name, for listings and error messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lowercase hex SHA-256 of the image contents.
    #[cfg(feature = "checksums")]
    pub fn sha256_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.sha256 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
