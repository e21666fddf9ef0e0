//! Texture dimension probing.
//!
//! Only headers are read. A 16K texture can be hundreds of megabytes, so
//! decoding pixel data just to learn its size is not an option.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Dimensions;

const DDS_MAGIC: &[u8; 4] = b"DDS ";
const DDS_HEADER_SIZE: usize = 124;

/// Why a texture's dimensions could not be read.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not a DDS file (bad magic)")]
    BadMagic { path: PathBuf },

    #[error("{path} has a truncated or malformed DDS header")]
    BadHeader { path: PathBuf },

    #[error("{path} declares an empty surface ({width}x{height})")]
    EmptySurface {
        path: PathBuf,
        width: u32,
        height: u32,
    },

    #[error("unsupported texture container {path}: {message}")]
    Unsupported { path: PathBuf, message: String },
}

/// Read the declared width and height of a texture container.
///
/// `.dds` files are read natively from their header. Anything else is
/// handed to `image`, which also stops after the header.
pub fn read_dimensions(path: &Path) -> Result<Dimensions, MetadataError> {
    let is_dds = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("dds"))
        .unwrap_or(false);

    let dimensions = if is_dds {
        read_dds_dimensions(path)?
    } else {
        read_image_dimensions(path)?
    };

    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(MetadataError::EmptySurface {
            path: path.to_path_buf(),
            width: dimensions.width,
            height: dimensions.height,
        });
    }

    Ok(dimensions)
}

fn read_dds_dimensions(path: &Path) -> Result<Dimensions, MetadataError> {
    let mut file = File::open(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut buf = [0u8; 4 + DDS_HEADER_SIZE];
    file.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => MetadataError::BadHeader {
            path: path.to_path_buf(),
        },
        _ => MetadataError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    parse_dds_header(&buf).map_err(|kind| match kind {
        HeaderFault::Magic => MetadataError::BadMagic {
            path: path.to_path_buf(),
        },
        HeaderFault::Size => MetadataError::BadHeader {
            path: path.to_path_buf(),
        },
    })
}

enum HeaderFault {
    Magic,
    Size,
}

/// Parse the magic plus DDS_HEADER (dwSize, dwFlags, dwHeight, dwWidth, ...).
fn parse_dds_header(buf: &[u8; 4 + DDS_HEADER_SIZE]) -> Result<Dimensions, HeaderFault> {
    if &buf[0..4] != DDS_MAGIC {
        return Err(HeaderFault::Magic);
    }

    let size = read_u32_le(buf, 4);
    if size as usize != DDS_HEADER_SIZE {
        return Err(HeaderFault::Size);
    }

    let height = read_u32_le(buf, 12);
    let width = read_u32_le(buf, 16);

    Ok(Dimensions::new(width, height))
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_image_dimensions(path: &Path) -> Result<Dimensions, MetadataError> {
    let reader = image::ImageReader::open(path)
        .map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| MetadataError::Unsupported {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(Dimensions::new(width, height))
}

/// Build a minimal uncompressed DDS header for the given size.
#[cfg(test)]
pub(crate) fn dds_header(width: u32, height: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 4 + DDS_HEADER_SIZE];
    buf[0..4].copy_from_slice(DDS_MAGIC);
    buf[4..8].copy_from_slice(&(DDS_HEADER_SIZE as u32).to_le_bytes());
    // DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT
    buf[8..12].copy_from_slice(&0x1007u32.to_le_bytes());
    buf[12..16].copy_from_slice(&height.to_le_bytes());
    buf[16..20].copy_from_slice(&width.to_le_bytes());
    buf
}

/// Write a header-only DDS file; enough for the dimension reader.
#[cfg(test)]
pub(crate) fn write_test_dds(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, dds_header(width, height)).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_dds_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wing.dds");
        write_test_dds(&path, 16384, 8192);

        let dims = read_dimensions(&path).unwrap();

        assert_eq!(dims, Dimensions::new(16384, 8192));
    }

    #[test]
    fn test_uppercase_extension_uses_dds_reader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("WING.DDS");
        write_test_dds(&path, 4096, 2048);

        assert_eq!(read_dimensions(&path).unwrap(), Dimensions::new(4096, 2048));
    }

    #[test]
    fn test_header_only_file_is_enough() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.dds");
        write_test_dds(&path, 32768, 32768);

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 128);
        assert_eq!(read_dimensions(&path).unwrap(), Dimensions::new(32768, 32768));
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.dds");
        let mut bytes = dds_header(1024, 1024);
        bytes[0..4].copy_from_slice(b"PNG ");
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(read_dimensions(&path), Err(MetadataError::BadMagic { .. })));
    }

    #[test]
    fn test_truncated_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.dds");
        std::fs::write(&path, &dds_header(1024, 1024)[..40]).unwrap();

        assert!(matches!(read_dimensions(&path), Err(MetadataError::BadHeader { .. })));
    }

    #[test]
    fn test_wrong_header_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("odd.dds");
        let mut bytes = dds_header(1024, 1024);
        bytes[4..8].copy_from_slice(&100u32.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(read_dimensions(&path), Err(MetadataError::BadHeader { .. })));
    }

    #[test]
    fn test_empty_surface() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.dds");
        write_test_dds(&path, 0, 512);

        assert!(matches!(
            read_dimensions(&path),
            Err(MetadataError::EmptySurface { width: 0, height: 512, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = read_dimensions(Path::new("/nonexistent/texture.dds"));
        assert!(matches!(result, Err(MetadataError::Io { .. })));
    }

    #[test]
    fn test_png_through_image_crate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decal.png");
        image::RgbaImage::new(12, 7).save(&path).unwrap();

        assert_eq!(read_dimensions(&path).unwrap(), Dimensions::new(12, 7));
    }

    #[test]
    fn test_garbage_non_dds_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decal.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(read_dimensions(&path), Err(MetadataError::Unsupported { .. })));
    }
}
