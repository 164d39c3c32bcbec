//! Whole-file reads and writes for file exchange.
//!
//! Received names are bare file names. Anything that could escape the
//! target directory is refused before touching the filesystem.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TetherError;
use crate::protocol::file::FileTransferPayload;

/// Reject names that are empty, relative-directory markers, or carry a
/// path separator, drive prefix, or NUL.
pub fn validate_file_name(name: &str) -> Result<(), TetherError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', ':', '\0']);
    if unsafe_name {
        return Err(TetherError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

/// Bare name of `path`, as sent alongside its contents.
pub fn file_name_of(path: &Path) -> Result<String, TetherError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TetherError::InvalidFileName(path.display().to_string()))?;
    validate_file_name(name)?;
    Ok(name.to_string())
}

/// Read a whole file into a transfer payload named after it.
pub async fn read_payload(path: &Path) -> Result<FileTransferPayload, TetherError> {
    let name = file_name_of(path)?;

    let len = tokio::fs::metadata(path).await?.len() as usize;
    let max = FileTransferPayload::max_data_len(&name);
    if len > max {
        return Err(TetherError::PayloadTooLarge { size: len, max });
    }

    let data = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = data.len(), "File read");
    Ok(FileTransferPayload::new(data, name))
}

/// Write `payload` into `dir` under its own name, replacing any existing
/// file. Returns the written path.
pub async fn write_payload(dir: &Path, payload: &FileTransferPayload) -> Result<PathBuf, TetherError> {
    validate_file_name(payload.name())?;
    let path = dir.join(payload.name());
    tokio::fs::write(&path, payload.data()).await?;
    debug!(path = %path.display(), bytes = payload.data().len(), "File written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_accepted() {
        for name in ["notes.txt", "archive.tar.gz", ".hidden", "no extension", "..."] {
            assert!(validate_file_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn traversal_and_separators_are_rejected() {
        for name in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", "C:evil", "nul\0byte"] {
            assert!(
                matches!(validate_file_name(name), Err(TetherError::InvalidFileName(_))),
                "{name:?}"
            );
        }
    }

    #[tokio::test]
    async fn write_then_read_keeps_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let payload = FileTransferPayload::new(vec![0xDE, 0xAD, 0xBE, 0xEF], "blob.bin");

        let path = write_payload(dir.path(), &payload).await.unwrap();
        assert_eq!(path, dir.path().join("blob.bin"));

        let read = read_payload(&path).await.unwrap();
        assert_eq!(read, payload);
    }

    #[tokio::test]
    async fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_payload(dir.path(), &FileTransferPayload::new(b"old contents".to_vec(), "f.txt"))
            .await
            .unwrap();
        write_payload(dir.path(), &FileTransferPayload::new(b"new".to_vec(), "f.txt"))
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("f.txt")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn empty_file_is_a_real_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();

        let payload = read_payload(&path).await.unwrap();
        assert!(payload.data().is_empty());
        assert_eq!(payload.name(), "empty.txt");
    }

    #[tokio::test]
    async fn unsafe_name_is_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir(&inner).unwrap();

        let evil = FileTransferPayload::new(b"x".to_vec(), "../escaped.txt");
        assert!(write_payload(&inner, &evil).await.is_err());
        assert!(!dir.path().join("escaped.txt").exists());
    }

    #[tokio::test]
    async fn file_too_big_for_its_envelope_is_refused_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.bin");
        // Sparse: fits the raw payload limit, not the bincode envelope.
        let file = std::fs::File::create(&path).unwrap();
        file.set_len((crate::packet::MAX_PAYLOAD_SIZE - 1) as u64).unwrap();

        match read_payload(&path).await {
            Err(TetherError::PayloadTooLarge { size, max }) => {
                assert_eq!(size, crate::packet::MAX_PAYLOAD_SIZE - 1);
                assert_eq!(max, FileTransferPayload::max_data_len("huge.bin"));
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_payload(&dir.path().join("absent.bin")).await.unwrap_err();
        assert!(matches!(err, TetherError::Io(_)));
    }
}
