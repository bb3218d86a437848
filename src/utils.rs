use crate::export::error::OutputError;
use log::info;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

pub async fn ensure_output_dir_exists(path: &Path) -> Result<(), OutputError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(OutputError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| OutputError::DirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(OutputError::DirCreation(path.to_path_buf(), e)),
    }
}

/// Writes `path` through a temp file in the same directory that is renamed
/// into place once `write` succeeded.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut NamedTempFile) -> Result<(), OutputError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file =
        NamedTempFile::new_in(dir).map_err(|e| OutputError::Write(path.to_path_buf(), e))?;
    write(&mut temp_file)?;
    temp_file
        .flush()
        .map_err(|e| OutputError::Write(path.to_path_buf(), e))?;
    temp_file
        .persist(path)
        .map_err(|e| OutputError::Write(path.to_path_buf(), e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        ensure_output_dir_exists(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op.
        ensure_output_dir_exists(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_file_in_the_way() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        let err = ensure_output_dir_exists(&file).await.unwrap_err();
        assert!(matches!(err, OutputError::NotADirectory(_)));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("out.txt");
        let result = write_atomically(&target, |_| {
            Err(OutputError::Write(
                target.clone(),
                io::Error::new(io::ErrorKind::Other, "boom"),
            ))
        });
        assert!(result.is_err());
        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
