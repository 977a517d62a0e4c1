use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File, create_dir_all};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::StorageError;

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Create the store file holding an empty JSON array if it is missing
pub fn ensure_store_file(path: &Path) -> Result<(), StorageError> {
    if path.exists() {
        return Ok(());
    }

    create_dir_all(parent_dir(path)).map_err(|e| StorageError::unwritable(path, e))?;

    let mut file = File::create(path).map_err(|e| StorageError::unwritable(path, e))?;
    file.write_all(b"[]")
        .map_err(|e| StorageError::unwritable(path, e))?;

    log::info!("Created empty store at {}", path.display());
    Ok(())
}

/// Read every record of a JSON array file
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    ensure_store_file(path)?;

    let file = File::open(path).map_err(|e| StorageError::unreadable(path, e))?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|e| StorageError::unreadable(path, e))
}

/// Read every record, treating an unreadable or corrupted file as empty
pub fn load_records_or_empty<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match load_records(path) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Falling back to an empty collection: {}", e);
            Vec::new()
        }
    }
}

/// Where a corrupted store is copied before it gets overwritten
pub fn corrupt_copy_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

/// Read every record ahead of a rewrite
///
/// Like [`load_records_or_empty`], but an unparseable file is first copied
/// to [`corrupt_copy_path`] so the old contents survive the next save.
/// Fails if that copy cannot be made.
pub fn load_records_for_update<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    match load_records(path) {
        Ok(records) => Ok(records),
        Err(e) => {
            log::warn!("Falling back to an empty collection: {}", e);
            if path.is_file() {
                let backup = corrupt_copy_path(path);
                fs::copy(path, &backup).map_err(|e| StorageError::unwritable(&backup, e))?;
                log::warn!("Kept the unreadable contents at {}", backup.display());
            }
            Ok(Vec::new())
        }
    }
}

/// Replace the file contents with `records`
///
/// The array is written to a temporary file in the same directory and
/// renamed over the target, so readers see either the old or the new
/// contents and never a partial write.
pub fn save_records<T: Serialize>(records: &[T], path: &Path) -> Result<(), StorageError> {
    let dir = parent_dir(path);
    create_dir_all(dir).map_err(|e| StorageError::unwritable(path, e))?;

    let temp = NamedTempFile::new_in(dir).map_err(|e| StorageError::unwritable(path, e))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(|e| StorageError::unwritable(path, e))?;
        writer.flush().map_err(|e| StorageError::unwritable(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| StorageError::unwritable(path, e.error))?;

    Ok(())
}
