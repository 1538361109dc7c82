//! File-system helpers for batch runs.

use crate::constants::JSON_EXTENSION;
use crate::{CoreError, CoreResult};
use canonical::ClinicalContent;
use std::fs;
use std::path::{Path, PathBuf};

/// `.json` files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`CoreError::FileRead`] if the directory cannot be listed.
pub fn input_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_err = |source| CoreError::FileRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == JSON_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_input(path: &Path) -> CoreResult<String> {
    fs::read_to_string(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` as JSON to `<output_dir>/<name>.json`, creating the directory if needed.
pub fn write_aggregate(
    output_dir: &Path,
    name: &str,
    content: &ClinicalContent,
    pretty: bool,
) -> CoreResult<PathBuf> {
    let path = output_dir.join(format!("{name}.{JSON_EXTENSION}"));
    let write_err = |source| CoreError::FileWrite {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(output_dir).map_err(write_err)?;
    let json = if pretty {
        serde_json::to_string_pretty(content)
    } else {
        serde_json::to_string(content)
    }
    .map_err(CoreError::Serialization)?;
    fs::write(&path, json).map_err(write_err)?;

    Ok(path)
}
