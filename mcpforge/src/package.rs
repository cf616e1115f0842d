//! Zip packaging of a generated server.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{GenerateError, Result};
use crate::templates::START_SCRIPT;

/// Zip the contents of `source_dir` into `archive_path`.
///
/// Entries are stored relative to `source_dir`, with `/` separators, in
/// file name order. Returns the number of files written.
pub fn zip_directory(source_dir: &Path, archive_path: &Path) -> Result<usize> {
    let file = File::create(archive_path).map_err(|e| GenerateError::write(archive_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut files = 0;

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| GenerateError::package(archive_path, e))?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| GenerateError::package(archive_path, e))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), entry_options(0o755))
                .map_err(|e| GenerateError::package(archive_path, e))?;
            continue;
        }

        let options = entry_options(if name == START_SCRIPT { 0o755 } else { 0o644 });
        let bytes = std::fs::read(entry.path()).map_err(|e| GenerateError::read(entry.path(), e))?;
        zip.start_file(name, options)
            .map_err(|e| GenerateError::package(archive_path, e))?;
        zip.write_all(&bytes)
            .map_err(|e| GenerateError::write(archive_path, e))?;
        files += 1;
    }

    let mut writer = zip
        .finish()
        .map_err(|e| GenerateError::package(archive_path, e))?;
    writer
        .flush()
        .map_err(|e| GenerateError::write(archive_path, e))?;

    tracing::info!(archive = %archive_path.display(), files, "Archive written");
    Ok(files)
}

fn entry_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(mode)
}
