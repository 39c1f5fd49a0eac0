//! Map document output.
//!
//! The document is written as 4-space indented JSON. Files are replaced
//! atomically: the JSON goes to a temporary sibling first and is renamed over
//! the target, so a reader never sees a half-written map.

mod json;

pub use json::{to_json_string, to_json_writer};

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::MapDocument;

/// Write `document` to `path`, creating parent directories and replacing any
/// existing file.
pub fn write_document(document: &MapDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_file(document, &tmp) {
        // Best effort; the original error is the one worth reporting
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)?;
    tracing::info!(path = %path.display(), "wrote map document");
    Ok(())
}

fn write_file(document: &MapDocument, path: &Path) -> Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    to_json_writer(document, &mut out)?;
    out.flush()?;
    out.get_ref().sync_all()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
