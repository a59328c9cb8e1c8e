use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use walkdir::WalkDir;

/// Collects the candidate text files under `root`. A regular file is
/// accepted directly; a directory is walked recursively keeping files with
/// a `txt` or `text` extension. Unreadable entries are reported and
/// skipped.
pub fn text_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(anyhow!("no such file or directory: {}", root.display()));
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_text_file(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%err, "skipping unreadable entry"),
        }
    }
    Ok(files)
}

fn is_text_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some(ext) if ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("text")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter() {
        assert!(is_text_file(Path::new("a.txt")));
        assert!(is_text_file(Path::new("b.TEXT")));
        assert!(!is_text_file(Path::new("c.md")));
        assert!(!is_text_file(Path::new("txt")));
    }
}
