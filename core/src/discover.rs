use crate::error::{IndexError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Check that `root` exists and is a directory.
pub fn validate_root(root: &Path) -> Result<()> {
    let meta = fs::metadata(root).map_err(|source| IndexError::RootAccess {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(IndexError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Lexically clean a path: drop `.` components, collapse repeated separators
/// and resolve `..` against preceding normal components.
///
/// `./corpus//a.txt` becomes `corpus/a.txt`; an empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            _ => out.push(comp),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Recursively list every regular file under `root`, sorted by path.
///
/// Symlinks are neither followed nor listed. The first walk error aborts.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(clean_path(entry.path()));
        }
    }
    files.sort();
    tracing::info!(root = %root.display(), files = files.len(), "discovered files");
    Ok(files)
}
