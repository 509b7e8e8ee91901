use std::path::{Path, PathBuf};

/// Whether an existing file at the output path may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Allow,
    Refuse,
}

/// Writes rendered recipe text to `path`, creating parent directories.
pub fn write_recipe(path: &Path, content: &str, overwrite: Overwrite) -> Result<(), OutputError> {
    if overwrite == Overwrite::Refuse && path.exists() {
        return Err(OutputError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, content).map_err(|e| OutputError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote recipe");
    Ok(())
}

/// Check whether the file at `path` already holds exactly `content`.
///
/// A missing file is out of date.
pub fn is_up_to_date(path: &Path, content: &str) -> Result<bool, OutputError> {
    if !path.exists() {
        return Ok(false);
    }
    let existing = std::fs::read_to_string(path).map_err(|e| OutputError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(existing == content)
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to create output directory at {path}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("{0} already exists; drop --no-clobber to overwrite it")]
    AlreadyExists(PathBuf),
    #[error("failed to write {path}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to read existing recipe at {path}")]
    Read { path: PathBuf, source: std::io::Error },
}
