use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use walkdir::WalkDir;

use crate::capture::FRAME_EXTENSIONS;

/// Whether a path has one of the image extensions the decoder accepts
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Expand scan inputs into image files, keeping the order the inputs were given in.
///
/// Files are passed through as-is (the decoder reports anything unreadable). Directories
/// are only accepted with `recursive`, and contribute their image files sorted by path.
///
/// # Errors
///
/// Returns an error if an input does not exist, or is a directory and `recursive` is off.
pub fn collect_image_paths(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
            continue;
        }

        if !input.is_dir() {
            bail!("No such file or directory: {}", input.display());
        }
        if !recursive {
            bail!("{} is a directory (use --recursive to scan it)", input.display());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("Failed to walk directory: {}", input.display()))?;
            if entry.file_type().is_file() && is_image_path(entry.path()) {
                found.push(entry.into_path());
            }
        }
        paths.extend(found);
    }

    Ok(paths)
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use qr_toolkit::format_path_with_tilde;
///
/// let path = PathBuf::from("/home/alice/.local/share/qr-toolkit");
/// // Returns "~/.local/share/qr-toolkit" if HOME=/home/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("code.png")));
        assert!(is_image_path(Path::new("PHOTO.JPG")));
        assert!(is_image_path(Path::new("a/b/c.gif")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("png")));
    }

    #[test]
    fn test_collect_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let b = dir.path().join("b.png");
        let a = dir.path().join("a.png");
        fs::write(&b, "").unwrap();
        fs::write(&a, "").unwrap();

        let paths = collect_image_paths(&[b.clone(), a.clone()], false).unwrap();
        assert_eq!(paths, vec![b, a]);
    }

    #[test]
    fn test_collect_directory_requires_recursive() {
        let dir = TempDir::new().unwrap();
        let err = collect_image_paths(&[dir.path().to_path_buf()], false).unwrap_err();
        assert!(err.to_string().contains("--recursive"));
    }

    #[test]
    fn test_collect_recursive_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("z.png"), "").unwrap();
        fs::write(dir.path().join("nested").join("a.jpeg"), "").unwrap();
        fs::write(dir.path().join("readme.md"), "").unwrap();

        let paths = collect_image_paths(&[dir.path().to_path_buf()], true).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| is_image_path(p)));
    }

    #[test]
    fn test_collect_missing_input() {
        let err = collect_image_paths(&[PathBuf::from("/nonexistent/code.png")], false).unwrap_err();
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn test_format_path_with_tilde() {
        let path = PathBuf::from("/home/testuser/.local/share/qr-toolkit");
        let formatted = format_path_with_tilde_internal(&path, Some("/home/testuser"));
        assert_eq!(formatted, "~/.local/share/qr-toolkit");

        let path2 = PathBuf::from("/opt/local/bin");
        let formatted2 = format_path_with_tilde_internal(&path2, Some("/home/testuser"));
        assert_eq!(formatted2, "/opt/local/bin");
    }
}
