use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "QR_TOOLKIT_DATA_DIR";

const APP_DIR_NAME: &str = "qr-toolkit";

/// Get the data directory: explicit flag, then `QR_TOOLKIT_DATA_DIR`, then the platform
/// data directory (`~/.local/share/qr-toolkit` on Linux)
pub fn get_data_dir(flag: Option<&Path>) -> Result<PathBuf> {
    resolve_data_dir(flag, env::var_os(DATA_DIR_ENV), dirs::data_dir())
}

/// Resolution with the environment passed in, so it can be tested without touching it
pub(crate) fn resolve_data_dir(
    flag: Option<&Path>,
    env_value: Option<OsString>,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }

    if let Some(value) = env_value
        && !value.is_empty()
    {
        return Ok(PathBuf::from(value));
    }

    let base = platform_dir
        .with_context(|| format!("No platform data directory; set {} or pass --data-dir", DATA_DIR_ENV))?;
    Ok(base.join(APP_DIR_NAME))
}
