use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lumen_runner::LumenSettings;
use tracing::{debug, info};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, USAGE};

/// `$XDG_CONFIG_HOME/lumen/config.json`, else `$HOME/.config/lumen/config.json`.
pub fn default_config_path() -> CliResult<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok_or_else(|| {
            CliError::new(
                USAGE,
                "cannot locate a config directory; set --config, XDG_CONFIG_HOME or HOME",
            )
        })?;
    Ok(base.join("lumen").join("config.json"))
}

/// Read the settings file. A missing file yields defaults.
pub fn load(path: &Path) -> CliResult<LumenSettings> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(LumenSettings::default());
        }
        Err(err) => return Err(io_error(&format!("failed reading {}", path.display()), err)),
    };

    serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("invalid settings in {}: {err}", path.display()),
        )
    })
}

/// Write the settings file, creating its directory when needed.
pub fn save(path: &Path, settings: &LumenSettings) -> CliResult<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|err| io_error(&format!("failed creating {}", dir.display()), err))?;
    }
    let mut text = serde_json::to_string_pretty(settings).map_err(|err| {
        CliError::new(crate::exit::INTERNAL, format!("failed encoding settings: {err}"))
    })?;
    text.push('\n');
    fs::write(path, text)
        .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}
