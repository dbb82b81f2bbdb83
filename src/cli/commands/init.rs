//! `init` command: write a starter `.pulse-loader.toml`

use std::path::PathBuf;

use crate::cli::error::CliError;
use crate::database::config::{CONFIG_FILENAME, LoaderConfig, sample_config};

/// Init command arguments
#[derive(Debug, Clone)]
pub struct InitArgs {
    /// Directory to write the configuration into
    pub config_dir: PathBuf,
    /// Overwrite an existing configuration
    pub force: bool,
}

/// Write the sample configuration, refusing to clobber an existing one
pub fn handle_init(args: &InitArgs) -> Result<PathBuf, CliError> {
    let path = args.config_dir.join(CONFIG_FILENAME);
    if LoaderConfig::exists(&args.config_dir) && !args.force {
        return Err(CliError::ConfigExists(path));
    }

    std::fs::create_dir_all(&args.config_dir).map_err(|e| {
        CliError::IoError(format!(
            "Failed to create {}: {}",
            args.config_dir.display(),
            e
        ))
    })?;
    std::fs::write(&path, sample_config())
        .map_err(|e| CliError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;

    tracing::info!("Wrote {}", path.display());
    Ok(path)
}
