use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Py2csConfig {
    /// Fallback directory for Python sources not next to their host document
    pub python_dir: Option<PathBuf>,
    /// Host project manifest
    pub project: Option<PathBuf>,
    /// Where rendered documents are written
    pub output_dir: Option<PathBuf>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("py2cs.toml")
}

pub fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<Py2csConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let mut config: Py2csConfig = toml::from_str(&contents)?;

    // relative entries are relative to the config file
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for entry in [&mut config.python_dir, &mut config.project, &mut config.output_dir] {
        if let Some(value) = entry {
            if value.is_relative() {
                *value = base.join(&*value);
            }
        }
    }
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &Py2csConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
