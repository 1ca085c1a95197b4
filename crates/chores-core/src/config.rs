use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info, trace};

const CONFIG_ENV_VAR: &str = "CHORES_CONFIG";
const CONFIG_FILE_NAME: &str = ".choresrc";

#[derive(Debug, Clone)]
pub struct Config {
    map: HashMap<String, String>,
    pub loaded_file: Option<PathBuf>,
}

impl Config {
    #[tracing::instrument(skip(config_override))]
    pub fn load(config_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Config {
            map: HashMap::new(),
            loaded_file: None,
        };

        cfg.map
            .insert("data.location".to_string(), "~/.chores".to_string());
        cfg.map.insert("color".to_string(), "on".to_string());

        let rc = resolve_config_path(config_override)?;
        if let Some(path) = rc {
            info!(config = %path.display(), "loading config file");
            cfg.load_file(&path)?;
        } else {
            debug!("no config file found; using defaults");
        }

        Ok(cfg)
    }

    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in overrides {
            let key = k.strip_prefix("rc.").unwrap_or(&k).to_string();
            debug!(key = %key, value = %v, "applying override");
            self.map.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.map.get(key).map(|v| parse_bool(v))
    }

    #[tracing::instrument(skip(self))]
    fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        self.loaded_file = Some(path.clone());

        for (line_num, raw_line) in text.lines().enumerate() {
            let mut line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((before, _)) = line.split_once('#') {
                line = before.trim();
            }

            if line.is_empty() {
                continue;
            }

            let (k, v) = line.split_once('=').ok_or_else(|| {
                anyhow!(
                    "invalid config line {}:{}: {}",
                    path.display(),
                    line_num + 1,
                    raw_line
                )
            })?;

            let key = k.trim().to_string();
            let value = v.trim().to_string();
            trace!(key = %key, value = %value, "loaded config key");
            self.map.insert(key, value);
        }

        Ok(())
    }
}

#[tracing::instrument(skip(cfg, override_dir))]
pub fn resolve_data_dir(cfg: &Config, override_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = if let Some(path) = override_dir {
        path.to_path_buf()
    } else if let Some(cfg_value) = cfg.get("data.location") {
        expand_tilde(Path::new(&cfg_value))
    } else {
        default_data_dir()?
    };

    if !dir.exists() {
        info!(dir = %dir.display(), "creating data directory");
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    Ok(dir)
}

#[tracing::instrument(skip(override_path))]
fn resolve_config_path(override_path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        if env_path == "/dev/null" {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(env_path)));
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    let candidate = home.join(CONFIG_FILE_NAME);
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    Ok(None)
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(home.join(".chores"))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "on" | "true"
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{Config, resolve_data_dir};

    #[test]
    fn file_values_override_defaults_and_cli_wins() {
        let temp = tempdir().expect("tempdir");
        let rc = temp.path().join("rc");
        fs::write(
            &rc,
            "# comment\ndata.location = /tmp/chores-test  # trailing\ncolor = off\n",
        )
        .expect("write rc");

        let mut cfg = Config::load(Some(&rc)).expect("load config");
        assert_eq!(cfg.get("data.location").as_deref(), Some("/tmp/chores-test"));
        assert_eq!(cfg.get_bool("color"), Some(false));

        cfg.apply_overrides([("rc.color".to_string(), "on".to_string())]);
        assert_eq!(cfg.get_bool("color"), Some(true));
    }

    #[test]
    fn missing_explicit_config_path_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let missing = temp.path().join("nope");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn data_dir_override_wins_and_is_created() {
        let temp = tempdir().expect("tempdir");
        let rc = temp.path().join("rc");
        fs::write(&rc, "").expect("write rc");
        let cfg = Config::load(Some(&rc)).expect("load config");
        assert_eq!(cfg.get("data.location").as_deref(), Some("~/.chores"));

        let target = temp.path().join("data");
        let resolved = resolve_data_dir(&cfg, Some(&target)).expect("resolve");
        assert_eq!(resolved, target);
        assert!(target.exists());
    }

    #[test]
    fn malformed_line_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let rc = temp.path().join("rc");
        fs::write(&rc, "data.location\n").expect("write rc");

        assert!(Config::load(Some(&rc)).is_err());
    }
}
