use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "url")]
    pub source: Option<String>,
    pub page_size: Option<usize>,
    pub sort: Option<String>,
    pub search_fields: Option<String>,
    pub debounce_ms: Option<u64>,
    #[serde(alias = "load_failure")]
    pub on_load_error: Option<String>,
    pub placeholder_count: Option<usize>,
    pub locale: Option<String>,
    pub currency: Option<String>,
    pub timeout: Option<usize>,
    pub proxy: Option<String>,
    pub no_color: Option<bool>,
    pub log_file: Option<String>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".dealgrid").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    // An all-comment file deserializes to unit, not a map.
    if contents.lines().all(|l| {
        let t = l.trim();
        t.is_empty() || t.starts_with('#')
    }) {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r#"# dealgrid config
#
# Location (default):
#   ~/.dealgrid/config.yml

# Catalog: an http(s) URL or a local JSON file
source: https://miodeals.de/dealsgalaxy/products.json

# What to do when the catalog cannot be loaded: error | placeholder
on_load_error: error
placeholder_count: 40

# View
page_size: 12
sort: default
search_fields: title,category
debounce_ms: 300

# Prices
locale: de
currency: "€"

# HTTP (optional)
timeout: 10
# proxy: http://127.0.0.1:8080

# Output styling
no_color: false

# Logging (optional; keeps log lines off the interactive screen)
# log_file: ~/.dealgrid/dealgrid.log
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses() {
        let cfg = parse_config(&default_config_yaml()).unwrap();
        assert_eq!(cfg.page_size, Some(12));
        assert_eq!(cfg.sort.as_deref(), Some("default"));
        assert_eq!(cfg.on_load_error.as_deref(), Some("error"));
        assert_eq!(cfg.currency.as_deref(), Some("€"));
        assert_eq!(cfg.proxy, None);
    }

    #[test]
    fn accepts_aliases() {
        let cfg = parse_config("url: ./deals.json\nload_failure: placeholder\n").unwrap();
        assert_eq!(cfg.source.as_deref(), Some("./deals.json"));
        assert_eq!(cfg.on_load_error.as_deref(), Some("placeholder"));
    }

    #[test]
    fn comment_only_file_is_empty_config() {
        assert_eq!(parse_config("# nothing\n\n").unwrap(), ConfigFile::default());
    }

    #[test]
    fn missing_file_respects_allow_missing() {
        let path = PathBuf::from("/nonexistent/dealgrid/config.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn writes_default_config_once() {
        let dir = std::env::temp_dir().join(format!("dealgrid-config-{}", std::process::id()));
        let path = dir.join("config.yml");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.debounce_ms, Some(300));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn expands_home_prefix() {
        let expanded = expand_tilde("~/deals.json");
        assert!(!expanded.to_string_lossy().starts_with('~') || home_dir().is_none());
        assert_eq!(expand_tilde("./deals.json"), PathBuf::from("./deals.json"));
    }
}
