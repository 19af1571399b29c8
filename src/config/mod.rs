//! Service configuration: defaults, an optional rc file, environment last.

use std::{
    collections::HashMap,
    env, fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read plotd.conf if it exists (KEY=VALUE lines, # comments)
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    /// Explicit override, e.g. from a CLI flag. Wins over env and file.
    pub fn set(&mut self, key: &str, value: String) {
        env::remove_var(key);
        self.inner.insert(key.to_string(), value);
    }

    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|v| v.parse::<u16>().ok())
    }

    pub fn port(&self) -> u16 {
        self.get_u16("PORT").unwrap_or(5000)
    }

    pub fn host(&self) -> String {
        self.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string())
    }

    pub fn log_file(&self) -> PathBuf {
        PathBuf::from(self.get("LOG_FILE").unwrap_or_else(|| "app.log".to_string()))
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "PORT",
        "HOST",
        "LOG_FILE",
        "ADMIN_PASSWORD",
        "USER_PASSWORD",
    ];

    KEYS.contains(&k) || k.starts_with("PLOTD_")
}

fn default_map() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("PORT".to_string(), "5000".to_string());
    map.insert("HOST".to_string(), "0.0.0.0".to_string());
    map.insert("LOG_FILE".to_string(), "app.log".to_string());
    map
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("plotd").join("plotd.conf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present() {
        let cfg = Config::load();
        assert!(cfg.port() > 0);
        assert!(!cfg.host().is_empty());
    }

    #[test]
    fn set_overrides_everything() {
        let mut cfg = Config::load();
        cfg.set("PORT", "6123".to_string());
        assert_eq!(cfg.port(), 6123);
    }

    #[test]
    fn unparseable_port_falls_back() {
        let mut cfg = Config::load();
        cfg.set("PORT", "not-a-port".to_string());
        assert_eq!(cfg.port(), 5000);
    }
}
