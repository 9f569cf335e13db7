//! Thread-safe, auto-reloading configuration backed by a YAML file with
//! environment variable overrides.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, mpsc};
use std::thread;
use std::time::Duration;

use config::{Config as RawConfig, Environment, File};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Environment variables starting with this prefix override file values,
/// e.g. `APP__OAUTH__GOOGLE__CLIENT_SECRET` for `oauth.google.client_secret`.
const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load or parse configuration file")]
    Load(#[from] config::ConfigError),

    #[error("Failed to initialize file watcher")]
    Watch(#[from] notify::Error),

    #[error("Configuration lock was poisoned, indicating a panic in another thread")]
    LockPoisoned,
}

#[derive(Debug)]
pub struct Config {
    inner: Arc<RwLock<RawConfig>>,
    // Dropping the watcher stops the reload thread.
    _watcher: Option<RecommendedWatcher>,
}

impl Config {
    pub fn builder<P: AsRef<Path>>(path: P) -> ConfigBuilder {
        ConfigBuilder::new(path.as_ref().to_path_buf())
    }

    #[cfg(any(test, feature = "testing"))]
    pub fn builder_test() -> test_utils::TestConfigBuilder {
        test_utils::TestConfigBuilder::new()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let guard = self.inner.read().map_err(|_| ConfigError::LockPoisoned)?;
        guard.get(key).map_err(ConfigError::from)
    }

    /// Like [`Config::get`], but falls back to `default` when the key is absent.
    /// A present but malformed value is still an error.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Ok(value) => Ok(value),
            Err(ConfigError::Load(config::ConfigError::NotFound(_))) => Ok(default),
            Err(err) => Err(err),
        }
    }
}

pub struct ConfigBuilder {
    path: PathBuf,
    watch: bool,
    watch_interval: Duration,
    env_overrides: bool,
}

impl ConfigBuilder {
    fn new(path: PathBuf) -> Self {
        Self { path, watch: false, watch_interval: Duration::from_secs(2), env_overrides: true }
    }

    pub fn watch(mut self) -> Self {
        self.watch = true;
        self
    }

    pub fn watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    /// Ignores `APP__*` environment variables, reading the file only.
    pub fn without_env(mut self) -> Self {
        self.env_overrides = false;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let raw_config = Self::load(&self.path, self.env_overrides)?;
        let config_arc = Arc::new(RwLock::new(raw_config));
        let mut watcher = None;

        if self.watch {
            let path_clone = self.path.clone();
            let env_overrides = self.env_overrides;
            let config_clone = Arc::clone(&config_arc);
            let (tx, rx) = mpsc::channel();

            let mut w = RecommendedWatcher::new(tx, notify::Config::default().with_poll_interval(self.watch_interval))?;
            w.watch(&self.path, RecursiveMode::NonRecursive)?;

            thread::spawn(move || {
                tracing::info!(path = %path_clone.to_string_lossy(), "Watching configuration file for changes");
                while let Ok(event_result) = rx.recv() {
                    match event_result {
                        Ok(Event { kind: notify::EventKind::Modify(_), .. }) => match Self::load(&path_clone, env_overrides) {
                            Ok(new_config) => {
                                if let Ok(mut guard) = config_clone.write() {
                                    *guard = new_config;
                                    tracing::info!("Configuration reloaded");
                                } else {
                                    tracing::error!("Failed to acquire write lock for reloading config");
                                }
                            },
                            Err(e) => tracing::error!("Failed to reload configuration file: {}", e),
                        },
                        Err(e) => tracing::error!("File watcher error: {:?}", e),
                        _ => {},
                    }
                }
            });
            watcher = Some(w);
        }

        Ok(Config { inner: config_arc, _watcher: watcher })
    }

    fn load(path: &Path, env_overrides: bool) -> Result<RawConfig, config::ConfigError> {
        let mut builder = RawConfig::builder().add_source(File::from(path).required(true));
        if env_overrides {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator(ENV_SEPARATOR).separator(ENV_SEPARATOR));
        }
        builder.build()
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod test_utils {
    use std::collections::HashMap;

    use config::Value;

    use super::*;

    #[derive(Default)]
    pub struct TestConfigBuilder {
        values: HashMap<String, Value>,
    }

    impl TestConfigBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }

        pub fn build(self) -> Config {
            let mut builder = RawConfig::builder();

            for (key, value) in self.values {
                builder = builder.set_override(key, value).unwrap();
            }

            let raw_config = builder.build().expect("Failed to create config from test values");

            Config { inner: Arc::new(RwLock::new(raw_config)), _watcher: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use serde::Deserialize;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct AppwriteSettings {
        endpoint: String,
        project_id: String,
        database_id: String,
    }

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("Failed to create temp file");

        temp_file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        temp_file.flush().expect("Failed to flush temp file");
        temp_file
    }

    #[test]
    fn test_builder_reads_nested_sections() {
        let temp_file = create_temp_config(
            r#"
            server:
                address: "127.0.0.1:8000"
                timeout_secs: 30
            appwrite:
                endpoint: "https://cloud.appwrite.io/v1"
                project_id: "proj"
                database_id: "db"
            "#,
        );
        let config = Config::builder(temp_file.path()).without_env().build().expect("Failed to build config");

        let address: String = config.get("server.address").unwrap();
        let timeout: u64 = config.get("server.timeout_secs").unwrap();
        let appwrite: AppwriteSettings = config.get("appwrite").unwrap();

        assert_eq!(address, "127.0.0.1:8000");
        assert_eq!(timeout, 30);
        assert_eq!(
            appwrite,
            AppwriteSettings {
                endpoint: "https://cloud.appwrite.io/v1".to_string(),
                project_id: "proj".to_string(),
                database_id: "db".to_string(),
            }
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_file = create_temp_config("envtest:\n  token: \"from-file\"\n  kept: \"file\"\n");
        // Only this test reads the ENVTEST section.
        unsafe { std::env::set_var("APP__ENVTEST__TOKEN", "from-env") };

        let config = Config::builder(temp_file.path()).build().unwrap();
        let isolated = Config::builder(temp_file.path()).without_env().build().unwrap();

        assert_eq!(config.get::<String>("envtest.token").unwrap(), "from-env");
        assert_eq!(config.get::<String>("envtest.kept").unwrap(), "file");
        assert_eq!(isolated.get::<String>("envtest.token").unwrap(), "from-file");
    }

    #[test]
    fn test_nonexistent_file() {
        let result = Config::builder("/nonexistent/path/config.yaml").build();

        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_file = create_temp_config(
            r#"
            server: "test
            port: [invalid: yaml
            "#,
        );

        assert!(matches!(Config::builder(temp_file.path()).build(), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_get_or_falls_back_only_when_missing() {
        let config = Config::builder_test().with("hashnode.sort_by", "popular").with("server.timeout_secs", "abc").build();

        assert_eq!(config.get_or("hashnode.sort_by", "recent".to_string()).unwrap(), "popular");
        assert_eq!(config.get_or("hashnode.timeout_secs", 10u64).unwrap(), 10);
        assert!(config.get_or("server.timeout_secs", 10u64).is_err());
    }

    #[test]
    fn test_auto_reload() {
        let temp_file = create_temp_config(
            r#"
            hashnode:
                sort_by: "recent"
            "#,
        );
        let config = Config::builder(temp_file.path())
            .without_env()
            .watch()
            .watch_interval(Duration::from_millis(100))
            .build()
            .expect("Failed to build config with watch");

        assert_eq!(config.get::<String>("hashnode.sort_by").unwrap(), "recent");

        fs::write(
            temp_file.path(),
            r#"
            hashnode:
                sort_by: "popular"
            "#,
        )
        .expect("Failed to update config file");

        thread::sleep(Duration::from_millis(500));

        assert_eq!(config.get::<String>("hashnode.sort_by").unwrap(), "popular");
    }

    #[test]
    fn test_builder_test() {
        let config = Config::builder_test()
            .with("appwrite.database_id", "db")
            .with("appwrite.timeout_secs", 5)
            .with("session.secure", true)
            .build();

        assert_eq!(config.get::<String>("appwrite.database_id").unwrap(), "db");
        assert_eq!(config.get::<u64>("appwrite.timeout_secs").unwrap(), 5);
        assert!(config.get::<bool>("session.secure").unwrap());
    }
}
