//! Config resolution: CLI flags → environment → config file → defaults.

use std::path::PathBuf;

use crate::config::LoaderConfig;
use crate::ConfigError;

pub const ENV_CONFIG: &str = "TSLOAD_CONFIG";
pub const ENV_INPUT: &str = "TSLOAD_INPUT";
pub const ENV_URL: &str = "TSLOAD_URL";
pub const ENV_DATABASE: &str = "TSLOAD_DATABASE";
pub const ENV_USER: &str = "TSLOAD_USER";
pub const ENV_PASSWORD: &str = "TSLOAD_PASSWORD";
pub const ENV_BATCH_BUDGET: &str = "TSLOAD_BATCH_BUDGET";

const DIR_NAME: &str = "tsload";
const FILE_NAME: &str = "config.toml";

/// Values given explicitly on the command line. They win over everything.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub url: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub batch_budget_bytes: Option<usize>,
}

/// Platform config file location (`$XDG_CONFIG_HOME/tsload/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(DIR_NAME).join(FILE_NAME))
}

/// Resolve against the process environment.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<LoaderConfig, ConfigError> {
    resolve_config_with(overrides, |name| std::env::var(name).ok())
}

/// Resolve with an explicit environment lookup.
///
/// An explicitly named config file (flag or `TSLOAD_CONFIG`) must exist; the
/// platform default file is used only when present.
pub fn resolve_config_with<F>(
    overrides: &ConfigOverrides,
    env: F,
) -> Result<LoaderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = merge(overrides, env)?;
    config.validate()?;
    Ok(config)
}

/// Resolve for commands that never contact the store: only the `load`
/// section is validated.
pub fn resolve_load_config(overrides: &ConfigOverrides) -> Result<LoaderConfig, ConfigError> {
    resolve_load_config_with(overrides, |name| std::env::var(name).ok())
}

pub fn resolve_load_config_with<F>(
    overrides: &ConfigOverrides,
    env: F,
) -> Result<LoaderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = merge(overrides, env)?;
    config.load.validate()?;
    Ok(config)
}

fn merge<F>(overrides: &ConfigOverrides, env: F) -> Result<LoaderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit_path = overrides
        .config_path
        .clone()
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from));

    let mut config = match explicit_path {
        Some(path) => LoaderConfig::load_from_file(&path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => LoaderConfig::load_from_file(&path)?,
            None => LoaderConfig::default(),
        },
    };

    apply_env(&mut config, &env)?;
    apply_overrides(&mut config, overrides);
    Ok(config)
}

fn apply_env<F>(config: &mut LoaderConfig, env: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(input) = env(ENV_INPUT) {
        config.load.input = PathBuf::from(input);
    }
    if let Some(url) = env(ENV_URL) {
        config.store.url = url;
    }
    if let Some(database) = env(ENV_DATABASE) {
        config.store.database = database;
    }
    if let Some(user) = env(ENV_USER) {
        config.store.user = user;
    }
    if let Some(password) = env(ENV_PASSWORD) {
        config.store.password = password;
    }
    if let Some(raw) = env(ENV_BATCH_BUDGET) {
        config.load.batch_budget_bytes =
            raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_BATCH_BUDGET.to_string(),
                value: raw.clone(),
            })?;
    }
    Ok(())
}

fn apply_overrides(config: &mut LoaderConfig, overrides: &ConfigOverrides) {
    if let Some(input) = &overrides.input {
        config.load.input = input.clone();
    }
    if let Some(url) = &overrides.url {
        config.store.url = url.clone();
    }
    if let Some(database) = &overrides.database {
        config.store.database = database.clone();
    }
    if let Some(user) = &overrides.user {
        config.store.user = user.clone();
    }
    if let Some(password) = &overrides.password {
        config.store.password = password.clone();
    }
    if let Some(budget) = overrides.batch_budget_bytes {
        config.load.batch_budget_bytes = budget;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn env_overrides_file() {
        let file = write_config("[store]\ndatabase = \"from_file\"\nurl = \"http://file:8123\"\n");
        let overrides = ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config =
            resolve_config_with(&overrides, env_from(&[(ENV_DATABASE, "from_env")])).unwrap();
        assert_eq!(config.store.database, "from_env");
        assert_eq!(config.store.url, "http://file:8123");
    }

    #[test]
    fn cli_overrides_env() {
        let file = write_config("");
        let overrides = ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            batch_budget_bytes: Some(2048),
            url: Some("http://cli:8123".into()),
            ..Default::default()
        };
        let env = env_from(&[(ENV_BATCH_BUDGET, "4096"), (ENV_URL, "http://env:8123")]);
        let config = resolve_config_with(&overrides, env).unwrap();
        assert_eq!(config.load.batch_budget_bytes, 2048);
        assert_eq!(config.store.url, "http://cli:8123");
    }

    #[test]
    fn config_path_from_env() {
        let file = write_config("[load]\ntags_table = \"tagsets\"\n");
        let path = file.path().to_string_lossy().to_string();
        let config =
            resolve_config_with(&ConfigOverrides::default(), env_from(&[(ENV_CONFIG, path.as_str())]))
                .unwrap();
        assert_eq!(config.load.tags_table, "tagsets");
    }

    #[test]
    fn invalid_budget_in_env_is_rejected() {
        let file = write_config("");
        let overrides = ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let err =
            resolve_config_with(&overrides, env_from(&[(ENV_BATCH_BUDGET, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let overrides = ConfigOverrides {
            config_path: Some(PathBuf::from("/nonexistent/tsload.toml")),
            ..Default::default()
        };
        assert!(resolve_config_with(&overrides, env_from(&[])).is_err());
    }

    #[test]
    fn zero_budget_fails_validation() {
        let file = write_config("");
        let overrides = ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            batch_budget_bytes: Some(0),
            ..Default::default()
        };
        let err = resolve_config_with(&overrides, env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_only_resolution_ignores_store_settings() {
        let file = write_config("");
        let overrides = ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let env = env_from(&[(ENV_URL, "ftp://nowhere")]);
        let config = resolve_load_config_with(&overrides, &env).unwrap();
        assert_eq!(config.store.url, "ftp://nowhere");

        let err = resolve_config_with(&overrides, &env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn load_only_resolution_still_checks_budget() {
        let file = write_config("[load]\nbatch_budget_bytes = 0\n");
        let overrides = ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let err = resolve_load_config_with(&overrides, env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ValidationError::ZeroBudget)));
    }
}
