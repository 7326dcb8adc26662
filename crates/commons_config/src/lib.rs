use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::Path;
use tracing::debug;

pub mod models;

pub use config::ConfigError;
pub use models::*;

/// Prefix of environment variables that override file settings, e.g.
/// `COMMONS__HTTP__MAX_UPLOAD_MEMORY`.
pub const ENV_PREFIX: &str = "COMMONS";

/// Loads [`AppConfig`] from `./config`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(Path::new("config"))
}

/// Loads [`AppConfig`] from, in increasing precedence, `<dir>/default.*`,
/// `<dir>/<RUN_ENV>.*` (`RUN_ENV` defaults to `debug`) and `COMMONS__*` environment
/// variables. Both files are optional.
pub fn load_config_from(dir: &Path) -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let default_path = dir.join("default");
    let env_path = dir.join(&run_env);
    debug!(
        default = %default_path.display(),
        env = %env_path.display(),
        "loading configuration"
    );

    let config: AppConfig = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;
    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// The file is `.env` unless `DOTENV_OVERRIDE` names another one. A missing file is
/// not an error. Returns the path that was (or would have been) loaded.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        if dotenv::from_filename(&dotenv_path).is_ok() {
            debug!(path = %dotenv_path, "loaded dotenv file");
        }
    });

    dotenv_path
}
