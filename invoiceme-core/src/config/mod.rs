use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Environment prefix for configuration overrides, e.g. `APP__BACKEND__BASE_URL`.
pub const ENV_PREFIX: &str = "APP";

/// Resolve `<crate>/config` whether the process runs from the workspace root
/// or from inside the crate directory.
pub fn configuration_directory(crate_dir: &str) -> Result<PathBuf, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    if base_path.ends_with(crate_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir).join("config"))
    }
}

/// Load layered settings: `config/base.yaml` (optional) then `APP__` env vars.
///
/// `.env` is read first so local overrides behave like real environment vars.
pub fn load_settings<T: DeserializeOwned>(crate_dir: &str) -> Result<T, config::ConfigError> {
    dotenvy::dotenv().ok();

    let directory = configuration_directory(crate_dir)?;

    config::Config::builder()
        .add_source(config::File::from(directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<T>()
}
