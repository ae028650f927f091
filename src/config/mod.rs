// Configuration module entry point
// Loads layered configuration and turns it into resolver options

mod types;

pub use types::{Config, LoggingConfig, ResolverConfig};

use crate::resolver::ResolveOptions;

/// Config file looked up when none is given (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `FSROUTE_RESOLVER__BASE_DIR`
pub const ENV_PREFIX: &str = "FSROUTE";

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, later ones winning: built-in defaults, the file (optional),
    /// `FSROUTE_*` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("resolver.extensions")
                    .with_list_parse_key("resolver.default_pages")
                    .try_parsing(true),
            )
            .set_default("resolver.base_dir", "views")?
            .set_default("resolver.extensions", vec!["js"])?
            .set_default("resolver.default_pages", vec!["index"])?
            .set_default("resolver.squash_default_page", true)?
            .set_default("resolver.redirect_base", "")?
            .set_default("logging.level", "info")?
            .set_default("logging.resolve_log", false)?
            .set_default("logging.resolve_log_format", "text")?
            .build()?;

        settings.try_deserialize()
    }

    /// Resolver options described by this configuration
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::new(&self.resolver.extensions)
            .with_default_pages(&self.resolver.default_pages)
            .with_squash(self.resolver.squash_default_page)
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
