/*
 * vAMP advanced message processing
 *
 * Copyright (C) 2003 - viridIT SAS
 * Licensed under the Elastic License 2.0
 *
 * You should have received a copy of the Elastic License 2.0 along with
 * this program. If not, see https://www.elastic.co/licensing/elastic-license.
 *
 */

pub mod error;
pub mod logs;

pub use error::ConfigError;
pub use logs::Logs;
pub use semver;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, error::ConfigError>;

/// Name of the function called in configuration scripts.
pub const CONFIG_HOOK: &str = "on_config";

/// Getters for base configuration structures.
pub trait Config: serde::Serialize + serde::de::DeserializeOwned + Sized {
    /// Create a default configuration with the path of the script passed
    /// as parameter.
    ///
    /// The returned value is handed to the `on_config` function of the script,
    /// set any defaults here before the user can override them.
    fn with_path(path: &impl AsRef<std::path::Path>) -> ConfigResult<Self>;

    /// Create a configuration structure from a rhai file.
    ///
    /// Modules imported by the script are resolved from the parent
    /// directory of `path`.
    fn from_rhai_file(path: &impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let path_ref = path.as_ref();

        let config_dir = path_ref
            .parent()
            .ok_or_else(|| error::ConfigError::InvalidParentDirectory(path_ref.into()))?
            .to_path_buf();

        let script = std::fs::read_to_string(path_ref)
            .map_err(|error| error::ConfigError::FileOpen(path_ref.into(), error))?;

        Self::from_rhai_script(path, script, Some(&config_dir))
    }

    /// Create a configuration structure from a rhai script.
    ///
    /// The script must export an `on_config(config)` function that returns
    /// the modified configuration map.
    fn from_rhai_script(
        path: &impl AsRef<std::path::Path>,
        script: impl AsRef<str>,
        resolve_path: Option<&std::path::PathBuf>,
    ) -> ConfigResult<Self> {
        let mut engine = rhai::Engine::new();

        if let Some(resolve_path) = resolve_path {
            engine.set_module_resolver(
                rhai::module_resolvers::FileModuleResolver::new_with_path_and_extension(
                    resolve_path,
                    "rhai",
                ),
            );
        }

        let ast = engine.compile(script.as_ref())?;

        let defaults = rhai::serde::to_dynamic(Self::with_path(path)?)?;
        let config = engine.call_fn::<rhai::Map>(
            &mut rhai::Scope::new(),
            &ast,
            CONFIG_HOOK,
            (defaults,),
        )?;

        Ok(serde_path_to_error::deserialize(serde_json::to_value(
            &config,
        )?)?)
    }

    /// Check that the configuration targets this version of the service.
    fn check_api_version(&self, version: &semver::Version) -> ConfigResult<()> {
        if self.api_version().matches(version) {
            Ok(())
        } else {
            Err(error::ConfigError::ApiVersion {
                required: self.api_version().clone(),
                actual: version.clone(),
            })
        }
    }

    /// The configuration API version required by the script.
    fn api_version(&self) -> &semver::VersionReq;

    /// Log configuration for this specific service.
    fn logs(&self) -> &logs::Logs;

    /// Path on disk of the configuration file.
    fn path(&self) -> &std::path::Path;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct TestConfig {
        api_version: semver::VersionReq,
        #[serde(default)]
        name: String,
        #[serde(default)]
        logs: Logs,
        #[serde(skip)]
        path: std::path::PathBuf,
    }

    impl Config for TestConfig {
        fn with_path(path: &impl AsRef<std::path::Path>) -> ConfigResult<Self> {
            Ok(Self {
                api_version: semver::VersionReq::STAR,
                name: "default".to_string(),
                path: path.as_ref().into(),
                ..Default::default()
            })
        }

        fn api_version(&self) -> &semver::VersionReq {
            &self.api_version
        }

        fn logs(&self) -> &Logs {
            &self.logs
        }

        fn path(&self) -> &std::path::Path {
            &self.path
        }
    }

    #[test]
    fn from_script() {
        let config = TestConfig::from_rhai_script(
            &"/etc/vamp/conf.d/config.rhai",
            r#"
fn on_config(config) {
    config.api_version = ">=0.1.0";
    config.logs.levels = #{ "vamp_rule_engine": "trace" };
    config
}
"#,
            None,
        )
        .unwrap();

        assert_eq!(config.name, "default");
        assert_eq!(
            config.logs.levels.get("vamp_rule_engine"),
            Some(&tracing_subscriber::filter::LevelFilter::TRACE)
        );
        assert!(config
            .check_api_version(&semver::Version::new(0, 1, 0))
            .is_ok());
        assert!(matches!(
            config.check_api_version(&semver::Version::new(0, 0, 9)),
            Err(ConfigError::ApiVersion { .. })
        ));
    }

    #[test]
    fn unknown_field() {
        let error = TestConfig::from_rhai_script(
            &"/etc/vamp/conf.d/config.rhai",
            r#"
fn on_config(config) {
    config.unknown = 1;
    config
}
"#,
            None,
        )
        .unwrap_err();

        assert!(matches!(error, ConfigError::Deserialize(_)));
    }

    #[test]
    fn missing_hook() {
        assert!(matches!(
            TestConfig::from_rhai_script(&"/etc/vamp/conf.d/config.rhai", "let a = 1;", None),
            Err(ConfigError::Execution(_))
        ));
    }
}
