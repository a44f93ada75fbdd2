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

use vamp_config::{logs, semver, Config, ConfigResult, Logs};
use vamp_rule_engine::{protocol::Domain, AmpConfig};

pub mod cli;

/// Configuration of the processor service.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    pub api_version: semver::VersionReq,
    /// Domain the responses are sent from.
    #[serde(default = "Domain::localhost")]
    pub host: Domain,
    /// Supported rules and policy script.
    #[serde(default)]
    pub amp: AmpConfig,
    /// logging configuration.
    #[serde(default)]
    pub logs: Logs,
    /// Path to the configuration script.
    #[serde(skip)]
    pub path: std::path::PathBuf,
}

impl ProcessorConfig {
    /// Load the configuration, a relative policy script path is resolved
    /// from the directory of the configuration file.
    pub fn load(path: &impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let mut config = Self::from_rhai_file(path)?;
        config.path = path.as_ref().into();

        if let (Some(script), Some(dir)) = (&config.amp.script, config.path.parent()) {
            config.amp.script = Some(dir.join(script));
        }

        Ok(config)
    }
}

impl Config for ProcessorConfig {
    fn with_path(path: &impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        Ok(Self {
            api_version: semver::VersionReq::STAR,
            host: Domain::localhost(),
            amp: AmpConfig::default(),
            logs: Logs::default(),
            path: path.as_ref().into(),
        })
    }

    fn api_version(&self) -> &semver::VersionReq {
        &self.api_version
    }

    fn logs(&self) -> &logs::Logs {
        &self.logs
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}
