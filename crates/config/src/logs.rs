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

use tracing_subscriber::filter::LevelFilter;

/// Log levels of a service.
///
/// See <https://docs.rs/tracing-subscriber/0.3.17/tracing_subscriber/filter/targets/struct.Targets.html>
#[serde_with::serde_as]
#[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Logs {
    /// Level of the targets that are not listed in `levels`.
    #[serde(default = "Logs::default_level")]
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub default_level: LevelFilter,
    /// Level per target, e.g. `vamp_rule_engine`.
    #[serde(default)]
    #[serde_as(as = "std::collections::HashMap<_, serde_with::DisplayFromStr>")]
    pub levels: std::collections::HashMap<String, LevelFilter>,
}

impl Logs {
    const fn default_level() -> LevelFilter {
        LevelFilter::WARN
    }

    /// Filter to plug into a subscriber.
    #[must_use]
    pub fn targets(&self) -> tracing_subscriber::filter::Targets {
        tracing_subscriber::filter::Targets::new()
            .with_targets(self.levels.clone())
            .with_default(self.default_level)
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self {
            default_level: Self::default_level(),
            levels: std::collections::HashMap::new(),
        }
    }
}
