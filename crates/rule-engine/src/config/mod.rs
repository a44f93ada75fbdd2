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

use vamp_common::protocol::{Action, Condition};

/// Settings of the resolvers shipped with the engine.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(deny_unknown_fields)]
pub struct AmpConfig {
    /// Conditions the server honors.
    #[serde(default = "AmpConfig::default_conditions")]
    pub conditions: Vec<Condition>,
    /// Actions the server honors.
    #[serde(default = "AmpConfig::default_actions")]
    pub actions: Vec<Action>,
    /// Policy script consulted before the defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<std::path::PathBuf>,
}

impl AmpConfig {
    fn default_conditions() -> Vec<Condition> {
        vec![Condition::Deliver, Condition::MatchResource, Condition::ExpireAt]
    }

    fn default_actions() -> Vec<Action> {
        vec![Action::Notify, Action::Error, Action::Drop]
    }
}

impl Default for AmpConfig {
    fn default() -> Self {
        Self {
            conditions: Self::default_conditions(),
            actions: Self::default_actions(),
            script: None,
        }
    }
}
