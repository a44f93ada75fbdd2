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

use crate::{DeliverValue, MatchResource};

/// Whether the delivery outcome a message waits on is known.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// No outcome is relevant for this message.
    #[default]
    None,
    /// The outcome is not known yet, a later event will tell.
    Pending,
    /// The outcome is resolved.
    Done,
}

/// Snapshot of how a message is going to be delivered, computed for
/// a single message and processing event.
///
/// Only [`Strategy::status`] drives the decision of the engine, the other
/// fields are facts used by condition resolvers.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Strategy {
    #[serde(default)]
    pub status: Status,
    /// `deliver` values that currently hold for the message.
    #[serde(default)]
    pub deliver: Vec<DeliverValue>,
    /// How the recipient's resource matches the available sessions.
    #[serde(default)]
    pub match_resource: Option<MatchResource>,
    /// Instant the `expire-at` condition is evaluated against.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub now: Option<time::OffsetDateTime>,
}

impl Strategy {
    /// A strategy that knows nothing about the delivery.
    #[must_use]
    pub fn null() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_deliver(mut self, deliver: impl IntoIterator<Item = DeliverValue>) -> Self {
        self.deliver = deliver.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_match_resource(mut self, match_resource: MatchResource) -> Self {
        self.match_resource = Some(match_resource);
        self
    }

    #[must_use]
    pub const fn at(mut self, now: time::OffsetDateTime) -> Self {
        self.now = Some(now);
        self
    }
}
