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

/// Point of the message's journey at which the rules are evaluated.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    strum::EnumVariantNames,
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
#[strum(serialize_all = "snake_case")]
pub enum Event {
    /// The server sees the message for the first time.
    InitialCheck,
    /// The message reached the recipient's server and an outcome is now known.
    Received,
    /// The message has been handed to a session of the recipient.
    Delivered,
    /// Routing to a session of the recipient failed.
    DeliveryFailed,
    /// The message has been stored in the archive.
    Archived,
    /// Storing the message for an offline recipient failed.
    OfflineFailed,
}

impl Event {
    #[must_use]
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::InitialCheck)
    }
}
