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

/// Reason a rule is reported back to the sender in an error response.
///
/// See <https://xmpp.org/extensions/xep-0079.html#errors>
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
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// A rule element misses a mandatory attribute.
    BadRequest,
    /// The value of a rule is not valid for its condition.
    NotAcceptable,
    /// The action is unknown or not supported by the server.
    UnsupportedAction,
    /// The condition is unknown or not supported by the server.
    UnsupportedCondition,
    /// A rule with the `error` action has been triggered.
    UndefinedCondition,
}

impl ErrorKind {
    /// The `type` attribute of the `<error/>` element.
    #[must_use]
    pub const fn error_type(self) -> &'static str {
        match self {
            Self::UndefinedCondition => "cancel",
            Self::BadRequest
            | Self::NotAcceptable
            | Self::UnsupportedAction
            | Self::UnsupportedCondition => "modify",
        }
    }

    /// Legacy error code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::BadRequest | Self::UnsupportedAction | Self::UnsupportedCondition => 400,
            Self::NotAcceptable => 405,
            Self::UndefinedCondition => 500,
        }
    }

    /// Name of the defined condition in the `urn:ietf:params:xml:ns:xmpp-stanzas` namespace.
    #[must_use]
    pub const fn stanza_condition(self) -> &'static str {
        match self {
            Self::BadRequest | Self::UnsupportedAction | Self::UnsupportedCondition => {
                "bad-request"
            }
            Self::NotAcceptable => "not-acceptable",
            Self::UndefinedCondition => "undefined-condition",
        }
    }

    /// Name of the element listing the offending rules, in the amp errors namespace.
    #[must_use]
    pub const fn rules_container(self) -> &'static str {
        match self {
            Self::UnsupportedAction => "unsupported-actions",
            Self::UnsupportedCondition => "unsupported-conditions",
            Self::BadRequest | Self::NotAcceptable | Self::UndefinedCondition => "failed-rules",
        }
    }
}
