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

//! Wire level types of the Advanced Message Processing extension.
//!
//! See <https://xmpp.org/extensions/xep-0079.html>

mod event;
pub use event::Event;

mod types {
    pub mod domain;
    pub mod element;
    pub mod error_kind;
    pub mod jid;
    pub mod rule;
    pub mod strategy;
}

/// XML namespaces used by the extension.
pub mod ns {
    /// Namespace of the `<amp/>` annotation element.
    pub const AMP: &str = "http://jabber.org/protocol/amp";
    /// Namespace of the rule lists carried by error responses.
    pub const AMP_ERRORS: &str = "http://jabber.org/protocol/amp#errors";
    /// Namespace of the defined conditions of stanza errors.
    pub const STANZAS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";
}

pub use types::{
    domain::{Domain, DomainFromStrError},
    element::{Element, Node},
    error_kind::ErrorKind,
    jid::{Jid, JidFromStrError},
    rule::{
        Action, AnyRule, Condition, DeliverValue, MatchResource, RawRule, Rule, RuleError, Value,
        ValueFromStrError,
    },
    strategy::{Status, Strategy},
};
pub use time;
