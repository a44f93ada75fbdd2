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

//! Advanced message processing: the rules a sender attaches to a message
//! are extracted, checked against what the server supports, and the first
//! one whose condition holds decides what happens to the message at each
//! step of its delivery.
//!
//! See <https://xmpp.org/extensions/xep-0079.html>

/// Settings of the built-in resolvers.
mod config;
/// Execution of decisions: responses, stripping and drops.
pub mod dispatcher;
/// Entry point of the engine.
mod engine;
/// Parsing of the `<amp/>` element.
pub mod extract;
/// Resolver, telemetry and routing seams.
pub mod hooks;
/// First-match scan and decision table.
pub mod matcher;
/// Support results.
pub mod verify;
/// Telemetry backed by `tracing`.
mod telemetry;

/// Built-in resolvers.
pub mod resolver {
    mod default;
    mod script;

    pub use default::DefaultResolver;
    pub use script::{ScriptError, ScriptResolver, CHECK_CONDITION, DETERMINE_STRATEGY, VERIFY_SUPPORT};
}

pub use config::AmpConfig;
pub use engine::{AmpEngine, Outcome};
pub use hooks::{ConditionResolver, Hooks, Router, StrategyResolver, SupportResolver, Telemetry};
pub use telemetry::TracingTelemetry;
pub use vamp_common::{ctx::Ctx, protocol};

/// Service discovery features advertised by a server running the engine.
pub const FEATURES: &[&str] = &[
    "http://jabber.org/protocol/amp",
    "http://jabber.org/protocol/amp?action=drop",
    "http://jabber.org/protocol/amp?action=error",
    "http://jabber.org/protocol/amp?action=notify",
    "http://jabber.org/protocol/amp?condition=deliver",
    "http://jabber.org/protocol/amp?condition=match-resource",
    "http://jabber.org/protocol/amp?condition=expire-at",
];

/// Priority of the resolvers registered by [`AmpEngine::from_config`].
pub mod priority {
    pub const SCRIPT: i32 = 0;
    pub const DEFAULT: i32 = 100;
}
