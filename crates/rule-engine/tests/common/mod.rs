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

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use vamp_rule_engine::{
    protocol::{ns, Action, Domain, Element, Jid, Strategy},
    hooks::MessageRef,
    resolver::DefaultResolver,
    AmpConfig, AmpEngine, Hooks, Router, StrategyResolver, Telemetry,
};

/// Build a complete path from the current cargo manifest files using a relative path.
#[macro_export]
macro_rules! from_manifest_path {
    ($path:expr) => {
        std::path::PathBuf::from_iter([env!("CARGO_MANIFEST_DIR"), $path])
    };
}

pub const SENDER: &str = "romeo@montague.lit/orchard";
pub const RECIPIENT: &str = "juliet@capulet.lit";
pub const HOST: &str = "capulet.lit";

/// Keeps everything the engine sent or reported.
#[derive(Default)]
pub struct Recorder {
    pub routed: Mutex<Vec<(Jid, Jid, Element)>>,
    pub triggered: Mutex<Vec<Action>>,
    pub dropped: Mutex<Vec<Element>>,
}

impl Recorder {
    pub fn routed(&self) -> Vec<Element> {
        self.routed
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, stanza)| stanza.clone())
            .collect()
    }

    pub fn triggered(&self) -> Vec<Action> {
        self.triggered.lock().unwrap().clone()
    }

    pub fn dropped(&self) -> usize {
        self.dropped.lock().unwrap().len()
    }
}

impl Router for Recorder {
    fn route(&self, from: &Jid, to: &Jid, stanza: Element) {
        self.routed
            .lock()
            .unwrap()
            .push((from.clone(), to.clone(), stanza));
    }
}

impl Telemetry for Recorder {
    fn on_action_triggered(&self, _: &Domain, action: Action) {
        self.triggered.lock().unwrap().push(action);
    }

    fn on_stanza_dropped(&self, _: &Domain, _: &Jid, _: Option<&Jid>, stanza: &Element) {
        self.dropped.lock().unwrap().push(stanza.clone());
    }
}

/// Strategy resolver always answering the same strategy.
pub struct Fixed(pub Strategy);

impl StrategyResolver for Fixed {
    fn determine_strategy(
        &self,
        _: &Domain,
        _: &MessageRef<'_>,
        _: Strategy,
    ) -> std::ops::ControlFlow<Strategy, Strategy> {
        std::ops::ControlFlow::Break(self.0.clone())
    }
}

/// Every condition and action is supported.
pub fn permissive() -> AmpConfig {
    AmpConfig {
        actions: vec![Action::Alert, Action::Drop, Action::Error, Action::Notify],
        ..AmpConfig::default()
    }
}

pub fn hooks(recorder: &Arc<Recorder>, strategy: Strategy, config: &AmpConfig) -> Hooks {
    let resolver = Arc::new(DefaultResolver::new(config));

    Hooks::new(recorder.clone())
        .with_telemetry(recorder.clone())
        .with_support(0, resolver.clone())
        .with_condition(0, resolver)
        .with_strategy(0, Arc::new(Fixed(strategy)))
}

pub fn engine(strategy: Strategy, config: &AmpConfig) -> (AmpEngine, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let hooks = hooks(&recorder, strategy, config);

    (AmpEngine::new(HOST.parse().unwrap(), hooks), recorder)
}

pub fn rule(condition: &str, value: &str, action: &str) -> Element {
    Element::new("rule")
        .with_attr("condition", condition)
        .with_attr("value", value)
        .with_attr("action", action)
}

pub fn body() -> Element {
    Element::new("body").with_text("Parting is such sweet sorrow.")
}

/// A message from [`SENDER`] to [`RECIPIENT`] requesting `rules`.
pub fn message(rules: impl IntoIterator<Item = Element>) -> Element {
    Element::new("message")
        .with_attr("id", "chatty2")
        .with_attr("from", SENDER)
        .with_attr("to", RECIPIENT)
        .with_child(body())
        .with_child(Element::with_ns("amp", ns::AMP).with_children(rules))
}

/// [`message`] once its `<amp/>` element is removed.
pub fn stripped() -> Element {
    Element::new("message")
        .with_attr("id", "chatty2")
        .with_attr("from", SENDER)
        .with_attr("to", RECIPIENT)
        .with_child(body())
}
