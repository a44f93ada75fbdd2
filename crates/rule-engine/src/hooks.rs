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

//! Seams between the engine and the server it runs in.
//!
//! Resolvers are registered with a priority and folded in ascending priority
//! order: each one receives the value computed so far and either lets the
//! next one refine it ([`ControlFlow::Continue`]) or settles it ([`ControlFlow::Break`]).
//! Telemetry handlers are all run and cannot change the outcome.

use crate::verify::SupportResult;
use std::ops::ControlFlow;
use std::sync::Arc;
use vamp_common::protocol::{Action, Domain, Element, Event, Jid, Rule, Strategy};

/// Tells which rules the server is able to honor.
pub trait SupportResolver: Send + Sync {
    /// `results` holds one entry per requested rule, in the requested order,
    /// and the returned list must keep that shape.
    fn verify_support(
        &self,
        domain: &Domain,
        results: Vec<SupportResult>,
    ) -> ControlFlow<Vec<SupportResult>, Vec<SupportResult>>;
}

/// Computes how a message is being delivered at a given event.
pub trait StrategyResolver: Send + Sync {
    fn determine_strategy(
        &self,
        domain: &Domain,
        message: &MessageRef<'_>,
        strategy: Strategy,
    ) -> ControlFlow<Strategy, Strategy>;
}

/// Evaluates the condition of a rule against a strategy.
pub trait ConditionResolver: Send + Sync {
    fn check_condition(
        &self,
        domain: &Domain,
        strategy: &Strategy,
        rule: &Rule,
        holds: bool,
    ) -> ControlFlow<bool, bool>;
}

/// Observer of what the engine did with messages.
pub trait Telemetry: Send + Sync {
    fn on_action_triggered(&self, domain: &Domain, action: Action);

    fn on_stanza_dropped(
        &self,
        domain: &Domain,
        sender: &Jid,
        recipient: Option<&Jid>,
        stanza: &Element,
    );
}

/// Sends the responses produced by the engine.
pub trait Router: Send + Sync {
    fn route(&self, from: &Jid, to: &Jid, stanza: Element);
}

/// A message being processed, as seen by strategy resolvers.
#[derive(Debug, Clone, Copy)]
pub struct MessageRef<'a> {
    pub sender: &'a Jid,
    pub recipient: Option<&'a Jid>,
    pub stanza: &'a Element,
    pub event: Event,
}

struct Entry<T: ?Sized> {
    priority: i32,
    handler: Arc<T>,
}

fn insert<T: ?Sized>(entries: &mut Vec<Entry<T>>, priority: i32, handler: Arc<T>) {
    entries.push(Entry { priority, handler });
    // stable, handlers of equal priority keep their registration order
    entries.sort_by_key(|entry| entry.priority);
}

fn fold<T: ?Sized, A>(
    entries: &[Entry<T>],
    init: A,
    mut f: impl FnMut(&T, A) -> ControlFlow<A, A>,
) -> A {
    match entries
        .iter()
        .try_fold(init, |acc, entry| f(entry.handler.as_ref(), acc))
    {
        ControlFlow::Continue(acc) | ControlFlow::Break(acc) => acc,
    }
}

/// Every resolver, telemetry handler and the router used by an engine.
pub struct Hooks {
    support: Vec<Entry<dyn SupportResolver>>,
    strategy: Vec<Entry<dyn StrategyResolver>>,
    condition: Vec<Entry<dyn ConditionResolver>>,
    telemetry: Vec<Arc<dyn Telemetry>>,
    router: Arc<dyn Router>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("support", &self.support.len())
            .field("strategy", &self.strategy.len())
            .field("condition", &self.condition.len())
            .field("telemetry", &self.telemetry.len())
            .finish_non_exhaustive()
    }
}

impl Hooks {
    /// Hooks with no resolver: every rule is supported, the strategy is
    /// [`Strategy::null`] and no condition holds.
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self {
            support: vec![],
            strategy: vec![],
            condition: vec![],
            telemetry: vec![],
            router,
        }
    }

    /// Register a resolver for the three folds at once.
    #[must_use]
    pub fn with_resolver<R>(self, priority: i32, resolver: Arc<R>) -> Self
    where
        R: SupportResolver + StrategyResolver + ConditionResolver + 'static,
    {
        self.with_support(priority, resolver.clone())
            .with_strategy(priority, resolver.clone())
            .with_condition(priority, resolver)
    }

    #[must_use]
    pub fn with_support(mut self, priority: i32, resolver: Arc<dyn SupportResolver>) -> Self {
        insert(&mut self.support, priority, resolver);
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, priority: i32, resolver: Arc<dyn StrategyResolver>) -> Self {
        insert(&mut self.strategy, priority, resolver);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, priority: i32, resolver: Arc<dyn ConditionResolver>) -> Self {
        insert(&mut self.condition, priority, resolver);
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry.push(telemetry);
        self
    }

    /// Support of each rule, one result per rule in the same order.
    #[must_use]
    pub fn verify_support(&self, domain: &Domain, rules: &[Rule]) -> Vec<SupportResult> {
        fold(
            &self.support,
            rules.iter().cloned().map(SupportResult::Supported).collect(),
            |resolver, results| resolver.verify_support(domain, results),
        )
    }

    #[must_use]
    pub fn determine_strategy(&self, domain: &Domain, message: &MessageRef<'_>) -> Strategy {
        fold(&self.strategy, Strategy::null(), |resolver, strategy| {
            resolver.determine_strategy(domain, message, strategy)
        })
    }

    #[must_use]
    pub fn check_condition(&self, domain: &Domain, strategy: &Strategy, rule: &Rule) -> bool {
        fold(&self.condition, false, |resolver, holds| {
            resolver.check_condition(domain, strategy, rule, holds)
        })
    }

    pub fn action_triggered(&self, domain: &Domain, action: Action) {
        for telemetry in &self.telemetry {
            telemetry.on_action_triggered(domain, action);
        }
    }

    pub fn stanza_dropped(
        &self,
        domain: &Domain,
        sender: &Jid,
        recipient: Option<&Jid>,
        stanza: &Element,
    ) {
        for telemetry in &self.telemetry {
            telemetry.on_stanza_dropped(domain, sender, recipient, stanza);
        }
    }

    pub fn route(&self, from: &Jid, to: &Jid, stanza: Element) {
        self.router.route(from, to, stanza);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vamp_common::protocol::{DeliverValue, ErrorKind, Status};

    struct Discard;

    impl Router for Discard {
        fn route(&self, _: &Jid, _: &Jid, _: Element) {}
    }

    /// Appends its tag to the strategy's deliver values.
    struct Tag(DeliverValue, bool);

    impl StrategyResolver for Tag {
        fn determine_strategy(
            &self,
            _: &Domain,
            _: &MessageRef<'_>,
            mut strategy: Strategy,
        ) -> ControlFlow<Strategy, Strategy> {
            strategy.deliver.push(self.0);
            if self.1 {
                ControlFlow::Break(strategy)
            } else {
                ControlFlow::Continue(strategy)
            }
        }
    }

    struct Reject;

    impl SupportResolver for Reject {
        fn verify_support(
            &self,
            _: &Domain,
            results: Vec<SupportResult>,
        ) -> ControlFlow<Vec<SupportResult>, Vec<SupportResult>> {
            ControlFlow::Continue(
                results
                    .into_iter()
                    .map(|result| {
                        SupportResult::Unsupported(
                            ErrorKind::UnsupportedAction,
                            result.rule().clone(),
                        )
                    })
                    .collect(),
            )
        }
    }

    fn domain() -> Domain {
        "capulet.lit".parse().unwrap()
    }

    fn sender() -> Jid {
        "romeo@montague.lit/orchard".parse().unwrap()
    }

    #[test]
    fn no_resolvers() {
        let hooks = Hooks::new(Arc::new(Discard));
        let rule = Rule::deliver(DeliverValue::Direct, Action::Notify);
        let stanza = Element::new("message");

        assert_eq!(
            hooks.verify_support(&domain(), &[rule.clone()]),
            vec![SupportResult::Supported(rule.clone())]
        );
        assert_eq!(
            hooks.determine_strategy(
                &domain(),
                &MessageRef {
                    sender: &sender(),
                    recipient: None,
                    stanza: &stanza,
                    event: Event::InitialCheck,
                }
            ),
            Strategy::null()
        );
        assert!(!hooks.check_condition(&domain(), &Strategy::null(), &rule));
    }

    #[test]
    fn priority_order_and_early_exit() {
        let hooks = Hooks::new(Arc::new(Discard))
            .with_strategy(10, Arc::new(Tag(DeliverValue::Stored, false)))
            .with_strategy(-5, Arc::new(Tag(DeliverValue::Direct, false)))
            .with_strategy(0, Arc::new(Tag(DeliverValue::Forward, true)))
            .with_strategy(20, Arc::new(Tag(DeliverValue::Gateway, false)));
        let stanza = Element::new("message");

        let strategy = hooks.determine_strategy(
            &domain(),
            &MessageRef {
                sender: &sender(),
                recipient: None,
                stanza: &stanza,
                event: Event::Received,
            },
        );

        assert_eq!(strategy.status, Status::None);
        assert_eq!(
            strategy.deliver,
            vec![DeliverValue::Direct, DeliverValue::Forward]
        );
    }

    #[test]
    fn support_keeps_shape() {
        let hooks = Hooks::new(Arc::new(Discard)).with_support(0, Arc::new(Reject));
        let rules = [
            Rule::deliver(DeliverValue::Direct, Action::Notify),
            Rule::deliver(DeliverValue::Stored, Action::Drop),
        ];

        let results = hooks.verify_support(&domain(), &rules);
        assert_eq!(results.len(), 2);
        assert!(results.iter().zip(&rules).all(|(result, rule)| {
            matches!(result, SupportResult::Unsupported(..)) && result.rule() == rule
        }));
    }
}
