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

use crate::{
    config::AmpConfig,
    hooks::{ConditionResolver, MessageRef, StrategyResolver, SupportResolver},
    verify::SupportResult,
};
use std::ops::ControlFlow;
use vamp_common::protocol::{
    Action, Condition, DeliverValue, Domain, ErrorKind, Event, MatchResource, Rule, Status,
    Strategy, Value,
};

/// Resolver driven by the configuration and the processing event only.
#[derive(Debug, Clone)]
pub struct DefaultResolver {
    conditions: Vec<Condition>,
    actions: Vec<Action>,
}

impl DefaultResolver {
    #[must_use]
    pub fn new(config: &AmpConfig) -> Self {
        Self {
            conditions: config.conditions.clone(),
            actions: config.actions.clone(),
        }
    }

    fn support(&self, rule: Rule) -> SupportResult {
        if !self.conditions.contains(&rule.condition) {
            SupportResult::Unsupported(ErrorKind::UnsupportedCondition, rule)
        } else if !self.actions.contains(&rule.action) {
            SupportResult::Unsupported(ErrorKind::UnsupportedAction, rule)
        } else {
            SupportResult::Supported(rule)
        }
    }
}

impl DefaultResolver {
    /// A message that is not settled yet is either delivered to a session or stored.
    const PREDICTED: [DeliverValue; 2] = [DeliverValue::Direct, DeliverValue::Stored];
}

impl Default for DefaultResolver {
    fn default() -> Self {
        Self::new(&AmpConfig::default())
    }
}

impl SupportResolver for DefaultResolver {
    fn verify_support(
        &self,
        _: &Domain,
        results: Vec<SupportResult>,
    ) -> ControlFlow<Vec<SupportResult>, Vec<SupportResult>> {
        ControlFlow::Continue(
            results
                .into_iter()
                .map(|result| match result {
                    SupportResult::Supported(rule) => self.support(rule),
                    unsupported @ SupportResult::Unsupported(..) => unsupported,
                })
                .collect(),
        )
    }
}

impl StrategyResolver for DefaultResolver {
    /// The outcome is pending until an event tells how the message went.
    ///
    /// While pending, `deliver` holds the outcomes still reachable so that the
    /// matching rules are kept for the event that settles them.
    fn determine_strategy(
        &self,
        _: &Domain,
        message: &MessageRef<'_>,
        strategy: Strategy,
    ) -> ControlFlow<Strategy, Strategy> {
        let (status, deliver) = match message.event {
            Event::InitialCheck | Event::Received => (Status::Pending, Self::PREDICTED.to_vec()),
            Event::Delivered => (Status::Done, vec![DeliverValue::Direct]),
            Event::Archived => (Status::Done, vec![DeliverValue::Stored]),
            Event::DeliveryFailed | Event::OfflineFailed => (Status::Done, vec![DeliverValue::None]),
        };

        let mut strategy = strategy
            .with_status(status)
            .with_deliver(deliver)
            .at(time::OffsetDateTime::now_utc());

        if message.recipient.map_or(false, vamp_common::protocol::Jid::is_bare) {
            strategy = strategy.with_match_resource(MatchResource::Any);
        }

        ControlFlow::Continue(strategy)
    }
}

impl ConditionResolver for DefaultResolver {
    fn check_condition(
        &self,
        _: &Domain,
        strategy: &Strategy,
        rule: &Rule,
        _: bool,
    ) -> ControlFlow<bool, bool> {
        let holds = match &rule.value {
            Some(Value::Deliver(value)) => strategy.deliver.contains(value),
            Some(Value::MatchResource(value)) => strategy.match_resource.as_ref() == Some(value),
            Some(Value::ExpireAt(at)) => strategy.now.map_or(false, |now| now >= *at),
            None => false,
        };

        ControlFlow::Break(holds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vamp_common::protocol::{Element, Jid};

    fn domain() -> Domain {
        "capulet.lit".parse().unwrap()
    }

    fn resolved<B, C>(flow: ControlFlow<B, C>) -> C
    where
        B: std::fmt::Debug,
    {
        match flow {
            ControlFlow::Continue(value) => value,
            ControlFlow::Break(value) => panic!("unexpected break with {value:?}"),
        }
    }

    #[test]
    fn support() {
        let resolver = DefaultResolver::new(&AmpConfig {
            conditions: vec![Condition::Deliver, Condition::ExpireAt],
            ..AmpConfig::default()
        });
        let alert = Rule::deliver(DeliverValue::Direct, Action::Alert);
        let resource = Rule::match_resource(MatchResource::Exact, Action::Notify);
        let stored = Rule::deliver(DeliverValue::Stored, Action::Notify);

        assert_eq!(
            resolved(resolver.verify_support(
                &domain(),
                vec![
                    SupportResult::Supported(alert.clone()),
                    SupportResult::Supported(resource.clone()),
                    SupportResult::Unsupported(ErrorKind::UnsupportedAction, stored.clone()),
                ]
            )),
            vec![
                SupportResult::Unsupported(ErrorKind::UnsupportedAction, alert),
                SupportResult::Unsupported(ErrorKind::UnsupportedCondition, resource),
                SupportResult::Unsupported(ErrorKind::UnsupportedAction, stored),
            ]
        );
    }

    #[rstest::rstest]
    #[case(Event::InitialCheck, Status::Pending, vec![DeliverValue::Direct, DeliverValue::Stored])]
    #[case(Event::Received, Status::Pending, vec![DeliverValue::Direct, DeliverValue::Stored])]
    #[case(Event::Delivered, Status::Done, vec![DeliverValue::Direct])]
    #[case(Event::Archived, Status::Done, vec![DeliverValue::Stored])]
    #[case(Event::OfflineFailed, Status::Done, vec![DeliverValue::None])]
    fn strategy(#[case] event: Event, #[case] status: Status, #[case] deliver: Vec<DeliverValue>) {
        let sender = "romeo@montague.lit/orchard".parse::<Jid>().unwrap();
        let recipient = "juliet@capulet.lit".parse::<Jid>().unwrap();
        let stanza = Element::new("message");

        let strategy = resolved(DefaultResolver::default().determine_strategy(
            &domain(),
            &MessageRef {
                sender: &sender,
                recipient: Some(&recipient),
                stanza: &stanza,
                event,
            },
            Strategy::null(),
        ));

        assert_eq!(strategy.status, status);
        assert_eq!(strategy.deliver, deliver);
        assert_eq!(strategy.match_resource, Some(MatchResource::Any));
        assert!(strategy.now.is_some());
    }

    #[test]
    fn conditions() {
        let resolver = DefaultResolver::default();
        let now = time::macros::datetime!(2004-01-01 00:00 UTC);
        let strategy = Strategy::null()
            .with_deliver([DeliverValue::Stored])
            .with_match_resource(MatchResource::Exact)
            .at(now);

        let check = |rule: Rule| resolver.check_condition(&domain(), &strategy, &rule, false);

        assert_eq!(check(Rule::deliver(DeliverValue::Stored, Action::Notify)), ControlFlow::Break(true));
        assert_eq!(check(Rule::deliver(DeliverValue::Direct, Action::Notify)), ControlFlow::Break(false));
        assert_eq!(
            check(Rule::match_resource(MatchResource::Exact, Action::Drop)),
            ControlFlow::Break(true)
        );
        assert_eq!(
            check(Rule::match_resource(MatchResource::Other, Action::Drop)),
            ControlFlow::Break(false)
        );
        assert_eq!(check(Rule::expire_at(now, Action::Drop)), ControlFlow::Break(true));
        assert_eq!(
            check(Rule::expire_at(time::macros::datetime!(2004-01-01 00:00:01 UTC), Action::Drop)),
            ControlFlow::Break(false)
        );
    }
}
