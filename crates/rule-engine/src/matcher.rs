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

use crate::hooks::Hooks;
use vamp_common::protocol::{Action, Domain, Element, Event, Jid, Rule, Status, Strategy};

/// A message flowing through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookData {
    Message { from: Jid, stanza: Element },
    /// The message has been consumed, nothing is done past this point.
    Dropped,
}

/// The rule selected for a message, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    Match(Rule),
}

/// What to do with a message.
#[derive(Debug, Clone, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
    /// Forward the message without its `<amp/>` element.
    Strip,
    /// Forward the message as is.
    Forward,
    /// Answer with an error for the rule and drop the message.
    Error(Rule),
    /// Execute the action of the rule now.
    Immediate(Rule),
    /// Forward the message as is, a later event will fire the rule.
    Defer,
    /// Notify the sender and forward the message without its `<amp/>` element.
    Notify(Rule),
    /// Drop the message.
    Drop,
}

/// The first rule, in declared order, whose condition holds.
#[must_use]
pub fn first_match(hooks: &Hooks, domain: &Domain, strategy: &Strategy, rules: &[Rule]) -> MatchResult {
    rules
        .iter()
        .find(|rule| hooks.check_condition(domain, strategy, rule))
        .map_or(MatchResult::NoMatch, |rule| MatchResult::Match(rule.clone()))
}

/// Look `(event, status, result)` up in the decision table, first row wins.
///
/// A dropped message never reaches the table: every [`Dispatcher`](crate::dispatcher::Dispatcher)
/// step returns [`HookData::Dropped`] unchanged for it.
#[must_use]
pub fn decide(event: Event, status: Status, result: MatchResult) -> Decision {
    match (event, status, result) {
        (Event::InitialCheck, _, MatchResult::NoMatch) => Decision::Strip,
        (_, _, MatchResult::NoMatch) => Decision::Forward,
        (_, _, MatchResult::Match(rule)) if rule.action == Action::Error => Decision::Error(rule),
        (_, _, MatchResult::Match(rule)) if rule.is_immediate() => Decision::Immediate(rule),
        (_, Status::Pending, MatchResult::Match(rule)) if rule.action == Action::Notify => {
            Decision::Defer
        }
        (_, Status::Done, MatchResult::Match(rule)) if rule.action == Action::Notify => {
            Decision::Notify(rule)
        }
        _ => Decision::Drop,
    }
}
