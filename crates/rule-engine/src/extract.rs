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

use vamp_common::protocol::{ns, ErrorKind, Element, RawRule, Rule, RuleError};

/// A `<rule/>` element that could not be parsed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule {rule:?}: {error}")]
pub struct StructuralError {
    /// The attributes of the element, as sent.
    pub rule: RawRule,
    #[source]
    pub error: RuleError,
}

impl StructuralError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Rules requested by a message.
#[derive(Debug, PartialEq, Eq)]
pub enum Extracted {
    /// The message does not request any processing.
    NoRules,
    /// Every rule element is valid, in the order of the message.
    Rules(Vec<Rule>),
    /// At least one rule element is invalid, only the invalid ones are listed.
    Errors(Vec<StructuralError>),
}

/// Read the rules of the `<amp/>` element of `stanza`.
///
/// Error messages and `<amp/>` elements carrying a `status` are responses
/// to a previous request, they never request anything themselves.
#[must_use]
pub fn extract(stanza: &Element) -> Extracted {
    if stanza.attr("type") == Some("error") {
        return Extracted::NoRules;
    }

    let Some(amp) = stanza.get_child("amp", ns::AMP) else {
        return Extracted::NoRules;
    };

    if amp.attr("status").is_some() {
        return Extracted::NoRules;
    }

    let mut rules = vec![];
    let mut errors = vec![];

    for element in amp.child_elements().filter(|child| child.name == "rule") {
        let raw = RawRule::from_element(element);
        match Rule::try_from(&raw) {
            Ok(rule) => rules.push(rule),
            Err(error) => errors.push(StructuralError { rule: raw, error }),
        }
    }

    if errors.is_empty() {
        Extracted::Rules(rules)
    } else {
        Extracted::Errors(errors)
    }
}
