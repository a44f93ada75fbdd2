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

use vamp_protocol::{ns, AnyRule, Domain, Element, ErrorKind, Jid, Rule};

/// Id of a response: the id of the original message, or a new one.
fn response_id(original: &Element) -> String {
    original
        .attr("id")
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_owned)
}

/// The `<amp/>` element of a response, mirroring the original addressing.
fn amp_status(status: &str, sender: &Jid, recipient: Option<&Jid>) -> Element {
    let amp = Element::with_ns("amp", ns::AMP)
        .with_attr("status", status)
        .with_attr("from", sender.to_string());

    match recipient {
        Some(recipient) => amp.with_attr("to", recipient.to_string()),
        None => amp,
    }
}

/// Build the message sent back to `sender` when a rule with the `notify`
/// or `alert` action is triggered.
#[must_use]
pub fn notification(
    host: &Domain,
    rule: &Rule,
    sender: &Jid,
    recipient: Option<&Jid>,
    original: &Element,
) -> Element {
    Element::new("message")
        .with_attr("from", host.to_string())
        .with_attr("to", sender.to_string())
        .with_attr("id", response_id(original))
        .with_child(amp_status(rule.action.as_ref(), sender, recipient).with_child(rule.to_element()))
}

/// Build a single error response for all the reported rules.
///
/// The defined condition of the error is the one of the first entry, each
/// distinct kind lists its rules in its own amp errors element.
/// Returns `None` when nothing is reported.
#[must_use]
pub fn error(
    host: &Domain,
    errors: &[(ErrorKind, AnyRule)],
    sender: &Jid,
    recipient: Option<&Jid>,
    original: &Element,
) -> Option<Element> {
    let (first, _) = errors.first()?;

    let mut kinds = Vec::<ErrorKind>::new();
    for (kind, _) in errors {
        if !kinds.contains(kind) {
            kinds.push(*kind);
        }
    }

    let error = Element::new("error")
        .with_attr("type", first.error_type())
        .with_attr("code", first.code().to_string())
        .with_child(Element::with_ns(first.stanza_condition(), ns::STANZAS))
        .with_children(kinds.into_iter().map(|kind| {
            Element::with_ns(kind.rules_container(), ns::AMP_ERRORS).with_children(
                errors
                    .iter()
                    .filter(|(other, _)| *other == kind)
                    .map(|(_, rule)| rule.to_element()),
            )
        }));

    Some(
        Element::new("message")
            .with_attr("from", host.to_string())
            .with_attr("to", sender.to_string())
            .with_attr("id", response_id(original))
            .with_attr("type", "error")
            .with_child(
                amp_status("error", sender, recipient)
                    .with_children(errors.iter().map(|(_, rule)| rule.to_element())),
            )
            .with_child(error),
    )
}
