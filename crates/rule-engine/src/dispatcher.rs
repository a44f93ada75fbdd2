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

use crate::{hooks::Hooks, matcher::HookData};
use vamp_common::{
    protocol::{ns, Action, AnyRule, Domain, Element, ErrorKind, Jid, Rule},
    response,
};

/// Executes the decisions of the engine for a host.
pub struct Dispatcher<'a> {
    host: &'a Domain,
    hooks: &'a Hooks,
}

fn recipient(stanza: &Element) -> Option<Jid> {
    stanza.jid_attr("to").ok().flatten()
}

impl<'a> Dispatcher<'a> {
    #[must_use]
    pub const fn new(host: &'a Domain, hooks: &'a Hooks) -> Self {
        Self { host, hooks }
    }

    fn send(&self, to: &Jid, stanza: Element) {
        self.hooks.route(&Jid::from(self.host.clone()), to, stanza);
    }

    /// Remove the `<amp/>` element and let the message through.
    #[must_use]
    pub fn strip(&self, data: HookData) -> HookData {
        match data {
            HookData::Message { from, mut stanza } => {
                stanza.remove_child("amp", ns::AMP);
                HookData::Message { from, stanza }
            }
            HookData::Dropped => HookData::Dropped,
        }
    }

    /// Execute the action of `rule` right away.
    #[must_use]
    pub fn immediate(&self, rule: &Rule, data: HookData) -> HookData {
        match rule.action {
            Action::Notify => self.notify(rule, data),
            Action::Alert => self.alert(rule, data),
            Action::Error => self.error(vec![(ErrorKind::UndefinedCondition, rule.clone().into())], data),
            Action::Drop => {
                if matches!(data, HookData::Message { .. }) {
                    self.hooks.action_triggered(self.host, Action::Drop);
                }
                self.silent_drop(data)
            }
        }
    }

    /// Tell the sender that `rule` fired, the message is delivered.
    #[must_use]
    pub fn notify(&self, rule: &Rule, data: HookData) -> HookData {
        let HookData::Message { from, stanza } = &data else {
            return HookData::Dropped;
        };

        self.send(
            from,
            response::notification(self.host, rule, from, recipient(stanza).as_ref(), stanza),
        );
        self.hooks.action_triggered(self.host, Action::Notify);

        self.strip(data)
    }

    /// Tell the sender that `rule` fired, the message is not delivered.
    #[must_use]
    pub fn alert(&self, rule: &Rule, data: HookData) -> HookData {
        let HookData::Message { from, stanza } = &data else {
            return HookData::Dropped;
        };

        self.send(
            from,
            response::notification(self.host, rule, from, recipient(stanza).as_ref(), stanza),
        );
        self.hooks.action_triggered(self.host, Action::Alert);

        HookData::Dropped
    }

    /// Answer with a single error listing every reported rule and drop the message.
    #[must_use]
    pub fn error(&self, errors: Vec<(ErrorKind, AnyRule)>, data: HookData) -> HookData {
        let HookData::Message { from, stanza } = &data else {
            return HookData::Dropped;
        };

        let Some(error) = response::error(self.host, &errors, from, recipient(stanza).as_ref(), stanza) else {
            // every caller reports at least one rule
            tracing::error!(
                host = %self.host,
                sender = %from,
                "no rule to report in the error response, dropping the message"
            );
            return self.silent_drop(data);
        };

        tracing::debug!(
            sender = %from,
            kinds = ?errors.iter().map(|(kind, _)| *kind).collect::<Vec<_>>(),
            "rejecting amp request"
        );

        self.send(from, error);
        self.hooks.action_triggered(self.host, Action::Error);

        HookData::Dropped
    }

    /// Drop the message without telling the sender.
    #[must_use]
    pub fn silent_drop(&self, data: HookData) -> HookData {
        if let HookData::Message { from, stanza } = &data {
            self.hooks
                .stanza_dropped(self.host, from, recipient(stanza).as_ref(), stanza);
        }

        HookData::Dropped
    }
}
