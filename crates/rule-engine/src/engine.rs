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
    dispatcher::Dispatcher,
    extract::{extract, Extracted},
    hooks::{Hooks, MessageRef},
    matcher::{decide, first_match, Decision, HookData},
    priority,
    resolver::{DefaultResolver, ScriptError, ScriptResolver},
    verify::partition,
    Router, TracingTelemetry,
};
use vamp_common::{
    ctx::Ctx,
    protocol::{AnyRule, Domain, Element, ErrorKind, Event},
};

/// What the server does with a message after the engine ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep routing this stanza, which may differ from the one processed.
    Forward(Element),
    Dropped,
}

impl From<HookData> for Outcome {
    fn from(data: HookData) -> Self {
        match data {
            HookData::Message { stanza, .. } => Self::Forward(stanza),
            HookData::Dropped => Self::Dropped,
        }
    }
}

/// Advanced message processing for the messages of a host.
#[derive(Debug)]
pub struct AmpEngine {
    host: Domain,
    hooks: Hooks,
}

impl AmpEngine {
    #[must_use]
    pub const fn new(host: Domain, hooks: Hooks) -> Self {
        Self { host, hooks }
    }

    /// Engine with the built-in resolvers: the policy script of `config`
    /// if any, then the [`DefaultResolver`], reporting to [`TracingTelemetry`].
    pub fn from_config(
        host: Domain,
        config: &AmpConfig,
        router: std::sync::Arc<dyn Router>,
    ) -> Result<Self, ScriptError> {
        let mut hooks = Hooks::new(router)
            .with_resolver(priority::DEFAULT, std::sync::Arc::new(DefaultResolver::new(config)))
            .with_telemetry(std::sync::Arc::new(TracingTelemetry));

        if let Some(script) = &config.script {
            tracing::debug!(script = %script.display(), "loading amp policy script");
            hooks = hooks.with_resolver(
                priority::SCRIPT,
                std::sync::Arc::new(ScriptResolver::from_file(script)?),
            );
        }

        Ok(Self::new(host, hooks))
    }

    #[must_use]
    pub const fn host(&self) -> &Domain {
        &self.host
    }

    /// Process a message at the given event.
    #[tracing::instrument(name = "amp", skip_all, fields(host = %self.host, %event, id = stanza.attr("id")), ret)]
    pub fn process(&self, stanza: Element, event: Event) -> Outcome {
        let mut ctx = Ctx::new(stanza);
        ctx.event = Some(event);
        self.process_ctx(&mut ctx)
    }

    /// Process the message of a context, recording the verified rules and
    /// the strategy in it.
    ///
    /// A context without an event is processed as a first contact.
    pub fn process_ctx(&self, ctx: &mut Ctx) -> Outcome {
        let event = *ctx.event.get_or_insert(Event::InitialCheck);

        let rules = match extract(&ctx.stanza) {
            Extracted::NoRules => return Outcome::Forward(ctx.stanza.clone()),
            Extracted::Rules(rules) => Ok(rules),
            Extracted::Errors(errors) => Err(errors
                .into_iter()
                .map(|error| (error.kind(), AnyRule::Invalid(error.rule)))
                .collect::<Vec<_>>()),
        };

        let Some(sender) = ctx.from.clone() else {
            tracing::warn!(
                from = ctx.stanza.attr("from"),
                "message without a valid sender, amp rules are ignored"
            );
            return Outcome::Forward(ctx.stanza.clone());
        };

        let dispatcher = Dispatcher::new(&self.host, &self.hooks);
        let data = HookData::Message {
            from: sender.clone(),
            stanza: ctx.stanza.clone(),
        };

        let rules = match rules {
            Ok(rules) => rules,
            Err(errors) => {
                tracing::debug!(count = errors.len(), "malformed amp rules");
                return dispatcher.error(errors, data).into();
            }
        };

        let rules = match partition(self.hooks.verify_support(&self.host, &rules)) {
            Ok(rules) => rules,
            Err((kind, rule)) => {
                tracing::debug!(%kind, ?rule, "unsupported amp rule");
                return dispatcher.error(vec![(kind, rule.into())], data).into();
            }
        };

        let strategy = self.hooks.determine_strategy(
            &self.host,
            &MessageRef {
                sender: &sender,
                recipient: ctx.to.as_ref(),
                stanza: &ctx.stanza,
                event,
            },
        );

        let result = first_match(&self.hooks, &self.host, &strategy, &rules);
        let decision = decide(event, strategy.status, result);
        tracing::debug!(status = %strategy.status, decision = decision.as_ref(), "amp decision");

        ctx.rules = Some(rules);
        ctx.strategy = Some(strategy);

        match decision {
            Decision::Strip => dispatcher.strip(data),
            Decision::Forward | Decision::Defer => data,
            Decision::Error(rule) => {
                dispatcher.error(vec![(ErrorKind::UndefinedCondition, rule.into())], data)
            }
            Decision::Immediate(rule) => dispatcher.immediate(&rule, data),
            Decision::Notify(rule) => dispatcher.notify(&rule, data),
            Decision::Drop => dispatcher.silent_drop(data),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Router;
    use std::sync::Arc;
    use vamp_common::protocol::{ns, Jid};

    struct Discard;

    impl Router for Discard {
        fn route(&self, _: &Jid, _: &Jid, _: Element) {}
    }

    fn engine() -> AmpEngine {
        AmpEngine::new("capulet.lit".parse().unwrap(), Hooks::new(Arc::new(Discard)))
    }

    #[test]
    fn without_amp_is_unchanged() {
        let stanza = Element::new("message").with_attr("from", "romeo@montague.lit/orchard");
        assert_eq!(
            engine().process(stanza.clone(), Event::InitialCheck),
            Outcome::Forward(stanza)
        );
    }

    #[test]
    fn without_sender_is_unchanged() {
        let stanza = Element::new("message").with_child(
            Element::with_ns("amp", ns::AMP).with_child(Element::new("rule").with_attr("condition", "deliver")),
        );
        assert_eq!(
            engine().process(stanza.clone(), Event::InitialCheck),
            Outcome::Forward(stanza)
        );
    }

    #[test]
    fn ctx_defaults_to_first_contact() {
        let mut ctx = Ctx::new(
            Element::new("message")
                .with_attr("from", "romeo@montague.lit/orchard")
                .with_child(Element::with_ns("amp", ns::AMP)),
        );

        assert_eq!(
            engine().process_ctx(&mut ctx),
            Outcome::Forward(Element::new("message").with_attr("from", "romeo@montague.lit/orchard"))
        );
        assert_eq!(ctx.event, Some(Event::InitialCheck));
        assert_eq!(ctx.rules, Some(vec![]));
        assert!(ctx.strategy.is_some());
    }
}
