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

use vamp_protocol::{Element, Event, Jid, Rule, Strategy};

/// Key of the internal marker set on every context.
pub const MARKER: &str = "vamp_ctx";

#[derive(Debug, thiserror::Error)]
pub enum CtxError {
    #[error("deserialize error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("serialize error: {0}")]
    Serialize(serde_json::Error),
    #[error("the payload is not a message context: `{MARKER}` marker is missing")]
    NotAContext,
}

/// State of a single message, threaded through every processing stage.
///
/// Well-known values are typed fields, filled additively as stages run.
/// Anything else goes to an open table of [`rhai::Dynamic`] values.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Ctx {
    /// The message as it entered processing.
    pub stanza: Element,
    pub from: Option<Jid>,
    pub to: Option<Jid>,
    pub event: Option<Event>,
    /// Rules requested by the sender, once extracted and verified.
    pub rules: Option<Vec<Rule>>,
    pub strategy: Option<Strategy>,
    /// User defined variables.
    #[serde(default)]
    variables: std::collections::HashMap<String, rhai::Dynamic>,
    /// Developer defined variables, holds the context marker.
    internal: std::collections::HashMap<String, rhai::Dynamic>,
}

impl Ctx {
    /// Create the context of a message, addresses are read from the
    /// `from` and `to` attributes when they are valid.
    #[must_use]
    pub fn new(stanza: Element) -> Self {
        let from = stanza.jid_attr("from").ok().flatten();
        let to = stanza.jid_attr("to").ok().flatten();

        Self {
            stanza,
            from,
            to,
            event: None,
            rules: None,
            strategy: None,
            variables: std::collections::HashMap::new(),
            internal: std::collections::HashMap::from([(
                MARKER.to_string(),
                rhai::Dynamic::TRUE,
            )]),
        }
    }

    #[must_use]
    pub fn is_ctx(&self) -> bool {
        Self::has_marker(self.internal.get(MARKER))
    }

    fn has_marker(marker: Option<&rhai::Dynamic>) -> bool {
        marker.and_then(|marker| marker.as_bool().ok()) == Some(true)
    }

    /// Set a variable, returning its previous value.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: impl Into<rhai::Dynamic>,
    ) -> Option<rhai::Dynamic> {
        self.variables.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&rhai::Dynamic> {
        self.variables.get(key)
    }

    /// Value of the first key present in the context, `default` if none are.
    #[must_use]
    pub fn get_first(&self, keys: &[&str], default: rhai::Dynamic) -> rhai::Dynamic {
        keys.iter()
            .find_map(|key| self.variables.get(*key))
            .cloned()
            .unwrap_or(default)
    }

    pub fn remove(&mut self, key: &str) -> Option<rhai::Dynamic> {
        self.variables.remove(key)
    }

    /// Parse a context, rejecting any payload that does not carry the marker.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CtxError> {
        let value = serde_json::from_slice::<serde_json::Value>(bytes)?;

        if value
            .get("internal")
            .and_then(|internal| internal.get(MARKER))
            .and_then(serde_json::Value::as_bool)
            != Some(true)
        {
            return Err(CtxError::NotAContext);
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, CtxError> {
        serde_json::to_vec(self).map_err(CtxError::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vamp_protocol::{Action, DeliverValue};

    fn ctx() -> Ctx {
        Ctx::new(
            Element::new("message")
                .with_attr("from", "romeo@montague.lit/orchard")
                .with_attr("to", "juliet@capulet.lit"),
        )
    }

    #[test]
    fn new() {
        let ctx = ctx();
        assert!(ctx.is_ctx());
        assert_eq!(ctx.from.unwrap().to_string(), "romeo@montague.lit/orchard");
        assert_eq!(ctx.to.unwrap().to_string(), "juliet@capulet.lit");
        assert!(ctx.rules.is_none());
    }

    #[test]
    fn invalid_addresses_are_left_empty() {
        let ctx = Ctx::new(Element::new("message").with_attr("from", "@montague.lit"));
        assert!(ctx.from.is_none());
        assert!(ctx.to.is_none());
    }

    #[test]
    fn put_get() {
        let mut ctx = ctx();
        assert!(ctx.put("hops", 3_i64).is_none());
        assert_eq!(ctx.get("hops").unwrap().as_int().unwrap(), 3);
        assert_eq!(ctx.put("hops", 4_i64).unwrap().as_int().unwrap(), 3);
        assert!(ctx.get("missing").is_none());
    }

    #[test]
    fn get_first() {
        let mut ctx = ctx();
        ctx.put("b", "second");
        ctx.put("c", "third");

        assert_eq!(
            ctx.get_first(&["a", "b", "c"], rhai::Dynamic::UNIT)
                .into_string()
                .unwrap(),
            "second"
        );
        assert!(ctx.get_first(&["a", "z"], rhai::Dynamic::UNIT).is_unit());
        assert!(ctx.get_first(&[], rhai::Dynamic::FALSE).as_bool().is_ok());
    }

    #[test]
    fn remove_falls_back_to_default() {
        let mut ctx = ctx();
        ctx.put("a", true);
        ctx.put("b", false);
        assert!(ctx.remove("a").is_some());
        assert!(!ctx
            .get_first(&["a", "b"], rhai::Dynamic::UNIT)
            .as_bool()
            .unwrap());
        assert!(ctx.remove("a").is_none());
    }

    #[test]
    fn json() {
        let mut ctx = ctx();
        ctx.event = Some(Event::Received);
        ctx.rules = Some(vec![vamp_protocol::Rule::deliver(
            DeliverValue::Stored,
            Action::Notify,
        )]);
        ctx.put("hops", 1_i64);

        let parsed = Ctx::from_json(&ctx.to_json().unwrap()).unwrap();
        assert!(parsed.is_ctx());
        assert_eq!(parsed.event, ctx.event);
        assert_eq!(parsed.rules, ctx.rules);
        assert_eq!(parsed.stanza, ctx.stanza);
        assert_eq!(parsed.get("hops").unwrap().as_int().unwrap(), 1);
    }

    #[test]
    fn arbitrary_map_is_not_a_context() {
        let payload = serde_json::json!({
            "stanza": { "name": "message" },
            "from": null,
            "to": null,
            "event": null,
            "rules": null,
            "strategy": null,
            "internal": {}
        });

        assert!(matches!(
            Ctx::from_json(payload.to_string().as_bytes()),
            Err(CtxError::NotAContext)
        ));
    }
}
