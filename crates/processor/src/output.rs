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

use vamp_rule_engine::{
    protocol::{Element, Jid},
    Outcome, Router,
};

/// Writes the routed responses and the outcome as JSON lines.
pub struct JsonLines<W> {
    writer: std::sync::Mutex<W>,
}

impl<W: std::io::Write> JsonLines<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer: std::sync::Mutex::new(writer),
        }
    }

    fn write(&self, value: &serde_json::Value) -> std::io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "poisoned writer"))?;

        serde_json::to_writer(&mut *writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn outcome(&self, outcome: &Outcome) -> std::io::Result<()> {
        self.write(&match outcome {
            Outcome::Forward(stanza) => serde_json::json!({ "forward": stanza }),
            Outcome::Dropped => serde_json::json!({ "dropped": true }),
        })
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: std::io::Write + Send> Router for JsonLines<W> {
    fn route(&self, from: &Jid, to: &Jid, stanza: Element) {
        if let Err(error) = self.write(&serde_json::json!({
            "route": { "from": from, "to": to, "stanza": stanza }
        })) {
            tracing::error!(%error, %to, "failed to route a response");
        }
    }
}
