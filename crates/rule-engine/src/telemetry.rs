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

use crate::hooks::Telemetry;
use vamp_common::protocol::{Action, Domain, Element, Jid};

/// Reports the activity of the engine as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn on_action_triggered(&self, domain: &Domain, action: Action) {
        tracing::info!(%domain, %action, "amp action triggered");
    }

    fn on_stanza_dropped(
        &self,
        domain: &Domain,
        sender: &Jid,
        recipient: Option<&Jid>,
        stanza: &Element,
    ) {
        tracing::info!(
            %domain,
            %sender,
            recipient = recipient.map(ToString::to_string),
            id = stanza.attr("id"),
            "stanza dropped"
        );
    }
}
