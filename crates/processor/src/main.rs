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

use vamp_config::{semver, Config};
use vamp_processor::{
    config::{cli::Args, ProcessorConfig},
    output::JsonLines,
};
use vamp_rule_engine::{protocol::Element, AmpEngine};

fn read_stanza(path: &str) -> std::io::Result<String> {
    if path == "-" {
        std::io::read_to_string(std::io::stdin())
    } else {
        std::fs::read_to_string(path)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::prelude::*;

    let args = <Args as clap::Parser>::parse();
    let config = ProcessorConfig::load(&args.config).map_err(|error| {
        eprintln!("Failed to boot Processor service: {error}");
        error
    })?;
    config.check_api_version(&semver::Version::parse(env!("CARGO_PKG_VERSION"))?)?;

    // stdout is reserved for the output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(config.logs().targets()),
        )
        .try_init()?;

    std::panic::set_hook(Box::new(|e| {
        tracing::error!(?e, "Panic occurred");
    }));

    let output = std::sync::Arc::new(JsonLines::new(std::io::stdout()));
    let engine = AmpEngine::from_config(config.host.clone(), &config.amp, output.clone())?;

    let stanza = serde_json::from_str::<Element>(&read_stanza(&args.stanza)?)?;

    tracing::info!(event = %args.event, "Processor service is starting");
    let outcome = engine.process(stanza, args.event);
    output.outcome(&outcome)?;

    Ok(())
}
