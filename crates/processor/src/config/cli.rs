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

use vamp_rule_engine::protocol::Event;

#[derive(clap::Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the rhai configuration file.
    #[arg(short, long, default_value_t = String::from("/etc/vamp/processor/conf.d/config.rhai"))]
    pub config: String,
    /// Path to the stanza to process, as JSON. `-` reads it from the standard input.
    #[arg(short, long, default_value_t = String::from("-"))]
    pub stanza: String,
    /// Processing event the stanza is at.
    #[arg(short, long, default_value_t = Event::InitialCheck)]
    pub event: Event,
}
