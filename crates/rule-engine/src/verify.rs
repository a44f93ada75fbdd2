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

use vamp_common::protocol::{ErrorKind, Rule};

/// Whether the server can honor a requested rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupportResult {
    Supported(Rule),
    Unsupported(ErrorKind, Rule),
}

impl SupportResult {
    #[must_use]
    pub const fn rule(&self) -> &Rule {
        match self {
            Self::Supported(rule) | Self::Unsupported(_, rule) => rule,
        }
    }
}

/// Split verified rules: all the rules if every one of them is supported,
/// the first unsupported one otherwise.
pub fn partition(results: Vec<SupportResult>) -> Result<Vec<Rule>, (ErrorKind, Rule)> {
    let mut good = Vec::with_capacity(results.len());

    for result in results {
        match result {
            SupportResult::Supported(rule) => good.push(rule),
            SupportResult::Unsupported(kind, rule) => return Err((kind, rule)),
        }
    }

    Ok(good)
}
