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

/// Maximum size of a domainpart, see <https://datatracker.ietf.org/doc/html/rfc7622#section-3.2>
const MAX_DOMAIN_LEN: usize = 1023;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomainFromStrError {
    #[error("domain is empty")]
    Empty,
    #[error("domain `{0}` is longer than {MAX_DOMAIN_LEN} bytes")]
    TooLong(String),
    #[error("domain `{domain}` contains the forbidden character {character:?}")]
    ForbiddenCharacter { domain: String, character: char },
}

/// A domain name, used as the routing key of the host processing a stanza.
///
/// Stored lowercased and without a trailing dot, so two domains that route
/// to the same host compare equal.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub struct Domain(String);

impl Domain {
    /// The `localhost` domain.
    #[must_use]
    pub fn localhost() -> Self {
        Self("localhost".to_owned())
    }
}

impl std::str::FromStr for Domain {
    type Err = DomainFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let domain = s.strip_suffix('.').unwrap_or(s);

        if domain.is_empty() {
            return Err(DomainFromStrError::Empty);
        }
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(DomainFromStrError::TooLong(domain.to_owned()));
        }
        if let Some(character) = domain
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '@' | '/' | '"' | '<' | '>'))
        {
            return Err(DomainFromStrError::ForbiddenCharacter {
                domain: domain.to_owned(),
                character,
            });
        }

        Ok(Self(domain.to_lowercase()))
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
