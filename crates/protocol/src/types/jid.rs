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

use crate::{types::domain::DomainFromStrError, Domain};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum JidFromStrError {
    #[error("cannot parse {jid:?}: empty localpart")]
    EmptyLocalpart { jid: String },
    #[error("cannot parse {jid:?}: empty resourcepart")]
    EmptyResource { jid: String },
    #[error("cannot parse {jid:?}: the localpart contains {character:?}")]
    ForbiddenCharacter { jid: String, character: char },
    #[error("cannot parse {jid:?}: {source}")]
    Domain {
        jid: String,
        #[source]
        source: DomainFromStrError,
    },
}

/// Address of an entity, `[localpart@]domainpart[/resourcepart]`.
///
/// See <https://datatracker.ietf.org/doc/html/rfc7622>
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde_with::SerializeDisplay, serde_with::DeserializeFromStr)]
pub struct Jid {
    node: Option<String>,
    domain: Domain,
    resource: Option<String>,
}

impl std::str::FromStr for Jid {
    type Err = JidFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bare, resource) = match s.split_once('/') {
            Some((_, "")) => return Err(JidFromStrError::EmptyResource { jid: s.to_owned() }),
            Some((bare, resource)) => (bare, Some(resource.to_owned())),
            None => (s, None),
        };

        let (node, domain) = match bare.split_once('@') {
            Some(("", _)) => return Err(JidFromStrError::EmptyLocalpart { jid: s.to_owned() }),
            Some((node, domain)) => (Some(node), domain),
            None => (None, bare),
        };

        if let Some(character) = node.and_then(|node| {
            node.chars()
                .find(|c| c.is_whitespace() || matches!(c, '"' | '&' | '\'' | ':' | '<' | '>'))
        }) {
            return Err(JidFromStrError::ForbiddenCharacter {
                jid: s.to_owned(),
                character,
            });
        }

        Ok(Self {
            node: node.map(str::to_lowercase),
            domain: domain.parse().map_err(|source| JidFromStrError::Domain {
                jid: s.to_owned(),
                source,
            })?,
            resource,
        })
    }
}

impl std::fmt::Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(node) = &self.node {
            write!(f, "{node}@")?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{resource}")?;
        }
        Ok(())
    }
}

impl From<Domain> for Jid {
    fn from(domain: Domain) -> Self {
        Self {
            node: None,
            domain,
            resource: None,
        }
    }
}

impl Jid {
    /// The localpart of the address, if any.
    #[must_use]
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// The domainpart of the address.
    #[must_use]
    pub const fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The resourcepart of the address, if any.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Copy of this address without its resource.
    #[must_use]
    pub fn bare(&self) -> Self {
        Self {
            node: self.node.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    #[must_use]
    pub const fn is_bare(&self) -> bool {
        self.resource.is_none()
    }
}
