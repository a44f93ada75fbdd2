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

use crate::{Jid, JidFromStrError};

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A pre-parsed XML element, as handed over by the stream codec.
///
/// Attribute order is not significant, the namespace of the element is
/// carried by its `xmlns` attribute.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub attrs: std::collections::BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: std::collections::BTreeMap::new(),
            children: vec![],
        }
    }

    /// Create an element qualified by the `ns` namespace.
    #[must_use]
    pub fn with_ns(name: impl Into<String>, ns: impl Into<String>) -> Self {
        Self::new(name).with_attr("xmlns", ns)
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Namespace of this element.
    #[must_use]
    pub fn ns(&self) -> Option<&str> {
        self.attr("xmlns")
    }

    #[must_use]
    pub fn is(&self, name: &str, ns: &str) -> bool {
        self.name == name && self.ns() == Some(ns)
    }

    /// Iterate over the child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Get the first child element with the given name and namespace.
    #[must_use]
    pub fn get_child(&self, name: &str, ns: &str) -> Option<&Self> {
        self.child_elements().find(|child| child.is(name, ns))
    }

    /// Remove and return the first child element with the given name and namespace.
    pub fn remove_child(&mut self, name: &str, ns: &str) -> Option<Self> {
        let position = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(child) if child.is(name, ns)))?;

        match self.children.remove(position) {
            Node::Element(child) => Some(child),
            Node::Text(_) => None,
        }
    }

    /// Parse an attribute holding an address, `Ok(None)` if the attribute is absent.
    pub fn jid_attr(&self, key: &str) -> Result<Option<Jid>, JidFromStrError> {
        self.attr(key).map(str::parse).transpose()
    }
}
