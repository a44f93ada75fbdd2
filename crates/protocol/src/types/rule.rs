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

use crate::{Element, ErrorKind};

/// Condition under which a rule triggers.
///
/// See <https://xmpp.org/extensions/xep-0079.html#conditions>
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Condition {
    Deliver,
    ExpireAt,
    MatchResource,
}

/// What to do with the message when the condition of a rule holds.
///
/// See <https://xmpp.org/extensions/xep-0079.html#actions>
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    /// Send an alert back to the sender, the message is not delivered.
    Alert,
    /// Silently discard the message.
    Drop,
    /// Discard the message and answer with an error.
    Error,
    /// Deliver the message and notify the sender.
    Notify,
}

/// Values of the `deliver` condition.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
#[strum(serialize_all = "lowercase")]
pub enum DeliverValue {
    /// Delivered to an available resource right away.
    Direct,
    /// Forwarded to another address.
    Forward,
    /// Sent through a gateway to a foreign network.
    Gateway,
    /// Will not be delivered at all.
    None,
    /// Stored for later delivery.
    Stored,
}

/// Values of the `match-resource` condition.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumString,
    serde_with::DeserializeFromStr,
    serde_with::SerializeDisplay,
)]
#[strum(serialize_all = "lowercase")]
pub enum MatchResource {
    Any,
    Exact,
    Other,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("`{value}` is not an acceptable value for the `{condition}` condition")]
pub struct ValueFromStrError {
    pub condition: Condition,
    pub value: String,
}

/// The typed payload of a rule, depends on the rule's condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Deliver(DeliverValue),
    MatchResource(MatchResource),
    ExpireAt(time::OffsetDateTime),
}

impl Value {
    /// Parse the `value` attribute of a rule for the given condition.
    pub fn parse(condition: Condition, value: &str) -> Result<Self, ValueFromStrError> {
        let error = || ValueFromStrError {
            condition,
            value: value.to_owned(),
        };

        match condition {
            Condition::Deliver => value.parse().map(Self::Deliver).map_err(|_| error()),
            Condition::MatchResource => value.parse().map(Self::MatchResource).map_err(|_| error()),
            Condition::ExpireAt => {
                time::OffsetDateTime::parse(value, &time::format_description::well_known::Rfc3339)
                    .map(Self::ExpireAt)
                    .map_err(|_| error())
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deliver(value) => write!(f, "{value}"),
            Self::MatchResource(value) => write!(f, "{value}"),
            Self::ExpireAt(at) => f.write_str(
                &at.format(&time::format_description::well_known::Rfc3339)
                    .map_err(|_| std::fmt::Error)?,
            ),
        }
    }
}

/// A processing rule requested by the sender of a message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct Rule {
    pub condition: Condition,
    pub value: Option<Value>,
    pub action: Action,
}

impl Rule {
    #[must_use]
    pub const fn new(condition: Condition, value: Option<Value>, action: Action) -> Self {
        Self {
            condition,
            value,
            action,
        }
    }

    /// Shorthand for a rule on the `deliver` condition.
    #[must_use]
    pub const fn deliver(value: DeliverValue, action: Action) -> Self {
        Self::new(Condition::Deliver, Some(Value::Deliver(value)), action)
    }

    /// Shorthand for a rule on the `match-resource` condition.
    #[must_use]
    pub const fn match_resource(value: MatchResource, action: Action) -> Self {
        Self::new(
            Condition::MatchResource,
            Some(Value::MatchResource(value)),
            action,
        )
    }

    /// Shorthand for a rule on the `expire-at` condition.
    #[must_use]
    pub const fn expire_at(at: time::OffsetDateTime, action: Action) -> Self {
        Self::new(Condition::ExpireAt, Some(Value::ExpireAt(at)), action)
    }

    /// A `deliver` rule on the `none` value states that the message will never
    /// reach its recipient: its action is executed without waiting for a delivery outcome.
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        self.condition == Condition::Deliver
            && self.value == Some(Value::Deliver(DeliverValue::None))
    }

    /// Wire representation, `<rule condition='..' value='..' action='..'/>`.
    #[must_use]
    pub fn to_element(&self) -> Element {
        let rule = Element::new("rule")
            .with_attr("condition", self.condition.as_ref())
            .with_attr("action", self.action.as_ref());

        match &self.value {
            Some(value) => rule.with_attr("value", value.to_string()),
            None => rule,
        }
    }
}

/// The attributes of a `<rule/>` element, as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl RawRule {
    /// Copy the rule attributes of an element as they were sent.
    #[must_use]
    pub fn from_element(element: &Element) -> Self {
        Self {
            condition: element.attr("condition").map(str::to_owned),
            value: element.attr("value").map(str::to_owned),
            action: element.attr("action").map(str::to_owned),
        }
    }

    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut rule = Element::new("rule");
        for (key, value) in [
            ("condition", &self.condition),
            ("value", &self.value),
            ("action", &self.action),
        ] {
            if let Some(value) = value {
                rule.set_attr(key, value.as_str());
            }
        }
        rule
    }
}

/// Reason a [`RawRule`] cannot be turned into a [`Rule`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("the rule misses the `{0}` attribute")]
    MissingAttribute(&'static str),
    #[error("the `{0}` condition is unknown")]
    UnknownCondition(String),
    #[error("the `{0}` action is unknown")]
    UnknownAction(String),
    #[error(transparent)]
    Value(#[from] ValueFromStrError),
}

impl RuleError {
    /// How this error is reported to the sender.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingAttribute(_) => ErrorKind::BadRequest,
            Self::UnknownCondition(_) => ErrorKind::UnsupportedCondition,
            Self::UnknownAction(_) => ErrorKind::UnsupportedAction,
            Self::Value(_) => ErrorKind::NotAcceptable,
        }
    }
}

impl TryFrom<&RawRule> for Rule {
    type Error = RuleError;

    fn try_from(raw: &RawRule) -> Result<Self, Self::Error> {
        let condition = raw
            .condition
            .as_deref()
            .ok_or(RuleError::MissingAttribute("condition"))?;
        let action = raw
            .action
            .as_deref()
            .ok_or(RuleError::MissingAttribute("action"))?;
        let value = raw
            .value
            .as_deref()
            .ok_or(RuleError::MissingAttribute("value"))?;

        let condition = condition
            .parse::<Condition>()
            .map_err(|_| RuleError::UnknownCondition(condition.to_owned()))?;
        let action = action
            .parse::<Action>()
            .map_err(|_| RuleError::UnknownAction(action.to_owned()))?;

        Ok(Self::new(
            condition,
            Some(Value::parse(condition, value)?),
            action,
        ))
    }
}

impl TryFrom<RawRule> for Rule {
    type Error = RuleError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        Self::try_from(&raw)
    }
}

impl From<Rule> for RawRule {
    fn from(rule: Rule) -> Self {
        Self {
            condition: Some(rule.condition.to_string()),
            value: rule.value.as_ref().map(ToString::to_string),
            action: Some(rule.action.to_string()),
        }
    }
}

/// Either a parsed rule or the attributes of a malformed one,
/// both can be reported back to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyRule {
    Valid(Rule),
    Invalid(RawRule),
}

impl AnyRule {
    #[must_use]
    pub fn to_element(&self) -> Element {
        match self {
            Self::Valid(rule) => rule.to_element(),
            Self::Invalid(rule) => rule.to_element(),
        }
    }
}

impl From<Rule> for AnyRule {
    fn from(value: Rule) -> Self {
        Self::Valid(value)
    }
}

impl From<RawRule> for AnyRule {
    fn from(value: RawRule) -> Self {
        Self::Invalid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case(Condition::Deliver, "stored", Value::Deliver(DeliverValue::Stored))]
    #[case(Condition::Deliver, "none", Value::Deliver(DeliverValue::None))]
    #[case(
        Condition::MatchResource,
        "exact",
        Value::MatchResource(MatchResource::Exact)
    )]
    #[case(
        Condition::ExpireAt,
        "2004-09-10T08:33:14Z",
        Value::ExpireAt(time::macros::datetime!(2004-09-10 08:33:14 UTC))
    )]
    fn parse_value(#[case] condition: Condition, #[case] input: &str, #[case] expected: Value) {
        let value = Value::parse(condition, input).unwrap();
        assert_eq!(value, expected);
        assert_eq!(value.to_string(), input);
    }

    #[rstest::rstest]
    #[case(Condition::Deliver, "exact")]
    #[case(Condition::MatchResource, "stored")]
    #[case(Condition::ExpireAt, "tomorrow")]
    fn reject_value(#[case] condition: Condition, #[case] input: &str) {
        assert_eq!(
            Value::parse(condition, input).unwrap_err(),
            ValueFromStrError {
                condition,
                value: input.to_owned()
            }
        );
    }

    #[test]
    fn tokens() {
        assert_eq!("match-resource".parse::<Condition>().unwrap(), Condition::MatchResource);
        assert_eq!(Condition::ExpireAt.as_ref(), "expire-at");
        assert_eq!("notify".parse::<Action>().unwrap(), Action::Notify);
        assert!("Notify".parse::<Action>().is_err());
    }

    #[test]
    fn immediate() {
        assert!(Rule::deliver(DeliverValue::None, Action::Notify).is_immediate());
        assert!(!Rule::deliver(DeliverValue::Stored, Action::Notify).is_immediate());
        assert!(!Rule::new(Condition::Deliver, None, Action::Notify).is_immediate());
        assert!(!Rule::match_resource(MatchResource::Any, Action::Drop).is_immediate());
    }

    #[rstest::rstest]
    #[case(RawRule { condition: None, value: Some("direct".to_owned()), action: Some("notify".to_owned()) }, ErrorKind::BadRequest)]
    #[case(RawRule { condition: Some("deliver".to_owned()), value: None, action: Some("notify".to_owned()) }, ErrorKind::BadRequest)]
    #[case(RawRule { condition: Some("delivered".to_owned()), value: Some("direct".to_owned()), action: Some("notify".to_owned()) }, ErrorKind::UnsupportedCondition)]
    #[case(RawRule { condition: Some("deliver".to_owned()), value: Some("direct".to_owned()), action: Some("explode".to_owned()) }, ErrorKind::UnsupportedAction)]
    #[case(RawRule { condition: Some("deliver".to_owned()), value: Some("later".to_owned()), action: Some("notify".to_owned()) }, ErrorKind::NotAcceptable)]
    fn reject_rule(#[case] raw: RawRule, #[case] kind: ErrorKind) {
        assert_eq!(Rule::try_from(&raw).unwrap_err().kind(), kind);
    }

    #[test]
    fn serde() {
        let rule = Rule::deliver(DeliverValue::Stored, Action::Notify);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "condition": "deliver", "value": "stored", "action": "notify" })
        );
        assert_eq!(serde_json::from_value::<Rule>(json).unwrap(), rule);
        assert!(serde_json::from_value::<Rule>(
            serde_json::json!({ "condition": "deliver", "value": "soon", "action": "notify" })
        )
        .is_err());
    }

    #[test]
    fn to_element() {
        assert_eq!(
            Rule::deliver(DeliverValue::Direct, Action::Notify).to_element(),
            Element::new("rule")
                .with_attr("condition", "deliver")
                .with_attr("value", "direct")
                .with_attr("action", "notify")
        );
        assert_eq!(
            RawRule {
                condition: Some("deliver".to_owned()),
                value: None,
                action: Some("explode".to_owned()),
            }
            .to_element(),
            Element::new("rule")
                .with_attr("condition", "deliver")
                .with_attr("action", "explode")
        );
    }
}
