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

use crate::{
    hooks::{ConditionResolver, MessageRef, StrategyResolver, SupportResolver},
    verify::SupportResult,
};
use std::ops::ControlFlow;
use vamp_common::protocol::{Domain, ErrorKind, RawRule, Rule, Strategy};

/// Name of the script functions.
pub const VERIFY_SUPPORT: &str = "verify_support";
pub const DETERMINE_STRATEGY: &str = "determine_strategy";
pub const CHECK_CONDITION: &str = "check_condition";

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to open the amp script at `{0}`: {1}")]
    FileOpen(std::path::PathBuf, std::io::Error),
    #[error("failed to compile the amp script: `{0}`")]
    Compilation(#[from] rhai::ParseError),
    #[error("`{function}` failed: {error}")]
    Execution {
        function: &'static str,
        error: Box<rhai::EvalAltResult>,
    },
    #[error("`{function}` returned an unexpected value: {reason}")]
    Return {
        function: &'static str,
        reason: String,
    },
}

/// Resolver delegating to functions of a rhai script.
///
/// Each function is optional. Returning `()` hands the decision to the next
/// resolver, any other value settles it.
///
/// ```rhai
/// // `rule` is a map of the `condition`, `value` and `action` strings.
/// // Return `true`, `false` or an error kind such as "unsupported-action".
/// fn verify_support(domain, rule) { () }
///
/// // `ctx` holds `sender`, `recipient`, `event` and `stanza`.
/// // Return a map with `status`, `deliver`, `match_resource` and `now`.
/// fn determine_strategy(domain, ctx) { () }
///
/// // Return a boolean.
/// fn check_condition(domain, strategy, rule) { () }
/// ```
#[derive(Debug)]
pub struct ScriptResolver {
    engine: rhai::Engine,
    ast: rhai::AST,
}

impl ScriptResolver {
    pub fn from_file(path: &impl AsRef<std::path::Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let script = std::fs::read_to_string(path)
            .map_err(|error| ScriptError::FileOpen(path.into(), error))?;

        Self::from_script(&script)
    }

    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        let mut engine = rhai::Engine::new();

        engine
            .on_print(|msg| tracing::info!("{}", msg))
            .on_debug(|msg, src, pos| tracing::debug!(?src, ?pos, msg));

        let ast = engine.compile(script)?;

        Ok(Self { engine, ast })
    }

    /// Call a function of the script, `None` if it is not defined or returned `()`.
    fn call(
        &self,
        function: &'static str,
        args: impl rhai::FuncArgs,
    ) -> Result<Option<rhai::Dynamic>, ScriptError> {
        match self
            .engine
            .call_fn::<rhai::Dynamic>(&mut rhai::Scope::new(), &self.ast, function, args)
        {
            Ok(value) if value.is_unit() => Ok(None),
            Ok(value) => Ok(Some(value)),
            // the function is optional, signatures are formatted as `name (types)`
            Err(error)
                if matches!(
                    &*error,
                    rhai::EvalAltResult::ErrorFunctionNotFound(signature, _)
                        if signature.split_whitespace().next() == Some(function)
                ) =>
            {
                Ok(None)
            }
            Err(error) => Err(ScriptError::Execution { function, error }),
        }
    }

    fn to_dynamic(function: &'static str, value: impl serde::Serialize) -> Result<rhai::Dynamic, ScriptError> {
        rhai::serde::to_dynamic(value).map_err(|error| ScriptError::Execution { function, error })
    }

    fn support(&self, domain: &Domain, rule: &Rule) -> Result<Option<SupportResult>, ScriptError> {
        let args = (
            domain.to_string(),
            Self::to_dynamic(VERIFY_SUPPORT, RawRule::from(rule.clone()))?,
        );

        let Some(value) = self.call(VERIFY_SUPPORT, args)? else {
            return Ok(None);
        };

        let result = if let Ok(supported) = value.as_bool() {
            if supported {
                SupportResult::Supported(rule.clone())
            } else {
                SupportResult::Unsupported(ErrorKind::UnsupportedCondition, rule.clone())
            }
        } else {
            let kind = value
                .into_string()
                .map_err(|type_name| ScriptError::Return {
                    function: VERIFY_SUPPORT,
                    reason: format!("expected a boolean or an error kind, got `{type_name}`"),
                })?;
            let kind = kind.parse::<ErrorKind>().map_err(|_| ScriptError::Return {
                function: VERIFY_SUPPORT,
                reason: format!("`{kind}` is not an error kind"),
            })?;
            SupportResult::Unsupported(kind, rule.clone())
        };

        Ok(Some(result))
    }

    fn strategy(&self, domain: &Domain, message: &MessageRef<'_>) -> Result<Option<Strategy>, ScriptError> {
        let mut ctx = rhai::Map::new();
        ctx.insert("sender".into(), message.sender.to_string().into());
        ctx.insert(
            "recipient".into(),
            message
                .recipient
                .map_or(rhai::Dynamic::UNIT, |recipient| recipient.to_string().into()),
        );
        ctx.insert("event".into(), message.event.to_string().into());
        ctx.insert("stanza".into(), Self::to_dynamic(DETERMINE_STRATEGY, message.stanza)?);

        self.call(DETERMINE_STRATEGY, (domain.to_string(), ctx))?
            .map(|value| {
                rhai::serde::from_dynamic::<Strategy>(&value).map_err(|error| ScriptError::Return {
                    function: DETERMINE_STRATEGY,
                    reason: error.to_string(),
                })
            })
            .transpose()
    }

    fn condition(&self, domain: &Domain, strategy: &Strategy, rule: &Rule) -> Result<Option<bool>, ScriptError> {
        let args = (
            domain.to_string(),
            Self::to_dynamic(CHECK_CONDITION, strategy)?,
            Self::to_dynamic(CHECK_CONDITION, RawRule::from(rule.clone()))?,
        );

        self.call(CHECK_CONDITION, args)?
            .map(|value| {
                value.as_bool().map_err(|type_name| ScriptError::Return {
                    function: CHECK_CONDITION,
                    reason: format!("expected a boolean, got `{type_name}`"),
                })
            })
            .transpose()
    }
}

impl SupportResolver for ScriptResolver {
    /// Settles the support when the script decided for every rule still supported.
    fn verify_support(
        &self,
        domain: &Domain,
        results: Vec<SupportResult>,
    ) -> ControlFlow<Vec<SupportResult>, Vec<SupportResult>> {
        let mut decided = true;

        let results = results
            .into_iter()
            .map(|result| match result {
                SupportResult::Supported(rule) => match self.support(domain, &rule) {
                    Ok(Some(result)) => result,
                    Ok(None) => {
                        decided = false;
                        SupportResult::Supported(rule)
                    }
                    Err(error) => {
                        tracing::warn!(%error, "amp script error");
                        decided = false;
                        SupportResult::Supported(rule)
                    }
                },
                unsupported @ SupportResult::Unsupported(..) => unsupported,
            })
            .collect();

        if decided {
            ControlFlow::Break(results)
        } else {
            ControlFlow::Continue(results)
        }
    }
}

impl StrategyResolver for ScriptResolver {
    fn determine_strategy(
        &self,
        domain: &Domain,
        message: &MessageRef<'_>,
        strategy: Strategy,
    ) -> ControlFlow<Strategy, Strategy> {
        match self.strategy(domain, message) {
            Ok(Some(strategy)) => ControlFlow::Break(strategy),
            Ok(None) => ControlFlow::Continue(strategy),
            Err(error) => {
                tracing::warn!(%error, "amp script error");
                ControlFlow::Continue(strategy)
            }
        }
    }
}

impl ConditionResolver for ScriptResolver {
    fn check_condition(
        &self,
        domain: &Domain,
        strategy: &Strategy,
        rule: &Rule,
        holds: bool,
    ) -> ControlFlow<bool, bool> {
        match self.condition(domain, strategy, rule) {
            Ok(Some(holds)) => ControlFlow::Break(holds),
            Ok(None) => ControlFlow::Continue(holds),
            Err(error) => {
                tracing::warn!(%error, "amp script error");
                ControlFlow::Continue(holds)
            }
        }
    }
}
