//! `name value` commands typed in command-entry mode.

use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::literal::parse_literal;
use crate::registry::ParameterRegistry;
use crate::value::Value;

/// A parsed command ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Value,
}

/// Result of committing a command line, reported for inspection only.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Applied(Assignment),
    Discarded(ConsoleError),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied(_))
    }
}

/// Splits normalized text into a parameter name and its raw value.
///
/// `=` is treated as whitespace, so `blink_freq=5` and `blink_freq 5` are
/// equivalent.
pub fn split_command(text: &str) -> Result<(String, String)> {
    let normalized = text.replace('=', " ");
    let normalized = normalized.trim();
    let (name, rest) = normalized
        .split_once(' ')
        .ok_or_else(|| ConsoleError::parse(text, "missing value"))?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(ConsoleError::parse(text, "missing value"));
    }
    Ok((name.to_string(), rest.to_string()))
}

/// Parses `text` against the registry without applying it.
pub fn parse_command(registry: &ParameterRegistry, text: &str) -> Result<Assignment> {
    let (name, raw) = split_command(text)?;
    let kind = registry.spec(&name)?.kind();
    let value = parse_literal(&raw)?.coerce(&name, kind)?;
    Ok(Assignment { name, value })
}

/// Applies committed command lines to a registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandInterpreter;

impl CommandInterpreter {
    /// Parses and applies a command, returning the error instead of logging.
    pub fn apply(&self, registry: &mut ParameterRegistry, text: &str) -> Result<Assignment> {
        let assignment = parse_command(registry, text)?;
        registry.set_clamped(&assignment.name, assignment.value.clone())?;
        let stored = registry.get(&assignment.name)?.clone();
        Ok(Assignment {
            name: assignment.name,
            value: stored,
        })
    }

    /// Applies a command typed by the operator. Failures leave the registry
    /// untouched and are only logged.
    pub fn commit(&self, registry: &mut ParameterRegistry, text: &str) -> CommandOutcome {
        match self.apply(registry, text) {
            Ok(assignment) => {
                debug!(param = %assignment.name, value = %assignment.value, "command applied");
                CommandOutcome::Applied(assignment)
            }
            Err(err) => {
                debug!(command = text, error = %err, "command discarded");
                CommandOutcome::Discarded(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ParamSpec;

    fn registry() -> ParameterRegistry {
        ParameterRegistry::new([
            ParamSpec::float("blink_freq", 3.0).bounds(0.5, 20.0),
            ParamSpec::int("wedges", 12),
            ParamSpec::flag("blink_toggle", false),
            ParamSpec::vec3("focus_color", [0.0, 0.0, 1.0]).bounds(0.0, 1.0),
            ParamSpec::float_seq("ring_edges", vec![0.2, 0.9]).capacity(4),
            ParamSpec::float("rotation_speed", 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn sets_a_float() {
        let mut registry = registry();
        let outcome = CommandInterpreter.commit(&mut registry, "blink_freq 5");
        assert!(outcome.is_applied());
        assert_eq!(registry.float("blink_freq").unwrap(), 5.0);
    }

    #[test]
    fn equals_sign_is_a_separator() {
        let mut registry = registry();
        CommandInterpreter.commit(&mut registry, " wedges=24 ");
        assert_eq!(registry.int("wedges").unwrap(), 24);
        CommandInterpreter.commit(&mut registry, "blink_toggle = 1");
        assert!(registry.flag("blink_toggle").unwrap());
    }

    #[test]
    fn missing_value_leaves_registry_unchanged() {
        let mut registry = registry();
        for text in ["blink_freq", "blink_freq ", "blink_freq=", ""] {
            let outcome = CommandInterpreter.commit(&mut registry, text);
            assert!(
                matches!(outcome, CommandOutcome::Discarded(ConsoleError::ParseFailure { .. })),
                "{text:?}"
            );
        }
        assert_eq!(registry.float("blink_freq").unwrap(), 3.0);
    }

    #[test]
    fn unknown_parameter_is_discarded() {
        let mut registry = registry();
        let before = registry.summary();
        let outcome = CommandInterpreter.commit(&mut registry, "unknown_param 1");
        assert_eq!(
            outcome,
            CommandOutcome::Discarded(ConsoleError::UnknownParameter("unknown_param".into()))
        );
        assert_eq!(registry.summary(), before);
    }

    #[test]
    fn type_mismatches_and_garbage_are_discarded() {
        let mut registry = registry();
        let before = registry.summary();
        for text in [
            "wedges 2.5",
            "focus_color 1",
            "focus_color (1, 2)",
            "blink_freq (1, 2, 3)",
            "blink_freq __import__",
            "ring_edges [0.1, 0.2, 0.3, 0.4, 0.5]",
        ] {
            assert!(!CommandInterpreter.commit(&mut registry, text).is_applied(), "{text}");
        }
        assert_eq!(registry.summary(), before);
    }

    #[test]
    fn values_are_clamped_into_bounds() {
        let mut registry = registry();
        CommandInterpreter.commit(&mut registry, "blink_freq 100");
        assert_eq!(registry.float("blink_freq").unwrap(), 20.0);
        CommandInterpreter.commit(&mut registry, "focus_color (2, 0.5, -1)");
        assert_eq!(
            registry.get("focus_color").unwrap(),
            &Value::Vec3([1.0, 0.5, 0.0])
        );
    }

    #[test]
    fn sequences_replace_wholesale() {
        let mut registry = registry();
        CommandInterpreter.commit(&mut registry, "ring_edges [0.1 0.3 0.7]");
        assert_eq!(
            registry.get("ring_edges").unwrap(),
            &Value::FloatSeq(vec![0.1, 0.3, 0.7])
        );
    }

    #[test]
    fn overflowing_or_deeply_nested_values_are_discarded() {
        let mut registry = registry();
        let before = registry.summary();
        let nested = format!("ring_edges {}", "(".repeat(200_000));
        for text in ["rotation_speed 1e39", "focus_color (0 0 1e39)", nested.as_str()] {
            assert!(
                matches!(
                    CommandInterpreter.commit(&mut registry, text),
                    CommandOutcome::Discarded(_)
                ),
                "{}",
                &text[..text.len().min(24)]
            );
        }
        assert_eq!(registry.summary(), before);
    }
}
