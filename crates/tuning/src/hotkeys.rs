//! Single-key parameter mutations available in normal mode.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::error::{ConsoleError, Result};
use crate::registry::ParameterRegistry;
use crate::value::{Value, ValueKind};

/// Mutation a hot-key performs on its target parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HotkeyAction {
    /// Flip a boolean.
    Toggle,
    /// Replace a float `x` with `1 - x`.
    Complement,
    /// Draw every component of a vec3 uniformly from `[0, 1)`.
    Randomize,
    /// Advance an integer modulo the given count.
    Cycle(i32),
    /// Add to a float; `coarse` is used while a modifier is held.
    Step { fine: f32, coarse: f32 },
}

impl HotkeyAction {
    fn accepts(self, kind: ValueKind) -> bool {
        match self {
            HotkeyAction::Toggle => kind == ValueKind::Bool,
            HotkeyAction::Complement | HotkeyAction::Step { .. } => kind == ValueKind::Float,
            HotkeyAction::Randomize => kind == ValueKind::Vec3,
            HotkeyAction::Cycle(_) => kind == ValueKind::Int,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hotkey {
    pub target: String,
    pub action: HotkeyAction,
}

/// Key-to-mutation table for one demo.
#[derive(Debug, Clone, Default)]
pub struct HotkeyMap {
    bindings: BTreeMap<char, Hotkey>,
}

impl HotkeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, key: char, target: impl Into<String>, action: HotkeyAction) -> Self {
        self.bindings.insert(
            key,
            Hotkey {
                target: target.into(),
                action,
            },
        );
        self
    }

    pub fn get(&self, key: char) -> Option<&Hotkey> {
        self.bindings.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Hotkey)> {
        self.bindings.iter().map(|(key, hotkey)| (*key, hotkey))
    }

    /// Checks every binding against the registry so that applying a
    /// hot-key later cannot fail.
    pub fn validate(&self, registry: &ParameterRegistry) -> Result<()> {
        for hotkey in self.bindings.values() {
            let kind = registry.spec(&hotkey.target)?.kind();
            if !hotkey.action.accepts(kind) {
                return Err(ConsoleError::TypeMismatch {
                    name: hotkey.target.clone(),
                    expected: expected_kind(hotkey.action),
                    found: kind,
                });
            }
            if let HotkeyAction::Cycle(modulus) = hotkey.action {
                if modulus <= 0 {
                    return Err(ConsoleError::OutOfRange {
                        name: hotkey.target.clone(),
                        value: f64::from(modulus),
                        min: 1.0,
                        max: f64::from(i32::MAX),
                    });
                }
            }
        }
        Ok(())
    }

    /// Applies the binding for `key`, if any. Returns whether a parameter
    /// changed.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        key: char,
        boosted: bool,
        registry: &mut ParameterRegistry,
        rng: &mut R,
    ) -> Result<bool> {
        let Some(hotkey) = self.get(key) else {
            return Ok(false);
        };
        let target = hotkey.target.as_str();
        match hotkey.action {
            HotkeyAction::Toggle => {
                registry.toggle(target)?;
            }
            HotkeyAction::Complement => {
                let current = registry.float(target)?;
                registry.set_clamped(target, Value::Float(1.0 - current))?;
            }
            HotkeyAction::Randomize => {
                let color = [rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()];
                registry.set_clamped(target, Value::Vec3(color))?;
            }
            HotkeyAction::Cycle(modulus) => {
                registry.cycle(target, modulus)?;
            }
            HotkeyAction::Step { fine, coarse } => {
                let step = if boosted { coarse } else { fine };
                let current = registry.float(target)?;
                registry.set_clamped(target, Value::Float(current + step))?;
            }
        }
        let value = registry.get(target)?;
        debug!(key = %key, param = target, value = %value, "hotkey applied");
        Ok(true)
    }
}

fn expected_kind(action: HotkeyAction) -> ValueKind {
    match action {
        HotkeyAction::Toggle => ValueKind::Bool,
        HotkeyAction::Complement | HotkeyAction::Step { .. } => ValueKind::Float,
        HotkeyAction::Randomize => ValueKind::Vec3,
        HotkeyAction::Cycle(_) => ValueKind::Int,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::registry::ParamSpec;

    fn registry() -> ParameterRegistry {
        ParameterRegistry::new([
            ParamSpec::float("blink_freq", 3.0).bounds(0.5, 20.0),
            ParamSpec::flag("blink_toggle", false),
            ParamSpec::float("rotation_speed", 0.0),
            ParamSpec::vec3("focus_color", [0.0, 0.0, 1.0]).bounds(0.0, 1.0),
            ParamSpec::int("idle_display_mode", 0).bounds(0.0, 2.0),
        ])
        .unwrap()
    }

    fn hotkeys() -> HotkeyMap {
        let step = HotkeyAction::Step {
            fine: 0.1,
            coarse: 1.0,
        };
        let down = HotkeyAction::Step {
            fine: -0.1,
            coarse: -1.0,
        };
        HotkeyMap::new()
            .bind('b', "blink_toggle", HotkeyAction::Toggle)
            .bind('r', "rotation_speed", HotkeyAction::Complement)
            .bind('f', "focus_color", HotkeyAction::Randomize)
            .bind('s', "idle_display_mode", HotkeyAction::Cycle(3))
            .bind('=', "blink_freq", step)
            .bind('-', "blink_freq", down)
    }

    #[test]
    fn double_toggle_restores_the_flag() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(7);
        let map = hotkeys();
        map.apply('b', false, &mut registry, &mut rng).unwrap();
        assert!(registry.flag("blink_toggle").unwrap());
        map.apply('b', false, &mut registry, &mut rng).unwrap();
        assert!(!registry.flag("blink_toggle").unwrap());
    }

    #[test]
    fn stepping_stays_within_bounds() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(7);
        let map = hotkeys();
        for _ in 0..50 {
            map.apply('=', true, &mut registry, &mut rng).unwrap();
            let freq = registry.float("blink_freq").unwrap();
            assert!((0.5..=20.0).contains(&freq));
        }
        assert_eq!(registry.float("blink_freq").unwrap(), 20.0);
        for _ in 0..400 {
            map.apply('-', false, &mut registry, &mut rng).unwrap();
            let freq = registry.float("blink_freq").unwrap();
            assert!((0.5..=20.0).contains(&freq));
        }
        assert_eq!(registry.float("blink_freq").unwrap(), 0.5);
    }

    #[test]
    fn fine_and_coarse_steps() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(7);
        let map = hotkeys();
        map.apply('=', false, &mut registry, &mut rng).unwrap();
        assert!((registry.float("blink_freq").unwrap() - 3.1).abs() < 1e-5);
        map.apply('=', true, &mut registry, &mut rng).unwrap();
        assert!((registry.float("blink_freq").unwrap() - 4.1).abs() < 1e-5);
    }

    #[test]
    fn complement_cycle_and_randomize() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(7);
        let map = hotkeys();

        map.apply('r', false, &mut registry, &mut rng).unwrap();
        assert_eq!(registry.float("rotation_speed").unwrap(), 1.0);
        map.apply('r', false, &mut registry, &mut rng).unwrap();
        assert_eq!(registry.float("rotation_speed").unwrap(), 0.0);

        map.apply('s', false, &mut registry, &mut rng).unwrap();
        map.apply('s', false, &mut registry, &mut rng).unwrap();
        map.apply('s', false, &mut registry, &mut rng).unwrap();
        assert_eq!(registry.int("idle_display_mode").unwrap(), 0);

        map.apply('f', false, &mut registry, &mut rng).unwrap();
        let Value::Vec3(color) = registry.get("focus_color").unwrap().clone() else {
            panic!("focus_color changed kind");
        };
        assert!(color.iter().all(|c| (0.0..1.0).contains(c)));
    }

    #[test]
    fn unbound_keys_do_nothing() {
        let mut registry = registry();
        let mut rng = StdRng::seed_from_u64(7);
        let before = registry.summary();
        assert!(!hotkeys().apply('q', false, &mut registry, &mut rng).unwrap());
        assert_eq!(registry.summary(), before);
    }

    #[test]
    fn validation_catches_bad_bindings() {
        let registry = registry();
        assert!(hotkeys().validate(&registry).is_ok());
        let wrong_kind = HotkeyMap::new().bind('b', "blink_freq", HotkeyAction::Toggle);
        assert!(matches!(
            wrong_kind.validate(&registry),
            Err(ConsoleError::TypeMismatch { .. })
        ));
        let missing = HotkeyMap::new().bind('x', "nope", HotkeyAction::Toggle);
        assert!(matches!(
            missing.validate(&registry),
            Err(ConsoleError::UnknownParameter(_))
        ));
        let zero = HotkeyMap::new().bind('s', "idle_display_mode", HotkeyAction::Cycle(0));
        assert!(zero.validate(&registry).is_err());
    }
}
