//! The console as seen by a host loop: keys in, uniforms and text out.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::command::{parse_command, Assignment, CommandInterpreter, CommandOutcome};
use crate::error::Result;
use crate::hotkeys::HotkeyMap;
use crate::input::{InputAction, InputMachine, InputMode};
use crate::keys::KeyEvent;
use crate::literal::Literal;
use crate::overlay::{draw_overlay, OverlayLayout, TextOverlay};
use crate::profiles::{Demo, Profile, RATIO_PARAM, TIME_PARAM};
use crate::registry::ParameterRegistry;
use crate::sync::{FrameSynchronizer, UniformDecl, UniformSink, UniformType};
use crate::value::Value;

/// Reply to the host loop after a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Shutdown,
}

/// Owns the registry and the input state for one running demo.
#[derive(Debug)]
pub struct ConsoleSession {
    demo: Demo,
    registry: ParameterRegistry,
    input: InputMachine,
    hotkeys: HotkeyMap,
    interpreter: CommandInterpreter,
    synchronizer: FrameSynchronizer,
    overlay: OverlayLayout,
    command_mode_uniform: Option<String>,
    started: Instant,
    rng: StdRng,
    last_outcome: Option<CommandOutcome>,
}

impl ConsoleSession {
    /// Validates the profile and starts the session clock.
    ///
    /// `seed` makes randomizing hot-keys reproducible.
    pub fn new(profile: Profile, seed: Option<u64>) -> Result<Self> {
        let registry = ParameterRegistry::new(profile.specs)?;
        profile.hotkeys.validate(&registry)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            demo = %profile.demo,
            params = registry.len(),
            hotkeys = profile.hotkeys.iter().count(),
            "console session ready"
        );
        Ok(Self {
            demo: profile.demo,
            registry,
            input: InputMachine::new(),
            hotkeys: profile.hotkeys,
            interpreter: CommandInterpreter,
            synchronizer: FrameSynchronizer,
            overlay: profile.overlay,
            command_mode_uniform: profile.command_mode_uniform,
            started: Instant::now(),
            rng,
            last_outcome: None,
        })
    }

    pub fn demo(&self) -> Demo {
        self.demo
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    pub fn mode(&self) -> InputMode {
        self.input.mode()
    }

    pub fn input(&self) -> &InputMachine {
        &self.input
    }

    pub fn hotkeys(&self) -> &HotkeyMap {
        &self.hotkeys
    }

    pub fn started_at(&self) -> Instant {
        self.started
    }

    /// Outcome of the most recent command commit.
    pub fn last_outcome(&self) -> Option<&CommandOutcome> {
        self.last_outcome.as_ref()
    }

    /// Applies a startup override written in command syntax.
    ///
    /// Unlike operator commands, values outside their bounds are rejected.
    pub fn apply_override(&mut self, text: &str) -> Result<Assignment> {
        let assignment = parse_command(&self.registry, text)?;
        self.registry
            .set(&assignment.name, assignment.value.clone())?;
        debug!(param = %assignment.name, value = %assignment.value, "override applied");
        Ok(assignment)
    }

    /// Applies a startup override that was already parsed into a literal.
    pub fn apply_literal(&mut self, name: &str, literal: &Literal) -> Result<Value> {
        let kind = self.registry.spec(name)?.kind();
        let value = literal.coerce(name, kind)?;
        self.registry.set(name, value.clone())?;
        debug!(param = name, value = %value, "override applied");
        Ok(value)
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> Signal {
        debug!(key = event.key.0, action = ?event.action, mods = ?event.mods, "key event");
        match self.input.handle(event) {
            Some(InputAction::Shutdown) => return Signal::Shutdown,
            Some(InputAction::Hotkey { ch, boosted }) => {
                // Bindings were validated against the registry in `new`.
                if let Err(err) = self
                    .hotkeys
                    .apply(ch, boosted, &mut self.registry, &mut self.rng)
                {
                    debug!(key = %ch, error = %err, "hotkey failed");
                }
            }
            Some(InputAction::Commit(text)) => {
                self.last_outcome = Some(self.interpreter.commit(&mut self.registry, &text));
            }
            None => {}
        }
        Signal::Continue
    }

    /// Advances the session clock to `now`.
    pub fn begin_frame(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        if let Err(err) = self.registry.set(TIME_PARAM, Value::Float(elapsed)) {
            debug!(error = %err, "session clock not updated");
        }
    }

    /// Records the drawable aspect ratio; zero-height surfaces are ignored.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        let ratio = width as f32 / height as f32;
        if let Err(err) = self.registry.set(RATIO_PARAM, Value::Float(ratio)) {
            debug!(error = %err, "aspect ratio not updated");
        }
    }

    /// Every uniform [`sync`](Self::sync) pushes, for sizing backend storage.
    pub fn uniform_layout(&self) -> Vec<UniformDecl> {
        let mut layout = self.synchronizer.layout(&self.registry);
        if let Some(uniform) = &self.command_mode_uniform {
            layout.push(UniformDecl::new(uniform.clone(), UniformType::Bool));
        }
        layout
    }

    pub fn sync(&self, sink: &mut dyn UniformSink) {
        self.synchronizer.sync(&self.registry, sink);
        if let Some(uniform) = &self.command_mode_uniform {
            sink.set_bool(uniform, self.input.in_command_mode());
        }
    }

    pub fn draw_overlay(&self, overlay: &mut dyn TextOverlay) {
        draw_overlay(&self.registry, &self.input, self.overlay, overlay);
    }
}
