use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use tracing::{debug, error, info, warn};
use tuning::{ConsoleSession, KeyAction, KeyEvent, Modifiers, RawKey, Signal};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::overlay::TitleOverlay;
use crate::types::RendererConfig;

/// Opens the window on the calling thread and drives `session` until it asks
/// to shut down or the window is closed.
pub(crate) fn run_window(config: RendererConfig, mut session: ConsoleSession) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;

    let gpu = GpuState::new(&window, window.inner_size(), &config, &session)
        .map_err(|err| anyhow!("failed to initialise renderer: {err:#}"))?;
    let mut state = WindowState { gpu, window };
    let size = state.gpu.size();
    session.set_aspect_ratio(size.width, size.height);

    let mut pacer = FramePacer::new(config.target_fps);
    let mut overlay = TitleOverlay::new(config.title.clone());
    let mut modifiers = Modifiers::empty();
    info!(
        demo = %session.demo(),
        shader = %config.shader.label,
        compiler = %config.shader_compiler,
        "window open; Shift+; enters command mode, Esc quits"
    );
    state.window.request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
                WindowEvent::ModifiersChanged(changed) => {
                    modifiers = modifiers_from_winit(changed.state());
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let Some(key) = raw_key(event.physical_key) else {
                        return;
                    };
                    let action = match (event.state, event.repeat) {
                        (ElementState::Pressed, false) => KeyAction::Press,
                        (ElementState::Pressed, true) => KeyAction::Repeat,
                        (ElementState::Released, _) => KeyAction::Release,
                    };
                    let event = KeyEvent {
                        key,
                        action,
                        mods: modifiers,
                    };
                    if session.handle_key(event) == Signal::Shutdown {
                        info!("shutdown requested from keyboard");
                        elwt.exit();
                    }
                }
                WindowEvent::Resized(new_size) => {
                    state.gpu.resize(new_size);
                    session.set_aspect_ratio(new_size.width, new_size.height);
                }
                WindowEvent::RedrawRequested => {
                    session.begin_frame(Instant::now());
                    match state.gpu.render(&session) {
                        Ok(()) => pacer.mark_rendered(Instant::now()),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.gpu.resize(state.gpu.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(other) => {
                            warn!(error = ?other, "surface error; retrying next frame");
                        }
                    }
                    overlay.begin();
                    session.draw_overlay(&mut overlay);
                    if let Some(title) = overlay.finish() {
                        debug!(title, "overlay changed");
                        state.window.set_title(title);
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                match pacer.next_deadline() {
                    Some(deadline) if deadline > now => {
                        elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                    }
                    _ => {
                        state.window.request_redraw();
                        elwt.set_control_flow(ControlFlow::Wait);
                    }
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

/// The surface inside `gpu` borrows the window's native handles, so `gpu`
/// is declared first and dropped before the window.
struct WindowState {
    gpu: GpuState,
    window: Window,
}

/// Spaces redraws to an optional frame-rate cap.
#[derive(Debug)]
struct FramePacer {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FramePacer {
    fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            last_frame: None,
        }
    }

    fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    fn next_deadline(&self) -> Option<Instant> {
        Some(self.last_frame? + self.interval?)
    }
}

fn modifiers_from_winit(state: ModifiersState) -> Modifiers {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, state.shift_key());
    mods.set(Modifiers::CONTROL, state.control_key());
    mods.set(Modifiers::ALT, state.alt_key());
    mods.set(Modifiers::SUPER, state.super_key());
    mods
}

/// Maps a physical key to its US-layout identifier.
fn raw_key(key: PhysicalKey) -> Option<RawKey> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let legend = match code {
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        KeyCode::Digit0 | KeyCode::Numpad0 => '0',
        KeyCode::Digit1 | KeyCode::Numpad1 => '1',
        KeyCode::Digit2 | KeyCode::Numpad2 => '2',
        KeyCode::Digit3 | KeyCode::Numpad3 => '3',
        KeyCode::Digit4 | KeyCode::Numpad4 => '4',
        KeyCode::Digit5 | KeyCode::Numpad5 => '5',
        KeyCode::Digit6 | KeyCode::Numpad6 => '6',
        KeyCode::Digit7 | KeyCode::Numpad7 => '7',
        KeyCode::Digit8 | KeyCode::Numpad8 => '8',
        KeyCode::Digit9 | KeyCode::Numpad9 => '9',
        KeyCode::Space => ' ',
        KeyCode::Minus | KeyCode::NumpadSubtract => '-',
        KeyCode::Equal => '=',
        KeyCode::BracketLeft => '[',
        KeyCode::BracketRight => ']',
        KeyCode::Backslash => '\\',
        KeyCode::Semicolon => ';',
        KeyCode::Quote => '\'',
        KeyCode::Backquote => '`',
        KeyCode::Comma => ',',
        KeyCode::Period | KeyCode::NumpadDecimal => '.',
        KeyCode::Slash => '/',
        KeyCode::Escape => return Some(RawKey::ESCAPE),
        KeyCode::Enter => return Some(RawKey::ENTER),
        KeyCode::NumpadEnter => return Some(RawKey::KP_ENTER),
        KeyCode::Tab => return Some(RawKey::TAB),
        KeyCode::Backspace => return Some(RawKey::BACKSPACE),
        _ => return None,
    };
    Some(RawKey::from_char(legend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_printable_keys_to_legends() {
        assert_eq!(raw_key(PhysicalKey::Code(KeyCode::KeyB)), Some(RawKey(66)));
        assert_eq!(raw_key(PhysicalKey::Code(KeyCode::Semicolon)), Some(RawKey(59)));
        assert_eq!(raw_key(PhysicalKey::Code(KeyCode::Space)), Some(RawKey::SPACE));
        assert_eq!(raw_key(PhysicalKey::Code(KeyCode::Numpad7)), Some(RawKey(55)));
    }

    #[test]
    fn maps_named_keys() {
        assert_eq!(raw_key(PhysicalKey::Code(KeyCode::Escape)), Some(RawKey::ESCAPE));
        assert!(raw_key(PhysicalKey::Code(KeyCode::NumpadEnter))
            .is_some_and(RawKey::is_enter));
        assert_eq!(raw_key(PhysicalKey::Code(KeyCode::F1)), None);
    }

    #[test]
    fn converts_modifier_state() {
        let mods = modifiers_from_winit(ModifiersState::SHIFT | ModifiersState::ALT);
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::ALT);
    }

    #[test]
    fn pacer_waits_only_with_a_cap() {
        let now = Instant::now();
        let mut uncapped = FramePacer::new(None);
        uncapped.mark_rendered(now);
        assert!(uncapped.next_deadline().is_none());

        let mut capped = FramePacer::new(Some(50.0));
        assert!(capped.next_deadline().is_none());
        capped.mark_rendered(now);
        let wait = capped.next_deadline().unwrap() - now;
        assert!(wait > Duration::from_millis(19) && wait < Duration::from_millis(21));
    }
}
