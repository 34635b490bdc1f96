//! Parameter sets and hot-keys of the bundled demos.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hotkeys::{HotkeyAction, HotkeyMap};
use crate::overlay::OverlayLayout;
use crate::registry::ParamSpec;

/// Registry entry advanced by the session clock, in seconds.
pub const TIME_PARAM: &str = "time";
/// Registry entry following the window aspect ratio.
pub const RATIO_PARAM: &str = "ratio";

const BLINK_FREQ_RANGE: (f64, f64) = (0.5, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Demo {
    Rect,
    Circle,
    #[default]
    CircleV2,
}

impl Demo {
    pub const ALL: [Demo; 3] = [Demo::Rect, Demo::Circle, Demo::CircleV2];

    pub fn name(self) -> &'static str {
        match self {
            Demo::Rect => "rect",
            Demo::Circle => "circle",
            Demo::CircleV2 => "circle-v2",
        }
    }

    pub fn profile(self) -> Profile {
        match self {
            Demo::Rect => rect(),
            Demo::Circle => circle(),
            Demo::CircleV2 => circle_v2(),
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown demo '{0}' (expected rect, circle or circle-v2)")]
pub struct UnknownDemo(pub String);

impl FromStr for Demo {
    type Err = UnknownDemo;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Demo::ALL
            .into_iter()
            .find(|demo| demo.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDemo(s.to_string()))
    }
}

/// Everything a session needs to host one demo.
#[derive(Debug, Clone)]
pub struct Profile {
    pub demo: Demo,
    pub specs: Vec<ParamSpec>,
    pub hotkeys: HotkeyMap,
    pub overlay: OverlayLayout,
    /// Uniform receiving 1 while command entry is active.
    pub command_mode_uniform: Option<String>,
}

fn clock() -> [ParamSpec; 2] {
    [
        ParamSpec::float(RATIO_PARAM, 1.0).uniform("uRatio"),
        ParamSpec::float(TIME_PARAM, 0.0).uniform("uTime"),
    ]
}

fn blink_hotkeys(map: HotkeyMap) -> HotkeyMap {
    let up = HotkeyAction::Step {
        fine: 0.1,
        coarse: 1.0,
    };
    let down = HotkeyAction::Step {
        fine: -0.1,
        coarse: -1.0,
    };
    map.bind('r', "rotation_speed", HotkeyAction::Complement)
        .bind('b', "blink_toggle", HotkeyAction::Toggle)
        .bind('=', "blink_freq", up)
        .bind('+', "blink_freq", up)
        .bind('-', "blink_freq", down)
        .bind('_', "blink_freq", down)
}

fn rect() -> Profile {
    Profile {
        demo: Demo::Rect,
        specs: clock().into(),
        hotkeys: HotkeyMap::new(),
        overlay: OverlayLayout::Lines,
        command_mode_uniform: None,
    }
}

fn circle() -> Profile {
    let (lo, hi) = BLINK_FREQ_RANGE;
    let mut specs: Vec<ParamSpec> = clock().into();
    specs.extend([
        ParamSpec::int("wedges", 12).uniform("uWedges").bounds(1.0, 256.0),
        ParamSpec::int("rings", 5).uniform("uRings").bounds(1.0, 100.0),
        ParamSpec::float("maxr", 0.7).uniform("uMaxR").bounds(0.0, 1.0),
        ParamSpec::float("blink_freq", 3.0)
            .uniform("uBlinkFreq")
            .bounds(lo, hi),
        ParamSpec::flag("blink_toggle", false).uniform("uBlinkToggle"),
        ParamSpec::float("rotation_speed", 0.0).uniform("uRotationSpeed"),
    ]);
    Profile {
        demo: Demo::Circle,
        specs,
        hotkeys: blink_hotkeys(HotkeyMap::new()),
        overlay: OverlayLayout::SingleLine,
        command_mode_uniform: None,
    }
}

fn circle_v2() -> Profile {
    let (lo, hi) = BLINK_FREQ_RANGE;
    let mut specs: Vec<ParamSpec> = clock().into();
    specs.extend([
        ParamSpec::int("wedges", 12).uniform("uWedges").bounds(1.0, 256.0),
        ParamSpec::float_seq("ring_edges", vec![0.2, 0.3, 0.5, 0.6, 0.9])
            .uniform("uRingEdges")
            .count_uniform("uNumRings")
            .last_uniform("uMaxR")
            .bounds(0.0, 1.0),
        ParamSpec::float("focus_r1", 0.02).uniform("uFocusR1").bounds(0.0, 1.0),
        ParamSpec::float("focus_r2", 0.05).uniform("uFocusR2").bounds(0.0, 1.0),
        ParamSpec::vec3("focus_color", [0.0, 0.0, 1.0])
            .uniform("uFocusColor")
            .bounds(0.0, 1.0),
        ParamSpec::flag("blink_toggle", false).uniform("uBlinkToggle"),
        ParamSpec::float("blink_freq", 3.0)
            .uniform("uBlinkFreq")
            .bounds(lo, hi),
        ParamSpec::int("grids", 4).uniform("uGrids").bounds(1.0, 64.0),
        ParamSpec::vec3_seq("selected_patches", vec![[0.0, 1.0, 10.0], [1.0, 2.0, 20.0]])
            .uniform("uSelectedPatches")
            .count_uniform("uNumSelectedPatches"),
        ParamSpec::int("idle_display_mode", 0)
            .uniform("uIdleDisplayMode")
            .bounds(0.0, 2.0),
        ParamSpec::float("rotation_speed", 0.0).uniform("uRotationSpeed"),
    ]);
    let hotkeys = blink_hotkeys(HotkeyMap::new())
        .bind('f', "focus_color", HotkeyAction::Randomize)
        .bind('s', "idle_display_mode", HotkeyAction::Cycle(3));
    Profile {
        demo: Demo::CircleV2,
        specs,
        hotkeys,
        overlay: OverlayLayout::Lines,
        command_mode_uniform: Some("uCommandMode".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ParameterRegistry;

    #[test]
    fn every_profile_is_consistent() {
        for demo in Demo::ALL {
            let profile = demo.profile();
            let registry = ParameterRegistry::new(profile.specs.clone())
                .unwrap_or_else(|err| panic!("{demo}: {err}"));
            profile
                .hotkeys
                .validate(&registry)
                .unwrap_or_else(|err| panic!("{demo}: {err}"));
            assert!(registry.contains(TIME_PARAM));
            assert!(registry.contains(RATIO_PARAM));
        }
    }

    #[test]
    fn demo_names_round_trip() {
        for demo in Demo::ALL {
            assert_eq!(demo.name().parse::<Demo>().unwrap(), demo);
        }
        assert_eq!(" Circle-V2 ".parse::<Demo>().unwrap(), Demo::CircleV2);
        assert!("triangle".parse::<Demo>().is_err());
    }

    #[test]
    fn circle_v2_defaults() {
        let registry = ParameterRegistry::new(Demo::CircleV2.profile().specs).unwrap();
        assert_eq!(registry.int("wedges").unwrap(), 12);
        assert_eq!(registry.int("grids").unwrap(), 4);
        assert_eq!(registry.float("focus_r2").unwrap(), 0.05);
        assert_eq!(
            registry.get("ring_edges").unwrap().to_string(),
            "[0.20, 0.30, 0.50, 0.60, 0.90]"
        );
    }
}
