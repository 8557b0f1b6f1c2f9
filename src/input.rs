//! Player input
//!
//! The simulation polls one `InputSnapshot` per lane each tick. Keyboard and
//! touch adapters build those snapshots; nothing here touches the DOM.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Buttons held this tick
///
/// Missing fields deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputSnapshot {
    /// Combine two sources (e.g. keyboard and touch buttons)
    pub fn merge(self, other: InputSnapshot) -> Self {
        Self {
            left: self.left || other.left,
            right: self.right || other.right,
            jump: self.jump || other.jump,
        }
    }

    /// Update one action by its touch-button name ("left", "right", "jump")
    pub fn set_action(&mut self, action: &str, pressed: bool) {
        match action {
            "left" => self.left = pressed,
            "right" => self.right = pressed,
            "jump" => self.jump = pressed,
            _ => {}
        }
    }
}

/// Key codes (`KeyboardEvent.code`) that drive one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub left: &'static str,
    pub right: &'static str,
    pub jump: &'static str,
}

/// Space jumps in every lane
pub const SHARED_JUMP: &str = "Space";

const LANE_BINDINGS: [KeyBindings; 4] = [
    KeyBindings {
        left: "ArrowLeft",
        right: "ArrowRight",
        jump: "ArrowUp",
    },
    KeyBindings {
        left: "KeyA",
        right: "KeyD",
        jump: "KeyW",
    },
    KeyBindings {
        left: "KeyJ",
        right: "KeyL",
        jump: "KeyI",
    },
    KeyBindings {
        left: "Numpad4",
        right: "Numpad6",
        jump: "Numpad8",
    },
];

/// Keys whose default browser action (scrolling) should be suppressed
pub const CAPTURED_KEYS: [&str; 5] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "Space"];

impl KeyBindings {
    pub fn for_lane(lane: usize) -> Option<Self> {
        LANE_BINDINGS.get(lane).copied()
    }

    /// Snapshot from the set of currently held key codes
    pub fn snapshot(&self, held: &HashSet<String>) -> InputSnapshot {
        InputSnapshot {
            left: held.contains(self.left),
            right: held.contains(self.right),
            jump: held.contains(self.jump) || held.contains(SHARED_JUMP),
        }
    }

    /// Human-readable controls hint, e.g. "Left Arrow / Right Arrow to move, Up Arrow to jump"
    pub fn label(&self) -> String {
        format!(
            "{} / {} to move, {} to jump",
            pretty_key(self.left),
            pretty_key(self.right),
            pretty_key(self.jump)
        )
    }
}

fn pretty_key(code: &str) -> String {
    if let Some(dir) = code.strip_prefix("Arrow") {
        format!("{dir} Arrow")
    } else if let Some(key) = code.strip_prefix("Key") {
        key.to_owned()
    } else if let Some(digit) = code.strip_prefix("Numpad") {
        format!("Numpad {digit}")
    } else {
        code.to_owned()
    }
}
