// Key hold tracking for terminals that only report key presses
//
// Without key-up events a held key shows up as one press, a pause (the OS
// initial repeat delay), then a stream of repeats. A key counts as held until
// it goes quiet: `initial` after the first press, `repeat` once repeats started.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::{KEY_INITIAL_HOLD, KEY_REPEAT_HOLD};
use crate::drive::Control;

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    last_seen: Instant,
    repeating: bool,
}

#[derive(Debug, Clone)]
pub struct KeyHold {
    held: HashMap<Control, HeldKey>,
    initial: Duration,
    repeat: Duration,
}

impl Default for KeyHold {
    fn default() -> Self {
        Self::new(KEY_INITIAL_HOLD, KEY_REPEAT_HOLD)
    }
}

impl KeyHold {
    pub fn new(initial: Duration, repeat: Duration) -> Self {
        Self {
            held: HashMap::new(),
            initial,
            repeat,
        }
    }

    /// Press or repeat event; returns true if the key was not held before
    pub fn seen(&mut self, control: Control, now: Instant) -> bool {
        match self.held.get_mut(&control) {
            Some(key) => {
                key.last_seen = now;
                key.repeating = true;
                false
            }
            None => {
                self.held.insert(
                    control,
                    HeldKey {
                        last_seen: now,
                        repeating: false,
                    },
                );
                true
            }
        }
    }

    /// Explicit key-up event
    pub fn release(&mut self, control: Control) -> bool {
        self.held.remove(&control).is_some()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Keys that went quiet by `now`; they are forgotten
    pub fn expire(&mut self, now: Instant) -> Vec<Control> {
        let (initial, repeat) = (self.initial, self.repeat);
        let expired: Vec<Control> = self
            .held
            .iter()
            .filter(|(_, key)| {
                let timeout = if key.repeating { repeat } else { initial };
                now.saturating_duration_since(key.last_seen) > timeout
            })
            .map(|(&control, _)| control)
            .collect();

        for control in &expired {
            self.held.remove(control);
        }
        expired
    }
}
