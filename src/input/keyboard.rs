/// Keys the gameplay loop understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Activate,
    Pause,
}

impl Key {
    pub const ALL: [Key; 4] = [Key::Up, Key::Down, Key::Activate, Key::Pause];

    fn index(self) -> usize {
        self as usize
    }
}

/// State of a single key with microsecond timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyState {
    pub pressed: bool,
    /// Pressed since the last time a consumer took the press.
    pub pending_press: bool,
    pub press_time_us: i64,
    pub release_time_us: i64,
}

impl KeyState {
    pub fn on_press(&mut self, time_us: i64) {
        if !self.pressed {
            self.pressed = true;
            self.pending_press = true;
            self.press_time_us = time_us;
        }
    }

    pub fn on_release(&mut self, time_us: i64) {
        if self.pressed {
            self.pressed = false;
            self.release_time_us = time_us;
        }
    }
}

/// Keyboard fed by the window layer.
///
/// A press is kept until taken, so a tap that starts and ends between two
/// ticks still produces one action.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    keys: [KeyState; 4],
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key, time_us: i64) {
        self.keys[key.index()].on_press(time_us);
    }

    pub fn release(&mut self, key: Key, time_us: i64) {
        self.keys[key.index()].on_release(time_us);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys[key.index()].pressed
    }

    pub fn state(&self, key: Key) -> &KeyState {
        &self.keys[key.index()]
    }

    /// Consume a pending press of `key`.
    pub fn take_press(&mut self, key: Key) -> bool {
        std::mem::take(&mut self.keys[key.index()].pending_press)
    }

    pub fn clear(&mut self) {
        self.keys = Default::default();
    }
}
