//! Per-frame input feed.
//!
//! The host fills an [`InputState`] every frame before any layout call and
//! hands it to [`crate::Context::begin_frame`]. At most one key and one
//! character are delivered per frame; later ones overwrite earlier ones.

use bitflags::bitflags;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

impl MouseButton {
    /// Bit for this button in the button masks.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Right => 2,
            Self::Middle => 4,
        }
    }
}

/// Keyboard key.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Space bar.
    Space,
    /// Alphabetic keys, used with modifiers for shortcuts.
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
}

bitflags! {
    /// Held modifier keys.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 1;
        /// Control key.
        const CTRL = 2;
        /// Alt key.
        const ALT = 4;
        /// Super/Command key.
        const SUPER = 8;
    }
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self::empty();

    /// Shift is held.
    #[must_use]
    pub const fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    /// Control or Command is held.
    #[must_use]
    pub const fn command(self) -> bool {
        self.intersects(Self::CTRL.union(Self::SUPER))
    }
}

/// Capacity of the per-frame IME commit string, in bytes.
pub const IME_CAPACITY: usize = 64;

/// Text committed by an input method this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImeText {
    bytes: [u8; IME_CAPACITY],
    len: usize,
}

impl Default for ImeText {
    fn default() -> Self {
        Self {
            bytes: [0; IME_CAPACITY],
            len: 0,
        }
    }
}

impl ImeText {
    /// The committed text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    /// Returns true if nothing was committed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `text`. Returns false and appends nothing if it does not fit.
    fn push_str(&mut self, text: &str) -> bool {
        let end = self.len + text.len();
        if end > IME_CAPACITY {
            return false;
        }
        self.bytes[self.len..end].copy_from_slice(text.as_bytes());
        self.len = end;
        true
    }
}

/// Input state for the current frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    /// Current mouse X position.
    pub mouse_x: f32,
    /// Current mouse Y position.
    pub mouse_y: f32,
    /// Mouse buttons pressed this frame.
    buttons_pressed: u8,
    /// Mouse buttons released this frame.
    buttons_released: u8,
    /// Mouse buttons currently held.
    buttons_down: u8,
    /// Mouse scroll delta (x, y), accumulated over the frame.
    pub scroll_delta: (f32, f32),
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// Key pressed this frame.
    key: Option<Key>,
    /// Character typed this frame.
    character: Option<char>,
    /// IME commit this frame.
    ime: ImeText,
}

impl InputState {
    /// Creates a new empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame events. Held buttons and pointer position persist.
    pub fn begin_frame(&mut self) {
        self.buttons_pressed = 0;
        self.buttons_released = 0;
        self.scroll_delta = (0.0, 0.0);
        self.key = None;
        self.character = None;
        self.ime = ImeText::default();
    }

    /// Updates mouse position.
    pub fn set_mouse_pos(&mut self, x: f32, y: f32) {
        self.mouse_x = x;
        self.mouse_y = y;
    }

    /// Records a mouse button press.
    pub fn mouse_button_down(&mut self, button: MouseButton) {
        let mask = button.mask();
        self.buttons_pressed |= mask;
        self.buttons_down |= mask;
    }

    /// Records a mouse button release.
    pub fn mouse_button_up(&mut self, button: MouseButton) {
        let mask = button.mask();
        self.buttons_released |= mask;
        self.buttons_down &= !mask;
    }

    /// Records scroll input.
    pub fn scroll(&mut self, dx: f32, dy: f32) {
        self.scroll_delta.0 += dx;
        self.scroll_delta.1 += dy;
    }

    /// Records the key pressed this frame.
    pub fn key_down(&mut self, key: Key) {
        self.key = Some(key);
    }

    /// Records the character typed this frame. Control characters are ignored.
    pub fn char_input(&mut self, c: char) {
        if !c.is_control() {
            self.character = Some(c);
        }
    }

    /// Sets the held modifier mask.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Records text committed by an input method. Returns false if it does
    /// not fit in [`IME_CAPACITY`].
    pub fn ime_commit(&mut self, text: &str) -> bool {
        let fitted = self.ime.push_str(text);
        if !fitted {
            tracing::warn!(len = text.len(), capacity = IME_CAPACITY, "IME commit dropped");
        }
        fitted
    }

    /// Returns true if the mouse button was pressed this frame.
    #[must_use]
    pub fn mouse_clicked(&self, button: MouseButton) -> bool {
        self.buttons_pressed & button.mask() != 0
    }

    /// Returns true if the mouse button was released this frame.
    #[must_use]
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.buttons_released & button.mask() != 0
    }

    /// Returns true if the mouse button is currently held.
    #[must_use]
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons_down & button.mask() != 0
    }

    /// Returns true if any button was pressed this frame.
    #[must_use]
    pub fn any_clicked(&self) -> bool {
        self.buttons_pressed != 0
    }

    /// Returns true if `key` was pressed this frame.
    #[must_use]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.key == Some(key)
    }

    /// Key pressed this frame.
    #[must_use]
    pub fn key(&self) -> Option<Key> {
        self.key
    }

    /// Character typed this frame.
    #[must_use]
    pub fn character(&self) -> Option<char> {
        self.character
    }

    /// IME text committed this frame.
    #[must_use]
    pub fn ime_text(&self) -> &str {
        self.ime.as_str()
    }

    /// Pointer position.
    #[must_use]
    pub fn mouse_pos(&self) -> (f32, f32) {
        (self.mouse_x, self.mouse_y)
    }
}
