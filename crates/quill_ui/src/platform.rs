//! Host services: clipboard and accessibility.
//!
//! Both are optional. A context without a clipboard keeps copy/cut/paste
//! inside the edited buffer only; a context without accessibility emits no
//! semantic hints.

use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::Mutex;

use crate::id::WidgetId;

/// System clipboard access.
pub trait Clipboard {
    /// Lends the whole clipboard text to `read` for the duration of the call
    /// and returns what `read` returned.
    fn read_text(&mut self, read: &mut dyn FnMut(&str) -> bool) -> bool;

    /// Replaces the clipboard contents.
    fn set_text(&mut self, text: &str);
}

/// In-process clipboard. Clones share one buffer, so the host can keep a
/// handle to inspect or seed it.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Arc<Mutex<String>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents.
    #[must_use]
    pub fn contents(&self) -> String {
        self.text.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self, read: &mut dyn FnMut(&str) -> bool) -> bool {
        read(&self.text.lock())
    }

    fn set_text(&mut self, text: &str) {
        // Empty copies leave the clipboard alone.
        if text.is_empty() {
            return;
        }
        let mut guard = self.text.lock();
        guard.clear();
        guard.push_str(text);
    }
}

/// What a widget is, for assistive technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Static text.
    Label,
    /// Push button.
    Button,
    /// Two-state toggle.
    Checkbox,
    /// Ranged value.
    Slider,
    /// Editable text.
    TextField,
    /// Modal dialog.
    Dialog,
    /// Menu or sheet.
    Menu,
    /// Scrollable region.
    ScrollArea,
    /// Hover tooltip.
    Tooltip,
}

bitflags! {
    /// Widget state flags for assistive technology.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct SemanticState: u8 {
        /// Has keyboard focus.
        const FOCUSED = 1 << 0;
        /// Checked or on.
        const CHECKED = 1 << 1;
        /// Pressed.
        const PRESSED = 1 << 2;
        /// Under the pointer.
        const HOVERED = 1 << 3;
        /// Input is blocked by an overlay.
        const DISABLED = 1 << 4;
        /// Expanded (open overlay).
        const EXPANDED = 1 << 5;
    }
}

impl SemanticState {
    /// No flags.
    pub const NONE: Self = Self::empty();

    /// Sets `flag` when `on`.
    #[must_use]
    pub const fn with(self, flag: Self, on: bool) -> Self {
        if on {
            self.union(flag)
        } else {
            self
        }
    }
}

/// Per-widget description handed to [`Accessibility`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticHint<'a> {
    /// Widget identity.
    pub id: WidgetId,
    /// Human-readable label.
    pub label: &'a str,
    /// Widget role.
    pub role: Role,
    /// State flags.
    pub state: SemanticState,
    /// Current value, for ranged widgets.
    pub value: f32,
    /// Lower bound of `value`.
    pub min: f32,
    /// Upper bound of `value`.
    pub max: f32,
}

impl<'a> SemanticHint<'a> {
    /// A hint with no value range.
    #[must_use]
    pub const fn new(id: WidgetId, label: &'a str, role: Role, state: SemanticState) -> Self {
        Self {
            id,
            label,
            role,
            state,
            value: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }

    /// Attaches a value and its range.
    #[must_use]
    pub const fn with_value(mut self, value: f32, min: f32, max: f32) -> Self {
        self.value = value;
        self.min = min;
        self.max = max;
        self
    }
}

/// Assistive technology bridge.
pub trait Accessibility {
    /// Speaks a message.
    fn announce(&mut self, text: &str);
    /// A widget gained keyboard focus.
    fn on_focus(&mut self, hint: &SemanticHint<'_>);
    /// A widget's state flags changed.
    fn on_state(&mut self, hint: &SemanticHint<'_>);
    /// A widget's value changed.
    fn on_value(&mut self, hint: &SemanticHint<'_>);
}

/// Which callback produced an [`AccessEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEventKind {
    /// [`Accessibility::announce`].
    Announce,
    /// [`Accessibility::on_focus`].
    Focus,
    /// [`Accessibility::on_state`].
    State,
    /// [`Accessibility::on_value`].
    Value,
}

/// An owned copy of one accessibility callback.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEvent {
    /// Callback kind.
    pub kind: AccessEventKind,
    /// Widget identity, [`WidgetId::NONE`] for announcements.
    pub id: WidgetId,
    /// Label or announced text.
    pub text: String,
    /// Role, if a widget was involved.
    pub role: Option<Role>,
    /// State flags.
    pub state: SemanticState,
    /// Value.
    pub value: f32,
}

/// Accessibility backend that records events. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct AccessibilityLog {
    events: Arc<Mutex<Vec<AccessEvent>>>,
}

impl AccessibilityLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every recorded event.
    #[must_use]
    pub fn drain(&self) -> Vec<AccessEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, kind: AccessEventKind, hint: &SemanticHint<'_>) {
        self.events.lock().push(AccessEvent {
            kind,
            id: hint.id,
            text: hint.label.to_owned(),
            role: Some(hint.role),
            state: hint.state,
            value: hint.value,
        });
    }
}

impl Accessibility for AccessibilityLog {
    fn announce(&mut self, text: &str) {
        self.events.lock().push(AccessEvent {
            kind: AccessEventKind::Announce,
            id: WidgetId::NONE,
            text: text.to_owned(),
            role: None,
            state: SemanticState::NONE,
            value: 0.0,
        });
    }

    fn on_focus(&mut self, hint: &SemanticHint<'_>) {
        self.record(AccessEventKind::Focus, hint);
    }

    fn on_state(&mut self, hint: &SemanticHint<'_>) {
        self.record(AccessEventKind::State, hint);
    }

    fn on_value(&mut self, hint: &SemanticHint<'_>) {
        self.record(AccessEventKind::Value, hint);
    }
}
