//! Core widget types.

use crate::context::{Context, Interaction};
use crate::id::WidgetId;
use crate::layout::Rect;
use crate::platform::{SemanticHint, SemanticState};
use crate::render::Renderer;
use crate::style::Color;

/// What happened to a widget this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetResponse {
    /// Widget identity.
    pub id: WidgetId,
    /// Pointer is over the widget.
    pub hovered: bool,
    /// Pointer went down on the widget this frame.
    pub pressed: bool,
    /// Widget was activated (click, or Enter/Space while focused).
    pub clicked: bool,
    /// Widget value changed.
    pub changed: bool,
    /// Widget has keyboard focus.
    pub focused: bool,
    /// Enter was pressed in a focused text field.
    pub submitted: bool,
}

impl WidgetResponse {
    /// Copies pointer and focus state from an interaction.
    #[must_use]
    pub fn from_interaction(interaction: &Interaction) -> Self {
        Self {
            id: interaction.id,
            hovered: interaction.hovered,
            pressed: interaction.pressed,
            clicked: interaction.clicked,
            changed: false,
            focused: interaction.focused,
            submitted: false,
        }
    }
}

/// Semantic flags for an interaction.
pub(crate) fn semantic_state(interaction: &Interaction) -> SemanticState {
    SemanticState::NONE
        .with(SemanticState::FOCUSED, interaction.focused)
        .with(SemanticState::HOVERED, interaction.hovered)
        .with(SemanticState::PRESSED, interaction.held)
        .with(SemanticState::DISABLED, !interaction.enabled)
}

impl<R: Renderer> Context<'_, R> {
    /// Sends `on_focus` the first frame a widget holds focus.
    pub(crate) fn sync_focus_hint(&mut self, hint: &SemanticHint<'_>) {
        if self.focus.has_focus(hint.id) && self.announced_focus != hint.id {
            self.announced_focus = hint.id;
            self.emit_focus(hint);
        }
    }

    /// Fill color for a widget body.
    pub(crate) fn fill_for(&self, interaction: &Interaction) -> Color {
        if interaction.held {
            self.style.active
        } else if interaction.hovered {
            self.style.hover
        } else {
            self.style.surface
        }
    }

    /// Draws `text` vertically centered in `rect`, starting at `x`.
    pub(crate) fn draw_text_in(&mut self, text: &str, x: f32, rect: Rect, color: Color) {
        let y = rect.y + (rect.height - self.style.font_size) * 0.5;
        self.draw_text(text, x, y, color);
    }
}
