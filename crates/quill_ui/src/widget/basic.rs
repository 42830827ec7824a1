//! Label, button, checkbox and slider.

use std::ops::RangeInclusive;

use crate::context::Context;
use crate::input::{Key, MouseButton};
use crate::layout::Rect;
use crate::platform::{Role, SemanticHint, SemanticState};
use crate::render::Renderer;

use super::core::{semantic_state, WidgetResponse};

/// Gap between a checkbox square and its label.
const CHECK_GAP: f32 = 8.0;

/// Slider thumb width.
const THUMB_WIDTH: f32 = 12.0;

/// Keyboard steps across a slider's range.
const SLIDER_STEPS: f32 = 100.0;

impl<R: Renderer> Context<'_, R> {
    /// Draws `text` in `rect`. Labels take no input.
    pub fn label(&mut self, text: &str, rect: Rect) {
        let color = self.style.text;
        self.draw_text_in(text, rect.x, rect, color);
    }

    /// A push button. `clicked` is set on release over the button, or on
    /// Enter/Space while focused.
    pub fn button(&mut self, label: &str, rect: Rect) -> WidgetResponse {
        let id = self.make_id(label);
        let interaction = self.interact(id, rect, true);
        let mut response = WidgetResponse::from_interaction(&interaction);
        response.clicked |= interaction.focused && self.activation_key();

        let fill = self.fill_for(&interaction);
        self.draw_rounded_rect(rect, self.style.corner_radius, fill);
        let text_x = rect.x + (rect.width - self.text_width(label)) * 0.5;
        let color = self.style.text;
        self.draw_text_in(label, text_x, rect, color);
        if interaction.focused {
            self.draw_focus_ring(rect);
        }

        let state = semantic_state(&interaction);
        let hint = SemanticHint::new(id, label, Role::Button, state);
        self.sync_focus_hint(&hint);
        if response.clicked {
            let pressed =
                SemanticHint::new(id, label, Role::Button, state.with(SemanticState::PRESSED, true));
            self.emit_state(&pressed);
        }
        response
    }

    /// A checkbox bound to `checked`. `changed` is set when it toggles.
    pub fn checkbox(&mut self, label: &str, checked: &mut bool, rect: Rect) -> WidgetResponse {
        let id = self.make_id(label);
        let interaction = self.interact(id, rect, true);
        let mut response = WidgetResponse::from_interaction(&interaction);
        if interaction.clicked || (interaction.focused && self.activation_key()) {
            *checked = !*checked;
            response.changed = true;
        }

        let side = rect.height;
        let square = Rect::new(rect.x, rect.y, side, side);
        let fill = self.fill_for(&interaction);
        self.draw_rounded_rect(square, self.style.corner_radius, fill);
        if *checked {
            let mark = square.shrink(side * 0.25);
            let accent = self.style.accent;
            self.draw_rounded_rect(mark, self.style.corner_radius * 0.5, accent);
        }
        let color = self.style.text;
        self.draw_text_in(label, rect.x + side + CHECK_GAP, rect, color);
        if interaction.focused {
            self.draw_focus_ring(square);
        }

        let state = semantic_state(&interaction).with(SemanticState::CHECKED, *checked);
        let hint = SemanticHint::new(id, label, Role::Checkbox, state);
        self.sync_focus_hint(&hint);
        if response.changed {
            self.emit_state(&hint);
        }
        response
    }

    /// A horizontal slider bound to `value` within `range`.
    ///
    /// Dragging sets the value from the pointer; Left/Right step it by a
    /// hundredth of the range while focused.
    pub fn slider(
        &mut self,
        label: &str,
        value: &mut f32,
        range: RangeInclusive<f32>,
        rect: Rect,
    ) -> WidgetResponse {
        let (min, max) = (*range.start(), *range.end());
        let span = max - min;
        let id = self.make_id(label);
        let interaction = self.interact(id, rect, true);
        let mut response = WidgetResponse::from_interaction(&interaction);

        let before = *value;
        let track = (rect.width - THUMB_WIDTH).max(0.0);
        if interaction.held && self.input.mouse_down(MouseButton::Left) && track > 0.0 {
            let (mx, _) = self.input.mouse_pos();
            let t = ((mx - rect.x - THUMB_WIDTH * 0.5) / track).clamp(0.0, 1.0);
            *value = min + t * span;
        }
        if interaction.focused {
            let step = span / SLIDER_STEPS;
            match self.input.key() {
                Some(Key::Left | Key::Down) => *value -= step,
                Some(Key::Right | Key::Up) => *value += step,
                Some(Key::Home) => *value = min,
                Some(Key::End) => *value = max,
                _ => {}
            }
        }
        *value = value.clamp(min.min(max), max.max(min));
        #[allow(clippy::float_cmp)]
        let changed = *value != before;
        response.changed = changed;

        let rail = Rect::new(rect.x, rect.y + rect.height * 0.5 - 2.0, rect.width, 4.0);
        let surface = self.style.surface;
        self.draw_rounded_rect(rail, 2.0, surface);
        let t = if span == 0.0 { 0.0 } else { (*value - min) / span };
        let thumb = Rect::new(rect.x + t * track, rect.y, THUMB_WIDTH, rect.height);
        let thumb_color = if interaction.held || interaction.hovered {
            self.style.accent
        } else {
            self.fill_for(&interaction).lerp(self.style.accent, 0.5)
        };
        self.draw_rounded_rect(thumb, self.style.corner_radius, thumb_color);
        if interaction.focused {
            self.draw_focus_ring(rect);
        }

        let hint = SemanticHint::new(id, label, Role::Slider, semantic_state(&interaction))
            .with_value(*value, min, max);
        self.sync_focus_hint(&hint);
        if changed {
            self.emit_value(&hint);
        }
        response
    }

    fn activation_key(&self) -> bool {
        self.input.key_pressed(Key::Enter) || self.input.key_pressed(Key::Space)
    }
}
