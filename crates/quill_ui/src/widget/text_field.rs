//! Single-line text field over [`TextEdit`].

use crate::context::Context;
use crate::input::{Key, MouseButton};
use crate::layout::{snap4, Rect};
use crate::platform::{Clipboard, Role, SemanticHint};
use crate::render::{Renderer, TextMeasure};
use crate::text_edit::{EditState, TextBuffer, TextEdit};

use super::core::{semantic_state, WidgetResponse};

/// Caret width.
const CARET_WIDTH: f32 = 2.0;

impl<R: Renderer> Context<'_, R> {
    /// An editable field over a caller-owned buffer and edit state.
    ///
    /// Focuses on press. While focused it takes keys, characters, IME
    /// commits and clipboard shortcuts; Enter sets `submitted`. `changed` is
    /// set whenever the text changed.
    pub fn text_field(
        &mut self,
        label: &str,
        buffer: &mut TextBuffer,
        state: &mut EditState,
        rect: Rect,
    ) -> WidgetResponse {
        let id = self.make_id(label);
        let interaction = self.interact(id, rect, true);
        let mut response = WidgetResponse::from_interaction(&interaction);

        let pad = snap4(self.style.padding * 0.5);
        let text_x = rect.x + pad;
        let visible = (rect.width - pad * 2.0).max(0.0);
        let (mx, my) = self.input.mouse_pos();

        let mut edit = TextEdit::new(buffer, state);
        if interaction.pressed {
            let timing = self.config.timing;
            let x = mx - text_x + edit.state.scroll_x;
            edit.click(x, (mx, my), self.time, &timing, &self.metrics());
        } else if interaction.held {
            let x = mx - text_x + edit.state.scroll_x;
            edit.drag_to(x, &self.metrics());
        }
        if !self.input.mouse_down(MouseButton::Left) {
            edit.release();
        }

        if interaction.focused {
            let modifiers = self.input.modifiers;
            match self.input.key() {
                Some(Key::Enter) => response.submitted = true,
                Some(key) => {
                    let clipboard: Option<&mut dyn Clipboard> = match self.clipboard.as_mut() {
                        Some(clipboard) => Some(&mut **clipboard),
                        None => None,
                    };
                    response.changed |= edit.handle_key(key, modifiers, clipboard);
                }
                None => {}
            }
            if let Some(c) = self.input.character().filter(|_| !modifiers.command()) {
                response.changed |= edit.insert_char(c);
            }
            let ime = self.input.ime_text();
            if !ime.is_empty() {
                response.changed |= edit.commit_ime(ime);
            }
            edit.scroll_into_view(visible, &self.metrics());
        }

        let fill = self.fill_for(&interaction);
        self.draw_rounded_rect(rect, self.style.corner_radius, fill);
        let pushed = self.push_clip(rect.shrink(pad));

        let scroll = edit.state.scroll_x;
        let (start, end) = edit.state.selection();
        let text = edit.text();
        if interaction.focused && start != end {
            let metrics = self.metrics();
            let x0 = text_x + metrics.text_width(&text[..start]) - scroll;
            let x1 = text_x + metrics.text_width(&text[..end]) - scroll;
            let selection = self.style.selection;
            self.draw_rect(Rect::new(x0, rect.y + pad, x1 - x0, rect.height - pad * 2.0), selection);
        }
        let color = self.style.text;
        self.draw_text_in(text, text_x - scroll, rect, color);

        if interaction.focused {
            let caret_x = text_x + self.metrics().text_width(&text[..edit.state.cursor]) - scroll;
            let caret = Rect::new(caret_x, rect.y + pad, CARET_WIDTH, rect.height - pad * 2.0);
            self.ime_caret = Some(caret);
            if self.caret_visible() {
                let accent = self.style.accent;
                self.draw_rect(caret, accent);
            }
        }
        if pushed {
            self.pop_clip();
        }
        if interaction.focused {
            self.draw_focus_ring(rect);
        }

        let hint = SemanticHint::new(id, label, Role::TextField, semantic_state(&interaction));
        self.sync_focus_hint(&hint);
        if response.changed {
            self.emit_state(&hint);
        }
        response
    }
}
