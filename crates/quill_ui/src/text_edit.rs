//! # Text Editing
//!
//! Cursor and selection state machine for text fields.
//!
//! The caller owns both the [`TextBuffer`] and the [`EditState`] and passes
//! them in every frame. Indices are UTF-8 byte offsets that always sit on a
//! char boundary. After every mutation `selection_start <= selection_end`.
//!
//! ## Clicks
//!
//! | Presses | Effect                     |
//! |---------|----------------------------|
//! | 1       | place cursor, start drag   |
//! | 2       | select word                |
//! | 3       | select all                 |
//!
//! Presses count as one multi-click when they land within
//! [`Timing::double_click_time`] and [`Timing::click_tolerance`] of the
//! previous one. A fourth press wraps back to a single click.

use crate::config::Timing;
use crate::input::{Key, Modifiers};
use crate::platform::Clipboard;
use crate::render::TextMeasure;

/// Fixed-capacity UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    bytes: Box<[u8]>,
    len: usize,
}

impl TextBuffer {
    /// Creates an empty buffer holding at most `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Creates a buffer holding `text`, or `None` if it does not fit.
    #[must_use]
    pub fn from_text(capacity: usize, text: &str) -> Option<Self> {
        let mut buffer = Self::with_capacity(capacity);
        buffer.set_text(text).then_some(buffer)
    }

    /// The text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum length in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Replaces the whole text. Returns `false` and changes nothing if it
    /// does not fit.
    pub fn set_text(&mut self, text: &str) -> bool {
        self.replace_range(0, self.len, text)
    }

    /// Replaces `start..end` with `text`. Returns `false` and changes nothing
    /// if the result would exceed the capacity.
    ///
    /// `start` and `end` must be char boundaries with `start <= end <= len`.
    pub fn replace_range(&mut self, start: usize, end: usize, text: &str) -> bool {
        let new_len = self.len - (end - start) + text.len();
        if new_len > self.bytes.len() {
            return false;
        }
        self.bytes.copy_within(end..self.len, start + text.len());
        self.bytes[start..start + text.len()].copy_from_slice(text.as_bytes());
        self.len = new_len;
        true
    }
}

/// What a press resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// First press.
    Single,
    /// Second press in a row.
    Double,
    /// Third press in a row.
    Triple,
}

/// Caller-owned editing state of one text field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EditState {
    /// Cursor position.
    pub cursor: usize,
    /// Selection start. Never greater than `selection_end`.
    pub selection_start: usize,
    /// Selection end.
    pub selection_end: usize,
    /// Fixed end of a drag or Shift selection.
    pub drag_anchor: usize,
    /// Horizontal scroll of the visible text.
    pub scroll_x: f32,
    /// Time of the last press, in context seconds.
    pub last_click_time: f64,
    /// Pointer position of the last press.
    pub last_click_pos: (f32, f32),
    /// Presses in the current multi-click, 0 before the first.
    pub click_count: u8,
    /// A drag selection is in progress.
    pub dragging: bool,
}

impl EditState {
    /// Returns true if a non-empty range is selected.
    #[must_use]
    pub const fn has_selection(&self) -> bool {
        self.selection_start != self.selection_end
    }

    /// Selected byte range.
    #[must_use]
    pub const fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    /// Orders the selection pair.
    pub fn normalize(&mut self) {
        if self.selection_start > self.selection_end {
            std::mem::swap(&mut self.selection_start, &mut self.selection_end);
        }
    }

    /// Places the cursor and drops the selection.
    fn collapse(&mut self, at: usize) {
        self.cursor = at;
        self.drag_anchor = at;
        self.selection_start = at;
        self.selection_end = at;
    }

    /// Selects from `anchor` to `cursor`, leaving the cursor at `cursor`.
    fn select(&mut self, anchor: usize, cursor: usize) {
        self.drag_anchor = anchor;
        self.cursor = cursor;
        self.selection_start = anchor;
        self.selection_end = cursor;
        self.normalize();
    }

    /// The fixed end when extending the current selection.
    fn anchor(&self) -> usize {
        if !self.has_selection() {
            self.cursor
        } else if self.cursor == self.selection_start {
            self.selection_end
        } else {
            self.selection_start
        }
    }

    /// Pulls every index back onto a char boundary of `text`.
    fn clamp_to(&mut self, text: &str) {
        let fix = |i: usize| floor_boundary(text, i);
        self.cursor = fix(self.cursor);
        self.selection_start = fix(self.selection_start);
        self.selection_end = fix(self.selection_end);
        self.drag_anchor = fix(self.drag_anchor);
        self.normalize();
    }
}

/// Character class used for word selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Spaces, tabs, newlines.
    Whitespace,
    /// Letters, digits and `_`.
    Word,
    /// Everything else.
    Punctuation,
}

impl CharClass {
    /// Classifies `c`.
    #[must_use]
    pub fn of(c: char) -> Self {
        if c.is_whitespace() {
            Self::Whitespace
        } else if c.is_alphanumeric() || c == '_' {
            Self::Word
        } else {
            Self::Punctuation
        }
    }
}

fn floor_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

fn prev_boundary(text: &str, at: usize) -> usize {
    text[..at].chars().next_back().map_or(0, |c| at - c.len_utf8())
}

fn next_boundary(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(at, |c| at + c.len_utf8())
}

fn line_start(text: &str, at: usize) -> usize {
    text[..at].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, at: usize) -> usize {
    text[at..].find('\n').map_or(text.len(), |i| at + i)
}

/// Byte offset `column` chars into the line starting at `start`, stopping at
/// the line end.
fn offset_in_line(text: &str, start: usize, column: usize) -> usize {
    let end = line_end(text, start);
    text[start..end]
        .char_indices()
        .nth(column)
        .map_or(end, |(i, _)| start + i)
}

/// Run of same-class chars around `at`.
///
/// At the end of the text the char before `at` decides the class.
#[must_use]
pub fn word_bounds(text: &str, at: usize) -> (usize, usize) {
    let at = floor_boundary(text, at);
    let probe = if at == text.len() { prev_boundary(text, at) } else { at };
    let Some(class) = text[probe..].chars().next().map(CharClass::of) else {
        return (at, at);
    };

    let mut start = probe;
    while start > 0 {
        let prev = prev_boundary(text, start);
        if text[prev..start].chars().next().map(CharClass::of) != Some(class) {
            break;
        }
        start = prev;
    }
    let mut end = probe;
    while end < text.len() {
        let next = next_boundary(text, end);
        if text[end..next].chars().next().map(CharClass::of) != Some(class) {
            break;
        }
        end = next;
    }
    (start, end)
}

fn word_left(text: &str, at: usize) -> usize {
    let mut at = at;
    while at > 0 && text[..at].chars().next_back().is_some_and(char::is_whitespace) {
        at = prev_boundary(text, at);
    }
    if at == 0 {
        return 0;
    }
    word_bounds(text, prev_boundary(text, at)).0
}

fn word_right(text: &str, at: usize) -> usize {
    let mut at = at;
    while at < text.len() && text[at..].chars().next().is_some_and(char::is_whitespace) {
        at = next_boundary(text, at);
    }
    if at == text.len() {
        return at;
    }
    word_bounds(text, at).1
}

/// Char boundary nearest to `x`, measured from the start of `text`.
#[must_use]
pub fn index_at_x(text: &str, x: f32, measure: &dyn TextMeasure) -> usize {
    if x <= 0.0 {
        return 0;
    }
    let mut prev_width = 0.0;
    for (i, c) in text.char_indices() {
        let width = measure.text_width(&text[..i + c.len_utf8()]);
        if x < (prev_width + width) * 0.5 {
            return i;
        }
        prev_width = width;
    }
    text.len()
}

/// Editing operations over a caller's buffer and state.
pub struct TextEdit<'a> {
    /// Text being edited.
    pub buffer: &'a mut TextBuffer,
    /// Cursor and selection.
    pub state: &'a mut EditState,
}

impl<'a> TextEdit<'a> {
    /// Borrows a buffer and its state. Out-of-range indices are pulled back
    /// onto the text.
    pub fn new(buffer: &'a mut TextBuffer, state: &'a mut EditState) -> Self {
        state.clamp_to(buffer.as_str());
        Self { buffer, state }
    }

    /// The text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    /// The selected text.
    #[must_use]
    pub fn selected_text(&self) -> &str {
        let (start, end) = self.state.selection();
        &self.buffer.as_str()[start..end]
    }

    /// Handles a press at `x` (text-space, scroll already applied).
    ///
    /// `pointer` and `time` feed multi-click detection.
    pub fn click(
        &mut self,
        x: f32,
        pointer: (f32, f32),
        time: f64,
        timing: &Timing,
        measure: &dyn TextMeasure,
    ) -> ClickKind {
        let state = &mut *self.state;
        let near = (pointer.0 - state.last_click_pos.0).abs() <= timing.click_tolerance
            && (pointer.1 - state.last_click_pos.1).abs() <= timing.click_tolerance;
        let quick = time - state.last_click_time <= timing.double_click_time;
        state.click_count = if state.click_count > 0 && near && quick {
            state.click_count % 3 + 1
        } else {
            1
        };
        state.last_click_time = time;
        state.last_click_pos = pointer;

        let text = self.buffer.as_str();
        let at = index_at_x(text, x, measure);
        match state.click_count {
            1 => {
                state.collapse(at);
                state.dragging = true;
                ClickKind::Single
            }
            2 => {
                let (start, end) = word_bounds(text, at);
                state.select(start, end);
                state.dragging = false;
                ClickKind::Double
            }
            _ => {
                state.select(0, text.len());
                state.dragging = false;
                ClickKind::Triple
            }
        }
    }

    /// Moves the drag end to the boundary nearest `x`. No-op when not dragging.
    pub fn drag_to(&mut self, x: f32, measure: &dyn TextMeasure) {
        if !self.state.dragging {
            return;
        }
        let at = index_at_x(self.buffer.as_str(), x, measure);
        let anchor = self.state.drag_anchor;
        self.state.select(anchor, at);
    }

    /// Ends a drag. The selection is kept.
    pub fn release(&mut self) {
        self.state.dragging = false;
    }

    /// Selects everything.
    pub fn select_all(&mut self) {
        let len = self.buffer.len();
        self.state.select(0, len);
    }

    /// Replaces the selection with `text`. Returns `false` and changes
    /// nothing if the result would not fit.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let (start, end) = self.state.selection();
        if !self.buffer.replace_range(start, end, text) {
            tracing::debug!(capacity = self.buffer.capacity(), "text buffer full, insert dropped");
            return false;
        }
        self.state.collapse(start + text.len());
        true
    }

    /// Replaces the selection with `c`.
    pub fn insert_char(&mut self, c: char) -> bool {
        let mut encoded = [0u8; 4];
        self.insert_str(c.encode_utf8(&mut encoded))
    }

    /// Inserts text committed by an input method.
    pub fn commit_ime(&mut self, text: &str) -> bool {
        !text.is_empty() && self.insert_str(text)
    }

    fn delete_selection(&mut self) -> bool {
        if !self.state.has_selection() {
            return false;
        }
        self.insert_str("")
    }

    /// Deletes the selection, or the char before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let cursor = self.state.cursor;
        if cursor == 0 {
            return false;
        }
        let prev = prev_boundary(self.buffer.as_str(), cursor);
        self.buffer.replace_range(prev, cursor, "");
        self.state.collapse(prev);
        true
    }

    /// Deletes the selection, or the char after the cursor.
    pub fn delete(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let cursor = self.state.cursor;
        if cursor >= self.buffer.len() {
            return false;
        }
        let next = next_boundary(self.buffer.as_str(), cursor);
        self.buffer.replace_range(cursor, next, "");
        self.state.collapse(cursor);
        true
    }

    /// Copies the selection to `clipboard`.
    pub fn copy(&self, clipboard: &mut dyn Clipboard) {
        if self.state.has_selection() {
            clipboard.set_text(self.selected_text());
        }
    }

    /// Copies the selection to `clipboard` and deletes it.
    pub fn cut(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        self.copy(clipboard);
        self.delete_selection()
    }

    /// Replaces the selection with the whole clipboard text.
    ///
    /// Text that does not fit is dropped: nothing changes and the call
    /// returns false.
    pub fn paste(&mut self, clipboard: &mut dyn Clipboard) -> bool {
        clipboard.read_text(&mut |text: &str| {
            if text.is_empty() {
                return false;
            }
            let inserted = self.insert_str(text);
            if !inserted {
                tracing::warn!(
                    len = text.len(),
                    capacity = self.buffer.capacity(),
                    "clipboard text does not fit, paste dropped"
                );
            }
            inserted
        })
    }

    fn move_to(&mut self, target: usize, extend: bool) {
        if extend {
            let anchor = self.state.anchor();
            self.state.select(anchor, target);
        } else {
            self.state.collapse(target);
        }
    }

    /// Handles a navigation, deletion or shortcut key.
    ///
    /// Returns true if the text changed.
    pub fn handle_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        clipboard: Option<&mut dyn Clipboard>,
    ) -> bool {
        let shift = modifiers.shift();
        let command = modifiers.command();
        let text = self.buffer.as_str();
        let cursor = self.state.cursor;
        let (start, end) = self.state.selection();
        let has_selection = self.state.has_selection();

        let changed = match key {
            Key::Left => {
                let target = if command {
                    word_left(text, cursor)
                } else if has_selection && !shift {
                    start
                } else {
                    prev_boundary(text, cursor)
                };
                self.move_to(target, shift);
                false
            }
            Key::Right => {
                let target = if command {
                    word_right(text, cursor)
                } else if has_selection && !shift {
                    end
                } else {
                    next_boundary(text, cursor)
                };
                self.move_to(target, shift);
                false
            }
            Key::Up => {
                let line = line_start(text, cursor);
                let target = if line == 0 {
                    0
                } else {
                    let column = text[line..cursor].chars().count();
                    offset_in_line(text, line_start(text, line - 1), column)
                };
                self.move_to(target, shift);
                false
            }
            Key::Down => {
                let line_end_at = line_end(text, cursor);
                let target = if line_end_at == text.len() {
                    text.len()
                } else {
                    let column = text[line_start(text, cursor)..cursor].chars().count();
                    offset_in_line(text, line_end_at + 1, column)
                };
                self.move_to(target, shift);
                false
            }
            Key::Home => {
                self.move_to(line_start(text, cursor), shift);
                false
            }
            Key::End => {
                self.move_to(line_end(text, cursor), shift);
                false
            }
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::A if command => {
                self.select_all();
                false
            }
            Key::C if command => {
                if let Some(clipboard) = clipboard {
                    self.copy(clipboard);
                }
                false
            }
            Key::X if command => match clipboard {
                Some(clipboard) => self.cut(clipboard),
                None => false,
            },
            Key::V if command => match clipboard {
                Some(clipboard) => self.paste(clipboard),
                None => false,
            },
            _ => false,
        };
        self.state.normalize();
        changed
    }

    /// Adjusts `scroll_x` by the least amount that shows the cursor inside
    /// `visible_width`.
    pub fn scroll_into_view(&mut self, visible_width: f32, measure: &dyn TextMeasure) {
        let text = self.buffer.as_str();
        let line = line_start(text, self.state.cursor);
        let cursor_x = measure.text_width(&text[line..self.state.cursor]);
        let scroll = &mut self.state.scroll_x;
        if cursor_x < *scroll {
            *scroll = cursor_x;
        } else if cursor_x > *scroll + visible_width {
            *scroll = cursor_x - visible_width;
        }
        *scroll = scroll.max(0.0);
    }
}
