use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line text editor used by the form fields.
///
/// The cursor counts characters, not bytes, so titles with accents or
/// non-Latin scripts edit correctly. Enter, Esc and Tab are left to the
/// owning view.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Input pre-filled with `value`, cursor at the end
  pub fn with_value(value: impl Into<String>) -> Self {
    let buffer = value.into();
    let cursor = buffer.chars().count();
    Self { buffer, cursor }
  }

  /// Get the current input value
  pub fn value(&self) -> &str {
    &self.buffer
  }

  /// Cursor position in characters, for rendering
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  fn len(&self) -> usize {
    self.buffer.chars().count()
  }

  fn byte_index(&self, char_index: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(char_index)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  /// Handle a key event. Emits the new value whenever the text changes.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
      KeyCode::Backspace => {
        if self.cursor == 0 {
          return KeyResult::Handled;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.buffer.remove(at);
        self.changed()
      }
      KeyCode::Delete => {
        if self.cursor >= self.len() {
          return KeyResult::Handled;
        }
        let at = self.byte_index(self.cursor);
        self.buffer.remove(at);
        self.changed()
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        KeyResult::Handled
      }
      KeyCode::Right => {
        self.cursor = (self.cursor + 1).min(self.len());
        KeyResult::Handled
      }
      KeyCode::Home => {
        self.cursor = 0;
        KeyResult::Handled
      }
      KeyCode::End => {
        self.cursor = self.len();
        KeyResult::Handled
      }
      KeyCode::Char('a') if ctrl => {
        self.cursor = 0;
        KeyResult::Handled
      }
      KeyCode::Char('e') if ctrl => {
        self.cursor = self.len();
        KeyResult::Handled
      }
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        let at = self.byte_index(self.cursor);
        self.buffer.replace_range(..at, "");
        self.cursor = 0;
        self.changed()
      }
      KeyCode::Char('w') if ctrl => {
        // Delete word before cursor
        let at = self.byte_index(self.cursor);
        let start = self.buffer[..at]
          .trim_end()
          .rfind(' ')
          .map(|i| i + 1)
          .unwrap_or(0);
        self.cursor -= self.buffer[start..at].chars().count();
        self.buffer.replace_range(start..at, "");
        self.changed()
      }
      KeyCode::Char(_) if ctrl => KeyResult::NotHandled,
      KeyCode::Char(c) => {
        let at = self.byte_index(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
        self.changed()
      }
      _ => KeyResult::NotHandled,
    }
  }

  fn changed(&self) -> KeyResult<String> {
    KeyResult::Event(self.buffer.clone())
  }
}
