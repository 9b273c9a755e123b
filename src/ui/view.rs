use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request from the App
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back, or quit from the root view)
  Pop,
}

/// Trait for view behavior
///
/// Views own their input handling and async state and return actions for
/// the App to execute: App → View → Components.
///
/// Views that load or write data asynchronously use `Query<T>` and
/// `Mutation<T>` internally and poll them in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to poll async work. A view may close itself here,
  /// e.g. once its save has completed.
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }

  /// Keyboard shortcuts to display in the header, sorted by priority
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back").with_priority(90)]
  }
}
