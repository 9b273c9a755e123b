pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use ratatui::widgets::ListState;

/// Keep a list selection inside `0..len`, selecting the first row when
/// there is something to select.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
