use crate::movies::types::STATUS_AVAILABLE;
use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Badge color for a movie's availability status
pub fn availability_color(status: &str) -> Color {
  if status == STATUS_AVAILABLE {
    Color::Green
  } else {
    Color::Yellow
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("Heat", 10), "Heat");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("Heat", 4), "Heat");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("The Godfather", 8), "The G...");
  }

  #[test]
  fn test_truncate_counts_characters() {
    assert_eq!(truncate("Amélie Poulain", 7), "Amél...");
  }

  #[test]
  fn test_availability_color() {
    assert_eq!(availability_color("available"), Color::Green);
    assert_eq!(availability_color("rented"), Color::Yellow);
    assert_eq!(availability_color("lost"), Color::Yellow);
  }
}
