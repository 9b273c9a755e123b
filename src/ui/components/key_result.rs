/// Outcome of offering a key to a component.
///
/// Views try their components first and fall through to their own bindings
/// on `NotHandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was used, nothing for the view to do
  Handled,
  /// Key was used and produced something the view must act on
  Event(T),
  /// Key was ignored
  NotHandled,
}
