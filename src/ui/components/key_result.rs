/// Outcome of offering a key to a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, and the parent has an event to process
  Event(T),
  /// Not consumed; the parent tries its next handler
  NotHandled,
}
