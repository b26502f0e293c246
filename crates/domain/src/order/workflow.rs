//! Status transitions.

use super::{Order, OrderError, OrderStatus, STATUS_FLOW};

/// Returns the status that follows `current` on the happy path.
///
/// `None` for terminal statuses and for anything outside [`STATUS_FLOW`].
pub fn next_status(current: OrderStatus) -> Option<OrderStatus> {
    let index = STATUS_FLOW.iter().position(|s| *s == current)?;
    STATUS_FLOW.get(index + 1).copied()
}

/// Returns true if `current -> target` is a legal transition.
///
/// Legal moves are one step forward along [`STATUS_FLOW`], or a jump to
/// `Cancelled` from any non-terminal status.
pub fn can_transition(current: OrderStatus, target: OrderStatus) -> bool {
    if next_status(current) == Some(target) {
        return true;
    }
    target == OrderStatus::Cancelled && !current.is_terminal()
}

/// Every status reachable from `current` in one move: the forward step
/// first, then cancellation.
pub fn allowed_transitions(current: OrderStatus) -> Vec<OrderStatus> {
    let mut targets: Vec<OrderStatus> = next_status(current).into_iter().collect();
    if can_transition(current, OrderStatus::Cancelled) {
        targets.push(OrderStatus::Cancelled);
    }
    targets
}

/// Validates `order.status -> target` and returns the transitioned order.
///
/// The input is left untouched; persisting the returned value is the
/// caller's job.
pub fn apply_transition(order: &Order, target: OrderStatus) -> Result<Order, OrderError> {
    let current = order.status();
    if !can_transition(current, target) {
        return Err(OrderError::InvalidTransition { current, target });
    }
    Ok(order.with_status(target))
}
