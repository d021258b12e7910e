//! # Order Lifecycle
//!
//! The legal-transition rules for [`OrderStatus`].
//!
//! ## Transition Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Processing ────────► Shipped ────────► Completed (terminal)           │
//! │       │                                                                 │
//! │       └──────────────► Cancelled (terminal)                             │
//! │                                                                         │
//! │   Everything else is illegal: no backward edges, no leaving             │
//! │   Completed or Cancelled, no self-transitions.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The functions here are pure: (current status, requested status) in,
//! verdict out. Applying the status and stamping timestamps is the domain
//! store's job.

use crate::error::{CoreError, CoreResult};
use crate::types::OrderStatus;

/// Returns whether moving an order from `from` to `to` is legal.
///
/// ## Example
/// ```rust
/// use freshko_core::lifecycle::can_transition;
/// use freshko_core::types::OrderStatus;
///
/// assert!(can_transition(OrderStatus::Processing, OrderStatus::Shipped));
/// assert!(!can_transition(OrderStatus::Cancelled, OrderStatus::Shipped));
/// ```
pub const fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    // Exhaustive on the source state so a new status cannot be added
    // without revisiting this table.
    match (from, to) {
        (Processing, Shipped) | (Processing, Cancelled) => true,
        (Shipped, Completed) => true,
        (Processing, _) | (Shipped, _) | (Completed, _) | (Cancelled, _) => false,
    }
}

/// Checks a transition, returning `IllegalTransition` when it is not legal.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::IllegalTransition { from, to })
    }
}

/// Whether `status` permits no further transitions.
pub const fn is_terminal(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Completed | OrderStatus::Cancelled)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 4] = [Processing, Shipped, Completed, Cancelled];

    #[test]
    fn test_legal_edges() {
        assert!(can_transition(Processing, Shipped));
        assert!(can_transition(Processing, Cancelled));
        assert!(can_transition(Shipped, Completed));
    }

    #[test]
    fn test_no_backward_edges() {
        assert!(!can_transition(Shipped, Processing));
        assert!(!can_transition(Completed, Shipped));
        assert!(!can_transition(Cancelled, Processing));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in ALL {
            assert!(!can_transition(Completed, to), "completed -> {to:?} must be illegal");
            assert!(!can_transition(Cancelled, to), "cancelled -> {to:?} must be illegal");
        }
    }

    #[test]
    fn test_self_transitions_illegal() {
        for status in ALL {
            assert!(!can_transition(status, status));
        }
    }

    #[test]
    fn test_exactly_three_legal_edges() {
        let mut legal = 0;
        for from in ALL {
            for to in ALL {
                if can_transition(from, to) {
                    legal += 1;
                }
            }
        }
        assert_eq!(legal, 3);
    }

    #[test]
    fn test_check_transition_error_carries_states() {
        let err = check_transition(Cancelled, Shipped).unwrap_err();
        match err {
            CoreError::IllegalTransition { from, to } => {
                assert_eq!(from, Cancelled);
                assert_eq!(to, Shipped);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(is_terminal(Completed));
        assert!(is_terminal(Cancelled));
        assert!(!is_terminal(Processing));
        assert!(!is_terminal(Shipped));
    }
}
