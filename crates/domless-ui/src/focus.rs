//! Focus hand-off between text-entry fields.
//!
//! # How focus moves
//!
//! 1. A field that wants to give up focus (Tab, Shift+Tab, Enter with
//!    submit-on-enter) records a [`FocusMove`] instead of acting on it.
//! 2. Its owner (a form) takes the move after routing the event, looks up the
//!    neighbour with [`cycle`] and deactivates the field toward it.
//! 3. The keyboard drawer scrolls the neighbour into view, then the scene
//!    delivers [`UiEvent::FocusField`](crate::event::UiEvent::FocusField) and
//!    the neighbour activates itself.

use crate::widget::{Component, WidgetId};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FocusMove {
    Next,
    Previous,
}

impl FocusMove {
    #[inline]
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse { FocusMove::Previous } else { FocusMove::Next }
    }

    #[inline]
    pub fn is_reverse(self) -> bool {
        self == FocusMove::Previous
    }
}

/// Components that can hold text-entry focus.
pub trait Focusable: Component {
    /// Currently editing.
    fn is_focused(&self) -> bool;

    /// Takes the hand-off this component requested during the last event.
    fn take_focus_move(&mut self) -> Option<FocusMove>;
}

/// Neighbour of `current` in `order`.
///
/// With `current` unknown the first (or last, in reverse) entry is returned.
/// Without `wrap`, stepping past either end yields `None`.
pub fn cycle(order: &[WidgetId], current: Option<WidgetId>, reverse: bool, wrap: bool) -> Option<WidgetId> {
    let n = order.len();
    if n == 0 {
        return None;
    }
    let Some(i) = current.and_then(|c| order.iter().position(|&x| x == c)) else {
        return Some(order[if reverse { n - 1 } else { 0 }]);
    };
    let next = match (reverse, wrap) {
        (true, true) => (i + n - 1) % n,
        (false, true) => (i + 1) % n,
        (true, false) => i.checked_sub(1)?,
        (false, false) => {
            if i + 1 >= n {
                return None;
            }
            i + 1
        }
    };
    Some(order[next])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<WidgetId> {
        (0..n).map(|_| WidgetId::new()).collect()
    }

    #[test]
    fn forward_and_back_without_wrap() {
        let order = ids(3);
        assert_eq!(cycle(&order, Some(order[0]), false, false), Some(order[1]));
        assert_eq!(cycle(&order, Some(order[1]), true, false), Some(order[0]));
        assert_eq!(cycle(&order, Some(order[2]), false, false), None);
        assert_eq!(cycle(&order, Some(order[0]), true, false), None);
    }

    #[test]
    fn wrap_goes_around() {
        let order = ids(3);
        assert_eq!(cycle(&order, Some(order[2]), false, true), Some(order[0]));
        assert_eq!(cycle(&order, Some(order[0]), true, true), Some(order[2]));
    }

    #[test]
    fn unknown_current_starts_at_an_end() {
        let order = ids(2);
        let stranger = WidgetId::new();
        assert_eq!(cycle(&order, Some(stranger), false, false), Some(order[0]));
        assert_eq!(cycle(&order, None, true, false), Some(order[1]));
        assert_eq!(cycle(&[], None, false, true), None);
    }

    #[test]
    fn move_direction() {
        assert!(FocusMove::from_reverse(true).is_reverse());
        assert_eq!(FocusMove::from_reverse(false), FocusMove::Next);
    }
}
