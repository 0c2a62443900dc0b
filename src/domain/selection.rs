//! Selection state machine for the message range to capture
//!
//! Clicks on messages arrive as ordinal indices into the scanned
//! message list; the machine records a start, then an end, and
//! normalizes the pair into an inclusive range.

/// Inclusive range of message ordinals, normalized so `start <= end`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRange {
    start: usize,
    end: usize,
}

impl SelectionRange {
    /// Build a range from two clicks, in either order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of messages in the range
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Selection progress for one screenshot session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// No session active
    #[default]
    Idle,
    /// Session active, waiting for the first click
    AwaitingStart,
    /// Start recorded, waiting for the end click
    AwaitingEnd { start: usize },
    /// Both endpoints recorded and normalized
    RangeSelected { range: SelectionRange },
}

/// What a click changed, so the caller can update highlighting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Click recorded as the range start
    StartMarked(usize),
    /// Click completed the range
    RangeCompleted(SelectionRange),
    /// Click had no effect on the machine
    Ignored,
}

impl SelectionState {
    /// Enter selection mode
    pub fn begin() -> Self {
        SelectionState::AwaitingStart
    }

    /// Feed one message click through the machine.
    ///
    /// Re-clicking the start message while awaiting the end is ignored,
    /// so a stray double click cannot collapse the range; clicks after
    /// the range is complete are ignored too.
    pub fn click(&mut self, index: usize) -> ClickOutcome {
        match *self {
            SelectionState::AwaitingStart => {
                *self = SelectionState::AwaitingEnd { start: index };
                ClickOutcome::StartMarked(index)
            }
            SelectionState::AwaitingEnd { start } if index != start => {
                let range = SelectionRange::new(start, index);
                *self = SelectionState::RangeSelected { range };
                ClickOutcome::RangeCompleted(range)
            }
            _ => ClickOutcome::Ignored,
        }
    }

    /// Clear both endpoints and wait for a fresh start click
    pub fn reset(&mut self) {
        if !matches!(self, SelectionState::Idle) {
            *self = SelectionState::AwaitingStart;
        }
    }

    /// Tear the machine down entirely
    pub fn cancel(&mut self) {
        *self = SelectionState::Idle;
    }

    /// The completed range, if both clicks have happened
    pub fn range(&self) -> Option<SelectionRange> {
        match self {
            SelectionState::RangeSelected { range } => Some(*range),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_clicks_complete_a_range() {
        let mut state = SelectionState::begin();
        assert_eq!(state.click(2), ClickOutcome::StartMarked(2));
        assert_eq!(state, SelectionState::AwaitingEnd { start: 2 });
        assert_eq!(
            state.click(5),
            ClickOutcome::RangeCompleted(SelectionRange::new(2, 5))
        );
        assert_eq!(state.range(), Some(SelectionRange::new(2, 5)));
    }

    #[test]
    fn test_clicks_normalize_in_reverse_order() {
        let mut state = SelectionState::begin();
        state.click(5);
        state.click(2);
        let range = state.range().unwrap();
        assert_eq!((range.start(), range.end()), (2, 5));
        assert_eq!(range.len(), 4);
    }

    #[test]
    fn test_start_reclick_is_ignored() {
        let mut state = SelectionState::begin();
        state.click(3);
        assert_eq!(state.click(3), ClickOutcome::Ignored);
        assert_eq!(state, SelectionState::AwaitingEnd { start: 3 });
    }

    #[test]
    fn test_clicks_after_range_selected_are_ignored() {
        let mut state = SelectionState::begin();
        state.click(1);
        state.click(4);
        assert_eq!(state.click(7), ClickOutcome::Ignored);
        assert_eq!(state.range(), Some(SelectionRange::new(1, 4)));
    }

    #[test]
    fn test_reset_returns_to_awaiting_start() {
        let mut state = SelectionState::begin();
        state.click(1);
        state.click(4);
        state.reset();
        assert_eq!(state, SelectionState::AwaitingStart);
        assert_eq!(state.range(), None);
    }

    #[test]
    fn test_reset_does_not_start_an_idle_machine() {
        let mut state = SelectionState::Idle;
        state.reset();
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn test_cancel_from_any_state() {
        let mut state = SelectionState::begin();
        state.click(1);
        state.cancel();
        assert_eq!(state, SelectionState::Idle);
    }

    #[test]
    fn test_range_contains() {
        let range = SelectionRange::new(2, 5);
        assert!(range.contains(2));
        assert!(range.contains(5));
        assert!(!range.contains(1));
        assert!(!range.contains(6));
    }
}
