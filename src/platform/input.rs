//! Edge-triggered jump input
//!
//! Key presses and pointer clicks arrive asynchronously relative to the tick
//! loop. They collapse into one pending flag that the next tick consumes, so
//! several presses between two ticks count as a single request. Auto-repeat
//! while a key is held never produces another request.

use crate::sim::TickInput;

#[derive(Debug, Clone, Default)]
pub struct JumpLatch {
    pending: bool,
    key_held: bool,
}

impl JumpLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump key went down; `repeat` is the browser's auto-repeat flag
    pub fn key_down(&mut self, repeat: bool) {
        if repeat || self.key_held {
            return;
        }
        self.key_held = true;
        self.pending = true;
    }

    pub fn key_up(&mut self) {
        self.key_held = false;
    }

    /// Click or tap on the play field
    pub fn pointer_down(&mut self) {
        self.pending = true;
    }

    /// Input for the next tick; clears the pending request
    pub fn take(&mut self) -> TickInput {
        TickInput {
            jump: std::mem::take(&mut self.pending),
        }
    }

    /// Drop any pending request (round start/teardown)
    pub fn clear(&mut self) {
        self.pending = false;
        self.key_held = false;
    }
}

/// What the jump key does given where the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKeyAction {
    /// Feed the latch
    Jump,
    /// Start the next round from the start or round-over screen
    StartRound,
    Ignore,
}

impl JumpKeyAction {
    pub fn resolve(round_in_progress: bool, session_complete: bool, repeat: bool) -> Self {
        if round_in_progress {
            JumpKeyAction::Jump
        } else if session_complete || repeat {
            // The nickname form is up; spaces belong to the text field
            JumpKeyAction::Ignore
        } else {
            JumpKeyAction::StartRound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_consumed_once() {
        let mut latch = JumpLatch::new();
        latch.key_down(false);
        assert!(latch.take().jump);
        assert!(!latch.take().jump);
    }

    #[test]
    fn held_key_does_not_repeat() {
        let mut latch = JumpLatch::new();
        latch.key_down(false);
        latch.take();
        latch.key_down(true);
        latch.key_down(false);
        assert!(!latch.take().jump);

        latch.key_up();
        latch.key_down(false);
        assert!(latch.take().jump);
    }

    #[test]
    fn presses_between_ticks_collapse() {
        let mut latch = JumpLatch::new();
        latch.pointer_down();
        latch.pointer_down();
        latch.key_down(false);
        assert!(latch.take().jump);
        assert!(!latch.take().jump);
    }

    #[test]
    fn clear_drops_pending() {
        let mut latch = JumpLatch::new();
        latch.pointer_down();
        latch.clear();
        assert!(!latch.take().jump);
    }

    #[test]
    fn jump_key_starts_rounds_between_rounds() {
        assert_eq!(JumpKeyAction::resolve(true, false, false), JumpKeyAction::Jump);
        assert_eq!(JumpKeyAction::resolve(true, false, true), JumpKeyAction::Jump);
        assert_eq!(
            JumpKeyAction::resolve(false, false, false),
            JumpKeyAction::StartRound
        );
        // A held key after a round ends does not start the next one
        assert_eq!(JumpKeyAction::resolve(false, false, true), JumpKeyAction::Ignore);
        assert_eq!(JumpKeyAction::resolve(false, true, false), JumpKeyAction::Ignore);
    }
}
