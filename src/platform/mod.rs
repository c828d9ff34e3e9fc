//! Platform abstraction layer
//!
//! Turns browser input events into simulation input. Event handlers only set
//! flags; the tick loop consumes them.

pub mod input;

pub use input::{JumpKeyAction, JumpLatch};
