// Core swipe loop exports
pub mod engine;
pub mod gesture;

pub use engine::{SwipeEngine, PendingSwipe, Completion, Resolution, SlotState};
pub use gesture::{GestureMapper, SwipeDirection, ExitAnimation, DEFAULT_COMMIT_THRESHOLD};
