use crate::models::SwipeAction;

/// Horizontal displacement a drag must exceed to count as a decision
pub const DEFAULT_COMMIT_THRESHOLD: f64 = 150.0;

/// Direction a card leaves the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Right is a like, left is a pass
    pub fn action(self) -> SwipeAction {
        match self {
            SwipeDirection::Right => SwipeAction::Like,
            SwipeDirection::Left => SwipeAction::Pass,
        }
    }
}

impl From<SwipeAction> for SwipeDirection {
    fn from(action: SwipeAction) -> Self {
        match action {
            SwipeAction::Like => SwipeDirection::Right,
            SwipeAction::Pass => SwipeDirection::Left,
        }
    }
}

/// Maps drag releases to swipe decisions
#[derive(Debug, Clone, Copy)]
pub struct GestureMapper {
    threshold: f64,
}

impl GestureMapper {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.abs(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify a drag release by its horizontal offset
    ///
    /// Returns `None` when the card should snap back to rest. NaN never commits.
    #[inline]
    pub fn classify(&self, offset_x: f64) -> Option<SwipeDirection> {
        if !(offset_x.abs() > self.threshold) {
            return None;
        }
        if offset_x > 0.0 {
            Some(SwipeDirection::Right)
        } else {
            Some(SwipeDirection::Left)
        }
    }
}

impl Default for GestureMapper {
    fn default() -> Self {
        Self::new(DEFAULT_COMMIT_THRESHOLD)
    }
}

/// Exit animation hint kept by the presentation layer
///
/// Recorded as soon as the user commits; never read by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitAnimation {
    direction: Option<SwipeDirection>,
}

impl ExitAnimation {
    pub fn record(&mut self, direction: SwipeDirection) {
        self.direction = Some(direction);
    }

    pub fn direction(&self) -> Option<SwipeDirection> {
        self.direction
    }

    /// Horizontal travel and rotation in degrees for the outgoing card
    pub fn exit_transform(&self) -> (f64, f64) {
        match self.direction {
            Some(SwipeDirection::Right) => (300.0, 30.0),
            Some(SwipeDirection::Left) => (-300.0, -30.0),
            None => (0.0, 0.0),
        }
    }
}
