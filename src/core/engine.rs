use crate::core::gesture::{GestureMapper, SwipeDirection};
use crate::models::{CandidateProfile, InteractionResult, SwipeAction};

/// How a resolved queue position ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Liked,
    Passed,
    Matched,
}

impl From<SwipeAction> for Resolution {
    fn from(action: SwipeAction) -> Self {
        match action {
            SwipeAction::Like => Resolution::Liked,
            SwipeAction::Pass => Resolution::Passed,
        }
    }
}

/// Lifecycle of a single queue position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unseen,
    Pending(SwipeAction),
    Resolved(Resolution),
}

/// A committed swipe whose submission has not completed yet
///
/// Carries the candidate captured at commit time, so completions never look
/// the candidate up again in a queue that may have moved on.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSwipe {
    position: usize,
    generation: u64,
    action: SwipeAction,
    candidate: CandidateProfile,
}

impl PendingSwipe {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn action(&self) -> SwipeAction {
        self.action
    }

    pub fn target_id(&self) -> i64 {
        self.candidate.id
    }

    pub fn candidate(&self) -> &CandidateProfile {
        &self.candidate
    }
}

/// Outcome of applying a swipe response to the queue
#[derive(Debug)]
pub struct Completion<E> {
    pub position: usize,
    pub resolution: Resolution,
    /// Candidate to announce in the match dialog
    pub matched: Option<CandidateProfile>,
    /// Whether the response's next candidate was written into the queue
    pub spliced: bool,
    /// Submission error, already logged
    pub error: Option<E>,
}

/// Discovery queue with a forward-only cursor
///
/// # State machine
/// Each position moves Unseen -> Pending -> Resolved. The cursor advances as
/// soon as a swipe is committed, before the network call is issued.
#[derive(Debug, Clone)]
pub struct SwipeEngine {
    queue: Vec<CandidateProfile>,
    states: Vec<SlotState>,
    cursor: usize,
    generation: u64,
    gestures: GestureMapper,
}

impl SwipeEngine {
    pub fn new(gestures: GestureMapper) -> Self {
        Self {
            queue: Vec::new(),
            states: Vec::new(),
            cursor: 0,
            generation: 0,
            gestures,
        }
    }

    /// Replace the queue with a freshly fetched feed and rewind the cursor
    pub fn load(&mut self, feed: Vec<CandidateProfile>) {
        self.states = vec![SlotState::Unseen; feed.len()];
        self.queue = feed;
        self.cursor = 0;
        self.generation += 1;
        tracing::debug!("Loaded feed with {} candidates", self.queue.len());
    }

    pub fn current(&self) -> Option<&CandidateProfile> {
        self.queue.get(self.cursor)
    }

    /// Candidate rendered behind the current card
    pub fn peek_next(&self) -> Option<&CandidateProfile> {
        self.queue.get(self.cursor + 1)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True once every candidate has been swiped (or the feed was empty)
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }

    pub fn queue(&self) -> &[CandidateProfile] {
        &self.queue
    }

    pub fn state_at(&self, position: usize) -> Option<SlotState> {
        self.states.get(position).copied()
    }

    pub fn gestures(&self) -> &GestureMapper {
        &self.gestures
    }

    /// Commit a decision on the current candidate
    ///
    /// Advances the cursor immediately. Returns `None` when the queue is
    /// exhausted, which makes repeated triggers harmless.
    pub fn resolve_current(&mut self, action: SwipeAction) -> Option<PendingSwipe> {
        let position = self.cursor;
        let candidate = self.queue.get(position)?.clone();

        self.states[position] = SlotState::Pending(action);
        self.cursor += 1;

        tracing::debug!(
            "Committed {} on candidate {} at position {}",
            action,
            candidate.id,
            position
        );

        Some(PendingSwipe {
            position,
            generation: self.generation,
            action,
            candidate,
        })
    }

    /// Interpret a drag release; below the threshold nothing changes
    pub fn release_drag(&mut self, offset_x: f64) -> Option<(SwipeDirection, PendingSwipe)> {
        let direction = self.gestures.classify(offset_x)?;
        let pending = self.resolve_current(direction.action())?;
        Some((direction, pending))
    }

    /// Apply the result of a swipe submission
    ///
    /// A successful response may announce a match and carry the next
    /// candidate, which is written at the slot right after the resolved
    /// position. Failures are logged and only settle the position. Completions
    /// from a feed that has since been reloaded do not touch the new queue.
    pub fn complete<E: std::fmt::Display>(
        &mut self,
        pending: PendingSwipe,
        result: Result<InteractionResult, E>,
    ) -> Completion<E> {
        let stale = pending.generation != self.generation;
        let position = pending.position;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    "Swipe on candidate {} was not recorded: {}",
                    pending.candidate.id,
                    e
                );
                let resolution = Resolution::from(pending.action);
                if !stale {
                    self.states[position] = SlotState::Resolved(resolution);
                }
                return Completion {
                    position,
                    resolution,
                    matched: None,
                    spliced: false,
                    error: Some(e),
                };
            }
        };

        let resolution = if response.matched {
            Resolution::Matched
        } else {
            Resolution::from(pending.action)
        };

        let mut spliced = false;
        if !stale {
            self.states[position] = SlotState::Resolved(resolution);
            if let Some(next) = response.next_candidate {
                self.splice(position + 1, next);
                spliced = true;
            }
        }

        if response.matched {
            tracing::info!("Matched with candidate {}", pending.candidate.id);
        }

        Completion {
            position,
            resolution,
            matched: response.matched.then_some(pending.candidate),
            spliced,
            error: None,
        }
    }

    fn splice(&mut self, slot: usize, candidate: CandidateProfile) {
        if slot < self.queue.len() {
            self.queue[slot] = candidate;
            // A slot the cursor already passed keeps its own lifecycle
            if slot >= self.cursor {
                self.states[slot] = SlotState::Unseen;
            }
        } else {
            self.queue.push(candidate);
            self.states.push(SlotState::Unseen);
        }
    }
}

impl Default for SwipeEngine {
    fn default() -> Self {
        Self::new(GestureMapper::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64) -> CandidateProfile {
        CandidateProfile {
            id,
            username: format!("user{}", id),
            first_name: format!("First{}", id),
            last_name: format!("Last{}", id),
            age: Some(25),
            bio: None,
            gender: None,
            birth_date: None,
            cover_image_url: None,
            interests: vec![],
        }
    }

    fn response(matched: bool, next: Option<CandidateProfile>) -> Result<InteractionResult, String> {
        Ok(InteractionResult {
            matched,
            match_id: None,
            next_candidate: next,
        })
    }

    #[test]
    fn test_resolve_advances_before_completion() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1), candidate(2)]);

        let pending = engine.resolve_current(SwipeAction::Like).unwrap();
        assert_eq!(engine.cursor(), 1);
        assert_eq!(pending.target_id(), 1);
        assert_eq!(engine.state_at(0), Some(SlotState::Pending(SwipeAction::Like)));
        assert_eq!(engine.current().map(|c| c.id), Some(2));
    }

    #[test]
    fn test_past_end_is_noop() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1)]);
        assert!(engine.resolve_current(SwipeAction::Pass).is_some());
        assert!(engine.resolve_current(SwipeAction::Pass).is_none());
        assert!(engine.resolve_current(SwipeAction::Like).is_none());
        assert_eq!(engine.cursor(), 1);
        assert!(engine.is_exhausted());
    }

    #[test]
    fn test_next_candidate_spliced_after_resolved_position() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1), candidate(2)]);

        let pending = engine.resolve_current(SwipeAction::Like).unwrap();
        let done = engine.complete(pending, response(false, Some(candidate(3))));

        assert!(done.spliced);
        assert!(done.matched.is_none());
        let ids: Vec<i64> = engine.queue().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(engine.cursor(), 1);
        assert_eq!(engine.current().map(|c| c.id), Some(3));
        assert_eq!(engine.state_at(0), Some(SlotState::Resolved(Resolution::Liked)));
    }

    #[test]
    fn test_splice_extends_queue_at_end() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1)]);
        let pending = engine.resolve_current(SwipeAction::Pass).unwrap();
        assert!(engine.is_exhausted());

        engine.complete(pending, response(false, Some(candidate(5))));
        assert!(!engine.is_exhausted());
        assert_eq!(engine.current().map(|c| c.id), Some(5));
    }

    #[test]
    fn test_match_carries_resolved_candidate() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1), candidate(2)]);
        let pending = engine.resolve_current(SwipeAction::Like).unwrap();
        // The response's next candidate is not the matched party
        let done = engine.complete(pending, response(true, Some(candidate(9))));
        assert_eq!(done.matched.map(|c| c.id), Some(1));
        assert_eq!(done.resolution, Resolution::Matched);
    }

    #[test]
    fn test_failure_still_advances() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1), candidate(2)]);
        let pending = engine.resolve_current(SwipeAction::Like).unwrap();
        let done = engine.complete(pending, Err::<InteractionResult, _>("connection refused".to_string()));
        assert!(done.error.is_some());
        assert!(done.matched.is_none());
        assert_eq!(engine.cursor(), 1);
        assert_eq!(engine.current().map(|c| c.id), Some(2));
    }

    #[test]
    fn test_out_of_order_completions_target_fixed_slots() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1), candidate(2), candidate(3)]);

        let first = engine.resolve_current(SwipeAction::Pass).unwrap();
        let second = engine.resolve_current(SwipeAction::Pass).unwrap();
        assert_eq!(engine.cursor(), 2);

        engine.complete(second, response(false, Some(candidate(30))));
        engine.complete(first, response(false, Some(candidate(20))));

        let ids: Vec<i64> = engine.queue().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 20, 30]);
        assert_eq!(engine.current().map(|c| c.id), Some(30));
        // Slot 1 was already swiped; it stays resolved
        assert_eq!(engine.state_at(1), Some(SlotState::Resolved(Resolution::Passed)));
    }

    #[test]
    fn test_stale_completion_after_reload() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1), candidate(2)]);
        let pending = engine.resolve_current(SwipeAction::Like).unwrap();

        engine.load(vec![candidate(7), candidate(8)]);
        let done = engine.complete(pending, response(true, Some(candidate(9))));

        assert!(!done.spliced);
        assert_eq!(done.matched.map(|c| c.id), Some(1));
        let ids: Vec<i64> = engine.queue().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(engine.state_at(0), Some(SlotState::Unseen));
    }

    #[test]
    fn test_drag_release() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![candidate(1), candidate(2)]);

        assert!(engine.release_drag(120.0).is_none());
        assert!(engine.release_drag(-150.0).is_none());
        assert_eq!(engine.cursor(), 0);

        let (direction, pending) = engine.release_drag(-151.0).unwrap();
        assert_eq!(direction, SwipeDirection::Left);
        assert_eq!(pending.action(), SwipeAction::Pass);

        let (_, pending) = engine.release_drag(200.0).unwrap();
        assert_eq!(pending.action(), SwipeAction::Like);
        assert_eq!(engine.cursor(), 2);
    }

    #[test]
    fn test_empty_feed_is_exhausted() {
        let mut engine = SwipeEngine::default();
        engine.load(vec![]);
        assert!(engine.is_exhausted());
        assert!(engine.current().is_none());
        assert_eq!(engine.remaining(), 0);
    }
}
