use crate::core::{Completion, ExitAnimation, GestureMapper, PendingSwipe, SwipeDirection, SwipeEngine};
use crate::models::{CandidateProfile, InteractionResult, SwipeAction};
use crate::services::api::{ApiError, DatingApi};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Reply from a detached swipe submission
pub type SwipeReply = (PendingSwipe, Result<InteractionResult, ApiError>);

/// Drives the swipe engine against the dating API
///
/// Two ways to resolve a card:
/// - [`Swiper::resolve_current`] awaits the submission before returning
/// - [`Swiper::commit_detached`] returns at once and the reply is applied later
///   through [`Swiper::next_completion`], so input handling never waits on the network
pub struct Swiper<A: DatingApi + 'static> {
    api: Arc<A>,
    engine: SwipeEngine,
    exit: ExitAnimation,
    replies_tx: mpsc::UnboundedSender<SwipeReply>,
    replies_rx: mpsc::UnboundedReceiver<SwipeReply>,
    in_flight: usize,
}

impl<A: DatingApi + 'static> Swiper<A> {
    pub fn new(api: A, gestures: GestureMapper) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Self {
            api: Arc::new(api),
            engine: SwipeEngine::new(gestures),
            exit: ExitAnimation::default(),
            replies_tx,
            replies_rx,
            in_flight: 0,
        }
    }

    pub fn engine(&self) -> &SwipeEngine {
        &self.engine
    }

    pub fn current(&self) -> Option<&CandidateProfile> {
        self.engine.current()
    }

    pub fn exit_animation(&self) -> &ExitAnimation {
        &self.exit
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Fetch the feed from the beginning
    ///
    /// On failure the queue is left empty, which renders as "no more cards";
    /// the error is returned so the caller can react to Unauthorized.
    pub async fn reload(&mut self) -> Result<usize, ApiError> {
        match self.api.get_feed().await {
            Ok(feed) => {
                let count = feed.len();
                self.engine.load(feed);
                tracing::info!("Feed loaded with {} candidates", count);
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Error fetching feed: {}", e);
                self.engine.load(Vec::new());
                Err(e)
            }
        }
    }

    fn commit(&mut self, action: SwipeAction) -> Option<PendingSwipe> {
        let pending = self.engine.resolve_current(action)?;
        self.exit.record(SwipeDirection::from(action));
        Some(pending)
    }

    /// Resolve the current card and wait for the server's answer
    pub async fn resolve_current(&mut self, action: SwipeAction) -> Option<Completion<ApiError>> {
        let pending = self.commit(action)?;
        let result = self.api.swipe(pending.target_id(), pending.action()).await;
        Some(self.engine.complete(pending, result))
    }

    /// Drag release variant of [`Swiper::resolve_current`]
    pub async fn release_drag(&mut self, offset_x: f64) -> Option<Completion<ApiError>> {
        let direction = self.engine.gestures().classify(offset_x)?;
        self.resolve_current(direction.action()).await
    }

    /// Resolve the current card and submit in the background
    ///
    /// Returns the committed swipe, or `None` when the queue is exhausted.
    pub fn commit_detached(&mut self, action: SwipeAction) -> Option<PendingSwipe> {
        let pending = self.commit(action)?;

        let api = Arc::clone(&self.api);
        let tx = self.replies_tx.clone();
        let job = pending.clone();
        tokio::spawn(async move {
            let result = api.swipe(job.target_id(), job.action()).await;
            // Receiver only goes away with the swiper itself
            let _ = tx.send((job, result));
        });

        self.in_flight += 1;
        Some(pending)
    }

    /// Drag release variant of [`Swiper::commit_detached`]
    pub fn release_drag_detached(&mut self, offset_x: f64) -> Option<PendingSwipe> {
        let direction = self.engine.gestures().classify(offset_x)?;
        self.commit_detached(direction.action())
    }

    /// Wait for the next detached submission and apply it
    ///
    /// Cancel-safe; returns `None` only if nothing can ever arrive.
    pub async fn next_completion(&mut self) -> Option<Completion<ApiError>> {
        let (pending, result) = self.replies_rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(self.engine.complete(pending, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, OwnProfile};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn candidate(id: i64) -> CandidateProfile {
        CandidateProfile {
            id,
            username: format!("user{}", id),
            first_name: format!("First{}", id),
            last_name: String::new(),
            age: None,
            bio: None,
            gender: None,
            birth_date: None,
            cover_image_url: None,
            interests: vec![],
        }
    }

    #[derive(Default)]
    struct ScriptedApi {
        feed: Vec<CandidateProfile>,
        replies: Mutex<Vec<Result<InteractionResult, ApiError>>>,
        swipes: Mutex<Vec<(i64, SwipeAction)>>,
    }

    #[async_trait]
    impl DatingApi for ScriptedApi {
        async fn get_feed(&self) -> Result<Vec<CandidateProfile>, ApiError> {
            Ok(self.feed.clone())
        }

        async fn swipe(&self, target_id: i64, action: SwipeAction) -> Result<InteractionResult, ApiError> {
            self.swipes.lock().unwrap().push((target_id, action));
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Err(ApiError::Server { status: 503, message: "unavailable".into() })
            } else {
                replies.remove(0)
            }
        }

        async fn get_matches(&self) -> Result<Vec<Match>, ApiError> {
            Ok(vec![])
        }

        async fn get_profile(&self) -> Result<OwnProfile, ApiError> {
            Err(ApiError::Unauthorized)
        }
    }

    #[tokio::test]
    async fn test_detached_commit_applies_later() {
        let api = ScriptedApi {
            feed: vec![candidate(1), candidate(2)],
            replies: Mutex::new(vec![Ok(InteractionResult {
                matched: true,
                match_id: Some(5),
                next_candidate: Some(candidate(3)),
            })]),
            ..Default::default()
        };
        let mut swiper = Swiper::new(api, GestureMapper::default());
        swiper.reload().await.unwrap();

        let pending = swiper.commit_detached(SwipeAction::Like).unwrap();
        assert_eq!(pending.target_id(), 1);
        assert_eq!(swiper.engine().cursor(), 1);
        assert_eq!(swiper.in_flight(), 1);
        assert_eq!(swiper.exit_animation().direction(), Some(SwipeDirection::Right));

        let done = swiper.next_completion().await.unwrap();
        assert_eq!(done.matched.map(|c| c.id), Some(1));
        assert_eq!(swiper.current().map(|c| c.id), Some(3));
        assert_eq!(swiper.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_drag_below_threshold_sends_nothing() {
        let api = ScriptedApi {
            feed: vec![candidate(1)],
            ..Default::default()
        };
        let mut swiper = Swiper::new(api, GestureMapper::default());
        swiper.reload().await.unwrap();

        assert!(swiper.release_drag(90.0).await.is_none());
        assert!(swiper.release_drag_detached(-150.0).is_none());
        assert_eq!(swiper.engine().cursor(), 0);
        assert!(swiper.api.swipes.lock().unwrap().is_empty());
        assert_eq!(swiper.exit_animation().direction(), None);
    }

    #[tokio::test]
    async fn test_failed_submission_still_advances() {
        let api = ScriptedApi {
            feed: vec![candidate(1), candidate(2)],
            ..Default::default()
        };
        let mut swiper = Swiper::new(api, GestureMapper::default());
        swiper.reload().await.unwrap();

        let done = swiper.release_drag(-300.0).await.unwrap();
        assert!(done.error.is_some());
        assert_eq!(swiper.current().map(|c| c.id), Some(2));
        assert_eq!(swiper.api.swipes.lock().unwrap()[0], (1, SwipeAction::Pass));
    }
}
