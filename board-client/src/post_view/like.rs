use std::time::{Duration, Instant};

use board_types::LikeAction;

use super::store::PostStateStore;
use crate::api::ApiResult;

/// Trailing-edge rate limiter for like requests.
///
/// A scheduled call fires one window after it was requested, and never
/// sooner than one window after the previous call was issued.
#[derive(Debug, Clone)]
pub struct LikeThrottle {
    window: Duration,
    last_issued: Option<Instant>,
    due: Option<Instant>,
}

impl LikeThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_issued: None,
            due: None,
        }
    }

    /// Schedule a call, or return the time of the one already scheduled
    pub fn schedule(&mut self, now: Instant) -> Instant {
        if let Some(due) = self.due {
            return due;
        }
        let mut due = now + self.window;
        if let Some(last) = self.last_issued {
            due = due.max(last + self.window);
        }
        self.due = Some(due);
        due
    }

    /// Consume the scheduled call if it is due, recording it as issued
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                self.last_issued = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }
}

/// Why a toggle was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRejected {
    /// A like/unlike is already pending for this post
    InFlight,
    /// There is no loaded post to like
    NotLoaded,
    /// The view session has been torn down
    Disposed,
}

/// A like request that has been issued and awaits its network result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeTicket {
    pub post_id: String,
    pub action: LikeAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    /// Server confirmed; the post now reflects the new like state
    Applied(LikeAction),
    /// Request failed; post unchanged, message for the user
    Failed(String),
    /// The session was disposed before the result arrived
    Ignored,
}

/// Serializes like/unlike toggles for one post view.
///
/// The displayed like state changes only when the server confirms, so a
/// failed request needs no rollback.
#[derive(Debug)]
pub struct LikeCoordinator {
    throttle: LikeThrottle,
    in_flight: bool,
    disposed: bool,
}

impl LikeCoordinator {
    pub fn new(window: Duration) -> Self {
        Self {
            throttle: LikeThrottle::new(window),
            in_flight: false,
            disposed: false,
        }
    }

    /// True from the moment a toggle is accepted until its result is applied
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// When the scheduled request will be issued, if one is waiting
    pub fn next_due(&self) -> Option<Instant> {
        self.throttle.due()
    }

    /// Accept a toggle and schedule its request. Toggles while one is
    /// pending are dropped, not queued.
    pub fn request_toggle(&mut self, store: &PostStateStore, now: Instant) -> Result<Instant, ToggleRejected> {
        if self.disposed {
            return Err(ToggleRejected::Disposed);
        }
        if self.in_flight {
            log_like!("toggle dropped: request already pending for post {}", store.post_id());
            return Err(ToggleRejected::InFlight);
        }
        if store.post().is_none() {
            return Err(ToggleRejected::NotLoaded);
        }
        self.in_flight = true;
        let due = self.throttle.schedule(now);
        log_like!("toggle accepted for post {}, due in {:?}", store.post_id(), due.saturating_duration_since(now));
        Ok(due)
    }

    /// Issue the scheduled request once the throttle allows it.
    ///
    /// The action is computed here from the like state at issue time and
    /// stays fixed for the lifetime of the request.
    pub fn poll(&mut self, store: &PostStateStore, now: Instant) -> Option<LikeTicket> {
        if self.disposed || !self.throttle.fire(now) {
            return None;
        }
        let Some(post) = store.post() else {
            // Post disappeared (failed refresh) while waiting
            self.in_flight = false;
            return None;
        };
        let action = LikeAction::toggling(post.is_liked);
        log_like!("issuing {} like for post {}", action.as_str(), post.id);
        Some(LikeTicket {
            post_id: post.id.clone(),
            action,
        })
    }

    /// Apply the network result of an issued request
    pub fn complete(&mut self, ticket: &LikeTicket, result: ApiResult<()>, store: &mut PostStateStore) -> LikeOutcome {
        if self.disposed {
            return LikeOutcome::Ignored;
        }
        self.in_flight = false;
        match result {
            Ok(()) => {
                store.apply_confirmed_like(ticket.action);
                log_like!("{} like confirmed for post {}", ticket.action.as_str(), ticket.post_id);
                LikeOutcome::Applied(ticket.action)
            }
            Err(e) => LikeOutcome::Failed(e.user_message()),
        }
    }

    /// Tear down for navigation away: drops the scheduled request and turns
    /// later completions into no-ops
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.in_flight = false;
        self.throttle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::post_view::store::tests::detail;

    const WINDOW: Duration = Duration::from_secs(1);

    fn store_with(liked: bool, likes: i64) -> PostStateStore {
        let mut store = PostStateStore::new("7");
        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(detail("7", liked, likes, &[])));
        store
    }

    /// Request, wait out the window, and return the issued ticket
    fn issue(like: &mut LikeCoordinator, store: &PostStateStore, now: Instant) -> LikeTicket {
        let due = like.request_toggle(store, now).unwrap();
        like.poll(store, due).unwrap()
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut store = store_with(false, 5);
        let mut like = LikeCoordinator::new(WINDOW);
        let t0 = Instant::now();

        let ticket = issue(&mut like, &store, t0);
        assert_eq!(ticket.action, LikeAction::Add);
        assert_eq!(like.complete(&ticket, Ok(()), &mut store), LikeOutcome::Applied(LikeAction::Add));
        let post = store.post().unwrap();
        assert!(post.is_liked);
        assert_eq!(post.likes, 6);

        let ticket = issue(&mut like, &store, t0 + WINDOW * 3);
        assert_eq!(ticket.action, LikeAction::Remove);
        like.complete(&ticket, Ok(()), &mut store);
        let post = store.post().unwrap();
        assert!(!post.is_liked);
        assert_eq!(post.likes, 5);
    }

    #[test]
    fn test_remove_never_goes_below_zero() {
        let mut store = store_with(true, 0);
        let mut like = LikeCoordinator::new(WINDOW);

        let ticket = issue(&mut like, &store, Instant::now());
        assert_eq!(ticket.action, LikeAction::Remove);
        like.complete(&ticket, Ok(()), &mut store);
        assert_eq!(store.post().unwrap().likes, 0);
        assert!(!store.post().unwrap().is_liked);
    }

    #[test]
    fn test_state_unchanged_until_confirmed() {
        let store = store_with(false, 5);
        let mut like = LikeCoordinator::new(WINDOW);
        let t0 = Instant::now();

        let due = like.request_toggle(&store, t0).unwrap();
        assert!(like.is_in_flight());
        assert_eq!(store.post().unwrap().likes, 5);

        // Not issued before the window passes
        assert!(like.poll(&store, t0 + Duration::from_millis(500)).is_none());
        assert!(like.poll(&store, due).is_some());
        assert!(like.is_in_flight());
        assert_eq!(store.post().unwrap().likes, 5);
    }

    #[test]
    fn test_second_toggle_while_pending_is_dropped() {
        let mut store = store_with(false, 5);
        let mut like = LikeCoordinator::new(WINDOW);
        let t0 = Instant::now();

        let due = like.request_toggle(&store, t0).unwrap();
        assert_eq!(
            like.request_toggle(&store, t0 + Duration::from_millis(100)),
            Err(ToggleRejected::InFlight)
        );

        let ticket = like.poll(&store, due).unwrap();
        // Only one request is ever issued for the burst
        assert!(like.poll(&store, due + WINDOW * 5).is_none());
        assert_eq!(
            like.request_toggle(&store, due + Duration::from_millis(10)),
            Err(ToggleRejected::InFlight)
        );

        like.complete(&ticket, Ok(()), &mut store);
        assert_eq!(store.post().unwrap().likes, 6);
        assert!(!like.is_in_flight());
    }

    #[test]
    fn test_failure_leaves_post_untouched() {
        let mut store = store_with(false, 5);
        let mut like = LikeCoordinator::new(WINDOW);

        let ticket = issue(&mut like, &store, Instant::now());
        let outcome = like.complete(&ticket, Err(ApiError::from_status(500, None)), &mut store);

        assert_eq!(outcome, LikeOutcome::Failed(crate::api::GENERIC_SERVER_ERROR.to_string()));
        let post = store.post().unwrap();
        assert!(!post.is_liked);
        assert_eq!(post.likes, 5);
        assert!(!like.is_in_flight());
    }

    #[test]
    fn test_calls_are_spaced_by_window() {
        let mut store = store_with(false, 5);
        let mut like = LikeCoordinator::new(WINDOW);
        let t0 = Instant::now();

        let due = like.request_toggle(&store, t0).unwrap();
        let ticket = like.poll(&store, due).unwrap();
        like.complete(&ticket, Ok(()), &mut store);

        // Requested right after the first call: still one full window later
        let next_due = like.request_toggle(&store, due).unwrap();
        assert!(next_due >= due + WINDOW);
    }

    #[test]
    fn test_toggle_rejected_without_post() {
        let store = PostStateStore::new("7");
        let mut like = LikeCoordinator::new(WINDOW);
        assert_eq!(like.request_toggle(&store, Instant::now()), Err(ToggleRejected::NotLoaded));
        assert!(!like.is_in_flight());
    }

    #[test]
    fn test_dispose_ignores_late_completion() {
        let mut store = store_with(false, 5);
        let mut like = LikeCoordinator::new(WINDOW);

        let ticket = issue(&mut like, &store, Instant::now());
        like.dispose();

        assert_eq!(like.complete(&ticket, Ok(()), &mut store), LikeOutcome::Ignored);
        assert_eq!(store.post().unwrap().likes, 5);
        assert_eq!(like.request_toggle(&store, Instant::now()), Err(ToggleRejected::Disposed));
    }

    #[test]
    fn test_dispose_cancels_scheduled_request() {
        let store = store_with(false, 5);
        let mut like = LikeCoordinator::new(WINDOW);
        let t0 = Instant::now();

        let due = like.request_toggle(&store, t0).unwrap();
        like.dispose();
        assert!(like.poll(&store, due).is_none());
        assert!(like.next_due().is_none());
    }
}
