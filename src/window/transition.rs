//! Two-phase timed minimize/restore transitions.
//!
//! A transition first waits `transition_delay`, then swaps chrome and
//! content panes and sends the window toward its target rectangle (phase
//! one), and finally commits the new state once `transition_duration` has
//! elapsed from the start. Nothing here sleeps: the manager asks for the
//! next deadline and is advanced by `WindowManager::tick`.

use std::time::{Duration, Instant};

use super::WindowState;
use crate::layout::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Minimize,
    Restore,
}

impl TransitionKind {
    /// State the window settles in when the transition commits.
    pub fn target_state(self) -> WindowState {
        match self {
            TransitionKind::Minimize => WindowState::Minimized,
            TransitionKind::Restore => WindowState::Normal,
        }
    }

    /// State the window was in when the transition began.
    pub fn origin_state(self) -> WindowState {
        match self {
            TransitionKind::Minimize => WindowState::Normal,
            TransitionKind::Restore => WindowState::Minimized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// Waiting for the chrome/content swap.
    Scheduled,
    /// Swapped; waiting to commit.
    Moving,
}

/// An in-flight transition. Dropping it from the window cancels it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTransition {
    pub kind: TransitionKind,
    pub phase: TransitionPhase,
    pub started_at: Instant,
    pub swap_at: Instant,
    pub commit_at: Instant,
    pub target: Bounds,
}

impl PendingTransition {
    pub fn new(
        kind: TransitionKind,
        now: Instant,
        delay: Duration,
        duration: Duration,
        target: Bounds,
    ) -> Self {
        let commit_at = now + duration;
        Self {
            kind,
            phase: TransitionPhase::Scheduled,
            started_at: now,
            swap_at: (now + delay).min(commit_at),
            commit_at,
            target,
        }
    }

    pub fn next_deadline(&self) -> Instant {
        match self.phase {
            TransitionPhase::Scheduled => self.swap_at,
            TransitionPhase::Moving => self.commit_at,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_deadline() <= now
    }
}

/// A minimize or restore call held back until the in-flight transition
/// on the same window commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleRequest {
    Minimize,
    Restore,
}

impl LifecycleRequest {
    pub fn kind(self) -> TransitionKind {
        match self {
            LifecycleRequest::Minimize => TransitionKind::Minimize,
            LifecycleRequest::Restore => TransitionKind::Restore,
        }
    }

    pub(crate) fn op(self) -> &'static str {
        match self {
            LifecycleRequest::Minimize => "minimize",
            LifecycleRequest::Restore => "restore",
        }
    }
}

/// What an accepted `minimize`/`restore` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A new transition is in flight.
    Started,
    /// Held until the in-flight transition commits.
    Queued,
    /// The in-flight transition was cancelled and the window already sits
    /// in the requested state.
    Settled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_follow_delay_then_duration() {
        let t0 = Instant::now();
        let mut pending = PendingTransition::new(
            TransitionKind::Minimize,
            t0,
            Duration::from_millis(50),
            Duration::from_millis(250),
            Bounds::default(),
        );
        assert_eq!(pending.next_deadline(), t0 + Duration::from_millis(50));
        assert!(!pending.is_due(t0 + Duration::from_millis(49)));
        assert!(pending.is_due(t0 + Duration::from_millis(50)));

        pending.phase = TransitionPhase::Moving;
        assert_eq!(pending.next_deadline(), t0 + Duration::from_millis(250));
    }

    #[test]
    fn swap_never_lands_after_commit() {
        let t0 = Instant::now();
        let pending = PendingTransition::new(
            TransitionKind::Restore,
            t0,
            Duration::from_millis(400),
            Duration::from_millis(100),
            Bounds::default(),
        );
        assert_eq!(pending.swap_at, pending.commit_at);
    }

    #[test]
    fn kinds_map_between_states() {
        assert_eq!(TransitionKind::Minimize.target_state(), WindowState::Minimized);
        assert_eq!(TransitionKind::Restore.origin_state(), WindowState::Minimized);
        assert_eq!(LifecycleRequest::Restore.kind(), TransitionKind::Restore);
    }
}
