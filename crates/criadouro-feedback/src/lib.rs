#![warn(missing_docs)]
//! # criadouro-feedback
//!
//! ## Purpose
//! Implements the per-result feedback submission state machine: collect one
//! thumbs up/down rating plus an optional comment, submit it at most once,
//! and reconcile with feedback the server may already hold.
//!
//! ## Responsibilities
//! - Model the legal transitions between unrated, rating-chosen, submitting,
//!   and submitted states.
//! - Enforce exactly one backend call per user confirmation through the
//!   [`FeedbackSubmitter`] port.
//! - Re-synchronize from refreshed server state without clobbering an
//!   in-flight submission.
//!
//! ## Data flow
//! Server feedback seeds [`FeedbackMachine::from_server`] -> user events
//! mutate the machine -> [`drive_submit`] executes the confirmation through
//! a submitter -> the finalized value is reported upward for list views.
//!
//! ## Ownership and lifetimes
//! The machine owns its pending text; submitters are borrowed only for the
//! duration of one confirmation.
//!
//! ## Error model
//! Illegal user transitions and backend failures surface as
//! [`FeedbackError`]. A failed submission is retryable: the machine returns
//! to the editable state with pending values intact.
//!
//! ## Security and privacy notes
//! Comment text is user content; this crate never logs it.

use criadouro_core::{Feedback, Rating};
use thiserror::Error;

/// Observable phase of the feedback machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackPhase {
    /// No rating yet; rating buttons active, comment hidden.
    Unrated,
    /// Rating tapped but not confirmed; comment and cancel/confirm visible.
    RatingChosen,
    /// Submission in flight; all controls disabled, not cancellable.
    Submitting,
    /// Rating committed; controls read-only, terminal for this instance.
    Submitted,
}

/// Rating plus comment being edited before confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFeedback {
    /// `true` for thumbs up, `false` for thumbs down.
    pub liked: bool,
    /// Comment draft; may be empty.
    pub comment: String,
}

/// Payload for one confirmed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSubmission {
    /// Result the feedback belongs to.
    pub result_id: u64,
    /// Confirmed rating value.
    pub like: bool,
    /// Comment text; always sent, empty string when blank.
    pub comment: String,
}

/// Finalized feedback reported upward after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedFeedback {
    /// Committed rating.
    pub rating: Rating,
    /// Committed comment; `None` when blank.
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MachineState {
    Unrated,
    RatingChosen { pending: PendingFeedback },
    Submitting { pending: PendingFeedback },
    Submitted { rating: Rating, comment: Option<String> },
}

/// Port through which one confirmation reaches the backend.
pub trait FeedbackSubmitter: Send + Sync {
    /// Sends one feedback submission.
    ///
    /// # Errors
    /// Returns [`FeedbackError::Submission`] on network/HTTP failure. The
    /// call must not retry internally.
    fn submit(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError>;
}

/// Feedback submission state machine for exactly one analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMachine {
    result_id: u64,
    state: MachineState,
}

impl FeedbackMachine {
    /// Seeds the machine from the feedback the server currently holds.
    ///
    /// A result that already carries a rating starts directly in
    /// [`FeedbackPhase::Submitted`]; rating and comment render read-only.
    pub fn from_server(result_id: u64, server: &Feedback) -> Self {
        let state = if server.rating.is_rated() {
            MachineState::Submitted {
                rating: server.rating,
                comment: server.comment.clone(),
            }
        } else {
            MachineState::Unrated
        };

        Self { result_id, state }
    }

    /// Returns the result this machine belongs to.
    pub fn result_id(&self) -> u64 {
        self.result_id
    }

    /// Returns the observable phase.
    pub fn phase(&self) -> FeedbackPhase {
        match &self.state {
            MachineState::Unrated => FeedbackPhase::Unrated,
            MachineState::RatingChosen { .. } => FeedbackPhase::RatingChosen,
            MachineState::Submitting { .. } => FeedbackPhase::Submitting,
            MachineState::Submitted { .. } => FeedbackPhase::Submitted,
        }
    }

    /// Returns the pending edit while one exists.
    pub fn pending(&self) -> Option<&PendingFeedback> {
        match &self.state {
            MachineState::RatingChosen { pending } | MachineState::Submitting { pending } => {
                Some(pending)
            }
            _ => None,
        }
    }

    /// Returns the committed feedback once submitted.
    pub fn submitted(&self) -> Option<SubmittedFeedback> {
        match &self.state {
            MachineState::Submitted { rating, comment } => Some(SubmittedFeedback {
                rating: *rating,
                comment: comment.clone(),
            }),
            _ => None,
        }
    }

    /// Applies a tap on the like or dislike button.
    ///
    /// From `Unrated` this opens the comment step with an empty draft. While
    /// a rating is chosen but unconfirmed, tapping again switches the pending
    /// rating and keeps the comment draft.
    ///
    /// # Errors
    /// Returns [`FeedbackError::AlreadySubmitted`] once committed and
    /// [`FeedbackError::ControlsLocked`] while a submission is in flight.
    pub fn tap_rating(&mut self, liked: bool) -> Result<(), FeedbackError> {
        match &mut self.state {
            MachineState::Unrated => {
                self.state = MachineState::RatingChosen {
                    pending: PendingFeedback {
                        liked,
                        comment: String::new(),
                    },
                };
                Ok(())
            }
            MachineState::RatingChosen { pending } => {
                pending.liked = liked;
                Ok(())
            }
            MachineState::Submitting { .. } => Err(FeedbackError::ControlsLocked),
            MachineState::Submitted { .. } => Err(FeedbackError::AlreadySubmitted),
        }
    }

    /// Replaces the comment draft.
    ///
    /// # Errors
    /// Returns [`FeedbackError::NoPendingRating`] unless a rating is chosen
    /// and editable.
    pub fn set_comment(&mut self, text: impl Into<String>) -> Result<(), FeedbackError> {
        match &mut self.state {
            MachineState::RatingChosen { pending } => {
                pending.comment = text.into();
                Ok(())
            }
            MachineState::Submitting { .. } => Err(FeedbackError::ControlsLocked),
            _ => Err(FeedbackError::NoPendingRating),
        }
    }

    /// Discards the pending rating and comment, returning to `Unrated`.
    ///
    /// # Errors
    /// Returns [`FeedbackError::NotCancellable`] outside `RatingChosen`; an
    /// in-flight submission runs to completion or failure.
    pub fn cancel(&mut self) -> Result<(), FeedbackError> {
        match self.state {
            MachineState::RatingChosen { .. } => {
                self.state = MachineState::Unrated;
                Ok(())
            }
            _ => Err(FeedbackError::NotCancellable),
        }
    }

    /// Confirms the pending rating, locking controls for submission.
    ///
    /// # Errors
    /// Returns [`FeedbackError::NoPendingRating`] without a chosen rating,
    /// [`FeedbackError::ControlsLocked`] while in flight, and
    /// [`FeedbackError::AlreadySubmitted`] once committed.
    pub fn begin_submit(&mut self) -> Result<FeedbackSubmission, FeedbackError> {
        match &self.state {
            MachineState::RatingChosen { pending } => {
                let submission = FeedbackSubmission {
                    result_id: self.result_id,
                    like: pending.liked,
                    comment: pending.comment.clone(),
                };
                self.state = MachineState::Submitting {
                    pending: pending.clone(),
                };
                Ok(submission)
            }
            MachineState::Submitting { .. } => Err(FeedbackError::ControlsLocked),
            MachineState::Submitted { .. } => Err(FeedbackError::AlreadySubmitted),
            MachineState::Unrated => Err(FeedbackError::NoPendingRating),
        }
    }

    /// Commits the in-flight submission.
    ///
    /// # Errors
    /// Returns [`FeedbackError::NotSubmitting`] when no submission is in
    /// flight.
    pub fn complete_submit(&mut self) -> Result<SubmittedFeedback, FeedbackError> {
        match &self.state {
            MachineState::Submitting { pending } => {
                let rating = if pending.liked {
                    Rating::Liked
                } else {
                    Rating::Disliked
                };
                let comment = Some(pending.comment.clone())
                    .filter(|comment| !comment.trim().is_empty());
                let committed = SubmittedFeedback {
                    rating,
                    comment: comment.clone(),
                };
                self.state = MachineState::Submitted { rating, comment };
                Ok(committed)
            }
            _ => Err(FeedbackError::NotSubmitting),
        }
    }

    /// Restores the editable state after a failed submission.
    ///
    /// Pending rating and comment are preserved so the user can retry.
    ///
    /// # Errors
    /// Returns [`FeedbackError::NotSubmitting`] when no submission is in
    /// flight.
    pub fn fail_submit(&mut self) -> Result<(), FeedbackError> {
        match &self.state {
            MachineState::Submitting { pending } => {
                self.state = MachineState::RatingChosen {
                    pending: pending.clone(),
                };
                Ok(())
            }
            _ => Err(FeedbackError::NotSubmitting),
        }
    }

    /// Re-synchronizes the machine from refreshed server state.
    ///
    /// # Semantics
    /// The most recent server response is the source of truth:
    /// - server holds a rating -> machine becomes `Submitted` with the
    ///   server values, regardless of local state;
    /// - server holds no rating -> a locally committed `Submitted` reverts
    ///   to `Unrated` (the server never confirmed it), while an unconfirmed
    ///   pending edit is kept;
    /// - an in-flight submission is never interrupted; the refresh is
    ///   ignored and the submission outcome applies first.
    pub fn resync(&mut self, server: &Feedback) {
        if matches!(self.state, MachineState::Submitting { .. }) {
            return;
        }

        if server.rating.is_rated() {
            self.state = MachineState::Submitted {
                rating: server.rating,
                comment: server.comment.clone(),
            };
        } else if matches!(self.state, MachineState::Submitted { .. }) {
            self.state = MachineState::Unrated;
        }
    }
}

/// Executes one confirmation: exactly one submitter call per invocation.
///
/// On success the machine commits and the finalized feedback is returned for
/// parent views. On failure the machine returns to the editable state with
/// pending values intact and the error is propagated; nothing is retried.
///
/// # Errors
/// Propagates transition errors from the machine and
/// [`FeedbackError::Submission`] from the submitter.
pub fn drive_submit(
    machine: &mut FeedbackMachine,
    submitter: &dyn FeedbackSubmitter,
) -> Result<SubmittedFeedback, FeedbackError> {
    let submission = machine.begin_submit()?;

    match submitter.submit(&submission) {
        Ok(()) => machine.complete_submit(),
        Err(error) => {
            machine.fail_submit()?;
            Err(error)
        }
    }
}

/// Feedback machine and submission errors.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Feedback was already committed for this result.
    #[error("feedback was already submitted for this result")]
    AlreadySubmitted,
    /// A submission is in flight; controls are disabled.
    #[error("feedback submission is in flight")]
    ControlsLocked,
    /// Confirmation requires a chosen rating.
    #[error("no rating has been chosen")]
    NoPendingRating,
    /// Cancel is only possible before confirmation.
    #[error("feedback state cannot be cancelled")]
    NotCancellable,
    /// Completion/failure signalled without an in-flight submission.
    #[error("no feedback submission is in flight")]
    NotSubmitting,
    /// Backend rejected or never received the submission; retryable.
    #[error("feedback submission failed: {0}")]
    Submission(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for machine transitions.

    use super::*;

    fn unrated() -> Feedback {
        Feedback::default()
    }

    #[test]
    fn starts_unrated_without_server_rating() {
        let machine = FeedbackMachine::from_server(1, &unrated());
        assert_eq!(machine.phase(), FeedbackPhase::Unrated);
    }

    #[test]
    fn starts_submitted_with_server_rating() {
        let mut machine = FeedbackMachine::from_server(
            1,
            &Feedback {
                rating: Rating::Disliked,
                comment: Some("borrado".to_string()),
            },
        );
        assert_eq!(machine.phase(), FeedbackPhase::Submitted);
        assert!(machine.tap_rating(true).is_err());
    }

    #[test]
    fn retapping_switches_rating_and_keeps_comment() {
        let mut machine = FeedbackMachine::from_server(1, &unrated());
        machine.tap_rating(true).expect("tap should work");
        machine.set_comment("ok").expect("comment should set");
        machine.tap_rating(false).expect("retap should work");

        let pending = machine.pending().expect("pending should exist");
        assert!(!pending.liked);
        assert_eq!(pending.comment, "ok");
    }

    #[test]
    fn cancel_discards_pending_values() {
        let mut machine = FeedbackMachine::from_server(1, &unrated());
        machine.tap_rating(true).expect("tap should work");
        machine.set_comment("draft").expect("comment should set");
        machine.cancel().expect("cancel should work");

        assert_eq!(machine.phase(), FeedbackPhase::Unrated);
        machine.tap_rating(false).expect("tap should work");
        assert_eq!(machine.pending().expect("pending").comment, "");
    }

    #[test]
    fn failed_submit_restores_editable_state() {
        let mut machine = FeedbackMachine::from_server(1, &unrated());
        machine.tap_rating(true).expect("tap should work");
        machine.set_comment("ok").expect("comment should set");
        machine.begin_submit().expect("submit should begin");
        machine.fail_submit().expect("failure should restore");

        assert_eq!(machine.phase(), FeedbackPhase::RatingChosen);
        let pending = machine.pending().expect("pending should survive");
        assert!(pending.liked);
        assert_eq!(pending.comment, "ok");
    }

    #[test]
    fn resync_ignores_refresh_while_submitting() {
        let mut machine = FeedbackMachine::from_server(1, &unrated());
        machine.tap_rating(true).expect("tap should work");
        machine.begin_submit().expect("submit should begin");

        machine.resync(&Feedback {
            rating: Rating::Disliked,
            comment: None,
        });
        assert_eq!(machine.phase(), FeedbackPhase::Submitting);
    }

    #[test]
    fn resync_reverts_unconfirmed_local_commit() {
        let mut machine = FeedbackMachine::from_server(1, &unrated());
        machine.tap_rating(true).expect("tap should work");
        machine.begin_submit().expect("submit should begin");
        machine.complete_submit().expect("submit should commit");

        machine.resync(&unrated());
        assert_eq!(machine.phase(), FeedbackPhase::Unrated);
    }
}
