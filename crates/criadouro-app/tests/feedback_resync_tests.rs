//! Integration tests for feedback reconciliation with refreshed server state.

use criadouro_core::{Feedback, Rating};
use criadouro_feedback::{FeedbackMachine, FeedbackPhase};

#[test]
fn feedback_resync_tests_server_rating_wins_after_refresh() {
    let mut machine = FeedbackMachine::from_server(1, &Feedback::default());
    machine.tap_rating(true).expect("tap should work");

    machine.resync(&Feedback {
        rating: Rating::Disliked,
        comment: Some("refetch".to_string()),
    });

    assert_eq!(machine.phase(), FeedbackPhase::Submitted);
    let committed = machine.submitted().expect("committed value should exist");
    assert_eq!(committed.rating, Rating::Disliked);
    assert_eq!(committed.comment.as_deref(), Some("refetch"));
}

#[test]
fn feedback_resync_tests_keeps_unconfirmed_local_edit() {
    let mut machine = FeedbackMachine::from_server(1, &Feedback::default());
    machine.tap_rating(true).expect("tap should work");
    machine.set_comment("rascunho").expect("comment should set");

    machine.resync(&Feedback::default());

    assert_eq!(machine.phase(), FeedbackPhase::RatingChosen);
    assert_eq!(machine.pending().expect("pending").comment, "rascunho");
}

#[test]
fn feedback_resync_tests_unconfirmed_commit_reverts_to_unrated() {
    let mut machine = FeedbackMachine::from_server(1, &Feedback::default());
    machine.tap_rating(true).expect("tap should work");
    machine.begin_submit().expect("submit should begin");
    machine.complete_submit().expect("submit should commit");

    // The next fetch still reports no rating: server truth wins.
    machine.resync(&Feedback::default());
    assert_eq!(machine.phase(), FeedbackPhase::Unrated);
}
