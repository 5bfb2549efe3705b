//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use criadouro_feedback::{FeedbackError, FeedbackSubmission, FeedbackSubmitter};
use criadouro_gateway::{BackendConfig, GatewayError, HttpRequest, HttpResponse, HttpTransport};
use criadouro_session::{MemorySessionStorage, Session, UserProfile};

/// One scripted transport reply.
#[allow(dead_code)]
pub enum CannedReply {
    /// Respond with this status and body.
    Status(u16, String),
    /// Fail as a network error.
    Network(String),
}

/// Transport fake: records requests, replays scripted replies in order.
///
/// Once the script is exhausted, replies default to `200 {}`.
pub struct FakeTransport {
    replies: Mutex<VecDeque<CannedReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new(replies: Vec<CannedReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(status: u16, body: &str) -> Arc<Self> {
        Self::new(vec![CannedReply::Status(status, body.to_string())])
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(vec![CannedReply::Network(message.to_string())])
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request lock should work").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request lock should work").len()
    }
}

impl HttpTransport for FakeTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        self.requests
            .lock()
            .expect("request lock should work")
            .push(request);

        match self
            .replies
            .lock()
            .expect("reply lock should work")
            .pop_front()
        {
            Some(CannedReply::Status(status, body)) => Ok(HttpResponse { status, body }),
            Some(CannedReply::Network(message)) => Err(GatewayError::Network(message)),
            None => Ok(HttpResponse {
                status: 200,
                body: "{}".to_string(),
            }),
        }
    }
}

/// Feedback submitter fake: records submissions, replays scripted outcomes.
pub struct ScriptedSubmitter {
    outcomes: Mutex<VecDeque<Result<(), String>>>,
    submissions: Mutex<Vec<FeedbackSubmission>>,
}

#[allow(dead_code)]
impl ScriptedSubmitter {
    pub fn succeeding() -> Self {
        Self::new(vec![Ok(())])
    }

    pub fn new(outcomes: Vec<Result<(), String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<FeedbackSubmission> {
        self.submissions
            .lock()
            .expect("submission lock should work")
            .clone()
    }
}

impl FeedbackSubmitter for ScriptedSubmitter {
    fn submit(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        self.submissions
            .lock()
            .expect("submission lock should work")
            .push(submission.clone());

        match self
            .outcomes
            .lock()
            .expect("outcome lock should work")
            .pop_front()
        {
            Some(Ok(())) | None => Ok(()),
            Some(Err(message)) => Err(FeedbackError::Submission(message)),
        }
    }
}

/// Backend config against a test host.
#[allow(dead_code)]
pub fn backend_config() -> BackendConfig {
    BackendConfig::new("https://api.example.test").expect("test config should build")
}

/// Profile fixture used by session helpers.
#[allow(dead_code)]
pub fn profile_fixture() -> UserProfile {
    UserProfile {
        id: 10,
        email: "ana@example.com".to_string(),
        name: "Ana".to_string(),
    }
}

/// Session with a stored token and profile.
#[allow(dead_code)]
pub fn authenticated_session() -> Session {
    let session = Session::new(Arc::new(MemorySessionStorage::new()));
    session
        .save("token-fixture", &profile_fixture())
        .expect("session fixture should save");
    session
}

/// Session without any stored state.
#[allow(dead_code)]
pub fn empty_session() -> Session {
    Session::new(Arc::new(MemorySessionStorage::new()))
}
