use crate::state::Metadata;
use iacguard_types::{Range, Status};

/// One verdict recorded by a check, before rule identity is attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub message: String,
    pub range: Range,
}

/// Collector handed to native checks.
#[derive(Clone, Debug, Default)]
pub struct Outcomes {
    items: Vec<Outcome>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure attributed to `metadata`.
    pub fn add(&mut self, message: impl Into<String>, metadata: &Metadata) {
        self.push(Status::Failed, message.into(), metadata);
    }

    pub fn add_passed(&mut self, metadata: &Metadata) {
        self.push(Status::Passed, String::new(), metadata);
    }

    /// Record that the subject could not be judged (e.g. a malformed value).
    pub fn add_unknown(&mut self, message: impl Into<String>, metadata: &Metadata) {
        self.push(Status::Unknown, message.into(), metadata);
    }

    fn push(&mut self, status: Status, message: String, metadata: &Metadata) {
        self.items.push(Outcome {
            status,
            message,
            range: metadata.range.clone(),
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Outcome> {
        self.items
    }
}
