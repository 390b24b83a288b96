// Interaction controller: turns user commands into backend calls and keeps
// the latest outcome of each workflow for the UI to render.
//
// Each workflow (health, build, ask) moves Idle -> Pending -> Success or
// Failure, and a new invocation replaces the previous outcome entirely.

use tracing::info;

use crate::api::{AskResponse, Backend, IndexSummary};
use crate::document::UploadedDocument;
use crate::error::ClientError;

/// Discrete user actions dispatched to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CheckHealth,
    BuildIndex,
    Ask(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState<T> {
    Idle,
    Pending,
    Success(T),
    Failure(ClientError),
}

/// Latest state of a single workflow.
#[derive(Debug, Clone)]
pub struct Workflow<T> {
    state: WorkflowState<T>,
}

impl<T> Default for Workflow<T> {
    fn default() -> Self {
        Self {
            state: WorkflowState::Idle,
        }
    }
}

impl<T> Workflow<T> {
    pub fn state(&self) -> &WorkflowState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, WorkflowState::Pending)
    }

    /// Enter `Pending`, discarding the previous outcome. Returns false if
    /// an invocation is already outstanding.
    pub fn begin(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        self.state = WorkflowState::Pending;
        true
    }

    pub fn finish(&mut self, outcome: Result<T, ClientError>) {
        self.state = match outcome {
            Ok(value) => WorkflowState::Success(value),
            Err(err) => WorkflowState::Failure(err),
        };
    }
}

/// Borrowed view of the workflow a command just ran.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    Health(&'a WorkflowState<HealthStatus>),
    Build(&'a WorkflowState<IndexSummary>),
    Ask(&'a WorkflowState<AskResponse>),
}

pub struct Controller<B: Backend> {
    backend: B,
    documents: Vec<UploadedDocument>,
    health: Workflow<HealthStatus>,
    build: Workflow<IndexSummary>,
    ask: Workflow<AskResponse>,
}

impl<B: Backend> Controller<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            documents: Vec::new(),
            health: Workflow::default(),
            build: Workflow::default(),
            ask: Workflow::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    /// Select a document for the next build. A document with the same
    /// filename replaces the earlier selection.
    pub fn add_document(&mut self, document: UploadedDocument) {
        match self
            .documents
            .iter_mut()
            .find(|d| d.filename() == document.filename())
        {
            Some(existing) => *existing = document,
            None => self.documents.push(document),
        }
    }

    pub fn clear_documents(&mut self) {
        self.documents.clear();
    }

    pub fn health(&self) -> &WorkflowState<HealthStatus> {
        self.health.state()
    }

    pub fn build(&self) -> &WorkflowState<IndexSummary> {
        self.build.state()
    }

    pub fn ask(&self) -> &WorkflowState<AskResponse> {
        self.ask.state()
    }

    /// Run one command to completion and return the resulting state.
    pub fn dispatch(&mut self, command: Command) -> View<'_> {
        match command {
            Command::CheckHealth => {
                if self.health.begin() {
                    let status = if self.backend.health_check() {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Unreachable
                    };
                    info!(?status, "health check finished");
                    self.health.finish(Ok(status));
                }
                View::Health(self.health.state())
            }
            Command::BuildIndex => {
                if self.build.begin() {
                    let outcome = if self.documents.is_empty() {
                        Err(ClientError::NoDocuments)
                    } else {
                        self.backend.build_index(&mut self.documents)
                    };
                    if let Ok(summary) = &outcome {
                        info!(chunks = summary.chunks, "index rebuilt");
                    }
                    self.build.finish(outcome);
                }
                View::Build(self.build.state())
            }
            Command::Ask(question) => {
                if self.ask.begin() {
                    let outcome = if question.trim().is_empty() {
                        Err(ClientError::EmptyQuestion)
                    } else {
                        self.backend.ask(&question)
                    };
                    self.ask.finish(outcome);
                }
                View::Ask(self.ask.state())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChunkMetadata, ChunkRecord};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeBackend {
        healthy: bool,
        health_calls: Cell<usize>,
        build_calls: Cell<usize>,
        ask_calls: Cell<usize>,
        uploaded: RefCell<Vec<Vec<String>>>,
        build_result: Option<Result<IndexSummary, ClientError>>,
        ask_result: Option<Result<AskResponse, ClientError>>,
    }

    impl Backend for FakeBackend {
        fn base_url(&self) -> &str {
            "http://fake"
        }

        fn health_check(&self) -> bool {
            self.health_calls.set(self.health_calls.get() + 1);
            self.healthy
        }

        fn build_index(&self, documents: &mut [UploadedDocument]) -> Result<IndexSummary, ClientError> {
            self.build_calls.set(self.build_calls.get() + 1);
            self.uploaded
                .borrow_mut()
                .push(documents.iter().map(|d| d.filename().to_string()).collect());
            self.build_result.clone().unwrap_or(Ok(IndexSummary { chunks: 1 }))
        }

        fn ask(&self, _question: &str) -> Result<AskResponse, ClientError> {
            self.ask_calls.set(self.ask_calls.get() + 1);
            self.ask_result.clone().unwrap_or(Ok(AskResponse::default()))
        }
    }

    #[test]
    fn health_renders_two_states() {
        let mut c = Controller::new(FakeBackend {
            healthy: true,
            ..Default::default()
        });
        assert_eq!(c.health(), &WorkflowState::Idle);
        c.dispatch(Command::CheckHealth);
        assert_eq!(c.health(), &WorkflowState::Success(HealthStatus::Healthy));

        let mut c = Controller::new(FakeBackend::default());
        c.dispatch(Command::CheckHealth);
        assert_eq!(c.health(), &WorkflowState::Success(HealthStatus::Unreachable));
    }

    #[test]
    fn build_without_documents_never_calls_backend() {
        let mut c = Controller::new(FakeBackend::default());
        match c.dispatch(Command::BuildIndex) {
            View::Build(WorkflowState::Failure(err)) => assert!(err.is_validation()),
            other => panic!("unexpected view: {:?}", other),
        }
        assert_eq!(c.backend().build_calls.get(), 0);
    }

    #[test]
    fn blank_question_never_calls_backend() {
        let mut c = Controller::new(FakeBackend::default());
        for q in ["", "   ", "\n\t"] {
            c.dispatch(Command::Ask(q.to_string()));
            assert_eq!(c.ask(), &WorkflowState::Failure(ClientError::EmptyQuestion));
        }
        assert_eq!(c.backend().ask_calls.get(), 0);
    }

    #[test]
    fn new_outcome_replaces_previous_one() {
        let mut c = Controller::new(FakeBackend {
            build_result: Some(Ok(IndexSummary { chunks: 42 })),
            ..Default::default()
        });
        c.dispatch(Command::BuildIndex);
        assert!(matches!(c.build(), WorkflowState::Failure(ClientError::NoDocuments)));

        c.add_document(UploadedDocument::pdf("a.pdf", b"%PDF".to_vec()));
        c.dispatch(Command::BuildIndex);
        assert_eq!(c.build(), &WorkflowState::Success(IndexSummary { chunks: 42 }));
    }

    #[test]
    fn repeated_builds_send_current_selection_each_time() {
        let mut c = Controller::new(FakeBackend::default());
        c.add_document(UploadedDocument::pdf("a.pdf", b"1".to_vec()));
        c.add_document(UploadedDocument::pdf("b.pdf", b"2".to_vec()));
        c.dispatch(Command::BuildIndex);
        c.dispatch(Command::BuildIndex);

        let uploads = c.backend().uploaded.borrow();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0], vec!["a.pdf", "b.pdf"]);
        assert_eq!(uploads[0], uploads[1]);
    }

    #[test]
    fn same_filename_replaces_selection() {
        let mut c = Controller::new(FakeBackend::default());
        c.add_document(UploadedDocument::pdf("a.pdf", b"old".to_vec()));
        c.add_document(UploadedDocument::pdf("a.pdf", b"newer".to_vec()));
        assert_eq!(c.documents().len(), 1);
        assert_eq!(c.documents()[0].len(), 5);

        c.clear_documents();
        assert!(c.documents().is_empty());
    }

    #[test]
    fn backend_errors_surface_as_failure() {
        let err = ClientError::Backend {
            status: 500,
            detail: "index corrupt".into(),
        };
        let mut c = Controller::new(FakeBackend {
            ask_result: Some(Err(err.clone())),
            ..Default::default()
        });
        c.dispatch(Command::Ask("What is X?".into()));
        assert_eq!(c.ask(), &WorkflowState::Failure(err));
        assert_eq!(c.backend().ask_calls.get(), 1);
    }

    #[test]
    fn ask_success_keeps_chunk_order() {
        let answer = AskResponse {
            answer: "X".into(),
            context: "Y".into(),
            chunks: (0..3)
                .map(|i| ChunkRecord {
                    text: format!("t{}", i),
                    metadata: ChunkMetadata {
                        source_file: "a.pdf".into(),
                        chunk_index: 10 - i,
                    },
                })
                .collect(),
        };
        let mut c = Controller::new(FakeBackend {
            ask_result: Some(Ok(answer.clone())),
            ..Default::default()
        });
        match c.dispatch(Command::Ask("What is X?".into())) {
            View::Ask(WorkflowState::Success(resp)) => assert_eq!(resp, &answer),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn workflow_refuses_reentry_while_pending() {
        let mut w: Workflow<u8> = Workflow::default();
        assert!(w.begin());
        assert!(!w.begin());
        w.finish(Ok(1));
        assert_eq!(w.state(), &WorkflowState::Success(1));
        assert!(w.begin());
        assert!(w.is_pending());
    }
}
