//! Instrumented coordination client shared by the module tests

use crate::traits::{CoordinationClient, CoordinationError, NodeMode};

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// What a sequential create does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CreateBehavior {
    Succeed,
    Fail,
    /// Never returns
    Hang,
}

/// Non-create calls, recorded in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MockCall {
    Exists,
    CreateRoot,
    CountChildren,
    Close,
}

pub(crate) struct MockCoordinationClient {
    behavior: CreateBehavior,
    delay: Option<Duration>,
    fail_exists: bool,
    fail_count: bool,
    /// `exists` reports absent but the root create hits NodeExists
    lose_root_race: bool,
    root_exists: AtomicBool,
    create_attempts: AtomicUsize,
    children: AtomicUsize,
    last_child_at: Mutex<Option<Instant>>,
    calls: Mutex<Vec<(MockCall, Instant)>>,
    attempts_at_count: Mutex<Option<usize>>,
}

impl MockCoordinationClient {
    pub(crate) fn new(behavior: CreateBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            fail_exists: false,
            fail_count: false,
            lose_root_race: false,
            root_exists: AtomicBool::new(false),
            create_attempts: AtomicUsize::new(0),
            children: AtomicUsize::new(0),
            last_child_at: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            attempts_at_count: Mutex::new(None),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn with_existing_root(self) -> Self {
        self.root_exists.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_failing_exists(mut self) -> Self {
        self.fail_exists = true;
        self
    }

    pub(crate) fn with_failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub(crate) fn with_lost_root_race(mut self) -> Self {
        self.lose_root_race = true;
        self
    }

    pub(crate) fn create_attempts(&self) -> usize {
        self.create_attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn children(&self) -> usize {
        self.children.load(Ordering::SeqCst)
    }

    pub(crate) fn last_child_at(&self) -> Option<Instant> {
        *self.last_child_at.lock().unwrap()
    }

    /// Create attempts the fake had observed when the count was queried
    pub(crate) fn attempts_at_count(&self) -> Option<usize> {
        *self.attempts_at_count.lock().unwrap()
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().iter().map(|(c, _)| *c).collect()
    }

    pub(crate) fn call_time(&self, call: MockCall) -> Option<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| *c == call)
            .map(|(_, at)| *at)
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }
}

#[async_trait]
impl CoordinationClient for MockCoordinationClient {
    fn backend_name(&self) -> &str {
        "mock"
    }

    fn endpoint(&self) -> &str {
        "mock:2181"
    }

    async fn exists(&self, _path: &str) -> Result<bool, CoordinationError> {
        self.record(MockCall::Exists);
        if self.fail_exists {
            return Err(CoordinationError::Connection("simulated loss".into()));
        }
        Ok(self.root_exists.load(Ordering::SeqCst))
    }

    async fn create(
        &self,
        path: &str,
        _data: Vec<u8>,
        mode: NodeMode,
    ) -> Result<String, CoordinationError> {
        if mode == NodeMode::Persistent {
            self.record(MockCall::CreateRoot);
            if self.lose_root_race || self.root_exists.swap(true, Ordering::SeqCst) {
                return Err(CoordinationError::NodeExists(path.to_string()));
            }
            return Ok(path.to_string());
        }

        self.create_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.behavior {
            CreateBehavior::Succeed => {
                let seq = self.children.fetch_add(1, Ordering::SeqCst);
                *self.last_child_at.lock().unwrap() = Some(Instant::now());
                Ok(format!("{path}{seq:010}"))
            }
            CreateBehavior::Fail => Err(CoordinationError::Remote("simulated failure".into())),
            CreateBehavior::Hang => {
                futures::future::pending::<()>().await;
                unreachable!("pending never resolves")
            }
        }
    }

    async fn count_children(&self, path: &str) -> Result<usize, CoordinationError> {
        self.record(MockCall::CountChildren);
        *self.attempts_at_count.lock().unwrap() = Some(self.create_attempts());
        if self.fail_count {
            return Err(CoordinationError::NoNode(path.to_string()));
        }
        Ok(self.children())
    }

    async fn close(&self) -> Result<(), CoordinationError> {
        self.record(MockCall::Close);
        Ok(())
    }
}
