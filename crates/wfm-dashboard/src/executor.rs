//! Outbound interface to whatever shell displays navigation actions

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::Write;
use tracing::info;
use wfm_core::{ActionRequest, Error, Result};

/// Host capability that opens a navigation action
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Open `action`
    async fn execute_action(&self, action: ActionRequest) -> Result<()>;
}

/// Executor that writes each action as one line of JSON
pub struct JsonLinesExecutor<W> {
    out: Mutex<W>,
}

impl<W> std::fmt::Debug for JsonLinesExecutor<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExecutor").finish_non_exhaustive()
    }
}

impl<W: Write + Send> JsonLinesExecutor<W> {
    /// Wrap a writer
    pub const fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl JsonLinesExecutor<std::io::Stdout> {
    /// Executor printing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> ActionExecutor for JsonLinesExecutor<W> {
    async fn execute_action(&self, action: ActionRequest) -> Result<()> {
        let line = serde_json::to_string(&action)?;
        info!(action = %action.summary(), "Executing action");

        let mut out = self.out.lock();
        writeln!(out, "{line}")
            .and_then(|()| out.flush())
            .map_err(|e| Error::action_execution(e.to_string()))
    }
}

/// Executor that keeps every action it receives
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    actions: Mutex<Vec<ActionRequest>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingExecutor {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock() = Some(message.into());
    }

    /// Actions received so far
    pub fn actions(&self) -> Vec<ActionRequest> {
        self.actions.lock().clone()
    }

    /// Most recent action
    pub fn last(&self) -> Option<ActionRequest> {
        self.actions.lock().last().cloned()
    }
}

#[async_trait]
impl ActionExecutor for RecordingExecutor {
    async fn execute_action(&self, action: ActionRequest) -> Result<()> {
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(Error::action_execution(message));
        }
        self.actions.lock().push(action);
        Ok(())
    }
}
