use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::bridge::{AssistantBridge, SERVICE_ERROR_FALLBACK};
use super::conversation::{ConversationLog, Role};
use crate::data::Organization;

/// Why a question was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// A previous question is still waiting for its answer
    Busy,
    /// Nothing but whitespace was typed
    EmptyQuestion,
}

/// At most one outstanding assistant request.
///
/// `begin` records the user's message before anything is sent, so the log
/// shows the question even if the answer never comes. `finish` records the
/// answer and frees the slot.
#[derive(Debug, Clone, Default)]
pub struct AssistantSlot {
    started: Option<Instant>,
}

impl AssistantSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whitespace only counts for the emptiness check; the question is
    /// logged and sent exactly as typed.
    pub fn begin(&mut self, question: &str, log: &mut ConversationLog) -> Result<String, SubmitRejected> {
        if self.started.is_some() {
            warn!(target: "assistant", "Question ignored, previous one still pending");
            return Err(SubmitRejected::Busy);
        }
        if question.trim().is_empty() {
            return Err(SubmitRejected::EmptyQuestion);
        }

        log.append(Role::User, question);
        self.started = Some(Instant::now());
        Ok(question.to_string())
    }

    /// Record the answer. Returns false if nothing was in flight.
    pub fn finish(&mut self, reply: &str, log: &mut ConversationLog) -> bool {
        match self.started.take() {
            Some(started) => {
                debug!(target: "assistant", "Answer received after {:?}", started.elapsed());
                log.append(Role::Assistant, reply);
                true
            }
            None => false,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.started.is_some()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.started.map(|started| started.elapsed())
    }
}

/// Runs bridge calls on a tokio runtime and hands the answer back to the
/// single-threaded UI loop through [`AssistantSession::poll`].
pub struct AssistantSession {
    bridge: AssistantBridge,
    runtime: Handle,
    slot: AssistantSlot,
    pending: Option<oneshot::Receiver<String>>,
}

impl AssistantSession {
    pub fn new(bridge: AssistantBridge, runtime: Handle) -> Self {
        Self {
            bridge,
            runtime,
            slot: AssistantSlot::new(),
            pending: None,
        }
    }

    /// Send `question` with a snapshot of the visible organizations.
    /// A second call while one is outstanding is a no-op.
    pub fn submit(
        &mut self,
        question: &str,
        context: Vec<Organization>,
        log: &mut ConversationLog,
    ) -> Result<(), SubmitRejected> {
        let question = self.slot.begin(question, log)?;
        let bridge = self.bridge.clone();
        let (tx, rx) = oneshot::channel();

        self.runtime.spawn(async move {
            let view: Vec<&Organization> = context.iter().collect();
            let reply = bridge.ask(&question, &view).await;
            // The receiver is gone only if the app is shutting down
            let _ = tx.send(reply);
        });

        self.pending = Some(rx);
        Ok(())
    }

    /// Collect a finished answer, if any. Returns true when the log changed.
    pub fn poll(&mut self, log: &mut ConversationLog) -> bool {
        let Some(rx) = self.pending.as_mut() else {
            return false;
        };

        let reply = match rx.try_recv() {
            Ok(reply) => reply,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => {
                warn!(target: "assistant", "Assistant task ended without a reply");
                SERVICE_ERROR_FALLBACK.to_string()
            }
        };

        self.pending = None;
        self.slot.finish(&reply, log)
    }

    pub fn is_in_flight(&self) -> bool {
        self.slot.is_in_flight()
    }

    pub fn slot(&self) -> &AssistantSlot {
        &self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_rejected_while_pending() {
        let mut log = ConversationLog::with_welcome();
        let mut slot = AssistantSlot::new();

        assert_eq!(slot.begin("де знайти притулок?", &mut log), Ok("де знайти притулок?".to_string()));
        assert_eq!(slot.begin("ще одне", &mut log), Err(SubmitRejected::Busy));
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().text, "де знайти притулок?");

        assert!(slot.finish("Відповідь", &mut log));
        assert!(!slot.is_in_flight());
        assert_eq!(log.len(), 3);
        assert!(slot.begin("ще одне", &mut log).is_ok());
    }

    #[test]
    fn test_question_is_kept_as_typed() {
        let mut log = ConversationLog::new();
        let mut slot = AssistantSlot::new();
        let typed = "  Притулок у Херсоні?\n";
        assert_eq!(slot.begin(typed, &mut log), Ok(typed.to_string()));
        assert_eq!(log.last().unwrap().text, typed);
    }

    #[test]
    fn test_empty_question_rejected() {
        let mut log = ConversationLog::new();
        let mut slot = AssistantSlot::new();
        assert_eq!(slot.begin("   ", &mut log), Err(SubmitRejected::EmptyQuestion));
        assert!(log.is_empty());
        assert!(!slot.is_in_flight());
    }

    #[test]
    fn test_finish_without_request_is_ignored() {
        let mut log = ConversationLog::new();
        let mut slot = AssistantSlot::new();
        assert!(!slot.finish("stray", &mut log));
        assert!(log.is_empty());
    }
}
