//! # Move Assistant
//!
//! Players can ask for help while a session is running. Questions about the
//! next move are answered locally by the puzzle's solver; anything else goes
//! to a pluggable text-completion collaborator (a language model in the
//! desktop games) on a background task, so the game loop keeps running
//! while the answer is generated.
//!
//! The answer lands in the session's [`SuggestionSlot`], which the game
//! polls once per frame and consumes exactly once.

use std::future::Future;
use std::sync::Arc;

use log::debug;
use serde_json::json;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use super::session::GameSession;
use crate::puzzles::hint::no_hint_message;
use crate::puzzles::Puzzle;

pub const INITIAL_INSTRUCTION: &str = "Eres un asistente útil. Responde de forma concisa y concreta.";

/// Shown when the collaborator only echoes the prompt or says nothing.
pub const FALLBACK_REPLY: &str = "Lo siento, no puedo sugerir nada más ahora.";

/// Substrings that mark a question as a request for the next move.
pub const MOVE_KEYWORDS: [&str; 7] = [
    "suger",
    "siguiente",
    "movimiento",
    "posición",
    "hint",
    "next",
    "move",
];

/// A text-completion backend.
pub trait Completion: Send + Sync + 'static {
    /// Complete `prompt`; errors are reported to the player as text.
    fn complete(&self, prompt: String) -> impl Future<Output = Result<String, String>> + Send;
}

/// Prefix the player's question with the assistant instruction.
pub fn build_prompt(question: &str) -> String {
    format!("{INITIAL_INSTRUCTION}\n{question}")
}

/// Keep only the first line of a completion. Empty lines and lines that
/// merely repeat part of the prompt become [`FALLBACK_REPLY`].
pub fn clean_completion(prompt: &str, raw: &str) -> String {
    let first = raw.trim().lines().next().unwrap_or_default().trim();
    if first.is_empty() || prompt.to_lowercase().contains(&first.to_lowercase()) {
        FALLBACK_REPLY.to_string()
    } else {
        first.to_string()
    }
}

pub fn is_move_question(question: &str) -> bool {
    let question = question.to_lowercase();
    MOVE_KEYWORDS.iter().any(|keyword| question.contains(keyword))
}

/// A suggestion being generated in the background.
pub struct SuggestionHandle {
    task: JoinHandle<()>,
    reply: oneshot::Receiver<String>,
}

impl SuggestionHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop generating; the reply is never delivered.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the reply. `None` if the task was aborted or panicked.
    pub async fn wait(self) -> Option<String> {
        self.reply.await.ok()
    }
}

/// Run `collaborator` on a background task for `prompt`.
///
/// Must be called inside a Tokio runtime.
pub fn spawn_suggestion<C: Completion>(collaborator: Arc<C>, prompt: String) -> SuggestionHandle {
    let (tx, rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let text = match collaborator.complete(prompt.clone()).await {
            Ok(raw) => clean_completion(&prompt, &raw),
            Err(e) => format!("Error IA: {e}"),
        };
        // The slot may have been cleared in the meantime.
        let _ = tx.send(text);
    });

    SuggestionHandle { task, reply: rx }
}

/// Holds at most one pending or ready suggestion for a session.
#[derive(Default)]
pub struct SuggestionSlot {
    pending: Option<SuggestionHandle>,
    ready: Option<String>,
}

impl SuggestionSlot {
    /// Replace whatever the slot held with a background request.
    pub fn request(&mut self, handle: SuggestionHandle) {
        self.clear();
        self.pending = Some(handle);
    }

    /// Replace whatever the slot held with an immediate answer.
    pub fn set_ready(&mut self, text: String) {
        self.clear();
        self.ready = Some(text);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking check: move a finished reply into the slot. True when a
    /// suggestion is ready to [`take`](Self::take).
    pub fn poll(&mut self) -> bool {
        if let Some(handle) = self.pending.as_mut() {
            match handle.reply.try_recv() {
                Ok(text) => {
                    self.pending = None;
                    self.ready = Some(text);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => self.pending = None,
            }
        }
        self.ready.is_some()
    }

    /// Consume the ready suggestion, if any. Never blocks.
    pub fn take(&mut self) -> Option<String> {
        self.poll();
        self.ready.take()
    }

    /// Wait for the current suggestion, consuming it.
    pub async fn wait(&mut self) -> Option<String> {
        if let Some(text) = self.ready.take() {
            return Some(text);
        }
        self.pending.take()?.wait().await
    }

    /// Drop the stored suggestion and cancel any request in flight.
    pub fn clear(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.ready = None;
    }
}

impl Drop for SuggestionSlot {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Routes player questions to the local solver or the collaborator.
pub struct Assistant<C> {
    collaborator: Arc<C>,
}

impl<C: Completion> Assistant<C> {
    pub fn new(collaborator: Arc<C>) -> Self {
        Self { collaborator }
    }

    /// Answer `question` into the session's suggestion slot.
    ///
    /// Move questions are answered immediately from the solver; other
    /// questions start a background completion.
    pub fn ask<P: Puzzle>(&self, session: &mut GameSession<P>, question: &str) {
        if is_move_question(question) {
            let query = session.puzzle().hint_query();
            let hint = if session.is_finished() { None } else { query.answer() };
            let text = match hint {
                Some(hint) => hint.describe(),
                None => no_hint_message(query.kind()).to_string(),
            };
            debug!("Answering move question locally: {}", text);
            session.suggestions().set_ready(text);
        } else {
            let handle = spawn_suggestion(Arc::clone(&self.collaborator), build_prompt(question));
            session.suggestions().request(handle);
        }
    }

    /// Ask the collaborator about the current board, sent as JSON state.
    pub fn ask_about_board<P: Puzzle>(&self, session: &mut GameSession<P>) {
        let query = session.puzzle().hint_query();
        let state = json!({ "juego": query.kind().as_str(), "estado": query.to_state() });
        let handle = spawn_suggestion(Arc::clone(&self.collaborator), build_prompt(&state.to_string()));
        session.suggestions().request(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles::hanoi::Towers;
    use crate::puzzles::nqueens::NQueensBoard;
    use std::time::Duration;

    struct Canned(Result<String, String>);

    impl Completion for Canned {
        async fn complete(&self, _prompt: String) -> Result<String, String> {
            self.0.clone()
        }
    }

    /// Never answers within a test's lifetime.
    struct Stalled;

    impl Completion for Stalled {
        async fn complete(&self, _prompt: String) -> Result<String, String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".into())
        }
    }

    #[test]
    fn completion_cleanup() {
        let prompt = build_prompt("¿Qué hago ahora?");
        assert_eq!(clean_completion(&prompt, "  Prueba el centro.\nY luego...  "), "Prueba el centro.");
        assert_eq!(clean_completion(&prompt, "\n\n"), FALLBACK_REPLY);
        assert_eq!(clean_completion(&prompt, "eres un asistente útil."), FALLBACK_REPLY);
    }

    #[test]
    fn move_questions_are_recognised() {
        assert!(is_move_question("¿Me das una sugerencia?"));
        assert!(is_move_question("What's the NEXT move?"));
        assert!(!is_move_question("¿Quién inventó este juego?"));
    }

    #[tokio::test]
    async fn move_question_is_answered_locally() {
        let assistant = Assistant::new(Arc::new(Stalled));
        let mut session = GameSession::new(Towers::new(3).unwrap());

        assistant.ask(&mut session, "¿cuál es el siguiente movimiento?");
        assert!(session.suggestions().poll());
        assert_eq!(
            session.suggestions().take().as_deref(),
            Some("Mueve disco de pilar 1 a 3")
        );
        assert_eq!(session.suggestions().take(), None);
    }

    #[tokio::test]
    async fn move_question_without_solution() {
        let assistant = Assistant::new(Arc::new(Stalled));
        let mut session = GameSession::new(NQueensBoard::new(3).unwrap());

        assistant.ask(&mut session, "sugerencia por favor");
        assert_eq!(
            session.suggestions().take().as_deref(),
            Some("No hay solución desde esta posición.")
        );
    }

    #[tokio::test]
    async fn free_question_goes_to_collaborator() {
        let assistant = Assistant::new(Arc::new(Canned(Ok("Paciencia.\nMucha.".into()))));
        let mut session = GameSession::new(Towers::new(3).unwrap());

        assistant.ask(&mut session, "¿Algún consejo?");
        assert!(session.suggestions().is_pending());
        assert_eq!(session.suggestions().wait().await.as_deref(), Some("Paciencia."));
        assert!(!session.suggestions().poll());
        assert_eq!(session.suggestions().take(), None);
    }

    #[tokio::test]
    async fn collaborator_failure_is_shown_as_text() {
        let assistant = Assistant::new(Arc::new(Canned(Err("model not loaded".into()))));
        let mut session = GameSession::new(Towers::new(3).unwrap());

        assistant.ask_about_board(&mut session);
        assert_eq!(
            session.suggestions().wait().await.as_deref(),
            Some("Error IA: model not loaded")
        );
    }

    #[tokio::test]
    async fn poll_does_not_block_on_slow_collaborator() {
        let mut slot = SuggestionSlot::default();
        slot.request(spawn_suggestion(Arc::new(Stalled), build_prompt("hola")));

        assert!(!slot.poll());
        assert!(slot.is_pending());

        slot.clear();
        assert!(!slot.is_pending());
        assert_eq!(slot.take(), None);
    }

    #[tokio::test]
    async fn finishing_the_session_cancels_pending_suggestion() {
        let assistant = Assistant::new(Arc::new(Stalled));
        let mut session = GameSession::new(Towers::new(3).unwrap());

        assistant.ask(&mut session, "¿Cuántos años tiene el juego?");
        assert!(session.suggestions().is_pending());
        session.abandon();
        assert!(!session.suggestions().is_pending());
    }
}
