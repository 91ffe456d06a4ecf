use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Answer, CurrentQuestion, GameLifecycle, GenieState, SessionId},
    protocol::{confidence_percent, AnswerReply, AnswerRequest},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    backend::{GenieBackend, HttpGenieBackend},
    comments::CommentPicker,
    config::ClientSettings,
    error::{BackendError, RoundRejected},
};

pub const GREETING_MESSAGE: &str = "I am the Song Genie. Think of a song...";
pub const CONSULTING_MESSAGE: &str = "Consulting the spirits...";
pub const STARTED_MESSAGE: &str = "Answer truthfully.";
pub const UNREACHABLE_MESSAGE: &str = "Backend unreachable.";
pub const CONNECTION_LOST_MESSAGE: &str = "Connection lost.";
pub const UNCERTAIN_MESSAGE: &str = "The spirits are uncertain.";
pub const RESTART_MESSAGE: &str = "Think of another song.";

#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub genie: GenieState,
    pub thinking: bool,
    pub message: String,
    pub lifecycle: GameLifecycle,
    pub question: Option<CurrentQuestion>,
    pub question_number: u32,
    pub total_questions: u32,
    pub has_session: bool,
    pub round_in_progress: bool,
}

impl GameSnapshot {
    pub fn answers_enabled(&self) -> bool {
        self.genie == GenieState::Idle
            && self.lifecycle == GameLifecycle::InProgress
            && !self.round_in_progress
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    Started,
    StartFailed,
    NextQuestion { question_number: u32 },
    Solved { title: String, confidence_percent: u8 },
    Uncertain,
    ConnectionLost,
    /// The round was cancelled or outlived by a restart/shutdown.
    Discarded,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged(GameSnapshot),
    RoundFinished(RoundOutcome),
}

pub struct RoundHandle {
    task: JoinHandle<RoundOutcome>,
}

impl RoundHandle {
    pub async fn finished(self) -> RoundOutcome {
        self.task.await.unwrap_or(RoundOutcome::Discarded)
    }
}

struct ControllerState {
    session_id: Option<SessionId>,
    question: Option<CurrentQuestion>,
    question_number: u32,
    lifecycle: GameLifecycle,
    genie: GenieState,
    thinking: bool,
    message: String,
    round_in_progress: bool,
    generation: u64,
    pending_round: Option<AbortHandle>,
    closed: bool,
    total_questions: u32,
}

impl ControllerState {
    fn new(total_questions: u32) -> Self {
        Self {
            session_id: None,
            question: None,
            question_number: 0,
            lifecycle: GameLifecycle::NotStarted,
            genie: GenieState::Idle,
            thinking: false,
            message: GREETING_MESSAGE.to_string(),
            round_in_progress: false,
            generation: 0,
            pending_round: None,
            closed: false,
            total_questions,
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            genie: self.genie,
            thinking: self.thinking,
            message: self.message.clone(),
            lifecycle: self.lifecycle,
            question: self.question.clone(),
            question_number: self.question_number,
            total_questions: self.total_questions,
            has_session: self.session_id.is_some(),
            round_in_progress: self.round_in_progress,
        }
    }

    fn finish_round(&mut self) {
        self.genie = GenieState::Idle;
        self.thinking = false;
        self.round_in_progress = false;
        self.pending_round = None;
    }

    fn invalidate_rounds(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(pending) = self.pending_round.take() {
            pending.abort();
        }
    }
}

pub struct SessionController {
    backend: Arc<dyn GenieBackend>,
    comments: CommentPicker,
    pacing_delay: Duration,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn GenieBackend>, settings: &ClientSettings) -> Arc<Self> {
        Self::new_with_comment_picker(backend, settings, CommentPicker::default())
    }

    pub fn new_with_comment_picker(
        backend: Arc<dyn GenieBackend>,
        settings: &ClientSettings,
        comments: CommentPicker,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            comments,
            pacing_delay: settings.pacing_delay(),
            inner: Mutex::new(ControllerState::new(settings.total_questions)),
            events,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Arc<Self>, BackendError> {
        let backend = HttpGenieBackend::new(&settings.backend_url, settings.request_timeout())?;
        Ok(Self::new(Arc::new(backend), settings))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.inner.lock().await.snapshot()
    }

    fn publish(&self, state: &ControllerState) {
        let _ = self
            .events
            .send(ControllerEvent::StateChanged(state.snapshot()));
    }

    fn announce(&self, outcome: &RoundOutcome) {
        let _ = self
            .events
            .send(ControllerEvent::RoundFinished(outcome.clone()));
    }

    pub async fn start_game(self: &Arc<Self>) -> Result<RoundOutcome, RoundRejected> {
        let task = {
            let mut state = self.inner.lock().await;
            if state.closed {
                return Err(RoundRejected::Closed);
            }
            if state.round_in_progress {
                return Err(RoundRejected::RoundInProgress);
            }
            if state.lifecycle != GameLifecycle::NotStarted {
                return Err(RoundRejected::AlreadyStarted);
            }
            state.round_in_progress = true;
            state.genie = GenieState::Thinking;
            state.thinking = true;
            state.message = CONSULTING_MESSAGE.to_string();
            self.publish(&state);

            let generation = state.generation;
            let controller = Arc::clone(self);
            let task = tokio::spawn(async move { controller.run_start(generation).await });
            state.pending_round = Some(task.abort_handle());
            task
        };

        // Dropping this future detaches the task; it still settles the state.
        Ok(RoundHandle { task }.finished().await)
    }

    async fn run_start(&self, generation: u64) -> RoundOutcome {
        let result = self.backend.start_session().await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            debug!(generation, "discarding stale start reply");
            return RoundOutcome::Discarded;
        }

        let outcome = match result {
            Ok(start) => {
                info!(session_id = %start.session_id, "game started");
                state.question = Some(start.question());
                state.session_id = Some(start.session_id);
                state.question_number = 1;
                state.lifecycle = GameLifecycle::InProgress;
                state.message = STARTED_MESSAGE.to_string();
                RoundOutcome::Started
            }
            Err(err) => {
                warn!("failed to start game: {err}");
                state.lifecycle = GameLifecycle::NotStarted;
                state.message = UNREACHABLE_MESSAGE.to_string();
                RoundOutcome::StartFailed
            }
        };
        state.finish_round();
        self.publish(&state);
        self.announce(&outcome);
        outcome
    }

    pub async fn submit_answer(
        self: &Arc<Self>,
        answer: Answer,
    ) -> Result<RoundHandle, RoundRejected> {
        let mut state = self.inner.lock().await;
        if state.closed {
            return Err(RoundRejected::Closed);
        }
        if state.session_id.is_none() {
            debug!(%answer, "ignoring answer without a session");
            return Err(RoundRejected::NoSession);
        }
        if state.round_in_progress || state.genie != GenieState::Idle {
            debug!(%answer, "ignoring answer while a round is in progress");
            return Err(RoundRejected::RoundInProgress);
        }
        if state.lifecycle != GameLifecycle::InProgress {
            return Err(RoundRejected::NotInProgress);
        }

        state.round_in_progress = true;
        state.genie = GenieState::from(answer);
        self.publish(&state);

        let generation = state.generation;
        let controller = Arc::clone(self);
        let task =
            tokio::spawn(async move { controller.run_paced_round(generation, answer).await });
        state.pending_round = Some(task.abort_handle());
        Ok(RoundHandle { task })
    }

    async fn run_paced_round(&self, generation: u64, answer: Answer) -> RoundOutcome {
        tokio::time::sleep(self.pacing_delay).await;

        let request = {
            let mut state = self.inner.lock().await;
            if state.generation != generation {
                return RoundOutcome::Discarded;
            }
            let (Some(session_id), Some(question)) =
                (state.session_id.clone(), state.question.clone())
            else {
                state.finish_round();
                self.publish(&state);
                return RoundOutcome::Discarded;
            };
            state.genie = GenieState::Thinking;
            state.thinking = true;
            self.publish(&state);
            info!(
                question_number = state.question_number,
                %answer,
                generation,
                "submitting answer"
            );
            AnswerRequest {
                session_id,
                feature: question.feature,
                value: question.value,
                answer,
            }
        };

        let result = self.backend.submit_answer(&request).await;

        let mut state = self.inner.lock().await;
        if state.generation != generation {
            debug!(generation, "discarding stale answer reply");
            return RoundOutcome::Discarded;
        }

        let outcome = match result {
            Ok(AnswerReply::Result { song, confidence }) => {
                let percent = confidence_percent(confidence);
                info!(title = %song.title, percent, "genie resolved the song");
                state.lifecycle = GameLifecycle::Finished;
                state.message = format!("Your song is \"{}\" ({percent}%)", song.title);
                RoundOutcome::Solved {
                    title: song.title,
                    confidence_percent: percent,
                }
            }
            Ok(AnswerReply::Question(question)) => {
                state.question = Some(question);
                state.question_number += 1;
                state.message = self.comments.pick(answer);
                RoundOutcome::NextQuestion {
                    question_number: state.question_number,
                }
            }
            Ok(AnswerReply::Uncertain) => {
                info!("backend reply had no recognized shape, ending game");
                state.lifecycle = GameLifecycle::Finished;
                state.message = UNCERTAIN_MESSAGE.to_string();
                RoundOutcome::Uncertain
            }
            Err(err) => {
                warn!(question_number = state.question_number, "answer round failed: {err}");
                state.message = CONNECTION_LOST_MESSAGE.to_string();
                RoundOutcome::ConnectionLost
            }
        };
        state.finish_round();
        self.publish(&state);
        self.announce(&outcome);
        outcome
    }

    pub async fn restart(&self) {
        let mut state = self.inner.lock().await;
        state.invalidate_rounds();
        state.session_id = None;
        state.question = None;
        state.question_number = 0;
        state.lifecycle = GameLifecycle::NotStarted;
        state.message = RESTART_MESSAGE.to_string();
        state.finish_round();
        info!(generation = state.generation, "game restarted");
        self.publish(&state);
    }

    pub async fn shutdown(&self) {
        let mut state = self.inner.lock().await;
        state.invalidate_rounds();
        state.closed = true;
        state.finish_round();
        debug!(generation = state.generation, "controller shut down");
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
