//! Turn controller use case
//!
//! Drives the conversation: each tick asks the [`Scheduler`] for a speaker,
//! runs the speaker's turn on the exclusive inference lane, and commits the
//! result to the [`ConversationHistory`].
//!
//! # Tick
//!
//! ```text
//! paused? ─yes─▶ Paused
//!   │no
//! select_next ─none─▶ NoneEligible
//!   │
//! thinking ─▶ [topic?] ─▶ generate ─▶ clean ─▶ diversity loop
//!   │
//! record_spoke (always)
//!   │
//! non-empty? ─yes─▶ append + persist + display ─▶ Spoke
//!   │no
//!   └─▶ Silent
//! ```
//!
//! History and scheduler state are only mutated here, on the orchestration
//! timeline, after the spawned turn completes.

pub mod commands;
pub mod lane;
pub mod regeneration;
pub mod topics;

pub use commands::{BarCommand, SpeedMultiplier};
pub use lane::InferenceLane;
pub use regeneration::{TurnJob, TurnOutput};
pub use topics::TopicRotation;

use crate::config::BarSettings;
use crate::ports::bar_observer::{BarObserver, BarStats, NoObserver, PersonaStatus};
use crate::ports::inference_gateway::{GatewayError, InferenceGateway};
use crate::ports::transcript_store::{
    NoTranscript, RegenerationEntry, SessionStart, StoreError, TranscriptStore, UtteranceEntry,
};
use chrono::Utc;
use divebar_domain::{
    BARTENDER, BarPromptTemplate, ConversationHistory, DomainError, GenerationRequest,
    PersonaPromptTemplate, STRANGER, Scheduler, Selection, SelectionReason, Utterance,
    prompt::{FALLBACK_OPENER, MAX_SCRIPT_LINES},
    turn_stop_sequences,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Token cap for the bartender's opener.
const OPENER_MAX_TOKENS: u32 = 30;

/// Errors that stop the controller
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Inference backend failed to initialize: {0}")]
    Initialization(#[from] GatewayError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The scheduler is paused; nothing was asked of the backend
    Paused,
    /// Everyone is in cooldown; retry on a later tick
    NoneEligible,
    /// A line was committed
    Spoke { speaker: String, turn_number: u64 },
    /// The speaker produced nothing; their slot was consumed
    Silent { speaker: String },
    /// The backend failed; their slot was consumed
    Failed { speaker: String },
}

/// Use case driving the bar conversation
pub struct TurnController {
    lane: InferenceLane,
    store: Arc<dyn TranscriptStore>,
    observer: Arc<dyn BarObserver>,
    scheduler: Scheduler,
    history: ConversationHistory,
    templates: HashMap<String, PersonaPromptTemplate>,
    settings: BarSettings,
    topics: TopicRotation,
    speed: SpeedMultiplier,
    session_id: Option<String>,
    rng: StdRng,
}

impl TurnController {
    pub fn new(
        gateway: Arc<dyn InferenceGateway>,
        scheduler: Scheduler,
        settings: BarSettings,
    ) -> Self {
        let templates = scheduler
            .roster()
            .iter()
            .map(|persona| {
                let template = PersonaPromptTemplate::new(
                    persona,
                    &settings.bar_name,
                    settings.n_ctx,
                    settings.generation.max_tokens as usize,
                );
                (persona.name().to_string(), template)
            })
            .collect();

        Self {
            lane: InferenceLane::new(gateway),
            store: Arc::new(NoTranscript),
            observer: Arc::new(NoObserver),
            scheduler,
            history: ConversationHistory::new(),
            templates,
            topics: TopicRotation::new(settings.max_subject_chat),
            speed: SpeedMultiplier::new(settings.speed),
            settings,
            session_id: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn TranscriptStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn BarObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Reproducible opener category choice.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn speed(&self) -> f64 {
        self.speed.value()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Delay before the next tick at the current speed.
    pub fn tick_delay(&self) -> std::time::Duration {
        self.speed.delay(self.settings.tick_interval)
    }

    // ==================== Session lifecycle ====================

    /// Initialize the backend, start a session and seed the bartender's
    /// opener as turn 0.
    ///
    /// A backend that fails to initialize is fatal.
    pub async fn open(&mut self) -> Result<(), TurnError> {
        self.lane.initialize().await?;
        info!(
            bar = %self.settings.bar_name,
            personas = self.scheduler.roster().len(),
            model = self.lane.model_name(),
            "Bar is open"
        );

        let start = SessionStart {
            bar_name: self.settings.bar_name.clone(),
            agent_count: self.scheduler.roster().len(),
            config_hash: self.settings.config_hash.clone(),
        };
        self.session_id = match self.store.start_session(&start) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Failed to record session start");
                None
            }
        };

        let opener = self.generate_opener().await;
        self.commit_plain(BARTENDER, &opener)?;
        self.observer.on_notice("Bar is open.");
        Ok(())
    }

    async fn generate_opener(&mut self) -> String {
        let category = BarPromptTemplate::pick_opener_category(&mut self.rng);
        let request = GenerationRequest::new(BarPromptTemplate::opener_prompt(category))
            .with_stop(vec!["\n".to_string()])
            .with_max_tokens(OPENER_MAX_TOKENS);
        match self.lane.generate(request).await {
            Ok(result) => BarPromptTemplate::opener_or_fallback(&result.content),
            Err(e) => {
                warn!(error = %e, "Opener generation failed, using fallback");
                FALLBACK_OPENER.to_string()
            }
        }
    }

    /// End the session in the store.
    pub fn close(&mut self) {
        if let Some(id) = self.session_id.take()
            && let Err(e) = self.store.end_session(&id)
        {
            warn!(error = %e, "Failed to record session end");
        }
        info!(turns = self.scheduler.turn_number(), "Bar is closed");
        self.observer.on_notice("Last call.");
    }

    /// Tick until `Quit` arrives or `cancel` fires, then close the session.
    ///
    /// Commands are applied between ticks; an in-flight turn is never
    /// interrupted. A tick awaits its whole turn, including rephrase and
    /// topic calls, so a stranger line, pause, quit or Ctrl-C sent
    /// mid-generation waits until that turn has been committed. Commands
    /// queue in the channel meanwhile.
    pub async fn run(
        &mut self,
        commands: mpsc::Receiver<BarCommand>,
        cancel: CancellationToken,
    ) -> Result<(), TurnError> {
        let result = self.run_loop(commands, cancel).await;
        self.close();
        result
    }

    async fn run_loop(
        &mut self,
        mut commands: mpsc::Receiver<BarCommand>,
        cancel: CancellationToken,
    ) -> Result<(), TurnError> {
        let mut next_tick = Instant::now() + self.tick_delay();
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        if self.apply(command).is_break() {
                            break;
                        }
                    }
                    None => commands_open = false,
                },
                _ = tokio::time::sleep_until(next_tick) => {
                    let outcome = self.tick().await?;
                    debug!(?outcome, "Tick");
                    next_tick = Instant::now() + self.tick_delay();
                }
            }
        }
        Ok(())
    }

    // ==================== Operator commands ====================

    /// Apply one operator command.
    pub fn apply(&mut self, command: BarCommand) -> ControlFlow<()> {
        debug!(?command, "Operator command");
        match command {
            BarCommand::Pause => self.set_paused(true),
            BarCommand::Resume => self.set_paused(false),
            BarCommand::TogglePause => self.set_paused(!self.scheduler.is_paused()),
            BarCommand::SpeedUp => {
                self.speed.faster();
                self.publish_stats();
            }
            BarCommand::SpeedDown => {
                self.speed.slower();
                self.publish_stats();
            }
            BarCommand::Stranger(text) => {
                if let Err(e) = self.commit_plain(STRANGER, text.trim()) {
                    debug!(error = %e, "Ignoring stranger line");
                }
            }
            BarCommand::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn set_paused(&mut self, paused: bool) {
        self.scheduler.set_paused(paused);
        self.observer
            .on_notice(if paused { "Paused." } else { "Bar is open." });
        self.publish_stats();
    }

    fn publish_stats(&self) {
        self.observer.on_stats(&BarStats {
            turn: self.scheduler.turn_number(),
            speed: self.speed.value(),
            paused: self.scheduler.is_paused(),
        });
    }

    // ==================== Tick ====================

    /// Run one orchestration tick.
    pub async fn tick(&mut self) -> Result<TickOutcome, TurnError> {
        if self.scheduler.is_paused() {
            return Ok(TickOutcome::Paused);
        }

        let last = self.history.last().cloned();
        let Some(selection) = self.scheduler.select_next(last.as_ref()) else {
            return Ok(TickOutcome::NoneEligible);
        };
        let speaker = selection.persona.clone();
        debug!(
            persona = %speaker,
            reason = %selection.reason,
            score = selection.score,
            "Selected speaker"
        );
        self.observer.on_status(&speaker, PersonaStatus::Thinking);

        let Some(job) = self.build_job(&speaker) else {
            // Selection only returns roster members, which all have templates
            self.scheduler.record_spoke(&speaker, last.as_ref().map(Utterance::speaker));
            self.observer.on_status(&speaker, PersonaStatus::Idle);
            return Ok(TickOutcome::Failed { speaker });
        };
        let lane = self.lane.clone();
        let result = match tokio::spawn(job.run(lane)).await {
            Ok(result) => result,
            Err(e) => Err(GatewayError::Other(format!("turn task failed: {}", e))),
        };

        self.scheduler
            .record_spoke(&speaker, last.as_ref().map(Utterance::speaker));

        let outcome = match result {
            Ok(output) => self.commit_turn(&selection, last.as_ref(), output)?,
            Err(e) => {
                warn!(persona = %speaker, error = %e, "Generation failed");
                TickOutcome::Failed {
                    speaker: speaker.clone(),
                }
            }
        };

        self.observer.on_status(&speaker, PersonaStatus::Idle);
        self.publish_stats();
        Ok(outcome)
    }

    fn build_job(&mut self, speaker: &str) -> Option<TurnJob> {
        let template = self.templates.get(speaker)?.clone();
        let persona = self.scheduler.roster().get(speaker)?;
        let stop = turn_stop_sequences(speaker, self.scheduler.roster().names());
        let model = persona.model_override.clone();
        let window_len = self.settings.diversity.window_size.max(MAX_SCRIPT_LINES);
        let rotate_topic = self.topics.advance().then(|| self.topics.recent());

        Some(TurnJob {
            speaker: speaker.to_string(),
            template,
            stop,
            window: self.history.recent(window_len).to_vec(),
            rotate_topic,
            diversity: self.settings.diversity.clone(),
            model,
            observer: Arc::clone(&self.observer),
        })
    }

    fn commit_turn(
        &mut self,
        selection: &Selection,
        last: Option<&Utterance>,
        output: TurnOutput,
    ) -> Result<TickOutcome, TurnError> {
        let speaker = selection.persona.clone();
        if let Some(topic) = &output.topic {
            self.topics.remember(topic);
        }

        let turn_number = self.history.next_turn_number();
        if output.regenerations > 0 {
            info!(
                persona = %speaker,
                turn = turn_number,
                attempts = output.regenerations,
                "Regenerated for diversity"
            );
            self.persist(|store, session| {
                store.log_regeneration(
                    session,
                    &RegenerationEntry {
                        turn_number,
                        speaker: speaker.clone(),
                        attempt_count: output.regenerations,
                    },
                )
            });
        }

        if output.content.is_empty() {
            debug!(persona = %speaker, "Empty generation, moving on");
            return Ok(TickOutcome::Silent { speaker });
        }

        let utterance = self
            .history
            .append(&speaker, &output.content, Utc::now())?
            .clone();

        let persona = self.scheduler.roster().get(&speaker);
        let entry = UtteranceEntry {
            turn_number: utterance.turn_number(),
            speaker: speaker.clone(),
            content: utterance.content().to_string(),
            model_name: Some(
                persona
                    .and_then(|p| p.model_override.clone())
                    .unwrap_or_else(|| self.lane.model_name().to_string()),
            ),
            tokens_prompt: Some(output.metrics.tokens_prompt),
            tokens_completion: Some(output.metrics.tokens_completion),
            generation_time_ms: Some(output.metrics.generation_time_ms),
            temperature: Some(self.settings.generation.temperature),
            top_p: Some(self.settings.generation.top_p),
            chattiness: persona.map(|p| p.chattiness()),
            score: Some(selection.score),
            selection_reason: Some(selection.reason.as_str().to_string()),
            addressed_by: match selection.reason {
                SelectionReason::Addressed => last.map(|u| u.speaker().to_string()),
                SelectionReason::Weighted => None,
            },
        };
        self.persist(|store, session| store.log_utterance(session, &entry));
        self.observer.on_utterance(&utterance);

        Ok(TickOutcome::Spoke {
            speaker,
            turn_number: utterance.turn_number(),
        })
    }

    /// Commit a line that did not come from a persona turn.
    fn commit_plain(&mut self, speaker: &str, content: &str) -> Result<(), DomainError> {
        let utterance = self.history.append(speaker, content, Utc::now())?.clone();
        let entry = UtteranceEntry::plain(utterance.turn_number(), speaker, utterance.content());
        self.persist(|store, session| store.log_utterance(session, &entry));
        self.observer.on_utterance(&utterance);
        Ok(())
    }

    /// Run a store call for the current session, logging failures.
    fn persist<F>(&self, write: F)
    where
        F: FnOnce(&dyn TranscriptStore, &str) -> Result<(), StoreError>,
    {
        let Some(session) = self.session_id.as_deref() else {
            return;
        };
        if let Err(e) = write(self.store.as_ref(), session) {
            warn!(error = %e, "Transcript write failed");
        }
    }
}
