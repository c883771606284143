//! Turn generation and the diversity regeneration loop
//!
//! A [`TurnJob`] carries everything one persona's turn needs so it can run
//! off the orchestration timeline. It never touches shared conversation
//! state; the controller commits its [`TurnOutput`] afterwards.

use super::lane::InferenceLane;
use crate::ports::bar_observer::BarObserver;
use crate::ports::inference_gateway::GatewayError;
use divebar_domain::{
    BarPromptTemplate, ChatMessage, DiversitySettings, GenerationRequest, GenerationResult,
    PersonaPromptTemplate, Utterance, clean_response, compute_diversity,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Token cap for the auxiliary topic request.
const TOPIC_MAX_TOKENS: u32 = 20;

/// Inputs for one persona turn
pub struct TurnJob {
    pub speaker: String,
    pub template: PersonaPromptTemplate,
    pub stop: Vec<String>,
    /// Trailing history, long enough for the prompt script and the
    /// diversity window
    pub window: Vec<Utterance>,
    /// Recent topics when this turn should change the subject
    pub rotate_topic: Option<Vec<String>>,
    pub diversity: DiversitySettings,
    pub model: Option<String>,
    pub observer: Arc<dyn BarObserver>,
}

/// What a turn produced
#[derive(Debug, Clone)]
pub struct TurnOutput {
    /// Cleaned text; empty means the turn produced nothing
    pub content: String,
    /// Metrics of the call that produced `content`
    pub metrics: GenerationResult,
    /// Fresh topic requested for this turn
    pub topic: Option<String>,
    /// Rephrase requests issued
    pub regenerations: u32,
}

impl TurnJob {
    pub async fn run(self, lane: InferenceLane) -> Result<TurnOutput, GatewayError> {
        let topic = match &self.rotate_topic {
            Some(recent) => self.fetch_topic(&lane, recent).await?,
            None => None,
        };
        if let Some(topic) = &topic {
            self.observer.on_topic(&self.speaker, topic);
        }

        let messages = self.template.build_turn_prompt(&self.window, topic.as_deref());
        let first = lane.generate(self.request(messages)).await?;
        let mut output = TurnOutput {
            content: clean_response(&first.content),
            metrics: first,
            topic,
            regenerations: 0,
        };

        if self.diversity.enabled && !output.content.is_empty() {
            self.regenerate(&lane, &mut output).await;
        }
        Ok(output)
    }

    /// Ask for a short topic phrase. `None` when the backend returns nothing.
    async fn fetch_topic(
        &self,
        lane: &InferenceLane,
        recent: &[String],
    ) -> Result<Option<String>, GatewayError> {
        let request = GenerationRequest::new(self.template.build_topic_prompt(recent))
            .with_stop(vec!["\n".to_string()])
            .with_max_tokens(TOPIC_MAX_TOKENS)
            .with_model(self.model.clone());
        let result = lane.generate(request).await?;
        let topic = BarPromptTemplate::strip_quotes(&result.content);
        debug!(persona = %self.speaker, topic, "Topic rotation");
        Ok((!topic.is_empty()).then(|| topic.to_string()))
    }

    /// Rephrase until the candidate passes, the retry cap is hit, or the
    /// backend returns nothing. The last non-empty candidate is kept.
    async fn regenerate(&self, lane: &InferenceLane, output: &mut TurnOutput) {
        let mut attempts = 0;
        while attempts < self.diversity.max_retries {
            let assessment =
                compute_diversity(&output.content, &self.window, &self.speaker, &self.diversity);
            if assessment.passed {
                break;
            }
            attempts += 1;
            debug!(
                persona = %self.speaker,
                attempt = attempts,
                score = assessment.score,
                problems = ?assessment.top_problems(3),
                "Diversity check failed, rephrasing"
            );
            self.observer
                .on_regeneration(&self.speaker, attempts, &assessment);

            let messages = self
                .template
                .build_rephrase_prompt(&output.content, &assessment.problems);
            let result = match lane.generate(self.request(messages)).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(persona = %self.speaker, error = %e, "Rephrase failed, keeping candidate");
                    break;
                }
            };
            let content = clean_response(&result.content);
            if content.is_empty() {
                break;
            }
            output.content = content;
            output.metrics = result;
        }
        output.regenerations = attempts;
    }

    fn request(&self, messages: Vec<ChatMessage>) -> GenerationRequest {
        GenerationRequest::new(messages)
            .with_stop(self.stop.clone())
            .with_model(self.model.clone())
    }
}
