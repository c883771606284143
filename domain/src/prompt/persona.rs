//! Per-persona prompt templates

use crate::conversation::entities::{BARTENDER, STRANGER, Utterance};
use crate::generation::message::ChatMessage;
use crate::persona::entities::Persona;

/// Rough characters-per-token ratio for budget estimates.
const CHARS_PER_TOKEN: usize = 4;
/// Tokens kept free beyond the system prompt and the reply.
const SAFETY_MARGIN_TOKENS: usize = 100;
/// Most history lines packed into one turn prompt.
pub const MAX_SCRIPT_LINES: usize = 10;

const TOPIC_PROMPT: &str = "Name a random dive bar conversation topic in 2-5 words. \
Just the topic, nothing else. Be specific and gritty. Examples: 'worst landlord stories', \
'dumbest bar fights', 'jobs that broke you', 'creepy regulars'.";

/// Rough token count estimate.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN + 1
}

/// Stop sequences for `speaker`'s turn: every other known speaker tag and a
/// blank line.
pub fn turn_stop_sequences<'a>(speaker: &str, roster: impl Iterator<Item = &'a str>) -> Vec<String> {
    roster
        .filter(|name| *name != speaker)
        .map(|name| format!("{}:", name))
        .chain([
            format!("{}:", BARTENDER),
            format!("{}:", STRANGER),
            "\n\n".to_string(),
        ])
        .collect()
}

/// Builds the prompts a single persona sends to the backend
///
/// Pure function of the persona's identity and the history handed in.
#[derive(Debug, Clone)]
pub struct PersonaPromptTemplate {
    name: String,
    system_prompt: String,
    max_context: usize,
    max_tokens: usize,
}

impl PersonaPromptTemplate {
    pub fn new(persona: &Persona, bar_name: &str, max_context: usize, max_tokens: usize) -> Self {
        Self {
            name: persona.name().to_string(),
            system_prompt: Self::system(persona, bar_name),
            max_context,
            max_tokens,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn system(persona: &Persona, bar_name: &str) -> String {
        let name = persona.name();
        format!(
            r#"You are {name}. You are at a dive bar called {bar_name}. You are not an AI. You are a person.

About you: {backstory}

Your personality: {traits}.
How you talk: {style}.
Your drink: {drink}.

Always speak in FIRST PERSON as {name}. Say "I" not "{name}". You are talking out loud, not
narrating. One or two short sentences max. Talk casually -- use contractions, fragments, slang.
Talk about normal bar stuff: your day, complaints, gossip, stories, sports, the weather, life.
Each reply must use completely fresh phrasing. Vary your sentence openers every time.
Talk about YOURSELF -- your own experiences, your own day, your own opinions. React directly to the
last speaker: argue, ask a question, crack a joke at their expense, or call them out.
Use vivid, original language.
Say your line out loud in first person and stop.
Keep it to spoken dialogue only."#,
            backstory = persona.backstory,
            traits = persona.personality_traits.join(", "),
            style = persona.speaking_style,
            drink = persona.drink,
        )
    }

    /// Prompt for this persona's next line.
    ///
    /// With `new_topic`, the persona is told to drop the current subject and
    /// open the new one instead of reacting to the last speaker.
    pub fn build_turn_prompt(&self, history: &[Utterance], new_topic: Option<&str>) -> Vec<ChatMessage> {
        let budget = self
            .max_context
            .saturating_sub(estimate_tokens(&self.system_prompt))
            .saturating_sub(self.max_tokens)
            .saturating_sub(SAFETY_MARGIN_TOKENS);
        let script = Self::build_script(history, budget);
        let name = &self.name;

        let content = match new_topic {
            Some(topic) => format!(
                "{script}\n\n{name} completely drops the old subject and brings up {topic}. \
Do NOT reference anything from the previous conversation. Reply as {name} starting fresh \
on this topic. 1-2 sentences, first person, no name prefix."
            ),
            None => {
                let last = history.last().map(|u| u.speaker()).unwrap_or("them");
                format!(
                    "{script}\n\nNow reply as {name}, in first person. React directly to {last} \
-- agree, disagree, ask them something, or roast them. 1-2 sentences. No name prefix, no narration."
                )
            }
        };

        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(content),
        ]
    }

    /// Prompt asking for a fresh conversation topic.
    pub fn build_topic_prompt(&self, recent_topics: &[String]) -> Vec<ChatMessage> {
        let mut system = TOPIC_PROMPT.to_string();
        if !recent_topics.is_empty() {
            system.push_str(&format!(
                " Do not repeat any of these recent topics: {}.",
                recent_topics.join("; ")
            ));
        }
        vec![
            ChatMessage::system(system),
            ChatMessage::user("Give me a topic."),
        ]
    }

    /// Corrective prompt asking to restate `original` with fresh phrasing.
    ///
    /// Lists at most three problems.
    pub fn build_rephrase_prompt(&self, original: &str, problems: &[String]) -> Vec<ChatMessage> {
        let problems = problems
            .iter()
            .take(3)
            .map(|p| format!("- {}", p))
            .collect::<Vec<_>>()
            .join("\n");
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(format!(
                "You just said: \"{original}\"\n\nProblems:\n{problems}\n\n\
Say the same thing completely differently. Fresh phrasing. 1-2 sentences."
            )),
        ]
    }

    /// Script of the latest history lines, newest kept first when the
    /// budget runs out.
    fn build_script(history: &[Utterance], budget: usize) -> String {
        let start = history.len().saturating_sub(MAX_SCRIPT_LINES);
        let mut lines = Vec::new();
        let mut used = 0;
        for utterance in history[start..].iter().rev() {
            let line = utterance.as_script_line();
            let tokens = estimate_tokens(&line);
            if used + tokens > budget {
                break;
            }
            used += tokens;
            lines.push(line);
        }
        lines.reverse();
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::message::Role;
    use chrono::Utc;

    fn mike() -> Persona {
        Persona::new("Mike", 0.6, 0.4)
            .unwrap()
            .with_backstory("Retired trucker.")
            .with_traits(vec!["grumpy".to_string(), "loyal".to_string()])
            .with_drink("Rye neat")
            .with_speaking_style("short and blunt")
    }

    fn history(n: usize) -> Vec<Utterance> {
        (0..n)
            .map(|i| Utterance::new("Rosa", format!("line number {}", i), i as u64, Utc::now()))
            .collect()
    }

    #[test]
    fn system_prompt_mentions_persona_details() {
        let template = PersonaPromptTemplate::new(&mike(), "The Rusty Nail", 4096, 200);
        let system = template.system_prompt();
        assert!(system.starts_with("You are Mike. You are at a dive bar called The Rusty Nail."));
        assert!(system.contains("Retired trucker."));
        assert!(system.contains("grumpy, loyal"));
        assert!(system.contains("Rye neat"));
    }

    #[test]
    fn turn_prompt_reacts_to_last_speaker() {
        let template = PersonaPromptTemplate::new(&mike(), "The Rusty Nail", 4096, 200);
        let messages = template.build_turn_prompt(&history(2), None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.starts_with("Rosa: line number 0\nRosa: line number 1"));
        assert!(messages[1].content.contains("React directly to Rosa"));
    }

    #[test]
    fn turn_prompt_with_topic_pivots() {
        let template = PersonaPromptTemplate::new(&mike(), "The Rusty Nail", 4096, 200);
        let messages = template.build_turn_prompt(&history(1), Some("worst landlord stories"));
        assert!(messages[1].content.contains("brings up worst landlord stories"));
        assert!(!messages[1].content.contains("React directly"));
    }

    #[test]
    fn script_is_capped_at_ten_lines() {
        let template = PersonaPromptTemplate::new(&mike(), "The Rusty Nail", 4096, 200);
        let messages = template.build_turn_prompt(&history(15), None);
        let content = &messages[1].content;
        assert!(!content.contains("Rosa: line number 4\n"));
        assert!(content.contains("line number 5"));
        assert!(content.contains("line number 14"));
    }

    #[test]
    fn script_drops_oldest_lines_when_budget_is_tight() {
        let template = PersonaPromptTemplate::new(&mike(), "Bar", 0, 0);
        let messages = template.build_turn_prompt(&history(3), None);
        assert!(messages[1].content.starts_with("\n\nNow reply as Mike"));
    }

    #[test]
    fn topic_prompt_lists_recent_topics() {
        let template = PersonaPromptTemplate::new(&mike(), "Bar", 4096, 200);
        let messages = template.build_topic_prompt(&["bad dates".to_string()]);
        assert!(messages[0].content.contains("bad dates"));
        assert_eq!(messages[1].content, "Give me a topic.");
    }

    #[test]
    fn rephrase_prompt_lists_at_most_three_problems() {
        let template = PersonaPromptTemplate::new(&mike(), "Bar", 4096, 200);
        let problems: Vec<String> = (1..=5).map(|i| format!("problem {}", i)).collect();
        let messages = template.build_rephrase_prompt("same old", &problems);
        let content = &messages[1].content;
        assert!(content.contains("You just said: \"same old\""));
        assert!(content.contains("- problem 3"));
        assert!(!content.contains("- problem 4"));
    }

    #[test]
    fn stop_sequences_exclude_speaker() {
        let stops = turn_stop_sequences("Mike", ["Mike", "Rosa", "Dave"].into_iter());
        assert_eq!(
            stops,
            vec!["Rosa:", "Dave:", "Bartender:", "A stranger:", "\n\n"]
        );
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 3);
    }
}
