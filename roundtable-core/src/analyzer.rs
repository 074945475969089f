// roundtable-core/src/analyzer.rs
use crate::errors::EngineError;
use crate::models::chat::{ChatResponse, ResponseFormat};
use crate::models::transcript::{ConversationTranscript, ToolOutcome};
use crate::participant::Participant;
use crate::turn::{TurnOptions, TurnRunner};
use std::fmt::Write as _;
use tracing::info;

/// Reads a finished (or in-progress) transcript with a model and produces a
/// single response: a verdict, a summary, follow-up questions — whatever
/// the analyzing participant's prompts ask for.
///
/// The analyzer itself carries no opinion about the conversation; all
/// judging or summarizing criteria arrive through the participant's system
/// prompts and the optional per-call analysis prompt. Tools are always
/// disabled: exactly one adapter call happens per `analyze`.
pub struct TranscriptAnalyzer {
    participant: Participant,
}

impl TranscriptAnalyzer {
    pub fn new(participant: Participant) -> Self {
        Self { participant }
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub async fn analyze(
        &self,
        transcript: &ConversationTranscript,
        analysis_prompt: Option<&str>,
        response_format: Option<ResponseFormat>,
    ) -> Result<ChatResponse, EngineError> {
        let rendered = render_transcript(transcript);
        let prompt = match analysis_prompt {
            Some(extra) => format!(
                "{}\n\n--- CONVERSATION TRANSCRIPT ---\n{}",
                extra, rendered
            ),
            None => format!(
                "Please analyze the following conversation:\n\n{}",
                rendered
            ),
        };

        info!(
            analyst = %self.participant.name(),
            turns = transcript.len(),
            "Analyzing transcript"
        );

        let options = TurnOptions {
            response_format,
            ..TurnOptions::default()
        };
        let outcome = TurnRunner::new(&self.participant)
            .run_turn(&[], Some(&prompt), &options)
            .await?;
        Ok(outcome.response)
    }
}

/// Deterministic plain-text rendering of a transcript: turn number,
/// participant, message, and a summary of any tool invocations.
pub fn render_transcript(transcript: &ConversationTranscript) -> String {
    let mut out = String::new();
    for (index, turn) in transcript.turns().iter().enumerate() {
        let _ = writeln!(out, "Turn {} ({}):", index + 1, turn.participant);
        let _ = writeln!(out, "  {}", turn.text());
        if !turn.invocations.is_empty() {
            let _ = writeln!(out, "  Tool Calls:");
            for record in &turn.invocations {
                let _ = writeln!(
                    out,
                    "    - {}: {}",
                    record.call.function.name, record.call.function.arguments
                );
                match &record.outcome {
                    ToolOutcome::Success(result) => {
                        let _ = writeln!(out, "      Result: {}", result);
                    }
                    ToolOutcome::Failure(error) => {
                        let _ = writeln!(out, "      Error: {}", error);
                    }
                }
            }
        }
        out.push('\n');
    }
    out
}
