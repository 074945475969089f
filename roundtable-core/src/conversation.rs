// roundtable-core/src/conversation.rs
use crate::ToolExecutor;
use crate::errors::{ConversationAborted, EngineError};
use crate::models::chat::ChatMessage;
use crate::models::tools::ToolDefinition;
use crate::models::transcript::{ConversationTranscript, ConversationTurn};
use crate::participant::Participant;
use crate::turn::{TurnOptions, TurnRunner};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Caller-supplied predicate that ends a conversation early. Evaluated after
/// every appended turn; expected to be side-effect free.
pub type StopCondition = Box<dyn Fn(&ConversationTranscript) -> bool + Send + Sync>;

/// Options for one conversation run.
pub struct ConversationOptions {
    /// Message delivered to the first participant on iteration 1. Every
    /// later iteration receives the prior turn's emitted content instead.
    pub starting_message: String,
    /// Name of the participant to take the first turn; defaults to the
    /// first in the list. Must name a list member.
    pub starting_participant: Option<String>,
    /// Hard bound on turns appended by this run. Always applies, even when
    /// a stop condition is supplied.
    pub max_turns: usize,
    pub stop_condition: Option<StopCondition>,
    /// Transcript to continue from. Its existing turns are never altered;
    /// combined with a different participants list this is how a new
    /// participant joins without losing history.
    pub initial_transcript: Option<ConversationTranscript>,
    /// Turn engine settings applied uniformly to every turn.
    pub turn: TurnOptions,
}

impl ConversationOptions {
    pub fn new(starting_message: impl Into<String>, max_turns: usize) -> Self {
        Self {
            starting_message: starting_message.into(),
            starting_participant: None,
            max_turns,
            stop_condition: None,
            initial_transcript: None,
            turn: TurnOptions::default(),
        }
    }

    pub fn starting_with(mut self, participant_name: impl Into<String>) -> Self {
        self.starting_participant = Some(participant_name.into());
        self
    }

    pub fn stop_when(
        mut self,
        condition: impl Fn(&ConversationTranscript) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.stop_condition = Some(Box::new(condition));
        self
    }

    pub fn continue_from(mut self, transcript: ConversationTranscript) -> Self {
        self.initial_transcript = Some(transcript);
        self
    }

    pub fn with_turn_options(mut self, turn: TurnOptions) -> Self {
        self.turn = turn;
        self
    }
}

// The stop condition is an opaque closure; show everything else.
impl fmt::Debug for ConversationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationOptions")
            .field("starting_message", &self.starting_message)
            .field("starting_participant", &self.starting_participant)
            .field("max_turns", &self.max_turns)
            .field("stop_condition", &self.stop_condition.is_some())
            .field("initial_transcript", &self.initial_transcript)
            .field("turn", &self.turn)
            .finish()
    }
}

/// Drives a strict round-robin conversation between two or more
/// participants.
///
/// The runner owns no conversation state: each [`run`](Self::run) call
/// builds a fresh transcript (or extends a copy handed in through the
/// options), so one runner can serve many conversations.
pub struct ConversationRunner {
    participants: Vec<Participant>,
    tools: Vec<ToolDefinition>,
    executor: Option<Arc<dyn ToolExecutor>>,
}

// Participants and the tool executor are opaque; show the shape.
impl fmt::Debug for ConversationRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationRunner")
            .field(
                "participants",
                &self
                    .participants
                    .iter()
                    .map(Participant::name)
                    .collect::<Vec<_>>(),
            )
            .field("tools", &self.tools)
            .field("executor", &self.executor.is_some())
            .finish()
    }
}

impl ConversationRunner {
    pub fn new(participants: Vec<Participant>) -> Result<Self, EngineError> {
        Self::build(participants, Vec::new(), None)
    }

    /// A runner whose tool set and executor are offered uniformly to every
    /// participant.
    pub fn with_tools(
        participants: Vec<Participant>,
        tools: Vec<ToolDefinition>,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<Self, EngineError> {
        Self::build(participants, tools, Some(executor))
    }

    fn build(
        participants: Vec<Participant>,
        tools: Vec<ToolDefinition>,
        executor: Option<Arc<dyn ToolExecutor>>,
    ) -> Result<Self, EngineError> {
        if participants.len() < 2 {
            return Err(EngineError::config(format!(
                "a conversation requires at least 2 participants, got {}",
                participants.len()
            )));
        }
        if !tools.is_empty() && executor.is_none() {
            return Err(EngineError::config(
                "a tool executor is required when tools are provided",
            ));
        }
        Ok(Self {
            participants,
            tools,
            executor,
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Runs the conversation until `max_turns` is exhausted or the stop
    /// condition fires. A failed turn aborts the run; the error carries the
    /// transcript built so far.
    pub async fn run(
        &self,
        options: ConversationOptions,
    ) -> Result<ConversationTranscript, ConversationAborted> {
        let ConversationOptions {
            starting_message,
            starting_participant,
            max_turns,
            stop_condition,
            initial_transcript,
            turn: turn_options,
        } = options;

        let mut transcript = initial_transcript.unwrap_or_default();

        let mut cursor = match &starting_participant {
            None => 0,
            Some(name) => {
                match self
                    .participants
                    .iter()
                    .position(|p| p.name() == name.as_str())
                {
                    Some(index) => index,
                    None => {
                        return Err(ConversationAborted {
                            transcript,
                            source: EngineError::config(format!(
                                "starting participant '{}' not found in participants",
                                name
                            )),
                        });
                    }
                }
            }
        };

        info!(
            participants = self.participants.len(),
            max_turns,
            continued_turns = transcript.len(),
            "Starting conversation run"
        );

        let mut current_message = starting_message;

        for _ in 0..max_turns {
            let participant = &self.participants[cursor];
            let history = transcript_history(&transcript);

            let runner = match (self.tools.is_empty(), self.executor.as_deref()) {
                (false, Some(executor)) => {
                    TurnRunner::with_tools(participant, &self.tools, executor)
                }
                _ => TurnRunner::new(participant),
            };

            debug!(
                participant = %participant.name(),
                history_len = history.len(),
                "Running turn"
            );

            let outcome = match runner
                .run_turn(&history, Some(&current_message), &turn_options)
                .await
            {
                Ok(outcome) => outcome,
                Err(source) => {
                    warn!(
                        participant = %participant.name(),
                        error = %source,
                        "Turn failed, aborting conversation"
                    );
                    return Err(ConversationAborted { transcript, source });
                }
            };

            current_message = outcome.message().text().to_string();
            transcript.push(ConversationTurn {
                participant: participant.name().to_string(),
                message: outcome.response.message,
                invocations: outcome.invocations,
                stop_reason: outcome.stop_reason,
            });

            cursor = (cursor + 1) % self.participants.len();

            if let Some(stop) = &stop_condition {
                if stop(&transcript) {
                    debug!(turns = transcript.len(), "Stop condition met");
                    break;
                }
            }
        }

        info!(turns = transcript.len(), "Conversation run finished");
        Ok(transcript)
    }
}

/// Renders the transcript as the plain user/assistant history handed to the
/// next participant: alternating roles by absolute turn parity.
fn transcript_history(transcript: &ConversationTranscript) -> Vec<ChatMessage> {
    transcript
        .turns()
        .iter()
        .enumerate()
        .map(|(index, turn)| {
            if index % 2 == 0 {
                ChatMessage::user(turn.text())
            } else {
                ChatMessage::assistant(turn.text())
            }
        })
        .collect()
}
