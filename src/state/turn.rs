use super::content::{ContentItem, FinalContent, StreamingContentParser};
use crate::types::StreamFrame;
use anyhow::{bail, Result};

/// Lifecycle of one streamed reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TurnOutcome {
    #[default]
    Streaming,
    Complete,
    Failed {
        message: String,
    },
}

/// Assembles one streaming response: routes decoded frames into the content
/// parser and tracks the turn outcome. One instance per response, driven
/// serially in frame-arrival order.
#[derive(Default)]
pub struct ChatTurn {
    parser: StreamingContentParser,
    outcome: TurnOutcome,
    deltas_seen: bool,
    result_text: Option<String>,
}

impl ChatTurn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> &TurnOutcome {
        &self.outcome
    }

    /// Routes one decoded frame, returning items whose classification became
    /// final with it. Frames arriving after the terminal frame are ignored.
    pub fn apply_frame(&mut self, frame: StreamFrame) -> Vec<ContentItem> {
        if self.outcome != TurnOutcome::Streaming {
            return Vec::new();
        }

        match frame {
            StreamFrame::Delta { message } => {
                self.deltas_seen = true;
                self.parser.parse_delta(&message.text)
            }
            StreamFrame::Result { result } => {
                self.outcome = TurnOutcome::Complete;
                self.result_text = result.text;
                Vec::new()
            }
            StreamFrame::Error { error } => {
                self.outcome = TurnOutcome::Failed {
                    message: error.message,
                };
                Vec::new()
            }
        }
    }

    /// Final classified content for the turn.
    ///
    /// When the backend repeats the full response in the result frame, that
    /// text is authoritative for the raw-text field; a turn that carried no
    /// deltas at all is classified from it wholesale.
    pub fn finish(mut self) -> Result<FinalContent> {
        if let TurnOutcome::Failed { message } = &self.outcome {
            bail!("chat stream failed: {message}");
        }

        if !self.deltas_seen {
            match self.result_text.take() {
                Some(text) if !text.is_empty() => {
                    self.parser.parse_delta(&text);
                }
                _ => bail!("chat stream ended without content"),
            }
        }

        let mut content = self.parser.final_state()?;
        if let Some(text) = self.result_text {
            if !text.is_empty() {
                content.text = text;
            }
        }
        Ok(content)
    }
}
