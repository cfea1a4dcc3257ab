mod content;
mod turn;

#[cfg(test)]
mod tests;

pub use content::{ContentItem, FinalContent, StreamingContentParser};
pub use turn::{ChatTurn, TurnOutcome};
