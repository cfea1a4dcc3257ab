use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, MatchKind};

/// Bare fence token; closes any open block.
const FENCE: &str = "```";

/// Opening tokens that start a widget block. Any other fence, tagged or
/// bare, stays literal prose.
const OPENER_TOKENS: [&str; 4] = ["```json5\r\n", "```json5\n", "```json\r\n", "```json\n"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Markdown prose fragment.
    Text { text: String },
    /// Widget configuration (chart/table) parsed from a fenced JSON5 block.
    Widget { config: Value },
}

/// Fully classified content of one streamed reply.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalContent {
    pub items: Vec<ContentItem>,
    /// Raw model output, exactly as streamed. Always intact even when
    /// classification degraded.
    pub text: String,
}

#[derive(Debug, Default)]
enum FenceState {
    #[default]
    Prose,
    InFence {
        fragments: Vec<String>,
    },
}

/// Incremental classifier for streamed model text.
///
/// Feed every delta through [`parse_delta`](Self::parse_delta) in arrival
/// order, then call [`final_state`](Self::final_state) once the transport
/// reports completion. Fence tokens split across deltas are recognized once
/// the missing bytes arrive; unparsable fenced content degrades to prose
/// instead of failing the stream.
#[derive(Default)]
pub struct StreamingContentParser {
    full_text: String,
    pending: String,
    state: FenceState,
    emitted: Vec<ContentItem>,
    saw_delta: bool,
    finalized: bool,
}

impl StreamingContentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one delta and returns the items whose classification became
    /// final with it (typically zero or one).
    pub fn parse_delta(&mut self, delta: &str) -> Vec<ContentItem> {
        self.saw_delta = true;
        self.full_text.push_str(delta);
        self.pending.push_str(delta);

        let mut emitted = Vec::new();
        loop {
            let more = match self.state {
                FenceState::Prose => self.scan_prose(&mut emitted),
                FenceState::InFence { .. } => self.scan_fence(&mut emitted),
            };
            if !more {
                break;
            }
        }
        emitted
    }

    /// Returns the merged item history and the raw accumulated text.
    ///
    /// A still-open fence is resolved with the same parse-or-degrade logic
    /// used at fence close. Repeated calls return equal results. Calling
    /// before any `parse_delta` is caller misuse and fails.
    pub fn final_state(&mut self) -> Result<FinalContent> {
        if !self.saw_delta {
            bail!("final state requested before any delta was parsed");
        }

        if !self.finalized {
            self.finalized = true;
            match std::mem::take(&mut self.state) {
                FenceState::Prose => {
                    // Withheld prose (including a stray fence no opener ever
                    // resolved) surfaces verbatim once the stream is over.
                    let tail = std::mem::take(&mut self.pending);
                    let keeps = if matches!(self.emitted.last(), Some(ContentItem::Text { .. })) {
                        !tail.is_empty()
                    } else {
                        !tail.trim().is_empty()
                    };
                    if keeps {
                        self.emitted.push(ContentItem::Text { text: tail });
                    }
                }
                FenceState::InFence { mut fragments } => {
                    fragments.push(std::mem::take(&mut self.pending));
                    if let Some(item) = classify_fence_body(&fragments.concat()) {
                        self.emitted.push(item);
                    }
                }
            }
        }

        Ok(FinalContent {
            items: merge_adjacent_text(&self.emitted),
            text: self.full_text.clone(),
        })
    }

    /// Prose scan: split on the next opener if present, otherwise emit what
    /// cannot belong to a future marker. Returns true when a fence opened
    /// and the remainder still needs scanning.
    fn scan_prose(&mut self, emitted: &mut Vec<ContentItem>) -> bool {
        if let Some(found) = opener_automaton().find(&self.pending) {
            let before = self.pending[..found.start()].to_string();
            self.pending.drain(..found.end());
            if self.keeps_prose(&before) {
                self.emit(ContentItem::Text { text: before }, emitted);
            }
            self.state = FenceState::InFence {
                fragments: Vec::new(),
            };
            return true;
        }

        // Withhold a trailing partial opener so a token split across deltas
        // is still recognized once the missing bytes arrive.
        let hold = partial_token_suffix(&self.pending, &OPENER_TOKENS);
        let cut = self.pending.len() - hold;
        if cut > 0 && self.keeps_prose(&self.pending[..cut]) {
            let text: String = self.pending.drain(..cut).collect();
            self.emit(ContentItem::Text { text }, emitted);
        }
        false
    }

    /// Whether a prose fragment belongs in the item stream yet. At a
    /// paragraph start (nothing emitted, or a widget emitted last),
    /// whitespace-only fragments and fragments led by a stray fence are held
    /// back: a later opener suppresses them as noise, otherwise they surface
    /// intact at finalize. Once prose is flowing every fragment is kept, so
    /// merged output stays byte-faithful no matter where chunks were cut.
    fn keeps_prose(&self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        if matches!(self.emitted.last(), Some(ContentItem::Text { .. })) {
            return true;
        }
        !fragment.trim().is_empty() && !fragment.trim_start().starts_with(FENCE)
    }

    /// Fence scan: close on the next bare fence token, otherwise bank the
    /// classifiable part of the buffer. Returns true when the fence closed.
    fn scan_fence(&mut self, emitted: &mut Vec<ContentItem>) -> bool {
        let Some(pos) = self.pending.find(FENCE) else {
            let hold = partial_token_suffix(&self.pending, &[FENCE]);
            let cut = self.pending.len() - hold;
            if cut > 0 {
                let fragment: String = self.pending.drain(..cut).collect();
                if let FenceState::InFence { fragments } = &mut self.state {
                    fragments.push(fragment);
                }
            }
            return false;
        };

        let body_tail = self.pending[..pos].to_string();
        self.pending.drain(..pos + FENCE.len());
        let FenceState::InFence { mut fragments } = std::mem::take(&mut self.state) else {
            return false;
        };
        fragments.push(body_tail);
        if let Some(item) = classify_fence_body(&fragments.concat()) {
            self.emit(item, emitted);
        }
        true
    }

    fn emit(&mut self, item: ContentItem, out: &mut Vec<ContentItem>) {
        self.emitted.push(item.clone());
        out.push(item);
    }
}

/// Parse a fence body as JSON5, degrading to literal prose on failure.
/// Empty bodies produce nothing.
fn classify_fence_body(body: &str) -> Option<ContentItem> {
    match json5::from_str::<Value>(body) {
        Ok(config) => Some(ContentItem::Widget { config }),
        Err(_) if body.trim().is_empty() => None,
        Err(_) => Some(ContentItem::Text {
            text: body.to_string(),
        }),
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of one of
/// the ASCII marker `tokens` (case-insensitive), i.e. bytes that may still
/// grow into a marker once more of the stream arrives.
fn partial_token_suffix(text: &str, tokens: &[&str]) -> usize {
    let bytes = text.as_bytes();
    let longest = tokens.iter().map(|t| t.len() - 1).max().unwrap_or(0);
    for len in (1..=longest.min(bytes.len())).rev() {
        let tail = &bytes[bytes.len() - len..];
        let matches_token = tokens
            .iter()
            .any(|token| len < token.len() && token.as_bytes()[..len].eq_ignore_ascii_case(tail));
        if matches_token {
            return len;
        }
    }
    0
}

fn merge_adjacent_text(items: &[ContentItem]) -> Vec<ContentItem> {
    let mut merged: Vec<ContentItem> = Vec::with_capacity(items.len());
    for item in items {
        match (merged.last_mut(), item) {
            (Some(ContentItem::Text { text: tail }), ContentItem::Text { text }) => {
                tail.push_str(text);
            }
            _ => merged.push(item.clone()),
        }
    }
    merged
}

fn opener_automaton() -> &'static AhoCorasick {
    static AUTOMATON: OnceLock<AhoCorasick> = OnceLock::new();
    AUTOMATON.get_or_init(|| {
        AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(OPENER_TOKENS)
            .expect("fence opener patterns must compile")
    })
}
