use super::logging::emit_frame_parse_error;
use crate::types::StreamFrame;
use anyhow::Result;

/// Blank-line sentinel separating envelope records on the wire.
const RECORD_SEPARATOR: &str = "\n\n";
const DATA_PREFIX: &str = "data: ";

/// Reassembles transport chunks into decoded envelope frames.
///
/// Records split across chunks stay buffered until the sentinel arrives, so
/// any chunk boundary is safe. Malformed records are logged and skipped;
/// one bad frame never fails the stream.
#[derive(Default)]
pub struct FrameDecoder {
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one transport chunk and returns every frame it completed.
    pub fn process(&mut self, chunk: &[u8]) -> Result<Vec<StreamFrame>> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let mut frames = Vec::new();
        let mut start = 0;

        while let Some(end) = self.buffer[start..].find(RECORD_SEPARATOR) {
            let record_end = start + end + RECORD_SEPARATOR.len();
            let record = &self.buffer[start..record_end];

            let payload = record
                .lines()
                .find_map(|line| line.strip_prefix(DATA_PREFIX))
                .map(str::trim);

            if let Some(payload) = payload {
                match serde_json::from_str::<StreamFrame>(payload) {
                    Ok(frame) => frames.push(frame),
                    Err(error) => emit_frame_parse_error(payload, &error),
                }
            }

            start = record_end;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        Ok(frames)
    }

    /// Surrenders whatever undecoded tail remains at end of stream.
    pub fn flush(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
