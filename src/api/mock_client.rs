use crate::api::client::{ByteStream, MockStreamProducer};
use crate::types::ChatMessage;
use anyhow::Result;
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};

/// Scripted byte streams standing in for the network in tests. Each inner
/// `Vec<String>` is one response; each string becomes one transport chunk,
/// framed with the record sentinel when it does not already end with one.
#[derive(Clone)]
pub struct MockApiClient {
    responses: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockApiClient {
    pub fn new(responses: Vec<Vec<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }
}

impl MockStreamProducer for MockApiClient {
    fn create_mock_stream(&self, _messages: &[ChatMessage]) -> Result<ByteStream> {
        let mut responses_guard = self.responses.lock().unwrap();
        if responses_guard.is_empty() {
            return Err(anyhow::anyhow!(
                "MockApiClient: no more responses configured"
            ));
        }
        let records = responses_guard.remove(0);

        let byte_chunks: Vec<Result<Bytes>> = records
            .into_iter()
            .map(|record| {
                let framed = if record.ends_with("\n\n") {
                    record
                } else {
                    format!("{record}\n\n")
                };
                Ok(Bytes::from(framed))
            })
            .collect();

        Ok(Box::pin(stream::iter(byte_chunks)))
    }
}
