mod api;

pub use api::{ChatMessage, DeltaPayload, ErrorPayload, ResultPayload, StreamFrame};
