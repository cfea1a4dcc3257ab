use super::{ChatTurn, ContentItem, TurnOutcome};
use crate::api::mock_client::MockApiClient;
use crate::api::stream::FrameDecoder;
use crate::api::ApiClient;
use crate::types::ChatMessage;
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;

async fn run_turn(records: Vec<String>) -> (ChatTurn, Vec<ContentItem>) {
    let client = ApiClient::new_mock(Arc::new(MockApiClient::new(vec![records])));
    let mut stream = client
        .create_stream(&[ChatMessage::user("show revenue by month")])
        .await
        .expect("mock stream");

    let mut decoder = FrameDecoder::new();
    let mut turn = ChatTurn::new();
    let mut streamed = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.expect("mock chunk");
        for frame in decoder.process(&chunk).expect("decode") {
            streamed.extend(turn.apply_frame(frame));
        }
    }
    (turn, streamed)
}

#[tokio::test]
async fn test_turn_classifies_prose_and_widget_end_to_end() {
    let records = vec![
        r#"data: {"message":{"text":"Here is the chart:\n"}}"#.to_string(),
        r#"data: {"message":{"text":"```json\n{\"type\":\"chart\",\"sql\""}}"#.to_string(),
        r#"data: {"message":{"text":":\"SELECT 1\"}\n```\nAnything else?"}}"#.to_string(),
        r#"data: {"result":{}}"#.to_string(),
    ];

    let (turn, streamed) = run_turn(records).await;
    assert_eq!(turn.outcome(), &TurnOutcome::Complete);
    assert!(streamed.contains(&ContentItem::Text {
        text: "Here is the chart:\n".to_string()
    }));

    let content = turn.finish().expect("final content");
    assert_eq!(
        content.items,
        vec![
            ContentItem::Text {
                text: "Here is the chart:\n".to_string()
            },
            ContentItem::Widget {
                config: json!({"type": "chart", "sql": "SELECT 1"})
            },
            ContentItem::Text {
                text: "\nAnything else?".to_string()
            },
        ]
    );
    assert_eq!(
        content.text,
        "Here is the chart:\n```json\n{\"type\":\"chart\",\"sql\":\"SELECT 1\"}\n```\nAnything else?"
    );
}

#[tokio::test]
async fn test_turn_result_text_is_authoritative_for_raw_text() {
    let records = vec![
        r#"data: {"message":{"text":"partial"}}"#.to_string(),
        r#"data: {"result":{"text":"partial plus the tail the deltas dropped"}}"#.to_string(),
    ];

    let (turn, _) = run_turn(records).await;
    let content = turn.finish().expect("final content");
    assert_eq!(content.text, "partial plus the tail the deltas dropped");
    assert_eq!(
        content.items,
        vec![ContentItem::Text {
            text: "partial".to_string()
        }]
    );
}

#[tokio::test]
async fn test_turn_without_deltas_classifies_result_text() {
    let records = vec![r#"data: {"result":{"text":"All done."}}"#.to_string()];

    let (turn, streamed) = run_turn(records).await;
    assert!(streamed.is_empty());
    let content = turn.finish().expect("final content");
    assert_eq!(
        content.items,
        vec![ContentItem::Text {
            text: "All done.".to_string()
        }]
    );
}

#[tokio::test]
async fn test_turn_error_frame_fails_finish() {
    let records = vec![
        r#"data: {"message":{"text":"thinking..."}}"#.to_string(),
        r#"data: {"error":{"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#.to_string(),
    ];

    let (turn, _) = run_turn(records).await;
    assert_eq!(
        turn.outcome(),
        &TurnOutcome::Failed {
            message: "quota exceeded".to_string()
        }
    );
    let error = turn.finish().expect_err("failed turn must not finish");
    assert!(error.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn test_frames_after_terminal_frame_are_ignored() {
    let records = vec![
        r#"data: {"message":{"text":"done"}}"#.to_string(),
        r#"data: {"result":{}}"#.to_string(),
        r#"data: {"message":{"text":" straggler"}}"#.to_string(),
    ];

    let (turn, _) = run_turn(records).await;
    let content = turn.finish().expect("final content");
    assert_eq!(
        content.items,
        vec![ContentItem::Text {
            text: "done".to_string()
        }]
    );
    assert_eq!(content.text, "done");
}
