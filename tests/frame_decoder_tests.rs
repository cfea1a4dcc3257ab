use dataki::api::stream::FrameDecoder;
use dataki::types::StreamFrame;

#[test]
fn test_fragmented_frame_across_chunks() {
    let mut decoder = FrameDecoder::new();

    let chunk1 = b"data: {\"message\":{\"text\":\"Hel";
    let frames1 = decoder.process(chunk1).expect("first chunk");
    assert_eq!(frames1.len(), 0);

    let chunk2 = b"lo\"}}\n\n";
    let frames2 = decoder.process(chunk2).expect("second chunk");
    assert_eq!(frames2.len(), 1);

    match &frames2[0] {
        StreamFrame::Delta { message } => assert_eq!(message.text, "Hello"),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_multiple_frames_in_one_chunk() {
    let mut decoder = FrameDecoder::new();

    let chunk =
        b"data: {\"message\":{\"text\":\"a\"}}\n\ndata: {\"message\":{\"text\":\"b\"}}\n\n";
    let frames = decoder.process(chunk).expect("chunk");
    assert_eq!(frames.len(), 2);
}

#[test]
fn test_invalid_frame_json_is_skipped() {
    let mut decoder = FrameDecoder::new();

    let chunk = b"data: {invalid json}\n\ndata: {\"message\":{\"text\":\"ok\"}}\n\n";
    let frames = decoder
        .process(chunk)
        .expect("bad frame must not fail the stream");
    assert_eq!(frames.len(), 1);
    match &frames[0] {
        StreamFrame::Delta { message } => assert_eq!(message.text, "ok"),
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_unknown_envelope_shape_is_skipped() {
    let mut decoder = FrameDecoder::new();

    let chunk = b"data: {\"heartbeat\":true}\n\n";
    let frames = decoder.process(chunk).expect("chunk");
    assert!(frames.is_empty());
}

#[test]
fn test_result_and_error_frames_decode() {
    let mut decoder = FrameDecoder::new();

    let chunk = b"data: {\"result\":{\"text\":\"full reply\"}}\n\ndata: {\"error\":{\"message\":\"boom\",\"status\":\"INTERNAL\"}}\n\n";
    let frames = decoder.process(chunk).expect("chunk");
    assert_eq!(frames.len(), 2);

    match &frames[0] {
        StreamFrame::Result { result } => assert_eq!(result.text.as_deref(), Some("full reply")),
        other => panic!("unexpected frame: {other:?}"),
    }
    match &frames[1] {
        StreamFrame::Error { error } => {
            assert_eq!(error.message, "boom");
            assert_eq!(error.status.as_deref(), Some("INTERNAL"));
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn test_records_without_data_line_are_ignored() {
    let mut decoder = FrameDecoder::new();

    let chunk = b": keepalive\n\ndata: {\"message\":{\"text\":\"x\"}}\n\n";
    let frames = decoder.process(chunk).expect("chunk");
    assert_eq!(frames.len(), 1);
}

#[test]
fn test_flush_returns_undecoded_tail() {
    let mut decoder = FrameDecoder::new();

    decoder
        .process(b"data: {\"message\":{\"text\":\"done\"}}\n\ndata: {\"mess")
        .expect("chunk");
    assert_eq!(decoder.flush(), "data: {\"mess");
    assert_eq!(decoder.flush(), "");
}
