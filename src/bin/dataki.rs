use anyhow::{bail, Result};
use futures::StreamExt;
use std::io::{Read, Write};

use dataki::api::stream::FrameDecoder;
use dataki::api::ApiClient;
use dataki::config::Config;
use dataki::state::{ChatTurn, ContentItem};
use dataki::types::ChatMessage;

#[tokio::main]
async fn main() -> Result<()> {
    let prompt = read_prompt()?;

    let config = Config::load()?;
    config.validate()?;

    let client = ApiClient::new(&config);
    let messages = vec![ChatMessage::user(prompt)];
    let mut stream = client.create_stream(&messages).await?;

    let mut decoder = FrameDecoder::new();
    let mut turn = ChatTurn::new();
    let mut stdout = std::io::stdout();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for frame in decoder.process(&chunk)? {
            for item in turn.apply_frame(frame) {
                if let ContentItem::Text { text } = item {
                    stdout.write_all(text.as_bytes())?;
                    stdout.flush()?;
                }
            }
        }
    }

    let leftover = decoder.flush();
    if !leftover.trim().is_empty() {
        eprintln!("warning: stream ended with an incomplete record: {leftover:?}");
    }

    let content = turn.finish()?;
    stdout.write_all(b"\n")?;

    let widgets: Vec<_> = content
        .items
        .iter()
        .filter_map(|item| match item {
            ContentItem::Widget { config } => Some(config),
            ContentItem::Text { .. } => None,
        })
        .collect();

    for (index, config) in widgets.iter().enumerate() {
        println!("--- widget {} ---", index + 1);
        println!("{}", serde_json::to_string_pretty(config)?);
    }

    Ok(())
}

fn read_prompt() -> Result<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let prompt = input.trim().to_string();
    if prompt.is_empty() {
        bail!("usage: dataki <prompt>  (or pipe the prompt on stdin)");
    }
    Ok(prompt)
}
