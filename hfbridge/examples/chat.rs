//! Streaming chat example.
//!
//! Runs one chat turn against a small generation model through the async
//! client, printing updates as the synthesized stream yields them.

use futures::StreamExt;
use hfbridge::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hfbridge=debug".into()),
        )
        .init();

    let pipeline = tokio::task::spawn_blocking(|| {
        TextGenerationPipeline::from_model("Qwen/Qwen2.5-0.5B-Instruct", &PipelineOptions::new())
    })
    .await??;
    let client = PipelineChatClient::new(Arc::new(pipeline));

    let messages = vec![
        ChatMessage::system("You are a concise assistant."),
        ChatMessage::user("Name three things Rust is good at."),
    ];
    let options = GenerationOptions::new().with_max_new_tokens(128);

    let mut stream = client
        .stream_response(messages, options, CancelToken::new())
        .await?;
    while let Some(update) = stream.next().await {
        let update = update?;
        println!("[{}] {}", update.role.as_str(), update.content);
    }

    Ok(())
}
