//! Sentiment classification example.
//!
//! Loads a small text classification model, classifies a single sentence
//! and a batch, then releases the pipeline. The first run bootstraps the
//! runtime environment and downloads the model, so it takes a while.

use hfbridge::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hfbridge=debug".into()),
        )
        .init();

    let mut pipeline = TextClassificationPipeline::from_model(
        "distilbert/distilbert-base-uncased-finetuned-sst-2-english",
        &PipelineOptions::new(),
    )?;
    println!("device: {}", pipeline.device());

    for scored in pipeline.classify("I love programming!")? {
        println!("{}: {:.4}", scored.label, scored.score);
    }

    let inputs = vec![
        "I love programming!".to_string(),
        "I hate mondays.".to_string(),
    ];
    for (input, scored) in inputs.iter().zip(pipeline.classify_batch(&inputs)?) {
        println!("{input:?} -> {}: {:.4}", scored.label, scored.score);
    }

    pipeline.dispose()?;
    Ok(())
}
