//! End-to-end scenarios against real models.
//!
//! These tests bootstrap the embedded runtime, download models, and run
//! inference, so they are ignored by default. Run them explicitly with
//! `--ignored` on a machine with network access and disk space to spare.

use hfbridge::prelude::*;
use std::sync::Arc;

const SENTIMENT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
const GENERATION_MODEL: &str = "facebook/opt-125m";
const EMBEDDING_MODEL: &str = "nomic-ai/nomic-embed-text-v1.5";
const DETECTION_MODEL: &str = "facebook/detr-resnet-50";

#[test]
#[ignore]
fn classifies_positive_sentiment() {
    let pipeline =
        TextClassificationPipeline::from_model(SENTIMENT_MODEL, &PipelineOptions::new()).unwrap();

    let results = pipeline.classify("I love programming!").unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].label, "POSITIVE");
    assert!(results[0].score > 0.9);
}

#[test]
#[ignore]
fn batch_classification_preserves_input_order() {
    let pipeline =
        TextClassificationPipeline::from_model(SENTIMENT_MODEL, &PipelineOptions::new()).unwrap();

    let inputs = vec![
        "I love programming!".to_string(),
        "I hate mondays.".to_string(),
    ];
    let results = pipeline.classify_batch(&inputs).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label, "POSITIVE");
    assert_eq!(results[1].label, "NEGATIVE");
}

#[test]
#[ignore]
fn tokenizer_round_trips_through_ids() {
    let pipeline =
        TextGenerationPipeline::from_model(GENERATION_MODEL, &PipelineOptions::new()).unwrap();
    let tokenizer = pipeline.tokenizer().unwrap();

    let text = "How many helicopters can a human eat in one sitting?";
    let ids = tokenizer.encode_with_special_tokens(text).unwrap();
    assert_eq!(ids.len(), 12);
    assert_eq!(ids[0], 2);

    let decoded = tokenizer.decode(&ids).unwrap();
    assert_eq!(decoded, text);

    let (with_mask, mask) = tokenizer.encode_with_attention(text).unwrap();
    assert_eq!(with_mask.len(), mask.len());
    assert!(mask.iter().all(|&m| m == 1));
}

#[test]
#[ignore]
fn chat_generation_appends_an_assistant_reply() {
    let pipeline =
        TextGenerationPipeline::from_model(GENERATION_MODEL, &PipelineOptions::new()).unwrap();

    let messages = vec![ChatMessage::user("Say hello.")];
    let options = GenerationOptions::new().with_max_new_tokens(16);
    let transcript = pipeline.generate_chat(&messages, &options).unwrap();

    assert!(transcript.len() > messages.len());
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(transcript.last().unwrap().role, Role::Assistant);
}

#[tokio::test]
#[ignore]
async fn chat_client_streams_the_finished_turn() {
    use tokio_stream::StreamExt;

    let pipeline = tokio::task::spawn_blocking(|| {
        TextGenerationPipeline::from_model(GENERATION_MODEL, &PipelineOptions::new())
    })
    .await
    .unwrap()
    .unwrap();
    let client = PipelineChatClient::new(Arc::new(pipeline));

    let messages = vec![ChatMessage::user("Say hello.")];
    let options = GenerationOptions::new().with_max_new_tokens(16);

    let response = client
        .respond(messages.clone(), options.clone(), CancelToken::new())
        .await
        .unwrap();
    assert!(!response.replies().is_empty());

    let mut stream = client
        .stream_response(messages, options, CancelToken::new())
        .await
        .unwrap();
    let mut updates = Vec::new();
    while let Some(update) = stream.next().await {
        updates.push(update.unwrap());
    }
    assert!(!updates.is_empty());
    assert_eq!(updates.last().unwrap().role, Role::Assistant);
}

#[tokio::test]
#[ignore]
async fn cancelled_stream_yields_a_cancellation_error() {
    use tokio_stream::StreamExt;

    let pipeline = tokio::task::spawn_blocking(|| {
        TextGenerationPipeline::from_model(GENERATION_MODEL, &PipelineOptions::new())
    })
    .await
    .unwrap()
    .unwrap();
    let client = PipelineChatClient::new(Arc::new(pipeline));

    let cancel = CancelToken::new();
    cancel.cancel();
    let mut stream = client
        .stream_response(
            vec![ChatMessage::user("Say hello.")],
            GenerationOptions::new(),
            cancel,
        )
        .await
        .unwrap();

    let first = stream.next().await.unwrap();
    assert!(matches!(first.unwrap_err(), BridgeError::Cancelled(_)));
}

#[test]
#[ignore]
fn embeddings_are_fixed_width_and_ordered() {
    let options = SentenceTransformerOptions::new().with_trust_remote_code(true);
    let model = SentenceTransformer::from_model(EMBEDDING_MODEL, &options).unwrap();

    let sentences = vec![
        "The quick brown fox".to_string(),
        "jumps over the lazy dog".to_string(),
        "and lands on its feet".to_string(),
    ];
    let buffer = model.encode(&sentences).unwrap();
    let view = buffer.view2().unwrap();
    assert_eq!(view.rows(), 3);
    assert_eq!(view.cols(), 768);

    let single = model.encode_one("The quick brown fox").unwrap();
    assert_eq!(single.len(), 768);
}

#[test]
#[ignore]
fn detection_boxes_are_ordered_coordinates() {
    let pipeline =
        ObjectDetectionPipeline::from_model(DETECTION_MODEL, &PipelineOptions::new()).unwrap();

    let detections = pipeline
        .detect(
            "http://images.cocodataset.org/val2017/000000039769.jpg",
            &DetectionParams::new().with_threshold(0.9),
        )
        .unwrap();
    assert!(!detections.is_empty());
    for detection in &detections {
        assert!(detection.bounds.xmin <= detection.bounds.xmax);
        assert!(detection.bounds.ymin <= detection.bounds.ymax);
        assert!((0.0..=1.0).contains(&detection.score));
    }
}

#[test]
#[ignore]
fn disposal_is_terminal_and_idempotent() {
    let mut pipeline =
        TextClassificationPipeline::from_model(SENTIMENT_MODEL, &PipelineOptions::new()).unwrap();

    assert!(!pipeline.is_disposed());
    pipeline.dispose().unwrap();
    assert!(pipeline.is_disposed());
    pipeline.dispose().unwrap();

    assert!(matches!(
        pipeline.classify("still there?").unwrap_err(),
        BridgeError::Disposed(_)
    ));
}
