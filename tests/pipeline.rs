//! End-to-end pipeline tests with stubbed embedding and generation
//! backends against the in-memory index.

use std::io::Write;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ragpipe::config::Config;
use ragpipe::embedding::EmbeddingClient;
use ragpipe::error::RagError;
use ragpipe::generation::GenerationClient;
use ragpipe::index::InMemoryIndex;
use ragpipe::ingest::IngestionPipeline;
use ragpipe::models::{ConversationTurn, DocumentHandle, GenerationRequest};
use ragpipe::query::QueryPipeline;

const DIMS: usize = 8;

/// Deterministic embedding stub: a fixed-dimensionality vector derived
/// from text length, so distinct chunks get distinct vectors.
struct StubEmbedding;

#[async_trait]
impl EmbeddingClient for StubEmbedding {
    fn dims(&self) -> usize {
        DIMS
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let len = text.len() as f32;
        Ok((0..DIMS).map(|i| (len + i as f32) / (len + 1.0)).collect())
    }
}

/// Embedding stub that fails after a fixed number of successful calls.
struct FlakyEmbedding {
    calls: Mutex<usize>,
    fail_after: usize,
}

#[async_trait]
impl EmbeddingClient for FlakyEmbedding {
    fn dims(&self) -> usize {
        DIMS
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        let mut calls = self.calls.lock().unwrap();
        if *calls >= self.fail_after {
            bail!("embedding backend went away");
        }
        *calls += 1;
        Ok(vec![1.0; DIMS])
    }
}

/// Generation stub that records every request it receives.
struct RecordingGeneration {
    requests: Mutex<Vec<GenerationRequest>>,
    reply: &'static str,
}

impl RecordingGeneration {
    fn new(reply: &'static str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply,
        }
    }
}

#[async_trait]
impl GenerationClient for RecordingGeneration {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.to_string())
    }
}

fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> DocumentHandle {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    DocumentHandle::new(path)
}

#[tokio::test]
async fn ingests_2500_chars_as_four_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let handle = write_temp(&dir, "doc.txt", &"x".repeat(2500));

    let config = Config::default();
    let embeddings = StubEmbedding;
    let index = InMemoryIndex::new(DIMS);
    let pipeline = IngestionPipeline::new(&embeddings, &index, &config.chunking);

    let indexed = pipeline.ingest(&handle).await.unwrap();
    assert_eq!(indexed, 4);
    assert_eq!(index.len(), 4);
}

#[tokio::test]
async fn retrieved_context_reaches_the_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let fact = "Paris is the capital of France.";
    let handle = write_temp(&dir, "facts.txt", fact);

    let config = Config::default();
    let embeddings = StubEmbedding;
    let index = InMemoryIndex::new(DIMS);
    IngestionPipeline::new(&embeddings, &index, &config.chunking)
        .ingest(&handle)
        .await
        .unwrap();

    let generation = RecordingGeneration::new("Paris.");
    let pipeline = QueryPipeline::new(&embeddings, &index, &generation, &config);
    let answer = pipeline
        .answer("What is the capital of France?", &[])
        .await
        .unwrap();
    assert_eq!(answer, "Paris.");

    let requests = generation.requests.lock().unwrap();
    assert_eq!(requests.len(), 1, "exactly one generation call per query");
    let grounded = requests[0].messages.last().unwrap();
    assert!(
        grounded.text.contains(fact),
        "grounded message should carry the retrieved chunk: {}",
        grounded.text
    );
    assert!(grounded.text.contains("What is the capital of France?"));
}

#[tokio::test]
async fn unsupported_format_indexes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let handle = write_temp(&dir, "report.docx", "binary-ish contents");

    let config = Config::default();
    let embeddings = StubEmbedding;
    let index = InMemoryIndex::new(DIMS);
    let pipeline = IngestionPipeline::new(&embeddings, &index, &config.chunking);

    let err = pipeline.ingest(&handle).await.unwrap_err();
    assert!(matches!(err, RagError::UnsupportedFormat(_)));
    assert!(index.is_empty());
}

#[tokio::test]
async fn embedding_failure_mid_ingest_reports_partial_progress() {
    let dir = tempfile::tempdir().unwrap();
    // 2500 chars at the default 1000/200 settings yields four chunks.
    let handle = write_temp(&dir, "doc.txt", &"y".repeat(2500));

    let config = Config::default();
    let embeddings = FlakyEmbedding {
        calls: Mutex::new(0),
        fail_after: 2,
    };
    let index = InMemoryIndex::new(DIMS);
    let pipeline = IngestionPipeline::new(&embeddings, &index, &config.chunking);

    let err = pipeline.ingest(&handle).await.unwrap_err();
    match err {
        RagError::PartialIngestion {
            chunks_indexed,
            chunks_failed,
            ..
        } => {
            assert_eq!(chunks_indexed, 2);
            assert_eq!(chunks_failed, 2);
        }
        other => panic!("expected PartialIngestion, got {other}"),
    }
    assert_eq!(index.len(), 2, "chunks indexed before the failure persist");
}

#[tokio::test]
async fn empty_index_still_generates_an_answer() {
    let config = Config::default();
    let embeddings = StubEmbedding;
    let index = InMemoryIndex::new(DIMS);
    let generation = RecordingGeneration::new("I don't have documents on that.");

    let pipeline = QueryPipeline::new(&embeddings, &index, &generation, &config);
    let answer = pipeline.answer("Anything there?", &[]).await.unwrap();
    assert_eq!(answer, "I don't have documents on that.");

    let requests = generation.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let grounded = requests[0].messages.last().unwrap();
    assert!(grounded.text.starts_with("Context:"));
    assert!(grounded.text.contains("Question: Anything there?"));
}

#[tokio::test]
async fn history_precedes_grounded_message() {
    let config = Config::default();
    let embeddings = StubEmbedding;
    let index = InMemoryIndex::new(DIMS);
    let generation = RecordingGeneration::new("second answer");
    let history = vec![
        ConversationTurn::user("first question"),
        ConversationTurn::assistant("first answer"),
    ];

    let pipeline = QueryPipeline::new(&embeddings, &index, &generation, &config);
    pipeline.answer("second question", &history).await.unwrap();

    let requests = generation.requests.lock().unwrap();
    let messages = &requests[0].messages;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].text, "first question");
    assert_eq!(messages[1].text, "first answer");
    assert!(messages[2].text.contains("second question"));
}
