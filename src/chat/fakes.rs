// In-memory gateways for exercising sessions without a network

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::completion::CompletionProvider;
use super::conversation::Message;
use crate::embeddings::{EmbeddingProvider, IndexedEmbeddings};
use crate::{RagError, Result};

/// Looks every input up in a fixed table
#[derive(Debug, Default)]
pub(crate) struct FakeEmbedder {
    table: HashMap<String, Vec<f32>>,
}

impl FakeEmbedder {
    pub(crate) fn with(mut self, text: &str, vector: &[f32]) -> Self {
        self.table.insert(text.to_string(), vector.to_vec());
        self
    }
}

impl EmbeddingProvider for FakeEmbedder {
    fn embed(&self, inputs: &[String], _dimensions: u32) -> Result<IndexedEmbeddings> {
        inputs
            .iter()
            .enumerate()
            .map(|(position, input)| {
                self.table
                    .get(input)
                    .cloned()
                    .map(|vector| (position, vector))
                    .ok_or_else(|| RagError::Upstream {
                        status: 500,
                        body: format!("no vector for {:?}", input),
                    })
            })
            .collect()
    }
}

pub(crate) type RecordedRequests = Arc<Mutex<Vec<Vec<Message>>>>;

/// Replies from a script; `None` entries fail the turn
#[derive(Debug, Default)]
pub(crate) struct FakeCompleter {
    replies: Mutex<VecDeque<Option<String>>>,
    requests: RecordedRequests,
}

impl FakeCompleter {
    pub(crate) fn scripted(replies: &[Option<&str>]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.map(str::to_string)).collect()),
            requests: RecordedRequests::default(),
        }
    }

    pub(crate) fn requests(&self) -> RecordedRequests {
        Arc::clone(&self.requests)
    }
}

impl CompletionProvider for FakeCompleter {
    fn complete(&self, messages: &[Message]) -> Result<Message> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(messages.to_vec());

        let next = self.replies.lock().expect("replies lock").pop_front();
        match next {
            Some(Some(content)) => Ok(Message::assistant(content)),
            Some(None) => Err(RagError::Upstream {
                status: 503,
                body: "scripted failure".to_string(),
            }),
            None => Err(RagError::EmptyResponse("script exhausted".to_string())),
        }
    }
}
