
use tracing::{debug, info};

use super::completion::CompletionProvider;
use super::conversation::{Conversation, Message};
use super::prompt::{build_context, render_user_prompt};
use crate::config::{ConversationConfig, RetrievalConfig};
use crate::database::VectorStore;
use crate::embeddings::EmbeddingProvider;
use crate::{RagError, Result};

/// One chat session: retrieves context for each question, asks the model
/// and keeps the transcript.
pub struct ChatSession<E, C> {
    embedder: E,
    completer: C,
    store: VectorStore,
    retrieval: RetrievalConfig,
    settings: ConversationConfig,
    conversation: Conversation,
}

impl<E: EmbeddingProvider, C: CompletionProvider> ChatSession<E, C> {
    #[inline]
    pub fn new(
        embedder: E,
        completer: C,
        store: VectorStore,
        retrieval: RetrievalConfig,
        settings: ConversationConfig,
    ) -> Self {
        let conversation = Conversation::new(settings.system_prompt.clone());

        Self {
            embedder,
            completer,
            store,
            retrieval,
            settings,
            conversation,
        }
    }

    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[inline]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Chunk texts within the configured distance of `query`, nearest first
    #[inline]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        let mut embeddings = self
            .embedder
            .embed(&[query.to_string()], self.retrieval.dimensions)?;
        let query_embedding = embeddings
            .remove(&0)
            .ok_or_else(|| RagError::EmptyResponse("No embedding returned for query".to_string()))?;

        self.store
            .search(
                &query_embedding,
                self.retrieval.top_k,
                self.retrieval.score_threshold,
                self.retrieval.metric,
            )
            .await
    }

    /// Run one retrieve, augment and generate turn.
    ///
    /// The augmented question and the reply are appended to the transcript
    /// only once the reply has arrived; on any error the transcript is
    /// left untouched.
    #[inline]
    pub async fn ask(&mut self, query: &str) -> Result<Message> {
        let retrieved = self.retrieve(query).await?;
        info!("Retrieved {} chunks for query", retrieved.len());

        let context = build_context(&retrieved);
        let augmented = Message::user(render_user_prompt(
            &self.settings.user_prompt,
            &context,
            query,
        ));

        let request = self
            .conversation
            .request_messages(self.settings.history, &augmented);
        debug!(
            "Sending {} of {} messages",
            request.len(),
            self.conversation.len() + 1
        );

        let reply = self.completer.complete(&request)?;

        self.conversation.push(augmented);
        self.conversation.push(reply.clone());

        Ok(reply)
    }
}
