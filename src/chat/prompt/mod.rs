
use itertools::Itertools;

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const QUERY_PLACEHOLDER: &str = "{query}";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a RAG-powered assistant that answers user questions about the ingested documents.

## Structure of User message:
`RAG CONTEXT` - Retrieved documents relevant to the query.
`USER QUESTION` - The user's actual question.

## Instructions:
- Use information from `RAG CONTEXT` as context when answering the `USER QUESTION`.
- Cite specific sources when using information from the context.
- Answer ONLY based on conversation history and RAG context.
- If no relevant information exists in `RAG CONTEXT` or conversation history, state that you cannot answer the question.
";

pub const DEFAULT_USER_PROMPT: &str = "##RAG CONTEXT:\n{context}\n\n\n##USER QUESTION: \n{query}";

/// Newline-joined block of retrieved chunk texts
#[inline]
pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks.iter().map(AsRef::as_ref).join("\n")
}

/// Substitute `context` and `query` into `template`.
///
/// Substitution happens in one pass over the template, so placeholder text
/// inside either value is left as-is.
#[inline]
pub fn render_user_prompt(template: &str, context: &str, query: &str) -> String {
    template
        .split(CONTEXT_PLACEHOLDER)
        .map(|part| part.replace(QUERY_PLACEHOLDER, query))
        .join(context)
}
