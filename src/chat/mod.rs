// Chat module
// Conversation state, the completion gateway and the retrieve -> augment ->
// generate session loop

pub mod completion;
pub mod console;
pub mod conversation;
pub mod prompt;
pub mod session;

pub use completion::{CompletionProvider, OpenAiChatClient};
pub use conversation::{Conversation, HistoryPolicy, Message, Role};
pub use session::ChatSession;

#[cfg(test)]
pub(crate) mod fakes;
