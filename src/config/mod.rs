// Configuration management module
// TOML settings, environment overrides and the interactive editor

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{API_KEY_ENV, Config, ConfigError, ConversationConfig, OpenAiConfig, RetrievalConfig};
