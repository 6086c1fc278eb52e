//! External tool abstractions
//!
//! Trait-based wrappers around external programs, so the embed-save hook can be
//! replaced by a mock in tests.

pub mod command;
pub mod embed;

pub use command::{CommandError, CommandExecutor, CommandOutput, ProcessCommandExecutor};
pub use embed::{
    embed_save_trigger_from_config, CommandEmbedSaveTrigger, EmbedSaveRequest, EmbedSaveTrigger,
    UnconfiguredEmbedSaveTrigger, EMBED_TOKEN_ENV,
};
