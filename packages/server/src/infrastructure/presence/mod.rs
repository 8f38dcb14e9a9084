//! タイピングプレゼンス管理

mod typing;

pub use typing::{TypingTracker, DEFAULT_TYPING_TTL};
