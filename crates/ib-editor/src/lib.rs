pub mod commands;
pub mod engine;
pub mod input;
pub mod shortcuts;
pub mod tools;

pub use commands::{History, Snapshot};
pub use engine::{BoardEngine, BoardMutation};
pub use input::InputEvent;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::ToolKind;
