pub mod config;
pub mod graph;
pub mod group;
pub mod id;
pub mod lint;
pub mod minimap;
pub mod model;
pub mod persist;
pub mod stroke;
pub mod transform;

pub use config::{BoardConfig, ConfigError};
pub use group::GroupTable;
pub use id::ElementId;
pub use lint::{BoardDiagnostic, LintSeverity, lint_board};
pub use minimap::{Minimap, MinimapItem, MinimapLayout};
pub use model::*;
pub use persist::{BoardDocument, BoardStore, MemoryStore, PersistError};
pub use stroke::{EraseMode, StrokeBuilder};
pub use transform::{Camera, Pan, Viewport};
