pub mod hit;
pub mod scene;

pub use hit::{Hit, hit_test, hit_test_anchor};
pub use scene::{DrawCmd, SceneOverlay, build_scene};
