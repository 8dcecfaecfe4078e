//=========================================================================
// Engine Core
//
// All simulation-side systems: the timeline mechanism, actors, scenes,
// asset storage, and the render boundary.
//
// The core never touches the OS. Time arrives through `Scene::advance_time`
// and pixels leave through the `render::Surface` trait; everything between
// is deterministic, single-threaded state.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod actor;
pub mod assets;
pub mod render;
pub mod scene;
pub mod schedule;

//=== Public API ==========================================================

pub use actor::{Actor, ActorAction, ActorId, Orientation};
pub use assets::{AssetCatalog, AssetError, SpriteFrame, SpriteSet};
pub use render::{Rgba, Surface, Vec2};
pub use scene::{Scene, SceneAction, Script};
pub use schedule::{Event, Schedule, ScriptTarget};
