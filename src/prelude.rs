//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use gamebook_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Host
pub use crate::{EngineError, Gamebook, GamebookBuilder};

// Scenes and scripts
pub use crate::core::scene::{Scene, SceneAction, Script};

// Actors
pub use crate::core::actor::{Actor, ActorAction, ActorId, Orientation};

// Timeline core
pub use crate::core::schedule::{Event, Schedule, ScriptTarget};

// Assets
pub use crate::core::assets::{AssetCatalog, AssetError, SpriteFrame, SpriteSet};

// Render boundary
pub use crate::core::render::{Rgba, Surface, Vec2};
