//=========================================================================
// Gamebook Engine — Library Root
//
// This crate defines the public API surface of the Gamebook Engine: a
// scripted cut-scene engine where short, deterministic scenes are authored
// as declarative timelines ("wait N seconds, then do X") rather than
// imperative per-frame code.
//
// Responsibilities:
// - Expose the host interface (`Gamebook`, `GamebookBuilder`)
// - Keep presentation internals (the `platform` module) hidden from users
// - Provide clean separation between the high-level host facade and the
//   simulation core (schedules, actors, scenes, assets)
//
// Typical usage:
// ```no_run
// use gamebook_engine::prelude::*;
//
// struct Intro;
//
// impl Script for Intro {
//     fn setup(&mut self, scene: &mut Scene) -> Result<(), EngineError> {
//         let hero = scene.new_actor("hero", false, Orientation::Right)?;
//         hero.set_position(250.0, 450.0);
//         hero.set_dialog(Some("Curtain up."));
//         Ok(())
//     }
// }
//
// fn main() -> Result<(), EngineError> {
//     let mut gamebook = GamebookBuilder::new().build()?;
//     gamebook.set_scene(Box::new(Intro))?;
//     gamebook.run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the simulation systems (schedules, actors, scenes,
// assets, render boundary). It is exposed publicly for engine-level
// extensibility, but normal application code will mostly use the
// top-level `Gamebook` facade and the prelude.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains OS-specific logic (window, Winit integration,
// framebuffer presentation, font rasterization) and is kept private, as
// it is not part of the public API surface.
//
// `engine` defines the host entry point and initialization logic.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the host types as the main entry points for applications.
// This allows users to simply `use gamebook_engine::Gamebook;` without
// having to know the internal module structure.
//
pub use engine::{Gamebook, GamebookBuilder, EngineError, DEFAULT_FRAME_RATE, DEFAULT_TIME_STEP};
pub use platform::PlatformError;
