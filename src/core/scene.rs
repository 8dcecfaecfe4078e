//=========================================================================
// Scene
//=========================================================================
//
// An aggregate of actors plus a scene-level timeline; the unit of
// activation in the host.
//
// Architecture:
//   Scene
//     ├─ actors: Vec<Actor>          (creation order = sweep/render order)
//     ├─ schedule: Schedule<SceneAction>
//     ├─ time: f64                   (monotonic from activation)
//     └─ catalog: AssetCatalog       (explicit asset context, no globals)
//
// Flow:
//   advance_time(dt) → scene sweep → per-actor sweeps → time += dt
//   render(surface)  → clear → animate → visible sprites → dialogs
//
//=========================================================================

//=== External Dependencies ===============================================

use std::mem;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::actor::{Actor, ActorId, Orientation};
use crate::core::assets::{AssetCatalog, AssetError, SpriteSet};
use crate::core::render::{Rgba, Surface, BLACK};
use crate::core::schedule::{Schedule, ScriptTarget};

//=== SceneAction =========================================================

/// The closed set of scene-level scheduled events: actor creation and
/// removal, plus global presentation triggers.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    /// Creates an actor from catalog assets when the sweep reaches the
    /// event's stamp.
    SpawnActor {
        name: String,
        hidden: bool,
        orientation: Orientation,
    },

    /// Removes an actor from the scene entirely (not merely hiding it).
    RemoveActor(ActorId),

    /// Changes the clear color behind all sprites.
    SetBackdrop(Rgba),
}

//=== Script Trait ========================================================

/// An authored cut-scene: the scene-specific setup/teardown hooks.
///
/// `setup` runs once on activation and must fully construct the actor
/// roster and every scripted timeline before the host's first
/// `advance_time`. `teardown` runs once before the scene is replaced.
///
/// # Example
///
/// ```no_run
/// use gamebook_engine::prelude::*;
///
/// struct Intro;
///
/// impl Script for Intro {
///     fn setup(&mut self, scene: &mut Scene) -> Result<(), EngineError> {
///         let hero = scene.new_actor("hero", false, Orientation::Right)?;
///         hero.set_position(250.0, 450.0);
///         hero.set_dialog(Some("We ride at dawn."));
///         hero.wait(2.0);
///         hero.set_dialog(None);
///         Ok(())
///     }
/// }
/// ```
pub trait Script {
    /// Builds the actor roster and timelines on scene activation.
    fn setup(&mut self, scene: &mut Scene) -> Result<(), crate::EngineError>;

    /// Releases scene-specific resources before replacement.
    ///
    /// Default implementation does nothing; the scene itself (actors,
    /// schedules) is dropped by the host after this hook.
    fn teardown(&mut self, _scene: &mut Scene) {}
}

//=== Scene ===============================================================

/// Owns a set of actors and one schedule of scene-level events; advances
/// all schedules together and delegates rendering.
pub struct Scene {
    actors: Vec<Actor>,
    schedule: Schedule<SceneAction>,
    time: f64,
    backdrop: Rgba,
    catalog: AssetCatalog,
    next_actor_id: u32,
}

impl Scene {
    //--- Construction -----------------------------------------------------

    /// Creates an empty scene at time 0 around an asset catalog.
    pub fn new(catalog: AssetCatalog) -> Self {
        Self {
            actors: Vec::new(),
            schedule: Schedule::new(),
            time: 0.0,
            backdrop: BLACK,
            catalog,
            next_actor_id: 0,
        }
    }

    //--- Actor Roster -----------------------------------------------------

    /// Creates an actor from catalog assets and registers it at the end of
    /// the roster.
    ///
    /// Returns a mutable handle for scripted configuration. Duplicate
    /// names are allowed; each call is an independent instance.
    pub fn new_actor(
        &mut self,
        name: &str,
        hidden: bool,
        orientation: Orientation,
    ) -> Result<&mut Actor, AssetError> {
        let sprites = self.catalog.load_actor(name)?;
        Ok(self.new_actor_from(name, sprites, hidden, orientation))
    }

    /// Creates an actor from an already-built sprite set (embedded art,
    /// tests) and registers it at the end of the roster.
    pub fn new_actor_from(
        &mut self,
        name: &str,
        sprites: SpriteSet,
        hidden: bool,
        orientation: Orientation,
    ) -> &mut Actor {
        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;

        debug!("actor `{}` joins the scene as {:?}", name, id);
        self.actors.push(Actor::new(id, name, sprites, hidden, orientation));
        self.actors.last_mut().unwrap()
    }

    /// Re-borrows an actor by id, for interleaved authoring.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|actor| actor.id() == id)
    }

    /// All actors in creation order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    //--- Scene-Level Authoring --------------------------------------------

    /// Advances the scene-level authoring cursor by `seconds`.
    pub fn wait(&mut self, seconds: f64) {
        self.schedule.wait(seconds);
    }

    /// Schedules creating an actor from catalog assets.
    ///
    /// The asset load happens when the event fires; a missing asset then is
    /// as fatal as it would be in `new_actor`.
    pub fn spawn_actor(&mut self, name: &str, hidden: bool, orientation: Orientation) {
        self.schedule.add_event(SceneAction::SpawnActor {
            name: name.to_string(),
            hidden,
            orientation,
        });
    }

    /// Schedules removing an actor from the scene.
    pub fn remove_actor(&mut self, id: ActorId) {
        self.schedule.add_event(SceneAction::RemoveActor(id));
    }

    /// Schedules changing the backdrop clear color.
    pub fn set_backdrop(&mut self, color: Rgba) {
        self.schedule.add_event(SceneAction::SetBackdrop(color));
    }

    //--- Simulation -------------------------------------------------------

    /// Advances the simulation clock by `dt` seconds, firing every due
    /// event.
    ///
    /// The sweep order is fixed: the scene's own schedule first, then each
    /// actor's schedule in creation order. Simultaneous events on
    /// different actors are ordered by the roster, never by a cross-actor
    /// timestamp merge.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is negative or NaN.
    pub fn advance_time(&mut self, dt: f64) -> Result<(), AssetError> {
        assert!(dt >= 0.0, "time step must be non-negative, got {}", dt);

        let start = self.time;
        let stop = start + dt;

        // The schedule is swapped out for the sweep so scene mutators
        // cannot re-enter it.
        let mut schedule = mem::take(&mut self.schedule);
        let swept = schedule.run_events(start, stop, self);
        self.schedule = schedule;
        swept?;

        for actor in &mut self.actors {
            actor.advance(start, stop);
        }

        self.time = stop;
        Ok(())
    }

    /// Simulation seconds elapsed since activation.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current backdrop clear color.
    pub fn backdrop(&self) -> Rgba {
        self.backdrop
    }

    //--- Rendering --------------------------------------------------------

    /// Draws one frame of the scene.
    ///
    /// Advances every actor's decorative animation, derives the visible
    /// set fresh from each actor's `hidden` flag, draws the visible
    /// sprites in creation order, then draws all dialog overlays so no
    /// sprite occludes a dialog line.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        surface.clear(self.backdrop);

        for actor in &mut self.actors {
            actor.update();
        }

        for actor in self.actors.iter().filter(|actor| !actor.hidden()) {
            surface.blit(actor.current_frame(), actor.position());
        }

        for actor in self.actors.iter().filter(|actor| !actor.hidden()) {
            actor.draw_dialog(surface);
        }
    }

    /// The actors a render pass would draw, in draw order.
    pub fn visible_actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|actor| !actor.hidden())
    }
}

//=== Script Dispatch =====================================================

impl ScriptTarget for Scene {
    type Action = SceneAction;
    type Error = AssetError;

    fn apply(&mut self, action: &SceneAction) -> Result<(), AssetError> {
        match action {
            SceneAction::SpawnActor {
                name,
                hidden,
                orientation,
            } => {
                self.new_actor(name, *hidden, *orientation)?;
            }
            SceneAction::RemoveActor(id) => {
                let before = self.actors.len();
                self.actors.retain(|actor| actor.id() != *id);
                if self.actors.len() == before {
                    warn!("scheduled removal of unknown actor {:?}, skipping", id);
                } else {
                    debug!("actor {:?} leaves the scene", id);
                }
            }
            SceneAction::SetBackdrop(color) => self.backdrop = *color,
        }
        Ok(())
    }
}

//=========================================================================
// Tests
//=========================================================================
