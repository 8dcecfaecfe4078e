//=========================================================================
// Gamebook Host
//
// Main entry point and coordinator for the engine.
//
// Architecture:
// ```text
//     GamebookBuilder  ──build()──>  Gamebook  ──run()──>  [Platform loop]
//         │                            │
//         ├─ with_window_size()        ├─ set_scene(script)
//         ├─ with_time_step()          │    teardown old → setup new
//         └─ with_frame_rate()         └─ advance_time(TIME_STEP) per tick
//                                         render per displayed frame
// ```
//
// The host drives two independent clocks: the fixed-timestep simulation
// clock (advance_time at TIME_STEP cadence) and the display refresh clock
// (one render + animation tick per frame). Exactly one scene is active at
// any time, and at most one Gamebook may be live per process.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};

use log::info;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::assets::{AssetCatalog, AssetError};
use crate::core::render::Surface;
use crate::core::scene::{Scene, Script};
use crate::platform::{self, PlatformError};

//=== Constants ===========================================================

/// Simulated seconds per simulation tick.
pub const DEFAULT_TIME_STEP: f64 = 0.1;

/// Target displayed frames per second.
pub const DEFAULT_FRAME_RATE: u32 = 60;

const DEFAULT_WIDTH: u32 = 1920;
const DEFAULT_HEIGHT: u32 = 1080;
const DEFAULT_ASSETS_ROOT: &str = "assets";
const DEFAULT_TITLE: &str = "Gamebook";

// Liveness flag behind the one-host-per-process rule.
static HOST_LIVE: AtomicBool = AtomicBool::new(false);

//=== EngineError =========================================================

/// Fatal engine failures, surfaced from construction, `set_scene`, or
/// `run`. There is no degraded mode; every variant terminates the show.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a Gamebook host already exists in this process")]
    HostAlreadyExists,

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

//=== GamebookBuilder =====================================================

/// Builder for configuring and constructing a [`Gamebook`].
///
/// # Default Values
///
/// - **Window**: 1920×1080, titled "Gamebook"
/// - **Time step**: 0.1 s of simulated time per tick
/// - **Frame rate**: 60 displayed frames per second
/// - **Assets root**: `assets/`
///
/// # Examples
///
/// ```no_run
/// use gamebook_engine::GamebookBuilder;
///
/// let gamebook = GamebookBuilder::new()
///     .with_window_size(1280, 720)
///     .with_time_step(0.05)
///     .build()
///     .expect("only one host per process");
/// ```
pub struct GamebookBuilder {
    width: u32,
    height: u32,
    time_step: f64,
    frame_rate: u32,
    assets_root: String,
    title: String,
}

impl GamebookBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            time_step: DEFAULT_TIME_STEP,
            frame_rate: DEFAULT_FRAME_RATE,
            assets_root: DEFAULT_ASSETS_ROOT.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Sets the window size in logical pixels.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "window size must be positive");
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the simulated seconds advanced per simulation tick.
    ///
    /// Smaller steps fire scripted events with finer granularity at the
    /// cost of more sweeps per second.
    ///
    /// # Panics
    ///
    /// Panics if `time_step <= 0.0`.
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        assert!(
            time_step > 0.0,
            "time step must be positive, got {}",
            time_step
        );
        self.time_step = time_step;
        self
    }

    /// Sets the target displayed frames per second.
    ///
    /// This paces rendering and the decorative sprite animation only; the
    /// simulation cadence is governed by the time step.
    ///
    /// # Panics
    ///
    /// Panics if `frame_rate == 0`.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        assert!(frame_rate > 0, "frame rate must be positive");
        self.frame_rate = frame_rate;
        self
    }

    /// Sets the asset tree root (default `assets/`).
    pub fn with_assets_root(mut self, root: impl Into<String>) -> Self {
        self.assets_root = root.into();
        self
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builds the host.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::HostAlreadyExists`] if another `Gamebook` is
    /// live in this process — the host owns the one window and the one
    /// simulation clock, so a second instance is a configuration error.
    pub fn build(self) -> Result<Gamebook, EngineError> {
        if HOST_LIVE.swap(true, Ordering::AcqRel) {
            return Err(EngineError::HostAlreadyExists);
        }

        info!(
            "building gamebook ({}x{}, time step {}s, {} fps)",
            self.width, self.height, self.time_step, self.frame_rate
        );

        Ok(Gamebook {
            config: HostConfig {
                width: self.width,
                height: self.height,
                time_step: self.time_step,
                frame_rate: self.frame_rate,
                title: self.title,
            },
            catalog: AssetCatalog::new(self.assets_root),
            stage: None,
            _liveness: HostLiveness,
        })
    }
}

impl Default for GamebookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== HostConfig ==========================================================

/// Presentation and pacing parameters, fixed at build time.
#[derive(Debug, Clone)]
pub(crate) struct HostConfig {
    pub width: u32,
    pub height: u32,
    pub time_step: f64,
    pub frame_rate: u32,
    pub title: String,
}

// Releases the one-host-per-process flag when the host is dropped.
struct HostLiveness;

impl Drop for HostLiveness {
    fn drop(&mut self) {
        HOST_LIVE.store(false, Ordering::Release);
    }
}

//=== Gamebook ============================================================

/// The host: owns the display configuration, the asset catalog, the fixed
/// timestep clock, and the currently active scene.
///
/// # Examples
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
///         Ok(())
///     }
/// }
///
/// fn main() -> Result<(), EngineError> {
///     let mut gamebook = GamebookBuilder::new().build()?;
///     gamebook.set_scene(Box::new(Intro))?;
///     gamebook.run()
/// }
/// ```
pub struct Gamebook {
    config: HostConfig,
    catalog: AssetCatalog,
    stage: Option<ActiveScene>,
    _liveness: HostLiveness,
}

struct ActiveScene {
    scene: Scene,
    script: Box<dyn Script>,
}

impl Gamebook {
    //--- Scene Lifecycle --------------------------------------------------

    /// Activates a new authored scene.
    ///
    /// The outgoing script's `teardown` runs before the incoming script's
    /// `setup`, and the incoming scene starts with its clock at 0. After
    /// this returns, every `advance_time`/`render` references the new
    /// scene only.
    pub fn set_scene(&mut self, mut script: Box<dyn Script>) -> Result<(), EngineError> {
        if let Some(mut outgoing) = self.stage.take() {
            info!("tearing down active scene");
            outgoing.script.teardown(&mut outgoing.scene);
        }

        let mut scene = Scene::new(self.catalog.clone());
        script.setup(&mut scene)?;
        info!("scene activated with {} actor(s)", scene.actors().len());

        self.stage = Some(ActiveScene { scene, script });
        Ok(())
    }

    //--- Execution --------------------------------------------------------

    /// Opens the window and drives the show until quit is requested.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the window and framebuffer, loads the dialog font
    /// 2. Per displayed frame: accumulates elapsed real time and calls
    ///    `advance_time(time_step)` once per whole step
    /// 3. Renders the scene and paces to the target frame rate
    /// 4. On window close: exits cleanly, no persisted state
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: platform initialization failure,
    /// missing dialog font, or a scheduled event failing (e.g. a scripted
    /// spawn with missing assets).
    pub fn run(self) -> Result<(), EngineError> {
        info!(
            "starting gamebook runtime (time step {}s, {} fps)",
            self.config.time_step, self.config.frame_rate
        );

        platform::run(self)?;

        info!("gamebook shutdown complete");
        Ok(())
    }

    //--- Internal Tick API (called by the platform loop) ------------------

    /// Advances simulated time by one fixed step.
    pub(crate) fn advance_time(&mut self, dt: f64) -> Result<(), AssetError> {
        if let Some(active) = &mut self.stage {
            active.scene.advance_time(dt)?;
        }
        Ok(())
    }

    /// Renders the active scene into `surface`.
    pub(crate) fn render(&mut self, surface: &mut dyn Surface) {
        if let Some(active) = &mut self.stage {
            active.scene.render(surface);
        }
    }

    pub(crate) fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Root of the asset tree this host reads from.
    pub(crate) fn assets_root(&self) -> &std::path::Path {
        self.catalog.root()
    }

    /// The active scene, if one has been set.
    pub fn scene(&self) -> Option<&Scene> {
        self.stage.as_ref().map(|active| &active.scene)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actor::Orientation;
    use crate::core::assets::{SpriteFrame, SpriteSet, DEFAULT_STATE};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Host construction toggles the process-wide liveness flag, so tests
    // that build hosts are serialized.
    fn host_lock() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn test_sprites() -> SpriteSet {
        let mut states = HashMap::new();
        states.insert(
            DEFAULT_STATE.to_string(),
            vec![SpriteFrame::from_rgba8(1, 1, vec![0, 0, 0, 255])],
        );
        SpriteSet::from_frames("test", states).unwrap()
    }

    //--- Builder ----------------------------------------------------------

    #[test]
    fn builder_defaults() {
        let builder = GamebookBuilder::new();
        assert_eq!(builder.width, 1920);
        assert_eq!(builder.height, 1080);
        assert_eq!(builder.time_step, DEFAULT_TIME_STEP);
        assert_eq!(builder.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(builder.assets_root, "assets");
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let builder = GamebookBuilder::new()
            .with_window_size(800, 600)
            .with_time_step(0.05)
            .with_frame_rate(30)
            .with_assets_root("art")
            .with_title("Rehearsal");

        assert_eq!(builder.width, 800);
        assert_eq!(builder.height, 600);
        assert_eq!(builder.time_step, 0.05);
        assert_eq!(builder.frame_rate, 30);
        assert_eq!(builder.assets_root, "art");
        assert_eq!(builder.title, "Rehearsal");
    }

    #[test]
    #[should_panic(expected = "time step must be positive")]
    fn builder_rejects_zero_time_step() {
        GamebookBuilder::new().with_time_step(0.0);
    }

    #[test]
    #[should_panic(expected = "time step must be positive")]
    fn builder_rejects_negative_time_step() {
        GamebookBuilder::new().with_time_step(-0.1);
    }

    #[test]
    #[should_panic(expected = "frame rate must be positive")]
    fn builder_rejects_zero_frame_rate() {
        GamebookBuilder::new().with_frame_rate(0);
    }

    #[test]
    #[should_panic(expected = "window size must be positive")]
    fn builder_rejects_zero_window_size() {
        GamebookBuilder::new().with_window_size(0, 600);
    }

    //--- Singleton guard --------------------------------------------------

    #[test]
    fn only_one_host_may_be_live_at_a_time() {
        let _serial = host_lock();

        let first = GamebookBuilder::new().build().unwrap();
        let second = GamebookBuilder::new().build();
        assert!(matches!(second, Err(EngineError::HostAlreadyExists)));

        // Dropping the first host releases the slot.
        drop(first);
        let third = GamebookBuilder::new().build();
        assert!(third.is_ok());
    }

    //--- Scene lifecycle --------------------------------------------------

    struct ProbeScript {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Script for ProbeScript {
        fn setup(&mut self, scene: &mut Scene) -> Result<(), EngineError> {
            self.log.borrow_mut().push(format!("setup:{}", self.tag));
            scene.new_actor_from("probe", test_sprites(), false, Orientation::Right);
            Ok(())
        }

        fn teardown(&mut self, _scene: &mut Scene) {
            self.log.borrow_mut().push(format!("teardown:{}", self.tag));
        }
    }

    #[test]
    fn set_scene_runs_teardown_before_the_next_setup() {
        let _serial = host_lock();
        let log = Rc::new(RefCell::new(Vec::new()));

        let mut gamebook = GamebookBuilder::new().build().unwrap();
        gamebook
            .set_scene(Box::new(ProbeScript {
                tag: "one",
                log: Rc::clone(&log),
            }))
            .unwrap();
        gamebook
            .set_scene(Box::new(ProbeScript {
                tag: "two",
                log: Rc::clone(&log),
            }))
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["setup:one", "teardown:one", "setup:two"]
        );
    }

    #[test]
    fn each_activation_starts_a_fresh_scene_clock() {
        let _serial = host_lock();

        let mut gamebook = GamebookBuilder::new().build().unwrap();
        gamebook
            .set_scene(Box::new(ProbeScript {
                tag: "one",
                log: Rc::new(RefCell::new(Vec::new())),
            }))
            .unwrap();

        gamebook.advance_time(1.5).unwrap();
        assert!((gamebook.scene().unwrap().time() - 1.5).abs() < f64::EPSILON);

        gamebook
            .set_scene(Box::new(ProbeScript {
                tag: "two",
                log: Rc::new(RefCell::new(Vec::new())),
            }))
            .unwrap();
        assert_eq!(gamebook.scene().unwrap().time(), 0.0);
    }

    #[test]
    fn advancing_without_a_scene_is_a_no_op() {
        let _serial = host_lock();

        let mut gamebook = GamebookBuilder::new().build().unwrap();
        gamebook.advance_time(1.0).unwrap();
        assert!(gamebook.scene().is_none());
    }
}
