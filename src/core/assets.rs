//=========================================================================
// Sprite Assets
//=========================================================================
//
// Filesystem contract and in-memory sprite storage.
//
// Layout on disk:
//   assets/<actor>/<state>/*.png
//
// Each state directory holds that state's frame sequence, ordered by
// filename. Every actor must declare a `default` state and no state may be
// empty — violations are construction-time errors, never degraded modes.
//
// Flipped variants are precomputed at load so orientation changes never
// touch the decoder at render time.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

//=== Constants ===========================================================

/// The animation state every actor must provide.
pub const DEFAULT_STATE: &str = "default";

const FRAME_EXTENSION: &str = "png";

//=== AssetError ==========================================================

/// Fatal asset-loading failures.
///
/// There is no degraded-mode rendering: a cut-scene with missing art is a
/// broken cut-scene, so every variant aborts construction and names the
/// offending path.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("actor asset directory not found: {path}")]
    MissingActorDir { path: PathBuf },

    #[error("actor `{actor}` declares no `default` animation state")]
    MissingDefaultState { actor: String },

    #[error("animation state `{state}` of actor `{actor}` has no frames in {path}")]
    EmptyState {
        actor: String,
        state: String,
        path: PathBuf,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

//=== SpriteFrame =========================================================

/// One decoded animation frame: an RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SpriteFrame {
    /// Wraps a raw RGBA8 buffer.
    ///
    /// # Panics
    ///
    /// Panics if the buffer length is not `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height * 4) as usize,
            "pixel buffer does not match {}x{} RGBA8",
            width,
            height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// A horizontally mirrored copy of this frame.
    pub fn flipped(&self) -> Self {
        let mut flipped = Vec::with_capacity(self.pixels.len());
        for row in self.pixels.chunks_exact((self.width * 4) as usize) {
            for pixel in row.chunks_exact(4).rev() {
                flipped.extend_from_slice(pixel);
            }
        }
        Self {
            width: self.width,
            height: self.height,
            pixels: flipped,
        }
    }
}

//=== SpriteSet ===========================================================

/// All animation frames of one actor, keyed by state name.
///
/// Holds the right-facing originals and their precomputed left-facing
/// (horizontally flipped) variants.
#[derive(Debug, Clone)]
pub struct SpriteSet {
    states: HashMap<String, StateFrames>,
}

#[derive(Debug, Clone)]
struct StateFrames {
    normal: Vec<SpriteFrame>,
    flipped: Vec<SpriteFrame>,
}

impl SpriteSet {
    /// Builds a sprite set from already-decoded frames.
    ///
    /// Used for embedded art and tests; disk loading goes through
    /// [`AssetCatalog::load_actor`]. Validates the same invariants as the
    /// disk path: a `default` state must exist and no state may be empty.
    pub fn from_frames(
        actor: &str,
        states: HashMap<String, Vec<SpriteFrame>>,
    ) -> Result<Self, AssetError> {
        if !states.contains_key(DEFAULT_STATE) {
            return Err(AssetError::MissingDefaultState {
                actor: actor.to_string(),
            });
        }

        let mut validated = HashMap::with_capacity(states.len());
        for (state, normal) in states {
            if normal.is_empty() {
                return Err(AssetError::EmptyState {
                    actor: actor.to_string(),
                    state,
                    path: PathBuf::new(),
                });
            }
            let flipped = normal.iter().map(SpriteFrame::flipped).collect();
            validated.insert(state, StateFrames { normal, flipped });
        }

        Ok(Self { states: validated })
    }

    /// Whether `state` is declared in this set.
    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains_key(state)
    }

    /// The frame sequence for `state`, right-facing or flipped.
    ///
    /// Guaranteed non-empty for every declared state.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not declared — selecting an unknown state is a
    /// programming error, not recoverable input.
    pub fn frames(&self, state: &str, flipped: bool) -> &[SpriteFrame] {
        let frames = self
            .states
            .get(state)
            .unwrap_or_else(|| panic!("unknown animation state `{}`", state));
        if flipped {
            &frames.flipped
        } else {
            &frames.normal
        }
    }
}

//=== AssetCatalog ========================================================

/// Handle to the on-disk asset tree.
///
/// Threaded explicitly through scene construction — there is no implicit
/// global asset root. Cloning is cheap; the catalog holds only the root
/// path and reads lazily per actor.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    /// Creates a catalog rooted at `root` (typically `assets/`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The catalog's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads every animation state of `name` from `<root>/<name>/`.
    ///
    /// Each subdirectory becomes one state; its `.png` files, ordered by
    /// filename, become that state's frame sequence. Fails fast on a
    /// missing actor directory, a missing `default` state, an empty state,
    /// or an undecodable image.
    pub fn load_actor(&self, name: &str) -> Result<SpriteSet, AssetError> {
        let actor_dir = self.root.join(name);
        if !actor_dir.is_dir() {
            return Err(AssetError::MissingActorDir { path: actor_dir });
        }

        let mut states = HashMap::new();
        for entry in read_dir_sorted(&actor_dir)? {
            if !entry.is_dir() {
                continue;
            }
            let state = match entry.file_name().and_then(|n| n.to_str()) {
                Some(state) => state.to_string(),
                None => continue,
            };

            let frames = load_state_frames(&entry)?;
            if frames.is_empty() {
                return Err(AssetError::EmptyState {
                    actor: name.to_string(),
                    state,
                    path: entry,
                });
            }

            debug!(
                "loaded {} frame(s) for actor `{}` state `{}`",
                frames.len(),
                name,
                state
            );
            states.insert(state, frames);
        }

        let set = SpriteSet::from_frames(name, states)?;
        info!("actor `{}` loaded from {}", name, actor_dir.display());
        Ok(set)
    }
}

//--- Loading Helpers ------------------------------------------------------

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    let entries = fs::read_dir(dir).map_err(|source| AssetError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AssetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }

    // Frame order is defined by filename order.
    paths.sort();
    Ok(paths)
}

fn load_state_frames(state_dir: &Path) -> Result<Vec<SpriteFrame>, AssetError> {
    let mut frames = Vec::new();
    for path in read_dir_sorted(state_dir)? {
        let is_frame = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(FRAME_EXTENSION));
        if !is_frame {
            continue;
        }

        let decoded = image::open(&path).map_err(|source| AssetError::Decode {
            path: path.clone(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        frames.push(SpriteFrame::from_rgba8(width, height, rgba.into_raw()));
    }
    Ok(frames)
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const WHITE_PX: [u8; 4] = [255, 255, 255, 255];

    fn solid_frame(width: u32, height: u32, color: [u8; 4]) -> SpriteFrame {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&color);
        }
        SpriteFrame::from_rgba8(width, height, pixels)
    }

    fn write_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
        let mut img = image::RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgba(color);
        }
        img.save(path).expect("failed to write test png");
    }

    //--- SpriteFrame ------------------------------------------------------

    #[test]
    fn flipped_mirrors_pixels_horizontally() {
        // 2x1 frame: red pixel, then blue pixel.
        let frame = SpriteFrame::from_rgba8(
            2,
            1,
            vec![255, 0, 0, 255, 0, 0, 255, 255],
        );
        let flipped = frame.flipped();
        assert_eq!(flipped.pixels(), &[0, 0, 255, 255, 255, 0, 0, 255]);
        assert_eq!(flipped.width(), 2);
        assert_eq!(flipped.height(), 1);
    }

    #[test]
    fn flipping_twice_restores_the_original() {
        let frame = SpriteFrame::from_rgba8(3, 2, (0u8..24).collect());
        assert_eq!(frame.flipped().flipped(), frame);
    }

    #[test]
    #[should_panic(expected = "pixel buffer does not match")]
    fn mismatched_buffer_length_panics() {
        SpriteFrame::from_rgba8(2, 2, vec![0; 4]);
    }

    //--- SpriteSet --------------------------------------------------------

    #[test]
    fn from_frames_requires_a_default_state() {
        let mut states = HashMap::new();
        states.insert("walk".to_string(), vec![solid_frame(1, 1, WHITE_PX)]);

        let err = SpriteSet::from_frames("hero", states).unwrap_err();
        assert!(matches!(err, AssetError::MissingDefaultState { .. }));
    }

    #[test]
    fn from_frames_rejects_empty_states() {
        let mut states = HashMap::new();
        states.insert(DEFAULT_STATE.to_string(), vec![solid_frame(1, 1, WHITE_PX)]);
        states.insert("walk".to_string(), Vec::new());

        let err = SpriteSet::from_frames("hero", states).unwrap_err();
        assert!(matches!(err, AssetError::EmptyState { .. }));
    }

    #[test]
    fn frames_returns_flipped_variants_on_demand() {
        let mut states = HashMap::new();
        let asymmetric = SpriteFrame::from_rgba8(
            2,
            1,
            vec![255, 0, 0, 255, 0, 0, 255, 255],
        );
        states.insert(DEFAULT_STATE.to_string(), vec![asymmetric.clone()]);
        let set = SpriteSet::from_frames("hero", states).unwrap();

        assert_eq!(set.frames(DEFAULT_STATE, false)[0], asymmetric);
        assert_eq!(set.frames(DEFAULT_STATE, true)[0], asymmetric.flipped());
    }

    #[test]
    #[should_panic(expected = "unknown animation state")]
    fn frames_panics_on_unknown_state() {
        let mut states = HashMap::new();
        states.insert(DEFAULT_STATE.to_string(), vec![solid_frame(1, 1, WHITE_PX)]);
        let set = SpriteSet::from_frames("hero", states).unwrap();
        set.frames("nope", false);
    }

    //--- AssetCatalog -----------------------------------------------------

    #[test]
    fn missing_actor_directory_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let catalog = AssetCatalog::new(root.path());

        let err = catalog.load_actor("ghost").unwrap_err();
        assert!(matches!(err, AssetError::MissingActorDir { .. }));
    }

    #[test]
    fn actor_without_default_state_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let walk = root.path().join("hero").join("walk");
        fs::create_dir_all(&walk).unwrap();
        write_png(&walk.join("0.png"), 2, 2, WHITE_PX);

        let catalog = AssetCatalog::new(root.path());
        let err = catalog.load_actor("hero").unwrap_err();
        assert!(matches!(err, AssetError::MissingDefaultState { .. }));
    }

    #[test]
    fn empty_state_directory_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let actor = root.path().join("hero");
        fs::create_dir_all(actor.join(DEFAULT_STATE)).unwrap();
        write_png(&actor.join(DEFAULT_STATE).join("0.png"), 2, 2, WHITE_PX);
        fs::create_dir_all(actor.join("walk")).unwrap();

        let catalog = AssetCatalog::new(root.path());
        let err = catalog.load_actor("hero").unwrap_err();
        match err {
            AssetError::EmptyState { state, .. } => assert_eq!(state, "walk"),
            other => panic!("expected EmptyState, got {:?}", other),
        }
    }

    #[test]
    fn frames_are_ordered_by_filename() {
        let root = tempfile::tempdir().unwrap();
        let default = root.path().join("hero").join(DEFAULT_STATE);
        fs::create_dir_all(&default).unwrap();
        // Written out of order on purpose.
        write_png(&default.join("frame_2.png"), 1, 1, [0, 255, 0, 255]);
        write_png(&default.join("frame_1.png"), 1, 1, [255, 0, 0, 255]);

        let catalog = AssetCatalog::new(root.path());
        let set = catalog.load_actor("hero").unwrap();
        let frames = set.frames(DEFAULT_STATE, false);

        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0].pixels()[..4], &[255, 0, 0, 255]);
        assert_eq!(&frames[1].pixels()[..4], &[0, 255, 0, 255]);
    }

    #[test]
    fn non_png_files_are_ignored() {
        let root = tempfile::tempdir().unwrap();
        let default = root.path().join("hero").join(DEFAULT_STATE);
        fs::create_dir_all(&default).unwrap();
        write_png(&default.join("0.png"), 1, 1, WHITE_PX);
        fs::write(default.join("notes.txt"), "not a frame").unwrap();

        let catalog = AssetCatalog::new(root.path());
        let set = catalog.load_actor("hero").unwrap();
        assert_eq!(set.frames(DEFAULT_STATE, false).len(), 1);
    }
}
