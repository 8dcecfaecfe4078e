//=========================================================================
// Actor
//=========================================================================
//
// A positioned, animated, optionally-dialog-bearing sprite entity with its
// own scripted timeline.
//
// Two independent mechanisms drive an actor:
//
//   1. The scripted timeline: authoring calls (`set_position`, `wait`, ...)
//      append events to the actor's Schedule; the owning scene's
//      advance-time sweep applies the actual mutations.
//
//   2. The decorative frame animation: a counter advanced once per
//      *rendered* frame, independent of the simulation clock, frozen while
//      the actor is hidden.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::convert::Infallible;
use std::mem;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::assets::{SpriteFrame, SpriteSet, DEFAULT_STATE};
use crate::core::render::{Surface, Vec2, WHITE};
use crate::core::schedule::{Schedule, ScriptTarget};

//=== Constants ===========================================================

/// Animation phase counter budget per second of rendered frames.
///
/// `frame` wraps modulo this value; the displayed image index is derived
/// from the counter's position within the budget.
pub const ANIMATION_FRAME_BUDGET: u32 = 60;

// Dialog overlays sit toward the side the actor faces. Presentation
// parameters, not timeline semantics.
const DIALOG_OFFSET_RIGHT: f32 = 160.0;
const DIALOG_OFFSET_LEFT: f32 = -500.0;

//=== Orientation =========================================================

/// Which way the actor faces; `Left` selects the flipped image set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Left,
    #[default]
    Right,
}

//=== ActorId =============================================================

/// Stable identity of an actor within its scene.
///
/// Creation-order indices shift when scheduled removals fire; ids do not,
/// so scene-level events address actors by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub(crate) u32);

//=== ActorAction =========================================================

/// The closed set of scheduled mutations an actor understands.
///
/// Being an enum (rather than a name-to-method lookup), a timeline can
/// never reference a mutator that does not exist — dispatch is a
/// compile-time-exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorAction {
    SetPosition(Vec2),
    SetDialog(Option<String>),
    SetHidden(bool),
}

//=== Actor ===============================================================

/// An animated, positionable, nameable sprite with its own timeline.
///
/// All `set_*` methods are *schedule builders*: they record an event at the
/// actor's current authoring cursor and return immediately. Visible state
/// changes only when the owning scene's sweep reaches the event's stamp.
pub struct Actor {
    id: ActorId,
    name: String,
    orientation: Orientation,
    hidden: bool,
    state: String,
    frame: u32,
    dialog: Option<String>,
    position: Vec2,
    sprites: SpriteSet,
    schedule: Schedule<ActorAction>,
}

impl Actor {
    //--- Construction -----------------------------------------------------

    /// Creates an actor from a loaded sprite set.
    ///
    /// Scenes construct actors via `Scene::new_actor`; this is the
    /// catalog-independent entry point they share.
    pub(crate) fn new(
        id: ActorId,
        name: impl Into<String>,
        sprites: SpriteSet,
        hidden: bool,
        orientation: Orientation,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            orientation,
            hidden,
            state: DEFAULT_STATE.to_string(),
            frame: 0,
            dialog: None,
            position: Vec2::default(),
            sprites,
            schedule: Schedule::new(),
        }
    }

    //--- Authoring (schedule builders) ------------------------------------

    /// Schedules moving the sprite center to `(x, y)`.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.schedule
            .add_event(ActorAction::SetPosition(Vec2::new(x, y)));
    }

    /// Schedules showing a dialog line, or clearing it with `None`.
    pub fn set_dialog(&mut self, dialog: Option<&str>) {
        self.schedule
            .add_event(ActorAction::SetDialog(dialog.map(str::to_string)));
    }

    /// Schedules hiding or revealing the actor.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.schedule.add_event(ActorAction::SetHidden(hidden));
    }

    /// Advances this actor's authoring cursor by `seconds`.
    pub fn wait(&mut self, seconds: f64) {
        self.schedule.wait(seconds);
    }

    //--- Timeline Replay --------------------------------------------------

    /// Replays this actor's schedule over `[start, stop]`.
    ///
    /// Called by the owning scene during `advance_time`; the schedule is
    /// swapped out for the duration of the sweep, so mutators cannot
    /// re-enter it.
    pub(crate) fn advance(&mut self, start: f64, stop: f64) {
        let mut schedule = mem::take(&mut self.schedule);
        if let Err(infallible) = schedule.run_events(start, stop, self) {
            match infallible {}
        }
        self.schedule = schedule;
    }

    //--- Animation --------------------------------------------------------

    /// Advances the decorative frame animation by one rendered frame.
    ///
    /// Does nothing while hidden; revealing the actor resumes the animation
    /// from the frozen counter.
    pub fn update(&mut self) {
        if self.hidden {
            return;
        }
        self.frame = (self.frame + 1) % ANIMATION_FRAME_BUDGET;
    }

    /// The image to blit this frame, honoring state and orientation.
    pub fn current_frame(&self) -> &SpriteFrame {
        let flipped = self.orientation == Orientation::Left;
        let frames = self.sprites.frames(&self.state, flipped);

        // Spread the frame budget evenly across the sequence; when the
        // count does not divide the budget, the derived index is clamped
        // so it stays valid for the set.
        let step = (ANIMATION_FRAME_BUDGET / frames.len() as u32).max(1);
        let index = ((self.frame / step) as usize).min(frames.len() - 1);
        &frames[index]
    }

    /// Switches to another declared animation state, immediately.
    ///
    /// # Panics
    ///
    /// Panics if the sprite set does not declare `state`.
    pub fn set_state(&mut self, state: &str) {
        assert!(
            self.sprites.has_state(state),
            "actor `{}` has no animation state `{}`",
            self.name,
            state
        );
        self.state = state.to_string();
        self.frame = 0;
    }

    //--- Rendering --------------------------------------------------------

    /// Draws this actor's dialog overlay, if any.
    ///
    /// Overlays are drawn by the scene after every sprite, so no sprite can
    /// occlude a dialog line.
    pub(crate) fn draw_dialog(&self, surface: &mut dyn Surface) {
        let Some(dialog) = &self.dialog else {
            return;
        };

        let offset = match self.orientation {
            Orientation::Right => DIALOG_OFFSET_RIGHT,
            Orientation::Left => DIALOG_OFFSET_LEFT,
        };
        let anchor = Vec2::new(self.position.x + offset, self.position.y);
        surface.draw_text(dialog, anchor, WHITE);
    }

    //--- Queries ----------------------------------------------------------

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Sprite center in screen coordinates.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current dialog line, `None` when no bubble is shown.
    pub fn dialog(&self) -> Option<&str> {
        self.dialog.as_deref()
    }

    /// Current animation phase counter.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    #[cfg(test)]
    pub(crate) fn schedule(&self) -> &Schedule<ActorAction> {
        &self.schedule
    }
}

//=== Script Dispatch =====================================================

impl ScriptTarget for Actor {
    type Action = ActorAction;
    type Error = Infallible;

    fn apply(&mut self, action: &ActorAction) -> Result<(), Infallible> {
        trace!("actor `{}` applying {:?}", self.name, action);
        match action {
            ActorAction::SetPosition(position) => self.position = *position,
            ActorAction::SetDialog(dialog) => self.dialog = dialog.clone(),
            ActorAction::SetHidden(hidden) => self.hidden = *hidden,
        }
        Ok(())
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_sprites(frame_count: usize) -> SpriteSet {
        let mut frames = Vec::new();
        for i in 0..frame_count {
            // Asymmetric 2x1 frames so flips are observable.
            frames.push(SpriteFrame::from_rgba8(
                2,
                1,
                vec![i as u8, 0, 0, 255, 0, i as u8, 0, 255],
            ));
        }
        let mut states = HashMap::new();
        states.insert(DEFAULT_STATE.to_string(), frames);
        SpriteSet::from_frames("test", states).unwrap()
    }

    fn test_actor(hidden: bool, orientation: Orientation) -> Actor {
        Actor::new(ActorId(0), "test", test_sprites(4), hidden, orientation)
    }

    //--- Schedule builders ------------------------------------------------

    #[test]
    fn builders_do_not_mutate_visible_state() {
        let mut actor = test_actor(false, Orientation::Right);
        actor.set_position(100.0, 200.0);
        actor.set_dialog(Some("hello"));
        actor.set_hidden(true);

        assert_eq!(actor.position(), Vec2::default());
        assert_eq!(actor.dialog(), None);
        assert!(!actor.hidden());
        assert_eq!(actor.schedule().events().len(), 3);
    }

    #[test]
    fn advance_applies_due_mutations() {
        let mut actor = test_actor(false, Orientation::Right);
        actor.set_position(100.0, 200.0);
        actor.wait(2.0);
        actor.set_dialog(Some("hello"));

        actor.advance(0.0, 1.0);
        assert_eq!(actor.position(), Vec2::new(100.0, 200.0));
        assert_eq!(actor.dialog(), None, "not due yet");

        actor.advance(1.0, 2.0);
        assert_eq!(actor.dialog(), Some("hello"));
    }

    #[test]
    fn position_round_trips_through_a_zero_width_sweep() {
        let mut actor = test_actor(false, Orientation::Left);
        actor.set_position(250.0, 450.0);

        actor.advance(0.0, 0.0);
        assert_eq!(actor.position(), Vec2::new(250.0, 450.0));
    }

    #[test]
    fn dialog_can_be_cleared_by_a_later_event() {
        let mut actor = test_actor(false, Orientation::Right);
        actor.set_dialog(Some("hi"));
        actor.wait(1.0);
        actor.set_dialog(None);

        actor.advance(0.0, 0.5);
        assert_eq!(actor.dialog(), Some("hi"));

        actor.advance(0.5, 1.0);
        assert_eq!(actor.dialog(), None);
    }

    //--- Animation --------------------------------------------------------

    #[test]
    fn update_advances_and_wraps_the_frame_counter() {
        let mut actor = test_actor(false, Orientation::Right);
        for _ in 0..ANIMATION_FRAME_BUDGET {
            actor.update();
        }
        assert_eq!(actor.frame(), 0, "counter wraps at the budget");

        actor.update();
        assert_eq!(actor.frame(), 1);
    }

    #[test]
    fn hidden_actor_animation_is_frozen() {
        let mut actor = test_actor(true, Orientation::Right);
        for _ in 0..10 {
            actor.update();
        }
        assert_eq!(actor.frame(), 0);
    }

    #[test]
    fn animation_resumes_from_the_frozen_counter() {
        let mut actor = test_actor(false, Orientation::Right);
        actor.update();
        actor.update();

        actor.set_hidden(true);
        actor.advance(0.0, 0.0);
        actor.update();
        assert_eq!(actor.frame(), 2, "frozen while hidden");

        actor.set_hidden(false);
        actor.advance(0.0, 0.0);
        actor.update();
        assert_eq!(actor.frame(), 3);
    }

    #[test]
    fn frame_index_spreads_across_the_budget() {
        let mut actor = test_actor(false, Orientation::Right);
        // 4 frames over a 60-tick budget: each image holds for 15 ticks.
        let first = actor.current_frame().clone();

        for _ in 0..15 {
            actor.update();
        }
        assert_ne!(actor.current_frame(), &first);
    }

    #[test]
    fn frame_index_is_clamped_for_non_dividing_counts() {
        // 7 frames: 60 / 7 = 8, and 59 / 8 = 7 which would be out of
        // range without the clamp.
        let mut actor = Actor::new(
            ActorId(0),
            "test",
            test_sprites(7),
            false,
            Orientation::Right,
        );
        for _ in 0..ANIMATION_FRAME_BUDGET - 1 {
            actor.update();
            let _ = actor.current_frame();
        }
    }

    #[test]
    fn left_orientation_uses_flipped_frames() {
        let right = test_actor(false, Orientation::Right);
        let left = test_actor(false, Orientation::Left);

        assert_eq!(
            left.current_frame(),
            &right.current_frame().flipped(),
        );
    }

    #[test]
    #[should_panic(expected = "has no animation state")]
    fn set_state_panics_on_undeclared_state() {
        let mut actor = test_actor(false, Orientation::Right);
        actor.set_state("running");
    }
}
