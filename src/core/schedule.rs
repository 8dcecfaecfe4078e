//=========================================================================
// Schedule / Event — Timeline Core
//=========================================================================
//
// Converts declarative "wait N seconds, then do X" authoring calls into
// absolute-time-stamped events, and replays them against a target when the
// simulation clock sweeps over their timestamps.
//
// Architecture:
//   Schedule<A>
//     ├─ events: Vec<Event<A>>   (append-only, sorted by time)
//     ├─ cursor: f64             (authoring time, advanced only by wait)
//     └─ replay_head: usize      (first event not yet fired)
//
// Flow:
//   wait()/add_event() → stamped events → run_events(start, stop, target)
//                                             └─ ScriptTarget::apply
//
// Firing convention: a sweep fires every not-yet-fired event with
// time <= stop, in stored order. Under monotonic sweeps (each call's start
// is the previous call's stop) that is exactly the events in (start, stop],
// plus events stamped at 0.0 on the first sweep — a zero-width [0, 0]
// sweep fires those too. An event sitting exactly on a boundary shared by
// two consecutive sweeps fires once, in the earlier sweep. The replay head
// is what makes the boundary unambiguous.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Debug;

use log::trace;

//=== Script Target =======================================================

/// A mutable target that scheduled actions are applied to.
///
/// Implemented by `Actor` and `Scene`. The action type is a closed enum per
/// target, so an event can never name a mutator the target does not have —
/// the `apply` match is exhaustive at compile time.
///
/// `apply` must not author new events on the schedule currently being
/// replayed and must not trigger a nested time advance; replay is strictly
/// non-reentrant.
pub trait ScriptTarget {
    /// The action payload this target understands.
    type Action: Clone + Debug;

    /// Error produced by a failed mutation. Targets whose mutators cannot
    /// fail use `std::convert::Infallible`.
    type Error: std::error::Error;

    /// Applies one scheduled action to the target.
    fn apply(&mut self, action: &Self::Action) -> Result<(), Self::Error>;
}

//=== Event ===============================================================

/// One time-stamped action within a [`Schedule`].
///
/// Immutable once created: events are only ever appended by
/// [`Schedule::add_event`] and discarded together with their schedule.
#[derive(Debug, Clone)]
pub struct Event<A> {
    time: f64,
    action: A,
}

impl<A> Event<A> {
    /// Absolute timestamp in seconds on the owning schedule's timeline.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The action fired when the sweep reaches this event.
    pub fn action(&self) -> &A {
        &self.action
    }

    /// Closed-interval membership test: `start <= time <= stop`.
    pub fn is_between(&self, start: f64, stop: f64) -> bool {
        start <= self.time && self.time <= stop
    }
}

//=== Schedule ============================================================

/// An append-only, time-ordered sequence of scripted events.
///
/// Authoring calls stamp events with the current cursor; `wait` advances the
/// cursor without appending anything. Because the cursor never decreases,
/// `events` is always sorted by time, ties in insertion order.
///
/// Each schedule is owned by exactly one actor or one scene and replayed
/// only by monotonic sweeps of that owner's clock.
#[derive(Debug)]
pub struct Schedule<A> {
    events: Vec<Event<A>>,
    cursor: f64,
    replay_head: usize,
}

// Not derived: that would bound `A: Default`.
impl<A> Default for Schedule<A> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            cursor: 0.0,
            replay_head: 0,
        }
    }
}

impl<A: Clone + Debug> Schedule<A> {
    //--- Construction -----------------------------------------------------

    /// Creates an empty schedule with the cursor at 0.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            cursor: 0.0,
            replay_head: 0,
        }
    }

    //--- Authoring --------------------------------------------------------

    /// Advances the authoring cursor by `duration` seconds.
    ///
    /// Appends nothing; it only changes where the next event is stamped.
    ///
    /// # Panics
    ///
    /// Panics if `duration` is negative or NaN.
    pub fn wait(&mut self, duration: f64) {
        assert!(
            duration >= 0.0,
            "wait duration must be non-negative, got {}",
            duration
        );
        self.cursor += duration;
    }

    /// Appends an event stamped with the current cursor.
    ///
    /// Multiple calls without an intervening `wait` produce events at the
    /// same timestamp; they fire together, in insertion order.
    pub fn add_event(&mut self, action: A) {
        trace!("event scheduled at {:.3}s: {:?}", self.cursor, action);
        self.events.push(Event {
            time: self.cursor,
            action,
        });
    }

    //--- Replay -----------------------------------------------------------

    /// Fires every not-yet-fired event with `time <= stop` against `target`,
    /// in stored order, advancing the replay head past each.
    ///
    /// `start` is the previous sweep's stop and is informational: with
    /// monotonic sweeps the fired set is exactly the events in
    /// `(start, stop]`, plus time-0 events on the first sweep. An event on
    /// a boundary shared by two adjacent sweeps fires once, in the earlier
    /// sweep, and is never skipped.
    ///
    /// A failed mutation aborts the sweep; events fired before the failure
    /// stay fired.
    pub fn run_events<T>(&mut self, start: f64, stop: f64, target: &mut T) -> Result<(), T::Error>
    where
        T: ScriptTarget<Action = A>,
    {
        debug_assert!(start <= stop, "sweep interval is inverted");

        while let Some(event) = self.events.get(self.replay_head) {
            if event.time > stop {
                break;
            }

            trace!(
                "firing event at {:.3}s in sweep [{:.3}, {:.3}]: {:?}",
                event.time,
                start,
                stop,
                event.action
            );

            let action = event.action.clone();
            self.replay_head += 1;
            target.apply(&action)?;
        }

        Ok(())
    }

    //--- Queries ----------------------------------------------------------

    /// All recorded events, fired or not, in insertion (== time) order.
    pub fn events(&self) -> &[Event<A>] {
        &self.events
    }

    /// Current authoring cursor in seconds.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Number of events not yet fired by any sweep.
    pub fn pending(&self) -> usize {
        self.events.len() - self.replay_head
    }
}

//=========================================================================
// Tests
//=========================================================================
