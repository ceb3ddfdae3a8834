//! Open/closed slide state machine shared by drawers, modals and dropdowns.
//!
//! A [`Transition`] only tracks a scalar `offset` running from 0 (closed) to
//! `travel` (open). Owners map the offset onto whatever they animate: a
//! drawer's position along its edge, a dropdown mask's extent, a modal
//! dimmer's opacity.

use domless_engine::tween::{Ease, Tween, TweenProp, TweenState};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransitionState {
    Closed,
    /// Slide running toward open; input stays disabled.
    Opening,
    Open,
    /// Slide running toward closed; input already disabled.
    Closing,
}

impl TransitionState {
    /// True for the two settled states.
    #[inline]
    pub fn is_settled(self) -> bool {
        matches!(self, TransitionState::Closed | TransitionState::Open)
    }
}

pub struct Transition {
    state: TransitionState,
    travel: f32,
    duration: f32,
    ease: Ease,
    offset: f32,
    task: Option<Tween>,
    slides_started: u32,
}

impl Transition {
    pub fn new(travel: f32, duration_ms: f32, ease: Ease) -> Self {
        Self {
            state: TransitionState::Closed,
            travel,
            duration: duration_ms,
            ease,
            offset: 0.0,
            task: None,
            slides_started: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> TransitionState {
        self.state
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state == TransitionState::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state == TransitionState::Closed
    }

    /// Current slide distance in `[0, travel]`.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// `offset / travel`, 0 when closed and 1 when open.
    pub fn fraction(&self) -> f32 {
        if self.travel == 0.0 { 0.0 } else { self.offset / self.travel }
    }

    #[inline]
    pub fn travel(&self) -> f32 {
        self.travel
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Changes the slide distance. Only applies while closed.
    pub fn set_travel(&mut self, travel: f32) -> bool {
        if !self.is_closed() {
            return false;
        }
        self.travel = travel;
        true
    }

    /// Number of slide tasks ever started.
    #[inline]
    pub fn slides_started(&self) -> u32 {
        self.slides_started
    }

    /// A slide task exists and has not finished.
    pub fn in_flight(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|t| matches!(t.state(), TweenState::Pending | TweenState::Running))
    }

    /// Starts opening. Ignored unless closed.
    pub fn activate(&mut self) -> bool {
        if self.state != TransitionState::Closed || self.in_flight() {
            log::trace!("transition activate ignored in {:?}", self.state);
            return false;
        }
        self.start(self.travel - self.offset);
        self.state = TransitionState::Opening;
        true
    }

    /// Starts closing. Ignored unless open.
    pub fn deactivate(&mut self) -> bool {
        if self.state != TransitionState::Open || self.in_flight() {
            log::trace!("transition deactivate ignored in {:?}", self.state);
            return false;
        }
        self.start(-self.offset);
        self.state = TransitionState::Closing;
        true
    }

    /// [`activate`](Self::activate) with a hook run once, on the tick the
    /// drawer settles open. Not registered when the activation is ignored.
    pub fn activate_then(&mut self, done: impl FnOnce() + 'static) -> bool {
        if !self.activate() {
            return false;
        }
        if let Some(task) = &mut self.task {
            task.on_complete(done);
        }
        true
    }

    /// [`deactivate`](Self::deactivate) with a hook run once the slide closes.
    pub fn deactivate_then(&mut self, done: impl FnOnce() + 'static) -> bool {
        if !self.deactivate() {
            return false;
        }
        if let Some(task) = &mut self.task {
            task.on_complete(done);
        }
        true
    }

    /// Advances the slide. Returns the settled state on the tick the slide
    /// completes.
    pub fn advance(&mut self, dt: f32) -> Option<TransitionState> {
        let task = self.task.as_mut()?;
        let step = task.advance(dt);
        self.offset += step.get(TweenProp::Offset);
        if !step.completed {
            return None;
        }
        self.task = None;
        self.state = match self.state {
            TransitionState::Opening => {
                self.offset = self.travel;
                TransitionState::Open
            }
            _ => {
                self.offset = 0.0;
                TransitionState::Closed
            }
        };
        Some(self.state)
    }

    /// Drops any running slide and snaps to the nearest settled state.
    pub fn cancel(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
        self.state = match self.state {
            TransitionState::Opening | TransitionState::Open => {
                self.offset = self.travel;
                TransitionState::Open
            }
            TransitionState::Closing | TransitionState::Closed => {
                self.offset = 0.0;
                TransitionState::Closed
            }
        };
    }

    fn start(&mut self, delta: f32) {
        self.task = Some(Tween::new(self.duration).by(TweenProp::Offset, delta).ease(self.ease));
        self.slides_started += 1;
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("state", &self.state)
            .field("offset", &self.offset)
            .field("travel", &self.travel)
            .finish()
    }
}

/// Components built around a [`Transition`].
pub trait Transitionable {
    fn transition(&self) -> &Transition;

    fn state(&self) -> TransitionState {
        self.transition().state()
    }

    fn is_open(&self) -> bool {
        self.transition().is_open()
    }

    fn is_closed(&self) -> bool {
        self.transition().is_closed()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn drawer() -> Transition {
        Transition::new(300.0, 500.0, Ease::CubicInOut)
    }

    fn run(t: &mut Transition, ms: f32) -> Vec<TransitionState> {
        let mut settled = Vec::new();
        let mut left = ms;
        while left > 0.0 {
            if let Some(s) = t.advance(16.0) {
                settled.push(s);
            }
            left -= 16.0;
        }
        settled
    }

    #[test]
    fn full_cycle_visits_every_state() {
        let mut t = drawer();
        assert!(t.activate());
        assert_eq!(t.state(), TransitionState::Opening);
        assert_eq!(run(&mut t, 600.0), vec![TransitionState::Open]);
        assert_eq!(t.offset(), 300.0);
        assert!(t.deactivate());
        assert_eq!(t.state(), TransitionState::Closing);
        assert_eq!(run(&mut t, 600.0), vec![TransitionState::Closed]);
        assert_eq!(t.offset(), 0.0);
    }

    #[test]
    fn double_activate_starts_one_slide() {
        let mut t = drawer();
        assert!(t.activate());
        t.advance(100.0);
        assert!(!t.activate());
        let settled = run(&mut t, 1000.0);
        assert_eq!(settled, vec![TransitionState::Open]);
        assert_eq!(t.slides_started(), 1);
    }

    #[test]
    fn deactivate_is_ignored_unless_open() {
        let mut t = drawer();
        assert!(!t.deactivate());
        t.activate();
        assert!(!t.deactivate());
        run(&mut t, 600.0);
        assert!(t.deactivate());
        assert!(!t.activate());
    }

    #[test]
    fn offset_stays_within_travel() {
        let mut t = drawer();
        t.activate();
        for _ in 0..40 {
            t.advance(16.0);
            assert!(t.offset() >= -1e-3 && t.offset() <= 300.0 + 1e-3);
        }
    }

    #[test]
    fn cancel_snaps_to_settled_state() {
        let mut t = drawer();
        t.activate();
        t.advance(100.0);
        t.cancel();
        assert!(t.is_open());
        assert!(!t.in_flight());
        assert_eq!(t.advance(16.0), None);
    }

    #[test]
    fn travel_changes_only_while_closed() {
        let mut t = drawer();
        assert!(t.set_travel(120.0));
        t.activate();
        assert!(!t.set_travel(10.0));
        run(&mut t, 600.0);
        assert_eq!(t.offset(), 120.0);
    }

    // ── completion hooks ──────────────────────────────────────────────────

    #[test]
    fn open_hook_fires_once_despite_second_request() {
        let fired = Rc::new(Cell::new(0));
        let mut t = drawer();
        let first = fired.clone();
        assert!(t.activate_then(move || first.set(first.get() + 1)));
        t.advance(16.0);
        let second = fired.clone();
        assert!(!t.activate_then(move || second.set(second.get() + 10)));
        assert_eq!(fired.get(), 0);
        run(&mut t, 1000.0);
        assert_eq!(fired.get(), 1);
        assert!(t.is_open());
    }

    #[test]
    fn close_hook_fires_when_closed_and_cancel_drops_it() {
        let closed = Rc::new(Cell::new(false));
        let mut t = drawer();
        t.activate();
        run(&mut t, 600.0);
        let c = closed.clone();
        assert!(t.deactivate_then(move || c.set(true)));
        run(&mut t, 600.0);
        assert!(closed.get());
        assert!(t.is_closed());

        let dropped = Rc::new(Cell::new(false));
        let d = dropped.clone();
        t.activate_then(move || d.set(true));
        assert!(t.in_flight());
        t.advance(100.0);
        t.cancel();
        run(&mut t, 600.0);
        assert!(!dropped.get());
    }
}
