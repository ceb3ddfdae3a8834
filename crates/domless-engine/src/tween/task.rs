use std::fmt;

use super::Ease;

/// Numeric property a tween animates. Owners map each variant onto one of
/// their own fields when applying a [`TweenStep`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TweenProp {
    X,
    Y,
    Alpha,
    FillAlpha,
    Width,
    Height,
    Angle,
    ScrollY,
    /// Slide distance of a transition (position, extent or opacity).
    Offset,
}

/// How many extra cycles a tween plays after the first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Repeat {
    #[default]
    Never,
    Times(u32),
    Forever,
}

/// Poll-able lifecycle of a tween.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TweenState {
    /// Created, still inside its start delay.
    Pending,
    Running,
    Done,
    /// Stopped before completion; hooks were dropped unfired.
    Cancelled,
}

/// Increments produced by one [`Tween::advance`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweenStep {
    pub moved: Vec<(TweenProp, f32)>,
    /// True only on the tick the tween finished.
    pub completed: bool,
}

impl TweenStep {
    /// Total increment for `prop` this tick.
    pub fn get(&self, prop: TweenProp) -> f32 {
        self.moved.iter().filter(|(p, _)| *p == prop).map(|(_, d)| d).sum()
    }

    pub fn is_idle(&self) -> bool {
        self.moved.is_empty() && !self.completed
    }
}

/// A time-based interpolation task over relative property deltas.
///
/// Durations and `dt` values are milliseconds.
///
/// ```rust,ignore
/// let mut slide = Tween::new(500.0).by(TweenProp::Y, -300.0).ease(Ease::CubicInOut);
/// let step = slide.advance(16.0);
/// drawer.y += step.get(TweenProp::Y);
/// ```
pub struct Tween {
    deltas: Vec<(TweenProp, f32)>,
    duration: f32,
    delay: f32,
    ease: Ease,
    yoyo: bool,
    repeat: Repeat,
    /// Time since creation, including the delay.
    elapsed: f32,
    /// Eased fraction of the deltas already handed out.
    applied: f32,
    state: TweenState,
    hooks: Vec<Box<dyn FnOnce()>>,
}

impl Tween {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            deltas: Vec::new(),
            duration: duration_ms.max(0.0),
            delay: 0.0,
            ease: Ease::Linear,
            yoyo: false,
            repeat: Repeat::Never,
            elapsed: 0.0,
            applied: 0.0,
            state: TweenState::Pending,
            hooks: Vec::new(),
        }
    }

    /// Adds a relative delta for `prop`.
    pub fn by(mut self, prop: TweenProp, delta: f32) -> Self {
        self.deltas.push((prop, delta));
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, delay_ms: f32) -> Self {
        self.delay = delay_ms.max(0.0);
        self
    }

    /// Plays each cycle forward then backward, ending where it started.
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Registers a single-shot hook fired on the completing tick.
    pub fn on_complete(&mut self, hook: impl FnOnce() + 'static) {
        self.hooks.push(Box::new(hook));
    }

    #[inline]
    pub fn state(&self) -> TweenState {
        self.state
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, TweenState::Done | TweenState::Cancelled)
    }

    /// `0 < progress < 1`: started and not yet complete.
    #[inline]
    pub fn in_flight(&self) -> bool {
        let p = self.progress();
        p > 0.0 && p < 1.0
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Overall progress in `[0, 1]`. Repeating-forever tweens report the
    /// progress of the current cycle.
    pub fn progress(&self) -> f32 {
        match self.state {
            TweenState::Pending => 0.0,
            TweenState::Done => 1.0,
            TweenState::Running | TweenState::Cancelled => {
                let active = (self.elapsed - self.delay).max(0.0);
                match self.total() {
                    Some(total) if total > 0.0 => (active / total).clamp(0.0, 1.0),
                    Some(_) => 1.0,
                    None => {
                        let cycle = self.cycle();
                        (active % cycle) / cycle
                    }
                }
            }
        }
    }

    /// Stops the tween. Pending hooks are dropped without running.
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            self.state = TweenState::Cancelled;
            self.hooks.clear();
        }
    }

    /// Advances by `dt_ms` and returns the property increments for this tick.
    pub fn advance(&mut self, dt_ms: f32) -> TweenStep {
        if self.is_finished() {
            return TweenStep::default();
        }

        self.elapsed += dt_ms.max(0.0);
        let active = self.elapsed - self.delay;
        if active < 0.0 {
            return TweenStep::default();
        }
        self.state = TweenState::Running;

        let (eased, completed) = match self.total() {
            Some(total) if active >= total => (self.final_fraction(), true),
            _ => (self.eased_at(active), false),
        };

        let step = eased - self.applied;
        self.applied = eased;
        let moved = if step != 0.0 {
            self.deltas.iter().map(|&(p, d)| (p, d * step)).collect()
        } else {
            Vec::new()
        };

        if completed {
            self.state = TweenState::Done;
            for hook in self.hooks.drain(..) {
                hook();
            }
        }

        TweenStep { moved, completed }
    }

    // ── internal ──────────────────────────────────────────────────────────

    fn cycle(&self) -> f32 {
        if self.yoyo { self.duration * 2.0 } else { self.duration }
    }

    /// Active time after which the tween completes; `None` = never.
    fn total(&self) -> Option<f32> {
        let cycle = self.cycle();
        match self.repeat {
            Repeat::Never => Some(cycle),
            Repeat::Times(n) => Some(cycle * (n as f32 + 1.0)),
            Repeat::Forever if cycle <= 0.0 => Some(0.0),
            Repeat::Forever => None,
        }
    }

    fn final_fraction(&self) -> f32 {
        if self.yoyo { 0.0 } else { 1.0 }
    }

    fn eased_at(&self, active: f32) -> f32 {
        let cycle = self.cycle();
        if cycle <= 0.0 {
            return self.final_fraction();
        }
        let mut t = (active % cycle) / self.duration;
        if t > 1.0 {
            t = 2.0 - t;
        }
        self.ease.apply(t)
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("deltas", &self.deltas)
            .field("duration", &self.duration)
            .field("state", &self.state)
            .field("progress", &self.progress())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn run(t: &mut Tween, ticks: usize, dt: f32, prop: TweenProp) -> f32 {
        (0..ticks).map(|_| t.advance(dt).get(prop)).sum()
    }

    // ── basics ────────────────────────────────────────────────────────────

    #[test]
    fn linear_tween_hands_out_full_delta() {
        let mut t = Tween::new(100.0).by(TweenProp::Y, -300.0);
        let total = run(&mut t, 10, 10.0, TweenProp::Y);
        assert!((total + 300.0).abs() < 1e-3);
        assert_eq!(t.state(), TweenState::Done);
    }

    #[test]
    fn halfway_linear_is_half_delta() {
        let mut t = Tween::new(100.0).by(TweenProp::X, 40.0);
        assert_eq!(t.advance(50.0).get(TweenProp::X), 20.0);
        assert!(t.in_flight());
        assert_eq!(t.progress(), 0.5);
    }

    #[test]
    fn completed_flag_only_on_final_tick() {
        let mut t = Tween::new(30.0).by(TweenProp::Alpha, 1.0);
        assert!(!t.advance(10.0).completed);
        assert!(!t.advance(10.0).completed);
        assert!(t.advance(10.0).completed);
        assert!(t.advance(10.0).is_idle());
    }

    #[test]
    fn zero_duration_completes_on_first_advance() {
        let mut t = Tween::new(0.0).by(TweenProp::Width, 5.0);
        let step = t.advance(0.0);
        assert!(step.completed);
        assert_eq!(step.get(TweenProp::Width), 5.0);
    }

    // ── delay ─────────────────────────────────────────────────────────────

    #[test]
    fn delay_holds_tween_pending() {
        let mut t = Tween::new(100.0).by(TweenProp::Alpha, 1.0).delay(50.0);
        assert!(t.advance(40.0).is_idle());
        assert_eq!(t.state(), TweenState::Pending);
        assert_eq!(t.progress(), 0.0);
        let step = t.advance(60.0);
        assert_eq!(t.state(), TweenState::Running);
        assert!((step.get(TweenProp::Alpha) - 0.5).abs() < 1e-6);
    }

    // ── yoyo / repeat ─────────────────────────────────────────────────────

    #[test]
    fn yoyo_returns_to_start() {
        let mut t = Tween::new(100.0).by(TweenProp::FillAlpha, 1.0).yoyo(true);
        let up = run(&mut t, 10, 10.0, TweenProp::FillAlpha);
        assert!((up - 1.0).abs() < 1e-5);
        let down = run(&mut t, 10, 10.0, TweenProp::FillAlpha);
        assert!((up + down).abs() < 1e-5);
        assert_eq!(t.state(), TweenState::Done);
    }

    #[test]
    fn repeat_times_runs_extra_cycles() {
        let mut t = Tween::new(10.0).by(TweenProp::Alpha, 1.0).yoyo(true).repeat(Repeat::Times(2));
        let mut completions = 0;
        for _ in 0..5 {
            if t.advance(10.0).completed {
                completions += 1;
            }
        }
        assert_eq!(completions, 0);
        assert!(t.advance(10.0).completed);
    }

    #[test]
    fn forever_never_completes() {
        let mut t = Tween::new(250.0).by(TweenProp::Alpha, -1.0).yoyo(true).repeat(Repeat::Forever);
        for _ in 0..1000 {
            assert!(!t.advance(16.0).completed);
        }
        assert_eq!(t.state(), TweenState::Running);
    }

    // ── hooks / cancel ────────────────────────────────────────────────────

    #[test]
    fn hook_fires_once_on_completion() {
        let fired = Rc::new(Cell::new(0));
        let mut t = Tween::new(20.0).by(TweenProp::X, 1.0);
        let f = fired.clone();
        t.on_complete(move || f.set(f.get() + 1));
        for _ in 0..5 {
            t.advance(10.0);
        }
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn cancel_drops_hooks() {
        let fired = Rc::new(Cell::new(false));
        let mut t = Tween::new(20.0).by(TweenProp::X, 1.0);
        let f = fired.clone();
        t.on_complete(move || f.set(true));
        t.advance(10.0);
        t.cancel();
        assert!(t.advance(100.0).is_idle());
        assert!(!fired.get());
        assert_eq!(t.state(), TweenState::Cancelled);
    }
}
