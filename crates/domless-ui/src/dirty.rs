//! Pull-based change detection.
//!
//! A [`DirtyTracker`] holds a table of typed accessors. Each tick the owner
//! samples every accessor, compares the samples with the values captured at
//! the end of its last regeneration and regenerates at most once when any of
//! them differ. Nothing pushes change notifications: any code path may mutate
//! a watched field and the next tick picks it up.

use domless_engine::paint::Color;

/// Name of a watched attribute, used for logging and lookups.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeId(pub &'static str);

impl std::fmt::Display for AttributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A sampled attribute value. Floats compare by bit pattern, so a value that
/// did not change is never reported as changed (including NaN).
#[derive(Debug, Clone)]
pub enum WatchValue {
    Bool(bool),
    Num(f32),
    Color([u8; 4]),
    Text(String),
    List(Vec<f32>),
}

impl PartialEq for WatchValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (WatchValue::Bool(a), WatchValue::Bool(b)) => a == b,
            (WatchValue::Num(a), WatchValue::Num(b)) => a.to_bits() == b.to_bits(),
            (WatchValue::Color(a), WatchValue::Color(b)) => a == b,
            (WatchValue::Text(a), WatchValue::Text(b)) => a == b,
            (WatchValue::List(a), WatchValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => false,
        }
    }
}

impl From<bool> for WatchValue {
    fn from(v: bool) -> Self {
        WatchValue::Bool(v)
    }
}

impl From<f32> for WatchValue {
    fn from(v: f32) -> Self {
        WatchValue::Num(v)
    }
}

impl From<usize> for WatchValue {
    fn from(v: usize) -> Self {
        WatchValue::Num(v as f32)
    }
}

impl From<Color> for WatchValue {
    fn from(v: Color) -> Self {
        WatchValue::Color(v.to_srgb_u8())
    }
}

impl From<&str> for WatchValue {
    fn from(v: &str) -> Self {
        WatchValue::Text(v.to_string())
    }
}

impl From<String> for WatchValue {
    fn from(v: String) -> Self {
        WatchValue::Text(v)
    }
}

impl From<Vec<f32>> for WatchValue {
    fn from(v: Vec<f32>) -> Self {
        WatchValue::List(v)
    }
}

/// Reads one watched attribute off its owner.
pub type Accessor<T> = fn(&T) -> WatchValue;

/// Ordered table of watched attributes and their last captured values.
pub struct DirtyTracker<T> {
    watched: Vec<(AttributeId, Accessor<T>)>,
    last: Vec<Option<WatchValue>>,
}

impl<T> DirtyTracker<T> {
    pub fn new() -> Self {
        Self { watched: Vec::new(), last: Vec::new() }
    }

    /// Builder form of [`register`](Self::register).
    pub fn watch(mut self, id: &'static str, accessor: Accessor<T>) -> Self {
        self.register(id, accessor);
        self
    }

    /// Adds an attribute. It has no captured value yet, so the next check
    /// reports it as changed.
    pub fn register(&mut self, id: &'static str, accessor: Accessor<T>) {
        self.watched.push((AttributeId(id), accessor));
        self.last.push(None);
    }

    pub fn watched(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.watched.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Current value of every watched attribute, in registration order.
    pub fn sample(&self, target: &T) -> Vec<WatchValue> {
        self.watched.iter().map(|(_, read)| read(target)).collect()
    }

    /// Attributes whose sampled value differs from the captured one.
    pub fn changed(&self, sample: &[WatchValue]) -> Vec<AttributeId> {
        self.watched
            .iter()
            .zip(&self.last)
            .zip(sample)
            .filter(|((_, last), now)| last.as_ref() != Some(*now))
            .map(|(((id, _), _), _)| *id)
            .collect()
    }

    pub fn is_dirty(&self, sample: &[WatchValue]) -> bool {
        self.last.len() != sample.len()
            || self.last.iter().zip(sample).any(|(last, now)| last.as_ref() != Some(now))
    }

    /// Captures `sample` as the new baseline.
    pub fn commit(&mut self, sample: Vec<WatchValue>) {
        self.last = sample.into_iter().map(Some).collect();
    }
}

impl<T> Default for DirtyTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for DirtyTracker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirtyTracker")
            .field("watched", &self.watched.iter().map(|(id, _)| id.0).collect::<Vec<_>>())
            .field("last", &self.last)
            .finish()
    }
}

/// Owners whose visuals are rebuilt from watched state.
///
/// `R` is whatever host resource regeneration needs (the primitive cache, a
/// text measurer, or nothing).
pub trait Regeneratable<R>: Sized {
    fn tracker(&self) -> &DirtyTracker<Self>;

    fn tracker_mut(&mut self) -> &mut DirtyTracker<Self>;

    /// Rebuilds derived visuals from current state. Must be idempotent.
    fn regenerate(&mut self, res: R);

    /// Samples every watched attribute and regenerates once if any changed.
    /// Returns whether a regeneration ran.
    fn dirty_check(&mut self, res: R) -> bool {
        let now = self.tracker().sample(self);
        if !self.tracker().is_dirty(&now) {
            return false;
        }
        if log::log_enabled!(log::Level::Trace) {
            for id in self.tracker().changed(&now) {
                log::trace!("{id} changed");
            }
        }
        self.regenerate(res);
        let after = self.tracker().sample(self);
        self.tracker_mut().commit(after);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        size: f32,
        label: String,
        rebuilt: u32,
        tracker: DirtyTracker<Probe>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                size: 10.0,
                label: "a".into(),
                rebuilt: 0,
                tracker: DirtyTracker::<Probe>::new()
                    .watch("size", |p| p.size.into())
                    .watch("label", |p| p.label.as_str().into()),
            }
        }
    }

    impl Regeneratable<()> for Probe {
        fn tracker(&self) -> &DirtyTracker<Self> {
            &self.tracker
        }

        fn tracker_mut(&mut self) -> &mut DirtyTracker<Self> {
            &mut self.tracker
        }

        fn regenerate(&mut self, _: ()) {
            self.rebuilt += 1;
        }
    }

    #[test]
    fn first_check_captures_baseline() {
        let mut p = Probe::new();
        assert!(p.dirty_check(()));
        assert!(!p.dirty_check(()));
        assert_eq!(p.rebuilt, 1);
    }

    #[test]
    fn several_mutations_regenerate_once() {
        let mut p = Probe::new();
        p.dirty_check(());
        p.size = 20.0;
        p.label = "b".into();
        assert!(p.dirty_check(()));
        assert!(!p.dirty_check(()));
        assert_eq!(p.rebuilt, 2);
    }

    #[test]
    fn restoring_a_value_before_the_tick_is_not_a_change() {
        let mut p = Probe::new();
        p.dirty_check(());
        p.size = 30.0;
        p.size = 10.0;
        assert!(!p.dirty_check(()));
    }

    #[test]
    fn changed_names_the_attribute() {
        let mut p = Probe::new();
        p.dirty_check(());
        p.label = "z".into();
        let now = p.tracker.sample(&p);
        assert_eq!(p.tracker.changed(&now), vec![AttributeId("label")]);
    }

    #[test]
    fn late_registration_forces_a_check() {
        let mut p = Probe::new();
        p.dirty_check(());
        p.tracker.register("rebuilt", |p| (p.rebuilt as f32).into());
        assert!(p.dirty_check(()));
    }

    #[test]
    fn nan_equals_itself_by_bits() {
        assert_eq!(WatchValue::Num(f32::NAN), WatchValue::Num(f32::NAN));
        assert_ne!(WatchValue::Num(0.0), WatchValue::Bool(false));
    }
}
