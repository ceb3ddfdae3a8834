use domless_engine::coords::Vec2;
use domless_engine::input::Key;

use crate::widget::WidgetId;

pub use domless_engine::input::Modifiers;

/// Input events routed through the widget tree.
///
/// Positions are screen-space logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Primary button pressed at `pos`.
    PointerDown { pos: Vec2 },
    /// Primary button released at `pos`. `was_dragged` is set when the
    /// release ends (or just ended) a drag; click handling ignores those.
    PointerUp { pos: Vec2, was_dragged: bool },
    /// Pointer moved while dragging; `delta` is the travel since the last event.
    Drag { pos: Vec2, delta: Vec2 },
    /// Physical key pressed.
    KeyDown { key: Key, modifiers: Modifiers },
    /// Committed text from a physical keyboard.
    TextInput { text: String },
    /// Mouse wheel in pixels; positive reveals content further down.
    Wheel { delta: f32 },
    /// A key tapped on the on-screen keyboard.
    VirtualKey { value: String, key: Option<Key> },
    /// The keyboard drawer finished bringing this field into view.
    FocusField { id: WidgetId },
}

/// Result returned by [`Component::on_event`](crate::widget::Component::on_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled; stop routing to siblings / parents.
    Consumed,
    /// Event was not handled; keep routing.
    Ignored,
}

impl EventResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == EventResult::Consumed
    }

    #[inline]
    pub fn or(self, other: EventResult) -> EventResult {
        if self.is_consumed() { self } else { other }
    }

    /// Lazy [`or`](Self::or): only routes further when not consumed.
    #[inline]
    pub fn or_else(self, f: impl FnOnce() -> EventResult) -> EventResult {
        if self.is_consumed() { self } else { f() }
    }
}

/// Named events widgets publish to the host application.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Fired on every logical key or button press with `(value, key)`.
    ButtonPress { source: WidgetId, value: String, key: Option<Key> },
    /// A form's submit control was pressed.
    FormSubmit { form: WidgetId },
    OptionSelected { field: WidgetId, value: Option<String> },
    OptionDeselected { field: WidgetId, value: String },
    FieldActivated { field: WidgetId },
    FieldDeactivated { field: WidgetId },
    DrawerOpened { drawer: WidgetId },
    DrawerClosed { drawer: WidgetId },
    ModalClosed { modal: WidgetId },
}

impl WidgetEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetEvent::ButtonPress { .. } => "domlessButtonPress",
            WidgetEvent::FormSubmit { .. } => "domlessFormSubmit",
            WidgetEvent::OptionSelected { .. } => "domlessOptionSelected",
            WidgetEvent::OptionDeselected { .. } => "domlessOptionDeselected",
            WidgetEvent::FieldActivated { .. } => "domlessFieldActivated",
            WidgetEvent::FieldDeactivated { .. } => "domlessFieldDeactivated",
            WidgetEvent::DrawerOpened { .. } => "domlessDrawerOpened",
            WidgetEvent::DrawerClosed { .. } => "domlessDrawerClosed",
            WidgetEvent::ModalClosed { .. } => "domlessModalClosed",
        }
    }
}

/// FIFO of published events, drained by the host once per frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<WidgetEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: WidgetEvent) {
        log::trace!("emit {}", event.name());
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetEvent> {
        self.events.iter()
    }

    /// Number of queued events called `name`.
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_queue_in_order() {
        let mut q = EventQueue::new();
        let id = WidgetId::new();
        q.emit(WidgetEvent::ButtonPress { source: id, value: "a".into(), key: None });
        q.emit(WidgetEvent::FormSubmit { form: id });
        assert_eq!(q.count("domlessButtonPress"), 1);
        let drained = q.drain();
        assert_eq!(drained[1].name(), "domlessFormSubmit");
        assert!(q.is_empty());
    }

    #[test]
    fn or_keeps_first_consumer() {
        assert!(EventResult::Consumed.or(EventResult::Ignored).is_consumed());
        assert!(EventResult::Ignored.or(EventResult::Consumed).is_consumed());
        assert!(!EventResult::Ignored.or(EventResult::Ignored).is_consumed());
    }
}
