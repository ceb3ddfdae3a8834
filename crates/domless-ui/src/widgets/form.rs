use domless_engine::coords::{Rect, Vec2};

use crate::context::{KeyboardRequest, UiCtx};
use crate::dirty::{DirtyTracker, Regeneratable};
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::focus::{self, Focusable};
use crate::painter::Painter;
use crate::widget::{Component, Widget, WidgetConfig, WidgetId};
use crate::widgets::button::{Button, ButtonConfig};
use crate::widgets::dropdown::DropDownField;
use crate::widgets::multiselect::MultiSelectField;
use crate::widgets::text_field::TextField;

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitConfig {
    pub label: String,
    pub width: f32,
    pub height: f32,
    /// Gap between the last row and the button.
    pub top_padding: f32,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self { label: "Submit".to_string(), width: 100.0, height: 60.0, top_padding: 20.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormConfig {
    pub x: f32,
    pub y: f32,
    /// Vertical gap between rows.
    pub row_padding: f32,
    pub submit: SubmitConfig,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, row_padding: 20.0, submit: SubmitConfig::default() }
    }
}

impl FormConfig {
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// One cell of a form row.
pub enum FormField {
    Text(TextField),
    DropDown(DropDownField),
    MultiSelect(MultiSelectField),
    Button(Button),
}

impl FormField {
    fn component(&self) -> &dyn Component {
        match self {
            FormField::Text(f) => f,
            FormField::DropDown(f) => f,
            FormField::MultiSelect(f) => f,
            FormField::Button(f) => f,
        }
    }

    fn component_mut(&mut self) -> &mut dyn Component {
        match self {
            FormField::Text(f) => f,
            FormField::DropDown(f) => f,
            FormField::MultiSelect(f) => f,
            FormField::Button(f) => f,
        }
    }

    pub fn as_text(&self) -> Option<&TextField> {
        match self {
            FormField::Text(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextField> {
        match self {
            FormField::Text(f) => Some(f),
            _ => None,
        }
    }
}

impl From<TextField> for FormField {
    fn from(f: TextField) -> Self {
        FormField::Text(f)
    }
}

impl From<DropDownField> for FormField {
    fn from(f: DropDownField) -> Self {
        FormField::DropDown(f)
    }
}

impl From<MultiSelectField> for FormField {
    fn from(f: MultiSelectField) -> Self {
        FormField::MultiSelect(f)
    }
}

impl From<Button> for FormField {
    fn from(f: Button) -> Self {
        FormField::Button(f)
    }
}

impl Component for FormField {
    fn base(&self) -> &Widget {
        self.component().base()
    }

    fn base_mut(&mut self) -> &mut Widget {
        self.component_mut().base_mut()
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.component_mut().tick(dt, ctx);
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        self.component_mut().on_event(event, origin, ctx)
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        self.component().paint(painter, origin);
    }

    fn bounds(&self, origin: Vec2) -> Rect {
        self.component().bounds(origin)
    }

    fn destroy(&mut self) {
        self.component_mut().destroy();
    }
}

/// Rows of fields with a submit button under the last row.
///
/// Rows stack top to bottom, each as tall as its tallest field. A field
/// growing (a multi-select wrapping its chips) re-flows every row below it
/// on the next tick. Text fields hand focus to each other on Tab, Shift+Tab
/// and submit-on-enter, and their keyboard requests are aimed at the submit
/// button so the whole form stays above the keyboard.
pub struct Form {
    base: Widget,
    rows: Vec<Vec<FormField>>,
    row_padding: f32,
    submit_padding: f32,
    submit: Button,
    on_submit: Option<Box<dyn FnMut()>>,
    submissions: u32,
    tracker: DirtyTracker<Form>,
}

impl Form {
    pub fn new(config: FormConfig, rows: Vec<Vec<FormField>>, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        if rows.is_empty() {
            log::warn!("rejected form without rows");
            return Err(WidgetError::EmptyForm);
        }
        if rows.iter().any(Vec::is_empty) {
            log::warn!("rejected form with an empty row");
            return Err(WidgetError::EmptyRow);
        }
        let base = Widget::new(
            WidgetConfig::default().at(config.x, config.y).sized(1.0, 1.0).outline(false),
            ctx.textures,
        )?;
        let submit_config = ButtonConfig {
            stop_propagation: false,
            emit: false,
            ..ButtonConfig::labeled(config.submit.label).sized(config.submit.width, config.submit.height)
        };
        let mut submit = Button::new(submit_config, ctx)?;
        submit.activate(false);

        let mut form = Self {
            base,
            rows,
            row_padding: config.row_padding,
            submit_padding: config.submit.top_padding,
            submit,
            on_submit: None,
            submissions: 0,
            tracker: DirtyTracker::<Form>::new().watch("row_heights", |f| f.row_heights().into()),
        };
        for field in form.rows.iter_mut().flatten() {
            if let Some(text) = field.as_text_mut() {
                text.set_in_form(true);
            }
        }
        form.dirty_check(());
        Ok(form)
    }

    /// Callback run on every submit press.
    pub fn on_submit(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    #[inline]
    pub fn rows(&self) -> &[Vec<FormField>] {
        &self.rows
    }

    #[inline]
    pub fn submit_button(&self) -> &Button {
        &self.submit
    }

    #[inline]
    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    /// Appends a row. Rows below re-flow on the next tick.
    pub fn add_row(&mut self, mut fields: Vec<FormField>) -> Result<(), WidgetError> {
        if fields.is_empty() {
            log::warn!("rejected empty form row");
            return Err(WidgetError::EmptyRow);
        }
        for field in &mut fields {
            if let Some(text) = field.as_text_mut() {
                text.set_in_form(true);
            }
        }
        self.rows.push(fields);
        Ok(())
    }

    /// Removes and returns row `index`. A form keeps at least one row.
    pub fn remove_row(&mut self, index: usize) -> Option<Vec<FormField>> {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return None;
        }
        let mut row = self.rows.remove(index);
        for field in &mut row {
            if let Some(text) = field.as_text_mut() {
                text.set_in_form(false);
            }
        }
        Some(row)
    }

    pub fn field(&self, id: WidgetId) -> Option<&FormField> {
        self.rows.iter().flatten().find(|f| f.id() == id)
    }

    pub fn field_mut(&mut self, id: WidgetId) -> Option<&mut FormField> {
        self.rows.iter_mut().flatten().find(|f| f.id() == id)
    }

    /// Every field id in row order.
    pub fn field_ids(&self) -> Vec<WidgetId> {
        self.rows.iter().flatten().map(|f| f.id()).collect()
    }

    /// Row index holding `id`.
    pub fn row_of(&self, id: WidgetId) -> Result<usize, WidgetError> {
        self.rows
            .iter()
            .position(|row| row.iter().any(|f| f.id() == id))
            .ok_or(WidgetError::UnknownField(id))
    }

    /// Field after `id` in row order, `None` past the end.
    pub fn next_field(&self, id: WidgetId) -> Result<Option<WidgetId>, WidgetError> {
        self.neighbour(&self.field_ids(), id, false)
    }

    pub fn previous_field(&self, id: WidgetId) -> Result<Option<WidgetId>, WidgetError> {
        self.neighbour(&self.field_ids(), id, true)
    }

    /// Index of the row after the one holding `id`.
    pub fn next_row(&self, id: WidgetId) -> Result<Option<usize>, WidgetError> {
        let row = self.row_of(id)?;
        Ok((row + 1 < self.rows.len()).then_some(row + 1))
    }

    pub fn previous_row(&self, id: WidgetId) -> Result<Option<usize>, WidgetError> {
        Ok(self.row_of(id)?.checked_sub(1))
    }

    fn neighbour(&self, order: &[WidgetId], id: WidgetId, reverse: bool) -> Result<Option<WidgetId>, WidgetError> {
        if !order.contains(&id) {
            log::warn!("form {} has no field {id}", self.base.id());
            return Err(WidgetError::UnknownField(id));
        }
        Ok(focus::cycle(order, Some(id), reverse, false))
    }

    /// Text fields in row order; only these take Tab focus.
    fn text_ids(&self) -> Vec<WidgetId> {
        self.rows.iter().flatten().filter_map(|f| f.as_text().map(|t| t.id())).collect()
    }

    /// Publishes the submit event and runs the callback.
    pub fn submit(&mut self, ctx: &mut UiCtx<'_>) {
        ctx.events.emit(WidgetEvent::FormSubmit { form: self.base.id() });
        if let Some(f) = &mut self.on_submit {
            f();
        }
        self.submissions += 1;
        log::info!("form {} submitted", self.base.id());
    }

    fn row_heights(&self) -> Vec<f32> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|f| f.base().height).fold(0.0, f32::max))
            .collect()
    }

    /// Stacks rows and places the submit button right-aligned below them.
    fn reflow(&mut self) {
        let mut y = 0.0;
        let mut right: f32 = 0.0;
        let mut bottom: f32 = 0.0;
        let heights = self.row_heights();
        for (row, height) in self.rows.iter_mut().zip(heights) {
            for field in row.iter_mut() {
                let base = field.base_mut();
                base.y = y;
                right = right.max(base.x + base.width);
            }
            bottom = y + height;
            y = bottom + self.row_padding;
        }
        let submit = self.submit.base_mut();
        submit.x = right - submit.width;
        submit.y = bottom + self.submit_padding;
        self.base.width = right.max(submit.width);
        self.base.height = submit.y + submit.height;
        log::trace!("form {} reflowed to {}x{}", self.base.id(), self.base.width, self.base.height);
    }

    /// Deactivates the text field `from` toward `to`, keeping the keyboard
    /// open, or closes the keyboard when there is nowhere to go.
    fn hand_off(&mut self, from: WidgetId, to: Option<WidgetId>, inner: Vec2, ctx: &mut UiCtx<'_>) {
        let target = to.and_then(|id| self.field(id).map(|f| (id, f.bounds(inner))));
        if let Some(text) = self.field_mut(from).and_then(FormField::as_text_mut) {
            text.deactivate(target, ctx);
        }
    }

    /// Tap on a text field while another one is editing.
    fn pointer_hand_off(&mut self, pos: Vec2, inner: Vec2, ctx: &mut UiCtx<'_>) -> bool {
        let Some(active) = self.rows.iter().flatten().find_map(|f| f.as_text().filter(|t| t.is_active())) else {
            return false;
        };
        let active = active.id();
        let tapped = self
            .rows
            .iter()
            .flatten()
            .filter_map(FormField::as_text)
            .find(|t| t.id() != active && t.base().is_interactive() && t.bounds(inner).contains(pos))
            .map(|t| t.id());
        match tapped {
            Some(to) => {
                self.hand_off(active, Some(to), inner, ctx);
                true
            }
            None => false,
        }
    }

    fn apply_focus_moves(&mut self, inner: Vec2, ctx: &mut UiCtx<'_>) {
        let order = self.text_ids();
        let mut moves = Vec::new();
        for field in self.rows.iter_mut().flatten() {
            if let Some(text) = field.as_text_mut() {
                if let Some(m) = text.take_focus_move() {
                    moves.push((text.id(), m));
                }
            }
        }
        for (from, m) in moves {
            let to = focus::cycle(&order, Some(from), m.is_reverse(), false);
            self.hand_off(from, to, inner, ctx);
        }
    }

    /// Aims keyboard open requests made by fields at the submit button.
    fn retarget_keyboard(&self, since: usize, inner: Vec2, ctx: &mut UiCtx<'_>) {
        let submit = self.submit.bounds(inner);
        for request in ctx.keyboard.iter_mut().skip(since) {
            if let KeyboardRequest::Open { target, .. } = request {
                *target = submit;
            }
        }
    }
}

impl Regeneratable<()> for Form {
    fn tracker(&self) -> &DirtyTracker<Self> {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut DirtyTracker<Self> {
        &mut self.tracker
    }

    fn regenerate(&mut self, _: ()) {
        self.reflow();
    }
}

impl Component for Form {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.tick(dt, ctx.textures);
        for field in self.rows.iter_mut().flatten() {
            field.tick(dt, ctx);
        }
        self.submit.tick(dt, ctx);
        self.dirty_check(());
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if self.base.is_destroyed() {
            return EventResult::Ignored;
        }
        let inner = self.base.child_origin(origin);
        let since = ctx.keyboard.len();

        self.submit.on_event(event, inner, ctx);
        if self.submit.take_pressed() {
            self.submit(ctx);
        }

        let mut result = EventResult::Ignored;
        match event {
            UiEvent::PointerUp { pos, was_dragged } => {
                if !*was_dragged && !ctx.keyboard_busy && self.pointer_hand_off(*pos, inner, ctx) {
                    return EventResult::Consumed;
                }
                // every field sees releases so editing fields can let go
                for field in self.rows.iter_mut().flatten() {
                    result = field.on_event(event, inner, ctx).or(result);
                }
            }
            _ => {
                for field in self.rows.iter_mut().flatten() {
                    if field.on_event(event, inner, ctx).is_consumed() {
                        result = EventResult::Consumed;
                        break;
                    }
                }
            }
        }

        self.apply_focus_moves(inner, ctx);
        self.retarget_keyboard(since, inner, ctx);
        result
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.base.is_destroyed() {
            return;
        }
        let inner = self.base.child_origin(origin);
        for field in self.rows.iter().flatten() {
            field.paint(painter, inner);
        }
        self.submit.paint(painter, inner);
    }

    fn destroy(&mut self) {
        for field in self.rows.iter_mut().flatten() {
            field.destroy();
        }
        self.submit.destroy();
        self.on_submit = None;
        self.base.destroy();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use domless_engine::input::{Key, Modifiers};

    use super::*;
    use crate::scene::UiScene;
    use crate::widgets::dropdown::DropDownConfig;
    use crate::widgets::multiselect::MultiSelectConfig;
    use crate::widgets::text_field::TextFieldConfig;

    fn text(scene: &mut UiScene, x: f32) -> FormField {
        TextField::new(TextFieldConfig::default().at(x, 0.0).sized(300.0, 110.0), &mut scene.ctx()).unwrap().into()
    }

    fn two_text_rows(scene: &mut UiScene) -> Form {
        let rows = vec![vec![text(scene, 0.0)], vec![text(scene, 0.0)]];
        Form::new(FormConfig::default().at(50.0, 40.0), rows, &mut scene.ctx()).unwrap()
    }

    fn tap(pos: Vec2) -> UiEvent {
        UiEvent::PointerUp { pos, was_dragged: false }
    }

    fn is_active(form: &Form, id: WidgetId) -> bool {
        form.field(id).and_then(FormField::as_text).is_some_and(|t| t.is_active())
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn empty_forms_and_rows_are_rejected() {
        let mut scene = UiScene::headless(800.0, 600.0);
        assert_eq!(Form::new(FormConfig::default(), vec![], &mut scene.ctx()).err(), Some(WidgetError::EmptyForm));
        let rows = vec![vec![text(&mut scene, 0.0)], vec![]];
        assert_eq!(Form::new(FormConfig::default(), rows, &mut scene.ctx()).err(), Some(WidgetError::EmptyRow));

        let mut form = two_text_rows(&mut scene);
        assert_eq!(form.add_row(vec![]), Err(WidgetError::EmptyRow));
    }

    #[test]
    fn rows_stack_and_submit_sits_below_right() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let dropdown = DropDownField::new(DropDownConfig::default().at(320.0, 0.0), &mut scene.ctx()).unwrap();
        let rows = vec![vec![text(&mut scene, 0.0), dropdown.into()], vec![text(&mut scene, 0.0)]];
        let form = Form::new(FormConfig::default(), rows, &mut scene.ctx()).unwrap();

        assert_eq!(form.rows()[0][0].base().y, 0.0);
        assert_eq!(form.rows()[1][0].base().y, 130.0);
        let submit = form.submit_button().base();
        assert_eq!(submit.x, 520.0 - 100.0);
        assert_eq!(submit.y, 130.0 + 110.0 + 20.0);
        assert_eq!(form.submit_button().label(), "Submit");
    }

    #[test]
    fn growing_field_reflows_rows_below() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let multi = MultiSelectField::new(MultiSelectConfig::default(), &mut scene.ctx()).unwrap();
        let multi_id = multi.id();
        let rows = vec![vec![multi.into()], vec![text(&mut scene, 0.0)]];
        let mut form = Form::new(FormConfig::default(), rows, &mut scene.ctx()).unwrap();
        assert_eq!(form.rows()[1][0].base().y, 70.0);

        if let Some(FormField::MultiSelect(m)) = form.field_mut(multi_id) {
            m.select_option("Option 1", &mut scene.ctx()).unwrap();
            m.select_option("Option 2", &mut scene.ctx()).unwrap();
        }
        form.tick(16.0, &mut scene.ctx());
        assert_eq!(form.rows()[1][0].base().y, 120.0);
    }

    #[test]
    fn added_row_is_placed_on_next_tick() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut form = two_text_rows(&mut scene);
        let extra = text(&mut scene, 0.0);
        form.add_row(vec![extra]).unwrap();
        form.tick(16.0, &mut scene.ctx());
        assert_eq!(form.rows()[2][0].base().y, 260.0);
        assert_eq!(form.submit_button().base().y, 260.0 + 110.0 + 20.0);
        form.remove_row(0).unwrap();
        form.tick(16.0, &mut scene.ctx());
        assert_eq!(form.rows()[1][0].base().y, 130.0);
    }

    // ── lookups ───────────────────────────────────────────────────────────

    #[test]
    fn neighbours_by_identity() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let form = two_text_rows(&mut scene);
        let ids = form.field_ids();
        assert_eq!(form.next_field(ids[0]), Ok(Some(ids[1])));
        assert_eq!(form.next_field(ids[1]), Ok(None));
        assert_eq!(form.previous_field(ids[1]), Ok(Some(ids[0])));
        assert_eq!(form.previous_field(ids[0]), Ok(None));
        assert_eq!(form.next_row(ids[0]), Ok(Some(1)));
        assert_eq!(form.previous_row(ids[0]), Ok(None));

        let stranger = WidgetId::new();
        assert_eq!(form.next_field(stranger), Err(WidgetError::UnknownField(stranger)));
        assert_eq!(form.next_row(stranger), Err(WidgetError::UnknownField(stranger)));
    }

    // ── focus ─────────────────────────────────────────────────────────────

    #[test]
    fn tab_hands_the_keyboard_to_the_next_field() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut form = two_text_rows(&mut scene);
        let ids = form.field_ids();
        form.on_event(&tap(Vec2::new(100.0, 80.0)), Vec2::ZERO, &mut scene.ctx());
        assert!(is_active(&form, ids[0]));

        let tab = UiEvent::KeyDown { key: Key::Tab, modifiers: Modifiers::default() };
        form.on_event(&tab, Vec2::ZERO, &mut scene.ctx());
        assert!(!is_active(&form, ids[0]));
        let second = Rect::new(50.0, 40.0 + 130.0, 300.0, 110.0);
        assert_eq!(
            scene.keyboard_requests.last(),
            Some(&KeyboardRequest::Refocus { to: ids[1], target: second })
        );

        form.on_event(&UiEvent::FocusField { id: ids[1] }, Vec2::ZERO, &mut scene.ctx());
        assert!(is_active(&form, ids[1]));
    }

    #[test]
    fn tab_past_the_last_field_closes_the_keyboard() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut form = two_text_rows(&mut scene);
        let ids = form.field_ids();
        form.on_event(&UiEvent::FocusField { id: ids[1] }, Vec2::ZERO, &mut scene.ctx());
        let tab = UiEvent::KeyDown { key: Key::Tab, modifiers: Modifiers::default() };
        form.on_event(&tab, Vec2::ZERO, &mut scene.ctx());
        assert!(!is_active(&form, ids[1]));
        assert_eq!(scene.keyboard_requests.last(), Some(&KeyboardRequest::Close));
    }

    #[test]
    fn keyboard_is_opened_toward_the_submit_button() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut form = two_text_rows(&mut scene);
        form.on_event(&tap(Vec2::new(100.0, 80.0)), Vec2::ZERO, &mut scene.ctx());
        let submit = form.submit_button().bounds(Vec2::new(50.0, 40.0));
        assert_eq!(scene.keyboard_requests, vec![KeyboardRequest::Open { target: submit, max_push: 40.0 }]);
    }

    #[test]
    fn tapping_another_field_refocuses_instead_of_closing() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut form = two_text_rows(&mut scene);
        let ids = form.field_ids();
        form.on_event(&tap(Vec2::new(100.0, 80.0)), Vec2::ZERO, &mut scene.ctx());
        scene.keyboard_requests.clear();

        let result = form.on_event(&tap(Vec2::new(100.0, 220.0)), Vec2::ZERO, &mut scene.ctx());
        assert!(result.is_consumed());
        assert!(!is_active(&form, ids[0]));
        assert!(!is_active(&form, ids[1]));
        assert!(matches!(scene.keyboard_requests[..], [KeyboardRequest::Refocus { to, .. }] if to == ids[1]));
    }

    // ── submit ────────────────────────────────────────────────────────────

    #[test]
    fn submit_button_publishes_and_calls_back() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mut form = two_text_rows(&mut scene).on_submit(move || seen.set(seen.get() + 1));
        let at = form.submit_button().bounds(Vec2::new(50.0, 40.0)).center();
        form.on_event(&UiEvent::PointerDown { pos: at }, Vec2::ZERO, &mut scene.ctx());
        assert_eq!(calls.get(), 1);
        assert_eq!(form.submissions(), 1);
        assert_eq!(scene.events.drain(), vec![WidgetEvent::FormSubmit { form: form.id() }]);
    }
}
