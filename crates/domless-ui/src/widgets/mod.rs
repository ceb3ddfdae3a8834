//! Composite widgets built from [`Widget`](crate::widget::Widget),
//! [`TextFlow`](crate::text_flow::TextFlow) and
//! [`Transition`](crate::transition::Transition).

pub mod button;
pub mod dialogue;
pub mod drawer;
pub mod dropdown;
pub mod form;
pub mod keyboard;
pub mod keyboard_drawer;
pub mod modal;
pub mod multiselect;
pub mod text_display;
pub mod text_field;
