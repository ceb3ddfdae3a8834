use crate::widget::WidgetId;

/// Failures reported synchronously by widget constructors and operations.
///
/// Re-entrant requests that lose against an in-flight animation are not
/// errors; those calls return `false` instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    #[error("widget {widget} has no outline primitive, cannot {operation}")]
    NoVisualPrimitive { widget: WidgetId, operation: &'static str },

    #[error("widget {widget} is already {width}x{height}")]
    UnchangedSize { widget: WidgetId, width: f32, height: f32 },

    #[error("drawer edge must be one of top, bottom, left or right, got {0:?}")]
    InvalidEdge(String),

    #[error("{what} must be positive and finite, got {value}")]
    InvalidSize { what: &'static str, value: f32 },

    #[error("a form needs at least one row")]
    EmptyForm,

    #[error("a form row needs at least one field")]
    EmptyRow,

    #[error("no field {0} in this form")]
    UnknownField(WidgetId),

    #[error("no option {0:?}")]
    UnknownOption(String),
}

/// Checks a construction dimension.
pub(crate) fn positive(what: &'static str, value: f32) -> Result<f32, WidgetError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        log::warn!("rejected {what} = {value}");
        Err(WidgetError::InvalidSize { what, value })
    }
}
