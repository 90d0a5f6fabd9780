use std::borrow::Cow;

/// Error produced by a user-supplied transform.
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while dispatching, observing or building a surface.
#[actbus_derive::actbus_error]
pub enum BusError {
    /// A property of the accessor surface was assigned to instead of called.
    #[error("Unsupported operation{}: {message}", format_context(.context))]
    UnsupportedOperation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A registered transform rejected the dispatch arguments. Nothing was published.
    #[error("Transform failed{}: {source}", format_context(.context))]
    TransformFailed { source: TransformError, context: Option<Cow<'static, str>> },

    /// The value, argument or transform types disagree with the action's binding.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Dispatch after teardown, reported only when configured to reject it.
    #[error("Bus retired{}: {message}", format_context(.context))]
    Retired { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl BusError {
    pub(crate) fn type_mismatch(
        message: impl Into<Cow<'static, str>>,
        action: &crate::ActionName,
    ) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            context: Some(format!("action `{action}`").into()),
        }
    }
}
