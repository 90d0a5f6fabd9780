//! Conversions from raw UI payloads into action values.

/// A raw payload as it arrives from an input widget.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// An input event; `value` is the widget's current text, if it has one.
    Event { value: Option<String> },
    Text(String),
    Number(f64),
}

impl RawInput {
    pub fn event(value: impl Into<String>) -> Self {
        Self::Event { value: Some(value.into()) }
    }

    /// The widget value carried by an event, or `None` for anything else.
    fn event_value(&self) -> Option<&str> {
        match self {
            Self::Event { value } => value.as_deref(),
            Self::Text(_) | Self::Number(_) => None,
        }
    }

    fn fallback_text(&self) -> String {
        match self {
            Self::Event { .. } => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Text of the payload: the event value when present, the payload itself otherwise.
#[allow(clippy::needless_pass_by_value)]
pub fn coerce_string(raw: RawInput) -> String {
    raw.event_value().map_or_else(|| raw.fallback_text(), str::to_owned)
}

/// Integer value of the payload, `0` when it is not a finite number.
///
/// Fractions are truncated toward zero.
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_number(raw: RawInput) -> i64 {
    let number = match raw {
        RawInput::Number(n) => n,
        other => coerce_string(other).trim().parse().unwrap_or(f64::NAN),
    };
    if number.is_finite() { number.trunc() as i64 } else { 0 }
}
