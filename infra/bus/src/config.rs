use serde::{Deserialize, Serialize};

/// What a dispatch does once the bus has been torn down.
///
/// No mode retries or reopens a channel; the value is never delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetiredDispatch {
    /// Drop the value, recording only a trace event.
    Ignore,
    /// Drop the value and emit a `warn` event.
    #[default]
    Warn,
    /// Return [`crate::BusError::Retired`] to the caller.
    Reject,
}

/// Runtime options for an [`crate::ActionBus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Recorded on lifecycle log events to tell buses apart.
    pub label: String,
    pub retired_dispatch: RetiredDispatch,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { label: "actions".to_owned(), retired_dispatch: RetiredDispatch::default() }
    }
}

impl BusConfig {
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub const fn with_retired_dispatch(mut self, mode: RetiredDispatch) -> Self {
        self.retired_dispatch = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: BusConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BusConfig::default());
        assert_eq!(config.label, "actions");
        assert_eq!(config.retired_dispatch, RetiredDispatch::Warn);
    }

    #[test]
    fn retired_dispatch_uses_snake_case() {
        let config: BusConfig =
            serde_json::from_str(r#"{"label":"checkout","retired_dispatch":"reject"}"#).unwrap();
        assert_eq!(config.label, "checkout");
        assert_eq!(config.retired_dispatch, RetiredDispatch::Reject);

        assert!(serde_json::from_str::<BusConfig>(r#"{"retired_dispatch":"Reject"}"#).is_err());
    }
}
