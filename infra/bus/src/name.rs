use std::borrow::{Borrow, Cow};
use std::fmt;

/// Reserved suffix marking the observable form of an action (`search` -> `search$`).
pub const OBSERVABLE_SUFFIX: &str = "$";

/// Identifier of a logical action.
///
/// The declared action set lives in the type system (see the `actions` macro);
/// at runtime any name is accepted and gets its own channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionName(Cow<'static, str>);

impl ActionName {
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The stream accessor name for this action.
    #[must_use]
    pub fn observable(&self) -> String {
        format!("{}{OBSERVABLE_SUFFIX}", self.0)
    }

    /// Splits a surface property into its action name and whether it names the
    /// stream accessor. Only one trailing suffix is stripped.
    #[must_use]
    pub fn parse_property(property: &str) -> (Self, bool) {
        property.strip_suffix(OBSERVABLE_SUFFIX).map_or_else(
            || (Self::from(property.to_owned()), false),
            |action| (Self::from(action.to_owned()), true),
        )
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ActionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ActionName {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ActionName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&Self> for ActionName {
    fn from(name: &Self) -> Self {
        name.clone()
    }
}
