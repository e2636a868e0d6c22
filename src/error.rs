use std::fmt;

/// Configuration errors raised while setting up a loader.
///
/// All of these are fatal to the loader instance that hit them; nothing is
/// left bound when one is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderError {
    /// The scrollable selector matched nothing.
    NoScrollable { selector: String },
    /// The scrollable selector matched more than one element.
    MultipleScrollables { selector: String, count: usize },
    /// The scrollable option was neither a selector string nor unset.
    InvalidScrollable { found: String },
}

impl LoaderError {
    /// The selector involved in the failure, if any.
    pub fn selector(&self) -> Option<&str> {
        match self {
            Self::NoScrollable { selector } | Self::MultipleScrollables { selector, .. } => {
                Some(selector)
            }
            Self::InvalidScrollable { .. } => None,
        }
    }
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoScrollable { selector } => {
                write!(f, "infinity: no scrollable element found for: {selector}")
            }
            Self::MultipleScrollables { selector, count } => write!(
                f,
                "infinity: multiple scrollable elements found for: {selector} ({count} matches)"
            ),
            Self::InvalidScrollable { found } => write!(
                f,
                "infinity: scrollable must be a selector string or left unset to default to the viewport (found {found})"
            ),
        }
    }
}

impl std::error::Error for LoaderError {}
