//! Product tag list.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An ordered list of product tags.
///
/// Tags are entered as comma-separated text. Parsing trims every entry and
/// drops the empty ones while keeping the order they were typed in.
///
/// ```
/// use backoffice_core::Tags;
///
/// let tags = Tags::parse("a, b ,,c");
/// assert_eq!(tags.as_slice(), ["a", "b", "c"]);
/// assert_eq!(tags.to_string(), "a, b, c");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Parse comma-separated input into a cleaned tag list.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self(
            input
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Returns the tags as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` when there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the tags in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

/// Formats as editable text (`"a, b, c"`), the inverse of [`Tags::parse`].
impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}
