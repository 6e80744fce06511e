//! Message headers with case-insensitive lookup.

use serde::{Deserialize, Serialize};

/// One RFC 5322 header line, e.g. `Subject: Hello`.
///
/// The name keeps the casing the provider sent; comparisons ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

impl MessageHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this header's name equals `name`, ignoring ASCII case.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Ordered header list of a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(Vec<MessageHeader>);

impl Headers {
    /// First value for `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|h| h.is(name))
            .map(|h| h.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageHeader> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<MessageHeader>> for Headers {
    fn from(headers: Vec<MessageHeader>) -> Self {
        Self(headers)
    }
}

impl FromIterator<MessageHeader> for Headers {
    fn from_iter<I: IntoIterator<Item = MessageHeader>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a MessageHeader;
    type IntoIter = std::slice::Iter<'a, MessageHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
