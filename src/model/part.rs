//! MIME part tree.

/// One node of a message's content tree.
///
/// Leaves carry an optional encoded payload; containers carry ordered children.
/// The tree is read-only input for [`crate::parser::body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimePart {
    /// A single-bodied part (`text/plain`, `text/html`, `image/png`, …).
    Leaf {
        /// Lowercase or mixed-case `type/subtype`, without parameters.
        mime_type: String,
        /// The `charset` parameter of the part's Content-Type, if declared.
        charset: Option<String>,
        /// Base64 (or base64url) encoded payload. `None` for attachment stubs.
        data: Option<String>,
    },
    /// A `multipart/*` container.
    Multipart {
        mime_type: String,
        children: Vec<MimePart>,
    },
}

impl MimePart {
    /// Build a leaf with an encoded payload and no declared charset.
    pub fn leaf(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Leaf {
            mime_type: mime_type.into(),
            charset: None,
            data: Some(data.into()),
        }
    }

    /// Build a leaf that carries no payload (e.g. an attachment reference).
    pub fn empty_leaf(mime_type: impl Into<String>) -> Self {
        Self::Leaf {
            mime_type: mime_type.into(),
            charset: None,
            data: None,
        }
    }

    /// Build a container from its children.
    pub fn multipart(mime_type: impl Into<String>, children: Vec<MimePart>) -> Self {
        Self::Multipart {
            mime_type: mime_type.into(),
            children,
        }
    }

    /// Attach a charset to a leaf. Containers are returned unchanged.
    pub fn with_charset(mut self, label: impl Into<String>) -> Self {
        if let Self::Leaf { charset, .. } = &mut self {
            *charset = Some(label.into());
        }
        self
    }

    /// The part's MIME type as given by the provider.
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Leaf { mime_type, .. } | Self::Multipart { mime_type, .. } => mime_type,
        }
    }

    /// Whether the MIME type matches `expected`, ignoring ASCII case and any
    /// `;`-separated parameters.
    pub fn is_type(&self, expected: &str) -> bool {
        self.mime_type()
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .eq_ignore_ascii_case(expected)
    }

    /// Children of a container; empty for leaves.
    pub fn children(&self) -> &[MimePart] {
        match self {
            Self::Multipart { children, .. } => children.as_slice(),
            Self::Leaf { .. } => &[],
        }
    }

    /// Non-empty encoded payload of a leaf.
    pub fn body_data(&self) -> Option<&str> {
        match self {
            Self::Leaf { data: Some(d), .. } if !d.is_empty() => Some(d),
            _ => None,
        }
    }

    /// Declared charset of a leaf.
    pub fn charset(&self) -> Option<&str> {
        match self {
            Self::Leaf { charset, .. } => charset.as_deref(),
            Self::Multipart { .. } => None,
        }
    }

    /// Total number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(part) = stack.pop() {
            count += 1;
            stack.extend(part.children());
        }
        count
    }
}

/// Containers are torn down with an explicit stack so that very deep trees
/// cannot overflow the call stack when dropped.
impl Drop for MimePart {
    fn drop(&mut self) {
        let Self::Multipart { children, .. } = self else {
            return;
        };
        if children.iter().all(|c| c.children().is_empty()) {
            return;
        }

        let mut pending = std::mem::take(children);
        while let Some(mut part) = pending.pop() {
            if let Self::Multipart { children, .. } = &mut part {
                pending.append(children);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_type_ignores_case_and_params() {
        let part = MimePart::leaf("Text/Plain; charset=utf-8", "");
        assert!(part.is_type("text/plain"));
        assert!(!part.is_type("text/html"));
    }

    #[test]
    fn test_body_data_empty_is_none() {
        assert_eq!(MimePart::leaf("text/plain", "").body_data(), None);
        assert_eq!(MimePart::empty_leaf("text/plain").body_data(), None);
        assert_eq!(MimePart::leaf("text/plain", "SGk").body_data(), Some("SGk"));
    }

    #[test]
    fn test_with_charset_only_affects_leaves() {
        let leaf = MimePart::leaf("text/plain", "SGk").with_charset("iso-8859-1");
        assert_eq!(leaf.charset(), Some("iso-8859-1"));

        let container = MimePart::multipart("multipart/mixed", vec![]).with_charset("utf-8");
        assert_eq!(container.charset(), None);
    }

    #[test]
    fn test_node_count() {
        let tree = MimePart::multipart(
            "multipart/mixed",
            vec![
                MimePart::multipart(
                    "multipart/alternative",
                    vec![
                        MimePart::leaf("text/plain", "a"),
                        MimePart::leaf("text/html", "b"),
                    ],
                ),
                MimePart::empty_leaf("application/pdf"),
            ],
        );
        assert_eq!(tree.node_count(), 5);
        assert!(tree.children()[1].children().is_empty());
    }

    #[test]
    fn test_deep_tree_counts_and_drops() {
        let mut part = MimePart::leaf("text/plain", "SGk");
        for _ in 0..100_000 {
            part = MimePart::multipart("multipart/mixed", vec![part]);
        }
        assert_eq!(part.node_count(), 100_001);
        drop(part);
    }

    #[test]
    fn test_clone_of_nested_tree_survives_drop_of_original() {
        let tree = MimePart::multipart(
            "multipart/mixed",
            vec![MimePart::multipart(
                "multipart/alternative",
                vec![MimePart::leaf("text/plain", "a")],
            )],
        );
        let copy = tree.clone();
        drop(tree);
        assert_eq!(copy.node_count(), 3);
        assert_eq!(copy.children()[0].children()[0].body_data(), Some("a"));
    }
}
