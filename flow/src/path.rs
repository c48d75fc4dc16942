//! NodePath - Structural Address of a Tree Node
//!
//! Paths are JSON-pointer style: the root is the empty path, children are
//! `/`-joined segments (`/todos/0`). Segments containing `~` or `/` are
//! escaped as `~0` and `~1` so every path string maps back to one node.

use std::fmt;

/// Stable structural location of a node inside the host tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// The root node's path, rendered as `""`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a rendered path such as `/root/list`.
    ///
    /// Only `""` is root. Every `/` opens a segment, so `"/"` is the child
    /// with an empty name, the inverse of rendering `root().child("")`.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::root();
        }
        let body = raw.strip_prefix('/').unwrap_or(raw);
        let segments = body.split('/').map(unescape).collect();
        Self { segments }
    }

    /// Path of the child named `segment`.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

impl From<&str> for NodePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Build the registry identifier of `action` running on the node at `path`.
///
/// Consumers querying a specific action must rebuild ids with this function.
pub fn effect_id(path: &NodePath, action: &str) -> String {
    format!("{path}.{action}")
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
