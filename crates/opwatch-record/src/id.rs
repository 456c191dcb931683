//! Origin identifiers for nodes in the monitoring tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application-wide identifier of a node in the monitoring tree.
///
/// An origin names a node uniquely within the whole application, not just
/// among its siblings: the session and application name scope the process,
/// and `path` holds the chain of node names from the tree root down to the
/// node itself. Records carry their origin so downstream consumers can
/// attribute a measurement without any out-of-band context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginId {
    /// Session the application runs in (e.g. a deployment partition).
    pub session: String,
    /// Application/process name within the session.
    pub application: String,
    /// Node names from the root node down, root first.
    pub path: Vec<String>,
}

impl OriginId {
    /// Create a root origin for an application (empty path).
    pub fn new(session: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            application: application.into(),
            path: Vec::new(),
        }
    }

    /// Return this origin extended with a child node name.
    ///
    /// Empty names are ignored — an unregistered node contributes no path
    /// segment, so its effective origin is its parent's.
    pub fn child(&self, name: &str) -> Self {
        let mut id = self.clone();
        if !name.is_empty() {
            id.path.push(name.to_string());
        }
        id
    }

    /// True if every component is empty (the unset origin).
    pub fn is_unset(&self) -> bool {
        self.session.is_empty() && self.application.is_empty() && self.path.is_empty()
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in [self.session.as_str(), self.application.as_str()]
            .into_iter()
            .chain(self.path.iter().map(String::as_str))
        {
            if part.is_empty() {
                continue;
            }
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_nonempty_segments() {
        let root = OriginId::new("daq", "reader");
        assert_eq!(root.to_string(), "daq.reader");

        let node = root.child("links").child("link0");
        assert_eq!(node.to_string(), "daq.reader.links.link0");
    }

    #[test]
    fn child_ignores_empty_name() {
        let root = OriginId::new("daq", "reader");
        assert_eq!(root.child(""), root);
    }

    #[test]
    fn default_is_unset() {
        assert!(OriginId::default().is_unset());
        assert!(!OriginId::new("s", "a").is_unset());
        assert_eq!(OriginId::default().to_string(), "");
    }
}
