use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A catalog item that can be placed into collections.
pub struct Product {
    /// Stable identifier (stringified remote id).
    pub id: String,
    /// Display title; the only text the vectorizer sees.
    pub title: String,
}

impl Product {
    /// Creates a product record.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How a collection's membership is maintained.
pub enum CollectionKind {
    /// Manually curated; accepts explicit membership writes.
    Custom,
    /// Rule-evaluated by the catalog service; never a suggestion target.
    Smart,
}

impl CollectionKind {
    /// Returns `true` for collections that accept manual assignment.
    pub fn accepts_manual_assignment(self) -> bool {
        matches!(self, CollectionKind::Custom)
    }

    /// Returns the wire name (`"custom"` / `"smart"`).
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Custom => "custom",
            CollectionKind::Smart => "smart",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A grouping of products.
pub struct Collection {
    /// Stable identifier (stringified remote id).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Membership model.
    pub kind: CollectionKind,
}

impl Collection {
    /// Creates a custom (manually curated) collection.
    pub fn custom(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: CollectionKind::Custom,
        }
    }

    /// Creates a smart (rule-driven) collection.
    pub fn smart(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: CollectionKind::Smart,
        }
    }

    /// Returns `true` if this collection can be a suggestion target.
    pub fn is_eligible(&self) -> bool {
        self.kind.accepts_manual_assignment()
    }
}
