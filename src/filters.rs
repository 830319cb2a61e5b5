//! Node-type filters: restricting a search to one category of built-in
//! node or one specific library graph.
//!
//! A system filter names a built-in node definition and matches by
//! classified category. Two escalation rules cover the FX-Map family,
//! whose container node owns system sub-content: filtering for the
//! container accepts any of its internal node kinds directly, while
//! filtering for an internal kind reports the container as a *partial*
//! match — not a result itself, but a node that must be descended into.
//!
//! A library filter names a reusable graph asset and matches nodes whose
//! referenced resource is a graph with exactly that identifier.

use crate::classify::{node_type_for_key, Category, CompNodeKind};
use crate::config::SearchCriteria;
use crate::document::ElementKind;
use crate::library::LibraryIndex;

/// Outcome of testing a node against a [`NodeTypeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMatch {
    /// The node is not the filtered-for type.
    No,
    /// The node is not a result, but its content can contain the
    /// filtered-for type and must be searched.
    Partial,
    /// The node is the filtered-for type.
    Full,
}

impl FilterMatch {
    /// Whether the node itself qualifies as filtered-for.
    pub fn passes(self) -> bool {
        matches!(self, Self::Full)
    }

    /// Whether the node's content may still be searched.
    pub fn allows_descent(self) -> bool {
        !matches!(self, Self::No)
    }
}

/// Restriction of a search to one node type.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTypeFilter {
    /// A built-in node definition, matched by classified category.
    System {
        label: String,
        definition_key: String,
        category: Category,
    },
    /// A library graph asset, matched by referenced-resource identifier.
    Library { label: String, identifier: String },
}

impl NodeTypeFilter {
    /// Builds a system filter from a node definition key, consulting the
    /// classification tables. Unknown keys have no category to filter on.
    pub fn from_definition_key(key: &str) -> Option<Self> {
        node_type_for_key(key).map(|(category, label)| Self::System {
            label: label.to_string(),
            definition_key: key.to_string(),
            category,
        })
    }

    /// Builds a library filter for an identifier known to the index.
    pub fn from_library_index(index: &LibraryIndex, identifier: &str) -> Option<Self> {
        index.entry(identifier).map(|entry| Self::Library {
            label: entry.label.clone(),
            identifier: identifier.to_string(),
        })
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }

    pub fn label(&self) -> &str {
        match self {
            Self::System { label, .. } | Self::Library { label, .. } => label,
        }
    }

    /// Definition key of a system filter; library filters have none.
    pub fn definition_key(&self) -> Option<&str> {
        match self {
            Self::System { definition_key, .. } => Some(definition_key),
            Self::Library { .. } => None,
        }
    }

    /// Tests a node's classified category and referenced resource (kind
    /// plus identifier) against this filter.
    pub fn evaluate(
        &self,
        candidate: Category,
        reference: Option<(ElementKind, &str)>,
    ) -> FilterMatch {
        match self {
            Self::System { category, .. } => {
                if candidate == *category {
                    FilterMatch::Full
                } else if *category == Category::CompNode(CompNodeKind::FxMap)
                    && matches!(candidate, Category::FxMapNode(_))
                {
                    // an internal FX-Map node already satisfies a filter on
                    // the container
                    FilterMatch::Full
                } else if matches!(*category, Category::FxMapNode(_))
                    && candidate == Category::CompNode(CompNodeKind::FxMap)
                {
                    FilterMatch::Partial
                } else {
                    FilterMatch::No
                }
            }
            Self::Library { identifier, .. } => match reference {
                Some((kind, reference_id)) if kind.is_graph() && reference_id == identifier => {
                    FilterMatch::Full
                }
                _ => FilterMatch::No,
            },
        }
    }
}

/// Which node-type filters are active at the current point of the
/// traversal. Passed by value down recursive calls; sibling branches never
/// observe each other's state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterContext {
    pub graph: bool,
    pub function: bool,
}

impl FilterContext {
    pub fn from_criteria(criteria: &SearchCriteria) -> Self {
        Self {
            graph: criteria.graph_node_filter.is_some(),
            function: criteria.function_node_filter.is_some(),
        }
    }

    /// Context for descent into the content of a node that satisfied the
    /// graph filter: the graph filter keeps propagating, the function
    /// filter no longer applies.
    pub fn narrowed(self) -> Self {
        Self {
            graph: self.graph,
            function: false,
        }
    }

    pub fn any(self) -> bool {
        self.graph || self.function
    }
}
