//! Search results: a pruned tree of containment paths.
//!
//! A search does not return flat matches. It returns a tree of
//! [`PathNode`]s mirroring the traversal, containing only the nodes that
//! are matches themselves or ancestors of matches. A node's `found_match`
//! distinguishes three states: `None` (not a match, kept as an ancestor),
//! `Some("")` (matched by type only) and `Some(text)` (matched on `text`).
//!
//! The tree is assembled by a [`TreeBuilder`] owned by a single search
//! call. The builder keeps the traversal cursor as an explicit stack of
//! open path nodes: entering a container pushes a node, leaving it pops
//! and either attaches the node to its parent or discards the whole
//! branch. Ownership therefore flows one way — every node has exactly one
//! parent, fixed at the moment its branch is committed — and no shared or
//! global cursor state exists.
//!
//! The found counter is monotonic: it counts matches encountered during
//! the traversal and is never decremented, so it can exceed the number of
//! matches remaining in the final tree.

use serde_json::{json, Value};
use tracing::debug;

use crate::classify::{classify, display_name, type_label, Category};
use crate::document::{Document, ElementId};

/// One step of the traversal path.
#[derive(Debug, Clone, Default)]
pub struct PathNode {
    /// Source document element; `None` for synthetic nodes (the multi-
    /// package root, function-input groupings).
    pub element: Option<ElementId>,
    /// Node providing location context when the element cannot (e.g. the
    /// node owning a parameter function or an attached comment).
    pub context_element: Option<ElementId>,
    /// Context described by a plain string (e.g. "Function call").
    pub context_label: Option<String>,
    /// Graph or function this step opens, when the element is a node
    /// instantiating one.
    pub referenced: Option<ElementId>,
    /// Category override for elements ambiguous on their own (e.g. the
    /// inner graph of an FX-Map).
    pub subtype: Option<Category>,
    /// Display-name override; empty means "derive from the element".
    pub name: String,
    /// Matched text. `Some("")` records a type-only match and is distinct
    /// from `None`.
    pub found_match: Option<String>,
    /// Children in traversal order.
    pub children: Vec<PathNode>,
}

impl PathNode {
    pub fn for_element(element: ElementId) -> Self {
        Self {
            element: Some(element),
            ..Self::default()
        }
    }

    pub fn synthetic(subtype: Category, name: impl Into<String>) -> Self {
        Self {
            subtype: Some(subtype),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_match(&self) -> bool {
        self.found_match.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Category and display type label, preferring the subtype override.
    pub fn resolved_category<D: Document>(&self, doc: &D) -> (Option<Category>, String) {
        if let Some(subtype) = self.subtype {
            (Some(subtype), type_label(subtype).to_string())
        } else if let Some(element) = self.element {
            let (category, label) = classify(doc, element);
            (Some(category), label)
        } else {
            (None, String::new())
        }
    }

    /// Display name, preferring the explicit override.
    pub fn resolved_name<D: Document>(&self, doc: &D) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        match self.element {
            Some(element) => {
                let (category, _) = self.resolved_category(doc);
                match category {
                    Some(category) => display_name(doc, element, category),
                    None => String::new(),
                }
            }
            None => String::new(),
        }
    }

    fn to_json<D: Document>(&self, doc: &D) -> Value {
        let (_, type_label) = self.resolved_category(doc);
        let mut object = serde_json::Map::new();
        object.insert("type".to_string(), json!(type_label));
        object.insert("name".to_string(), json!(self.resolved_name(doc)));
        if let Some(found) = &self.found_match {
            object.insert("foundMatch".to_string(), json!(found));
        }
        if !self.children.is_empty() {
            let children: Vec<Value> = self.children.iter().map(|c| c.to_json(doc)).collect();
            object.insert("children".to_string(), Value::Array(children));
        }
        Value::Object(object)
    }

    fn log_tree<D: Document>(&self, doc: &D, depth: usize) {
        let (_, type_label) = self.resolved_category(doc);
        debug!(
            "{}Type: {} - Name: {} - Match: {}",
            "    ".repeat(depth),
            type_label,
            self.resolved_name(doc),
            self.found_match.as_deref().unwrap_or("")
        );
        for child in &self.children {
            child.log_tree(doc, depth + 1);
        }
    }
}

/// Final result of one search.
#[derive(Debug, Default)]
pub struct SearchResults {
    root: Option<PathNode>,
    found_count: usize,
}

impl SearchResults {
    pub fn has_results(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&PathNode> {
        self.root.as_ref()
    }

    /// Number of matches encountered during the traversal. Monotonic; at
    /// least the number of matches in the final tree.
    pub fn found_count(&self) -> usize {
        self.found_count
    }

    pub fn leaf_count(&self) -> usize {
        fn count(node: &PathNode) -> usize {
            if node.is_leaf() {
                1
            } else {
                node.children.iter().map(count).sum()
            }
        }
        self.root.as_ref().map(count).unwrap_or(0)
    }

    /// Serializes the tree to its comparison-friendly JSON form:
    /// `{type, name, foundMatch?, children?}` per node, `null` when the
    /// search found nothing.
    pub fn to_json<D: Document>(&self, doc: &D) -> Value {
        match &self.root {
            Some(root) => root.to_json(doc),
            None => Value::Null,
        }
    }

    /// Dumps the tree to the debug log, one indented line per node.
    pub fn log<D: Document>(&self, doc: &D) {
        if let Some(root) = &self.root {
            root.log_tree(doc, 0);
        }
    }
}

/// Mutable tree assembly state of one traversal. One instance per search
/// call; the open-container stack is the traversal cursor.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    stack: Vec<PathNode>,
    root: Option<PathNode>,
    found_count: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a container: the node becomes the cursor and the append
    /// target for children and found leaves.
    pub fn enter(&mut self, node: PathNode) {
        self.stack.push(node);
    }

    /// Closes the innermost container. With `keep`, the node is attached
    /// to its parent (or becomes the tree root); without, the node and
    /// everything under it are discarded.
    pub fn leave(&mut self, keep: bool) {
        let node = self
            .stack
            .pop()
            .expect("leave called with no open path node");
        if !keep {
            return;
        }
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                debug_assert!(self.root.is_none(), "second root committed");
                self.root = Some(node);
            }
        }
    }

    /// Appends a found leaf under the cursor without moving it.
    pub fn append_found(&mut self, node: PathNode) {
        debug_assert!(node.is_match(), "append_found takes a matched node");
        self.found_count += 1;
        self.stack
            .last_mut()
            .expect("append_found with no open path node")
            .children
            .push(node);
    }

    /// Records a match on the cursor node itself (a container matched on
    /// its own name or type). A later mark overwrites an earlier one; the
    /// counter still registers both encounters.
    pub fn mark_current(&mut self, found_match: String) {
        self.stack
            .last_mut()
            .expect("mark_current with no open path node")
            .found_match = Some(found_match);
        self.found_count += 1;
    }

    /// Display-name override on the cursor node.
    pub fn rename_current(&mut self, name: String) {
        self.stack
            .last_mut()
            .expect("rename_current with no open path node")
            .name = name;
    }

    pub fn finish(self) -> SearchResults {
        debug_assert!(self.stack.is_empty(), "unbalanced enter/leave");
        SearchResults {
            root: self.root,
            found_count: self.found_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::memory::MemoryDocument;

    #[test]
    fn test_branch_commit_and_drop() {
        let mut builder = TreeBuilder::new();
        builder.enter(PathNode::synthetic(Category::Root, "Root"));

        // a branch that finds something
        builder.enter(PathNode::synthetic(Category::Graph, "kept"));
        let mut leaf = PathNode::synthetic(Category::Comment, "note");
        leaf.found_match = Some("note".to_string());
        builder.append_found(leaf);
        builder.leave(true);

        // a branch that does not
        builder.enter(PathNode::synthetic(Category::Graph, "dropped"));
        builder.leave(false);

        builder.leave(true);
        let results = builder.finish();

        let root = results.root().unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "kept");
        assert_eq!(root.children[0].children.len(), 1);
        assert_eq!(results.found_count(), 1);
        assert_eq!(results.leaf_count(), 1);
    }

    #[test]
    fn test_dropping_root_clears_tree() {
        let mut builder = TreeBuilder::new();
        builder.enter(PathNode::synthetic(Category::Root, "Root"));
        builder.leave(false);
        let results = builder.finish();
        assert!(!results.has_results());
        assert_eq!(results.leaf_count(), 0);
    }

    #[test]
    fn test_found_count_survives_pruning() {
        let mut builder = TreeBuilder::new();
        builder.enter(PathNode::synthetic(Category::Root, "Root"));
        builder.enter(PathNode::synthetic(Category::Graph, "g"));
        let mut leaf = PathNode::synthetic(Category::Comment, "c");
        leaf.found_match = Some(String::new());
        builder.append_found(leaf);
        // counted, then discarded with its branch
        builder.leave(false);
        builder.leave(false);
        let results = builder.finish();

        assert!(!results.has_results());
        assert_eq!(results.found_count(), 1);
    }

    #[test]
    fn test_mark_current() {
        let mut builder = TreeBuilder::new();
        builder.enter(PathNode::synthetic(Category::Folder, "utils"));
        builder.mark_current("utils".to_string());
        builder.leave(true);
        let results = builder.finish();

        let root = results.root().unwrap();
        assert_eq!(root.found_match.as_deref(), Some("utils"));
        assert_eq!(results.found_count(), 1);
    }

    #[test]
    #[should_panic(expected = "leave called with no open path node")]
    fn test_leave_without_enter_panics() {
        let mut builder = TreeBuilder::new();
        builder.leave(true);
    }

    #[test]
    fn test_json_shape() {
        let mut doc = MemoryDocument::new();
        let pkg = doc.add_package("p.sbs");
        let graph = doc.add_graph(Some(pkg), "g");
        let comment = doc.add_comment(graph, "TODO: fix this", None);

        let mut builder = TreeBuilder::new();
        builder.enter(PathNode::for_element(pkg));
        builder.enter(PathNode::for_element(graph));
        let mut leaf = PathNode::for_element(comment);
        leaf.found_match = Some("TODO: fix this".to_string());
        builder.append_found(leaf);
        builder.leave(true);
        builder.leave(true);
        let results = builder.finish();

        assert_eq!(
            results.to_json(&doc),
            serde_json::json!({
                "type": "package",
                "name": "p",
                "children": [{
                    "type": "graph",
                    "name": "g",
                    "children": [{
                        "type": "comment",
                        "name": "TODO: fix this",
                        "foundMatch": "TODO: fix this"
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_empty_tree_serializes_to_null() {
        let doc = MemoryDocument::new();
        let results = SearchResults::default();
        assert_eq!(results.to_json(&doc), Value::Null);
    }

    #[test]
    fn test_type_only_match_distinct_from_absent() {
        let typed = PathNode {
            found_match: Some(String::new()),
            ..PathNode::default()
        };
        let absent = PathNode::default();
        assert!(typed.is_match());
        assert!(!absent.is_match());
    }
}
