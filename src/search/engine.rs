//! The recursive traversal at the heart of the crate.
//!
//! `search` walks the containment hierarchy depth-first — packages,
//! folders, graphs, nodes, functions, nested sub-graphs — applying the
//! match predicates and node-type filters at each level while a
//! [`TreeBuilder`] mirrors the walk. Entering a container opens a path
//! node; leaving it commits the branch if anything under it matched and
//! discards it otherwise, so the final tree holds exactly the matches and
//! their ancestors.
//!
//! Filter state travels down the recursion as a by-value
//! [`FilterContext`]; sibling branches never see each other's state. A
//! node that satisfies the graph filter narrows the context for descent
//! into its own content, an FX-Map that merely *contains* the filtered-for
//! kind is descended through without being reported, and nodes referencing
//! nested custom sub-graphs are descended into even when they fail the
//! filter themselves, since the target type may occur deeper.
//!
//! Each traversal is single-threaded and synchronous over a read-only
//! document; one engine instance serves exactly one `search` call.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::classify::{
    classify, has_system_content, is_io_node, system_content, Category, FunctionNodeKind,
    DEF_KEY_FUNCTION_INSTANCE,
};
use crate::config::SearchCriteria;
use crate::document::{
    Document, ElementId, ElementKind, ANNOTATION_IDENTIFIER, ANNOTATION_LABEL,
};
use crate::errors::SearchResult;
use crate::filters::{FilterContext, FilterMatch};
use crate::library::LibraryIndex;
use crate::results::{PathNode, SearchResults, TreeBuilder};
use crate::search::matcher::TextMatcher;

/// Runs a search over the document.
///
/// `root = None` searches every package; otherwise the search starts at
/// the given package, folder, graph or function. Each call walks the
/// document afresh and returns an independent result tree.
pub fn search<D: Document>(
    document: &D,
    library: &LibraryIndex,
    root: Option<ElementId>,
    criteria: &SearchCriteria,
) -> SearchResult<SearchResults> {
    info!(
        "starting search for {:?}, root {:?}",
        criteria.search_string, root
    );
    let engine = SearchEngine::new(document, library, criteria)?;
    let results = engine.run(root);
    info!(
        "search complete, {} match(es) encountered",
        results.found_count()
    );
    Ok(results)
}

/// One traversal over one document. Holds the normalized criteria, the
/// compiled matcher, the result tree under construction and the set of
/// graphs open on the current path (cycle guard).
pub struct SearchEngine<'a, D: Document> {
    document: &'a D,
    library: &'a LibraryIndex,
    criteria: SearchCriteria,
    matcher: TextMatcher,
    results: TreeBuilder,
    active: HashSet<ElementId>,
}

impl<'a, D: Document> SearchEngine<'a, D> {
    pub fn new(
        document: &'a D,
        library: &'a LibraryIndex,
        criteria: &SearchCriteria,
    ) -> SearchResult<Self> {
        let criteria = criteria.normalized();
        let matcher = TextMatcher::from_criteria(&criteria)?;
        Ok(Self {
            document,
            library,
            criteria,
            matcher,
            results: TreeBuilder::new(),
            active: HashSet::new(),
        })
    }

    /// Consumes the engine, producing the result tree.
    pub fn run(mut self, root: Option<ElementId>) -> SearchResults {
        let ctx = FilterContext::from_criteria(&self.criteria);
        match root {
            None => {
                // synthetic root covering every package
                self.results.enter(PathNode::synthetic(Category::Root, "Root"));
                let found = self.search_packages(ctx);
                self.results.leave(found);
            }
            Some(element) => {
                self.search_into(element, PathNode::for_element(element), ctx, true);
            }
        }
        self.results.finish()
    }

    /// Opens a path node for a container element, dispatches on its kind
    /// and commits or drops the branch on the way out.
    fn search_into(
        &mut self,
        element: ElementId,
        entry: PathNode,
        ctx: FilterContext,
        package_function: bool,
    ) -> bool {
        debug!("searching into {element:?}");
        self.results.enter(entry);
        let found = match self.document.element_kind(element) {
            ElementKind::Package => self.search_package(element, ctx),
            ElementKind::FunctionGraph => self.search_function(element, ctx, package_function),
            ElementKind::CompGraph => self.search_graph(element, ctx),
            ElementKind::Folder => self.search_folder(element, ctx),
            other => {
                warn!("nothing to search into, {element:?} ({other:?}) is not a container");
                false
            }
        };
        self.results.leave(found);
        found
    }

    fn search_packages(&mut self, ctx: FilterContext) -> bool {
        let packages = self.document.packages();
        debug!("searching {} package(s)", packages.len());
        let mut found = false;
        for package in packages {
            if self.search_into(package, PathNode::for_element(package), ctx, true) {
                found = true;
            }
        }
        found
    }

    fn search_package(&mut self, package: ElementId, ctx: FilterContext) -> bool {
        let mut found = false;
        for resource in self.document.children(package) {
            if self.document.element_kind(resource).is_container()
                && self.search_into(resource, PathNode::for_element(resource), ctx, true)
            {
                found = true;
            }
        }
        found
    }

    fn search_folder(&mut self, folder: ElementId, ctx: FilterContext) -> bool {
        let mut found = false;
        if !ctx.any() && self.criteria.folder_name {
            let identifier = self.document.identifier(folder);
            if self.matcher.matches(&identifier) {
                self.results.mark_current(identifier);
                found = true;
            }
        }
        for resource in self.document.children(folder) {
            if self.document.element_kind(resource).is_container()
                && self.search_into(resource, PathNode::for_element(resource), ctx, true)
            {
                found = true;
            }
        }
        found
    }

    /// Compositing-graph traversal. The current path node represents the
    /// graph itself (or the node that opened it).
    fn search_graph(&mut self, graph: ElementId, ctx: FilterContext) -> bool {
        if !self.active.insert(graph) {
            warn!("cyclic graph reference, not descending into {graph:?} again");
            return false;
        }
        let found = self.graph_contents(graph, ctx);
        self.active.remove(&graph);
        found
    }

    fn graph_contents(&mut self, graph: ElementId, ctx: FilterContext) -> bool {
        let mut found = false;

        if !ctx.any() && self.criteria.graph_name {
            let (identifier, label) = self.annotated_id_and_label(graph);
            if let Some(matched) = self.matching_id_or_label(&identifier, &label) {
                self.results.mark_current(matched);
                found = true;
            }
        }

        // comments attached to a node are deferred and searched with it
        let (unparented, parented) = self.partition_graph_objects(graph);
        if !ctx.any() && self.criteria.comment && self.search_graph_objects(&unparented) {
            found = true;
        }

        for node in self.document.nodes(graph) {
            if self.search_graph_node(node, ctx, &parented) {
                found = true;
            }
        }
        found
    }

    /// One node of a compositing graph: filtering, identifier matching,
    /// parameter functions, system content and custom sub-graph descent.
    fn search_graph_node(
        &mut self,
        node: ElementId,
        ctx: FilterContext,
        parented: &HashMap<ElementId, Vec<ElementId>>,
    ) -> bool {
        let (category, _) = classify(self.document, node);
        let reference = self.document.referenced_resource(node);
        let ref_kind = reference.map(|r| self.document.element_kind(r));
        let has_system = has_system_content(category);
        // a node opening an ordinary sub-graph stands for that graph in
        // the result path
        let plain_graph_ref = matches!(ref_kind, Some(ElementKind::CompGraph)) && !has_system;

        let (filter_eval, filter_label) = if ctx.graph {
            let filter = self
                .criteria
                .graph_node_filter
                .as_ref()
                .expect("graph filter flagged but missing");
            let ref_identifier = reference.map(|r| self.document.identifier(r));
            let reference_info = match (ref_kind, ref_identifier.as_deref()) {
                (Some(kind), Some(identifier)) => Some((kind, identifier)),
                _ => None,
            };
            (
                Some(filter.evaluate(category, reference_info)),
                filter.label().to_string(),
            )
        } else {
            (None, String::new())
        };

        // a failed filter still descends through nested custom sub-graphs
        if filter_eval == Some(FilterMatch::No) && !plain_graph_ref {
            return false;
        }

        let passes = matches!(filter_eval, None | Some(FilterMatch::Full));
        let child_ctx = match filter_eval {
            Some(FilterMatch::Full) | Some(FilterMatch::Partial) => ctx.narrowed(),
            _ => ctx,
        };

        let mut entry = PathNode::for_element(node);
        if plain_graph_ref {
            let target = reference.expect("plain graph reference");
            entry.subtype = Some(Category::Graph);
            entry.name = self.document.identifier(target);
            entry.referenced = Some(target);
        }
        self.results.enter(entry);
        let mut found = false;

        // with no search string and no pending function filter, the
        // filtered-for node is itself the result
        if filter_eval == Some(FilterMatch::Full)
            && self.criteria.search_string.is_empty()
            && !ctx.function
        {
            self.results.rename_current(filter_label);
            self.results.mark_current(String::new());
            found = true;
        }

        if passes && !ctx.function {
            if !self.criteria.search_string.is_empty() {
                let identifier = self.document.identifier(node);
                if identifier == self.criteria.search_string {
                    // node identifiers match by exact equality only
                    self.results.mark_current(identifier);
                    found = true;
                } else if is_io_node(category) {
                    if let Some(value) = self.document.annotation(node, ANNOTATION_IDENTIFIER) {
                        if self.matcher.matches(&value) {
                            self.results.mark_current(value);
                            found = true;
                        }
                    }
                }
            }
            if let Some(objects) = parented.get(&node) {
                if self.search_parented_objects(node, objects) {
                    found = true;
                }
            }
        }

        if passes && (self.criteria.graph_param_func || self.criteria.param_functions_only) {
            if self.search_param_functions(node, ctx) {
                found = true;
            }
        }

        if has_system
            && filter_eval
                .map(FilterMatch::allows_descent)
                .unwrap_or(true)
        {
            if let (Some(inner), Some((content_category, content_name))) =
                (reference, system_content(category))
            {
                let mut entry = PathNode::for_element(inner);
                entry.subtype = Some(content_category);
                entry.name = content_name.to_string();
                if self.search_into(inner, entry, child_ctx, false) {
                    found = true;
                }
            }
        } else if plain_graph_ref && self.criteria.enter_custom_sub_graphs {
            let target = reference.expect("plain graph reference");
            let annotated = self.document.annotation(target, ANNOTATION_IDENTIFIER);
            // built-in library graphs are not searched through
            let in_library = annotated
                .map(|identifier| self.library.contains(&identifier))
                .unwrap_or(false);
            if !in_library && self.search_graph(target, child_ctx) {
                found = true;
            }
        }

        self.results.leave(found);
        found
    }

    /// Functions driving this node's input properties. In the special
    /// param-functions-only mode each one is itself a result; otherwise
    /// they are searched like any function graph, keeping the incoming
    /// filter context.
    fn search_param_functions(&mut self, node: ElementId, ctx: FilterContext) -> bool {
        let mut found = false;
        for property in self.document.input_properties(node) {
            let Some(function) = property.function_graph else {
                continue;
            };
            if property.function_only {
                // reached through the system-content path instead
                continue;
            }
            if self.criteria.param_functions_only {
                let mut leaf = PathNode::for_element(function);
                leaf.context_element = Some(node);
                leaf.subtype = Some(Category::ParamFunction);
                leaf.name = property.label.clone();
                leaf.found_match = Some(String::new());
                self.results.append_found(leaf);
                found = true;
            } else {
                let mut entry = PathNode::for_element(function);
                entry.context_element = Some(node);
                entry.subtype = Some(Category::ParamFunction);
                entry.name = property.label.clone();
                if self.search_into(function, entry, ctx, false) {
                    found = true;
                }
            }
        }
        found
    }

    /// Function-graph traversal.
    fn search_function(
        &mut self,
        function: ElementId,
        ctx: FilterContext,
        package_function: bool,
    ) -> bool {
        // package functions are not reachable through a graph-node filter
        if package_function && ctx.graph {
            debug!("skipping package function {function:?} under a graph node filter");
            return false;
        }
        if !self.active.insert(function) {
            warn!("cyclic function reference, not descending into {function:?} again");
            return false;
        }
        let found = self.function_contents(function, ctx);
        self.active.remove(&function);
        found
    }

    fn function_contents(&mut self, function: ElementId, ctx: FilterContext) -> bool {
        let mut found = false;

        if !ctx.function {
            if self.criteria.func_name {
                let (identifier, label) = self.annotated_id_and_label(function);
                if let Some(matched) = self.matching_id_or_label(&identifier, &label) {
                    self.results.mark_current(matched);
                    found = true;
                }
            }
            if self.criteria.func_input && self.search_function_inputs(function) {
                found = true;
            }
        }

        let (unparented, parented) = self.partition_graph_objects(function);
        if !ctx.any() && self.criteria.comment && self.search_graph_objects(&unparented) {
            found = true;
        }

        let (filter_key, filter_label) = if ctx.function {
            let filter = self
                .criteria
                .function_node_filter
                .as_ref()
                .expect("function filter flagged but missing");
            (
                filter.definition_key().map(str::to_string),
                filter.label().to_string(),
            )
        } else {
            (None, String::new())
        };
        let type_only = ctx.function && self.criteria.search_string.is_empty();

        for node in self.document.nodes(function) {
            let definition_key = self.document.definition_key(node);
            let passes = if ctx.function {
                // function filters carry a definition key; a library
                // filter here matches nothing
                filter_key.as_deref() == Some(definition_key.as_str())
            } else {
                true
            };

            if type_only && passes {
                let mut leaf = PathNode::for_element(node);
                leaf.name = filter_label.clone();
                leaf.found_match = Some(String::new());
                self.results.append_found(leaf);
                found = true;
            }

            if passes && !self.criteria.search_string.is_empty() {
                let identifier = self.document.identifier(node);
                if identifier == self.criteria.search_string {
                    let mut leaf = PathNode::for_element(node);
                    leaf.found_match = Some(identifier);
                    self.results.append_found(leaf);
                    found = true;
                }
            }

            if passes {
                if let Some(objects) = parented.get(&node) {
                    if self.search_parented_objects(node, objects) {
                        found = true;
                    }
                }
                let (category, _) = classify(self.document, node);
                let getter = category == Category::FunctionNode(FunctionNodeKind::Get);
                let setter = category == Category::FunctionNode(FunctionNodeKind::Set);
                if ((getter && self.criteria.var_getter) || (setter && self.criteria.var_setter))
                    && self.match_first_string_input(node)
                {
                    found = true;
                }
            }

            if definition_key == DEF_KEY_FUNCTION_INSTANCE {
                if self.search_function_call(node, ctx, passes) {
                    found = true;
                }
            }
        }
        found
    }

    /// Declared inputs of a function graph, grouped under a synthetic
    /// "Function inputs" node.
    fn search_function_inputs(&mut self, function: ElementId) -> bool {
        let inputs = self.document.input_properties(function);
        if inputs.is_empty() {
            return false;
        }
        self.results
            .enter(PathNode::synthetic(Category::FunctionInputs, "Function inputs"));
        let mut found = false;
        for input in &inputs {
            if let Some(matched) = self.matching_id_or_label(&input.id, &input.label) {
                let mut leaf = PathNode::synthetic(Category::FunctionInput, input.id.clone());
                leaf.found_match = Some(matched);
                self.results.append_found(leaf);
                found = true;
            }
        }
        self.results.leave(found);
        found
    }

    /// A function-instance node: either enter the called package function
    /// or record the call itself when its name matches.
    fn search_function_call(
        &mut self,
        node: ElementId,
        ctx: FilterContext,
        passes: bool,
    ) -> bool {
        let Some(target) = self.document.referenced_resource(node) else {
            return false;
        };
        if self.criteria.enter_package_functions {
            let mut entry = PathNode::for_element(node);
            entry.subtype = Some(Category::Function);
            entry.name = self.document.identifier(target);
            entry.referenced = Some(target);
            self.results.enter(entry);
            let found = self.search_function(target, ctx, false);
            self.results.leave(found);
            found
        } else if passes && self.criteria.func_name {
            let target_identifier = self.document.identifier(target);
            if self.matcher.matches(&target_identifier) {
                let mut leaf = PathNode::for_element(node);
                leaf.subtype = Some(Category::FunctionCall);
                leaf.context_label = Some("Function call".to_string());
                leaf.found_match = Some(target_identifier);
                self.results.append_found(leaf);
                true
            } else {
                false
            }
        } else {
            false
        }
    }

    /// Splits a graph's comments/frames/pins into the freestanding ones
    /// and those attached to a node, keyed by owner. Empty when comment
    /// matching is off.
    fn partition_graph_objects(
        &self,
        graph: ElementId,
    ) -> (Vec<ElementId>, HashMap<ElementId, Vec<ElementId>>) {
        let mut unparented = Vec::new();
        let mut parented: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
        if self.criteria.comment {
            for object in self.document.graph_objects(graph) {
                match self.document.owning_node(object) {
                    Some(owner) => parented.entry(owner).or_default().push(object),
                    None => unparented.push(object),
                }
            }
        }
        (unparented, parented)
    }

    fn search_graph_objects(&mut self, objects: &[ElementId]) -> bool {
        let mut found = false;
        for &object in objects {
            if self.search_graph_object(object, None) {
                found = true;
            }
        }
        found
    }

    fn search_parented_objects(&mut self, owner: ElementId, objects: &[ElementId]) -> bool {
        let mut found = false;
        for &object in objects {
            if self.search_graph_object(object, Some(owner)) {
                found = true;
            }
        }
        found
    }

    /// One comment, frame or pin. Frames can match on their title and
    /// their description independently; title retrieval failures degrade
    /// to an empty title.
    fn search_graph_object(&mut self, object: ElementId, owner: Option<ElementId>) -> bool {
        let mut found = false;
        let kind = self.document.element_kind(object);
        let mut title = String::new();
        if kind == ElementKind::Frame {
            title = match self.document.frame_title(object) {
                Ok(title) => title,
                Err(err) => {
                    warn!("error retrieving frame title: {err}");
                    String::new()
                }
            };
            if !title.is_empty() && self.matcher.matches(&title) {
                let mut leaf = PathNode::for_element(object);
                leaf.name = title.clone();
                leaf.found_match = Some(title.clone());
                self.results.append_found(leaf);
                found = true;
            }
        }
        let description = self.document.description(object);
        if self.matcher.matches(&description) {
            let mut leaf = PathNode::for_element(object);
            if kind == ElementKind::Frame {
                leaf.name = title;
            }
            if kind == ElementKind::Comment {
                leaf.context_element = owner;
            }
            leaf.found_match = Some(description);
            self.results.append_found(leaf);
            found = true;
        }
        found
    }

    /// Variable getter/setter matching: the variable name is the node's
    /// first string-typed input value, not its identifier.
    fn match_first_string_input(&mut self, node: ElementId) -> bool {
        for property in self.document.input_properties(node) {
            if let Some(value) = property.string_value {
                if self.matcher.matches(&value) {
                    let mut leaf = PathNode::for_element(node);
                    leaf.found_match = Some(value);
                    self.results.append_found(leaf);
                    return true;
                }
                return false;
            }
        }
        false
    }

    fn annotated_id_and_label(&self, element: ElementId) -> (String, String) {
        let identifier = self
            .document
            .annotation(element, ANNOTATION_IDENTIFIER)
            .unwrap_or_default();
        let label = self
            .document
            .annotation(element, ANNOTATION_LABEL)
            .unwrap_or_default();
        (identifier, label)
    }

    /// The identifier wins over the label when both match.
    fn matching_id_or_label(&self, identifier: &str, label: &str) -> Option<String> {
        if self.matcher.matches(identifier) {
            Some(identifier.to_string())
        } else if self.matcher.matches(label) {
            Some(label.to_string())
        } else {
            None
        }
    }
}
