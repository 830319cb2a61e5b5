//! Shared fixture for the integration suites: two packages assembled the
//! way a real authoring document is laid out — graphs, folders, package
//! functions, an FX-Map with a parameter function, a Pixel Processor,
//! custom and library sub-graph instances, getters/setters and attached
//! comments.

#![allow(dead_code)]

use graphsearch::document::memory::MemoryDocument;
use graphsearch::{
    ElementId, InputProperty, LibraryEntry, LibraryIndex, PathNode, SearchCriteria, SearchResults,
};

pub struct Fixture {
    pub doc: MemoryDocument,
    pub library: LibraryIndex,
    pub pkg1: ElementId,
    pub pkg2: ElementId,
    pub graph1: ElementId,
    pub blend: ElementId,
    pub blend_param: ElementId,
    pub blend_param_fct: ElementId,
    pub fxmap_node: ElementId,
    pub fxmap_inner: ElementId,
    pub quadrant: ElementId,
    pub quad_fct: ElementId,
    pub pixproc: ElementId,
    pub pixproc_fct: ElementId,
    pub instance: ElementId,
    pub subgraph: ElementId,
    pub deep_blend: ElementId,
    pub lib_instance: ElementId,
    pub lib_graph: ElementId,
    pub input_node: ElementId,
    pub output_node: ElementId,
    pub folder: ElementId,
    pub util_folder: ElementId,
    pub test_return: ElementId,
    pub getter: ElementId,
    pub setter: ElementId,
    pub sub_node: ElementId,
    pub const_node: ElementId,
    pub root_function: ElementId,
}

pub fn string_input(value: &str) -> InputProperty {
    InputProperty {
        id: "variable".to_string(),
        label: "Variable".to_string(),
        string_value: Some(value.to_string()),
        ..Default::default()
    }
}

pub fn function_input(id: &str, label: &str, function: ElementId) -> InputProperty {
    InputProperty {
        id: id.to_string(),
        label: label.to_string(),
        function_graph: Some(function),
        ..Default::default()
    }
}

pub fn fixture() -> Fixture {
    // RUST_LOG=debug dumps the traversal when a test needs inspecting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut doc = MemoryDocument::new();

    // package 1: the main graph
    let pkg1 = doc.add_package("tests/gs_demo_pkg1.sbs");
    let graph1 = doc.add_graph(Some(pkg1), "test_graph_1");
    doc.set_annotation(graph1, "label", "My test graph 1");

    let blend = doc.add_comp_node(graph1, "sbs::compositing::blend", "1534176499");
    doc.add_comment(graph1, "blend needs a test pass", Some(blend));
    doc.add_comment(graph1, "this is a floating comment", None);
    doc.add_frame(graph1, "Region A", "frame description here");
    doc.add_pin(graph1, "pin note here");

    // FX-Map whose Quadrant size is driven by a function
    let fxmap_inner = doc.add_graph(None, "fxm_inner");
    let fxmap_node = doc.add_comp_node(graph1, "sbs::compositing::fxmaps", "fxm_node");
    doc.set_reference(fxmap_node, fxmap_inner);
    let quadrant = doc.add_comp_node(fxmap_inner, "sbs::fxmap::paramset", "quad_1");
    let quad_fct = doc.add_function(None, "fxm_size_fct");
    let quad_get = doc.add_function_node(quad_fct, "sbs::function::get_float1", "gfx1");
    doc.add_input_property(quad_get, string_input("my_fmx_var"));
    doc.add_input_property(quadrant, function_input("size", "Size", quad_fct));

    // Pixel Processor: the per-pixel function is function-only and is
    // reached through system content
    let pixproc_fct = doc.add_function(None, "pixproc_fct");
    let pp_get = doc.add_function_node(pixproc_fct, "sbs::function::get_float2", "ppg1");
    doc.add_input_property(pp_get, string_input("$pos"));
    let pixproc = doc.add_comp_node(graph1, "sbs::compositing::pixelprocessor", "pixproc_node");
    doc.set_reference(pixproc, pixproc_fct);
    let mut perpixel = function_input("perpixel", "Per Pixel", pixproc_fct);
    perpixel.function_only = true;
    doc.add_input_property(pixproc, perpixel);

    // custom sub-graph behind an instance node
    let subgraph = doc.add_graph(None, "test_subgraph_1");
    let deep_blend = doc.add_comp_node(subgraph, "sbs::compositing::blend", "deep_blend_uid");
    doc.add_comment(subgraph, "deep test blend note", Some(deep_blend));
    doc.add_comment(subgraph, "here marker deep", None);
    let instance = doc.add_comp_node(graph1, "sbs::compositing::sbscompgraph_instance", "inst_1");
    doc.set_reference(instance, subgraph);

    // library asset behind an instance node; indexed, so never descended
    let lib_graph = doc.add_graph(None, "blur_hq_grayscale");
    doc.set_annotation(lib_graph, "label", "Blur HQ Grayscale");
    doc.add_comment(lib_graph, "library internal test content", None);
    let lib_instance =
        doc.add_comp_node(graph1, "sbs::compositing::sbscompgraph_instance", "lib_inst");
    doc.set_reference(lib_instance, lib_graph);
    doc.add_comment(graph1, "blur test usage note", Some(lib_instance));
    let mut library = LibraryIndex::default();
    library.insert(
        "blur_hq_grayscale",
        LibraryEntry {
            label: "Blur HQ Grayscale".to_string(),
            archive_path: "sbs://blur_hq.sbs".to_string(),
        },
    );

    // Input/Output nodes carry user-facing identifiers as annotations
    let input_node = doc.add_comp_node(graph1, "sbs::compositing::input_grayscale", "in_uid_1");
    doc.set_annotation(input_node, "identifier", "dirt_mask");
    let output_node = doc.add_comp_node(graph1, "sbs::compositing::output", "out_uid_1");
    doc.set_annotation(output_node, "identifier", "normal_out");

    // blend whose opacity is driven by a function calling a package
    // function
    let blend_param_fct = doc.add_function(None, "opacity_driver");
    doc.add_function_node(blend_param_fct, "sbs::function::const_float1", "cf_bp");
    doc.add_function_node(blend_param_fct, "sbs::function::sub", "sub_bp");
    let bp_call = doc.add_function_node(blend_param_fct, "sbs::function::instance", "call_bp");
    let blend_param = doc.add_comp_node(graph1, "sbs::compositing::blend", "blend_param_uid");
    doc.add_input_property(blend_param, function_input("opacity", "Opacity", blend_param_fct));

    // package functions in a folder
    let folder = doc.add_folder(pkg1, "test_package_functions");
    let test_return = doc.add_function(Some(folder), "test_return_1");
    doc.set_annotation(test_return, "label", "Test Return 1");
    doc.add_input_property(
        test_return,
        InputProperty {
            id: "input_value".to_string(),
            label: "Input Value".to_string(),
            ..Default::default()
        },
    );
    doc.add_comment(test_return, "this is a test return", None);
    let getter = doc.add_function_node(test_return, "sbs::function::get_float1", "g1");
    doc.add_input_property(getter, string_input("my_test_var"));
    let setter = doc.add_function_node(test_return, "sbs::function::set", "s1");
    doc.add_input_property(setter, string_input("my_test_var"));
    let sub_node = doc.add_function_node(test_return, "sbs::function::sub", "sub1");
    let const_node = doc.add_function_node(test_return, "sbs::function::const_float1", "c1");
    doc.set_reference(bp_call, test_return);

    let util_folder = doc.add_folder(folder, "test_util_functions");
    doc.add_function(Some(util_folder), "util_clamp");

    // package-level function calling into the folder
    let root_function = doc.add_function(Some(pkg1), "root_pkg_function");
    let rf_call = doc.add_function_node(root_function, "sbs::function::instance", "rcall_1");
    doc.set_reference(rf_call, test_return);
    let rf_get = doc.add_function_node(root_function, "sbs::function::get_float1", "rg1");
    doc.add_input_property(rf_get, string_input("another_var"));

    // package 2: a second graph, for multi-package searches
    let pkg2 = doc.add_package("tests/gs_demo_pkg2.sbs");
    let graph2 = doc.add_graph(Some(pkg2), "graph_2");
    doc.set_annotation(graph2, "label", "My test graph 2");
    let b2 = doc.add_comp_node(graph2, "sbs::compositing::blend", "b2_uid");
    doc.add_comment(graph2, "test in pkg2", Some(b2));

    Fixture {
        doc,
        library,
        pkg1,
        pkg2,
        graph1,
        blend,
        blend_param,
        blend_param_fct,
        fxmap_node,
        fxmap_inner,
        quadrant,
        quad_fct,
        pixproc,
        pixproc_fct,
        instance,
        subgraph,
        deep_blend,
        lib_instance,
        lib_graph,
        input_node,
        output_node,
        folder,
        util_folder,
        test_return,
        getter,
        setter,
        sub_node,
        const_node,
        root_function,
    }
}

pub fn run(fixture: &Fixture, criteria: &SearchCriteria) -> SearchResults {
    graphsearch::search(&fixture.doc, &fixture.library, None, criteria).unwrap()
}

pub fn run_from(fixture: &Fixture, root: ElementId, criteria: &SearchCriteria) -> SearchResults {
    graphsearch::search(&fixture.doc, &fixture.library, Some(root), criteria).unwrap()
}

/// All found-match strings in traversal order.
pub fn collect_matches(results: &SearchResults) -> Vec<String> {
    fn walk(node: &PathNode, out: &mut Vec<String>) {
        if let Some(found) = &node.found_match {
            out.push(found.clone());
        }
        for child in &node.children {
            walk(child, out);
        }
    }
    let mut out = Vec::new();
    if let Some(root) = results.root() {
        walk(root, &mut out);
    }
    out
}

/// Elements carrying a found match, in traversal order.
pub fn collect_match_elements(results: &SearchResults) -> Vec<Option<ElementId>> {
    fn walk(node: &PathNode, out: &mut Vec<Option<ElementId>>) {
        if node.found_match.is_some() {
            out.push(node.element);
        }
        for child in &node.children {
            walk(child, out);
        }
    }
    let mut out = Vec::new();
    if let Some(root) = results.root() {
        walk(root, &mut out);
    }
    out
}

/// The pruning invariant: every leaf of a non-empty result tree is a
/// match.
pub fn assert_pruned(results: &SearchResults) {
    fn walk(node: &PathNode) {
        if node.children.is_empty() {
            assert!(
                node.found_match.is_some(),
                "leaf without a match survived pruning: {node:?}"
            );
        }
        for child in &node.children {
            walk(child);
        }
    }
    if let Some(root) = results.root() {
        walk(root);
    }
}

/// Criteria with every category toggle off, as a baseline for tests that
/// enable toggles one at a time.
pub fn silent_criteria(search_string: &str) -> SearchCriteria {
    let mut criteria = SearchCriteria::new(search_string);
    criteria.enable_filters(false);
    criteria
}
