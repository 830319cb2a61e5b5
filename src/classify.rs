//! Classification of document elements into semantic categories.
//!
//! Classification is a total, pure function of the element's intrinsic kind
//! plus, for nodes, its definition key. Node kinds are plain data: three
//! static lookup tables keyed by definition-key strings, one each for
//! compositing nodes, FX-Map internal nodes and function nodes. Unknown
//! node definitions fall back to a generic category carrying the raw key
//! as their type label.
//!
//! Dispatch order matters for elements satisfying several shape
//! predicates: function graphs are classified before plain graphs, and the
//! specific node tables are consulted before the generic fallback.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

use crate::document::{Document, ElementId, ElementKind, ANNOTATION_LABEL};

/// Semantic category of a document element or result-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Root,
    Package,
    Graph,
    Folder,
    Function,
    /// Synthetic grouping node for a function's declared inputs.
    FunctionInputs,
    /// One declared input of a function graph.
    FunctionInput,
    /// One declared input of a compositing graph.
    GraphInput,
    /// A function graph driving a single node property.
    ParamFunction,
    /// A function invoked by reference from another function.
    FunctionCall,
    Comment,
    Frame,
    Pin,
    /// Inner graph owned by an FX-Map node.
    FxMapGraph,
    /// Per-pixel function owned by a Pixel Processor node.
    PixelProcessorFunction,
    /// Value function owned by a Value Processor node.
    ValueProcessorFunction,
    CompNode(CompNodeKind),
    FxMapNode(FxMapNodeKind),
    FunctionNode(FunctionNodeKind),
}

/// Compositing-graph node kinds, one per known definition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompNodeKind {
    Generic,
    Blend,
    Blur,
    ChannelShuffle,
    Curve,
    DirectionalBlur,
    DirectionalWarp,
    Distance,
    Emboss,
    GradientMap,
    GrayscaleConversion,
    Hsl,
    Levels,
    Normal,
    Sharpen,
    Transformation,
    Uniform,
    Warp,
    FxMap,
    PixelProcessor,
    ValueProcessor,
    GraphInstance,
    InputColor,
    InputGrayscale,
    InputValue,
    Output,
    Passthrough,
}

/// Node kinds found inside the inner graph of an FX-Map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FxMapNodeKind {
    Quadrant,
    Switch,
    Iterate,
}

/// Function-graph node kinds, coarse-grained; exact definition keys stay in
/// the lookup table and in node-type filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionNodeKind {
    Generic,
    Get,
    Set,
    Instance,
    Sequence,
    IfElse,
    Const,
    Vector,
    Swizzle,
    Cast,
    Operator,
    Comparison,
    Logic,
    Sampler,
    Random,
}

/// Definition key of the function-instance (call) node.
pub const DEF_KEY_FUNCTION_INSTANCE: &str = "sbs::function::instance";
/// Definition key of the variable-setter node.
pub const DEF_KEY_SET: &str = "sbs::function::set";
/// Definition-key prefix shared by all variable-getter nodes.
pub const DEF_PREFIX_GET: &str = "sbs::function::get";

type NodeTypeTable = HashMap<&'static str, (Category, &'static str)>;

static COMP_NODE_TYPES: Lazy<NodeTypeTable> = Lazy::new(|| {
    use CompNodeKind::*;
    let mut m = HashMap::new();
    let mut add = |key, kind, label| {
        m.insert(key, (Category::CompNode(kind), label));
    };
    add("sbs::compositing::blend", Blend, "Blend");
    add("sbs::compositing::blur", Blur, "Blur");
    add("sbs::compositing::shuffle", ChannelShuffle, "Channel Shuffle");
    add("sbs::compositing::curve", Curve, "Curve");
    add("sbs::compositing::dirmotionblur", DirectionalBlur, "Directional Blur");
    add("sbs::compositing::directionalwarp", DirectionalWarp, "Directional Warp");
    add("sbs::compositing::distance", Distance, "Distance");
    add("sbs::compositing::emboss", Emboss, "Emboss");
    add("sbs::compositing::gradient", GradientMap, "Gradient Map");
    add("sbs::compositing::grayscaleconversion", GrayscaleConversion, "Grayscale Conversion");
    add("sbs::compositing::hsl", Hsl, "HSL");
    add("sbs::compositing::levels", Levels, "Levels");
    add("sbs::compositing::normal", Normal, "Normal");
    add("sbs::compositing::sharpen", Sharpen, "Sharpen");
    add("sbs::compositing::transformation", Transformation, "Transformation 2D");
    add("sbs::compositing::uniform", Uniform, "Uniform Color");
    add("sbs::compositing::warp", Warp, "Warp");
    add("sbs::compositing::fxmaps", FxMap, "FX-Map");
    add("sbs::compositing::pixelprocessor", PixelProcessor, "Pixel Processor");
    add("sbs::compositing::valueprocessor", ValueProcessor, "Value Processor");
    add("sbs::compositing::sbscompgraph_instance", GraphInstance, "Graph Instance");
    add("sbs::compositing::input_color", InputColor, "Input Color");
    add("sbs::compositing::input_grayscale", InputGrayscale, "Input Grayscale");
    add("sbs::compositing::input_value", InputValue, "Input Value");
    add("sbs::compositing::output", Output, "Output");
    add("sbs::compositing::passthrough", Passthrough, "Dot");
    m
});

static FXMAP_NODE_TYPES: Lazy<NodeTypeTable> = Lazy::new(|| {
    use FxMapNodeKind::*;
    let mut m = HashMap::new();
    let mut add = |key, kind, label| {
        m.insert(key, (Category::FxMapNode(kind), label));
    };
    add("sbs::fxmap::paramset", Quadrant, "Quadrant");
    add("sbs::fxmap::markov2", Switch, "Switch");
    add("sbs::fxmap::iterate", Iterate, "Iterate");
    m
});

static FUNCTION_NODE_TYPES: Lazy<NodeTypeTable> = Lazy::new(|| {
    use FunctionNodeKind::*;
    let mut m = HashMap::new();
    let mut add = |key, kind, label| {
        m.insert(key, (Category::FunctionNode(kind), label));
    };
    add("sbs::function::get_bool", Get, "Get Boolean");
    add("sbs::function::get_float1", Get, "Get Float");
    add("sbs::function::get_float2", Get, "Get Float2");
    add("sbs::function::get_float3", Get, "Get Float3");
    add("sbs::function::get_float4", Get, "Get Float4");
    add("sbs::function::get_integer1", Get, "Get Integer");
    add("sbs::function::get_integer2", Get, "Get Integer2");
    add("sbs::function::get_integer3", Get, "Get Integer3");
    add("sbs::function::get_integer4", Get, "Get Integer4");
    add("sbs::function::get_string", Get, "Get String");
    add(DEF_KEY_SET, Set, "Set");
    add(DEF_KEY_FUNCTION_INSTANCE, Instance, "Function Instance");
    add("sbs::function::sequence", Sequence, "Sequence");
    add("sbs::function::ifelse", IfElse, "If...Else");
    add("sbs::function::const_float1", Const, "Float");
    add("sbs::function::const_float2", Const, "Float2");
    add("sbs::function::const_float3", Const, "Float3");
    add("sbs::function::const_float4", Const, "Float4");
    add("sbs::function::const_int1", Const, "Integer");
    add("sbs::function::const_int2", Const, "Integer2");
    add("sbs::function::const_int3", Const, "Integer3");
    add("sbs::function::const_int4", Const, "Integer4");
    add("sbs::function::const_bool", Const, "Boolean");
    add("sbs::function::const_string", Const, "String");
    add("sbs::function::vector2", Vector, "Vector Float2");
    add("sbs::function::vector3", Vector, "Vector Float3");
    add("sbs::function::vector4", Vector, "Vector Float4");
    add("sbs::function::swizzle1", Swizzle, "Swizzle Float1");
    add("sbs::function::swizzle2", Swizzle, "Swizzle Float2");
    add("sbs::function::swizzle3", Swizzle, "Swizzle Float3");
    add("sbs::function::swizzle4", Swizzle, "Swizzle Float4");
    add("sbs::function::tofloat", Cast, "To Float");
    add("sbs::function::tointeger", Cast, "To Integer");
    add("sbs::function::add", Operator, "Addition");
    add("sbs::function::sub", Operator, "Subtraction");
    add("sbs::function::mul", Operator, "Multiplication");
    add("sbs::function::mulscalar", Operator, "Scalar Multiplication");
    add("sbs::function::div", Operator, "Division");
    add("sbs::function::neg", Operator, "Negation");
    add("sbs::function::mod", Operator, "Modulo");
    add("sbs::function::dot", Operator, "Dot Product");
    add("sbs::function::abs", Operator, "Absolute");
    add("sbs::function::floor", Operator, "Floor");
    add("sbs::function::ceil", Operator, "Ceil");
    add("sbs::function::cos", Operator, "Cosine");
    add("sbs::function::sin", Operator, "Sine");
    add("sbs::function::sqrt", Operator, "Square Root");
    add("sbs::function::log", Operator, "Logarithm");
    add("sbs::function::exp", Operator, "Exponential");
    add("sbs::function::pow2", Operator, "Power of 2");
    add("sbs::function::min", Operator, "Minimum");
    add("sbs::function::max", Operator, "Maximum");
    add("sbs::function::lerp", Operator, "Linear Interpolation");
    add("sbs::function::eq", Comparison, "Equal");
    add("sbs::function::noteq", Comparison, "Not Equal");
    add("sbs::function::gt", Comparison, "Greater");
    add("sbs::function::gteq", Comparison, "Greater or Equal");
    add("sbs::function::lt", Comparison, "Lower");
    add("sbs::function::lteq", Comparison, "Lower or Equal");
    add("sbs::function::and", Logic, "And");
    add("sbs::function::or", Logic, "Or");
    add("sbs::function::not", Logic, "Not");
    add("sbs::function::samplelum", Sampler, "Sample Luminance");
    add("sbs::function::samplecol", Sampler, "Sample Color");
    add("sbs::function::rand", Random, "Random");
    m
});

/// Looks a node definition key up across the three node tables.
pub fn node_type_for_key(key: &str) -> Option<(Category, &'static str)> {
    COMP_NODE_TYPES
        .get(key)
        .or_else(|| FXMAP_NODE_TYPES.get(key))
        .or_else(|| FUNCTION_NODE_TYPES.get(key))
        .copied()
}

/// Classifies an element into its category and display type label.
pub fn classify<D: Document>(doc: &D, id: ElementId) -> (Category, String) {
    match doc.element_kind(id) {
        ElementKind::Package => (Category::Package, "package".to_string()),
        ElementKind::FunctionGraph => (Category::Function, "function".to_string()),
        ElementKind::CompGraph => (Category::Graph, "graph".to_string()),
        ElementKind::Folder => (Category::Folder, "folder".to_string()),
        ElementKind::Comment => (Category::Comment, "comment".to_string()),
        ElementKind::Frame => (Category::Frame, "frame".to_string()),
        ElementKind::Pin => (Category::Pin, "pin".to_string()),
        ElementKind::CompNode => {
            let key = doc.definition_key(id);
            match COMP_NODE_TYPES
                .get(key.as_str())
                .or_else(|| FXMAP_NODE_TYPES.get(key.as_str()))
            {
                Some(&(category, label)) => (category, label.to_string()),
                None => (Category::CompNode(CompNodeKind::Generic), key),
            }
        }
        ElementKind::FunctionNode => {
            let key = doc.definition_key(id);
            match FUNCTION_NODE_TYPES.get(key.as_str()) {
                Some(&(category, label)) => (category, label.to_string()),
                None if key.starts_with(DEF_PREFIX_GET) => {
                    (Category::FunctionNode(FunctionNodeKind::Get), "Get".to_string())
                }
                None => (Category::FunctionNode(FunctionNodeKind::Generic), key),
            }
        }
    }
}

/// Display type label for a category assigned as a subtype override, where
/// no element is available to consult.
pub fn type_label(category: Category) -> &'static str {
    match category {
        Category::Root => "root",
        Category::Package => "package",
        Category::Graph => "graph",
        Category::Folder => "folder",
        Category::Function => "function",
        Category::FunctionInputs => "Function inputs",
        Category::FunctionInput => "Function input",
        Category::GraphInput => "Graph input",
        Category::ParamFunction => "function parameter",
        Category::FunctionCall => "Function call",
        Category::Comment => "comment",
        Category::Frame => "frame",
        Category::Pin => "pin",
        Category::FxMapGraph => "FX-Map Graph",
        Category::PixelProcessorFunction => "Pixel Processor Function",
        Category::ValueProcessorFunction => "Value Processor Function",
        Category::CompNode(kind) => comp_node_label(kind),
        Category::FxMapNode(kind) => fxmap_node_label(kind),
        Category::FunctionNode(kind) => function_node_label(kind),
    }
}

fn comp_node_label(kind: CompNodeKind) -> &'static str {
    use CompNodeKind::*;
    match kind {
        Generic => "graph node",
        Blend => "Blend",
        Blur => "Blur",
        ChannelShuffle => "Channel Shuffle",
        Curve => "Curve",
        DirectionalBlur => "Directional Blur",
        DirectionalWarp => "Directional Warp",
        Distance => "Distance",
        Emboss => "Emboss",
        GradientMap => "Gradient Map",
        GrayscaleConversion => "Grayscale Conversion",
        Hsl => "HSL",
        Levels => "Levels",
        Normal => "Normal",
        Sharpen => "Sharpen",
        Transformation => "Transformation 2D",
        Uniform => "Uniform Color",
        Warp => "Warp",
        FxMap => "FX-Map",
        PixelProcessor => "Pixel Processor",
        ValueProcessor => "Value Processor",
        GraphInstance => "Graph Instance",
        InputColor => "Input Color",
        InputGrayscale => "Input Grayscale",
        InputValue => "Input Value",
        Output => "Output",
        Passthrough => "Dot",
    }
}

fn fxmap_node_label(kind: FxMapNodeKind) -> &'static str {
    match kind {
        FxMapNodeKind::Quadrant => "Quadrant",
        FxMapNodeKind::Switch => "Switch",
        FxMapNodeKind::Iterate => "Iterate",
    }
}

fn function_node_label(kind: FunctionNodeKind) -> &'static str {
    use FunctionNodeKind::*;
    match kind {
        Generic => "function node",
        Get => "Get",
        Set => "Set",
        Instance => "Function Instance",
        Sequence => "Sequence",
        IfElse => "If...Else",
        Const => "Constant",
        Vector => "Vector",
        Swizzle => "Swizzle",
        Cast => "Cast",
        Operator => "Operator",
        Comparison => "Comparison",
        Logic => "Logic",
        Sampler => "Sampler",
        Random => "Random",
    }
}

/// Whether nodes of this category own a nested graph or function (FX-Map,
/// Pixel Processor, Value Processor) reached through the system-content
/// path rather than an ordinary sub-graph reference.
pub fn has_system_content(category: Category) -> bool {
    matches!(
        category,
        Category::CompNode(CompNodeKind::FxMap)
            | Category::CompNode(CompNodeKind::PixelProcessor)
            | Category::CompNode(CompNodeKind::ValueProcessor)
    )
}

/// Content category and fixed display name of a system-content node's
/// nested graph.
pub fn system_content(category: Category) -> Option<(Category, &'static str)> {
    match category {
        Category::CompNode(CompNodeKind::FxMap) => Some((Category::FxMapGraph, "FX-Map")),
        Category::CompNode(CompNodeKind::PixelProcessor) => {
            Some((Category::PixelProcessorFunction, "Pixel Processor"))
        }
        Category::CompNode(CompNodeKind::ValueProcessor) => {
            Some((Category::ValueProcessorFunction, "Value Processor"))
        }
        _ => None,
    }
}

/// Input/Output nodes carry a user-facing identifier as an annotation,
/// matched with the substring predicate rather than exact equality.
pub fn is_io_node(category: Category) -> bool {
    matches!(
        category,
        Category::CompNode(CompNodeKind::InputColor)
            | Category::CompNode(CompNodeKind::InputGrayscale)
            | Category::CompNode(CompNodeKind::InputValue)
            | Category::CompNode(CompNodeKind::Output)
    )
}

/// Derives the human-readable display name of an element for the given
/// category.
pub fn display_name<D: Document>(doc: &D, id: ElementId, category: Category) -> String {
    match category {
        Category::Package => Path::new(&doc.file_path(id))
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        Category::Graph | Category::Function | Category::Folder => {
            let identifier = doc.identifier(id);
            if identifier.is_empty() {
                doc.class_name(id)
            } else {
                identifier
            }
        }
        Category::Comment | Category::Frame | Category::Pin => doc.description(id),
        Category::CompNode(CompNodeKind::GraphInstance) => match doc.referenced_resource(id) {
            Some(graph) => doc
                .annotation(graph, ANNOTATION_LABEL)
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| doc.identifier(graph)),
            None => String::new(),
        },
        Category::CompNode(CompNodeKind::Generic) => doc.definition_label(id),
        Category::CompNode(kind) => comp_node_label(kind).to_string(),
        Category::FxMapNode(kind) => fxmap_node_label(kind).to_string(),
        Category::FunctionNode(FunctionNodeKind::Generic) => doc.definition_label(id),
        Category::FunctionNode(kind) => function_node_label(kind).to_string(),
        Category::Root => "Root".to_string(),
        Category::FunctionInputs => "Function inputs".to_string(),
        _ => String::new(),
    }
}
