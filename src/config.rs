//! Search criteria: the full configuration of one search.
//!
//! A `SearchCriteria` aggregates the search string, the per-category
//! toggles, the behavioral switches and the two optional node-type
//! filters. It is pure configuration — all behavior lives in the matcher
//! and the engine.
//!
//! Criteria defaults can be overridden from a YAML or JSON file, loaded
//! from the usual locations in order of precedence:
//! 1. Custom file passed to [`SearchCriteria::load_from`]
//! 2. Local `.graphsearch.yaml` in the current directory
//! 3. Global `$HOME/.config/graphsearch/criteria.yaml`
//!
//! Node-type filters are never loaded from files; they reference
//! classification tables and the library index and are set
//! programmatically.

use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};
use crate::filters::NodeTypeFilter;

fn default_true() -> bool {
    true
}

/// Configuration of a single search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Text to search for; may be empty for type-only searches.
    #[serde(default)]
    pub search_string: String,

    /// Case-sensitive matching. Off by default.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Whole-word matching, with `*` wildcards loosening either word
    /// boundary.
    #[serde(default)]
    pub whole_word: bool,

    /// Enter package functions called from function graphs.
    #[serde(default = "default_true")]
    pub enter_package_functions: bool,

    /// Enter custom (non-library) sub-graphs instantiated by graph nodes.
    #[serde(default = "default_true")]
    pub enter_custom_sub_graphs: bool,

    /// Match variable-getter nodes by their variable name.
    #[serde(default = "default_true")]
    pub var_getter: bool,

    /// Match variable-setter nodes by their variable name.
    #[serde(default = "default_true")]
    pub var_setter: bool,

    /// Match folder identifiers.
    #[serde(default = "default_true")]
    pub folder_name: bool,

    /// Match graph identifiers and labels.
    #[serde(default = "default_true")]
    pub graph_name: bool,

    /// Search inside functions driving node parameters.
    #[serde(default = "default_true")]
    pub graph_param_func: bool,

    /// Match function identifiers and labels.
    #[serde(default = "default_true")]
    pub func_name: bool,

    /// Match declared function inputs.
    #[serde(default = "default_true")]
    pub func_input: bool,

    /// Match comments, frames and pins.
    #[serde(default = "default_true")]
    pub comment: bool,

    /// Restrict graph traversal to nodes of one type.
    #[serde(skip)]
    pub graph_node_filter: Option<NodeTypeFilter>,

    /// Restrict function traversal to nodes of one type.
    #[serde(skip)]
    pub function_node_filter: Option<NodeTypeFilter>,

    /// Report every parameter-driving function instead of searching.
    /// Forces all category toggles off and ignores the function filter.
    #[serde(default)]
    pub param_functions_only: bool,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::new("")
    }
}

impl SearchCriteria {
    pub fn new(search_string: impl Into<String>) -> Self {
        Self {
            search_string: search_string.into(),
            case_sensitive: false,
            whole_word: false,
            enter_package_functions: true,
            enter_custom_sub_graphs: true,
            var_getter: true,
            var_setter: true,
            folder_name: true,
            graph_name: true,
            graph_param_func: true,
            func_name: true,
            func_input: true,
            comment: true,
            graph_node_filter: None,
            function_node_filter: None,
            param_functions_only: false,
        }
    }

    /// Switches all eight category toggles at once.
    pub fn enable_filters(&mut self, enable: bool) {
        self.var_getter = enable;
        self.var_setter = enable;
        self.folder_name = enable;
        self.graph_name = enable;
        self.graph_param_func = enable;
        self.func_name = enable;
        self.func_input = enable;
        self.comment = enable;
    }

    pub fn from_preset(preset: SearchPreset) -> Self {
        match preset {
            SearchPreset::ParamFunctions => {
                let mut criteria = Self::new("");
                criteria.param_functions_only = true;
                criteria.enable_filters(false);
                criteria
            }
            SearchPreset::Todo => {
                let mut criteria = Self::new("TODO");
                criteria.case_sensitive = true;
                criteria
            }
            SearchPreset::Tmp => {
                let mut criteria = Self::new("TMP");
                criteria.case_sensitive = true;
                criteria
            }
        }
    }

    /// Loads criteria defaults from the standard locations, with an
    /// optional explicit file taking precedence.
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("graphsearch/criteria.yaml")),
            Some(PathBuf::from(".graphsearch.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SearchError::config_error(e.to_string()))
    }

    /// Copy with the special-mode invariant applied: param-functions-only
    /// searches run with every toggle off and no function filter.
    pub(crate) fn normalized(&self) -> Self {
        let mut criteria = self.clone();
        if criteria.param_functions_only {
            criteria.enable_filters(false);
            criteria.function_node_filter = None;
        }
        criteria
    }
}

/// Built-in search presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPreset {
    /// Graph parameters driven by custom functions.
    ParamFunctions,
    /// Case-sensitive `TODO` search.
    Todo,
    /// Case-sensitive `TMP` search.
    Tmp,
}
