//! In-memory [`Document`] implementation.
//!
//! `MemoryDocument` is the reference host: a growable element store with a
//! small builder API for assembling packages, folders, graphs and nodes.
//! The unit tests, integration tests and benches all build their fixture
//! documents through it; a production host adapter replaces it wholesale.

use crate::document::{Document, ElementId, ElementKind, InputProperty};
use crate::errors::{SearchError, SearchResult};
use std::collections::HashMap;

#[derive(Debug)]
struct ElementData {
    kind: ElementKind,
    identifier: String,
    class_name: String,
    annotations: HashMap<String, String>,
    description: String,
    title: String,
    title_fails: bool,
    file_path: String,
    definition_key: String,
    definition_label: String,
    children: Vec<ElementId>,
    nodes: Vec<ElementId>,
    graph_objects: Vec<ElementId>,
    owning_node: Option<ElementId>,
    properties: Vec<InputProperty>,
    referenced: Option<ElementId>,
}

impl ElementData {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            identifier: String::new(),
            class_name: String::new(),
            annotations: HashMap::new(),
            description: String::new(),
            title: String::new(),
            title_fails: false,
            file_path: String::new(),
            definition_key: String::new(),
            definition_label: String::new(),
            children: Vec::new(),
            nodes: Vec::new(),
            graph_objects: Vec::new(),
            owning_node: None,
            properties: Vec::new(),
            referenced: None,
        }
    }
}

/// Growable in-memory document.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Vec<ElementData>,
    packages: Vec<ElementId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, data: ElementData) -> ElementId {
        let id = ElementId::new(self.elements.len() as u32);
        self.elements.push(data);
        id
    }

    fn data(&self, id: ElementId) -> &ElementData {
        &self.elements[id.raw() as usize]
    }

    fn data_mut(&mut self, id: ElementId) -> &mut ElementData {
        &mut self.elements[id.raw() as usize]
    }

    /// Adds a package and registers it as a search root.
    pub fn add_package(&mut self, file_path: &str) -> ElementId {
        let mut data = ElementData::new(ElementKind::Package);
        data.file_path = file_path.to_string();
        let id = self.push(data);
        self.packages.push(id);
        id
    }

    pub fn add_folder(&mut self, parent: ElementId, identifier: &str) -> ElementId {
        let mut data = ElementData::new(ElementKind::Folder);
        data.identifier = identifier.to_string();
        let id = self.push(data);
        self.data_mut(parent).children.push(id);
        id
    }

    /// Adds a compositing graph. With `parent = None` the graph is
    /// detached: reachable only through node references (sub-graphs,
    /// system content, library assets).
    pub fn add_graph(&mut self, parent: Option<ElementId>, identifier: &str) -> ElementId {
        let mut data = ElementData::new(ElementKind::CompGraph);
        data.identifier = identifier.to_string();
        data.annotations
            .insert("identifier".to_string(), identifier.to_string());
        let id = self.push(data);
        if let Some(parent) = parent {
            self.data_mut(parent).children.push(id);
        }
        id
    }

    /// Adds a function graph; detached when `parent` is `None` (parameter
    /// functions, processor functions).
    pub fn add_function(&mut self, parent: Option<ElementId>, identifier: &str) -> ElementId {
        let mut data = ElementData::new(ElementKind::FunctionGraph);
        data.identifier = identifier.to_string();
        data.annotations
            .insert("identifier".to_string(), identifier.to_string());
        let id = self.push(data);
        if let Some(parent) = parent {
            self.data_mut(parent).children.push(id);
        }
        id
    }

    pub fn add_comp_node(
        &mut self,
        graph: ElementId,
        definition_key: &str,
        identifier: &str,
    ) -> ElementId {
        let mut data = ElementData::new(ElementKind::CompNode);
        data.definition_key = definition_key.to_string();
        data.identifier = identifier.to_string();
        let id = self.push(data);
        self.data_mut(graph).nodes.push(id);
        id
    }

    pub fn add_function_node(
        &mut self,
        graph: ElementId,
        definition_key: &str,
        identifier: &str,
    ) -> ElementId {
        let mut data = ElementData::new(ElementKind::FunctionNode);
        data.definition_key = definition_key.to_string();
        data.identifier = identifier.to_string();
        let id = self.push(data);
        self.data_mut(graph).nodes.push(id);
        id
    }

    pub fn add_comment(
        &mut self,
        graph: ElementId,
        description: &str,
        owner: Option<ElementId>,
    ) -> ElementId {
        let mut data = ElementData::new(ElementKind::Comment);
        data.description = description.to_string();
        data.owning_node = owner;
        let id = self.push(data);
        self.data_mut(graph).graph_objects.push(id);
        id
    }

    pub fn add_frame(&mut self, graph: ElementId, title: &str, description: &str) -> ElementId {
        let mut data = ElementData::new(ElementKind::Frame);
        data.title = title.to_string();
        data.description = description.to_string();
        let id = self.push(data);
        self.data_mut(graph).graph_objects.push(id);
        id
    }

    pub fn add_pin(&mut self, graph: ElementId, description: &str) -> ElementId {
        let mut data = ElementData::new(ElementKind::Pin);
        data.description = description.to_string();
        let id = self.push(data);
        self.data_mut(graph).graph_objects.push(id);
        id
    }

    pub fn set_annotation(&mut self, id: ElementId, key: &str, value: &str) {
        self.data_mut(id)
            .annotations
            .insert(key.to_string(), value.to_string());
    }

    pub fn clear_annotation(&mut self, id: ElementId, key: &str) {
        self.data_mut(id).annotations.remove(key);
    }

    pub fn set_identifier(&mut self, id: ElementId, identifier: &str) {
        self.data_mut(id).identifier = identifier.to_string();
    }

    pub fn set_class_name(&mut self, id: ElementId, class_name: &str) {
        self.data_mut(id).class_name = class_name.to_string();
    }

    pub fn set_definition_label(&mut self, id: ElementId, label: &str) {
        self.data_mut(id).definition_label = label.to_string();
    }

    /// Makes the node instantiate the given graph or function.
    pub fn set_reference(&mut self, node: ElementId, target: ElementId) {
        self.data_mut(node).referenced = Some(target);
    }

    pub fn add_input_property(&mut self, id: ElementId, property: InputProperty) {
        self.data_mut(id).properties.push(property);
    }

    /// Makes `frame_title` fail for this frame, simulating a host error on
    /// a detached object.
    pub fn fail_frame_title(&mut self, id: ElementId) {
        self.data_mut(id).title_fails = true;
    }
}

impl Document for MemoryDocument {
    fn packages(&self) -> Vec<ElementId> {
        self.packages.clone()
    }

    fn element_kind(&self, id: ElementId) -> ElementKind {
        self.data(id).kind
    }

    fn identifier(&self, id: ElementId) -> String {
        self.data(id).identifier.clone()
    }

    fn class_name(&self, id: ElementId) -> String {
        self.data(id).class_name.clone()
    }

    fn annotation(&self, id: ElementId, key: &str) -> Option<String> {
        self.data(id).annotations.get(key).cloned()
    }

    fn description(&self, id: ElementId) -> String {
        self.data(id).description.clone()
    }

    fn frame_title(&self, id: ElementId) -> SearchResult<String> {
        let data = self.data(id);
        if data.title_fails {
            Err(SearchError::host("frame title unavailable"))
        } else {
            Ok(data.title.clone())
        }
    }

    fn file_path(&self, id: ElementId) -> String {
        self.data(id).file_path.clone()
    }

    fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.data(id).children.clone()
    }

    fn nodes(&self, id: ElementId) -> Vec<ElementId> {
        self.data(id).nodes.clone()
    }

    fn graph_objects(&self, id: ElementId) -> Vec<ElementId> {
        self.data(id).graph_objects.clone()
    }

    fn owning_node(&self, id: ElementId) -> Option<ElementId> {
        self.data(id).owning_node
    }

    fn input_properties(&self, id: ElementId) -> Vec<InputProperty> {
        self.data(id).properties.clone()
    }

    fn referenced_resource(&self, id: ElementId) -> Option<ElementId> {
        self.data(id).referenced
    }

    fn definition_key(&self, id: ElementId) -> String {
        self.data(id).definition_key.clone()
    }

    fn definition_label(&self, id: ElementId) -> String {
        self.data(id).definition_label.clone()
    }
}
