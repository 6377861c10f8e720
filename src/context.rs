use ast::tree::{NodeId, Tree};
use error::{Result, SassError, ErrorKind};
use scope::Scope;

use std::collections::HashMap;

/// Everything one compiler knows about: the variable scope, the function
/// and mixin tables and the pending `@extend`s. Definitions are copied into
/// an arena of their own, so they outlive the tree they were read from.
#[derive(Debug, Default)]
pub struct Context {
    pub scope: Scope,
    pub extends: Vec<(NodeId, Vec<String>)>,
    definitions: Tree,
    functions: HashMap<String, NodeId>,
    mixins: HashMap<String, NodeId>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// The arena the ids returned by `get_function` and `get_mixin` index.
    pub fn definitions(&self) -> &Tree {
        &self.definitions
    }

    pub fn add_function<S: Into<String>>(&mut self, name: S, tree: &Tree, definition: NodeId) {
        let copy = self.definitions.graft(tree, definition);
        self.functions.insert(name.into(), copy);
    }

    pub fn add_mixin<S: Into<String>>(&mut self, name: S, tree: &Tree, definition: NodeId) {
        let copy = self.definitions.graft(tree, definition);
        self.mixins.insert(name.into(), copy);
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get_function(&self, name: &str) -> Result<NodeId> {
        self.functions.get(name).cloned().ok_or_else(|| SassError::new(
            ErrorKind::DefinitionNotFound,
            format!("Function Definition: {} not found", name),
        ))
    }

    pub fn get_mixin(&self, name: &str) -> Result<NodeId> {
        self.mixins.get(name).cloned().ok_or_else(|| SassError::new(
            ErrorKind::DefinitionNotFound,
            format!("Mixin Definition: {} not found", name),
        ))
    }
}
