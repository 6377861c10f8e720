use ast::expression::Expression;
use ast::node::Node;
use ast::tree::Tree;
use condition::{ConditionEvaluator, DefaultConditionEvaluator};
use context::Context;
use error::{Result, SassError, ErrorKind};
use resolver::ImportLoader;
use scope::FrameKind;
use traverse::{Flow, Mode};

/// Expands one stylesheet tree in place: variables, control directives,
/// functions, mixins, imports and extends. A compiler can be reused; each
/// `compile` call shares the definitions and globals of the previous ones.
pub struct Compiler {
    pub context: Context,
    pub(crate) conditions: Box<dyn ConditionEvaluator>,
    pub(crate) loader: Option<Box<dyn ImportLoader>>,
}

impl Default for Compiler {
    fn default() -> Compiler {
        Compiler::new()
    }
}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler {
            context: Context::new(),
            conditions: Box::new(DefaultConditionEvaluator),
            loader: None,
        }
    }

    pub fn with_condition_evaluator<C>(mut self, conditions: C) -> Compiler
        where C: ConditionEvaluator + 'static
    {
        self.conditions = Box::new(conditions);
        self
    }

    pub fn with_import_loader<L>(mut self, loader: L) -> Compiler
        where L: ImportLoader + 'static
    {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Binds a global variable before compiling, as if the stylesheet had
    /// started with `$name: value`.
    pub fn define_variable<S: Into<String>>(&mut self, name: S, value: Expression) {
        self.context.scope.define(name, value);
    }

    pub fn compile(&mut self, tree: &mut Tree) -> Result<()> {
        if !self.context.extends.is_empty() {
            debug!("dropping {} @extend(s) left by a failed compile", self.context.extends.len());
            self.context.extends.clear();
        }
        let root = tree.root();
        debug!("compiling {} top level node(s)", tree.children(root).len());
        match self.walk_children(tree, root, Mode::Stylesheet)? {
            Flow::Continue => {},
            Flow::Return(value) => return Err(SassError::new(
                ErrorKind::ReturnOutsideFunction,
                format!("@return {} outside of a function", value),
            )),
        }
        self.apply_extends(tree);
        trace!("expanded tree:\n{}", tree.outline());
        Ok(())
    }

    /// Runs `f` inside a fresh scope frame. The frame is closed whatever `f`
    /// returns, errors included.
    pub fn with_scope<T, F>(&mut self, kind: FrameKind, f: F) -> Result<T>
        where F: FnOnce(&mut Compiler) -> Result<T>
    {
        self.context.scope.open(kind);
        let result = f(self);
        self.context.scope.close();
        result
    }

    fn apply_extends(&mut self, tree: &mut Tree) {
        let extends = ::std::mem::replace(&mut self.context.extends, vec![]);
        if extends.is_empty() {
            return
        }
        let blocks = tree.descendants(tree.root()).into_iter()
            .filter(|&id| tree[id].is_block())
            .collect::<Vec<_>>();

        for (extender, targets) in extends {
            let selectors = match tree[extender] {
                Node::Block(ref rule) => rule.selectors.clone(),
                _ => continue,
            };
            for &block in blocks.iter() {
                if let Node::Block(ref mut rule) = tree[block] {
                    for target in targets.iter() {
                        if rule.extend(target, &selectors) {
                            debug!("{} extended by {}", target, selectors.join(", "));
                        }
                    }
                }
            }
        }
    }
}
