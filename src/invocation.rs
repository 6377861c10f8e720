use ast::expression::Expression;
use ast::node::Node;
use ast::tree::{NodeId, Tree};
use compiler::Compiler;
use error::{Result, SassError, ErrorKind};
use sass::mixin::{SassMixin, SassMixinCall};
use sass::parameters::{collate_arguments, Argument};
use scope::FrameKind;
use substituter::replace_interpolation;
use traverse::{Flow, Mode};

impl Compiler {
    /// Calls a user defined `@function`. The body is copied into `tree` for
    /// every call and walked in its own frame; `None` means it finished without
    /// `@return`.
    pub fn invoke_function(&mut self, tree: &mut Tree, name: &str, arguments: Vec<Expression>) -> Result<Option<Expression>> {
        let definition = self.context.get_function(name)?;
        let signature = match self.context.definitions()[definition] {
            Node::FunctionDef(ref d) => d.clone(),
            ref other => return Err(SassError::new(
                ErrorKind::DefinitionNotFound,
                format!("Function Definition: {} is `{}`", name, other),
            )),
        };
        let collated = self.bind_call(name, &signature, arguments)?;
        let body = tree.graft(self.context.definitions(), definition);
        debug!("calling {}() with {} argument(s)", name, collated.len());

        let flow = self.with_scope(FrameKind::Call, |compiler| {
            compiler.bind_parameters(tree, collated)?;
            for child in tree.children(body).to_vec() {
                replace_interpolation(tree, child, compiler.context.scope.innermost());
            }
            compiler.walk_children(tree, body, Mode::Function)
        })?;
        tree.set_children(body, vec![]);

        match flow {
            Flow::Return(value) => {
                trace!("{}() returned {}", name, value);
                Ok(Some(value))
            },
            Flow::Continue => {
                debug!("{}() finished without @return", name);
                Ok(None)
            },
        }
    }

    /// Expands `@include` in place: the mixin body is cloned, `@content` is
    /// replaced by the include's own block, and the result is spliced after
    /// the include and walked before the include is removed.
    pub fn include_mixin(&mut self, tree: &mut Tree, id: NodeId, call: SassMixinCall) -> Result<()> {
        let parent = tree.parent_of(id)?;
        let definition = self.context.get_mixin(&call.name)?;
        let signature = match self.context.definitions()[definition] {
            Node::MixinDef(ref d) => d.clone(),
            ref other => return Err(SassError::new(
                ErrorKind::DefinitionNotFound,
                format!("Mixin Definition: {} is `{}`", call.name, other),
            )),
        };
        let arguments = self.evaluate_arguments(tree, &call.arguments)?;
        let collated = self.bind_call(&call.name, &signature, arguments)?;
        let body = tree.graft(self.context.definitions(), definition);
        fill_content(tree, body, id);
        debug!("including {} with {} argument(s)", call.name, collated.len());

        let flow = self.with_scope(FrameKind::Call, |compiler| {
            compiler.bind_parameters(tree, collated)?;
            let mut anchor = id;
            let mut spliced = vec![];
            for child in tree.children(body).to_vec() {
                replace_interpolation(tree, child, compiler.context.scope.innermost());
                tree.insert_after(parent, anchor, child);
                anchor = child;
                spliced.push(child);
            }
            tree.set_children(id, vec![]);
            tree.remove(parent, id);
            compiler.walk_nodes(tree, &spliced, Mode::Mixin)
        })?;

        match flow {
            Flow::Continue => Ok(()),
            Flow::Return(value) => Err(SassError::new(
                ErrorKind::ReturnOutsideFunction,
                format!("@return {} inside mixin {}", value, call.name),
            )),
        }
    }

    fn bind_call(&self, name: &str, signature: &SassMixin, arguments: Vec<Expression>) -> Result<Vec<(String, Argument)>> {
        if signature.name != name {
            return Err(SassError::new(
                ErrorKind::ArgumentMismatch,
                format!("Call to {} resolved to definition {}", name, signature.name),
            ))
        }
        collate_arguments(name, &signature.parameters, arguments)
    }

    /// Binds every formal parameter in the innermost frame. Defaults are
    /// evaluated here, so they can refer to earlier parameters.
    fn bind_parameters(&mut self, tree: &mut Tree, collated: Vec<(String, Argument)>) -> Result<()> {
        for (name, argument) in collated {
            let value = match argument {
                Argument::Given(value) => value,
                Argument::Default(default) => self.evaluate_expression(tree, &default)?,
            };
            trace!("${} = {}", name, value);
            self.context.scope.define(name, value);
        }
        Ok(())
    }
}

/// Replaces every `@content` under `body` with a copy of the children of
/// `include`.
fn fill_content(tree: &mut Tree, body: NodeId, include: NodeId) {
    let slots = tree.descendants(body).into_iter()
        .filter(|&d| tree[d] == Node::Content)
        .collect::<Vec<_>>();

    for content in slots {
        let parent = match tree.parent(content) {
            Some(p) => p,
            None => continue,
        };
        let mut anchor = content;
        for child in tree.children(include).to_vec() {
            let copy = tree.clone_subtree(child);
            tree.insert_after(parent, anchor, copy);
            anchor = copy;
        }
        tree.remove(parent, content);
    }
}
