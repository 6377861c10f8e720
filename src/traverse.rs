use ast::expression::Expression;
use ast::node::{Declaration, Import, ListModify, ListOpKind, Node};
use ast::tree::{NodeId, Tree};
use compiler::Compiler;
use error::{Result, SassError, ErrorKind};
use sass::function::list_is_comma;
use sass::rule::SassRule;
use sass::variable::SassVariable;
use substituter::interpolate;

/// Which body a node is being walked in. Function and mixin bodies only
/// accept some node kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Stylesheet,
    Mixin,
    Function,
}

/// How a walk ended. `Return` carries the value of an `@return` out of any
/// depth of nesting up to the function call.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Continue,
    Return(Expression),
}

impl Compiler {
    /// Performs the work of one node in place. Nodes may replace, move or
    /// remove themselves and splice new siblings after themselves.
    pub fn traverse(&mut self, tree: &mut Tree, id: NodeId, mode: Mode) -> Result<Flow> {
        check_allowed(&tree[id], mode)?;
        trace!("traverse `{}` ({:?})", tree[id], mode);

        match tree[id].clone() {
            Node::Root => return self.walk_children(tree, id, mode),
            Node::Variable(variable) => self.assign_variable(tree, id, variable)?,
            Node::Return(value) => {
                if mode != Mode::Function {
                    return Err(SassError::new(
                        ErrorKind::ReturnOutsideFunction,
                        format!("@return {} outside of a function", value),
                    ))
                }
                let value = self.evaluate_expression(tree, &value)?;
                return Ok(Flow::Return(value))
            },
            Node::Rule(declaration) => {
                let value = self.evaluate_expression(tree, &declaration.value)?;
                tree[id] = Node::Rule(Declaration {
                    name: interpolate(&declaration.name, &self.context.scope),
                    value: value,
                    important: declaration.important,
                });
            },
            Node::Block(rule) => return self.traverse_block(tree, id, rule, mode),
            Node::Comment(..) | Node::Simple(..) | Node::MicrosoftRule { .. } => {},
            Node::FontFace | Node::KeyframeSelector(..) => return self.walk_children(tree, id, mode),
            Node::Keyframes(mut keyframes) => {
                keyframes.name = interpolate(&keyframes.name, &self.context.scope);
                tree[id] = Node::Keyframes(keyframes);
                return self.walk_children(tree, id, mode)
            },
            Node::Media(query) => {
                tree[id] = Node::Media(interpolate(&query, &self.context.scope));
                return self.walk_children(tree, id, mode)
            },
            Node::Import(import) => return self.import(tree, id, import, mode),
            Node::Extend(targets) => self.record_extend(tree, id, targets),
            Node::Content => tree.detach(id),
            Node::FunctionDef(definition) => {
                debug!("defining function {}", definition.name);
                self.context.add_function(definition.name, tree, id);
                tree.detach(id);
            },
            Node::MixinDef(definition) => {
                debug!("defining mixin {}", definition.name);
                self.context.add_mixin(definition.name, tree, id);
                tree.detach(id);
            },
            Node::Function(call) => {
                let arguments = self.evaluate_arguments(tree, &call.arguments)?;
                self.call_function(tree, &call.name, arguments)?;
                tree.detach(id);
            },
            Node::Mixin(call) => self.include_mixin(tree, id, call)?,
            Node::NestProperties(name) => return self.nest_properties(tree, id, name, mode),
            Node::ListModify(op) => self.modify_list(tree, id, op)?,
            Node::EachDef(..) | Node::For(..) | Node::While(..) | Node::IfElseDef => {
                return self.expand_directive(tree, id, mode)
            },
            Node::If(..) | Node::Else => return Err(SassError::new(
                ErrorKind::NodeNotExpanded,
                format!("`{}` outside of an @if/@else chain", tree[id]),
            )),
        }
        Ok(Flow::Continue)
    }

    /// Walks the children of `id` in order. Whatever a child splices after
    /// itself has already been handled by that child, so the walk resumes at
    /// the sibling that followed the child beforehand.
    pub fn walk_children(&mut self, tree: &mut Tree, id: NodeId, mode: Mode) -> Result<Flow> {
        let mut current = tree.children(id).first().cloned();
        while let Some(child) = current {
            let sentinel = tree.next_sibling(child);
            if let Flow::Return(value) = self.traverse(tree, child, mode)? {
                return Ok(Flow::Return(value))
            }
            current = match sentinel {
                Some(next) if tree.parent(next) == Some(id) => Some(next),
                _ => None,
            };
        }
        Ok(Flow::Continue)
    }

    /// Walks freshly spliced nodes, skipping any an earlier one removed.
    pub fn walk_nodes(&mut self, tree: &mut Tree, nodes: &[NodeId], mode: Mode) -> Result<Flow> {
        for &node in nodes.iter() {
            if !tree.is_attached(node) {
                continue;
            }
            if let Flow::Return(value) = self.traverse(tree, node, mode)? {
                return Ok(Flow::Return(value))
            }
        }
        Ok(Flow::Continue)
    }

    fn assign_variable(&mut self, tree: &mut Tree, id: NodeId, variable: SassVariable) -> Result<()> {
        if variable.guarded && self.context.scope.is_bound(&variable.name) {
            debug!("${} already bound, skipping !default", variable.name);
        } else {
            let value = self.evaluate_expression(tree, &variable.value)?;
            debug!("${}: {}", variable.name, value);
            self.context.scope.set(variable.name, value);
        }
        tree.detach(id);
        Ok(())
    }

    fn traverse_block(&mut self, tree: &mut Tree, id: NodeId, mut rule: SassRule, mode: Mode) -> Result<Flow> {
        for s in rule.selectors.iter_mut() {
            *s = interpolate(s, &self.context.scope);
        }
        let selectors = rule.selectors.clone();
        tree[id] = Node::Block(rule);

        if let Flow::Return(value) = self.walk_children(tree, id, mode)? {
            return Ok(Flow::Return(value))
        }

        // Nested blocks move out after this one, under the combined selector.
        let nested = tree.children(id).iter().cloned()
            .filter(|&c| tree[c].is_block())
            .collect::<Vec<_>>();
        if nested.is_empty() {
            return Ok(Flow::Continue)
        }
        let parent = tree.parent_of(id)?;
        let mut anchor = id;
        for child in nested {
            if let Node::Block(ref mut inner) = tree[child] {
                inner.nest_under(&selectors);
            }
            tree.insert_after(parent, anchor, child);
            anchor = child;
        }
        Ok(Flow::Continue)
    }

    fn nest_properties(&mut self, tree: &mut Tree, id: NodeId, name: String, mode: Mode) -> Result<Flow> {
        let name = interpolate(&name, &self.context.scope);
        if let Flow::Return(value) = self.walk_children(tree, id, mode)? {
            return Ok(Flow::Return(value))
        }
        let parent = tree.parent_of(id)?;
        let mut anchor = id;
        for child in tree.children(id).to_vec() {
            if let Node::Rule(ref mut declaration) = tree[child] {
                declaration.name = format!("{}-{}", name, declaration.name);
            }
            tree.insert_after(parent, anchor, child);
            anchor = child;
        }
        tree.detach(id);
        Ok(Flow::Continue)
    }

    fn record_extend(&mut self, tree: &mut Tree, id: NodeId, targets: Vec<String>) {
        let mut ancestor = tree.parent(id);
        while let Some(a) = ancestor {
            if tree[a].is_block() {
                break;
            }
            ancestor = tree.parent(a);
        }
        match ancestor {
            Some(block) => self.context.extends.push((block, targets)),
            None => warn!("@extend {} outside of a style block is ignored", targets.join(", ")),
        }
        tree.detach(id);
    }

    fn import(&mut self, tree: &mut Tree, id: NodeId, mut import: Import, mode: Mode) -> Result<Flow> {
        import.uri = interpolate(&import.uri, &self.context.scope);
        if import.is_plain_css() {
            tree[id] = Node::Simple(import.to_css());
            return Ok(Flow::Continue)
        }

        let loaded = match self.loader {
            Some(ref mut loader) => loader.load(&import.uri)?,
            None => None,
        };
        let imported = match loaded {
            Some(imported) => imported,
            None => return Err(SassError::new(
                ErrorKind::ImportNotFound,
                format!("Import not found: {}", import.uri),
            )),
        };

        let parent = tree.parent_of(id)?;
        let mut anchor = id;
        let mut grafted = vec![];
        for &child in imported.children(imported.root()) {
            let copy = tree.graft(&imported, child);
            tree.insert_after(parent, anchor, copy);
            anchor = copy;
            grafted.push(copy);
        }
        tree.detach(id);
        debug!("imported {} node(s) from {}", grafted.len(), import.uri);
        self.walk_nodes(tree, &grafted, mode)
    }

    fn modify_list(&mut self, tree: &mut Tree, id: NodeId, op: ListModify) -> Result<()> {
        let list = self.evaluate_expression(tree, &op.list)?;
        let items = self.evaluate_expression(tree, &op.items)?;
        let comma = list_is_comma(&list, &items, op.separator.as_ref().map(|s| &s[..]));

        let result = match op.kind {
            ListOpKind::Append => {
                let mut all = list.list_items();
                all.extend(items.list_items());
                Expression::from_items(all, comma)
            },
            ListOpKind::Remove => {
                let removed = items.list_items();
                let kept = list.list_items().into_iter()
                    .filter(|item| !removed.contains(item))
                    .collect();
                Expression::from_items(kept, comma)
            },
            ListOpKind::Contains => {
                let all = list.list_items();
                Expression::boolean(items.list_items().iter().all(|item| all.contains(item)))
            },
        };
        debug!("${}: {}", op.variable, result);
        self.context.scope.set(op.variable, result);
        tree.detach(id);
        Ok(())
    }
}

/// What each kind of node may do inside a function or mixin body.
fn check_allowed(node: &Node, mode: Mode) -> Result<()> {
    match mode {
        Mode::Stylesheet => Ok(()),
        Mode::Mixin => match *node {
            Node::Keyframes(..) | Node::Media(..) | Node::FontFace |
            Node::MixinDef(..) | Node::FunctionDef(..) | Node::Import(..) => Err(SassError::new(
                ErrorKind::NotAllowedInMixin,
                format!("`{}` is not allowed in a mixin body", node),
            )),
            _ => Ok(()),
        },
        Mode::Function => match *node {
            Node::Comment(..) | Node::Function(..) | Node::FontFace | Node::MicrosoftRule { .. } |
            Node::Simple(..) | Node::Rule(..) | Node::Return(..) | Node::ListModify(..) => Ok(()),
            Node::Variable(ref v) if !v.guarded => Ok(()),
            // Expanded in place; their clones are checked one by one.
            Node::EachDef(..) | Node::For(..) | Node::While(..) | Node::IfElseDef => Ok(()),
            Node::Variable(..) | Node::KeyframeSelector(..) | Node::Keyframes(..) |
            Node::Media(..) => Err(SassError::new(
                ErrorKind::NotAllowedInFunction,
                format!("`{}` is not allowed in a function body", node),
            )),
            Node::Block(..) | Node::Content | Node::Extend(..) | Node::Mixin(..) |
            Node::NestProperties(..) | Node::FunctionDef(..) | Node::MixinDef(..) |
            Node::Import(..) | Node::If(..) | Node::Else | Node::Root => Err(SassError::new(
                ErrorKind::NodeNotExpanded,
                format!("`{}` should have already been removed", node),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::expression::Expression;
    use ast::node::{Declaration, Import, Node};
    use ast::tree::Tree;
    use compiler::Compiler;
    use error::ErrorKind;
    use resolver::ImportLoader;
    use sass::rule::SassRule;
    use sass::variable::SassVariable;

    fn block(selector: &str) -> Node {
        Node::Block(SassRule::new(vec![selector.to_string()]))
    }

    fn rule(name: &str, value: &str) -> Node {
        Node::Rule(Declaration::new(name, value.parse().unwrap()))
    }

    fn variable(name: &str, value: &str) -> Node {
        Node::Variable(SassVariable::new(name, value.parse().unwrap()))
    }

    #[test]
    fn it_assigns_variables_and_removes_them() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, variable("width", "10px"));
        tree.append_child(root, Node::Variable(SassVariable::guarded("width", "99px".parse().unwrap())));
        tree.append_child(root, Node::Variable(SassVariable::guarded("height", "5px".parse().unwrap())));
        let a = tree.append_child(root, block("a"));
        tree.append_child(a, rule("width", "$width * 2"));
        tree.append_child(a, rule("height", "$height"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("a\n  width: 20px\n  height: 5px", tree.outline());
    }

    #[test]
    fn it_flattens_nested_blocks() {
        let mut tree = Tree::new();
        let root = tree.root();
        let nav = tree.append_child(root, block("nav"));
        tree.append_child(nav, rule("margin", "0"));
        let ul = tree.append_child(nav, block("ul"));
        tree.append_child(ul, rule("padding", "0"));
        let hover = tree.append_child(ul, block("&:hover"));
        tree.append_child(hover, rule("color", "red"));
        tree.append_child(root, block("footer"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(
            "nav\n  margin: 0\nnav ul\n  padding: 0\nnav ul:hover\n  color: red\nfooter",
            tree.outline()
        );
    }

    #[test]
    fn it_interpolates_selectors() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, variable("name", "\"warning\""));
        tree.append_child(root, block(".alert-#{$name}"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(".alert-warning", tree.outline());
    }

    #[test]
    fn it_renames_nested_properties() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.append_child(root, block("a"));
        let font = tree.append_child(a, Node::NestProperties(String::from("font")));
        tree.append_child(font, rule("family", "serif"));
        tree.append_child(font, rule("size", "12px"));
        tree.append_child(a, rule("color", "red"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("a\n  font-family: serif\n  font-size: 12px\n  color: red", tree.outline());
    }

    #[test]
    fn it_applies_extends_after_the_walk() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, block(".error"));
        let serious = tree.append_child(root, block(".serious"));
        tree.append_child(serious, Node::Extend(vec![String::from(".error")]));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(".error, .serious\n.serious", tree.outline());
    }

    #[test]
    fn it_modifies_lists() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, variable("list", "a, b"));
        tree.append_child(root, Node::ListModify(ListModify {
            kind: ListOpKind::Append,
            variable: String::from("list"),
            list: "$list".parse().unwrap(),
            items: "c".parse().unwrap(),
            separator: None,
        }));
        tree.append_child(root, Node::ListModify(ListModify {
            kind: ListOpKind::Contains,
            variable: String::from("has"),
            list: "$list".parse().unwrap(),
            items: "b".parse().unwrap(),
            separator: None,
        }));
        tree.append_child(root, Node::ListModify(ListModify {
            kind: ListOpKind::Remove,
            variable: String::from("rest"),
            list: "$list".parse().unwrap(),
            items: "a".parse().unwrap(),
            separator: None,
        }));
        let a = tree.append_child(root, block("a"));
        tree.append_child(a, rule("list", "$list"));
        tree.append_child(a, rule("has", "$has"));
        tree.append_child(a, rule("rest", "$rest"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("a\n  list: a, b, c\n  has: true\n  rest: b, c", tree.outline());
    }

    #[test]
    fn it_turns_css_imports_into_plain_text() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Import(Import {
            uri: String::from("print.css"), media: None, is_url: false,
        }));
        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("@import \"print.css\";", tree.outline());
    }

    struct Partials;

    impl ImportLoader for Partials {
        fn load(&mut self, uri: &str) -> Result<Option<Tree>> {
            if uri != "colors" {
                return Ok(None)
            }
            let mut tree = Tree::new();
            let root = tree.root();
            tree.append_child(root, variable("brand", "#336699"));
            Ok(Some(tree))
        }
    }

    #[test]
    fn it_splices_imported_definitions_into_the_same_scope() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Import(Import {
            uri: String::from("colors"), media: None, is_url: false,
        }));
        let a = tree.append_child(root, block("a"));
        tree.append_child(a, rule("color", "$brand"));

        Compiler::new().with_import_loader(Partials).compile(&mut tree).unwrap();
        assert_eq!("a\n  color: #336699", tree.outline());
    }

    #[test]
    fn it_reports_missing_imports() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Import(Import {
            uri: String::from("nowhere"), media: None, is_url: false,
        }));
        let res = Compiler::new().with_import_loader(Partials).compile(&mut tree);
        assert_eq!(ErrorKind::ImportNotFound, res.unwrap_err().kind);

        let res = Compiler::new().compile(&mut tree);
        assert_eq!(ErrorKind::ImportNotFound, res.unwrap_err().kind);
    }

    #[test]
    fn it_refuses_return_outside_a_function() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Return(Expression::number(1.0)));
        let res = Compiler::new().compile(&mut tree);
        assert_eq!(ErrorKind::ReturnOutsideFunction, res.unwrap_err().kind);
    }

    #[test]
    fn it_checks_function_body_legality() {
        assert!(check_allowed(&rule("a", "1"), Mode::Function).is_ok());
        assert!(check_allowed(&variable("a", "1"), Mode::Function).is_ok());
        assert_eq!(
            ErrorKind::NotAllowedInFunction,
            check_allowed(&Node::Variable(SassVariable::guarded("a", Expression::number(1.0))), Mode::Function)
                .unwrap_err().kind
        );
        assert_eq!(
            ErrorKind::NotAllowedInFunction,
            check_allowed(&Node::Media(String::from("print")), Mode::Function).unwrap_err().kind
        );
        for node in vec![Node::Else, block("a"), Node::Content, Node::NestProperties(String::from("font"))] {
            assert_eq!(ErrorKind::NodeNotExpanded, check_allowed(&node, Mode::Function).unwrap_err().kind);
        }
        assert_eq!(
            ErrorKind::NotAllowedInMixin,
            check_allowed(&Node::FontFace, Mode::Mixin).unwrap_err().kind
        );
        assert!(check_allowed(&block("a"), Mode::Mixin).is_ok());
    }
}
