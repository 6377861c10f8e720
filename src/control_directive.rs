use ast::expression::Expression;
use ast::node::{EachDef, ForDef, Node};
use ast::tree::{NodeId, Tree};
use compiler::Compiler;
use condition::{normalize_strings, Literal};
use error::{Result, SassError, ErrorKind};
use scope::FrameKind;
use substituter::{replace_interpolation, substitute_condition};
use traverse::{Flow, Mode};

impl Compiler {
    /// Expands `@for`, `@each`, `@while` and `@if` in place. The directive
    /// itself never survives.
    pub fn expand_directive(&mut self, tree: &mut Tree, id: NodeId, mode: Mode) -> Result<Flow> {
        let parent = tree.parent_of(id)?;
        let sentinel = tree.next_sibling(id);

        let flow = match tree[id].clone() {
            Node::For(def) => self.expand_for(tree, parent, id, sentinel, def, mode)?,
            Node::EachDef(def) => self.expand_each(tree, parent, id, sentinel, def, mode)?,
            Node::While(condition) => self.expand_while(tree, parent, id, sentinel, &condition, mode)?,
            Node::IfElseDef => return self.expand_if_else(tree, parent, id, mode),
            other => return Err(SassError::new(
                ErrorKind::InvalidDirective,
                format!("`{}` is not a control directive", other),
            )),
        };

        tree.set_children(id, vec![]);
        tree.remove(parent, id);
        Ok(flow)
    }

    fn expand_for(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        id: NodeId,
        sentinel: Option<NodeId>,
        def: ForDef,
        mode: Mode,
    ) -> Result<Flow> {
        let from = self.for_bound(tree, &def.from, "from")?;
        let to = self.for_bound(tree, &def.to, "to")?;
        if from > to {
            return Err(SassError::new(
                ErrorKind::InvalidDirective,
                format!("Invalid @for in scss file, 'from' ({}) is greater than 'to' ({})", from, to),
            ))
        }
        debug!("@for ${} from {} {} {}", def.variable, from, if def.inclusive { "through" } else { "to" }, to);

        let last = if def.inclusive { Some(to) } else { None };
        for i in (from..to).chain(last) {
            let bound = Some((def.variable.clone(), Expression::number(i as f64)));
            if let Flow::Return(value) = self.expand_pass(tree, parent, id, sentinel, bound, mode)? {
                return Ok(Flow::Return(value))
            }
        }
        Ok(Flow::Continue)
    }

    fn for_bound(&mut self, tree: &mut Tree, expr: &Expression, which: &str) -> Result<i64> {
        let value = self.evaluate_expression(tree, expr)?;
        value.as_integer().ok_or_else(|| SassError::new(
            ErrorKind::InvalidDirective,
            format!("Invalid @for in scss file, '{}' is not an integer expression : {}", which, value),
        ))
    }

    fn expand_each(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        id: NodeId,
        sentinel: Option<NodeId>,
        def: EachDef,
        mode: Mode,
    ) -> Result<Flow> {
        let list = self.evaluate_expression(tree, &def.list)?;
        let items = list.list_items();
        debug!("@each ${} over {} item(s)", def.variable, items.len());

        for item in items {
            let bound = Some((def.variable.clone(), item));
            if let Flow::Return(value) = self.expand_pass(tree, parent, id, sentinel, bound, mode)? {
                return Ok(Flow::Return(value))
            }
        }
        Ok(Flow::Continue)
    }

    fn expand_while(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        id: NodeId,
        sentinel: Option<NodeId>,
        condition: &str,
        mode: Mode,
    ) -> Result<Flow> {
        let mut passes = 0;
        while self.condition_holds(condition)? {
            passes += 1;
            if let Flow::Return(value) = self.expand_pass(tree, parent, id, sentinel, None, mode)? {
                return Ok(Flow::Return(value))
            }
        }
        debug!("@while {} ran {} time(s)", condition, passes);
        Ok(Flow::Continue)
    }

    /// Splices the body of `@if` or `@else if` whose condition holds, or of
    /// the `@else`, in place of the whole chain.
    fn expand_if_else(&mut self, tree: &mut Tree, parent: NodeId, id: NodeId, mode: Mode) -> Result<Flow> {
        let mut chosen = None;
        for branch in tree.children(id).to_vec() {
            let holds = match tree[branch] {
                Node::If(ref condition) => {
                    let condition = condition.clone();
                    self.condition_holds(&condition)?
                },
                Node::Else => true,
                _ => false,
            };
            if holds {
                chosen = Some(branch);
                break;
            }
        }

        let mut moved = vec![];
        if let Some(branch) = chosen {
            let mut anchor = id;
            for child in tree.children(branch).to_vec() {
                tree.insert_after(parent, anchor, child);
                anchor = child;
                moved.push(child);
            }
        }
        tree.set_children(id, vec![]);
        tree.remove(parent, id);
        self.walk_nodes(tree, &moved, mode)
    }

    /// One loop iteration: clones the directive's body after the output of
    /// the previous passes and walks the clones with `bound` in scope.
    fn expand_pass(
        &mut self,
        tree: &mut Tree,
        parent: NodeId,
        id: NodeId,
        sentinel: Option<NodeId>,
        bound: Option<(String, Expression)>,
        mode: Mode,
    ) -> Result<Flow> {
        self.with_scope(FrameKind::Loop, |compiler| {
            if let Some((name, value)) = bound {
                compiler.context.scope.define(name, value);
            }
            let mut anchor = insertion_anchor(tree, parent, id, sentinel);
            let mut clones = vec![];
            for child in tree.children(id).to_vec() {
                let copy = tree.clone_subtree(child);
                replace_interpolation(tree, copy, compiler.context.scope.innermost());
                tree.insert_after(parent, anchor, copy);
                anchor = copy;
                clones.push(copy);
            }
            compiler.walk_nodes(tree, &clones, mode)
        })
    }

    /// Substitutes the live scope into a condition and asks the boolean
    /// evaluator about it. Anything but a boolean is an error.
    pub fn condition_holds(&mut self, condition: &str) -> Result<bool> {
        let text = normalize_strings(&substitute_condition(condition, &self.context.scope));
        trace!("condition `{}` became `{}`", condition, text);
        match self.conditions.evaluate(&text) {
            Ok(Literal::Bool(b)) => Ok(b),
            Ok(other) => Err(SassError::new(
                ErrorKind::InvalidCondition,
                format!("Invalid condition `{}`: evaluates to {} instead of a boolean", condition, other),
            )),
            Err(message) => Err(SassError::new(
                ErrorKind::InvalidCondition,
                format!("Invalid condition `{}`: {}", condition, message),
            )),
        }
    }
}

/// The node the next pass goes after: whatever now sits right before the
/// directive's original next sibling, or the parent's last child.
fn insertion_anchor(tree: &Tree, parent: NodeId, id: NodeId, sentinel: Option<NodeId>) -> NodeId {
    let children = tree.children(parent);
    let before = match sentinel.and_then(|s| tree.position(parent, s)) {
        Some(0) => None,
        Some(pos) => children.get(pos - 1).cloned(),
        None => children.last().cloned(),
    };
    before.unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use ast::expression::Expression;
    use ast::node::{Declaration, EachDef, ForDef, Node};
    use ast::tree::{NodeId, Tree};
    use compiler::Compiler;
    use condition::{ConditionEvaluator, Literal};
    use error::ErrorKind;
    use sass::rule::SassRule;
    use sass::variable::SassVariable;

    fn block(selector: &str) -> Node {
        Node::Block(SassRule::new(vec![selector.to_string()]))
    }

    fn rule(name: &str, value: &str) -> Node {
        Node::Rule(Declaration::new(name, value.parse().unwrap()))
    }

    fn for_loop(tree: &mut Tree, parent: NodeId, from: &str, to: &str, inclusive: bool) -> NodeId {
        tree.append_child(parent, Node::For(ForDef {
            variable: String::from("i"),
            from: from.parse().unwrap(),
            to: to.parse().unwrap(),
            inclusive: inclusive,
        }))
    }

    #[test]
    fn it_expands_for_in_ascending_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, block("before"));
        let directive = for_loop(&mut tree, root, "1", "3", false);
        let body = tree.append_child(directive, block(".col-#{$i}"));
        tree.append_child(body, rule("width", "$i * 10px"));
        tree.append_child(root, block("after"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(
            "before\n.col-1\n  width: 10px\n.col-2\n  width: 20px\nafter",
            tree.outline()
        );
        assert!(!tree.is_attached(directive));
    }

    #[test]
    fn it_includes_the_upper_bound_with_through() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = for_loop(&mut tree, root, "1", "3", true);
        tree.append_child(directive, rule("n", "$i"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("n: 1\nn: 2\nn: 3", tree.outline());
    }

    #[test]
    fn it_reaches_the_largest_integer_with_through() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = for_loop(&mut tree, root, "9223372036854775807", "9223372036854775807", true);
        tree.append_child(directive, block(".edge"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(".edge", tree.outline());
    }

    #[test]
    fn it_produces_nothing_for_an_empty_range() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = for_loop(&mut tree, root, "2", "2", false);
        tree.append_child(directive, rule("n", "$i"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("", tree.outline());
    }

    #[test]
    fn it_refuses_an_inverted_for() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = for_loop(&mut tree, root, "3", "1", false);
        tree.append_child(directive, rule("n", "$i"));

        let res = Compiler::new().compile(&mut tree);
        assert_eq!(ErrorKind::InvalidDirective, res.unwrap_err().kind);
        assert_eq!(vec![directive], tree.children(root).to_vec());
    }

    #[test]
    fn it_refuses_a_non_integer_for() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = for_loop(&mut tree, root, "1.5", "3", false);
        tree.append_child(directive, rule("n", "$i"));

        let err = Compiler::new().compile(&mut tree).unwrap_err();
        assert_eq!(ErrorKind::InvalidDirective, err.kind);
        assert_eq!(
            "Invalid @for in scss file, 'from' is not an integer expression : 1.5",
            err.message
        );
    }

    #[test]
    fn it_expands_each_in_list_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = tree.append_child(root, Node::EachDef(EachDef {
            variable: String::from("name"),
            list: "puma, sea-slug, egret".parse().unwrap(),
        }));
        let body = tree.append_child(directive, block(".#{$name}-icon"));
        tree.append_child(body, rule("icon", "$name"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(
            vec![".puma-icon", ".sea-slug-icon", ".egret-icon"],
            tree.children(root).iter().map(|&c| tree[c].to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn it_removes_each_over_an_empty_list() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Variable(SassVariable::new("empty", Expression::default())));
        let directive = tree.append_child(root, Node::EachDef(EachDef {
            variable: String::from("x"),
            list: "$empty".parse().unwrap(),
        }));
        tree.append_child(directive, rule("n", "$x"));

        Compiler::new().compile(&mut tree).unwrap();
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn it_runs_while_until_the_condition_fails() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Variable(SassVariable::new("i", Expression::number(6.0))));
        let directive = tree.append_child(root, Node::While(String::from("$i > 0")));
        let body = tree.append_child(directive, block(".item-#{$i}"));
        tree.append_child(body, rule("width", "2em * $i"));
        tree.append_child(directive, Node::Variable(SassVariable::new("i", "$i - 2".parse().unwrap())));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(
            ".item-6\n  width: 12em\n.item-4\n  width: 8em\n.item-2\n  width: 4em",
            tree.outline()
        );
    }

    #[test]
    fn it_removes_a_while_that_never_runs() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = tree.append_child(root, Node::While(String::from("1 > 2")));
        tree.append_child(directive, rule("n", "1"));

        Compiler::new().compile(&mut tree).unwrap();
        assert!(tree.children(root).is_empty());
    }

    #[test]
    fn it_refuses_a_non_boolean_condition() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = tree.append_child(root, Node::While(String::from("1 + 1")));
        tree.append_child(directive, rule("n", "1"));

        let res = Compiler::new().compile(&mut tree);
        assert_eq!(ErrorKind::InvalidCondition, res.unwrap_err().kind);
    }

    struct Failing;

    impl ConditionEvaluator for Failing {
        fn evaluate(&self, _: &str) -> ::std::result::Result<Literal, String> {
            Err(String::from("evaluator exploded"))
        }
    }

    #[test]
    fn it_reports_evaluator_failures_with_the_condition() {
        let mut tree = Tree::new();
        let root = tree.root();
        let directive = tree.append_child(root, Node::While(String::from("$x == 1")));
        tree.append_child(directive, rule("n", "1"));

        let err = Compiler::new().with_condition_evaluator(Failing).compile(&mut tree).unwrap_err();
        assert_eq!(ErrorKind::InvalidCondition, err.kind);
        assert!(err.message.contains("$x == 1"));
    }

    #[test]
    fn it_picks_the_first_true_branch() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Variable(SassVariable::new("theme", "\"dark\"".parse().unwrap())));
        let chain = tree.append_child(root, Node::IfElseDef);
        let light = tree.append_child(chain, Node::If(String::from("$theme == light")));
        tree.append_child(light, rule("color", "black"));
        let dark = tree.append_child(chain, Node::If(String::from("$theme == dark")));
        tree.append_child(dark, rule("color", "white"));
        let other = tree.append_child(chain, Node::Else);
        tree.append_child(other, rule("color", "gray"));
        tree.append_child(root, rule("after", "1"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("color: white\nafter: 1", tree.outline());
    }

    #[test]
    fn it_falls_back_to_else_or_nothing() {
        let mut tree = Tree::new();
        let root = tree.root();
        let chain = tree.append_child(root, Node::IfElseDef);
        let never = tree.append_child(chain, Node::If(String::from("false")));
        tree.append_child(never, rule("a", "1"));
        let other = tree.append_child(chain, Node::Else);
        tree.append_child(other, rule("b", "2"));
        let lone = tree.append_child(root, Node::IfElseDef);
        let no = tree.append_child(lone, Node::If(String::from("1 == 2")));
        tree.append_child(no, rule("c", "3"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("b: 2", tree.outline());
    }

    #[test]
    fn it_compares_strings_holding_quotes() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.append_child(root, Node::Variable(SassVariable::new("s", "\"it's\"".parse().unwrap())));
        let chain = tree.append_child(root, Node::IfElseDef);
        let same = tree.append_child(chain, Node::If(String::from("$s == \"it's\"")));
        tree.append_child(same, rule("a", "1"));
        let other = tree.append_child(chain, Node::Else);
        tree.append_child(other, rule("b", "2"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!("a: 1", tree.outline());
    }

    #[test]
    fn it_expands_nested_loops_per_iteration() {
        let mut tree = Tree::new();
        let root = tree.root();
        let outer = for_loop(&mut tree, root, "1", "2", true);
        let inner = tree.append_child(outer, Node::EachDef(EachDef {
            variable: String::from("s"),
            list: "a b".parse().unwrap(),
        }));
        tree.append_child(inner, block(".#{$s}-#{$i}"));

        Compiler::new().compile(&mut tree).unwrap();
        assert_eq!(".a-1\n.b-1\n.a-2\n.b-2", tree.outline());
    }
}
