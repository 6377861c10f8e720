use ast::expression::{Expression, FunctionCall, Unit};
use ast::node::Node;
use ast::tree::{NodeId, Tree};
use error::Result;
use scope::Bindings;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static INTERPOLATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\{\s*\$([\w-]+)\s*\}").expect("interpolation pattern")
});

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([\w-]+)").expect("variable pattern")
});

/// What a chain walk puts in place of the units that can change.
pub trait Substitute {
    /// The value of `$name`, or `None` to leave the reference in place.
    fn variable(&mut self, name: &str) -> Option<Expression>;

    /// The result of a call, or `None` to keep the call with its parameters
    /// substituted.
    fn function(&mut self, call: &FunctionCall) -> Result<Option<Expression>>;
}

/// Replaces variables and calls throughout a chain, including inside
/// function parameters and nested lists.
///
/// At the top of a chain a multi-unit value is spliced flat; inside function
/// parameters a comma list is wrapped so it remains a single argument.
pub fn replace_units<S: Substitute + ?Sized>(units: &[Unit], nested: bool, with: &mut S) -> Result<Vec<Unit>> {
    let mut result = Vec::with_capacity(units.len());
    for unit in units.iter() {
        match *unit {
            Unit::Variable(ref name) => match with.variable(name) {
                Some(value) => splice_value(&mut result, value, nested),
                None => result.push(unit.clone()),
            },
            Unit::Function(ref call) => match with.function(call)? {
                Some(value) => splice_value(&mut result, value, nested),
                None => result.push(Unit::Function(FunctionCall {
                    name: call.name.clone(),
                    parameters: Expression::new(replace_units(&call.parameters.units, true, with)?),
                })),
            },
            Unit::List(ref inner) => {
                result.push(Unit::List(Expression::new(replace_units(&inner.units, true, with)?)))
            },
            ref other => result.push(other.clone()),
        }
    }
    Ok(result)
}

fn splice_value(units: &mut Vec<Unit>, value: Expression, nested: bool) {
    if nested && value.has_top_level_comma() {
        units.push(Unit::List(value));
    } else {
        units.extend(value.units);
    }
}

/// Resolves `#{$name}` in selectors, property names and other plain text.
pub fn interpolate<B: Bindings + ?Sized>(text: &str, bindings: &B) -> String {
    if !text.contains("#{") {
        return text.to_string()
    }
    INTERPOLATION.replace_all(text, |caps: &Captures| {
        match bindings.lookup(&caps[1]) {
            Some(value) => value.unquoted(),
            None => caps[0].to_string(),
        }
    }).into_owned()
}

/// Writes the text of every bound `$name` into a condition. Quoted strings
/// keep their quotes so the boolean evaluator still sees a string.
pub fn substitute_condition<B: Bindings + ?Sized>(condition: &str, bindings: &B) -> String {
    VARIABLE.replace_all(condition, |caps: &Captures| {
        match bindings.lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    }).into_owned()
}

/// Resolves interpolation through a freshly cloned subtree so that its
/// selectors, property names and media queries reflect `bindings` instead of
/// the text captured at parse time. Nested definitions are left alone; their
/// bodies are resolved when they are invoked.
pub fn replace_interpolation<B: Bindings + ?Sized>(tree: &mut Tree, id: NodeId, bindings: &B) {
    match tree[id] {
        Node::FunctionDef(..) | Node::MixinDef(..) => return,
        _ => {},
    }
    match tree[id] {
        Node::Block(ref mut rule) => {
            for s in rule.selectors.iter_mut() {
                *s = interpolate(s, bindings);
            }
        },
        Node::Rule(ref mut declaration) => {
            declaration.name = interpolate(&declaration.name, bindings);
        },
        Node::NestProperties(ref mut name) |
        Node::Media(ref mut name) |
        Node::Simple(ref mut name) => {
            *name = interpolate(name, bindings);
        },
        Node::KeyframeSelector(ref mut selectors) |
        Node::Extend(ref mut selectors) => {
            for s in selectors.iter_mut() {
                *s = interpolate(s, bindings);
            }
        },
        Node::Keyframes(ref mut keyframes) => {
            keyframes.name = interpolate(&keyframes.name, bindings);
        },
        Node::Import(ref mut import) => {
            import.uri = interpolate(&import.uri, bindings);
        },
        _ => {},
    }
    for child in tree.children(id).to_vec() {
        replace_interpolation(tree, child, bindings);
    }
}
