use ast::expression::Expression;
use sass::variable::SassVariable;

/// The head of a `@mixin` or `@function` definition; the body lives in the
/// tree as the definition node's children.
#[derive(Clone, Debug, PartialEq)]
pub struct SassMixin {
    pub name: String,
    pub parameters: Vec<SassVariable>,
}

/// An `@include name(args)` or a statement-level function call.
#[derive(Clone, Debug, PartialEq)]
pub struct SassMixinCall {
    pub name: String,
    pub arguments: Expression,
}

impl SassMixin {
    pub fn new<S: Into<String>>(name: S, parameters: Vec<SassVariable>) -> SassMixin {
        SassMixin { name: name.into(), parameters: parameters }
    }
}

impl SassMixinCall {
    pub fn new<S: Into<String>>(name: S, arguments: Expression) -> SassMixinCall {
        SassMixinCall { name: name.into(), arguments: arguments }
    }
}
