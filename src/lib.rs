#[macro_use] extern crate log;
extern crate once_cell;
extern crate regex;

pub mod ast {
    pub mod expression;
    pub mod node;
    pub mod number_value;
    pub mod tree;
}

pub mod sass {
    pub mod color_value;
    pub mod function;
    pub mod mixin;
    pub mod parameters;
    pub mod rule;
    pub mod variable;
}

pub mod error;
pub mod operator;
pub mod value_tokenizer;
pub mod scope;
pub mod context;
pub mod substituter;
pub mod expression_evaluator;
pub mod condition;
pub mod traverse;
pub mod resolver;
pub mod compiler;

mod evaluator;
mod control_directive;
mod invocation;

pub use ast::expression::{Expression, Unit};
pub use ast::node::Node;
pub use ast::tree::{NodeId, Tree};
pub use compiler::Compiler;
pub use condition::{ConditionEvaluator, Literal};
pub use error::{ErrorKind, Result, SassError};
pub use resolver::{ImportLoader, ImportPathResolver, Resolver};

/// Expands `tree` in place with a fresh compiler: no imports, the built-in
/// condition evaluator.
pub fn compile(tree: &mut Tree) -> Result<()> {
    Compiler::new().compile(tree)
}
