use ast::expression::{Expression, FunctionCall};
use ast::tree::Tree;
use compiler::Compiler;
use error::Result;
use expression_evaluator::{contains_arithmetic_operator, ExpressionEvaluator};
use sass::function::{call_builtin, is_builtin};
use substituter::{replace_units, Substitute};

impl Compiler {
    /// Reduces a value against the live scope: variables are substituted,
    /// known functions are called and their results replace the call, and
    /// arithmetic is applied when the chain asked for it.
    pub fn evaluate_expression(&mut self, tree: &mut Tree, expr: &Expression) -> Result<Expression> {
        let arithmetic = contains_arithmetic_operator(expr);
        let substituted = self.replace_variables(tree, expr)?;
        if arithmetic {
            ExpressionEvaluator::evaluate(substituted)
        } else {
            Ok(substituted)
        }
    }

    /// Substitutes the live scope into a chain without doing any arithmetic.
    pub fn replace_variables(&mut self, tree: &mut Tree, expr: &Expression) -> Result<Expression> {
        let mut live = LiveScope { compiler: self, tree: tree };
        Ok(Expression::new(replace_units(&expr.units, false, &mut live)?))
    }

    /// Splits a parameter chain at its top-level commas and evaluates every
    /// argument on its own.
    pub fn evaluate_arguments(&mut self, tree: &mut Tree, parameters: &Expression) -> Result<Vec<Expression>> {
        let mut arguments = vec![];
        for argument in parameters.split_arguments() {
            arguments.push(self.evaluate_expression(tree, &argument)?);
        }
        Ok(arguments)
    }

    /// Built-ins first, then user functions. `None` is a void function.
    pub fn call_function(&mut self, tree: &mut Tree, name: &str, arguments: Vec<Expression>) -> Result<Option<Expression>> {
        if let Some(result) = call_builtin(name, &arguments)? {
            return Ok(Some(result))
        }
        self.invoke_function(tree, name, arguments)
    }
}

/// The compiler's current scope and function tables, as seen by a chain walk.
struct LiveScope<'a> {
    compiler: &'a mut Compiler,
    tree: &'a mut Tree,
}

impl<'a> Substitute for LiveScope<'a> {
    fn variable(&mut self, name: &str) -> Option<Expression> {
        let value = self.compiler.context.scope.get(name).cloned();
        if value.is_none() {
            warn!("${} is not defined", name);
        }
        value
    }

    fn function(&mut self, call: &FunctionCall) -> Result<Option<Expression>> {
        if !is_builtin(&call.name) && !self.compiler.context.has_function(&call.name) {
            trace!("{}() is left for the browser", call.name);
            return Ok(None)
        }
        let arguments = self.compiler.evaluate_arguments(self.tree, &call.parameters)?;
        let value = self.compiler.call_function(self.tree, &call.name, arguments)?;
        Ok(Some(value.unwrap_or_default()))
    }
}
