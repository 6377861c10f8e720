use ast::expression::Expression;
use error::{Result, SassError, ErrorKind};
use sass::variable::SassVariable;

/// The value a formal parameter ends up with for one call.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    /// Passed by the caller, already evaluated in the caller's scope.
    Given(Expression),
    /// Omitted; the default still has to be evaluated in the callee's scope.
    Default(Expression),
}

/// Pairs positional arguments with formal parameters. Trailing parameters
/// with defaults may be omitted; anything else is an argument mismatch.
pub fn collate_arguments(
    definition: &str,
    parameters: &[SassVariable],
    arguments: Vec<Expression>,
) -> Result<Vec<(String, Argument)>> {

    if arguments.len() > parameters.len() {
        return Err(mismatch(definition, parameters.len(), arguments.len()))
    }

    let given = arguments.len();
    let mut arguments = arguments.into_iter();
    let mut collated = Vec::with_capacity(parameters.len());

    for p in parameters.iter() {
        let argument = match arguments.next() {
            Some(value) => Argument::Given(value),
            None => match p.default_value() {
                Some(default) => Argument::Default(default.clone()),
                None => return Err(mismatch(definition, parameters.len(), given)),
            },
        };
        collated.push((p.name.clone(), argument));
    }

    Ok(collated)
}

fn mismatch(definition: &str, expected: usize, given: usize) -> SassError {
    SassError::new(
        ErrorKind::ArgumentMismatch,
        format!(
            "Arguments for {} do not match definition: expected {}, got {}",
            definition, expected, given,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::expression::Expression;
    use error::ErrorKind;
    use sass::variable::SassVariable;

    fn params() -> Vec<SassVariable> {
        vec![
            SassVariable::parameter("n"),
            SassVariable::new("factor", Expression::number(2.0)),
        ]
    }

    #[test]
    fn it_pairs_positional_arguments() {
        let res = collate_arguments("scale", &params(), vec![
            Expression::number(5.0), Expression::number(3.0),
        ]).unwrap();
        assert_eq!(
            vec![
                (String::from("n"), Argument::Given(Expression::number(5.0))),
                (String::from("factor"), Argument::Given(Expression::number(3.0))),
            ],
            res
        );
    }

    #[test]
    fn it_falls_back_to_defaults() {
        let res = collate_arguments("scale", &params(), vec![Expression::number(5.0)]).unwrap();
        assert_eq!(
            (String::from("factor"), Argument::Default(Expression::number(2.0))),
            res[1]
        );
    }

    #[test]
    fn it_rejects_too_many_or_too_few_arguments() {
        let too_many = collate_arguments("scale", &params(), vec![
            Expression::number(1.0), Expression::number(2.0), Expression::number(3.0),
        ]);
        assert_eq!(ErrorKind::ArgumentMismatch, too_many.unwrap_err().kind);

        let too_few = collate_arguments("scale", &params(), vec![]);
        assert_eq!(ErrorKind::ArgumentMismatch, too_few.unwrap_err().kind);
    }

    #[test]
    fn it_accepts_no_arguments_for_no_parameters() {
        assert_eq!(Ok(vec![]), collate_arguments("reset", &[], vec![]));
    }
}
