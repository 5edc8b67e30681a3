//! Constant folding for `const NAME = <expr>`.

use starkbench_core::Felt;
use starkbench_syntax::ast::{BinaryOp, Expr, Spanned};
use starkbench_syntax::diagnostics::{CompileError, errors};

use super::symbols::{ModuleScope, Symbol};

/// Evaluate a constant expression: literals, other constants, `+ - * /` and negation.
pub fn eval(expr: &Spanned<Expr>, scope: &ModuleScope) -> Result<Felt, CompileError> {
    match &expr.node {
        Expr::Int(value) => Ok(value.clone()),
        Expr::Name(name) => match scope.lookup(name) {
            Some(Symbol::Const(value)) => Ok(value.clone()),
            Some(other) => Err(CompileError::type_error(
                format!("'{name}' is a {}, not a constant", other.describe()),
                expr.span,
            )),
            None => Err(errors::unknown_identifier(name, expr.span)
                .with_note("Constants can only refer to constants defined above them")),
        },
        Expr::Neg(inner) => Ok(-eval(inner, scope)?),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, scope)?;
            let rhs = eval(rhs, scope)?;
            match op {
                BinaryOp::Add => Ok(lhs + rhs),
                BinaryOp::Sub => Ok(lhs - rhs),
                BinaryOp::Mul => Ok(lhs * rhs),
                BinaryOp::Div => lhs.checked_div(&rhs).ok_or_else(|| {
                    CompileError::new("Division by zero in constant expression".to_string(), expr.span)
                }),
            }
        }
        Expr::Index { .. } | Expr::New(_) | Expr::Call(_) => Err(CompileError::type_error(
            "Expected a constant expression".to_string(),
            expr.span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starkbench_syntax::ast::{Item, Span};
    use starkbench_syntax::{lexer, parser};

    fn const_expr(source: &str) -> Spanned<Expr> {
        let tokens = lexer::lex(source).unwrap();
        let program = parser::parse(&tokens).unwrap();
        match &program.items[0].node {
            Item::Const(c) => c.value.clone(),
            other => panic!("Expected const, got {other:?}"),
        }
    }

    #[test]
    fn test_eval_uses_field_arithmetic() {
        let mut scope = ModuleScope::default();
        scope.define("BASE", Symbol::Const(Felt::from(10u64)), Span::default()).unwrap();
        let value = eval(&const_expr("const X = BASE * 3 - 1\n"), &scope).unwrap();
        assert_eq!(value, Felt::from(29u64));
        let negative = eval(&const_expr("const Y = 0 - 1\n"), &scope).unwrap();
        assert_eq!(negative, -Felt::one());
    }

    #[test]
    fn test_eval_division_is_field_division() {
        let scope = ModuleScope::default();
        let value = eval(&const_expr("const X = 1 / 2\n"), &scope).unwrap();
        assert_eq!(value * Felt::from(2u64), Felt::one());
        let err = eval(&const_expr("const Z = 1 / 0\n"), &scope).unwrap_err();
        assert!(err.message.contains("Division by zero"));
    }

    #[test]
    fn test_eval_unknown_name() {
        let scope = ModuleScope::default();
        let err = eval(&const_expr("const X = LATER + 1\n"), &scope).unwrap_err();
        assert_eq!(err.message, "Unknown identifier 'LATER'");
    }
}
