#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on correctness of specific syntactic forms and on the parser’s
/// error recovery behavior (avoiding cascaded errors).
mod tests {
    use super::*;
    use crate::diagnostics::format_error;
    use crate::lexer;

    fn parse_str(source: &str) -> Result<Program, Vec<CompileError>> {
        let tokens = lexer::lex(source)?;
        parse(&tokens)
    }

    fn only_function(program: &Program) -> &FunctionDecl {
        let functions: Vec<&FunctionDecl> = program
            .items
            .iter()
            .filter_map(|item| match &item.node {
                Item::Function(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(functions.len(), 1, "expected exactly one function");
        functions[0]
    }

    #[test]
    fn test_parse_entry_point_with_implicits() {
        let source = r#"
%lang starknet
from starkware.starknet.common.syscalls import call_contract, get_contract_address as me

@external
func call_self{syscall_ptr : felt*, range_check_ptr}(selector : felt) -> (
    retdata_len : felt, retdata : felt*
):
    let (address) = me()
    let (retdata_size, retdata) = call_contract(
        contract_address=address, function_selector=selector, calldata_size=0, calldata=new ())
    return (retdata_len=retdata_size, retdata=retdata)
end
"#;
        let program = parse_str(source).unwrap();
        assert_eq!(program.items.len(), 3);

        match &program.items[1].node {
            Item::Import(import) => {
                assert_eq!(import.module_path(), "starkware.starknet.common.syscalls");
                assert_eq!(import.items.len(), 2);
                assert_eq!(import.items[1].local_name().node, "me");
            }
            other => panic!("Expected import, got {other:?}"),
        }

        let f = only_function(&program);
        assert_eq!(f.name.node, "call_self");
        assert_eq!(f.decorators[0].node, "external");
        assert_eq!(f.implicit_args.len(), 2);
        assert_eq!(f.implicit_args[1].ty.node, TypeExpr::felt());
        assert_eq!(f.params.len(), 1);
        assert_eq!(f.outputs[1].ty.node, TypeExpr::Pointer(Box::new(TypeExpr::felt())));
        assert_eq!(f.body.len(), 3);

        match &f.body[1].node {
            Stmt::Unpack { names, call } => {
                assert_eq!(names.len(), 2);
                assert_eq!(call.node.args.len(), 4);
                assert_eq!(call.node.args[3].value.node, Expr::New(vec![]));
            }
            other => panic!("Expected unpack, got {other:?}"),
        }
        match &f.body[2].node {
            Stmt::Return(values) => {
                assert_eq!(values.len(), 2);
                assert_eq!(values[0].name.as_ref().map(|n| n.node.as_str()), Some("retdata_len"));
            }
            other => panic!("Expected return, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_storage_var_and_accessors() {
        let source = r#"
@storage_var
func balance(user : felt) -> (res : felt):
end

func bump(user):
    let (current) = balance.read(user)
    balance.write(user, current + 1)
    return ()
end
"#;
        let program = parse_str(source).unwrap();
        assert_eq!(program.items.len(), 2);
        let Item::Function(bump) = &program.items[1].node else {
            panic!("Expected function");
        };
        match &bump.body[1].node {
            Stmt::Call(CallExpr {
                target: CallTarget::Storage { var, accessor },
                args,
            }) => {
                assert_eq!(var.node, "balance");
                assert_eq!(accessor.node, "write");
                assert_eq!(args.len(), 2);
            }
            other => panic!("Expected storage write, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_if_else_and_with_attr() {
        let source = r#"
func check(x) -> (res):
    with_attr error_message("x must not be 3"):
        assert_not_equal(x, 3)
    end
    if x == 0:
        return (res=1)
    else:
        return (0)
    end
end
"#;
        let program = parse_str(source).unwrap();
        let f = only_function(&program);
        assert!(matches!(&f.body[0].node, Stmt::WithAttr { message, body, .. }
            if message.node == "x must not be 3" && body.len() == 1));
        match &f.body[1].node {
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                assert_eq!(cond.op, CompareOp::Eq);
                assert_eq!(then_body.len(), 1);
                assert_eq!(else_body.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("Expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_mul_binds_tighter() {
        let program = parse_str("const X = 1 + 2 * 3\n").unwrap();
        let Item::Const(c) = &program.items[0].node else {
            panic!("Expected const");
        };
        match &c.value.node {
            Expr::Binary { op, rhs, .. } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(rhs.node, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("Expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_short_string_and_hex_literals() {
        let program = parse_str("const A = 'ab'\nconst B = 0x6162\n").unwrap();
        let values: Vec<&Expr> = program
            .items
            .iter()
            .map(|item| match &item.node {
                Item::Const(c) => &c.value.node,
                other => panic!("Expected const, got {other:?}"),
            })
            .collect();
        assert_eq!(values[0], values[1]);
    }

    #[test]
    fn test_literal_out_of_range_is_error() {
        let source = "const P = 0x800000000000011000000000000000000000000000000000000000000000001\n";
        let errs = parse_str(source).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("Invalid integer literal"));
    }

    #[test]
    fn test_recovers_after_bad_statement() {
        let source = r#"
func f() -> ():
    let = 1
    local y = 2
    tempvar = 3
    return ()
end
"#;
        let errs = parse_str(source).unwrap_err();
        assert_eq!(errs.len(), 2, "one error per bad line: {errs:?}");
    }

    #[test]
    fn test_non_call_expression_statement_is_error() {
        let errs = parse_str("func f():\n    1 + 2\nend\n").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("only calls can be used as statements"));
    }

    #[test]
    fn test_top_level_statement_is_single_error() {
        let errs = parse_str("let x = 1\nfunc f():\nend\n").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.starts_with("Expected declaration"));
    }

    #[test]
    fn test_missing_end_is_error() {
        let errs = parse_str("func f():\n    return ()\n").unwrap_err();
        assert!(errs.iter().any(|e| e.message.contains("Expected 'end'")));
    }

    #[test]
    fn test_unknown_directive() {
        let errs = parse_str("%lang starknet\n%builtin pedersen\n").unwrap_err();
        assert!(errs[0].message.contains("Unknown directive '%builtin'"));
    }

    #[test]
    fn test_rendered_error_snapshot() {
        let source = "const X = 1 +\n";
        let errs = parse_str(source).unwrap_err();
        let rendered = format_error("x.cairo", source, &errs[0]);
        insta::assert_snapshot!(rendered, @r"
        syntax error: Expected expression, found end of line
          --> x.cairo:1:14
            |
          1 | const X = 1 +
            |              ^
        ");
    }
}
