//! Compiler tests over real files in a scratch directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use starkbench_core::hash::get_selector_from_name;

use super::*;
use crate::definition::{AbiEntry, Instruction};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_temp_dir() -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("starkbench_compiler_test_{ts}_{pid}_{id}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, relative: &str, source: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, source).unwrap();
    path
}

fn options(dir: &Path) -> CompileOptions {
    CompileOptions::new().with_debug_info(true).with_cairo_path(dir)
}

fn compile_source(source: &str) -> Result<ContractDefinition, CompilationError> {
    let dir = unique_temp_dir();
    let main = write(&dir, "main.cairo", source);
    compile_starknet_file(&main, &options(&dir))
}

fn compile_ok(source: &str) -> ContractDefinition {
    match compile_source(source) {
        Ok(definition) => definition,
        Err(CompilationError::Source(failure)) => panic!("Unexpected errors: {:?}", failure.messages()),
        Err(other) => panic!("Unexpected error: {other}"),
    }
}

fn compile_errors(source: &str) -> Vec<String> {
    match compile_source(source) {
        Ok(_) => panic!("Expected compilation to fail"),
        Err(CompilationError::Source(failure)) => failure.messages().into_iter().map(String::from).collect(),
        Err(other) => panic!("Expected source errors, got: {other}"),
    }
}

fn assert_error_contains(source: &str, needle: &str) {
    let errors = compile_errors(source);
    assert!(
        errors.iter().any(|e| e.contains(needle)),
        "Expected an error containing {needle:?}, got {errors:?}"
    );
}

const AMM_LIKE: &str = r#"
%lang starknet
from starkware.starknet.common.syscalls import call_contract, get_contract_address

@view
func forever_one() -> (res : felt):
    return (res=1)
end

@external
func call_self{syscall_ptr : felt*}(selector : felt) -> (retdata_len : felt, retdata : felt*):
    let (address) = get_contract_address()
    let (retdata_size, retdata) = call_contract(
        contract_address=address, function_selector=selector, calldata_size=0, calldata=new ())
    return (retdata_len=retdata_size, retdata=retdata)
end
"#;

// ============================================================================
// Output shape
// ============================================================================

#[test]
fn test_entry_points_sorted_by_selector() {
    let definition = compile_ok(AMM_LIKE);
    let external = &definition.entry_points_by_type.external;
    assert_eq!(external.len(), 2);
    assert!(external[0].selector < external[1].selector);

    let forever_one = get_selector_from_name("forever_one");
    let entry = external.iter().find(|e| e.selector == forever_one).unwrap();
    let function = &definition.program.functions[entry.function as usize];
    assert_eq!(function.name, "__main__.forever_one");
    assert_eq!(function.n_outputs, 1);
    assert!(definition.entry_points_by_type.constructor.is_empty());
}

#[test]
fn test_abi_in_declaration_order() {
    let definition = compile_ok(AMM_LIKE);
    let lines: Vec<String> = definition
        .abi
        .iter()
        .map(|entry| {
            let (kind, f) = match entry {
                AbiEntry::Function(f) => ("function", f),
                AbiEntry::Constructor(f) => ("constructor", f),
            };
            let params = |ps: &[crate::definition::AbiParam]| {
                ps.iter()
                    .map(|p| format!("{}: {}", p.name, p.ty))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "{kind} {}({}) -> ({}){}",
                f.name,
                params(&f.inputs),
                params(&f.outputs),
                if f.is_view() { " [view]" } else { "" }
            )
        })
        .collect();
    insta::assert_snapshot!(lines.join("\n"), @r"
    function forever_one() -> (res: felt) [view]
    function call_self(selector: felt) -> (retdata_len: felt, retdata: felt*)
    ");
}

#[test]
fn test_forever_one_bytecode() {
    let definition = compile_ok(AMM_LIKE);
    let function = definition.program.function_index("__main__.forever_one").unwrap() as usize;
    assert_eq!(
        definition.program.functions[function].code,
        vec![Instruction::PushConst(1u64.into()), Instruction::Return]
    );
}

#[test]
fn test_debug_info_covers_every_instruction() {
    let definition = compile_ok(AMM_LIKE);
    let debug = definition.program.debug_info.as_ref().unwrap();
    assert_eq!(debug.files.len(), 1);
    assert!(debug.files[0].ends_with("main.cairo"));
    for (function, locations) in definition.program.functions.iter().zip(&debug.instruction_locations) {
        assert_eq!(function.code.len(), locations.len(), "{}", function.name);
    }
    // `return (res=1)` is on line 7.
    let forever_one = definition.program.function_index("__main__.forever_one").unwrap() as usize;
    assert_eq!(debug.instruction_locations[forever_one][1].line, 7);
}

#[test]
fn test_no_debug_info_by_default() {
    let dir = unique_temp_dir();
    let main = write(&dir, "main.cairo", AMM_LIKE);
    let definition = compile_starknet_file(&main, &CompileOptions::new()).unwrap();
    assert!(definition.program.debug_info.is_none());
}

#[test]
fn test_if_else_jumps_stay_in_bounds() {
    let definition = compile_ok(
        r#"
%lang starknet

@view
func sign(x) -> (res):
    if x == 0:
        return (res=0)
    else:
        let y = x * 2
        if y != 4:
            return (res=y)
        end
    end
    return (res=1)
end
"#,
    );
    let code = &definition.program.functions[0].code;
    for instruction in code {
        if let Instruction::Jump(t) | Instruction::JumpIfZero(t) | Instruction::JumpIfNonZero(t) = instruction {
            assert!((*t as usize) <= code.len());
        }
    }
    assert_eq!(code.last(), Some(&Instruction::Return));
}

#[test]
fn test_storage_accessors_lower_to_storage_instructions() {
    let definition = compile_ok(
        r#"
%lang starknet

@storage_var
func balance(user : felt) -> (res : felt):
end

@external
func bump(user : felt):
    let (current) = balance.read(user)
    balance.write(user, current + 1)
    return ()
end
"#,
    );
    assert_eq!(definition.program.storage_vars, vec!["balance".to_string()]);
    let code = &definition.program.functions[0].code;
    assert!(code.contains(&Instruction::StorageAddr { var: 0, n_keys: 1 }));
    assert!(code.contains(&Instruction::StorageRead));
    assert!(code.contains(&Instruction::StorageWrite));
}

#[test]
fn test_constructor_entry_point() {
    let definition = compile_ok(
        r#"
%lang starknet

@storage_var
func owner() -> (res : felt):
end

@constructor
func constructor(initial_owner : felt):
    owner.write(initial_owner)
    return ()
end
"#,
    );
    assert_eq!(definition.entry_points_by_type.constructor.len(), 1);
    assert!(definition.entry_points_by_type.external.is_empty());
    assert!(matches!(definition.abi[0], AbiEntry::Constructor(_)));
}

// ============================================================================
// Imports
// ============================================================================

#[test]
fn test_user_module_import() {
    let dir = unique_temp_dir();
    write(
        &dir,
        "lib/arith.cairo",
        r#"
%lang starknet

const SCALE = 3

func scale(x) -> (res):
    return (res=x * SCALE)
end
"#,
    );
    let main = write(
        &dir,
        "main.cairo",
        r#"
%lang starknet
from lib.arith import scale, SCALE

@view
func tripled(x) -> (res, factor):
    let (res) = scale(x)
    return (res=res, factor=SCALE)
end
"#,
    );
    let definition = compile_starknet_file(&main, &options(&dir)).unwrap();
    assert!(definition.program.function_index("lib.arith.scale").is_some());
    assert_eq!(definition.entry_points_by_type.external.len(), 1);
}

#[test]
fn test_missing_module() {
    assert_error_contains(
        "%lang starknet\nfrom nope.missing import f\n",
        "Could not find module 'nope.missing'",
    );
}

#[test]
fn test_import_cycle() {
    let dir = unique_temp_dir();
    write(&dir, "a.cairo", "from b import g\nfunc f():\n    return ()\nend\n");
    write(&dir, "b.cairo", "from a import f\nfunc g():\n    return ()\nend\n");
    let main = write(&dir, "main.cairo", "%lang starknet\nfrom a import f\n");
    let Err(CompilationError::Source(failure)) = compile_starknet_file(&main, &options(&dir)) else {
        panic!("Expected an import cycle error");
    };
    assert!(failure.messages().iter().any(|m| m.contains("Import cycle: a -> b -> a")));
}

#[test]
fn test_unknown_library_member() {
    assert_error_contains(
        "%lang starknet\nfrom starkware.cairo.common.math import assert_magic\n",
        "has no member 'assert_magic'",
    );
}

// ============================================================================
// Fatal errors
// ============================================================================

#[test]
fn test_missing_main_file_is_read_error() {
    let dir = unique_temp_dir();
    let result = compile_starknet_file(dir.join("does_not_exist.cairo"), &options(&dir));
    assert!(matches!(result, Err(CompilationError::Read { .. })));
}

#[test]
fn test_no_sources() {
    let paths: [&Path; 0] = [];
    let result = compile_starknet_files(&paths, &CompileOptions::new());
    assert!(matches!(result, Err(CompilationError::NoSources)));
}

// ============================================================================
// Checking
// ============================================================================

#[test]
fn test_missing_lang_directive() {
    assert_error_contains("func f():\n    return ()\nend\n", "Missing '%lang starknet' directive");
}

#[test]
fn test_unknown_identifier() {
    assert_error_contains(
        "%lang starknet\nfunc f() -> (res):\n    return (res=y)\nend\n",
        "Unknown identifier 'y'",
    );
}

#[test]
fn test_arity_mismatch() {
    assert_error_contains(
        r#"
%lang starknet
from starkware.cairo.common.math import assert_le

func f(a):
    assert_le(a)
    return ()
end
"#,
        "Wrong number of arguments for 'assert_le': expected 2, found 1",
    );
}

#[test]
fn test_named_argument_out_of_order() {
    assert_error_contains(
        r#"
%lang starknet
from starkware.cairo.common.math import assert_le

func f(x, y):
    assert_le(b=y, a=x)
    return ()
end
"#,
        "Unexpected argument 'b' for 'assert_le'; expected 'a'",
    );
}

#[test]
fn test_pointer_passed_as_felt() {
    assert_error_contains(
        r#"
%lang starknet
from starkware.cairo.common.math import assert_not_zero

func f():
    let arr = new (1, 2)
    assert_not_zero(arr)
    return ()
end
"#,
        "Type mismatch: expected 'felt', found 'felt*'",
    );
}

#[test]
fn test_call_inside_expression() {
    assert_error_contains(
        r#"
%lang starknet

func one() -> (res):
    return (res=1)
end

func f() -> (res):
    let x = one() + 1
    return (res=x)
end
"#,
        "Call to 'one' cannot be used inside an expression",
    );
}

#[test]
fn test_missing_final_return() {
    assert_error_contains(
        "%lang starknet\nfunc f() -> (res):\n    let x = 1\nend\n",
        "Function 'f' must end with a 'return' statement",
    );
}

#[test]
fn test_branch_bindings_not_visible_after_end() {
    assert_error_contains(
        r#"
%lang starknet

func f(x) -> (res):
    if x == 0:
        let y = 1
    end
    return (res=y)
end
"#,
        "Unknown identifier 'y'",
    );
}

#[test]
fn test_local_requires_alloc_locals() {
    assert_error_contains(
        "%lang starknet\nfunc f():\n    local x : felt = 1\n    return ()\nend\n",
        "Local variables require 'alloc_locals'",
    );
}

#[test]
fn test_unpack_count_mismatch() {
    assert_error_contains(
        r#"
%lang starknet
from starkware.starknet.common.syscalls import get_contract_address

func f():
    let (a, b) = get_contract_address()
    return ()
end
"#,
        "Expected 2 value(s) on the left, 'get_contract_address' returns 1",
    );
}

#[test]
fn test_return_values_out_of_order() {
    assert_error_contains(
        "%lang starknet\nfunc f() -> (a, b):\n    return (b=1, a=2)\nend\n",
        "Expected return value 'a', found 'b'",
    );
}

#[test]
fn test_entry_point_array_needs_len() {
    assert_error_contains(
        "%lang starknet\n@external\nfunc f(values : felt*):\n    return ()\nend\n",
        "must be preceded by 'values_len : felt'",
    );
}

#[test]
fn test_storage_var_called_directly() {
    assert_error_contains(
        r#"
%lang starknet

@storage_var
func counter() -> (res : felt):
end

func f():
    let (x) = counter()
    return ()
end
"#,
        "Storage variable 'counter' cannot be called directly",
    );
}

#[test]
fn test_errors_are_accumulated() {
    let errors = compile_errors(
        r#"
%lang starknet

func f() -> (res):
    return (res=a)
end

func g() -> (res):
    return (res=b)
end
"#,
    );
    assert_eq!(errors.len(), 2, "{errors:?}");
}

// ============================================================================
// Hints
// ============================================================================

const ARBITRARY_HINT: &str = r#"
%lang starknet

func f():
    %{ print("hello") %}
    return ()
end
"#;

#[test]
fn test_arbitrary_hint_rejected() {
    assert_error_contains(ARBITRARY_HINT, "Hint is not whitelisted");
}

#[test]
fn test_arbitrary_hint_accepted_without_validation() {
    let dir = unique_temp_dir();
    let main = write(&dir, "main.cairo", ARBITRARY_HINT);
    let definition = compile_starknet_file(&main, &options(&dir).with_disable_hint_validation(true)).unwrap();
    assert_eq!(definition.program.hints.len(), 1);
    assert!(definition.program.functions[0].code.contains(&Instruction::Hint(0)));
}

#[test]
fn test_whitelisted_hint_accepted() {
    compile_ok("%lang starknet\nfunc f():\n    %{ memory[ap] = segments.add() %}\n    return ()\nend\n");
}
