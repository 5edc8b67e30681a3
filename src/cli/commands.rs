//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use starkbench_core::Felt;
use starkbench_core::hash::get_selector_from_name;
use starkbench_syntax::diagnostics::{self, CompileError};
use starkbench_syntax::{lexer, parser};

use super::{CliError, CliResult, ExitCode};
use crate::compiler::{CompileOptions, compile_starknet_files};
use crate::runtime::{CallArg, ResultValue, Starknet, TransactionExecutionInfo};

/// Maximum source file size (100 MB)
///
/// Files larger than this are rejected to prevent out-of-memory conditions
/// during compilation.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read a source file, with a user-facing error message.
pub fn read_source(path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", path.display(), e)))
}

/// Render a diagnostic with miette's graphical handler.
fn render(error: impl Diagnostic + Send + Sync + 'static) -> CliError {
    CliError::failure(format!("{:?}", miette::Report::new(error)))
}

fn format_errors(path: &Path, source: &str, errors: &[CompileError]) -> CliError {
    let name = path.display().to_string();
    let mut msg = String::new();
    for err in errors {
        msg.push_str(&diagnostics::format_error(&name, source, err));
    }
    CliError::failure(msg.trim_end())
}

// ============================================================================
// Argument parsing
// ============================================================================

/// Parse a felt: decimal, `0x` hex, negative, or a `'short string'`.
pub fn parse_felt(text: &str) -> Result<Felt, String> {
    let text = text.trim();
    if let Some(short) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return Felt::from_short_string(short).map_err(|e| e.to_string());
    }
    text.parse::<Felt>().map_err(|e| e.to_string())
}

/// Parse a call argument: a felt, or `[a,b,...]` for an array.
pub fn parse_call_arg(text: &str) -> Result<CallArg, String> {
    let text = text.trim();
    let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) else {
        return parse_felt(text).map(CallArg::Felt);
    };
    if inner.trim().is_empty() {
        return Ok(CallArg::Array(Vec::new()));
    }
    inner
        .split(',')
        .map(parse_felt)
        .collect::<Result<Vec<_>, _>>()
        .map(CallArg::Array)
}

pub fn compile_options(cairo_path: Vec<PathBuf>, debug_info: bool, disable_hint_validation: bool) -> CompileOptions {
    CompileOptions {
        debug_info,
        disable_hint_validation,
        cairo_path,
    }
}

// ============================================================================
// Debug commands
// ============================================================================

/// Tokenize and display tokens.
pub fn lex_file(path: &Path) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let tokens = lexer::lex(&source).map_err(|errs| format_errors(path, &source, &errs))?;
    for tok in &tokens {
        println!("{:?}", tok);
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse and display AST.
pub fn parse_file(path: &Path) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let tokens = lexer::lex(&source).map_err(|errs| format_errors(path, &source, &errs))?;
    let ast = parser::parse(&tokens).map_err(|errs| format_errors(path, &source, &errs))?;
    println!("{:#?}", ast);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Commands
// ============================================================================

/// Compile and write the definition (or only the ABI) as JSON.
pub fn compile(files: &[PathBuf], options: &CompileOptions, output: Option<&Path>, abi_only: bool) -> CliResult<ExitCode> {
    let definition = compile_starknet_files(files, options).map_err(render)?;
    let json = if abi_only {
        serde_json::to_string_pretty(&definition.abi)
    } else {
        definition.to_json()
    }
    .map_err(|e| CliError::failure(format!("Error serializing contract: {e}")))?;

    match output {
        Some(path) => fs::write(path, json + "\n")
            .map_err(|e| CliError::failure(format!("Error writing '{}': {}", path.display(), e)))?,
        None => println!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn selectors(names: &[String]) -> CliResult<ExitCode> {
    for name in names {
        println!("{name}: {:#x}", get_selector_from_name(name));
    }
    Ok(ExitCode::SUCCESS)
}

fn format_value(value: &ResultValue) -> String {
    match value {
        ResultValue::Felt(felt) => felt.to_string(),
        ResultValue::Array(values) => {
            let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn print_result(info: &TransactionExecutionInfo, with_events: bool) {
    for (name, value) in info.result.iter() {
        println!("{name} = {}", format_value(value));
    }
    if with_events {
        for event in info.call_info.all_events() {
            let keys: Vec<String> = event.keys.iter().map(|k| format!("{k:#x}")).collect();
            let data: Vec<String> = event.data.iter().map(|d| d.to_string()).collect();
            println!(
                "event from {:#x}: keys [{}] data [{}]",
                event.from_address,
                keys.join(", "),
                data.join(", ")
            );
        }
    }
    println!("steps: {}", info.call_info.steps);
}

/// Compile, deploy into a fresh ledger and call `function`.
pub fn call(
    file: &Path,
    options: &CompileOptions,
    function: &str,
    args: Vec<CallArg>,
    invoke: bool,
    caller: Option<Felt>,
) -> CliResult<ExitCode> {
    let definition = compile_starknet_files(&[file], options).map_err(render)?;
    let event_loop = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::failure(format!("Error starting runtime: {e}")))?;

    let info = event_loop
        .block_on(async {
            let starknet = Starknet::empty().await;
            let contract = starknet.deploy(definition).await?;
            let mut invocation = contract.method(function, args)?;
            if let Some(caller) = caller {
                invocation = invocation.with_caller(caller);
            }
            if invoke { invocation.invoke().await } else { invocation.call().await }
        })
        .map_err(|e| CliError::failure(format!("Error: {e}")))?;

    print_result(&info, invoke);
    Ok(ExitCode::SUCCESS)
}
