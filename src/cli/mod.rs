//! Command-line front end.
//!
//! `compile` writes a contract's JSON definition (or only its ABI), `selector` prints entry-point selectors, and
//! `call` deploys a contract into a throwaway ledger and runs one function. `--lex` and `--parse` dump the frontend's
//! intermediate output.
//!
//! Commands report failure through [`CliError`]; [`run`] is the only function that exits the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::runtime::CallArg;

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// A failed command: the text printed to stderr and the status to exit with.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Compile, deploy and exercise StarkNet-style contracts in memory
#[derive(Parser, Debug)]
#[command(name = "starkbench", version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile, deploy and exercise StarkNet-style contracts in memory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print the token stream of FILE and stop
    #[arg(long = "lex", value_name = "FILE")]
    pub lex_file: Option<PathBuf>,

    /// Print the syntax tree of FILE and stop
    #[arg(long = "parse", value_name = "FILE", conflicts_with = "lex_file")]
    pub parse_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a contract to its JSON definition
    Compile {
        /// Main source files of the contract
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Write the output here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
        /// Directory searched for imported modules (repeatable)
        #[arg(long = "cairo-path", value_name = "DIR")]
        cairo_path: Vec<PathBuf>,
        /// Omit instruction source locations
        #[arg(long)]
        no_debug_info: bool,
        /// Accept hints that are not whitelisted
        #[arg(long)]
        disable_hint_validation: bool,
        /// Print only the ABI
        #[arg(long)]
        abi: bool,
    },

    /// Print the selector of each entry-point name
    Selector {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },

    /// Deploy a contract into a fresh ledger and call one of its functions
    Call {
        /// Contract source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Function to call
        #[arg(value_name = "FUNCTION")]
        function: String,
        /// Arguments: felts (`12`, `0x1f`, `'abc'`) or arrays (`[1,2,3]`)
        #[arg(value_name = "ARG", value_parser = commands::parse_call_arg, allow_negative_numbers = true)]
        args: Vec<CallArg>,
        /// Directory searched for imported modules (repeatable)
        #[arg(long = "cairo-path", value_name = "DIR")]
        cairo_path: Vec<PathBuf>,
        /// Commit the call as a transaction and print the emitted events
        #[arg(long)]
        invoke: bool,
        /// Caller address seen by the contract
        #[arg(long, value_name = "ADDRESS", value_parser = commands::parse_felt)]
        caller: Option<starkbench_core::Felt>,
        /// Accept hints that are not whitelisted
        #[arg(long)]
        disable_hint_validation: bool,
    },
}

/// Parse `std::env::args`, run the command and exit with its status.
pub fn run() {
    let status = match execute(Cli::parse()) {
        Ok(status) => status,
        Err(err) => {
            if !err.message.is_empty() {
                eprintln!("{err}");
            }
            err.exit_code
        }
    };
    if status != ExitCode::SUCCESS {
        process::exit(status.0);
    }
}

fn execute(cli: Cli) -> CliResult<ExitCode> {
    if let Some(file) = cli.lex_file {
        return commands::lex_file(&file);
    }
    if let Some(file) = cli.parse_file {
        return commands::parse_file(&file);
    }

    let Some(command) = cli.command else {
        return Err(CliError::failure("No command given; run `starkbench --help` for usage"));
    };
    match command {
        Command::Compile {
            files,
            output,
            cairo_path,
            no_debug_info,
            disable_hint_validation,
            abi,
        } => {
            let options = commands::compile_options(cairo_path, !no_debug_info, disable_hint_validation);
            commands::compile(&files, &options, output.as_deref(), abi)
        }
        Command::Selector { names } => commands::selectors(&names),
        Command::Call {
            file,
            function,
            args,
            cairo_path,
            invoke,
            caller,
            disable_hint_validation,
        } => {
            let options = commands::compile_options(cairo_path, true, disable_hint_validation);
            commands::call(&file, &options, &function, args, invoke, caller)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use starkbench_core::Felt;

    #[test]
    fn test_cli_parse_compile() {
        let cli = Cli::try_parse_from([
            "starkbench",
            "compile",
            "amm.cairo",
            "--cairo-path",
            "contracts",
            "--abi",
            "-o",
            "amm.json",
        ])
        .unwrap();
        let Some(Command::Compile {
            files,
            output,
            cairo_path,
            no_debug_info,
            abi,
            ..
        }) = cli.command
        else {
            panic!("Expected Compile command");
        };
        assert_eq!(files, vec![PathBuf::from("amm.cairo")]);
        assert_eq!(output, Some(PathBuf::from("amm.json")));
        assert_eq!(cairo_path, vec![PathBuf::from("contracts")]);
        assert!(!no_debug_info);
        assert!(abi);
    }

    #[test]
    fn test_cli_compile_requires_a_file() {
        assert!(Cli::try_parse_from(["starkbench", "compile"]).is_err());
    }

    #[test]
    fn test_cli_parse_selector() {
        let cli = Cli::try_parse_from(["starkbench", "selector", "forever_one", "call_self"]).unwrap();
        let Some(Command::Selector { names }) = cli.command else {
            panic!("Expected Selector command");
        };
        assert_eq!(names, vec!["forever_one", "call_self"]);
    }

    #[test]
    fn test_cli_parse_call_args() {
        let cli = Cli::try_parse_from([
            "starkbench",
            "call",
            "amm.cairo",
            "sum",
            "12",
            "-1",
            "[1,2,3]",
            "--caller",
            "0x10",
            "--invoke",
        ])
        .unwrap();
        let Some(Command::Call {
            function,
            args,
            caller,
            invoke,
            ..
        }) = cli.command
        else {
            panic!("Expected Call command");
        };
        assert_eq!(function, "sum");
        assert_eq!(
            args,
            vec![
                CallArg::Felt(Felt::from(12u64)),
                CallArg::Felt(-Felt::one()),
                CallArg::Array(vec![Felt::from(1u64), Felt::from(2u64), Felt::from(3u64)]),
            ]
        );
        assert_eq!(caller, Some(Felt::from(16u64)));
        assert!(invoke);
    }

    #[test]
    fn test_cli_rejects_bad_felt() {
        assert!(Cli::try_parse_from(["starkbench", "call", "amm.cairo", "f", "12abc"]).is_err());
    }

    #[test]
    fn test_cli_parse_debug_flags() {
        let cli = Cli::try_parse_from(["starkbench", "--lex", "amm.cairo"]).unwrap();
        assert!(cli.lex_file.is_some());

        let cli = Cli::try_parse_from(["starkbench", "--parse", "amm.cairo"]).unwrap();
        assert!(cli.parse_file.is_some());
    }
}
