//! Contract compiler: source files in, [`ContractDefinition`] out.
//!
//! ## Notes
//!
//! - **Loading** ([`loader`]): the main files form the `__main__` module. Imports resolve against the built-in
//!   `starkware.*` library registry or, for any other dotted path `a.b`, against `a/b.cairo` under the configured
//!   search path.
//! - **Collection** ([`collect`]): the first pass registers every module's constants, storage variables and function
//!   signatures, and validates decorators and entry-point conventions.
//! - **Lowering** ([`lower`]): the second pass checks each function body and emits stack-machine bytecode, with source
//!   locations when debug info is requested.
//! - **Error accumulation**: every stage reports as many errors as it can; they are returned together as one
//!   [`CompileFailure`].

mod collect;
mod const_eval;
mod hints;
mod loader;
mod lower;
mod symbols;
#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use starkbench_syntax::diagnostics::{CompileError, SourceDiagnostic};
use thiserror::Error;
use tracing::debug;

use crate::definition::ContractDefinition;
use loader::LoadedProgram;

/// Options for [`compile_starknet_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Record the source location of every instruction.
    pub debug_info: bool,
    /// Accept any hint instead of only whitelisted ones.
    pub disable_hint_validation: bool,
    /// Directories searched for imported modules, in order.
    pub cairo_path: Vec<PathBuf>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.debug_info = enabled;
        self
    }

    pub fn with_disable_hint_validation(mut self, disabled: bool) -> Self {
        self.disable_hint_validation = disabled;
        self
    }

    /// Append a directory to the import search path.
    pub fn with_cairo_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cairo_path.push(dir.into());
        self
    }
}

/// Errors from [`compile_starknet_files`].
#[derive(Debug, Error, Diagnostic)]
pub enum CompilationError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No source files given")]
    NoSources,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] CompileFailure),
}

/// Every error found in the sources, each with its own file and span.
#[derive(Debug, Error, Diagnostic)]
#[error("Compilation failed with {} error(s)", diagnostics.len())]
pub struct CompileFailure {
    #[related]
    pub diagnostics: Vec<SourceDiagnostic>,
}

impl CompileFailure {
    /// Error messages without source context, in report order.
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

/// An error attributed to one loaded file.
#[derive(Debug, Clone)]
pub(crate) struct FileError {
    pub file: usize,
    pub error: CompileError,
}

impl FileError {
    pub fn new(file: usize, error: CompileError) -> Self {
        Self { file, error }
    }
}

fn failure(program: &LoadedProgram, errors: &[FileError]) -> CompilationError {
    let diagnostics = errors
        .iter()
        .map(|e| {
            let file = &program.files[e.file];
            e.error.to_diagnostic(&file.display, &file.source)
        })
        .collect();
    CompilationError::Source(CompileFailure { diagnostics })
}

/// Compile one contract from its main source files.
///
/// ## Errors
///
/// - [`CompilationError::Read`] if a main file cannot be read.
/// - [`CompilationError::Source`] for every lexing, parsing, import and checking error.
#[tracing::instrument(skip_all, fields(files = paths.len(), debug_info = options.debug_info))]
pub fn compile_starknet_files<P: AsRef<Path>>(
    paths: &[P],
    options: &CompileOptions,
) -> Result<ContractDefinition, CompilationError> {
    if paths.is_empty() {
        return Err(CompilationError::NoSources);
    }
    let program = loader::load(paths, options)?;
    if !program.errors.is_empty() {
        return Err(failure(&program, &program.errors));
    }
    debug!(modules = program.modules.len(), files = program.files.len(), "sources loaded");

    let collected = collect::collect(&program);
    let lowered = lower::lower(&program, &collected, options);

    let mut errors = collected.errors.clone();
    errors.extend(lowered.errors.iter().cloned());
    if !errors.is_empty() {
        return Err(failure(&program, &errors));
    }
    Ok(lowered.into_definition(&collected))
}

/// Compile a single file.
pub fn compile_starknet_file(path: impl AsRef<Path>, options: &CompileOptions) -> Result<ContractDefinition, CompilationError> {
    compile_starknet_files(&[path.as_ref()], options)
}
