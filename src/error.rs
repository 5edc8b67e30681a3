//! Crate-level error for callers that compile and deploy in one go (the fixture layer and the CLI).

use miette::Diagnostic;
use thiserror::Error;

use crate::compiler::CompilationError;
use crate::runtime::StarknetError;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompilationError),

    #[error(transparent)]
    Starknet(#[from] StarknetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
