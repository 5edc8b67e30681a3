//! Module loading and import resolution.
//!
//! Modules are discovered with a worklist over `from ... import` items, depth first so import cycles can be
//! reported with the full chain.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use starkbench_core::lang::library;
use starkbench_syntax::ast::{Item, Program, Span};
use starkbench_syntax::diagnostics::CompileError;
use starkbench_syntax::{lexer, parser};
use tracing::debug;

use super::{CompilationError, CompileOptions, FileError};

/// Name of the module formed by the main files.
pub const MAIN_MODULE: &str = "__main__";

/// File extension of contract sources.
pub const SOURCE_EXTENSION: &str = "cairo";

pub(crate) struct SourceFile {
    /// Path as shown in diagnostics and debug info.
    pub display: String,
    pub source: String,
    /// Empty when the file failed to parse.
    pub ast: Program,
}

pub(crate) struct Module {
    /// `__main__` or the dotted import path.
    pub name: String,
    pub files: Vec<usize>,
}

pub(crate) struct LoadedProgram {
    pub files: Vec<SourceFile>,
    pub modules: Vec<Module>,
    /// Module indices, dependencies before the modules that import them. `__main__` comes last.
    pub order: Vec<usize>,
    pub errors: Vec<FileError>,
}

impl LoadedProgram {
    pub fn module_index(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == name)
    }
}

struct Loader<'a> {
    options: &'a CompileOptions,
    program: LoadedProgram,
    by_name: HashMap<String, usize>,
    /// Modules currently being visited, outermost first.
    stack: Vec<usize>,
}

/// Read the main files and everything they import.
///
/// Only an unreadable main file is fatal; every other problem is recorded in [`LoadedProgram::errors`].
pub(crate) fn load<P: AsRef<Path>>(paths: &[P], options: &CompileOptions) -> Result<LoadedProgram, CompilationError> {
    let mut loader = Loader {
        options,
        program: LoadedProgram {
            files: Vec::new(),
            modules: vec![Module {
                name: MAIN_MODULE.to_string(),
                files: Vec::new(),
            }],
            order: Vec::new(),
            errors: Vec::new(),
        },
        by_name: HashMap::from([(MAIN_MODULE.to_string(), 0)]),
        stack: Vec::new(),
    };

    for path in paths {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CompilationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        loader.add_file(0, path, source);
    }
    loader.visit(0);
    Ok(loader.program)
}

impl Loader<'_> {
    fn add_file(&mut self, module: usize, path: &Path, source: String) -> usize {
        let file = self.program.files.len();
        let ast = match lexer::lex(&source).and_then(|tokens| parser::parse(&tokens)) {
            Ok(ast) => ast,
            Err(errors) => {
                self.program
                    .errors
                    .extend(errors.into_iter().map(|e| FileError::new(file, e)));
                Program::default()
            }
        };
        self.program.files.push(SourceFile {
            display: path.display().to_string(),
            source,
            ast,
        });
        self.program.modules[module].files.push(file);
        file
    }

    /// Imports of a module that refer to other user modules: `(file, dotted path, span)`.
    fn user_imports(&self, module: usize) -> Vec<(usize, String, Span)> {
        let mut imports = Vec::new();
        for &file in &self.program.modules[module].files {
            for item in &self.program.files[file].ast.items {
                if let Item::Import(import) = &item.node {
                    let path = import.module_path();
                    if !library::is_library_path(&path) {
                        imports.push((file, path, import.module.span));
                    }
                }
            }
        }
        imports
    }

    fn visit(&mut self, module: usize) {
        self.stack.push(module);
        for (file, path, span) in self.user_imports(module) {
            match self.by_name.get(&path).copied() {
                Some(dep) if self.stack.contains(&dep) => {
                    let chain: Vec<&str> = self
                        .stack
                        .iter()
                        .skip_while(|m| **m != dep)
                        .map(|m| self.program.modules[*m].name.as_str())
                        .chain(std::iter::once(path.as_str()))
                        .collect();
                    let error = CompileError::import(format!("Import cycle: {}", chain.join(" -> ")), span);
                    self.program.errors.push(FileError::new(file, error));
                }
                Some(_) => {}
                None => {
                    if let Some(dep) = self.load_module(file, &path, span) {
                        self.visit(dep);
                    }
                }
            }
        }
        self.stack.pop();
        self.program.order.push(module);
    }

    fn load_module(&mut self, importing_file: usize, path: &str, span: Span) -> Option<usize> {
        let relative: PathBuf = path.split('.').collect::<PathBuf>().with_extension(SOURCE_EXTENSION);
        let Some(found) = self
            .options
            .cairo_path
            .iter()
            .map(|dir| dir.join(&relative))
            .find(|candidate| candidate.is_file())
        else {
            let searched: Vec<String> = self
                .options
                .cairo_path
                .iter()
                .map(|d| d.display().to_string())
                .collect();
            let mut error = CompileError::import(format!("Could not find module '{path}'"), span);
            error = if searched.is_empty() {
                error.with_hint("Add the directory containing the module to the cairo path")
            } else {
                error.with_note(format!("Searched for '{}' in: {}", relative.display(), searched.join(", ")))
            };
            self.program.errors.push(FileError::new(importing_file, error));
            return None;
        };

        let source = match fs::read_to_string(&found) {
            Ok(source) => source,
            Err(err) => {
                let error = CompileError::import(format!("Failed to read module '{path}': {err}"), span);
                self.program.errors.push(FileError::new(importing_file, error));
                return None;
            }
        };
        debug!(module = path, file = %found.display(), "loading module");

        let module = self.program.modules.len();
        self.program.modules.push(Module {
            name: path.to_string(),
            files: Vec::new(),
        });
        self.by_name.insert(path.to_string(), module);
        self.add_file(module, &found, source);
        Some(module)
    }
}
