//! First pass: register every module's top-level names and validate declarations.

use std::collections::HashMap;

use starkbench_core::lang::decorators::{self, DecoratorId};
use starkbench_core::lang::library::{self, LibraryItem};
use starkbench_core::lang::types::ValueType;
use starkbench_syntax::ast::*;
use starkbench_syntax::diagnostics::{CompileError, errors};

use super::FileError;
use super::const_eval;
use super::loader::{LoadedProgram, MAIN_MODULE};
use super::symbols::*;

/// Output of the first pass.
pub(crate) struct Collected {
    /// One scope per loaded module, indexed like [`LoadedProgram::modules`].
    pub scopes: Vec<ModuleScope>,
    pub table: FunctionTable,
    /// `(file, item index)` of each function's declaration, indexed by [`FunctionId`].
    pub decls: Vec<(usize, usize)>,
    /// Names from `%builtins` in the main module.
    pub builtins: Vec<String>,
    pub errors: Vec<FileError>,
}

struct Collector<'a> {
    program: &'a LoadedProgram,
    out: Collected,
    /// Entry-point names seen so far, across modules.
    entry_points: HashMap<String, Span>,
    constructor_seen: bool,
    lang_seen: bool,
}

pub(crate) fn collect(program: &LoadedProgram) -> Collected {
    let mut collector = Collector {
        program,
        out: Collected {
            scopes: program.modules.iter().map(|_| ModuleScope::default()).collect(),
            table: FunctionTable::default(),
            decls: Vec::new(),
            builtins: Vec::new(),
            errors: Vec::new(),
        },
        entry_points: HashMap::new(),
        constructor_seen: false,
        lang_seen: false,
    };

    for &module in &program.order {
        for &file in &program.modules[module].files {
            for (index, item) in program.files[file].ast.items.iter().enumerate() {
                collector.item(module, file, index, item);
            }
        }
    }

    if !collector.lang_seen {
        let first_main = program.modules[0].files.first().copied().unwrap_or_default();
        collector.error(
            first_main,
            CompileError::new("Missing '%lang starknet' directive".to_string(), Span::default())
                .with_hint("Add `%lang starknet` at the top of the main file"),
        );
    }
    collector.out
}

/// Best-effort signature for a declaration that already failed to resolve, so its body can still be checked.
fn lenient_params(params: &[TypedParam]) -> Vec<Param> {
    params
        .iter()
        .map(|p| Param {
            name: p.name.node.clone(),
            ty: match &p.ty.node {
                TypeExpr::Pointer(_) => ValueType::FeltPtr,
                TypeExpr::Named(_) => ValueType::Felt,
            },
        })
        .collect()
}

impl Collector<'_> {
    fn error(&mut self, file: usize, error: CompileError) {
        self.out.errors.push(FileError::new(file, error));
    }

    fn define(&mut self, module: usize, file: usize, name: &Spanned<Ident>, symbol: Symbol) {
        if self.out.scopes[module].define(&name.node, symbol, name.span).is_err() {
            self.error(file, errors::redefinition(&name.node, name.span));
        }
    }

    fn is_main(&self, module: usize) -> bool {
        self.program.modules[module].name == MAIN_MODULE
    }

    fn item(&mut self, module: usize, file: usize, index: usize, item: &Spanned<Item>) {
        match &item.node {
            Item::Directive(Directive::Lang(lang)) => {
                if lang.node != "starknet" {
                    self.error(
                        file,
                        CompileError::new(format!("Unsupported language '{}'", lang.node), lang.span)
                            .with_hint("Use `%lang starknet`"),
                    );
                } else if self.is_main(module) {
                    self.lang_seen = true;
                }
            }
            Item::Directive(Directive::Builtins(names)) => {
                if self.is_main(module) {
                    for name in names {
                        if !self.out.builtins.contains(&name.node) {
                            self.out.builtins.push(name.node.clone());
                        }
                    }
                }
            }
            Item::Import(import) => self.import(module, file, import),
            Item::Const(decl) => match const_eval::eval(&decl.value, &self.out.scopes[module]) {
                Ok(value) => self.define(module, file, &decl.name, Symbol::Const(value)),
                Err(error) => self.error(file, error),
            },
            Item::Function(decl) => self.function(module, file, index, decl),
        }
    }

    fn import(&mut self, module: usize, file: usize, import: &ImportDecl) {
        let path = import.module_path();
        if library::is_library_path(&path) {
            if !library::module_exists(&path) {
                self.error(
                    file,
                    CompileError::import(format!("Unknown library module '{path}'"), import.module.span),
                );
                return;
            }
            for item in &import.items {
                match library::lookup(&path, &item.name.node) {
                    Some(LibraryItem::Function(id)) => {
                        self.define(module, file, item.local_name(), Symbol::Library(id));
                    }
                    Some(LibraryItem::Struct) => self.define(module, file, item.local_name(), Symbol::BuiltinStruct),
                    None => {
                        let available = library::exported_names(&path).join(", ");
                        self.error(
                            file,
                            CompileError::import(
                                format!("Module '{path}' has no member '{}'", item.name.node),
                                item.name.span,
                            )
                            .with_note(format!("Available: {available}")),
                        );
                    }
                }
            }
            return;
        }

        // A module that failed to load has already been reported.
        let Some(dep) = self.program.module_index(&path) else {
            return;
        };
        for item in &import.items {
            match self.out.scopes[dep].lookup(&item.name.node).cloned() {
                Some(symbol) => self.define(module, file, item.local_name(), symbol),
                None => self.error(
                    file,
                    CompileError::import(
                        format!("Module '{path}' has no member '{}'", item.name.node),
                        item.name.span,
                    ),
                ),
            }
        }
    }

    fn resolve_type(&mut self, file: usize, ty: &Spanned<TypeExpr>) -> Option<ValueType> {
        match &ty.node {
            TypeExpr::Named(name) if name == "felt" => Some(ValueType::Felt),
            TypeExpr::Pointer(inner) if **inner == TypeExpr::felt() => Some(ValueType::FeltPtr),
            other => {
                self.error(
                    file,
                    CompileError::type_error(format!("Unsupported type '{other}'"), ty.span)
                        .with_note("Only 'felt' and 'felt*' are supported"),
                );
                None
            }
        }
    }

    /// Resolve parameter types and reject duplicate names. `None` if anything was wrong.
    fn params(&mut self, file: usize, params: &[TypedParam]) -> Option<Vec<Param>> {
        let mut out: Vec<Param> = Vec::with_capacity(params.len());
        let mut ok = true;
        for param in params {
            if out.iter().any(|p| p.name == param.name.node) {
                self.error(file, errors::redefinition(&param.name.node, param.name.span));
                ok = false;
                continue;
            }
            match self.resolve_type(file, &param.ty) {
                Some(ty) => out.push(Param {
                    name: param.name.node.clone(),
                    ty,
                }),
                None => ok = false,
            }
        }
        ok.then_some(out)
    }

    fn decorator(&mut self, file: usize, decl: &FunctionDecl) -> Option<DecoratorId> {
        let mut found: Option<DecoratorId> = None;
        for decorator in &decl.decorators {
            match decorators::from_str(&decorator.node) {
                None => self.error(
                    file,
                    CompileError::new(format!("Unknown decorator '@{}'", decorator.node), decorator.span)
                        .with_hint("Supported decorators: @external, @view, @constructor, @storage_var"),
                ),
                Some(id) => match found {
                    Some(previous) => self.error(
                        file,
                        CompileError::new(
                            format!(
                                "Decorator '@{}' conflicts with '@{}'",
                                decorators::as_str(id),
                                decorators::as_str(previous)
                            ),
                            decorator.span,
                        ),
                    ),
                    None => found = Some(id),
                },
            }
        }
        found
    }

    fn function(&mut self, module: usize, file: usize, index: usize, decl: &FunctionDecl) {
        let decorator = self.decorator(file, decl);
        if decorator == Some(DecoratorId::StorageVar) {
            self.storage_var(module, file, decl);
            return;
        }

        let params = self.params(file, &decl.params);
        let outputs = self.params(file, &decl.outputs);
        if let Some(decorator) = decorator {
            self.check_entry_point(file, decl, decorator, params.as_deref(), outputs.as_deref());
        }

        let id = self.out.table.functions.len() as FunctionId;
        self.out.table.functions.push(FunctionSig {
            qualified_name: format!("{}.{}", self.program.modules[module].name, decl.name.node),
            name: decl.name.node.clone(),
            module,
            params: params.unwrap_or_else(|| lenient_params(&decl.params)),
            outputs: outputs.unwrap_or_else(|| lenient_params(&decl.outputs)),
            decorator,
        });
        self.out.decls.push((file, index));
        self.define(module, file, &decl.name, Symbol::Function(id));
    }

    fn check_entry_point(
        &mut self,
        file: usize,
        decl: &FunctionDecl,
        decorator: DecoratorId,
        params: Option<&[Param]>,
        outputs: Option<&[Param]>,
    ) {
        let name = &decl.name;
        // Entry points from different modules share one selector space.
        if self.entry_points.insert(name.node.clone(), name.span).is_some() {
            self.error(
                file,
                errors::redefinition(&name.node, name.span).with_note("Entry point names must be unique in a contract"),
            );
        }

        if decorator == DecoratorId::Constructor {
            if name.node != "constructor" {
                self.error(
                    file,
                    CompileError::new("A constructor must be named 'constructor'".to_string(), name.span),
                );
            }
            if !decl.outputs.is_empty() {
                self.error(
                    file,
                    CompileError::new("A constructor cannot return values".to_string(), decl.header_span),
                );
            }
            if std::mem::replace(&mut self.constructor_seen, true) {
                self.error(
                    file,
                    CompileError::new("A contract can have at most one constructor".to_string(), name.span),
                );
            }
        }

        for (what, declared, resolved) in [("argument", &decl.params, params), ("output", &decl.outputs, outputs)] {
            let Some(resolved) = resolved else { continue };
            for (i, param) in resolved.iter().enumerate() {
                if param.ty != ValueType::FeltPtr {
                    continue;
                }
                let expected_len = format!("{}_len", param.name);
                let has_len = i > 0 && resolved[i - 1].name == expected_len && resolved[i - 1].ty == ValueType::Felt;
                if !has_len {
                    self.error(
                        file,
                        CompileError::type_error(
                            format!(
                                "Array {what} '{}' of an entry point must be preceded by '{expected_len} : felt'",
                                param.name
                            ),
                            declared[i].name.span,
                        ),
                    );
                }
            }
        }
    }

    fn storage_var(&mut self, module: usize, file: usize, decl: &FunctionDecl) {
        let mut keys = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            if param.ty.node != TypeExpr::felt() {
                self.error(
                    file,
                    CompileError::type_error(
                        format!("Storage variable keys must be 'felt', found '{}'", param.ty.node),
                        param.ty.span,
                    ),
                );
            }
            keys.push(param.name.node.clone());
        }
        if !matches!(decl.outputs.as_slice(), [single] if single.ty.node == TypeExpr::felt()) {
            self.error(
                file,
                CompileError::type_error(
                    "A storage variable must have exactly one 'felt' output".to_string(),
                    decl.header_span,
                ),
            );
        }
        if let Some(first) = decl.body.first() {
            self.error(
                file,
                CompileError::new("A storage variable must have an empty body".to_string(), first.span),
            );
        }

        let id = self.out.table.storage_vars.len() as StorageVarId;
        self.out.table.storage_vars.push(StorageVarSig {
            name: decl.name.node.clone(),
            keys,
        });
        self.define(module, file, &decl.name, Symbol::StorageVar(id));
    }
}
