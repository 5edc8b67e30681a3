//! Second pass: check function bodies and emit bytecode.
//!
//! Bodies are checked and lowered in one walk. Every expression reports its type (`felt` or `felt*`), or `None`
//! after an error has already been reported for it, so one mistake does not cascade.

use std::collections::HashMap;

use starkbench_core::errors::HINT_NOT_WHITELISTED_MSG;
use starkbench_core::hash::get_selector_from_name;
use starkbench_core::lang::decorators::DecoratorId;
use starkbench_core::lang::library;
use starkbench_core::lang::types::ValueType;
use starkbench_syntax::ast::*;
use starkbench_syntax::diagnostics::{CompileError, errors, get_line_info};

use super::collect::Collected;
use super::hints;
use super::loader::LoadedProgram;
use super::symbols::{FunctionSig, ModuleScope, Param, Symbol};
use super::{CompileOptions, FileError};
use crate::definition::{
    AbiEntry, AbiFunction, AbiParam, ContractDefinition, DebugInfo, EntryPoint, EntryPointsByType, FunctionCode,
    Instruction, Location, Program as BytecodeProgram,
};

/// Name that discards a value in `let (_, x) = f()`.
const DISCARD: &str = "_";

/// Output of the second pass.
pub(crate) struct Lowered {
    pub functions: Vec<FunctionCode>,
    locations: Vec<Vec<Location>>,
    error_messages: Vec<String>,
    hints: Vec<String>,
    /// File names for debug info; `None` when debug info is off.
    debug_files: Option<Vec<String>>,
    pub errors: Vec<FileError>,
}

pub(crate) fn lower(program: &LoadedProgram, collected: &Collected, options: &CompileOptions) -> Lowered {
    let mut lowered = Lowered {
        functions: Vec::with_capacity(collected.table.functions.len()),
        locations: Vec::new(),
        error_messages: Vec::new(),
        hints: Vec::new(),
        debug_files: options
            .debug_info
            .then(|| program.files.iter().map(|f| f.display.clone()).collect()),
        errors: Vec::new(),
    };

    for (sig, &(file, index)) in collected.table.functions.iter().zip(&collected.decls) {
        let mut lowerer = FunctionLowerer {
            collected,
            options,
            source: &program.files[file].source,
            file,
            scope: &collected.scopes[sig.module],
            sig,
            shared: &mut lowered,
            locals: Vec::new(),
            n_locals: 0,
            alloc_locals: false,
            code: Vec::new(),
            locations: Vec::new(),
            span: Span::default(),
        };
        if let Some(Item::Function(decl)) = program.files[file].ast.items.get(index).map(|item| &item.node) {
            lowerer.function(decl);
        }
        let (code, locations, n_locals) = (lowerer.code, lowerer.locations, lowerer.n_locals);
        lowered.functions.push(FunctionCode {
            name: sig.qualified_name.clone(),
            n_args: sig.params.len() as u32,
            n_outputs: sig.outputs.len() as u32,
            n_locals,
            code,
        });
        lowered.locations.push(locations);
    }
    lowered
}

fn abi_params(params: &[Param]) -> Vec<AbiParam> {
    params
        .iter()
        .map(|p| AbiParam {
            name: p.name.clone(),
            ty: p.ty,
        })
        .collect()
}

impl Lowered {
    /// Assemble the contract: bytecode, entry points (external ones sorted by selector) and ABI.
    pub fn into_definition(self, collected: &Collected) -> ContractDefinition {
        let mut entry_points = EntryPointsByType::default();
        let mut abi = Vec::new();
        for (id, sig) in collected.table.functions.iter().enumerate() {
            let Some(decorator) = sig.decorator else { continue };
            let entry_point = EntryPoint {
                selector: get_selector_from_name(&sig.name),
                function: id as u32,
            };
            let function = AbiFunction {
                name: sig.name.clone(),
                inputs: abi_params(&sig.params),
                outputs: abi_params(&sig.outputs),
                state_mutability: (decorator == DecoratorId::View).then(|| "view".to_string()),
            };
            if decorator.is_entry_point() {
                entry_points.external.push(entry_point);
                abi.push(AbiEntry::Function(function));
            } else if decorator == DecoratorId::Constructor {
                entry_points.constructor.push(entry_point);
                abi.push(AbiEntry::Constructor(function));
            }
        }
        entry_points.external.sort_by(|a, b| a.selector.cmp(&b.selector));

        let debug_info = self.debug_files.map(|files| DebugInfo {
            files,
            instruction_locations: self.locations,
        });
        ContractDefinition {
            program: BytecodeProgram {
                builtins: collected.builtins.clone(),
                functions: self.functions,
                storage_vars: collected.table.storage_vars.iter().map(|v| v.name.clone()).collect(),
                error_messages: self.error_messages,
                hints: self.hints,
                debug_info,
            },
            entry_points_by_type: entry_points,
            abi,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Local {
    slot: u32,
    ty: ValueType,
}

struct FunctionLowerer<'a> {
    collected: &'a Collected,
    options: &'a CompileOptions,
    source: &'a str,
    file: usize,
    scope: &'a ModuleScope,
    sig: &'a FunctionSig,
    shared: &'a mut Lowered,
    /// Innermost scope last; `if` branches push their own.
    locals: Vec<HashMap<String, Local>>,
    n_locals: u32,
    alloc_locals: bool,
    code: Vec<Instruction>,
    locations: Vec<Location>,
    /// Span the next emitted instruction is attributed to.
    span: Span,
}

impl FunctionLowerer<'_> {
    fn error(&mut self, error: CompileError) {
        self.shared.errors.push(FileError::new(self.file, error));
    }

    fn emit(&mut self, instruction: Instruction) -> usize {
        if self.options.debug_info {
            let (line, column, _) = get_line_info(self.source, self.span.start);
            self.locations.push(Location {
                file: self.file as u32,
                line: line as u32,
                column: column as u32,
            });
        }
        self.code.push(instruction);
        self.code.len() - 1
    }

    /// Point the jump at `at` to the next instruction.
    fn patch(&mut self, at: usize) {
        let target = self.code.len() as u32;
        match &mut self.code[at] {
            Instruction::Jump(t) | Instruction::JumpIfZero(t) | Instruction::JumpIfNonZero(t) => *t = target,
            _ => {}
        }
    }

    fn bind(&mut self, name: &str, ty: ValueType) -> u32 {
        let slot = self.n_locals;
        self.n_locals += 1;
        if let Some(scope) = self.locals.last_mut() {
            scope.insert(name.to_string(), Local { slot, ty });
        }
        slot
    }

    fn lookup_local(&self, name: &str) -> Option<Local> {
        self.locals.iter().rev().find_map(|scope| scope.get(name).copied())
    }

    fn intern(table: &mut Vec<String>, value: &str) -> u32 {
        let index = table.iter().position(|v| v == value).unwrap_or_else(|| {
            table.push(value.to_string());
            table.len() - 1
        });
        index as u32
    }

    fn resolve_type(&mut self, ty: &Spanned<TypeExpr>) -> Option<ValueType> {
        match &ty.node {
            TypeExpr::Named(name) if name == "felt" => Some(ValueType::Felt),
            TypeExpr::Pointer(inner) if **inner == TypeExpr::felt() => Some(ValueType::FeltPtr),
            other => {
                self.error(CompileError::type_error(format!("Unsupported type '{other}'"), ty.span));
                None
            }
        }
    }

    fn expect_type(&mut self, expected: ValueType, found: Option<ValueType>, span: Span) {
        if let Some(found) = found.filter(|found| *found != expected) {
            self.error(errors::type_mismatch(expected.as_str(), found.as_str(), span));
        }
    }

    // ========================================================================
    // Functions and statements
    // ========================================================================

    fn function(&mut self, decl: &FunctionDecl) {
        let sig = self.sig;
        self.locals.push(HashMap::new());
        for param in &sig.params {
            self.bind(&param.name, param.ty);
        }
        let terminated = self.block(&decl.body);
        if !terminated {
            self.span = decl.header_span;
            if sig.outputs.is_empty() {
                self.emit(Instruction::Return);
            } else {
                self.error(
                    CompileError::new(
                        format!("Function '{}' must end with a 'return' statement", decl.name.node),
                        decl.header_span,
                    )
                    .with_hint("Every path through a function with outputs has to return them"),
                );
            }
        }
        self.locals.pop();
    }

    /// Lower statements in order; `true` if the block always returns.
    fn block(&mut self, stmts: &[Spanned<Stmt>]) -> bool {
        let mut terminated = false;
        for stmt in stmts {
            terminated = self.stmt(stmt);
        }
        terminated
    }

    /// Lower a nested block in its own binding scope.
    fn scoped_block(&mut self, stmts: &[Spanned<Stmt>]) -> bool {
        self.locals.push(HashMap::new());
        let terminated = self.block(stmts);
        self.locals.pop();
        terminated
    }

    fn stmt(&mut self, stmt: &Spanned<Stmt>) -> bool {
        self.span = stmt.span;
        match &stmt.node {
            Stmt::Bind { kind, name, ty, value } => {
                self.bind_stmt(*kind, name, ty.as_ref(), value);
                false
            }
            Stmt::Unpack { names, call } => {
                self.unpack(names, call);
                false
            }
            Stmt::AllocLocals => {
                self.alloc_locals = true;
                false
            }
            Stmt::Assert { lhs, rhs } => {
                self.assert_stmt(lhs, rhs);
                false
            }
            Stmt::Return(values) => {
                self.return_stmt(values, stmt.span);
                true
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => self.if_stmt(cond, then_body, else_body.as_deref()),
            Stmt::WithAttr { attr, message, body } => {
                if attr.node != "error_message" {
                    self.error(
                        CompileError::new(format!("Unknown attribute '{}'", attr.node), attr.span)
                            .with_hint("Only `error_message` is supported"),
                    );
                }
                let index = Self::intern(&mut self.shared.error_messages, &message.node);
                self.emit(Instruction::EnterAttr(index));
                let terminated = self.block(body);
                if !terminated {
                    self.span = stmt.span;
                    self.emit(Instruction::ExitAttr);
                }
                terminated
            }
            Stmt::Call(call) => {
                if let Some(outputs) = self.call(call) {
                    self.span = stmt.span;
                    for _ in outputs {
                        self.emit(Instruction::Pop);
                    }
                }
                false
            }
            Stmt::Hint(code) => {
                if !self.options.disable_hint_validation && !hints::is_whitelisted(code) {
                    let first_line = code.lines().next().unwrap_or_default();
                    self.error(
                        CompileError::new(HINT_NOT_WHITELISTED_MSG.to_string(), stmt.span)
                            .with_note(format!("Hint: {first_line}"))
                            .with_hint("Disable hint validation to accept arbitrary hints"),
                    );
                }
                let index = Self::intern(&mut self.shared.hints, code);
                self.emit(Instruction::Hint(index));
                false
            }
        }
    }

    fn bind_stmt(&mut self, kind: BindingKind, name: &Spanned<Ident>, ty: Option<&Spanned<TypeExpr>>, value: &Spanned<Expr>) {
        if kind == BindingKind::Local && !self.alloc_locals {
            self.error(
                CompileError::new("Local variables require 'alloc_locals'".to_string(), name.span)
                    .with_hint("Add `alloc_locals` at the start of the function"),
            );
        }
        let found = match &value.node {
            Expr::Call(call) => self.single_output_call(call, value.span),
            _ => self.expr(value),
        };
        let declared = ty.and_then(|t| self.resolve_type(t));
        if let Some(declared) = declared {
            self.expect_type(declared, found, value.span);
        }
        self.span = name.span;
        let slot = self.bind(&name.node, declared.or(found).unwrap_or(ValueType::Felt));
        self.emit(Instruction::StoreLocal(slot));
    }

    /// A call used as a value: it must return exactly one value.
    fn single_output_call(&mut self, call: &CallExpr, span: Span) -> Option<ValueType> {
        let outputs = self.call(call)?;
        match outputs.as_slice() {
            [single] => Some(*single),
            _ => {
                self.error(
                    CompileError::type_error(
                        format!("'{}' returns {} value(s), expected exactly one", call.target, outputs.len()),
                        span,
                    )
                    .with_hint(format!("Use `let (...) = {}(...)` to unpack its outputs", call.target)),
                );
                None
            }
        }
    }

    fn unpack(&mut self, names: &[Spanned<Ident>], call: &Spanned<CallExpr>) {
        let outputs = self.call(&call.node);
        let types: Vec<ValueType> = match outputs {
            Some(outputs) if outputs.len() == names.len() => outputs,
            Some(outputs) => {
                let span = names
                    .iter()
                    .map(|n| n.span)
                    .reduce(Span::merge)
                    .unwrap_or(call.span);
                self.error(CompileError::type_error(
                    format!(
                        "Expected {} value(s) on the left, '{}' returns {}",
                        names.len(),
                        call.node.target,
                        outputs.len()
                    ),
                    span,
                ));
                // Bind the names anyway so later uses don't report unknown identifiers.
                for name in names {
                    self.bind(&name.node, ValueType::Felt);
                }
                return;
            }
            None => {
                for name in names {
                    self.bind(&name.node, ValueType::Felt);
                }
                return;
            }
        };
        // Outputs are on the stack in order; the last one is on top.
        for (name, ty) in names.iter().zip(types).rev() {
            self.span = name.span;
            if name.node == DISCARD {
                self.emit(Instruction::Pop);
            } else {
                let slot = self.bind(&name.node, ty);
                self.emit(Instruction::StoreLocal(slot));
            }
        }
    }

    fn assert_stmt(&mut self, lhs: &Spanned<Expr>, rhs: &Spanned<Expr>) {
        if let Expr::Index { base, index } = &lhs.node {
            let base_ty = self.expr(base);
            self.expect_type(ValueType::FeltPtr, base_ty, base.span);
            let index_ty = self.expr(index);
            self.expect_type(ValueType::Felt, index_ty, index.span);
            let value_ty = self.expr(rhs);
            self.expect_type(ValueType::Felt, value_ty, rhs.span);
            self.span = lhs.span;
            self.emit(Instruction::AssertIndex);
            return;
        }
        let lhs_ty = self.expr(lhs);
        let rhs_ty = self.expr(rhs);
        if let (Some(l), Some(r)) = (lhs_ty, rhs_ty) {
            if l != r {
                self.error(errors::type_mismatch(l.as_str(), r.as_str(), rhs.span));
            }
        }
        self.span = lhs.span.merge(rhs.span);
        self.emit(Instruction::AssertEq);
    }

    fn return_stmt(&mut self, values: &[CallArg], span: Span) {
        let sig = self.sig;
        let outputs = &sig.outputs;
        if values.len() != outputs.len() {
            self.error(CompileError::type_error(
                format!("Expected {} return value(s), found {}", outputs.len(), values.len()),
                span,
            ));
        }
        for (value, output) in values.iter().zip(outputs) {
            if let Some(name) = value.name.as_ref().filter(|n| n.node != output.name) {
                self.error(
                    CompileError::type_error(
                        format!("Expected return value '{}', found '{}'", output.name, name.node),
                        name.span,
                    )
                    .with_note("Return values must be given in declaration order"),
                );
            }
            let found = self.expr(&value.value);
            self.expect_type(output.ty, found, value.value.span);
        }
        self.span = span;
        self.emit(Instruction::Return);
    }

    fn if_stmt(&mut self, cond: &Condition, then_body: &[Spanned<Stmt>], else_body: Option<&[Spanned<Stmt>]>) -> bool {
        for side in [&cond.lhs, &cond.rhs] {
            let ty = self.expr(side);
            if ty == Some(ValueType::FeltPtr) {
                self.error(CompileError::type_error(
                    "Only 'felt' values can be compared".to_string(),
                    side.span,
                ));
            }
        }
        self.span = cond.lhs.span.merge(cond.rhs.span);
        self.emit(Instruction::Sub);
        let to_else = match cond.op {
            CompareOp::Eq => self.emit(Instruction::JumpIfNonZero(0)),
            CompareOp::NotEq => self.emit(Instruction::JumpIfZero(0)),
        };

        let then_returns = self.scoped_block(then_body);
        let Some(else_body) = else_body else {
            self.patch(to_else);
            return false;
        };
        let to_end = (!then_returns).then(|| self.emit(Instruction::Jump(0)));
        self.patch(to_else);
        let else_returns = self.scoped_block(else_body);
        if let Some(to_end) = to_end {
            self.patch(to_end);
        }
        then_returns && else_returns
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Spanned<Expr>) -> Option<ValueType> {
        let saved = self.span;
        self.span = expr.span;
        let ty = self.expr_inner(expr);
        self.span = saved;
        ty
    }

    fn expr_inner(&mut self, expr: &Spanned<Expr>) -> Option<ValueType> {
        match &expr.node {
            Expr::Int(value) => {
                self.emit(Instruction::PushConst(value.clone()));
                Some(ValueType::Felt)
            }
            Expr::Name(name) => self.name(name, expr.span),
            Expr::Binary { op, lhs, rhs } => {
                let l = self.expr(lhs);
                let r = self.expr(rhs);
                if l == Some(ValueType::FeltPtr) || r == Some(ValueType::FeltPtr) {
                    self.error(
                        CompileError::type_error("Pointer arithmetic is not supported".to_string(), expr.span)
                            .with_hint("Index the array instead: `arr[i]`"),
                    );
                    return None;
                }
                self.emit(match op {
                    BinaryOp::Add => Instruction::Add,
                    BinaryOp::Sub => Instruction::Sub,
                    BinaryOp::Mul => Instruction::Mul,
                    BinaryOp::Div => Instruction::Div,
                });
                l.and(r)
            }
            Expr::Neg(inner) => {
                let ty = self.expr(inner);
                self.expect_type(ValueType::Felt, ty, inner.span);
                self.emit(Instruction::Neg);
                ty.map(|_| ValueType::Felt)
            }
            Expr::Index { base, index } => {
                let base_ty = self.expr(base);
                self.expect_type(ValueType::FeltPtr, base_ty, base.span);
                let index_ty = self.expr(index);
                self.expect_type(ValueType::Felt, index_ty, index.span);
                self.emit(Instruction::Index);
                Some(ValueType::Felt)
            }
            Expr::New(items) => {
                for item in items {
                    let ty = self.expr(item);
                    self.expect_type(ValueType::Felt, ty, item.span);
                }
                self.emit(Instruction::NewArray(items.len() as u32));
                Some(ValueType::FeltPtr)
            }
            Expr::Call(call) => {
                self.error(
                    CompileError::new(
                        format!("Call to '{}' cannot be used inside an expression", call.target),
                        expr.span,
                    )
                    .with_hint("Bind the result first: `let (x) = f(...)`"),
                );
                None
            }
        }
    }

    fn name(&mut self, name: &str, span: Span) -> Option<ValueType> {
        if let Some(local) = self.lookup_local(name) {
            self.emit(Instruction::LoadLocal(local.slot));
            return Some(local.ty);
        }
        let scope = self.scope;
        match scope.lookup(name) {
            Some(Symbol::Const(value)) => {
                self.emit(Instruction::PushConst(value.clone()));
                Some(ValueType::Felt)
            }
            Some(other) => {
                self.error(CompileError::type_error(
                    format!("'{name}' is a {}, not a value", other.describe()),
                    span,
                ));
                None
            }
            None => {
                self.error(errors::unknown_identifier(name, span));
                None
            }
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Check and emit a call; returns the output types.
    fn call(&mut self, call: &CallExpr) -> Option<Vec<ValueType>> {
        match &call.target {
            CallTarget::Function(name) => self.function_call(name, &call.args),
            CallTarget::Storage { var, accessor } => self.storage_call(var, accessor, &call.args),
        }
    }

    fn function_call(&mut self, name: &Spanned<Ident>, args: &[CallArg]) -> Option<Vec<ValueType>> {
        if self.lookup_local(&name.node).is_some() {
            self.error(CompileError::type_error(
                format!("'{}' is a local variable, not a function", name.node),
                name.span,
            ));
            return None;
        }
        let (collected, scope) = (self.collected, self.scope);
        match scope.lookup(&name.node) {
            Some(Symbol::Function(id)) => {
                let id = *id;
                let sig = collected.table.function(id)?;
                let exprs = self.match_args(&name.node, &sig.params, args, name.span)?;
                self.emit_args(&exprs, &sig.params);
                self.span = name.span;
                self.emit(Instruction::Call(id));
                Some(sig.outputs.iter().map(|p| p.ty).collect())
            }
            Some(Symbol::Library(id)) => {
                let id = *id;
                let info = library::info_for(id);
                let params: Vec<Param> = info
                    .params
                    .iter()
                    .map(|(name, ty)| Param {
                        name: (*name).to_string(),
                        ty: *ty,
                    })
                    .collect();
                let exprs = self.match_args(&name.node, &params, args, name.span)?;
                self.emit_args(&exprs, &params);
                self.span = name.span;
                self.emit(Instruction::CallLibrary(id));
                Some(info.outputs.iter().map(|(_, ty)| *ty).collect())
            }
            Some(Symbol::StorageVar(_)) => {
                self.error(
                    CompileError::type_error(
                        format!("Storage variable '{}' cannot be called directly", name.node),
                        name.span,
                    )
                    .with_hint(format!("Use `{0}.read(...)`, `{0}.write(...)` or `{0}.addr(...)`", name.node)),
                );
                None
            }
            Some(other) => {
                self.error(CompileError::type_error(
                    format!("'{}' is a {}, not a function", name.node, other.describe()),
                    name.span,
                ));
                None
            }
            None => {
                self.error(errors::unknown_identifier(&name.node, name.span));
                None
            }
        }
    }

    fn storage_call(
        &mut self,
        var: &Spanned<Ident>,
        accessor: &Spanned<Ident>,
        args: &[CallArg],
    ) -> Option<Vec<ValueType>> {
        let (collected, scope) = (self.collected, self.scope);
        let id = match scope.lookup(&var.node) {
            Some(Symbol::StorageVar(id)) => *id,
            Some(other) => {
                self.error(CompileError::type_error(
                    format!("'{}' is a {}, not a storage variable", var.node, other.describe()),
                    var.span,
                ));
                return None;
            }
            None => {
                self.error(errors::unknown_identifier(&var.node, var.span));
                return None;
            }
        };
        let storage = collected.table.storage_var(id)?;
        let mut params: Vec<Param> = storage
            .keys
            .iter()
            .map(|k| Param {
                name: k.clone(),
                ty: ValueType::Felt,
            })
            .collect();
        let n_keys = params.len() as u32;
        let callee = format!("{}.{}", var.node, accessor.node);
        let span = var.span.merge(accessor.span);

        match accessor.node.as_str() {
            "read" | "addr" => {
                let exprs = self.match_args(&callee, &params, args, span)?;
                self.emit_args(&exprs, &params);
                self.span = span;
                self.emit(Instruction::StorageAddr { var: id, n_keys });
                if accessor.node == "read" {
                    self.emit(Instruction::StorageRead);
                }
                Some(vec![ValueType::Felt])
            }
            "write" => {
                params.push(Param {
                    name: "value".to_string(),
                    ty: ValueType::Felt,
                });
                let exprs = self.match_args(&callee, &params, args, span)?;
                let (value, keys) = exprs.split_last()?;
                self.emit_args(keys, &params);
                self.span = span;
                self.emit(Instruction::StorageAddr { var: id, n_keys });
                self.emit_args(std::slice::from_ref(value), &params[params.len() - 1..]);
                self.span = span;
                self.emit(Instruction::StorageWrite);
                Some(Vec::new())
            }
            other => {
                self.error(
                    CompileError::type_error(format!("Unknown storage accessor '{other}'"), accessor.span)
                        .with_hint("Storage variables support `read`, `write` and `addr`"),
                );
                None
            }
        }
    }

    /// Line arguments up with parameters. Named arguments must follow declaration order.
    fn match_args<'c>(
        &mut self,
        callee: &str,
        params: &[Param],
        args: &'c [CallArg],
        span: Span,
    ) -> Option<Vec<&'c Spanned<Expr>>> {
        if args.len() != params.len() {
            self.error(errors::arity_mismatch(callee, params.len(), args.len(), span));
            return None;
        }
        let mut ok = true;
        for (arg, param) in args.iter().zip(params) {
            if let Some(name) = arg.name.as_ref().filter(|n| n.node != param.name) {
                let mut error = CompileError::type_error(
                    format!("Unexpected argument '{}' for '{callee}'; expected '{}'", name.node, param.name),
                    name.span,
                );
                if params.iter().any(|p| p.name == name.node) {
                    error = error.with_note("Arguments must be given in declaration order");
                }
                self.error(error);
                ok = false;
            }
        }
        ok.then(|| args.iter().map(|a| &a.value).collect())
    }

    fn emit_args(&mut self, exprs: &[&Spanned<Expr>], params: &[Param]) {
        for (expr, param) in exprs.iter().zip(params) {
            let found = self.expr(expr);
            self.expect_type(param.ty, found, expr.span);
        }
    }
}
