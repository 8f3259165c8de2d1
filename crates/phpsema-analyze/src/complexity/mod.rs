//! Cognitive complexity scorer
//!
//! Scores how hard a function-like unit is to follow: one depth-first walk
//! per unit, carrying a nesting counter. Branching constructs add
//! `1 + nesting` and deepen nesting for their bodies; `else`/`elseif`
//! keywords add at the chain's own level without nesting each other; runs of
//! one logical operator add a flat 1 per run; bare `break`/`continue`/`return`
//! and plain statements add nothing.
//!
//! Scoring a whole program treats the top-level script region as an implicit
//! unit and each non-nested function-like as its own unit at nesting 0; a
//! function-like met while already inside a unit just deepens nesting for its
//! contents.

use mago_span::HasSpan;
use mago_syntax::ast::*;
use phpsema_core::{line_of, span_text};
use serde::Serialize;

/// One construct's contribution, in traversal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityComponent {
    /// Keyword or operator that triggered the increment
    pub token: &'static str,
    pub added: u32,
    pub line: usize,
}

/// Aggregate score plus the per-construct breakdown
#[derive(Debug, Clone, Default, Serialize)]
pub struct CognitiveComplexity {
    pub total: u32,
    pub components: Vec<ComplexityComponent>,
}

impl CognitiveComplexity {
    fn add(&mut self, token: &'static str, added: u32, line: usize) {
        self.total += added;
        self.components.push(ComplexityComponent { token, added, line });
    }
}

/// A scorable unit of code
pub enum FunctionLike<'ast, 'arena> {
    Function(&'ast Function<'arena>),
    Method(&'ast Method<'arena>),
    Closure(&'ast Closure<'arena>),
    ArrowFunction(&'ast ArrowFunction<'arena>),
}

/// Score a single function-like unit, starting at nesting 0
pub fn unit_complexity(unit: &FunctionLike<'_, '_>, source: &str) -> CognitiveComplexity {
    let mut walker = ComplexityWalker::new(source, true);
    match unit {
        FunctionLike::Function(func) => walker.walk_statements(&func.body.statements),
        FunctionLike::Method(method) => {
            if let MethodBody::Concrete(block) = &method.body {
                walker.walk_statements(&block.statements);
            }
        }
        FunctionLike::Closure(closure) => walker.walk_statements(&closure.body.statements),
        FunctionLike::ArrowFunction(arrow) => walker.walk_expression(&arrow.expression),
    }
    walker.result
}

/// Score a whole program: every non-nested unit plus the script region
pub fn program_complexity(program: &Program<'_>, source: &str) -> CognitiveComplexity {
    let mut walker = ComplexityWalker::new(source, false);
    for stmt in program.statements.iter() {
        walker.walk_statement(stmt);
    }
    walker.result
}

/// Named scores for every top-level function and method in a program
///
/// Methods are reported as `Class::method`. Anonymous units are left to
/// `program_complexity`, which folds them into the script score.
pub fn unit_complexities(program: &Program<'_>, source: &str) -> Vec<(String, CognitiveComplexity)> {
    let mut results = Vec::new();
    for stmt in program.statements.iter() {
        collect_units(stmt, source, &mut results);
    }
    results
}

/// Gather named units from a statement, descending through script-level
/// control flow (functions may be declared conditionally) but never into a
/// function-like body.
fn collect_units(
    stmt: &Statement<'_>,
    source: &str,
    results: &mut Vec<(String, CognitiveComplexity)>,
) {
    match stmt {
        Statement::Function(func) => {
            let name = span_text(source, &func.name.span).to_string();
            results.push((name, unit_complexity(&FunctionLike::Function(func), source)));
        }
        Statement::Class(class) => {
            collect_methods(&class.members, span_text(source, &class.name.span), source, results);
        }
        Statement::Interface(interface) => {
            collect_methods(&interface.members, span_text(source, &interface.name.span), source, results);
        }
        Statement::Enum(enum_def) => {
            collect_methods(&enum_def.members, span_text(source, &enum_def.name.span), source, results);
        }
        Statement::Namespace(ns) => match &ns.body {
            NamespaceBody::Implicit(body) => {
                for inner in body.statements.iter() {
                    collect_units(inner, source, results);
                }
            }
            NamespaceBody::BraceDelimited(body) => {
                for inner in body.statements.iter() {
                    collect_units(inner, source, results);
                }
            }
        },
        Statement::Block(block) => {
            for inner in block.statements.iter() {
                collect_units(inner, source, results);
            }
        }
        Statement::If(if_stmt) => match &if_stmt.body {
            IfBody::Statement(stmt_body) => {
                collect_units(stmt_body.statement, source, results);
                for else_if in stmt_body.else_if_clauses.iter() {
                    collect_units(else_if.statement, source, results);
                }
                if let Some(else_clause) = &stmt_body.else_clause {
                    collect_units(else_clause.statement, source, results);
                }
            }
            IfBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    collect_units(inner, source, results);
                }
                for else_if in block.else_if_clauses.iter() {
                    for inner in else_if.statements.iter() {
                        collect_units(inner, source, results);
                    }
                }
                if let Some(else_clause) = &block.else_clause {
                    for inner in else_clause.statements.iter() {
                        collect_units(inner, source, results);
                    }
                }
            }
        },
        Statement::While(while_stmt) => match &while_stmt.body {
            WhileBody::Statement(inner) => collect_units(inner, source, results),
            WhileBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    collect_units(inner, source, results);
                }
            }
        },
        Statement::DoWhile(do_while) => {
            collect_units(&do_while.statement, source, results);
        }
        Statement::For(for_stmt) => match &for_stmt.body {
            ForBody::Statement(inner) => collect_units(inner, source, results),
            ForBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    collect_units(inner, source, results);
                }
            }
        },
        Statement::Foreach(foreach) => match &foreach.body {
            ForeachBody::Statement(inner) => collect_units(inner, source, results),
            ForeachBody::ColonDelimited(block) => {
                for inner in block.statements.iter() {
                    collect_units(inner, source, results);
                }
            }
        },
        Statement::Switch(switch) => match &switch.body {
            SwitchBody::BraceDelimited(block) => {
                for case in block.cases.iter() {
                    for inner in case.statements().iter() {
                        collect_units(inner, source, results);
                    }
                }
            }
            SwitchBody::ColonDelimited(block) => {
                for case in block.cases.iter() {
                    for inner in case.statements().iter() {
                        collect_units(inner, source, results);
                    }
                }
            }
        },
        Statement::Try(try_stmt) => {
            for inner in try_stmt.block.statements.iter() {
                collect_units(inner, source, results);
            }
            for catch in try_stmt.catch_clauses.iter() {
                for inner in catch.block.statements.iter() {
                    collect_units(inner, source, results);
                }
            }
            if let Some(finally) = &try_stmt.finally_clause {
                for inner in finally.block.statements.iter() {
                    collect_units(inner, source, results);
                }
            }
        }
        _ => {}
    }
}

fn collect_methods(
    members: &Sequence<'_, ClassLikeMember<'_>>,
    class_name: &str,
    source: &str,
    results: &mut Vec<(String, CognitiveComplexity)>,
) {
    for member in members.iter() {
        if let ClassLikeMember::Method(method) = member {
            let method_name = span_text(source, &method.name.span);
            let name = format!("{}::{}", class_name, method_name);
            results.push((name, unit_complexity(&FunctionLike::Method(method), source)));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogicalKind {
    And,
    Or,
}

fn logical_kind(operator: &BinaryOperator) -> Option<(LogicalKind, &'static str)> {
    match operator {
        BinaryOperator::And(_) => Some((LogicalKind::And, "&&")),
        BinaryOperator::Or(_) => Some((LogicalKind::Or, "||")),
        BinaryOperator::LowAnd(_) => Some((LogicalKind::And, "and")),
        BinaryOperator::LowOr(_) => Some((LogicalKind::Or, "or")),
        _ => None,
    }
}

struct ComplexityWalker<'s> {
    source: &'s str,
    nesting: u32,
    /// Whether the walk is currently inside a function-like unit
    in_unit: bool,
    result: CognitiveComplexity,
}

impl<'s> ComplexityWalker<'s> {
    fn new(source: &'s str, in_unit: bool) -> Self {
        Self {
            source,
            nesting: 0,
            in_unit,
            result: CognitiveComplexity::default(),
        }
    }

    fn line(&self, offset: usize) -> usize {
        line_of(self.source, offset)
    }

    /// Add a nesting-scaled component
    fn add(&mut self, token: &'static str, span: mago_span::Span) {
        let line = self.line(span.start.offset as usize);
        self.result.add(token, 1 + self.nesting, line);
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.nesting += 1;
        f(self);
        self.nesting -= 1;
    }

    /// Enter a function-like construct's contents
    ///
    /// Inside a unit the contents nest one level deeper. At script scope the
    /// construct starts its own unit at nesting 0, even when it is declared
    /// inside script-level control flow.
    fn enter_unit(&mut self, f: impl FnOnce(&mut Self)) {
        if self.in_unit {
            self.nested(f);
        } else {
            let script_nesting = self.nesting;
            self.nesting = 0;
            self.in_unit = true;
            f(self);
            self.in_unit = false;
            self.nesting = script_nesting;
        }
    }

    fn walk_statements(&mut self, statements: &Sequence<'_, Statement<'_>>) {
        for stmt in statements.iter() {
            self.walk_statement(stmt);
        }
    }

    fn walk_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::Expression(expr_stmt) => {
                self.walk_expression(&expr_stmt.expression);
            }
            Statement::Block(block) => {
                self.walk_statements(&block.statements);
            }
            Statement::If(if_stmt) => {
                self.add("if", if_stmt.span());
                self.walk_expression(&if_stmt.condition);
                self.walk_if_body(&if_stmt.body);
            }
            Statement::Switch(switch) => {
                self.add("switch", switch.span());
                self.walk_expression(&switch.expression);
                self.nested(|w| match &switch.body {
                    SwitchBody::BraceDelimited(block) => {
                        for case in block.cases.iter() {
                            for inner in case.statements().iter() {
                                w.walk_statement(inner);
                            }
                        }
                    }
                    SwitchBody::ColonDelimited(block) => {
                        for case in block.cases.iter() {
                            for inner in case.statements().iter() {
                                w.walk_statement(inner);
                            }
                        }
                    }
                });
            }
            Statement::While(while_stmt) => {
                self.add("while", while_stmt.span());
                self.walk_expression(&while_stmt.condition);
                self.nested(|w| match &while_stmt.body {
                    WhileBody::Statement(inner) => w.walk_statement(inner),
                    WhileBody::ColonDelimited(block) => w.walk_statements(&block.statements),
                });
            }
            Statement::DoWhile(do_while) => {
                self.add("do", do_while.span());
                self.nested(|w| w.walk_statement(&do_while.statement));
                self.walk_expression(&do_while.condition);
            }
            Statement::For(for_stmt) => {
                self.add("for", for_stmt.span());
                for expr in for_stmt.initializations.iter() {
                    self.walk_expression(expr);
                }
                for expr in for_stmt.conditions.iter() {
                    self.walk_expression(expr);
                }
                for expr in for_stmt.increments.iter() {
                    self.walk_expression(expr);
                }
                self.nested(|w| match &for_stmt.body {
                    ForBody::Statement(inner) => w.walk_statement(inner),
                    ForBody::ColonDelimited(block) => w.walk_statements(&block.statements),
                });
            }
            Statement::Foreach(foreach) => {
                self.add("foreach", foreach.span());
                self.walk_expression(&foreach.expression);
                self.nested(|w| match &foreach.body {
                    ForeachBody::Statement(inner) => w.walk_statement(inner),
                    ForeachBody::ColonDelimited(block) => w.walk_statements(&block.statements),
                });
            }
            Statement::Try(try_stmt) => {
                // try and finally are free; their contents keep the
                // surrounding nesting
                self.walk_statements(&try_stmt.block.statements);
                for catch in try_stmt.catch_clauses.iter() {
                    self.add("catch", catch.span());
                    self.nested(|w| w.walk_statements(&catch.block.statements));
                }
                if let Some(finally) = &try_stmt.finally_clause {
                    self.walk_statements(&finally.block.statements);
                }
            }
            Statement::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.walk_expression(value);
                }
            }
            Statement::Break(break_stmt) => {
                if break_stmt.level.is_some() {
                    self.add("break", break_stmt.span());
                }
            }
            Statement::Continue(continue_stmt) => {
                if continue_stmt.level.is_some() {
                    self.add("continue", continue_stmt.span());
                }
            }
            Statement::Goto(goto_stmt) => {
                self.add("goto", goto_stmt.span());
            }
            Statement::Function(func) => {
                self.enter_unit(|w| w.walk_statements(&func.body.statements));
            }
            Statement::Class(class) => {
                self.walk_members(&class.members);
            }
            Statement::Interface(interface) => {
                self.walk_members(&interface.members);
            }
            Statement::Trait(tr) => {
                self.walk_members(&tr.members);
            }
            Statement::Enum(enum_def) => {
                self.walk_members(&enum_def.members);
            }
            Statement::Namespace(ns) => match &ns.body {
                NamespaceBody::Implicit(body) => self.walk_statements(&body.statements),
                NamespaceBody::BraceDelimited(body) => self.walk_statements(&body.statements),
            },
            Statement::Echo(echo) => {
                for expr in echo.values.iter() {
                    self.walk_expression(expr);
                }
            }
            _ => {}
        }
    }

    fn walk_if_body(&mut self, body: &IfBody<'_>) {
        match body {
            IfBody::Statement(stmt_body) => {
                self.nested(|w| w.walk_statement(stmt_body.statement));
                for else_if in stmt_body.else_if_clauses.iter() {
                    self.add("elseif", else_if.span());
                    self.walk_expression(&else_if.condition);
                    self.nested(|w| w.walk_statement(else_if.statement));
                }
                if let Some(else_clause) = &stmt_body.else_clause {
                    if matches!(else_clause.statement, Statement::If(_)) {
                        // `else if`: the chained `if` carries the increment
                        self.walk_statement(else_clause.statement);
                    } else {
                        self.add("else", else_clause.span());
                        self.nested(|w| w.walk_statement(else_clause.statement));
                    }
                }
            }
            IfBody::ColonDelimited(block) => {
                self.nested(|w| w.walk_statements(&block.statements));
                for else_if in block.else_if_clauses.iter() {
                    self.add("elseif", else_if.span());
                    self.walk_expression(&else_if.condition);
                    self.nested(|w| w.walk_statements(&else_if.statements));
                }
                if let Some(else_clause) = &block.else_clause {
                    self.add("else", else_clause.span());
                    self.nested(|w| w.walk_statements(&else_clause.statements));
                }
            }
        }
    }

    fn walk_members(&mut self, members: &Sequence<'_, ClassLikeMember<'_>>) {
        for member in members.iter() {
            if let ClassLikeMember::Method(method) = member {
                if let MethodBody::Concrete(block) = &method.body {
                    self.enter_unit(|w| w.walk_statements(&block.statements));
                }
            }
        }
    }

    fn walk_expression(&mut self, expr: &Expression<'_>) {
        match expr {
            Expression::Binary(binary) if logical_kind(&binary.operator).is_some() => {
                self.walk_logical_chain(expr);
            }
            Expression::Binary(binary) => {
                self.walk_expression(&binary.lhs);
                self.walk_expression(&binary.rhs);
            }
            Expression::Conditional(ternary) => {
                self.add("?", ternary.span());
                self.nested(|w| {
                    w.walk_expression(&ternary.condition);
                    if let Some(then_expr) = &ternary.then {
                        w.walk_expression(then_expr);
                    }
                    w.walk_expression(&ternary.r#else);
                });
            }
            Expression::Closure(closure) => {
                self.enter_unit(|w| w.walk_statements(&closure.body.statements));
            }
            Expression::ArrowFunction(arrow) => {
                self.enter_unit(|w| w.walk_expression(&arrow.expression));
            }
            Expression::UnaryPrefix(unary) => {
                self.walk_expression(&unary.operand);
            }
            Expression::Parenthesized(paren) => {
                self.walk_expression(&paren.expression);
            }
            Expression::Assignment(assign) => {
                self.walk_expression(&assign.lhs);
                self.walk_expression(&assign.rhs);
            }
            Expression::ArrayAccess(access) => {
                self.walk_expression(&access.array);
                self.walk_expression(&access.index);
            }
            Expression::Array(arr) => {
                for element in arr.elements.iter() {
                    match element {
                        ArrayElement::KeyValue(kv) => {
                            self.walk_expression(&kv.key);
                            self.walk_expression(&kv.value);
                        }
                        ArrayElement::Value(value) => {
                            self.walk_expression(&value.value);
                        }
                        _ => {}
                    }
                }
            }
            Expression::Call(call) => match call {
                Call::Function(func_call) => {
                    for arg in func_call.argument_list.arguments.iter() {
                        self.walk_expression(arg.value());
                    }
                }
                Call::Method(method_call) => {
                    self.walk_expression(&method_call.object);
                    for arg in method_call.argument_list.arguments.iter() {
                        self.walk_expression(arg.value());
                    }
                }
                Call::NullSafeMethod(ns_call) => {
                    self.walk_expression(&ns_call.object);
                    for arg in ns_call.argument_list.arguments.iter() {
                        self.walk_expression(arg.value());
                    }
                }
                Call::StaticMethod(static_call) => {
                    self.walk_expression(&static_call.class);
                    for arg in static_call.argument_list.arguments.iter() {
                        self.walk_expression(arg.value());
                    }
                }
            },
            Expression::Instantiation(inst) => {
                self.walk_expression(&inst.class);
                if let Some(argument_list) = &inst.argument_list {
                    for arg in argument_list.arguments.iter() {
                        self.walk_expression(arg.value());
                    }
                }
            }
            Expression::Throw(throw) => {
                self.walk_expression(&throw.exception);
            }
            _ => {}
        }
    }

    /// Emit one flat component per maximal run of a single logical operator
    ///
    /// `a && b && c || d` is two components: one for the `&&` run, one for
    /// the `||`. Runs are segmented over the in-order flattening of the
    /// chain; parentheses break a chain into separate ones.
    fn walk_logical_chain(&mut self, expr: &Expression<'_>) {
        let mut operators = Vec::new();
        self.flatten_logical(expr, &mut operators);
        let mut previous = None;
        for (kind, token, line) in operators {
            if previous != Some(kind) {
                self.result.add(token, 1, line);
            }
            previous = Some(kind);
        }
    }

    fn flatten_logical(
        &mut self,
        expr: &Expression<'_>,
        operators: &mut Vec<(LogicalKind, &'static str, usize)>,
    ) {
        if let Expression::Binary(binary) = expr {
            if let Some((kind, token)) = logical_kind(&binary.operator) {
                self.flatten_logical(&binary.lhs, operators);
                let line = self.line(binary.operator.span().start.offset as usize);
                operators.push((kind, token, line));
                self.flatten_logical(&binary.rhs, operators);
                return;
            }
        }
        self.walk_expression(expr);
    }
}
