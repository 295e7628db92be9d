//! Every function here takes a [`Context`] positioned at the first token of
//! its production. Functions returning an [`Attempt`] decline with
//! [`Attempt::NoMatch`] without consuming anything if the current token
//! can't start their production.

use tracing::trace;

use crate::{
    ast::{
        BinaryExpression, BinaryOperator, Declaration, FunctionParameter, FunctionValue,
        InstructionCall, InstructionCallArgument, MetaValue, ModuleDeclaration, Node, Value,
    },
    meta::{self, NumericType},
    parser::{Context, Error, ErrorKind, Result},
    token::{Token, TokenKind, BINARY_OPERATORS, BOOL_CONSTANTS},
    util::{first_match, Attempt},
};

pub type MiniParser<C> = fn(&mut C) -> Result<Attempt<Node>>;

/// Parses a module, a declaration or an instruction call. Anything else is
/// an error.
pub fn parse_top_level<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Node> {
    let alternatives: [MiniParser<C>; 3] = [
        parse_module_declaration,
        parse_declaration,
        parse_instruction_call,
    ];
    match first_match(c, &alternatives)? {
        Attempt::Matched(node) => {
            trace!(node = node.kind_name(), "parsed top-level statement");
            Ok(node)
        }
        Attempt::NoMatch => Err(unexpected(c, "top-level statement")),
    }
}

/// `"name" : { top-level* }`
pub fn parse_module_declaration<'tok, C: Context<'tok> + ?Sized>(
    c: &mut C,
) -> Result<Attempt<Node>> {
    if c.current()?.kind != TokenKind::String {
        return Ok(Attempt::NoMatch);
    }
    let name = c.expect(TokenKind::String)?;
    c.expect_literal(":")?;
    c.expect_literal("{")?;

    c.enter_module(&name.literal);
    let body = parse_module_body(c);
    c.leave_module();

    Ok(Attempt::Matched(Node::ModuleDeclaration(ModuleDeclaration {
        name: name.literal.clone(),
        body: body?,
    })))
}

fn parse_module_body<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Vec<Node>> {
    let mut body = Vec::new();
    while !c.at_literal("}") {
        body.push(parse_top_level(c)?);
    }
    c.expect_literal("}")?;
    Ok(body)
}

/// Repeated modifiers set their flags again; the last `link(...)` argument
/// of each kind wins.
#[derive(Default)]
struct Modifiers<'tok> {
    export: Option<&'tok Token>,
    declared: bool,
    link_target: Option<&'tok str>,
    can_be_linked: Option<bool>,
}

/// `modifier* name type value`
pub fn parse_declaration<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Attempt<Node>> {
    if !matches!(
        c.current()?.kind,
        TokenKind::Keyword | TokenKind::Identifier
    ) {
        return Ok(Attempt::NoMatch);
    }

    let modifiers = parse_modifiers(c)?;
    let name = c.expect(TokenKind::Identifier)?;
    let type_name = c.expect(TokenKind::TypeName)?;
    let linked = modifiers.link_target.is_some();
    let value = parse_value(c, modifiers.declared, linked)?;

    Ok(Attempt::Matched(Node::Declaration(Declaration {
        name: name.literal.clone(),
        type_name: type_name.literal.clone(),
        exported: modifiers.export.is_some(),
        declared: modifiers.declared,
        linked,
        link_target: modifiers.link_target.map(Box::from),
        can_be_linked: modifiers.can_be_linked.unwrap_or(true),
        module: c.module().map(Box::from),
        value: Box::new(value),
    })))
}

fn parse_modifiers<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Modifiers<'tok>> {
    let mut modifiers = Modifiers::default();
    loop {
        let token = c.current()?;
        if token.kind != TokenKind::Keyword {
            break;
        }
        match &*token.literal {
            "export" => modifiers.export = Some(token),
            "declare" => modifiers.declared = true,
            "link" => {}
            _ => break,
        }
        c.advance(1)?;

        if &*token.literal == "link" {
            c.expect_literal("(")?;
            let argument = c.expect_multiple(&[TokenKind::String, TokenKind::BoolConstant])?;
            if argument.kind == TokenKind::String {
                modifiers.link_target = Some(&*argument.literal);
            } else {
                modifiers.can_be_linked = Some(bool_constant(c, argument)?);
            }
            c.expect_literal(")")?;
        }
    }

    if let Some(export) = modifiers.export {
        if modifiers.can_be_linked == Some(false) {
            return Err(c.fail_at(ErrorKind::ExportWithoutLinkability, export.pos));
        }
    }
    Ok(modifiers)
}

/// Parses any value. `declared` and `linked` decide whether a function value
/// may (or must) have a body.
pub fn parse_value<'tok, C: Context<'tok> + ?Sized>(
    c: &mut C,
    declared: bool,
    linked: bool,
) -> Result<Node> {
    let token = c.current()?;
    trace!(kind = %token.kind, pos = %token.pos, "value");
    match token.kind {
        TokenKind::Integer | TokenKind::Float | TokenKind::Identifier => {
            if c.peek()?.kind == TokenKind::BinaryOperator {
                return parse_expression(c);
            }
            c.advance(1)?;
            Ok(leaf(token))
        }
        TokenKind::String | TokenKind::BoolConstant => {
            c.advance(1)?;
            Ok(leaf(token))
        }
        TokenKind::Separator if &*token.literal == "(" => {
            parse_function_value(c, declared, linked)
        }
        TokenKind::Keyword => match &*token.literal {
            "consteval" => {
                let inner = parse_parenthesized(c, declared, linked)?;
                Ok(wrapper(token, inner, true, false))
            }
            // Copies are always concrete values.
            "copy" => {
                let inner = parse_parenthesized(c, false, false)?;
                Ok(wrapper(token, inner, false, true))
            }
            "meta" => parse_meta(c),
            _ => Err(unexpected(c, "value")),
        },
        _ => Err(unexpected(c, "value")),
    }
}

fn parse_parenthesized<'tok, C: Context<'tok> + ?Sized>(
    c: &mut C,
    declared: bool,
    linked: bool,
) -> Result<Node> {
    c.advance(1)?;
    c.expect_literal("(")?;
    let inner = parse_value(c, declared, linked)?;
    c.expect_literal(")")?;
    Ok(inner)
}

fn wrapper(keyword: &Token, inner: Node, consteval: bool, copied: bool) -> Node {
    Node::Value(Value {
        literal: keyword.literal.clone(),
        kind: keyword.kind,
        consteval,
        copied,
        inner: Some(Box::new(inner)),
    })
}

fn leaf(token: &Token) -> Node {
    Node::Value(Value::leaf(token.literal.clone(), token.kind))
}

/// `meta ( number )`, annotated with the narrowest type holding the number.
fn parse_meta<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Node> {
    c.advance(1)?;
    c.expect_literal("(")?;
    let start = c.current()?;
    if start.kind == TokenKind::Separator && &*start.literal == "(" {
        return Err(c.fail(ErrorKind::DisallowedInMeta("function value")));
    }
    let inner = parse_value(c, false, false)?;
    let descriptor = infer_meta(&inner).map_err(|kind| c.fail_at(kind, start.pos))?;
    c.expect_literal(")")?;

    trace!(ty = descriptor.name(), literal = &*start.literal, "inferred meta type");
    Ok(Node::MetaValue(MetaValue {
        inferred_type_name: descriptor.name(),
        inner: Box::new(inner),
        descriptor,
    }))
}

fn infer_meta(node: &Node) -> Result<NumericType, ErrorKind> {
    let value = match node {
        Node::Value(value) if value.is_leaf() => value,
        Node::Value(_) => return Err(ErrorKind::DisallowedInMeta("wrapped value")),
        other => return Err(ErrorKind::DisallowedInMeta(other.kind_name())),
    };
    let invalid = || ErrorKind::InvalidNumber(value.literal.clone());
    match value.kind {
        TokenKind::Integer => value
            .literal
            .parse::<i128>()
            .map(meta::infer_int)
            .map_err(|_| invalid()),
        TokenKind::Float => value
            .literal
            .parse::<f64>()
            .map(meta::infer_float)
            .map_err(|_| invalid()),
        TokenKind::Identifier => Err(ErrorKind::DisallowedInMeta("identifier")),
        kind => Err(ErrorKind::NonNumericMeta(kind)),
    }
}

/// `( [param (, param)*] ) [body]`
pub fn parse_function_value<'tok, C: Context<'tok> + ?Sized>(
    c: &mut C,
    declared: bool,
    linked: bool,
) -> Result<Node> {
    c.expect_literal("(")?;
    let mut parameters = Vec::new();
    while !c.at_literal(")") {
        parameters.push(parse_parameter(c)?);
        if !c.at_literal(")") {
            c.expect_literal(",")?;
        }
    }
    c.expect_literal(")")?;

    let external = declared || linked;
    let body = match (c.at_literal("{"), external) {
        (true, false) => Some(parse_body(c)?),
        (false, true) => None,
        (true, true) => return Err(c.fail(ErrorKind::BodyOnExternal)),
        (false, false) => return Err(c.fail(ErrorKind::MissingBody)),
    };

    Ok(Node::FunctionValue(FunctionValue { parameters, body }))
}

/// `name type [copy(bool)]`
fn parse_parameter<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<FunctionParameter> {
    let identifier = c.expect(TokenKind::Identifier)?;
    let type_name = c.expect(TokenKind::TypeName)?;
    let mut copy_allowed = true;
    if c.at(TokenKind::Keyword, "copy") {
        c.advance(1)?;
        c.expect_literal("(")?;
        let flag = c.expect(TokenKind::BoolConstant)?;
        copy_allowed = bool_constant(c, flag)?;
        c.expect_literal(")")?;
    }
    Ok(FunctionParameter {
        identifier: identifier.literal.clone(),
        type_name: type_name.literal.clone(),
        copy_allowed,
    })
}

/// `{ statement* }`
pub fn parse_body<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Vec<Node>> {
    c.expect_literal("{")?;
    let mut statements = Vec::new();
    while !c.at_literal("}") {
        statements.push(parse_statement(c)?);
    }
    c.expect_literal("}")?;
    Ok(statements)
}

/// A function body statement. Only instruction calls are statements.
pub fn parse_statement<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Node> {
    match parse_instruction_call(c)? {
        Attempt::Matched(call) => Ok(call),
        Attempt::NoMatch => {
            let token = c.current()?;
            Err(c.fail_with(format_args!(
                "only instruction calls are allowed in a function body, but got {} {:?}",
                token.kind, token.literal
            )))
        }
    }
}

/// `(instruction | [name]) [value (, value)*] ;`
pub fn parse_instruction_call<'tok, C: Context<'tok> + ?Sized>(
    c: &mut C,
) -> Result<Attempt<Node>> {
    let token = c.current()?;
    let (name, is_user_defined) = match token.kind {
        TokenKind::BaseInstruction => {
            c.advance(1)?;
            (token, false)
        }
        TokenKind::Separator if &*token.literal == "[" => {
            c.advance(1)?;
            let name = c.expect(TokenKind::Identifier)?;
            c.expect_literal("]")?;
            (name, true)
        }
        _ => return Ok(Attempt::NoMatch),
    };

    let mut arguments = Vec::new();
    while !c.at_literal(";") {
        let kind = c.current()?.kind;
        let value = parse_value(c, false, false)?;
        arguments.push(InstructionCallArgument {
            value: Box::new(value),
            kind,
        });
        if !c.at_literal(";") {
            c.expect_literal(",")?;
        }
    }
    c.expect_literal(";")?;

    Ok(Attempt::Matched(Node::InstructionCall(InstructionCall {
        name: name.literal.clone(),
        is_user_defined,
        arguments,
    })))
}

/// Parses a chain of binary operations over single-token operands.
/// Multiplicative operators bind tighter than additive ones, and both
/// associate to the left. A lone operand is returned as is.
pub fn parse_expression<'tok, C: Context<'tok> + ?Sized>(c: &mut C) -> Result<Node> {
    parse_expression_bp(c, 0)
}

fn parse_expression_bp<'tok, C: Context<'tok> + ?Sized>(c: &mut C, min_bp: u8) -> Result<Node> {
    let operand = c.expect_multiple(&[TokenKind::Integer, TokenKind::Float, TokenKind::Identifier])?;
    let mut lhs = leaf(operand);

    while let Some(op) = current_operator(c) {
        let (l_bp, r_bp) = infix_binding_power(op);
        if l_bp < min_bp {
            break;
        }
        c.advance(1)?;
        let rhs = parse_expression_bp(c, r_bp)?;
        lhs = Node::BinaryExpression(BinaryExpression::new(op, lhs, rhs));
    }

    Ok(lhs)
}

fn current_operator<'tok, C: Context<'tok> + ?Sized>(c: &C) -> Option<BinaryOperator> {
    let token = c.current().ok()?;
    if token.kind != TokenKind::BinaryOperator {
        return None;
    }
    let mut chars = token.literal.chars();
    BINARY_OPERATORS.get(&chars.next()?).copied()
}

fn infix_binding_power(op: BinaryOperator) -> (u8, u8) {
    if op.is_multiplicative() {
        (3, 4)
    } else {
        (1, 2)
    }
}

fn bool_constant<'tok, C: Context<'tok> + ?Sized>(c: &C, token: &Token) -> Result<bool> {
    BOOL_CONSTANTS
        .get(&*token.literal)
        .copied()
        .ok_or_else(|| c.fail_at(unexpected_kind(token, "bool constant"), token.pos))
}

fn unexpected<'tok, C: Context<'tok> + ?Sized>(c: &C, context: &'static str) -> Error {
    match c.current() {
        Ok(token) => c.fail(unexpected_kind(token, context)),
        Err(error) => error,
    }
}

fn unexpected_kind(token: &Token, context: &'static str) -> ErrorKind {
    ErrorKind::UnexpectedToken {
        context,
        actual: token.kind,
        literal: token.literal.clone(),
    }
}
