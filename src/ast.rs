// program ::= statement*
// statement ::= module | declaration | call
// module ::= STRING ':' '{' statement* '}'
// declaration ::= modifier* ID TYPE value
// modifier ::= 'export' | 'declare' | 'link' '(' (STRING | BOOL) ')'
// value ::= INT | FLOAT | STRING | BOOL | ID
//         | expr
//         | '(' [param (',' param)*] ')' [body]
//         | 'consteval' '(' value ')'
//         | 'copy' '(' value ')'
//         | 'meta' '(' value ')'
// param ::= ID TYPE ['copy' '(' BOOL ')']
// body ::= '{' call* '}'
// call ::= (INSTRUCTION | '[' ID ']') [value (',' value)*] ';'
// expr ::= term (('+' | '-') term)*
// term ::= operand (('*' | '/') operand)*
// operand ::= INT | FLOAT | ID

// Precedence
//
// * /
// + -

use std::fmt;

use serde::Serialize;

use crate::{meta::NumericType, token::TokenKind};

/// The sentinel an absent node serializes to.
pub const NIL: &str = "<nil>";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Declaration(Declaration),
    FunctionParameter(FunctionParameter),
    FunctionValue(FunctionValue),
    Value(Value),
    InstructionCall(InstructionCall),
    InstructionCallArgument(InstructionCallArgument),
    BinaryExpression(BinaryExpression),
    ModuleDeclaration(ModuleDeclaration),
    MetaValue(MetaValue),
}

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Declaration(_) => "declaration",
            Node::FunctionParameter(_) => "function parameter",
            Node::FunctionValue(_) => "function value",
            Node::Value(_) => "value",
            Node::InstructionCall(_) => "instruction call",
            Node::InstructionCallArgument(_) => "instruction call argument",
            Node::BinaryExpression(_) => "binary expression",
            Node::ModuleDeclaration(_) => "module declaration",
            Node::MetaValue(_) => "meta value",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Declaration {
    pub name: Box<str>,
    pub type_name: Box<str>,
    pub exported: bool,
    /// The value is supplied externally (`declare`).
    pub declared: bool,
    /// Set by `link("target")`.
    pub linked: bool,
    pub link_target: Option<Box<str>>,
    /// Set by `link(true)`/`link(false)`; `export` requires it.
    pub can_be_linked: bool,
    /// Innermost module the declaration was found in, if any.
    pub module: Option<Box<str>>,
    pub value: Box<Node>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionParameter {
    pub identifier: Box<str>,
    pub type_name: Box<str>,
    pub copy_allowed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionValue {
    pub parameters: Vec<FunctionParameter>,
    /// Absent for declared or linked functions.
    pub body: Option<Vec<Node>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Value {
    pub literal: Box<str>,
    pub kind: TokenKind,
    pub consteval: bool,
    pub copied: bool,
    /// Only set for `consteval(...)` and `copy(...)` wrappers.
    pub inner: Option<Box<Node>>,
}

impl Value {
    pub fn leaf(literal: impl Into<Box<str>>, kind: TokenKind) -> Value {
        Value {
            literal: literal.into(),
            kind,
            consteval: false,
            copied: false,
            inner: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.inner.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstructionCall {
    pub name: Box<str>,
    /// Called through `[name]` rather than a base instruction mnemonic.
    pub is_user_defined: bool,
    pub arguments: Vec<InstructionCallArgument>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstructionCallArgument {
    pub value: Box<Node>,
    /// Kind of the token the argument starts with.
    pub kind: TokenKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub operands: Box<[Node; 2]>,
}

impl BinaryExpression {
    pub fn new(operator: BinaryOperator, lhs: Node, rhs: Node) -> BinaryExpression {
        BinaryExpression {
            operator,
            operands: Box::new([lhs, rhs]),
        }
    }

    pub fn lhs(&self) -> &Node {
        &self.operands[0]
    }

    pub fn rhs(&self) -> &Node {
        &self.operands[1]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModuleDeclaration {
    pub name: Box<str>,
    /// Declarations, nested modules and instruction calls.
    pub body: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetaValue {
    pub inferred_type_name: &'static str,
    pub inner: Box<Node>,
    pub descriptor: NumericType,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
        }
    }

    pub fn is_multiplicative(self) -> bool {
        matches!(self, BinaryOperator::Mul | BinaryOperator::Div)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes a node as pretty JSON. A missing node yields [`NIL`]; a
/// serializer failure yields its message.
pub fn to_json(node: Option<&Node>) -> String {
    let Some(node) = node else {
        return NIL.to_string();
    };
    serde_json::to_string_pretty(node).unwrap_or_else(|error| error.to_string())
}

/// Serializes a whole program as a pretty JSON array.
pub fn to_json_all(nodes: &[Node]) -> String {
    serde_json::to_string_pretty(nodes).unwrap_or_else(|error| error.to_string())
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    pub fn int(literal: &str) -> Node {
        Node::Value(Value::leaf(literal, TokenKind::Integer))
    }

    pub fn ident(literal: &str) -> Node {
        Node::Value(Value::leaf(literal, TokenKind::Identifier))
    }

    pub fn binary(operator: BinaryOperator, lhs: Node, rhs: Node) -> Node {
        Node::BinaryExpression(BinaryExpression::new(operator, lhs, rhs))
    }
}
