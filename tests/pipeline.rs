use dywoq::{
    ast::{self, Node},
    lexer, parse_source,
    parser::{self, ErrorKind},
    token::{self, TokenKind},
};
use pretty_assertions::assert_eq;

static BIG: &str = include_str!("../demos/big.dl");

#[test]
fn test_big_program_parses() {
    let nodes = parse_source(BIG).unwrap();
    // Three free declarations and one module per generated block.
    assert_eq!(nodes.len(), 203);
    assert!(matches!(nodes[0], Node::Declaration(_)));
    assert!(matches!(nodes[3], Node::ModuleDeclaration(_)));
}

#[test]
fn test_instruction_call_program() {
    let nodes = parse_source("mov x, 2+2;").unwrap();
    let [Node::InstructionCall(call)] = nodes.as_slice() else {
        panic!("expected a single instruction call, got {nodes:?}");
    };
    assert_eq!(&*call.name, "mov");
    assert!(!call.is_user_defined);

    let kinds: Vec<_> = call.arguments.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [TokenKind::Identifier, TokenKind::Integer]);
    let Node::BinaryExpression(sum) = &*call.arguments[1].value else {
        panic!("expected a binary expression");
    };
    assert_eq!(sum.operator, ast::BinaryOperator::Add);
}

#[test]
fn test_pipeline_is_deterministic() {
    let first = lexer::lex(BIG).unwrap();
    let second = lexer::lex(BIG).unwrap();
    assert_eq!(first, second);
    assert_eq!(parser::parse(&first).unwrap(), parser::parse(&second).unwrap());
}

#[test]
fn test_literals_match_source() {
    let tokens = lexer::lex(BIG).unwrap();
    for token in &tokens {
        assert_eq!(token.span().substr(BIG), &*token.literal, "{token:?}");
    }
    assert!(tokens.last().is_some_and(token::Token::is_eof));
    assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1);
}

#[test]
fn test_token_json_contract() {
    let tokens = lexer::lex("mov").unwrap();
    let json: serde_json::Value = serde_json::from_str(&token::to_json(Some(&tokens[0]))).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "kind": "base_instruction",
            "literal": "mov",
            "line": 1,
            "column": 1,
            "offset": 0,
        })
    );
    assert_eq!(token::to_json(None), ast::NIL);
}

#[test]
fn test_declaration_json_contract() {
    let nodes = parse_source(r#""m": { export x i8 meta(5) }"#).unwrap();
    let json: serde_json::Value = serde_json::from_str(&ast::to_json_all(&nodes)).unwrap();
    let declaration = &json[0]["body"][0];

    assert_eq!(json[0]["node"], "module_declaration");
    assert_eq!(declaration["node"], "declaration");
    assert_eq!(declaration["exported"], true);
    assert_eq!(declaration["can_be_linked"], true);
    assert_eq!(declaration["module"], "m");
    assert_eq!(declaration["value"]["node"], "meta_value");
    assert_eq!(declaration["value"]["inferred_type_name"], "i8");
    assert_eq!(declaration["value"]["descriptor"]["max"], 127);
    assert_eq!(declaration["value"]["inner"]["kind"], "integer");
}

#[test]
fn test_errors_carry_positions() {
    let error = parse_source("x i32 1\n  y i32 $").unwrap_err();
    assert!(matches!(error, dywoq::Error::Lex(_)));
    assert_eq!(error.position().line, 2);
    assert_eq!(error.position().column, 9);

    let error = parse_source("x i32 1\n  y 2").unwrap_err();
    let dywoq::Error::Parse(parse_error) = &error else {
        panic!("expected a parse error, got {error}");
    };
    assert_eq!(
        parse_error.kind,
        ErrorKind::Unexpected {
            expected: TokenKind::TypeName,
            actual: TokenKind::Integer,
            literal: "2".into(),
        }
    );
    assert_eq!(parse_error.cursor, 4);
    assert_eq!(error.to_string(), r#"2:5: expected type name, but got integer "2""#);
}
