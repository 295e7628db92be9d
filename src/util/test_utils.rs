use crate::{
    lexer,
    parser::{mini, Parser},
    util::tree,
};

/// Each variant contains the input.
pub enum Test {
    /// A whole program, parsed from its top-level statements.
    ParserProgram(&'static str),
    /// A sequence of function body statements.
    ParserStatements(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    ExpectedError(&'static str),
}

/// Runs the input through the pipeline. Returns the printed tree (empty if
/// anything failed) and the formatted error, if any.
#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Option<String>) {
    let (input, statements) = match test {
        Test::ParserProgram(input) => (input, false),
        Test::ParserStatements(input) => (input, true),
    };
    let tokens = match lexer::lex(input) {
        Ok(tokens) => tokens,
        Err(error) => return (String::new(), Some(error.to_string())),
    };
    let mut parser = Parser::new();
    let result = if statements {
        parser.parse_with(&tokens, mini::parse_statement)
    } else {
        parser.parse(&tokens)
    };
    match result {
        Ok(nodes) => (tree::print_nodes_string(&nodes), None),
        Err(error) => (String::new(), Some(error.to_string())),
    }
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, formatted_tree: &str, formatted_error: Option<&str>) {
    match assertion {
        Assertion::TreeOk(expected_tree) => {
            ::pretty_assertions::assert_eq!(formatted_error, None);
            ::pretty_assertions::assert_eq!(formatted_tree.trim(), expected_tree.trim());
        }
        Assertion::ExpectedError(expected_error) => {
            ::pretty_assertions::assert_eq!(formatted_error, Some(expected_error));
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual_tree, formatted_actual_error) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_tree, formatted_actual_error.as_deref());
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_error, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedError($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram(::indoc::indoc! { $source })
    };
    (@@get_test(parser, statements), $source:expr) => {
        crate::util::test_utils::Test::ParserStatements(::indoc::indoc! { $source })
    };
}
pub(crate) use tree_tests;
