use std::fmt::{self, Write};

use crate::{ast::*, token::TokenKind};

const INDENT_WIDTH: usize = 2;

pub fn print_nodes_string(nodes: &[Node]) -> String {
    let mut buf = String::with_capacity(1024);
    print_nodes(&mut buf, nodes).expect("writing to a string never fails");
    buf
}

pub fn print_node_string(node: &Node) -> String {
    let mut buf = String::with_capacity(512);
    print_node(&mut buf, 0, node).expect("writing to a string never fails");
    buf
}

pub fn print_nodes(w: &mut impl Write, nodes: &[Node]) -> fmt::Result {
    for node in nodes {
        print_node(w, 0, node)?;
    }
    Ok(())
}

pub fn print_node(w: &mut impl Write, i: usize, node: &Node) -> fmt::Result {
    match node {
        Node::Declaration(declaration) => print_declaration(w, i, declaration),
        Node::FunctionParameter(parameter) => print_parameter(w, i, parameter),
        Node::FunctionValue(function) => {
            sp(w, i)?;
            write!(w, "function")?;
            if function.body.is_none() {
                write!(w, " (external)")?;
            }
            writeln!(w)?;
            for parameter in &function.parameters {
                print_parameter(w, i + 1, parameter)?;
            }
            if let Some(body) = &function.body {
                sp(w, i + 1)?;
                writeln!(w, "body")?;
                for statement in body {
                    print_node(w, i + 2, statement)?;
                }
            }
            Ok(())
        }
        Node::Value(value) => print_value(w, i, value),
        Node::InstructionCall(call) => {
            sp(w, i)?;
            if call.is_user_defined {
                writeln!(w, "call [{}]", call.name)?;
            } else {
                writeln!(w, "call {}", call.name)?;
            }
            for argument in &call.arguments {
                print_argument(w, i + 1, argument)?;
            }
            Ok(())
        }
        Node::InstructionCallArgument(argument) => print_argument(w, i, argument),
        Node::BinaryExpression(binary) => {
            sp(w, i)?;
            writeln!(w, "binary {}", binary.operator)?;
            print_node(w, i + 1, binary.lhs())?;
            print_node(w, i + 1, binary.rhs())
        }
        Node::ModuleDeclaration(module) => {
            sp(w, i)?;
            writeln!(w, "module {:?}", module.name)?;
            for node in &module.body {
                print_node(w, i + 1, node)?;
            }
            Ok(())
        }
        Node::MetaValue(meta) => {
            sp(w, i)?;
            writeln!(
                w,
                "meta {} (size {}, align {})",
                meta.inferred_type_name,
                meta.descriptor.size(),
                meta.descriptor.align()
            )?;
            print_node(w, i + 1, &meta.inner)
        }
    }
}

fn print_declaration(w: &mut impl Write, i: usize, declaration: &Declaration) -> fmt::Result {
    sp(w, i)?;
    write!(w, "declaration {}: {}", declaration.name, declaration.type_name)?;

    let mut flags = Vec::new();
    if declaration.exported {
        flags.push("exported".to_string());
    }
    if declaration.declared {
        flags.push("declared".to_string());
    }
    if let Some(target) = &declaration.link_target {
        flags.push(format!("linked {target:?}"));
    }
    if !declaration.can_be_linked {
        flags.push("not linkable".to_string());
    }
    if let Some(module) = &declaration.module {
        flags.push(format!("in {module:?}"));
    }
    if !flags.is_empty() {
        write!(w, " ({})", flags.join(", "))?;
    }
    writeln!(w)?;

    print_node(w, i + 1, &declaration.value)
}

fn print_parameter(w: &mut impl Write, i: usize, parameter: &FunctionParameter) -> fmt::Result {
    sp(w, i)?;
    write!(w, "parameter {}: {}", parameter.identifier, parameter.type_name)?;
    if !parameter.copy_allowed {
        write!(w, " (no copy)")?;
    }
    writeln!(w)
}

fn print_argument(w: &mut impl Write, i: usize, argument: &InstructionCallArgument) -> fmt::Result {
    sp(w, i)?;
    writeln!(w, "argument {}", argument.kind)?;
    print_node(w, i + 1, &argument.value)
}

fn print_value(w: &mut impl Write, i: usize, value: &Value) -> fmt::Result {
    sp(w, i)?;
    let Some(inner) = &value.inner else {
        return match value.kind {
            TokenKind::String => writeln!(w, "string {:?}", value.literal),
            kind => writeln!(w, "{kind} {}", value.literal),
        };
    };
    let mut wrappers = Vec::with_capacity(2);
    if value.consteval {
        wrappers.push("consteval");
    }
    if value.copied {
        wrappers.push("copy");
    }
    if wrappers.is_empty() {
        wrappers.push("value");
    }
    writeln!(w, "{}", wrappers.join(" "))?;
    print_node(w, i + 1, inner)
}

fn sp(w: &mut impl Write, i: usize) -> fmt::Result {
    write!(w, "{:1$}", "", i * INDENT_WIDTH)
}
