use std::{
    env,
    error::Error,
    fs,
    io::{self, Write},
};

use dywoq::{ast, lexer, parser, token, util::tree};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let result = match env::args().nth(1) {
        Some(path) => dump(&path),
        None => repl(),
    };
    if let Err(error) = result {
        println!("failed to run: {error}");
        std::process::exit(1);
    }
}

/// Prints the tokens and the nodes of the given file as JSON.
fn dump(path: &str) -> Result<(), Box<dyn Error>> {
    let src = fs::read_to_string(path)?;
    let tokens = lexer::lex(&src)?;
    info!(path, tokens = tokens.len(), "lexed file");

    for token in &tokens {
        println!("{}", token::to_json(Some(token)));
    }
    let nodes = parser::parse(&tokens)?;
    println!("{}", ast::to_json_all(&nodes));
    Ok(())
}

fn repl() -> Result<(), Box<dyn Error>> {
    let mut input = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        let n = io::stdin().read_line(&mut input)?;

        if n == 0 {
            println!("^D");
            return Ok(());
        }

        match dywoq::parse_source(&input) {
            Ok(nodes) => print!("{}", tree::print_nodes_string(&nodes)),
            Err(error) => println!("error: {error}"),
        }
    }
}
