use anyhow::Result;
use clap::Parser as ClapParser;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::io::{BufRead, BufReader, Write};

use lox_lang::diagnostics;
use lox_lang::keywords::load_keywords;
use lox_lang::parser::Parser;
use lox_lang::scanner::token::TokenType;
use lox_lang::scanner::Scanner;

#[derive(ClapParser)]
#[command(name = "lox")]
#[command(about = "Scanner and parser for the Lox language")]
struct Cli {
    /// Script file to parse (omit for REPL)
    script: Option<String>,

    /// Path to keywords JSON file
    #[arg(short, long)]
    keywords: Option<String>,

    /// Print the token stream before parsing
    #[arg(short, long)]
    tokens: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let keywords = load_keywords(cli.keywords.as_deref())?;

    match cli.script {
        None => run_prompt(&keywords, cli.tokens)?,
        Some(path) => run_file(&path, &keywords, cli.tokens)?,
    }

    Ok(())
}

fn run_prompt(keywords: &HashMap<String, TokenType>, show_tokens: bool) -> Result<()> {
    let stdin = io::stdin();
    let reader = BufReader::new(stdin.lock());

    print!("> ");
    io::stdout().flush()?;

    for line in reader.lines() {
        run(&line?, keywords, show_tokens);
        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}

fn run_file(path: &str, keywords: &HashMap<String, TokenType>, show_tokens: bool) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    if !run(&contents, keywords, show_tokens) {
        std::process::exit(65);
    }
    Ok(())
}

/// Returns false when any diagnostic was reported.
fn run(source: &str, keywords: &HashMap<String, TokenType>, show_tokens: bool) -> bool {
    let scanner = Scanner::new(source, keywords);

    let tokens = match scanner.scan_tokens() {
        Ok(tokens) => tokens,
        Err(e) => {
            let message = e.message();
            let hint = diagnostics::suggest_hint(&message);
            eprint!(
                "{}",
                diagnostics::render(source, "lex", e.line(), &message, hint.as_deref())
            );
            return false;
        }
    };

    if show_tokens {
        tokens.iter().for_each(|token| println!("{:?}", token));
    }

    let parser = Parser::new(tokens);
    let (program, errors) = parser.parse();

    for stmt in &program.statements {
        println!("{:?}", stmt);
    }

    for e in &errors {
        let hint = diagnostics::suggest_hint(&e.message);
        eprint!(
            "{}",
            diagnostics::render(source, "parse", e.token.line, &e.message, hint.as_deref())
        );
    }

    errors.is_empty()
}
