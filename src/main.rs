use std::{
    fs,
    io::{self, Read},
};

use anyhow::{anyhow, Context};
use clap::{crate_version, App, Arg, ArgMatches};
use wizarding_syntax::{lex, parse_binding, ASTNode, Location, Parser, PrecedenceTable};

fn read_source(matches: &ArgMatches) -> anyhow::Result<String> {
    if let Some(source) = matches.value_of("expr") {
        return Ok(source.to_string());
    }

    match matches.value_of("file") {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path)),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read stdin")?;
            Ok(source)
        }
    }
}

fn operator_precedence(matches: &ArgMatches) -> anyhow::Result<PrecedenceTable> {
    let mut table = PrecedenceTable::default();
    for binding in matches.values_of("prec").into_iter().flatten() {
        let (op, precedence) = parse_binding(binding)?;
        table.define(op, precedence)?;
    }
    Ok(table)
}

fn describe(node: &ASTNode) -> &'static str {
    match node {
        ASTNode::Extern(_) => "an extern",
        ASTNode::Function(func) if func.prototype.is_anonymous() => "a top-level expr",
        ASTNode::Function(_) => "a function definition",
    }
}

fn report_warnings(parser: &mut Parser, source: &str) {
    for warning in parser.take_warnings() {
        eprintln!(
            "Warning: {}: {}",
            Location::of(source, warning.offset()),
            warning
        );
    }
}

fn main() -> anyhow::Result<()> {
    let matches = App::new("wizarding")
        .version(crate_version!())
        .about("parse wizarding source and print its syntax tree")
        .arg(
            Arg::with_name("file")
                .help("source file to parse, stdin when omitted")
                .index(1),
        )
        .arg(
            Arg::with_name("expr")
                .short("e")
                .long("expr")
                .takes_value(true)
                .value_name("SOURCE")
                .conflicts_with("file")
                .help("parse SOURCE instead of a file"),
        )
        .arg(
            Arg::with_name("prec")
                .short("p")
                .long("prec")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .value_name("OP=PREC")
                .help("add or override a binary operator precedence"),
        )
        .arg(
            Arg::with_name("tokens")
                .short("t")
                .long("tokens")
                .help("print the token stream instead of parsing"),
        )
        .get_matches();

    let source = read_source(&matches)?;
    let table = operator_precedence(&matches)?;

    if matches.is_present("tokens") {
        for token in lex(&source) {
            println!("{}", token);
        }
        return Ok(());
    }

    let mut parser = Parser::new(&source, &table);
    let mut failures = 0;
    while let Some(result) = parser.parse_top_level() {
        report_warnings(&mut parser, &source);

        match result {
            Ok(node) => {
                eprintln!("Parsed {}.", describe(&node));
                println!("{}", node);
            }
            Err(err) => {
                failures += 1;
                eprintln!("Error: {}: {}", Location::of(&source, err.offset()), err);
            }
        }
    }

    report_warnings(&mut parser, &source);

    if failures > 0 {
        return Err(anyhow!("{} top-level construct(s) failed to parse", failures));
    }
    Ok(())
}
