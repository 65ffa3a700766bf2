//! Scanner and parser for the wizarding language.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod precedence;

pub use ast::{ASTNode, Expression, Function, Prototype};
pub use lexer::{lex, Location, ScanWarning, Scanner, Token};
pub use parser::{parse_str, ParseResult, Parser, ParserError};
pub use precedence::{parse_binding, PrecedenceError, PrecedenceTable};
