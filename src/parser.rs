use super::ast::{ASTNode, Expression, Function, Prototype};
use super::lexer::{ScanWarning, Scanner, Token};
use super::precedence::PrecedenceTable;

/// Syntax errors. Each carries the byte offset of the offending token and the
/// token that was found there.
#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ParserError {
    #[error("expected function name in prototype, found {1}")]
    ExpectedFunctionName(usize, Token),
    #[error("expected '(' in prototype, found {1}")]
    ExpectedPrototypeOpen(usize, Token),
    #[error("expected ')' in prototype, found {1}")]
    ExpectedPrototypeClose(usize, Token),
    #[error("expected ')', found {1}")]
    ExpectedCloseParen(usize, Token),
    #[error("expected ')' or ',' in argument list, found {1}")]
    ExpectedArgumentDelimiter(usize, Token),
    #[error("expected 'then', found {1}")]
    ExpectedThen(usize, Token),
    #[error("expected 'else', found {1}")]
    ExpectedElse(usize, Token),
    #[error("unknown token when expecting an expression, found {1}")]
    ExpectedExpression(usize, Token),
    #[error("unknown operator '{1}'")]
    UnknownOperator(usize, char),
}

impl ParserError {
    pub fn offset(&self) -> usize {
        match self {
            ParserError::ExpectedFunctionName(offset, _)
            | ParserError::ExpectedPrototypeOpen(offset, _)
            | ParserError::ExpectedPrototypeClose(offset, _)
            | ParserError::ExpectedCloseParen(offset, _)
            | ParserError::ExpectedArgumentDelimiter(offset, _)
            | ParserError::ExpectedThen(offset, _)
            | ParserError::ExpectedElse(offset, _)
            | ParserError::ExpectedExpression(offset, _)
            | ParserError::UnknownOperator(offset, _) => *offset,
        }
    }
}

pub type ParseResult<T> = Result<T, ParserError>;

/// Recursive descent parser with operator-precedence climbing for binary
/// expressions. Tokens are pulled from the scanner one at a time.
#[derive(Debug, Clone)]
pub struct Parser<'t> {
    scanner: Scanner,
    current: Token,
    token_start: usize,
    operator_precedence: &'t PrecedenceTable,
}

impl<'t> Parser<'t> {
    pub fn new(source: &str, operator_precedence: &'t PrecedenceTable) -> Self {
        let mut parser = Self {
            scanner: Scanner::new(source),
            current: Token::Eof,
            token_start: 0,
            operator_precedence,
        };
        parser.advance();
        parser
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Byte offset of the current token in the source.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    pub fn take_warnings(&mut self) -> Vec<ScanWarning> {
        self.scanner.take_warnings()
    }

    fn advance(&mut self) {
        self.current = self.scanner.next_token();
        self.token_start = self.scanner.token_start();
    }

    fn error(&self, kind: fn(usize, Token) -> ParserError) -> ParserError {
        kind(self.token_start, self.current.clone())
    }

    fn expect(
        &mut self,
        expected: Token,
        kind: fn(usize, Token) -> ParserError,
    ) -> ParseResult<()> {
        if self.current != expected {
            return Err(self.error(kind));
        }
        self.advance();
        Ok(())
    }

    /// The current token as a binary operator, if it is one.
    fn binary_operator(&self) -> Option<(char, i32)> {
        match self.current {
            Token::Char(op) => match self.operator_precedence.binary_precedence(&self.current) {
                precedence if precedence > 0 => Some((op, precedence)),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_number(&mut self, value: f64) -> ParseResult<Expression> {
        self.advance();
        Ok(Expression::Literal(value))
    }

    fn parse_identifier(&mut self, name: String) -> ParseResult<Expression> {
        self.advance();
        if self.current != Token::OpenParen {
            return Ok(Expression::Variable(name));
        }
        self.advance();

        let mut args = Vec::new();
        if self.current != Token::CloseParen {
            loop {
                args.push(self.parse_expr()?);

                if self.current == Token::CloseParen {
                    break;
                }
                if self.current != Token::Char(',') {
                    return Err(self.error(ParserError::ExpectedArgumentDelimiter));
                }
                self.advance();
            }
        }
        self.advance();

        Ok(Expression::Call(name, args))
    }

    fn parse_nested(&mut self) -> ParseResult<Expression> {
        self.advance();
        let res = self.parse_expr()?;
        self.expect(Token::CloseParen, ParserError::ExpectedCloseParen)?;
        Ok(res)
    }

    fn parse_conditional(&mut self) -> ParseResult<Expression> {
        self.advance();
        let cond = self.parse_expr()?;
        self.expect(Token::Then, ParserError::ExpectedThen)?;
        let then_branch = self.parse_expr()?;
        self.expect(Token::Else, ParserError::ExpectedElse)?;
        let else_branch = self.parse_expr()?;

        Ok(Expression::Conditional {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current.clone() {
            Token::Number(value) => self.parse_number(value),
            Token::Ident(name) => self.parse_identifier(name),
            Token::OpenParen => self.parse_nested(),
            Token::If => self.parse_conditional(),
            Token::Char(op) if self.operator_precedence.is_disabled(op) => {
                Err(ParserError::UnknownOperator(self.token_start, op))
            }
            _ => Err(self.error(ParserError::ExpectedExpression)),
        }
    }

    fn parse_rhs(&mut self, expr_precedence: i32, lhs: Expression) -> ParseResult<Expression> {
        let mut result = lhs;

        loop {
            let (operator, precedence) = match self.binary_operator() {
                Some((op, pr)) if pr >= expr_precedence => (op, pr),
                _ => return Ok(result),
            };
            self.advance();

            let mut rhs = self.parse_primary()?;

            let next_precedence = self.binary_operator().map_or(-1, |(_, pr)| pr);
            if precedence < next_precedence {
                rhs = self.parse_rhs(precedence + 1, rhs)?;
            }

            result = Expression::Binary(operator, Box::new(result), Box::new(rhs));
        }
    }

    fn parse_expr(&mut self) -> ParseResult<Expression> {
        let lhs = self.parse_primary()?;
        self.parse_rhs(0, lhs)
    }

    fn parse_prototype(&mut self) -> ParseResult<Prototype> {
        let name = match &self.current {
            Token::Ident(name) => name.clone(),
            _ => return Err(self.error(ParserError::ExpectedFunctionName)),
        };
        self.advance();

        if self.current != Token::OpenParen {
            return Err(self.error(ParserError::ExpectedPrototypeOpen));
        }

        let mut params = Vec::new();
        loop {
            self.advance();
            match &self.current {
                Token::Ident(param) => params.push(param.clone()),
                _ => break,
            }
        }

        self.expect(Token::CloseParen, ParserError::ExpectedPrototypeClose)?;
        Ok(Prototype::new(name, params))
    }

    fn parse_definition(&mut self) -> ParseResult<Function> {
        self.advance();
        let prototype = self.parse_prototype()?;
        let body = self.parse_expr()?;
        Ok(Function { prototype, body })
    }

    fn parse_extern(&mut self) -> ParseResult<Prototype> {
        self.advance();
        self.parse_prototype()
    }

    fn parse_top_level_expr(&mut self) -> ParseResult<Function> {
        let body = self.parse_expr()?;
        Ok(Function {
            prototype: Prototype::anonymous(),
            body,
        })
    }

    /// Parse the next top-level construct, skipping `;` separators. Returns
    /// `None` once the input is exhausted. After a failure the offending token
    /// is skipped, so the next call resumes just past it.
    pub fn parse_top_level(&mut self) -> Option<ParseResult<ASTNode>> {
        loop {
            let node = match self.current {
                Token::Eof => return None,
                Token::Char(';') => {
                    self.advance();
                    continue;
                }
                Token::Def => self.parse_definition().map(ASTNode::Function),
                Token::Extern => self.parse_extern().map(ASTNode::Extern),
                _ => self.parse_top_level_expr().map(ASTNode::Function),
            };

            if node.is_err() {
                self.advance();
            }
            return Some(node);
        }
    }
}

impl<'t> Iterator for Parser<'t> {
    type Item = ParseResult<ASTNode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_top_level()
    }
}

/// Parse a whole buffer, stopping at the first syntax error.
pub fn parse_str(input: &str, operator_precedence: &PrecedenceTable) -> ParseResult<Vec<ASTNode>> {
    Parser::new(input, operator_precedence).collect()
}
