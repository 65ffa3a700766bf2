use std::collections::HashMap;

use super::lexer::Token;

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum PrecedenceError {
    #[error("'{0}' cannot be used as a binary operator")]
    ReservedCharacter(char),
    #[error("malformed operator binding '{0}', expected OP=PRECEDENCE")]
    MalformedBinding(String),
    #[error("invalid precedence '{1}' for operator '{0}'")]
    InvalidPrecedence(char, String),
}

/// Binary operator precedences. Higher binds tighter; anything absent or
/// mapped to a non-positive value is not a binary operator.
#[derive(Debug, PartialEq, Clone)]
pub struct PrecedenceTable {
    operators: HashMap<char, i32>,
}

impl std::default::Default for PrecedenceTable {
    fn default() -> Self {
        let mut operators = HashMap::new();
        operators.insert('<', 10);
        operators.insert('+', 20);
        operators.insert('-', 20);
        operators.insert('*', 40);
        Self { operators }
    }
}

fn is_reserved(op: char) -> bool {
    op.is_ascii_alphanumeric()
        || op.is_whitespace()
        || matches!(op, '.' | '#' | '(' | ')' | ',' | ';' | '\0')
}

impl PrecedenceTable {
    pub fn empty() -> Self {
        Self {
            operators: HashMap::new(),
        }
    }

    /// Install or override an operator. A non-positive precedence keeps the
    /// character known to the table but unusable as a binary operator.
    pub fn define(&mut self, op: char, precedence: i32) -> Result<(), PrecedenceError> {
        if is_reserved(op) {
            return Err(PrecedenceError::ReservedCharacter(op));
        }
        self.operators.insert(op, precedence);
        Ok(())
    }

    pub fn get(&self, op: char) -> Option<i32> {
        self.operators.get(&op).copied()
    }

    /// Precedence of `token` in a binary-operator position, or -1.
    pub fn binary_precedence(&self, token: &Token) -> i32 {
        match token {
            Token::Char(op) => match self.get(*op) {
                Some(precedence) if precedence > 0 => precedence,
                _ => -1,
            },
            _ => -1,
        }
    }

    /// True for operators present in the table with a non-positive precedence.
    pub fn is_disabled(&self, op: char) -> bool {
        matches!(self.get(op), Some(precedence) if precedence <= 0)
    }
}

/// Parse an `OP=PRECEDENCE` binding such as `^=50`.
pub fn parse_binding(binding: &str) -> Result<(char, i32), PrecedenceError> {
    let malformed = || PrecedenceError::MalformedBinding(binding.to_string());

    let mut chars = binding.chars();
    let op = chars.next().ok_or_else(malformed)?;
    let rest = chars.as_str();
    let value = rest.strip_prefix('=').ok_or_else(malformed)?.trim();

    let precedence = value
        .parse::<i32>()
        .map_err(|_| PrecedenceError::InvalidPrecedence(op, value.to_string()))?;

    Ok((op, precedence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_table() {
        let table = PrecedenceTable::default();
        assert_eq!(table.get('<'), Some(10));
        assert_eq!(table.get('+'), Some(20));
        assert_eq!(table.get('-'), Some(20));
        assert_eq!(table.get('*'), Some(40));
        assert_eq!(table.get('/'), None);
        assert_eq!(table.get('%'), None);
    }

    #[test]
    fn binary_precedence_of_tokens() {
        let mut table = PrecedenceTable::default();
        table.define('%', 0).unwrap();
        table.define('!', -5).unwrap();

        assert_eq!(table.binary_precedence(&Token::Char('*')), 40);
        assert_eq!(table.binary_precedence(&Token::Char('/')), -1);
        assert_eq!(table.binary_precedence(&Token::Char('%')), -1);
        assert_eq!(table.binary_precedence(&Token::Char('!')), -1);
        assert_eq!(table.binary_precedence(&Token::Ident("x".to_string())), -1);
        assert_eq!(table.binary_precedence(&Token::OpenParen), -1);
        assert_eq!(table.binary_precedence(&Token::Eof), -1);

        assert!(table.is_disabled('%'));
        assert!(table.is_disabled('!'));
        assert!(!table.is_disabled('+'));
        assert!(!table.is_disabled('/'));
    }

    #[test]
    fn define_overrides_and_rejects_reserved() {
        let mut table = PrecedenceTable::empty();
        assert_eq!(table.get('+'), None);
        table.define('^', 50).unwrap();
        table.define('^', 60).unwrap();
        assert_eq!(table.get('^'), Some(60));

        for &op in &['a', '7', '.', '#', '(', ')', ',', ';', ' '] {
            assert_eq!(table.define(op, 1), Err(PrecedenceError::ReservedCharacter(op)));
        }
        assert_eq!(table, {
            let mut only_caret = PrecedenceTable::empty();
            only_caret.define('^', 60).unwrap();
            only_caret
        });
    }

    #[test]
    fn bindings() {
        assert_eq!(parse_binding("^=50"), Ok(('^', 50)));
        assert_eq!(parse_binding("|= 5"), Ok(('|', 5)));
        assert_eq!(parse_binding("%=-1"), Ok(('%', -1)));
        assert_eq!(
            parse_binding(""),
            Err(PrecedenceError::MalformedBinding("".to_string()))
        );
        assert_eq!(
            parse_binding("^50"),
            Err(PrecedenceError::MalformedBinding("^50".to_string()))
        );
        assert_eq!(
            parse_binding("^=high"),
            Err(PrecedenceError::InvalidPrecedence('^', "high".to_string()))
        );
    }
}
