use std::fmt;

/// Name given to the prototype wrapping a bare top-level expression. It starts
/// with an underscore, so the scanner can never produce it as an identifier.
pub const ANONYMOUS_FUNCTION: &str = "__anon_expr";

#[derive(Debug, PartialEq, Clone)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

impl Prototype {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_FUNCTION, Vec::new())
    }

    pub fn is_anonymous(&self) -> bool {
        self.name == ANONYMOUS_FUNCTION
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(f64),
    Variable(String),
    Binary(char, Box<Expression>, Box<Expression>),
    Call(String, Vec<Expression>),
    Conditional {
        cond: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Expression,
}

/// A top-level construct, handed one at a time to whatever lowers the tree.
#[derive(Debug, PartialEq, Clone)]
pub enum ASTNode {
    Extern(Prototype),
    Function(Function),
}

impl ASTNode {
    pub fn prototype(&self) -> &Prototype {
        match self {
            ASTNode::Extern(proto) => proto,
            ASTNode::Function(func) => &func.prototype,
        }
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params.join(" "))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Variable(name) => write!(f, "{}", name),
            Expression::Binary(op, lhs, rhs) => write!(f, "({} {} {})", op, lhs, rhs),
            Expression::Call(callee, args) => {
                write!(f, "(call {}", callee)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Conditional {
                cond,
                then_branch,
                else_branch,
            } => write!(f, "(if {} {} {})", cond, then_branch, else_branch),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(def {} {})", self.prototype, self.body)
    }
}

impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Extern(proto) => write!(f, "(extern {})", proto),
            ASTNode::Function(func) => write!(f, "{}", func),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> Box<Expression> {
        Box::new(Expression::Variable(name.to_string()))
    }

    #[test]
    fn display_expression() {
        let expr = Expression::Binary(
            '+',
            Box::new(Expression::Literal(1.0)),
            Box::new(Expression::Binary(
                '*',
                Box::new(Expression::Literal(2.5)),
                var("x"),
            )),
        );
        assert_eq!(expr.to_string(), "(+ 1 (* 2.5 x))");
    }

    #[test]
    fn display_function() {
        let node = ASTNode::Function(Function {
            prototype: Prototype::new("baz", vec!["x".to_string()]),
            body: Expression::Conditional {
                cond: var("x"),
                then_branch: Box::new(Expression::Call("foo".to_string(), vec![])),
                else_branch: Box::new(Expression::Call(
                    "bar".to_string(),
                    vec![Expression::Variable("x".to_string())],
                )),
            },
        });
        assert_eq!(
            node.to_string(),
            "(def baz(x) (if x (call foo) (call bar x)))"
        );
    }

    #[test]
    fn display_extern() {
        let node = ASTNode::Extern(Prototype::new(
            "atan2",
            vec!["y".to_string(), "x".to_string()],
        ));
        assert_eq!(node.to_string(), "(extern atan2(y x))");
        assert_eq!(node.prototype().arity(), 2);
    }

    #[test]
    fn anonymous_prototype() {
        let proto = Prototype::anonymous();
        assert!(proto.is_anonymous());
        assert_eq!(proto.arity(), 0);
        assert!(!Prototype::new("anon", vec![]).is_anonymous());
    }
}
