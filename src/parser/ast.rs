use crate::lexer::{Token, TokenKind};
use serde::{Deserialize, Serialize};

/// Complete Simple program
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements in source order
    pub statements: Vec<Statement>,
}

impl Program {
    /// Renders the tree as pretty-printed JSON
    ///
    /// Output only: serde_json's reader stops at 128 levels of nesting, which a tree
    /// well inside the parser's depth limit can exceed. Consumers that need the tree
    /// back take it through [`serde_json::Value`] or use the `Program` directly.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// First assignment: `(:= name value)`
    Assign(AssignStatement),
    /// Reassignment: `(= name value)`
    Reassign(ReassignStatement),
    /// `(if cond body... elif cond body... else body...)`
    Conditional(ConditionalStatement),
    /// Function definition: `(fn name params... body...)`
    FunctionAssign(FunctionAssignStatement),
    /// `(return value)`
    Return(ReturnStatement),
    /// `(for (init) (cond) (update) body...)`
    ForLoop(ForLoopStatement),
    /// Function call used as a statement: `(name args...)`
    Call(FnCall),
}

impl Statement {
    /// Token that introduced this statement
    pub fn token(&self) -> &Token {
        match self {
            Statement::Assign(stmt) => &stmt.token,
            Statement::Reassign(stmt) => &stmt.token,
            Statement::Conditional(stmt) => &stmt.token,
            Statement::FunctionAssign(stmt) => &stmt.token,
            Statement::Return(stmt) => &stmt.token,
            Statement::ForLoop(stmt) => &stmt.token,
            Statement::Call(call) => &call.token,
        }
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer, boolean or identifier leaf
    Atom(Atom),
    /// Prefix operator form `(op a b)`
    Binary(BinaryExpression),
    /// Function call `(name args...)`
    Call(FnCall),
}

impl Expression {
    /// Token that introduced this expression
    pub fn token(&self) -> &Token {
        match self {
            Expression::Atom(atom) => &atom.token,
            Expression::Binary(binary) => &binary.token,
            Expression::Call(call) => &call.token,
        }
    }
}

/// `(:= name value)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStatement {
    /// The `:=` token
    pub token: Token,
    /// Identifier being bound
    pub name: Atom,
    /// Bound value
    pub value: Expression,
}

/// `(= name value)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignStatement {
    /// The `=` token
    pub token: Token,
    /// Identifier being rebound
    pub name: Atom,
    /// New value
    pub value: Expression,
}

/// `if` with optional `elif` chains and an optional `else`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalStatement {
    /// The `if` token
    pub token: Token,
    /// Condition guarding the first body
    pub condition: Expression,
    /// Statements run when `condition` holds
    pub consequence: Vec<Statement>,
    /// `elif` blocks in source order
    pub elif_blocks: Vec<ElifBlock>,
    /// `None` when the source has no `else` clause at all
    pub else_block: Option<ElseBlock>,
}

/// `elif cond body...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElifBlock {
    /// The `elif` token
    pub token: Token,
    /// Block condition
    pub condition: Expression,
    /// Block statements
    pub body: Vec<Statement>,
}

/// `else body...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseBlock {
    /// The `else` token
    pub token: Token,
    /// Block statements (possibly empty)
    pub body: Vec<Statement>,
}

/// `(fn name params... body...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionAssignStatement {
    /// The `fn` token
    pub token: Token,
    /// Function name
    pub name: Atom,
    /// Parameter identifiers
    pub params: Vec<Atom>,
    /// Function body
    pub body: Vec<Statement>,
}

/// `(return value)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    /// The `return` token
    pub token: Token,
    /// Returned value
    pub value: Expression,
}

/// `(for (:= i 0) (< i n) (= i (+ i 1)) body...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoopStatement {
    /// The `for` token
    pub token: Token,
    /// Runs once before the first iteration
    pub initializer: AssignStatement,
    /// Checked before every iteration
    pub condition: BinaryExpression,
    /// Runs after every iteration
    pub update: ForUpdate,
    /// Loop body
    pub body: Vec<Statement>,
}

/// Update clause of a `for` loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForUpdate {
    /// `(= i (+ i 1))`
    Reassign(ReassignStatement),
    /// Bare operator form such as `(+ i 1)`
    Expression(BinaryExpression),
}

/// Classification of an [`Atom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomKind {
    /// Integer literal
    Int,
    /// `true` or `false`
    Bool,
    /// Identifier reference
    Ident,
}

/// Leaf expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Originating token
    pub token: Token,
    /// Raw literal text
    pub value: String,
    /// Literal classification
    pub kind: AtomKind,
}

impl Atom {
    /// Builds an atom from an integer, boolean or identifier token
    pub fn from_token(token: Token) -> Option<Atom> {
        let kind = match token.kind {
            TokenKind::Int => AtomKind::Int,
            TokenKind::Bool => AtomKind::Bool,
            TokenKind::Ident => AtomKind::Ident,
            _ => return None,
        };
        Some(Atom {
            value: token.literal.clone(),
            token,
            kind,
        })
    }

    /// Integer value, if this is an integer literal that fits in an `i64`
    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            AtomKind::Int => self.value.parse().ok(),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean literal
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            AtomKind::Bool => Some(self.value == "true"),
            _ => None,
        }
    }

    /// Identifier name, if this is an identifier
    pub fn as_ident(&self) -> Option<&str> {
        match self.kind {
            AtomKind::Ident => Some(&self.value),
            _ => None,
        }
    }
}

/// Prefix binary operator form `(op first second)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    /// Operator token
    pub token: Token,
    /// Left operand
    pub first: Box<Expression>,
    /// Right operand
    pub second: Box<Expression>,
}

impl BinaryExpression {
    /// Operator kind
    pub fn operator(&self) -> TokenKind {
        self.token.kind
    }
}

/// `(callee args...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnCall {
    /// Callee identifier token
    pub token: Token,
    /// Arguments, each a leaf expression
    pub arguments: Vec<Atom>,
}

impl FnCall {
    /// Name of the called function
    pub fn callee(&self) -> &str {
        &self.token.literal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_classification() {
        let int = Atom::from_token(Token::new(TokenKind::Int, "42", 1, 0)).unwrap();
        assert_eq!(int.kind, AtomKind::Int);
        assert_eq!(int.as_int(), Some(42));
        assert_eq!(int.as_bool(), None);

        let boolean = Atom::from_token(Token::new(TokenKind::Bool, "false", 1, 0)).unwrap();
        assert_eq!(boolean.as_bool(), Some(false));

        let ident = Atom::from_token(Token::new(TokenKind::Ident, "foo", 1, 0)).unwrap();
        assert_eq!(ident.as_ident(), Some("foo"));
        assert_eq!(ident.as_int(), None);

        assert!(Atom::from_token(Token::new(TokenKind::LeftParen, "(", 1, 0)).is_none());
    }

    #[test]
    fn test_oversized_integer_has_no_value() {
        let atom =
            Atom::from_token(Token::new(TokenKind::Int, "99999999999999999999", 1, 0)).unwrap();
        assert_eq!(atom.kind, AtomKind::Int);
        assert_eq!(atom.as_int(), None);
    }
}
