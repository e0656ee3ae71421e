use super::ast::{
    AssignStatement, Atom, AtomKind, BinaryExpression, ConditionalStatement, ElifBlock, ElseBlock,
    Expression, FnCall, ForLoopStatement, ForUpdate, FunctionAssignStatement, Program,
    ReassignStatement, ReturnStatement, Statement,
};
use super::options::ParserOptions;
use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token, TokenKind, TokenSource};
use tracing::{debug, trace};

/// Recursive-descent parser for Simple
///
/// Pulls tokens on demand from a [`TokenSource`] and keeps two of them in view:
/// `current` and `peek`. Delimiter tokens are consumed explicitly between sub-forms.
pub struct Parser<S = Lexer> {
    source: S,
    current: Token,
    peek: Token,
    options: ParserOptions,
    depth: usize,
}

impl Parser<Lexer> {
    /// Creates a parser that lexes `source` as it goes
    pub fn from_source(source: &str) -> Self {
        Parser::new(Lexer::new(source))
    }
}

impl<S: TokenSource> Parser<S> {
    /// Creates a new parser with default options
    pub fn new(source: S) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    /// Creates a new parser with the given options
    pub fn with_options(mut source: S, options: ParserOptions) -> Self {
        let current = source.next_token();
        let peek = source.next_token();
        Parser {
            source,
            current,
            peek,
            options,
            depth: 0,
        }
    }

    /// Token under the cursor
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// Token after the cursor
    pub fn peek(&self) -> &Token {
        &self.peek
    }

    /// Parses statements until end of input
    ///
    /// Stops at the first error; no partial program is returned.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        self.skip_delimiters();
        while !self.current.is_eof() {
            let statement = self.parse_statement().map_err(|err| {
                debug!(error = %err, "parse failed");
                err
            })?;

            let token = statement.token();
            debug!(
                kind = %token.kind,
                line = token.line,
                column = token.column,
                "parsed statement"
            );
            statements.push(statement);

            self.skip_delimiters();
        }

        Ok(Program { statements })
    }

    /// Parse a single `( ... )` statement, dispatching on the token after `(`
    fn parse_statement(&mut self) -> Result<Statement> {
        self.expect(TokenKind::LeftParen, "`(` to open a statement")?;

        match self.peek.kind {
            TokenKind::Assign => self
                .enter_form(Self::parse_assign_statement)
                .map(Statement::Assign),
            TokenKind::Reassign => self
                .enter_form(Self::parse_reassign_statement)
                .map(Statement::Reassign),
            TokenKind::If => self
                .enter_form(Self::parse_conditional_statement)
                .map(Statement::Conditional),
            TokenKind::Fn => self
                .enter_form(Self::parse_function_assign_statement)
                .map(Statement::FunctionAssign),
            TokenKind::Return => self
                .enter_form(Self::parse_return_statement)
                .map(Statement::Return),
            TokenKind::For => self
                .enter_form(Self::parse_for_loop_statement)
                .map(Statement::ForLoop),
            TokenKind::Ident => self.enter_form(Self::parse_fn_call).map(Statement::Call),
            _ => Err(Self::error_at(
                &self.peek,
                "statement (`:=`, `=`, `if`, `fn`, `return`, `for` or a function name)",
            )),
        }
    }

    /// Parse (:= name value)
    fn parse_assign_statement(&mut self) -> Result<AssignStatement> {
        let token = self.consume(TokenKind::Assign, "`:=`")?;
        self.eat_delimiter()?;
        let name = self.parse_identifier("identifier to assign")?;
        self.eat_delimiter()?;
        let value = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "`)` to close the assignment")?;

        Ok(AssignStatement { token, name, value })
    }

    /// Parse (= name value)
    fn parse_reassign_statement(&mut self) -> Result<ReassignStatement> {
        let token = self.consume(TokenKind::Reassign, "`=`")?;
        self.eat_delimiter()?;
        let name = self.parse_identifier("identifier to reassign")?;
        self.eat_delimiter()?;
        let value = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "`)` to close the reassignment")?;

        Ok(ReassignStatement { token, name, value })
    }

    /// Parse (if cond body... [elif cond body...]* [else body...])
    fn parse_conditional_statement(&mut self) -> Result<ConditionalStatement> {
        let token = self.consume(TokenKind::If, "`if`")?;
        self.eat_delimiter()?;
        let condition = self.parse_expression()?;
        self.eat_delimiter()?;

        let consequence =
            self.parse_block(&[TokenKind::Elif, TokenKind::Else, TokenKind::RightParen])?;

        let mut elif_blocks = Vec::new();
        while self.current.kind == TokenKind::Elif {
            elif_blocks.push(self.parse_elif_block()?);
        }

        let else_block = if self.current.kind == TokenKind::Else {
            Some(self.parse_else_block()?)
        } else {
            None
        };

        self.consume(TokenKind::RightParen, "`)` to close the conditional")?;

        Ok(ConditionalStatement {
            token,
            condition,
            consequence,
            elif_blocks,
            else_block,
        })
    }

    fn parse_elif_block(&mut self) -> Result<ElifBlock> {
        let token = self.consume(TokenKind::Elif, "`elif`")?;
        self.eat_delimiter()?;
        let condition = self.parse_expression()?;
        self.eat_delimiter()?;
        let body = self.parse_block(&[TokenKind::Elif, TokenKind::Else, TokenKind::RightParen])?;

        Ok(ElifBlock {
            token,
            condition,
            body,
        })
    }

    fn parse_else_block(&mut self) -> Result<ElseBlock> {
        let token = self.consume(TokenKind::Else, "`else`")?;
        self.eat_delimiter()?;
        let body = self.parse_block(&[TokenKind::RightParen])?;

        Ok(ElseBlock { token, body })
    }

    /// Parse (fn name params... body...)
    fn parse_function_assign_statement(&mut self) -> Result<FunctionAssignStatement> {
        let token = self.consume(TokenKind::Fn, "`fn`")?;
        self.eat_delimiter()?;
        let name = self.parse_identifier("function name")?;
        self.eat_delimiter()?;

        // Parameters run until the `(` opening the body
        let mut params = Vec::new();
        while !matches!(
            self.current.kind,
            TokenKind::LeftParen | TokenKind::RightParen
        ) {
            params.push(self.parse_identifier("parameter name or `(` to start the body")?);
            if self.current.kind == TokenKind::RightParen {
                break;
            }
            self.eat_delimiter()?;
        }

        let body = self.parse_block(&[TokenKind::RightParen])?;
        self.consume(TokenKind::RightParen, "`)` to close the function")?;

        Ok(FunctionAssignStatement {
            token,
            name,
            params,
            body,
        })
    }

    /// Parse (return value)
    fn parse_return_statement(&mut self) -> Result<ReturnStatement> {
        let token = self.consume(TokenKind::Return, "`return`")?;
        self.eat_delimiter()?;
        let value = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "`)` to close the return")?;

        Ok(ReturnStatement { token, value })
    }

    /// Parse (for (:= i 0) (< i n) (= i (+ i 1)) body...)
    fn parse_for_loop_statement(&mut self) -> Result<ForLoopStatement> {
        let token = self.consume(TokenKind::For, "`for`")?;
        self.eat_delimiter()?;

        self.expect(TokenKind::LeftParen, "`(` to open the loop initializer")?;
        if self.peek.kind != TokenKind::Assign {
            return Err(Self::error_at(&self.peek, "`:=` in the loop initializer"));
        }
        let initializer = self.enter_form(Self::parse_assign_statement)?;
        self.eat_delimiter()?;

        self.expect(TokenKind::LeftParen, "`(` to open the loop condition")?;
        let condition = self.enter_form(Self::parse_binary_expression)?;
        self.eat_delimiter()?;

        self.expect(TokenKind::LeftParen, "`(` to open the loop update")?;
        let update = match self.peek.kind {
            TokenKind::Reassign => self
                .enter_form(Self::parse_reassign_statement)
                .map(ForUpdate::Reassign)?,
            kind if kind.is_binary_operator() => self
                .enter_form(Self::parse_binary_expression)
                .map(ForUpdate::Expression)?,
            _ => {
                return Err(Self::error_at(
                    &self.peek,
                    "`=` or a binary operator in the loop update",
                ))
            }
        };

        let body = if self.current.kind == TokenKind::RightParen {
            Vec::new()
        } else {
            self.eat_delimiter()?;
            self.parse_block(&[TokenKind::RightParen])?
        };
        self.consume(TokenKind::RightParen, "`)` to close the loop")?;

        Ok(ForLoopStatement {
            token,
            initializer,
            condition,
            update,
            body,
        })
    }

    /// Parse (name args...), starting at the callee
    fn parse_fn_call(&mut self) -> Result<FnCall> {
        let token = self.consume(TokenKind::Ident, "function name")?;

        let mut arguments = Vec::new();
        while self.current.kind != TokenKind::RightParen {
            self.eat_delimiter()?;
            arguments.push(self.parse_atom("argument (integer, boolean or identifier)")?);
        }
        self.consume(TokenKind::RightParen, "`)` to close the call")?;

        Ok(FnCall { token, arguments })
    }

    /// Parse an atom or a parenthesized operator/call form
    fn parse_expression(&mut self) -> Result<Expression> {
        match self.current.kind {
            kind if kind.is_atom() => self.parse_atom("expression").map(Expression::Atom),
            TokenKind::LeftParen => match self.peek.kind {
                kind if kind.is_binary_operator() => self
                    .enter_form(Self::parse_binary_expression)
                    .map(Expression::Binary),
                TokenKind::Ident => self.enter_form(Self::parse_fn_call).map(Expression::Call),
                _ => Err(Self::error_at(
                    &self.peek,
                    "binary operator or function name after `(`",
                )),
            },
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parse (op first second), starting at the operator
    fn parse_binary_expression(&mut self) -> Result<BinaryExpression> {
        if !self.current.kind.is_binary_operator() {
            return Err(self.unexpected("binary operator"));
        }
        let token = self.advance();

        self.eat_delimiter()?;
        let first = self.parse_expression()?;
        self.eat_delimiter()?;
        let second = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "`)` to close the expression")?;

        Ok(BinaryExpression {
            token,
            first: Box::new(first),
            second: Box::new(second),
        })
    }

    /// Parse statements separated by delimiters until one of `terminators` is current
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Result<Vec<Statement>> {
        let mut body = Vec::new();

        while !terminators.contains(&self.current.kind) {
            body.push(self.parse_statement()?);

            if terminators.contains(&self.current.kind) {
                break;
            }
            if self.current.is_eof() {
                return Err(self.unexpected("`)`"));
            }
            self.eat_delimiter()?;
        }

        Ok(body)
    }

    fn parse_atom(&mut self, expected: &str) -> Result<Atom> {
        match Atom::from_token(self.current.clone()) {
            Some(atom) => {
                self.advance();
                Ok(atom)
            }
            None => Err(self.unexpected(expected)),
        }
    }

    fn parse_identifier(&mut self, expected: &str) -> Result<Atom> {
        match Atom::from_token(self.current.clone()) {
            Some(atom) if atom.kind == AtomKind::Ident => {
                self.advance();
                Ok(atom)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    // Helper methods

    /// Steps inside the `(` under the cursor and runs `parse` on the form's contents
    fn enter_form<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.options.max_depth,
                line: self.current.line,
                column: self.current.column,
            });
        }

        self.depth += 1;
        self.advance();
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Shifts `peek` into `current`, pulls a new `peek`, and returns the old `current`
    fn advance(&mut self) -> Token {
        let next = self.source.next_token();
        trace!(
            kind = %next.kind,
            literal = ?next.literal,
            line = next.line,
            column = next.column,
            "pulled token"
        );
        let peek = std::mem::replace(&mut self.peek, next);
        std::mem::replace(&mut self.current, peek)
    }

    fn expect(&self, kind: TokenKind, expected: &str) -> Result<()> {
        if self.current.kind == kind {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        self.expect(kind, expected)?;
        Ok(self.advance())
    }

    fn eat_delimiter(&mut self) -> Result<()> {
        self.consume(TokenKind::Delimiter, "delimiter").map(|_| ())
    }

    fn skip_delimiters(&mut self) {
        while self.current.kind == TokenKind::Delimiter {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        Self::error_at(&self.current, expected)
    }

    fn error_at(token: &Token, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind,
            literal: token.literal.clone(),
            line: token.line,
            column: token.column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenBuffer;

    fn parse_str(source: &str) -> Result<Program> {
        Parser::from_source(source).parse_program()
    }

    fn single(source: &str) -> Statement {
        let program = parse_str(source).unwrap();
        assert_eq!(program.statements.len(), 1);
        program.statements.into_iter().next().unwrap()
    }

    fn atom_value(expr: &Expression) -> &str {
        match expr {
            Expression::Atom(atom) => &atom.value,
            other => panic!("Expected atom, got {:?}", other),
        }
    }

    #[test]
    fn test_assign() {
        match single("(:= foo 1)") {
            Statement::Assign(stmt) => {
                assert_eq!(stmt.name.value, "foo");
                assert_eq!(stmt.name.kind, AtomKind::Ident);
                assert_eq!(atom_value(&stmt.value), "1");
                assert_eq!((stmt.token.line, stmt.token.column), (1, 1));
            }
            other => panic!("Expected assign, got {:?}", other),
        }
    }

    #[test]
    fn test_reassign_with_binary() {
        match single("(= foo (+ foo 1))") {
            Statement::Reassign(stmt) => {
                assert_eq!(stmt.name.value, "foo");
                let Expression::Binary(binary) = &stmt.value else {
                    panic!("Expected binary expression");
                };
                assert_eq!(binary.operator(), TokenKind::Add);
                assert_eq!(atom_value(&binary.first), "foo");
                assert_eq!(atom_value(&binary.second), "1");
            }
            other => panic!("Expected reassign, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_binary() {
        match single("(:= x (* (+ a 1) (- b 2)))") {
            Statement::Assign(stmt) => {
                let Expression::Binary(outer) = &stmt.value else {
                    panic!("Expected binary expression");
                };
                assert_eq!(outer.operator(), TokenKind::Multiply);
                assert!(matches!(*outer.first, Expression::Binary(ref b) if b.operator() == TokenKind::Add));
                assert!(matches!(*outer.second, Expression::Binary(ref b) if b.operator() == TokenKind::Subtract));
            }
            other => panic!("Expected assign, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_operators_are_binary() {
        match single("(:= ok (&& a (|| b c)))") {
            Statement::Assign(stmt) => {
                let Expression::Binary(binary) = &stmt.value else {
                    panic!("Expected binary expression");
                };
                assert_eq!(binary.operator(), TokenKind::And);
            }
            other => panic!("Expected assign, got {:?}", other),
        }
    }

    #[test]
    fn test_call_as_expression() {
        match single("(:= y (double x 2))") {
            Statement::Assign(stmt) => {
                let Expression::Call(call) = &stmt.value else {
                    panic!("Expected call expression");
                };
                assert_eq!(call.callee(), "double");
                assert_eq!(call.arguments.len(), 2);
            }
            other => panic!("Expected assign, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_if() {
        match single("(if a (= x 1))") {
            Statement::Conditional(stmt) => {
                assert_eq!(stmt.consequence.len(), 1);
                assert!(stmt.elif_blocks.is_empty());
                assert!(stmt.else_block.is_none());
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_else_is_distinct_from_absent_else() {
        match single("(if a (= x 1) else )") {
            Statement::Conditional(stmt) => {
                let else_block = stmt.else_block.expect("else block");
                assert!(else_block.body.is_empty());
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_elif_blocks() {
        let source = "(if (== n 0) (= r 0)\nelif (== n 1) (= r 1)\nelif (== n 2) (= r 2) (= s 2)\nelse (= r 3))";
        match single(source) {
            Statement::Conditional(stmt) => {
                assert_eq!(stmt.elif_blocks.len(), 2);
                assert_eq!(stmt.elif_blocks[1].body.len(), 2);
                assert_eq!(stmt.elif_blocks[1].token.line, 3);
                assert_eq!(stmt.else_block.map(|b| b.body.len()), Some(1));
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_elif_after_else_is_rejected() {
        let err = parse_str("(if a (= x 1) else (= x 2) elif b (= x 3))").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                found: TokenKind::Elif,
                ..
            }
        ));
    }

    #[test]
    fn test_function_without_body() {
        match single("(fn noop x)") {
            Statement::FunctionAssign(stmt) => {
                assert_eq!(stmt.name.value, "noop");
                assert_eq!(stmt.params.len(), 1);
                assert!(stmt.body.is_empty());
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_function_param_must_be_identifier() {
        let err = parse_str("(fn f 1 (return 1))").unwrap_err();
        let Error::UnexpectedToken {
            expected, found, ..
        } = err
        else {
            panic!("Expected unexpected-token error");
        };
        assert_eq!(found, TokenKind::Int);
        assert!(expected.contains("parameter name"));
    }

    #[test]
    fn test_for_with_expression_update() {
        match single("(for (:= i 0) (< i 5) (+ i 1))") {
            Statement::ForLoop(stmt) => {
                assert!(matches!(stmt.update, ForUpdate::Expression(_)));
                assert!(stmt.body.is_empty());
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_for_initializer_must_assign() {
        let err = parse_str("(for (= i 0) (< i 5) (= i (+ i 1)) (f i))").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                found: TokenKind::Reassign,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_delimiter() {
        let err = parse_str("(:= foo(+ 1 2))").unwrap_err();
        // `foo(+` is one illegal run
        assert!(err.is_lexical());

        let err = parse_str("(+ 1 2)").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                found: TokenKind::Add,
                line: 1,
                column: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_comparison_cannot_lead_statement() {
        for source in ["(== a b)", "(< a b)", "(&& a b)"] {
            assert!(parse_str(source).is_err(), "{} should not parse", source);
        }
    }

    #[test]
    fn test_unclosed_block_reports_eof() {
        let err = parse_str("(if a (= x 1)").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                found: TokenKind::Eof,
                ..
            }
        ));
    }

    #[test]
    fn test_not_is_not_an_expression_operator() {
        let err = parse_str("(:= x (! y))").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedToken {
                found: TokenKind::Not,
                ..
            }
        ));
    }

    #[test]
    fn test_leading_and_trailing_whitespace() {
        let program = parse_str("\n\n  (:= a 1)\n\n(:= b 2)\n").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.statements[0].token().line, 3);
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(parse_str("").unwrap(), Program::default());
        assert_eq!(parse_str(" \n\t").unwrap(), Program::default());
    }

    #[test]
    fn test_depth_limit() {
        let source = "(:= x (+ 1 (+ 1 (+ 1 1))))";
        assert!(parse_str(source).is_ok());

        let options = ParserOptions::default().with_max_depth(3);
        let mut parser = Parser::with_options(Lexer::new(source), options);
        let err = parser.parse_program().unwrap_err();
        assert_eq!(
            err,
            Error::NestingTooDeep {
                limit: 3,
                line: 1,
                column: 16,
            }
        );
    }

    /// Runs `f` on a thread with a 2 MiB stack, the usual default for spawned threads
    fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap()
    }

    /// Sources that open exactly `depth` forms along their deepest path
    fn nested_sources(depth: usize) -> Vec<String> {
        vec![
            format!("{}{}", "(if a ".repeat(depth), ")".repeat(depth)),
            format!("{}{}", "(if a elif b ".repeat(depth), ")".repeat(depth)),
            format!(
                "{}{}",
                "(for (:= i 0) (< i 5) (= i 1) ".repeat(depth - 1),
                ")".repeat(depth - 1)
            ),
            format!(
                "(:= x {}1{})",
                "(+ 1 ".repeat(depth - 1),
                ")".repeat(depth - 1)
            ),
        ]
    }

    #[test]
    fn test_default_depth_fits_small_stack() {
        let limit = ParserOptions::DEFAULT_MAX_DEPTH;
        let results = on_small_stack(move || {
            nested_sources(limit)
                .iter()
                .map(|source| parse_str(source).map(|program| program.statements.len()))
                .collect::<Vec<_>>()
        });

        for result in results {
            assert_eq!(result, Ok(1));
        }
    }

    #[test]
    fn test_one_past_default_depth_is_rejected() {
        let limit = ParserOptions::DEFAULT_MAX_DEPTH;
        let results = on_small_stack(move || {
            nested_sources(limit + 1)
                .iter()
                .map(|source| parse_str(source))
                .collect::<Vec<_>>()
        });

        for result in results {
            assert!(matches!(
                result,
                Err(Error::NestingTooDeep { limit: l, line: 1, .. }) if l == limit
            ));
        }
    }

    #[test]
    fn test_parses_from_token_buffer() {
        let tokens = Lexer::new("(return (* 2 z))").tokenize();
        let mut parser = Parser::new(TokenBuffer::new(tokens));
        let program = parser.parse_program().unwrap();

        assert!(matches!(program.statements[0], Statement::Return(_)));
    }

    #[test]
    fn test_lookahead_window() {
        let parser = Parser::from_source("(:= a 1)");
        assert_eq!(parser.current().kind, TokenKind::LeftParen);
        assert_eq!(parser.peek().kind, TokenKind::Assign);
    }
}
