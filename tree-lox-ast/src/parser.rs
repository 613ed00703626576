use std::fmt::{self, Display, Formatter};

use log::warn;
use thiserror::Error;

use crate::{
    expr::Expr,
    scanner::{Token, TokenWithLocation, IDENTIFIER_TOKEN},
    stmt::Stmt,
};

/// Calls and function declarations beyond this many arguments only get a warning.
pub const MAX_ARGUMENTS: usize = 255;
/// Statement nesting, and the height of any expression tree, are capped at this.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    AtEnd,
    AtToken { lexeme: String, kind: &'static str },
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorContext::AtEnd => write!(f, "at end"),
            ErrorContext::AtToken { lexeme, kind } => {
                write!(f, "at '{}' of token type '{}'", lexeme, kind)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error {context}: {msg}")]
pub struct ParseError {
    pub msg: String,
    pub line: usize,
    pub context: ErrorContext,
}

impl ParseError {
    fn at(token: &TokenWithLocation, msg: impl Into<String>) -> Self {
        let context = match token.token {
            Token::Eof => ErrorContext::AtEnd,
            _ => ErrorContext::AtToken {
                lexeme: token.lexeme.clone(),
                kind: token.token.kind_name(),
            },
        };
        Self {
            msg: msg.into(),
            line: token.location.line,
            context,
        }
    }
}

type Result<T> = std::result::Result<T, ParseError>;

macro_rules! define_parsing_rule {
    ($cur_rule:ident, $next_rule:ident, $variant:ident, $p:pat) => {
        fn $cur_rule(&mut self) -> Result<Box<Expr>> {
            use Token::*;
            let mut expr = self.$next_rule()?;
            loop {
                match &self.peek().token {
                    $p => {
                        let left_height = self.height;
                        let operator = self.advance().clone();
                        let right = self.$next_rule()?;
                        self.grow(left_height.max(self.height), &operator)?;
                        expr = Box::new(Expr::$variant {
                            left: expr,
                            operator,
                            right,
                        });
                    }
                    _ => break,
                }
            }
            Ok(expr)
        }
    };
}

pub struct Parser {
    tokens: Vec<TokenWithLocation>,
    current: usize,
    depth: usize,
    // Height of the expression most recently returned by an expression rule.
    height: usize,
}

#[derive(Debug, Default)]
pub struct ParseResult {
    pub stmts: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<TokenWithLocation>) -> Self {
        if tokens.last().map_or(true, |t| t.token != Token::Eof) {
            let location = tokens
                .last()
                .map(|t| t.location.clone())
                .unwrap_or_default();
            tokens.push(TokenWithLocation::new(Token::Eof, "", location));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
            height: 0,
        }
    }

    /// Parses every declaration in the token stream.
    ///
    /// A failing declaration is recorded and the parser resynchronizes at the
    /// next statement boundary, so `errors` holds every syntax error found in
    /// one pass. `stmts` only holds the declarations that parsed cleanly.
    pub fn parse(&mut self) -> ParseResult {
        let mut result = ParseResult::default();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => result.stmts.push(stmt),
                Err(e) => {
                    result.errors.push(e);
                    self.synchronize();
                }
            }
        }
        result
    }

    fn declaration(&mut self) -> Result<Stmt> {
        if self.next_token_is(&Token::Var) {
            self.var_declaration()
        } else if self.next_token_is(&Token::Fun) {
            self.nested(Self::function)
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(&IDENTIFIER_TOKEN, "Expect variable name.")?;
        let initializer = if self.next_token_is(&Token::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(&Token::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(name, initializer))
    }

    fn function(&mut self) -> Result<Stmt> {
        let name = self.consume(&IDENTIFIER_TOKEN, "Expect function name.")?;
        self.consume(&Token::LeftParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.check(&Token::RightParen) {
            loop {
                if params.len() == MAX_ARGUMENTS {
                    warn!(
                        "[line {}] Can't have more than {} parameters.",
                        self.peek().location.line,
                        MAX_ARGUMENTS
                    );
                }
                params.push(self.consume(&IDENTIFIER_TOKEN, "Expect parameter name.")?);
                if !self.next_token_is(&Token::Comma) {
                    break;
                }
            }
        }
        self.consume(&Token::RightParen, "Expect ')' after parameters.")?;
        self.consume(&Token::LeftBrace, "Expect '{' before function body.")?;
        let body = self.block()?;
        Ok(Stmt::Function { name, params, body })
    }

    fn statement(&mut self) -> Result<Stmt> {
        self.nested(|parser| {
            if parser.next_token_is(&Token::For) {
                parser.for_statement()
            } else if parser.next_token_is(&Token::If) {
                parser.if_statement()
            } else if parser.next_token_is(&Token::Print) {
                parser.print_statement()
            } else if parser.next_token_is(&Token::While) {
                parser.while_statement()
            } else if parser.next_token_is(&Token::LeftBrace) {
                Ok(Stmt::Block(parser.block()?))
            } else {
                parser.expression_statement()
            }
        })
    }

    // `for (init; cond; incr) body` becomes `{ init; while (cond) { body; incr; } }`.
    fn for_statement(&mut self) -> Result<Stmt> {
        let for_location = self.previous().location.clone();
        self.consume(&Token::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.next_token_is(&Token::Semicolon) {
            None
        } else if self.next_token_is(&Token::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(&Token::Semicolon) {
            Box::new(Expr::LiteralBool(true, for_location))
        } else {
            self.expression()?
        };
        self.consume(&Token::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(&Token::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&Token::RightParen, "Expect ')' after for clauses.")?;

        let mut body = vec![self.statement()?];
        if let Some(increment) = increment {
            body.push(Stmt::Expression(increment));
        }
        let while_loop = Stmt::While {
            condition,
            body: Box::new(Stmt::Block(body)),
        };

        Ok(Stmt::Block(
            initializer.into_iter().chain([while_loop]).collect(),
        ))
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(&Token::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(&Token::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.next_token_is(&Token::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value = self.expression()?;
        self.consume(&Token::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(&Token::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(&Token::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&Token::RightBrace) && !self.is_at_end() {
            stmts.push(self.declaration()?);
        }
        self.consume(&Token::RightBrace, "Expect '}' after block.")?;
        Ok(stmts)
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.expression()?;
        self.consume(&Token::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn expression(&mut self) -> Result<Box<Expr>> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Box<Expr>> {
        self.nested(|parser| {
            let expr = parser.ternary()?;
            if !parser.check(&Token::Equal) {
                return Ok(expr);
            }
            let equals = parser.advance().clone();
            let value = parser.assignment()?;
            parser.grow(parser.height, &equals)?;
            match *expr {
                Expr::Variable(name) => Ok(Box::new(Expr::Assign { name, expr: value })),
                _ => Err(ParseError::at(&equals, "Invalid assignment target.")),
            }
        })
    }

    // Both branches bind at the equality level, so `a ? b : c ? d : e` needs parentheses.
    fn ternary(&mut self) -> Result<Box<Expr>> {
        let cond = self.logic_or()?;
        if !self.next_token_is(&Token::Question) {
            return Ok(cond);
        }
        let question = self.previous().clone();
        let mut height = self.height;
        let left = self.equality()?;
        height = height.max(self.height);
        self.consume(
            &Token::Colon,
            "Expect ':' after then branch of ternary expression.",
        )?;
        let right = self.equality()?;
        self.grow(height.max(self.height), &question)?;
        Ok(Box::new(Expr::Ternary { cond, left, right }))
    }

    define_parsing_rule! {logic_or, logic_and, Logical, Or}
    define_parsing_rule! {logic_and, equality, Logical, And}
    define_parsing_rule! {equality, comparison, Binary, BangEqual | EqualEqual}
    define_parsing_rule! {comparison, term, Binary, Greater | GreaterEqual | Less | LessEqual}
    define_parsing_rule! {term, factor, Binary, Minus | Plus}
    define_parsing_rule! {factor, unary, Binary, Slash | Star}

    fn unary(&mut self) -> Result<Box<Expr>> {
        use Token::*;
        match &self.peek().token {
            Bang | Minus => {
                let operator = self.advance().clone();
                let right = self.nested(Self::unary)?;
                self.grow(self.height, &operator)?;
                Ok(Box::new(Expr::Unary { operator, right }))
            }
            _ => self.call(),
        }
    }

    fn call(&mut self) -> Result<Box<Expr>> {
        let mut expr = self.primary()?;
        while self.next_token_is(&Token::LeftParen) {
            let callee_height = self.height;
            expr = self.finish_call(expr, callee_height)?;
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Box<Expr>, callee_height: usize) -> Result<Box<Expr>> {
        let mut arguments = Vec::new();
        let mut height = callee_height;
        if !self.check(&Token::RightParen) {
            loop {
                if arguments.len() == MAX_ARGUMENTS {
                    warn!(
                        "[line {}] Can't have more than {} arguments.",
                        self.peek().location.line,
                        MAX_ARGUMENTS
                    );
                }
                arguments.push(*self.expression()?);
                height = height.max(self.height);
                if !self.next_token_is(&Token::Comma) {
                    break;
                }
            }
        }
        let paren = self.consume(&Token::RightParen, "Expect ')' after arguments.")?;
        self.grow(height, &paren)?;
        Ok(Box::new(Expr::Call {
            callee,
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> Result<Box<Expr>> {
        use Token::*;
        let token = self.peek().clone();
        let location = token.location.clone();
        let expr = match &token.token {
            False => Expr::LiteralBool(false, location),
            True => Expr::LiteralBool(true, location),
            Nil => Expr::LiteralNil(location),
            Number(v) => Expr::LiteralNumber(*v, location),
            String(s) => Expr::LiteralString(s.clone(), location),
            Identifier(_) => Expr::Variable(token.clone()),
            LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(&RightParen, "Expect ')' after expression.")?;
                self.grow(self.height, &token)?;
                return Ok(Box::new(Expr::Grouping(expr, location)));
            }
            _ => return Err(ParseError::at(&token, "Expect expression.")),
        };
        self.advance();
        self.height = 1;
        Ok(Box::new(expr))
    }

    // Runs `rule` one nesting level deeper, failing instead of overflowing the stack.
    fn nested<T, F>(&mut self, rule: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::at(self.peek(), "Too much nesting."));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    // Records the height of a node built over children at most `children` high.
    fn grow(&mut self, children: usize, at: &TokenWithLocation) -> Result<()> {
        if children >= MAX_NESTING {
            return Err(ParseError::at(at, "Too much nesting."));
        }
        self.height = children + 1;
        Ok(())
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().token == Token::Semicolon {
                return;
            }
            match self.peek().token {
                Token::Class
                | Token::Fun
                | Token::Var
                | Token::For
                | Token::If
                | Token::While
                | Token::Print
                | Token::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn consume(&mut self, t: &Token, msg: &str) -> Result<TokenWithLocation> {
        if self.check(t) {
            Ok(self.advance().clone())
        } else {
            Err(ParseError::at(self.peek(), msg))
        }
    }

    fn next_token_is(&mut self, t: &Token) -> bool {
        let is_same_type = self.check(t);
        if is_same_type {
            self.advance();
        }
        is_same_type
    }

    fn check(&self, t: &Token) -> bool {
        std::mem::discriminant(t) == std::mem::discriminant(&self.peek().token)
    }

    fn advance(&mut self) -> &TokenWithLocation {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().token == Token::Eof
    }

    fn peek(&self) -> &TokenWithLocation {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &TokenWithLocation {
        // checked_sub is used so this does not panic even when self.tokens consists only of Eof.
        &self.tokens[self.current.checked_sub(1).unwrap_or(0)]
    }
}
