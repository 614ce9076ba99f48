//! Recursive-descent parser producing `zima_core::ast::Program`.
//!
//! Grounded on the teacher's `seq-compiler::parser` idiom: hand-written
//! descent (no parser-generator dependency), a `...Error` enum
//! implementing `Display`/`Error`, one-token lookahead.

use crate::lexer::{LexError, Lexer};
use crate::token::{Spanned, Token};
use std::fmt;
use std::sync::Arc;
use zima_core::ast::{BinaryOp, Expr, Literal, LogicalOp, Program, Stmt, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Lex(String),
    Unexpected { expected: String, got: String, line: u32 },
    Eof(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(msg) => write!(f, "{msg}"),
            ParseError::Unexpected { expected, got, line } => {
                write!(f, "line {line}: expected {expected}, found {got}")
            }
            ParseError::Eof(ctx) => write!(f, "unexpected end of input while parsing {ctx}"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e.to_string())
    }
}

pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].token
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, tok: &Token) -> bool {
        self.current() == tok
    }

    fn matches(&mut self, tok: &Token) -> bool {
        if self.check(tok) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Token, what: &str) -> Result<(), ParseError> {
        if self.check(tok) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                expected: what.to_string(),
                got: format!("{:?}", self.current()),
                line: self.line(),
            })
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.current().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::Unexpected {
                expected: what.to_string(),
                got: format!("{other:?}"),
                line: self.line(),
            }),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.check(&Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_block(&mut self) -> Result<Arc<Vec<Stmt>>, ParseError> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.check(&Token::Eof) {
                return Err(ParseError::Eof("block".into()));
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(Arc::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let stmt = match self.current().clone() {
            Token::Let => {
                self.advance();
                let name = self.expect_ident("binding name")?;
                self.expect(&Token::Eq, "'='")?;
                let value = self.parse_expression()?;
                Stmt::Let { name, value }
            }
            Token::Const => {
                self.advance();
                let name = self.expect_ident("binding name")?;
                self.expect(&Token::Eq, "'='")?;
                let value = self.parse_expression()?;
                Stmt::Const { name, value }
            }
            Token::If => {
                self.advance();
                self.expect(&Token::LParen, "'('")?;
                let cond = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                let then_branch = self.parse_block()?;
                let else_branch = if self.matches(&Token::Else) {
                    if self.check(&Token::If) {
                        let nested = self.parse_statement()?;
                        Some(Arc::new(vec![nested]))
                    } else {
                        Some(self.parse_block()?)
                    }
                } else {
                    None
                };
                return Ok(Stmt::If { cond, then_branch, else_branch });
            }
            Token::While => {
                self.advance();
                self.expect(&Token::LParen, "'('")?;
                let cond = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                let body = self.parse_block()?;
                return Ok(Stmt::While { cond, body });
            }
            Token::Foreach => {
                self.advance();
                self.expect(&Token::LParen, "'('")?;
                let var = self.expect_ident("loop variable")?;
                self.expect(&Token::In, "'in'")?;
                let iterable = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                let body = self.parse_block()?;
                return Ok(Stmt::Foreach { var, iterable, body });
            }
            Token::Break => {
                self.advance();
                self.skip_semicolon();
                return Ok(Stmt::Break);
            }
            Token::Continue => {
                self.advance();
                self.skip_semicolon();
                return Ok(Stmt::Continue);
            }
            Token::Return => {
                self.advance();
                let value = if self.check(&Token::Semicolon) || self.check(&Token::RBrace) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.skip_semicolon();
                return Ok(Stmt::Return(value));
            }
            Token::Function => {
                self.advance();
                let name = self.expect_ident("function name")?;
                let params = self.parse_param_list()?;
                let body = self.parse_block()?;
                return Ok(Stmt::FunctionDecl { name, params, body });
            }
            Token::Import => {
                self.advance();
                let name = self.expect_ident("module name")?;
                self.skip_semicolon();
                return Ok(Stmt::Import(name));
            }
            Token::LBrace => {
                let block = self.parse_block()?;
                return Ok(Stmt::Block(block));
            }
            _ => Stmt::Expr(self.parse_expression()?),
        };
        self.skip_semicolon();
        Ok(stmt)
    }

    fn skip_semicolon(&mut self) {
        self.matches(&Token::Semicolon);
    }

    fn parse_param_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                params.push(self.expect_ident("parameter name")?);
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;
        Ok(params)
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_range()?;
        if self.matches(&Token::Eq) {
            let value = self.parse_assignment()?;
            return Ok(Expr::Assign { target: Box::new(target), value: Box::new(value) });
        }
        Ok(target)
    }

    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let start = self.parse_logical_or()?;
        if self.matches(&Token::DotDot) {
            let end = self.parse_logical_or()?;
            return Ok(Expr::Range { start: Box::new(start), end: Box::new(end) });
        }
        Ok(start)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_logical_and()?;
        while self.matches(&Token::Or) {
            let rhs = self.parse_logical_and()?;
            lhs = Expr::Logical { op: LogicalOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.matches(&Token::And) {
            let rhs = self.parse_equality()?;
            lhs = Expr::Logical { op: LogicalOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let op = match self.current() {
                Token::EqEq => BinaryOp::Eq,
                Token::BangEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current() {
                Token::Lt => BinaryOp::Lt,
                Token::LtEq => BinaryOp::LtEq,
                Token::Gt => BinaryOp::Gt,
                Token::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.current() {
            Token::Minus => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary { op: UnaryOp::Neg, expr: Box::new(expr) })
            }
            Token::Bang => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary { op: UnaryOp::Not, expr: Box::new(expr) })
            }
            _ => self.parse_call_chain(),
        }
    }

    fn parse_call_chain(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current() {
                Token::LParen => {
                    self.advance();
                    let args = self.parse_arg_list()?;
                    expr = Expr::Call { callee: Box::new(expr), args };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&Token::RBracket, "']'")?;
                    expr = Expr::Index { target: Box::new(expr), index: Box::new(index) };
                }
                Token::Dot => {
                    self.advance();
                    let name = self.expect_ident("member name")?;
                    expr = Expr::Member { target: Box::new(expr), name };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(n)))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            Token::Nil => {
                self.advance();
                Ok(Expr::Literal(Literal::Nil))
            }
            Token::New => {
                self.advance();
                let type_name = self.expect_ident("type name")?;
                self.expect(&Token::LParen, "'('")?;
                let args = self.parse_arg_list()?;
                Ok(Expr::New { type_name, args })
            }
            Token::Function => {
                self.advance();
                let params = self.parse_param_list()?;
                let body = self.parse_block()?;
                Ok(Expr::Function { params, body })
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Identifier(name))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&Token::RBracket) {
                    loop {
                        items.push(self.parse_expression()?);
                        if !self.matches(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Token::RBracket, "']'")?;
                Ok(Expr::ArrayLit(items))
            }
            Token::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                if !self.check(&Token::RBrace) {
                    loop {
                        let key = match self.current().clone() {
                            Token::Ident(name) => {
                                self.advance();
                                name
                            }
                            Token::Str(s) => {
                                self.advance();
                                String::from_utf8_lossy(&s).into_owned()
                            }
                            other => {
                                return Err(ParseError::Unexpected {
                                    expected: "object key".into(),
                                    got: format!("{other:?}"),
                                    line: self.line(),
                                });
                            }
                        };
                        self.expect(&Token::Colon, "':'")?;
                        let value = self.parse_expression()?;
                        fields.push((key, value));
                        if !self.matches(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Token::RBrace, "'}'")?;
                Ok(Expr::ObjectLit(fields))
            }
            other => Err(ParseError::Unexpected {
                expected: "expression".into(),
                got: format!("{other:?}"),
                line: self.line(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_let_and_call() {
        let prog = parse("let x = 1; println(x);").unwrap();
        assert_eq!(prog.statements.len(), 2);
    }

    #[test]
    fn parses_stack_scenario_from_spec() {
        let src = "let s = new stack(); s.push(1); s.push(2); s.push(3); println(s.pop()); println(s.peek()); println(s.size());";
        let prog = parse(src).unwrap();
        assert_eq!(prog.statements.len(), 7);
    }

    #[test]
    fn parses_if_else_while_foreach() {
        let src = r#"
            if (x > 0) { println(x); } else { println(0); }
            while (x < 10) { x = x + 1; }
            foreach (item in items) { println(item); }
        "#;
        let prog = parse(src).unwrap();
        assert_eq!(prog.statements.len(), 3);
    }

    #[test]
    fn parses_range_and_object_and_array_literals() {
        let prog = parse("let r = 0..5; let o = { a: 1, b: 2 }; let a = [1, 2, 3];").unwrap();
        assert_eq!(prog.statements.len(), 3);
        match &prog.statements[0] {
            Stmt::Let { value: Expr::Range { .. }, .. } => {}
            other => panic!("expected range expr, got {other:?}"),
        }
    }

    #[test]
    fn parses_assignment_to_index_and_member() {
        let prog = parse("a[0] = 1; obj.field = 2;").unwrap();
        assert_eq!(prog.statements.len(), 2);
        assert!(matches!(&prog.statements[0], Stmt::Expr(Expr::Assign { .. })));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse("let x = ;").is_err());
    }
}
