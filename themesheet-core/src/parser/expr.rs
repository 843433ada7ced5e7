//! Closed-grammar parser turning override source into DSL nodes.
//!
//! Only object/array/literal expressions, member reads on whitelisted
//! identifiers, whitelisted calls and arrow functions are recognized. Nothing
//! is executed: every theme access is captured as a typed placeholder.

use super::lexer::{error_at, Token, TokenKind};
use crate::color::HELPERS;
use crate::error::{Result, ThemeError};
use crate::model::{BreakpointDirection, BreakpointKey, DslNode};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// What an identifier in scope refers to.
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    /// The theme object.
    Theme,
    /// A color helper function.
    Helper,
    /// A style-callback props value, or a field of it.
    Props(Vec<String>),
}

/// One postfix step of a member chain.
#[derive(Debug)]
enum Step {
    Member(String),
    Call(Vec<DslNode>),
}

/// Recursive-descent parser over a token stream.
pub struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    scopes: Vec<HashMap<String, Binding>>,
}

impl ExprParser {
    /// Create a parser with the top-level identifiers in scope.
    pub fn new(tokens: Vec<Token>, max_depth: usize) -> Self {
        let mut globals = HashMap::new();
        globals.insert("theme".to_string(), Binding::Theme);
        for helper in HELPERS {
            globals.insert(helper.to_string(), Binding::Helper);
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
            scopes: vec![globals],
        }
    }

    /// Parse a whole program: one expression, an optional `;`, then EOF.
    pub fn parse_program(&mut self) -> Result<DslNode> {
        let node = self.parse_expr()?;
        self.eat(&TokenKind::Semicolon);
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            return Err(self.unexpected(token));
        }
        Ok(node)
    }

    // ==================== token helpers ====================

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.eat(&kind) {
            Ok(())
        } else {
            let token = self.peek();
            Err(error_at(
                token.line,
                token.column,
                format!("Expected {} but found {}", kind, token.kind),
            ))
        }
    }

    fn unexpected(&self, token: &Token) -> ThemeError {
        if token.kind == TokenKind::Eof {
            error_at(token.line, token.column, "Unexpected end of input")
        } else {
            error_at(token.line, token.column, format!("Unexpected {}", token.kind))
        }
    }

    fn error_here(&self, message: impl std::fmt::Display) -> ThemeError {
        let token = self.peek();
        error_at(token.line, token.column, message)
    }

    fn lookup(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    // ==================== expressions ====================

    fn parse_expr(&mut self) -> Result<DslNode> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error_here(format!(
                "Expression nested deeper than {} levels",
                self.max_depth
            )));
        }
        let result = self.parse_expr_inner();
        self.depth -= 1;
        result
    }

    fn parse_expr_inner(&mut self) -> Result<DslNode> {
        if self.at_arrow() {
            return self.parse_arrow();
        }

        let token = self.peek().clone();
        match &token.kind {
            TokenKind::LBrace => self.parse_object(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Ok(DslNode::literal(s))
            }
            TokenKind::Num(n) => {
                let n = *n;
                self.advance();
                Ok(number_literal(n))
            }
            TokenKind::Minus | TokenKind::Plus => {
                self.advance();
                let sign = if token.kind == TokenKind::Minus { -1.0 } else { 1.0 };
                let next = self.advance();
                match next.kind {
                    TokenKind::Num(n) => Ok(number_literal(sign * n)),
                    _ => Err(error_at(
                        next.line,
                        next.column,
                        "Unary operators only apply to number literals",
                    )),
                }
            }
            TokenKind::Ident(name) => match name.as_str() {
                "true" => self.keyword(Value::Bool(true)),
                "false" => self.keyword(Value::Bool(false)),
                "null" | "undefined" => self.keyword(Value::Null),
                _ => self.parse_reference(),
            },
            _ => Err(self.unexpected(&token)),
        }
    }

    fn keyword(&mut self, value: Value) -> Result<DslNode> {
        self.advance();
        Ok(DslNode::Literal { value })
    }

    fn parse_object(&mut self) -> Result<DslNode> {
        self.expect(TokenKind::LBrace)?;
        let mut entries: Vec<(String, DslNode)> = Vec::new();

        while !self.eat(&TokenKind::RBrace) {
            let token = self.advance();
            let (key, computed) = match &token.kind {
                TokenKind::Ident(name) => (name.clone(), None),
                TokenKind::Str(s) => (s.clone(), None),
                TokenKind::Num(n) => (crate::config::number::css(*n), None),
                TokenKind::LBracket => {
                    let expr = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    computed_key(expr)
                        .map_err(|message| error_at(token.line, token.column, message))?
                }
                _ => return Err(self.unexpected(&token)),
            };
            self.expect(TokenKind::Colon)?;
            let value = match computed {
                Some(key) => DslNode::Keyed {
                    key: Box::new(key),
                    value: Box::new(self.parse_expr()?),
                },
                None => self.parse_expr()?,
            };

            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => entries.push((key, value)),
            }

            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::RBrace)?;
                break;
            }
        }

        Ok(DslNode::Object { entries })
    }

    fn parse_array(&mut self) -> Result<DslNode> {
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();

        while !self.eat(&TokenKind::RBracket) {
            items.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::RBracket)?;
                break;
            }
        }

        Ok(DslNode::Array { items })
    }

    fn parse_args(&mut self) -> Result<Vec<DslNode>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.eat(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        Ok(args)
    }

    // ==================== references ====================

    /// Parse `ident(.member | [index] | (args))*` and classify it.
    fn parse_reference(&mut self) -> Result<DslNode> {
        let start = self.advance();
        let TokenKind::Ident(name) = start.kind.clone() else {
            return Err(self.unexpected(&start));
        };
        let binding = self.lookup(&name).cloned().ok_or_else(|| {
            error_at(
                start.line,
                start.column,
                format!("Unknown identifier '{}'", name),
            )
        })?;

        let mut steps = Vec::new();
        loop {
            match self.peek().kind.clone() {
                TokenKind::Dot => {
                    self.advance();
                    let token = self.advance();
                    match &token.kind {
                        TokenKind::Ident(member) => steps.push(Step::Member(member.clone())),
                        _ => return Err(self.unexpected(&token)),
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let token = self.advance();
                    let member = match &token.kind {
                        TokenKind::Num(n) if *n >= 0.0 && n.fract() == 0.0 => format!("{}", *n as u64),
                        TokenKind::Str(s) => s.clone(),
                        _ => {
                            return Err(error_at(
                                token.line,
                                token.column,
                                "Only literal indexes are supported",
                            ))
                        }
                    };
                    self.expect(TokenKind::RBracket)?;
                    steps.push(Step::Member(member));
                }
                TokenKind::LParen => steps.push(Step::Call(self.parse_args()?)),
                _ => break,
            }
        }

        classify_reference(&name, &binding, steps)
            .map_err(|message| error_at(start.line, start.column, message))
    }

    // ==================== arrow functions ====================

    /// Whether the upcoming tokens start an arrow function.
    fn at_arrow(&self) -> bool {
        match self.peek_kind_at(0) {
            Some(TokenKind::Ident(_)) => self.peek_kind_at(1) == Some(&TokenKind::Arrow),
            Some(TokenKind::LParen) => {
                let mut depth = 0usize;
                let mut offset = 0;
                while let Some(kind) = self.peek_kind_at(offset) {
                    match kind {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                return self.peek_kind_at(offset + 1) == Some(&TokenKind::Arrow);
                            }
                        }
                        TokenKind::Eof => return false,
                        _ => {}
                    }
                    offset += 1;
                }
                false
            }
            _ => false,
        }
    }

    fn parse_arrow(&mut self) -> Result<DslNode> {
        let mut scope = HashMap::new();
        let mut params = Vec::new();

        if self.eat(&TokenKind::LParen) {
            while !self.eat(&TokenKind::RParen) {
                self.parse_param(&mut scope, &mut params)?;
                if !self.eat(&TokenKind::Comma) {
                    self.expect(TokenKind::RParen)?;
                    break;
                }
            }
        } else {
            self.parse_param(&mut scope, &mut params)?;
        }
        self.expect(TokenKind::Arrow)?;

        self.scopes.push(scope);
        let body = self.parse_arrow_body();
        self.scopes.pop();

        Ok(DslNode::Callback {
            params,
            body: Box::new(body?),
        })
    }

    fn parse_param(
        &mut self,
        scope: &mut HashMap<String, Binding>,
        params: &mut Vec<String>,
    ) -> Result<()> {
        let token = self.advance();
        if !params.is_empty() {
            return Err(error_at(
                token.line,
                token.column,
                "Style callbacks take a single props argument",
            ));
        }
        match &token.kind {
            TokenKind::Ident(name) => {
                scope.insert(name.clone(), Binding::Props(Vec::new()));
                params.push(name.clone());
                Ok(())
            }
            TokenKind::LBrace => {
                let mut fields = Vec::new();
                while !self.eat(&TokenKind::RBrace) {
                    let token = self.advance();
                    let TokenKind::Ident(field) = token.kind.clone() else {
                        return Err(self.unexpected(&token));
                    };
                    let alias = if self.eat(&TokenKind::Colon) {
                        let token = self.advance();
                        match &token.kind {
                            TokenKind::Ident(alias) => alias.clone(),
                            _ => return Err(self.unexpected(&token)),
                        }
                    } else {
                        field.clone()
                    };
                    let binding = if field == "theme" {
                        Binding::Theme
                    } else {
                        Binding::Props(vec![field.clone()])
                    };
                    scope.insert(alias, binding);
                    fields.push(field);
                    if !self.eat(&TokenKind::Comma) {
                        self.expect(TokenKind::RBrace)?;
                        break;
                    }
                }
                params.push(format!("{{ {} }}", fields.join(", ")));
                Ok(())
            }
            _ => Err(self.unexpected(&token)),
        }
    }

    fn parse_arrow_body(&mut self) -> Result<DslNode> {
        if self.peek().kind != TokenKind::LBrace {
            return self.parse_expr();
        }
        if self.peek_kind_at(1) != Some(&TokenKind::Ident("return".to_string())) {
            return Err(self.error_here(
                "Arrow functions returning an object must wrap it in parentheses",
            ));
        }
        self.advance();
        self.advance();
        let body = self.parse_expr()?;
        self.eat(&TokenKind::Semicolon);
        self.expect(TokenKind::RBrace)?;
        Ok(body)
    }
}

fn number_literal(n: f64) -> DslNode {
    let value = if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    };
    DslNode::Literal { value }
}

fn literal_number(node: &DslNode) -> Option<f64> {
    match node {
        DslNode::Literal { value } => value.as_f64(),
        _ => None,
    }
}

fn breakpoint_key(node: &DslNode) -> Option<BreakpointKey> {
    match node {
        DslNode::Literal {
            value: Value::String(s),
        } => Some(BreakpointKey::Named(s.clone())),
        DslNode::Literal {
            value: Value::Number(n),
        } => n.as_f64().map(BreakpointKey::Width),
        _ => None,
    }
}

/// Entry key of a computed `[expr]` key.
///
/// Literals become plain keys. Breakpoint queries and theme reads get a
/// dot-free label and travel with the entry so hydration can compute the key.
fn computed_key(node: DslNode) -> std::result::Result<(String, Option<DslNode>), String> {
    let label = match &node {
        DslNode::Literal {
            value: Value::String(s),
        } => return Ok((s.clone(), None)),
        DslNode::Literal {
            value: Value::Number(n),
        } => {
            let key = n.as_f64().map(crate::config::number::css).unwrap_or_else(|| n.to_string());
            return Ok((key, None));
        }
        DslNode::Breakpoint {
            key,
            direction,
            end: Some(end),
        } => format!("@{}({},{})", direction, key, end),
        DslNode::Breakpoint { key, direction, .. } => format!("@{}({})", direction, key),
        DslNode::Token { path } => format!("@{}", path),
        _ => {
            return Err(
                "Computed keys must be a string, a number, a breakpoint query or a theme value"
                    .to_string(),
            )
        }
    };
    Ok((label.replace('.', "_"), Some(node)))
}

/// Turn a resolved identifier plus its postfix steps into a DSL node.
fn classify_reference(
    name: &str,
    binding: &Binding,
    steps: Vec<Step>,
) -> std::result::Result<DslNode, String> {
    match binding {
        Binding::Helper => match steps.as_slice() {
            [Step::Call(args)] => Ok(DslNode::Helper {
                name: name.to_string(),
                args: args.clone(),
            }),
            _ => Err(format!("'{}' must be called directly", name)),
        },
        Binding::Theme => classify_theme(name, steps),
        Binding::Props(prefix) => {
            let mut path = prefix.clone();
            let mut steps = steps.into_iter();
            while let Some(step) = steps.next() {
                match step {
                    Step::Member(member) if path.is_empty() && member == "theme" => {
                        return classify_theme(name, steps.collect());
                    }
                    Step::Member(member) => path.push(member),
                    Step::Call(_) => {
                        return Err(format!("Cannot call '{}.{}'", name, path.join(".")));
                    }
                }
            }
            Ok(DslNode::Prop {
                path: path.join("."),
            })
        }
    }
}

fn classify_theme(name: &str, steps: Vec<Step>) -> std::result::Result<DslNode, String> {
    let mut path: Vec<String> = Vec::new();
    let mut call: Option<Vec<DslNode>> = None;

    for step in steps {
        if call.is_some() {
            return Err(format!(
                "Cannot access members of the result of '{}.{}()'",
                name,
                path.join(".")
            ));
        }
        match step {
            Step::Member(member) => path.push(member),
            Step::Call(args) => call = Some(args),
        }
    }

    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    match (segments.as_slice(), call) {
        ([], None) => Err(format!("Bare '{}' cannot be used as a value", name)),
        (_, None) => Ok(DslNode::Token {
            path: path.join("."),
        }),
        (["spacing"], Some(args)) => {
            let factors = args
                .iter()
                .map(literal_number)
                .collect::<Option<Vec<f64>>>()
                .filter(|f| !f.is_empty() && f.len() <= 4)
                .ok_or_else(|| format!("{}.spacing() expects 1 to 4 numeric arguments", name))?;
            Ok(DslNode::Spacing { factors })
        }
        (["breakpoints", method], Some(args)) => {
            let direction = BreakpointDirection::from_method(method)
                .ok_or_else(|| format!("Unknown breakpoint helper '{}'", method))?;
            let keys = args
                .iter()
                .map(breakpoint_key)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| format!("{}.breakpoints.{}() expects literal keys", name, method))?;
            let expected = if direction == BreakpointDirection::Between { 2 } else { 1 };
            if keys.len() != expected {
                return Err(format!(
                    "{}.breakpoints.{}() expects {} argument(s)",
                    name, method, expected
                ));
            }
            let mut keys = keys.into_iter();
            Ok(DslNode::Breakpoint {
                key: keys.next().unwrap_or(BreakpointKey::Width(0.0)),
                direction,
                end: keys.next(),
            })
        }
        (["palette", "getContrastText"], Some(args)) => Ok(DslNode::Helper {
            name: "getContrastText".to_string(),
            args,
        }),
        (_, Some(_)) => Err(format!("Unsupported call '{}.{}()'", name, path.join("."))),
    }
}
