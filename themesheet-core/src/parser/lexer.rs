//! Tokenizer for code override source.

use crate::error::{Result, ThemeError};

/// Token kinds of the override grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Colon,
    Dot,
    Semicolon,
    Arrow,
    Minus,
    Plus,
    Ident(String),
    Str(String),
    Num(f64),
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Arrow => write!(f, "'=>'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Str(_) => write!(f, "string"),
            TokenKind::Num(n) => write!(f, "number {}", n),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// Build a positioned evaluation error.
pub fn error_at(line: usize, column: usize, message: impl std::fmt::Display) -> ThemeError {
    ThemeError::CodeEvaluation {
        message: format!("{} at line {}, column {}", message, line, column),
    }
}

/// Character-level scanner.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);
            let Some(c) = self.bump() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };

            let kind = match c {
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                '-' => TokenKind::Minus,
                '+' => TokenKind::Plus,
                '=' if self.chars.peek() == Some(&'>') => {
                    self.bump();
                    TokenKind::Arrow
                }
                '.' if self.chars.peek().is_some_and(char::is_ascii_digit) => {
                    self.number('.', line, column)?
                }
                '.' => TokenKind::Dot,
                '"' | '\'' => TokenKind::Str(self.string(c, line, column)?),
                '`' => TokenKind::Str(self.template(line, column)?),
                c if c.is_ascii_digit() => self.number(c, line, column)?,
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    let mut ident = String::from(c);
                    while let Some(&n) = self.chars.peek() {
                        if n.is_alphanumeric() || n == '_' || n == '$' {
                            ident.push(n);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    TokenKind::Ident(ident)
                }
                other => {
                    return Err(error_at(
                        line,
                        column,
                        format!("Unexpected character '{}'", other),
                    ))
                }
            };
            tokens.push(Token { kind, line, column });
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let (line, column) = (self.line, self.column);
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    match ahead.next() {
                        Some('/') => {
                            while let Some(c) = self.bump() {
                                if c == '\n' {
                                    break;
                                }
                            }
                        }
                        Some('*') => {
                            self.bump();
                            self.bump();
                            let mut prev = '\0';
                            loop {
                                match self.bump() {
                                    Some('/') if prev == '*' => break,
                                    Some(c) => prev = c,
                                    None => {
                                        return Err(error_at(line, column, "Unterminated comment"))
                                    }
                                }
                            }
                        }
                        _ => return Err(error_at(line, column, "Unexpected character '/'")),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn string(&mut self, quote: char, line: usize, column: usize) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(error_at(line, column, "Unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape(line, column)?),
                Some(c) => out.push(c),
            }
        }
    }

    fn template(&mut self, line: usize, column: usize) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(error_at(line, column, "Unterminated template literal")),
                Some('`') => return Ok(out),
                Some('$') if self.chars.peek() == Some(&'{') => {
                    return Err(error_at(
                        line,
                        column,
                        "Template literal interpolation is not supported",
                    ))
                }
                Some('\\') => out.push(self.escape(line, column)?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, line: usize, column: usize) -> Result<char> {
        let c = match self.bump() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| self.bump()).collect();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| error_at(line, column, "Invalid unicode escape"))?
            }
            Some(other) => other,
            None => return Err(error_at(line, column, "Unterminated string")),
        };
        Ok(c)
    }

    fn number(&mut self, first: char, line: usize, column: usize) -> Result<TokenKind> {
        let mut text = String::from(first);
        let mut seen_exp = false;
        while let Some(&c) = self.chars.peek() {
            let accept = c.is_ascii_digit()
                || c == '.'
                || c == '_'
                || (!seen_exp && (c == 'e' || c == 'E'))
                || ((c == '-' || c == '+') && text.ends_with(&['e', 'E'][..]));
            if !accept {
                break;
            }
            seen_exp |= c == 'e' || c == 'E';
            if c != '_' {
                text.push(c);
            }
            self.bump();
        }
        text.parse::<f64>()
            .map(TokenKind::Num)
            .map_err(|_| error_at(line, column, format!("Invalid number '{}'", text)))
    }
}
