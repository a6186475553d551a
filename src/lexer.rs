use crate::ast::Position;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Ident,
    Number,
    String,
    Op,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Semicolon,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub typ: TokenType,
    pub value: String,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct LexerError {
    pub message: String,
    pub pos: Position,
}

impl Display for LexerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.pos.line, self.pos.column
        )
    }
}

impl Error for LexerError {}

pub struct Lexer<'a> {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
    keywords: HashSet<&'static str>,
    _source: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
            keywords: keyword_set(),
            _source: source,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        while !self.at_end() {
            let ch = self.peek();
            if is_ignorable_format_char(ch) {
                self.advance();
                continue;
            }
            if ch == ' ' || ch == '\t' || ch == '\r' || ch == '\n' {
                self.advance();
                continue;
            }
            if ch == '/' && self.peek_next() == '/' {
                self.skip_comment();
                continue;
            }
            if ch == '"' {
                tokens.push(self.read_string()?);
                continue;
            }
            if ch.is_ascii_digit() {
                tokens.push(self.read_number());
                continue;
            }
            if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' {
                tokens.push(self.read_identifier());
                continue;
            }
            let pos = self.pos();
            match ch {
                '(' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::LParen,
                        value: "(".to_string(),
                        pos,
                    });
                }
                ')' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::RParen,
                        value: ")".to_string(),
                        pos,
                    });
                }
                '{' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::LBrace,
                        value: "{".to_string(),
                        pos,
                    });
                }
                '}' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::RBrace,
                        value: "}".to_string(),
                        pos,
                    });
                }
                '[' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::LBracket,
                        value: "[".to_string(),
                        pos,
                    });
                }
                ']' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::RBracket,
                        value: "]".to_string(),
                        pos,
                    });
                }
                '.' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::Dot,
                        value: ".".to_string(),
                        pos,
                    });
                }
                ',' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::Comma,
                        value: ",".to_string(),
                        pos,
                    });
                }
                ';' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::Semicolon,
                        value: ";".to_string(),
                        pos,
                    });
                }
                '+' | '-' | '*' | '/' | '%' => {
                    self.advance();
                    tokens.push(Token {
                        typ: TokenType::Op,
                        value: ch.to_string(),
                        pos,
                    });
                }
                '=' | '!' | '<' | '>' => {
                    tokens.push(self.read_comparison());
                }
                '&' | '|' => {
                    tokens.push(self.read_logical()?);
                }
                _ => {
                    return Err(LexerError {
                        message: format!("Unexpected character {:?}", ch),
                        pos,
                    });
                }
            }
        }
        tokens.push(Token {
            typ: TokenType::Eof,
            value: String::new(),
            pos: self.pos(),
        });
        Ok(tokens)
    }

    fn read_comparison(&mut self) -> Token {
        let pos = self.pos();
        let ch = self.advance();
        let mut value = ch.to_string();
        if self.peek() == '=' {
            value.push(self.advance());
        }
        Token {
            typ: TokenType::Op,
            value,
            pos,
        }
    }

    fn read_logical(&mut self) -> Result<Token, LexerError> {
        let pos = self.pos();
        let ch = self.advance();
        if self.peek() != ch {
            return Err(LexerError {
                message: format!("Unexpected character {:?} (expected '{}{}')", ch, ch, ch),
                pos,
            });
        }
        self.advance();
        Ok(Token {
            typ: TokenType::Op,
            value: format!("{}{}", ch, ch),
            pos,
        })
    }

    fn read_identifier(&mut self) -> Token {
        let pos = self.pos();
        let mut text = String::new();
        text.push(self.advance());
        while !self.at_end() {
            let ch = self.peek();
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                text.push(self.advance());
            } else {
                break;
            }
        }
        // Identifiers are case-sensitive; only exact keyword matches fold.
        if self.keywords.contains(text.as_str()) {
            Token {
                typ: TokenType::Keyword,
                value: text,
                pos,
            }
        } else {
            Token {
                typ: TokenType::Ident,
                value: text,
                pos,
            }
        }
    }

    fn read_number(&mut self) -> Token {
        let pos = self.pos();
        let mut text = String::new();
        text.push(self.advance());
        let mut seen_dot = false;
        while !self.at_end() {
            let ch = self.peek();
            if ch.is_ascii_digit() {
                text.push(self.advance());
                continue;
            }
            if ch == '.' && !seen_dot && self.peek_next().is_ascii_digit() {
                seen_dot = true;
                text.push(self.advance());
                continue;
            }
            break;
        }
        Token {
            typ: TokenType::Number,
            value: text,
            pos,
        }
    }

    fn read_string(&mut self) -> Result<Token, LexerError> {
        let pos = self.pos();
        self.advance();
        let mut out = String::new();
        while !self.at_end() {
            let ch = self.advance();
            if ch == '"' {
                return Ok(Token {
                    typ: TokenType::String,
                    value: out,
                    pos,
                });
            }
            if ch == '\\' {
                if self.at_end() {
                    break;
                }
                let esc = self.advance();
                let mapped = match esc {
                    '"' => '"',
                    '\\' => '\\',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    _ => esc,
                };
                out.push(mapped);
                continue;
            }
            if ch == '\n' {
                return Err(LexerError {
                    message: "Unterminated string literal".to_string(),
                    pos,
                });
            }
            out.push(ch);
        }
        Err(LexerError {
            message: "Unterminated string literal".to_string(),
            pos,
        })
    }

    fn skip_comment(&mut self) {
        while !self.at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn at_end(&self) -> bool {
        self.index >= self.chars.len()
    }

    fn peek(&self) -> char {
        if self.at_end() {
            '\0'
        } else {
            self.chars[self.index]
        }
    }

    fn peek_next(&self) -> char {
        if self.index + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.index + 1]
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.index];
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

fn keyword_set() -> HashSet<&'static str> {
    ["let", "if", "else", "while", "true", "false"]
        .into_iter()
        .collect()
}

fn is_ignorable_format_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{feff}' // BOM / zero width no-break space
            | '\u{200b}' // zero width space
            | '\u{200c}' // zero width non-joiner
            | '\u{200d}' // zero width joiner
            | '\u{2060}' // word joiner
    )
}
