use phf::phf_map;
use std::str::FromStr;
use thiserror::Error;

const KEYWORDS: phf::Map<&'static [u8], Token> = phf_map! {
    b"and" => Token::And,
    b"class" => Token::Class,
    b"else" => Token::Else,
    b"false" => Token::False,
    b"fun" => Token::Fun,
    b"for" => Token::For,
    b"if" => Token::If,
    b"nil" => Token::Nil,
    b"or" => Token::Or,
    b"print" => Token::Print,
    b"return" => Token::Return,
    b"super" => Token::Super,
    b"this" => Token::This,
    b"true" => Token::True,
    b"var" => Token::Var,
    b"while" => Token::While,
};

// Placeholder used when only the kind of an identifier token matters.
pub const IDENTIFIER_TOKEN: Token = Token::Identifier(String::new());

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Question,
    Colon,
    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier(String),
    String(String),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

impl Token {
    /// Name of the token kind as it appears in diagnostics, e.g. `RIGHT_PAREN`.
    pub fn kind_name(&self) -> &'static str {
        use Token::*;
        match self {
            LeftParen => "LEFT_PAREN",
            RightParen => "RIGHT_PAREN",
            LeftBrace => "LEFT_BRACE",
            RightBrace => "RIGHT_BRACE",
            Comma => "COMMA",
            Dot => "DOT",
            Minus => "MINUS",
            Plus => "PLUS",
            Semicolon => "SEMICOLON",
            Slash => "SLASH",
            Star => "STAR",
            Question => "QUESTION",
            Colon => "COLON",
            Bang => "BANG",
            BangEqual => "BANG_EQUAL",
            Equal => "EQUAL",
            EqualEqual => "EQUAL_EQUAL",
            Greater => "GREATER",
            GreaterEqual => "GREATER_EQUAL",
            Less => "LESS",
            LessEqual => "LESS_EQUAL",
            Identifier(_) => "IDENTIFIER",
            String(_) => "STRING",
            Number(_) => "NUMBER",
            And => "AND",
            Class => "CLASS",
            Else => "ELSE",
            False => "FALSE",
            Fun => "FUN",
            For => "FOR",
            If => "IF",
            Nil => "NIL",
            Or => "OR",
            Print => "PRINT",
            Return => "RETURN",
            Super => "SUPER",
            This => "THIS",
            True => "TRUE",
            Var => "VAR",
            While => "WHILE",
            Eof => "EOF",
        }
    }

    /// Returns the name held by an identifier token.
    ///
    /// Panics when called on any other kind; the parser only builds variable
    /// references out of identifiers.
    pub fn id_name(&self) -> &str {
        match self {
            Token::Identifier(name) => name,
            _ => unreachable!("id_name() called on {:?}", self),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithLocation {
    pub token: Token,
    pub lexeme: String,
    pub location: Location,
}

impl TokenWithLocation {
    pub fn new(token: Token, lexeme: impl Into<String>, location: Location) -> Self {
        Self {
            token,
            lexeme: lexeme.into(),
            location,
        }
    }
}

pub struct Scanner<'a> {
    text: &'a str,
    start: usize,
    current: usize, // yet-to-be consumed byte offset
    line_no: usize, // starting from 1. Must be in sync with `current`.
    char_no: usize, // starting from 1. char location in a line. Must be in sync with `current`.
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenizationError {
    #[error("[line {}] Error: Unexpected character '{character}'.", .location.line)]
    UnexpectedCharacterError { character: char, location: Location },
    #[error("[line {}] Error: Unterminated string.", .location.line)]
    UnterminatedStringError { location: Location },
    #[error("[line {}] Error: Could not parse number '{lexeme}'.", .location.line)]
    InvalidNumberError { lexeme: String, location: Location },
}

impl TokenizationError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedCharacterError { location, .. }
            | Self::UnterminatedStringError { location }
            | Self::InvalidNumberError { location, .. } => location.line,
        }
    }
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            start: 0,
            current: 0,
            line_no: 1,
            char_no: 1,
        }
    }

    /// Scans the whole text. The first lexical error aborts scanning.
    pub fn scan_tokens(&mut self) -> Result<Vec<TokenWithLocation>, TokenizationError> {
        let mut tokens = Vec::new();
        self.junk();
        while !self.is_at_end() {
            tokens.push(self.scan_token()?);
            self.junk();
        }
        tokens.push(TokenWithLocation::new(
            Token::Eof,
            "",
            Location {
                line: self.line_no,
                column: self.char_no,
            },
        ));
        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<TokenWithLocation, TokenizationError> {
        use Token::*;

        let original_location = Location {
            line: self.line_no,
            column: self.char_no,
        };

        let token = match self.advance() {
            b'(' => Ok(LeftParen),
            b')' => Ok(RightParen),
            b'{' => Ok(LeftBrace),
            b'}' => Ok(RightBrace),
            b',' => Ok(Comma),
            b'.' => Ok(Dot),
            b'-' => Ok(Minus),
            b'+' => Ok(Plus),
            b';' => Ok(Semicolon),
            b'*' => Ok(Star),
            b'?' => Ok(Question),
            b':' => Ok(Colon),
            b'!' => Ok(if self.is_next(b'=') { BangEqual } else { Bang }),
            b'=' => Ok(if self.is_next(b'=') {
                EqualEqual
            } else {
                Equal
            }),
            b'<' => Ok(if self.is_next(b'=') { LessEqual } else { Less }),
            b'>' => Ok(if self.is_next(b'=') {
                GreaterEqual
            } else {
                Greater
            }),
            b'/' => Ok(Slash),
            b'"' => self.string(),
            b'0'..=b'9' => self.number(&original_location),
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => Ok(self.identifier()),
            _ => Err(self.report_unexpected_char(&original_location)),
        }?;

        Ok(TokenWithLocation::new(
            token,
            &self.text[self.start..self.current],
            original_location,
        ))
    }

    // Skips whitespace and comments. An unterminated block comment swallows
    // the rest of the input.
    fn junk(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\r' | b'\t' => {
                    self.advance();
                }
                b'\n' => {
                    self.newline();
                }
                b'/' if self.peek_next() == b'/' => {
                    self.advance();
                    self.advance();
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                }
                b'/' if self.peek_next() == b'*' => {
                    self.advance();
                    self.advance();
                    while !self.is_at_end() && !(self.peek() == b'*' && self.peek_next() == b'/') {
                        if self.peek() == b'\n' {
                            self.newline();
                        } else {
                            self.advance();
                        }
                    }
                    if !self.is_at_end() {
                        // consumes the closing "*/"
                        self.advance();
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        self.start = self.current;
    }

    fn is_at_end(&self) -> bool {
        self.text.len() <= self.current
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            return 0;
        }
        self.text.as_bytes()[self.current]
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.text.len() {
            return 0;
        }
        self.text.as_bytes()[self.current + 1]
    }

    fn is_next(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn advance(&mut self) -> u8 {
        let value = self.peek();
        self.current += 1;
        self.char_no += 1;
        value
    }

    fn newline(&mut self) {
        self.advance();
        self.line_no += 1;
        self.char_no = 1;
    }

    fn string(&mut self) -> Result<Token, TokenizationError> {
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.newline();
            } else {
                self.advance();
            }
        }

        // Reported where the input ran out, not where the string opened.
        if self.is_at_end() {
            return Err(TokenizationError::UnterminatedStringError {
                location: Location {
                    line: self.line_no,
                    column: self.char_no,
                },
            });
        }

        // consumes the matching '"'
        self.advance();

        Ok(Token::String(
            self.text[(self.start + 1)..(self.current - 1)].to_string(),
        ))
    }

    fn number(&mut self, original_location: &Location) -> Result<Token, TokenizationError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme = &self.text[self.start..self.current];
        f64::from_str(lexeme)
            .map(Token::Number)
            .map_err(|_| TokenizationError::InvalidNumberError {
                lexeme: lexeme.to_string(),
                location: original_location.clone(),
            })
    }

    fn identifier(&mut self) -> Token {
        while matches!(self.peek(), b'A'..=b'Z' | b'a'..=b'z' | b'_' | b'0'..=b'9') {
            self.advance();
        }
        let id = &self.text.as_bytes()[self.start..self.current];
        match KEYWORDS.get(id) {
            Some(t) => t.clone(),
            None => Token::Identifier(self.text[self.start..self.current].to_string()),
        }
    }

    fn report_unexpected_char(&self, original_location: &Location) -> TokenizationError {
        TokenizationError::UnexpectedCharacterError {
            character: self.text[self.start..].chars().next().unwrap_or('\0'),
            location: original_location.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::gtest;
    use googletest::prelude::*;
    use rstest::rstest;

    fn get_tokens(text: &str) -> Vec<Token> {
        Scanner::new(text)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn scanner_adds_eof_token() {
        assert_eq!(get_tokens(""), vec![Token::Eof]);
    }

    #[test]
    fn scanner_handles_spaces() {
        assert_eq!(get_tokens(" \r\n\t "), vec![Token::Eof]);
    }

    #[test]
    fn scanner_tokenizes_single_char_tokens_correctly() {
        use Token::*;
        assert_eq!(
            get_tokens("(){},.-+;*?:"),
            vec![
                LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus, Semicolon,
                Star, Question, Colon, Eof
            ]
        );
    }

    #[test]
    fn scanner_tokenizes_tokens_with_a_one_char_look_ahead() {
        use Token::*;
        assert_eq!(
            get_tokens(
                "=!<> // foo bar comment
        /<=>===!="
            ),
            vec![
                Equal,
                Bang,
                Less,
                Greater,
                Slash,
                LessEqual,
                GreaterEqual,
                EqualEqual,
                BangEqual,
                Eof
            ]
        );
    }

    #[test]
    fn scanner_tokenizes_numbers_and_strings() {
        use Token::*;
        assert_eq!(
            get_tokens(
                " 1. \"\" 123.45 \"foo\" \"test
 case\""
            ),
            vec![
                Number(1.0),
                Dot,
                String("".to_string()),
                Number(123.45),
                String("foo".to_string()),
                String("test\n case".to_string()),
                Eof
            ]
        );
    }

    #[test]
    fn scanner_tokenizes_reserved_words() {
        use Token::*;
        assert_eq!(
            get_tokens(
                "and class else false for fun if nil
            or print return super this true var while"
            ),
            vec![
                And, Class, Else, False, For, Fun, If, Nil, Or, Print, Return, Super, This, True,
                Var, While, Eof
            ]
        );
    }

    #[test]
    fn scanner_tokenizes_identifiers() {
        use Token::*;
        assert_eq!(
            get_tokens(" x y a1b2c3_d4 _under orchid"),
            vec![
                Identifier("x".to_string()),
                Identifier("y".to_string()),
                Identifier("a1b2c3_d4".to_string()),
                Identifier("_under".to_string()),
                Identifier("orchid".to_string()),
                Eof
            ]
        );
    }

    #[test]
    fn scanner_skips_block_comments_and_counts_their_lines() {
        let tokens = Scanner::new("a /* one\ntwo\n*/ b").scan_tokens().unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.location.line).collect();
        assert_eq!(lines, vec![1, 3, 3]);
        assert_eq!(tokens[1].token, Token::Identifier("b".to_string()));
    }

    #[test]
    fn scanner_treats_unterminated_block_comment_as_running_to_the_end() {
        let tokens = Scanner::new("x /* never\nclosed").scan_tokens().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].token, Token::Eof);
        assert_eq!(tokens[1].location.line, 2);
    }

    #[test]
    fn scanner_keeps_lexemes() {
        let tokens = Scanner::new("var answer = 42.5 >= \"s\";").scan_tokens().unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["var", "answer", "=", "42.5", ">=", "\"s\"", ";", ""]);
    }

    #[test]
    fn scanner_returns_token_with_location_information() {
        let tokens = Scanner::new(
            " x  y and
  z \" foo bar\"",
        )
        .scan_tokens()
        .unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenWithLocation::new(
                    Token::Identifier("x".to_string()),
                    "x",
                    Location { line: 1, column: 2 }
                ),
                TokenWithLocation::new(
                    Token::Identifier("y".to_string()),
                    "y",
                    Location { line: 1, column: 5 }
                ),
                TokenWithLocation::new(Token::And, "and", Location { line: 1, column: 7 }),
                TokenWithLocation::new(
                    Token::Identifier("z".to_string()),
                    "z",
                    Location { line: 2, column: 3 }
                ),
                TokenWithLocation::new(
                    Token::String(" foo bar".to_string()),
                    "\" foo bar\"",
                    Location { line: 2, column: 5 }
                ),
                TokenWithLocation::new(
                    Token::Eof,
                    "",
                    Location {
                        line: 2,
                        column: 15
                    }
                )
            ]
        );
    }

    #[rstest]
    #[case("\"abc", 1)]
    #[case("\n\n\"multi\nline", 4)]
    #[case("\"open\n\n", 3)]
    fn scanner_reports_unterminated_string(#[case] text: &str, #[case] line: usize) {
        let result = Scanner::new(text).scan_tokens();
        assert_eq!(
            result.err().map(|e| (e.to_string(), e.line())),
            Some((format!("[line {line}] Error: Unterminated string."), line))
        );
    }

    #[gtest]
    fn scanner_stops_at_the_first_unexpected_character() {
        let result = Scanner::new("a\n@ # b").scan_tokens();
        assert!(result.is_err());
        expect_that!(
            result.err().unwrap(),
            matches_pattern!(TokenizationError::UnexpectedCharacterError {
                character: eq(&'@'),
                location: eq(&Location { line: 2, column: 1 })
            })
        );
    }

    #[test]
    fn scanner_error_message_names_the_character() {
        let err = Scanner::new("é").scan_tokens().unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Error: Unexpected character 'é'.");
    }
}
