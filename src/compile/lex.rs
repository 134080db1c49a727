pub mod token;

mod state;

pub use token::{Token, TokenKind};

use self::{state::LexState, token::lookup_ident};

/// Provides methods to read a source string as [`Token`] instances.
///
/// The lexer never fails. Malformed input is surfaced as a
/// [`TokenKind::Illegal`] token whose literal holds a readable message,
/// and the parser turns that into an [`Error`][`crate::log::Error`].
pub struct Lexer<'source> {
    /// Reference to the source text.
    pub source: &'source str,
    /// Byte position within source.
    cursor: usize,
    /// One indexed line of the character at the cursor.
    line: usize,
    /// One indexed column of the character at the cursor.
    ///
    /// Reset by every consumed newline.
    column: usize,
    /// Stack of lexical modes.
    ///
    /// The mode on top determines the action taken when `.next_token`
    /// is called.
    states: Vec<LexState>,
    /// Temporary storage for a [`Token`] that will be returned on the
    /// following call to `.next_token`.
    ///
    /// Holds a delimiter token while a pending literal is flushed.
    buffer: Option<Token>,
}

impl<'source> Lexer<'source> {
    /// Create a new [`Lexer`] over the given source text.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
            column: 1,
            states: vec![LexState::Default],
            buffer: None,
        }
    }

    /// Return the next [`Token`].
    ///
    /// May be called repeatedly. Once the source is exhausted, every
    /// following call returns a [`TokenKind::Eof`] token.
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.buffer.take() {
            return token;
        }

        match self.state() {
            LexState::Default => self.lex_default(),
            LexState::Control => self.lex_control(),
            LexState::Interpolation {
                left_trim,
                line,
                column,
            } => self.lex_interpolation(left_trim, line, column),
        }
    }

    /// Return the mode on top of the state stack.
    fn state(&self) -> LexState {
        *self.states.last().unwrap_or(&LexState::Default)
    }

    /// Return the character at the cursor without consuming it.
    fn peek(&self) -> Option<char> {
        self.source[self.cursor..].chars().next()
    }

    /// Return the character after the cursor without consuming anything.
    fn peek_second(&self) -> Option<char> {
        self.source[self.cursor..].chars().nth(1)
    }

    /// Consume and return the character at the cursor.
    ///
    /// Every consumed newline advances the line counter and resets the
    /// column counter.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(c)
    }

    /// Read raw text up to the next `%{` or `${` delimiter.
    ///
    /// The escape sequences `%%` and `$$` collapse to a single `%` and
    /// `$` within the returned literal. A lone `%` or `$` produces a
    /// [`TokenKind::Illegal`] token.
    fn lex_default(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        let mut stack = String::new();

        loop {
            match self.peek() {
                None => {
                    return if stack.is_empty() {
                        Token::new(TokenKind::Eof, "", self.line, self.column)
                    } else {
                        Token::new(TokenKind::Literal, stack, line, column)
                    };
                }
                Some('%') => match self.peek_second() {
                    Some('%') => {
                        self.bump();
                        self.bump();
                        stack.push('%');
                    }
                    Some('{') => {
                        let (start_line, start_column) = (self.line, self.column);
                        self.bump();
                        self.bump();

                        let mut token = if self.peek() == Some('~') {
                            self.bump();
                            Token::new(TokenKind::ControlStart, "%{~", start_line, start_column)
                        } else {
                            Token::new(TokenKind::ControlStart, "%{", start_line, start_column)
                        };
                        token.left_trim = token.literal.ends_with('~');
                        self.states.push(LexState::Control);

                        if stack.is_empty() {
                            return token;
                        }
                        self.buffer = Some(token);

                        return Token::new(TokenKind::Literal, stack, line, column);
                    }
                    _ => {
                        let (line, column) = (self.line, self.column);
                        self.bump();

                        return Token::new(
                            TokenKind::Illegal,
                            "unexpected `%` character, write `%%` for a literal `%`",
                            line,
                            column,
                        );
                    }
                },
                Some('$') => match self.peek_second() {
                    Some('$') => {
                        self.bump();
                        self.bump();
                        stack.push('$');
                    }
                    Some('{') => {
                        let (start_line, start_column) = (self.line, self.column);
                        self.bump();
                        self.bump();

                        let left_trim = self.peek() == Some('~');
                        if left_trim {
                            self.bump();
                        }
                        self.states.push(LexState::Interpolation {
                            left_trim,
                            line: start_line,
                            column: start_column,
                        });

                        if stack.is_empty() {
                            // Nothing to flush, read the interpolation now.
                            return self.next_token();
                        }

                        return Token::new(TokenKind::Literal, stack, line, column);
                    }
                    _ => {
                        let (line, column) = (self.line, self.column);
                        self.bump();

                        return Token::new(
                            TokenKind::Illegal,
                            "unexpected `$` character, write `$$` for a literal `$`",
                            line,
                            column,
                        );
                    }
                },
                Some(c) => {
                    self.bump();
                    stack.push(c);
                }
            }
        }
    }

    /// Read the identifier and closing delimiter of a `${ ... }`
    /// interpolation, producing a single [`TokenKind::Interpolation`]
    /// token that points at the opening `$`.
    ///
    /// Only an identifier is accepted here, optionally extended with a
    /// dotted or bracketed path.
    fn lex_interpolation(&mut self, left_trim: bool, line: usize, column: usize) -> Token {
        let mut literal = String::new();
        let right_trim = loop {
            match self.peek() {
                None => {
                    return Token::new(
                        TokenKind::Illegal,
                        "unexpected end of file inside interpolation, expected `}`",
                        self.line,
                        self.column,
                    );
                }
                Some('}') => {
                    self.bump();
                    break false;
                }
                Some('~') if self.peek_second() == Some('}') => {
                    self.bump();
                    self.bump();
                    break true;
                }
                Some(c) if literal.is_empty() && is_ident_start(c) => {
                    match self.read_literal() {
                        Ok(path) => literal = path,
                        Err(message) => {
                            return Token::new(TokenKind::Illegal, message, self.line, self.column)
                        }
                    }
                }
                Some(c) => {
                    return Token::new(
                        TokenKind::Illegal,
                        format!("unexpected `{c}` character inside interpolation, expected an identifier"),
                        self.line,
                        self.column,
                    );
                }
            }
        };

        self.states.pop();
        if literal.is_empty() {
            return Token::new(
                TokenKind::Illegal,
                "empty interpolation, expected an identifier",
                line,
                column,
            );
        }

        let mut token = Token::new(TokenKind::Interpolation, literal, line, column);
        token.left_trim = left_trim;
        token.right_trim = right_trim;

        token
    }

    /// Read the next [`Token`] inside of a `%{ ... }` control block.
    ///
    /// Whitespace between tokens, including newlines, is skipped.
    fn lex_control(&mut self) -> Token {
        self.skip_whitespace();

        let (line, column) = (self.line, self.column);
        match self.peek() {
            None => Token::new(
                TokenKind::Illegal,
                "unexpected end of file inside block, expected `}`",
                line,
                column,
            ),
            Some('}') => {
                self.bump();
                self.states.pop();

                Token::new(TokenKind::ControlEnd, "}", line, column)
            }
            Some('~') => {
                if self.peek_second() == Some('}') {
                    self.bump();
                    self.bump();
                    self.states.pop();

                    let mut token = Token::new(TokenKind::ControlEnd, "~}", line, column);
                    token.right_trim = true;
                    token
                } else {
                    self.bump();

                    Token::new(
                        TokenKind::Illegal,
                        "unexpected `~` character, trim markers are only valid next to a delimiter",
                        line,
                        column,
                    )
                }
            }
            Some('=') => self.lex_pair('=', TokenKind::Operator(super::Operator::Equal)),
            Some('&') => self.lex_pair('&', TokenKind::Operator(super::Operator::And)),
            Some('|') => self.lex_pair('|', TokenKind::Operator(super::Operator::Or)),
            Some('!') => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();

                    Token::new(
                        TokenKind::Operator(super::Operator::NotEqual),
                        "!=",
                        line,
                        column,
                    )
                } else {
                    Token::new(TokenKind::Not, "!", line, column)
                }
            }
            Some('>') => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();

                    Token::new(
                        TokenKind::Operator(super::Operator::GreaterOrEqual),
                        ">=",
                        line,
                        column,
                    )
                } else {
                    Token::new(TokenKind::Operator(super::Operator::Greater), ">", line, column)
                }
            }
            Some('<') => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();

                    Token::new(
                        TokenKind::Operator(super::Operator::LesserOrEqual),
                        "<=",
                        line,
                        column,
                    )
                } else {
                    Token::new(TokenKind::Operator(super::Operator::Lesser), "<", line, column)
                }
            }
            Some('(') => {
                self.bump();
                Token::new(TokenKind::LeftParen, "(", line, column)
            }
            Some(')') => {
                self.bump();
                Token::new(TokenKind::RightParen, ")", line, column)
            }
            Some(',') => {
                self.bump();
                Token::new(TokenKind::Comma, ",", line, column)
            }
            Some('-') => {
                self.bump();
                Token::new(TokenKind::Minus, "-", line, column)
            }
            Some('"') => self.lex_string(line, column),
            Some(c) if is_ident_start(c) => match self.read_literal() {
                Ok(literal) => Token::new(lookup_ident(&literal), literal, line, column),
                Err(message) => Token::new(TokenKind::Illegal, message, line, column),
            },
            Some(c) if c.is_ascii_digit() => self.lex_number(line, column),
            Some(c) => {
                self.bump();
                Token::new(
                    TokenKind::Illegal,
                    format!("unexpected `{c}` character inside block"),
                    line,
                    column,
                )
            }
        }
    }

    /// Consume a two character operator made of the given character
    /// twice, such as `==`, `&&` or `||`.
    ///
    /// A single occurrence of the character is illegal.
    fn lex_pair(&mut self, expect: char, kind: TokenKind) -> Token {
        let (line, column) = (self.line, self.column);
        self.bump();

        if self.peek() == Some(expect) {
            self.bump();

            Token::new(kind, format!("{expect}{expect}"), line, column)
        } else {
            Token::new(
                TokenKind::Illegal,
                format!("unexpected `{expect}` character, did you mean `{expect}{expect}`?"),
                line,
                column,
            )
        }
    }

    /// Consume a double quoted string literal.
    ///
    /// No escape processing is performed, the literal holds the text
    /// between the quotes as written.
    fn lex_string(&mut self, line: usize, column: usize) -> Token {
        // Opening quote.
        self.bump();

        let mut literal = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.bump();

                    return Token::new(TokenKind::String, literal, line, column);
                }
                Some(c) => {
                    self.bump();
                    literal.push(c);
                }
                None => {
                    return Token::new(
                        TokenKind::Illegal,
                        "undelimited string, try closing it with `\"`",
                        line,
                        column,
                    );
                }
            }
        }
    }

    /// Consume a run of digits and periods.
    ///
    /// Exactly one period makes the token a float. Any other count
    /// leaves an integer token whose conversion is checked by the
    /// parser.
    fn lex_number(&mut self, line: usize, column: usize) -> Token {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() && c != '.' {
                break;
            }
            self.bump();
            literal.push(c);
        }

        let kind = if literal.matches('.').count() == 1 {
            TokenKind::Float
        } else {
            TokenKind::Int
        };

        Token::new(kind, literal, line, column)
    }

    /// Consume an identifier, extended with any neighboring dotted or
    /// bracketed path segments such as `list[0]` or `map["key"].name`.
    ///
    /// # Errors
    ///
    /// Returns a message describing a malformed bracket segment.
    fn read_literal(&mut self) -> Result<String, String> {
        let mut literal = String::new();

        while let Some(c) = self.peek() {
            match c {
                c if is_ident_continue(c) || c == '.' => {
                    self.bump();
                    literal.push(c);
                }
                '[' => {
                    self.bump();
                    literal.push('[');

                    match self.peek() {
                        Some('"') => {
                            self.bump();
                            literal.push('"');
                            loop {
                                match self.peek() {
                                    Some('"') => {
                                        self.bump();
                                        literal.push('"');
                                        break;
                                    }
                                    Some(c) => {
                                        self.bump();
                                        literal.push(c);
                                    }
                                    None => {
                                        return Err(
                                            "undelimited string inside index, try closing it with `\"`"
                                                .to_string(),
                                        )
                                    }
                                }
                            }
                        }
                        Some(c) if c.is_ascii_digit() => {
                            while let Some(c) = self.peek() {
                                if !c.is_ascii_digit() {
                                    break;
                                }
                                self.bump();
                                literal.push(c);
                            }
                        }
                        _ => {
                            return Err(
                                "expected a quoted key or numeric index after `[`".to_string()
                            )
                        }
                    }

                    match self.peek() {
                        Some(']') => {
                            self.bump();
                            literal.push(']');
                        }
                        _ => return Err("expected `]` to close the index".to_string()),
                    }
                }
                _ => break,
            }
        }

        Ok(literal)
    }

    /// Consume whitespace between tokens inside of a control block.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }
}

/// Return true if the given character may begin an identifier,
/// meaning '_' or an `xid_start`.
fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character may continue an identifier,
/// meaning '_' or an `xid_continue`.
fn is_ident_continue(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token, TokenKind};
    use crate::compile::{Keyword, Operator};

    #[test]
    fn test_lex_plain_text() {
        let expect = vec![(TokenKind::Literal, "lorem ipsum", 1, 1)];

        helper_lex_next_auto("lorem ipsum", expect)
    }

    #[test]
    fn test_lex_escapes() {
        let expect = vec![(TokenKind::Literal, "100% of $10", 1, 1)];

        helper_lex_next_auto("100%% of $$10", expect)
    }

    #[test]
    fn test_lex_lone_percent() {
        let mut lexer = Lexer::new("50% off");
        let token = lexer.next_token();

        assert_eq!(token.kind, TokenKind::Illegal);
        assert!(token.literal.contains("%%"));
    }

    #[test]
    fn test_lex_lone_dollar() {
        let mut lexer = Lexer::new("costs $5");
        let first = lexer.next_token();

        assert_eq!(first.kind, TokenKind::Illegal);
        assert_eq!(first.line, 1);
        assert_eq!(first.column, 7);
    }

    #[test]
    fn test_lex_interpolation() {
        let expect = vec![
            (TokenKind::Literal, "a", 1, 1),
            (TokenKind::Interpolation, "v", 1, 2),
            (TokenKind::Literal, "b", 1, 6),
        ];

        helper_lex_next_auto("a${v}b", expect)
    }

    #[test]
    fn test_lex_interpolation_path() {
        let expect = vec![(
            TokenKind::Interpolation,
            "v[0].foo.bar[\"key\"]",
            1,
            1,
        )];

        helper_lex_next_auto("${v[0].foo.bar[\"key\"]}", expect)
    }

    #[test]
    fn test_lex_interpolation_trim() {
        let mut lexer = Lexer::new("${~v~}");
        let token = lexer.next_token();

        assert_eq!(token.kind, TokenKind::Interpolation);
        assert_eq!(token.literal, "v");
        assert!(token.left_trim);
        assert!(token.right_trim);
    }

    #[test]
    fn test_lex_interpolation_rejects_space() {
        let mut lexer = Lexer::new("${ v }");

        assert_eq!(lexer.next_token().kind, TokenKind::Illegal);
    }

    #[test]
    fn test_lex_for_block() {
        let expect = vec![
            (TokenKind::ControlStart, "%{", 1, 1),
            (TokenKind::Keyword(Keyword::For), "for", 1, 4),
            (TokenKind::Ident, "v", 1, 8),
            (TokenKind::Keyword(Keyword::In), "in", 1, 10),
            (TokenKind::Ident, "list", 1, 13),
            (TokenKind::ControlEnd, "~}", 1, 18),
        ];

        helper_lex_next_auto("%{ for v in list ~}", expect)
    }

    #[test]
    fn test_lex_trim_flags() {
        let mut lexer = Lexer::new("%{~ endfor ~}");
        let start = lexer.next_token();

        assert_eq!(start.kind, TokenKind::ControlStart);
        assert_eq!(start.literal, "%{~");
        assert!(start.left_trim);

        assert_eq!(
            lexer.next_token().kind,
            TokenKind::Keyword(Keyword::EndFor)
        );

        let end = lexer.next_token();
        assert_eq!(end.kind, TokenKind::ControlEnd);
        assert!(end.right_trim);
    }

    #[test]
    fn test_lex_operators() {
        let expect = vec![
            (TokenKind::ControlStart, "%{", 1, 1),
            (TokenKind::Keyword(Keyword::If), "if", 1, 4),
            (TokenKind::LeftParen, "(", 1, 7),
            (TokenKind::Ident, "a", 1, 8),
            (TokenKind::Operator(Operator::Equal), "==", 1, 10),
            (TokenKind::String, "b", 1, 13),
            (TokenKind::Operator(Operator::And), "&&", 1, 17),
            (TokenKind::Not, "!", 1, 20),
            (TokenKind::Ident, "c", 1, 21),
            (TokenKind::RightParen, ")", 1, 22),
            (TokenKind::Operator(Operator::Or), "||", 1, 24),
            (TokenKind::Ident, "d", 1, 27),
            (TokenKind::Operator(Operator::GreaterOrEqual), ">=", 1, 29),
            (TokenKind::Int, "10", 1, 32),
            (TokenKind::ControlEnd, "}", 1, 34),
        ];

        helper_lex_next_auto("%{ if (a == \"b\" && !c) || d >= 10}", expect)
    }

    #[test]
    fn test_lex_numbers() {
        let expect = vec![
            (TokenKind::ControlStart, "%{", 1, 1),
            (TokenKind::Keyword(Keyword::If), "if", 1, 4),
            (TokenKind::Ident, "n", 1, 7),
            (TokenKind::Operator(Operator::Lesser), "<", 1, 9),
            (TokenKind::Float, "10.5", 1, 11),
            (TokenKind::ControlEnd, "}", 1, 15),
        ];

        helper_lex_next_auto("%{ if n < 10.5}", expect)
    }

    #[test]
    fn test_lex_multiline_positions() {
        let expect = vec![
            (TokenKind::Literal, "one\n", 1, 1),
            (TokenKind::ControlStart, "%{", 2, 1),
            (TokenKind::Keyword(Keyword::EndIf), "endif", 2, 4),
            (TokenKind::ControlEnd, "}", 2, 10),
            (TokenKind::Literal, "\ntwo", 2, 11),
        ];

        helper_lex_next_auto("one\n%{ endif }\ntwo", expect)
    }

    #[test]
    fn test_lex_illegal_in_control() {
        let mut lexer = Lexer::new("%{ if a @ b }");
        lexer.next_token();
        lexer.next_token();
        lexer.next_token();

        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Illegal);
        assert_eq!(token.column, 9);
    }

    #[test]
    fn test_lex_undelimited_string() {
        let mut lexer = Lexer::new("%{ if v == \"abc }");
        lexer.next_token();
        lexer.next_token();
        lexer.next_token();
        lexer.next_token();

        assert_eq!(lexer.next_token().kind, TokenKind::Illegal);
    }

    #[test]
    fn test_lex_eof_repeats() {
        let mut lexer = Lexer::new("done");
        assert_eq!(lexer.next_token().kind, TokenKind::Literal);

        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    /// Helper function which creates a lexer on the given source and
    /// compares each read token against the expected kind, literal and
    /// position, asserting an Eof token follows the expected set.
    fn helper_lex_next_auto(source: &str, expect: Vec<(TokenKind, &str, usize, usize)>) {
        let mut lexer = Lexer::new(source);
        for (kind, literal, line, column) in expect {
            let token: Token = lexer.next_token();

            assert_eq!(token.kind, kind, "kind mismatch for `{literal}`");
            assert_eq!(token.literal, literal);
            assert_eq!((token.line, token.column), (line, column));
        }

        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
