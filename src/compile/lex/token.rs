use crate::compile::{Keyword, Operator};
use std::fmt::Display;

/// Kinds of [`Token`] emitted by the Lexer.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TokenKind {
    /// Raw text outside of any block.
    Literal,
    /// A full `${name}` interpolation, literal holds the identifier.
    Interpolation,
    /// Beginning of a control block - `%{`.
    ControlStart,
    /// End of a control block - `}`.
    ControlEnd,
    /// Identifier (unquoted string) within a control block.
    ///
    /// May contain a dotted or bracketed path such as `map["key"].name`.
    Ident,
    /// String literal within a control block.
    String,
    /// Integer literal within a control block.
    Int,
    /// Float literal within a control block.
    Float,
    /// A boolean true.
    True,
    /// A boolean false.
    False,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// !
    Not,
    /// -
    Minus,
    /// A recognized keyword that begins or continues a control block.
    Keyword(Keyword),
    /// Describes a comparison or logical operation on two values.
    Operator(Operator),
    /// An unrecognized character or sequence, literal holds a message.
    Illegal,
    /// End of source text.
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Literal => write!(f, "literal"),
            TokenKind::Interpolation => write!(f, "interpolation"),
            TokenKind::ControlStart => write!(f, "begin block (%{{)"),
            TokenKind::ControlEnd => write!(f, "end block (}})"),
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::String => write!(f, "string"),
            TokenKind::Int => write!(f, "integer"),
            TokenKind::Float => write!(f, "float"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::LeftParen => write!(f, "left paren (()"),
            TokenKind::RightParen => write!(f, "right paren ())"),
            TokenKind::Comma => write!(f, "comma (,)"),
            TokenKind::Not => write!(f, "exclamation (!)"),
            TokenKind::Minus => write!(f, "minus (-)"),
            TokenKind::Keyword(keyword) => write!(f, "keyword {keyword}"),
            TokenKind::Operator(operator) => write!(f, "operator {operator}"),
            TokenKind::Illegal => write!(f, "illegal"),
            TokenKind::Eof => write!(f, "eof"),
        }
    }
}

/// A meaningful piece of source text.
///
/// Carries the literal text of the lexeme, the one indexed line and
/// column it begins on, and trim flags for delimiter tokens that were
/// written with a `~` marker.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub left_trim: bool,
    pub right_trim: bool,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Create a new [`Token`] with both trim flags unset.
    pub fn new<T>(kind: TokenKind, literal: T, line: usize, column: usize) -> Self
    where
        T: Into<String>,
    {
        Self {
            kind,
            literal: literal.into(),
            left_trim: false,
            right_trim: false,
            line,
            column,
        }
    }

    /// Return the character count of the literal text.
    ///
    /// Used to size the highlighted area of a [`Pointer`][`crate::log::Pointer`].
    pub fn width(&self) -> usize {
        self.literal.chars().count()
    }
}

/// Return the matching [`Keyword`] or boolean kind for the given
/// identifier text, or [`TokenKind::Ident`] when it is not reserved.
pub fn lookup_ident(literal: &str) -> TokenKind {
    match literal {
        "for" => TokenKind::Keyword(Keyword::For),
        "in" => TokenKind::Keyword(Keyword::In),
        "endfor" => TokenKind::Keyword(Keyword::EndFor),
        "if" => TokenKind::Keyword(Keyword::If),
        "elseif" => TokenKind::Keyword(Keyword::ElseIf),
        "else" => TokenKind::Keyword(Keyword::Else),
        "endif" => TokenKind::Keyword(Keyword::EndIf),
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Ident,
    }
}
