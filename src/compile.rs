pub mod lex;
pub mod parse;

mod template;

pub use crate::compile::{lex::Token, parse::tree, parse::Parser, template::Template};

use crate::log::Error;
use std::fmt::Display;

/// Compile a [`Template`] from the given text.
///
/// Returns a new `Template`, which can be combined with a
/// [`Store`][`crate::Store`] to produce output.
///
/// # Examples
///
/// ```
/// use temper::compile;
///
/// let template = compile("hello, ${name}!");
/// assert!(template.is_ok())
/// ```
///
/// # Errors
///
/// Returns an [`Error`] when the text has a syntax problem.
pub fn compile(text: &str) -> Result<Template<'_>, Error> {
    Parser::new(text).compile()
}

/// Keywords recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Keyword {
    /// Beginning of a loop.
    For,
    /// Divides the arguments from the iterator in a loop.
    ///
    /// In this example, the arguments refer to "i" and "person" while
    /// the iterator refers to "people":
    ///
    /// "for i, person in people"
    In,
    /// End of a loop.
    EndFor,
    /// Beginning of an "if" block.
    If,
    /// Marks the beginning of another branch in an "if" block.
    ElseIf,
    /// Marks the beginning of the fallback branch in an "if" block.
    Else,
    /// End of an "if" block.
    EndIf,
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::For => write!(f, "for"),
            Keyword::In => write!(f, "in"),
            Keyword::EndFor => write!(f, "endfor"),
            Keyword::If => write!(f, "if"),
            Keyword::ElseIf => write!(f, "elseif"),
            Keyword::Else => write!(f, "else"),
            Keyword::EndIf => write!(f, "endif"),
        }
    }
}

/// Operators recognized by the Lexer and Parser.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Operator {
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// >
    Greater,
    /// <
    Lesser,
    /// >=
    GreaterOrEqual,
    /// <=
    LesserOrEqual,
    /// &&
    And,
    /// ||
    Or,
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::Greater => write!(f, ">"),
            Operator::Lesser => write!(f, "<"),
            Operator::GreaterOrEqual => write!(f, ">="),
            Operator::LesserOrEqual => write!(f, "<="),
            Operator::And => write!(f, "&&"),
            Operator::Or => write!(f, "||"),
        }
    }
}
