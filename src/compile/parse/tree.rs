use crate::compile::{lex::Token, Operator};

use std::fmt::{self, Display, Formatter};

/// A single unit of a [`Template`][`crate::Template`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Raw text rendered as is.
    Literal(Literal),
    /// A `${ ... }` expression whose value is rendered in place.
    Interpolation(Interpolation),
    /// A `%{ for ... }` loop.
    For(For),
    /// A `%{ if ... }` conditional.
    If(If),
}

/// Raw text between expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The unescaped text.
    pub token: Token,
}

/// A `${ ... }` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    /// Token holding the full variable path, such as `post.name`.
    pub token: Token,
    /// Whitespace removal around the expression.
    pub trim: Trim,
}

/// Whitespace removal markers attached to a tag.
///
/// `left` trims the tail of the output preceding the tag, `right`
/// trims the head of the output following it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trim {
    pub left: bool,
    pub right: bool,
}

/// A `%{ for ... }` loop and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    /// The `for` keyword token.
    pub token: Token,
    /// Trim markers on the opening tag.
    pub trim: Trim,
    /// First loop variable.
    ///
    /// Receives the index of a list or the key of a map.
    pub arg1: Ident,
    /// Second loop variable, receiving the element or map value.
    pub arg2: Option<Ident>,
    /// Path to the value being iterated.
    pub iterator: Ident,
    /// Nodes rendered once per iteration.
    pub body: Vec<Node>,
    /// The closing `endfor` tag.
    pub end: EndFor,
}

/// The closing tag of a [`For`] block.
#[derive(Debug, Clone, PartialEq)]
pub struct EndFor {
    /// The `endfor` keyword token.
    pub token: Token,
    /// Trim markers on the closing tag.
    pub trim: Trim,
}

/// A `%{ if ... }` conditional with any number of `elseif` branches
/// and an optional `else` branch.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    /// The `if` keyword token.
    pub token: Token,
    /// Trim markers on the opening tag.
    pub trim: Trim,
    /// Condition guarding the consequence.
    pub condition: Expression,
    /// Nodes rendered when the condition holds.
    pub consequence: Vec<Node>,
    /// Additional branches tried in order.
    pub else_ifs: Vec<ElseIf>,
    /// Fallback branch when no condition holds.
    pub alternative: Option<Else>,
    /// The closing `endif` tag.
    pub end: EndIf,
}

/// An `elseif` branch of an [`If`] block.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    /// The `elseif` keyword token.
    pub token: Token,
    /// Trim markers on the tag itself.
    pub trim: Trim,
    /// Condition guarding this branch.
    pub condition: Expression,
    /// Nodes rendered when the condition holds.
    pub body: Vec<Node>,
}

/// The `else` branch of an [`If`] block.
#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    /// The `else` keyword token.
    pub token: Token,
    /// Trim markers on the tag itself.
    pub trim: Trim,
    /// Nodes rendered when no condition holds.
    pub body: Vec<Node>,
}

/// The closing tag of an [`If`] block.
#[derive(Debug, Clone, PartialEq)]
pub struct EndIf {
    /// The `endif` keyword token.
    pub token: Token,
    /// Trim markers on the closing tag.
    pub trim: Trim,
}

/// An evaluable expression inside of a control block.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A variable path such as `post.name`.
    Ident(Ident),
    /// A double quoted string literal.
    String(StringLiteral),
    /// An integer literal.
    Int(IntLiteral),
    /// A float literal.
    Float(FloatLiteral),
    /// A `true` or `false` literal.
    Bool(BoolLiteral),
    /// A `!` or `-` applied to another expression.
    Prefix(Box<Prefix>),
    /// Two expressions joined by an operator.
    Infix(Box<Infix>),
    /// A parenthesized expression.
    Grouped(Box<Expression>),
}

impl Expression {
    /// Return the [`Token`] the expression begins with.
    pub fn token(&self) -> &Token {
        match self {
            Self::Ident(ident) => &ident.token,
            Self::String(string) => &string.token,
            Self::Int(int) => &int.token,
            Self::Float(float) => &float.token,
            Self::Bool(bool) => &bool.token,
            Self::Prefix(prefix) => &prefix.token,
            Self::Infix(infix) => infix.left.token(),
            Self::Grouped(grouped) => grouped.token(),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(ident) => write!(f, "{}", ident.token.literal),
            Self::String(string) => write!(f, "\"{}\"", string.token.literal),
            Self::Int(int) => write!(f, "{}", int.value),
            Self::Float(float) => write!(f, "{}", float.value),
            Self::Bool(bool) => write!(f, "{}", bool.value),
            Self::Prefix(prefix) => write!(f, "{}{}", prefix.token.literal, prefix.right),
            Self::Infix(infix) => {
                write!(f, "{} {} {}", infix.left, infix.operator, infix.right)
            }
            Self::Grouped(grouped) => write!(f, "({grouped})"),
        }
    }
}

/// A variable path.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Token holding the full path as written.
    pub token: Token,
}

/// A double quoted string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
}

/// An integer literal.
#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub token: Token,
    pub value: i64,
}

/// A float literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub token: Token,
    pub value: f64,
}

/// A boolean literal.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolLiteral {
    pub token: Token,
    pub value: bool,
}

/// A prefix operator applied to an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    /// The `!` or `-` token.
    pub token: Token,
    pub right: Expression,
}

/// Two expressions joined by a binary operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub left: Expression,
    /// Token of the operator itself.
    pub token: Token,
    pub operator: Operator,
    pub right: Expression,
}
