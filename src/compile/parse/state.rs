use crate::compile::Keyword;

/// The kind of block a [`Parser`][`super::Parser`] is currently
/// collecting nodes for.
///
/// Determines which keywords may legally open a control tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Context {
    /// The top level of the template.
    Root,
    /// The body of a `for` block.
    Loop,
    /// The consequence of an `if` or `elseif` branch.
    Condition,
    /// The body of an `else` branch.
    Alternative,
}

impl Context {
    /// Return true if a control tag beginning with the given keyword is
    /// valid within this context.
    pub fn allows(&self, keyword: Keyword) -> bool {
        match self {
            Self::Root => matches!(keyword, Keyword::For | Keyword::If),
            Self::Loop => matches!(keyword, Keyword::For | Keyword::If | Keyword::EndFor),
            Self::Condition => matches!(
                keyword,
                Keyword::For
                    | Keyword::If
                    | Keyword::ElseIf
                    | Keyword::Else
                    | Keyword::EndIf
            ),
            Self::Alternative => {
                matches!(keyword, Keyword::For | Keyword::If | Keyword::EndIf)
            }
        }
    }

    /// A short description of the context, usable in an error message.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Root => "at the top level",
            Self::Loop => "inside of a `for` block",
            Self::Condition => "inside of an `if` branch",
            Self::Alternative => "inside of an `else` branch",
        }
    }
}
