use super::{Pointer, RED, RESET};
use crate::{compile::lex::Token, log::Visual};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// ```
/// use temper::Error;
///
/// Error::build("unexpected token")
///     .with_name("template.txt")
///     .with_help(r#"expected one of `for`, `if`"#);
/// ```
///
/// When printed with `println!("{:#}", error)` an [`Error`] that carries a
/// visualization produces output in this shape:
///
/// ```text
/// error: unexpected token
///   --> template.txt:1:4
///    |
///  1 | %{ update name }
///    |    ^^^^^^
///    |
///   = help: expected one of `for`, `if`
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the Template that the [`Error`] comes from.
    name: Option<String>,
}

impl Error {
    /// Create a new [`Error`] with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use temper::Error;
    ///
    /// Error::build("unexpected token")
    ///     .with_help("expected `for` or `if`, found `endfor`");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
        }
    }

    /// Set the name text, which is the name of the [`Template`][`crate::Template`]
    /// that the [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] aimed at the given [`Token`]
    /// within the source text.
    ///
    /// This is a shortcut method for creating a `Pointer` yourself and passing
    /// it to `with_visual`.
    pub fn with_pointer(mut self, source: &str, token: &Token) -> Self {
        self.visual = Some(Box::new(Pointer::new(
            source,
            token.line,
            token.column,
            token.width(),
        )));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the reason text.
    pub fn get_reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text.
    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return the name of the `Template` that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        match &self.visual {
            Some(visual) if f.alternate() => {
                visual.display(f, self.name.as_deref(), self.help.as_deref())
            }
            _ => Ok(()),
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason && self.help == other.help && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::compile::lex::{Token, TokenKind};

    #[test]
    fn test_error_getters() {
        let error = Error::build("unexpected token")
            .with_name("template.txt")
            .with_help("expected `}`");

        assert_eq!(error.get_reason(), "unexpected token");
        assert_eq!(error.get_name(), Some("template.txt"));
        assert_eq!(error.get_help(), Some("expected `}`"));
    }

    #[test]
    fn test_error_equality_ignores_visual() {
        let source = "%{ update name }";
        let token = Token::new(TokenKind::Ident, "update", 1, 4);
        let first = Error::build("unexpected token").with_pointer(source, &token);
        let second = Error::build("unexpected token");

        assert_eq!(first, second);
    }

    #[test]
    fn test_error_display_pointer() {
        let source = "one\n%{ update name }";
        let token = Token::new(TokenKind::Ident, "update", 2, 4);
        let error = Error::build("unexpected token")
            .with_name("template.txt")
            .with_help("expected a keyword")
            .with_pointer(source, &token);

        let text = format!("{error:#}");
        assert!(text.contains("--> template.txt:2:4"));
        assert!(text.contains("2 | %{ update name }"));
        assert!(text.contains("^^^^^^"));
        assert!(text.contains("= help: expected a keyword"));
    }

    #[test]
    fn test_error_compact_display() {
        let token = Token::new(TokenKind::Ident, "v", 1, 1);
        let error = Error::build("undefined variable").with_pointer("${v}", &token);

        // Without the alternate flag the visual is omitted.
        assert!(!format!("{error}").contains("-->"));
    }
}
