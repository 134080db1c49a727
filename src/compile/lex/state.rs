/// Describes one lexical mode of a [`Lexer`][`super::Lexer`].
///
/// The lexer keeps these on a stack. The mode on top determines how the
/// next characters are interpreted.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LexState {
    /// Outside of any block, accumulating raw text.
    Default,
    /// Inside of a `%{ ... }` control block.
    Control,
    /// Inside of a `${ ... }` interpolation.
    ///
    /// Remembers whether the opening delimiter carried a trim marker,
    /// and where the delimiter began, so the single emitted token can
    /// point at the `$`.
    Interpolation {
        left_trim: bool,
        line: usize,
        column: usize,
    },
}
