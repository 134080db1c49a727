use std::{
    cmp::max,
    fmt::{Formatter, Result},
};

use super::{
    super::{RESET, YELLOW},
    {get_width, Visual, BLANK, EQUAL, HIGHLIGHT, PIPE},
};

/// A type of `Visual` that points to a specific location within source text.
#[derive(Debug, PartialEq)]
pub struct Pointer {
    /// The line that the Pointer is pointing to.
    ///
    /// This number is one indexed.
    line: usize,
    /// The column that the Pointer is pointing to.
    ///
    /// This number is one indexed and counts characters.
    column: usize,
    /// Display width of the text leading up to the highlighted area.
    offset: usize,
    /// The length of the object being highlighted.
    length: usize,
    /// The actual line of text that is being pointed to.
    text: String,
}

impl Pointer {
    /// Create a new Visual over the given source text.
    ///
    /// The line and column are one indexed, and length is the character
    /// count of the highlighted area.
    pub fn new(source: &str, line: usize, column: usize, length: usize) -> Self {
        let lines: Vec<_> = source.split_terminator('\n').collect();
        let text = lines
            .get(line.saturating_sub(1))
            .or_else(|| lines.last())
            .copied()
            .unwrap_or(BLANK)
            .to_string();
        let prefix: String = text.chars().take(column.saturating_sub(1)).collect();
        let offset = get_width(&prefix);
        let highlighted: String = text
            .chars()
            .skip(column.saturating_sub(1))
            .take(length)
            .collect();
        let length = max(1, get_width(&highlighted));

        Self {
            line,
            column,
            offset,
            length,
            text,
        }
    }
}

impl Visual for Pointer {
    fn display(
        &self,
        formatter: &mut Formatter<'_>,
        template: Option<&str>,
        help: Option<&str>,
    ) -> Result {
        let num = self.line.to_string();
        let col = self.column;
        let pad = get_width(&num);
        let align = self.offset + self.length;

        let extra = "-".repeat(3_usize.saturating_sub(self.length));
        let name = template.unwrap_or("?");
        let text = &self.text;
        let underline = HIGHLIGHT.repeat(self.length);

        write!(
            formatter,
            "\n {BLANK:pad$}--> {name}:{num}:{col}\
             \n {BLANK:pad$} {PIPE}\
             \n {num:>} {PIPE} {text}\
             \n {BLANK:pad$} {PIPE} {YELLOW}{underline:>align$}{RESET}{extra}\
             \n {BLANK:pad$} {PIPE}\n",
        )?;

        if let Some(help) = help {
            write!(formatter, "{BLANK:pad$} {EQUAL} help: {help}\n")?;
        }

        Ok(())
    }
}
