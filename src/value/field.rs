use std::fmt::{self, Display, Formatter};

/// The syntax a [`Field`] was written with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Access {
    /// The base variable itself.
    Direct,
    /// A `.name` segment.
    Dot,
    /// A `["key"]` segment.
    Key,
    /// A `[0]` segment.
    Index,
}

/// One segment of a variable path such as `post.tags[0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The segment text, without any surrounding punctuation.
    pub name: String,
    /// How the segment was written.
    pub access: Access,
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.access {
            Access::Direct => write!(f, "{}", self.name),
            Access::Dot => write!(f, ".{}", self.name),
            Access::Key => write!(f, "[\"{}\"]", self.name),
            Access::Index => write!(f, "[{}]", self.name),
        }
    }
}

/// Split a path literal into its [`Field`] segments.
///
/// The literal is expected to be well formed, which the lexer
/// guarantees for any path it produces.
pub fn parse_path(literal: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let bytes = literal.as_bytes();
    let mut cursor = 0;
    let mut access = Access::Direct;

    while cursor < bytes.len() {
        match bytes[cursor] {
            b'.' => {
                cursor += 1;
                access = Access::Dot;
            }
            b'[' => {
                if bytes.get(cursor + 1) == Some(&b'"') {
                    let start = cursor + 2;
                    let mut end = start;
                    while end < bytes.len() && bytes[end] != b'"' {
                        end += 1;
                    }
                    fields.push(Field {
                        name: literal[start..end].to_string(),
                        access: Access::Key,
                    });
                    // Past the closing quote and bracket.
                    cursor = (end + 2).min(bytes.len());
                } else {
                    let start = cursor + 1;
                    let mut end = start;
                    while end < bytes.len() && bytes[end] != b']' {
                        end += 1;
                    }
                    fields.push(Field {
                        name: literal[start..end].to_string(),
                        access: Access::Index,
                    });
                    cursor = (end + 1).min(bytes.len());
                }
            }
            _ => {
                let start = cursor;
                while cursor < bytes.len() && !matches!(bytes[cursor], b'.' | b'[') {
                    cursor += 1;
                }
                fields.push(Field {
                    name: literal[start..cursor].to_string(),
                    access,
                });
            }
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::{parse_path, Access};

    #[test]
    fn test_parse_path_single() {
        let fields = parse_path("name");

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[0].access, Access::Direct);
    }

    #[test]
    fn test_parse_path_mixed() {
        let fields = parse_path("post.tags[0].Author[\"home page\"]");

        let expect = [
            ("post", Access::Direct),
            ("tags", Access::Dot),
            ("0", Access::Index),
            ("Author", Access::Dot),
            ("home page", Access::Key),
        ];
        assert_eq!(fields.len(), expect.len());
        for (field, (name, access)) in fields.iter().zip(expect) {
            assert_eq!(field.name, name);
            assert_eq!(field.access, access);
        }
    }

    #[test]
    fn test_field_display() {
        let fields = parse_path("a.b[\"c\"][10]");
        let text: String = fields.iter().map(ToString::to_string).collect();

        assert_eq!(text, "a.b[\"c\"][10]");
    }
}
