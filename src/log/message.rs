use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const UNRECOGNIZABLE_NUMBER: &str = "unrecognizable number";

pub const UNDEFINED_VARIABLE: &str = "undefined variable";
pub const UNDEFINED_KEY: &str = "undefined key";
pub const UNDEFINED_INDEX: &str = "undefined index";
pub const UNACCESSIBLE_INDEX: &str = "unaccessible index";
pub const UNDEFINED_FIELD: &str = "undefined field";
pub const INVALID_FIELD_ACCESS: &str = "invalid field access";
pub const TYPE_MISMATCH: &str = "type mismatch";
pub const NOT_NUMERIC: &str = "not numeric";
pub const NOT_COMPARABLE: &str = "not comparable";
pub const NOT_TRUTHY: &str = "not truthy";
pub const NOT_ITERABLE: &str = "not iterable";
pub const MISSING_ENVIRONMENT: &str = "missing environment variable";

pub const INCOMPATIBLE_VALUE: &str = "incompatible value";

/// Return a string describing the keyword that was expected in place
/// of the given token.
pub fn expected_keyword<T>(received: T) -> String
where
    T: Display,
{
    format!(
        "expected one of `for`, `in`, `endfor`, `if`, `elseif`, `else`, `endif`, found `{}`",
        received
    )
}

/// Return a string describing an unsupported control keyword for the
/// block the parser is currently inside of.
pub fn unexpected_control<T, Y>(keyword: T, context: Y) -> String
where
    T: Display,
    Y: Display,
{
    format!("`{keyword}` is not valid {context}")
}
