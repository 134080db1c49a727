use crate::{
    compile::Operator,
    log::{Error, NOT_COMPARABLE, NOT_NUMERIC, TYPE_MISMATCH},
    value::{Struct, Value},
};

/// A [`Value`] normalized for comparison.
///
/// Integer widths collapse to one signed 64 bit representation, so
/// signed and unsigned integers of equal magnitude compare equal.
enum Operand<'value> {
    Int(i64),
    Float(f64),
    String(&'value str),
    Bool(bool),
    Struct(&'value Struct),
}

impl Operand<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Self::Int(_) => "an integer",
            Self::Float(_) => "a float",
            Self::String(_) => "a string",
            Self::Bool(_) => "a bool",
            Self::Struct(_) => "a struct",
        }
    }
}

/// Normalize the given [`Value`] for comparison.
///
/// # Errors
///
/// Returns an [`Error`] for kinds that no operator accepts.
fn normalize(value: &Value) -> Result<Operand<'_>, Error> {
    match value {
        Value::Int(value) => Ok(Operand::Int(*value)),
        Value::Uint(value) => Ok(Operand::Int(*value as i64)),
        Value::Float(value) => Ok(Operand::Float(*value)),
        Value::String(value) => Ok(Operand::String(value)),
        Value::Bool(value) => Ok(Operand::Bool(*value)),
        Value::Struct(value) => Ok(Operand::Struct(value)),
        Value::Null | Value::List(_) | Value::Map(_) => Err(Error::build(NOT_COMPARABLE)
            .with_help(format!("{} cannot be compared", value.describe()))),
    }
}

/// Apply a comparison operator to two values.
///
/// # Errors
///
/// Returns an [`Error`] when either value cannot be compared, when the
/// normalized kinds differ, or when an ordering operator receives
/// operands that are not numeric.
pub(crate) fn compare(left: &Value, operator: Operator, right: &Value) -> Result<bool, Error> {
    let left = normalize(left)?;
    let right = normalize(right)?;

    match operator {
        Operator::Equal => equal(&left, &right),
        Operator::NotEqual => equal(&left, &right).map(|result| !result),
        Operator::Greater
        | Operator::GreaterOrEqual
        | Operator::Lesser
        | Operator::LesserOrEqual => order(&left, operator, &right),
        // Handled by the expression evaluator on the raw values.
        Operator::And | Operator::Or => unreachable!(),
    }
}

fn equal(left: &Operand, right: &Operand) -> Result<bool, Error> {
    match (left, right) {
        (Operand::Int(left), Operand::Int(right)) => Ok(left == right),
        (Operand::Float(left), Operand::Float(right)) => Ok(left == right),
        (Operand::String(left), Operand::String(right)) => Ok(left == right),
        (Operand::Bool(left), Operand::Bool(right)) => Ok(left == right),
        (Operand::Struct(left), Operand::Struct(right)) => Ok(left == right),
        _ => Err(mismatch(left, right)),
    }
}

fn order(left: &Operand, operator: Operator, right: &Operand) -> Result<bool, Error> {
    match (left, right) {
        (Operand::Int(left), Operand::Int(right)) => Ok(ordering(*left, operator, *right)),
        (Operand::Float(left), Operand::Float(right)) => Ok(ordering(*left, operator, *right)),
        (Operand::String(_), Operand::String(_))
        | (Operand::Bool(_), Operand::Bool(_))
        | (Operand::Struct(_), Operand::Struct(_)) => Err(Error::build(NOT_NUMERIC).with_help(
            format!("`{}` expects numeric values, received {}", operator, left.describe()),
        )),
        _ => Err(mismatch(left, right)),
    }
}

fn ordering<T>(left: T, operator: Operator, right: T) -> bool
where
    T: PartialOrd,
{
    match operator {
        Operator::Greater => left > right,
        Operator::GreaterOrEqual => left >= right,
        Operator::Lesser => left < right,
        Operator::LesserOrEqual => left <= right,
        _ => false,
    }
}

fn mismatch(left: &Operand, right: &Operand) -> Error {
    Error::build(TYPE_MISMATCH).with_help(format!(
        "{} and {} cannot be compared with each other",
        left.describe(),
        right.describe()
    ))
}

#[cfg(test)]
mod tests {
    use super::compare;
    use crate::{
        compile::Operator,
        log::{NOT_COMPARABLE, NOT_NUMERIC, TYPE_MISMATCH},
        value::{Struct, Value},
    };

    #[test]
    fn test_compare_signed_unsigned() {
        let result = compare(&Value::Int(10), Operator::Equal, &Value::Uint(10));

        assert_eq!(result, Ok(true));
    }

    #[test]
    fn test_compare_int_float_mismatch() {
        let error = compare(&Value::Int(1), Operator::Equal, &Value::Float(1.0)).unwrap_err();

        assert_eq!(error.get_reason(), TYPE_MISMATCH);
    }

    #[test]
    fn test_compare_string_equality() {
        let left = Value::from("abc");
        let right = Value::from("abc");

        assert_eq!(compare(&left, Operator::Equal, &right), Ok(true));
        assert_eq!(compare(&left, Operator::NotEqual, &right), Ok(false));
    }

    #[test]
    fn test_compare_string_ordering_rejected() {
        let left = Value::from("a");
        let right = Value::from("a");
        let error = compare(&left, Operator::Greater, &right).unwrap_err();

        assert_eq!(error.get_reason(), NOT_NUMERIC);
    }

    #[test]
    fn test_compare_numeric_ordering() {
        let left = Value::Uint(5);
        let right = Value::Int(10);

        assert_eq!(compare(&left, Operator::Lesser, &right), Ok(true));
        assert_eq!(compare(&left, Operator::GreaterOrEqual, &right), Ok(false));
    }

    #[test]
    fn test_compare_structs() {
        let left = Value::Struct(Struct::new().with("Name", "a"));
        let right = Value::Struct(Struct::new().with("Name", "a"));

        assert_eq!(compare(&left, Operator::Equal, &right), Ok(true));
    }

    #[test]
    fn test_compare_list_rejected() {
        let list = Value::from(vec![1]);
        let error = compare(&list, Operator::Equal, &list).unwrap_err();

        assert_eq!(error.get_reason(), NOT_COMPARABLE);
    }
}
