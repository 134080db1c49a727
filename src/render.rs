mod compare;
mod store;

pub use store::Store;

use self::{compare::compare, store::Shadow};
use crate::{
    compile::{
        lex::{Token, TokenKind},
        tree::{Expression, For, If, Interpolation, Node},
        Operator, Template,
    },
    log::{
        Error, INVALID_FIELD_ACCESS, MISSING_ENVIRONMENT, NOT_ITERABLE, NOT_NUMERIC, NOT_TRUTHY,
        TYPE_MISMATCH, UNACCESSIBLE_INDEX, UNDEFINED_FIELD, UNDEFINED_INDEX, UNDEFINED_KEY,
        UNDEFINED_VARIABLE,
    },
    value::{
        field::{parse_path, Field},
        Value,
    },
};

use std::borrow::Cow;

/// Render a [`Template`] against the given [`Store`].
///
/// # Examples
///
/// ```
/// use temper::{compile, render, Store};
///
/// let template = compile("hello, ${name}!").unwrap();
/// let store = Store::new().with_must("name", "taro");
///
/// assert_eq!(render(&template, &store).unwrap(), "hello, taro!");
/// ```
///
/// # Errors
///
/// Returns an [`Error`] when a variable is undefined, an expression
/// receives values of the wrong kind, or an environment variable
/// reference is unset.
pub fn render(template: &Template, store: &Store) -> Result<String, Error> {
    Renderer::new(template, store).render()
}

/// Walks the nodes of a [`Template`], producing output.
struct Renderer<'render, 'source> {
    /// The [`Template`] being rendered.
    template: &'render Template<'source>,
    /// Scope stack over the caller's [`Store`].
    shadow: Shadow<'render>,
}

impl<'render, 'source> Renderer<'render, 'source> {
    fn new(template: &'render Template<'source>, store: &'render Store) -> Self {
        Self {
            template,
            shadow: Shadow::new(store),
        }
    }

    fn render(mut self) -> Result<String, Error> {
        let template = self.template;
        let mut buffer = String::with_capacity(template.source().len());
        self.render_nodes(template.nodes(), &mut buffer)?;

        Ok(buffer)
    }

    /// Render a run of nodes, appending to the given buffer.
    ///
    /// A right trim on an expression or closing tag strips the leading
    /// whitespace of the literal that follows it, carried here across
    /// the node boundary.
    fn render_nodes(&mut self, nodes: &[Node], buffer: &mut String) -> Result<(), Error> {
        let mut trim_next = false;
        for node in nodes {
            let trim_this = std::mem::take(&mut trim_next);
            match node {
                Node::Literal(literal) => {
                    let text = if trim_this {
                        literal.token.literal.trim_start()
                    } else {
                        &literal.token.literal
                    };
                    buffer.push_str(text);
                }
                Node::Interpolation(interpolation) => {
                    if interpolation.trim.left {
                        truncate_trailing(buffer);
                    }
                    let text = self.render_interpolation(interpolation)?;
                    buffer.push_str(&text);
                    trim_next = interpolation.trim.right;
                }
                Node::For(block) => {
                    if block.trim.left {
                        truncate_trailing(buffer);
                    }
                    self.render_for(block, buffer)?;
                    trim_next = block.end.trim.right;
                }
                Node::If(block) => {
                    if block.trim.left {
                        truncate_trailing(buffer);
                    }
                    self.render_if(block, buffer)?;
                    trim_next = block.end.trim.right;
                }
            }
        }

        Ok(())
    }

    /// Render a `${ ... }` expression.
    ///
    /// An identifier made of nothing but uppercase letters and
    /// underscores reads the process environment instead of the
    /// [`Store`].
    fn render_interpolation(&self, interpolation: &Interpolation) -> Result<String, Error> {
        let literal = &interpolation.token.literal;
        if is_environment(literal) {
            return std::env::var(literal).map_err(|_| {
                self.error_at(
                    MISSING_ENVIRONMENT,
                    format!("environment variable `{literal}` is not set"),
                    &interpolation.token,
                )
            });
        }
        let value = self.resolve(literal, &interpolation.token)?;

        Ok(value.to_string())
    }

    /// Render a `for` block.
    ///
    /// Lists bind the index and element, maps bind the key and value
    /// in sorted key order. With a single loop variable only the index
    /// or key is bound.
    fn render_for(&mut self, block: &For, buffer: &mut String) -> Result<(), Error> {
        let entries: Vec<(Value, Value)> = {
            let literal = &block.iterator.token.literal;
            let value = self.resolve(literal, &block.iterator.token)?;
            match value {
                Value::List(values) => values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| (Value::Int(index as i64), value.clone()))
                    .collect(),
                Value::Map(values) => values
                    .iter()
                    .map(|(key, value)| (Value::String(key.clone()), value.clone()))
                    .collect(),
                value => {
                    return Err(self.error_at(
                        NOT_ITERABLE,
                        format!("`{literal}` is {}, which cannot be iterated", value.describe()),
                        &block.iterator.token,
                    ))
                }
            }
        };

        for (key, value) in entries {
            self.shadow.push();
            self.shadow.insert(block.arg1.token.literal.clone(), key);
            if let Some(arg2) = &block.arg2 {
                self.shadow.insert(arg2.token.literal.clone(), value);
            }

            let mut iteration = String::new();
            let result = self.render_nodes(&block.body, &mut iteration);
            self.shadow.pop();
            result?;

            buffer.push_str(trimmed(
                &iteration,
                block.trim.right,
                block.end.trim.left,
            ));
        }

        Ok(())
    }

    /// Render an `if` block by rendering its first truthy branch.
    fn render_if(&mut self, block: &If, buffer: &mut String) -> Result<(), Error> {
        if let Some((body, left, right)) = self.choose_branch(block)? {
            let mut branch = String::new();
            self.render_nodes(body, &mut branch)?;
            buffer.push_str(trimmed(&branch, left, right));
        }

        Ok(())
    }

    /// Evaluate the conditions of an `if` block in order, returning
    /// the body of the first truthy branch along with the trims that
    /// apply to it.
    ///
    /// The leading trim of a branch comes from its own tag, the
    /// trailing trim from the tag that ends it.
    fn choose_branch<'block>(
        &self,
        block: &'block If,
    ) -> Result<Option<(&'block [Node], bool, bool)>, Error> {
        let condition = self.eval(&block.condition)?;
        if self.truthy(condition.as_ref(), block.condition.token())? {
            let right = block
                .else_ifs
                .first()
                .map(|branch| branch.trim.left)
                .or_else(|| block.alternative.as_ref().map(|tag| tag.trim.left))
                .unwrap_or(block.end.trim.left);

            return Ok(Some((&block.consequence, block.trim.right, right)));
        }

        for (i, branch) in block.else_ifs.iter().enumerate() {
            let condition = self.eval(&branch.condition)?;
            if self.truthy(condition.as_ref(), branch.condition.token())? {
                let right = block
                    .else_ifs
                    .get(i + 1)
                    .map(|branch| branch.trim.left)
                    .or_else(|| block.alternative.as_ref().map(|tag| tag.trim.left))
                    .unwrap_or(block.end.trim.left);

                return Ok(Some((&branch.body, branch.trim.right, right)));
            }
        }

        Ok(block
            .alternative
            .as_ref()
            .map(|tag| (tag.body.as_slice(), tag.trim.right, block.end.trim.left)))
    }

    /// Evaluate an [`Expression`] to a [`Value`].
    fn eval(&self, expression: &Expression) -> Result<Cow<'_, Value>, Error> {
        match expression {
            Expression::Ident(ident) => self
                .resolve(&ident.token.literal, &ident.token)
                .map(Cow::Borrowed),
            Expression::String(string) => {
                Ok(Cow::Owned(Value::String(string.token.literal.clone())))
            }
            Expression::Int(int) => Ok(Cow::Owned(Value::Int(int.value))),
            Expression::Float(float) => Ok(Cow::Owned(Value::Float(float.value))),
            Expression::Bool(bool) => Ok(Cow::Owned(Value::Bool(bool.value))),
            Expression::Prefix(prefix) => {
                let right = self.eval(&prefix.right)?;
                match prefix.token.kind {
                    TokenKind::Not => match right.as_ref() {
                        Value::Bool(value) => Ok(Cow::Owned(Value::Bool(!value))),
                        Value::String(value) => Ok(Cow::Owned(Value::Bool(value.is_empty()))),
                        value => Err(self.error_at(
                            NOT_TRUTHY,
                            format!("`!` expects a bool or string, received {}", value.describe()),
                            prefix.right.token(),
                        )),
                    },
                    TokenKind::Minus => match right.as_ref() {
                        Value::Int(value) => Ok(Cow::Owned(Value::Int(-value))),
                        Value::Uint(value) => Ok(Cow::Owned(Value::Int(-(*value as i64)))),
                        Value::Float(value) => Ok(Cow::Owned(Value::Float(-value))),
                        value => Err(self.error_at(
                            NOT_NUMERIC,
                            format!("`-` expects a numeric value, received {}", value.describe()),
                            prefix.right.token(),
                        )),
                    },
                    // The parser builds prefixes from `!` and `-` only.
                    _ => unreachable!(),
                }
            }
            Expression::Infix(infix) => {
                let left = self.eval(&infix.left)?;
                let right = self.eval(&infix.right)?;
                match infix.operator {
                    Operator::And | Operator::Or => match (left.as_ref(), right.as_ref()) {
                        (Value::Bool(left), Value::Bool(right)) => {
                            let result = match infix.operator {
                                Operator::And => *left && *right,
                                _ => *left || *right,
                            };

                            Ok(Cow::Owned(Value::Bool(result)))
                        }
                        _ => Err(self.error_at(
                            TYPE_MISMATCH,
                            format!(
                                "`{}` expects bool values on both sides",
                                infix.operator
                            ),
                            &infix.token,
                        )),
                    },
                    operator => compare(left.as_ref(), operator, right.as_ref())
                        .map(|result| Cow::Owned(Value::Bool(result)))
                        .map_err(|error| {
                            error.with_pointer(self.template.source(), &infix.token)
                        }),
                }
            }
            Expression::Grouped(inner) => self.eval(inner),
        }
    }

    /// Test a condition result for truthiness.
    ///
    /// Booleans are truthy by their own value, strings when non-empty.
    /// Any other kind is an error.
    fn truthy(&self, value: &Value, token: &Token) -> Result<bool, Error> {
        match value {
            Value::Bool(value) => Ok(*value),
            Value::String(value) => Ok(!value.is_empty()),
            value => Err(self.error_at(
                NOT_TRUTHY,
                format!(
                    "conditions expect a bool or string, received {}",
                    value.describe()
                ),
                token,
            )),
        }
    }

    /// Resolve a variable path to the [`Value`] it refers to.
    fn resolve(&self, literal: &str, token: &Token) -> Result<&Value, Error> {
        let mut fields = parse_path(literal).into_iter();
        let first = match fields.next() {
            Some(first) => first,
            None => {
                return Err(self.error_at(
                    UNDEFINED_VARIABLE,
                    "expected an identifier".to_string(),
                    token,
                ))
            }
        };

        let mut value = self.shadow.get(&first.name).ok_or_else(|| {
            self.error_at(
                UNDEFINED_VARIABLE,
                format!("`{}` is not defined", first.name),
                token,
            )
        })?;

        let mut path = first.name;
        for field in fields {
            value = self.access(value, &field, &path, token)?;
            path.push_str(&field.to_string());
        }

        Ok(value)
    }

    /// Navigate one [`Field`] into the given [`Value`].
    fn access<'value>(
        &self,
        value: &'value Value,
        field: &Field,
        path: &str,
        token: &Token,
    ) -> Result<&'value Value, Error> {
        match value {
            Value::Map(values) => values.get(&field.name).ok_or_else(|| {
                self.error_at(
                    UNDEFINED_KEY,
                    format!("`{path}` does not have key `{}`", field.name),
                    token,
                )
            }),
            Value::List(values) => {
                let index = field.name.parse::<usize>().map_err(|_| {
                    self.error_at(
                        UNACCESSIBLE_INDEX,
                        format!("`{field}` is not a valid index for list `{path}`"),
                        token,
                    )
                })?;

                values.get(index).ok_or_else(|| {
                    self.error_at(
                        UNDEFINED_INDEX,
                        format!(
                            "index {index} is out of bounds for list `{path}` with length {}",
                            values.len()
                        ),
                        token,
                    )
                })
            }
            Value::Struct(values) => {
                if !field.name.chars().next().is_some_and(char::is_uppercase) {
                    return Err(self.error_at(
                        INVALID_FIELD_ACCESS,
                        format!("field `{}` of `{path}` is not exported", field.name),
                        token,
                    ));
                }

                values.get(&field.name).ok_or_else(|| {
                    self.error_at(
                        UNDEFINED_FIELD,
                        format!("`{path}` does not have field `{}`", field.name),
                        token,
                    )
                })
            }
            value => Err(self.error_at(
                INVALID_FIELD_ACCESS,
                format!("`{path}` is {}, which has no fields", value.describe()),
                token,
            )),
        }
    }

    fn error_at(&self, reason: &str, help: String, token: &Token) -> Error {
        Error::build(reason)
            .with_help(help)
            .with_pointer(self.template.source(), token)
    }
}

/// Strip whitespace off the given text per the surrounding trims.
fn trimmed(text: &str, left: bool, right: bool) -> &str {
    match (left, right) {
        (true, true) => text.trim(),
        (true, false) => text.trim_start(),
        (false, true) => text.trim_end(),
        (false, false) => text,
    }
}

/// Truncate trailing whitespace off the buffer.
fn truncate_trailing(buffer: &mut String) {
    buffer.truncate(buffer.trim_end().len());
}

/// Return true if the given path reads the process environment,
/// meaning it consists of nothing but uppercase letters and
/// underscores.
fn is_environment(literal: &str) -> bool {
    !literal.is_empty()
        && literal
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::{render, Store};
    use crate::{
        compile::compile,
        log::{
            INVALID_FIELD_ACCESS, MISSING_ENVIRONMENT, NOT_ITERABLE, NOT_TRUTHY, TYPE_MISMATCH,
            UNACCESSIBLE_INDEX, UNDEFINED_FIELD, UNDEFINED_INDEX, UNDEFINED_KEY,
            UNDEFINED_VARIABLE,
        },
        value::Struct,
    };

    #[test]
    fn test_render_literal_escapes() {
        let store = Store::new();

        assert_eq!(helper_render("100%% of $$10", &store), "100% of $10");
    }

    #[test]
    fn test_render_interpolation() {
        let store = Store::new().with_must("name", "taro");

        assert_eq!(helper_render("hello, ${name}!", &store), "hello, taro!");
    }

    #[test]
    fn test_render_for_list_single_arg_binds_index() {
        let store = Store::new().with_must("list", vec!["a", "b", "c"]);

        assert_eq!(
            helper_render("%{ for i in list }${i}%{ endfor }", &store),
            "012"
        );
    }

    #[test]
    fn test_render_for_map_single_arg_binds_key() {
        let store = Store::new().with_must("map", serde_json::json!({"a": 1, "b": 2}));

        assert_eq!(
            helper_render("%{ for k in map }${k}%{ endfor }", &store),
            "ab"
        );
    }

    #[test]
    fn test_render_for_list_indexed() {
        let store = Store::new().with_must("list", vec!["a", "b"]);

        assert_eq!(
            helper_render("%{ for i, v in list }${i}:${v};%{ endfor }", &store),
            "0:a;1:b;"
        );
    }

    #[test]
    fn test_render_for_map_sorted() {
        let store = Store::new().with_must("map", serde_json::json!({"b": 2, "a": 1}));

        assert_eq!(
            helper_render("%{ for k, v in map }${k}=${v} %{ endfor }", &store),
            "a=1 b=2 "
        );
    }

    #[test]
    fn test_render_for_nested() {
        let store = Store::new().with_must("rows", vec![vec![1, 2], vec![3]]);
        let source = "%{ for i, row in rows }%{ for j, v in row }${v}%{ endfor }|%{ endfor }";

        assert_eq!(helper_render(source, &store), "12|3|");
    }

    #[test]
    fn test_render_for_inner_trim_only() {
        let store = Store::new().with_must("rows", vec![vec![1, 2], vec![3]]);
        let source = "%{ for i, row in rows }<%{ for j, v in row ~} ${v} %{~ endfor }>%{ endfor }";

        assert_eq!(helper_render(source, &store), "<12><3>");
    }

    #[test]
    fn test_render_if_chain() {
        let store = Store::new().with_must("n", 5);
        let source = "%{ if n > 10 }big%{ elseif n > 3 }medium%{ else }small%{ endif }";

        assert_eq!(helper_render(source, &store), "medium");
    }

    #[test]
    fn test_render_if_no_branch() {
        let store = Store::new().with_must("n", 1);

        assert_eq!(
            helper_render("a%{ if n > 10 }big%{ endif }b", &store),
            "ab"
        );
    }

    #[test]
    fn test_render_if_trim() {
        let store = Store::new();

        assert_eq!(
            helper_render("%{~ if true ~}\nX\n%{~ endif ~}", &store),
            "X"
        );
    }

    #[test]
    fn test_render_for_trim_per_iteration() {
        let store = Store::new().with_must("list", vec![1, 2]);

        assert_eq!(
            helper_render("%{ for i, v in list ~} ${v} %{~ endfor }", &store),
            "12"
        );
    }

    #[test]
    fn test_render_interpolation_trim() {
        let store = Store::new().with_must("v", "x");

        assert_eq!(helper_render("a ${~v~} b", &store), "axb");
    }

    #[test]
    fn test_render_field_paths() {
        let store = Store::new().with_must(
            "post",
            serde_json::json!({"tags": ["a", "b"], "author": {"name": "x"}}),
        );

        assert_eq!(
            helper_render("${post.tags[1]}-${post.author[\"name\"]}", &store),
            "b-x"
        );
    }

    #[test]
    fn test_render_struct_fields() {
        let store = Store::new().with_value(
            "user",
            Struct::new().with("Name", "taro").with("age", 30),
        );

        assert_eq!(helper_render("${user.Name}", &store), "taro");

        let template = compile("${user.age}").unwrap();
        let error = render(&template, &store).unwrap_err();
        assert_eq!(error.get_reason(), INVALID_FIELD_ACCESS);
    }

    #[test]
    fn test_render_logic_operators() {
        let store = Store::new().with_must("a", true).with_must("s", "text");
        let source = "%{ if a && s == \"text\" }yes%{ endif }";

        assert_eq!(helper_render(source, &store), "yes");
    }

    #[test]
    fn test_render_not_prefix() {
        let store = Store::new().with_must("s", "");

        assert_eq!(helper_render("%{ if !s }empty%{ endif }", &store), "empty");
    }

    #[test]
    fn test_render_undefined_variable() {
        let template = compile("${missing}").unwrap();
        let error = render(&template, &Store::new()).unwrap_err();

        assert_eq!(error.get_reason(), UNDEFINED_VARIABLE);
    }

    #[test]
    fn test_render_index_out_of_bounds() {
        let store = Store::new().with_must("list", vec![1]);
        let template = compile("${list[5]}").unwrap();
        let error = render(&template, &store).unwrap_err();

        assert_eq!(error.get_reason(), UNDEFINED_INDEX);
    }

    #[test]
    fn test_render_undefined_key() {
        let store = Store::new().with_must("map", serde_json::json!({"a": 1}));
        let template = compile("${map.b}").unwrap();
        let error = render(&template, &store).unwrap_err();

        assert_eq!(error.get_reason(), UNDEFINED_KEY);
    }

    #[test]
    fn test_render_unaccessible_index() {
        let store = Store::new().with_must("list", vec![1, 2]);
        let template = compile("${list[\"x\"]}").unwrap();
        let error = render(&template, &store).unwrap_err();

        assert_eq!(error.get_reason(), UNACCESSIBLE_INDEX);
    }

    #[test]
    fn test_render_undefined_field() {
        let store = Store::new().with_value("user", Struct::new().with("Name", "taro"));
        let template = compile("${user.Title}").unwrap();
        let error = render(&template, &store).unwrap_err();

        assert_eq!(error.get_reason(), UNDEFINED_FIELD);
    }

    #[test]
    fn test_render_not_iterable() {
        let store = Store::new().with_must("n", 10);
        let template = compile("%{ for v in n }${v}%{ endfor }").unwrap();
        let error = render(&template, &store).unwrap_err();

        assert_eq!(error.get_reason(), NOT_ITERABLE);
    }

    #[test]
    fn test_render_not_truthy() {
        let store = Store::new().with_must("list", vec![1]);
        let template = compile("%{ if list }x%{ endif }").unwrap();
        let error = render(&template, &store).unwrap_err();

        assert_eq!(error.get_reason(), NOT_TRUTHY);
    }

    #[test]
    fn test_render_logic_requires_bools() {
        let store = Store::new().with_must("n", 1);
        let template = compile("%{ if n && true }x%{ endif }").unwrap();
        let error = render(&template, &store).unwrap_err();

        assert_eq!(error.get_reason(), TYPE_MISMATCH);
    }

    #[test]
    fn test_render_environment() {
        std::env::set_var("TEMPER_RENDER_GREETING", "hi");

        assert_eq!(
            helper_render("${TEMPER_RENDER_GREETING}", &Store::new()),
            "hi"
        );
    }

    #[test]
    fn test_render_environment_missing() {
        let template = compile("${TEMPER_SURELY_UNSET_VARIABLE}").unwrap();
        let error = render(&template, &Store::new()).unwrap_err();

        assert_eq!(error.get_reason(), MISSING_ENVIRONMENT);
    }

    #[test]
    fn test_render_loop_scope_restored() {
        let store = Store::new()
            .with_must("v", "outer")
            .with_must("list", vec!["inner"]);
        let source = "%{ for i, v in list }${v}%{ endfor }${v}";

        assert_eq!(helper_render(source, &store), "innerouter");
    }

    /// Helper function which compiles and renders the given source
    /// against the store, panicking on any error.
    fn helper_render(source: &str, store: &Store) -> String {
        let template = compile(source).unwrap();

        render(&template, store).unwrap()
    }
}
