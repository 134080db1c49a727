//! A small text templating engine.
//!
//! Templates mix raw text with `%{ ... }` control blocks and
//! `${ ... }` interpolations:
//!
//! ```text
//! %{ for i, person in people ~}
//!   ${i}: ${person.Name}
//! %{~ endfor }
//! ```
//!
//! Compile a [`Template`] with [`compile`], fill a [`Store`] with
//! values, and produce output with [`render`]:
//!
//! ```
//! use temper::{compile, render, Store};
//!
//! let template = compile("hello, ${name}!").unwrap();
//! let store = Store::new().with_must("name", "taro");
//!
//! assert_eq!(render(&template, &store).unwrap(), "hello, taro!");
//! ```
//!
//! A literal `%` or `$` is written as `%%` or `$$`, and a `~` next to
//! a delimiter trims the whitespace around it. Interpolations made of
//! nothing but uppercase letters and underscores, such as `${HOME}`,
//! read the process environment.

mod compile;
mod log;
mod render;
mod value;

pub use compile::{compile, Template};
pub use log::{Error, Pointer, Visual};
pub use render::{render, Store};
pub use value::{Struct, Value};
