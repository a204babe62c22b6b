//! A small lisp calculator: `lexers` tokenizes, `Parser` builds the tree
//! and `Interpreter` evaluates it against chained environments.

mod builtin;
mod config;
mod context;
mod eval;
mod parser;
mod procedure;
mod value;

pub use builtin::builtins;
pub use config::Config;
pub use context::Env;
pub use eval::{EvalErr, Interpreter};
pub use parser::{Expr, ParseError, Parser, MAX_NESTING};
pub use procedure::{Arity, Body, Procedure};
pub use value::Value;
