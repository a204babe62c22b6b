use crate::builtin::builtins;
use crate::config::Config;
use crate::context::Env;
use crate::parser::{Expr, ParseError, Parser};
use crate::procedure::{Arity, Body, Procedure};
use crate::value::Value;

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, trace, warn};

macro_rules! check {
    ($argcheck:expr, $form:expr, $reason:expr) => {
        if !$argcheck {
            return Err(EvalErr::InvalidForm($form.to_string(), $reason.to_string()));
        }
    }
}

#[derive(PartialEq, Debug, thiserror::Error)]
pub enum EvalErr {
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),
    #[error("unbound name '{0}'")]
    UnboundName(String),
    #[error("{0} is not callable")]
    NotCallable(String),
    #[error("{name} expects {expected}, got {got}")]
    Arity{name: String, expected: Arity, got: usize},
    #[error("{name}: {reason}")]
    BadArgument{name: String, reason: String},
    #[error("malformed {0}: {1}")]
    InvalidForm(String, String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {0}")]
    Overflow(String),
    #[error("{0}: math domain error")]
    Domain(String),
    #[error("recursion limit of {0} exceeded")]
    RecursionLimit(usize),
    #[error("lists nested deeper than {0} levels")]
    NestingLimit(usize),
    #[error("can't write output: {0}")]
    Output(String),
}

// decrements the depth counter when an eval frame unwinds, error or not
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) { self.0.set(self.0.get() - 1); }
}

pub struct Interpreter {
    global: Rc<Env>,
    config: Config,
    depth: Cell<usize>,
    out: RefCell<Box<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self { Interpreter::new() }
}

// lambdas set at the top level close over the global frame
impl Drop for Interpreter {
    fn drop(&mut self) { self.global.clear(); }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Interpreter {
        Interpreter::with_output(config, Box::new(io::stdout()))
    }

    /// `print` writes to `out` instead of stdout.
    pub fn with_output(config: Config, out: Box<dyn Write>) -> Interpreter {
        let global = Env::new();
        for (sym, value) in builtins() {
            global.set(&sym, value);
        }
        Interpreter{global, config, depth: Cell::new(0), out: RefCell::new(out)}
    }

    /// Evaluate every expression in `source` against the global environment,
    /// returning the value of the last one (`Nil` for blank input).
    pub fn eval_str(&self, source: &str) -> Result<Value, EvalErr> {
        let mut result = Value::Nil;
        for expr in Parser::parse_str(source)? {
            result = self.eval(&expr, &self.global)?;
        }
        Ok(result)
    }

    /// Top-level driver: never fails. `None` for blank input or a `nil`
    /// result, otherwise the rendered value or an `Error: ...` line.
    pub fn calc(&self, source: &str) -> Option<String> {
        match self.eval_str(source) {
            Ok(value) if value.is_nil() => None,
            Ok(value) => Some(value.to_string()),
            Err(e) => {
                debug!(error = ?e, "evaluation failed");
                Some(format!("Error: {}", e))
            }
        }
    }

    pub fn eval(&self, expr: &Expr, env: &Rc<Env>) -> Result<Value, EvalErr> {
        let depth = self.depth.get() + 1;
        if depth > self.config.max_depth {
            warn!(limit = self.config.max_depth, "recursion limit hit");
            return Err(EvalErr::RecursionLimit(self.config.max_depth));
        }
        self.depth.set(depth);
        let _guard = DepthGuard(&self.depth);

        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Symbol(sym) => {
                trace!(sym = sym.as_str(), "lookup");
                env.get(sym).ok_or_else(|| EvalErr::UnboundName(sym.clone()))
            },
            Expr::List(list) => match list.first() {
                None => Ok(Value::List(Vec::new())),
                Some(Expr::Symbol(head)) => match head.as_str() {
                    "quote" => {
                        check!(list.len() == 2, "quote", "expected (quote expr)");
                        Ok(Value::from(&list[1]))
                    },
                    "set" => self.eval_set(list, env),
                    "if" => self.eval_if(list, env),
                    "cond" => self.eval_cond(list, env),
                    "let" => self.eval_let(list, env),
                    "print" => self.eval_print(list, env),
                    "lambda" => self.eval_lambda(list, env),
                    "begin" => self.eval_body(&list[1..], env),
                    _ => self.eval_call(list, env),
                },
                Some(_) => self.eval_call(list, env),
            },
        }
    }

    // (set name expr), binds in the innermost frame
    fn eval_set(&self, list: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        check!(list.len() == 3, "set", "expected (set name expr)");
        let name = match &list[1] {
            Expr::Symbol(name) => name,
            other => return Err(EvalErr::InvalidForm(
                format!("set"), format!("can't bind to {}", other))),
        };
        let value = self.eval(&list[2], env)?;
        debug!(name = name.as_str(), frame = env.depth(), "set");
        env.set(name, value.clone());
        Ok(value)
    }

    // (if test conseq [alt])
    fn eval_if(&self, list: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        check!(list.len() == 3 || list.len() == 4, "if", "expected (if test then [else])");
        if self.eval(&list[1], env)?.is_truthy() {
            self.eval(&list[2], env)
        } else if let Some(alt) = list.get(3) {
            self.eval(alt, env)
        } else {
            Ok(Value::Nil)
        }
    }

    // (cond (test expr...) ... (else expr...))
    fn eval_cond(&self, list: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        for clause in &list[1..] {
            let clause = match clause {
                Expr::List(clause) if clause.len() >= 2 => clause,
                other => return Err(EvalErr::InvalidForm(
                    format!("cond"), format!("bad clause {}", other))),
            };
            let taken = match &clause[0] {
                Expr::Symbol(s) if s == "else" => true,
                test => self.eval(test, env)?.is_truthy(),
            };
            if taken {
                return self.eval_body(&clause[1..], env);
            }
        }
        Ok(Value::Nil)
    }

    // (let ((name expr) ...) body...), values are evaluated in the outer scope
    fn eval_let(&self, list: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        check!(list.len() >= 3, "let", "expected (let ((name expr) ...) body)");
        let bindings = match &list[1] {
            Expr::List(bindings) => bindings,
            other => return Err(EvalErr::InvalidForm(
                format!("let"), format!("expected a binding list, got {}", other))),
        };
        let mut frame = Vec::with_capacity(bindings.len());
        for binding in bindings {
            match binding {
                Expr::List(pair) if pair.len() == 2 => match &pair[0] {
                    Expr::Symbol(name) => frame.push((name.clone(), self.eval(&pair[1], env)?)),
                    other => return Err(EvalErr::InvalidForm(
                        format!("let"), format!("can't bind to {}", other))),
                },
                other => return Err(EvalErr::InvalidForm(
                    format!("let"), format!("bad binding {}", other))),
            }
        }
        let local = Env::nested(frame, env);
        debug!(frame = local.depth(), "let");
        let result = self.eval_body(&list[2..], &local);
        Env::release(local);
        result
    }

    fn eval_print(&self, list: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        check!(list.len() >= 2, "print", "expected (print expr ...)");
        let mut values = Vec::with_capacity(list.len() - 1);
        for arg in &list[1..] {
            values.push(self.eval(arg, env)?);
        }
        let line = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        let mut out = self.out.borrow_mut();
        writeln!(out, "{}", line)
            .and_then(|_| out.flush())
            .map_err(|e| EvalErr::Output(e.to_string()))?;
        Ok(values.pop().unwrap_or(Value::Nil))
    }

    // (lambda (params...) body...)
    fn eval_lambda(&self, list: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        check!(list.len() >= 3, "lambda", "expected (lambda (params...) body)");
        let mut params = Vec::new();
        match &list[1] {
            Expr::List(varlist) => for var in varlist {
                match var {
                    Expr::Symbol(v) => params.push(v.clone()),
                    other => return Err(EvalErr::InvalidForm(
                        format!("lambda"), format!("bad parameter {}", other))),
                }
            },
            other => return Err(EvalErr::InvalidForm(
                format!("lambda"), format!("expected a parameter list, got {}", other))),
        }
        let body = list[2..].to_vec();
        Ok(Value::Proc(Rc::new(Procedure::lambda(params, body, env.clone()))))
    }

    fn eval_body(&self, body: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        let mut result = Value::Nil;
        for expr in body {
            result = self.eval(expr, env)?;
        }
        Ok(result)
    }

    fn eval_call(&self, list: &[Expr], env: &Rc<Env>) -> Result<Value, EvalErr> {
        let procedure = match self.eval(&list[0], env)? {
            Value::Proc(p) => p,
            other => return Err(EvalErr::NotCallable(match &list[0] {
                Expr::Symbol(s) => format!("'{}' ({})", s, other.type_name()),
                _ => format!("{} ({})", other, other.type_name()),
            })),
        };
        let mut args = Vec::with_capacity(list.len() - 1);
        for arg in &list[1..] {
            args.push(self.eval(arg, env)?);
        }
        self.apply(&procedure, args)
    }

    pub fn apply(&self, procedure: &Procedure, args: Vec<Value>) -> Result<Value, EvalErr> {
        procedure.check_arity(args.len())?;
        match &procedure.body {
            Body::Builtin(fp) => fp(&args[..]),
            Body::Lisp(body, closure) => {
                let local = Env::nested(procedure.params.iter().cloned().zip(args), closure);
                let result = self.eval_body(body, &local);
                Env::release(local);
                result
            }
        }
    }
}
