use crate::parser::Expr;
use crate::procedure::Procedure;
use std::fmt;
use std::rc::Rc;

/// Result of evaluating an expression.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Symbol(String),
    List(Vec<Value>),
    Proc(Rc<Procedure>),
    /// absence of a value, eg: an `if` without else whose test failed
    Nil,
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Nil => false,
            Value::Symbol(_) | Value::Proc(_) => true,
        }
    }

    pub fn is_nil(&self) -> bool { matches!(self, Value::Nil) }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(n) => Some(n as f64),
            Value::Float(n) => Some(n),
            _ => None,
        }
    }

    /// How many lists deep the value goes, 0 for anything but a list.
    pub fn nesting(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0)];
        while let Some((value, depth)) = pending.pop() {
            if let Value::List(items) = value {
                deepest = deepest.max(depth + 1);
                pending.extend(items.iter().map(|item| (item, depth + 1)));
            }
        }
        deepest
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Proc(_) => "procedure",
            Value::Nil => "nil",
        }
    }
}

/// Floats as the REPL shows them: always a fractional part or an exponent,
/// exponents signed and two digits wide (`1e+16`, `1e-07`).
pub fn fmt_float(n: f64) -> String {
    if n.is_nan() {
        return format!("nan");
    }
    if n.is_infinite() {
        return format!("{}inf", if n < 0.0 { "-" } else { "" });
    }
    let repr = format!("{:?}", n);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        },
        None => repr,
    }
}

// quoted code becomes data
impl From<&Expr> for Value {
    fn from(expr: &Expr) -> Value {
        match expr {
            Expr::Int(n) => Value::Int(*n),
            Expr::Float(n) => Value::Float(*n),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Symbol(s) => Value::Symbol(s.clone()),
            Expr::List(items) => Value::List(items.iter().map(Value::from).collect()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Proc(a), Value::Proc(b)) => Rc::ptr_eq(a, b),
            (Value::Nil, Value::Nil) => true,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

// Strings print raw at the top level and quoted when nested in a list.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            other => write!(f, "{}", Nested(other)),
        }
    }
}

struct Nested<'a>(&'a Value);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", fmt_float(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Proc(p) => write!(f, "{}", p),
            Value::Nil => write!(f, "nil"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { write!(f, " ")?; }
                    write!(f, "{}", Nested(item))?;
                }
                write!(f, ")")
            }
        }
    }
}
