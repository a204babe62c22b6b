use crate::context::Env;
use crate::eval::EvalErr;
use crate::parser::Expr;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

pub type Fp = Rc<dyn Fn(&[Value]) -> Result<Value, EvalErr>>;

/// How many arguments a procedure takes.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(m) => n == m,
            Arity::AtLeast(m) => n >= m,
            Arity::Between(lo, hi) => lo <= n && n <= hi,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Arity::Exact(1) => write!(f, "1 argument"),
            Arity::Exact(n) => write!(f, "{} arguments", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
            Arity::Between(lo, hi) => write!(f, "{} to {}", lo, hi),
        }
    }
}

pub enum Body {
    Lisp(Vec<Expr>, Rc<Env>),
    Builtin(Fp),
}

pub struct Procedure {
    pub name: String,
    pub params: Vec<String>,
    pub arity: Arity,
    pub body: Body,
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(lambda {:?} ...)", self.params)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#<procedure {}>", self.name)
    }
}

impl Procedure {
    pub fn lambda(params: Vec<String>, body: Vec<Expr>, env: Rc<Env>) -> Procedure {
        Procedure{
            name: format!("lambda"),
            arity: Arity::Exact(params.len()),
            params,
            body: Body::Lisp(body, env),
        }
    }

    pub fn builtin(name: &str, arity: Arity, fp: Fp) -> Procedure {
        Procedure{name: name.to_string(), params: Vec::new(), arity, body: Body::Builtin(fp)}
    }

    pub fn check_arity(&self, got: usize) -> Result<(), EvalErr> {
        if self.arity.accepts(got) {
            Ok(())
        } else {
            Err(EvalErr::Arity{name: self.name.clone(), expected: self.arity, got})
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Arity;

    #[test]
    fn test_arity() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(3));
        assert!(Arity::AtLeast(1).accepts(9));
        assert!(!Arity::AtLeast(1).accepts(0));
        assert!(Arity::Between(1, 2).accepts(1));
        assert!(!Arity::Between(1, 2).accepts(3));
        assert_eq!(Arity::Exact(1).to_string(), "1 argument");
        assert_eq!(Arity::AtLeast(2).to_string(), "at least 2");
    }
}
