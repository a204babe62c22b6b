use crate::eval::EvalErr;
use crate::parser::MAX_NESTING;
use crate::procedure::{Arity, Fp, Procedure};
use crate::value::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::rc::Rc;

type Builtin = Result<Value, EvalErr>;

fn bad(name: &str, reason: String) -> EvalErr {
    EvalErr::BadArgument{name: name.to_string(), reason}
}

fn number(name: &str, v: &Value) -> Result<(), EvalErr> {
    match v {
        Value::Int(_) | Value::Float(_) => Ok(()),
        other => Err(bad(name, format!("expected a number, got {}", other.type_name()))),
    }
}

// int op int stays int, anything else promotes to float
fn combine(name: &str, a: &Value, b: &Value,
           iop: fn(i64, i64) -> Option<i64>, fop: fn(f64, f64) -> f64) -> Builtin {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        return iop(*x, *y).map(Value::Int).ok_or_else(|| EvalErr::Overflow(name.to_string()));
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => Ok(Value::Float(fop(x, y))),
        _ => Err(bad(name, format!("expected numbers, got {} and {}",
                                   a.type_name(), b.type_name()))),
    }
}

fn foldop(name: &str, args: &[Value], iop: fn(i64, i64) -> Option<i64>,
          fop: fn(f64, f64) -> f64) -> Builtin {
    let base = args[0].clone();
    number(name, &base)?;
    args[1..].iter().try_fold(base, |acc, item| combine(name, &acc, item, iop, fop))
}

fn add(name: &str, args: &[Value]) -> Builtin {
    match args.first() {
        None => Ok(Value::Int(0)),
        Some(Value::Str(_)) => {
            let mut out = String::new();
            for arg in args {
                match arg {
                    Value::Str(s) => out.push_str(s),
                    other => return Err(bad(name, format!(
                        "can't concatenate string and {}", other.type_name()))),
                }
            }
            Ok(Value::Str(out))
        },
        Some(Value::List(_)) => {
            let mut out = Vec::new();
            for arg in args {
                match arg {
                    Value::List(l) => out.extend(l.iter().cloned()),
                    other => return Err(bad(name, format!(
                        "can't concatenate list and {}", other.type_name()))),
                }
            }
            Ok(Value::List(out))
        },
        Some(_) => foldop(name, args, i64::checked_add, |a, b| a + b),
    }
}

fn sub(name: &str, args: &[Value]) -> Builtin {
    if args.len() == 1 { // negation
        return match args[0] {
            Value::Int(n) => n.checked_neg().map(Value::Int)
                .ok_or_else(|| EvalErr::Overflow(name.to_string())),
            Value::Float(n) => Ok(Value::Float(-n)),
            ref other => Err(bad(name, format!("expected a number, got {}", other.type_name()))),
        };
    }
    foldop(name, args, i64::checked_sub, |a, b| a - b)
}

fn mul(name: &str, args: &[Value]) -> Builtin {
    if args.is_empty() {
        return Ok(Value::Int(1));
    }
    foldop(name, args, i64::checked_mul, |a, b| a * b)
}

// always a float, (/ 10 2) is 5.0
fn div(name: &str, args: &[Value]) -> Builtin {
    let mut nums = Vec::with_capacity(args.len());
    for arg in args {
        number(name, arg)?;
        nums.push(arg.as_f64().unwrap_or_default());
    }
    let (mut acc, rest) = match nums.len() {
        1 => (1.0, &nums[..]),
        _ => (nums[0], &nums[1..]),
    };
    for d in rest {
        if *d == 0.0 { return Err(EvalErr::DivisionByZero); }
        acc /= d;
    }
    Ok(Value::Float(acc))
}

// floored modulo: the result takes the sign of the divisor
fn modulo(name: &str, args: &[Value]) -> Builtin {
    match (&args[0], &args[1]) {
        (Value::Int(_), Value::Int(0)) => Err(EvalErr::DivisionByZero),
        (Value::Int(a), Value::Int(b)) => {
            let r = a.checked_rem(*b).ok_or_else(|| EvalErr::Overflow(name.to_string()))?;
            Ok(Value::Int(if r != 0 && (r < 0) != (*b < 0) { r + b } else { r }))
        },
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(_), Some(y)) if y == 0.0 => Err(EvalErr::DivisionByZero),
            (Some(x), Some(y)) => {
                let r = x % y;
                Ok(Value::Float(if r != 0.0 && (r < 0.0) != (y < 0.0) { r + y } else { r }))
            },
            _ => Err(bad(name, format!("expected numbers, got {} and {}",
                                       a.type_name(), b.type_name()))),
        },
    }
}

fn pow(name: &str, args: &[Value]) -> Builtin {
    match (&args[0], &args[1]) {
        (Value::Int(0), Value::Int(e)) if *e < 0 => Err(EvalErr::DivisionByZero),
        (Value::Int(b), Value::Int(e)) if *e >= 0 => u32::try_from(*e).ok()
            .and_then(|e| b.checked_pow(e))
            .map(Value::Int)
            .ok_or_else(|| EvalErr::Overflow(name.to_string())),
        (b, e) => match (b.as_f64(), e.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(x.powf(y))),
            _ => Err(bad(name, format!("expected numbers, got {} and {}",
                                       b.type_name(), e.type_name()))),
        },
    }
}

fn compare(name: &str, a: &Value, b: &Value) -> Result<Option<Ordering>, EvalErr> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Some(x.cmp(y))),
        (Value::Str(x), Value::Str(y)) => Ok(Some(x.cmp(y))),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
            _ => Err(bad(name, format!("can't compare {} and {}",
                                       a.type_name(), b.type_name()))),
        },
    }
}

// chained: (< 1 2 3) holds when every adjacent pair does
fn foldcmp(name: &str, args: &[Value], test: fn(Ordering) -> bool) -> Builtin {
    for win in args.windows(2) {
        match compare(name, &win[0], &win[1])? {
            Some(ord) if test(ord) => (),
            _ => return Ok(Value::Bool(false)),
        }
    }
    Ok(Value::Bool(true))
}

fn equal(_name: &str, args: &[Value]) -> Builtin {
    Ok(Value::Bool(args.windows(2).all(|win| win[0] == win[1])))
}

fn abs(name: &str, args: &[Value]) -> Builtin {
    match args[0] {
        Value::Int(n) => n.checked_abs().map(Value::Int)
            .ok_or_else(|| EvalErr::Overflow(name.to_string())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        ref other => Err(bad(name, format!("expected a number, got {}", other.type_name()))),
    }
}

// (max 1 2 3) or (max (list 1 2 3))
fn extremum(name: &str, args: &[Value], keep: Ordering) -> Builtin {
    let items = match args {
        [Value::List(l)] => &l[..],
        _ => args,
    };
    let mut best = match items.first() {
        Some(first) => first,
        None => return Err(bad(name, format!("empty list"))),
    };
    for item in &items[1..] {
        if compare(name, item, best)? == Some(keep) {
            best = item;
        }
    }
    match best {
        Value::Int(_) | Value::Float(_) | Value::Str(_) => Ok(best.clone()),
        other => Err(bad(name, format!("can't compare {}", other.type_name()))),
    }
}

fn sqrt(name: &str, args: &[Value]) -> Builtin {
    number(name, &args[0])?;
    match args[0].as_f64() {
        Some(x) if x >= 0.0 => Ok(Value::Float(x.sqrt())),
        _ => Err(EvalErr::Domain(name.to_string())),
    }
}

fn len(name: &str, args: &[Value]) -> Builtin {
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(l) => Ok(Value::Int(l.len() as i64)),
        other => Err(bad(name, format!("{} has no length", other.type_name()))),
    }
}

fn string_op(name: &str, args: &[Value], op: fn(&str) -> String) -> Builtin {
    match &args[0] {
        Value::Str(s) => Ok(Value::Str(op(s))),
        other => Err(bad(name, format!("expected a string, got {}", other.type_name()))),
    }
}

fn first(name: &str, args: &[Value]) -> Builtin {
    match &args[0] {
        Value::List(l) => Ok(l.first().cloned().unwrap_or(Value::Nil)),
        Value::Str(s) => Ok(s.chars().next().map_or(Value::Nil, |c| Value::Str(c.to_string()))),
        other => Err(bad(name, format!("expected a list, got {}", other.type_name()))),
    }
}

fn rest(name: &str, args: &[Value]) -> Builtin {
    match &args[0] {
        Value::List(l) => Ok(Value::List(l.iter().skip(1).cloned().collect())),
        Value::Str(s) => Ok(Value::Str(s.chars().skip(1).collect())),
        other => Err(bad(name, format!("expected a list, got {}", other.type_name()))),
    }
}

// lists built at runtime stay as shallow as the ones the reader accepts
fn nested(list: Vec<Value>) -> Builtin {
    let list = Value::List(list);
    if list.nesting() > MAX_NESTING {
        return Err(EvalErr::NestingLimit(MAX_NESTING));
    }
    Ok(list)
}

fn append(name: &str, args: &[Value]) -> Builtin {
    match &args[0] {
        Value::List(l) => {
            let mut out = l.clone();
            out.push(args[1].clone());
            nested(out)
        },
        other => Err(bad(name, format!("expected a list, got {}", other.type_name()))),
    }
}

fn register<F>(procs: &mut HashMap<String, Value>, name: &'static str, arity: Arity, f: F)
        where F: Fn(&str, &[Value]) -> Builtin + 'static {
    let fp: Fp = Rc::new(move |args: &[Value]| f(name, args));
    procs.insert(name.to_string(), Value::Proc(Rc::new(Procedure::builtin(name, arity, fp))));
}

pub fn builtins() -> HashMap<String, Value> {
    use Arity::{AtLeast, Exact};
    let mut procs: HashMap<String, Value> = HashMap::new();

    procs.insert(format!("true"), Value::Bool(true));
    procs.insert(format!("false"), Value::Bool(false));
    procs.insert(format!("nil"), Value::Nil);
    procs.insert(format!("pi"), Value::Float(std::f64::consts::PI));
    procs.insert(format!("e"), Value::Float(std::f64::consts::E));

    register(&mut procs, "+", AtLeast(0), add);
    register(&mut procs, "-", AtLeast(1), sub);
    register(&mut procs, "*", AtLeast(0), mul);
    register(&mut procs, "/", AtLeast(1), div);
    register(&mut procs, "mod", Exact(2), modulo);
    register(&mut procs, "pow", Exact(2), pow);

    register(&mut procs, ">", AtLeast(2), |n, a| foldcmp(n, a, Ordering::is_gt));
    register(&mut procs, "<", AtLeast(2), |n, a| foldcmp(n, a, Ordering::is_lt));
    register(&mut procs, ">=", AtLeast(2), |n, a| foldcmp(n, a, Ordering::is_ge));
    register(&mut procs, "<=", AtLeast(2), |n, a| foldcmp(n, a, Ordering::is_le));
    register(&mut procs, "=", AtLeast(2), equal);

    register(&mut procs, "abs", Exact(1), abs);
    register(&mut procs, "max", AtLeast(1), |n, a| extremum(n, a, Ordering::Greater));
    register(&mut procs, "min", AtLeast(1), |n, a| extremum(n, a, Ordering::Less));
    register(&mut procs, "sqrt", Exact(1), sqrt);

    register(&mut procs, "len", Exact(1), len);
    register(&mut procs, "upper", Exact(1), |n, a| string_op(n, a, str::to_uppercase));
    register(&mut procs, "lower", Exact(1), |n, a| string_op(n, a, str::to_lowercase));

    register(&mut procs, "list", AtLeast(0), |_, a| nested(a.to_vec()));
    register(&mut procs, "first", Exact(1), first);
    register(&mut procs, "rest", Exact(1), rest);
    register(&mut procs, "append", Exact(2), append);

    register(&mut procs, "not", Exact(1), |_, a| Ok(Value::Bool(!a[0].is_truthy())));
    register(&mut procs, "number?", Exact(1),
             |_, a| Ok(Value::Bool(matches!(a[0], Value::Int(_) | Value::Float(_)))));
    register(&mut procs, "list?", Exact(1), |_, a| Ok(Value::Bool(matches!(a[0], Value::List(_)))));
    procs
}
