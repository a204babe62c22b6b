use crate::procedure::Body;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame of bindings. Lookups fall back to the enclosing frame.
pub struct Env {
    syms: RefCell<HashMap<String, Value>>,
    outer: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Rc<Env> {
        Rc::new(Env{syms: RefCell::new(HashMap::new()), outer: None})
    }

    pub fn nested<B>(bindings: B, outer: &Rc<Env>) -> Rc<Env>
            where B: IntoIterator<Item=(String, Value)> {
        Rc::new(Env{
            syms: RefCell::new(bindings.into_iter().collect()),
            outer: Some(outer.clone()),
        })
    }

    pub fn get(&self, sym: &str) -> Option<Value> {
        if let Some(value) = self.syms.borrow().get(sym) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|otx| otx.get(sym))
    }

    /// Bind in this frame, shadowing any outer binding.
    pub fn set(&self, sym: &str, value: Value) {
        self.syms.borrow_mut().insert(sym.to_string(), value);
    }

    /// Unbind everything in this frame.
    pub fn clear(&self) {
        let syms = std::mem::take(&mut *self.syms.borrow_mut());
        drop(syms);
    }

    /// Let go of a frame whose scope just ended. A lambda bound into the
    /// frame it closes over keeps that frame alive through a cycle; when
    /// nothing else refers to either of them the frame is emptied so both
    /// get freed.
    pub fn release(frame: Rc<Env>) {
        let cycles = frame.syms.borrow().values()
            .filter(|value| match value {
                Value::Proc(p) => match &p.body {
                    Body::Lisp(_, closure) =>
                        Rc::strong_count(p) == 1 && Rc::ptr_eq(closure, &frame),
                    Body::Builtin(_) => false,
                },
                _ => false,
            })
            .count();
        if cycles > 0 && Rc::strong_count(&frame) == 1 + cycles {
            frame.clear();
        }
    }

    pub fn depth(&self) -> usize {
        self.outer.as_ref().map_or(0, |otx| 1 + otx.depth())
    }
}
