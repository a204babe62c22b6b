#![deny(warnings)]

/// A buffered cursor over any iterator.
///
/// Items pulled from the source are kept, so the cursor can backtrack with
/// `set_pos` and everything consumed so far stays inspectable. `mark` tracks
/// the start of the lexeme being built by `view`/`extract`.
pub struct Scanner<I: Iterator> where I::Item: Clone {
    src: I,
    buf: Vec<I::Item>,
    pos: usize,
    mark: usize,
}

impl<I> Iterator for Scanner<I> where I: Iterator, I::Item: Clone {
    type Item = I::Item;
    fn next(&mut self) -> Option<Self::Item> {
        if !self.fill(self.pos + 1) {
            return None;
        }
        self.pos += 1;
        self.curr()
    }
}

impl<I> Scanner<I> where I: Iterator, I::Item: Clone {
    pub fn new(source: I) -> Scanner<I> {
        Scanner{src: source, buf: Vec::new(), pos: 0, mark: 0}
    }

    /// Number of items consumed so far.
    pub fn pos(&self) -> usize { self.pos }

    pub fn set_pos(&mut self, pos: usize) -> bool {
        if pos > self.buf.len() {
            return false;
        }
        self.pos = pos;
        if self.mark > pos { self.mark = pos; }
        true
    }

    /// The last consumed item.
    pub fn curr(&self) -> Option<I::Item> {
        match self.pos {
            0 => None,
            n => self.buf.get(n - 1).cloned(),
        }
    }

    // pull from the source until the buffer holds at least n items
    fn fill(&mut self, n: usize) -> bool {
        while self.buf.len() < n {
            match self.src.next() {
                Some(item) => self.buf.push(item),
                None => return false,
            }
        }
        true
    }

    pub fn peek(&mut self) -> Option<I::Item> {
        if self.fill(self.pos + 1) {
            Some(self.buf[self.pos].clone())
        } else {
            None
        }
    }

    pub fn is_done(&mut self) -> bool { self.peek().is_none() }

    /// Everything consumed since the scanner was created.
    pub fn consumed(&self) -> &[I::Item] { &self.buf[..self.pos] }

    /// Items consumed since the last `extract` or `ignore`.
    pub fn view(&self) -> &[I::Item] { &self.buf[self.mark..self.pos] }

    pub fn ignore(&mut self) { self.mark = self.pos; }

    pub fn extract(&mut self) -> Vec<I::Item> {
        let lexeme = self.view().to_vec();
        self.ignore();
        lexeme
    }
}

impl<I> Scanner<I> where I: Iterator, I::Item: Clone + PartialEq {
    pub fn accept(&mut self, what: &I::Item) -> Option<I::Item> {
        match self.peek() {
            Some(ref next) if next == what => self.next(),
            _ => None,
        }
    }

    // advance only if the next item is in the 'any' set
    pub fn accept_any(&mut self, any: &[I::Item]) -> Option<I::Item> {
        match self.peek() {
            Some(ref next) if any.contains(next) => self.next(),
            _ => None,
        }
    }

    // skip over the 'over' set, returns whether the scanner advanced
    pub fn skip_all(&mut self, over: &[I::Item]) -> bool {
        let start = self.pos;
        while self.accept_any(over).is_some() {}
        self.pos > start
    }

    // advance until an item in the 'any' set (left unconsumed) or EOF
    pub fn until_any(&mut self, any: &[I::Item]) -> bool {
        let start = self.pos;
        while let Some(next) = self.peek() {
            if any.contains(&next) { break; }
            self.next();
        }
        self.pos > start
    }
}
