#![deny(warnings)]

use crate::scanner::Scanner;
use std::vec;

const WHITE: &str = " \n\r\t";

impl Scanner<vec::IntoIter<char>> {
    pub fn from_str(source: &str) -> Self {
        Scanner::new(source.chars().collect::<Vec<_>>().into_iter())
    }
}

impl<I: Iterator<Item=char>> Scanner<I> {
    pub fn extract_string(&mut self) -> String {
        self.extract().into_iter().collect()
    }

    pub fn accept_char(&mut self, c: char) -> bool {
        self.accept(&c).is_some()
    }

    pub fn accept_any_char(&mut self, any: &str) -> Option<char> {
        match self.peek() {
            Some(next) if any.contains(next) => self.next(),
            _ => None,
        }
    }

    pub fn skip_all_chars(&mut self, over: &str) -> bool {
        let start = self.pos();
        while self.accept_any_char(over).is_some() {}
        self.pos() > start
    }

    pub fn until_any_char(&mut self, any: &str) -> bool {
        let start = self.pos();
        while let Some(next) = self.peek() {
            if any.contains(next) { break; }
            self.next();
        }
        self.pos() > start
    }

    pub fn skip_ws(&mut self) -> bool { self.skip_all_chars(WHITE) }

    /// Skip whitespace and drop it from the pending lexeme.
    pub fn ignore_ws(&mut self) {
        self.skip_ws();
        self.ignore();
    }
}

/*
 * Helpers expect the scanner to be at a clean lexeme start,
 * ie: call scanner.ignore() first.
 */

// scan a quoted string like "this is \"an\" example", quotes included
pub fn scan_quoted_string<I: Iterator<Item=char>>(scanner: &mut Scanner<I>, q: char) -> Option<String> {
    let backtrack = scanner.pos();
    if !scanner.accept_char(q) { return None; }
    while let Some(n) = scanner.next() {
        if n == '\\' { scanner.next(); continue; }
        if n == q { return Some(scanner.extract_string()); }
    }
    scanner.set_pos(backtrack);
    None
}

// strip the surrounding quotes and resolve backslash escapes
pub fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_string() {
        let tests = vec![
            r#""this is a test""#,
            r#""another test \" with an escaped quote""#,
            r#""""#,
        ];
        for t in tests.iter() {
            let mut s = Scanner::from_str(t);
            assert_eq!(Some(t.to_string()), scan_quoted_string(&mut s, '"'));
        }
    }

    #[test]
    fn test_unterminated_string_backtracks() {
        let mut s = Scanner::from_str(r#""no end"#);
        assert_eq!(scan_quoted_string(&mut s, '"'), None);
        assert_eq!(s.pos(), 0);
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""hello""#), "hello");
        assert_eq!(unquote(r#""a \"b\"""#), "a \"b\"");
        assert_eq!(unquote(r#""tab\there\\""#), "tab\there\\");
        assert_eq!(unquote(r#""""#), "");
    }
}
