#![deny(warnings)]

use crate::char_scanner::{scan_quoted_string, unquote};
use crate::scanner::Scanner;
use std::fmt;
use std::vec;


#[derive(Clone, PartialEq, Debug)]
pub enum LispToken {
    OParen, CParen,
    Quote,
    /// Anything else, classified by the parser as a number or a symbol.
    Atom(String),
    /// A double-quoted literal, escapes already resolved.
    Text(String),
}

impl fmt::Display for LispToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LispToken::OParen => write!(f, "("),
            LispToken::CParen => write!(f, ")"),
            LispToken::Quote => write!(f, "'"),
            LispToken::Atom(a) => write!(f, "{}", a),
            LispToken::Text(s) => write!(f, "{:?}", s),
        }
    }
}

pub struct LispTokenizer(Scanner<vec::IntoIter<char>>);

impl LispTokenizer {
    pub fn new(source: &str) -> LispTokenizer {
        LispTokenizer(Scanner::from_str(source))
    }

    pub fn scanner(source: &str) -> Scanner<LispTokenizer> {
        Scanner::new(LispTokenizer::new(source))
    }

    // whitespace and ';' comments
    fn skip_blanks(&mut self) {
        loop {
            self.0.ignore_ws();
            if !self.0.accept_char(';') { break; }
            self.0.until_any_char("\n");
            self.0.ignore();
        }
    }
}

impl Iterator for LispTokenizer {
    type Item = LispToken;
    fn next(&mut self) -> Option<Self::Item> {
        self.skip_blanks();
        if let Some(s) = scan_quoted_string(&mut self.0, '"') {
            Some(LispToken::Text(unquote(&s)))
        } else if let Some(t) = self.0.accept_any_char("()'") {
            self.0.ignore();
            Some(match t {
                '(' => LispToken::OParen,
                ')' => LispToken::CParen,
                _ => LispToken::Quote,
            })
        } else if self.0.until_any_char("() \n\r\t;") { // or til EOF
            Some(LispToken::Atom(self.0.extract_string()))
        } else {
            None
        }
    }
}

/// Split `source` into tokens, left to right. Never fails: validity is
/// decided by the parser.
pub fn tokenize(source: &str) -> Vec<LispToken> {
    LispTokenizer::new(source).collect()
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{tokenize, LispToken, LispTokenizer};

    fn atom(a: &str) -> LispToken { LispToken::Atom(a.to_string()) }

    #[test]
    fn test_lisp_tokenizer() {
        let inputs = vec![
            "(+ 1 2)",
            "(if (> 5 3) \"yes\" \"no\")",
            "'(a b)",
        ];
        let expect = vec![
            vec![LispToken::OParen, atom("+"), atom("1"), atom("2"), LispToken::CParen],
            vec![LispToken::OParen, atom("if"),
                 LispToken::OParen, atom(">"), atom("5"), atom("3"), LispToken::CParen,
                 LispToken::Text(format!("yes")), LispToken::Text(format!("no")),
                 LispToken::CParen],
            vec![LispToken::Quote, LispToken::OParen, atom("a"), atom("b"), LispToken::CParen],
        ];
        for (input, expected) in inputs.iter().zip(expect.iter()) {
            let mut lx = LispTokenizer::scanner(input);
            for exp in expected.iter() { assert_eq!(*exp, lx.next().unwrap()); }
            assert_eq!(lx.next(), None);
        }
    }

    #[test]
    fn test_parens_need_no_spaces() {
        assert_eq!(tokenize("(+(* 2 3)4)"), vec![
            LispToken::OParen, atom("+"), LispToken::OParen, atom("*"), atom("2"),
            atom("3"), LispToken::CParen, atom("4"), LispToken::CParen,
        ]);
    }

    #[test]
    fn test_blank_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t\n ").is_empty());
        assert!(tokenize("; just a comment").is_empty());
    }

    #[test]
    fn test_comments_and_strings() {
        assert_eq!(tokenize("(print \"a ; b\") ; trailing\n 7"), vec![
            LispToken::OParen, atom("print"), LispToken::Text(format!("a ; b")),
            LispToken::CParen, atom("7"),
        ]);
    }

    #[test]
    fn test_unbalanced_is_still_tokenized() {
        assert_eq!(tokenize(")("), vec![LispToken::CParen, LispToken::OParen]);
    }

    #[test]
    fn test_unterminated_string_is_an_atom() {
        assert_eq!(tokenize("(len \"abc)"), vec![
            LispToken::OParen, atom("len"), atom("\"abc"), LispToken::CParen,
        ]);
    }
}
