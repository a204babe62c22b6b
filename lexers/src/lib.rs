mod scanner;
mod char_scanner;
mod lisp_tokenizer;

pub use scanner::Scanner;
pub use char_scanner::{scan_quoted_string, unquote};
pub use lisp_tokenizer::{LispTokenizer, LispToken, tokenize};
