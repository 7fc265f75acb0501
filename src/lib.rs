//! A tolerant CSS parser.
//!
//! [`parse`] turns stylesheet text into a [`Root`] that keeps every byte of
//! whitespace and punctuation, so [`stringify`] gives back the input
//! unchanged. Malformed input is fixed up in lenient mode (the default) and
//! rejected with a positioned [`ParseError`] in strict mode.
//!
//! ```
//! let root = tolerant_css_parser::parse("a { color: red }").unwrap();
//! let rule = root.node(root.first().unwrap()).as_rule().unwrap();
//! assert_eq!(rule.selector, "a");
//! assert_eq!(root.to_string(), "a { color: red }");
//! ```

mod error;
mod json;
mod node;
mod options;
mod parser;
mod stringifier;
mod tokenizer;

pub use error::ErrorKind;
pub use error::ParseError;
pub use node::AtRule;
pub use node::Body;
pub use node::BodyKind;
pub use node::Comment;
pub use node::Declaration;
pub use node::Node;
pub use node::NodeData;
pub use node::NodeId;
pub use node::NodeKind;
pub use node::Parent;
pub use node::Root;
pub use node::Rule;
pub use node::Source;
pub use options::ParseOptions;
pub use parser::Parser;
pub use stringifier::Stringifier;
pub use tokenizer::Pos;
pub use tokenizer::Position;
pub use tokenizer::Range;
pub use tokenizer::Token;
pub use tokenizer::TokenKind;
pub use tokenizer::Tokenizer;

pub fn parse(input: &str) -> Result<Root, ParseError> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Root, ParseError> {
    Parser::new(input, options).parse()
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Tokenizer::from(input).tokenize()
}

pub fn stringify(root: &Root) -> String {
    Stringifier::new(root).stringify_root()
}
