use std::collections::HashSet;
use std::str::Chars;

use smallvec::SmallVec;

pub const C_LINE_FEED: char = '\n';
pub const C_CARRIAGE_RETURN: char = '\r';
pub const C_FORM_FEED: char = '\u{c}';

pub const C_TAB: char = '\t';
pub const C_SPACE: char = ' ';

pub const C_SOLIDUS: char = '/';
pub const C_REVERSE_SOLIDUS: char = '\\';
pub const C_ASTERISK: char = '*';

pub const C_LEFT_PARENTHESIS: char = '(';
pub const C_RIGHT_PARENTHESIS: char = ')';
pub const C_LEFT_CURLY: char = '{';
pub const C_RIGHT_CURLY: char = '}';
pub const C_LEFT_SQUARE: char = '[';
pub const C_RIGHT_SQUARE: char = ']';

pub const C_QUOTATION_MARK: char = '"';
pub const C_APOSTROPHE: char = '\'';

pub const C_COLON: char = ':';
pub const C_SEMICOLON: char = ';';
pub const C_AT_SIGN: char = '@';
pub const C_EXCLAMATION_MARK: char = '!';

pub const C_BYTE_ORDER_MARK: char = '\u{feff}';

/// Byte offset into the BOM-stripped input.
pub type Pos = u32;

/// 1-based line and column. Lines are counted by `\n`, columns by characters.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Range {
    pub start: Pos,
    pub end: Pos,
}

impl Range {
    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    String,
    Comment,
    AtWord,
    OpenCurly,
    CloseCurly,
    Semicolon,
    Colon,
    Space,
    /// A bracket without a matching closer.
    Other,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::String => "string",
            TokenKind::Comment => "comment",
            TokenKind::AtWord => "at-word",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Space => "space",
            TokenKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub range: Range,
    /// Position of the first character.
    pub start: Position,
    /// Position of the last character.
    pub end: Position,
    /// A string or comment that ran into the end of input.
    pub unclosed: bool,
}

pub fn strip_bom(input: &str) -> &str {
    input.strip_prefix(C_BYTE_ORDER_MARK).unwrap_or(input)
}

#[derive(Debug, Clone)]
pub struct Tokenizer<'s> {
    value: &'s str,
    iter: Chars<'s>,
    cur_pos: Pos,
    cur: Option<char>,
    peek: Option<char>,
    peek2: Option<char>,
    position: Position,
    last: Position,
    /// Openers already known to have no matching closer.
    unmatched: HashSet<Pos>,
}

impl<'s> From<&'s str> for Tokenizer<'s> {
    fn from(value: &'s str) -> Self {
        let value = strip_bom(value);
        let mut iter = value.chars();
        let cur = iter.next();
        let peek = iter.next();
        let peek2 = iter.next();
        Self {
            value,
            iter,
            cur_pos: 0,
            cur,
            peek,
            peek2,
            position: Position::default(),
            last: Position::default(),
            unmatched: HashSet::new(),
        }
    }
}

impl<'s> Tokenizer<'s> {
    pub fn consume(&mut self) -> Option<char> {
        let c = self.cur?;
        self.cur_pos += c.len_utf8() as Pos;
        self.last = self.position;
        if c == C_LINE_FEED {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }
        self.cur = self.peek;
        self.peek = self.peek2;
        self.peek2 = self.iter.next();
        self.cur
    }

    pub fn cur_pos(&self) -> Pos {
        self.cur_pos
    }

    pub fn cur(&self) -> Option<char> {
        self.cur
    }

    pub fn peek(&self) -> Option<char> {
        self.peek
    }

    pub fn peek2(&self) -> Option<char> {
        self.peek2
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn slice(&self, start: Pos, end: Pos) -> Option<&'s str> {
        self.value.get(start as usize..end as usize)
    }

    fn is_comment_start(&self) -> bool {
        self.cur == Some(C_SOLIDUS) && self.peek == Some(C_ASTERISK)
    }
}

impl<'s> Tokenizer<'s> {
    pub fn tokenize(mut self) -> Vec<Token<'s>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.cur() {
            let start = self.cur_pos();
            let start_position = self.position();
            let mut unclosed = false;
            let kind = match c {
                c if is_white_space(c) => {
                    self.consume_space();
                    TokenKind::Space
                }
                C_QUOTATION_MARK | C_APOSTROPHE => {
                    unclosed = !self.consume_string(c);
                    TokenKind::String
                }
                C_SOLIDUS if self.peek() == Some(C_ASTERISK) => {
                    unclosed = !self.consume_comment();
                    TokenKind::Comment
                }
                C_LEFT_CURLY => {
                    self.consume();
                    TokenKind::OpenCurly
                }
                C_RIGHT_CURLY => {
                    self.consume();
                    TokenKind::CloseCurly
                }
                C_SEMICOLON => {
                    self.consume();
                    TokenKind::Semicolon
                }
                C_COLON => {
                    self.consume();
                    TokenKind::Colon
                }
                C_AT_SIGN => {
                    self.consume_at_word();
                    TokenKind::AtWord
                }
                _ => {
                    if self.consume_word() {
                        TokenKind::Word
                    } else {
                        self.consume();
                        TokenKind::Other
                    }
                }
            };
            let end = self.cur_pos();
            tokens.push(Token {
                kind,
                // Token boundaries always fall on char boundaries.
                text: self.slice(start, end).unwrap_or_default(),
                range: Range::new(start, end),
                start: start_position,
                end: self.last,
                unclosed,
            });
        }
        tokens
    }

    pub fn consume_space(&mut self) {
        while matches!(self.cur(), Some(c) if is_white_space(c)) {
            self.consume();
        }
    }

    /// Returns `false` when the input ends before the closing quote.
    pub fn consume_string(&mut self, quote: char) -> bool {
        self.consume();
        loop {
            match self.cur() {
                None => return false,
                Some(C_REVERSE_SOLIDUS) => {
                    self.consume();
                    self.consume();
                }
                Some(c) if c == quote => {
                    self.consume();
                    return true;
                }
                Some(_) => {
                    self.consume();
                }
            }
        }
    }

    /// Returns `false` when the input ends before `*/`.
    pub fn consume_comment(&mut self) -> bool {
        self.consume();
        self.consume();
        loop {
            match self.cur() {
                None => return false,
                Some(C_ASTERISK) if self.peek() == Some(C_SOLIDUS) => {
                    self.consume();
                    self.consume();
                    return true;
                }
                Some(_) => {
                    self.consume();
                }
            }
        }
    }

    pub fn consume_at_word(&mut self) {
        self.consume();
        while let Some(c) = self.cur() {
            if is_white_space(c)
                || matches!(
                    c,
                    C_LEFT_CURLY
                        | C_RIGHT_CURLY
                        | C_SEMICOLON
                        | C_LEFT_PARENTHESIS
                        | C_QUOTATION_MARK
                        | C_APOSTROPHE
                )
                || self.is_comment_start()
            {
                break;
            }
            if c == C_REVERSE_SOLIDUS {
                self.consume();
            }
            self.consume();
        }
    }

    /// Consumes a word, keeping balanced `(...)` and `[...]` groups opaque.
    /// Returns `false` if nothing was consumed, which happens when the word
    /// would start with a bracket that is never closed.
    pub fn consume_word(&mut self) -> bool {
        let start = self.cur_pos();
        while let Some(c) = self.cur() {
            if is_white_space(c)
                || matches!(
                    c,
                    C_LEFT_CURLY
                        | C_RIGHT_CURLY
                        | C_SEMICOLON
                        | C_COLON
                        | C_QUOTATION_MARK
                        | C_APOSTROPHE
                )
                || self.is_comment_start()
            {
                break;
            }
            match c {
                C_REVERSE_SOLIDUS => {
                    self.consume();
                    self.consume();
                }
                C_LEFT_PARENTHESIS | C_LEFT_SQUARE => {
                    if !self.scan_group() {
                        break;
                    }
                }
                _ => {
                    self.consume();
                }
            }
        }
        self.cur_pos() != start
    }

    /// Looks ahead from an opening bracket to its matching closer and moves
    /// just past it. On failure the cursor stays put, and every opener the
    /// lookahead left open is remembered so it is never scanned again.
    fn scan_group(&mut self) -> bool {
        if self.unmatched.contains(&self.cur_pos) {
            return false;
        }
        let unmatched = std::mem::take(&mut self.unmatched);
        let mut lookahead = self.clone();
        self.unmatched = unmatched;
        let mut open: SmallVec<[(char, Pos); 4]> = SmallVec::new();
        while let Some(c) = lookahead.cur() {
            match c {
                C_LEFT_PARENTHESIS => open.push((C_RIGHT_PARENTHESIS, lookahead.cur_pos())),
                C_LEFT_SQUARE => open.push((C_RIGHT_SQUARE, lookahead.cur_pos())),
                C_RIGHT_PARENTHESIS | C_RIGHT_SQUARE => {
                    if !matches!(open.last(), Some(&(closer, _)) if closer == c) {
                        break;
                    }
                    open.pop();
                    if open.is_empty() {
                        lookahead.consume();
                        lookahead.unmatched = std::mem::take(&mut self.unmatched);
                        *self = lookahead;
                        return true;
                    }
                }
                C_QUOTATION_MARK | C_APOSTROPHE => {
                    if !lookahead.consume_string(c) {
                        break;
                    }
                    continue;
                }
                C_REVERSE_SOLIDUS => {
                    lookahead.consume();
                }
                _ => {}
            }
            lookahead.consume();
        }
        self.unmatched.extend(open.iter().map(|&(_, pos)| pos));
        false
    }
}

pub fn is_new_line(c: char) -> bool {
    c == C_LINE_FEED || c == C_CARRIAGE_RETURN || c == C_FORM_FEED
}

pub fn is_space(c: char) -> bool {
    c == C_TAB || c == C_SPACE
}

pub fn is_white_space(c: char) -> bool {
    is_new_line(c) || is_space(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        Tokenizer::from(input)
            .tokenize()
            .into_iter()
            .map(|token| (token.kind, token.text))
            .collect()
    }

    #[test]
    fn cursor_tracks_lines_and_columns() {
        let mut t = Tokenizer::from("a\nbc");
        assert_eq!(t.cur(), Some('a'));
        assert_eq!(t.position(), Position::new(1, 1));
        t.consume();
        assert_eq!(t.cur(), Some('\n'));
        assert_eq!(t.position(), Position::new(1, 2));
        t.consume();
        assert_eq!(t.position(), Position::new(2, 1));
        assert_eq!(t.peek(), Some('c'));
        assert_eq!(t.peek2(), None);
        t.consume();
        t.consume();
        assert_eq!(t.cur(), None);
        assert_eq!(t.cur_pos(), 4);
        assert_eq!(t.consume(), None);
        assert_eq!(t.cur_pos(), 4);
    }

    #[test]
    fn group_scan_stops_at_mismatched_closer() {
        assert_eq!(
            kinds("a(]"),
            vec![(TokenKind::Word, "a"), (TokenKind::Other, "("), (TokenKind::Word, "]")]
        );
    }

    #[test]
    fn failed_group_scan_marks_inner_openers() {
        let mut t = Tokenizer::from("(a[b(c)");
        assert!(!t.consume_word());
        assert_eq!(t.cur_pos(), 0);
        assert_eq!(t.unmatched, HashSet::from([0, 2]));
        t.consume();
        t.consume();
        assert!(!t.consume_word());
        assert_eq!(t.cur_pos(), 2);
    }

    #[test]
    fn escaped_delimiters_stay_in_word() {
        assert_eq!(kinds(r"a\{b"), vec![(TokenKind::Word, r"a\{b")]);
        assert_eq!(kinds(r"'a\'b'"), vec![(TokenKind::String, r"'a\'b'")]);
    }

    #[test]
    fn multibyte_columns_count_characters() {
        let tokens = Tokenizer::from("é ü").tokenize();
        assert_eq!(tokens[2].start, Position::new(1, 3));
        assert_eq!(tokens[2].range, Range::new(3, 5));
    }
}
