//! Tokenizer for Self source text.

use crate::error::Error;

/// Characters that form operator runs (and binary selectors).
const OPERATOR_CHARS: &str = "-+*/%!=<>~&|,";

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Integer(i64),
    Float(f64),
    String(String),
    /// A plain identifier: a unary selector or slot name.
    Name(String),
    /// An identifier with a trailing `:`; one part of a keyword
    /// selector. The text includes the colon.
    Keyword(String),
    Operator(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Dot,
    Caret,
    End,
}

impl TokenKind {
    /// True for tokens that end a value a binary operator could apply
    /// to; a `-` right after one of these is subtraction, not the sign
    /// of a number literal.
    fn ends_a_value(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer(_)
                | TokenKind::Float(_)
                | TokenKind::String(_)
                | TokenKind::Name(_)
                | TokenKind::RParen
                | TokenKind::RBracket
        )
    }
}

/// A token and the zero-based character offset it starts at.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// True when `keyword` continues a keyword selector (`Put:` in
/// `at:Put:`) rather than starting one: subsequent parts begin with an
/// uppercase letter.
pub fn is_subsequent_keyword(keyword: &str) -> bool {
    keyword
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_uppercase())
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    Lexer {
        chars: source.chars().collect(),
        position: 0,
    }
    .run()
}

struct Lexer {
    chars: Vec<char>,
    position: usize,
}

impl Lexer {
    fn run(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            let start = self.position;
            if c.is_whitespace() {
                self.position += 1;
                continue;
            }
            if c == '"' {
                self.skip_comment(start)?;
                continue;
            }
            let signed = c == '-'
                && self.peek_at(1).is_digit()
                && tokens
                    .last()
                    .map_or(true, |token: &Token| !token.kind.ends_a_value());
            let kind = if c.is_ascii_digit() || signed {
                self.number(start)?
            } else if c == '\'' {
                self.string(start)?
            } else if c.is_alphabetic() || c == '_' {
                self.identifier()
            } else if OPERATOR_CHARS.contains(c) {
                self.operator()
            } else {
                self.position += 1;
                match c {
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    ':' => TokenKind::Colon,
                    '.' => TokenKind::Dot,
                    '^' => TokenKind::Caret,
                    other => {
                        return Err(Error::syntax(
                            format!("unexpected character '{}'", other),
                            start,
                        ));
                    }
                }
            };
            tokens.push(Token {
                kind,
                position: start,
            });
        }
        tokens.push(Token {
            kind: TokenKind::End,
            position: self.chars.len(),
        });
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn skip_comment(&mut self, start: usize) -> Result<(), Error> {
        self.position += 1;
        loop {
            match self.peek() {
                Some('"') => {
                    self.position += 1;
                    return Ok(());
                }
                Some(_) => self.position += 1,
                None => return Err(Error::syntax("unterminated comment", start)),
            }
        }
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, Error> {
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.position += 1;
        }
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.position += 1;
        }
        // A '.' is only a fraction when a digit follows; otherwise it
        // is the statement separator.
        if self.peek() == Some('.') && self.peek_at(1).is_digit() {
            text.push('.');
            self.position += 1;
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                text.push(c);
                self.position += 1;
            }
            let value = text
                .parse::<f64>()
                .map_err(|_| Error::syntax("malformed number literal", start))?;
            Ok(TokenKind::Float(value))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| Error::syntax("integer literal out of range", start))?;
            Ok(TokenKind::Integer(value))
        }
    }

    fn string(&mut self, start: usize) -> Result<TokenKind, Error> {
        self.position += 1;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(Error::syntax("unterminated string literal", start)),
                Some('\'') => {
                    self.position += 1;
                    return Ok(TokenKind::String(text));
                }
                Some('\\') => {
                    self.position += 1;
                    let escaped = self
                        .peek()
                        .ok_or_else(|| Error::syntax("unterminated string literal", start))?;
                    self.position += 1;
                    match escaped {
                        'b' => text.push('\u{0008}'),
                        'f' => text.push('\u{000C}'),
                        'n' => text.push('\n'),
                        'r' => text.push('\r'),
                        't' => text.push('\t'),
                        '\'' => text.push('\''),
                        '\\' => text.push('\\'),
                        'u' => match self.hex_escape() {
                            Some(c) => text.push(c),
                            // Anything but four hex digits: the escape
                            // degrades to a literal 'u'.
                            None => text.push('u'),
                        },
                        other => text.push(other),
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.position += 1;
                }
            }
        }
    }

    /// Four big-endian hex digits after `\u`, or None without
    /// consuming anything.
    fn hex_escape(&mut self) -> Option<char> {
        let mut code = 0u32;
        for offset in 0..4 {
            let digit = self.peek_at(offset)?.to_digit(16)?;
            code = code * 16 + digit;
        }
        self.position += 4;
        Some(std::char::from_u32(code).unwrap_or('\u{FFFD}'))
    }

    fn identifier(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !c.is_alphanumeric() && c != '_' {
                break;
            }
            text.push(c);
            self.position += 1;
        }
        if self.peek() == Some(':') {
            self.position += 1;
            text.push(':');
            TokenKind::Keyword(text)
        } else {
            TokenKind::Name(text)
        }
    }

    fn operator(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !OPERATOR_CHARS.contains(c) {
                break;
            }
            text.push(c);
            self.position += 1;
        }
        TokenKind::Operator(text)
    }
}

trait IsDigit {
    fn is_digit(&self) -> bool;
}

impl IsDigit for Option<char> {
    fn is_digit(&self) -> bool {
        self.map_or(false, |c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenized")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn numbers_and_operators() {
        assert_eq!(
            kinds("3 + 4.5 - -2"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Operator("+".into()),
                TokenKind::Float(4.5),
                TokenKind::Operator("-".into()),
                TokenKind::Integer(-2),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn minus_after_a_value_is_subtraction() {
        assert_eq!(
            kinds("3-4"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Operator("-".into()),
                TokenKind::Integer(4),
                TokenKind::End,
            ]
        );
        assert_eq!(
            kinds("x -1"),
            vec![
                TokenKind::Name("x".into()),
                TokenKind::Operator("-".into()),
                TokenKind::Integer(1),
                TokenKind::End,
            ]
        );
        assert_eq!(
            kinds("x: -1"),
            vec![
                TokenKind::Keyword("x:".into()),
                TokenKind::Integer(-1),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn trailing_dot_is_a_separator() {
        assert_eq!(
            kinds("3.foo"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Dot,
                TokenKind::Name("foo".into()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn keywords_and_arguments() {
        assert_eq!(
            kinds("at: x Put: [| :e | e]"),
            vec![
                TokenKind::Keyword("at:".into()),
                TokenKind::Name("x".into()),
                TokenKind::Keyword("Put:".into()),
                TokenKind::LBracket,
                TokenKind::Operator("|".into()),
                TokenKind::Colon,
                TokenKind::Name("e".into()),
                TokenKind::Operator("|".into()),
                TokenKind::Name("e".into()),
                TokenKind::RBracket,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn operator_runs_merge() {
        assert_eq!(
            kinds("a <- b || c"),
            vec![
                TokenKind::Name("a".into()),
                TokenKind::Operator("<-".into()),
                TokenKind::Name("b".into()),
                TokenKind::Operator("||".into()),
                TokenKind::Name("c".into()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r"'a\nbA\'\q'"),
            vec![TokenKind::String("a\nbA'q".into()), TokenKind::End]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("3 \"the answer's half\" + 4"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Operator("+".into()),
                TokenKind::Integer(4),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn positions_are_character_offsets() {
        let tokens = tokenize("ab 'x' +").expect("tokenized");
        let positions: Vec<usize> = tokens.iter().map(|token| token.position).collect();
        assert_eq!(positions, vec![0, 3, 7, 8]);
    }

    #[test]
    fn unterminated_string_fails() {
        match tokenize("  'oops") {
            Err(Error::Syntax { position, .. }) => assert_eq!(position, 2),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn keyword_part_classification() {
        assert!(is_subsequent_keyword("Put:"));
        assert!(!is_subsequent_keyword("at:"));
        assert!(!is_subsequent_keyword("_VectorAt:"));
    }
}
