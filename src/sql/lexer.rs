//! Tokenizer for SQL DDL dumps.

use std::iter::Peekable;
use std::str::Chars;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Alter,
    Add,
    Table,
    Only,
    Primary,
    Key,
    Foreign,
    References,
    Not,
    Null,
    Unique,
    Default,
    On,
    Delete,
    Update,
    Cascade,
    Restrict,
    Constraint,
    Index,
    If,
    Exists,
    AutoIncrement,
    Check,
    Unsigned,
    Zerofill,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    Eof,
}

/// Keywords the parser cares about. Anything else lexes as an identifier.
const KEYWORDS: &[(&str, Token)] = &[
    ("CREATE", Token::Create),
    ("ALTER", Token::Alter),
    ("ADD", Token::Add),
    ("TABLE", Token::Table),
    ("ONLY", Token::Only),
    ("PRIMARY", Token::Primary),
    ("KEY", Token::Key),
    ("FOREIGN", Token::Foreign),
    ("REFERENCES", Token::References),
    ("NOT", Token::Not),
    ("NULL", Token::Null),
    ("UNIQUE", Token::Unique),
    ("DEFAULT", Token::Default),
    ("ON", Token::On),
    ("DELETE", Token::Delete),
    ("UPDATE", Token::Update),
    ("CASCADE", Token::Cascade),
    ("RESTRICT", Token::Restrict),
    ("CONSTRAINT", Token::Constraint),
    ("INDEX", Token::Index),
    ("IF", Token::If),
    ("EXISTS", Token::Exists),
    ("AUTO_INCREMENT", Token::AutoIncrement),
    ("AUTOINCREMENT", Token::AutoIncrement),
    ("CHECK", Token::Check),
    ("UNSIGNED", Token::Unsigned),
    ("ZEROFILL", Token::Zerofill),
];

fn keyword_or_ident(word: String) -> Token {
    KEYWORDS
        .iter()
        .find(|(kw, _)| kw.eq_ignore_ascii_case(&word))
        .map(|(_, token)| token.clone())
        .unwrap_or(Token::Ident(word))
}

/// DDL lexer. Iterating yields tokens up to, not including, `Token::Eof`.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Character after the one `peek` returns.
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.chars.next_if(|&c| pred(c)) {
            out.push(c);
        }
        out
    }

    fn skip_line(&mut self) {
        self.take_while(|c| c != '\n');
    }

    /// Called with `/*` already consumed.
    fn skip_block_comment(&mut self) {
        let mut prev = '\0';
        for c in self.chars.by_ref() {
            if prev == '*' && c == '/' {
                break;
            }
            prev = c;
        }
    }

    /// Called with the opening delimiter consumed. A doubled `close` stands for
    /// one literal `close`.
    fn read_delimited(&mut self, close: char, backslash_escapes: bool) -> String {
        let mut s = String::new();
        while let Some(c) = self.chars.next() {
            if c == close {
                if self.chars.next_if_eq(&close).is_none() {
                    break;
                }
                s.push(close);
            } else if c == '\\' && backslash_escapes {
                match self.chars.next() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some(other) => s.push(other),
                    None => break,
                }
            } else {
                s.push(c);
            }
        }
        s
    }

    /// PostgreSQL dollar quoting, `$$ ... $$` or `$tag$ ... $tag$`, called with
    /// the first `$` consumed. `None` when the `$` opens no tag, as in `$1`.
    fn read_dollar_quoted(&mut self) -> Option<String> {
        let name = self.take_while(|c| c.is_alphanumeric() || c == '_');
        self.chars.next_if_eq(&'$')?;
        let tag = format!("${}$", name);

        let mut body = String::new();
        for c in self.chars.by_ref() {
            body.push(c);
            if body.ends_with(&tag) {
                body.truncate(body.len() - tag.len());
                break;
            }
        }
        Some(body)
    }

    fn read_number(&mut self, first: char) -> String {
        let mut num = first.to_string();
        num.push_str(&self.take_while(|c| c.is_ascii_digit()));
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.chars.next();
            num.push('.');
            num.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        num
    }

    /// Collect all tokens, ending with `Token::Eof`.
    pub fn tokenize(self) -> Vec<Token> {
        self.chain(std::iter::once(Token::Eof)).collect()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let c = self.chars.next()?;
            let token = match c {
                c if c.is_whitespace() => continue,
                '-' if self.peek() == Some('-') => {
                    self.skip_line();
                    continue;
                }
                '-' if self.peek().is_some_and(|d| d.is_ascii_digit()) => {
                    let digit = self.chars.next()?;
                    let mut num = self.read_number(digit);
                    num.insert(0, '-');
                    Token::Num(num)
                }
                '/' if self.chars.next_if_eq(&'*').is_some() => {
                    self.skip_block_comment();
                    continue;
                }
                '#' => {
                    self.skip_line();
                    continue;
                }
                '(' => Token::LParen,
                ')' => Token::RParen,
                ',' => Token::Comma,
                ';' => Token::Semicolon,
                '.' => Token::Dot,
                '"' => Token::Ident(self.read_delimited('"', false)),
                '`' => Token::Ident(self.read_delimited('`', false)),
                '[' => Token::Ident(self.read_delimited(']', false)),
                '\'' => Token::Str(self.read_delimited('\'', true)),
                '$' => match self.read_dollar_quoted() {
                    Some(body) => Token::Str(body),
                    None => continue,
                },
                c if c.is_ascii_digit() => Token::Num(self.read_number(c)),
                c if c.is_alphabetic() || c == '_' => {
                    let mut word = c.to_string();
                    word.push_str(&self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '$'));
                    keyword_or_ident(word)
                }
                // '=', ':' and friends carry nothing for DDL structure
                _ => continue,
            };
            return Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn test_simple_create_table() {
        let tokens = Lexer::new("CREATE TABLE users (id INT);").tokenize();

        assert_eq!(
            tokens,
            vec![
                Token::Create,
                Token::Table,
                ident("users"),
                Token::LParen,
                ident("id"),
                ident("INT"),
                Token::RParen,
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        let sql = r#"CREATE TABLE "User Table" (`column name` INT, [other] INT);"#;
        let tokens = Lexer::new(sql).tokenize();

        assert_eq!(tokens[2], ident("User Table"));
        assert_eq!(tokens[4], ident("column name"));
        assert_eq!(tokens[7], ident("other"));
    }

    #[test]
    fn test_quoted_keyword_stays_identifier() {
        let tokens = Lexer::new(r#""key" "order""#).tokenize();

        assert_eq!(tokens[0], ident("key"));
        assert_eq!(tokens[1], ident("order"));
    }

    #[test]
    fn test_comments() {
        let sql = "-- comment\nCREATE /* block */ TABLE t (id INT); # mysql comment";
        let tokens = Lexer::new(sql).tokenize();

        assert_eq!(tokens[0], Token::Create);
        assert_eq!(tokens[1], Token::Table);
        assert_eq!(tokens.last(), Some(&Token::Eof));
        assert_eq!(tokens.len(), 9);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r"'it''s' 'a\nb'").tokenize();

        assert_eq!(tokens[0], Token::Str("it's".to_string()));
        assert_eq!(tokens[1], Token::Str("a\nb".to_string()));
    }

    #[test]
    fn test_dollar_quoted_body_is_one_token() {
        let sql = "CREATE FUNCTION f() AS $body$ CREATE TABLE x (id INT); $body$; CREATE TABLE y";
        let tokens = Lexer::new(sql).tokenize();

        assert!(tokens.contains(&Token::Str(" CREATE TABLE x (id INT); ".to_string())));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Table).count(), 1);
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("DECIMAL(10, 2) DEFAULT -1.5").tokenize();

        assert_eq!(tokens[2], Token::Num("10".to_string()));
        assert_eq!(tokens[4], Token::Num("2".to_string()));
        assert_eq!(tokens[7], Token::Num("-1.5".to_string()));
    }
}
