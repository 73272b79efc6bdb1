//! SQL parser for CREATE TABLE / ALTER TABLE statements.

use super::dialect::Dialect;
use super::lexer::{Lexer, Token};
use super::types::parse_type;
use crate::schema::{ColumnDescriptor, ForeignKeyDescriptor, TableDescriptor};
use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlParseError {
    #[error("Unexpected token: {0:?}")]
    UnexpectedToken(Token),
    #[error("Expected {expected}, found {found:?}")]
    Expected { expected: String, found: Token },
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Parse a SQL dump into table descriptors, in declaration order.
pub fn parse_sql(input: &str, dialect: Dialect) -> Result<Vec<TableDescriptor>, SqlParseError> {
    let dialect = dialect.resolve(input);
    debug!("parsing SQL as {}", dialect);
    let tokens = Lexer::new(input).tokenize();
    Parser::new(tokens, dialect).parse()
}

/// Foreign key as written; the target column list may be empty.
struct FkInfo {
    columns: Vec<String>,
    target: String,
    target_columns: Vec<String>,
}

/// Constraints that may arrive after their table, via ALTER TABLE or inline
/// references to tables declared later.
enum Pending {
    PrimaryKey { table: String, columns: Vec<String> },
    ForeignKey { table: String, fk: FkInfo },
}

/// Column-level words that end a type name.
const TYPE_TERMINATORS: [&str; 6] = ["COLLATE", "COMMENT", "GENERATED", "AS", "CHARSET", "IDENTITY"];

/// Table-level definitions that are not columns.
const SKIPPED_DEFINITIONS: [&str; 4] = ["FULLTEXT", "SPATIAL", "EXCLUDE", "LIKE"];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    dialect: Dialect,
    tables: Vec<TableDescriptor>,
    pending: Vec<Pending>,
}

impl Parser {
    fn new(tokens: Vec<Token>, dialect: Dialect) -> Self {
        Self {
            tokens,
            pos: 0,
            dialect,
            tables: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), SqlParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(SqlParseError::Expected {
                expected: expected.to_string(),
                found: self.current().clone(),
            })
        }
    }

    fn parse(mut self) -> Result<Vec<TableDescriptor>, SqlParseError> {
        while self.current() != &Token::Eof {
            match self.current() {
                Token::Create => {
                    self.advance();
                    // TEMPORARY, UNLOGGED, GLOBAL ...
                    while matches!(self.current(), Token::Ident(_)) {
                        self.advance();
                    }
                    if self.eat(&Token::Table) {
                        self.parse_create_table()?;
                    } else {
                        // CREATE INDEX, VIEW, FUNCTION ...
                        self.skip_statement();
                    }
                }
                Token::Alter => self.parse_alter_table()?,
                _ => self.advance(),
            }
        }

        self.apply_pending();
        Ok(self.tables)
    }

    /// `[schema.]name`, keeping only the last part.
    fn parse_qualified_name(&mut self) -> Option<String> {
        let mut name = match self.current() {
            Token::Ident(n) => n.clone(),
            _ => return None,
        };
        self.advance();
        while self.current() == &Token::Dot {
            self.advance();
            if let Token::Ident(n) = self.current() {
                name = n.clone();
                self.advance();
            }
        }
        Some(name)
    }

    fn skip_if_not_exists(&mut self) {
        if self.eat(&Token::If) {
            self.eat(&Token::Not);
            self.eat(&Token::Exists);
        }
    }

    fn parse_create_table(&mut self) -> Result<(), SqlParseError> {
        self.skip_if_not_exists();

        let Some(table_name) = self.parse_qualified_name() else {
            self.skip_statement();
            return Ok(());
        };
        if self.current() != &Token::LParen {
            // CREATE TABLE ... AS SELECT
            self.skip_statement();
            return Ok(());
        }
        self.advance();

        let mut table = TableDescriptor::new(table_name.clone());
        let mut pk_columns: Vec<String> = Vec::new();

        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Comma => self.advance(),
                Token::Primary => {
                    self.advance();
                    self.expect(Token::Key, "KEY")?;
                    pk_columns.extend(self.parse_column_list());
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Foreign => {
                    let fk = self.parse_foreign_key()?;
                    self.pending.push(Pending::ForeignKey {
                        table: table_name.clone(),
                        fk,
                    });
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Constraint => {
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                Token::Unique | Token::Index | Token::Key | Token::Check => {
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Ident(word) if SKIPPED_DEFINITIONS.contains(&word.to_uppercase().as_str()) => {
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Ident(_) => {
                    if let Some(column) = self.parse_column(&table_name)? {
                        table.columns.push(column);
                    }
                }
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                _ => self.advance(),
            }
        }

        // Table options (ENGINE=..., PARTITION BY ...)
        self.skip_statement();

        mark_primary(&mut table, &pk_columns);
        self.tables.push(table);
        Ok(())
    }

    fn parse_column(&mut self, table_name: &str) -> Result<Option<ColumnDescriptor>, SqlParseError> {
        let name = match self.current() {
            Token::Ident(n) => n.clone(),
            _ => return Ok(None),
        };
        self.advance();

        let raw_type = self.collect_type();
        if raw_type.is_empty() {
            return Ok(None);
        }
        let column_type = parse_type(&raw_type, self.dialect);

        let mut column = ColumnDescriptor::new(name.clone(), column_type.name);
        column.length = column_type.length;
        column.precision = column_type.precision;
        let mut not_null = false;

        loop {
            match self.current() {
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    column.is_primary = true;
                }
                Token::Not => {
                    self.advance();
                    if self.eat(&Token::Null) {
                        not_null = true;
                    }
                }
                Token::Null => self.advance(),
                Token::Unique => {
                    self.advance();
                    self.eat(&Token::Key);
                }
                Token::Default => {
                    self.advance();
                    column.default_value = Some(self.parse_default_value());
                }
                Token::References => {
                    self.advance();
                    let (target, target_columns) = self.parse_reference()?;
                    self.pending.push(Pending::ForeignKey {
                        table: table_name.to_string(),
                        fk: FkInfo {
                            columns: vec![name.clone()],
                            target,
                            target_columns,
                        },
                    });
                    self.skip_on_actions();
                }
                Token::Check | Token::LParen => self.skip_parenthesized(),
                Token::Constraint => {
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                Token::On => self.skip_on_actions(),
                // GENERATED ... AS IDENTITY / AS (expr) STORED
                Token::Ident(word) if word.eq_ignore_ascii_case("GENERATED") => {
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Comma | Token::RParen | Token::Eof => break,
                _ => self.advance(),
            }
        }

        column.is_nullable = !(not_null || column.is_primary);
        Ok(Some(column))
    }

    /// Gather the raw type text following a column name, e.g. `varchar(255)`
    /// or `double precision`.
    fn collect_type(&mut self) -> String {
        let mut raw = String::new();
        let mut depth = 0;

        loop {
            match self.current() {
                Token::Ident(word) if depth == 0 && !raw.is_empty() && ends_type(word, self.peek()) => {
                    break;
                }
                // `[]` lexes as an empty bracketed identifier
                Token::Ident(word) if word.is_empty() => raw.push_str("[]"),
                Token::Ident(word) => {
                    if !raw.is_empty() && !raw.ends_with(['(', ',']) {
                        raw.push(' ');
                    }
                    raw.push_str(word);
                }
                Token::Unsigned => raw.push_str(" unsigned"),
                Token::Zerofill => raw.push_str(" zerofill"),
                Token::LParen => {
                    depth += 1;
                    raw.push('(');
                }
                Token::RParen if depth > 0 => {
                    depth -= 1;
                    raw.push(')');
                }
                Token::Num(n) if depth > 0 => raw.push_str(n),
                Token::Str(s) if depth > 0 => {
                    // enum('a', 'b')
                    raw.push('\'');
                    raw.push_str(s);
                    raw.push('\'');
                }
                Token::Comma if depth > 0 => raw.push(','),
                _ => break,
            }
            self.advance();
        }

        raw
    }

    fn parse_default_value(&mut self) -> String {
        match self.current().clone() {
            Token::Str(s) => {
                self.advance();
                s
            }
            Token::Num(n) => {
                self.advance();
                n
            }
            Token::Null => {
                self.advance();
                "NULL".to_string()
            }
            Token::Ident(mut value) => {
                self.advance();
                // Function calls like now() or nextval('seq')
                if self.eat(&Token::LParen) {
                    value.push('(');
                    value.push_str(&self.collect_until_paren());
                    value.push(')');
                }
                value
            }
            Token::LParen => {
                self.advance();
                format!("({})", self.collect_until_paren())
            }
            _ => String::new(),
        }
    }

    /// Join tokens up to the matching `)`, which is consumed.
    fn collect_until_paren(&mut self) -> String {
        let mut parts = Vec::new();
        let mut depth = 1;

        loop {
            match self.current() {
                Token::LParen => {
                    depth += 1;
                    parts.push("(".to_string());
                }
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                    parts.push(")".to_string());
                }
                Token::Ident(s) | Token::Num(s) => parts.push(s.clone()),
                Token::Str(s) => parts.push(format!("'{}'", s)),
                Token::Comma => parts.push(",".to_string()),
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }

        parts.join(" ")
    }

    /// `table [(col, ...)]` after REFERENCES.
    fn parse_reference(&mut self) -> Result<(String, Vec<String>), SqlParseError> {
        let Some(target) = self.parse_qualified_name() else {
            return Err(SqlParseError::UnexpectedToken(self.current().clone()));
        };
        let columns = self.parse_column_list();
        Ok((target, columns))
    }

    /// `FOREIGN KEY (cols) REFERENCES table [(cols)] [ON ...]`
    fn parse_foreign_key(&mut self) -> Result<FkInfo, SqlParseError> {
        self.advance(); // FOREIGN
        self.expect(Token::Key, "KEY")?;
        // MySQL allows an index name here
        if let Token::Ident(_) = self.current() {
            self.advance();
        }
        if self.current() != &Token::LParen {
            return Err(SqlParseError::Expected {
                expected: "(".to_string(),
                found: self.current().clone(),
            });
        }
        let columns = self.parse_column_list();

        self.expect(Token::References, "REFERENCES")?;
        let (target, target_columns) = self.parse_reference()?;
        self.skip_on_actions();

        Ok(FkInfo {
            columns,
            target,
            target_columns,
        })
    }

    fn parse_column_list(&mut self) -> Vec<String> {
        let mut cols = Vec::new();
        if !self.eat(&Token::LParen) {
            return cols;
        }

        loop {
            match self.current() {
                Token::Ident(name) => {
                    cols.push(name.clone());
                    self.advance();
                }
                // Prefix lengths: KEY (name(10))
                Token::LParen => self.skip_parenthesized(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => break,
                _ => self.advance(),
            }
        }

        cols
    }

    /// `ALTER TABLE [IF EXISTS] [ONLY] t ADD [CONSTRAINT n] PRIMARY KEY (...) | FOREIGN KEY ...`,
    /// possibly several comma-separated actions.
    fn parse_alter_table(&mut self) -> Result<(), SqlParseError> {
        self.advance(); // ALTER
        if !self.eat(&Token::Table) {
            self.skip_statement();
            return Ok(());
        }
        self.skip_if_not_exists();
        self.eat(&Token::Only);

        let Some(table_name) = self.parse_qualified_name() else {
            self.skip_statement();
            return Ok(());
        };

        loop {
            if self.eat(&Token::Add) {
                if self.eat(&Token::Constraint) {
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                match self.current() {
                    Token::Primary => {
                        self.advance();
                        self.expect(Token::Key, "KEY")?;
                        let columns = self.parse_column_list();
                        self.pending.push(Pending::PrimaryKey {
                            table: table_name.clone(),
                            columns,
                        });
                    }
                    Token::Foreign => {
                        let fk = self.parse_foreign_key()?;
                        self.pending.push(Pending::ForeignKey {
                            table: table_name.clone(),
                            fk,
                        });
                    }
                    _ => {}
                }
            }
            self.skip_until(&[Token::Comma, Token::Semicolon]);
            if !self.eat(&Token::Comma) {
                break;
            }
        }

        self.eat(&Token::Semicolon);
        Ok(())
    }

    fn skip_on_actions(&mut self) {
        while self.eat(&Token::On) {
            // DELETE or UPDATE
            if matches!(self.current(), Token::Delete | Token::Update) {
                self.advance();
            }
            // CASCADE, RESTRICT, SET NULL, SET DEFAULT, NO ACTION
            match self.current() {
                Token::Cascade | Token::Restrict => self.advance(),
                Token::Ident(s) if s.eq_ignore_ascii_case("SET") => {
                    self.advance();
                    if matches!(self.current(), Token::Null | Token::Default) {
                        self.advance();
                    }
                }
                Token::Ident(s) if s.eq_ignore_ascii_case("NO") => {
                    self.advance();
                    if matches!(self.current(), Token::Ident(a) if a.eq_ignore_ascii_case("ACTION")) {
                        self.advance();
                    }
                }
                _ => {}
            }
        }
    }

    fn skip_parenthesized(&mut self) {
        if !self.eat(&Token::LParen) {
            self.advance();
            return;
        }
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        self.eat(&Token::Semicolon);
    }

    fn skip_until(&mut self, tokens: &[Token]) {
        while !tokens.contains(self.current()) && self.current() != &Token::Eof {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }

    /// Attach deferred primary and foreign keys to their tables. Primary keys
    /// go first so bare references resolve against them.
    fn apply_pending(&mut self) {
        let (primary, foreign): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| matches!(p, Pending::PrimaryKey { .. }));

        for pending in primary.into_iter().chain(foreign) {
            match pending {
                Pending::PrimaryKey { table, columns } => {
                    match self.tables.iter_mut().find(|t| t.name == table) {
                        Some(t) => mark_primary(t, &columns),
                        None => warn!("primary key on unknown table {} ignored", table),
                    }
                }
                Pending::ForeignKey { table, fk } => self.attach_foreign_key(&table, fk),
            }
        }
    }

    fn attach_foreign_key(&mut self, table: &str, fk: FkInfo) {
        let target_columns = if fk.target_columns.is_empty() {
            // Bare REFERENCES t points at t's primary key
            let pk = self
                .tables
                .iter()
                .find(|t| t.name == fk.target)
                .and_then(|t| t.primary_key())
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "id".to_string());
            vec![pk]
        } else {
            fk.target_columns
        };

        let Some(owner) = self.tables.iter_mut().find(|t| t.name == table) else {
            warn!("foreign key on unknown table {} ignored", table);
            return;
        };

        for (column, referenced_column) in fk.columns.into_iter().zip(target_columns) {
            let descriptor = ForeignKeyDescriptor {
                column,
                referenced_table: fk.target.clone(),
                referenced_column,
            };
            if !owner.foreign_keys.contains(&descriptor) {
                owner.foreign_keys.push(descriptor);
            }
        }
    }
}

fn ends_type(word: &str, next: &Token) -> bool {
    let upper = word.to_uppercase();
    if TYPE_TERMINATORS.contains(&upper.as_str()) {
        return true;
    }
    // CHARACTER SET utf8, but not "character varying"
    upper == "CHARACTER" && matches!(next, Token::Ident(n) if n.eq_ignore_ascii_case("SET"))
}

fn mark_primary(table: &mut TableDescriptor, columns: &[String]) {
    for column in table.columns.iter_mut() {
        if columns.contains(&column.name) {
            column.is_primary = true;
            column.is_nullable = false;
        }
    }
}
