//! SQL dialect detection.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Detect from dump content
    #[default]
    Auto,
    Generic,
    PostgreSQL,
    MySQL,
}

const POSTGRES_HEADERS: [&str; 3] = ["postgresql database dump", "pg_dump", "-- postgres"];
const MYSQL_HEADERS: [&str; 4] = ["mysql dump", "mysqldump", "-- mysql", "mariadb dump"];

const POSTGRES_HINTS: [&str; 7] = [
    "serial", "text[]", "::", "timestamptz", "jsonb", "bytea", "alter table only",
];
const MYSQL_HINTS: [&str; 6] = [
    "auto_increment",
    "tinyint",
    "engine=",
    "unsigned",
    "`",
    "charset=",
];

impl Dialect {
    /// Detect dialect from SQL content: dump headers first, then keyword hints.
    pub fn detect(content: &str) -> Self {
        let lower = content.to_lowercase();

        if POSTGRES_HEADERS.iter().any(|h| lower.contains(h)) {
            return Self::PostgreSQL;
        }
        if MYSQL_HEADERS.iter().any(|h| lower.contains(h)) {
            return Self::MySQL;
        }

        let pg = POSTGRES_HINTS.iter().filter(|h| lower.contains(*h)).count();
        let my = MYSQL_HINTS.iter().filter(|h| lower.contains(*h)).count();
        match pg.cmp(&my) {
            std::cmp::Ordering::Greater => Self::PostgreSQL,
            std::cmp::Ordering::Less => Self::MySQL,
            std::cmp::Ordering::Equal => Self::Generic,
        }
    }

    /// Resolve `Auto` to a concrete dialect.
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "generic" | "sql" => Ok(Self::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Self::PostgreSQL),
            "mysql" | "mariadb" => Ok(Self::MySQL),
            other => Err(format!("unknown SQL dialect: {}", other)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Generic => "generic",
            Self::PostgreSQL => "postgres",
            Self::MySQL => "mysql",
        };
        f.write_str(name)
    }
}
