//! Column type normalisation.

use super::Dialect;

/// Normalised column type with its size arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub name: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
}

/// Split a raw SQL type such as `VARCHAR(255)` or `numeric(10, 2) unsigned`
/// and map its base name for `dialect`.
pub fn parse_type(raw: &str, dialect: Dialect) -> ColumnType {
    let lower = raw.to_lowercase();
    let (base, args) = match lower.split_once('(') {
        Some((base, rest)) => (base, rest.split(')').next().unwrap_or("")),
        None => (lower.as_str(), ""),
    };
    // Array suffix may follow the arguments: varchar(20)[]
    let array = lower.trim_end().ends_with("[]") && !base.trim_end().ends_with("[]");

    let base = base
        .split_whitespace()
        .filter(|w| !matches!(*w, "unsigned" | "signed" | "zerofill"))
        .collect::<Vec<_>>()
        .join(" ");
    let base = if array { format!("{}[]", base) } else { base };

    let sizes: Vec<u32> = args
        .split(',')
        .filter_map(|a| a.trim().parse().ok())
        .collect();
    let name = map_type(&base, &lower, dialect);
    if name == "boolean" && base.starts_with("tinyint") {
        // tinyint(1) as boolean carries no size
        return ColumnType {
            name,
            length: None,
            precision: None,
        };
    }

    let is_decimal = matches!(name.as_str(), "decimal" | "numeric");
    let (length, precision) = match (is_decimal, sizes.first()) {
        (true, Some(&p)) => (None, Some(p)),
        (false, Some(&l)) => (Some(l), None),
        (_, None) => (None, None),
    };

    ColumnType {
        name,
        length,
        precision,
    }
}

/// Map a SQL base type name to its normalised name.
pub fn map_type(base: &str, full: &str, dialect: Dialect) -> String {
    if let Some(inner) = base.strip_suffix("[]") {
        return format!("{}[]", map_type(inner.trim_end(), inner, dialect));
    }

    let mapped = match dialect {
        Dialect::PostgreSQL => map_postgres_type(base),
        Dialect::MySQL => map_mysql_type(base, full),
        _ => None,
    };
    mapped
        .or_else(|| map_generic_type(base))
        .unwrap_or(base)
        .to_string()
}

fn map_postgres_type(base: &str) -> Option<&'static str> {
    Some(match base {
        "int4" | "serial" | "serial4" => "int",
        "int8" | "bigserial" | "serial8" => "bigint",
        "int2" | "smallserial" | "serial2" => "smallint",
        "float4" => "float",
        "float8" => "double",
        "timestamptz" | "timestamp with time zone" | "timestamp without time zone" => "timestamp",
        "timetz" | "time with time zone" | "time without time zone" => "time",
        "interval" => "interval",
        "bytea" => "bytea",
        "uuid" => "uuid",
        "json" | "jsonb" => "json",
        _ => return None,
    })
}

fn map_mysql_type(base: &str, full: &str) -> Option<&'static str> {
    Some(match base {
        "tinyint" if full.contains("tinyint(1)") => "boolean",
        "tinyint" => "tinyint",
        "mediumint" => "mediumint",
        "datetime" => "timestamp",
        "year" => "year",
        "longtext" | "mediumtext" | "tinytext" => "text",
        "blob" | "longblob" | "mediumblob" | "tinyblob" => "blob",
        "binary" | "varbinary" => "binary",
        "enum" | "set" => "enum",
        _ => return None,
    })
}

fn map_generic_type(base: &str) -> Option<&'static str> {
    Some(match base {
        "int" | "integer" => "int",
        "bigint" => "bigint",
        "smallint" => "smallint",
        "real" | "float" => "float",
        "double" | "double precision" => "double",
        "decimal" | "numeric" => "decimal",
        "varchar" | "character varying" | "nvarchar" => "varchar",
        "char" | "character" | "nchar" => "char",
        "text" | "clob" => "text",
        "timestamp" | "datetime" => "timestamp",
        "date" => "date",
        "time" => "time",
        "boolean" | "bool" => "boolean",
        "blob" => "blob",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_types() {
        assert_eq!(parse_type("SERIAL", Dialect::PostgreSQL).name, "int");
        assert_eq!(parse_type("TIMESTAMPTZ", Dialect::PostgreSQL).name, "timestamp");
        assert_eq!(parse_type("JSONB", Dialect::PostgreSQL).name, "json");
        assert_eq!(
            parse_type("character varying(40)", Dialect::PostgreSQL),
            ColumnType {
                name: "varchar".to_string(),
                length: Some(40),
                precision: None,
            }
        );
        assert_eq!(parse_type("text[]", Dialect::PostgreSQL).name, "text[]");
        assert_eq!(parse_type("varchar(20)[]", Dialect::PostgreSQL).name, "varchar[]");
    }

    #[test]
    fn test_mysql_types() {
        assert_eq!(parse_type("INT", Dialect::MySQL).name, "int");
        assert_eq!(parse_type("TINYINT(1)", Dialect::MySQL).name, "boolean");
        assert_eq!(parse_type("TINYINT(1)", Dialect::MySQL).length, None);
        assert_eq!(parse_type("TINYINT(4)", Dialect::MySQL).name, "tinyint");
        assert_eq!(parse_type("DATETIME", Dialect::MySQL).name, "timestamp");
        assert_eq!(parse_type("INT UNSIGNED", Dialect::MySQL).name, "int");
    }

    #[test]
    fn test_sizes() {
        let varchar = parse_type("VARCHAR(255)", Dialect::Generic);
        assert_eq!(varchar.length, Some(255));
        assert_eq!(varchar.precision, None);

        let decimal = parse_type("DECIMAL(10, 2)", Dialect::Generic);
        assert_eq!(decimal.name, "decimal");
        assert_eq!(decimal.length, None);
        assert_eq!(decimal.precision, Some(10));
    }

    #[test]
    fn test_unknown_type_kept() {
        assert_eq!(parse_type("geometry", Dialect::PostgreSQL).name, "geometry");
        assert_eq!(parse_type("money", Dialect::Generic).name, "money");
    }
}
