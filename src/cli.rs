//! `deck-erd` command line front-end.

use crate::config::load_config;
use crate::layout::LayoutEngine;
use crate::provider::{FileProvider, SchemaSource, SourceFormat};
use crate::session::DiagramSession;
use crate::sql::Dialect;
use crate::svg::SvgRenderer;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use futures::executor::block_on;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs;
use std::path::{Path, PathBuf};

const CONNECTION: &str = "cli";

#[derive(Parser, Debug)]
#[command(name = "deck-erd", version, about = "Lay out a database schema as an ER diagram")]
pub struct Args {
    /// Schema file: SQL dump or JSON table descriptors
    pub input: PathBuf,

    /// Input format
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    pub format: InputFormat,

    /// SQL dialect (auto, generic, postgres, mysql)
    #[arg(short = 'd', long = "dialect", default_value = "auto")]
    pub dialect: Dialect,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// What to emit
    #[arg(short = 'e', long = "emit", value_enum, default_value = "json")]
    pub emit: Emit,

    /// Layout config JSON file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log layout decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Auto,
    Sql,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Json,
    Svg,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref()).context("failed to load layout config")?;
    let renderer = SvgRenderer::new(config.metrics.clone());

    let provider = FileProvider::new().with_source(CONNECTION, schema_source(&args));
    let session = DiagramSession::new(provider, LayoutEngine::new(config));
    let layout = block_on(session.load(CONNECTION))
        .with_context(|| format!("failed to load schema from {}", args.input.display()))?;

    let output = match args.emit {
        Emit::Json => layout.to_json()?,
        Emit::Svg => renderer.render(&layout),
    };
    write_output(&output, args.output.as_deref())
}

fn schema_source(args: &Args) -> SchemaSource {
    let format = match args.format {
        InputFormat::Sql => SourceFormat::Sql(args.dialect),
        InputFormat::Json => SourceFormat::Json,
        InputFormat::Auto => match SchemaSource::detect(&args.input).format {
            SourceFormat::Sql(_) => SourceFormat::Sql(args.dialect),
            SourceFormat::Json => SourceFormat::Json,
        },
    };
    SchemaSource::new(&args.input, format)
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", output);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("deck-erd").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["schema.sql"]);
        assert_eq!(args.format, InputFormat::Auto);
        assert_eq!(args.dialect, Dialect::Auto);
        assert_eq!(args.emit, Emit::Json);
        assert!(!args.verbose);
    }

    #[test]
    fn test_source_follows_flags() {
        let args = parse(&["dump.txt", "-f", "sql", "-d", "mysql"]);
        assert_eq!(schema_source(&args).format, SourceFormat::Sql(Dialect::MySQL));

        let args = parse(&["schema.json", "-d", "postgres"]);
        assert_eq!(schema_source(&args).format, SourceFormat::Json);

        let args = parse(&["schema.sql", "-d", "postgres", "-e", "svg"]);
        assert_eq!(schema_source(&args).format, SourceFormat::Sql(Dialect::PostgreSQL));
        assert_eq!(args.emit, Emit::Svg);
    }

    #[test]
    fn test_rejects_unknown_dialect() {
        let result = Args::try_parse_from(["deck-erd", "schema.sql", "-d", "oracle"]);
        assert!(result.is_err());
    }
}
