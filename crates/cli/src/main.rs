mod logging;
mod render;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gedcom_toolchain_core::{
    DuplicateIdPolicy, MalformedLinePolicy, ParseOptions, ParseResult, load_options_from_str,
    parse, to_pretty_json, to_table,
};
use gedcom_toolchain_diagnostics::{self as diag, Diagnostic, Severity};
use log::{debug, info};
use serde::Serialize;

use crate::render::{Format, print_summary, print_table, render_diagnostics, tally};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "ged",
    version,
    about = "GEDCOM toolchain: parse, check and tabulate genealogy record files"
)]
struct Cli {
    /// Output mode. Defaults to "pretty" when stdout is a TTY, "json"
    /// otherwise.
    #[arg(long, global = true, value_enum)]
    output: Option<Format>,

    /// Log filter, e.g. "info" or "gedcom_toolchain_core=debug". Falls back
    /// to the GED_LOG environment variable, then "warn".
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse a file and print its records and diagnostics.
    Parse(ParseArgs),

    /// Check a file; exit 1 on errors (or warnings with --strict).
    Check {
        #[command(flatten)]
        args: ParseArgs,
        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,
    },

    /// Print records as a table: one row per record, one column per tag path.
    Table(ParseArgs),

    /// Explain a diagnostic ID (e.g. GED1002).
    Explain { id: String },
}

/// Input and parse options shared by `parse`, `check` and `table`.
#[derive(Args, Debug)]
struct ParseArgs {
    /// Input file, or `-` for stdin.
    file: String,

    /// JSONC file with parse options. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deepest level accepted.
    #[arg(long)]
    max_depth: Option<u32>,

    /// What to do with lines that cannot be placed.
    #[arg(long, value_enum)]
    on_malformed: Option<OnMalformed>,

    /// What to do when a record id repeats.
    #[arg(long, value_enum)]
    duplicate_ids: Option<DuplicateIds>,

    /// String inserted between tags in a tag path.
    #[arg(long)]
    separator: Option<String>,

    /// Fold CONT/CONC lines into their parent's value
    /// (`--join-continuations=false` turns a config setting off).
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    join_continuations: Option<bool>,

    /// Fail when the file contains no records
    /// (`--require-records=false` turns a config setting off).
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    require_records: Option<bool>,

    /// Keep only records of this type (repeatable).
    #[arg(long = "kind", value_name = "KIND")]
    kinds: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnMalformed {
    /// Drop the line silently.
    Skip,
    /// Drop the line and report a warning.
    Warn,
    /// Stop at the first such line.
    Abort,
}

impl From<OnMalformed> for MalformedLinePolicy {
    fn from(p: OnMalformed) -> Self {
        match p {
            OnMalformed::Skip => MalformedLinePolicy::Skip,
            OnMalformed::Warn => MalformedLinePolicy::CollectWarning,
            OnMalformed::Abort => MalformedLinePolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DuplicateIds {
    /// The later record replaces the earlier one.
    Overwrite,
    /// The later record is discarded.
    KeepFirst,
    /// The later record is kept as ID-2, ID-3, ...
    AppendSuffix,
}

impl From<DuplicateIds> for DuplicateIdPolicy {
    fn from(p: DuplicateIds) -> Self {
        match p {
            DuplicateIds::Overwrite => DuplicateIdPolicy::Overwrite,
            DuplicateIds::KeepFirst => DuplicateIdPolicy::KeepFirst,
            DuplicateIds::AppendSuffix => DuplicateIdPolicy::AppendSuffix,
        }
    }
}

impl ParseArgs {
    /// Options from `--config` (or defaults) with flag overrides applied.
    fn options(&self) -> Result<ParseOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config `{}`", path.display()))?;
                load_options_from_str(&text)
                    .with_context(|| format!("failed to load config `{}`", path.display()))?
            }
            None => ParseOptions::default(),
        };

        if let Some(depth) = self.max_depth {
            options.max_depth = Some(depth);
        }
        if let Some(policy) = self.on_malformed {
            options.on_malformed_line = policy.into();
        }
        if let Some(policy) = self.duplicate_ids {
            options.duplicate_id_policy = policy.into();
        }
        if let Some(sep) = &self.separator {
            options.path_separator = sep.clone();
        }
        if let Some(join) = self.join_continuations {
            options.join_continuations = join;
        }
        if let Some(require) = self.require_records {
            options.require_records = require;
        }
        if !self.kinds.is_empty() {
            options.record_kinds = Some(self.kinds.clone());
        }

        options.validate().context("invalid parse options")?;
        debug!("effective options: {options:?}");
        Ok(options)
    }

    /// Display name for diagnostics.
    fn name(&self) -> &str {
        if self.file == "-" {
            "<stdin>"
        } else {
            self.file.as_str()
        }
    }

    fn read_input(&self) -> Result<String> {
        if self.file == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            return Ok(buf);
        }
        fs::read_to_string(&self.file).with_context(|| format!("failed to read `{}`", self.file))
    }

    /// Read and parse the input. An aborted parse becomes a single
    /// error-severity diagnostic and no records.
    fn run(&self) -> Result<(String, ParseResult)> {
        let options = self.options()?;
        let input = self.read_input()?;
        info!("parsing {} ({} bytes)", self.name(), input.len());
        let result = match parse(&input, &options) {
            Ok(result) => result,
            Err(err) => {
                debug!("parse stopped: {err}");
                let mut d = err.to_diagnostic();
                d.severity = Severity::Error;
                ParseResult {
                    records: Vec::new(),
                    diagnostics: vec![d],
                }
            }
        };
        Ok((input, result))
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output);

    let _logger = match logging::init(cli.log_level.as_deref()) {
        Ok(handle) => handle,
        Err(err) => fail(&err, format),
    };

    if let Err(err) = run(cli.cmd, format) {
        fail(&err, format);
    }
}

fn run(cmd: Cmd, format: Format) -> Result<()> {
    match cmd {
        Cmd::Parse(args) => cmd_parse(&args, format),
        Cmd::Check { args, strict } => cmd_check(&args, strict, format),
        Cmd::Table(args) => cmd_table(&args, format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

/// Report a command failure and exit 1. In JSON mode this is an envelope
/// on stdout so callers always get parseable output.
fn fail(err: &anyhow::Error, format: Format) -> ! {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "success": false,
                "error": "command_failed",
                "message": format!("{err:#}"),
            });
            println!("{out}");
        }
        Format::Pretty => eprintln!("error: {err:#}"),
    }
    process::exit(1);
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(args: &ParseArgs, format: Format) -> Result<()> {
    let (input, res) = args.run()?;

    match format {
        Format::Json => println!("{}", to_pretty_json(&res)),
        Format::Pretty => {
            // Records to stdout, diagnostics to stderr.
            println!("{}", serde_json::to_string_pretty(&res.records)?);
            render_diagnostics(&input, args.name(), &res.diagnostics);
            print_summary(&res.diagnostics);
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

#[derive(Serialize)]
struct CheckReport<'a> {
    ok: bool,
    records: usize,
    diagnostics: &'a [Diagnostic],
}

fn cmd_check(args: &ParseArgs, strict: bool, format: Format) -> Result<()> {
    let (input, res) = args.run()?;
    let (errors, warnings, _) = tally(&res.diagnostics);
    let ok = errors == 0 && !(strict && warnings > 0);

    match format {
        Format::Json => {
            let report = CheckReport {
                ok,
                records: res.records.len(),
                diagnostics: &res.diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Pretty => {
            render_diagnostics(&input, args.name(), &res.diagnostics);
            print_summary(&res.diagnostics);
            if ok {
                eprintln!("check ok: {} records", res.records.len());
            }
        }
    }

    if !ok {
        process::exit(1);
    }
    Ok(())
}

fn cmd_table(args: &ParseArgs, format: Format) -> Result<()> {
    let (input, res) = args.run()?;
    let table = to_table(&res.records);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "columns": table.columns,
                "rows": table.rows,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            print_table(&table);
            render_diagnostics(&input, args.name(), &res.diagnostics);
            print_summary(&res.diagnostics);
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "severity": diag::default_severity(id),
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            use ariadne::Fmt;
            match diag::explain(id) {
                Some(text) => println!("{}: {}", id.fg(ariadne::Color::Cyan), text),
                None => println!("{id}: (no explanation available)"),
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
