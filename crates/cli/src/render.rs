//! Terminal and JSON output for parse results and diagnostics.
//!
//! Pretty mode sends diagnostics to stderr as ariadne reports pointing at
//! the offending line, leaving stdout for data. JSON mode writes a single
//! document to stdout.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use clap::ValueEnum;
use gedcom_toolchain_core::Table;
use gedcom_toolchain_diagnostics::{Diagnostic, Severity};

// ── Output format ───────────────────────────────────────────────────────

/// Output format selected with `--output`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pretty for a terminal and JSON for a pipe.
    pub(crate) fn resolve_or_detect(explicit: Option<Format>) -> Self {
        explicit.unwrap_or_else(|| {
            if io::stdout().is_terminal() {
                Format::Pretty
            } else {
                Format::Json
            }
        })
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

/// `key=value, key=value` from a diagnostic's context.
fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|c| !c.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics as ariadne reports on stderr.
///
/// Diagnostics with a span get a labelled source excerpt; the rest (e.g.
/// duplicate-id notes, empty input) are printed as one line plus notes.
pub(crate) fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    let config = Config::default().with_compact(false);
    let mut cache = (filename, Source::from(source));

    for diag in diagnostics {
        let note = context_note(diag);
        let Some(span) = diag.span else {
            eprintln!("{diag}");
            if let Some(note) = &note {
                eprintln!("  = note: {note}");
            }
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };

        // Clamp in case the source changed under us (stdin re-read, etc.).
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(report_kind(diag.severity), (filename, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.message)
            .with_config(config)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(note.clone().unwrap_or_else(|| diag.message.clone()))
                    .with_color(severity_color(diag.severity)),
            );
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

/// Print the table as tab-separated text: header row, then one row per
/// record. Missing cells are left empty.
pub(crate) fn print_table(table: &Table) {
    println!("{}", table.columns.join("\t"));
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| escape_cell(cell.as_deref().unwrap_or("")))
            .collect();
        println!("{}", cells.join("\t"));
    }
}

/// Keep one record per line: multi-line values (joined `CONT`) and tabs
/// are escaped.
fn escape_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
}

// ── Summary line ────────────────────────────────────────────────────────

/// Count diagnostics per severity: `(errors, warnings, infos)`.
pub(crate) fn tally(diagnostics: &[Diagnostic]) -> (usize, usize, usize) {
    diagnostics
        .iter()
        .fold((0, 0, 0), |(e, w, i), d| match d.severity {
            Severity::Error => (e + 1, w, i),
            Severity::Info => (e, w, i + 1),
            _ => (e, w + 1, i),
        })
}

/// Print a coloured summary line such as `1 error, 2 warnings, 1 info`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let (errors, warnings, infos) = tally(diagnostics);
    if errors + warnings + infos == 0 {
        return;
    }

    let plural = |n: usize| if n == 1 { "" } else { "s" };
    let mut parts = Vec::new();
    if errors > 0 {
        let text = format!("{errors} error{}", plural(errors));
        parts.push(format!("{}", text.fg(Color::Red)));
    }
    if warnings > 0 {
        let text = format!("{warnings} warning{}", plural(warnings));
        parts.push(format!("{}", text.fg(Color::Yellow)));
    }
    if infos > 0 {
        parts.push(format!("{}", format!("{infos} info").fg(Color::Blue)));
    }
    eprintln!("{}", parts.join(", "));
}
