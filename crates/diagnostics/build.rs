//! Generates diagnostic lookup code from `data/diagnostics.jsonc`.
//!
//! Outputs (in `OUT_DIR`):
//! - `generated_codes.rs`: one `pub const NAME: &str = "GEDxxxx";` per entry
//! - `generated_explain.rs`: `match id { ... }` returning the long description
//! - `generated_severity.rs`: `match id { ... }` returning the default severity

use std::collections::HashSet;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use gedcom_toolchain_jsonc_strip::jsonc_to_json;

struct Entry {
    id: String,
    const_name: String,
    severity: &'static str,
    summary: String,
    description: String,
}

fn main() {
    let catalogue = Path::new("data/diagnostics.jsonc");
    println!("cargo:rerun-if-changed={}", catalogue.display());

    let raw = fs::read_to_string(catalogue)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", catalogue.display()));
    let doc: serde_json::Value = serde_json::from_str(&jsonc_to_json(&raw))
        .unwrap_or_else(|e| panic!("{} is not valid JSONC: {e}", catalogue.display()));

    let entries = read_entries(&doc);
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set by cargo");
    let out = Path::new(&out_dir);

    let header = "// Generated from data/diagnostics.jsonc by build.rs. Do not edit.\n\n";

    let mut codes = String::from(header);
    for e in &entries {
        let _ = writeln!(codes, "/// {}", e.summary);
        let _ = writeln!(codes, "pub const {}: &str = \"{}\";\n", e.const_name, e.id);
    }
    let _ = writeln!(codes, "/// Every known diagnostic id, in catalogue order.");
    let _ = writeln!(codes, "pub const ALL: &[&str] = &[");
    for e in &entries {
        let _ = writeln!(codes, "    {},", e.const_name);
    }
    let _ = writeln!(codes, "];");
    fs::write(out.join("generated_codes.rs"), codes).expect("write generated_codes.rs");

    let mut explain = String::from("match id {\n");
    for e in &entries {
        let _ = writeln!(
            explain,
            "    \"{}\" => Some(\"{}\"),",
            e.id,
            escape(&e.description)
        );
    }
    explain.push_str("    _ => None,\n}\n");
    fs::write(out.join("generated_explain.rs"), explain).expect("write generated_explain.rs");

    let mut severity = String::from("match id {\n");
    for e in &entries {
        let _ = writeln!(severity, "    \"{}\" => Some({}),", e.id, e.severity);
    }
    severity.push_str("    _ => None,\n}\n");
    fs::write(out.join("generated_severity.rs"), severity).expect("write generated_severity.rs");
}

fn read_entries(doc: &serde_json::Value) -> Vec<Entry> {
    let list = doc["diagnostics"]
        .as_array()
        .expect("diagnostics.jsonc: expected a `diagnostics` array");

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    let mut entries = Vec::with_capacity(list.len());

    for (i, item) in list.iter().enumerate() {
        let field = |key: &str| -> String {
            item[key]
                .as_str()
                .unwrap_or_else(|| panic!("diagnostics[{i}] missing string `{key}`"))
                .to_string()
        };
        let id = field("id");
        let const_name = field("constName");

        assert!(
            id.starts_with("GED") && id.len() == 7 && id[3..].bytes().all(|b| b.is_ascii_digit()),
            "diagnostics[{i}]: id '{id}' must look like GED0000"
        );
        assert!(
            !const_name.is_empty()
                && const_name.as_bytes()[0].is_ascii_uppercase()
                && const_name
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'),
            "diagnostics[{i}] ({id}): constName '{const_name}' is not SCREAMING_SNAKE_CASE"
        );
        assert!(seen_ids.insert(id.clone()), "duplicate diagnostic id '{id}'");
        assert!(
            seen_names.insert(const_name.clone()),
            "duplicate constName '{const_name}'"
        );

        let severity = match field("severity").as_str() {
            "error" => "Severity::Error",
            "warn" => "Severity::Warn",
            "info" => "Severity::Info",
            other => panic!("diagnostics[{i}] ({id}): invalid severity '{other}'"),
        };

        entries.push(Entry {
            summary: field("summary"),
            description: field("description"),
            id,
            const_name,
            severity,
        });
    }
    entries
}

fn escape(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}
