pub use gedcom_toolchain_diagnostics::{Diagnostic, Severity, Span, codes};
