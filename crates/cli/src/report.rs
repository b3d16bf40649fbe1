//! Human-readable diagnostic summary.
//!
//! Written to any `Write` sink; the binary passes stderr so stdout stays free
//! for machine-readable output.

use crate::{Resolution, RunSummary};
use reaper::MissReason;
use std::io::{self, Write};

/// Writes the full run report.
pub fn write_report<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(out, "Declarations parsed: {}", summary.declarations)?;
    writeln!(out, "Definitions parsed: {}", summary.definitions)?;
    if !summary.scan_failures.is_empty() {
        writeln!(out, "Unreadable entries skipped: {}", summary.scan_failures.len())?;
    }

    for r in &summary.redeclarations {
        writeln!(
            out,
            "  WARNING: {} redeclared with {} args at {}:{} (keeping {} args)",
            r.name,
            r.ignored_arity,
            r.file_path.display(),
            r.line_number,
            r.kept_arity
        )?;
    }

    if summary.mismatches.is_empty() {
        writeln!(out, "No signature mismatches found!")?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Found {} signature mismatches:", summary.mismatches.len())?;
    for m in &summary.mismatches {
        writeln!(
            out,
            "  {}: declared={} args, defined={} args",
            m.name, m.canonical_arity, m.observed_arity
        )?;
        writeln!(out, "    file: {}:{}", m.file_path.display(), m.line_number)?;
        writeln!(out, "    decl:   {}", m.canonical)?;
        writeln!(out, "    impl:   {}", m.observed_line)?;
        match &m.resolution {
            Resolution::Fixed { new_line } => writeln!(out, "    fixed:  {}", new_line)?,
            Resolution::Unresolved { reason } => {
                writeln!(out, "    WARNING: could not auto-patch: {}", reason)?
            }
            Resolution::NoChange => {
                writeln!(out, "    WARNING: could not auto-patch: corrected line is unchanged")?
            }
        }
    }

    for miss in &summary.apply.missed {
        match &miss.reason {
            MissReason::LineNotFound => writeln!(
                out,
                "  WARNING: could not find line to patch for {} in {}",
                miss.name,
                miss.file_path.display()
            )?,
            MissReason::Io(e) => writeln!(
                out,
                "  WARNING: could not patch {} in {}: {}",
                miss.name,
                miss.file_path.display(),
                e
            )?,
        }
    }

    writeln!(out)?;
    let verb = if summary.dry_run { "Would patch" } else { "Patched" };
    writeln!(
        out,
        "{} {}/{} functions in {} files",
        verb,
        summary.apply.patched,
        summary.mismatches.len(),
        summary.apply.files_touched
    )?;
    let unresolved = summary.unresolved().count() + summary.apply.missed.len();
    if unresolved > 0 {
        writeln!(out, "Unresolved: {}", unresolved)?;
    }
    Ok(())
}
