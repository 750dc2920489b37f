//! File orchestration
//!
//! The calculation modules are pure text passes; every file touch lives
//! here. Each operation reads its input once, runs the pass, and writes
//! the result: append for the accumulating operations (offsets, inject),
//! in-place rewrite for rename, a separate output path for correct.
//!
//! Appending is idempotent-unsafe: running `offsets` twice on the same
//! target stacks a second pair of declarations. The workflow is
//! human-supervised and single-shot per file; accumulation is accepted
//! behavior, not a defect.

use crate::config::DeobConfig;
use crate::correct::TextCorrector;
use crate::inject;
use crate::offsets::{self, HexLiteral};
use crate::rename::{self, RenameOutcome};
use crate::{DeobError, DeobResult};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// What an offsets run appended to the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendedDecls {
    /// The statement lines appended, in order
    pub statements: Vec<String>,
    /// The base value, always present
    pub base: HexLiteral,
    /// The derived value; absent when the count could not be measured
    pub derived: Option<HexLiteral>,
}

/// Render one boundary declaration statement.
fn declaration(name: &str, value: HexLiteral) -> String {
    format!("const {} = {};", name, value)
}

fn read_source(path: &Path) -> DeobResult<String> {
    if !path.exists() {
        return Err(DeobError::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

fn append_statement(path: &Path, statement: &str) -> DeobResult<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    write!(file, "\n{}\n", statement)?;
    Ok(())
}

/// Compute the boundary offsets for `target` and append them to it as
/// `const <name> = <hex>;` declarations.
///
/// A missing base hex is fatal and nothing is written. A failed count
/// only costs the derived half: the base declaration still lands, with
/// a warning. The two measurements are independent.
pub fn append_offset_decls(target: &Path, config: &DeobConfig) -> DeobResult<AppendedDecls> {
    let text = read_source(target)?;

    let base = offsets::find_base_hex(&text, config.base_mode)?;
    let mut statements = vec![declaration(&config.start_name, base)];

    let derived = match offsets::compute_count(&text, config.count_mode) {
        Ok(count) => {
            let derived = base.offset_by(count);
            statements.push(declaration(&config.end_name, derived));
            Some(derived)
        }
        Err(e) => {
            tracing::warn!("No hex value found for {}: {}", config.end_name, e);
            None
        }
    };

    for statement in &statements {
        append_statement(target, statement)?;
        tracing::info!("Appended statement to {}: {}", target.display(), statement);
    }

    Ok(AppendedDecls {
        statements,
        base,
        derived,
    })
}

/// Rename the first exported identifier in `path`, rewriting it in place.
pub fn rename_export_in_file(path: &Path, new_name: &str) -> DeobResult<RenameOutcome> {
    let text = read_source(path)?;
    let (rewritten, outcome) = rename::rename_first_export(&text, new_name)?;
    fs::write(path, rewritten)?;

    tracing::info!(
        "Renamed {} occurrence(s) of '{}' to '{}' in {}",
        outcome.occurrences,
        outcome.original,
        outcome.replacement,
        path.display()
    );
    Ok(outcome)
}

/// Append the replacer scaffold to `target` with the decoder name filled in.
pub fn append_boilerplate(target: &Path, decoder: &str) -> DeobResult<()> {
    if !target.exists() {
        return Err(DeobError::FileNotFound(target.to_path_buf()));
    }

    let mut file = OpenOptions::new().append(true).open(target)?;
    write!(file, "\n{}", inject::replacer_boilerplate(decoder))?;

    tracing::info!("Appended replacer scaffold to {}", target.display());
    Ok(())
}

/// Run `input` through the corrector and write the result to `output`.
pub fn correct_file(
    input: &Path,
    output: &Path,
    corrector: &dyn TextCorrector,
) -> DeobResult<()> {
    let text = read_source(input)?;
    let corrected = corrector.correct(&text)?;
    fs::write(output, corrected)?;

    tracing::info!("Corrected content written to {}", output.display());
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────
