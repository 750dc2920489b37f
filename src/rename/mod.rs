//! Export renaming
//!
//! Extracted decoder functions come out of the bundle under their
//! obfuscated name (`a38A`, `_0x4c21`, ...). Once the function is
//! verified, the whole file is rewritten to use a readable name: the
//! first `export { name };` statement identifies the symbol, and every
//! whole-word occurrence of it is substituted. Word boundaries keep
//! `a38A` from rewriting the middle of `xa38Ab`.

use crate::{DeobError, DeobResult};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

static EXPORT_RE: Lazy<Regex> = Lazy::new(|| {
    // Matches: export { someName };
    Regex::new(r"export\s*\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\};").unwrap()
});

/// What a rename pass did to the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameOutcome {
    /// The exported identifier as found
    pub original: String,
    /// The caller-supplied replacement
    pub replacement: String,
    /// Whole-word occurrences rewritten (including the export itself)
    pub occurrences: usize,
}

/// Rename the first exported identifier throughout the text.
///
/// Returns the rewritten text alongside the outcome record. The
/// replacement string is inserted literally; `$` has no meaning.
pub fn rename_first_export(text: &str, new_name: &str) -> DeobResult<(String, RenameOutcome)> {
    let caps = EXPORT_RE.captures(text).ok_or(DeobError::ExportNotFound)?;
    let original = caps[1].to_string();

    let word_re = Regex::new(&format!(r"\b{}\b", regex::escape(&original)))?;
    let occurrences = word_re.find_iter(text).count();
    let rewritten = word_re.replace_all(text, NoExpand(new_name)).into_owned();

    Ok((
        rewritten,
        RenameOutcome {
            original,
            replacement: new_name.to_string(),
            occurrences,
        },
    ))
}

// ─── Tests ──────────────────────────────────────────────────────────
