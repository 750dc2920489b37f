//! # deobkit — JavaScript deobfuscation workflow helpers
//!
//! Command-line helpers for a human-supervised deobfuscation workflow:
//! everything operates on raw text with regular expressions and marker
//! substrings. There is deliberately no JavaScript parser and no AST;
//! the inputs are machine-generated bundles whose shape is stable enough
//! that a pattern pass is both sufficient and auditable.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      deobkit (bin)                       │
//! │   offsets │ rename │ inject │ correct    (subcommands)   │
//! └──────┬────────┬────────┬────────┬────────────────────────┘
//!        │        │        │        │
//! ┌──────▼────────▼────────▼────────▼────────────────────────┐
//! │                   workflow (file I/O)                    │
//! └──────┬────────┬────────┬────────┬────────────────────────┘
//!        │        │        │        │
//!   ┌────▼───┐ ┌──▼────┐ ┌─▼────┐ ┌─▼──────────────┐
//!   │offsets │ │rename │ │inject│ │ correct        │
//!   │(pure)  │ │(pure) │ │(pure)│ │ TextCorrector  │
//!   └────────┘ └───────┘ └──────┘ └────────────────┘
//! ```
//!
//! ## Capabilities
//!
//! - **Boundary offsets**: find a base hex literal, count lines between
//!   `= [` and `return` (or elements of the largest quoted-string array),
//!   and derive `end = base + count`
//! - **Export renaming**: whole-word substitution of the first exported
//!   identifier
//! - **Scaffold injection**: append the hex-range replacer boilerplate with
//!   the decoder name substituted
//! - **Correction**: opaque text-to-text fix-up through an OpenAI-compatible
//!   chat API, behind the `TextCorrector` trait
//!
//! Each run is single-shot and synchronous. Repeated appends to the same
//! target accumulate; the workflow is human-supervised, one pass per file.

pub mod config;
pub mod correct;
pub mod inject;
pub mod offsets;
pub mod rename;
pub mod workflow;

// Re-exports for convenience
pub use config::{CorrectorConfig, DeobConfig};
pub use correct::{ApiCorrector, TextCorrector};
pub use offsets::{BaseHexMode, BoundaryOffsets, CountMode, HexLiteral, Region};
pub use rename::RenameOutcome;
pub use workflow::AppendedDecls;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeobError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No hex value found in the source file")]
    HexNotFound,

    #[error("Hex literal out of range: 0x{0}")]
    HexOverflow(String),

    #[error("`= [` not found in the file")]
    StartMarkerNotFound,

    #[error("`return` not found after `= [` in the file")]
    EndMarkerNotFound,

    #[error("No exports found in the file")]
    ExportNotFound,

    #[error("No JavaScript content found in the response")]
    FencedBlockNotFound,

    #[error("Correction API error: {0}")]
    CorrectionApi(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DeobResult<T> = Result<T, DeobError>;
