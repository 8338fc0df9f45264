use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Cursor};
use std::path::Path;

use anyhow::{Context, Result};
use paste::paste;
use iicr_empirical::ExtractionMode;
use iicr_empirical::ObservationSet;
use iicr_empirical::read_observations;

// ============================================================
//  Base parser functions (one per extraction mode)
// ============================================================

/// First coalescence time of every tree in `ms -T` output.
pub fn read_first_coalescences<R: BufRead>(reader: R) -> Result<ObservationSet> {
    read_observations(reader, ExtractionMode::FirstCoalescence)
        .context("Failed to read coalescence times from trees")
}

/// Pairwise coalescence times from `time:` lines.
pub fn read_pairwise_times<R: BufRead>(reader: R) -> Result<ObservationSet> {
    read_observations(reader, ExtractionMode::PairwiseTime)
        .context("Failed to read pairwise coalescence times")
}

// ============================================================
//  Macro generating file/string/stdin/input helpers
// ============================================================

/// Generate input adapters for a base parser function `fn base<R: BufRead>(R) -> Result<T>`.
///
/// This expands into:
/// - `base_string(&str)`
/// - `base_file<P: AsRef<Path>>(P)`
/// - `base_stdin()`
/// - `base_input(&str)`  (dispatches "-" → stdin, otherwise → file)
macro_rules! define_input_variants {
    ($base:ident, $ret:ty) => {
        paste! {
            /// Read from a string buffer.
            pub fn [<$base _string>](s: &str) -> $ret {
                $base(Cursor::new(s))
            }

            /// Read from a file path.
            pub fn [<$base _file>]<P: AsRef<Path>>(path: P) -> $ret {
                let reader = BufReader::new(File::open(path)?);
                $base(reader)
            }

            /// Read from stdin.
            pub fn [<$base _stdin>]() -> $ret {
                let reader = BufReader::new(stdin());
                $base(reader)
            }

            /// Read either from stdin ("-") or a file path.
            pub fn [<$base _input>](s: &str) -> $ret {
                if s == "-" {
                    [<$base _stdin>]()
                } else {
                    [<$base _file>](s)
                }
            }
        }
    };
}

define_input_variants!(read_first_coalescences, Result<ObservationSet>);
define_input_variants!(read_pairwise_times, Result<ObservationSet>);

/// Read simulator output with the given mode from stdin ("-") or a file.
pub fn read_observations_input(s: &str, mode: ExtractionMode) -> Result<ObservationSet> {
    match mode {
        ExtractionMode::FirstCoalescence => read_first_coalescences_input(s),
        ExtractionMode::PairwiseTime => read_pairwise_times_input(s),
    }
}
