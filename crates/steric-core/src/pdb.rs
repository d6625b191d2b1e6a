// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fixed-column reader for `ATOM`/`HETATM` records.
//!
//! Only lines whose first whitespace-delimited token is `ATOM` or `HETATM`
//! are read; every other line is skipped. Column ranges below are 0-based
//! and half-open.

use std::fs;
use std::path::{Path, PathBuf};

use steric_geom::{Coordinate, GeomError};
use thiserror::Error;

use crate::point::{AtomInfo, Point, PointSet};

const SERIAL: (usize, usize) = (6, 12);
const NAME: (usize, usize) = (12, 16);
const ALT_LOC: (usize, usize) = (16, 17);
const RES_NAME: (usize, usize) = (17, 21);
const CHAIN_ID: (usize, usize) = (21, 22);
const RES_SEQ: (usize, usize) = (22, 26);
const I_CODE: (usize, usize) = (26, 27);
const XYZ: [(usize, usize); 3] = [(30, 38), (38, 46), (46, 54)];

/// Shortest accepted record: everything up to the last coordinate column.
pub const MIN_RECORD_LEN: usize = 54;

/// Errors raised while loading atom records.
#[derive(Debug, Error)]
pub enum PdbError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An accepted record could not be decoded.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },
    /// Records disagree on dimension.
    #[error(transparent)]
    Geom(#[from] GeomError),
}

/// Returns `true` when `line` starts an atom record.
///
/// The record type is the first whitespace-delimited token; a line with
/// leading whitespace has an empty first token and is never a record.
pub fn is_atom_record(line: &str) -> bool {
    matches!(
        line.split(char::is_whitespace).next(),
        Some("ATOM" | "HETATM")
    )
}

/// Parses every atom record in `input`, preserving file order.
pub fn parse_str(input: &str) -> Result<PointSet, PdbError> {
    let mut points = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        if is_atom_record(line) {
            points.push(parse_record(line, idx + 1)?);
        }
    }
    Ok(PointSet::new(points)?)
}

/// Reads and parses the file at `path`.
pub fn read_file(path: &Path) -> Result<PointSet, PdbError> {
    let text = fs::read_to_string(path).map_err(|source| PdbError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&text)
}

/// Decodes one atom record. `line_no` is only used for error messages.
pub fn parse_record(line: &str, line_no: usize) -> Result<Point, PdbError> {
    let malformed = |reason: String| PdbError::Malformed {
        line: line_no,
        reason,
    };
    if line.len() < MIN_RECORD_LEN {
        return Err(malformed(format!(
            "record has {} columns, expected at least {MIN_RECORD_LEN}",
            line.len()
        )));
    }
    let field = |(start, end): (usize, usize), what: &str| {
        line.get(start..end)
            .map(str::trim)
            .ok_or_else(|| malformed(format!("{what}: columns {}-{end} are not text", start + 1)))
    };

    let serial = field(SERIAL, "serial")?;
    let serial: i64 = serial
        .parse()
        .map_err(|_| malformed(format!("serial: invalid integer {serial:?}")))?;
    let res_seq = field(RES_SEQ, "resSeq")?;
    let res_seq: i32 = res_seq
        .parse()
        .map_err(|_| malformed(format!("resSeq: invalid integer {res_seq:?}")))?;

    let info = AtomInfo {
        name: field(NAME, "name")?.to_owned(),
        alt_loc: field(ALT_LOC, "altLoc")?.to_owned(),
        res_name: field(RES_NAME, "resName")?.to_owned(),
        chain_id: field(CHAIN_ID, "chainID")?.to_owned(),
        res_seq,
        i_code: field(I_CODE, "iCode")?.to_owned(),
    };

    let mut xyz = Vec::with_capacity(XYZ.len());
    for (range, axis) in XYZ.into_iter().zip(["x", "y", "z"]) {
        xyz.push(field(range, axis)?);
    }
    let position =
        Coordinate::from_strs(&xyz).map_err(|e| malformed(format!("coordinates: {e}")))?;

    Ok(Point::new(serial, info, position))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const GLY_CA: &str =
        "ATOM      2  CA  GLY A   1      11.104   6.134  -6.504  1.00  0.00           C";

    #[test]
    fn decodes_every_fixed_column() {
        let p = parse_record(GLY_CA, 1).expect("valid record");
        assert_eq!(p.serial(), 2);
        assert_eq!(p.info().name, "CA");
        assert_eq!(p.info().alt_loc, "");
        assert_eq!(p.info().res_name, "GLY");
        assert_eq!(p.info().chain_id, "A");
        assert_eq!(p.info().res_seq, 1);
        assert_eq!(p.info().i_code, "");
        assert_eq!(
            p.position(),
            &Coordinate::from_strs(&["11.104", "6.134", "-6.504"]).unwrap()
        );
    }

    #[test]
    fn skips_non_atom_lines_and_keeps_order() {
        let input = format!(
            "HEADER    TEST\nREMARK ATOM inside a remark\n{GLY_CA}\n ATOM  indented\n\
             HETATM   99  O   HOH B 201       0.000   0.000   0.000\nEND\n"
        );
        let set = parse_str(&input).expect("parse");
        let serials: Vec<i64> = set.iter().map(Point::serial).collect();
        assert_eq!(serials, vec![2, 99]);
        assert_eq!(set.get(1).unwrap().info().res_name, "HOH");
    }

    #[test]
    fn short_record_names_its_line() {
        let err = parse_str("REMARK\nATOM      1  N   GLY A   1      11.104").unwrap_err();
        assert!(matches!(err, PdbError::Malformed { line: 2, .. }), "{err}");
    }

    #[test]
    fn bad_numbers_are_malformed() {
        let bad_serial = GLY_CA.replacen("     2", "    x2", 1);
        assert!(matches!(
            parse_record(&bad_serial, 5),
            Err(PdbError::Malformed { line: 5, .. })
        ));
        let bad_x = GLY_CA.replacen("11.104", "11.1a4", 1);
        assert!(matches!(
            parse_record(&bad_x, 6),
            Err(PdbError::Malformed { line: 6, .. })
        ));
    }

    #[test]
    fn empty_input_gives_empty_set() {
        assert!(parse_str("").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_file(&dir.path().join("absent.pdb")).unwrap_err();
        assert!(matches!(err, PdbError::Io { .. }));
    }
}
