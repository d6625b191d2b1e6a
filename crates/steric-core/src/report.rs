// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plain-text clash report.
//!
//! One line per record, `serial resName resSeq  name` with `resSeq` right
//! aligned in four columns and the atom name left aligned in three, then a
//! trailing count line.

use core::fmt;
use std::io::{self, Write};

use crate::detect::MatchRecord;

struct ReportText<'r, 'a>(&'r [MatchRecord<'a>]);

impl fmt::Display for ReportText<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in self.0 {
            let point = record.point();
            let info = point.info();
            writeln!(
                f,
                "{} {} {:>4}  {:<3}",
                point.serial(),
                info.res_name,
                info.res_seq,
                info.name
            )?;
        }
        writeln!(f, "Number of clashing atoms: {}", self.0.len())
    }
}

/// Writes the report for `records` to `out`.
pub fn write_report<W: Write>(out: &mut W, records: &[MatchRecord<'_>]) -> io::Result<()> {
    write!(out, "{}", ReportText(records))
}

/// Renders the report into a string.
#[must_use]
pub fn render_report(records: &[MatchRecord<'_>]) -> String {
    ReportText(records).to_string()
}
