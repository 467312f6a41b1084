// SPDX-License-Identifier: GPL-3.0-only

//! Parsing of `btrfs subvolume list -uq <root>`.
//!
//! Every non-blank line must have the shape
//!
//! ```text
//! ID <n> gen <n> top level <n> parent_uuid <uuid|-> uuid <uuid> path <path>
//! ```
//!
//! and any line that does not is a hard failure for the whole listing.
//! Records keep the order the tool printed them in, which is not guaranteed
//! to put an origin before its snapshots.

use std::str::SplitWhitespace;

use pool_sys::{CommandInvocation, CommandRunner};
use tracing::debug;

use crate::error::{BtrfsError, Result};

/// Marker printed in the parent_uuid column of subvolumes that are not snapshots.
pub const NO_PARENT: &str = "-";

/// One line of listing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    /// UUID of the subvolume this one was snapshotted from
    pub parent_uuid: Option<String>,
    pub uuid: String,
    /// Path relative to the pool root
    pub path: String,
}

/// The listing command for a pool root.
pub fn list_invocation(binary: &str, root: &str) -> CommandInvocation {
    CommandInvocation::new(binary)
        .args(["subvolume", "list", "-uq"])
        .arg(root)
}

/// Run the listing command against `root` and parse its output.
pub fn list_subvolumes<R: CommandRunner>(
    runner: &R,
    binary: &str,
    root: &str,
) -> Result<Vec<ListingRecord>> {
    let output = runner.run(&list_invocation(binary, root))?;
    let records = parse_listing(decode_listing(&output.stdout)?)?;
    debug!("Parsed {} subvolumes below {}", records.len(), root);
    Ok(records)
}

/// Decode raw listing output. Subvolume paths that are not valid UTF-8
/// fail the listing rather than being replaced.
pub fn decode_listing(stdout: &[u8]) -> Result<&str> {
    std::str::from_utf8(stdout).map_err(|error| {
        let offset = error.valid_up_to();
        let start = stdout[..offset]
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(0, |newline| newline + 1);
        let end = stdout[offset..]
            .iter()
            .position(|&byte| byte == b'\n')
            .map_or(stdout.len(), |newline| offset + newline);

        BtrfsError::Parse {
            line: String::from_utf8_lossy(&stdout[start..end]).into_owned(),
            reason: format!("invalid UTF-8 at byte {offset}"),
        }
    })
}

/// Parse complete listing output.
pub fn parse_listing(output: &str) -> Result<Vec<ListingRecord>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<ListingRecord> {
    let mut fields = Fields {
        line,
        tokens: line.split_whitespace(),
    };

    fields.keyword("ID")?;
    fields.number("ID")?;
    fields.keyword("gen")?;
    fields.number("gen")?;
    fields.keyword("top")?;
    fields.keyword("level")?;
    fields.number("top level")?;
    fields.keyword("parent_uuid")?;
    let parent_uuid = fields.value("parent_uuid")?;
    fields.keyword("uuid")?;
    let uuid = fields.value("uuid")?;
    fields.keyword("path")?;
    let path = fields.value("path")?;
    fields.finish()?;

    Ok(ListingRecord {
        parent_uuid: (parent_uuid != NO_PARENT).then(|| parent_uuid.to_string()),
        uuid: uuid.to_string(),
        path: path.to_string(),
    })
}

struct Fields<'a> {
    line: &'a str,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn error(&self, reason: String) -> BtrfsError {
        BtrfsError::Parse {
            line: self.line.to_string(),
            reason,
        }
    }

    fn keyword(&mut self, keyword: &str) -> Result<()> {
        match self.tokens.next() {
            Some(token) if token == keyword => Ok(()),
            Some(token) => Err(self.error(format!("expected '{keyword}', found '{token}'"))),
            None => Err(self.error(format!("expected '{keyword}'"))),
        }
    }

    fn number(&mut self, field: &str) -> Result<()> {
        let token = self.value(field)?;
        if token.bytes().all(|byte| byte.is_ascii_digit()) {
            Ok(())
        } else {
            Err(self.error(format!("{field} is not a number: '{token}'")))
        }
    }

    fn value(&mut self, field: &str) -> Result<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| self.error(format!("missing {field}")))
    }

    fn finish(&mut self) -> Result<()> {
        match self.tokens.next() {
            Some(token) => Err(self.error(format!("unexpected trailing field '{token}'"))),
            None => Ok(()),
        }
    }
}
