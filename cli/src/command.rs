/*
 * This file is part of nsd.
 *
 * nsd is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Parses one line of a batch command file into a [`Command`]. Each line
//! names one namespace operation:
//!
//! ```text
//! c <path> f|d     create a file or directory
//! d <path>         delete
//! l <path>         look up
//! m <src> <dst>    move/rename
//! p                print the tree as it stands at this point in the batch
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use {crate::error::CliError, nsd::NodeKind};

#[derive(Debug, Clone)]
pub enum Command {
    Create { path: String, kind: NodeKind },
    Delete { path: String },
    Lookup { path: String },
    Move { src: String, dst: String },
    Print,
}

impl Command {
    pub fn parse_line(line: &str) -> Result<Option<Self>, CliError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let args = libsky::split_into_args(line);
        let cmd = match args.as_slice() {
            [op, path, kind] if op == "c" => Command::Create {
                path: path.clone(),
                kind: match kind.as_str() {
                    "f" => NodeKind::File,
                    "d" => NodeKind::Directory,
                    other => return Err(CliError::BadCommand(format!("unknown node kind `{other}`"))),
                },
            },
            [op, path] if op == "d" => Command::Delete { path: path.clone() },
            [op, path] if op == "l" => Command::Lookup { path: path.clone() },
            [op, src, dst] if op == "m" => Command::Move {
                src: src.clone(),
                dst: dst.clone(),
            },
            [op] if op == "p" => Command::Print,
            _ => return Err(CliError::BadCommand(format!("malformed command: `{line}`"))),
        };
        Ok(Some(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command_form() {
        assert!(matches!(
            Command::parse_line("c /a f").unwrap(),
            Some(Command::Create { kind: NodeKind::File, .. })
        ));
        assert!(matches!(Command::parse_line("d /a").unwrap(), Some(Command::Delete { .. })));
        assert!(matches!(Command::parse_line("l /a").unwrap(), Some(Command::Lookup { .. })));
        assert!(matches!(Command::parse_line("m /a /b").unwrap(), Some(Command::Move { .. })));
        assert!(matches!(Command::parse_line("p").unwrap(), Some(Command::Print)));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert!(Command::parse_line("").unwrap().is_none());
        assert!(Command::parse_line("   ").unwrap().is_none());
        assert!(Command::parse_line("# a comment").unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(Command::parse_line("x /a").is_err());
        assert!(Command::parse_line("c /a").is_err());
        assert!(Command::parse_line("c /a q").is_err());
    }
}
