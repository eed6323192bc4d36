//! Reply parsers turning console text into typed values.
//!
//! Every format assumption about the game server's human-readable output
//! lives in this module, one function per [`Command`]. Each function is
//! pure and returns a [`ParseResult`], so a reply with an unexpected shape
//! costs exactly one field of one cycle.
//!
//! # Expected reply shapes
//!
//! ```text
//! /version         2.0.28
//! /time            110 hours, 28 minutes and 57 seconds
//! /players         Players (1):\n  jsmith
//! /players online  Online players (1):\n  jsmith (online)
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParseError, ParseResult};
use crate::types::{Command, RawReplySet};

/// Separator between the header line and each player entry.
const PLAYER_DELIMITER: &str = "\n  ";

/// Status suffix the server appends to connected players.
const ONLINE_SUFFIX: &str = " (online)";

static PLAYER_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("player count pattern is valid"));

/// Typed values for one scrape cycle.
///
/// Each field carries either its parsed value or the reason it could not
/// be parsed. A failed field never affects the others.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatus {
    pub version: ParseResult<String>,
    /// Save age in hours, rounded to two decimals.
    pub elapsed_hours: ParseResult<f64>,
    /// Every player that has ever joined, in reply order.
    pub registered_players: ParseResult<Vec<String>>,
    /// Connected players with their status suffix removed.
    pub online_players: ParseResult<Vec<String>>,
}

impl ParsedStatus {
    /// Commands whose reply could not be parsed, with the reason.
    pub fn failures(&self) -> Vec<(Command, &ParseError)> {
        let mut failed = Vec::new();
        if let Err(e) = &self.version {
            failed.push((Command::Version, e));
        }
        if let Err(e) = &self.elapsed_hours {
            failed.push((Command::Time, e));
        }
        if let Err(e) = &self.registered_players {
            failed.push((Command::Players, e));
        }
        if let Err(e) = &self.online_players {
            failed.push((Command::OnlinePlayers, e));
        }
        failed
    }

    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Parse every reply of a cycle independently.
pub fn parse_replies(replies: &RawReplySet) -> ParsedStatus {
    ParsedStatus {
        version: reply(replies, Command::Version).and_then(parse_version),
        elapsed_hours: reply(replies, Command::Time).and_then(parse_elapsed_hours),
        registered_players: reply(replies, Command::Players).and_then(parse_registered_players),
        online_players: reply(replies, Command::OnlinePlayers).and_then(parse_online_players),
    }
}

fn reply(replies: &RawReplySet, command: Command) -> ParseResult<&str> {
    replies
        .get(command)
        .ok_or_else(|| ParseError::MissingReply(command.to_string()))
}

/// `/version` replies are already the bare version string.
pub fn parse_version(raw: &str) -> ParseResult<String> {
    if raw.is_empty() {
        return Err(ParseError::EmptyReply);
    }
    Ok(raw.to_string())
}

/// Parse `"<H> hours, <M> minutes and <S> seconds"` into fractional hours.
///
/// Tokens are read at fixed positions (0, 2 and 5). Any other shape,
/// such as the shorter reply of a brand-new save, is an error.
pub fn parse_elapsed_hours(raw: &str) -> ParseResult<f64> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 6 {
        return Err(ParseError::UnexpectedShape(raw.to_string()));
    }

    let hours = parse_integer(tokens[0])?;
    let minutes = parse_integer(tokens[2])?;
    let seconds = parse_integer(tokens[5])?;

    let total = hours as f64 + minutes as f64 / 60.0 + seconds as f64 / 3600.0;
    Ok((total * 100.0).round() / 100.0)
}

/// Parse `"Players (<N>):\n  <name>..."` into player names.
pub fn parse_registered_players(raw: &str) -> ParseResult<Vec<String>> {
    Ok(player_entries(raw)?.map(str::to_string).collect())
}

/// Parse `"Online players (<N>):\n  <name> (online)..."` into player names.
///
/// Entries without the `" (online)"` suffix are skipped.
pub fn parse_online_players(raw: &str) -> ParseResult<Vec<String>> {
    Ok(player_entries(raw)?
        .filter_map(|entry| entry.strip_suffix(ONLINE_SUFFIX))
        .map(str::to_string)
        .collect())
}

/// Entries following the header line of a player listing.
///
/// The header count only decides between "no players" and "some players";
/// it is never used to truncate or pad the list. Trailing whitespace,
/// including a final line terminator, is trimmed from every entry.
fn player_entries(raw: &str) -> ParseResult<impl Iterator<Item = &str>> {
    let captures = PLAYER_COUNT
        .captures(raw)
        .ok_or_else(|| ParseError::MissingCount(raw.to_string()))?;
    let count = parse_integer(&captures[1])?;

    let skip_all = if count == 0 { usize::MAX } else { 1 };
    Ok(raw
        .split(PLAYER_DELIMITER)
        .skip(skip_all)
        .map(str::trim_end)
        .filter(|entry| !entry.is_empty()))
}

fn parse_integer(token: &str) -> ParseResult<u64> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_replies() -> RawReplySet {
        let mut replies = RawReplySet::new();
        replies.insert(Command::Version, "2.0.28");
        replies.insert(Command::Time, "110 hours, 28 minutes and 57 seconds");
        replies.insert(Command::Players, "Players (1):\n  jsmith");
        replies.insert(Command::OnlinePlayers, "Online players (1):\n  jsmith (online)");
        replies
    }

    #[test]
    fn version_passes_through() {
        assert_eq!(parse_version("2.0.28").unwrap(), "2.0.28");
        assert_eq!(parse_version("not-a-semver").unwrap(), "not-a-semver");
    }

    #[test]
    fn empty_version_rejected() {
        assert_eq!(parse_version(""), Err(ParseError::EmptyReply));
    }

    #[test]
    fn elapsed_time_to_hours() {
        let hours = parse_elapsed_hours("110 hours, 28 minutes and 57 seconds").unwrap();
        assert_eq!(hours, 110.48);
    }

    #[test]
    fn elapsed_time_rounds_to_two_decimals() {
        assert_eq!(parse_elapsed_hours("0 hours, 30 minutes and 0 seconds").unwrap(), 0.5);
        assert_eq!(parse_elapsed_hours("1 hours, 0 minutes and 36 seconds").unwrap(), 1.01);
        assert_eq!(parse_elapsed_hours("2 hours, 59 minutes and 59 seconds").unwrap(), 3.0);
    }

    #[test]
    fn elapsed_time_singular_units() {
        assert_eq!(parse_elapsed_hours("1 hour, 1 minute and 1 second").unwrap(), 1.02);
    }

    #[test]
    fn elapsed_time_missing_segment() {
        let err = parse_elapsed_hours("28 minutes and 57 seconds").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedShape(_)));
    }

    #[test]
    fn elapsed_time_fresh_save() {
        assert!(parse_elapsed_hours("0 seconds").is_err());
        assert!(parse_elapsed_hours("").is_err());
    }

    #[test]
    fn elapsed_time_non_numeric_token() {
        let err = parse_elapsed_hours("many hours, 28 minutes and 57 seconds").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                token: "many".to_string()
            }
        );
    }

    #[test]
    fn elapsed_time_negative_rejected() {
        assert!(parse_elapsed_hours("-1 hours, 0 minutes and 0 seconds").is_err());
    }

    #[test]
    fn no_registered_players() {
        assert!(parse_registered_players("Players (0):").unwrap().is_empty());
    }

    #[test]
    fn single_registered_player() {
        assert_eq!(
            parse_registered_players("Players (1):\n  jsmith").unwrap(),
            vec!["jsmith"]
        );
    }

    #[test]
    fn registered_players_keep_reply_order() {
        let names = parse_registered_players("Players (3):\n  zed\n  amy\n  jsmith (online)").unwrap();
        assert_eq!(names, vec!["zed", "amy", "jsmith (online)"]);
    }

    #[test]
    fn header_count_does_not_truncate() {
        let names = parse_registered_players("Players (1):\n  a\n  b").unwrap();
        assert_eq!(names, vec!["a", "b"]);

        let names = parse_registered_players("Players (5):\n  a").unwrap();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn zero_count_ignores_trailing_entries() {
        assert!(parse_registered_players("Players (0):\n  ghost").unwrap().is_empty());
    }

    #[test]
    fn missing_player_count() {
        let err = parse_registered_players("Players:").unwrap_err();
        assert!(matches!(err, ParseError::MissingCount(_)));
    }

    #[test]
    fn no_online_players() {
        assert!(parse_online_players("Online players (0):").unwrap().is_empty());
    }

    #[test]
    fn online_suffix_stripped() {
        assert_eq!(
            parse_online_players("Online players (1):\n  jsmith (online)").unwrap(),
            vec!["jsmith"]
        );
    }

    #[test]
    fn trailing_line_terminator_trimmed() {
        assert_eq!(
            parse_registered_players("Players (1):\n  jsmith\n").unwrap(),
            vec!["jsmith"]
        );
        assert_eq!(
            parse_online_players("Online players (1):\n  jsmith (online)\n").unwrap(),
            vec!["jsmith"]
        );
        assert_eq!(
            parse_online_players("Online players (2):\r\n  amy (online)\r\n  jsmith (online)\r\n")
                .unwrap(),
            vec!["amy", "jsmith"]
        );
    }

    #[test]
    fn online_entries_without_suffix_dropped() {
        let names =
            parse_online_players("Online players (3):\n  amy (online)\n  bob (afk)\n  cat").unwrap();
        assert_eq!(names, vec!["amy"]);
    }

    #[test]
    fn parse_canonical_replies() {
        let status = parse_replies(&canonical_replies());
        assert_eq!(status.version, Ok("2.0.28".to_string()));
        assert_eq!(status.elapsed_hours, Ok(110.48));
        assert_eq!(status.registered_players, Ok(vec!["jsmith".to_string()]));
        assert_eq!(status.online_players, Ok(vec!["jsmith".to_string()]));
        assert!(status.is_complete());
    }

    #[test]
    fn parsing_is_idempotent() {
        let replies = canonical_replies();
        assert_eq!(parse_replies(&replies), parse_replies(&replies));
    }

    #[test]
    fn malformed_time_fails_only_that_field() {
        let mut replies = canonical_replies();
        replies.insert(Command::Time, "57 seconds");

        let status = parse_replies(&replies);
        assert!(status.elapsed_hours.is_err());
        assert!(status.version.is_ok());
        assert!(status.registered_players.is_ok());
        assert!(status.online_players.is_ok());

        let failed: Vec<Command> = status.failures().into_iter().map(|(c, _)| c).collect();
        assert_eq!(failed, vec![Command::Time]);
    }

    #[test]
    fn missing_reply_is_a_field_failure() {
        let mut replies = RawReplySet::new();
        replies.insert(Command::Version, "2.0.28");

        let status = parse_replies(&replies);
        assert!(status.version.is_ok());
        assert_eq!(
            status.online_players,
            Err(ParseError::MissingReply("/players online".to_string()))
        );
        assert_eq!(status.failures().len(), 3);
    }
}
