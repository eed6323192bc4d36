//! Console commands and the per-cycle raw reply set.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

/// One of the console queries issued every scrape cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Command {
    /// `/version`: game build version.
    #[serde(rename = "/version")]
    Version,
    /// `/time`: how long the save has been running.
    #[serde(rename = "/time")]
    Time,
    /// `/players`: every player that has ever joined.
    #[serde(rename = "/players")]
    Players,
    /// `/players online`: players connected right now.
    #[serde(rename = "/players online")]
    OnlinePlayers,
}

impl Command {
    /// All commands, in the order they are issued.
    pub const ALL: [Command; 4] = [
        Command::Version,
        Command::Time,
        Command::Players,
        Command::OnlinePlayers,
    ];

    /// The command text sent over the console. Also used as the request label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Version => "/version",
            Command::Time => "/time",
            Command::Players => "/players",
            Command::OnlinePlayers => "/players online",
        }
    }

    /// Look a command up by its console text.
    pub fn from_label(label: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// The label → command-text batch for one cycle.
    pub fn batch() -> BTreeMap<String, String> {
        Command::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), c.as_str().to_string()))
            .collect()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped replies for one scrape cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReplySet {
    replies: HashMap<Command, String>,
}

impl RawReplySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reply set from a label → reply map, ignoring unknown labels.
    pub fn from_labeled(replies: HashMap<String, String>) -> Self {
        let replies = replies
            .into_iter()
            .filter_map(|(label, reply)| Command::from_label(&label).map(|c| (c, reply)))
            .collect();
        Self { replies }
    }

    pub fn insert(&mut self, command: Command, reply: impl Into<String>) {
        self.replies.insert(command, reply.into());
    }

    pub fn get(&self, command: Command) -> Option<&str> {
        self.replies.get(&command).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

impl FromIterator<(Command, String)> for RawReplySet {
    fn from_iter<I: IntoIterator<Item = (Command, String)>>(iter: I) -> Self {
        Self {
            replies: iter.into_iter().collect(),
        }
    }
}
