//! Channel set parsing and validation.
//!
//! Clients name the channels they want as a comma-separated list
//! (`?channels=a,b,c`). Channels are opaque strings: the broker routes on
//! them but never creates or destroys them.

use std::fmt;

/// Separator used in the `channels` query parameter
pub const CHANNEL_SEPARATOR: char = ',';

/// Error returned when a request does not name any channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("'channels' query parameter required")]
    Missing,
}

/// Non-empty, ordered, de-duplicated set of channel names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelSet {
    channels: Vec<String>,
}

impl ChannelSet {
    /// Parse a comma-separated channel list.
    ///
    /// Segments are trimmed, empty segments are dropped and repeats keep
    /// their first position. A missing list, or one with no usable segment,
    /// is an error rather than an empty subscription.
    pub fn parse(raw: Option<&str>) -> Result<Self, ChannelError> {
        let raw = raw.ok_or(ChannelError::Missing)?;
        Self::from_names(raw.split(CHANNEL_SEPARATOR))
    }

    /// Build a set from individual channel names
    pub fn from_names<I, S>(names: I) -> Result<Self, ChannelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut channels: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !channels.iter().any(|c| c == name) {
                channels.push(name.to_string());
            }
        }

        if channels.is_empty() {
            return Err(ChannelError::Missing);
        }

        Ok(Self { channels })
    }

    /// Whether the set includes a channel
    #[must_use]
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.iter().any(|c| c == channel)
    }

    /// Iterate channel names in request order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    /// Number of distinct channels
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for channel in &self.channels {
            if !first {
                write!(f, "{CHANNEL_SEPARATOR}")?;
            }
            write!(f, "{channel}")?;
            first = false;
        }
        Ok(())
    }
}
