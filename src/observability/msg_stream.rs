// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{Error, Result};

/// Verbosity of a [`MsgStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };
        f.pad(name)
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" | "DBG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" | "ERR" => Ok(Level::Error),
            other => Err(Error::Config(format!("invalid message level [{other}]"))),
        }
    }
}

/// Leveled message sink bound to one component.
///
/// Messages below the stream's level are dropped; the rest go to `tracing`
/// with the component name attached.
#[derive(Clone)]
pub struct MsgStream {
    name: Arc<str>,
    level: Level,
}

impl MsgStream {
    pub fn new(name: &str, level: Level) -> Self {
        Self {
            name: Arc::from(name),
            level,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// The same sink under another component name.
    pub fn named(&self, name: &str) -> Self {
        Self::new(name, self.level)
    }

    pub fn enabled(&self, lvl: Level) -> bool {
        lvl >= self.level
    }

    pub fn msg(&self, lvl: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(lvl) {
            return;
        }
        let component = &*self.name;
        match lvl {
            Level::Debug => tracing::debug!(component, "{}", args),
            Level::Info => tracing::info!(component, "{}", args),
            Level::Warn => tracing::warn!(component, "{}", args),
            Level::Error => tracing::error!(component, "{}", args),
        }
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        self.msg(Level::Debug, format_args!("{msg}"));
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.msg(Level::Info, format_args!("{msg}"));
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.msg(Level::Warn, format_args!("{msg}"));
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.msg(Level::Error, format_args!("{msg}"));
    }
}

impl fmt::Debug for MsgStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MsgStream")
            .field("name", &self.name)
            .field("level", &self.level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing_table_driven() {
        struct TestCase {
            input: &'static str,
            expected: Option<Level>,
        }

        let test_cases = vec![
            TestCase { input: "DEBUG", expected: Some(Level::Debug) },
            TestCase { input: "info", expected: Some(Level::Info) },
            TestCase { input: " Warning ", expected: Some(Level::Warn) },
            TestCase { input: "ERROR", expected: Some(Level::Error) },
            TestCase { input: "loud", expected: None },
        ];

        for tc in test_cases {
            assert_eq!(tc.input.parse::<Level>().ok(), tc.expected, "input {:?}", tc.input);
        }
    }

    #[test]
    fn test_threshold() {
        let msg = MsgStream::new("t1", Level::Warn);
        assert!(!msg.enabled(Level::Debug));
        assert!(!msg.enabled(Level::Info));
        assert!(msg.enabled(Level::Warn));
        assert!(msg.enabled(Level::Error));
        assert_eq!(msg.named("t2").name(), "t2");
        assert_eq!(msg.named("t2").level(), Level::Warn);
    }
}
