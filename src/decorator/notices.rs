use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn emoji(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "💡",
            NoticeLevel::Warning => "⚠️",
            NoticeLevel::Error => "❌",
        }
    }
}

/// A user-visible, non-blocking message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.emoji(), self.message)
    }
}

/// Level of the log copy of each notice; below the CLI's default `Warn` filter.
pub const MIRROR_LEVEL: log::Level = log::Level::Debug;

/// Messages collected during one interaction, in the order they were raised.
/// Every notice is mirrored to the debug log; the report shows it to the user.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Notices {
    entries: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::log!(MIRROR_LEVEL, "[info] {}", message);
        self.push(NoticeLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::log!(MIRROR_LEVEL, "[warn] {}", message);
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::log!(MIRROR_LEVEL, "[error] {}", message);
        self.push(NoticeLevel::Error, message);
    }

    fn push(&mut self, level: NoticeLevel, message: String) {
        self.entries.push(Notice { level, message });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|n| n.level == NoticeLevel::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|n| n.level == NoticeLevel::Warning)
    }
}
