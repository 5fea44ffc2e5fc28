// Per-run export configuration
// Built once from the command line, validated, then only ever read

use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing destination folder.")]
    MissingFolder,

    #[error("Ignoring both playlists and smart playlists means nothing to do.")]
    NothingToExport,

    #[error("No text to find defined for replacement text ('{0}')")]
    ReplaceWithoutFind(String),

    #[error("Unusable match text '{0}'")]
    Pattern(String),
}

/// Case-insensitive literal text, compiled once
#[derive(Debug, Clone)]
pub struct TextMatcher {
    text: String,
    regex: Regex,
}

impl TextMatcher {
    pub fn new(text: &str) -> Result<Self, ConfigError> {
        let regex = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .map_err(|_| ConfigError::Pattern(text.to_string()))?;

        Ok(Self {
            text: text.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Remainder of `haystack` if it starts with this text
    pub fn strip_prefix<'a>(&self, haystack: &'a str) -> Option<&'a str> {
        // Leftmost match wins, so a match at 0 is always found first
        self.regex
            .find(haystack)
            .filter(|m| m.start() == 0)
            .map(|m| &haystack[m.end()..])
    }

    pub fn is_prefix_of(&self, haystack: &str) -> bool {
        self.strip_prefix(haystack).is_some()
    }

    pub fn replace_all<'a>(&self, haystack: &'a str, replacement: &str) -> Cow<'a, str> {
        self.regex.replace_all(haystack, regex::NoExpand(replacement))
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    export_folder: PathBuf,
    ignore_smart: bool,
    ignore_regular: bool,
    ignore_prefix: Option<TextMatcher>,
    unix_style: bool,
    find: Option<TextMatcher>,
    replace: String,
    append_eight: bool,
    not_extended: bool,
    delete_existing: bool,
    base_path: Option<TextMatcher>,
}

impl ExportConfig {
    pub fn builder(export_folder: impl Into<PathBuf>) -> ExportConfigBuilder {
        ExportConfigBuilder {
            export_folder: export_folder.into(),
            ..ExportConfigBuilder::default()
        }
    }

    pub fn export_folder(&self) -> &Path {
        &self.export_folder
    }

    pub fn ignore_smart(&self) -> bool {
        self.ignore_smart
    }

    pub fn ignore_regular(&self) -> bool {
        self.ignore_regular
    }

    pub fn ignore_prefix(&self) -> Option<&TextMatcher> {
        self.ignore_prefix.as_ref()
    }

    pub fn unix_style(&self) -> bool {
        self.unix_style
    }

    pub fn find(&self) -> Option<&TextMatcher> {
        self.find.as_ref()
    }

    pub fn replace(&self) -> &str {
        &self.replace
    }

    pub fn not_extended(&self) -> bool {
        self.not_extended
    }

    pub fn delete_existing(&self) -> bool {
        self.delete_existing
    }

    pub fn base_path(&self) -> Option<&TextMatcher> {
        self.base_path.as_ref()
    }

    pub fn line_ending(&self) -> &'static str {
        if self.unix_style {
            "\n"
        } else {
            "\r\n"
        }
    }

    pub fn file_extension(&self) -> &'static str {
        if self.append_eight {
            ".m3u8"
        } else {
            ".m3u"
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportConfigBuilder {
    export_folder: PathBuf,
    ignore_smart: bool,
    ignore_regular: bool,
    ignore_prefix: String,
    unix_style: bool,
    find: String,
    replace: String,
    append_eight: bool,
    not_extended: bool,
    delete_existing: bool,
    base_path: String,
}

impl ExportConfigBuilder {
    pub fn ignore_smart(mut self, yes: bool) -> Self {
        self.ignore_smart = yes;
        self
    }

    pub fn ignore_regular(mut self, yes: bool) -> Self {
        self.ignore_regular = yes;
        self
    }

    pub fn ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefix = prefix.into();
        self
    }

    pub fn unix_style(mut self, yes: bool) -> Self {
        self.unix_style = yes;
        self
    }

    pub fn find_replace(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.find = find.into();
        self.replace = replace.into();
        self
    }

    pub fn append_eight(mut self, yes: bool) -> Self {
        self.append_eight = yes;
        self
    }

    pub fn not_extended(mut self, yes: bool) -> Self {
        self.not_extended = yes;
        self
    }

    pub fn delete_existing(mut self, yes: bool) -> Self {
        self.delete_existing = yes;
        self
    }

    pub fn base_path(mut self, base: impl Into<String>) -> Self {
        self.base_path = base.into();
        self
    }

    pub fn build(self) -> Result<ExportConfig, ConfigError> {
        if self.export_folder.as_os_str().is_empty() {
            return Err(ConfigError::MissingFolder);
        }
        if self.ignore_smart && self.ignore_regular {
            return Err(ConfigError::NothingToExport);
        }
        if self.find.is_empty() && !self.replace.is_empty() {
            return Err(ConfigError::ReplaceWithoutFind(self.replace));
        }

        Ok(ExportConfig {
            export_folder: self.export_folder,
            ignore_smart: self.ignore_smart,
            ignore_regular: self.ignore_regular,
            ignore_prefix: optional_matcher(&self.ignore_prefix)?,
            unix_style: self.unix_style,
            find: optional_matcher(&self.find)?,
            replace: self.replace,
            append_eight: self.append_eight,
            not_extended: self.not_extended,
            delete_existing: self.delete_existing,
            base_path: optional_matcher(&self.base_path)?,
        })
    }
}

fn optional_matcher(text: &str) -> Result<Option<TextMatcher>, ConfigError> {
    if text.is_empty() {
        Ok(None)
    } else {
        TextMatcher::new(text).map(Some)
    }
}
