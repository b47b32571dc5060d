//! Versioned reference files
use log::debug;

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    cfg::{Error as ConfigError, ReferenceOpts},
    error::Error,
    prelude::Epoch,
};

const VERSION_PLACEHOLDER: &str = "{version}";

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// [Version] of a reference file, identified by the
/// date it was published (like `2020Jan15`).
#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    identifier: String,
    date: Epoch,
}

impl Version {
    /// Version identifier, as found in the file name
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Publication date, at midnight UTC
    pub fn date(&self) -> Epoch {
        self.date
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

impl FromStr for Version {
    type Err = Error;
    /// Parses `YYYYMonDD` identifiers, month name is case insensitive.
    fn from_str(s: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedVersion(s.to_string());

        if s.len() != 9 || !s.is_ascii() {
            return Err(malformed());
        }

        let (year, month, day) = (&s[0..4], &s[4..7], &s[7..9]);

        if !year.chars().chain(day.chars()).all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let day = day.parse::<u8>().map_err(|_| malformed())?;

        let month = MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(month))
            .ok_or_else(malformed)?;

        let date = Epoch::maybe_from_gregorian_utc(year, month as u8 + 1, day, 0, 0, 0, 0)
            .map_err(|_| malformed())?;

        Ok(Self {
            identifier: s.to_string(),
            date,
        })
    }
}

/// Selects the most recent [Version] amongst these identifiers.
/// Any malformed identifier aborts the selection.
/// When two identifiers describe the same date, the lexically greatest one wins,
/// so the selection does not depend on the enumeration order.
pub fn select_latest<S: AsRef<str>>(category: &str, identifiers: &[S]) -> Result<Version, Error> {
    let versions = identifiers
        .iter()
        .map(|id| Version::from_str(id.as_ref()))
        .collect::<Result<Vec<_>, Error>>()?;

    versions
        .into_iter()
        .max_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.identifier.cmp(&b.identifier))
        })
        .ok_or_else(|| Error::NoVersionsFound(category.to_string()))
}

/// [ReferenceParser] turns a reference file into a structured content.
pub trait ReferenceParser {
    type Output;

    /// Parse this file
    fn parse(&self, path: &Path) -> Result<Self::Output, Error>;
}

/// [VersionedReference] locates all available versions of one
/// category of reference files and loads the latest one.
#[derive(Debug, Clone)]
pub struct VersionedReference {
    category: String,
    opts: ReferenceOpts,
}

impl VersionedReference {
    pub fn new(category: &str, opts: &ReferenceOpts) -> Self {
        Self {
            category: category.to_string(),
            opts: opts.clone(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    fn pattern(&self) -> Result<(&str, &str), Error> {
        self.opts
            .pattern
            .split_once(VERSION_PLACEHOLDER)
            .ok_or_else(|| {
                ConfigError::MissingVersionPlaceholder(self.opts.pattern.clone()).into()
            })
    }

    /// Lists all version identifiers matching the naming pattern,
    /// in lexical order.
    pub fn identifiers(&self) -> Result<Vec<String>, Error> {
        let (prefix, suffix) = self.pattern()?;

        let entries = fs::read_dir(&self.opts.directory).map_err(|source| Error::Io {
            path: self.opts.directory.clone(),
            source,
        })?;

        let mut identifiers = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: self.opts.directory.clone(),
                source,
            })?;

            let name = entry.file_name();

            let Some(name) = name.to_str() else {
                continue;
            };

            let identifier = name
                .strip_prefix(prefix)
                .and_then(|name| name.strip_suffix(suffix));

            if let Some(identifier) = identifier {
                if !identifier.is_empty()
                    && identifier
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    identifiers.push(identifier.to_string());
                }
            }
        }

        identifiers.sort();
        Ok(identifiers)
    }

    /// Selects the most recent [Version]. The run date does not
    /// take part in the selection: the latest published version always applies.
    pub fn select(&self) -> Result<Version, Error> {
        let identifiers = self.identifiers()?;
        let version = select_latest(&self.category, &identifiers)?;
        debug!(
            "{}: selected version {} ({} available)",
            self.category,
            version,
            identifiers.len()
        );
        Ok(version)
    }

    /// File path of this [Version]
    pub fn path(&self, version: &Version) -> PathBuf {
        let name = self
            .opts
            .pattern
            .replace(VERSION_PLACEHOLDER, version.identifier());
        self.opts.directory.join(name)
    }

    /// Selects and parses the most recent version.
    pub fn load<P: ReferenceParser>(&self, parser: &P) -> Result<P::Output, Error> {
        let version = self.select()?;
        parser.parse(&self.path(&version))
    }
}
