//! Artifact file naming.
//!
//! `<stem>-<timestamp>.<kind>[.<compression ext>]`, e.g.
//! `wordpress-database-20191201093000.sql.xz`.

use crate::backup::file_ext::FileExtProvider;

use chrono::{DateTime, Local};
use derive_more::Display;
use itertools::Itertools;
use sanitize_filename::sanitize;
use std::sync::Arc;

static TIME_FORMAT: &str = "%Y%m%d%H%M%S";
static DATE_FORMAT: &str = "%Y%m%d";
static NAME_SEPARATOR: &str = "-";
static FALLBACK_STEM: &str = "artifact";

/// What produced the artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ArtifactKind {
    #[display("sql")]
    Sql,
    #[display("tar")]
    Tar,
}

impl FileExtProvider for ArtifactKind {
    fn file_ext(&self) -> Option<Arc<str>> {
        Some(self.to_string().into())
    }
}

/// Lower-cases, replaces whitespace with `-` and strips characters that are
/// not allowed in file names. Applying it twice changes nothing.
pub fn sanitize_name<S: AsRef<str>>(name: S) -> String {
    let lowered = name
        .as_ref()
        .to_lowercase()
        .split_whitespace()
        .join(NAME_SEPARATOR);
    let sanitized = sanitize(lowered);
    if sanitized.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        sanitized
    }
}

/// Names artifacts for one run; every name shares the run's start time.
#[derive(Clone, Debug)]
pub struct ArtifactNamer {
    started_at: DateTime<Local>,
}

impl ArtifactNamer {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self { started_at }
    }

    pub fn timestamp(&self) -> String {
        self.started_at.format(TIME_FORMAT).to_string()
    }

    /// File name stem without the timestamp suffix handling.
    ///
    /// A `format` template may use `{name}`, `{date}` and `{timestamp}`.
    fn stem(&self, name: &str, format: Option<&str>) -> (String, bool) {
        match format.filter(|f| !f.is_empty()) {
            None => (sanitize_name(name), false),
            Some(format) => {
                let has_timestamp = format.contains("{timestamp}");
                let expanded = format
                    .replace("{name}", &sanitize_name(name))
                    .replace("{date}", &self.started_at.format(DATE_FORMAT).to_string())
                    .replace("{timestamp}", &self.timestamp());
                (sanitize_name(expanded), has_timestamp)
            }
        }
    }

    pub fn artifact_name<C: FileExtProvider>(
        &self,
        name: &str,
        format: Option<&str>,
        kind: ArtifactKind,
        compression: &C,
    ) -> String {
        let (stem, has_timestamp) = self.stem(name, format);
        let stem = if has_timestamp {
            stem
        } else {
            format!("{}{}{}", stem, NAME_SEPARATOR, self.timestamp())
        };

        std::iter::once(Arc::<str>::from(stem))
            .chain(kind.file_ext())
            .chain(compression.file_ext())
            .join(".")
    }
}
