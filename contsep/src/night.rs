//! Lookup of cube and registration files in a night-organised data archive.
//!
//! Files of one night live in `<root>/<YYYYMMDD>/`. A target's cube is
//! `e3d_*<target>*.yaml` and its registration is `guider_*<target>*astrom.yaml`.

use std::env;
use std::path::{Path, PathBuf};

use common::file_utils::{files_matching, FileNameFilter};

use crate::error::{Error, Result};

/// Environment variable naming the archive root.
pub const DATA_ROOT_ENV: &str = "CONTSEP_DATA_ROOT";

const CUBE_PREFIX: &str = "e3d_";
const CUBE_SUFFIX: &str = ".yaml";
const REGISTRATION_PREFIX: &str = "guider_";
const REGISTRATION_SUFFIX: &str = "astrom.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightArchive {
    root: PathBuf,
}

impl NightArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Archive rooted at `$CONTSEP_DATA_ROOT`, or the working directory if unset.
    pub fn from_env() -> Self {
        match env::var_os(DATA_ROOT_ENV) {
            Some(root) => Self::new(root),
            None => {
                tracing::debug!("{} not set, using working directory", DATA_ROOT_ENV);
                Self::new(".")
            }
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the night `date` (`YYYYMMDD`).
    pub fn night_dir(&self, date: &str) -> Result<PathBuf> {
        validate_date(date)?;
        let dir = self.root.join(date);
        if !dir.is_dir() {
            return Err(Error::NightDirectoryMissing { path: dir });
        }
        Ok(dir)
    }

    /// Sorted files of the night whose names start with `prefix`, end with
    /// `suffix` and contain `contains` in between.
    pub fn night_files(
        &self,
        date: &str,
        prefix: &str,
        contains: &str,
        suffix: &str,
    ) -> Result<Vec<PathBuf>> {
        let dir = self.night_dir(date)?;
        let filter = FileNameFilter {
            prefix,
            contains,
            suffix,
        };
        files_matching(&dir, &filter).map_err(|source| Error::ReadFile { path: dir, source })
    }

    pub fn cube_file(&self, date: &str, target: &str) -> Result<PathBuf> {
        self.unique_file(date, target, "cube", CUBE_PREFIX, CUBE_SUFFIX)
    }

    pub fn registration_file(&self, date: &str, target: &str) -> Result<PathBuf> {
        self.unique_file(
            date,
            target,
            "registration",
            REGISTRATION_PREFIX,
            REGISTRATION_SUFFIX,
        )
    }

    fn unique_file(
        &self,
        date: &str,
        target: &str,
        kind: &'static str,
        prefix: &str,
        suffix: &str,
    ) -> Result<PathBuf> {
        let mut matches = self.night_files(date, prefix, target, suffix)?;
        match matches.len() {
            0 => Err(Error::NoMatchingFile {
                kind,
                target: target.to_string(),
                dir: self.root.join(date),
            }),
            1 => {
                let path = matches.remove(0);
                tracing::debug!(kind, target, path = %path.display(), "found night file");
                Ok(path)
            }
            _ => Err(Error::AmbiguousMatch {
                kind,
                target: target.to_string(),
                matches,
            }),
        }
    }
}

/// Night dates are eight ASCII digits, `YYYYMMDD`.
pub fn validate_date(date: &str) -> Result<()> {
    if date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::InvalidDate(date.to_string()))
    }
}
