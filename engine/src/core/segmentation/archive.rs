//! Sentence Archive
//!
//! A plain-text file, one sentence per line, listing every sentence already
//! emitted by earlier runs. Segments whose sentence is archived are dropped so
//! re-processing a video (or an overlapping one) yields only new material.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::captions::Segment;
use crate::core::fs::{atomic_write_text, with_file_lock};
use crate::core::CoreResult;

/// Archive of previously emitted sentences
#[derive(Debug)]
pub struct SentenceArchive {
    path: PathBuf,
    known: HashSet<String>,
    original_len: usize,
    added: Vec<String>,
    update: bool,
}

fn read_lines(path: &Path) -> CoreResult<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(content.lines().map(str::to_string).collect()))
}

impl SentenceArchive {
    /// Loads the archive at `path`. A missing file is an empty archive.
    ///
    /// With `update` false the file is read without a lock file and
    /// [`save`](Self::save) never touches the disk.
    pub fn load(path: impl Into<PathBuf>, update: bool) -> CoreResult<Self> {
        let path = path.into();
        let lines = if update {
            with_file_lock(&path, false, || read_lines(&path))?
        } else {
            read_lines(&path)?
        };

        let lines = lines.unwrap_or_else(|| {
            warn!("Archive {} not found, starting empty", path.display());
            Vec::new()
        });
        info!("Loaded {} archived sentences", lines.len());

        Ok(Self {
            path,
            original_len: lines.len(),
            known: lines.into_iter().collect(),
            added: Vec::new(),
            update,
        })
    }

    /// Archive file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of lines read at load time
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Sentences accepted during this run, in order
    pub fn added(&self) -> &[String] {
        &self.added
    }

    pub fn updates_enabled(&self) -> bool {
        self.update
    }

    /// Whether `sentence` is archived or was accepted during this run
    pub fn contains(&self, sentence: &str) -> bool {
        self.known.contains(sentence)
    }

    /// Drops segments whose sentence is already known and records the rest
    pub fn retain_unseen(&mut self, segments: Vec<Segment>) -> Vec<Segment> {
        segments
            .into_iter()
            .filter(|segment| {
                let sentence = segment.sentence();
                if self.known.contains(&sentence) {
                    debug!("Archived, skipping: {}", sentence);
                    return false;
                }
                self.known.insert(sentence.clone());
                self.added.push(sentence);
                true
            })
            .collect()
    }

    /// Appends the accepted sentences to the archive file.
    ///
    /// Lines written by other runs since [`load`](Self::load) are preserved.
    /// Returns the number of lines appended.
    pub fn save(&self) -> CoreResult<usize> {
        if !self.update {
            info!("Archive updates disabled, {} not written", self.path.display());
            return Ok(0);
        }
        if self.added.is_empty() {
            debug!("No new sentences for {}", self.path.display());
            return Ok(0);
        }

        with_file_lock(&self.path, true, || {
            let mut lines = read_lines(&self.path)?.unwrap_or_default();
            let current_len = lines.len();
            if current_len != self.original_len {
                info!(
                    "Archive {} changed on disk ({} -> {} lines), merging",
                    self.path.display(),
                    self.original_len,
                    current_len
                );
            }

            let mut present: HashSet<&str> = lines.iter().map(String::as_str).collect();
            let fresh: Vec<&String> = self
                .added
                .iter()
                .filter(|s| present.insert(s.as_str()))
                .collect();
            let appended = fresh.len();
            lines.extend(fresh.into_iter().cloned());

            let mut content = lines.join("\n");
            content.push('\n');
            atomic_write_text(&self.path, &content)?;

            info!("Appended {} sentences to {}", appended, self.path.display());
            Ok(appended)
        })
    }
}
