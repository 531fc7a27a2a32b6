//! Example import job built with Rescue.
//!
//! An import reads `name,quantity` lines from a source and collects them as
//! records. Two job definitions are available:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ImportJob                                               │
//! │    before: open_connection                               │
//! │    after:  close_connection                              │
//! │    rescue: io::Error ─▶ mark the job rejected            │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  AuditedImportJob                                  │  │
//! │  │    before: <block> audit start                     │  │
//! │  │    after:  <block> audit end                       │  │
//! │  │    rescue: ImportError ─▶ quarantine the source    │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed input propagates out of a plain `ImportJob` but is rescued by
//! an `AuditedImportJob`. The connection is closed on every path.

use rescue_hooks::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Records and errors
// ─────────────────────────────────────────────────────────────────────────────

/// One imported row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Item name.
    pub name: String,
    /// Item quantity.
    pub quantity: u32,
}

/// Input that cannot be imported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    /// The line is not of the form `name,quantity`.
    #[error("line {line}: expected `name,quantity`, got {content:?}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// The quantity is not a non-negative integer.
    #[error("line {line}: invalid quantity {value:?}")]
    Quantity {
        /// 1-based line number.
        line: usize,
        /// The offending value.
        value: String,
    },
}

/// Parses `name,quantity` lines. Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns the first [`ImportError`] encountered.
pub fn parse_records(text: &str) -> Result<Vec<Record>, ImportError> {
    let mut records = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((name, quantity)) = trimmed.split_once(',') else {
            return Err(ImportError::Malformed {
                line,
                content: raw.to_owned(),
            });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ImportError::Malformed {
                line,
                content: raw.to_owned(),
            });
        }
        let quantity = quantity
            .trim()
            .parse()
            .map_err(|_| ImportError::Quantity {
                line,
                value: quantity.trim().to_owned(),
            })?;

        records.push(Record {
            name: name.to_owned(),
            quantity,
        });
    }
    Ok(records)
}

// ─────────────────────────────────────────────────────────────────────────────
// ImportJob
// ─────────────────────────────────────────────────────────────────────────────

/// Where an import reads from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A file on disk.
    File(PathBuf),
    /// In-memory text.
    Text(String),
}

/// A single import run.
pub struct ImportJob {
    definition: Arc<Definition<ImportJob>>,
    source: Source,
    /// Whether the connection is currently open.
    pub connected: bool,
    /// Records imported so far.
    pub records: Vec<Record>,
    /// Lifecycle events in the order they happened.
    pub journal: Vec<&'static str>,
    /// Why the import was rejected or quarantined, if it was.
    pub rejected: Option<String>,
}

impl ImportJob {
    /// Creates a job for `source` running under `definition`.
    #[must_use]
    pub fn new(definition: &Arc<Definition<ImportJob>>, source: Source) -> Self {
        Self {
            definition: Arc::clone(definition),
            source,
            connected: false,
            records: Vec::new(),
            journal: Vec::new(),
            rejected: None,
        }
    }

    /// Runs the import, returning the number of records read.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] for faults the job's definition does
    /// not rescue.
    pub fn run(&mut self) -> Result<Outcome<usize>, ExecutionError> {
        self.execute_with_rescue(import)
    }
}

impl Executor for ImportJob {
    fn definition(&self) -> Arc<Definition<Self>> {
        Arc::clone(&self.definition)
    }
}

fn import(job: &mut ImportJob) -> Result<usize, Fault> {
    let text = match &job.source {
        Source::File(path) => std::fs::read_to_string(path)?,
        Source::Text(text) => text.clone(),
    };

    let records = parse_records(&text)?;
    tracing::info!(count = records.len(), "records parsed");
    job.records.extend(records);
    Ok(job.records.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Definitions
// ─────────────────────────────────────────────────────────────────────────────

/// The job definitions, built once at startup.
#[derive(Debug, Clone)]
pub struct JobKinds {
    /// Opens and closes the connection; rescues unreadable sources.
    pub plain: Arc<Definition<ImportJob>>,
    /// Adds auditing and quarantines malformed input.
    pub audited: Arc<Definition<ImportJob>>,
}

impl JobKinds {
    /// Builds both definitions.
    ///
    /// # Errors
    ///
    /// Returns a [`HookRegistrationError`] if a hook registration is invalid.
    pub fn build() -> Result<Self, HookRegistrationError> {
        let mut plain = Definition::new("ImportJob");
        plain
            .define_method("open_connection", |job: &mut ImportJob| {
                job.connected = true;
                job.journal.push("open");
                tracing::debug!("connection opened");
                Ok(())
            })
            .define_method("close_connection", |job: &mut ImportJob| {
                job.connected = false;
                job.journal.push("close");
                tracing::debug!("connection closed");
                Ok(())
            })
            .rescue_from::<std::io::Error, _>(|job: &mut ImportJob, fault| {
                tracing::error!(error = %fault, "source unreadable");
                job.rejected = Some(fault.to_string());
                Ok(())
            })
            .add_before_hook("open_connection")?
            .add_after_hook("close_connection")?;

        let mut audited = plain.extend("AuditedImportJob");
        audited
            .add_before_block(|job: &mut ImportJob| {
                job.journal.push("audit start");
                Ok(())
            })
            .add_after_block(|job: &mut ImportJob| {
                job.journal.push("audit end");
                Ok(())
            })
            .rescue_from::<ImportError, _>(|job: &mut ImportJob, fault| {
                tracing::warn!(error = %fault, "source quarantined");
                job.records.clear();
                job.rejected = Some(fault.to_string());
                Ok(())
            });

        Ok(Self {
            plain: Arc::new(plain),
            audited: Arc::new(audited),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn text(input: &str) -> Source {
        Source::Text(input.to_string())
    }

    #[test]
    fn parses_records_and_skips_comments() {
        let records = parse_records("# header\napples, 3\n\npears,10\n").unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    name: "apples".to_string(),
                    quantity: 3
                },
                Record {
                    name: "pears".to_string(),
                    quantity: 10
                },
            ]
        );
    }

    #[test]
    fn reports_bad_lines() {
        assert_eq!(
            parse_records("apples,3\nbananas").unwrap_err(),
            ImportError::Malformed {
                line: 2,
                content: "bananas".to_string()
            }
        );
        assert_eq!(
            parse_records("apples,lots").unwrap_err(),
            ImportError::Quantity {
                line: 1,
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn plain_job_imports_between_connection_hooks() {
        let kinds = JobKinds::build().unwrap();
        let mut job = ImportJob::new(&kinds.plain, text("apples,3\npears,10"));

        let outcome = job.run().unwrap();

        assert_eq!(outcome, Outcome::Completed(2));
        assert_eq!(job.journal, vec!["open", "close"]);
        assert!(!job.connected);
    }

    #[test]
    fn plain_job_propagates_malformed_input_and_still_closes() {
        let kinds = JobKinds::build().unwrap();
        let mut job = ImportJob::new(&kinds.plain, text("apples"));

        let err = job.run().unwrap_err();

        assert!(err.is_fault::<ImportError>());
        assert_eq!(job.journal, vec!["open", "close"]);
        assert!(!job.connected);
    }

    #[test]
    fn audited_job_quarantines_malformed_input() {
        let kinds = JobKinds::build().unwrap();
        let mut job = ImportJob::new(&kinds.audited, text("apples,3\npears,many"));

        let outcome = job.run().unwrap();

        assert!(outcome.is_rescued());
        assert!(job.records.is_empty());
        assert_eq!(
            job.rejected.as_deref(),
            Some("line 2: invalid quantity \"many\"")
        );
        assert_eq!(
            job.journal,
            vec!["open", "audit start", "audit end", "close"]
        );
    }

    #[test]
    fn missing_file_is_rescued_by_inherited_handler() {
        let kinds = JobKinds::build().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut job = ImportJob::new(
            &kinds.audited,
            Source::File(dir.path().join("missing.csv")),
        );

        let outcome = job.run().unwrap();

        assert!(matches!(
            outcome,
            Outcome::Rescued { fault_type } if fault_type.contains("io::error::Error")
        ));
        assert!(job.rejected.is_some());
        assert!(!job.connected);
    }

    #[test]
    fn imports_from_file() {
        let kinds = JobKinds::build().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "apples,3").unwrap();
        writeln!(file, "pears,10").unwrap();

        let mut job = ImportJob::new(&kinds.plain, Source::File(file.path().to_path_buf()));

        assert_eq!(job.run().unwrap().completed(), Some(2));
        assert_eq!(job.records[1].name, "pears");
    }
}
