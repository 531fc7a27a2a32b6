//! Example import job CLI.
//!
//! Imports `name,quantity` lines from a file, guarded by connection hooks.
//!
//! # Usage
//!
//! ```bash
//! import-job <file> [--audited]
//! ```
//!
//! Set `RUST_LOG=rescue_hooks=trace,info` to watch every hook run.

use example::{ImportJob, JobKinds, Source};
use rescue_hooks::Outcome;
use rescue_tracing::{TracingConfig, TracingFormat};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    TracingConfig::from_env()
        .with_format(TracingFormat::Compact)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let audited = args.iter().any(|arg| arg == "--audited");
    let Some(path) = args.iter().find(|arg| !arg.starts_with("--")) else {
        eprintln!("Usage: import-job <file> [--audited]");
        return ExitCode::FAILURE;
    };

    let kinds = match JobKinds::build() {
        Ok(kinds) => kinds,
        Err(error) => {
            tracing::error!(%error, "invalid job definition");
            return ExitCode::FAILURE;
        }
    };
    let definition = if audited { &kinds.audited } else { &kinds.plain };

    let mut job = ImportJob::new(definition, Source::File(PathBuf::from(path)));
    match job.run() {
        Ok(Outcome::Completed(count)) => {
            tracing::info!(count, definition = definition.name(), "import complete");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Rescued { fault_type }) => {
            tracing::warn!(
                fault_type,
                reason = job.rejected.as_deref().unwrap_or_default(),
                "import rejected"
            );
            ExitCode::FAILURE
        }
        Err(error) => {
            tracing::error!(%error, "import failed");
            ExitCode::FAILURE
        }
    }
}
