/// Implementation of `dagv validate`.
///
/// Opens the store, runs one validation, and prints either a `✓`/`✗`
/// report or the JSON result record. Ctrl-C fires the cancel token, so a
/// long walk stops promptly and still reports what it found.
///
/// # Report output
///
/// ```text
/// ✓ Root: f01711e20…
/// ✓ Reachable size: 1048576 bytes
/// ✗ Missing: f01551e20…
/// ✗ Invalid: not-a-cid
/// ! Error: store get_size for f0155… failed: …
/// ✗ Incomplete: 1 missing, 1 invalid (not restorable)
/// ```
///
/// The command fails (exit code 1) whenever the result is not complete or
/// not restorable. A complete result can still be unrestorable after a
/// store error or an interrupted walk.
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dagv_store::FsBlockStore;
use dagv_validator::{CancelToken, ValidationResult, Validator, ValidatorConfig};
use tracing::warn;

use crate::ValidateArgs;

/// Run the `dagv validate` command.
///
/// # Errors
///
/// Returns an error if the store or candidates file cannot be opened, the
/// validator rejects the call, or the DAG is incomplete or not restorable.
pub async fn run(args: &ValidateArgs) -> Result<()> {
    let store = FsBlockStore::open(&args.store)
        .await
        .with_context(|| format!("cannot open store {}", args.store.display()))?;

    let mut candidates = args.candidates.clone();
    if let Some(path) = &args.candidates_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        candidates.extend(read_candidates(&text));
    }

    let config = validator_config(args);
    let validator = Validator::new(Arc::new(store), config);

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling validation");
            on_interrupt.cancel();
        }
    });

    let outcome = validator
        .validate(&cancel, &args.root, Some(candidates.as_slice()))
        .await;
    interrupt.abort();
    let result = outcome.with_context(|| format!("cannot validate {}", args.root))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&args.root, &result);
    }

    verdict(&args.root, &result)
}

fn verdict(root: &str, result: &ValidationResult) -> Result<()> {
    if !result.is_complete {
        bail!("DAG under {root} is incomplete");
    }
    if !result.can_restore {
        bail!("DAG under {root} cannot be restored");
    }
    Ok(())
}

fn validator_config(args: &ValidateArgs) -> ValidatorConfig {
    let mut config = ValidatorConfig::default();
    if let Some(n) = args.concurrency {
        config = config.with_max_concurrency(n);
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_store_timeout(Duration::from_millis(ms));
    }
    config
}

/// One identifier per line; surrounding whitespace and blank lines are
/// dropped.
fn read_candidates(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
}

// ── Report formatting ─────────────────────────────────────────────────────────

fn print_report(root: &str, result: &ValidationResult) {
    print!("{}", render_report(root, result));
}

fn render_report(root: &str, result: &ValidationResult) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "✓ Root: {root}");
    let _ = writeln!(out, "✓ Reachable size: {} bytes", result.reachable_size);
    for cid in &result.missing_blocks {
        let _ = writeln!(out, "✗ Missing: {cid}");
    }
    for input in &result.invalid_blocks {
        let _ = writeln!(out, "✗ Invalid: {input}");
    }
    for detail in &result.error_details {
        let _ = writeln!(out, "! Error: {detail}");
    }

    let restorable = if result.can_restore {
        "restorable"
    } else {
        "not restorable"
    };
    if result.is_complete {
        let _ = writeln!(out, "✓ Complete ({restorable})");
    } else {
        let _ = writeln!(
            out,
            "✗ Incomplete: {} missing, {} invalid ({restorable})",
            result.missing_blocks.len(),
            result.invalid_blocks.len()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_file_skips_blank_lines() {
        let text = "f0155aa\n\n  f0155bb  \n\r\n";
        let got: Vec<String> = read_candidates(text).collect();
        assert_eq!(got, vec!["f0155aa", "f0155bb"]);
    }

    #[test]
    fn report_lists_every_finding() {
        let result = ValidationResult {
            is_complete: false,
            missing_blocks: vec!["f0155aa".into()],
            invalid_blocks: vec!["bogus".into()],
            reachable_size: 42,
            can_restore: false,
            error_details: vec!["boom".into()],
        };
        let report = render_report("f0171cc", &result);
        assert_eq!(
            report,
            "✓ Root: f0171cc\n\
             ✓ Reachable size: 42 bytes\n\
             ✗ Missing: f0155aa\n\
             ✗ Invalid: bogus\n\
             ! Error: boom\n\
             ✗ Incomplete: 1 missing, 1 invalid (not restorable)\n"
        );
    }

    #[test]
    fn complete_but_unrestorable_fails() {
        let result = ValidationResult {
            is_complete: true,
            missing_blocks: Vec::new(),
            invalid_blocks: Vec::new(),
            reachable_size: 9,
            can_restore: false,
            error_details: vec!["traversal failed: walk cancelled".into()],
        };

        let err = verdict("f0171cc", &result).unwrap_err();
        assert_eq!(err.to_string(), "DAG under f0171cc cannot be restored");
        assert!(render_report("f0171cc", &result).ends_with("✓ Complete (not restorable)\n"));
    }

    #[test]
    fn clean_result_passes() {
        let result = ValidationResult {
            is_complete: true,
            missing_blocks: Vec::new(),
            invalid_blocks: Vec::new(),
            reachable_size: 9,
            can_restore: true,
            error_details: Vec::new(),
        };
        assert!(verdict("f0171cc", &result).is_ok());
    }

    #[test]
    fn zero_concurrency_flag_still_walks() {
        let args = ValidateArgs {
            store: "store".into(),
            root: String::new(),
            candidates: Vec::new(),
            candidates_file: None,
            json: false,
            concurrency: Some(0),
            timeout_ms: Some(250),
        };
        let config = validator_config(&args);
        assert_eq!(config.effective_concurrency(), 1);
        assert_eq!(config.store_timeout, Some(Duration::from_millis(250)));
    }
}
