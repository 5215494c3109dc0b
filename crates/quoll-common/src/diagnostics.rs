//! Engine diagnostics with colored terminal output.
//!
//! Warnings are deduplicated per unique `[component] message` key so a
//! selector evaluated against thousands of nodes reports a problem once.
//! Every emitted warning is also recorded, which lets tests and the CLI
//! inspect what was reported without scraping stderr.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use owo_colors::OwoColorize;

/// Warnings already emitted, plus the emission order.
#[derive(Default)]
struct WarningLog {
    seen: HashSet<String>,
    recorded: Vec<String>,
}

static WARNINGS: Mutex<Option<WarningLog>> = Mutex::new(None);

/// Lock the warning log, recovering the data if a panicking thread poisoned it.
fn log() -> MutexGuard<'static, Option<WarningLog>> {
    WARNINGS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Warn about an unsupported or never-matching construct, once per unique message.
///
/// Returns `true` if this call emitted the warning, `false` if it was a repeat.
///
/// # Example
/// ```ignore
/// warn_once("selectors", "pseudo-element ::before never matches during traversal");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let mut guard = log();
    let warnings = guard.get_or_insert_with(WarningLog::default);
    if !warnings.seen.insert(key.clone()) {
        return false;
    }
    eprintln!("{} {message}", format!("[Quoll {component}] ⚠").yellow());
    warnings.recorded.push(key);
    true
}

/// Every warning emitted since the last [`clear_warnings`], in emission order.
#[must_use]
pub fn recorded_warnings() -> Vec<String> {
    log()
        .as_ref()
        .map(|warnings| warnings.recorded.clone())
        .unwrap_or_default()
}

/// Forget all recorded warnings so they can be emitted again.
pub fn clear_warnings() {
    if let Some(warnings) = log().as_mut() {
        warnings.seen.clear();
        warnings.recorded.clear();
    }
}

/// Print an indented trace line for nested evaluation.
///
/// Callers gate this behind their own tracing feature; it is never used
/// on a default build.
pub fn trace(component: &str, depth: usize, message: &str) {
    eprintln!(
        "{}{} {message}",
        "  ".repeat(depth),
        format!("[{component}]").dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let message = "test_warn_once_deduplicates unique message";
        assert!(warn_once("test", message));
        assert!(!warn_once("test", message));
        let recorded = recorded_warnings();
        assert_eq!(
            recorded
                .iter()
                .filter(|entry| entry.ends_with(message))
                .count(),
            1
        );
    }
}
