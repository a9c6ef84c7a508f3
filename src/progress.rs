//! Summary warm-up progress reporting.
//!
//! Reports observable progress during `sdgp warm` so users see how many
//! records are left and how many summaries came from the cache. Progress is
//! emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for warm-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WarmProgressEvent {
    /// Record `n` of `total` has been resolved (`cached` or freshly generated).
    Summarizing {
        id: String,
        n: u64,
        total: u64,
        cached: bool,
    },
    /// Warm-up finished.
    Finished {
        cached: u64,
        generated: u64,
        failed_to_persist: u64,
    },
}

/// Reports warm-up progress. Implementations write to stderr (human or JSON).
pub trait WarmProgressReporter: Send + Sync {
    fn report(&self, event: WarmProgressEvent);
}

/// Human-friendly progress on stderr: "warm  12 / 1,204 projects  (cached)".
pub struct StderrProgress;

impl WarmProgressReporter for StderrProgress {
    fn report(&self, event: WarmProgressEvent) {
        let line = match &event {
            WarmProgressEvent::Summarizing {
                id,
                n,
                total,
                cached,
            } => format!(
                "warm  {} / {} projects  {}  ({})\n",
                format_number(*n),
                format_number(*total),
                id,
                if *cached { "cached" } else { "generated" }
            ),
            WarmProgressEvent::Finished {
                cached,
                generated,
                failed_to_persist,
            } => {
                let mut line = format!(
                    "warm  done: {} cached, {} generated",
                    format_number(*cached),
                    format_number(*generated)
                );
                if *failed_to_persist > 0 {
                    line.push_str(&format!(", {} not saved", format_number(*failed_to_persist)));
                }
                line.push('\n');
                line
            }
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl WarmProgressReporter for JsonProgress {
    fn report(&self, event: WarmProgressEvent) {
        let obj = match &event {
            WarmProgressEvent::Summarizing {
                id,
                n,
                total,
                cached,
            } => serde_json::json!({
                "event": "progress",
                "phase": "summarizing",
                "id": id,
                "n": n,
                "total": total,
                "cached": cached
            }),
            WarmProgressEvent::Finished {
                cached,
                generated,
                failed_to_persist,
            } => serde_json::json!({
                "event": "finished",
                "cached": cached,
                "generated": generated,
                "failed_to_persist": failed_to_persist
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl WarmProgressReporter for NoProgress {
    fn report(&self, _event: WarmProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Parse a `--progress` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" | "none" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    pub fn reporter(&self) -> Box<dyn WarmProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn parse_modes() {
        assert_eq!(ProgressMode::parse("json"), Some(ProgressMode::Json));
        assert_eq!(ProgressMode::parse("human"), Some(ProgressMode::Human));
        assert_eq!(ProgressMode::parse("off"), Some(ProgressMode::Off));
        assert_eq!(ProgressMode::parse("loud"), None);
    }
}
