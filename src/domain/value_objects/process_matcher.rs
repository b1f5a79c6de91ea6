//! Process matcher value object
//!
//! Identifies "the emulator running our artifact" by what it looks like on
//! the process table instead of by a retained child handle, so the
//! relaunch keeps working after the toolbox itself restarts.

use std::path::{Path, PathBuf};

use regex::Regex;

/// Matches processes whose command line starts with `program` and mentions
/// `artifact`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatcher {
    program: String,
    artifact: PathBuf,
}

impl ProcessMatcher {
    pub fn new(program: impl Into<String>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            artifact: artifact.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Extended regex over the full command line (`pgrep -f` / `pkill -f`).
    ///
    /// Anchored on the program so the toolbox's own command line, which also
    /// names the artifact, never matches.
    pub fn to_pattern(&self) -> String {
        format!(
            "^{}( |$).*{}",
            regex::escape(&self.program),
            regex::escape(&self.artifact.to_string_lossy())
        )
    }

    /// Compiled form of `to_pattern`, for scanning many command lines
    pub fn to_regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&self.to_pattern())
    }

    /// One-off check of a command line against the same predicate
    pub fn matches(&self, command_line: &str) -> bool {
        self.to_regex()
            .map(|re| re.is_match(command_line))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_emulator_running_artifact() {
        let matcher = ProcessMatcher::new("/usr/bin/pcsx2", "/tmp/proj/app.elf");
        assert!(matcher.matches("/usr/bin/pcsx2 --nogui /tmp/proj/app.elf"));
        assert!(matcher.matches("/usr/bin/pcsx2 /tmp/proj/app.elf"));
    }

    #[test]
    fn does_not_match_toolbox_itself() {
        let matcher = ProcessMatcher::new("pcsx2", "/tmp/proj/app.elf");
        assert!(!matcher.matches("mcp2-toolbox watch --emulator pcsx2 --elf /tmp/proj/app.elf"));
    }

    #[test]
    fn does_not_match_other_artifact() {
        let matcher = ProcessMatcher::new("pcsx2", "/tmp/proj/app.elf");
        assert!(!matcher.matches("pcsx2 /tmp/other/app.elf"));
    }

    #[test]
    fn pattern_escapes_regex_metacharacters() {
        let matcher = ProcessMatcher::new("emu+", "/tmp/a.b/app.elf");
        let pattern = matcher.to_pattern();
        assert!(pattern.starts_with("^emu\\+"));
        assert!(pattern.contains("a\\.b"));
    }

    #[test]
    fn compiled_regex_agrees_with_matches() {
        let matcher = ProcessMatcher::new("pcsx2", "/tmp/proj/app.elf");
        let re = matcher.to_regex().unwrap();
        for line in ["pcsx2 /tmp/proj/app.elf", "pcsx2x /tmp/proj/app.elf", "sh pcsx2 /tmp/proj/app.elf"] {
            assert_eq!(re.is_match(line), matcher.matches(line), "{}", line);
        }
    }
}
