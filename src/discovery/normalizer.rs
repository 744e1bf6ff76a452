use crate::backend::SearchCommand;
use once_cell::sync::Lazy;
use regex::Regex;

// CSI sequences (colors, cursor movement) and OSC sequences (hyperlinks)
static ANSI_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)").unwrap()
});

/// Run `command` to completion and return its non-blank stdout lines.
///
/// Exit status is not inspected: a failed or crashed tool yields whatever
/// it printed, possibly nothing. Lines are not validated here.
pub fn run(command: &SearchCommand) -> Vec<String> {
    log::debug!("running {}", command);

    let output = match command.to_command().output() {
        Ok(output) => output,
        Err(e) => {
            log::warn!("failed to run {}: {}", command.program.display(), e);
            return Vec::new();
        }
    };

    if !output.status.success() {
        log::debug!(
            "{} exited with {}: {}",
            command.program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    split_output(&String::from_utf8_lossy(&output.stdout))
}

pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE_REGEX.replace_all(text, "").into_owned()
}

/// Strip escapes, split on newlines, drop blank lines.
pub fn split_output(text: &str) -> Vec<String> {
    strip_ansi(text)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
