use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A search tool invocation as a program plus argument vector.
///
/// Arguments go straight to the process, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl SearchCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for SearchCommand {
    /// Shell-quoted rendering; display only, never executed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Literal suffixes searched for each extension: plain and encrypted.
pub fn suffix_forms(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .flat_map(|ext| [ext.clone(), format!("{}.gpg", ext), format!("{}.age", ext)])
        .collect()
}

/// `find -L <dir> -type f ( -name *.e -o -name *.e.gpg -o ... )`
pub fn find_command(executable: &Path, root: &Path, extensions: &[String]) -> SearchCommand {
    let mut cmd = SearchCommand::new(executable)
        .arg("-L")
        .arg(root)
        .args(["-type", "f", "("]);

    for (i, suffix) in suffix_forms(extensions).iter().enumerate() {
        if i > 0 {
            cmd = cmd.arg("-o");
        }
        cmd = cmd.arg("-name").arg(format!("*.{}", suffix));
    }

    cmd.arg(")")
}

/// `fd -L --type file -e e -e e.gpg -e e.age . <dir>`
pub fn fd_command(executable: &Path, root: &Path, extensions: &[String]) -> SearchCommand {
    let mut cmd = SearchCommand::new(executable).args(["-L", "--type", "file"]);

    for suffix in suffix_forms(extensions) {
        cmd = cmd.arg("-e").arg(suffix);
    }

    cmd.arg(".").arg(root)
}

/// `rg -L <dir> --files -g *.e -g *.e.gpg -g *.e.age`
pub fn rg_command(executable: &Path, root: &Path, extensions: &[String]) -> SearchCommand {
    let mut cmd = SearchCommand::new(executable)
        .arg("-L")
        .arg(root)
        .arg("--files");

    for suffix in suffix_forms(extensions) {
        cmd = cmd.arg("-g").arg(format!("*.{}", suffix));
    }

    cmd
}
