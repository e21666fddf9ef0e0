//! Status lines for the texopt CLI.
//!
//! Every line is a right-aligned verb followed by a message, written to
//! stderr so stdout stays clean for `--json`. Verbs are coloured by tone
//! when stderr is a terminal.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::types::Dimensions;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Verb column width; fits "Would resize".
const VERB_WIDTH: usize = 12;

/// Colour family of a status verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Done,
    Note,
    Attention,
    Failure,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Done => "\x1b[32m",
            Tone::Note => "\x1b[36m",
            Tone::Attention => "\x1b[33m",
            Tone::Failure => "\x1b[31m",
        }
    }
}

/// Writes status lines for scan and optimize runs.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    #[cfg(test)]
    pub(crate) fn plain() -> Self {
        Self { color: false }
    }

    /// Work in progress, e.g. "Scanning" or "Resized".
    pub fn status(&self, verb: &str, message: &str) {
        self.line(Tone::Done, verb, message);
    }

    /// A finished step.
    pub fn success(&self, verb: &str, message: &str) {
        self.line(Tone::Done, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.line(Tone::Note, verb, message);
    }

    /// Something the user should look at, such as an oversized texture.
    pub fn warning(&self, verb: &str, message: &str) {
        self.line(Tone::Attention, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.line(Tone::Failure, verb, message);
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// "16384x16384 -> 4096x4096" with a dimmed arrow.
    pub fn transition(&self, from: Dimensions, to: Dimensions) -> String {
        format!("{} {} {}", from, self.dim("->"), to)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) {
        let verb = format!("{verb:>VERB_WIDTH$}");
        let verb = if self.color {
            format!("{BOLD}{}{verb}{RESET}", tone.code())
        } else {
            verb
        };

        let _ = writeln!(io::stderr().lock(), "{verb} {message}");
    }
}

/// "1 texture", "3 textures".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    let noun = if n == 1 { singular } else { pluralized };
    format!("{n} {noun}")
}

/// Path relative to the working directory when it lies inside it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));

    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}
