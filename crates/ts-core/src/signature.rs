//! Wrapper script detection.
//!
//! The launcher is distributed alongside a script entry point of the same
//! name. A copy of that script must never be mistaken for the native
//! delegate, so candidates are rejected when the first few bytes mention a
//! known interpreter.
//!
//! This is a heuristic: a wrapper whose shebang pushes the interpreter name
//! past the inspected window, or a compiled wrapper, will not be caught.

/// Default number of leading bytes inspected per candidate.
pub const DEFAULT_WINDOW: usize = 50;

/// Interpreter names that mark a file as a script wrapper.
pub const DEFAULT_SIGNATURES: &[&str] = &["python"];

/// Case-insensitive byte signatures searched for in a file prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperSignature {
    needles: Vec<String>,
    window: usize,
}

impl Default for WrapperSignature {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURES.iter().copied(), DEFAULT_WINDOW)
    }
}

impl WrapperSignature {
    /// Builds a signature set. Empty needles are dropped since they would
    /// match every file.
    pub fn new<I, S>(needles: I, window: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles = needles
            .into_iter()
            .map(|n| n.as_ref().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        Self { needles, window }
    }

    /// Number of leading bytes to read from a candidate.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Returns the first signature found in `prefix`, if any.
    ///
    /// Only the first [`window`](Self::window) bytes are considered even if
    /// the caller passes more.
    pub fn find_in(&self, prefix: &[u8]) -> Option<&str> {
        let end = prefix.len().min(self.window);
        let haystack = prefix[..end].to_ascii_lowercase();
        self.needles
            .iter()
            .find(|needle| contains(&haystack, needle.as_bytes()))
            .map(String::as_str)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
