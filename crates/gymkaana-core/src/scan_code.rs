// ── Scan code normalization ──
//
// Printed check-in codes look like `GYMKAANA-<booking code>`. Decoders hand
// us the raw text; the lookup endpoint wants only the booking code.

/// Marker printed in front of every booking code.
pub const DEFAULT_MARKER: &str = "GYMKAANA";

/// Characters accepted between the marker and the booking code.
pub const DEFAULT_SEPARATORS: &[char] = &['-', ':'];

/// The prefix a scanned payload may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPrefix {
    marker: String,
    separators: Vec<char>,
}

impl Default for ScanPrefix {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl ScanPrefix {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }

    pub fn with_separators(mut self, separators: impl Into<Vec<char>>) -> Self {
        self.separators = separators.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Strip `<marker><separator>` from the front of `payload`.
    ///
    /// The marker is compared case-insensitively; the remainder is returned
    /// untouched. `None` if the payload does not start with the prefix.
    pub fn strip<'a>(&self, payload: &'a str) -> Option<&'a str> {
        if self.marker.is_empty() {
            return None;
        }
        let head = payload.get(..self.marker.len())?;
        if !head.eq_ignore_ascii_case(&self.marker) {
            return None;
        }
        let rest = payload.get(self.marker.len()..)?;
        let sep = rest.chars().next()?;
        if !self.separators.contains(&sep) {
            return None;
        }
        rest.get(sep.len_utf8()..)
    }
}

/// Turn a decoded scan payload into a lookup key.
///
/// Surrounding whitespace is dropped, then the prefix if present.
/// Payloads without the prefix are used as-is. Returns `None` when nothing
/// usable is left.
pub fn normalize_scan(payload: &str, prefix: &ScanPrefix) -> Option<String> {
    let trimmed = payload.trim();
    let key = prefix.strip(trimmed).unwrap_or(trimmed).trim();
    (!key.is_empty()).then(|| key.to_owned())
}

/// Turn typed input into a lookup key: trimmed, never empty.
pub fn normalize_manual(input: &str) -> Option<String> {
    let key = input.trim();
    (!key.is_empty()).then(|| key.to_owned())
}
