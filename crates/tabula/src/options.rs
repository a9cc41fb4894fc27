//! Session options

/// Options applied when a session opens or creates a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// First document row holds column headers (default: false)
    ///
    /// Caller row 0 then refers to document row 2.
    pub header_row: bool,
    /// Open documents read-only (default: false)
    pub read_only: bool,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_row(mut self, header_row: bool) -> Self {
        self.header_row = header_row;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
