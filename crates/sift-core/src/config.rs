//! Parser configuration

/// Which message kinds a parser accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    Request,
    Response,
    /// Detect from the first byte of each message
    Both,
}

/// Default cap on the request/status line plus header section.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 80 * 1024;

/// Parser configuration, fixed at construction
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub kind: ParserKind,
    /// Reject spaces inside header names
    pub strict_header_token: bool,
    /// Reject HTAB, FF and obs-text in the request target
    pub strict_url_token: bool,
    /// Accept control bytes in header values
    pub lenient_header_values: bool,
    /// Maximum bytes read before the header section completes
    pub max_header_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(ParserKind::Both)
    }
}

impl ParserConfig {
    pub fn new(kind: ParserKind) -> Self {
        Self {
            kind,
            strict_header_token: false,
            strict_url_token: false,
            lenient_header_values: false,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }

    pub fn request() -> Self {
        Self::new(ParserKind::Request)
    }

    pub fn response() -> Self {
        Self::new(ParserKind::Response)
    }

    pub fn strict_header_token(mut self, strict: bool) -> Self {
        self.strict_header_token = strict;
        self
    }

    pub fn strict_url_token(mut self, strict: bool) -> Self {
        self.strict_url_token = strict;
        self
    }

    pub fn lenient_header_values(mut self, lenient: bool) -> Self {
        self.lenient_header_values = lenient;
        self
    }

    /// Set limit in bytes
    pub fn max_header_size(mut self, size: usize) -> Self {
        self.max_header_size = size;
        self
    }

    /// Set limit in kilobytes
    pub fn max_header_size_kb(self, size: usize) -> Self {
        self.max_header_size(size * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.kind, ParserKind::Both);
        assert!(!config.strict_header_token);
        assert!(!config.strict_url_token);
        assert!(!config.lenient_header_values);
        assert_eq!(config.max_header_size, 80 * 1024);
    }

    #[test]
    fn test_builder() {
        let config = ParserConfig::request()
            .strict_header_token(true)
            .strict_url_token(true)
            .lenient_header_values(true)
            .max_header_size_kb(8);
        assert_eq!(config.kind, ParserKind::Request);
        assert!(config.strict_header_token);
        assert!(config.strict_url_token);
        assert!(config.lenient_header_values);
        assert_eq!(config.max_header_size, 8192);
    }
}
