//! Configurable limits for archive enumeration.

/// Limits applied while enumerating entries.
///
/// These protect against malformed or adversarial archives: a corrupt
/// long-name chain could otherwise loop forever, and an oversized name
/// could exhaust memory.
///
/// # Example
///
/// ```
/// use tar_reader::archive::Limits;
///
/// let limits = Limits {
///     max_path_len: 1024,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum resolved entry name length in bytes.
    ///
    /// Applies after prefix joining and long-name substitution. Default:
    /// 4096 bytes (Linux PATH_MAX).
    pub max_path_len: usize,

    /// Maximum number of consecutive GNU long-name records before the real
    /// header.
    ///
    /// Well-formed archives use exactly one. Default: 16.
    pub max_link_chain: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_path_len: 4096,
            max_link_chain: 16,
        }
    }
}

impl Limits {
    /// Create a new `Limits` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
