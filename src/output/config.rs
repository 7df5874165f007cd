//! Output configuration types

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Show the resolved target next to symlinked files and directories
    pub show_link_targets: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_link_targets: true,
        }
    }
}
