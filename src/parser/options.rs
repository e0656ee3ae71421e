use serde::{Deserialize, Serialize};

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Maximum number of parenthesized forms that may be open at once
    pub max_depth: usize,
}

impl ParserOptions {
    /// Default nesting limit
    ///
    /// Each open form costs several parser frames, so the default leaves room on a
    /// 2 MiB thread stack even in unoptimized builds.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Returns options with a different nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
