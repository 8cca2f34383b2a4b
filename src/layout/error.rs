#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No branches were supplied at all
    EmptyInput,
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::EmptyInput => write!(f, "no branches supplied to layout"),
        }
    }
}

impl std::error::Error for LayoutError {}
