use super::split::ColumnKind;
use crate::error::TreeError;

/// Default depth bound for tree growth.
pub const DEFAULT_MAX_DEPTH: usize = 8;
/// Default label oversampled by the class-balancing step.
pub const DEFAULT_POSITIVE_CLASS: &str = "true";

#[derive(Clone, Debug)]
pub struct TreeParams {
    pub max_depth: usize,
    pub positive_class: Option<String>,
    pub column_kinds: Vec<ColumnKind>,
    pub seed: Option<u64>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            positive_class: Some(DEFAULT_POSITIVE_CLASS.to_string()),
            column_kinds: Vec::new(),
            seed: None,
        }
    }

    /// Sets the depth bound. A depth of 0 grows a single leaf.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Sets the label oversampled before growth; `None` disables balancing.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyPositiveClass`] for a blank label.
    pub fn set_positive_class(&mut self, positive_class: Option<String>) -> Result<(), TreeError> {
        if positive_class
            .as_deref()
            .is_some_and(|label| label.trim().is_empty())
        {
            return Err(TreeError::EmptyPositiveClass);
        }
        self.positive_class = positive_class;
        Ok(())
    }

    /// Marks the given attribute columns as categorical; all others stay ordered.
    pub fn set_categorical_columns(&mut self, columns: &[usize]) {
        let len = columns.iter().max().map_or(0, |&max| max + 1);
        let mut kinds = vec![ColumnKind::Ordered; len.max(self.column_kinds.len())];
        for &column in columns {
            kinds[column] = ColumnKind::Categorical;
        }
        self.column_kinds = kinds;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn positive_class(&self) -> Option<&str> {
        self.positive_class.as_deref()
    }

    pub fn column_kinds(&self) -> &[ColumnKind] {
        &self.column_kinds
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
