use std::fmt;

/// Comparison used to route a record at an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitRule {
    /// Numeric-style threshold: `field < value` goes left.
    LessThan,
    /// Categorical equality: `field == value` goes left.
    Equals,
}

impl SplitRule {
    /// Returns `true` when a record with `field` is routed to the left child.
    ///
    /// Fields are compared as strings, so `LessThan` is a byte-wise
    /// lexicographic order.
    pub fn goes_left(self, field: &str, value: &str) -> bool {
        match self {
            SplitRule::LessThan => field < value,
            SplitRule::Equals => field == value,
        }
    }

    /// Whether this rule came from a numeric-style threshold search.
    pub fn is_numeric(self) -> bool {
        matches!(self, SplitRule::LessThan)
    }
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitRule::LessThan => write!(f, "<"),
            SplitRule::Equals => write!(f, "=="),
        }
    }
}

/// Decision tree node.
///
/// A tree is always full binary: every `Internal` node owns exactly two
/// children and leaves own none.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Terminal node predicting a class label.
    Leaf { label: String },
    /// Split on one attribute column.
    Internal {
        attribute: usize,
        value: String,
        rule: SplitRule,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(label: impl Into<String>) -> Self {
        Node::Leaf {
            label: label.into(),
        }
    }

    pub fn internal(
        attribute: usize,
        value: impl Into<String>,
        rule: SplitRule,
        left: Node,
        right: Node,
    ) -> Self {
        Node::Internal {
            attribute,
            value: value.into(),
            rule,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Label of a leaf, `None` for internal nodes.
    pub fn label(&self) -> Option<&str> {
        match self {
            Node::Leaf { label } => Some(label.as_str()),
            Node::Internal { .. } => None,
        }
    }

    /// Classifies one record by descending to a leaf.
    ///
    /// A record too short to hold the split attribute is routed right.
    pub fn predict<'a>(&'a self, record: &[String]) -> &'a str {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { label } => return label,
                Node::Internal {
                    attribute,
                    value,
                    rule,
                    left,
                    right,
                } => {
                    let goes_left = record
                        .get(*attribute)
                        .is_some_and(|field| rule.goes_left(field, value));
                    node = if goes_left { &**left } else { &**right };
                }
            }
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    pub fn n_nodes(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Internal { left, right, .. } => 1 + left.n_nodes() + right.n_nodes(),
        }
    }
}
