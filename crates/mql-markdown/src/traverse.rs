use std::fmt::{self, Display};

use itertools::Itertools;
use smallvec::SmallVec;

use crate::node::Node;

/// Child indices leading from the traversal start to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(SmallVec<[usize; 8]>);

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn join(&self, other: &Path) -> Self {
        let mut path = self.0.clone();
        path.extend_from_slice(&other.0);
        Self(path)
    }

    /// Number of ancestors between the traversal start and the node.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_top_level(&self) -> bool {
        self.0.len() == 1
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(value: Vec<usize>) -> Self {
        Self(value.into())
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.iter().join("/"))
    }
}

/// Lazy pre-order iterator over a subtree. A clone resumes independently
/// from the same point.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(&'a Node, Path)>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(node: &'a Node) -> Self {
        Self {
            stack: vec![(node, Path::new())],
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (&'a Node, Path);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, path) = self.stack.pop()?;

        self.stack.extend(
            node.children()
                .iter()
                .enumerate()
                .rev()
                .map(|(i, child)| (child, path.child(i))),
        );

        Some((node, path))
    }
}
