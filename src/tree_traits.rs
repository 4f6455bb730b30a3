use termtree::Tree;

use crate::mug::Mug;
use crate::structure::Structure;
use crate::tree::Tree as QuestionTree;

/// Rendering into a `termtree` for terminal display.
pub trait ToTermTree {
    fn to_term_tree(&self) -> Tree<String>;
}

impl ToTermTree for Structure {
    fn to_term_tree(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_term_tree()).collect();
        Tree::new(self.id.clone()).with_leaves(leaves)
    }
}

impl<M: Mug> ToTermTree for QuestionTree<M> {
    fn to_term_tree(&self) -> Tree<String> {
        let mut structure = self.structure();
        if structure.id.is_empty() {
            structure.id = "/".to_string();
        }
        structure.to_term_tree()
    }
}
