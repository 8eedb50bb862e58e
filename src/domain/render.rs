//! Text rendering of a forest via `termtree`.

use termtree::Tree;

use crate::domain::arena::{Forest, TreeNode};

pub trait TreeDisplay {
    /// One `termtree` per root, labelled `name [id]`.
    fn to_tree_strings(&self) -> Vec<Tree<String>>;
}

impl TreeDisplay for Forest {
    fn to_tree_strings(&self) -> Vec<Tree<String>> {
        fn build_tree(forest: &Forest, node: &TreeNode) -> Tree<String> {
            let leaves: Vec<_> = forest
                .children(node)
                .map(|child| build_tree(forest, child))
                .collect();
            Tree::new(format!("{} [{}]", node.name(), node.id)).with_leaves(leaves)
        }

        self.roots().map(|root| build_tree(self, root)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GroupPayload;

    #[test]
    fn given_two_level_forest_when_rendering_then_children_are_nested() {
        let mut forest = Forest::new();
        forest.insert("1", GroupPayload::named("Org"), None).unwrap();
        forest.insert("1-1", GroupPayload::named("Team"), Some("1")).unwrap();

        let trees = forest.to_tree_strings();
        assert_eq!(trees.len(), 1);
        let text = trees[0].to_string();
        assert!(text.starts_with("Org [1]"));
        assert!(text.contains("Team [1-1]"));
    }
}
