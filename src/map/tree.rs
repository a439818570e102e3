//! Persistent red-black tree underlying [`CarbonatedMap`](super::CarbonatedMap).
//!
//! Crate-private: the public surface charges gas before reaching anything
//! here. Mutations copy the root-to-target path and share every untouched
//! subtree between the old and new version. Entry counting lives in the
//! wrapping map, not in the tree.

use smallvec::SmallVec;
use std::cmp::Ordering;

use super::ReferenceCounter;

/// Inline capacity of the iterator's traversal stack; enough for the spine
/// of trees well past a million entries.
const SPINE_DEPTH: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

type Link<K, V> = Option<ReferenceCounter<Node<K, V>>>;

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    /// A fresh red leaf node.
    const fn red(key: K, value: V) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
        }
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    fn recolored(&self, color: Color) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            color,
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }

    fn with_links(&self, left: Link<K, V>, right: Link<K, V>) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            color: self.color,
            left,
            right,
        }
    }
}

fn is_red<K, V>(link: &Link<K, V>) -> bool {
    link.as_ref()
        .is_some_and(|node| matches!(node.color, Color::Red))
}

/// A persistent red-black tree.
#[derive(Clone)]
pub(crate) struct Tree<K, V> {
    root: Link<K, V>,
}

impl<K, V> Tree<K, V> {
    pub(crate) const fn new() -> Self {
        Self { root: None }
    }

    /// In-order iterator over the entries, ascending by key.
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: SmallVec::new(),
        };
        iter.descend(&self.root);
        iter
    }
}

impl<K: Ord, V> Tree<K, V> {
    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        let mut cursor = self.root.as_ref();
        while let Some(node) = cursor {
            match key.cmp(&node.key) {
                Ordering::Less => cursor = node.left.as_ref(),
                Ordering::Greater => cursor = node.right.as_ref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }
}

impl<K: Ord + Clone, V: Clone> Tree<K, V> {
    /// Inserts or replaces a binding. The flag reports whether `key` was
    /// absent before.
    pub(crate) fn insert(&self, key: K, value: V) -> (Self, bool) {
        let (root, added) = insert_link(&self.root, key, value);
        (Self { root: blacken(root) }, added)
    }

    /// Removes the binding for `key`.
    ///
    /// Callers must have already observed `key` in the tree; the wrapping
    /// map's size bookkeeping depends on it.
    pub(crate) fn remove(&self, key: &K) -> Self {
        Self {
            root: blacken(remove_link(&self.root, key)),
        }
    }
}

fn blacken<K: Clone, V: Clone>(link: Link<K, V>) -> Link<K, V> {
    link.map(|node| {
        if matches!(node.color, Color::Red) {
            ReferenceCounter::new(node.recolored(Color::Black))
        } else {
            node
        }
    })
}

fn insert_link<K: Ord + Clone, V: Clone>(
    link: &Link<K, V>,
    key: K,
    value: V,
) -> (Link<K, V>, bool) {
    let Some(node) = link else {
        return (Some(ReferenceCounter::new(Node::red(key, value))), true);
    };
    match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, added) = insert_link(&node.left, key, value);
            let rebuilt = node.with_links(left, node.right.clone());
            (Some(ReferenceCounter::new(balance(rebuilt))), added)
        }
        Ordering::Greater => {
            let (right, added) = insert_link(&node.right, key, value);
            let rebuilt = node.with_links(node.left.clone(), right);
            (Some(ReferenceCounter::new(balance(rebuilt))), added)
        }
        Ordering::Equal => {
            let replaced = Node {
                key,
                value,
                color: node.color,
                left: node.left.clone(),
                right: node.right.clone(),
            };
            (Some(ReferenceCounter::new(replaced)), false)
        }
    }
}

/// Repairs the four red-red violations a bottom-up insertion can introduce.
fn balance<K: Clone, V: Clone>(node: Node<K, V>) -> Node<K, V> {
    // Left-left: red left child with a red left grandchild.
    if is_red(&node.left)
        && let Some(left) = &node.left
        && is_red(&left.left)
    {
        return rotate_right_recolored(node);
    }

    // Left-right: red left child with a red right grandchild.
    if is_red(&node.left)
        && let Some(left) = &node.left
        && is_red(&left.right)
    {
        let lifted = rotate_left((**left).clone());
        let rebuilt = node.with_links(Some(ReferenceCounter::new(lifted)), node.right.clone());
        return rotate_right_recolored(rebuilt);
    }

    // Right-right: red right child with a red right grandchild.
    if is_red(&node.right)
        && let Some(right) = &node.right
        && is_red(&right.right)
    {
        return rotate_left_recolored(node);
    }

    // Right-left: red right child with a red left grandchild.
    if is_red(&node.right)
        && let Some(right) = &node.right
        && is_red(&right.left)
    {
        let lifted = rotate_right((**right).clone());
        let rebuilt = node.with_links(node.left.clone(), Some(ReferenceCounter::new(lifted)));
        return rotate_left_recolored(rebuilt);
    }

    node
}

fn rotate_right<K: Clone, V: Clone>(node: Node<K, V>) -> Node<K, V> {
    let Some(left) = node.left else {
        return node;
    };
    let demoted = Node {
        key: node.key,
        value: node.value,
        color: node.color,
        left: left.right.clone(),
        right: node.right,
    };
    Node {
        key: left.key.clone(),
        value: left.value.clone(),
        color: left.color,
        left: left.left.clone(),
        right: Some(ReferenceCounter::new(demoted)),
    }
}

fn rotate_left<K: Clone, V: Clone>(node: Node<K, V>) -> Node<K, V> {
    let Some(right) = node.right else {
        return node;
    };
    let demoted = Node {
        key: node.key,
        value: node.value,
        color: node.color,
        left: node.left,
        right: right.left.clone(),
    };
    Node {
        key: right.key.clone(),
        value: right.value.clone(),
        color: right.color,
        left: Some(ReferenceCounter::new(demoted)),
        right: right.right.clone(),
    }
}

/// Right rotation that recolors for the left-side red-red cases: the lifted
/// child turns black, the demoted node and the outer grandchild turn red and
/// black respectively.
fn rotate_right_recolored<K: Clone, V: Clone>(node: Node<K, V>) -> Node<K, V> {
    let Some(left) = &node.left else {
        return node;
    };
    let demoted = Node {
        key: node.key.clone(),
        value: node.value.clone(),
        color: Color::Red,
        left: left.right.clone(),
        right: node.right.clone(),
    };
    let outer = left
        .left
        .as_ref()
        .map(|grandchild| ReferenceCounter::new(grandchild.recolored(Color::Black)));
    Node {
        key: left.key.clone(),
        value: left.value.clone(),
        color: Color::Black,
        left: outer,
        right: Some(ReferenceCounter::new(demoted)),
    }
}

/// Mirror of [`rotate_right_recolored`] for the right-side cases.
fn rotate_left_recolored<K: Clone, V: Clone>(node: Node<K, V>) -> Node<K, V> {
    let Some(right) = &node.right else {
        return node;
    };
    let demoted = Node {
        key: node.key.clone(),
        value: node.value.clone(),
        color: Color::Red,
        left: node.left.clone(),
        right: right.left.clone(),
    };
    let outer = right
        .right
        .as_ref()
        .map(|grandchild| ReferenceCounter::new(grandchild.recolored(Color::Black)));
    Node {
        key: right.key.clone(),
        value: right.value.clone(),
        color: Color::Black,
        left: Some(ReferenceCounter::new(demoted)),
        right: outer,
    }
}

/// Removes `key` from the subtree. Double-black repair is omitted: deletions
/// preserve ordering and lookups but may shorten black paths.
fn remove_link<K: Ord + Clone, V: Clone>(link: &Link<K, V>, key: &K) -> Link<K, V> {
    let node = link.as_ref()?;
    match key.cmp(&node.key) {
        Ordering::Less => {
            let left = remove_link(&node.left, key);
            Some(ReferenceCounter::new(
                node.with_links(left, node.right.clone()),
            ))
        }
        Ordering::Greater => {
            let right = remove_link(&node.right, key);
            Some(ReferenceCounter::new(
                node.with_links(node.left.clone(), right),
            ))
        }
        Ordering::Equal => match (&node.left, &node.right) {
            (None, None) => None,
            (Some(left), None) => Some(left.clone()),
            (None, Some(right)) => Some(right.clone()),
            (Some(_), Some(right)) => {
                // Replace with the in-order successor and prune it below.
                let (successor_key, successor_value) = min_entry(right);
                let pruned = remove_link(&node.right, &successor_key);
                Some(ReferenceCounter::new(Node {
                    key: successor_key,
                    value: successor_value,
                    color: node.color,
                    left: node.left.clone(),
                    right: pruned,
                }))
            }
        },
    }
}

fn min_entry<K: Clone, V: Clone>(node: &ReferenceCounter<Node<K, V>>) -> (K, V) {
    let mut cursor = node;
    while let Some(left) = cursor.left.as_ref() {
        cursor = left;
    }
    (cursor.key.clone(), cursor.value.clone())
}

/// In-order iterator holding the path to the next entry on an inline stack.
pub(crate) struct Iter<'a, K, V> {
    stack: SmallVec<[&'a Node<K, V>; SPINE_DEPTH]>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn descend(&mut self, mut link: &'a Link<K, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(&node.right);
        Some((&node.key, &node.value))
    }
}
