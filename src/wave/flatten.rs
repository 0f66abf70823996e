// ---------------------------------------------------------------------------
// LabelNode – ragged nested label structure
// ---------------------------------------------------------------------------

/// A label tree as stored by the container: one sequence per dimension, one
/// leaf per label slot.  Depth may vary between siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelNode<T> {
    Leaf(T),
    Seq(Vec<LabelNode<T>>),
}

// ---------------------------------------------------------------------------
// Sentinel test
// ---------------------------------------------------------------------------

/// Leaves for which this returns `true` are unused label slots and are
/// dropped by [`flatten`].
pub trait IsEmptyLabel {
    fn is_empty_label(&self) -> bool;
}

impl IsEmptyLabel for String {
    fn is_empty_label(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmptyLabel for &str {
    fn is_empty_label(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmptyLabel for Vec<u8> {
    fn is_empty_label(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmptyLabel for &[u8] {
    fn is_empty_label(&self) -> bool {
        self.is_empty()
    }
}

/// `None` is the null sentinel.
impl<T: IsEmptyLabel> IsEmptyLabel for Option<T> {
    fn is_empty_label(&self) -> bool {
        match self {
            Some(v) => v.is_empty_label(),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Flatten a sequence of label nodes depth-first, left to right, dropping
/// empty leaves.
pub fn flatten<T: IsEmptyLabel>(nodes: Vec<LabelNode<T>>) -> Vec<T> {
    let mut out = Vec::new();
    for node in nodes {
        flatten_into(node, &mut out);
    }
    out
}

fn flatten_into<T: IsEmptyLabel>(node: LabelNode<T>, out: &mut Vec<T>) {
    match node {
        LabelNode::Leaf(v) => {
            if !v.is_empty_label() {
                out.push(v);
            }
        }
        LabelNode::Seq(children) => {
            for child in children {
                flatten_into(child, out);
            }
        }
    }
}
