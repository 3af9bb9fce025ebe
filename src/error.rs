use thiserror::Error;

/// Why [`KeyedTree::try_remove`](crate::KeyedTree::try_remove) did not remove anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoveError {
    /// The tree has no root. Calling `remove` in this state is a contract violation.
    #[error("remove called on an empty tree")]
    EmptyTree,
    /// The tree is populated but holds no value under the requested key.
    #[error("key not found")]
    KeyNotFound,
}

/// A broken structural invariant reported by [`KeyedTree::check`](crate::KeyedTree::check).
///
/// Slots are arena indices; they are only meaningful for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("sentinel slot 0 holds a value or has children")]
    SentinelTouched,
    #[error("root slot {0} is red")]
    RedRoot(u32),
    #[error("slot {0} is linked into the tree but holds no value")]
    VacantNode(u32),
    #[error("slot {0} is out of key order")]
    OutOfOrder(u32),
    #[error("slot {0} has a red right link")]
    RedRightLink(u32),
    #[error("slot {0} and its left child are both red")]
    DoubleRed(u32),
    #[error("slot {slot} has black height {left} on the left and {right} on the right")]
    BlackImbalance { slot: u32, left: usize, right: usize },
    #[error("slot {0} is both reachable and on the free list")]
    FreeSlotReachable(u32),
    #[error("free slot {0} still holds a value")]
    FreeSlotOccupied(u32),
    #[error("{reachable} reachable nodes but len is {len}")]
    CountMismatch { reachable: usize, len: usize },
}
