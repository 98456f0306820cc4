/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum Error<K>
where
    K: Clone + Ord,
{
    /// Operation requires at least one entry, tree is empty. Returned
    /// by min(), max(), delete_min() and delete_max().
    EmptyTree,
    /// Returned by select(k) when k is outside `[0, len)`. Carries
    /// the requested rank and the current number of entries.
    IndexOutOfRange(usize, usize),
    /// Returned by create() API when key is already present.
    OverwriteKey,
    /// Fatal case, breaking one of the two LLRB rules.
    ConsecutiveReds,
    /// Fatal case, a red right link without a red left sibling. Red
    /// links must lean left once fix-up completes.
    RightLeaningRed,
    /// Fatal case, breaking one of the two LLRB rules. The String
    /// component of this variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order.
    SortError(K, K),
    /// Fatal case, a node's cached subtree size disagrees with its
    /// children. The String component can be used for debugging.
    SizeMismatch(String),
}
