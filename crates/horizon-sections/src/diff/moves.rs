//! Minimal move pairing.

/// Returns the positions in `values` of one longest strictly increasing
/// subsequence, in ascending order.
///
/// Patience sorting with predecessor links, `O(n log n)`. Ties between
/// subsequences of equal length resolve to the one ending earliest.
pub(crate) fn longest_increasing_subsequence(values: &[usize]) -> Vec<usize> {
    // tails[k] is the position of the smallest tail of an increasing run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (position, &value) in values.iter().enumerate() {
        let k = tails.partition_point(|&tail| values[tail] < value);
        if k > 0 {
            previous[position] = Some(tails[k - 1]);
        }
        if k == tails.len() {
            tails.push(position);
        } else {
            tails[k] = position;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        result.push(position);
        cursor = previous[position];
    }
    result.reverse();
    result
}
