//! Item ordering primitives

use std::collections::HashSet;

use crate::item_ref::ItemRef;
use crate::portfolio::TextSection;

/// References every live entity should have, repos first then text sections
pub fn expected_refs(pinned_repos: &[u64], sections: &[TextSection]) -> Vec<ItemRef> {
    pinned_repos
        .iter()
        .map(|id| ItemRef::Repo(*id))
        .chain(sections.iter().map(TextSection::item_ref))
        .collect()
}

/// Bring `previous` in line with the current pinned repos and text sections.
///
/// Surviving references keep their relative order, references to removed
/// entities are dropped and new entities are appended in entity-list order.
/// When `previous` already holds exactly the expected references it is
/// returned untouched.
pub fn reconcile_order(
    pinned_repos: &[u64],
    sections: &[TextSection],
    previous: &[ItemRef],
) -> Vec<ItemRef> {
    let expected = expected_refs(pinned_repos, sections);
    let expected_set: HashSet<ItemRef> = expected.iter().copied().collect();

    let mut seen = HashSet::with_capacity(previous.len());
    let no_duplicates = previous.iter().all(|r| seen.insert(*r));
    if no_duplicates && seen == expected_set {
        return previous.to_vec();
    }

    let mut placed = HashSet::with_capacity(expected.len());
    let mut order: Vec<ItemRef> = previous
        .iter()
        .copied()
        .filter(|r| expected_set.contains(r) && placed.insert(*r))
        .collect();

    let kept = order.len();
    order.extend(expected.into_iter().filter(|r| placed.insert(*r)));

    tracing::debug!(
        "Reconciled item order: kept {}, appended {}, dropped {}",
        kept,
        order.len() - kept,
        previous.len() - kept
    );

    order
}

/// Move one element from `from` to `to`, shifting the ones in between.
///
/// Returns `false` and leaves `items` alone when the indices are equal or
/// either is out of bounds.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(ids: &[u64]) -> Vec<TextSection> {
        ids.iter().map(|id| TextSection::placeholder(*id)).collect()
    }

    #[test]
    fn test_empty_previous_initialises_in_entity_order() {
        let order = reconcile_order(&[3, 1], &sections(&[7]), &[]);
        assert_eq!(
            order,
            vec![ItemRef::Repo(3), ItemRef::Repo(1), ItemRef::Text(7)]
        );
    }

    #[test]
    fn test_matching_set_is_returned_unchanged() {
        let previous = vec![ItemRef::Text(7), ItemRef::Repo(1), ItemRef::Repo(3)];
        let order = reconcile_order(&[3, 1], &sections(&[7]), &previous);
        assert_eq!(order, previous);
    }

    #[test]
    fn test_keeps_relative_order_and_appends_new() {
        let previous = vec![ItemRef::Text(7), ItemRef::Repo(9), ItemRef::Repo(1)];
        let order = reconcile_order(&[1, 4], &sections(&[7, 8]), &previous);
        assert_eq!(
            order,
            vec![
                ItemRef::Text(7),
                ItemRef::Repo(1),
                ItemRef::Repo(4),
                ItemRef::Text(8)
            ]
        );
    }

    #[test]
    fn test_drops_duplicates_and_foreign_refs() {
        let previous = vec![
            ItemRef::Repo(1),
            ItemRef::Stat(crate::portfolio::StatId::Stars),
            ItemRef::Repo(1),
            ItemRef::Text(2),
        ];
        let order = reconcile_order(&[1], &sections(&[2]), &previous);
        assert_eq!(order, vec![ItemRef::Repo(1), ItemRef::Text(2)]);
    }

    #[test]
    fn test_result_covers_exactly_the_entities() {
        let cases: Vec<(Vec<u64>, Vec<u64>, Vec<ItemRef>)> = vec![
            (vec![], vec![], vec![ItemRef::Repo(5)]),
            (vec![5, 6], vec![], vec![ItemRef::Repo(6)]),
            (
                vec![1],
                vec![10, 11],
                vec![ItemRef::Text(11), ItemRef::Text(11), ItemRef::Repo(2)],
            ),
        ];

        for (pinned, text_ids, previous) in cases {
            let sections = sections(&text_ids);
            let order = reconcile_order(&pinned, &sections, &previous);

            let got: HashSet<ItemRef> = order.iter().copied().collect();
            let want: HashSet<ItemRef> = expected_refs(&pinned, &sections).into_iter().collect();
            assert_eq!(got, want);
            assert_eq!(got.len(), order.len());
        }
    }

    #[test]
    fn test_move_item() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        assert!(move_item(&mut items, 0, 2));
        assert_eq!(items, vec!['b', 'c', 'a', 'd']);

        assert!(move_item(&mut items, 3, 0));
        assert_eq!(items, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn test_move_item_noops() {
        let mut items = vec![1, 2, 3];
        assert!(!move_item(&mut items, 1, 1));
        assert!(!move_item(&mut items, 3, 0));
        assert!(!move_item(&mut items, 0, 3));
        assert_eq!(items, vec![1, 2, 3]);
    }
}
