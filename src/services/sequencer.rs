//! Pure sequence math for dense, 1-based sibling ordering (modules within a
//! program, content items within a module, questions within an assessment).
//! Functions here only compute renumbering plans; the owning repository
//! applies a plan as one atomic unit.

use crate::errors::{AppError, AppResult};

/// One sibling's new sequence number, to be written by the repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceUpdate {
    pub id: String,
    pub sequence_number: i32,
}

/// Sequence number for a newly created child: max + 1, or 1 with no siblings.
pub fn next_sequence(existing: &[i32]) -> i32 {
    existing.iter().copied().max().unwrap_or(0) + 1
}

/// Plan for moving `item_id` to `new_position` among its siblings.
///
/// `siblings` is the full `(id, sequence_number)` set for one parent, in any
/// order. The target position is clamped to `[1, len]`; a move that lands on
/// the item's current position yields an empty plan (no-op success). Siblings
/// strictly between the old and new positions shift by one, the moved item
/// takes `new_position`, and everything outside the window is untouched.
pub fn reorder_plan(
    siblings: &[(String, i32)],
    item_id: &str,
    new_position: i32,
) -> AppResult<Vec<SequenceUpdate>> {
    let current = siblings
        .iter()
        .find(|(id, _)| id == item_id)
        .map(|(_, seq)| *seq)
        .ok_or_else(|| AppError::NotFound(format!("item '{}' not found among siblings", item_id)))?;

    let count = siblings.len() as i32;
    let target = new_position.clamp(1, count);

    if target == current {
        return Ok(Vec::new());
    }

    let mut updates = Vec::new();
    for (id, seq) in siblings {
        if id == item_id {
            continue;
        }
        // Moving down: (current, target] decrement. Moving up: [target, current) increment.
        if target > current && *seq > current && *seq <= target {
            updates.push(SequenceUpdate {
                id: id.clone(),
                sequence_number: seq - 1,
            });
        } else if target < current && *seq >= target && *seq < current {
            updates.push(SequenceUpdate {
                id: id.clone(),
                sequence_number: seq + 1,
            });
        }
    }

    updates.push(SequenceUpdate {
        id: item_id.to_string(),
        sequence_number: target,
    });

    Ok(updates)
}

/// Renumbers the remaining siblings to 1..count after a deletion, preserving
/// their current relative order. Only changed rows appear in the plan.
pub fn close_gap_plan(siblings: &[(String, i32)]) -> Vec<SequenceUpdate> {
    let mut ordered: Vec<&(String, i32)> = siblings.iter().collect();
    ordered.sort_by_key(|(_, seq)| *seq);

    ordered
        .iter()
        .enumerate()
        .filter_map(|(index, (id, seq))| {
            let expected = index as i32 + 1;
            (*seq != expected).then(|| SequenceUpdate {
                id: id.clone(),
                sequence_number: expected,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn siblings(seqs: &[i32]) -> Vec<(String, i32)> {
        seqs.iter()
            .map(|s| (format!("item-{}", s), *s))
            .collect()
    }

    fn apply(siblings: &mut Vec<(String, i32)>, plan: &[SequenceUpdate]) {
        for update in plan {
            let entry = siblings
                .iter_mut()
                .find(|(id, _)| *id == update.id)
                .expect("plan references a known sibling");
            entry.1 = update.sequence_number;
        }
    }

    fn assert_dense(siblings: &[(String, i32)]) {
        let mut seqs: Vec<i32> = siblings.iter().map(|(_, s)| *s).collect();
        seqs.sort_unstable();
        let expected: Vec<i32> = (1..=siblings.len() as i32).collect();
        assert_eq!(seqs, expected, "sequence numbers must be exactly 1..count");
    }

    #[test]
    fn next_sequence_starts_at_one() {
        assert_eq!(next_sequence(&[]), 1);
        assert_eq!(next_sequence(&[1, 2, 3]), 4);
        assert_eq!(next_sequence(&[2, 5]), 6);
    }

    #[test]
    fn move_down_shifts_window_left() {
        // Move item at position 1 to position 3 of 4.
        let mut items = siblings(&[1, 2, 3, 4]);
        let plan = reorder_plan(&items, "item-1", 3).expect("plan should build");
        apply(&mut items, &plan);

        assert_dense(&items);
        let seq_of = |id: &str| items.iter().find(|(i, _)| i == id).unwrap().1;
        assert_eq!(seq_of("item-1"), 3);
        assert_eq!(seq_of("item-2"), 1);
        assert_eq!(seq_of("item-3"), 2);
        assert_eq!(seq_of("item-4"), 4);
    }

    #[test]
    fn move_up_shifts_window_right() {
        // Move item at position 4 to position 2 of 4.
        let mut items = siblings(&[1, 2, 3, 4]);
        let plan = reorder_plan(&items, "item-4", 2).expect("plan should build");
        apply(&mut items, &plan);

        assert_dense(&items);
        let seq_of = |id: &str| items.iter().find(|(i, _)| i == id).unwrap().1;
        assert_eq!(seq_of("item-4"), 2);
        assert_eq!(seq_of("item-1"), 1);
        assert_eq!(seq_of("item-2"), 3);
        assert_eq!(seq_of("item-3"), 4);
    }

    #[test]
    fn out_of_range_position_is_clamped() {
        let mut items = siblings(&[1, 2, 3]);
        let plan = reorder_plan(&items, "item-1", 99).expect("plan should build");
        apply(&mut items, &plan);

        assert_dense(&items);
        assert_eq!(items.iter().find(|(i, _)| i == "item-1").unwrap().1, 3);

        let plan = reorder_plan(&items, "item-2", -5).expect("plan should build");
        apply(&mut items, &plan);
        assert_dense(&items);
    }

    #[test]
    fn move_to_current_position_is_a_noop() {
        let items = siblings(&[1, 2, 3]);
        let plan = reorder_plan(&items, "item-2", 2).expect("plan should build");
        assert!(plan.is_empty());
    }

    #[test]
    fn unknown_item_is_not_found() {
        let items = siblings(&[1, 2]);
        let err = reorder_plan(&items, "ghost", 1).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn close_gap_renumbers_in_relative_order() {
        // Position 2 of 4 was deleted.
        let mut items = vec![
            ("a".to_string(), 1),
            ("c".to_string(), 3),
            ("d".to_string(), 4),
        ];
        let plan = close_gap_plan(&items);
        apply(&mut items, &plan);

        assert_dense(&items);
        assert_eq!(items[0], ("a".to_string(), 1));
        assert_eq!(items[1], ("c".to_string(), 2));
        assert_eq!(items[2], ("d".to_string(), 3));
    }

    #[test]
    fn close_gap_on_already_dense_set_is_empty() {
        let items = siblings(&[1, 2, 3]);
        assert!(close_gap_plan(&items).is_empty());
    }

    #[test]
    fn density_holds_under_random_operation_sequence() {
        let mut items: Vec<(String, i32)> = Vec::new();

        // Inserts.
        for n in 0..6 {
            let seqs: Vec<i32> = items.iter().map(|(_, s)| *s).collect();
            items.push((format!("n{}", n), next_sequence(&seqs)));
        }
        assert_dense(&items);

        // Interleaved reorders and deletes.
        let plan = reorder_plan(&items, "n0", 5).unwrap();
        apply(&mut items, &plan);
        assert_dense(&items);

        items.retain(|(id, _)| id != "n3");
        let plan = close_gap_plan(&items);
        apply(&mut items, &plan);
        assert_dense(&items);

        let plan = reorder_plan(&items, "n5", 1).unwrap();
        apply(&mut items, &plan);
        assert_dense(&items);

        items.retain(|(id, _)| id != "n5");
        let plan = close_gap_plan(&items);
        apply(&mut items, &plan);
        assert_dense(&items);
    }
}
