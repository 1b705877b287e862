use crate::test_utils::*;
use crate::{BoundaryElement, BoxId, DistributorStack, LayoutCoord, LayoutError};
use crate::{BreakPolicy, Distributor, DistributorConfig};

#[test]
fn balanced_content_fills_columns_evenly() {
    let dist = distribute(columns(3, 300), Vec::new(), &[10; 30]);
    let rows = dist.rows();

    assert_eq!(rows.len(), 1);
    assert_eq!(heights(rows), vec![100, 100, 100]);
    assert_eq!(starts(rows), vec![0, 100, 200]);
    assert_eq!(rows.first().unwrap().height(), 100);
}

#[test]
fn columns_are_placed_side_by_side() {
    let dist = distribute(columns(3, 300), Vec::new(), &[10; 30]);
    let xs: Vec<LayoutCoord> = all_columns(dist.rows()).iter().map(|c| c.x()).collect();
    let translations: Vec<LayoutCoord> = all_columns(dist.rows())
        .iter()
        .map(|c| c.translation_y())
        .collect();

    assert_eq!(xs, vec![0, 110, 220]);
    assert_eq!(translations, vec![0, -100, -200]);
}

#[test]
fn right_to_left_columns_are_mirrored() {
    let config = DistributorConfig {
        rtl: true,
        ..columns(3, 300)
    };
    let dist = distribute(config, Vec::new(), &[10; 30]);
    let xs: Vec<LayoutCoord> = all_columns(dist.rows()).iter().map(|c| c.x()).collect();

    assert_eq!(xs, vec![220, 110, 0]);
}

#[test]
fn explicit_breaks_disable_balancing() {
    init_logs();
    let config = columns(3, 300);
    let mut stack = DistributorStack::new(Distributor::new(config, column_breaks(&[50, 200]), Vec::new()));

    let mut flow = Flow::new(&mut stack);
    flow.blocks(&[50]).column_break();
    flow.blocks(&[150]).column_break();
    flow.blocks(&[100]).finish();

    let dist = stack.into_root().unwrap();
    let rows = dist.rows();
    let cols = all_columns(rows);

    assert_eq!(heights(rows), vec![50, 150, 100]);
    assert_eq!(rows.first().unwrap().height(), 150);
    assert_eq!(cols[0].stop_element(), Some(BoundaryElement::block(BoxId::new(2))));
    assert!(cols[0].excludes_stop_element());
    assert_eq!(cols[1].start_element(), Some(BoundaryElement::block(BoxId::new(2))));
    assert_eq!(cols[2].start_element(), Some(BoundaryElement::block(BoxId::new(3))));
}

#[test]
fn columns_stretch_once_to_fit_content() {
    init_logs();
    let mut stack = DistributorStack::new(Distributor::new(columns(3, 310), Vec::new(), Vec::new()));
    Flow::new(&mut stack).lines(31, 10).finish();

    let dist = stack.into_root().unwrap();

    // (310 + 2) / 3 = 104 to start with; the first column stretches to fit
    // one more line.
    assert_eq!(dist.initial_row_height(), 104);
    assert_eq!(heights(dist.rows()), vec![110, 110, 90]);
}

#[test]
fn balanced_heights_round_up() {
    init_logs();
    let mut stack = DistributorStack::new(Distributor::new(columns(3, 310), Vec::new(), Vec::new()));
    Flow::new(&mut stack).lines(310, 1).finish();

    let dist = stack.into_root().unwrap();
    let heights = heights(dist.rows());
    let ceil = (310 + 2) / 3;

    assert_eq!(heights.len(), 3);
    assert!(heights.iter().all(|&h| h <= ceil));
    assert_eq!(heights.iter().sum::<LayoutCoord>(), 310);
    assert_eq!(heights, vec![104, 104, 102]);
}

#[test]
fn last_column_stretches_without_limit() {
    // The virtual height estimate is too low; the last column takes the rest.
    let dist = distribute(columns(2, 100), Vec::new(), &[10; 20]);

    assert_eq!(heights(dist.rows()), vec![50, 150]);
    assert_eq!(dist.rows().first().unwrap().height(), 150);
    assert!(!dist.reached_max_height());
}

#[test]
fn restricted_height_overflows_into_extra_columns() {
    let config = DistributorConfig {
        max_height: 60,
        height_restricted: true,
        ..columns(2, 300)
    };
    let dist = distribute(config, Vec::new(), &[10; 30]);
    let xs: Vec<LayoutCoord> = all_columns(dist.rows()).iter().map(|c| c.x()).collect();

    assert_eq!(heights(dist.rows()), vec![60; 5]);
    assert_eq!(xs, vec![0, 110, 220, 330, 440]);
    assert!(dist.reached_max_height());
}

#[test]
fn max_height_overflows_into_extra_columns() {
    // Overflow columns are not tied to a definite height; a max height is
    // enough.
    let config = DistributorConfig {
        max_height: 60,
        ..columns(2, 300)
    };
    let dist = distribute(config, Vec::new(), &[10; 30]);
    let counts: Vec<usize> = dist.rows().iter().map(|row| row.column_count()).collect();
    let heights = heights(dist.rows());

    assert_eq!(counts, vec![5]);
    assert!(heights.iter().all(|&h| h <= 60));
    assert_eq!(heights.iter().sum::<LayoutCoord>(), 300);
    assert!(dist.reached_max_height());
}

#[test]
fn column_count_bounds_unrestricted_rows() {
    for count in 1..=4u32 {
        let dist = distribute(columns(count, 400), Vec::new(), &[10; 40]);

        for row in dist.rows().iter() {
            assert!(row.column_count() <= count as usize);
        }
    }
}

#[test]
fn spanned_element_gets_a_row_of_its_own() {
    init_logs();
    let spanned_id = BoxId::new(500);
    let (breakpoints, spanned) = spanned_plan(&[(spanned_id, 120, 10, 10)]);
    let mut stack = DistributorStack::new(Distributor::new(columns(3, 290), breakpoints, spanned));

    let mut flow = Flow::new(&mut stack);
    flow.lines(12, 10);
    flow.spanned(spanned_id, 10, 50, 10);
    flow.lines(10, 10);
    flow.finish();

    let dist = stack.into_root().unwrap();
    let rows: Vec<_> = dist.rows().iter().collect();

    assert_eq!(rows.len(), 3);

    // Content before the spanned element covers [0, 120).
    assert_eq!(rows[0].position(), 0);
    assert_eq!(rows[0].column_count(), 3);
    assert_eq!(rows[0].height(), 40);
    let last = rows[0].last_column().unwrap();
    assert_eq!(last.virtual_y() + last.height(), 120);
    assert_eq!(last.stop_element(), Some(BoundaryElement::block(spanned_id)));
    assert!(last.excludes_stop_element());

    // The spanned element, below its top margin.
    assert_eq!(rows[1].position(), 50);
    assert_eq!(rows[1].column_count(), 1);
    assert_eq!(rows[1].height(), 50);
    let span = rows[1].first_column().unwrap();
    assert_eq!(span.virtual_y(), 130);
    assert_eq!(span.start_element(), Some(BoundaryElement::block(spanned_id)));

    // Columns resume below its bottom margin.
    assert_eq!(rows[2].position(), 110);
    assert_eq!(rows[2].first_column().unwrap().virtual_y(), 190);
    assert_eq!(rows[2].column_count(), 3);
    assert!(!dist.is_span_all());
}

#[test]
fn adjacent_spanned_margins_collapse() {
    init_logs();
    let first = BoxId::new(500);
    let second = BoxId::new(501);
    let (breakpoints, spanned) = spanned_plan(&[(first, 30, 0, 20), (second, 110, 30, 0)]);
    let mut stack = DistributorStack::new(Distributor::new(columns(2, 200), breakpoints, spanned));

    let mut flow = Flow::new(&mut stack);
    flow.lines(3, 10);
    flow.spanned(first, 0, 50, 20);
    flow.spanned(second, 30, 40, 0);
    flow.finish();

    let dist = stack.into_root().unwrap();
    let rows: Vec<_> = dist.rows().iter().collect();

    // 20 and 30 collapse to 30.
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].position(), 20);
    assert_eq!(rows[2].position(), 20 + 50 + 30);

    // Virtual 130 is the top of the third row.
    let column = rows[2].first_column().unwrap();
    assert_eq!(column.virtual_y(), 130);
    assert_eq!(column.translation_y(), -130);
}

#[test]
fn spanned_elements_must_arrive_in_order() {
    init_logs();
    let (breakpoints, spanned) = spanned_plan(&[(BoxId::new(500), 0, 0, 0)]);
    let mut stack = DistributorStack::new(Distributor::new(columns(2, 100), breakpoints, spanned));

    let result = stack.enter_spanned_box(BoxId::new(501), 0, BreakPolicy::Allow);
    assert!(matches!(result, Err(LayoutError::EventOrder(_))));

    stack.skip_spanned_box(BoxId::new(500)).unwrap();
    let result = stack.skip_spanned_box(BoxId::new(500));
    assert!(matches!(result, Err(LayoutError::EventOrder(_))));
}

#[test]
fn empty_block_is_split_over_columns() {
    init_logs();
    let mut stack = DistributorStack::new(Distributor::new(columns(2, 200), Vec::new(), Vec::new()));
    stack.add_empty_block_content(BoxId::new(1), 200).unwrap();
    stack.finalize(false).unwrap();

    let dist = stack.into_root().unwrap();
    let cols = all_columns(dist.rows());

    assert_eq!(heights(dist.rows()), vec![100, 100]);
    assert_eq!(cols[1].start_offset(), 100);
    assert_eq!(cols[1].start_element(), Some(BoundaryElement::block(BoxId::new(1))));
}

#[test]
fn cursors_never_run_backwards() {
    init_logs();
    let mut stack = DistributorStack::new(Distributor::new(columns(3, 300), Vec::new(), Vec::new()));
    let mut y = 0;

    for id in 1..=30 {
        stack
            .allocate_content(y, BoundaryElement::block(BoxId::new(id)), 0)
            .unwrap();
        y += 10;
        stack.advance_head(y).unwrap();

        let before = stack.innermost().unwrap().cursors();
        stack.commit_content(true).unwrap();
        let after = stack.innermost().unwrap().cursors();

        assert!(after.committed_virtual_y <= after.pending_virtual_y_start);
        assert!(after.pending_virtual_y_start <= after.virtual_y);
        assert!(after.committed_virtual_y >= before.committed_virtual_y);
        assert!(after.virtual_y >= before.virtual_y);
    }
}

fn assert_cursors_ordered(stack: &DistributorStack) {
    let cursors = stack.innermost().unwrap().cursors();
    assert!(cursors.committed_virtual_y <= cursors.pending_virtual_y_start, "{:?}", cursors);
    assert!(cursors.pending_virtual_y_start <= cursors.virtual_y, "{:?}", cursors);
}

#[test]
fn cursors_stay_ordered_across_margin_gaps() {
    init_logs();
    let mut stack = DistributorStack::new(Distributor::new(columns(3, 600), Vec::new(), Vec::new()));
    let mut y = 0;

    for id in 1..=20 {
        stack
            .allocate_content(y, BoundaryElement::block(BoxId::new(id)), 0)
            .unwrap();
        assert_cursors_ordered(&stack);

        y += 10;
        stack.advance_head(y).unwrap();
        assert_cursors_ordered(&stack);

        stack.commit_content(true).unwrap();
        assert_cursors_ordered(&stack);

        // Bottom margin before the next block.
        y += 20;
    }

    stack.finalize(false).unwrap();
    let dist = stack.into_root().unwrap();
    assert!(all_columns(dist.rows()).len() <= 3);
}

#[test]
fn earliest_break_position_holds_back_commits() {
    init_logs();
    let mut stack = DistributorStack::new(Distributor::new(columns(2, 100), Vec::new(), Vec::new()));

    stack.set_earliest_break_position(40).unwrap();
    stack
        .allocate_content(0, BoundaryElement::block(BoxId::new(1)), 0)
        .unwrap();
    stack.advance_head(20).unwrap();
    stack.commit_content(true).unwrap();

    assert!(stack.innermost().unwrap().current_column().is_none());
    assert_eq!(stack.innermost().unwrap().cursors().committed_virtual_y, 0);

    stack.advance_head(40).unwrap();
    stack.commit_content(true).unwrap();
    assert_eq!(stack.innermost().unwrap().cursors().committed_virtual_y, 40);
}

#[test]
fn replay_is_deterministic() {
    let first = distribute(columns(3, 310), Vec::new(), &[10, 25, 5, 60, 30, 80, 40, 60]);
    let second = distribute(columns(3, 310), Vec::new(), &[10, 25, 5, 60, 30, 80, 40, 60]);

    assert_eq!(first.rows(), second.rows());
    assert_eq!(
        serde_json::to_string(first.rows()).unwrap(),
        serde_json::to_string(second.rows()).unwrap()
    );
}

#[test]
fn finalizing_an_empty_stack_fails() {
    let mut stack = DistributorStack::new(Distributor::new(columns(2, 0), Vec::new(), Vec::new()));
    stack.pop().unwrap();

    assert!(matches!(stack.finalize(false), Err(LayoutError::EventOrder(_))));
}
