use tracing::{debug, trace};

use crate::store::{RecordId, RecordStore};

// Auto scrolling while dragging near the top/bottom of the table surface.
pub const AUTOSCROLL_EDGE: u16 = 2; // rows from the edge
pub const AUTOSCROLL_STEP: usize = 1; // rows shifted per drag tick

/// Moves the dragged record next to the target record, in place.
///
/// Both records are resolved by identity against the current store order.
/// If either does not resolve, or dragged and target are the same record,
/// the gesture is treated as cancelled and the store is left untouched.
///
/// Returns whether the store was mutated.
pub fn reorder(
    store: &mut RecordStore,
    dragged: RecordId,
    target: RecordId,
    drop_above: bool,
) -> bool {
    if dragged == target {
        trace!("Reorder onto itself, ignoring");
        return false;
    }
    let (from, to) = match (store.position_of(dragged), store.position_of(target)) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            debug!(
                "Unresolved reorder reference (dragged {:?}, target {:?}), ignoring",
                dragged, target
            );
            return false;
        }
    };

    let record = store.remove_at(from);
    let mut insert_pos = if drop_above { to } else { to + 1 };
    // Removing an earlier element shifts all later positions down by one,
    // so the target position computed before removal must follow.
    if from < to {
        insert_pos -= 1;
    }
    insert_pos = insert_pos.min(store.len());
    store.insert_at(insert_pos, record);
    debug!(
        "Reordered record {:?}: {} -> {} ({})",
        dragged,
        from,
        insert_pos,
        if drop_above { "above" } else { "below" }
    );
    true
}

/// Pointer-midpoint rule: a drop lands above the target when the pointer
/// released within the upper half of the target row.
pub fn drop_above(pointer_y: u16, row_top: u16, row_height: u16) -> bool {
    (pointer_y.saturating_sub(row_top) as f32) < (row_height.max(1) as f32) / 2.0
}

/// Terminal rows are one cell tall, which degenerates the midpoint rule to
/// "always above". For those the travel direction of the gesture decides:
/// dragging upward drops above the target, dragging downward below it.
pub fn drop_above_by_travel(pointer_y: u16, origin_y: u16) -> bool {
    pointer_y <= origin_y
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeScroll {
    Up,
    Down,
}

/// Auto scroll decision while dragging: near the top edge of the surface
/// scroll up, near the bottom edge scroll down, otherwise nothing.
pub fn edge_scroll(pointer_y: u16, surface_top: u16, surface_bottom: u16) -> Option<EdgeScroll> {
    if surface_bottom <= surface_top {
        return None;
    }
    if pointer_y < surface_top.saturating_add(AUTOSCROLL_EDGE) {
        Some(EdgeScroll::Up)
    } else if pointer_y.saturating_add(AUTOSCROLL_EDGE) > surface_bottom {
        Some(EdgeScroll::Down)
    } else {
        None
    }
}

/// Drag gesture state machine: Idle -> Dragging -> {Dropped, Cancelled} -> Idle.
///
/// The gesture state is owned by the model and driven from mouse messages,
/// there are no shared references spanning handler invocations. The hover
/// decoration is part of the state so every path out of `Dragging` clears it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: RecordId,
        origin_y: u16,
        hover: Option<RecordId>,
    },
}

impl DragState {
    pub fn begin(source: RecordId, origin_y: u16) -> Self {
        trace!("Drag started on {:?} at y={}", source, origin_y);
        DragState::Dragging {
            source,
            origin_y,
            hover: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn source(&self) -> Option<RecordId> {
        match self {
            DragState::Dragging { source, .. } => Some(*source),
            DragState::Idle => None,
        }
    }

    pub fn hover(&self) -> Option<RecordId> {
        match self {
            DragState::Dragging { hover, .. } => *hover,
            DragState::Idle => None,
        }
    }

    /// Updates the hover highlight while dragging. The source row itself is
    /// never a drop candidate.
    pub fn set_hover(&mut self, candidate: Option<RecordId>) {
        if let DragState::Dragging { source, hover, .. } = self {
            *hover = candidate.filter(|c| c != source);
        }
    }

    /// Leaves the gesture, clearing source and hover decoration.
    pub fn finish(&mut self) {
        *self = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_store;

    fn names(store: &RecordStore) -> Vec<&str> {
        store
            .records()
            .iter()
            .map(|r| r.get("Name").unwrap())
            .collect()
    }

    fn id_of(store: &RecordStore, name: &str) -> RecordId {
        store
            .records()
            .iter()
            .find(|r| r.get("Name") == Some(name))
            .unwrap()
            .id()
    }

    #[test]
    fn drag_b_above_a_yields_bac() {
        let mut store = test_store(&["A", "B", "C"]);
        let b = id_of(&store, "B");
        let a = id_of(&store, "A");
        assert!(reorder(&mut store, b, a, true));
        assert_eq!(names(&store), vec!["B", "A", "C"]);
    }

    #[test]
    fn drag_a_below_c_yields_bca() {
        let mut store = test_store(&["A", "B", "C"]);
        let a = id_of(&store, "A");
        let c = id_of(&store, "C");
        assert!(reorder(&mut store, a, c, false));
        assert_eq!(names(&store), vec!["B", "C", "A"]);
    }

    #[test]
    fn drop_above_later_target_lands_just_before_it() {
        // Dragging position i above position j (i < j) ends at j - 1.
        let mut store = test_store(&["A", "B", "C", "D", "E"]);
        let a = id_of(&store, "A");
        let d = id_of(&store, "D");
        assert!(reorder(&mut store, a, d, true));
        assert_eq!(names(&store), vec!["B", "C", "A", "D", "E"]);
        assert_eq!(store.position_of(a), Some(2));
    }

    #[test]
    fn drop_below_later_target_lands_just_after_it() {
        let mut store = test_store(&["A", "B", "C", "D", "E"]);
        let a = id_of(&store, "A");
        let d = id_of(&store, "D");
        assert!(reorder(&mut store, a, d, false));
        assert_eq!(names(&store), vec!["B", "C", "D", "A", "E"]);
        assert_eq!(store.position_of(a), Some(3));
    }

    #[test]
    fn drag_onto_itself_is_a_noop() {
        let mut store = test_store(&["A", "B", "C"]);
        let before: Vec<RecordId> = store.records().iter().map(|r| r.id()).collect();
        let b = id_of(&store, "B");
        assert!(!reorder(&mut store, b, b, true));
        let after: Vec<RecordId> = store.records().iter().map(|r| r.id()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn reorder_preserves_the_multiset_of_records() {
        let mut store = test_store(&["A", "B", "C", "D"]);
        let mut before: Vec<RecordId> = store.records().iter().map(|r| r.id()).collect();
        before.sort();

        let c = id_of(&store, "C");
        let a = id_of(&store, "A");
        assert!(reorder(&mut store, c, a, true));

        assert_eq!(store.len(), 4);
        let mut after: Vec<RecordId> = store.records().iter().map(|r| r.id()).collect();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn unresolved_references_leave_store_untouched() {
        let mut store = test_store(&["A", "B"]);
        let a = id_of(&store, "A");
        // Take an id from a disjoint store, it cannot resolve here.
        let alien = test_store(&["X", "Y", "Z"]).records()[2].id();
        assert!(!reorder(&mut store, alien, a, true));
        assert!(!reorder(&mut store, a, alien, false));
        assert_eq!(names(&store), vec!["A", "B"]);
    }

    #[test]
    fn midpoint_rule_splits_tall_rows() {
        // Row spans y 10..14, midpoint at 12.
        assert!(drop_above(10, 10, 4));
        assert!(drop_above(11, 10, 4));
        assert!(!drop_above(12, 10, 4));
        assert!(!drop_above(13, 10, 4));
    }

    #[test]
    fn travel_direction_decides_for_single_cell_rows() {
        assert!(drop_above_by_travel(3, 7)); // dragged upward
        assert!(!drop_above_by_travel(9, 7)); // dragged downward
        assert!(drop_above_by_travel(7, 7));
    }

    #[test]
    fn edge_scroll_triggers_near_edges_only() {
        // Surface rows 5..=20.
        assert_eq!(edge_scroll(5, 5, 20), Some(EdgeScroll::Up));
        assert_eq!(edge_scroll(6, 5, 20), Some(EdgeScroll::Up));
        assert_eq!(edge_scroll(12, 5, 20), None);
        assert_eq!(edge_scroll(19, 5, 20), Some(EdgeScroll::Down));
        assert_eq!(edge_scroll(20, 5, 20), Some(EdgeScroll::Down));
    }

    #[test]
    fn hover_never_points_at_the_source() {
        let store = test_store(&["A", "B"]);
        let a = id_of(&store, "A");
        let b = id_of(&store, "B");
        let mut drag = DragState::begin(a, 3);
        drag.set_hover(Some(b));
        assert_eq!(drag.hover(), Some(b));
        drag.set_hover(Some(a));
        assert_eq!(drag.hover(), None);
        drag.finish();
        assert_eq!(drag, DragState::Idle);
        assert_eq!(drag.hover(), None);
    }
}
