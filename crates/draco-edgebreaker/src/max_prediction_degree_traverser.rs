use crate::corner_table::CornerTableView;
use crate::geometry_indices::{CornerIndex, FaceIndex, INVALID_CORNER_INDEX, INVALID_FACE_INDEX};
use crate::status::{invalid_data, DracoError, Status};
use crate::traverser::{MeshTraverser, TraversalObserver, TraverserBase};

const MAX_PRIORITY: usize = 3;

/// Prefers faces whose tip vertex can be predicted from many already visited
/// neighbours. Pending corners are kept in one stack per priority, 0 being
/// the most urgent.
#[derive(Debug)]
pub struct MaxPredictionDegreeTraverser<'a, T: CornerTableView + ?Sized, O> {
    base: TraverserBase<'a, T, O>,
    traversal_stacks: [Vec<CornerIndex>; MAX_PRIORITY],
    best_priority: usize,
    /// Number of visited faces sharing an edge with each unvisited vertex.
    prediction_degree: Vec<i32>,
}

impl<'a, T: CornerTableView + ?Sized, O: TraversalObserver> MaxPredictionDegreeTraverser<'a, T, O> {
    pub fn new(corner_table: &'a T, observer: O) -> Self {
        Self {
            base: TraverserBase::new(corner_table, observer),
            traversal_stacks: Default::default(),
            best_priority: 0,
            prediction_degree: Vec::new(),
        }
    }

    fn pop_next_corner_to_traverse(&mut self) -> CornerIndex {
        for priority in self.best_priority..MAX_PRIORITY {
            if let Some(corner) = self.traversal_stacks[priority].pop() {
                self.best_priority = priority;
                return corner;
            }
        }
        INVALID_CORNER_INDEX
    }

    fn add_corner_to_traversal_stack(&mut self, corner: CornerIndex, priority: usize) {
        self.traversal_stacks[priority].push(corner);
        if priority < self.best_priority {
            self.best_priority = priority;
        }
    }

    /// 0 when the tip is already visited, 1 when another visited face already
    /// points at it, 2 otherwise.
    fn compute_priority(&mut self, corner: CornerIndex) -> usize {
        let v_tip = self.base.corner_table().vertex(corner);
        let mut priority = 0;
        if !self.base.is_vertex_visited(v_tip) {
            let degree = &mut self.prediction_degree[v_tip.as_usize()];
            *degree += 1;
            priority = if *degree > 1 { 1 } else { 2 };
        }
        priority.min(MAX_PRIORITY - 1)
    }

    fn corner_face(corner: CornerIndex) -> FaceIndex {
        if corner.is_valid() {
            FaceIndex(corner.0 / 3)
        } else {
            INVALID_FACE_INDEX
        }
    }
}

impl<'a, T: CornerTableView + ?Sized, O: TraversalObserver> MeshTraverser
    for MaxPredictionDegreeTraverser<'a, T, O>
{
    type CornerTable = T;
    type Observer = O;

    fn corner_table(&self) -> &T {
        self.base.corner_table()
    }

    fn observer(&self) -> &O {
        self.base.observer()
    }

    fn into_observer(self) -> O {
        self.base.into_observer()
    }

    fn on_traversal_start(&mut self) {
        self.prediction_degree = vec![0; self.base.corner_table().num_vertices()];
    }

    fn traverse_from_corner(&mut self, corner: CornerIndex) -> Status {
        if self.prediction_degree.len() != self.base.corner_table().num_vertices() {
            return Err(DracoError::InvalidParameter(
                "Traversal must be started before traversing from a corner".into(),
            ));
        }
        if !corner.is_valid() {
            return Err(invalid_data("Traversal started from an invalid corner"));
        }
        let table = self.base.corner_table();
        self.traversal_stacks[0].push(corner);
        self.best_priority = 0;

        let next_c = table.next(corner);
        let prev_c = table.previous(corner);
        for c in [next_c, prev_c, corner] {
            let v = table.vertex(c);
            if !v.is_valid() {
                return Err(invalid_data("Traversal reached an unmapped corner"));
            }
            self.base.visit_vertex(v, c);
        }

        loop {
            let mut corner_id = self.pop_next_corner_to_traverse();
            if !corner_id.is_valid() {
                break;
            }
            if self.base.is_corner_face_visited(corner_id) {
                continue;
            }
            loop {
                self.base.mark_face_visited(Self::corner_face(corner_id));
                let vert_id = table.vertex(corner_id);
                if !vert_id.is_valid() {
                    return Err(invalid_data("Traversal reached an unmapped corner"));
                }
                self.base.visit_vertex(vert_id, corner_id);

                let right_corner_id = table.get_right_corner(corner_id);
                let left_corner_id = table.get_left_corner(corner_id);
                let is_right_face_visited = self.base.is_corner_face_visited(right_corner_id);
                let is_left_face_visited = self.base.is_corner_face_visited(left_corner_id);

                if !is_left_face_visited {
                    let priority = self.compute_priority(left_corner_id);
                    if is_right_face_visited && priority <= self.best_priority {
                        // The left face would be popped next anyway.
                        corner_id = left_corner_id;
                        continue;
                    }
                    self.add_corner_to_traversal_stack(left_corner_id, priority);
                }
                if !is_right_face_visited {
                    let priority = self.compute_priority(right_corner_id);
                    if priority <= self.best_priority {
                        corner_id = right_corner_id;
                        continue;
                    }
                    self.add_corner_to_traversal_stack(right_corner_id, priority);
                }
                break;
            }
        }
        Ok(())
    }
}
