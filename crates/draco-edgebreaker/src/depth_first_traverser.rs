use crate::corner_table::CornerTableView;
use crate::geometry_indices::{CornerIndex, FaceIndex, INVALID_FACE_INDEX};
use crate::status::{invalid_data, Status};
use crate::traverser::{MeshTraverser, TraversalObserver, TraverserBase};

/// Walks faces depth first, always turning right while the tip vertex is new.
///
/// This is the same walk the edgebreaker encoder uses, so attribute values end
/// up in an order that follows the connectivity stream.
#[derive(Debug)]
pub struct DepthFirstTraverser<'a, T: CornerTableView + ?Sized, O> {
    base: TraverserBase<'a, T, O>,
    corner_traversal_stack: Vec<CornerIndex>,
}

impl<'a, T: CornerTableView + ?Sized, O: TraversalObserver> DepthFirstTraverser<'a, T, O> {
    pub fn new(corner_table: &'a T, observer: O) -> Self {
        Self {
            base: TraverserBase::new(corner_table, observer),
            corner_traversal_stack: Vec::new(),
        }
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
    for DepthFirstTraverser<'a, T, O>
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

    fn traverse_from_corner(&mut self, corner: CornerIndex) -> Status {
        if self.base.is_corner_face_visited(corner) {
            return Ok(());
        }
        let table = self.base.corner_table();
        self.corner_traversal_stack.clear();
        self.corner_traversal_stack.push(corner);

        // The two other vertices of the first face are not reached otherwise.
        let next_c = table.next(corner);
        let prev_c = table.previous(corner);
        let next_vert = table.vertex(next_c);
        let prev_vert = table.vertex(prev_c);
        if !next_vert.is_valid() || !prev_vert.is_valid() {
            return Err(invalid_data("Traversal reached an unmapped corner"));
        }
        self.base.visit_vertex(next_vert, next_c);
        self.base.visit_vertex(prev_vert, prev_c);

        while let Some(&top) = self.corner_traversal_stack.last() {
            let mut corner_id = top;
            let mut face_id = Self::corner_face(corner_id);
            if self.base.is_face_visited(face_id) {
                self.corner_traversal_stack.pop();
                continue;
            }
            loop {
                self.base.mark_face_visited(face_id);
                let vert_id = table.vertex(corner_id);
                if !vert_id.is_valid() {
                    return Err(invalid_data("Traversal reached an unmapped corner"));
                }
                if !self.base.is_vertex_visited(vert_id) {
                    let on_boundary = table.is_on_boundary(vert_id);
                    self.base.visit_vertex(vert_id, corner_id);
                    if !on_boundary {
                        corner_id = table.get_right_corner(corner_id);
                        face_id = Self::corner_face(corner_id);
                        if !face_id.is_valid() {
                            return Err(invalid_data("Interior vertex with an open fan"));
                        }
                        continue;
                    }
                }

                let right_corner_id = table.get_right_corner(corner_id);
                let left_corner_id = table.get_left_corner(corner_id);
                let right_face_id = Self::corner_face(right_corner_id);
                let left_face_id = Self::corner_face(left_corner_id);
                let right_visited = self.base.is_face_visited(right_face_id);
                let left_visited = self.base.is_face_visited(left_face_id);
                match (right_visited, left_visited) {
                    (true, true) => {
                        self.corner_traversal_stack.pop();
                        break;
                    }
                    (true, false) => {
                        corner_id = left_corner_id;
                        face_id = left_face_id;
                    }
                    (false, true) => {
                        corner_id = right_corner_id;
                        face_id = right_face_id;
                    }
                    (false, false) => {
                        // Split: the left branch is resumed after the right one.
                        if let Some(last) = self.corner_traversal_stack.last_mut() {
                            *last = left_corner_id;
                        }
                        self.corner_traversal_stack.push(right_corner_id);
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
