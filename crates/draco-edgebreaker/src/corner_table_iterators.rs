//! Lazy walks over a [`CornerTableView`].

use crate::corner_table::CornerTableView;
use crate::geometry_indices::{
    CornerIndex, FaceIndex, VertexIndex, INVALID_CORNER_INDEX,
};

/// Visits the vertices of the 1-ring of a vertex.
///
/// The walk swings left from the left-most corner. When it hits an open
/// boundary it restarts at the left-most corner and continues to the right,
/// so a boundary vertex with `n` faces yields `n + 1` ring vertices.
pub struct VertexRingIterator<'a, T: CornerTableView + ?Sized> {
    corner_table: &'a T,
    start_corner: CornerIndex,
    corner: CornerIndex,
    left_traversal: bool,
}

impl<'a, T: CornerTableView + ?Sized> VertexRingIterator<'a, T> {
    pub fn new(corner_table: &'a T, vertex: VertexIndex) -> Self {
        let start_corner = corner_table.left_most_corner(vertex);
        Self {
            corner_table,
            start_corner,
            corner: start_corner,
            left_traversal: true,
        }
    }

    /// Corner opposite to the edge connecting the pivot with the current ring
    /// vertex.
    pub fn edge_corner(&self) -> CornerIndex {
        if self.left_traversal {
            self.corner_table.previous(self.corner)
        } else {
            self.corner_table.next(self.corner)
        }
    }

    fn advance(&mut self) {
        if self.left_traversal {
            self.corner = self.corner_table.swing_left(self.corner);
            if !self.corner.is_valid() {
                self.corner = self.start_corner;
                self.left_traversal = false;
            } else if self.corner == self.start_corner {
                self.corner = INVALID_CORNER_INDEX;
            }
        } else {
            self.corner = self.corner_table.swing_right(self.corner);
        }
    }
}

impl<'a, T: CornerTableView + ?Sized> Iterator for VertexRingIterator<'a, T> {
    type Item = VertexIndex;

    fn next(&mut self) -> Option<VertexIndex> {
        if !self.corner.is_valid() {
            return None;
        }
        let vertex = self.corner_table.vertex(self.edge_corner());
        self.advance();
        Some(vertex)
    }
}

/// Visits all corners attached to one vertex.
pub struct VertexCornersIterator<'a, T: CornerTableView + ?Sized> {
    corner_table: &'a T,
    start_corner: CornerIndex,
    corner: CornerIndex,
    left_traversal: bool,
}

impl<'a, T: CornerTableView + ?Sized> VertexCornersIterator<'a, T> {
    pub fn new(corner_table: &'a T, vertex: VertexIndex) -> Self {
        Self::from_corner(corner_table, corner_table.left_most_corner(vertex))
    }

    /// Starts at an arbitrary corner of the vertex.
    pub fn from_corner(corner_table: &'a T, corner: CornerIndex) -> Self {
        Self {
            corner_table,
            start_corner: corner,
            corner,
            left_traversal: true,
        }
    }
}

impl<'a, T: CornerTableView + ?Sized> Iterator for VertexCornersIterator<'a, T> {
    type Item = CornerIndex;

    fn next(&mut self) -> Option<CornerIndex> {
        if !self.corner.is_valid() {
            return None;
        }
        let current = self.corner;
        if self.left_traversal {
            self.corner = self.corner_table.swing_left(self.corner);
            if !self.corner.is_valid() {
                self.corner = self.corner_table.swing_right(self.start_corner);
                self.left_traversal = false;
            } else if self.corner == self.start_corner {
                self.corner = INVALID_CORNER_INDEX;
            }
        } else {
            self.corner = self.corner_table.swing_right(self.corner);
        }
        Some(current)
    }
}

/// Visits the faces sharing an edge with a face.
pub struct FaceAdjacencyIterator<'a, T: CornerTableView + ?Sized> {
    corner_table: &'a T,
    start_corner: CornerIndex,
    corner: CornerIndex,
}

impl<'a, T: CornerTableView + ?Sized> FaceAdjacencyIterator<'a, T> {
    pub fn new(corner_table: &'a T, face: FaceIndex) -> Self {
        let start_corner = corner_table.first_corner(face);
        let mut iter = Self {
            corner_table,
            start_corner,
            corner: start_corner,
        };
        if !corner_table.opposite(start_corner).is_valid() {
            iter.find_next_face_neighbor();
        }
        iter
    }

    fn find_next_face_neighbor(&mut self) {
        while self.corner.is_valid() {
            self.corner = self.corner_table.next(self.corner);
            if self.corner == self.start_corner {
                self.corner = INVALID_CORNER_INDEX;
                return;
            }
            if self.corner_table.opposite(self.corner).is_valid() {
                return;
            }
        }
    }
}

impl<'a, T: CornerTableView + ?Sized> Iterator for FaceAdjacencyIterator<'a, T> {
    type Item = FaceIndex;

    fn next(&mut self) -> Option<FaceIndex> {
        if !self.corner.is_valid() {
            return None;
        }
        let face = self.corner_table.face(self.corner_table.opposite(self.corner));
        self.find_next_face_neighbor();
        Some(face)
    }
}
