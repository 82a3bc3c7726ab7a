//! Shared state of the mesh traversers.

use crate::corner_table::CornerTableView;
use crate::geometry_indices::{CornerIndex, FaceIndex, VertexIndex};
use crate::status::Status;

/// Receives the faces and vertices in the order a traverser first reaches them.
pub trait TraversalObserver {
    fn on_new_face_visited(&mut self, face: FaceIndex);

    /// `corner` is the corner through which `vertex` was reached.
    fn on_new_vertex_visited(&mut self, vertex: VertexIndex, corner: CornerIndex);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTraversalObserver;

impl TraversalObserver for NullTraversalObserver {
    fn on_new_face_visited(&mut self, _face: FaceIndex) {}

    fn on_new_vertex_visited(&mut self, _vertex: VertexIndex, _corner: CornerIndex) {}
}

/// Records the visitation order, mostly useful for inspecting a traversal.
#[derive(Debug, Default, Clone)]
pub struct RecordingTraversalObserver {
    pub faces: Vec<FaceIndex>,
    pub vertices: Vec<(VertexIndex, CornerIndex)>,
}

impl TraversalObserver for RecordingTraversalObserver {
    fn on_new_face_visited(&mut self, face: FaceIndex) {
        self.faces.push(face);
    }

    fn on_new_vertex_visited(&mut self, vertex: VertexIndex, corner: CornerIndex) {
        self.vertices.push((vertex, corner));
    }
}

/// A strategy that visits every face reachable from a start corner.
pub trait MeshTraverser {
    type CornerTable: CornerTableView + ?Sized;
    type Observer: TraversalObserver;

    fn corner_table(&self) -> &Self::CornerTable;

    fn observer(&self) -> &Self::Observer;

    fn into_observer(self) -> Self::Observer;

    /// Called once before the first [`Self::traverse_from_corner`].
    fn on_traversal_start(&mut self) {}

    fn traverse_from_corner(&mut self, corner: CornerIndex) -> Status;

    fn on_traversal_end(&mut self) {}
}

/// Visited flags and the observer shared by all traversers.
#[derive(Debug)]
pub struct TraverserBase<'a, T: CornerTableView + ?Sized, O> {
    corner_table: &'a T,
    observer: O,
    is_face_visited: Vec<bool>,
    is_vertex_visited: Vec<bool>,
}

impl<'a, T: CornerTableView + ?Sized, O: TraversalObserver> TraverserBase<'a, T, O> {
    pub fn new(corner_table: &'a T, observer: O) -> Self {
        Self {
            corner_table,
            observer,
            is_face_visited: vec![false; corner_table.num_faces()],
            is_vertex_visited: vec![false; corner_table.num_vertices()],
        }
    }

    pub fn corner_table(&self) -> &'a T {
        self.corner_table
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Invalid faces count as visited.
    #[inline]
    pub fn is_face_visited(&self, face: FaceIndex) -> bool {
        if !face.is_valid() {
            return true;
        }
        self.is_face_visited.get(face.as_usize()).copied().unwrap_or(true)
    }

    #[inline]
    pub fn is_corner_face_visited(&self, corner: CornerIndex) -> bool {
        if !corner.is_valid() {
            return true;
        }
        self.is_face_visited(FaceIndex(corner.0 / 3))
    }

    pub fn mark_face_visited(&mut self, face: FaceIndex) {
        self.is_face_visited[face.as_usize()] = true;
        self.observer.on_new_face_visited(face);
    }

    #[inline]
    pub fn is_vertex_visited(&self, vertex: VertexIndex) -> bool {
        self.is_vertex_visited.get(vertex.as_usize()).copied().unwrap_or(true)
    }

    /// Marks `vertex` visited and reports it, unless it was visited before.
    pub fn visit_vertex(&mut self, vertex: VertexIndex, corner: CornerIndex) {
        if self.is_vertex_visited(vertex) {
            return;
        }
        self.is_vertex_visited[vertex.as_usize()] = true;
        self.observer.on_new_vertex_visited(vertex, corner);
    }
}
