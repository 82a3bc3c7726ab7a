use crate::corner_table::CornerTableView;
use crate::geometry_indices::{CornerIndex, VertexIndex};

/// Memoized vertex valences of a corner table.
///
/// The cache holds a shared borrow of the table, so the table can not be
/// mutated while cached valences are alive.
#[derive(Debug)]
pub struct ValenceCache<'t, T: CornerTableView + ?Sized> {
    table: &'t T,
    vertex_valence_cache_8_bit: Vec<i8>,
    vertex_valence_cache_32_bit: Vec<i32>,
}

impl<'t, T: CornerTableView + ?Sized> ValenceCache<'t, T> {
    pub fn new(table: &'t T) -> Self {
        Self {
            table,
            vertex_valence_cache_8_bit: Vec::new(),
            vertex_valence_cache_32_bit: Vec::new(),
        }
    }

    pub fn table(&self) -> &'t T {
        self.table
    }

    /// Caches valences clamped to `i8::MAX`.
    pub fn cache_valences_inaccurate(&mut self) {
        if !self.vertex_valence_cache_8_bit.is_empty() {
            return;
        }
        let table = self.table;
        self.vertex_valence_cache_8_bit = (0..table.num_vertices())
            .map(|v| table.valence(VertexIndex::from(v)).min(i8::MAX as i32) as i8)
            .collect();
    }

    pub fn cache_valences(&mut self) {
        if !self.vertex_valence_cache_32_bit.is_empty() {
            return;
        }
        let table = self.table;
        self.vertex_valence_cache_32_bit = (0..table.num_vertices())
            .map(|v| table.valence(VertexIndex::from(v)))
            .collect();
    }

    /// Cached valence of `v`. Falls back to walking the ring when the cache
    /// has not been filled. Returns -1 for invalid vertices.
    pub fn valence_from_cache(&self, v: VertexIndex) -> i32 {
        if !v.is_valid() || v.as_usize() >= self.table.num_vertices() {
            return -1;
        }
        match self.vertex_valence_cache_32_bit.get(v.as_usize()) {
            Some(&valence) => valence,
            None => self.table.valence(v),
        }
    }

    pub fn valence_from_cache_corner(&self, c: CornerIndex) -> i32 {
        if !c.is_valid() {
            return -1;
        }
        self.valence_from_cache(self.table.vertex(c))
    }

    pub fn valence_from_cache_inaccurate(&self, v: VertexIndex) -> i8 {
        if !v.is_valid() || v.as_usize() >= self.table.num_vertices() {
            return -1;
        }
        match self.vertex_valence_cache_8_bit.get(v.as_usize()) {
            Some(&valence) => valence,
            None => self.table.valence(v).min(i8::MAX as i32) as i8,
        }
    }

    pub fn valence_from_cache_inaccurate_corner(&self, c: CornerIndex) -> i8 {
        if !c.is_valid() {
            return -1;
        }
        self.valence_from_cache_inaccurate(self.table.vertex(c))
    }

    pub fn clear_valence_cache(&mut self) {
        self.vertex_valence_cache_32_bit = Vec::new();
    }

    pub fn clear_valence_cache_inaccurate(&mut self) {
        self.vertex_valence_cache_8_bit = Vec::new();
    }

    pub fn is_cache_empty(&self) -> bool {
        self.vertex_valence_cache_8_bit.is_empty() && self.vertex_valence_cache_32_bit.is_empty()
    }
}
