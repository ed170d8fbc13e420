use super::Candidate;
use smallvec::SmallVec;

/// Reusable buffers for [`crate::map::Map::check_movement`].
///
/// One call fills and clears them; keep one per worker and pass it in to
/// avoid allocating on every step. Never share one between concurrent calls.
#[derive(Debug, Default)]
pub struct MovementScratch {
    pub(crate) start: SmallVec<[Candidate; 8]>,
    pub(crate) forward: SmallVec<[Candidate; 8]>,
    pub(crate) left: SmallVec<[Candidate; 8]>,
    pub(crate) right: SmallVec<[Candidate; 8]>,
    pub(crate) statics: SmallVec<[Candidate; 16]>,
    pub(crate) sectors: SmallVec<[(i32, i32); 4]>,
}

impl MovementScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.start.clear();
        self.forward.clear();
        self.left.clear();
        self.right.clear();
        self.statics.clear();
        self.sectors.clear();
    }
}
