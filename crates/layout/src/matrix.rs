use std::collections::HashMap;

/// Sparse occupancy counts over grid cells, keyed by packed (column, row).
///
/// Counts only increase; there is no deallocation within a run.
#[derive(Debug, Clone, Default)]
pub struct AllocationMatrix {
    cells: HashMap<u64, u32>,
}

fn pack(x: u32, y: u32) -> u64 {
    (u64::from(y) << 32) | u64::from(x)
}

impl AllocationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, x: u32, y: u32) {
        *self.cells.entry(pack(x, y)).or_insert(0) += 1;
    }

    /// Number of times the cell was allocated; 0 means free.
    pub fn occupancy(&self, x: u32, y: u32) -> u32 {
        self.cells.get(&pack(x, y)).copied().unwrap_or(0)
    }

    pub fn is_free(&self, x: u32, y: u32) -> bool {
        self.occupancy(x, y) == 0
    }

    /// Number of distinct occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut m = AllocationMatrix::new();
        assert_eq!(m.occupancy(3, 4), 0);
        for _ in 0..5 {
            m.allocate(3, 4);
        }
        assert_eq!(m.occupancy(3, 4), 5);
        assert_eq!(m.occupancy(4, 3), 0);
        assert_eq!(m.occupied_cells(), 1);
    }

    #[test]
    fn test_counts_never_decrease() {
        let mut m = AllocationMatrix::new();
        let mut last = 0;
        for i in 0..20u32 {
            m.allocate(i % 3 + 1, 1);
            let now = m.occupancy(1, 1);
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 7);
    }
}
