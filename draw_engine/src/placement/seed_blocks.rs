//! Seed blocks over the base positions of an elimination structure.
//!
//! Positions are handled by index into the sorted round one positions, so
//! ladders (whose base positions start above the fed ones) share the rule
//! with plain trees. For `N` base positions:
//!
//! - block 1 holds seed 1 at index 1, block 2 seed 2 at index `N`
//! - block `k` splits the bracket into sections of `N / 2^(k-1)` and puts
//!   one seed into every section that has none yet
//!
//! ```text
//! N = 16, CLUSTER
//! block 1  [1]
//! block 2  [16]
//! block 3  [5, 12]
//! block 4  [3, 7, 10, 14]
//! ```

use crate::model::DrawPosition;
use crate::policy::SeedBlockShape;

/// Positions eligible for a range of seed numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedBlock {
    pub first_seed: u32,
    pub last_seed: u32,
    pub positions: Vec<DrawPosition>,
}

impl SeedBlock {
    pub fn contains_seed(&self, seed_number: u32) -> bool {
        (self.first_seed..=self.last_seed).contains(&seed_number)
    }
}

/// Seed blocks covering at least `seed_count` seeds.
///
/// `base_positions` must be sorted; the last block is always complete, so
/// more positions than seeds may be returned.
pub fn seed_blocks(
    base_positions: &[DrawPosition],
    seed_count: u32,
    shape: SeedBlockShape,
) -> Vec<SeedBlock> {
    let size = base_positions.len() as u32;
    let mut blocks: Vec<SeedBlock> = Vec::new();
    let mut seeded: Vec<u32> = Vec::new();
    let mut placed = 0;

    let push = |blocks: &mut Vec<SeedBlock>, indices: Vec<u32>, placed: &mut u32| {
        let positions = indices
            .iter()
            .map(|&index| base_positions[index as usize - 1])
            .collect();
        blocks.push(SeedBlock {
            first_seed: *placed + 1,
            last_seed: *placed + indices.len() as u32,
            positions,
        });
        *placed += indices.len() as u32;
    };

    if size == 0 || seed_count == 0 {
        return blocks;
    }
    push(&mut blocks, vec![1], &mut placed);
    seeded.push(1);
    if size < 2 || placed >= seed_count {
        return blocks;
    }
    push(&mut blocks, vec![size], &mut placed);
    seeded.push(size);

    let mut sections = 4;
    while placed < seed_count && sections <= size {
        let section_size = size / sections;
        let indices: Vec<u32> = (0..sections)
            .filter(|j| {
                let (start, end) = (j * section_size + 1, (j + 1) * section_size);
                !seeded.iter().any(|s| (start..=end).contains(s))
            })
            .map(|j| section_index(j, section_size, shape))
            .collect();
        seeded.extend(indices.iter().copied());
        push(&mut blocks, indices, &mut placed);
        sections *= 2;
    }

    blocks
}

/// Index chosen inside section `j`: next to the paired section for CLUSTER,
/// at the far end for SEPARATE.
fn section_index(j: u32, section_size: u32, shape: SeedBlockShape) -> u32 {
    let start = j * section_size + 1;
    let end = (j + 1) * section_size;
    match (shape, j % 2 == 0) {
        (SeedBlockShape::Cluster, true) | (SeedBlockShape::Separate, false) => end,
        (SeedBlockShape::Cluster, false) | (SeedBlockShape::Separate, true) => start,
    }
}

/// Block holding `seed_number`.
pub fn block_for_seed(blocks: &[SeedBlock], seed_number: u32) -> Option<&SeedBlock> {
    blocks.iter().find(|block| block.contains_seed(seed_number))
}

/// Positions of `N / 2` virtual seeds in block order.
///
/// Giving byes to the opponents of these positions spreads them over
/// quarters first, then halves within quarters.
pub fn virtual_seed_order(
    base_positions: &[DrawPosition],
    shape: SeedBlockShape,
) -> Vec<DrawPosition> {
    let virtual_seeds = (base_positions.len() as u32 / 2).max(1);
    seed_blocks(base_positions, virtual_seeds, shape)
        .into_iter()
        .flat_map(|block| block.positions)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(blocks: &[SeedBlock]) -> Vec<Vec<DrawPosition>> {
        blocks.iter().map(|b| b.positions.clone()).collect()
    }

    #[test]
    fn test_cluster_blocks_of_16() {
        let base: Vec<u32> = (1..=16).collect();
        let blocks = seed_blocks(&base, 8, SeedBlockShape::Cluster);
        assert_eq!(
            positions(&blocks),
            vec![vec![1], vec![16], vec![5, 12], vec![3, 7, 10, 14]]
        );
        assert_eq!(block_for_seed(&blocks, 6).map(|b| b.first_seed), Some(5));
        assert_eq!(block_for_seed(&blocks, 9), None);
    }

    #[test]
    fn test_separate_blocks_of_16() {
        let base: Vec<u32> = (1..=16).collect();
        let blocks = seed_blocks(&base, 4, SeedBlockShape::Separate);
        assert_eq!(positions(&blocks), vec![vec![1], vec![16], vec![8, 9]]);
    }

    #[test]
    fn test_blocks_are_complete() {
        let base: Vec<u32> = (1..=32).collect();
        let blocks = seed_blocks(&base, 3, SeedBlockShape::Cluster);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].last_seed, 4);
    }

    #[test]
    fn test_ladder_base_offsets() {
        // ladder base positions start above the fed positions
        let base: Vec<u32> = (4..=11).collect();
        let blocks = seed_blocks(&base, 2, SeedBlockShape::Cluster);
        assert_eq!(positions(&blocks), vec![vec![4], vec![11]]);
    }

    #[test]
    fn test_virtual_order_hits_every_match_up_once() {
        let base: Vec<u32> = (1..=16).collect();
        let order = virtual_seed_order(&base, SeedBlockShape::Cluster);
        assert_eq!(order, vec![1, 16, 5, 12, 3, 7, 10, 14]);

        let mut match_ups: Vec<u32> = order.iter().map(|p| p.div_ceil(2)).collect();
        match_ups.sort_unstable();
        match_ups.dedup();
        assert_eq!(match_ups.len(), 8);
    }

    #[test]
    fn test_tiny_structures() {
        assert_eq!(
            positions(&seed_blocks(&[1, 2], 4, SeedBlockShape::Cluster)),
            vec![vec![1], vec![2]]
        );
        assert!(seed_blocks(&[], 2, SeedBlockShape::Cluster).is_empty());
    }
}
