use std::collections::HashMap;

use thiserror::Error;

use crate::{block::BlockId, function::Function, instruction::SuccessorList};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityError {
    #[error("probability denominator is zero")]
    ZeroDenominator,
    #[error("probability {numerator}/{denominator} exceeds one")]
    AboveOne { numerator: u32, denominator: u32 },
}

/// Edge-taken probability as an exact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchProbability {
    numerator: u32,
    denominator: u32,
}

impl BranchProbability {
    pub fn try_new(numerator: u32, denominator: u32) -> Result<Self, ProbabilityError> {
        if denominator == 0 {
            return Err(ProbabilityError::ZeroDenominator);
        }
        if numerator > denominator {
            return Err(ProbabilityError::AboveOne {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// No validation. Oracles are allowed to hand out garbage; consumers must check
    /// [`BranchProbability::is_valid`] before trusting the ratio.
    pub const fn new_unchecked(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub const fn zero() -> Self {
        Self::new_unchecked(0, 1)
    }

    pub const fn numerator(self) -> u32 {
        self.numerator
    }

    pub const fn denominator(self) -> u32 {
        self.denominator
    }

    pub const fn is_valid(self) -> bool {
        self.denominator != 0 && self.numerator <= self.denominator
    }

    /// Exact `self > num / den`. The products are taken in u64 so no u32 ratio can overflow them.
    pub const fn exceeds(self, num: u32, den: u32) -> bool {
        self.numerator as u64 * den as u64 > num as u64 * self.denominator as u64
    }

    /// `1 - self`. A ratio above one complements to zero.
    pub const fn complement(self) -> Self {
        Self::new_unchecked(self.denominator.saturating_sub(self.numerator), self.denominator)
    }
}

impl std::fmt::Display for BranchProbability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.numerator, self.denominator)
    }
}

/// Source of edge probabilities for branches out of a block.
pub trait BranchProbabilityOracle {
    /// Probability that control leaves `src` for `dst`. Parallel edges to the same `dst` are
    /// answered as one.
    fn edge_probability(&self, src: BlockId, dst: BlockId) -> BranchProbability;
}

impl<F> BranchProbabilityOracle for F
where
    F: Fn(BlockId, BlockId) -> BranchProbability,
{
    fn edge_probability(&self, src: BlockId, dst: BlockId) -> BranchProbability {
        self(src, dst)
    }
}

/// Table of externally computed edge probabilities.
///
/// Edges nobody annotated get a uniform share of their block's successors, counting parallel
/// edges once each. Asking about a block pair with no edge between them yields zero.
#[derive(Debug, Clone, Default)]
pub struct BranchProbabilityInfo {
    successors: HashMap<BlockId, SuccessorList>,
    probs: HashMap<(BlockId, BlockId), BranchProbability>,
}

impl BranchProbabilityInfo {
    pub fn new(func: &Function) -> Self {
        let successors = func
            .blocks()
            .iter()
            .filter(|block| !block.successor_list().is_empty())
            .map(|block| (block.id(), block.successor_list().iter().copied().collect()))
            .collect();

        Self {
            successors,
            probs: HashMap::new(),
        }
    }

    pub fn set_edge_probability(&mut self, src: BlockId, dst: BlockId, prob: BranchProbability) {
        self.probs.insert((src, dst), prob);
    }

    pub fn with_edge_probability(mut self, src: BlockId, dst: BlockId, prob: BranchProbability) -> Self {
        self.set_edge_probability(src, dst, prob);
        self
    }

    pub fn is_edge_annotated(&self, src: BlockId, dst: BlockId) -> bool {
        self.probs.contains_key(&(src, dst))
    }

    fn uniform_probability(&self, src: BlockId, dst: BlockId) -> BranchProbability {
        let Some(succs) = self.successors.get(&src) else {
            return BranchProbability::zero();
        };

        let edges = succs.iter().filter(|succ| **succ == dst).count();
        if edges == 0 {
            return BranchProbability::zero();
        }

        BranchProbability::new_unchecked(edges as u32, succs.len() as u32)
    }
}

impl BranchProbabilityOracle for BranchProbabilityInfo {
    fn edge_probability(&self, src: BlockId, dst: BlockId) -> BranchProbability {
        match self.probs.get(&(src, dst)) {
            Some(prob) => *prob,
            None => self.uniform_probability(src, dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BasicBlockBuilder;

    #[test]
    fn test_try_new_rejects_malformed_ratios() {
        assert_eq!(
            BranchProbability::try_new(1, 0),
            Err(ProbabilityError::ZeroDenominator)
        );
        assert_eq!(
            BranchProbability::try_new(3, 2),
            Err(ProbabilityError::AboveOne {
                numerator: 3,
                denominator: 2
            })
        );
        assert!(BranchProbability::try_new(2, 2).is_ok());
        assert!(!BranchProbability::new_unchecked(0, 0).is_valid());
    }

    #[test]
    fn test_exceeds_is_strict_and_exact() {
        assert!(!BranchProbability::new_unchecked(8, 10).exceeds(8, 10));
        assert!(!BranchProbability::new_unchecked(4, 5).exceeds(8, 10));
        assert!(BranchProbability::new_unchecked(801, 1000).exceeds(8, 10));
        assert!(BranchProbability::new_unchecked(u32::MAX, u32::MAX).exceeds(8, 10));
        assert!(!BranchProbability::new_unchecked(u32::MAX / 5 * 4, u32::MAX / 5 * 5).exceeds(8, 10));
    }

    #[test]
    fn test_complement() {
        assert_eq!(BranchProbability::new_unchecked(3, 10).complement(), BranchProbability::new_unchecked(7, 10));
        assert_eq!(BranchProbability::new_unchecked(5, 2).complement(), BranchProbability::new_unchecked(0, 2));
        assert_eq!(BranchProbability::new_unchecked(1, 0).complement(), BranchProbability::new_unchecked(0, 0));
    }

    #[test]
    fn test_unannotated_edges_split_uniformly() {
        let mut func = Function::new("f");
        let entry = func.add_block();
        let a = func.add_block();
        let b = func.add_block();

        let mut builder = BasicBlockBuilder::new(&mut func, entry);
        builder.switch(a, [b, b, a, b]);

        let bpi = BranchProbabilityInfo::new(&func);
        assert_eq!(bpi.edge_probability(entry, a), BranchProbability::new_unchecked(2, 5));
        assert_eq!(bpi.edge_probability(entry, b), BranchProbability::new_unchecked(3, 5));
        assert_eq!(bpi.edge_probability(a, b), BranchProbability::zero());
        assert_eq!(bpi.edge_probability(entry, entry), BranchProbability::zero());
    }

    #[test]
    fn test_annotations_override_uniform_split() {
        let mut func = Function::new("f");
        let entry = func.add_block();
        let a = func.add_block();
        let b = func.add_block();

        BasicBlockBuilder::new(&mut func, entry).branch(a, b);

        let bpi = BranchProbabilityInfo::new(&func)
            .with_edge_probability(entry, a, BranchProbability::new_unchecked(9, 10));
        assert!(bpi.is_edge_annotated(entry, a));
        assert_eq!(bpi.edge_probability(entry, a), BranchProbability::new_unchecked(9, 10));
        assert_eq!(bpi.edge_probability(entry, b), BranchProbability::new_unchecked(1, 2));
    }
}
