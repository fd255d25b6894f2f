use tinyvec::TinyVec;

use crate::{block::BlockId, opcode::Opcode};

pub type SuccessorList = TinyVec<[BlockId; 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub(crate) opcode: Opcode,
    pub(crate) successors: SuccessorList,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            successors: TinyVec::new(),
        }
    }

    pub fn with_successors(opcode: Opcode, successors: impl IntoIterator<Item = BlockId>) -> Self {
        Self {
            opcode,
            successors: successors.into_iter().collect(),
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn successors(&self) -> &[BlockId] {
        &self.successors
    }

    pub fn num_successors(&self) -> usize {
        self.successors.len()
    }

    /// A transfer with a choice of successor. Jumps, single-target indirect branches and
    /// switches whose cases all lead to the same block have no choice to make.
    pub fn is_conditional(&self) -> bool {
        self.opcode.is_branch()
            && self
                .successors
                .iter()
                .any(|succ| Some(succ) != self.successors.first())
    }

    /// Successors with duplicates removed, first occurrence order kept. A switch with several
    /// cases to the same block has one edge to it as far as edge probabilities are concerned.
    pub fn unique_successors(&self) -> SuccessorList {
        let mut result = SuccessorList::new();
        for succ in self.successors.iter().copied() {
            if !result.contains(&succ) {
                result.push(succ);
            }
        }
        result
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, succ) in self.successors.iter().enumerate() {
            if i == 0 {
                write!(f, " ")?;
            } else {
                write!(f, ", ")?;
            }
            write!(f, "{}", succ)?;
        }
        Ok(())
    }
}
