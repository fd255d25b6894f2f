//! Structural checks over a [`Function`].
//!
//! The profiler itself accepts anything and never fails; these checks exist for callers that
//! build functions by hand and want to catch mistakes before trusting a profile.

use thiserror::Error;

use crate::{block::BlockId, function::Function, opcode::Opcode};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("{func}: {block} has {opcode} with successor {target} out of range ({num_blocks} blocks)")]
    SuccessorOutOfRange {
        func: String,
        block: BlockId,
        opcode: Opcode,
        target: BlockId,
        num_blocks: usize,
    },

    #[error("{func}: {block} has {opcode} without successors")]
    BranchWithoutSuccessors {
        func: String,
        block: BlockId,
        opcode: Opcode,
    },

    #[error("{func}: {block} has non-terminator {opcode} carrying successors")]
    UnexpectedSuccessors {
        func: String,
        block: BlockId,
        opcode: Opcode,
    },

    #[error("{func}: {block} has terminator {opcode} at position {position} of {len}")]
    MisplacedTerminator {
        func: String,
        block: BlockId,
        opcode: Opcode,
        position: usize,
        len: usize,
    },
}

pub fn verify_function(func: &Function) -> Result<(), IrError> {
    let num_blocks = func.num_blocks();

    for block in func.blocks() {
        let id = block.id();
        for (position, inst) in block.iter().enumerate() {
            let opcode = inst.opcode();

            if opcode.is_terminator() && position + 1 != block.len() {
                return Err(IrError::MisplacedTerminator {
                    func: func.name().to_string(),
                    block: id,
                    opcode,
                    position,
                    len: block.len(),
                });
            }

            if opcode.is_branch() {
                if inst.num_successors() == 0 {
                    return Err(IrError::BranchWithoutSuccessors {
                        func: func.name().to_string(),
                        block: id,
                        opcode,
                    });
                }
            } else if !opcode.is_terminator() && inst.num_successors() != 0 {
                return Err(IrError::UnexpectedSuccessors {
                    func: func.name().to_string(),
                    block: id,
                    opcode,
                });
            }

            if let Some(target) = inst.successors().iter().find(|succ| succ.0 >= num_blocks) {
                return Err(IrError::SuccessorOutOfRange {
                    func: func.name().to_string(),
                    block: id,
                    opcode,
                    target: *target,
                    num_blocks,
                });
            }
        }
    }

    Ok(())
}
