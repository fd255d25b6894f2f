use std::ops::{Deref, DerefMut};

use crate::{
    function::Function,
    instruction::{Instruction, SuccessorList},
    opcode::Opcode,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub(crate) index: usize,
    pub(crate) insts: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            insts: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        BlockId(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn append(&mut self, inst: Instruction) {
        self.insts.push(inst);
    }

    pub fn terminator(&self) -> Option<&Instruction> {
        self.insts.last().filter(|inst| inst.opcode().is_terminator())
    }

    /// Outgoing control edges, read off the terminator. Empty for blocks that return, trap,
    /// or have not been terminated yet.
    pub fn successor_list(&self) -> &[BlockId] {
        match self.terminator() {
            Some(term) => term.successors(),
            None => &[],
        }
    }

    pub(crate) fn fmt<W: std::fmt::Write>(&self, f: &mut W) -> std::fmt::Result {
        writeln!(f, "{}:", self.id())?;
        for inst in &self.insts {
            writeln!(f, "    {}", inst)?;
        }
        Ok(())
    }
}

impl Deref for BasicBlock {
    type Target = Vec<Instruction>;

    fn deref(&self) -> &Self::Target {
        &self.insts
    }
}

impl DerefMut for BasicBlock {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.insts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

impl Default for BlockId {
    fn default() -> Self {
        Self(usize::MAX)
    }
}

impl From<usize> for BlockId {
    fn from(x: usize) -> Self {
        BlockId(x)
    }
}

impl From<BlockId> for usize {
    fn from(x: BlockId) -> Self {
        x.0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BB{}", self.0)
    }
}

pub struct BasicBlockBuilder<'a> {
    pub func: &'a mut Function,
    pub block: BlockId,
}

impl<'a> BasicBlockBuilder<'a> {
    pub fn new(func: &'a mut Function, block: BlockId) -> Self {
        BasicBlockBuilder { func, block }
    }

    pub fn append(&mut self, inst: Instruction) {
        self.func.block_mut(self.block).append(inst);
    }

    /// Append a non-terminal instruction.
    pub fn inst(&mut self, opcode: Opcode) {
        self.append(Instruction::new(opcode));
    }

    pub fn insts(&mut self, opcodes: impl IntoIterator<Item = Opcode>) {
        for opcode in opcodes {
            self.inst(opcode);
        }
    }

    pub fn jump(&mut self, to: BlockId) {
        self.append(Instruction::with_successors(Opcode::Br, [to]));
    }

    pub fn branch(&mut self, taken: BlockId, not_taken: BlockId) {
        self.append(Instruction::with_successors(
            Opcode::Br,
            [taken, not_taken],
        ));
    }

    /// `default` is successor 0, followed by one successor per case.
    pub fn switch(&mut self, default: BlockId, cases: impl IntoIterator<Item = BlockId>) {
        let mut successors = SuccessorList::new();
        successors.push(default);
        successors.extend(cases);
        self.append(Instruction {
            opcode: Opcode::Switch,
            successors,
        });
    }

    pub fn indirect_br(&mut self, destinations: impl IntoIterator<Item = BlockId>) {
        self.append(Instruction::with_successors(Opcode::IndirectBr, destinations));
    }

    pub fn ret(&mut self) {
        self.inst(Opcode::Ret);
    }

    pub fn unreachable(&mut self) {
        self.inst(Opcode::Unreachable);
    }
}
