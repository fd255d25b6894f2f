use indexmap::IndexMap;

use crate::block::{BasicBlock, BlockId};

#[derive(Debug, Clone)]
pub struct Function {
    pub(crate) name: String,
    pub(crate) blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first block added is the entry.
    pub fn add_block(&mut self) -> BlockId {
        let index = self.blocks.len();
        self.blocks.push(BasicBlock::new(index));
        BlockId(index)
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0]
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn num_instructions(&self) -> usize {
        self.blocks.iter().map(|block| block.len()).sum()
    }

    pub fn display_(&self) -> FunctionDisplay<'_> {
        FunctionDisplay { func: self }
    }
}

pub struct FunctionDisplay<'a> {
    func: &'a Function,
}

impl std::fmt::Display for FunctionDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "define @{} {{", self.func.name)?;
        for block in &self.func.blocks {
            block.fmt(f)?;
        }
        writeln!(f, "}}")
    }
}

/// Functions keyed by name, kept in definition order.
#[derive(Debug, Clone, Default)]
pub struct Module {
    functions: IndexMap<String, Function>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function, returning the one it replaced if the name was already taken. The
    /// replacement keeps the position of the function it replaced.
    pub fn add_function(&mut self, func: Function) -> Option<Function> {
        self.functions.insert(func.name.clone(), func)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
