//! Frequency-weighted instruction mix.
//!
//! Every instruction falls into exactly one [`Category`]. Its weight is the estimated execution
//! count of its block, so a loop body that runs a thousand times counts a thousand times over
//! straight-line code that runs once.

use crate::{
    analysis::{
        block_frequency::{block_weight, BlockFrequency},
        branch_probability::BranchProbabilityOracle,
    },
    block::BlockId,
    function::Function,
    instruction::Instruction,
    opcode::Opcode,
    WeightSource,
};

/// A conditional branch is biased when some edge is taken with probability strictly above
/// `BIAS_THRESHOLD_NUM / BIAS_THRESHOLD_DEN`.
pub const BIAS_THRESHOLD_NUM: u32 = 8;
pub const BIAS_THRESHOLD_DEN: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    IntAlu,
    FloatAlu,
    Memory,
    BiasedBranch,
    UnbiasedBranch,
    Other,
}

impl Category {
    pub const COUNT: usize = 6;

    pub const ALL: [Category; Self::COUNT] = [
        Category::IntAlu,
        Category::FloatAlu,
        Category::Memory,
        Category::BiasedBranch,
        Category::UnbiasedBranch,
        Category::Other,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Category::IntAlu => "int-alu",
            Category::FloatAlu => "float-alu",
            Category::Memory => "memory",
            Category::BiasedBranch => "biased-branch",
            Category::UnbiasedBranch => "unbiased-branch",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a branch-family instruction in `block` counts as predictable.
///
/// Transfers without a choice of successor are always biased. Otherwise any edge strictly above
/// the threshold makes the branch biased, unless some edge carries a malformed ratio, in which
/// case nothing can be concluded and the branch is unbiased.
pub fn is_biased<P>(inst: &Instruction, block: BlockId, bpi: &P) -> bool
where
    P: BranchProbabilityOracle + ?Sized,
{
    if !inst.is_conditional() {
        // Unconditional transfers count as biased, even though there is no probability to
        // speak of.
        return true;
    }

    let mut biased = false;
    for succ in inst.unique_successors() {
        let prob = bpi.edge_probability(block, succ);
        if !prob.is_valid() {
            tracing::warn!(
                %block,
                successor = %succ,
                numerator = prob.numerator(),
                denominator = prob.denominator(),
                "malformed edge probability, treating {} as unbiased",
                inst.opcode()
            );
            return false;
        }
        biased |= prob.exceeds(BIAS_THRESHOLD_NUM, BIAS_THRESHOLD_DEN);
    }

    biased
}

/// Category of `inst`, which lives in `block`. Only branches consult `bpi`.
pub fn classify<P>(inst: &Instruction, block: BlockId, bpi: &P) -> Category
where
    P: BranchProbabilityOracle + ?Sized,
{
    use Opcode::*;
    match inst.opcode() {
        Br | Switch | IndirectBr => {
            if is_biased(inst, block, bpi) {
                Category::BiasedBranch
            } else {
                Category::UnbiasedBranch
            }
        }

        Add | Sub | Mul | UDiv | SDiv | URem | SRem | Shl | LShr | AShr | And | Or | Xor | ICmp => {
            Category::IntAlu
        }

        FAdd | FSub | FMul | FDiv | FRem | FCmp => Category::FloatAlu,

        Alloca | Load | Store | GetElementPtr | Fence | AtomicCmpXchg | AtomicRMW => {
            Category::Memory
        }

        _ => Category::Other,
    }
}

/// Weighted instruction counts for one function. The total is kept alongside the per-category
/// counts and always equals their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    counts: [u64; Category::COUNT],
    total: u64,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts `weight` more operations of `category`. Once the total reaches `u64::MAX` further
    /// weight is dropped, so the counts still sum to the total.
    pub fn add(&mut self, category: Category, weight: u64) {
        // No counter can exceed the total, so clamping against the total covers both.
        let clamped = weight.min(u64::MAX - self.total);
        if clamped != weight {
            tracing::warn!(%category, weight, "dynamic operation count overflowed, saturating");
        }
        self.counts[category.index()] += clamped;
        self.total += clamped;
    }

    pub fn get(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Share of each category in the total, indexed by [`Category::index`]. All zero when
    /// nothing executed.
    pub fn fractions(&self) -> [f64; Category::COUNT] {
        let mut result = [0.0; Category::COUNT];
        if self.total == 0 {
            return result;
        }

        for category in Category::ALL {
            result[category.index()] = self.get(category) as f64 / self.total as f64;
        }
        result
    }
}

impl std::ops::Index<Category> for CategoryTotals {
    type Output = u64;

    fn index(&self, category: Category) -> &u64 {
        &self.counts[category.index()]
    }
}

/// Walk every instruction of `func` and accumulate weighted category counts.
///
/// Blocks the frequency oracle knows nothing about weigh zero. Nothing here fails.
pub fn aggregate<B, P>(func: &Function, bfi: &B, bpi: &P, source: WeightSource) -> CategoryTotals
where
    B: BlockFrequency + ?Sized,
    P: BranchProbabilityOracle + ?Sized,
{
    let _span = tracing::debug_span!("instruction_mix", function = func.name()).entered();
    let mut totals = CategoryTotals::new();

    for block in func.blocks() {
        let id = block.id();
        let weight = match block_weight(bfi, id, source) {
            Some(weight) => weight,
            None => {
                tracing::debug!(block = %id, ?source, "no frequency data, weighing block as zero");
                0
            }
        };

        if weight == 0 {
            continue;
        }

        for inst in block.iter() {
            totals.add(classify(inst, id, bpi), weight);
        }
    }

    debug_assert_eq!(
        totals.iter().map(|(_, count)| count as u128).sum::<u128>(),
        totals.total() as u128
    );

    totals
}

/// Instruction mix summary of one function.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FunctionProfile {
    pub name: String,
    pub dynamic_op_count: u64,
    pub int_alu_frac: f64,
    pub float_alu_frac: f64,
    pub mem_frac: f64,
    pub biased_branch_frac: f64,
    pub unbiased_branch_frac: f64,
    pub other_frac: f64,
}

impl FunctionProfile {
    pub fn new(name: impl Into<String>, totals: &CategoryTotals) -> Self {
        let fractions = totals.fractions();
        let frac = |category: Category| fractions[category.index()];

        Self {
            name: name.into(),
            dynamic_op_count: totals.total(),
            int_alu_frac: frac(Category::IntAlu),
            float_alu_frac: frac(Category::FloatAlu),
            mem_frac: frac(Category::Memory),
            biased_branch_frac: frac(Category::BiasedBranch),
            unbiased_branch_frac: frac(Category::UnbiasedBranch),
            other_frac: frac(Category::Other),
        }
    }

    pub fn fraction(&self, category: Category) -> f64 {
        match category {
            Category::IntAlu => self.int_alu_frac,
            Category::FloatAlu => self.float_alu_frac,
            Category::Memory => self.mem_frac,
            Category::BiasedBranch => self.biased_branch_frac,
            Category::UnbiasedBranch => self.unbiased_branch_frac,
            Category::Other => self.other_frac,
        }
    }

    /// Fractions in [`Category::ALL`] order.
    pub fn fractions(&self) -> [f64; Category::COUNT] {
        Category::ALL.map(|category| self.fraction(category))
    }
}
