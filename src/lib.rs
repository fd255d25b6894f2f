pub mod analysis;
pub mod block;
pub mod function;
pub mod instruction;
pub mod opcode;
pub mod report;
pub mod verify;


pub use analysis::{
    block_frequency::{BlockFrequency, BlockFrequencyInfo},
    branch_probability::{BranchProbability, BranchProbabilityInfo, BranchProbabilityOracle},
    instruction_mix::{Category, CategoryTotals, FunctionProfile},
};
pub use block::{BasicBlock, BasicBlockBuilder, BlockId};
pub use function::{Function, Module};
pub use instruction::Instruction;
pub use opcode::Opcode;

/// Which block estimate weighs instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeightSource {
    /// Estimated absolute execution count: relative frequency scaled by the function's entry
    /// count. Only available with profile data.
    #[default]
    ProfileCount,
    /// Relative block frequency, available even without profile data.
    RelativeFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// `name, count, int, float, mem, biased, unbiased, other`, one function per line.
    #[default]
    Csv,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub weight_source: WeightSource,
    pub output: OutputFormat,
    /// Decimal places of fractions in CSV output.
    pub precision: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            weight_source: WeightSource::default(),
            output: OutputFormat::default(),
            precision: 3,
        }
    }
}

/// Profile one function. Never fails: missing frequencies weigh zero and malformed
/// probabilities make a branch unbiased.
pub fn profile_function<B, P>(func: &Function, bfi: &B, bpi: &P, options: &Options) -> FunctionProfile
where
    B: BlockFrequency + ?Sized,
    P: BranchProbabilityOracle + ?Sized,
{
    let totals = analysis::instruction_mix::aggregate(func, bfi, bpi, options.weight_source);
    let profile = FunctionProfile::new(func.name(), &totals);

    tracing::debug!(
        function = func.name(),
        instructions = func.num_instructions(),
        dynamic_op_count = profile.dynamic_op_count,
        "profiled"
    );

    profile
}

/// Profile every function of `module` in definition order. `oracles` hands out the frequency
/// and probability analyses of each function; functions share nothing else.
pub fn profile_module<B, P, F>(module: &Module, mut oracles: F, options: &Options) -> Vec<FunctionProfile>
where
    B: BlockFrequency,
    P: BranchProbabilityOracle,
    F: FnMut(&Function) -> (B, P),
{
    module
        .functions()
        .map(|func| {
            let (bfi, bpi) = oracles(func);
            profile_function(func, &bfi, &bpi, options)
        })
        .collect()
}
