use opmix::{
    report, BasicBlockBuilder, BlockFrequencyInfo, BlockId, BranchProbability,
    BranchProbabilityInfo, Function, Module, Opcode, Options, OutputFormat,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// `for (i = 0; i < n; i++) sum += a[i];`
fn sum_array() -> Function {
    let mut func = Function::new("sum_array");
    let entry = func.add_block();
    let header = func.add_block();
    let body = func.add_block();
    let exit = func.add_block();

    let mut builder = BasicBlockBuilder::new(&mut func, entry);
    builder.insts([Opcode::Alloca, Opcode::Alloca, Opcode::Store, Opcode::Store]);
    builder.jump(header);

    builder.block = header;
    builder.insts([Opcode::Load, Opcode::Load, Opcode::ICmp]);
    builder.branch(body, exit);

    builder.block = body;
    builder.insts([
        Opcode::Load,
        Opcode::SExt,
        Opcode::GetElementPtr,
        Opcode::Load,
        Opcode::Add,
        Opcode::Store,
        Opcode::Add,
        Opcode::Store,
    ]);
    builder.jump(header);

    builder.block = exit;
    builder.inst(Opcode::Load);
    builder.ret();

    func
}

/// A float kernel dispatched through a switch with no dominant case.
fn dispatch() -> Function {
    let mut func = Function::new("dispatch");
    let entry = func.add_block();
    let scale = func.add_block();
    let shift = func.add_block();
    let done = func.add_block();

    let mut builder = BasicBlockBuilder::new(&mut func, entry);
    builder.insts([Opcode::Load, Opcode::FCmp]);
    builder.switch(done, [scale, shift]);

    builder.block = scale;
    builder.insts([Opcode::FMul, Opcode::FAdd]);
    builder.jump(done);

    builder.block = shift;
    builder.insts([Opcode::FSub, Opcode::Call]);
    builder.jump(done);

    builder.block = done;
    builder.insts([Opcode::Phi, Opcode::Store]);
    builder.ret();

    func
}

fn frequencies(func: &Function) -> (BlockFrequencyInfo, BranchProbabilityInfo) {
    let bpi = BranchProbabilityInfo::new(func);
    match func.name() {
        "sum_array" => {
            let bfi = [(0, 8), (1, 264), (2, 256), (3, 8)]
                .into_iter()
                .map(|(block, freq)| (BlockId(block), freq))
                .collect::<BlockFrequencyInfo>()
                .with_entry_count(1000);
            let bpi = bpi
                .with_edge_probability(BlockId(1), BlockId(2), BranchProbability::new_unchecked(32, 33))
                .with_edge_probability(BlockId(1), BlockId(3), BranchProbability::new_unchecked(1, 33));
            (bfi, bpi)
        }
        _ => {
            let bfi = [(0, 6), (1, 2), (2, 2), (3, 6)]
                .into_iter()
                .map(|(block, freq)| (BlockId(block), freq))
                .collect::<BlockFrequencyInfo>()
                .with_entry_count(50);
            (bfi, bpi)
        }
    }
}

fn main() -> std::io::Result<()> {
    init_tracing();

    let mut opts = Options::default();
    if std::env::args().skip(1).any(|arg| arg == "--json") {
        opts.output = OutputFormat::Json;
    }

    let mut module = Module::new();
    module.add_function(sum_array());
    module.add_function(dispatch());

    for func in module.functions() {
        if let Err(err) = opmix::verify::verify_function(func) {
            tracing::error!("{}", err);
        }
        println!("{}", func.display_());
    }

    let profiles = opmix::profile_module(&module, frequencies, &opts);
    report::write_profiles(&mut std::io::stderr().lock(), &profiles, opts.output, opts.precision)
}
