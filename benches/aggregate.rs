use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opmix::{
    BasicBlockBuilder, BlockFrequencyInfo, BlockId, BranchProbabilityInfo, Function, Opcode,
    Options, WeightSource,
};

const BODY: [Opcode; 8] = [
    Opcode::Load,
    Opcode::Add,
    Opcode::FMul,
    Opcode::GetElementPtr,
    Opcode::Store,
    Opcode::ICmp,
    Opcode::Call,
    Opcode::Phi,
];

/// A chain of `n` blocks, each branching to the next or back to the entry.
fn chain(n: usize) -> (Function, BlockFrequencyInfo, BranchProbabilityInfo) {
    let mut func = Function::new("chain");
    let blocks: Vec<_> = (0..n).map(|_| func.add_block()).collect();

    for (i, block) in blocks.iter().copied().enumerate() {
        let mut builder = BasicBlockBuilder::new(&mut func, block);
        builder.insts(BODY);
        match blocks.get(i + 1) {
            Some(next) => builder.branch(*next, blocks[0]),
            None => builder.ret(),
        }
    }

    let bfi = blocks
        .iter()
        .map(|block| (*block, 1 + (block.0 as u64 % 7) * 100))
        .collect::<BlockFrequencyInfo>()
        .with_entry_count(1 << 20);
    let bpi = BranchProbabilityInfo::new(&func);

    (func, bfi, bpi)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("InstructionMix");

    for n in [16usize, 1024] {
        let (func, bfi, bpi) = chain(n);
        let profile_count = Options::default();
        let relative = Options {
            weight_source: WeightSource::RelativeFrequency,
            ..Options::default()
        };

        group.bench_with_input(format!("profile count, {} blocks", n), &profile_count, |b, opts| {
            b.iter(|| opmix::profile_function(black_box(&func), &bfi, &bpi, opts))
        });
        group.bench_with_input(format!("relative frequency, {} blocks", n), &relative, |b, opts| {
            b.iter(|| opmix::profile_function(black_box(&func), &bfi, &bpi, opts))
        });
    }

    let (func, _, bpi) = chain(1024);
    let closure = |block: BlockId| Some(block.0 as u64);
    group.bench_function("closure oracle, 1024 blocks", |b| {
        b.iter(|| opmix::profile_function(black_box(&func), &closure, &bpi, &Options::default()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
