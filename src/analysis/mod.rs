pub mod block_frequency;
pub mod branch_probability;
pub mod instruction_mix;
