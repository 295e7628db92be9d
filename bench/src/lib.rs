/// A large, valid program shared by the benchmarks.
pub static INPUT: &str = include_str!("../../demos/big.dl");
