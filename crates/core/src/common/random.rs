use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// # Summary
/// 均匀随机数来源接口。人生 K 线合成中所有随机扰动都经由此接口抽取，
/// 以便测试注入确定性的序列。
///
/// # Invariants
/// - `next_unit` 返回值必须落在 `[0, 1)` 区间。
pub trait RandomSource {
    /// 抽取一个 `[0, 1)` 区间内的均匀随机数
    fn next_unit(&mut self) -> f64;
}

/// # Summary
/// 基于系统熵初始化的标准随机源，线上每次生成请求新建一个。
pub struct EntropyRandom {
    rng: StdRng,
}

impl EntropyRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// # Summary
/// 固定种子的随机源，同一种子产出完全相同的序列，用于复现某次合成结果。
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}
