//! 体素值直方图.

use itertools::{Itertools, MinMaxResult};
use log::debug;
use num::ToPrimitive;
use ordered_float::OrderedFloat;

use crate::data::{with_array, GridShape, Volume, VolumeSpace};
use crate::Point3;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::Axis;
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 等宽直方图. 第 `n` 个桶覆盖 `[min + n * bin_width, min + (n + 1) * bin_width)`,
/// 最大值落入最后一个桶.
///
/// 所有统计值都相等时 `bin_width` 为 0, 此时所有值都落入第 0 个桶.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histogram {
    min: f64,
    bin_width: f64,
    counts: Vec<u64>,
}

impl Histogram {
    /// 以值域 `[min, max]` 创建 `bins` 个空桶.
    fn with_range(min: f64, max: f64, bins: usize) -> Self {
        assert_ne!(bins, 0, "直方图至少需要一个桶");
        Self {
            min,
            bin_width: (max - min) / bins as f64,
            counts: vec![0; bins],
        }
    }

    /// 获取 `value` 所属的桶.
    #[inline]
    fn bin_of(&self, value: f64) -> usize {
        if self.bin_width <= 0.0 {
            return 0;
        }
        let n = ((value - self.min) / self.bin_width).floor();
        (n.max(0.0) as usize).min(self.counts.len() - 1)
    }

    /// 统计点集 `points` (世界坐标) 上最近体素的值. 越界点的值视为 0.
    ///
    /// 点集为空时返回全零直方图, `min` 和 `bin_width` 均为 0.
    ///
    /// 当 `bins == 0` 时 panic.
    pub fn from_points(
        volume: &Volume,
        space: &VolumeSpace,
        points: &[Point3],
        bins: usize,
    ) -> Self {
        let values: Vec<f64> = points
            .iter()
            .map(|p| {
                volume
                    .checked(space.world_to_index(p))
                    .map_or(0.0, |pos| volume.sample(pos))
            })
            .collect();
        let (min, max) = match values.iter().copied().map(OrderedFloat).minmax() {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(v) => (v.0, v.0),
            MinMaxResult::MinMax(lo, hi) => (lo.0, hi.0),
        };
        let mut hist = Self::with_range(min, max, bins);
        for v in values {
            let n = hist.bin_of(v);
            hist.counts[n] += 1;
        }
        debug!("点集直方图: {} 个点, 值域 [{min}, {max}]", points.len());
        hist
    }

    /// 统计整个体数据, 但跳过值在 `[low, high]` 内的体素.
    /// 值域取整个体数据 (包括被跳过的体素) 的值域.
    ///
    /// 当 `bins == 0` 时 panic.
    pub fn from_volume_ignoring(volume: &Volume, bins: usize, low: f64, high: f64) -> Self {
        let (min, max) = volume.value_range();
        let mut hist = Self::with_range(min, max, bins);
        with_array!(volume.data(), a => {
            for v in a.iter() {
                let v = v.to_f64().unwrap_or_default();
                if !(low..=high).contains(&v) {
                    let n = hist.bin_of(v);
                    hist.counts[n] += 1;
                }
            }
        });
        debug!("体数据直方图: 值域 [{min}, {max}], 共 {} 个体素", hist.total());
        hist
    }

    /// 借助 `rayon`, 按深度方向切片并行地运行 [`Self::from_volume_ignoring`].
    /// 结果与串行版本完全一致.
    #[cfg(feature = "rayon")]
    pub fn par_from_volume_ignoring(volume: &Volume, bins: usize, low: f64, high: f64) -> Self {
        let (min, max) = volume.value_range();
        let mut hist = Self::with_range(min, max, bins);
        let template = &hist;
        let counts = with_array!(volume.data(), a => a
            .axis_iter(Axis(2))
            .into_par_iter()
            .map(|slice| {
                let mut local = vec![0u64; bins];
                for v in slice.iter() {
                    let v = v.to_f64().unwrap_or_default();
                    if !(low..=high).contains(&v) {
                        local[template.bin_of(v)] += 1;
                    }
                }
                local
            })
            .reduce(
                || vec![0u64; bins],
                |mut acc, local| {
                    acc.iter_mut().zip(local).for_each(|(a, b)| *a += b);
                    acc
                },
            ));
        hist.counts = counts;
        hist
    }

    /// 值域下界.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 桶宽.
    #[inline]
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// 各桶计数.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// 桶个数.
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// 总计数.
    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// 第 `n` 个桶覆盖的值域 `[下界, 上界)`.
    #[inline]
    pub fn bin_range(&self, n: usize) -> (f64, f64) {
        let lo = self.min + n as f64 * self.bin_width;
        (lo, lo + self.bin_width)
    }
}
