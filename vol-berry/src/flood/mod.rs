//! 区域生长 (flood fill).
//!
//! 从世界坐标种子点出发, 以栈 (LIFO) 维护待检查点, 逐个检查 6-邻域 (或 26-邻域) 体素.
//! 每个体素在一次生长中最多被检查一次. 依次检查以下条件, 任一不满足即丢弃该体素
//! (但它仍被视为已访问):
//!
//! 1. 从来源点到该点的线段是否穿过任一阻断路径;
//! 2. 该体素是否已被其它 ROI (生长目标 ROI 或当前 ROI 以外的 ROI) 选中;
//! 3. 是否超出距种子点的最大距离;
//! 4. 仅生长零值体素时, 体素值是否为 0;
//! 5. 体素值与种子值 (或来源点值) 之差是否超过容差;
//! 6. 调用者提供的判定函数.
//!
//! 通过检查的体素会被加入指定的 ROI, 并回调调用者.

use crate::selection::RoiId;
use crate::{Point3, Vector3};

mod imp;
mod mask;
mod path;

pub use imp::Flooder;
pub use path::BoundaryPath;

use crate::data::VolumeLayer;
use crate::error::FloodResult;

/// 模糊容差的比较基准.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FuzzinessKind {
    /// 与种子点的值比较.
    #[default]
    Seed,

    /// 与生长到该点的来源点的值比较.
    Gradient,
}

/// 区域生长参数.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloodParams {
    /// 是否在阻断路径处停止.
    pub stop_at_paths: bool,

    /// 是否在其它 ROI 处停止.
    pub stop_at_rois: bool,

    /// 是否在三维空间中生长. 为 `false` 时, `work_plane` 为 `true` 的轴被固定.
    pub three_d: bool,

    /// 二维生长时固定的轴.
    pub work_plane: [bool; 3],

    /// 视线方向. 阻断路径沿该方向延伸成 "墙".
    pub view_normal: Vector3,

    /// 模糊容差. 不大于 0 时不检查.
    pub fuzziness: f64,

    /// 模糊容差的比较基准.
    pub fuzziness_kind: FuzzinessKind,

    /// 距种子点的最大世界距离. 不大于 0 时不检查.
    pub max_distance: f64,

    /// 是否使用 26-邻域.
    pub diagonal: bool,

    /// 是否只生长值为 0 的体素.
    pub only_zero: bool,

    /// 接收生长结果的 ROI. 同时在 ROI 阻断检查中被排除;
    /// 为 `None` 时, 被排除的是目标体数据的当前 ROI.
    pub roi: Option<RoiId>,
}

impl Default for FloodParams {
    fn default() -> Self {
        Self {
            stop_at_paths: true,
            stop_at_rois: true,
            three_d: true,
            work_plane: [true; 3],
            view_normal: Vector3::zeros(),
            fuzziness: 0.0,
            fuzziness_kind: FuzzinessKind::Seed,
            max_distance: 0.0,
            diagonal: false,
            only_zero: false,
            roi: None,
        }
    }
}

impl FloodParams {
    /// 各轴是否被固定, 即生长时不沿该轴移动.
    #[inline]
    pub fn fixed_axes(&self) -> [bool; 3] {
        self.work_plane.map(|w| !self.three_d && w)
    }

    /// 将生长结果写入 `roi`.
    #[inline]
    pub fn with_roi(mut self, roi: RoiId) -> Self {
        self.roi = Some(roi);
        self
    }

    /// 设置模糊容差.
    #[inline]
    pub fn with_fuzziness(mut self, fuzziness: f64, kind: FuzzinessKind) -> Self {
        self.fuzziness = fuzziness;
        self.fuzziness_kind = kind;
        self
    }

    /// 设置最大距离.
    #[inline]
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// 使用 26-邻域.
    #[inline]
    pub fn with_diagonal(mut self, diagonal: bool) -> Self {
        self.diagonal = diagonal;
        self
    }

    /// 只生长值为 0 的体素.
    #[inline]
    pub fn with_only_zero(mut self, only_zero: bool) -> Self {
        self.only_zero = only_zero;
        self
    }

    /// 设置阻断条件.
    #[inline]
    pub fn with_stops(mut self, at_paths: bool, at_rois: bool) -> Self {
        self.stop_at_paths = at_paths;
        self.stop_at_rois = at_rois;
        self
    }

    /// 设置视线方向.
    #[inline]
    pub fn with_view_normal(mut self, view_normal: Vector3) -> Self {
        self.view_normal = view_normal;
        self
    }

    /// 只在垂直于第 `axis` 轴 (0, 1, 2 分别为 x, y, z) 的平面内生长.
    #[inline]
    pub fn restricted_to_plane(mut self, axis: usize) -> Self {
        self.three_d = false;
        self.work_plane = [false; 3];
        self.work_plane[axis] = true;
        self
    }
}

/// 区域生长状态.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FloodState {
    /// 尚未开始.
    #[default]
    Idle,

    /// 正在生长.
    Running,

    /// 待检查点耗尽, 正常结束.
    Completed,

    /// 被调用者中止.
    StoppedByCaller,
}

/// 一次区域生长的结果.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloodReport {
    /// 终止状态.
    pub state: FloodState,

    /// 通过所有检查的体素个数.
    pub accepted: usize,

    /// 被检查过的体素个数.
    pub visited: usize,
}

/// 在 `target` 上从 `seed` 开始生长, 不使用阻断路径, 也不回调.
///
/// 需要收集结果时, 设置 `params.roi`.
#[inline]
pub fn flood(
    target: &mut VolumeLayer,
    seed: Point3,
    params: &FloodParams,
) -> FloodResult<FloodReport> {
    Flooder::new(target, params).run(seed, |_| true, |_| {}, || false)
}
