//! 平面光栅化: 找出与世界坐标下的四边形 / 圆形相交的所有体素.
//!
//! 对四边形四个角点所在体素构成的索引包围长方体中的每个体素,
//! 将其 12 条棱 (角点位于索引 ±0.5 处, 变换到世界坐标) 与四边形所在平面求交.
//! 若任一交点以角度和判定位于四边形内, 则输出该体素中心的世界坐标.

use itertools::iproduct;
use log::trace;

use crate::consts::{CELL_SNAP_EPS, CUBE_EDGES};
use crate::data::VolumeSpace;
use crate::geometry::{inside_by_angle_sum, segment_plane_intersect};
use crate::{Idx3dI, Point3};

/// 依附于某个坐标空间的平面光栅化器.
#[derive(Copy, Clone, Debug)]
pub struct PlaneRasterizer<'a> {
    space: &'a VolumeSpace,
}

impl<'a> PlaneRasterizer<'a> {
    /// 在坐标空间 `space` 上创建光栅化器.
    #[inline]
    pub fn new(space: &'a VolumeSpace) -> Self {
        Self { space }
    }

    /// 获取与四边形 `quad` 相交的所有体素中心, 按 `k`, `j`, `i` 升序排列, 不重复.
    ///
    /// 四个角点应共面且按环绕顺序给出. 包围长方体不会被裁剪到体数据范围内,
    /// 越界体素的中心同样会被输出, 由调用者过滤.
    ///
    /// 当四个角点落在同一个体素内 (包括该体素的某个表面上) 时, 直接输出该体素中心.
    pub fn points_in_quad(&self, quad: &[Point3; 4]) -> Vec<Point3> {
        let [a, b, c, _] = quad;
        let normal = (b - a).cross(&(c - a));

        let idx = quad.map(|p| self.space.world_to_index_f(&p));
        let span = |axis: usize| {
            let (min, max) = idx.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |acc, p| {
                (acc.0.min(p[axis]), acc.1.max(p[axis]))
            });
            cell_span(min, max)
        };
        let ((i0, i1), (j0, j1), (k0, k1)) = (span(0), span(1), span(2));
        let (lo, hi): (Idx3dI, Idx3dI) = ((i0, j0, k0), (i1, j1, k1));

        if lo == hi {
            return vec![self.space.signed_index_to_world(lo)];
        }

        let mut points = Vec::new();
        for (k, j, i) in iproduct!(lo.2..=hi.2, lo.1..=hi.1, lo.0..=hi.0) {
            let corners = self.cell_corners((i, j, k));
            let hit = CUBE_EDGES.iter().any(|&(s, e)| {
                segment_plane_intersect(&corners[s], &corners[e], a, &normal)
                    .is_some_and(|x| inside_by_angle_sum(&x, quad))
            });
            if hit {
                points.push(self.space.signed_index_to_world((i, j, k)));
            }
        }
        trace!("四边形光栅化得到 {} 个体素", points.len());
        points
    }

    /// 获取 [`Self::points_in_quad`] 的结果中, 与 `center` 距离不超过 `radius` 的体素中心.
    pub fn points_in_circle(&self, quad: &[Point3; 4], center: &Point3, radius: f64) -> Vec<Point3> {
        let mut points = self.points_in_quad(quad);
        points.retain(|p| (p - center).norm() <= radius);
        points
    }

    /// 体素 `(i, j, k)` 外包立方体的 8 个角点的世界坐标.
    fn cell_corners(&self, (i, j, k): Idx3dI) -> [Point3; 8] {
        std::array::from_fn(|n| {
            let offset = |bit: usize| if n & bit == 0 { -0.5 } else { 0.5 };
            self.space.index_to_world_f(&Point3::new(
                i as f64 + offset(1),
                j as f64 + offset(2),
                k as f64 + offset(4),
            ))
        })
    }
}

/// 浮点索引区间 `[min, max]` 所覆盖的体素范围 `(lo, hi)`.
///
/// 恰好落在两个体素交界处的端点只归入区间内侧的体素; 区间退化到交界面上时取较小的一侧.
fn cell_span(min: f64, max: f64) -> (i64, i64) {
    let lo = (min + CELL_SNAP_EPS - 0.5).ceil() as i64;
    let hi = (max - CELL_SNAP_EPS - 0.5).ceil() as i64;
    (lo.min(hi), hi)
}
