use itertools::iproduct;
use log::{debug, trace};

use super::mask::VisitedMask;
use super::{BoundaryPath, FloodParams, FloodReport, FloodState, FuzzinessKind};
use crate::consts::{ALL_NEIGHBOURS, FACE_NEIGHBOURS};
use crate::data::{GridShape, VolumeLayer};
use crate::error::{FloodError, FloodResult};
use crate::{Idx3d, Point3, Vector3};

/// 待检查点, 及生长到它的来源点.
#[derive(Copy, Clone, Debug)]
struct FrontierEntry {
    check: Point3,
    source: Point3,
}

/// 区域生长器.
///
/// 在 `target` 上生长并把结果写入它的 ROI; 体素值 (模糊容差) 默认读取自 `target`,
/// 也可以通过 [`Self::with_source`] 指定另一个体数据.
///
/// # 例子
///
/// ```
/// use vol_berry::prelude::*;
///
/// let volume = Volume::filled((5, 5, 5), 1u8, [1.0, 1.0, 1.0]);
/// let mut layer = VolumeLayer::new(volume).unwrap();
/// let roi = layer.selection.create_region();
/// let params = FloodParams::default().with_roi(roi);
///
/// let report = Flooder::new(&mut layer, &params)
///     .run(Point3::new(2.0, 2.0, 2.0), |_| true, |_| {}, || false)
///     .unwrap();
/// assert_eq!(report.state, FloodState::Completed);
/// assert_eq!(report.accepted, 125);
/// assert_eq!(layer.selection.region(roi).unwrap().count(), 125);
/// ```
pub struct Flooder<'a> {
    target: &'a mut VolumeLayer,
    source: Option<&'a VolumeLayer>,
    paths: &'a [BoundaryPath],
    params: &'a FloodParams,
    state: FloodState,
}

impl<'a> Flooder<'a> {
    /// 在 `target` 上以参数 `params` 创建生长器.
    #[inline]
    pub fn new(target: &'a mut VolumeLayer, params: &'a FloodParams) -> Self {
        Self {
            target,
            source: None,
            paths: &[],
            params,
            state: FloodState::Idle,
        }
    }

    /// 从 `source` 读取体素值. `target` 中超出 `source` 范围的体素会被丢弃.
    #[inline]
    pub fn with_source(mut self, source: &'a VolumeLayer) -> Self {
        self.source = Some(source);
        self
    }

    /// 设置阻断路径.
    #[inline]
    pub fn with_paths(mut self, paths: &'a [BoundaryPath]) -> Self {
        self.paths = paths;
        self
    }

    /// 当前状态.
    #[inline]
    pub fn state(&self) -> FloodState {
        self.state
    }

    /// 从世界坐标 `seed` 开始生长.
    ///
    /// - `accept`: 最后一项检查. 返回 `false` 时丢弃该点.
    /// - `visit`: 对每个通过检查的点调用一次.
    /// - `stop`: 每次迭代前调用一次. 返回 `true` 时立即以 [`FloodState::StoppedByCaller`] 结束.
    ///
    /// `params.roi` 不存在于 `target` 时返回 `Err`, 此时不做任何工作.
    pub fn run<A, V, S>(
        &mut self,
        seed: Point3,
        mut accept: A,
        mut visit: V,
        mut stop: S,
    ) -> FloodResult<FloodReport>
    where
        A: FnMut(&Point3) -> bool,
        V: FnMut(&Point3),
        S: FnMut() -> bool,
    {
        if let Some(roi) = self.params.roi {
            if self.target.selection.region(roi).is_none() {
                trace!("区域生长目标 ROI {roi} 不存在");
                return Err(FloodError::RoiNotFound(roi));
            }
        }

        self.state = FloodState::Running;
        let seed_value = self.source_layer().sample_at_world(&seed).unwrap_or(0.0);
        debug!("区域生长开始: 种子 {seed:?}, 种子值 {seed_value}");

        let mut mask = VisitedMask::new(self.target.shape());
        let mut frontier = vec![FrontierEntry {
            check: seed,
            source: seed,
        }];
        let mut accepted = 0usize;
        let mut state = FloodState::Completed;

        while let Some(entry) = frontier.pop() {
            if stop() {
                state = FloodState::StoppedByCaller;
                break;
            }
            let Some(pos) = self.target.index_of(&entry.check) else {
                continue;
            };
            if self
                .source
                .is_some_and(|s| s.index_of(&entry.check).is_none())
            {
                continue;
            }
            if !mask.set_visited(pos) {
                continue;
            }
            if !self.admits(&entry, pos, &seed, seed_value) || !accept(&entry.check) {
                continue;
            }

            accepted += 1;
            if let Some(roi) = self.params.roi {
                self.target.selection.select(roi, pos)?;
            }
            visit(&entry.check);
            self.push_neighbours(&mut frontier, &entry.check);
        }

        self.state = state;
        let report = FloodReport {
            state,
            accepted,
            visited: mask.count(),
        };
        debug!("区域生长结束: {report:?}");
        Ok(report)
    }

    /// 读取体素值的体数据.
    #[inline]
    fn source_layer(&self) -> &VolumeLayer {
        self.source.unwrap_or(&*self.target)
    }

    /// 依次检查阻断路径, 其它 ROI, 最大距离, 零值, 模糊容差.
    ///
    /// "其它 ROI" 指 `params.roi` 以外的 ROI; 未指定 `params.roi` 时指当前 ROI 以外的 ROI.
    fn admits(&self, entry: &FrontierEntry, pos: Idx3d, seed: &Point3, seed_value: f64) -> bool {
        let p = self.params;
        if p.stop_at_paths
            && self
                .paths
                .iter()
                .any(|path| path.crosses(&entry.source, &entry.check, &p.view_normal))
        {
            return false;
        }
        let own = p.roi.or(self.target.selection.current());
        if p.stop_at_rois && self.target.selection.is_selected_excluding(pos, own) {
            return false;
        }
        if p.max_distance > 0.0 && (entry.check - seed).norm() > p.max_distance {
            return false;
        }
        if p.only_zero && self.target.volume.sample(pos) != 0.0 {
            return false;
        }
        if p.fuzziness > 0.0 {
            let src = self.source_layer();
            let value = src.sample_at_world(&entry.check).unwrap_or(0.0);
            let base = match p.fuzziness_kind {
                FuzzinessKind::Seed => seed_value,
                FuzzinessKind::Gradient => src.sample_at_world(&entry.source).unwrap_or(0.0),
            };
            if (value - base).abs() > p.fuzziness {
                return false;
            }
        }
        true
    }

    /// 将 `center` 的邻居 (按目标体素分辨率偏移) 压栈. 跳过被固定的轴.
    fn push_neighbours(&self, frontier: &mut Vec<FrontierEntry>, center: &Point3) {
        let [sx, sy, sz] = self.target.volume.spacing();
        let fixed = self.params.fixed_axes();
        frontier.reserve(if self.params.diagonal {
            ALL_NEIGHBOURS
        } else {
            FACE_NEIGHBOURS
        });
        let steps = |axis: usize| if fixed[axis] { 0..=0 } else { -1..=1 };
        for (dz, dy, dx) in iproduct!(steps(2), steps(1), steps(0)) {
            let dist2 = dx * dx + dy * dy + dz * dz;
            if dist2 == 0 || (!self.params.diagonal && dist2 != 1) {
                continue;
            }
            let offset = Vector3::new(f64::from(dx) * sx, f64::from(dy) * sy, f64::from(dz) * sz);
            frontier.push(FrontierEntry {
                check: center + offset,
                source: *center,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Flooder;
    use crate::data::{Volume, VolumeLayer};
    use crate::error::FloodError;
    use crate::flood::{flood, BoundaryPath, FloodParams, FloodState, FuzzinessKind};
    use crate::selection::RoiId;
    use crate::{Idx3d, Point3, Vector3};
    use ndarray::Array3;
    use std::collections::HashSet;

    fn init_log() {
        let _ = simple_logger::SimpleLogger::new().init();
    }

    fn layer_with(shape: Idx3d, f: impl Fn(Idx3d) -> f32) -> VolumeLayer {
        let data = Array3::from_shape_fn(shape, f);
        VolumeLayer::new(Volume::with_spacing(data, [1.0, 1.0, 1.0])).unwrap()
    }

    fn uniform() -> VolumeLayer {
        layer_with((5, 5, 5), |_| 1.0)
    }

    fn x_ramp() -> VolumeLayer {
        layer_with((5, 5, 5), |(i, _, _)| 10.0 * i as f32)
    }

    fn center() -> Point3 {
        Point3::new(2.0, 2.0, 2.0)
    }

    fn to_index(p: &Point3) -> Idx3d {
        (p.x.round() as usize, p.y.round() as usize, p.z.round() as usize)
    }

    #[test]
    fn test_uniform_volume_fills_completely() {
        init_log();
        let mut layer = uniform();
        let report = flood(&mut layer, center(), &FloodParams::default()).unwrap();
        assert_eq!(report.state, FloodState::Completed);
        assert_eq!(report.accepted, 125);
        assert_eq!(report.visited, 125);
    }

    #[test]
    fn test_stops_at_other_roi() {
        init_log();
        let mut layer = uniform();
        let block = layer.selection.create_region();
        for (i, j, k) in itertools::iproduct!(1..4, 1..4, 1..4) {
            layer.selection.select(block, (i, j, k)).unwrap();
        }
        // 新建的空 ROI 成为当前 ROI, `block` 不再是当前 ROI.
        layer.selection.create_region();
        let report = flood(&mut layer, Point3::origin(), &FloodParams::default()).unwrap();
        assert_eq!(report.accepted, 98);

        let ignored = FloodParams::default().with_stops(true, false);
        assert_eq!(flood(&mut layer, Point3::origin(), &ignored).unwrap().accepted, 125);
    }

    #[test]
    fn test_own_roi_is_not_a_barrier() {
        let mut layer = uniform();
        let roi = layer.selection.create_region();
        layer.selection.select(roi, (2, 2, 3)).unwrap();
        let params = FloodParams::default().with_roi(roi);
        assert_eq!(flood(&mut layer, center(), &params).unwrap().accepted, 125);
    }

    #[test]
    fn test_current_roi_is_not_a_barrier() {
        let mut layer = uniform();
        let current = layer.selection.create_region();
        layer.selection.select(current, (2, 2, 3)).unwrap();
        assert_eq!(layer.selection.current(), Some(current));
        let report = flood(&mut layer, center(), &FloodParams::default()).unwrap();
        assert_eq!(report.accepted, 125);

        // 显式指定的 ROI 优先于当前 ROI, 此时当前 ROI 会阻断生长.
        let other = layer.selection.create_region();
        layer.selection.set_current(current).unwrap();
        let params = FloodParams::default().with_roi(other);
        assert_eq!(flood(&mut layer, center(), &params).unwrap().accepted, 124);
    }

    #[test]
    fn test_max_distance() {
        let mut layer = uniform();
        let params = FloodParams::default().with_max_distance(1.5);
        let mut seen = Vec::new();
        let report = Flooder::new(&mut layer, &params)
            .run(center(), |_| true, |p| seen.push(*p), || false)
            .unwrap();
        assert_eq!(report.accepted, 19);
        assert_eq!(seen.len(), 19);
        assert!(seen.iter().all(|p| (p - center()).norm() <= 1.5));
    }

    #[test]
    fn test_gradient_fuzziness() {
        let mut layer = x_ramp();
        let tight = FloodParams::default().with_fuzziness(5.0, FuzzinessKind::Gradient);
        assert_eq!(flood(&mut layer, center(), &tight).unwrap().accepted, 25);

        // 相邻差值恰好等于容差时不阻断.
        let loose = FloodParams::default().with_fuzziness(10.0, FuzzinessKind::Gradient);
        assert_eq!(flood(&mut layer, center(), &loose).unwrap().accepted, 125);
    }

    #[test]
    fn test_seed_fuzziness() {
        let mut layer = x_ramp();
        let params = FloodParams::default().with_fuzziness(15.0, FuzzinessKind::Seed);
        let mut xs = HashSet::new();
        let report = Flooder::new(&mut layer, &params)
            .run(center(), |_| true, |p| {
                xs.insert(to_index(p).0);
            }, || false)
            .unwrap();
        assert_eq!(report.accepted, 75);
        assert_eq!(xs, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn test_only_zero() {
        let mut layer = layer_with((5, 5, 5), |(i, _, _)| if i == 2 { 1.0 } else { 0.0 });
        let params = FloodParams::default().with_only_zero(true);
        let report = flood(&mut layer, Point3::origin(), &params).unwrap();
        assert_eq!(report.accepted, 50);
        // 墙上的体素被检查过但未通过.
        assert_eq!(report.visited, 75);
    }

    #[test]
    fn test_diagonal_neighbours() {
        let diag = |(i, j, k): Idx3d| if i == j && j == k { 0.0 } else { 1.0 };
        let mut layer = layer_with((5, 5, 5), diag);
        let six = FloodParams::default().with_only_zero(true);
        assert_eq!(flood(&mut layer, Point3::origin(), &six).unwrap().accepted, 1);

        let all = six.with_diagonal(true);
        assert_eq!(flood(&mut layer, Point3::origin(), &all).unwrap().accepted, 5);
    }

    #[test]
    fn test_path_blocks_growth_in_plane() {
        init_log();
        let mut layer = uniform();
        let paths = [BoundaryPath::new(vec![
            Point3::new(-1.0, 2.5, 2.0),
            Point3::new(5.0, 2.5, 2.0),
        ])];
        let params = FloodParams::default()
            .with_view_normal(Vector3::z())
            .restricted_to_plane(2);
        let seed = Point3::new(2.0, 0.0, 2.0);

        let report = Flooder::new(&mut layer, &params)
            .with_paths(&paths)
            .run(seed, |_| true, |_| {}, || false)
            .unwrap();
        assert_eq!(report.accepted, 15);
        assert_eq!(report.visited, 20);

        let ignored = params.clone().with_stops(false, true);
        let report = Flooder::new(&mut layer, &ignored)
            .with_paths(&paths)
            .run(seed, |_| true, |_| {}, || false)
            .unwrap();
        assert_eq!(report.accepted, 25);
    }

    #[test]
    fn test_stop_requested() {
        let mut layer = uniform();
        let params = FloodParams::default();
        let mut calls = 0;
        let mut flooder = Flooder::new(&mut layer, &params);
        assert_eq!(flooder.state(), FloodState::Idle);
        let report = flooder
            .run(
                center(),
                |_| true,
                |_| {},
                || {
                    calls += 1;
                    calls > 10
                },
            )
            .unwrap();
        assert_eq!(report.state, FloodState::StoppedByCaller);
        assert_eq!(flooder.state(), FloodState::StoppedByCaller);
        assert!(report.accepted >= 1 && report.accepted <= 10);
    }

    #[test]
    fn test_each_voxel_checked_once() {
        let mut layer = uniform();
        let params = FloodParams::default().with_diagonal(true);
        let mut checked = HashSet::new();
        let report = Flooder::new(&mut layer, &params)
            .run(center(), |p| {
                assert!(checked.insert(to_index(p)));
                true
            }, |_| {}, || false)
            .unwrap();
        assert_eq!(checked.len(), 125);
        assert_eq!(report.accepted, 125);
    }

    #[test]
    fn test_caller_rejects() {
        let mut layer = uniform();
        let params = FloodParams::default();
        let report = Flooder::new(&mut layer, &params)
            .run(center(), |p| p.z <= 2.0, |_| {}, || false)
            .unwrap();
        assert_eq!(report.accepted, 75);
    }

    #[test]
    fn test_separate_source_volume() {
        let mut target = layer_with((5, 5, 5), |_| 0.0);
        let source = x_ramp();
        let params = FloodParams::default().with_fuzziness(15.0, FuzzinessKind::Seed);
        let report = Flooder::new(&mut target, &params)
            .with_source(&source)
            .run(center(), |_| true, |_| {}, || false)
            .unwrap();
        assert_eq!(report.accepted, 75);

        // 超出来源体数据范围的体素被丢弃.
        let thin = layer_with((5, 5, 2), |_| 1.0);
        let report = Flooder::new(&mut target, &FloodParams::default())
            .with_source(&thin)
            .run(Point3::new(2.0, 2.0, 0.0), |_| true, |_| {}, || false)
            .unwrap();
        assert_eq!(report.accepted, 50);
    }

    #[test]
    fn test_marks_accepted_into_roi() {
        let mut layer = uniform();
        let roi = layer.selection.create_region();
        let params = FloodParams::default().with_roi(roi).with_max_distance(1.5);
        let report = flood(&mut layer, center(), &params).unwrap();
        assert_eq!(report.accepted, 19);
        let region = layer.selection.region(roi).unwrap();
        assert_eq!(region.count(), 19);
        assert!(region.contains(&(2, 2, 2)));
        assert!(layer.selection.is_selected((2, 3, 3)).is_some());
        assert!(layer.selection.is_selected((2, 4, 4)).is_none());
    }

    #[test]
    fn test_missing_roi_is_rejected_up_front() {
        let mut layer = uniform();
        let params = FloodParams::default().with_roi(RoiId(42));
        let mut visits = 0;
        let mut flooder = Flooder::new(&mut layer, &params);
        let err = flooder
            .run(center(), |_| true, |_| visits += 1, || false)
            .unwrap_err();
        assert_eq!(err, FloodError::RoiNotFound(RoiId(42)));
        assert_eq!(flooder.state(), FloodState::Idle);
        assert_eq!(visits, 0);
    }

    #[test]
    fn test_seed_outside_volume() {
        let mut layer = uniform();
        let report = flood(&mut layer, Point3::new(-3.0, 0.0, 0.0), &FloodParams::default())
            .unwrap();
        assert_eq!(report.state, FloodState::Completed);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.visited, 0);
    }
}
