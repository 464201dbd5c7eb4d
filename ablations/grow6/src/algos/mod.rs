mod profile;

use log::info;
use utils::phantom;
use vol_berry::prelude::*;

pub use profile::Profile;

/// 每组实验使用的种子点 (相对 phantom 中心的偏移).
const SEED_OFFSETS: [(f64, f64, f64); 5] = [
    (0.0, 0.0, 0.0),
    (2.0, 0.0, 0.0),
    (-2.0, 0.0, 0.0),
    (0.0, 2.0, 0.0),
    (0.0, 0.0, -2.0),
];

/// 球内体素值在 `[100, 100 + r]` 之间, 球外为 0. 该容差足以将生长限制在球内.
const SPHERE_TOLERANCE: f64 = 60.0;

/// 从每个种子点出发, 在 `layer` 的一份拷贝上生长一次, 并统计结果.
///
/// `budget` 不为 `None` 时, 单次生长最多检查这么多次待检查点.
fn grow(
    name: &str,
    layer: &VolumeLayer,
    params: &FloodParams,
    paths: &[BoundaryPath],
    budget: Option<usize>,
) -> Profile {
    let mut profile = Profile::new();
    let center = phantom::center(layer.width());
    for (dx, dy, dz) in SEED_OFFSETS {
        let mut target = layer.clone();
        let roi = target.selection.create_region();
        let params = params.clone().with_roi(roi);
        let seed = center + Vector3::new(dx, dy, dz);

        let mut steps = 0usize;
        profile.grow_start();
        let report = Flooder::new(&mut target, &params)
            .with_paths(paths)
            .run(seed, |_| true, |_| {}, || {
                steps += 1;
                budget.is_some_and(|b| steps > b)
            });
        match report {
            Ok(report) => {
                profile.grow_finished(&report);
                info!("{name}: 种子 {seed:?}, {report:?}");
            }
            Err(e) => log::error!("{name}: 种子 {seed:?} 生长失败: {e}"),
        }
    }
    profile.finish()
}

/// 6-邻域, 种子容差.
pub fn six(size: usize) -> Profile {
    let layer = phantom::sphere(size);
    let params = FloodParams::default().with_fuzziness(SPHERE_TOLERANCE, FuzzinessKind::Seed);
    grow("six", &layer, &params, &[], None)
}

/// 26-邻域, 种子容差.
pub fn diagonal(size: usize) -> Profile {
    let layer = phantom::sphere(size);
    let params = FloodParams::default()
        .with_fuzziness(SPHERE_TOLERANCE, FuzzinessKind::Seed)
        .with_diagonal(true);
    grow("diagonal", &layer, &params, &[], None)
}

/// 6-邻域, 梯度容差. 球面上相邻体素值相差不超过 2, 球壁处相差 100 以上.
pub fn gradient(size: usize) -> Profile {
    let layer = phantom::sphere(size);
    let params = FloodParams::default().with_fuzziness(2.0, FuzzinessKind::Gradient);
    grow("gradient", &layer, &params, &[], None)
}

/// 二维平面内生长, 同时被隔板 ROI 和阻断路径限制, 并限制每次的检查次数.
pub fn barriers(size: usize) -> Profile {
    let layer = phantom::sphere_with_wall(size);
    let paths = [phantom::crossing_path(size)];
    let params = FloodParams::default()
        .with_fuzziness(SPHERE_TOLERANCE, FuzzinessKind::Seed)
        .with_view_normal(Vector3::z())
        .restricted_to_plane(2);
    grow("barriers", &layer, &params, &paths, Some(size * size / 2))
}
