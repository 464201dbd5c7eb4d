//! 合成体数据 (phantom). 消融实验不依赖任何真实扫描文件.

use ndarray::Array3;
use std::env;
use vol_berry::prelude::*;

/// 默认 phantom 边长 (体素个数).
pub const DEFAULT_SIZE: usize = 48;

/// 获取 phantom 边长.
///
/// 1. 若环境变量 `$GROW6_SIZE` 为合法正整数, 则返回其值;
/// 2. 否则, 返回 [`DEFAULT_SIZE`].
pub fn size_from_env() -> usize {
    env::var("GROW6_SIZE")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(DEFAULT_SIZE)
}

/// phantom 的几何中心 (世界坐标).
#[inline]
pub fn center(size: usize) -> Point3 {
    let c = (size / 2) as f64;
    Point3::new(c, c, c)
}

/// 创建边长为 `size` 的球形 phantom: 半径 `size / 3` 内体素值为 `100 + 到中心的距离`,
/// 球外为 0. 体素各向同性, 分辨率为 1.
pub fn sphere(size: usize) -> VolumeLayer {
    let c = center(size);
    let r = size as f64 / 3.0;
    let data = Array3::from_shape_fn((size, size, size), |(i, j, k)| {
        let d = (Point3::new(i as f64, j as f64, k as f64) - c).norm();
        if d <= r {
            100 + d as i16
        } else {
            0
        }
    });
    // 对角阵必然可逆.
    VolumeLayer::new(Volume::with_spacing(data, [1.0, 1.0, 1.0]))
        .unwrap_or_else(|e| panic!("无法创建 phantom: {e}"))
}

/// 创建带有 "隔板" ROI 的球形 phantom. 隔板位于 `x = size / 2 + 2` 处,
/// 贯穿整个 `yz` 平面.
pub fn sphere_with_wall(size: usize) -> VolumeLayer {
    let mut layer = sphere(size);
    let x = (size / 2 + 2).min(size - 1);
    let space = &layer.space;
    let points = (0..size).flat_map(|k| (0..size).map(move |j| space.index_to_world((x, j, k))));
    layer.selection.region_from_points(points, space);
    layer
}

/// 一条在 `z = c` 平面内沿 `y = c + 2.5` 横穿 phantom 的阻断路径.
pub fn crossing_path(size: usize) -> BoundaryPath {
    let c = center(size);
    let y = c.y + 2.5;
    BoundaryPath::new(vec![
        Point3::new(-1.0, y, c.z),
        Point3::new(size as f64, y, c.z),
    ])
}
