//! 通用常量.

/// ROI 显示颜色.
pub mod color {
    use crate::Rgb;

    /// 红色.
    pub const RED: Rgb = [255, 0, 0];

    /// 绿色.
    pub const GREEN: Rgb = [0, 255, 0];

    /// 蓝色.
    pub const BLUE: Rgb = [0, 0, 255];

    /// 黄色.
    pub const YELLOW: Rgb = [255, 255, 0];

    /// 品红.
    pub const MAGENTA: Rgb = [255, 0, 255];

    /// 青色.
    pub const CYAN: Rgb = [0, 255, 255];

    /// 新建 ROI 时按 id 轮换使用的默认颜色.
    pub const PALETTE: [Rgb; 6] = [RED, GREEN, BLUE, YELLOW, MAGENTA, CYAN];

    /// 按 `index` 从 [`PALETTE`] 中循环取色.
    #[inline]
    pub const fn palette(index: u32) -> Rgb {
        PALETTE[index as usize % PALETTE.len()]
    }

    /// 两种颜色各取一半混合. 结果向零截断.
    #[inline]
    pub fn blend_half(base: Rgb, other: Rgb) -> Rgb {
        let mix = |a: u8, b: u8| (f32::from(b) * 0.5 + f32::from(a) * 0.5) as u8;
        [
            mix(base[0], other[0]),
            mix(base[1], other[1]),
            mix(base[2], other[2]),
        ]
    }
}

/// 平面光栅化中, 角度和判定 "点在四边形内" 所允许的误差 (弧度).
/// 同时也是 "交点与四边形顶点重合" 的距离积阈值.
pub const ANGLE_SUM_EPS: f64 = 1e-4;

/// 光栅化时, 浮点索引落在体素边界上的容差. 恰好位于边界上的角点归入内侧的体素.
pub const CELL_SNAP_EPS: f64 = 1e-6;

/// 线段与平面求交时, 判定二者平行的阈值.
pub const PARALLEL_EPS: f64 = 1e-12;

/// 6-邻域 (面相邻) 个数.
pub const FACE_NEIGHBOURS: usize = 6;

/// 26-邻域 (面, 棱, 顶点相邻) 个数.
pub const ALL_NEIGHBOURS: usize = 26;

/// 单个体素 (立方体) 的 12 条棱, 以角点编号表示.
///
/// 角点编号 `n` 的三个比特依次对应 `x`, `y`, `z` 方向是否取上界.
pub const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (4, 5),
    (6, 7),
    (2, 3),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];
