#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供三维体数据 (MRI/CT 扫描) 的坐标变换, ROI 管理, 区域生长,
//! 平面光栅化和直方图统计等交互式分析基础算法.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 不负责读写任何体数据文件格式, 调用者需要自行构造 [`data::Volume`].
//! 2. 所有接口都是同步的, 且内部不加锁. 跨线程共享时由调用者负责同步.
//! 3. 在非期望情况下 (例如索引越界), 程序会直接 panic, 而不会导致内存错误.
//!
//! # 开发计划
//!
//! ### 世界坐标 <-> 体素索引变换 ✅
//!
//! 支持可选的二次对齐变换, 以及无对齐信息时以体数据中心为原点的临时索引空间.
//! 任一输入变化后立即重新计算复合变换.
//!
//! 实现位于 `vol-berry/src/data/space.rs`.
//!
//! ### 多 ROI 管理 ✅
//!
//! 每个 ROI 以稠密位图保存, 并维护一个 "是否被任一 ROI 选中" 缓存.
//! 支持导出为标签点集 / 分割体数据, 以及从标签点集导入.
//!
//! 实现位于 `vol-berry/src/selection`.
//!
//! ### 区域生长 ✅
//!
//! 6-邻域 / 26-邻域, 阻断路径, ROI 阻断, 最大距离, 零值, 模糊容差 (种子 / 梯度),
//! 二维工作平面, 以及来源体数据与目标体数据分离.
//!
//! 实现位于 `vol-berry/src/flood`.
//!
//! ### 平面光栅化 ✅
//!
//! 四边形 / 圆形区域所覆盖的体素.
//!
//! 实现位于 `vol-berry/src/raster.rs`.
//!
//! ### 直方图 ✅
//!
//! 点集直方图, 以及忽略指定值域的整体直方图 (支持 `rayon` 并行).
//!
//! 实现位于 `vol-berry/src/histogram.rs`.
//!
//! ### 区域生长消融实验 ✅
//!
//! 实现位于 `ablations/grow6`.
//!
//! ### 小功能 ✅
//!
//! 1. 三线性插值. ✅
//! 2. Data iterator ✅
//! 3. 世界坐标包围盒. ✅
//!
//! ### 多体数据配准 ❌
//!
//! 不在该 crate 的计划中.

/// 三维索引 `(i, j, k)`, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 可能越界 (为负) 的三维索引.
pub type Idx3dI = (i64, i64, i64);

/// 世界坐标 / 浮点索引坐标下的点.
pub type Point3 = nalgebra::Point3<f64>;

/// 三维向量.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 齐次仿射变换矩阵.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// 8-bit RGB 颜色.
pub type Rgb = [u8; 3];

pub mod consts;

/// 三维体数据及其坐标空间.
pub mod data;

pub mod error;

pub mod flood;

pub mod geometry;

pub mod histogram;

pub mod raster;

pub mod selection;

pub mod prelude;
