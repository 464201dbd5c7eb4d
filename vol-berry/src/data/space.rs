//! 世界坐标与体素索引坐标之间的变换.
//!
//! 记 `data_to_world` 为体数据自身的体素 -> 世界仿射变换,
//! `data_to_index` 为可选的二次对齐变换 (未提供时为单位阵). 则
//!
//! - 使用二次变换时: `world_to_index = data_to_index * data_to_world^-1`;
//! - 不使用二次变换时: `world_to_index = center * data_to_world^-1`,
//!   其中 `center` 将索引平移 `(width / 2, height / 2, depth / 2)` (整数除法).
//!
//! 后一种情况用于在没有存储对齐信息时临时查看体数据,
//! 此时索引空间不再与扫描仪物理坐标系配准.

use log::warn;

use super::GridShape;
use crate::error::{SpaceError, SpaceResult};
use crate::{Idx3d, Idx3dI, Matrix4, Point3, Vector3};

/// 单个体数据的坐标空间.
///
/// `world_to_index` 在任一输入变换或 "是否使用二次变换" 开关改变时立即重新计算,
/// 因此读取时永远不会过期.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeSpace {
    shape: Idx3d,
    data_to_world: Matrix4,
    data_to_index: Matrix4,
    use_secondary: bool,
    world_to_data: Matrix4,
    world_to_index: Matrix4,
    index_to_world: Matrix4,
}

impl GridShape for VolumeSpace {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.shape
    }
}

impl VolumeSpace {
    /// 以体数据形状 `shape` 和体素 -> 世界仿射变换 `data_to_world` 创建坐标空间.
    /// 二次变换初始为单位阵, 且默认启用.
    ///
    /// 如果 `data_to_world` 不可逆, 返回 `Err(SpaceError::Singular)`.
    pub fn new(shape: Idx3d, data_to_world: Matrix4) -> SpaceResult<Self> {
        let data_to_index = Matrix4::identity();
        let [world_to_data, world_to_index, index_to_world] =
            Self::compose(shape, &data_to_world, &data_to_index, true)?;
        Ok(Self {
            shape,
            data_to_world,
            data_to_index,
            use_secondary: true,
            world_to_data,
            world_to_index,
            index_to_world,
        })
    }

    /// 计算 `[world_to_data, world_to_index, index_to_world]`.
    fn compose(
        shape: Idx3d,
        data_to_world: &Matrix4,
        data_to_index: &Matrix4,
        use_secondary: bool,
    ) -> SpaceResult<[Matrix4; 3]> {
        let world_to_data = data_to_world
            .try_inverse()
            .ok_or(SpaceError::Singular)?;
        let head = if use_secondary {
            *data_to_index
        } else {
            let (w, h, d) = shape;
            Matrix4::new_translation(&Vector3::new(
                (w / 2) as f64,
                (h / 2) as f64,
                (d / 2) as f64,
            ))
        };
        let world_to_index = head * world_to_data;
        let index_to_world = world_to_index
            .try_inverse()
            .ok_or(SpaceError::Singular)?;
        Ok([world_to_data, world_to_index, index_to_world])
    }

    /// 按给定输入重新计算. 失败时保持原状态不变.
    fn recompute(
        &mut self,
        data_to_world: Matrix4,
        data_to_index: Matrix4,
        use_secondary: bool,
    ) -> SpaceResult<()> {
        let [w2d, w2i, i2w] = Self::compose(self.shape, &data_to_world, &data_to_index, use_secondary)
            .map_err(|e| {
                warn!("拒绝更新坐标变换: {e}");
                e
            })?;
        self.data_to_world = data_to_world;
        self.data_to_index = data_to_index;
        self.use_secondary = use_secondary;
        self.world_to_data = w2d;
        self.world_to_index = w2i;
        self.index_to_world = i2w;
        Ok(())
    }

    /// 更新体素 -> 世界变换.
    #[inline]
    pub fn set_data_to_world(&mut self, transform: Matrix4) -> SpaceResult<()> {
        self.recompute(transform, self.data_to_index, self.use_secondary)
    }

    /// 更新二次对齐变换.
    #[inline]
    pub fn set_secondary_transform(&mut self, transform: Matrix4) -> SpaceResult<()> {
        self.recompute(self.data_to_world, transform, self.use_secondary)
    }

    /// 切换是否使用二次对齐变换.
    #[inline]
    pub fn set_use_secondary_transform(&mut self, use_secondary: bool) -> SpaceResult<()> {
        self.recompute(self.data_to_world, self.data_to_index, use_secondary)
    }

    /// 体素 -> 世界变换.
    #[inline]
    pub fn data_to_world(&self) -> &Matrix4 {
        &self.data_to_world
    }

    /// 二次对齐变换.
    #[inline]
    pub fn secondary_transform(&self) -> &Matrix4 {
        &self.data_to_index
    }

    /// 是否使用二次对齐变换.
    #[inline]
    pub fn uses_secondary_transform(&self) -> bool {
        self.use_secondary
    }

    /// 当前的世界 -> 索引复合变换.
    #[inline]
    pub fn world_to_index_matrix(&self) -> &Matrix4 {
        &self.world_to_index
    }

    /// 将世界坐标转换为浮点索引坐标, 不做取整.
    #[inline]
    pub fn world_to_index_f(&self, world: &Point3) -> Point3 {
        self.world_to_index.transform_point(world)
    }

    /// 将世界坐标转换为最近的整数索引 (四舍五入, `.5` 远离零).
    ///
    /// 结果可能越界或为负, 由调用者检查.
    #[inline]
    pub fn world_to_index(&self, world: &Point3) -> Idx3dI {
        let p = self.world_to_index_f(world);
        (p.x.round() as i64, p.y.round() as i64, p.z.round() as i64)
    }

    /// [`Self::world_to_index_f`] 的精确逆变换.
    #[inline]
    pub fn index_to_world_f(&self, index: &Point3) -> Point3 {
        self.index_to_world.transform_point(index)
    }

    /// 获取体素 `index` 中心的世界坐标.
    #[inline]
    pub fn index_to_world(&self, (i, j, k): Idx3d) -> Point3 {
        self.index_to_world_f(&Point3::new(i as f64, j as f64, k as f64))
    }

    /// 同 [`Self::index_to_world`], 但接受可能为负 (越界) 的索引.
    #[inline]
    pub fn signed_index_to_world(&self, (i, j, k): Idx3dI) -> Point3 {
        self.index_to_world_f(&Point3::new(i as f64, j as f64, k as f64))
    }

    /// 将世界坐标变换回体数据自身的坐标, 即只撤销 `data_to_world`.
    #[inline]
    pub fn world_to_data(&self, world: &Point3) -> Point3 {
        self.world_to_data.transform_point(world)
    }

    /// 获取整个体数据 (所有体素的外包长方体) 在世界坐标下的轴对齐包围盒,
    /// 返回 `(最小角, 最大角)`.
    pub fn world_bounds(&self) -> (Point3, Point3) {
        let (w, h, d) = self.shape;
        let hi = [w as f64 - 0.5, h as f64 - 0.5, d as f64 - 0.5];
        let mut lo_p = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut hi_p = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for n in 0..8usize {
            let corner = Point3::new(
                if n & 1 == 0 { -0.5 } else { hi[0] },
                if n & 2 == 0 { -0.5 } else { hi[1] },
                if n & 4 == 0 { -0.5 } else { hi[2] },
            );
            let world = self.index_to_world_f(&corner);
            lo_p = lo_p.inf(&world);
            hi_p = hi_p.sup(&world);
        }
        (lo_p, hi_p)
    }
}

#[cfg(test)]
mod tests {
    use super::VolumeSpace;
    use crate::error::SpaceError;
    use crate::{Matrix4, Point3, Vector3};
    use approx::assert_relative_eq;

    fn scaled(sx: f64, sy: f64, sz: f64) -> Matrix4 {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    #[test]
    fn test_identity_space() {
        let s = VolumeSpace::new((4, 4, 4), Matrix4::identity()).unwrap();
        assert_eq!(s.world_to_index(&Point3::new(1.4, 2.5, -0.4)), (1, 3, 0));
        assert_eq!(s.index_to_world((3, 2, 1)), Point3::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_round_trip_float_path() {
        let m = Matrix4::new_translation(&Vector3::new(-10.0, 3.5, 7.25)) * scaled(0.9, 1.2, 2.0);
        let s = VolumeSpace::new((16, 16, 8), m).unwrap();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-3.3, 12.1, 40.0),
            Point3::new(100.0, -50.0, 0.125),
        ] {
            let back = s.index_to_world_f(&s.world_to_index_f(&p));
            assert_relative_eq!(back, p, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_round_trip_integer_path_within_one_voxel() {
        let s = VolumeSpace::new((16, 16, 8), scaled(0.9, 1.2, 2.0)).unwrap();
        let p = Point3::new(3.3, 7.7, 5.1);
        let back = s.signed_index_to_world(s.world_to_index(&p));
        assert!((back.x - p.x).abs() <= 0.9);
        assert!((back.y - p.y).abs() <= 1.2);
        assert!((back.z - p.z).abs() <= 2.0);
    }

    #[test]
    fn test_scaled_space() {
        let s = VolumeSpace::new((10, 10, 10), scaled(2.0, 2.0, 3.0)).unwrap();
        assert_eq!(s.world_to_index(&Point3::new(4.0, 5.1, 9.0)), (2, 3, 3));
        assert_relative_eq!(
            s.index_to_world((1, 1, 1)),
            Point3::new(2.0, 2.0, 3.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_secondary_transform_is_composed() {
        let mut s = VolumeSpace::new((8, 8, 8), scaled(2.0, 2.0, 2.0)).unwrap();
        let shift = Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0));
        s.set_secondary_transform(shift).unwrap();
        // world (4, 4, 4) -> data (2, 2, 2) -> index (3, 2, 2)
        assert_eq!(s.world_to_index(&Point3::new(4.0, 4.0, 4.0)), (3, 2, 2));
        assert_relative_eq!(
            *s.world_to_index_matrix(),
            shift * scaled(0.5, 0.5, 0.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_without_secondary_centers_volume() {
        let mut s = VolumeSpace::new((9, 6, 4), Matrix4::identity()).unwrap();
        s.set_secondary_transform(scaled(3.0, 3.0, 3.0)).unwrap();
        s.set_use_secondary_transform(false).unwrap();
        assert!(!s.uses_secondary_transform());
        // 整数除法: (9 / 2, 6 / 2, 4 / 2) = (4, 3, 2).
        assert_eq!(s.world_to_index(&Point3::origin()), (4, 3, 2));

        s.set_use_secondary_transform(true).unwrap();
        assert_eq!(s.world_to_index(&Point3::new(1.0, 1.0, 1.0)), (3, 3, 3));
    }

    #[test]
    fn test_singular_transform_is_rejected() {
        let mut s = VolumeSpace::new((4, 4, 4), Matrix4::identity()).unwrap();
        assert_eq!(
            VolumeSpace::new((4, 4, 4), Matrix4::zeros()).unwrap_err(),
            SpaceError::Singular
        );
        assert_eq!(
            s.set_data_to_world(scaled(1.0, 0.0, 1.0)).unwrap_err(),
            SpaceError::Singular
        );
        assert_eq!(
            s.set_secondary_transform(Matrix4::zeros()).unwrap_err(),
            SpaceError::Singular
        );
        // 失败时原状态不变.
        assert_eq!(*s.data_to_world(), Matrix4::identity());
        assert_eq!(*s.secondary_transform(), Matrix4::identity());
    }

    #[test]
    fn test_world_to_data_follows_setters() {
        let mut s = VolumeSpace::new((4, 4, 4), scaled(2.0, 2.0, 2.0)).unwrap();
        let p = Point3::new(6.0, 4.0, -2.0);
        assert_relative_eq!(s.world_to_data(&p), Point3::new(3.0, 2.0, -1.0), epsilon = 1e-12);

        // 二次变换不影响 world_to_data.
        s.set_secondary_transform(scaled(5.0, 5.0, 5.0)).unwrap();
        assert_relative_eq!(s.world_to_data(&p), Point3::new(3.0, 2.0, -1.0), epsilon = 1e-12);

        s.set_data_to_world(scaled(1.0, 4.0, 0.5)).unwrap();
        assert_relative_eq!(s.world_to_data(&p), Point3::new(6.0, 1.0, -4.0), epsilon = 1e-12);

        // 被拒绝的更新不改变 world_to_data.
        assert!(s.set_data_to_world(Matrix4::zeros()).is_err());
        assert_relative_eq!(s.world_to_data(&p), Point3::new(6.0, 1.0, -4.0), epsilon = 1e-12);
    }

    #[test]
    fn test_world_to_data_and_bounds() {
        let m = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)) * scaled(2.0, 1.0, 1.0);
        let s = VolumeSpace::new((4, 2, 2), m).unwrap();
        assert_relative_eq!(
            s.world_to_data(&Point3::new(14.0, 1.0, 1.0)),
            Point3::new(2.0, 1.0, 1.0),
            epsilon = 1e-12
        );

        let (lo, hi) = s.world_bounds();
        assert_relative_eq!(lo, Point3::new(9.0, -0.5, -0.5), epsilon = 1e-12);
        assert_relative_eq!(hi, Point3::new(17.0, 1.5, 1.5), epsilon = 1e-12);
    }
}
