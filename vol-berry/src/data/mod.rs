use itertools::{Itertools, MinMaxResult};
use ndarray::Array3;
use num::{Bounded, NumCast, ToPrimitive};
use ordered_float::OrderedFloat;

use crate::{Idx3d, Idx3dI, Matrix4, Point3, Vector3};

mod iter;
mod layer;
pub mod space;

pub use iter::PosIter3;
pub use layer::VolumeLayer;
pub use space::VolumeSpace;

/// 体素可取的数值类型.
///
/// 目前支持 `u8`, `i16`, `i32`, `f32`, 与常见 MRI 数据的四种存储类型对应.
pub trait VoxelType: Copy + ToPrimitive + NumCast + Bounded + Send + Sync + 'static {
    /// 将该类型的体数据包装为 [`VoxelData`].
    fn wrap(data: Array3<Self>) -> VoxelData;

    /// 将 `value` 饱和地转换为该类型. 超出范围时取类型的最小/最大值, `NaN` 取最小值.
    #[inline]
    fn saturate(value: f64) -> Self {
        <Self as NumCast>::from(value).unwrap_or_else(|| {
            if value.is_nan() || value < 0.0 {
                Self::min_value()
            } else {
                Self::max_value()
            }
        })
    }
}

/// 带类型的体数据存储. 形状为 `(width, height, depth)`, 以 `(i, j, k)` 索引.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelData {
    /// 无符号 8 位整数.
    U8(Array3<u8>),
    /// 有符号 16 位整数.
    I16(Array3<i16>),
    /// 有符号 32 位整数.
    I32(Array3<i32>),
    /// 单精度浮点数.
    F32(Array3<f32>),
}

/// 对 `VoxelData` 的每一种变体执行同一段代码, `$a` 绑定到内部数组.
macro_rules! with_array {
    ($data: expr, $a: ident => $body: expr) => {
        match $data {
            $crate::data::VoxelData::U8($a) => $body,
            $crate::data::VoxelData::I16($a) => $body,
            $crate::data::VoxelData::I32($a) => $body,
            $crate::data::VoxelData::F32($a) => $body,
        }
    };
}
pub(crate) use with_array;

macro_rules! impl_voxel_type {
    ($($t: ty => $variant: ident),+ $(,)?) => {
        $(
            impl VoxelType for $t {
                #[inline]
                fn wrap(data: Array3<Self>) -> VoxelData {
                    VoxelData::$variant(data)
                }
            }

            impl From<Array3<$t>> for VoxelData {
                #[inline]
                fn from(data: Array3<$t>) -> Self {
                    VoxelData::$variant(data)
                }
            }
        )+
    };
}

impl_voxel_type!(u8 => U8, i16 => I16, i32 => I32, f32 => F32);

/// 三维网格形状的共用属性和部分通用操作.
pub trait GridShape {
    /// 获取 `(width, height, depth)`.
    fn shape(&self) -> Idx3d;

    /// 获取体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (w, h, d) = self.shape();
        w * h * d
    }

    /// 获取 width 方向体素个数.
    #[inline]
    fn width(&self) -> usize {
        self.shape().0
    }

    /// 获取 height 方向体素个数.
    #[inline]
    fn height(&self) -> usize {
        self.shape().1
    }

    /// 获取 depth 方向体素个数.
    #[inline]
    fn depth(&self) -> usize {
        self.shape().2
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (i0, j0, k0): &Idx3d) -> bool {
        let (w, h, d) = self.shape();
        *i0 < w && *j0 < h && *k0 < d
    }

    /// 将可能为负的索引转换为合法索引. 越界时返回 `None`.
    #[inline]
    fn checked(&self, (i, j, k): Idx3dI) -> Option<Idx3d> {
        let pos = (
            usize::try_from(i).ok()?,
            usize::try_from(j).ok()?,
            usize::try_from(k).ok()?,
        );
        self.check(&pos).then_some(pos)
    }
}

impl GridShape for VoxelData {
    #[inline]
    fn shape(&self) -> Idx3d {
        with_array!(self, a => a.dim())
    }
}

/// 三维体数据, 包括带类型的体素存储和体素 -> 世界仿射变换.
///
/// 体数据在区域生长期间只读.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: VoxelData,
    spacing: [f64; 3],
    voxel_to_world: Matrix4,
}

impl GridShape for Volume {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.shape()
    }
}

impl Volume {
    /// 以体素存储和体素 -> 世界仿射变换创建体数据.
    /// 体素分辨率取仿射变换前三列的长度.
    pub fn new(data: impl Into<VoxelData>, voxel_to_world: Matrix4) -> Self {
        let column = |c: usize| voxel_to_world.fixed_view::<3, 1>(0, c).norm();
        Self {
            data: data.into(),
            spacing: [column(0), column(1), column(2)],
            voxel_to_world,
        }
    }

    /// 以轴对齐的体素分辨率 `spacing` 创建体数据, 体素 `(0, 0, 0)` 位于世界原点.
    #[inline]
    pub fn with_spacing(data: impl Into<VoxelData>, spacing: [f64; 3]) -> Self {
        let [sx, sy, sz] = spacing;
        Self::new(
            data,
            Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)),
        )
    }

    /// 创建所有体素值均为 `value` 的体数据.
    #[inline]
    pub fn filled<T: VoxelType>(shape: Idx3d, value: T, spacing: [f64; 3]) -> Self {
        Self::with_spacing(T::wrap(Array3::from_elem(shape, value)), spacing)
    }

    /// 获取体素存储.
    #[inline]
    pub fn data(&self) -> &VoxelData {
        &self.data
    }

    /// 获取体素分辨率 `[x, y, z]`, 以世界单位计.
    #[inline]
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// 获取体素 -> 世界仿射变换.
    #[inline]
    pub fn voxel_to_world(&self) -> &Matrix4 {
        &self.voxel_to_world
    }

    /// 读取 `pos` 处体素值, 并扩展为 `f64`.
    ///
    /// 当 `pos` 越界时 panic.
    #[inline]
    pub fn sample(&self, pos: Idx3d) -> f64 {
        with_array!(&self.data, a => a[pos].to_f64().unwrap_or_default())
    }

    /// [`Self::sample`] 的越界检查版本.
    #[inline]
    pub fn get(&self, pos: Idx3d) -> Option<f64> {
        self.check(&pos).then(|| self.sample(pos))
    }

    /// 将 `value` 写入 `pos` 处体素. 超出存储类型范围的值会被饱和截断.
    ///
    /// 当 `pos` 越界时 panic.
    pub fn set(&mut self, pos: Idx3d, value: f64) {
        fn put<T: VoxelType>(a: &mut Array3<T>, pos: Idx3d, value: f64) {
            a[pos] = T::saturate(value);
        }
        with_array!(&mut self.data, a => put(a, pos, value))
    }

    /// 获取整个体数据的 `(最小值, 最大值)`. 空体数据返回 `(0, 0)`.
    pub fn value_range(&self) -> (f64, f64) {
        let mm = with_array!(&self.data, a => a
            .iter()
            .map(|v| OrderedFloat(v.to_f64().unwrap_or_default()))
            .minmax());
        match mm {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(v) => (v.0, v.0),
            MinMaxResult::MinMax(lo, hi) => (lo.0, hi.0),
        }
    }

    /// 在浮点索引 `p` 处做三线性插值.
    ///
    /// 任一分量超出 `[0, dim - 1]` 时返回 `None`.
    pub fn trilinear(&self, p: &Point3) -> Option<f64> {
        let (w, h, d) = self.shape();
        let axis = |v: f64, n: usize| -> Option<(usize, usize, f64)> {
            if n == 0 || !(0.0..=(n - 1) as f64).contains(&v) {
                return None;
            }
            let lo = v.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            Some((lo, hi, v - lo as f64))
        };
        let (i0, i1, fx) = axis(p.x, w)?;
        let (j0, j1, fy) = axis(p.y, h)?;
        let (k0, k1, fz) = axis(p.z, d)?;

        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let plane = |k: usize| {
            let y0 = lerp(self.sample((i0, j0, k)), self.sample((i1, j0, k)), fx);
            let y1 = lerp(self.sample((i0, j1, k)), self.sample((i1, j1, k)), fx);
            lerp(y0, y1, fy)
        };
        Some(lerp(plane(k0), plane(k1), fz))
    }

    /// 获取能按 `k` 最外层, `i` 最内层顺序迭代所有体素索引的迭代器.
    #[inline]
    pub fn positions(&self) -> PosIter3 {
        PosIter3::new(self.shape())
    }
}
