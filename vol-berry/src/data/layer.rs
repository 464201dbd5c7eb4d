use super::{GridShape, Volume, VolumeSpace};
use crate::error::SpaceResult;
use crate::selection::SelectionStore;
use crate::{Idx3d, Point3};

/// 体数据及与之绑定的坐标空间和 ROI 集合.
///
/// 该结构完全透明, 仅包含三个公开的子结构, 用户可以直接使用它们来实现相关上层功能.
/// 坐标空间和 ROI 集合与体数据同生命周期.
///
/// # 注意
///
/// 三个子结构的形状一致性由用户保证, 否则程序行为未定义.
#[derive(Debug, Clone)]
pub struct VolumeLayer {
    /// 体数据.
    pub volume: Volume,

    /// 世界 <-> 索引坐标空间.
    pub space: VolumeSpace,

    /// 该体数据上的所有 ROI.
    pub selection: SelectionStore,
}

impl GridShape for VolumeLayer {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.volume.shape()
    }
}

impl VolumeLayer {
    /// 以体数据自身的体素 -> 世界变换建立坐标空间, 并创建空 ROI 集合.
    ///
    /// 如果该变换不可逆, 则返回 `Err`.
    pub fn new(volume: Volume) -> SpaceResult<Self> {
        let shape = volume.shape();
        let space = VolumeSpace::new(shape, *volume.voxel_to_world())?;
        Ok(Self {
            volume,
            space,
            selection: SelectionStore::new(shape),
        })
    }

    /// 获取世界坐标 `world` 最近的体素索引. 越界时返回 `None`.
    #[inline]
    pub fn index_of(&self, world: &Point3) -> Option<Idx3d> {
        self.volume.checked(self.space.world_to_index(world))
    }

    /// 获取世界坐标 `world` 最近的体素值. 越界时返回 `None`.
    #[inline]
    pub fn sample_at_world(&self, world: &Point3) -> Option<f64> {
        self.index_of(world).map(|pos| self.volume.sample(pos))
    }
}
