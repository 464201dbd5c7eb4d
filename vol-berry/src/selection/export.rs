//! ROI 与标签点集 / 分割体数据之间的转换.

use log::debug;
use ndarray::Array3;

use super::{RoiId, SelectionStore};
use crate::consts::color;
use crate::data::{GridShape, Volume, VolumeSpace};
use crate::error::{SelectionError, SelectionResult};
use crate::Point3;

/// 标签文件中的单个点: 体素中心的世界坐标, 及该体素的值.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelPoint {
    /// 世界坐标.
    pub world: Point3,

    /// 体素值.
    pub value: f64,
}

impl SelectionStore {
    /// 将 ROI `id` 导出为标签点集, 按 `k` 最外层, `i` 最内层的顺序排列.
    ///
    /// ROI 为空时返回 `Err(SelectionError::EmptyRegion)`.
    pub fn label_points(
        &self,
        id: RoiId,
        volume: &Volume,
        space: &VolumeSpace,
    ) -> SelectionResult<Vec<LabelPoint>> {
        let region = self.region(id).ok_or(SelectionError::RoiNotFound(id))?;
        if region.is_empty() {
            return Err(SelectionError::EmptyRegion(id));
        }
        let points: Vec<_> = region
            .iter()
            .map(|pos| LabelPoint {
                world: space.index_to_world(pos),
                value: volume.sample(pos),
            })
            .collect();
        debug!("ROI {id} 导出 {} 个标签点", points.len());
        Ok(points)
    }

    /// 由世界坐标点集创建新 ROI, 选中每个点最近的体素. 越界点被忽略.
    ///
    /// 新 ROI 成为当前 ROI.
    pub fn region_from_points<I>(&mut self, points: I, space: &VolumeSpace) -> RoiId
    where
        I: IntoIterator<Item = Point3>,
    {
        let color = color::palette(self.next_id);
        let mut region = self.allocate_region(color, None);
        for p in points {
            if let Some(pos) = self.checked(space.world_to_index(&p)) {
                region.insert(pos);
                self.cache[pos] = true;
            }
        }
        self.adopt_region(region)
    }

    /// 将带结构标签的 ROI 写入分割体数据. 多个 ROI 重叠时, 后创建的覆盖先创建的;
    /// 未被选中的体素为 0.
    pub fn segmentation(&self) -> Array3<u32> {
        let mut seg = Array3::zeros(self.shape());
        for region in self.regions() {
            if let Some(label) = region.structure() {
                for pos in region.iter() {
                    seg[pos] = label;
                }
            }
        }
        seg
    }
}
