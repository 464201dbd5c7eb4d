use ndarray::Array3;

use super::RoiId;
use crate::data::{GridShape, PosIter3};
use crate::{Idx3d, Rgb};

/// 单个 ROI. 以与所属体数据同形状的稠密位图记录被选中的体素.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRegion {
    id: RoiId,
    mask: Array3<bool>,
    count: usize,
    color: Rgb,
    structure: Option<u32>,
}

impl GridShape for SelectionRegion {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.mask.dim()
    }
}

impl SelectionRegion {
    pub(crate) fn new(id: RoiId, shape: Idx3d, color: Rgb, structure: Option<u32>) -> Self {
        Self {
            id,
            mask: Array3::from_elem(shape, false),
            count: 0,
            color,
            structure,
        }
    }

    /// ROI 标识.
    #[inline]
    pub fn id(&self) -> RoiId {
        self.id
    }

    /// 显示颜色.
    #[inline]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// 修改显示颜色.
    #[inline]
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// 导出分割结果时使用的结构标签.
    #[inline]
    pub fn structure(&self) -> Option<u32> {
        self.structure
    }

    /// 修改结构标签.
    #[inline]
    pub fn set_structure(&mut self, structure: Option<u32>) {
        self.structure = structure;
    }

    /// 被选中的体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// 是否没有任何被选中的体素.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `pos` 是否被选中. 越界索引视为未选中.
    #[inline]
    pub fn contains(&self, pos: &Idx3d) -> bool {
        self.mask.get(*pos).copied().unwrap_or(false)
    }

    /// 按 `k` 最外层, `i` 最内层的顺序迭代所有被选中的体素.
    pub fn iter(&self) -> impl Iterator<Item = Idx3d> + '_ {
        PosIter3::new(self.shape()).filter(|pos| self.mask[*pos])
    }

    /// 选中 `pos`. 返回该体素此前是否未被选中.
    ///
    /// 当 `pos` 越界时 panic.
    #[inline]
    pub(crate) fn insert(&mut self, pos: Idx3d) -> bool {
        let bit = &mut self.mask[pos];
        let fresh = !*bit;
        *bit = true;
        self.count += usize::from(fresh);
        fresh
    }

    /// 取消选中 `pos`. 返回该体素此前是否被选中.
    ///
    /// 当 `pos` 越界时 panic.
    #[inline]
    pub(crate) fn remove(&mut self, pos: Idx3d) -> bool {
        let bit = &mut self.mask[pos];
        let was = *bit;
        *bit = false;
        self.count -= usize::from(was);
        was
    }
}
