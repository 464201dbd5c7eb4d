//! ROI (选区) 管理.
//!
//! 每个体数据拥有一个 [`SelectionStore`], 其中按创建顺序保存若干 [`SelectionRegion`],
//! 并维护一个稠密的 "是否被任一 ROI 选中" 缓存, 使区域生长中的 ROI 检查为 O(1).
//!
//! # 已知限制
//!
//! 多个 ROI 重叠时的显示颜色按创建顺序两两 50/50 递推混合,
//! 因此结果依赖于 ROI 的创建顺序, 并不是各颜色的等权平均.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use ndarray::{Array3, ArrayView3};

use crate::consts::color;
use crate::data::GridShape;
use crate::error::{SelectionError, SelectionResult};
use crate::{Idx3d, Rgb};

mod export;
mod region;

pub use export::LabelPoint;
pub use region::SelectionRegion;

/// ROI 标识. 在同一个 [`SelectionStore`] 内单调递增分配, 不会复用.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoiId(pub(crate) u32);

impl fmt::Display for RoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 单个体数据上的所有 ROI.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    shape: Idx3d,
    regions: BTreeMap<RoiId, SelectionRegion>,
    next_id: u32,
    current: Option<RoiId>,
    cache: Array3<bool>,
}

impl GridShape for SelectionStore {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.shape
    }
}

impl SelectionStore {
    /// 为形状为 `shape` 的体数据创建空 ROI 集合.
    pub fn new(shape: Idx3d) -> Self {
        Self {
            shape,
            regions: BTreeMap::new(),
            next_id: 0,
            current: None,
            cache: Array3::from_elem(shape, false),
        }
    }

    /// 以默认配色创建新 ROI, 并将其设为当前 ROI.
    #[inline]
    pub fn create_region(&mut self) -> RoiId {
        self.create_region_with(color::palette(self.next_id), None)
    }

    /// 以给定颜色和结构标签创建新 ROI, 并将其设为当前 ROI.
    pub fn create_region_with(&mut self, color: Rgb, structure: Option<u32>) -> RoiId {
        let region = self.allocate_region(color, structure);
        self.adopt_region(region)
    }

    /// 分配新的 ROI 标识并创建空 ROI, 但暂不加入集合.
    fn allocate_region(&mut self, color: Rgb, structure: Option<u32>) -> SelectionRegion {
        let id = RoiId(self.next_id);
        self.next_id += 1;
        SelectionRegion::new(id, self.shape, color, structure)
    }

    /// 将 `region` 加入集合并设为当前 ROI. 调用者需保证缓存已包含其所有体素.
    fn adopt_region(&mut self, region: SelectionRegion) -> RoiId {
        let id = region.id();
        debug!("创建 ROI {id}, 颜色 {:?}, 共 {} 个体素", region.color(), region.count());
        self.regions.insert(id, region);
        self.current = Some(id);
        id
    }

    /// 删除 ROI 并返回它. 缓存中仅被该 ROI 选中的体素会被清除.
    pub fn delete_region(&mut self, id: RoiId) -> SelectionResult<SelectionRegion> {
        let region = self
            .regions
            .remove(&id)
            .ok_or(SelectionError::RoiNotFound(id))?;
        for pos in region.iter() {
            self.cache[pos] = self.regions.values().any(|r| r.contains(&pos));
        }
        if self.current == Some(id) {
            self.current = None;
        }
        debug!("删除 ROI {id}, 共 {} 个体素", region.count());
        Ok(region)
    }

    /// 获取 ROI.
    #[inline]
    pub fn region(&self, id: RoiId) -> Option<&SelectionRegion> {
        self.regions.get(&id)
    }

    /// 获取可变 ROI. 仅可修改其颜色和结构标签.
    #[inline]
    pub fn region_mut(&mut self, id: RoiId) -> Option<&mut SelectionRegion> {
        self.regions.get_mut(&id)
    }

    /// 按创建顺序迭代所有 ROI.
    #[inline]
    pub fn regions(&self) -> impl ExactSizeIterator<Item = &SelectionRegion> {
        self.regions.values()
    }

    /// ROI 个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// 是否没有任何 ROI.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// 当前 ROI.
    #[inline]
    pub fn current(&self) -> Option<RoiId> {
        self.current
    }

    /// 设置当前 ROI.
    pub fn set_current(&mut self, id: RoiId) -> SelectionResult<()> {
        if !self.regions.contains_key(&id) {
            return Err(SelectionError::RoiNotFound(id));
        }
        self.current = Some(id);
        Ok(())
    }

    /// 将 `pos` 加入 ROI `id`. 重复选中没有副作用.
    ///
    /// 当 `pos` 越界时 panic.
    pub fn select(&mut self, id: RoiId, pos: Idx3d) -> SelectionResult<()> {
        let region = self
            .regions
            .get_mut(&id)
            .ok_or(SelectionError::RoiNotFound(id))?;
        debug_assert!(region.check(&pos), "选中的体素 {pos:?} 越界");
        region.insert(pos);
        self.cache[pos] = true;
        Ok(())
    }

    /// 将 `pos` 从 ROI `id` 中移除. 仅当没有其它 ROI 仍选中该体素时才清除缓存.
    ///
    /// 当 `pos` 越界时 panic.
    pub fn unselect(&mut self, id: RoiId, pos: Idx3d) -> SelectionResult<()> {
        let region = self
            .regions
            .get_mut(&id)
            .ok_or(SelectionError::RoiNotFound(id))?;
        debug_assert!(region.check(&pos), "取消选中的体素 {pos:?} 越界");
        if region.remove(pos) {
            self.cache[pos] = self.regions.values().any(|r| r.contains(&pos));
        }
        Ok(())
    }

    /// 将 `pos` 加入当前 ROI. 没有当前 ROI 时什么也不做, 并返回 `false`.
    pub fn select_current(&mut self, pos: Idx3d) -> bool {
        match self.current {
            Some(id) => self.select(id, pos).is_ok(),
            None => false,
        }
    }

    /// 将 `pos` 从当前 ROI 中移除. 没有当前 ROI 时什么也不做, 并返回 `false`.
    pub fn unselect_current(&mut self, pos: Idx3d) -> bool {
        match self.current {
            Some(id) => self.unselect(id, pos).is_ok(),
            None => false,
        }
    }

    /// `pos` 是否被任一 ROI 选中. 若是, 同时返回所有选中它的 ROI 按创建顺序
    /// 两两混合后的颜色.
    pub fn is_selected(&self, pos: Idx3d) -> Option<Rgb> {
        if !self.cache.get(pos).copied().unwrap_or(false) {
            return None;
        }
        self.regions
            .values()
            .filter(|r| r.contains(&pos))
            .map(SelectionRegion::color)
            .reduce(color::blend_half)
    }

    /// `pos` 是否被 `exclude` 以外的任一 ROI 选中.
    pub fn is_selected_excluding(&self, pos: Idx3d, exclude: Option<RoiId>) -> bool {
        self.cache.get(pos).copied().unwrap_or(false)
            && self
                .regions
                .values()
                .any(|r| Some(r.id()) != exclude && r.contains(&pos))
    }

    /// "是否被任一 ROI 选中" 缓存.
    #[inline]
    pub fn cache(&self) -> ArrayView3<'_, bool> {
        self.cache.view()
    }
}
