use ndarray::Array3;

use crate::data::GridShape;
use crate::Idx3d;

/// 区域生长时维护的 "已访问" 位图. 形状与目标体数据一致, 仅在一次生长中存活.
#[derive(Debug, Clone)]
pub struct VisitedMask {
    visited: Array3<bool>,
    count: usize,
}

impl GridShape for VisitedMask {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.visited.dim()
    }
}

impl VisitedMask {
    pub fn new(shape: Idx3d) -> Self {
        Self {
            visited: Array3::from_elem(shape, false),
            count: 0,
        }
    }

    /// 标记体素为已访问. 返回值指示是否是新访问的体素.
    ///
    /// 越界时 panic.
    #[inline]
    pub fn set_visited(&mut self, pos: Idx3d) -> bool {
        let bit = &mut self.visited[pos];
        if *bit {
            return false;
        }
        *bit = true;
        self.count += 1;
        true
    }

    /// 已访问体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }
}
