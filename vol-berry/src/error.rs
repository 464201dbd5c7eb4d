//! 运行时错误.

use thiserror::Error;

use crate::selection::RoiId;

/// 坐标变换错误.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SpaceError {
    /// 给定的 (或复合得到的) 4x4 变换矩阵不可逆.
    #[error("变换矩阵不可逆")]
    Singular,
}

/// ROI 管理错误.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// 该 ROI 不属于当前体数据.
    #[error("ROI {0} 不属于该体数据")]
    RoiNotFound(RoiId),

    /// ROI 中没有任何被选中的体素, 无法导出.
    #[error("ROI {0} 中没有被选中的体素")]
    EmptyRegion(RoiId),
}

/// 区域生长的前置条件错误. 出现这些错误时, 生长过程不会开始.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum FloodError {
    /// 参数中指定的当前 ROI 不存在于目标体数据中.
    #[error("区域生长指定的 ROI {0} 不存在")]
    RoiNotFound(RoiId),
}

impl From<SelectionError> for FloodError {
    fn from(value: SelectionError) -> Self {
        match value {
            SelectionError::RoiNotFound(id) | SelectionError::EmptyRegion(id) => {
                Self::RoiNotFound(id)
            }
        }
    }
}

/// 坐标变换结果.
pub type SpaceResult<T> = Result<T, SpaceError>;

/// ROI 操作结果.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// 区域生长结果.
pub type FloodResult<T> = Result<T, FloodError>;
