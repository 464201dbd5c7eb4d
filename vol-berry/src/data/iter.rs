use crate::Idx3d;

/// 体素索引迭代器. 按 `k` (depth) 最外层, `i` (width) 最内层的顺序产生索引,
/// 与 MGH/NIfTI 文件中体素的自然存储顺序一致.
///
/// 虽然如下函数也能实现相同的功能:
///
/// ```
/// type Idx3d = (usize, usize, usize);
///
/// fn pos_iter_auto((w, h, d): Idx3d) -> impl Iterator<Item = Idx3d> {
///     (0..d).flat_map(move |k| (0..h).flat_map(move |j| (0..w).map(move |i| (i, j, k))))
/// }
///
/// // ...
/// ```
///
/// 但该嵌套闭包迭代器对象占用的空间远大于手写 `PosIter3`. 标签导出和直方图统计都会
/// 在整个体数据上迭代, 因此为性能考虑, 我们保留该结构.
#[derive(Debug, Clone)]
pub struct PosIter3 {
    cur: Idx3d,
    shape: Idx3d,
}

impl PosIter3 {
    /// 以 `(width, height, depth)` 形状创建迭代器.
    #[inline]
    pub fn new(shape: Idx3d) -> Self {
        Self {
            cur: (0, 0, 0),
            shape,
        }
    }
}

impl Iterator for PosIter3 {
    type Item = Idx3d;

    fn next(&mut self) -> Option<Self::Item> {
        let (w, h, d) = self.shape;
        if w == 0 || h == 0 || d == 0 || self.cur.2 == d {
            return None;
        }
        let ret_pos = self.cur;
        let (i, j, k) = &mut self.cur;
        if *i + 1 < w {
            *i += 1;
        } else if *j + 1 < h {
            *i = 0;
            *j += 1;
        } else {
            *i = 0;
            *j = 0;
            *k += 1;
        }
        Some(ret_pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (w, h, d) = self.shape;
        if w == 0 || h == 0 || d == 0 {
            return (0, Some(0));
        }
        let (i, j, k) = self.cur;
        let consumed = (k * h + j) * w + i;
        let rest = w * h * d - consumed;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for PosIter3 {}
