use crate::geometry::{in_aabb, segment_plane_intersect};
use crate::{Point3, Vector3};

/// 世界坐标下的折线路径, 区域生长时作为阻断边界.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryPath {
    vertices: Vec<Point3>,
}

impl FromIterator<Point3> for BoundaryPath {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Self {
            vertices: iter.into_iter().collect(),
        }
    }
}

impl BoundaryPath {
    /// 以顶点序列创建路径.
    #[inline]
    pub fn new(vertices: Vec<Point3>) -> Self {
        Self { vertices }
    }

    /// 路径顶点.
    #[inline]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// 线段 `from -> to` 是否穿过该路径.
    ///
    /// 对每条边 `back -> cur`, 取过 `cur`, 法向为 `(cur - back) × view_normal` 的平面,
    /// 即包含该边并沿视线方向延伸的 "墙". 线段与墙的交点落在该边的轴对齐包围盒内时视为穿过.
    /// 少于 2 个顶点的路径不会阻断任何线段.
    pub fn crosses(&self, from: &Point3, to: &Point3, view_normal: &Vector3) -> bool {
        self.vertices.windows(2).any(|edge| {
            let (back, cur) = (&edge[0], &edge[1]);
            let normal = (cur - back).cross(view_normal);
            segment_plane_intersect(from, to, cur, &normal).is_some_and(|x| in_aabb(&x, back, cur))
        })
    }
}
