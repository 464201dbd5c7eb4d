//! 平面光栅化和路径阻断共用的几何计算.

use std::f64::consts::TAU;

use crate::consts::{ANGLE_SUM_EPS, PARALLEL_EPS};
use crate::{Point3, Vector3};

/// 计算线段 `p0 -> p1` 与过点 `origin`, 法向为 `normal` 的平面的交点.
///
/// 线段与平面平行 (包括线段位于平面内), 或交点不在线段上时返回 `None`.
#[must_use]
pub fn segment_plane_intersect(
    p0: &Point3,
    p1: &Point3,
    origin: &Point3,
    normal: &Vector3,
) -> Option<Point3> {
    let dir = p1 - p0;
    let denom = normal.dot(&dir);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let t = normal.dot(&(origin - p0)) / denom;
    (0.0..=1.0).contains(&t).then(|| p0 + dir * t)
}

/// 以角度和判定与四边形共面的点 `p` 是否在四边形内.
///
/// `p` 与相邻两顶点连线的夹角之和为 2π (误差 [`ANGLE_SUM_EPS`]) 时视为在内部.
/// `p` 与任一顶点几乎重合时直接视为在内部.
#[must_use]
pub fn inside_by_angle_sum(p: &Point3, quad: &[Point3; 4]) -> bool {
    let mut sum = 0.0;
    for n in 0..4 {
        let v1 = quad[n] - p;
        let v2 = quad[(n + 1) % 4] - p;
        if (v1.norm() * v2.norm()).abs() <= ANGLE_SUM_EPS {
            return true;
        }
        sum += v1.angle(&v2);
    }
    (sum - TAU).abs() <= ANGLE_SUM_EPS
}

/// `p` 是否在以 `a`, `b` 为对角的轴对齐长方体内 (含边界).
#[must_use]
pub fn in_aabb(p: &Point3, a: &Point3, b: &Point3) -> bool {
    (0..3).all(|i| a[i].min(b[i]) <= p[i] && p[i] <= a[i].max(b[i]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square(z: f64) -> [Point3; 4] {
        [
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    #[test]
    fn test_segment_hits_plane() {
        let hit = segment_plane_intersect(
            &Point3::new(0.0, 0.0, -1.0),
            &Point3::new(2.0, 0.0, 1.0),
            &Point3::origin(),
            &Vector3::z(),
        );
        assert_relative_eq!(hit.unwrap(), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_segment_misses_plane() {
        let short = segment_plane_intersect(
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::new(0.0, 0.0, 2.0),
            &Point3::origin(),
            &Vector3::z(),
        );
        assert_eq!(short, None);

        let parallel = segment_plane_intersect(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(3.0, 1.0, 0.0),
            &Point3::origin(),
            &Vector3::z(),
        );
        assert_eq!(parallel, None);

        let zero_normal = segment_plane_intersect(
            &Point3::new(0.0, 0.0, -1.0),
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::origin(),
            &Vector3::zeros(),
        );
        assert_eq!(zero_normal, None);
    }

    #[test]
    fn test_segment_endpoint_on_plane() {
        let hit = segment_plane_intersect(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, 1.0),
            &Point3::origin(),
            &Vector3::z(),
        );
        assert_eq!(hit, Some(Point3::origin()));
    }

    #[test]
    fn test_angle_sum() {
        let q = unit_square(0.0);
        assert!(inside_by_angle_sum(&Point3::new(0.5, 0.5, 0.0), &q));
        assert!(inside_by_angle_sum(&Point3::new(0.1, 0.9, 0.0), &q));
        assert!(!inside_by_angle_sum(&Point3::new(1.5, 0.5, 0.0), &q));
        assert!(!inside_by_angle_sum(&Point3::new(-0.2, -0.2, 0.0), &q));
        // 顶点本身.
        assert!(inside_by_angle_sum(&Point3::new(1.0, 1.0, 0.0), &q));
    }

    #[test]
    fn test_aabb() {
        let a = Point3::new(2.0, 0.0, 1.0);
        let b = Point3::new(0.0, 1.0, 1.0);
        assert!(in_aabb(&Point3::new(1.0, 0.5, 1.0), &a, &b));
        assert!(in_aabb(&Point3::new(2.0, 1.0, 1.0), &a, &b));
        assert!(!in_aabb(&Point3::new(1.0, 0.5, 1.1), &a, &b));
        assert!(!in_aabb(&Point3::new(-0.1, 0.5, 1.0), &a, &b));
    }
}
