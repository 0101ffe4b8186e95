// crates/dp_geo/src/polyline.rs

//! 开放折线与相交查询
//!
//! 相交结果按折线走向排序：先按线段序号，再按交点在线段上的位置。
//! 沟渠几何依赖该顺序选取"第一个/第二个"交点。

use crate::point::{segment_intersection, Point2D};
use serde::{Deserialize, Serialize};

/// 交点去重容差 [m]
const DEDUP_EPS: f64 = 1e-9;

/// 开放折线
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Polyline2D {
    /// 折线顶点，按走向排列
    points: Vec<Point2D>,
}

impl Polyline2D {
    /// 从顶点序列创建折线
    ///
    /// 少于 2 个顶点的折线没有线段，相交查询恒为空。
    #[must_use]
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// 顶点访问
    #[must_use]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// 线段数量
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// 计算折线与一条线段的全部交点
    ///
    /// 交点按折线走向排序并去重（相邻线段共享顶点时，端点接触只计一次）。
    /// 共线重叠段不产生交点。
    #[must_use]
    pub fn intersections_with_segment(&self, p: Point2D, q: Point2D) -> Vec<Point2D> {
        let mut hits: Vec<Point2D> = Vec::new();
        for window in self.points.windows(2) {
            if let Some(hit) = segment_intersection(window[0], window[1], p, q) {
                if !hits.iter().any(|h| h.almost_eq(&hit, DEDUP_EPS)) {
                    hits.push(hit);
                }
            }
        }
        hits
    }

    /// 计算折线与一条射线段的第一个交点（按折线走向）
    ///
    /// 射线以有限线段表示：`origin` 到 `origin + direction * reach`。
    #[must_use]
    pub fn first_intersection_with_ray(
        &self,
        origin: Point2D,
        direction: Point2D,
        reach: f64,
    ) -> Option<Point2D> {
        let end = origin + direction.scale(reach);
        self.intersections_with_segment(origin, end).into_iter().next()
    }
}

impl From<Vec<(f64, f64)>> for Polyline2D {
    fn from(coords: Vec<(f64, f64)>) -> Self {
        Self::new(coords.into_iter().map(Point2D::from).collect())
    }
}

// ============================================================================
// 测试
// ============================================================================
