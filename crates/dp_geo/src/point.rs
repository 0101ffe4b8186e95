// crates/dp_geo/src/point.rs

//! 2D 点类型与线段相交
//!
//! 横断面局部坐标系：x 为沿断面距离 [m]，y 为高程 [m NAP]。

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// 平行判定容差
const PARALLEL_EPS: f64 = 1e-12;

// ============================================================================
// Point2D
// ============================================================================

/// 2D 点 - 横断面局部坐标
///
/// # 示例
///
/// ```
/// use dp_geo::Point2D;
///
/// let p1 = Point2D::new(0.0, 0.0);
/// let p2 = Point2D::new(3.0, 4.0);
/// assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-10);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// 沿断面距离 [m]
    pub x: f64,
    /// 高程 [m NAP]
    pub y: f64,
}

impl Point2D {
    /// 零点常量
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// 创建新的 2D 点
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 点积
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 叉积（返回标量，即 Z 分量）
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// 向量长度
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 计算到另一个点的欧几里得距离
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 线性插值
    #[inline]
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// 标量乘法
    #[inline]
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// 判断是否为有限数（非 NaN、非 Inf）
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// 判断两点是否在容差内重合
    #[inline]
    #[must_use]
    pub fn almost_eq(&self, other: &Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

// ============================================================================
// 运算符实现
// ============================================================================

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for Point2D {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        self.scale(scalar)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for (f64, f64) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

// ============================================================================
// 线段相交
// ============================================================================

/// 计算两条闭线段的交点
///
/// 返回交点（含端点接触）。共线重叠为退化情形，返回 `None`，
/// 由调用方按领域规则处理。
///
/// # 参数
/// - `a1`, `a2`: 线段 A 的端点
/// - `b1`, `b2`: 线段 B 的端点
#[must_use]
pub fn segment_intersection(a1: Point2D, a2: Point2D, b1: Point2D, b2: Point2D) -> Option<Point2D> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(&s);

    if denom.abs() < PARALLEL_EPS {
        // 平行或共线，不产生唯一交点
        return None;
    }

    let qp = b1 - a1;
    let t = qp.cross(&s) / denom;
    let u = qp.cross(&r) / denom;

    if (-PARALLEL_EPS..=1.0 + PARALLEL_EPS).contains(&t)
        && (-PARALLEL_EPS..=1.0 + PARALLEL_EPS).contains(&u)
    {
        Some(a1.lerp(&a2, t.clamp(0.0, 1.0)))
    } else {
        None
    }
}

// ============================================================================
// 测试
// ============================================================================
