// crates/dp_piping/src/ditch.rs

//! 沟渠横断面几何
//!
//! 沟渠由横断面局部坐标系下的四个角点描述：
//!
//! ```text
//!     ____ 1     B     4 _____
//!         \            /
//!         2\________ /3
//!               b
//! ```
//!
//! 顶托校核的有效覆盖高度 `h_eff` 按三种几何情形之一选取：
//!
//! - `h1 ≥ B` → 情形 h1：有效高度取右上角点到含水层顶面
//! - `h2 ≤ b` → 情形 h2：有效高度取沟底到含水层顶面
//! - `b < h2 ≤ B` → 情形 h3：边坡较缓时用三角闭式解，否则从沟底
//!   中点向两侧发射 1:2 倾角射线与地表线求交，取较低交点
//!
//! 三种情形都不满足时几何不自洽，按错误上报、不做猜测。

use crate::error::{PipingError, PipingResult};
use dp_geo::{Point2D, Polyline2D};
use serde::{Deserialize, Serialize};

/// 地表线向沟渠两侧的延伸长度 [m]，h3 射线求交需要
const SURFACE_EXTEND: f64 = 20.0;

/// h3 射线的水平伸展 [m]（竖向为其 2 倍）
const RAY_REACH: f64 = 20.0;

/// `h_eff` 选取的几何情形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DitchCase {
    /// 宽浅沟渠，有效高度由沟顶控制
    H1,
    /// 窄深沟渠，有效高度由沟底控制
    H2,
    /// 过渡情形，有效高度由边坡几何控制
    H3,
}

impl std::fmt::Display for DitchCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::H1 => write!(f, "h1"),
            Self::H2 => write!(f, "h2"),
            Self::H3 => write!(f, "h3"),
        }
    }
}

/// 沟渠记录（外部协作方裁剪断面后的标量输入）
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DitchRecord {
    /// 左岸边缘沿断面距离 [m]
    pub left_edge_distance: f64,
    /// 右岸边缘沿断面距离 [m]
    pub right_edge_distance: f64,
    /// 水深或维护深度 [m]
    pub depth: f64,
    /// 边坡坡率（竖直/水平）[-]
    pub talu_slope: f64,
    /// 沟内是否有水
    pub is_wet: bool,
}

/// 沟渠横断面
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ditch {
    /// 左上角点（图中 1）
    pub left_top: Point2D,
    /// 左下角点（图中 2）
    pub left_bottom: Point2D,
    /// 右下角点（图中 3）
    pub right_bottom: Point2D,
    /// 右上角点（图中 4）
    pub right_top: Point2D,
    /// 沟内是否有水
    pub is_wet: bool,
    /// 水深或维护深度 [m]
    pub depth: Option<f64>,
    /// 边坡坡率（竖直/水平）[-]
    pub talu_slope: f64,
}

impl Ditch {
    /// 从四个角点构造
    #[must_use]
    pub fn new(
        left_top: Point2D,
        left_bottom: Point2D,
        right_bottom: Point2D,
        right_top: Point2D,
        is_wet: bool,
        depth: Option<f64>,
        talu_slope: f64,
    ) -> Self {
        Self {
            left_top,
            left_bottom,
            right_bottom,
            right_top,
            is_wet,
            depth,
            talu_slope,
        }
    }

    /// 从沟渠记录与圩田水位构造等腰梯形断面
    ///
    /// 沟顶高程取圩田水位，沟底由深度与坡率确定。
    #[must_use]
    pub fn from_record(record: &DitchRecord, polder_level: f64) -> Self {
        let run = record.depth / record.talu_slope;
        let left_top = Point2D::new(record.left_edge_distance, polder_level);
        let right_top = Point2D::new(record.right_edge_distance, polder_level);
        Self {
            left_top,
            left_bottom: Point2D::new(left_top.x + run, polder_level - record.depth),
            right_bottom: Point2D::new(right_top.x - run, polder_level - record.depth),
            right_top,
            is_wet: record.is_wet,
            depth: Some(record.depth),
            talu_slope: record.talu_slope,
        }
    }

    /// 沟底高程（两个沟底角点中较低者）[m NAP]
    #[inline]
    #[must_use]
    pub fn bottom_level(&self) -> f64 {
        self.left_bottom.y.min(self.right_bottom.y)
    }

    /// 沟渠地表线，两侧各水平延伸 `extend` 米
    ///
    /// ```text
    ///  _____          _____
    ///       \  ____  /
    ///        \/    \/
    /// ```
    #[must_use]
    pub fn surface_line(&self, extend: f64) -> Polyline2D {
        Polyline2D::new(vec![
            Point2D::new(self.left_top.x - extend, self.left_top.y),
            self.left_top,
            self.left_bottom,
            self.right_bottom,
            self.right_top,
            Point2D::new(self.right_top.x + extend, self.right_top.y),
        ])
    }

    /// 沟底宽 b [m]
    #[inline]
    #[must_use]
    pub fn small_b(&self) -> f64 {
        self.right_bottom.x - self.left_bottom.x
    }

    /// 沟上口宽 B [m]
    ///
    /// 过较低一侧沟顶角点作水平参考线与地表线求交：参考线过右上
    /// 角点时取第一个交点到右上角点的距离，过左上角点时取左上角
    /// 点到第二个交点的距离。
    ///
    /// # Errors
    ///
    /// 地表线与参考线交点不足两个时返回 [`PipingError::DitchLargeB`]，
    /// 单点相交的物理含义不明，按无效几何处理。
    pub fn large_b(&self) -> PipingResult<f64> {
        let surface = self.surface_line(SURFACE_EXTEND);
        if self.left_top.y >= self.right_top.y {
            let hits = surface.intersections_with_segment(
                Point2D::new(self.left_top.x, self.right_top.y),
                self.right_top,
            );
            if hits.len() >= 2 {
                Ok(self.right_top.x - hits[0].x)
            } else {
                Err(PipingError::DitchLargeB)
            }
        } else {
            let hits = surface.intersections_with_segment(
                self.left_top,
                Point2D::new(self.right_top.x, self.left_top.y),
            );
            if hits.len() >= 2 {
                Ok(hits[1].x - self.left_top.x)
            } else {
                Err(PipingError::DitchLargeB)
            }
        }
    }

    /// 候选高度 h1：右上角点到含水层顶面 [m]
    #[inline]
    #[must_use]
    pub fn h1(&self, z_aquifer: f64) -> f64 {
        self.right_top.y - z_aquifer
    }

    /// 候选高度 h2：右下角点到含水层顶面 [m]
    #[inline]
    #[must_use]
    pub fn h2(&self, z_aquifer: f64) -> f64 {
        self.right_bottom.y - z_aquifer
    }

    /// 候选高度 h3 [m]
    ///
    /// 边坡坡率小于 2 时存在三角闭式解；否则从沟底中点所在竖线与
    /// 含水层顶面的交点向两侧发射 1:2 倾角射线，与地表线求交，取
    /// 较低交点。
    pub fn h3(&self, z_aquifer: f64) -> PipingResult<f64> {
        if self.talu_slope < 2.0 {
            let h2 = self.h2(z_aquifer);
            let b = self.small_b();
            return Ok(2.0 * (h2 - b / (2.0 * self.talu_slope)) / (2.0 - 1.0 / self.talu_slope));
        }

        let surface = self.surface_line(SURFACE_EXTEND);
        let mid_x = (self.right_bottom.x + self.left_bottom.x) / 2.0;
        let origin = Point2D::new(mid_x, z_aquifer);

        let right = surface.first_intersection_with_ray(origin, Point2D::new(1.0, 2.0), RAY_REACH);
        let left = surface.first_intersection_with_ray(origin, Point2D::new(-1.0, 2.0), RAY_REACH);

        match (left, right) {
            (Some(l), Some(r)) => {
                let point = if l.y < r.y { l } else { r };
                Ok(point.y - z_aquifer)
            }
            _ => Err(self.heff_error(z_aquifer)),
        }
    }

    /// 顶托计算的有效覆盖高度与几何情形
    ///
    /// # Errors
    ///
    /// 三种情形都不满足时返回 [`PipingError::DitchHeff`]；
    /// `B` 不可确定时返回 [`PipingError::DitchLargeB`]。
    pub fn h_eff(&self, z_aquifer: f64) -> PipingResult<(f64, DitchCase)> {
        let large_b = self.large_b()?;
        let small_b = self.small_b();
        let h1 = self.h1(z_aquifer);
        let h2 = self.h2(z_aquifer);

        if h1 >= large_b {
            Ok((h1, DitchCase::H1))
        } else if h2 <= small_b {
            Ok((h2, DitchCase::H2))
        } else if small_b < h2 && h2 <= large_b {
            Ok((self.h3(z_aquifer)?, DitchCase::H3))
        } else {
            Err(self.heff_error(z_aquifer))
        }
    }

    fn heff_error(&self, z_aquifer: f64) -> PipingError {
        PipingError::DitchHeff {
            h1: self.h1(z_aquifer),
            h2: self.h2(z_aquifer),
            large_b: self.large_b().unwrap_or(f64::NAN),
            small_b: self.small_b(),
        }
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 对称梯形沟渠: 顶宽 8，底宽 6，深 1，坡率 1
    fn symmetric_ditch() -> Ditch {
        Ditch::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, -1.0),
            Point2D::new(7.0, -1.0),
            Point2D::new(8.0, 0.0),
            true,
            Some(1.0),
            1.0,
        )
    }

    #[test]
    fn test_small_b() {
        assert!((symmetric_ditch().small_b() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_b_equal_tops() {
        let b = symmetric_ditch().large_b().unwrap();
        assert!((b - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_b_left_top_higher() {
        // 左岸高于右岸：参考线过右上角点
        let ditch = Ditch::new(
            Point2D::new(0.0, 1.0),
            Point2D::new(2.0, -2.0),
            Point2D::new(10.0, -2.0),
            Point2D::new(11.0, 0.0),
            false,
            None,
            3.0,
        );
        // 左坡 (0,1)-(2,-2) 与 y=0 交于 x=2/3
        let b = ditch.large_b().unwrap();
        assert!((b - (11.0 - 2.0 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_h_eff_case_h2_shallow_aquifer() {
        let ditch = symmetric_ditch();
        // z = -6: h1 = 6 < B=8, h2 = 5 <= b=6 → h2
        let (h, case) = ditch.h_eff(-6.0).unwrap();
        assert_eq!(case, DitchCase::H2);
        assert!((h - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_h_eff_case_h3_transition() {
        let ditch = symmetric_ditch();
        // z = -7.5: h1 = 7.5 < 8, h2 = 6.5 ∈ (6, 8] → h3
        // 坡率 1 < 2，闭式解: 2*(6.5 - 6/2)/(2 - 1) = 7
        let (h, case) = ditch.h_eff(-7.5).unwrap();
        assert_eq!(case, DitchCase::H3);
        assert!((h - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_h_eff_case_h1_deep_aquifer() {
        let ditch = symmetric_ditch();
        // z = -9: h1 = 9 >= B=8 → h1
        let (h, case) = ditch.h_eff(-9.0).unwrap();
        assert_eq!(case, DitchCase::H1);
        assert!((h - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_h_eff_monotone_case_sweep() {
        // 含水层顶面自浅到深下扫：情形单调经过 h2 → h3 → h1
        let ditch = symmetric_ditch();
        let mut seen = Vec::new();
        let mut z = -6.0;
        while z > -10.0 {
            let (_, case) = ditch.h_eff(z).unwrap();
            if seen.last() != Some(&case) {
                seen.push(case);
            }
            z -= 0.05;
        }
        assert_eq!(seen, vec![DitchCase::H2, DitchCase::H3, DitchCase::H1]);
    }

    #[test]
    fn test_h3_ray_branch_steep_slope() {
        // 坡率 3 ≥ 2 → 射线求交分支；不对称断面保证过渡窗口非空
        let ditch = Ditch::new(
            Point2D::new(0.0, 1.0),
            Point2D::new(2.0, -2.0),
            Point2D::new(10.0, -2.0),
            Point2D::new(11.0, 0.0),
            false,
            None,
            3.0,
        );
        // z = -10.2: h1 = 10.2 < B ≈ 10.33 且 b=8 < h2=8.2 ≤ B → h3
        // 沟底中点 x=6，左射线与左坡交于 (1.6, -1.4)，右射线与右侧
        // 延伸线交于 (11.1, 0)，取较低点 → h3 = -1.4 - (-10.2) = 8.8
        let (h, case) = ditch.h_eff(-10.2).unwrap();
        assert_eq!(case, DitchCase::H3);
        assert!((h - 8.8).abs() < 1e-6);
    }

    #[test]
    fn test_from_record_builds_trapezoid() {
        let record = DitchRecord {
            left_edge_distance: 10.0,
            right_edge_distance: 18.0,
            depth: 1.0,
            talu_slope: 1.0,
            is_wet: true,
        };
        let ditch = Ditch::from_record(&record, 1.8);
        assert!((ditch.left_top.y - 1.8).abs() < 1e-9);
        assert!((ditch.left_bottom.x - 11.0).abs() < 1e-9);
        assert!((ditch.left_bottom.y - 0.8).abs() < 1e-9);
        assert!((ditch.small_b() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_case_display() {
        assert_eq!(DitchCase::H1.to_string(), "h1");
        assert_eq!(DitchCase::H3.to_string(), "h3");
    }
}
