// crates/dp_stratum/src/layout.rs

//! 一维土层柱状图
//!
//! [`SoilLayout`] 是全引擎共用的层序抽象：自上而下按层顶严格递减排列、
//! 相邻层连续（上层底 == 下层顶）、非空。构造时校验，之后只能通过
//! 纯变换函数（过滤、裁剪、分类、聚合）得到新的层序。
//!
//! # 不变量
//!
//! - `layers[i].top > layers[i].bottom`
//! - `layers[i].bottom == layers[i+1].top`
//! - 序列非空

use crate::error::{StratumError, StratumResult};
use crate::layer::{RawLithoLayer, SoilLayer};
use serde::{Deserialize, Serialize};

/// 层边界比较容差 [m]
const BOUNDARY_EPS: f64 = 1e-6;

/// 一维土层柱状图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SoilLayer>", into = "Vec<SoilLayer>")]
pub struct SoilLayout {
    layers: Vec<SoilLayer>,
}

impl SoilLayout {
    /// 从层序列构造，校验不变量
    ///
    /// # Errors
    ///
    /// 序列为空、存在零/负厚度层或相邻层不连续时返回
    /// [`StratumError::LayoutIntegrity`]。
    pub fn new(layers: Vec<SoilLayer>) -> StratumResult<Self> {
        if layers.is_empty() {
            return Err(StratumError::integrity("层序为空"));
        }
        for (i, layer) in layers.iter().enumerate() {
            if !(layer.top > layer.bottom) {
                return Err(StratumError::integrity(format!(
                    "第 {i} 层厚度非正: top={}, bottom={}",
                    layer.top, layer.bottom
                )));
            }
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if (pair[0].bottom - pair[1].top).abs() > BOUNDARY_EPS {
                return Err(StratumError::integrity(format!(
                    "第 {i} 层与第 {} 层之间不连续: bottom={}, next top={}",
                    i + 1,
                    pair[0].bottom,
                    pair[1].top
                )));
            }
        }
        Ok(Self { layers })
    }

    /// 层序列访问（自上而下）
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    /// 层数
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// 恒为 false（层序非空是构造不变量），为满足惯用 API 提供
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// 层序顶面高程（地表）[m NAP]
    #[inline]
    #[must_use]
    pub fn top(&self) -> f64 {
        self.layers[0].top
    }

    /// 层序底面高程 [m NAP]
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.layers[self.layers.len() - 1].bottom
    }

    /// 总厚度 [m]
    #[inline]
    #[must_use]
    pub fn total_thickness(&self) -> f64 {
        self.top() - self.bottom()
    }

    /// 自上而下第一个含水层
    #[must_use]
    pub fn first_aquifer_layer(&self) -> Option<&SoilLayer> {
        self.layers.iter().find(|layer| layer.is_aquifer())
    }

    /// 含水层层数
    #[must_use]
    pub fn aquifer_count(&self) -> usize {
        self.layers.iter().filter(|layer| layer.is_aquifer()).count()
    }

    // ========================================================================
    // 纯变换
    // ========================================================================

    /// 滤除过薄土层
    ///
    /// 厚度小于 `threshold` 的层被移除，空出的深度区间并入相邻保留层：
    /// 上方已有保留层时下延其层底，否则（序列开头被滤除）上延下一个
    /// 保留层的层顶。`merge_adjacent_same_soil` 为 true 时，随后将
    /// 连续同名土层合并为一层（层顶取首层、层底取最下层）。
    ///
    /// `filter_by_min_thickness(0.0, false)` 对任何合法层序是恒等变换。
    pub fn filter_by_min_thickness(
        &self,
        threshold: f64,
        merge_adjacent_same_soil: bool,
    ) -> StratumResult<Self> {
        let mut kept: Vec<SoilLayer> = Vec::with_capacity(self.layers.len());
        let mut pending_top: Option<f64> = None;

        for layer in &self.layers {
            if layer.thickness() < threshold {
                match kept.last_mut() {
                    // 上方保留层下延，吞并被滤除的区间
                    Some(prev) => prev.bottom = layer.bottom,
                    // 序列开头被滤除：记录最高的空出层顶
                    None => {
                        pending_top.get_or_insert(layer.top);
                    }
                }
            } else {
                let mut keep = layer.clone();
                if let Some(top) = pending_top.take() {
                    keep.top = top;
                }
                kept.push(keep);
            }
        }

        if merge_adjacent_same_soil {
            kept = merge_same_soil_runs(kept);
        }
        Self::new(kept)
    }

    /// 将层序裁剪/延伸到指定地表高程
    ///
    /// `z` 为 NaN 时地表未知，层序原样返回。否则完全位于 `z` 之上的层
    /// 被丢弃，包含 `z` 的层其层顶置为 `z`；`z` 高于层序顶面时首层
    /// 层顶上延至 `z`。
    pub fn clip_to_elevation(&self, z: f64) -> StratumResult<Self> {
        if z.is_nan() {
            return Ok(self.clone());
        }
        let mut layers = self.layers.clone();
        let mut start = 0usize;
        for i in 0..layers.len().saturating_sub(1) {
            if z >= layers[i].top || layers[i + 1].top < z {
                layers[i].top = z;
                break;
            }
            start += 1;
        }
        Self::new(layers.split_off(start))
    }
}

/// 合并连续同名土层
///
/// 层顶取每段首层、层底取每段最下层；属性沿用首层。
fn merge_same_soil_runs(layers: Vec<SoilLayer>) -> Vec<SoilLayer> {
    let mut merged: Vec<SoilLayer> = Vec::with_capacity(layers.len());
    for layer in layers {
        match merged.last_mut() {
            Some(prev) if prev.soil_name == layer.soil_name => prev.bottom = layer.bottom,
            _ => merged.push(layer),
        }
    }
    merged
}

impl TryFrom<Vec<SoilLayer>> for SoilLayout {
    type Error = StratumError;

    fn try_from(layers: Vec<SoilLayer>) -> StratumResult<Self> {
        Self::new(layers)
    }
}

impl From<SoilLayout> for Vec<SoilLayer> {
    fn from(layout: SoilLayout) -> Self {
        layout.layers
    }
}

// ============================================================================
// 原始岩性层序
// ============================================================================

/// 原始岩性层序（体素模型在某一平面位置的柱）
///
/// 与 [`SoilLayout`] 保持相同的排序/连续性不变量。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawLithoLayer>", into = "Vec<RawLithoLayer>")]
pub struct RawLithoLayout {
    layers: Vec<RawLithoLayer>,
}

impl RawLithoLayout {
    /// 从原始间隔构造，校验不变量
    pub fn new(layers: Vec<RawLithoLayer>) -> StratumResult<Self> {
        if layers.is_empty() {
            return Err(StratumError::integrity("原始岩性层序为空"));
        }
        for (i, layer) in layers.iter().enumerate() {
            if !(layer.top > layer.bottom) {
                return Err(StratumError::integrity(format!(
                    "第 {i} 个岩性间隔厚度非正: top={}, bottom={}",
                    layer.top, layer.bottom
                )));
            }
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if (pair[0].bottom - pair[1].top).abs() > BOUNDARY_EPS {
                return Err(StratumError::integrity(format!(
                    "第 {i} 个岩性间隔与下一间隔不连续",
                )));
            }
        }
        Ok(Self { layers })
    }

    /// 间隔序列（自上而下）
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[RawLithoLayer] {
        &self.layers
    }

    /// 层序底面高程 [m NAP]
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.layers[self.layers.len() - 1].bottom
    }
}

impl TryFrom<Vec<RawLithoLayer>> for RawLithoLayout {
    type Error = StratumError;

    fn try_from(layers: Vec<RawLithoLayer>) -> StratumResult<Self> {
        Self::new(layers)
    }
}

impl From<RawLithoLayout> for Vec<RawLithoLayer> {
    fn from(layout: RawLithoLayout) -> Self {
        layout.layers
    }
}

// ============================================================================
// 测试
// ============================================================================
