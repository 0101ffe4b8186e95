// crates/dp_stratum/src/layer.rs

//! 土层类型定义
//!
//! [`SoilLayer`] 是分类后土层的最小单元，[`RawLithoLayer`] 是
//! 体素采样岩性模型的原始间隔。物理属性缺测用 `None` 表示，
//! 加权平均时剔除而非按零处理。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 土层物理属性
///
/// 渗透系数单位 [m/d]，容重单位 [kN/m³]，d70 单位 [mm]。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilParameters {
    /// 是否为含水层
    pub is_aquifer: bool,
    /// 干容重 [kN/m³]
    pub gamma_dry: Option<f64>,
    /// 湿容重 [kN/m³]
    pub gamma_wet: Option<f64>,
    /// 垂直渗透系数 [m/d]
    pub vertical_permeability: Option<f64>,
    /// 水平渗透系数 [m/d]
    pub horizontal_permeability: Option<f64>,
    /// 特征粒径 d70 [mm]
    pub grain_size_d70: Option<f64>,
}

/// 分类后的土层
///
/// 约定 `top > bottom`，高程为 m NAP。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// 层顶高程 [m NAP]
    pub top: f64,
    /// 层底高程 [m NAP]
    pub bottom: f64,
    /// 土类名称（来自材料表）
    pub soil_name: String,
    /// 物理属性
    pub parameters: SoilParameters,
}

impl SoilLayer {
    /// 层厚 [m]
    #[inline]
    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }

    /// 是否为含水层
    #[inline]
    #[must_use]
    pub fn is_aquifer(&self) -> bool {
        self.parameters.is_aquifer
    }
}

/// 原始岩性间隔（体素模型的一段）
///
/// `is_aquifer` 由岩性编码是否属于缺省含水层岩性决定，
/// 随分类传递并覆盖材料表的缺省值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLithoLayer {
    /// 层顶高程 [m NAP]
    pub top: f64,
    /// 层底高程 [m NAP]
    pub bottom: f64,
    /// 岩性编码
    pub lithology_code: String,
    /// 水平渗透系数 [m/d]
    pub horizontal_permeability: Option<f64>,
    /// 垂直渗透系数 [m/d]
    pub vertical_permeability: Option<f64>,
    /// 体积容重 [kN/m³]
    pub unit_weight: Option<f64>,
    /// 岩性缺省是否为含水层
    pub is_aquifer: bool,
    /// 各岩性类的概率 [%]，原样透传
    #[serde(default)]
    pub probabilities: BTreeMap<String, f64>,
}

impl RawLithoLayer {
    /// 层厚 [m]
    #[inline]
    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }
}
