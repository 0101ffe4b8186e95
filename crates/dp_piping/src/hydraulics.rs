// crates/dp_piping/src/hydraulics.rs

//! 水力边界条件与出逸点水头模型
//!
//! 含水层在出逸点处的水头 φ_exit 按三级地下水文模型之一确定：
//!
//! - 模型 0：用户直接给定水头
//! - 模型 1：阻尼河水位 `φ_avg,hin + r·(river − φ_avg,riv)`
//! - 模型 2：圩田水位与中间水头按渗漏长度加权插值，并随出逸点到
//!   堤轴线的距离在腹地渗漏长度上指数衰减

use crate::error::{PipingError, PipingResult};
use serde::{Deserialize, Serialize};

/// 地下水文模型级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeohydroModel {
    /// 模型 0：用户给定出逸点水头
    UserDefined,
    /// 模型 1：阻尼河水位
    DampedRiverLevel,
    /// 模型 2：渗漏长度插值
    LeakageInterpolation,
}

impl GeohydroModel {
    /// 从离散编码解析模型
    ///
    /// # Errors
    ///
    /// 未知编码返回 [`PipingError::UnknownGeohydroModel`]。
    pub fn from_code(code: &str) -> PipingResult<Self> {
        match code {
            "0" => Ok(Self::UserDefined),
            "1" => Ok(Self::DampedRiverLevel),
            "2" => Ok(Self::LeakageInterpolation),
            other => Err(PipingError::UnknownGeohydroModel {
                model: other.to_string(),
            }),
        }
    }
}

/// 单次管涌计算的水力输入
///
/// 类型化的参数结构，构造后通过 [`HydraulicInput::validate`] 做
/// 模型相关校验，不在使用点逐项检查。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HydraulicInput {
    /// 河水位 [m NAP]
    pub river_level: f64,
    /// 圩田水位 [m NAP]
    pub polder_level: f64,
    /// 河水位阻尼系数 [-]
    pub damping_factor: f64,
    /// 堤身宽度 [m]
    pub dike_width: f64,
    /// 出逸点到堤轴线的距离 [m]
    pub distance_from_ref_line: f64,
    /// 出逸点到进水线的距离（渗径长度）[m]
    pub distance_from_entry_line: f64,
    /// 地下水文模型
    pub geohydro_model: GeohydroModel,
    /// 腹地渗漏长度 [m]（模型 2）
    pub leakage_length_hinterland: Option<f64>,
    /// 滩地渗漏长度 [m]（模型 2）
    pub leakage_length_foreland: Option<f64>,
    /// 用户给定的腹地含水层水头 [m NAP]（模型 0）
    pub aquifer_hydraulic_head: Option<f64>,
    /// 常态下腹地平均水头覆盖值 [m NAP]
    pub user_phi_avg_hinterland: Option<f64>,
    /// 常态下河侧平均水头覆盖值 [m NAP]
    pub user_phi_avg_river: Option<f64>,
}

impl HydraulicInput {
    /// 常态下腹地含水层平均水头，缺省取圩田水位
    #[inline]
    #[must_use]
    pub fn phi_avg_hinterland(&self) -> f64 {
        self.user_phi_avg_hinterland.unwrap_or(self.polder_level)
    }

    /// 常态下河侧含水层平均水头，缺省取圩田水位
    #[inline]
    #[must_use]
    pub fn phi_avg_river(&self) -> f64 {
        self.user_phi_avg_river.unwrap_or(self.polder_level)
    }

    /// 出逸点含水层水头 φ_exit [m NAP]
    ///
    /// # Errors
    ///
    /// - 模型 0 缺少用户水头 → [`PipingError::MissingInput`]
    /// - 模型 1 阻尼系数越界 → [`PipingError::InvalidDampingFactor`]
    /// - 模型 2 缺少渗漏长度 → [`PipingError::MissingInput`]
    pub fn phi_exit(&self) -> PipingResult<f64> {
        match self.geohydro_model {
            GeohydroModel::UserDefined => {
                self.aquifer_hydraulic_head.ok_or(PipingError::MissingInput {
                    field: "aquifer_hydraulic_head",
                })
            }
            GeohydroModel::DampedRiverLevel => {
                if !(0.0..=1.0).contains(&self.damping_factor) {
                    return Err(PipingError::InvalidDampingFactor {
                        value: self.damping_factor,
                    });
                }
                Ok(self.phi_avg_hinterland()
                    + self.damping_factor * (self.river_level - self.phi_avg_river()))
            }
            GeohydroModel::LeakageInterpolation => {
                let lambda_hin =
                    self.leakage_length_hinterland
                        .ok_or(PipingError::MissingInput {
                            field: "leakage_length_hinterland",
                        })?;
                let lambda_for = self.leakage_length_foreland.ok_or(PipingError::MissingInput {
                    field: "leakage_length_foreland",
                })?;
                let phi_2 = self.polder_level
                    + (self.river_level - self.polder_level) * lambda_hin
                        / (lambda_for + self.dike_width + lambda_hin);
                Ok(self.polder_level
                    + (phi_2 - self.polder_level)
                        * ((self.dike_width / 2.0 - self.distance_from_ref_line) / lambda_hin)
                            .exp())
            }
        }
    }

    /// 模型相关输入校验
    pub fn validate(&self) -> PipingResult<()> {
        self.phi_exit().map(|_| ())
    }
}

// ============================================================================
// 测试
// ============================================================================
