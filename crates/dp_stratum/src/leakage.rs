// crates/dp_stratum/src/leakage.rs

//! 渗漏长度辅助计算
//!
//! 渗漏长度 λ = √(k_aq · d_cover · D_aq / k_cover)，表征覆盖层-含水层
//! 系统中水头影响的特征衰减距离。

use crate::error::{StratumError, StratumResult};
use crate::grouping::{
    effective_aquifer_properties, group_layers, EffectivePermeabilityConfig,
};
use crate::layout::SoilLayout;
use serde::{Deserialize, Serialize};

/// 渗漏长度 [m]
///
/// # 参数
/// - `cover_thickness`: 覆盖层厚度 [m]
/// - `k_cover`: 覆盖层垂直渗透系数 [m/d]
/// - `aquifer_thickness`: 含水层厚度 [m]
/// - `k_aquifer`: 含水层水平渗透系数 [m/d]
#[must_use]
pub fn leakage_length(
    cover_thickness: f64,
    k_cover: f64,
    aquifer_thickness: f64,
    k_aquifer: f64,
) -> f64 {
    (k_aquifer * cover_thickness * aquifer_thickness / k_cover).sqrt()
}

/// 渗漏长度计算所需的四个层序参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakageProperties {
    /// 覆盖层厚度 [m]
    pub cover_thickness: f64,
    /// 覆盖层垂直渗透系数（简单平均）[m/d]
    pub k_cover: Option<f64>,
    /// 含水层厚度 [m]
    pub aquifer_thickness: f64,
    /// 含水层有效水平渗透系数 [m/d]
    pub k_aquifer: Option<f64>,
}

impl LeakageProperties {
    /// 由参数计算渗漏长度，渗透系数缺测时返回 None
    #[must_use]
    pub fn leakage_length(&self) -> Option<f64> {
        match (self.k_cover, self.k_aquifer) {
            (Some(k_cover), Some(k_aquifer)) => Some(leakage_length(
                self.cover_thickness,
                k_cover,
                self.aquifer_thickness,
                k_aquifer,
            )),
            _ => None,
        }
    }
}

/// 未加权平均，剔除缺测值
fn plain_mean(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values.into_iter().flatten() {
        sum += value;
        count += 1;
    }
    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}

/// 从渗漏点层序提取渗漏长度参数
///
/// 第一含水层：覆盖层取第一含水层之上的非含水层；第二含水层：
/// "覆盖层"跨越覆盖层 + 第一含水层 + 中间层。
///
/// # Errors
///
/// 无第一含水层返回 [`StratumError::NoAquiferFound`]，
/// 请求第二含水层而层序中不存在时返回 [`StratumError::NoSecondAquifer`]。
pub fn leakage_properties_from_layout(
    layout: &SoilLayout,
    for_second_aquifer: bool,
    config: &EffectivePermeabilityConfig,
) -> StratumResult<LeakageProperties> {
    let zones = group_layers(layout);
    let props = effective_aquifer_properties(&zones, config)?;

    let (zone, k_aquifer, k_cover) = if for_second_aquifer {
        if !zones.has_second_aquifer() {
            return Err(StratumError::NoSecondAquifer);
        }
        let k_cover = plain_mean(
            zones
                .cover_layer
                .iter()
                .chain(&zones.first_aquifer)
                .chain(&zones.intermediate)
                .map(|l| l.parameters.vertical_permeability),
        );
        (&zones.second_aquifer, props.second_aquifer.permeability, k_cover)
    } else {
        let k_cover = plain_mean(
            zones
                .cover_layer
                .iter()
                .map(|l| l.parameters.vertical_permeability),
        );
        (&zones.first_aquifer, props.first_aquifer.permeability, k_cover)
    };

    Ok(LeakageProperties {
        cover_thickness: layout.top() - zone[0].top,
        k_cover,
        aquifer_thickness: zone[0].top - zone[zone.len() - 1].bottom,
        k_aquifer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{SoilLayer, SoilParameters};

    fn layer(top: f64, bottom: f64, aquifer: bool, k_v: f64, k_h: f64) -> SoilLayer {
        SoilLayer {
            top,
            bottom,
            soil_name: if aquifer { "Zand" } else { "Klei" }.to_string(),
            parameters: SoilParameters {
                is_aquifer: aquifer,
                gamma_dry: Some(17.0),
                gamma_wet: Some(19.0),
                vertical_permeability: Some(k_v),
                horizontal_permeability: Some(k_h),
                grain_size_d70: aquifer.then_some(0.2),
            },
        }
    }

    #[test]
    fn test_leakage_length_formula() {
        // λ = √(10 * 2 * 5 / 0.1) = √1000
        let lambda = leakage_length(2.0, 0.1, 5.0, 10.0);
        assert!((lambda - 1000.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_properties_first_aquifer() {
        let layout = SoilLayout::new(vec![
            layer(0.0, -2.0, false, 0.1, 0.2),
            layer(-2.0, -7.0, true, 5.0, 10.0),
        ])
        .unwrap();
        let props = leakage_properties_from_layout(
            &layout,
            false,
            &EffectivePermeabilityConfig::default(),
        )
        .unwrap();
        assert!((props.cover_thickness - 2.0).abs() < 1e-9);
        assert!((props.aquifer_thickness - 5.0).abs() < 1e-9);
        assert_eq!(props.k_cover, Some(0.1));
        assert_eq!(props.k_aquifer, Some(10.0));
        assert!(props.leakage_length().is_some());
    }

    #[test]
    fn test_properties_second_aquifer_spans_upper_zones() {
        let layout = SoilLayout::new(vec![
            layer(0.0, -2.0, false, 0.1, 0.2),
            layer(-2.0, -7.0, true, 5.0, 10.0),
            layer(-7.0, -9.0, false, 0.3, 0.4),
            layer(-9.0, -15.0, true, 8.0, 16.0),
        ])
        .unwrap();
        let props = leakage_properties_from_layout(
            &layout,
            true,
            &EffectivePermeabilityConfig::default(),
        )
        .unwrap();
        // "覆盖层"跨越 0 到 -9
        assert!((props.cover_thickness - 9.0).abs() < 1e-9);
        assert!((props.aquifer_thickness - 6.0).abs() < 1e-9);
        // k_cover = mean(0.1, 5.0, 0.3)
        assert!((props.k_cover.unwrap() - (0.1 + 5.0 + 0.3) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_second_aquifer_missing_rejected() {
        let layout = SoilLayout::new(vec![
            layer(0.0, -2.0, false, 0.1, 0.2),
            layer(-2.0, -7.0, true, 5.0, 10.0),
        ])
        .unwrap();
        let result = leakage_properties_from_layout(
            &layout,
            true,
            &EffectivePermeabilityConfig::default(),
        );
        assert!(matches!(result, Err(StratumError::NoSecondAquifer)));
    }
}
