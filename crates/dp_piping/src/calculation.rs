// crates/dp_piping/src/calculation.rs

//! 管涌计算上下文
//!
//! [`PipingCalculation`] 组合水力输入、拼接层序与可选沟渠，提供
//! 三项相互独立的闭式校核：
//!
//! - **顶托 (uplift)**: `uc = Δφ_c,u / (φ_exit − h_exit)`，
//!   `Δφ_c,u = σ'_cover / γ_w`
//! - **流土 (heave)**: `uc = i_c,h / ((φ_exit − h_exit) / d_cover)`，
//!   水头差恰为零时取 +∞（无破坏，不是错误）
//! - **Sellmeijer (向后侵蚀)**: `uc = m_p · ΔH_c / ΔH_red`，
//!   `ΔH_c = f₁·f₂·f₃·L`，`ΔH_red = max(0.01, river − h_exit − R_c·d)`
//!
//! 每项校核都是不可变输入的无状态函数；覆盖层属性在单次计算内
//! 写入一次缓存，供汇总生成复用。

use crate::constants::{
    CRITICAL_HEAVE_GRADIENT, D70_REF, GAMMA_P_SUB, GAMMA_W, GRAVITY, M_P, R_C, SECONDS_PER_DAY,
    THETA, VISCOSITY, WHITE_COEFFICIENT,
};
use crate::ditch::{Ditch, DitchCase};
use crate::error::{PipingError, PipingResult};
use crate::hydraulics::HydraulicInput;
use crate::summary::PipingSummary;
use dp_stratum::{SoilLayer, SoilLayout, StratumError};
use std::cell::OnceCell;

/// 覆盖层聚合属性
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverProperties {
    /// 平均容重 [kN/m³]
    pub avg_gamma: f64,
    /// 有效厚度 [m]
    pub thickness: f64,
    /// 有效应力 [kN/m²]
    pub effective_stress: f64,
}

/// 单个出逸点、单个含水层的管涌计算上下文
#[derive(Debug)]
pub struct PipingCalculation {
    hydraulics: HydraulicInput,
    layout: SoilLayout,
    ditch: Option<Ditch>,
    cover_cache: OnceCell<CoverProperties>,
}

impl PipingCalculation {
    /// 创建计算上下文
    #[must_use]
    pub fn new(hydraulics: HydraulicInput, layout: SoilLayout, ditch: Option<Ditch>) -> Self {
        Self {
            hydraulics,
            layout,
            ditch,
            cover_cache: OnceCell::new(),
        }
    }

    /// 地表高程（首层层顶）[m NAP]
    #[inline]
    #[must_use]
    pub fn ground_level(&self) -> f64 {
        self.layout.top()
    }

    /// 含水层（自上而下第一个带含水层标记的层）
    ///
    /// # Errors
    ///
    /// 层序无含水层返回 [`StratumError::NoAquiferFound`]。
    pub fn aquifer_layer(&self) -> PipingResult<&SoilLayer> {
        self.layout
            .first_aquifer_layer()
            .ok_or_else(|| StratumError::NoAquiferFound.into())
    }

    /// 出逸点潜水位 h_exit [m NAP]
    ///
    /// 湿沟取圩田水位与沟底高程中较高者；干沟取沟底高程；
    /// 无沟渠取地表高程（假定完全饱和）。
    #[must_use]
    pub fn h_exit(&self) -> f64 {
        match &self.ditch {
            Some(ditch) if ditch.is_wet => self.hydraulics.polder_level.max(ditch.bottom_level()),
            Some(ditch) => ditch.bottom_level(),
            None => self.ground_level(),
        }
    }

    /// 出逸点含水层水头 φ_exit [m NAP]
    pub fn phi_exit(&self) -> PipingResult<f64> {
        self.hydraulics.phi_exit()
    }

    // ========================================================================
    // 覆盖层属性
    // ========================================================================

    /// 覆盖层平均容重与厚度
    ///
    /// 自上而下积分到第一个含水层。潜水位之上计干容重、之下计浮
    /// 容重（湿容重 − γ_w）。`cutoff_top` 给定时（沟渠情形），高于
    /// 截断面的层段不参与积分。
    ///
    /// 返回 `(平均容重 [kN/m³], 厚度 [m])`。容重缺测的层按 NaN
    /// 参与，向汇总的"未定义"标记传播。
    fn average_volumetric_weight_cover_layers(
        &self,
        ditch_phreatic_level: Option<f64>,
        cutoff_top: Option<f64>,
    ) -> (f64, f64) {
        let phreatic = ditch_phreatic_level.unwrap_or_else(|| self.h_exit());
        let mut thickness_gamma = 0.0;
        let mut thickness = 0.0;

        for layer in self.layout.layers() {
            if layer.is_aquifer() {
                break;
            }

            let mut top = layer.top;
            if let Some(cutoff) = cutoff_top {
                if layer.top > cutoff && layer.bottom > cutoff {
                    continue;
                }
                if layer.top > cutoff && cutoff > layer.bottom {
                    top = cutoff;
                }
            }

            let gamma_dry = layer.parameters.gamma_dry.unwrap_or(f64::NAN);
            let gamma_wet = layer.parameters.gamma_wet.unwrap_or(f64::NAN);

            if phreatic <= layer.bottom {
                // 潜水位在层底之下：全层计干容重
                thickness_gamma += (top - layer.bottom) * gamma_dry;
                thickness += top - layer.bottom;
            } else if layer.bottom < phreatic && phreatic < top {
                // 潜水位在层内：上段干、下段浮
                thickness_gamma += (top - phreatic) * gamma_dry;
                thickness += top - phreatic;
                thickness_gamma += (phreatic - layer.bottom) * (gamma_wet - GAMMA_W);
                thickness += phreatic - layer.bottom;
            } else {
                // 潜水位在层顶之上：全层计浮容重
                thickness_gamma += (top - layer.bottom) * (gamma_wet - GAMMA_W);
                thickness += top - layer.bottom;
            }
        }

        (thickness_gamma / thickness, thickness)
    }

    /// 覆盖层聚合属性（平均容重、厚度、有效应力）
    ///
    /// 无沟渠时积分整个覆盖层；有沟渠时潜水位与积分范围改由沟渠
    /// 的 `h_eff` 情形决定：湿沟在 h2/h3 情形下附加沟底以上的水柱
    /// 项，干沟仅截断覆盖层范围、不附加水柱。
    ///
    /// 结果在本计算上下文内只计算一次。
    pub fn cover_layer_properties(&self) -> PipingResult<CoverProperties> {
        if let Some(props) = self.cover_cache.get() {
            return Ok(*props);
        }
        let props = self.compute_cover_properties()?;
        let _ = self.cover_cache.set(props);
        Ok(props)
    }

    fn compute_cover_properties(&self) -> PipingResult<CoverProperties> {
        let Some(ditch) = &self.ditch else {
            let (avg_gamma, thickness) = self.average_volumetric_weight_cover_layers(None, None);
            return Ok(CoverProperties {
                avg_gamma,
                thickness,
                effective_stress: thickness * avg_gamma,
            });
        };

        let mut phreatic = self.h_exit();
        if !ditch.is_wet && phreatic >= ditch.left_bottom.y {
            phreatic = ditch.bottom_level();
        }
        let z_aquifer = self.aquifer_layer()?.top;
        let (thickness, case) = ditch.h_eff(z_aquifer)?;
        let (avg_gamma, _) = self
            .average_volumetric_weight_cover_layers(Some(phreatic), Some(z_aquifer + thickness));

        let effective_stress = match case {
            DitchCase::H1 => thickness * avg_gamma,
            DitchCase::H2 | DitchCase::H3 => {
                if ditch.is_wet {
                    thickness * avg_gamma + (phreatic - ditch.left_bottom.y) * GAMMA_W
                } else {
                    thickness * avg_gamma
                }
            }
        };

        Ok(CoverProperties {
            avg_gamma,
            thickness,
            effective_stress,
        })
    }

    // ========================================================================
    // 顶托
    // ========================================================================

    /// 顶托临界水头差 Δφ_c,u [m]
    pub fn uplift_critical_potential_difference(&self) -> PipingResult<f64> {
        Ok(self.cover_layer_properties()?.effective_stress / GAMMA_W)
    }

    /// 顶托单元校核值
    pub fn uplift_unity_check(&self) -> PipingResult<f64> {
        let potential = self.uplift_critical_potential_difference()?;
        Ok(potential / (self.phi_exit()? - self.h_exit()))
    }

    /// 顶托极限状态得分（负值为破坏）
    pub fn uplift_limit_state(&self) -> PipingResult<f64> {
        let potential = self.uplift_critical_potential_difference()?;
        Ok(potential - (self.phi_exit()? - self.h_exit()))
    }

    // ========================================================================
    // 流土
    // ========================================================================

    /// 流土单元校核值
    ///
    /// 水头差恰为零时返回 +∞：无渗流梯度即无破坏。
    pub fn heave_unity_check(&self) -> PipingResult<f64> {
        let head_difference = self.phi_exit()? - self.h_exit();
        if head_difference == 0.0 {
            return Ok(f64::INFINITY);
        }
        let thickness = self.cover_layer_properties()?.thickness;
        Ok(CRITICAL_HEAVE_GRADIENT / (head_difference / thickness))
    }

    /// 流土极限状态得分（负值为破坏）
    pub fn heave_limit_state(&self) -> PipingResult<f64> {
        let head_difference = self.phi_exit()? - self.h_exit();
        let thickness = self.cover_layer_properties()?.thickness;
        Ok(CRITICAL_HEAVE_GRADIENT - head_difference / thickness)
    }

    // ========================================================================
    // Sellmeijer
    // ========================================================================

    /// Sellmeijer 前置校验：含水层须有 d70 与水平渗透系数
    pub fn validate_sellmeijer(&self) -> PipingResult<()> {
        let aquifer = self.aquifer_layer()?;
        if aquifer.parameters.grain_size_d70.is_none() {
            return Err(PipingError::MissingAquiferProperty { property: "d70" });
        }
        if aquifer.parameters.horizontal_permeability.is_none() {
            return Err(PipingError::MissingAquiferProperty {
                property: "水平渗透系数",
            });
        }
        Ok(())
    }

    /// Darcy 渗透系数 [m/d] → 固有渗透率 [m²]
    ///
    /// κ = (ν / g) · k / 86400
    #[inline]
    #[must_use]
    pub fn intrinsic_permeability(horizontal_permeability: f64) -> f64 {
        (VISCOSITY / GRAVITY) * horizontal_permeability / SECONDS_PER_DAY
    }

    /// 阻力因子 f₁ = η · γ'_p / γ_w · tan θ
    #[must_use]
    pub fn f_resistance(&self) -> f64 {
        WHITE_COEFFICIENT * GAMMA_P_SUB / GAMMA_W * (THETA * std::f64::consts::PI / 180.0).tan()
    }

    /// 尺度因子 f₂ = d70_ref / (κ·L)^⅓ · (d70 / d70_ref)^0.4
    pub fn f_scale(&self) -> PipingResult<f64> {
        let aquifer = self.aquifer_layer()?;
        let seepage_length = self.hydraulics.distance_from_entry_line;
        // 输入字段单位为 mm，换算为 m
        let d70_m = aquifer.parameters.grain_size_d70.ok_or(
            PipingError::MissingAquiferProperty { property: "d70" },
        )? / 1e3;
        let k_hor = aquifer.parameters.horizontal_permeability.ok_or(
            PipingError::MissingAquiferProperty {
                property: "水平渗透系数",
            },
        )?;
        let kappa = Self::intrinsic_permeability(k_hor);
        Ok(D70_REF / (kappa * seepage_length).powf(1.0 / 3.0) * (d70_m / D70_REF).powf(0.4))
    }

    /// 几何因子 f₃ = 0.91 · (D/L)^(0.04 + 0.28 / ((D/L)^2.8 − 1))
    ///
    /// D == L 时指数分母为零，将 D 减去 1 mm 避开奇点。
    pub fn f_geometry(&self) -> PipingResult<f64> {
        let aquifer = self.aquifer_layer()?;
        let seepage_length = self.hydraulics.distance_from_entry_line;
        let mut aquifer_thickness = aquifer.thickness();
        if aquifer_thickness == seepage_length {
            aquifer_thickness -= 0.001;
        }
        let ratio = aquifer_thickness / seepage_length;
        let exponent = 0.04 + 0.28 / (ratio.powf(2.8) - 1.0);
        Ok(0.91 * ratio.powf(exponent))
    }

    /// Sellmeijer 临界水头差 ΔH_c = f₁·f₂·f₃·L [m]
    pub fn critical_head_difference(&self) -> PipingResult<f64> {
        Ok(self.f_resistance()
            * self.f_scale()?
            * self.f_geometry()?
            * self.hydraulics.distance_from_entry_line)
    }

    /// 折减水头差 ΔH_red = max(0.01, river − h_exit − R_c·d) [m]
    ///
    /// 0.3D 规则折减覆盖层抗力；下限 0.01 避免除零或负值。
    pub fn reduced_head_difference(&self) -> PipingResult<f64> {
        let cover_thickness = self.cover_layer_properties()?.thickness;
        Ok((self.hydraulics.river_level - self.h_exit() - R_C * cover_thickness).max(0.01))
    }

    /// Sellmeijer（向后侵蚀）单元校核值
    pub fn backward_erosion_unity_check(&self) -> PipingResult<f64> {
        self.validate_sellmeijer()?;
        Ok(M_P * self.critical_head_difference()? / self.reduced_head_difference()?)
    }

    // ========================================================================
    // 汇总
    // ========================================================================

    /// 生成完整汇总记录（含全部中间量）
    ///
    /// # Errors
    ///
    /// 沟渠几何错误与含水层属性缺失按原样向上传播，由批量层决定
    /// 降级策略。
    pub fn summary(&self) -> PipingResult<PipingSummary> {
        let cover = self.cover_layer_properties()?;
        let aquifer = self.aquifer_layer()?;
        let k_hor = aquifer.parameters.horizontal_permeability;
        let (ditch_small_b, ditch_large_b) = match &self.ditch {
            Some(ditch) => (Some(ditch.small_b()), Some(ditch.large_b()?)),
            None => (None, None),
        };

        Ok(PipingSummary {
            exit_point: None,
            scenario: None,
            aquifer: 1,
            has_ditch: self.ditch.is_some(),
            ditch_small_b,
            ditch_large_b,
            ground_level: self.ground_level(),
            river_level: self.hydraulics.river_level,
            phreatic_level: self.h_exit(),
            cover_thickness: cover.thickness,
            aquifer_thickness: finite(aquifer.thickness()),
            aquifer_permeability: k_hor,
            aquifer_intrinsic_permeability: k_hor.map(Self::intrinsic_permeability),
            aquifer_d70: aquifer.parameters.grain_size_d70,
            m_p: M_P,
            white_coefficient: WHITE_COEFFICIENT,
            theta: THETA,
            d70_ref: D70_REF,
            r_c: R_C,
            f_resistance: finite(self.f_resistance()),
            f_scale: finite(self.f_scale()?),
            f_geometry: finite(self.f_geometry()?),
            seepage_length: self.hydraulics.distance_from_entry_line,
            critical_head_difference: finite(self.critical_head_difference()?),
            reduced_head_difference: finite(self.reduced_head_difference()?),
            aquifer_hydraulic_head: not_nan(self.phi_exit()?),
            water_level_exit_point: self.h_exit(),
            critical_heave_gradient: CRITICAL_HEAVE_GRADIENT,
            uplift_potential_difference: not_nan(self.uplift_critical_potential_difference()?),
            uplift_unity_check: not_nan(self.uplift_unity_check()?),
            heave_unity_check: not_nan(self.heave_unity_check()?),
            sellmeijer_unity_check: not_nan(self.backward_erosion_unity_check()?),
            uplift_limit_state: not_nan(self.uplift_limit_state()?),
            heave_limit_state: not_nan(self.heave_limit_state()?),
        })
    }
}

/// NaN → None（"值未定义"标记），无穷大保留（流土 +∞ 是合法结果）
#[inline]
fn not_nan(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// NaN 与无穷都视为未定义的中间量
#[inline]
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydraulics::GeohydroModel;
    use dp_geo::Point2D;
    use dp_stratum::SoilParameters;

    fn layer(name: &str, top: f64, bottom: f64, aquifer: bool) -> SoilLayer {
        SoilLayer {
            top,
            bottom,
            soil_name: name.to_string(),
            parameters: SoilParameters {
                is_aquifer: aquifer,
                gamma_dry: Some(17.0),
                gamma_wet: Some(17.0),
                vertical_permeability: Some(if aquifer { 5.0 } else { 0.01 }),
                horizontal_permeability: Some(if aquifer { 10.0 } else { 0.01 }),
                grain_size_d70: aquifer.then_some(0.2),
            },
        }
    }

    fn layout() -> SoilLayout {
        SoilLayout::new(vec![
            layer("Klei", 0.0, -2.0, false),
            layer("Zand", -2.0, -12.0, true),
        ])
        .unwrap()
    }

    fn hydraulics() -> HydraulicInput {
        HydraulicInput {
            river_level: 5.5,
            polder_level: 1.8,
            damping_factor: 1.0,
            dike_width: 40.0,
            distance_from_ref_line: 30.0,
            distance_from_entry_line: 50.0,
            geohydro_model: GeohydroModel::UserDefined,
            leakage_length_hinterland: None,
            leakage_length_foreland: None,
            aquifer_hydraulic_head: Some(5.5),
            user_phi_avg_hinterland: None,
            user_phi_avg_river: None,
        }
    }

    fn calculation() -> PipingCalculation {
        PipingCalculation::new(hydraulics(), layout(), None)
    }

    #[test]
    fn test_h_exit_no_ditch_is_ground_level() {
        let calc = calculation();
        assert!((calc.h_exit() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_cover_properties_fully_saturated() {
        // 潜水位 = 地表 → 全覆盖层计浮容重 17 - 9.81 = 7.19
        let calc = calculation();
        let cover = calc.cover_layer_properties().unwrap();
        assert!((cover.thickness - 2.0).abs() < 1e-9);
        assert!((cover.avg_gamma - 7.19).abs() < 1e-9);
        assert!((cover.effective_stress - 14.38).abs() < 1e-9);
    }

    #[test]
    fn test_uplift_unity_check() {
        let calc = calculation();
        // Δφ = 14.38 / 9.81, uc = Δφ / (5.5 - 0)
        let expected = 14.38 / 9.81 / 5.5;
        assert!((calc.uplift_unity_check().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_heave_unity_check_finite() {
        let calc = calculation();
        // i = 5.5 / 2 = 2.75, uc = 0.3 / 2.75
        let expected = CRITICAL_HEAVE_GRADIENT / 2.75;
        assert!((calc.heave_unity_check().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_heave_zero_head_difference_is_infinite() {
        let mut input = hydraulics();
        input.aquifer_hydraulic_head = Some(0.0); // φ_exit == h_exit
        let calc = PipingCalculation::new(input, layout(), None);
        assert_eq!(calc.heave_unity_check().unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_reduced_head_difference_floor() {
        let mut input = hydraulics();
        input.river_level = -20.0; // 使 river - h_exit - R_c·d 远为负
        let calc = PipingCalculation::new(input, layout(), None);
        assert!((calc.reduced_head_difference().unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_sellmeijer_unity_check_positive() {
        let calc = calculation();
        let uc = calc.backward_erosion_unity_check().unwrap();
        assert!(uc.is_finite());
        assert!(uc > 0.0);
    }

    #[test]
    fn test_sellmeijer_missing_d70_rejected() {
        let mut layers = vec![
            layer("Klei", 0.0, -2.0, false),
            layer("Zand", -2.0, -12.0, true),
        ];
        layers[1].parameters.grain_size_d70 = None;
        let calc = PipingCalculation::new(
            hydraulics(),
            SoilLayout::new(layers).unwrap(),
            None,
        );
        assert!(matches!(
            calc.backward_erosion_unity_check(),
            Err(PipingError::MissingAquiferProperty { property: "d70" })
        ));
    }

    #[test]
    fn test_f_geometry_equal_thickness_nudged() {
        // 含水层厚度 == 渗径长度时避开奇点
        let layers = vec![
            layer("Klei", 0.0, -2.0, false),
            layer("Zand", -2.0, -52.0, true),
        ];
        let calc = PipingCalculation::new(
            hydraulics(),
            SoilLayout::new(layers).unwrap(),
            None,
        );
        let f3 = calc.f_geometry().unwrap();
        assert!(f3.is_finite());
        assert!(f3 > 0.0);
    }

    #[test]
    fn test_no_aquifer_rejected() {
        let calc = PipingCalculation::new(
            hydraulics(),
            SoilLayout::new(vec![layer("Klei", 0.0, -5.0, false)]).unwrap(),
            None,
        );
        assert!(matches!(
            calc.aquifer_layer(),
            Err(PipingError::Stratum(StratumError::NoAquiferFound))
        ));
    }

    #[test]
    fn test_wet_ditch_h_exit() {
        // 湿沟: h_exit = max(圩田水位, 沟底)
        let ditch = Ditch::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, -1.0),
            Point2D::new(7.0, -1.0),
            Point2D::new(8.0, 0.0),
            true,
            Some(1.0),
            1.0,
        );
        let calc = PipingCalculation::new(hydraulics(), layout(), Some(ditch));
        assert!((calc.h_exit() - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_dry_ditch_h_exit_is_bottom() {
        let ditch = Ditch::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, -1.0),
            Point2D::new(7.0, -1.0),
            Point2D::new(8.0, 0.0),
            false,
            Some(1.0),
            1.0,
        );
        let calc = PipingCalculation::new(hydraulics(), layout(), Some(ditch));
        assert!((calc.h_exit() - -1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wet_ditch_adds_water_column_h2() {
        // 含水层顶 -2: h1 = 2 < B=8, h2 = 1 ≤ b=6 → 情形 h2
        let ditch = Ditch::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, -1.0),
            Point2D::new(7.0, -1.0),
            Point2D::new(8.0, 0.0),
            true,
            Some(1.0),
            1.0,
        );
        let calc = PipingCalculation::new(hydraulics(), layout(), Some(ditch));
        let cover = calc.cover_layer_properties().unwrap();
        assert!((cover.thickness - 1.0).abs() < 1e-9);
        // 湿沟 h2: σ' = h_eff·γ_avg + (潜水位 - 沟底)·γ_w
        // 截断面 -1 之上的覆盖层段全部浸没: γ_avg = 7.19
        let expected = 1.0 * 7.19 + (1.8 - -1.0) * GAMMA_W;
        assert!((cover.effective_stress - expected).abs() < 1e-9);
    }

    #[test]
    fn test_dry_ditch_truncates_without_water_column() {
        let ditch = Ditch::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, -1.0),
            Point2D::new(7.0, -1.0),
            Point2D::new(8.0, 0.0),
            false,
            Some(1.0),
            1.0,
        );
        let calc = PipingCalculation::new(hydraulics(), layout(), Some(ditch));
        let cover = calc.cover_layer_properties().unwrap();
        assert!((cover.thickness - 1.0).abs() < 1e-9);
        assert!((cover.effective_stress - 1.0 * 7.19).abs() < 1e-9);
    }

    #[test]
    fn test_summary_contains_intermediate_factors() {
        let calc = calculation();
        let summary = calc.summary().unwrap();
        assert!(summary.f_resistance.is_some());
        assert!(summary.f_scale.is_some());
        assert!(summary.f_geometry.is_some());
        assert!(summary.sellmeijer_unity_check.unwrap() > 0.0);
        assert!((summary.ground_level - 0.0).abs() < 1e-9);
        assert!(!summary.has_ditch);
    }
}
