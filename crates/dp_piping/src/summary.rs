// crates/dp_piping/src/summary.rs

//! 管涌汇总记录
//!
//! 每条记录对应一个 (出逸点, 工况, 含水层) 组合，包含三项校核值、
//! 两项极限状态得分与全部中间量。值语义区分两类"非正常"：
//!
//! - `Option::None`: 值未定义（原始数据为 NaN 或不可计算）
//! - 哨兵记录（[`PipingSummary::undefined`]）: 沟渠几何无效时整条
//!   记录以 9999 / None 填充，标记"未定义结果"而非"不安全结果"

use crate::constants::{CRITICAL_HEAVE_GRADIENT, D70_REF, M_P, R_C, THETA, WHITE_COEFFICIENT};
use serde::{Deserialize, Serialize};

/// 哨兵值：几何无效导致校核不可计算
pub const UNDEFINED_SENTINEL: f64 = 9999.0;

/// 单条管涌汇总记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipingSummary {
    /// 出逸点名称（批量计算时填充）
    pub exit_point: Option<String>,
    /// 工况名称（批量计算时填充）
    pub scenario: Option<String>,
    /// 含水层序号（1 = 第一含水层）
    pub aquifer: usize,
    /// 出逸点处是否有沟渠
    pub has_ditch: bool,
    /// 沟底宽 b [m]
    pub ditch_small_b: Option<f64>,
    /// 沟上口宽 B [m]
    pub ditch_large_b: Option<f64>,
    /// 地表高程 [m NAP]
    pub ground_level: f64,
    /// 河水位 [m NAP]
    pub river_level: f64,
    /// 出逸点潜水位 [m NAP]
    pub phreatic_level: f64,
    /// 覆盖层厚度 [m]
    pub cover_thickness: f64,
    /// 含水层厚度 [m]
    pub aquifer_thickness: Option<f64>,
    /// 含水层 Darcy 渗透系数 [m/d]
    pub aquifer_permeability: Option<f64>,
    /// 含水层固有渗透率 [m²]
    pub aquifer_intrinsic_permeability: Option<f64>,
    /// 含水层 d70 [mm]
    pub aquifer_d70: Option<f64>,
    /// 模型系数 m_p [-]
    pub m_p: f64,
    /// White 常数 [-]
    pub white_coefficient: f64,
    /// 滚动阻力角 θ [度]
    pub theta: f64,
    /// 参考粒径 d70_ref [m]
    pub d70_ref: f64,
    /// 覆盖层抗力折减系数 R_c [-]
    pub r_c: f64,
    /// 阻力因子 f₁ [-]
    pub f_resistance: Option<f64>,
    /// 尺度因子 f₂ [-]
    pub f_scale: Option<f64>,
    /// 几何因子 f₃ [-]
    pub f_geometry: Option<f64>,
    /// 渗径长度 [m]
    pub seepage_length: f64,
    /// Sellmeijer 临界水头差 ΔH_c [m]
    pub critical_head_difference: Option<f64>,
    /// 折减水头差 ΔH_red [m]
    pub reduced_head_difference: Option<f64>,
    /// 出逸点含水层水头 φ_exit [m NAP]
    pub aquifer_hydraulic_head: Option<f64>,
    /// 出逸点潜水位 h_exit [m NAP]
    pub water_level_exit_point: f64,
    /// 流土临界梯度 [-]
    pub critical_heave_gradient: f64,
    /// 顶托临界水头差 Δφ_c,u [m]
    pub uplift_potential_difference: Option<f64>,
    /// 顶托单元校核值
    pub uplift_unity_check: Option<f64>,
    /// 流土单元校核值
    pub heave_unity_check: Option<f64>,
    /// Sellmeijer 单元校核值
    pub sellmeijer_unity_check: Option<f64>,
    /// 顶托极限状态得分
    pub uplift_limit_state: Option<f64>,
    /// 流土极限状态得分
    pub heave_limit_state: Option<f64>,
}

impl PipingSummary {
    /// 沟渠几何无效时的哨兵记录
    ///
    /// 标量中间量以 9999 填充、校核值与极限状态为 None，与正常记录
    /// 同构，区分"值未定义"与"值不安全"。
    #[must_use]
    pub fn undefined() -> Self {
        Self {
            exit_point: None,
            scenario: None,
            aquifer: 1,
            has_ditch: false,
            ditch_small_b: None,
            ditch_large_b: None,
            ground_level: UNDEFINED_SENTINEL,
            river_level: UNDEFINED_SENTINEL,
            phreatic_level: UNDEFINED_SENTINEL,
            cover_thickness: UNDEFINED_SENTINEL,
            aquifer_thickness: Some(UNDEFINED_SENTINEL),
            aquifer_permeability: Some(UNDEFINED_SENTINEL),
            aquifer_intrinsic_permeability: Some(UNDEFINED_SENTINEL),
            aquifer_d70: Some(UNDEFINED_SENTINEL),
            m_p: M_P,
            white_coefficient: WHITE_COEFFICIENT,
            theta: THETA,
            d70_ref: D70_REF,
            r_c: R_C,
            f_resistance: Some(UNDEFINED_SENTINEL),
            f_scale: Some(UNDEFINED_SENTINEL),
            f_geometry: Some(UNDEFINED_SENTINEL),
            seepage_length: UNDEFINED_SENTINEL,
            critical_head_difference: Some(UNDEFINED_SENTINEL),
            reduced_head_difference: Some(UNDEFINED_SENTINEL),
            aquifer_hydraulic_head: Some(UNDEFINED_SENTINEL),
            water_level_exit_point: UNDEFINED_SENTINEL,
            critical_heave_gradient: CRITICAL_HEAVE_GRADIENT,
            uplift_potential_difference: None,
            uplift_unity_check: None,
            heave_unity_check: None,
            sellmeijer_unity_check: None,
            uplift_limit_state: None,
            heave_limit_state: None,
        }
    }

    /// 是否为哨兵记录
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        self.ground_level == UNDEFINED_SENTINEL && self.uplift_unity_check.is_none()
    }
}
