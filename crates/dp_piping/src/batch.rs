// crates/dp_piping/src/batch.rs

//! 批量出逸点计算
//!
//! 对一组出逸点在给定工况下逐含水层执行三项校核。失败策略分三级：
//!
//! - **配置错误**（未知地下水文模型、阻尼系数越界、模型 0 缺少
//!   水头）：整批计算开始前失败；
//! - **沟渠几何错误**：该出逸点降级为哨兵"未定义结果"记录，其余
//!   出逸点照常计算；
//! - **物理输入不足**（无含水层、缺 d70）：该出逸点标记为失败，
//!   不中止整批。
//!
//! 各出逸点计算相互独立、无共享可变状态，使用 rayon 并行执行，
//! 输出顺序与输入一致。核心不做任何自动重试。

use crate::calculation::PipingCalculation;
use crate::ditch::Ditch;
use crate::error::{PipingError, PipingResult};
use crate::hydraulics::{GeohydroModel, HydraulicInput};
use crate::summary::PipingSummary;
use dp_stratum::{layouts_per_aquifer, SoilLayout};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 建模的含水层数量上限
const MAX_AQUIFERS: usize = 2;

/// 单个含水层的两侧渗漏长度 [m]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakageLengthPair {
    /// 腹地侧 [m]
    pub hinterland: f64,
    /// 滩地侧 [m]
    pub foreland: f64,
}

/// 工况级水力标量
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScenarioHydraulics {
    /// 河水位 [m NAP]
    pub river_level: f64,
    /// 圩田水位 [m NAP]
    pub polder_level: f64,
    /// 河水位阻尼系数 [-]
    pub damping_factor: f64,
    /// 堤身宽度 [m]
    pub dike_width: f64,
    /// 地下水文模型
    pub geohydro_model: GeohydroModel,
    /// 用户给定的腹地含水层水头 [m NAP]（模型 0）
    pub aquifer_hydraulic_head: Option<f64>,
    /// 常态下腹地平均水头覆盖值 [m NAP]
    pub user_phi_avg_hinterland: Option<f64>,
    /// 常态下河侧平均水头覆盖值 [m NAP]
    pub user_phi_avg_river: Option<f64>,
}

/// 计算工况
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// 工况名称
    pub name: String,
    /// 水力标量
    pub hydraulics: ScenarioHydraulics,
}

/// 单个出逸点的输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitPointInput {
    /// 出逸点名称
    pub name: String,
    /// 拼接层序（代表性层序 + 出逸点覆盖层）
    pub layout: SoilLayout,
    /// 出逸点处的沟渠
    pub ditch: Option<Ditch>,
    /// 出逸点到堤轴线的距离 [m]
    pub distance_from_ref_line: f64,
    /// 出逸点到进水线的距离（渗径长度）[m]
    pub distance_from_entry_line: f64,
    /// 逐含水层的渗漏长度（下标 0 为第一含水层，模型 2 必需）
    pub leakage_lengths: Vec<LeakageLengthPair>,
}

/// 单个出逸点的判别结果
///
/// 三分结果类型强制调用方区分"未定义、继续整批"与真正的失败。
#[derive(Debug)]
pub enum PointOutcome {
    /// 全部含水层校核完成
    Evaluated(Vec<PipingSummary>),
    /// 沟渠几何无效，降级为哨兵记录
    Undefined {
        /// 几何错误描述
        reason: String,
        /// 哨兵汇总记录
        summary: Box<PipingSummary>,
    },
    /// 该出逸点物理输入不足
    Failed(PipingError),
}

/// 出逸点结果（含归属信息）
#[derive(Debug)]
pub struct PointResult {
    /// 出逸点名称
    pub exit_point: String,
    /// 工况名称
    pub scenario: String,
    /// 判别结果
    pub outcome: PointOutcome,
}

/// 在单个工况下批量计算一组出逸点
///
/// # Errors
///
/// 工况级配置错误（模型编码、阻尼系数、模型 0 缺水头）在任何出逸
/// 点计算前返回；出逸点级错误封装在 [`PointOutcome`] 中。
pub fn evaluate_batch(
    scenario: &ScenarioInput,
    points: &[ExitPointInput],
) -> PipingResult<Vec<PointResult>> {
    validate_scenario(&scenario.hydraulics)?;
    info!(
        "evaluating scenario '{}' for {} exit points",
        scenario.name,
        points.len()
    );

    Ok(points
        .par_iter()
        .map(|point| PointResult {
            exit_point: point.name.clone(),
            scenario: scenario.name.clone(),
            outcome: evaluate_point(scenario, point),
        })
        .collect())
}

/// 多工况批量计算，结果按 (工况, 出逸点) 顺序排列
pub fn evaluate_scenarios(
    scenarios: &[ScenarioInput],
    points: &[ExitPointInput],
) -> PipingResult<Vec<PointResult>> {
    let mut results = Vec::with_capacity(scenarios.len() * points.len());
    for scenario in scenarios {
        results.extend(evaluate_batch(scenario, points)?);
    }
    Ok(results)
}

/// 工况级配置校验：配置错误必须在任何计算前修正
fn validate_scenario(hydraulics: &ScenarioHydraulics) -> PipingResult<()> {
    match hydraulics.geohydro_model {
        GeohydroModel::UserDefined => {
            if hydraulics.aquifer_hydraulic_head.is_none() {
                return Err(PipingError::MissingInput {
                    field: "aquifer_hydraulic_head",
                });
            }
        }
        GeohydroModel::DampedRiverLevel => {
            if !(0.0..=1.0).contains(&hydraulics.damping_factor) {
                return Err(PipingError::InvalidDampingFactor {
                    value: hydraulics.damping_factor,
                });
            }
        }
        GeohydroModel::LeakageInterpolation => {}
    }
    Ok(())
}

/// 单个出逸点逐含水层计算
fn evaluate_point(scenario: &ScenarioInput, point: &ExitPointInput) -> PointOutcome {
    let per_aquifer = layouts_per_aquifer(&point.layout);
    if per_aquifer.len() > MAX_AQUIFERS {
        return PointOutcome::Failed(PipingError::TooManyAquifers {
            count: per_aquifer.len(),
        });
    }

    let mut summaries = Vec::with_capacity(per_aquifer.len());
    for (index, layout) in per_aquifer.into_iter().enumerate() {
        let aquifer_number = index + 1;
        let hydraulics = match assemble_input(scenario, point, index) {
            Ok(input) => input,
            Err(error) => return PointOutcome::Failed(error),
        };
        let calculation = PipingCalculation::new(hydraulics, layout, point.ditch.clone());

        match calculation.summary() {
            Ok(mut summary) => {
                summary.exit_point = Some(point.name.clone());
                summary.scenario = Some(scenario.name.clone());
                summary.aquifer = aquifer_number;
                summaries.push(summary);
            }
            Err(error) if error.is_ditch_geometry() => {
                debug!("exit point '{}': ditch geometry undefined: {error}", point.name);
                let mut sentinel = PipingSummary::undefined();
                sentinel.exit_point = Some(point.name.clone());
                sentinel.scenario = Some(scenario.name.clone());
                return PointOutcome::Undefined {
                    reason: error.to_string(),
                    summary: Box::new(sentinel),
                };
            }
            Err(error) => return PointOutcome::Failed(error),
        }
    }
    PointOutcome::Evaluated(summaries)
}

/// 组装单含水层计算的水力输入
fn assemble_input(
    scenario: &ScenarioInput,
    point: &ExitPointInput,
    aquifer_index: usize,
) -> PipingResult<HydraulicInput> {
    let hydraulics = &scenario.hydraulics;
    let leakage = point.leakage_lengths.get(aquifer_index);

    if hydraulics.geohydro_model == GeohydroModel::LeakageInterpolation && leakage.is_none() {
        return Err(PipingError::MissingInput {
            field: "leakage_lengths",
        });
    }

    Ok(HydraulicInput {
        river_level: hydraulics.river_level,
        polder_level: hydraulics.polder_level,
        damping_factor: hydraulics.damping_factor,
        dike_width: hydraulics.dike_width,
        distance_from_ref_line: point.distance_from_ref_line,
        distance_from_entry_line: point.distance_from_entry_line,
        geohydro_model: hydraulics.geohydro_model,
        leakage_length_hinterland: leakage.map(|pair| pair.hinterland),
        leakage_length_foreland: leakage.map(|pair| pair.foreland),
        aquifer_hydraulic_head: hydraulics.aquifer_hydraulic_head,
        user_phi_avg_hinterland: hydraulics.user_phi_avg_hinterland,
        user_phi_avg_river: hydraulics.user_phi_avg_river,
    })
}

// ============================================================================
// 测试
// ============================================================================
