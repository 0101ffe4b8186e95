// crates/dp_stratum/src/grouping.rs

//! 含水层分组
//!
//! 对分类层序做单次自上而下扫描，将土层划分为四个区带：
//!
//! ```text
//! cover_layer → first_aquifer → intermediate → second_aquifer → (终止)
//! ```
//!
//! 状态机规则：覆盖层阶段累积非含水层，遇到第一个含水层切换到第一
//! 含水层阶段；第一含水层阶段累积含水层，遇到非含水层切换到中间层
//! 阶段；中间层阶段累积非含水层，遇到含水层切换到第二含水层阶段；
//! 第二含水层结束后剩余层全部忽略，模型最多考虑两个含水层。
//! 触发切换的层由新状态在同一次迭代中处理。
//!
//! # 有效渗透系数
//!
//! 含水层区带的有效水平渗透系数取厚度加权平均，除非最上层的渗透
//! 系数在区带内严格最大、且其厚度同时超过最小表皮厚度与区带总厚
//! 的给定比例，此时最上层单独决定有效值（薄的高渗透表皮主导水平
//! 渗流）。两个阈值来自外部导则的经验取值，作为可配置参数。

use crate::error::{StratumError, StratumResult};
use crate::layer::SoilLayer;
use crate::layout::SoilLayout;
use serde::{Deserialize, Serialize};

// ============================================================================
// 分组
// ============================================================================

/// 四区带分组结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AquiferZones {
    /// 覆盖层（第一含水层之上的非含水层）
    pub cover_layer: Vec<SoilLayer>,
    /// 第一含水层
    pub first_aquifer: Vec<SoilLayer>,
    /// 中间弱透水层
    pub intermediate: Vec<SoilLayer>,
    /// 第二含水层
    pub second_aquifer: Vec<SoilLayer>,
}

/// 扫描状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Cover,
    FirstAquifer,
    Intermediate,
    SecondAquifer,
    Done,
}

/// 对层序执行四区带分组扫描
#[must_use]
pub fn group_layers(layout: &SoilLayout) -> AquiferZones {
    let mut zones = AquiferZones::default();
    let mut state = ScanState::Cover;

    for layer in layout.layers() {
        let aquifer = layer.is_aquifer();

        if state == ScanState::Cover {
            if aquifer {
                state = ScanState::FirstAquifer;
            } else {
                zones.cover_layer.push(layer.clone());
            }
        }
        if state == ScanState::FirstAquifer {
            if aquifer {
                zones.first_aquifer.push(layer.clone());
            } else {
                state = ScanState::Intermediate;
            }
        }
        if state == ScanState::Intermediate {
            if aquifer {
                state = ScanState::SecondAquifer;
            } else {
                zones.intermediate.push(layer.clone());
            }
        }
        if state == ScanState::SecondAquifer {
            if aquifer {
                zones.second_aquifer.push(layer.clone());
            } else {
                state = ScanState::Done;
            }
        }
    }
    zones
}

impl AquiferZones {
    /// 第一含水层区带，缺失时报错
    pub fn first_aquifer_or_err(&self) -> StratumResult<&[SoilLayer]> {
        if self.first_aquifer.is_empty() {
            return Err(StratumError::NoAquiferFound);
        }
        Ok(&self.first_aquifer)
    }

    /// 是否存在第二含水层
    #[must_use]
    pub fn has_second_aquifer(&self) -> bool {
        !self.second_aquifer.is_empty()
    }
}

// ============================================================================
// 有效含水层属性
// ============================================================================

/// 高渗透表皮判定参数
///
/// 取值源自外部导则（最小厚度 1 m、占区带总厚 10%），按经验参数
/// 处理而非硬性不变量。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EffectivePermeabilityConfig {
    /// 表皮层最小厚度 [m]
    #[serde(default = "default_min_skin_thickness")]
    pub min_skin_thickness: f64,
    /// 表皮层占区带总厚的最小比例 [-]
    #[serde(default = "default_skin_fraction")]
    pub skin_fraction: f64,
}

fn default_min_skin_thickness() -> f64 {
    1.0
}

fn default_skin_fraction() -> f64 {
    0.1
}

impl Default for EffectivePermeabilityConfig {
    fn default() -> Self {
        Self {
            min_skin_thickness: default_min_skin_thickness(),
            skin_fraction: default_skin_fraction(),
        }
    }
}

/// 单个含水层区带的有效属性
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AquiferZoneProperties {
    /// 有效水平渗透系数 [m/d]
    pub permeability: Option<f64>,
    /// 特征粒径 d70 [mm]（取区带最上层）
    pub d70: Option<f64>,
}

/// 两个含水层区带的有效属性
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveAquiferProperties {
    /// 第一含水层
    pub first_aquifer: AquiferZoneProperties,
    /// 第二含水层（不存在时两个字段均为 None）
    pub second_aquifer: AquiferZoneProperties,
    /// 是否存在第二含水层
    pub has_second_aquifer: bool,
}

/// 计算含水层区带的有效水平渗透系数
///
/// 缺测（`None`）的层不参与加权；全部缺测时返回 `None`。
#[must_use]
pub fn calc_effective_aquifer_permeability(
    layers: &[SoilLayer],
    config: &EffectivePermeabilityConfig,
) -> Option<f64> {
    let total_thickness: f64 = layers.iter().map(SoilLayer::thickness).sum();

    // 高渗透表皮：最上层渗透系数严格最大且足够厚
    if let Some(top_k) = layers.first().and_then(|l| l.parameters.horizontal_permeability) {
        let strictly_highest = layers[1..]
            .iter()
            .filter_map(|l| l.parameters.horizontal_permeability)
            .all(|k| k < top_k)
            && layers.len() > 1;
        let top_thickness = layers[0].thickness();
        if strictly_highest
            && top_thickness > config.min_skin_thickness
            && top_thickness > total_thickness * config.skin_fraction
        {
            return Some(top_k);
        }
    }

    let mut weighted = 0.0;
    let mut weight = 0.0;
    for layer in layers {
        if let Some(k) = layer.parameters.horizontal_permeability {
            weighted += k * layer.thickness();
            weight += layer.thickness();
        }
    }
    if weight > 0.0 {
        Some(weighted / weight)
    } else {
        None
    }
}

/// 由分组结果计算两个含水层的有效属性
///
/// # Errors
///
/// 第一含水层缺失时返回 [`StratumError::NoAquiferFound`]。
pub fn effective_aquifer_properties(
    zones: &AquiferZones,
    config: &EffectivePermeabilityConfig,
) -> StratumResult<EffectiveAquiferProperties> {
    let first = zones.first_aquifer_or_err()?;
    let first_props = AquiferZoneProperties {
        permeability: calc_effective_aquifer_permeability(first, config),
        d70: first[0].parameters.grain_size_d70,
    };

    if zones.has_second_aquifer() {
        let second = &zones.second_aquifer;
        Ok(EffectiveAquiferProperties {
            first_aquifer: first_props,
            second_aquifer: AquiferZoneProperties {
                permeability: calc_effective_aquifer_permeability(second, config),
                // 含水层有效粒径取最上部砂层
                d70: second[0].parameters.grain_size_d70,
            },
            has_second_aquifer: true,
        })
    } else {
        Ok(EffectiveAquiferProperties {
            first_aquifer: first_props,
            second_aquifer: AquiferZoneProperties {
                permeability: None,
                d70: None,
            },
            has_second_aquifer: false,
        })
    }
}

// ============================================================================
// 按含水层拆分层序
// ============================================================================

/// 为每个含水层生成只含该含水层标记的层序
///
/// 多个层被标记为含水层时，逐层生成仅保留单个标记的层序副本，
/// 供逐含水层的管涌计算使用。无含水层时返回原层序的无标记副本。
#[must_use]
pub fn layouts_per_aquifer(layout: &SoilLayout) -> Vec<SoilLayout> {
    if layout.aquifer_count() <= 1 {
        return vec![layout.clone()];
    }

    let mut stripped: Vec<SoilLayer> = layout.layers().to_vec();
    for layer in &mut stripped {
        layer.parameters.is_aquifer = false;
    }

    let mut result = Vec::new();
    for (index, layer) in layout.layers().iter().enumerate() {
        if layer.is_aquifer() {
            let mut copy = stripped.clone();
            copy[index].parameters.is_aquifer = true;
            // 不变量未受影响，直接重构
            if let Ok(single) = SoilLayout::new(copy) {
                result.push(single);
            }
        }
    }
    result
}

// ============================================================================
// 测试
// ============================================================================
