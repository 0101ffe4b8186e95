// crates/dp_stratum/src/representative.rs

//! 代表性简化层序
//!
//! 将分组后的区带聚合为最多 4 层的简化柱状图（覆盖层、第一含水层、
//! 中间弱透水层、第二含水层），用于堤段尺度的渗漏长度与管涌计算。
//! 含水层属性取用户标定的堤段级覆盖值，不由原始数据重新计算。

use crate::error::{StratumError, StratumResult};
use crate::grouping::group_layers;
use crate::layer::{SoilLayer, SoilParameters};
use crate::layout::SoilLayout;
use serde::{Deserialize, Serialize};

/// 简化层序的区带土类名
pub const COVER_LAYER_NAME: &str = "cover_layer";
/// 第一含水层土类名
pub const FIRST_AQUIFER_NAME: &str = "first_aquifer";
/// 中间弱透水层土类名
pub const INTERMEDIATE_NAME: &str = "intermediate_aquitard";
/// 第二含水层土类名
pub const SECOND_AQUIFER_NAME: &str = "second_aquifer";

/// 单个含水层的用户覆盖参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AquiferOverride {
    /// 渗透系数 [m/d]，同时用作垂直与水平值（简化层级的单一近似值）
    pub permeability: f64,
    /// 特征粒径 d70 [mm]
    pub d70: f64,
}

/// 含水层覆盖参数集
///
/// `second_aquifer` 为 `None` 时简化层序不包含第二含水层。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AquiferParams {
    /// 第一含水层覆盖参数
    pub first_aquifer: AquiferOverride,
    /// 第二含水层覆盖参数
    pub second_aquifer: Option<AquiferOverride>,
}

/// 厚度加权平均，`None` 值连同其权重一起剔除
fn weighted_mean<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, f64)>,
{
    let mut sum = 0.0;
    let mut weight = 0.0;
    for (value, w) in pairs {
        if let Some(v) = value {
            sum += v * w;
            weight += w;
        }
    }
    if weight > 0.0 {
        Some(sum / weight)
    } else {
        None
    }
}

/// 将一个区带的层聚合为单层
///
/// 容重取厚度加权平均；含水层区带的渗透系数与 d70 取用户覆盖值，
/// 非含水层区带的渗透系数取实测值的厚度加权平均、d70 置空。
fn agglomerate_zone(
    layers: &[SoilLayer],
    soil_name: &str,
    aquifer: Option<&AquiferOverride>,
) -> SoilLayer {
    let gamma_dry = weighted_mean(
        layers
            .iter()
            .map(|l| (l.parameters.gamma_dry, l.thickness())),
    );
    let gamma_wet = weighted_mean(
        layers
            .iter()
            .map(|l| (l.parameters.gamma_wet, l.thickness())),
    );

    let parameters = match aquifer {
        Some(params) => SoilParameters {
            is_aquifer: true,
            gamma_dry,
            gamma_wet,
            vertical_permeability: Some(params.permeability),
            horizontal_permeability: Some(params.permeability),
            grain_size_d70: Some(params.d70),
        },
        None => SoilParameters {
            is_aquifer: false,
            gamma_dry,
            gamma_wet,
            vertical_permeability: weighted_mean(
                layers
                    .iter()
                    .map(|l| (l.parameters.vertical_permeability, l.thickness())),
            ),
            horizontal_permeability: weighted_mean(
                layers
                    .iter()
                    .map(|l| (l.parameters.horizontal_permeability, l.thickness())),
            ),
            grain_size_d70: None,
        },
    };

    SoilLayer {
        top: layers[0].top,
        bottom: layers[layers.len() - 1].bottom,
        soil_name: soil_name.to_string(),
        parameters,
    }
}

/// 构建 ≤4 层的代表性简化层序
///
/// 按覆盖层 → 第一含水层 → 中间层 → 第二含水层的次序输出非空区带；
/// 第二含水层仅在用户启用（`params.second_aquifer` 为 Some）且区带
/// 非空时输出。
pub fn build_representative_layout(
    classified: &SoilLayout,
    params: &AquiferParams,
) -> StratumResult<SoilLayout> {
    let zones = group_layers(classified);
    let mut output = Vec::with_capacity(4);

    if !zones.cover_layer.is_empty() {
        output.push(agglomerate_zone(&zones.cover_layer, COVER_LAYER_NAME, None));
    }
    if !zones.first_aquifer.is_empty() {
        output.push(agglomerate_zone(
            &zones.first_aquifer,
            FIRST_AQUIFER_NAME,
            Some(&params.first_aquifer),
        ));
    }
    if !zones.intermediate.is_empty() {
        output.push(agglomerate_zone(&zones.intermediate, INTERMEDIATE_NAME, None));
    }
    if let Some(second) = &params.second_aquifer {
        if !zones.second_aquifer.is_empty() {
            output.push(agglomerate_zone(
                &zones.second_aquifer,
                SECOND_AQUIFER_NAME,
                Some(second),
            ));
        }
    }
    SoilLayout::new(output)
}

/// 将堤段代表性层序与出逸点局部层序拼接
///
/// 出逸点的覆盖层测量更精确：取出逸点层序的非含水层前缀聚合为新
/// 覆盖层，保留代表性层序中第一含水层及以下各层。两种情形：
///
/// - 出逸点覆盖层底高于代表性覆盖层底：仅上提第一含水层层顶；
/// - 否则：覆盖层以下所有层整体下移两者层底之差，不引入间断或重叠。
///
/// # Errors
///
/// 代表性层序仅一层（无含水层）时返回 [`StratumError::NoAquiferFound`]。
pub fn combine_with_exit_point_layout(
    representative: &SoilLayout,
    exit_point: &SoilLayout,
) -> StratumResult<SoilLayout> {
    if representative.len() <= 1 {
        return Err(StratumError::NoAquiferFound);
    }

    // 出逸点覆盖层前缀聚合
    let mut cover_bottom = exit_point.bottom();
    let mut cover_layers: Vec<&SoilLayer> = Vec::new();
    for layer in exit_point.layers() {
        if layer.is_aquifer() {
            break;
        }
        cover_bottom = layer.bottom;
        cover_layers.push(layer);
    }

    let cover = SoilLayer {
        top: exit_point.top(),
        bottom: cover_bottom,
        soil_name: representative.layers()[0].soil_name.clone(),
        parameters: SoilParameters {
            is_aquifer: false,
            gamma_dry: weighted_mean(
                cover_layers
                    .iter()
                    .map(|l| (l.parameters.gamma_dry, l.thickness())),
            ),
            gamma_wet: weighted_mean(
                cover_layers
                    .iter()
                    .map(|l| (l.parameters.gamma_wet, l.thickness())),
            ),
            vertical_permeability: weighted_mean(
                cover_layers
                    .iter()
                    .map(|l| (l.parameters.vertical_permeability, l.thickness())),
            ),
            horizontal_permeability: weighted_mean(
                cover_layers
                    .iter()
                    .map(|l| (l.parameters.horizontal_permeability, l.thickness())),
            ),
            grain_size_d70: None,
        },
    };

    let rep_cover_bottom = representative.layers()[0].bottom;
    let mut below: Vec<SoilLayer> = representative.layers()[1..].to_vec();

    if cover.bottom > rep_cover_bottom {
        // 出逸点覆盖层较薄：仅上提第一含水层层顶
        below[0].top = cover.bottom;
    } else {
        // 出逸点覆盖层较厚：下部层整体下移
        let shift = rep_cover_bottom - cover.bottom;
        for layer in &mut below {
            layer.top -= shift;
            layer.bottom -= shift;
        }
    }

    let mut combined = Vec::with_capacity(below.len() + 1);
    combined.push(cover);
    combined.extend(below);
    SoilLayout::new(combined)
}

// ============================================================================
// 测试
// ============================================================================
