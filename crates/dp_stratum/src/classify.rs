// crates/dp_stratum/src/classify.rs

//! 岩性分类
//!
//! 将体素采样的原始岩性层序按用户分类表映射到材料表土类，
//! 并合并连续同类层。分类规则按"层顶高程落入深度区间且岩性
//! 编码一致"匹配；区间开端用 `None` 表示（用户表中的 `"-"`），
//! 解析为 ±99999。
//!
//! 分类完成后按最小含水层厚度降级过薄的含水层：太薄的透水层
//! 在水力学上不起含水层作用。

use crate::error::{StratumError, StratumResult};
use crate::layout::{RawLithoLayout, SoilLayout};
use crate::material::MaterialTable;
use log::debug;
use serde::{Deserialize, Serialize};

/// 开端深度区间的解析值 [m NAP]
pub const OPEN_BOUND: f64 = 99999.0;

/// 分类规则
///
/// 深度区间 `[depth_bottom, depth_top]` 内的岩性 `lithology_code`
/// 映射为材料表土类 `target_soil_name`。`None` 边界表示开端。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// 岩性编码
    pub lithology_code: String,
    /// 区间上界 [m NAP]，None 为无上界
    pub depth_top: Option<f64>,
    /// 区间下界 [m NAP]，None 为无下界
    pub depth_bottom: Option<f64>,
    /// 目标土类名称
    pub target_soil_name: String,
}

impl ClassificationRule {
    /// 解析后的区间上界
    #[inline]
    #[must_use]
    pub fn resolved_top(&self) -> f64 {
        self.depth_top.unwrap_or(OPEN_BOUND)
    }

    /// 解析后的区间下界
    #[inline]
    #[must_use]
    pub fn resolved_bottom(&self) -> f64 {
        self.depth_bottom.unwrap_or(-OPEN_BOUND)
    }

    /// 层顶高程是否落入本规则区间
    #[inline]
    #[must_use]
    fn contains(&self, top: f64) -> bool {
        top >= self.resolved_bottom() && top <= self.resolved_top()
    }
}

/// 分类表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationTable {
    rules: Vec<ClassificationRule>,
}

impl ClassificationTable {
    /// 从规则序列构造
    #[must_use]
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    /// 规则访问
    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// 预校验分类表
    ///
    /// # Errors
    ///
    /// - 同一岩性编码的两条规则深度区间重叠 →
    ///   [`StratumError::ClassificationConflict`]
    /// - 目标土类不在材料表 → [`StratumError::UnknownSoilType`]
    pub fn validate(&self, materials: &MaterialTable) -> StratumResult<()> {
        for (i, rule) in self.rules.iter().enumerate() {
            if materials.get(&rule.target_soil_name).is_none() {
                return Err(StratumError::UnknownSoilType {
                    name: rule.target_soil_name.clone(),
                });
            }
            for other in &self.rules[i + 1..] {
                if rule.lithology_code == other.lithology_code
                    && rule.resolved_bottom().max(other.resolved_bottom())
                        < rule.resolved_top().min(other.resolved_top())
                {
                    return Err(StratumError::ClassificationConflict {
                        code: rule.lithology_code.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// 匹配岩性编码与层顶高程对应的目标土类
    fn match_target(&self, code: &str, top: f64) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.lithology_code == code && rule.contains(top))
            .map(|rule| rule.target_soil_name.as_str())
    }
}

/// 对原始岩性层序执行分类
///
/// 自上而下扫描：逐层匹配分类规则；连续映射到同一土类的原始层
/// 合并为一个输出层（延伸上一输出层的层底，不重新匹配）。最后
/// 强制输出层序底面等于原始层序底面，防止合并循环截断。含水层
/// 标记取原始层的岩性派生标记，厚度不足 `min_aquifer_thickness`
/// 的含水层降级为非含水层。
///
/// # Errors
///
/// 任一原始层无匹配规则时返回 [`StratumError::UnclassifiedLithology`]。
pub fn classify(
    raw_layout: &RawLithoLayout,
    table: &ClassificationTable,
    materials: &MaterialTable,
    min_aquifer_thickness: f64,
) -> StratumResult<SoilLayout> {
    table.validate(materials)?;

    let mut output: Vec<crate::layer::SoilLayer> = Vec::new();
    let mut previous_soil: Option<String> = None;

    for raw in raw_layout.layers() {
        let target = table.match_target(&raw.lithology_code, raw.top).ok_or_else(|| {
            StratumError::UnclassifiedLithology {
                code: raw.lithology_code.clone(),
                top: raw.top,
            }
        })?;

        // 与上一层同类：并入上一输出层
        if previous_soil.as_deref() == Some(target) {
            continue;
        }
        if let Some(prev) = output.last_mut() {
            prev.bottom = raw.top;
        }
        output.push(materials.build_layer(target, raw.top, raw.bottom, Some(raw.is_aquifer))?);
        previous_soil = Some(target.to_string());
    }

    // 最后一个输出层可能吞并了多段原始层，层底对齐原始层序底面
    if let Some(last) = output.last_mut() {
        last.bottom = raw_layout.bottom();
    }

    demote_thin_aquifers(&mut output, min_aquifer_thickness);
    debug!("classified {} raw intervals into {} layers", raw_layout.layers().len(), output.len());
    SoilLayout::new(output)
}

/// 将厚度不足阈值的含水层降级为非含水层
fn demote_thin_aquifers(layers: &mut [crate::layer::SoilLayer], min_aquifer_thickness: f64) {
    for layer in layers {
        if layer.parameters.is_aquifer && layer.thickness() < min_aquifer_thickness {
            layer.parameters.is_aquifer = false;
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
