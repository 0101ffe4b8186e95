// crates/dp_piping/src/error.rs

//! 管涌计算错误类型
//!
//! 沟渠几何错误（[`PipingError::DitchHeff`]、[`PipingError::DitchLargeB`]）
//! 在批量计算时按出逸点降级为"结果未定义"的哨兵记录；配置错误
//! （未知地下水文模型、阻尼系数越界）在任何计算开始前即失败。
//! 核心不做任何自动重试：所有失败都是输入的确定性函数。

use dp_stratum::StratumError;
use thiserror::Error;

/// 统一结果类型
pub type PipingResult<T> = Result<T, PipingError>;

/// 管涌计算错误
#[derive(Debug, Error)]
pub enum PipingError {
    /// 沟渠几何不落入 h1/h2/h3 任一情形
    #[error(
        "沟渠几何无法确定有效高度: h1={h1:.3}, h2={h2:.3}, B={large_b:.3}, b={small_b:.3}"
    )]
    DitchHeff {
        /// h1 候选值 [m]
        h1: f64,
        /// h2 候选值 [m]
        h2: f64,
        /// 上口宽 B [m]
        large_b: f64,
        /// 底宽 b [m]
        small_b: f64,
    },

    /// 沟渠地表线与水平参考线交点不足（单点相交，几何歧义）
    #[error("沟渠上口宽 B 无法确定: 地表线与水平参考线未给出两个交点")]
    DitchLargeB,

    /// 未知地下水文模型
    #[error("{model} 不是有效的地下水文模型")]
    UnknownGeohydroModel {
        /// 无效的模型编码
        model: String,
    },

    /// 含水层缺少 Sellmeijer 校核所需属性
    #[error("含水层缺少{property}")]
    MissingAquiferProperty {
        /// 缺失的属性名
        property: &'static str,
    },

    /// 阻尼系数越界
    #[error("阻尼系数无效: {value}，期望范围 [0, 1]")]
    InvalidDampingFactor {
        /// 实际值
        value: f64,
    },

    /// 缺少必需输入
    #[error("缺少必需输入: {field}")]
    MissingInput {
        /// 字段名
        field: &'static str,
    },

    /// 含水层数量超过建模上限
    #[error("含水层数量 {count} 超过上限 2")]
    TooManyAquifers {
        /// 实际数量
        count: usize,
    },

    /// 地层错误
    #[error(transparent)]
    Stratum(#[from] StratumError),
}

impl PipingError {
    /// 是否为沟渠几何错误
    ///
    /// 批量计算中此类错误转换为哨兵记录而非中止整批。
    #[must_use]
    pub fn is_ditch_geometry(&self) -> bool {
        matches!(self, Self::DitchHeff { .. } | Self::DitchLargeB)
    }
}
