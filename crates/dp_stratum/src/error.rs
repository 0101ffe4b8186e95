// crates/dp_stratum/src/error.rs

//! 地层层错误类型

use thiserror::Error;

/// 统一结果类型
pub type StratumResult<T> = Result<T, StratumError>;

/// 地层聚合错误
///
/// 配置类错误（分类表/材料表）应由调用方修正输入后重算，
/// 物理类错误（缺少含水层）按出漏点逐点上报。重试无意义：
/// 所有失败都是输入数据的确定性函数。
#[derive(Debug, Error)]
pub enum StratumError {
    /// 层序完整性被破坏（排序/连续性/空序列）
    #[error("地层序列无效: {reason}")]
    LayoutIntegrity {
        /// 具体违反的约束
        reason: String,
    },

    /// 岩性类无匹配分类规则
    #[error("岩性类 {code} (顶面 {top} m NAP) 不在分类表中")]
    UnclassifiedLithology {
        /// 岩性编码
        code: String,
        /// 层顶高程 [m NAP]
        top: f64,
    },

    /// 分类表中同一岩性类的深度区间重叠
    #[error("分类表冲突: 岩性类 {code} 的深度区间重叠")]
    ClassificationConflict {
        /// 岩性编码
        code: String,
    },

    /// 分类规则引用了材料表中不存在的土类
    #[error("材料表中不存在土类 {name}")]
    UnknownSoilType {
        /// 土类名称
        name: String,
    },

    /// 层序中没有任何含水层
    #[error("土层序列中未找到含水层")]
    NoAquiferFound,

    /// 需要第二含水层但层序中不存在
    #[error("土层序列中没有第二含水层")]
    NoSecondAquifer,

    /// 材料缺少颜色编码
    #[error("土类 {name} 缺少颜色编码")]
    MissingMaterialColor {
        /// 土类名称
        name: String,
    },
}

impl StratumError {
    /// 层序完整性错误
    pub fn integrity(reason: impl Into<String>) -> Self {
        Self::LayoutIntegrity {
            reason: reason.into(),
        }
    }
}
