// crates/dp_stratum/src/lib.rs

//! DykePiping 地层聚合引擎
//!
//! 将体素采样的三维岩性模型转换为分类、合并、简化的一维土层柱状
//! 图，识别含水层与覆盖层，并保持严格的排序与厚度不变量。
//!
//! # 模块概览
//!
//! - [`layer`]: 土层与原始岩性间隔类型
//! - [`layout`]: 层序抽象与不变量、过滤/裁剪变换
//! - [`material`]: 材料表（土类 → 物理属性）
//! - [`classify`]: 岩性分类（分类表 → 分类层序）
//! - [`grouping`]: 含水层四区带分组与有效属性
//! - [`representative`]: ≤4 层代表性简化层序
//! - [`leakage`]: 渗漏长度辅助计算
//!
//! # 数据流
//!
//! ```text
//! RawLithoLayout → classify → SoilLayout → group_layers → AquiferZones
//!                                        → build_representative_layout
//!                                        → combine_with_exit_point_layout
//! ```
//!
//! # 设计原则
//!
//! 1. **不可变层序**: 所有变换返回新层序，无原位修改
//! 2. **显式查表**: 材料表/分类表作为参数传入，无全局状态
//! 3. **缺测即 None**: 加权平均剔除缺测值，不按零处理

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod error;
pub mod grouping;
pub mod layer;
pub mod layout;
pub mod leakage;
pub mod material;
pub mod representative;

pub use classify::{classify, ClassificationRule, ClassificationTable, OPEN_BOUND};
pub use error::{StratumError, StratumResult};
pub use grouping::{
    calc_effective_aquifer_permeability, effective_aquifer_properties, group_layers,
    layouts_per_aquifer, AquiferZoneProperties, AquiferZones, EffectiveAquiferProperties,
    EffectivePermeabilityConfig,
};
pub use layer::{RawLithoLayer, SoilLayer, SoilParameters};
pub use layout::{RawLithoLayout, SoilLayout};
pub use leakage::{leakage_length, leakage_properties_from_layout, LeakageProperties};
pub use material::{MaterialTable, SoilMaterial};
pub use representative::{
    build_representative_layout, combine_with_exit_point_layout, AquiferOverride, AquiferParams,
};
