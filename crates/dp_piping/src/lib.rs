// crates/dp_piping/src/lib.rs

//! DykePiping 管涌破坏机制引擎
//!
//! 基于一维土层柱状图、水力边界条件与沟渠几何，对堤防出逸点执行
//! 三项闭式地基校核：顶托 (uplift)、流土 (heave) 与 Sellmeijer
//! 向后侵蚀。
//!
//! # 模块概览
//!
//! - [`constants`]: 管涌导则标准常数
//! - [`ditch`]: 沟渠横断面几何与 h1/h2/h3 有效高度判别
//! - [`hydraulics`]: 三级地下水文模型与出逸点水头
//! - [`calculation`]: 单点计算上下文与三项校核
//! - [`summary`]: 汇总记录与哨兵语义
//! - [`batch`]: 并行批量计算与三分结果类型
//!
//! # 计算流程
//!
//! ```text
//! SoilLayout + HydraulicInput + Option<Ditch>
//!     → PipingCalculation → uplift / heave / Sellmeijer → PipingSummary
//! ```
//!
//! 所有计算同步、单线程、无副作用（除单次计算内的写一次缓存）；
//! 不同出逸点之间不共享可变状态，可安全并行。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod calculation;
pub mod constants;
pub mod ditch;
pub mod error;
pub mod hydraulics;
pub mod summary;

pub use batch::{
    evaluate_batch, evaluate_scenarios, ExitPointInput, LeakageLengthPair, PointOutcome,
    PointResult, ScenarioHydraulics, ScenarioInput,
};
pub use calculation::{CoverProperties, PipingCalculation};
pub use ditch::{Ditch, DitchCase, DitchRecord};
pub use error::{PipingError, PipingResult};
pub use hydraulics::{GeohydroModel, HydraulicInput};
pub use summary::{PipingSummary, UNDEFINED_SENTINEL};
