// crates/dp_piping/src/constants.rs

//! 管涌校核物理常数
//!
//! 数值取自荷兰管涌导则（schematiseringshandleiding piping）的标准值。

/// 水的容重 [kN/m³]
pub const GAMMA_W: f64 = 9.81;

/// 重力加速度 [m/s²]
pub const GRAVITY: f64 = 9.81;

/// Sellmeijer 模型系数 [-]
pub const M_P: f64 = 1.00;

/// 出逸点覆盖层抗力折减系数（0.3D 规则）[-]
pub const R_C: f64 = 0.30;

/// White 常数 [-]
pub const WHITE_COEFFICIENT: f64 = 0.25;

/// 砂粒滚动阻力角 [度]
pub const THETA: f64 = 37.0;

/// Sellmeijer 参考粒径 d70 [m]
pub const D70_REF: f64 = 0.000_208;

/// 水的运动粘度（10 °C）[m²/s]
pub const VISCOSITY: f64 = 0.000_001_33;

/// 砂粒浮容重 [kN/m³]
pub const GAMMA_P_SUB: f64 = 16.19;

/// 流土临界梯度 [-]
pub const CRITICAL_HEAVE_GRADIENT: f64 = 0.3;

/// 秒每天，Darcy 渗透系数 [m/d] → [m/s] 换算
pub const SECONDS_PER_DAY: f64 = 86_400.0;
