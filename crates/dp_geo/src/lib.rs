// crates/dp_geo/src/lib.rs

//! DykePiping 几何基础层
//!
//! 提供横断面局部坐标系（沿断面距离 x，高程 y）下的 2D 几何类型：
//!
//! - [`point::Point2D`]: 2D 点/向量，带算术运算
//! - [`polyline::Polyline2D`]: 开放折线，支持按走向排序的相交查询
//!
//! # 设计原则
//!
//! 1. **轻依赖**: 仅依赖 serde，不引入线性代数库
//! 2. **确定性**: 所有相交计算为输入的纯函数
//! 3. **走向有序**: 折线相交结果按折线走向排序，调用方依赖该顺序
//!   选取"第一个"交点

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod point;
pub mod polyline;

pub use point::{segment_intersection, Point2D};
pub use polyline::Polyline2D;
