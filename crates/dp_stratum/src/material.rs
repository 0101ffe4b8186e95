// crates/dp_stratum/src/material.rs

//! 材料表
//!
//! 用户定义的土类及其物理属性。查表按名称进行，表作为显式参数
//! 传入分类/聚合调用，不存在全局状态。

use crate::error::{StratumError, StratumResult};
use crate::layer::{SoilLayer, SoilParameters};
use serde::{Deserialize, Serialize};

/// 单个土类定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilMaterial {
    /// 土类名称
    pub name: String,
    /// 颜色编码（"r,g,b" 字符串，原样保存，不做渲染）
    pub color: String,
    /// 缺省是否为含水层
    pub is_aquifer: bool,
    /// 干容重 [kN/m³]
    pub gamma_dry: Option<f64>,
    /// 湿容重 [kN/m³]
    pub gamma_wet: Option<f64>,
    /// 水平渗透系数 [m/d]
    pub k_hor: Option<f64>,
    /// 垂直渗透系数 [m/d]
    pub k_vert: Option<f64>,
    /// 特征粒径 d70 [mm]
    pub d70: Option<f64>,
}

/// 材料表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialTable {
    rows: Vec<SoilMaterial>,
}

impl MaterialTable {
    /// 从行序列构造
    #[must_use]
    pub fn new(rows: Vec<SoilMaterial>) -> Self {
        Self { rows }
    }

    /// 按名称查找土类
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SoilMaterial> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// 行访问
    #[must_use]
    pub fn rows(&self) -> &[SoilMaterial] {
        &self.rows
    }

    /// 由土类与层边界构造土层
    ///
    /// `overwrite_aquifer` 为 Some 时覆盖材料表的缺省含水层标记
    /// （分类时传入岩性派生的标记）。
    ///
    /// # Errors
    ///
    /// 土类不存在返回 [`StratumError::UnknownSoilType`]，
    /// 颜色编码缺失返回 [`StratumError::MissingMaterialColor`]。
    pub fn build_layer(
        &self,
        soil_name: &str,
        top: f64,
        bottom: f64,
        overwrite_aquifer: Option<bool>,
    ) -> StratumResult<SoilLayer> {
        let material = self.get(soil_name).ok_or_else(|| StratumError::UnknownSoilType {
            name: soil_name.to_string(),
        })?;
        if material.color.is_empty() {
            return Err(StratumError::MissingMaterialColor {
                name: material.name.clone(),
            });
        }
        Ok(SoilLayer {
            top,
            bottom,
            soil_name: material.name.clone(),
            parameters: SoilParameters {
                is_aquifer: overwrite_aquifer.unwrap_or(material.is_aquifer),
                gamma_dry: material.gamma_dry,
                gamma_wet: material.gamma_wet,
                vertical_permeability: material.k_vert,
                horizontal_permeability: material.k_hor,
                grain_size_d70: material.d70,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MaterialTable {
        MaterialTable::new(vec![
            SoilMaterial {
                name: "Klei".to_string(),
                color: "0,146,0".to_string(),
                is_aquifer: false,
                gamma_dry: Some(17.0),
                gamma_wet: Some(17.0),
                k_hor: Some(0.01),
                k_vert: Some(0.01),
                d70: None,
            },
            SoilMaterial {
                name: "Zand grof".to_string(),
                color: "255,226,2".to_string(),
                is_aquifer: true,
                gamma_dry: Some(18.0),
                gamma_wet: Some(20.0),
                k_hor: Some(10.0),
                k_vert: Some(5.0),
                d70: Some(0.2),
            },
        ])
    }

    #[test]
    fn test_lookup_by_name() {
        let table = table();
        assert!(table.get("Klei").is_some());
        assert!(table.get("Grind").is_none());
    }

    #[test]
    fn test_build_layer_uses_material_defaults() {
        let layer = table().build_layer("Zand grof", -2.0, -8.0, None).unwrap();
        assert!(layer.is_aquifer());
        assert_eq!(layer.parameters.horizontal_permeability, Some(10.0));
    }

    #[test]
    fn test_build_layer_overwrite_aquifer() {
        let layer = table().build_layer("Zand grof", -2.0, -8.0, Some(false)).unwrap();
        assert!(!layer.is_aquifer());
    }

    #[test]
    fn test_unknown_soil_rejected() {
        let result = table().build_layer("Grind", 0.0, -1.0, None);
        assert!(matches!(result, Err(StratumError::UnknownSoilType { .. })));
    }

    #[test]
    fn test_missing_color_rejected() {
        let table = MaterialTable::new(vec![SoilMaterial {
            name: "Veen".to_string(),
            color: String::new(),
            is_aquifer: false,
            gamma_dry: Some(11.0),
            gamma_wet: Some(11.0),
            k_hor: None,
            k_vert: None,
            d70: None,
        }]);
        let result = table.build_layer("Veen", 0.0, -1.0, None);
        assert!(matches!(result, Err(StratumError::MissingMaterialColor { .. })));
    }
}
