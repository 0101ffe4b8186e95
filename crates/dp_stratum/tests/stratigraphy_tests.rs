// crates/dp_stratum/tests/stratigraphy_tests.rs
//!
//! 地层聚合链路测试
//!
//! 覆盖从原始岩性柱到代表性简化层序的完整变换链，重点验证各变换
//! 保持层序不变量（排序、连续、非空）。

use dp_stratum::{
    build_representative_layout, classify, group_layers, AquiferOverride, AquiferParams,
    ClassificationRule, ClassificationTable, MaterialTable, RawLithoLayer, RawLithoLayout,
    SoilMaterial,
};
use std::collections::BTreeMap;

fn materials() -> MaterialTable {
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
            name: "Veen".to_string(),
            color: "157,78,64".to_string(),
            is_aquifer: false,
            gamma_dry: Some(11.0),
            gamma_wet: Some(11.0),
            k_hor: Some(0.05),
            k_vert: Some(0.05),
            d70: None,
        },
        SoilMaterial {
            name: "Zand fijn".to_string(),
            color: "255,255,153".to_string(),
            is_aquifer: true,
            gamma_dry: Some(18.0),
            gamma_wet: Some(20.0),
            k_hor: Some(5.0),
            k_vert: Some(2.5),
            d70: Some(0.15),
        },
        SoilMaterial {
            name: "Zand grof".to_string(),
            color: "255,226,2".to_string(),
            is_aquifer: true,
            gamma_dry: Some(19.0),
            gamma_wet: Some(21.0),
            k_hor: Some(25.0),
            k_vert: Some(12.0),
            d70: Some(0.3),
        },
    ])
}

fn identity_table() -> ClassificationTable {
    let rule = |code: &str, target: &str| ClassificationRule {
        lithology_code: code.to_string(),
        depth_top: None,
        depth_bottom: None,
        target_soil_name: target.to_string(),
    };
    ClassificationTable::new(vec![
        rule("klei", "Klei"),
        rule("veen", "Veen"),
        rule("zand_fijn", "Zand fijn"),
        rule("zand_grof", "Zand grof"),
    ])
}

fn voxel(code: &str, top: f64, bottom: f64, aquifer: bool) -> RawLithoLayer {
    RawLithoLayer {
        top,
        bottom,
        lithology_code: code.to_string(),
        horizontal_permeability: Some(1.0),
        vertical_permeability: Some(0.5),
        unit_weight: Some(18.0),
        is_aquifer: aquifer,
        probabilities: BTreeMap::new(),
    }
}

/// 半米间隔的体素柱，两个含水层
fn voxel_column() -> RawLithoLayout {
    let mut voxels = Vec::new();
    let mut z = 0.0;
    // 覆盖层: 1.5 m 粘土 + 0.5 m 泥炭
    for _ in 0..3 {
        voxels.push(voxel("klei", z, z - 0.5, false));
        z -= 0.5;
    }
    voxels.push(voxel("veen", z, z - 0.5, false));
    z -= 0.5;
    // 第一含水层: 4 m 细砂
    for _ in 0..8 {
        voxels.push(voxel("zand_fijn", z, z - 0.5, true));
        z -= 0.5;
    }
    // 中间层: 1 m 粘土
    for _ in 0..2 {
        voxels.push(voxel("klei", z, z - 0.5, false));
        z -= 0.5;
    }
    // 第二含水层: 5 m 粗砂
    for _ in 0..10 {
        voxels.push(voxel("zand_grof", z, z - 0.5, true));
        z -= 0.5;
    }
    RawLithoLayout::new(voxels).unwrap()
}

#[test]
fn test_pipeline_classify_then_group() {
    let classified = classify(&voxel_column(), &identity_table(), &materials(), 1.0).unwrap();

    // 24 个体素合并为 5 个分类层
    assert_eq!(classified.len(), 5);
    assert!((classified.top() - 0.0).abs() < 1e-9);
    assert!((classified.bottom() - -12.0).abs() < 1e-9);

    // 层序不变量经过分类仍成立
    for pair in classified.layers().windows(2) {
        assert!((pair[0].bottom - pair[1].top).abs() < 1e-9);
    }

    let zones = group_layers(&classified);
    assert_eq!(zones.cover_layer.len(), 2);
    assert_eq!(zones.first_aquifer.len(), 1);
    assert_eq!(zones.intermediate.len(), 1);
    assert_eq!(zones.second_aquifer.len(), 1);

    // 区带拼接重构全部深度范围
    let total: f64 = zones
        .cover_layer
        .iter()
        .chain(&zones.first_aquifer)
        .chain(&zones.intermediate)
        .chain(&zones.second_aquifer)
        .map(|layer| layer.thickness())
        .sum();
    assert!((total - classified.total_thickness()).abs() < 1e-9);
}

#[test]
fn test_pipeline_representative_layout() {
    let classified = classify(&voxel_column(), &identity_table(), &materials(), 1.0).unwrap();
    let representative = build_representative_layout(
        &classified,
        &AquiferParams {
            first_aquifer: AquiferOverride {
                permeability: 6.0,
                d70: 0.16,
            },
            second_aquifer: Some(AquiferOverride {
                permeability: 30.0,
                d70: 0.28,
            }),
        },
    )
    .unwrap();

    assert_eq!(representative.len(), 4);
    assert!((representative.top() - 0.0).abs() < 1e-9);
    assert!((representative.bottom() - -12.0).abs() < 1e-9);

    // 覆盖层容重: 1.5 m 粘土 (17) 与 0.5 m 泥炭 (11) 的厚度加权
    let cover = &representative.layers()[0];
    let expected_gamma = (17.0 * 1.5 + 11.0 * 0.5) / 2.0;
    assert!((cover.parameters.gamma_dry.unwrap() - expected_gamma).abs() < 1e-9);

    // 含水层属性取用户标定值
    let first = &representative.layers()[1];
    assert_eq!(first.parameters.horizontal_permeability, Some(6.0));
    assert_eq!(first.parameters.grain_size_d70, Some(0.16));
}

#[test]
fn test_pipeline_thin_aquifer_demotion_changes_grouping() {
    // 含水层阈值高于细砂层厚度时，第一含水层由粗砂承担
    let classified = classify(&voxel_column(), &identity_table(), &materials(), 4.5).unwrap();
    let zones = group_layers(&classified);

    // 4 m 的细砂被降级，覆盖层一直延伸到粗砂顶面
    assert_eq!(zones.cover_layer.len(), 4);
    assert_eq!(zones.first_aquifer.len(), 1);
    assert_eq!(zones.first_aquifer[0].soil_name, "Zand grof");
    assert!(zones.second_aquifer.is_empty());
}
