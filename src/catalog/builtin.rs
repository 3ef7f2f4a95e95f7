// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-tagsim project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Built-in HPU mud-pump tag catalog.
//!
//! 103 tags across seven groups, modeling the instrumentation of a hydraulic
//! power unit: VFD controls, PE lube skid, drive outputs, analog inputs,
//! choke valves, the charge pump and the alarm block. Sequence indices are
//! frozen; reassigning one breaks numeric-mode addressing for deployed
//! clients.

use super::{TagCatalog, TagDefinition, ValueType};

/// Group (folder) names of the built-in catalog.
pub const VFD_CNTRL_TAGS: &str = "VFD_CNTRL_TAGS";
pub const PE_LUBE_TAGS: &str = "PE_Lube_Tags";
pub const OUTPUTS: &str = "Outputs";
pub const INPUTS: &str = "Inputs";
pub const CHOKE_TAGS: &str = "CHOKE_TAGS";
pub const CHARGE_PUMP_TAGS: &str = "CHARGE_PUMP_TAGS";
pub const ALARM_TAGS: &str = "ALARM_TAGS";

/// (sequence_index, group, name, value_type, min, max)
///
/// Several alarm setpoints have degenerate 0/0 ranges; the generator treats
/// those as single-valued, never as an error.
#[rustfmt::skip]
const TAG_TABLE: &[(u32, &str, &str, ValueType, f64, f64)] = {
    use super::ValueType::*;
    &[
        (0, VFD_CNTRL_TAGS, "D1001VFDStop", Float32, 0.0, 1.0),
        (1, VFD_CNTRL_TAGS, "D1001VFDStopSpeedSetpoint", Float64, 0.0, 50.0),
        (2, PE_LUBE_TAGS, "D2001PELubePumpMtr1Stop", Boolean, 0.0, 1.0),
        (3, OUTPUTS, "D1001DriveRunCommandDO", Float32, 0.0, 1.0),
        (4, OUTPUTS, "D1001DriveSpeedReferenceAO_ENG", Int32, 0.0, 1491.0),
        (5, OUTPUTS, "D1002ChargePumpDriveSpeedReferenceAO_ENG", Float64, 0.0, 1.8),
        (6, OUTPUTS, "D2001PELubePumpDriveSpeedReferenceAO_ENG", Int32, 0.0, 1.0),
        (7, OUTPUTS, "D1002ChargePumpVFDRunCommandDO", Float32, 0.0, 1.0),
        (8, OUTPUTS, "D2001PELubePumpVFDRunCommandDO", Int32, 0.0, 1.0),
        (9, INPUTS, "CV1001PositionFeedbackAI_ENG", Float32, 0.0, 100.0),
        (10, INPUTS, "CV1002PositionFeedbackAI_ENG", Text, 0.0, 100.0),
        (11, INPUTS, "D1001MotorSpeedAI_ENG", Text, 0.0, 1499.541259765625),
        (12, INPUTS, "D1001MotorTorqueAI_ENG", Float64, 0.0, 2614.678955078125),
        (13, INPUTS, "D1002ChargePumpSpeedAI_ENG", Text, 0.0, 1918.417236328125),
        (14, INPUTS, "D1002ChargePumpTorqueAI_ENG", Boolean, 0.0, 0.0),
        (15, INPUTS, "D2001PELubePumpDriveSpeedAI_ENG", Int32, 0.0, 14414.728515625),
        (16, INPUTS, "FT1001MainLoopFlowrateAI_ENG", Float64, 0.0, 1546.874755859375),
        (17, INPUTS, "FT2001PELubeSupplyFlowAI_ENG", Boolean, 0.0, 87.02466583251953),
        (18, INPUTS, "FT2001PELubeSupplyFlowSetpoint_ENG", Text, 0.0, 0.0),
        (19, INPUTS, "LT1001MainWaterTankLevelAI_ENG", Boolean, 0.0, 93.24625396728516),
        (20, INPUTS, "PT1001MaingPumpChargePressAI_ENG", Text, 0.0, 114.5335159301758),
        (21, INPUTS, "PT1002MainPumpDischargePressAI_ENG", Float64, 0.0, 3.920371398925781),
        (22, INPUTS, "PT1003MainPumpDischargePressAI_ENG", Int32, 0.0, 1.79097607421875),
        (23, INPUTS, "PT1004ChokeCV1002PressAI_ENG", Int32, 0.0, 0.0),
        (24, INPUTS, "PT2001PELubeSupplyPressAI_ENG", Text, 0.0, 246.5438385009766),
        (25, INPUTS, "PT2001PELubeSupplyPressSetpoint_ENG", Int32, 0.0, 0.0),
        (26, INPUTS, "PT2002PELubeSupplyPressAI_ENG", Boolean, 0.0, 105.1539306640625),
        (27, INPUTS, "PT2002PELubeSupplyPressSetpoint_ENG", Text, 0.0, 0.0),
        (28, INPUTS, "TC1001PumpTempSensorAI_ENG", Int32, -16.59999847412109, 210.1999969482422),
        (29, INPUTS, "TC1002PumpTempSensorAI_ENG", Float32, 0.0, 104.0),
        (30, INPUTS, "TC1003PumpTempSensorAI_ENG", Boolean, 0.0, 127.3999938964844),
        (31, INPUTS, "TC1004PumpTempSensorAI_ENG", Float32, 0.0, 107.5999984741211),
        (32, INPUTS, "TC1005PumpTempSensorAI_ENG", Int32, 0.0, 109.4000015258789),
        (33, INPUTS, "TC1006PumpTempSensorAI_ENG", Int32, 0.0, 102.1999969482422),
        (34, INPUTS, "TC1007PumpTempSensorAI_ENG", Boolean, 0.0, 111.1999969482422),
        (35, INPUTS, "TC1008PumpTempSensorAI_ENG", Boolean, 0.0, 105.7999954223633),
        (36, INPUTS, "TC1009PumpTempSensorAI_ENG", Float64, 0.0, 105.7999954223633),
        (37, INPUTS, "TC1010PumpTempSensorAI_ENG", Int32, 0.0, 5928.7998046875),
        (38, INPUTS, "TC1011PumpTempSensorAI_ENG", Text, 0.0, 215.5999908447266),
        (39, INPUTS, "TC1012PumpTempSensorAI_ENG", Float64, 0.0, 111.1999969482422),
        (40, INPUTS, "TT1001MainWaterTemperatureAI_ENG", Boolean, 0.0, 86.41093444824219),
        (41, INPUTS, "TT2001PELubeTankTempAI_ENG", Text, 0.0, 121.0767364501953),
        (42, INPUTS, "TT2002PELubeSupplyTempAI_ENG", Text, 0.0, 121.2526016235352),
        (43, CHOKE_TAGS, "CV1002ChokeValvePositionSetpoint", Int32, 0.0, 1.0),
        (44, CHOKE_TAGS, "CV1002ChokeValveStop", Int32, 0.0, 1.0),
        (45, CHOKE_TAGS, "CV1001ChokeValveStop", Float32, 0.0, 1.0),
        (46, CHOKE_TAGS, "CV1001ChokeValvePositionSetpoint", Float64, 0.0, 1.0),
        (47, CHARGE_PUMP_TAGS, "D1002ChargePumpMotorStop", Int32, 0.0, 1.0),
        (48, ALARM_TAGS, "FT2001LL_AlarmSetpoint", Text, 0.0, 65.0),
        (49, ALARM_TAGS, "LS1001H_AlarmSetpoint", Boolean, 0.0, 0.0),
        (50, ALARM_TAGS, "LS1002H_AlarmSetpoint", Boolean, 0.0, 0.0),
        (51, ALARM_TAGS, "LS1003H_AlarmSetpoint", Float32, 0.0, 0.0),
        (52, ALARM_TAGS, "LS1004HH_AlarmSetpoint", Int32, 0.0, 0.0),
        (53, ALARM_TAGS, "LS2001L_AlarmSetpoint", Text, 0.0, 0.0),
        (54, ALARM_TAGS, "LT1001L_AlarmSetpoint", Boolean, 0.0, 100.0),
        (55, ALARM_TAGS, "LT1001LL_AlarmSetpoint", Int32, 0.0, 60.0),
        (56, ALARM_TAGS, "PT1001L_AlarmSetpoint", Float32, 0.0, 80.0),
        (57, ALARM_TAGS, "PT1001LL_AlarmSetpoint", Float64, 0.0, 50.0),
        (58, ALARM_TAGS, "PT1002HH_AlarmSetpoint", Float32, 0.0, 5000.0),
        (59, ALARM_TAGS, "PT1003HH_AlarmSetpoint", Text, 0.0, 5000.0),
        (60, ALARM_TAGS, "PT2001HH_AlarmSetpoint", Int32, 0.0, 250.0),
        (61, ALARM_TAGS, "PT2002L_AlarmSetpoint", Boolean, 0.0, 50.0),
        (62, ALARM_TAGS, "PT2002LL_AlarmSetpoint", Int32, 0.0, 55.0),
        (63, ALARM_TAGS, "TT1001H_AlarmSetpoint", Int32, 0.0, 105.0),
        (64, ALARM_TAGS, "TT1001HH_AlarmSetpoint", Int32, 0.0, 110.0),
        (65, ALARM_TAGS, "TT2001H_AlarmSetpoint", Text, 0.0, 145.0),
        (66, ALARM_TAGS, "TT2001HH_AlarmSetpoint", Int32, 0.0, 165.0),
        (67, ALARM_TAGS, "FT2001LL_Alarm", Int32, 0.0, 1.0),
        (68, ALARM_TAGS, "LS1001H_Alarm", Boolean, 0.0, 1.0),
        (69, ALARM_TAGS, "LS1002H_Alarm", Boolean, 0.0, 0.0),
        (70, ALARM_TAGS, "LS1003H_Alarm", Boolean, 0.0, 0.0),
        (71, ALARM_TAGS, "LS1004HH_Alarm", Boolean, 0.0, 0.0),
        (72, ALARM_TAGS, "LS2001L_Alarm", Text, 0.0, 1.0),
        (73, ALARM_TAGS, "LT1001L_Alarm", Float32, 0.0, 1.0),
        (74, ALARM_TAGS, "LT1001LL_Alarm", Boolean, 0.0, 1.0),
        (75, ALARM_TAGS, "PT1001L_Alarm", Float64, 0.0, 1.0),
        (76, ALARM_TAGS, "PT1001LL_Alarm", Int32, 0.0, 1.0),
        (77, ALARM_TAGS, "PT1002HH_Alarm", Text, 0.0, 1.0),
        (78, ALARM_TAGS, "PT1003HH_Alarm", Text, 0.0, 0.0),
        (79, ALARM_TAGS, "PT2001HH_Alarm", Boolean, 0.0, 1.0),
        (80, ALARM_TAGS, "PT2002L_Alarm", Boolean, 0.0, 0.0),
        (81, ALARM_TAGS, "PT2002LL_Alarm", Boolean, 0.0, 1.0),
        (82, ALARM_TAGS, "TT1001H_Alarm", Text, 0.0, 1.0),
        (83, ALARM_TAGS, "TT1001HH_Alarm", Text, 0.0, 1.0),
        (84, ALARM_TAGS, "TT2001H_Alarm", Boolean, 0.0, 0.0),
        (85, ALARM_TAGS, "TT2001HH_Alarm", Text, 0.0, 1.0),
        (86, OUTPUTS, "D2002PELubePumpVFDRunCommandDO", Text, 0.0, 1.0),
        (87, INPUTS, "D2002PELubePumpDriveSpeedAI_ENG", Boolean, 0.0, 1235.37060546875),
        (88, INPUTS, "PT2006PELubeSupplyPressSetpointAI_ENG", Int32, 0.0, 0.0),
        (89, INPUTS, "PT2006PELubeSupplyPressAI_ENG", Text, 0.0, 209.7582855224609),
        (90, INPUTS, "PT2005PELubeSupplyPressAI_ENG", Int32, 0.0, 84.48954010009766),
        (91, INPUTS, "PT2005PELubeSupplyPressSetpointAI_ENG", Float32, 0.0, 0.0),
        (92, INPUTS, "PT2004PELubeSupplyPressAI_ENG", Boolean, 0.0, 293.5883178710938),
        (93, INPUTS, "PT2003PELubeSupplyPressAI_ENG", Boolean, 0.0, 300.1100463867188),
        (94, INPUTS, "FT2002PELubeSupplyFlowAI_ENG", Text, 0.0, 26.51929473876953),
        (95, PE_LUBE_TAGS, "D2003PELubeCoolerManualSpeedValue", Int32, 0.0, 1.0),
        (96, PE_LUBE_TAGS, "D2002PELubePumpMtr2ManualSpeedValue", Int32, 0.0, 8.0),
        (97, INPUTS, "D1001MotorEff", Float32, 0.0, 100.0),
        (98, INPUTS, "D2001PELubePumpDriveEff", Text, 0.0, 111867.6015625),
        (99, INPUTS, "D2002PELubePumpDriveEff", Boolean, 0.0, 3931.418212890625),
        (100, INPUTS, "FT2001PELubeDriveCalculatedFlowrate_ENG", Text, 0.0, 6.774921875),
        (101, INPUTS, "FT1001MainLoopCalculatedFlowrateAI_ENG", Text, 0.0, 4.9226568603515),
        (102, INPUTS, "FT2002PELubeDriveCalculatedFlowrate_ENG", Boolean, 0.0, 3.187256240844),    ]
};

/// Build the canonical catalog.
///
/// Numeric tags get a deterministic base value at the middle of their range
/// (rounded to 2 decimals) so random-walk mode starts from the same anchor on
/// every run; Boolean and Text tags carry no base.
pub fn builtin_catalog() -> TagCatalog {
    let tags = TAG_TABLE
        .iter()
        .map(|&(sequence_index, group, name, value_type, min, max)| {
            let base_value = match value_type {
                ValueType::Boolean | ValueType::Text => None,
                _ => Some(((min + max) / 2.0 * 100.0).round() / 100.0),
            };
            TagDefinition {
                name: name.to_string(),
                group: group.to_string(),
                value_type,
                min,
                max,
                base_value,
                sequence_index,
            }
        })
        .collect();

    TagCatalog::new(tags).expect("built-in catalog must be collision-free")
}
