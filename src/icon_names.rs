use std::borrow::Cow;

/// Stock icon names from the Marlin DWIN display driver (`dwin.h`), by slot index.
/// Slot 39 is blank in stock files and has no name.
const ICON_NAMES: [Option<&str>; 92] = [
    Some("ICON_LOGO"),
    Some("ICON_Print_0"),
    Some("ICON_Print_1"),
    Some("ICON_Prepare_0"),
    Some("ICON_Prepare_1"),
    Some("ICON_Control_0"),
    Some("ICON_Control_1"),
    Some("ICON_Leveling_0"),
    Some("ICON_Leveling_1"),
    Some("ICON_HotendTemp"),
    Some("ICON_BedTemp"),
    Some("ICON_Speed"),
    Some("ICON_Zoffset"),
    Some("ICON_Back"),
    Some("ICON_File"),
    Some("ICON_PrintTime"),
    Some("ICON_RemainTime"),
    Some("ICON_Setup_0"),
    Some("ICON_Setup_1"),
    Some("ICON_Pause_0"),
    Some("ICON_Pause_1"),
    Some("ICON_Continue_0"),
    Some("ICON_Continue_1"),
    Some("ICON_Stop_0"),
    Some("ICON_Stop_1"),
    Some("ICON_Bar"),
    Some("ICON_More"),
    Some("ICON_Axis"),
    Some("ICON_CloseMotor"),
    Some("ICON_Homing"),
    Some("ICON_SetHome"),
    Some("ICON_PLAPreheat"),
    Some("ICON_ABSPreheat"),
    Some("ICON_Cool"),
    Some("ICON_Language"),
    Some("ICON_MoveX"),
    Some("ICON_MoveY"),
    Some("ICON_MoveZ"),
    Some("ICON_Extruder"),
    None,
    Some("ICON_Temperature"),
    Some("ICON_Motion"),
    Some("ICON_WriteEEPROM"),
    Some("ICON_ReadEEPROM"),
    Some("ICON_ResumeEEPROM"),
    Some("ICON_Info"),
    Some("ICON_SetEndTemp"),
    Some("ICON_SetBedTemp"),
    Some("ICON_FanSpeed"),
    Some("ICON_SetPLAPreheat"),
    Some("ICON_SetABSPreheat"),
    Some("ICON_MaxSpeed"),
    Some("ICON_MaxAccelerated"),
    Some("ICON_MaxJerk"),
    Some("ICON_Step"),
    Some("ICON_PrintSize"),
    Some("ICON_Version"),
    Some("ICON_Contact"),
    Some("ICON_StockConfiguraton"),
    Some("ICON_MaxSpeedX"),
    Some("ICON_MaxSpeedY"),
    Some("ICON_MaxSpeedZ"),
    Some("ICON_MaxSpeedE"),
    Some("ICON_MaxAccX"),
    Some("ICON_MaxAccY"),
    Some("ICON_MaxAccZ"),
    Some("ICON_MaxAccE"),
    Some("ICON_MaxSpeedJerkX"),
    Some("ICON_MaxSpeedJerkY"),
    Some("ICON_MaxSpeedJerkZ"),
    Some("ICON_MaxSpeedJerkE"),
    Some("ICON_StepX"),
    Some("ICON_StepY"),
    Some("ICON_StepZ"),
    Some("ICON_StepE"),
    Some("ICON_Setspeed"),
    Some("ICON_SetZOffset"),
    Some("ICON_Rectangle"),
    Some("ICON_BLTouch"),
    Some("ICON_TempTooLow"),
    Some("ICON_AutoLeveling"),
    Some("ICON_TempTooHigh"),
    Some("ICON_NoTips_C"),
    Some("ICON_NoTips_E"),
    Some("ICON_Continue_C"),
    Some("ICON_Continue_E"),
    Some("ICON_Cancel_C"),
    Some("ICON_Cancel_E"),
    Some("ICON_Confirm_C"),
    Some("ICON_Confirm_E"),
    Some("ICON_Info_0"),
    Some("ICON_Info_1"),
];

pub fn icon_name(index: usize) -> Option<&'static str> {
    ICON_NAMES.get(index).copied().flatten()
}

/// Name used in extracted file names. Unnamed slots fall back to the bare number.
pub fn display_name(index: usize) -> Cow<'static, str> {
    match icon_name(index) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(index.to_string()),
    }
}

/// File name for an extracted entry, e.g. `9_ICON_HotendTemp.jpg`.
pub fn entry_file_name(index: usize, use_names: bool, extension: &str) -> String {
    if use_names {
        format!("{}_{}.{}", index, display_name(index), extension)
    } else {
        format!("{}.{}", index, extension)
    }
}

/// Slot index from a file name with a leading `<index>_` (or a bare `<index>.ext`).
pub fn parse_index(file_name: &str) -> Option<usize> {
    let end = file_name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(file_name.len());
    if end == 0 {
        return None;
    }

    match file_name[end..].chars().next() {
        None | Some('_') | Some('.') => file_name[..end].parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names() {
        assert_eq!(icon_name(0), Some("ICON_LOGO"));
        assert_eq!(icon_name(9), Some("ICON_HotendTemp"));
        assert_eq!(icon_name(38), Some("ICON_Extruder"));
        assert_eq!(icon_name(40), Some("ICON_Temperature"));
        assert_eq!(icon_name(91), Some("ICON_Info_1"));
    }

    #[test]
    fn unnamed_slots_use_number() {
        assert_eq!(icon_name(39), None);
        assert_eq!(entry_file_name(39, true, "jpg"), "39_39.jpg");
        assert_eq!(entry_file_name(200, true, "jpg"), "200_200.jpg");
        assert_eq!(entry_file_name(9, true, "jpg"), "9_ICON_HotendTemp.jpg");
        assert_eq!(entry_file_name(9, false, "jpeg"), "9.jpeg");
    }

    #[test]
    fn index_prefix() {
        assert_eq!(parse_index("9_ICON_HotendTemp.jpg"), Some(9));
        assert_eq!(parse_index("39_39.jpg"), Some(39));
        assert_eq!(parse_index("12.jpg"), Some(12));
        assert_eq!(parse_index("255_"), Some(255));
        assert_eq!(parse_index("logo.jpg"), None);
        assert_eq!(parse_index("_1.jpg"), None);
        assert_eq!(parse_index("12a_x.jpg"), None);
        assert_eq!(parse_index("manifest.json"), None);
    }

    #[test]
    fn names_round_trip_through_parse() {
        for index in 0..256 {
            assert_eq!(parse_index(&entry_file_name(index, true, "jpg")), Some(index));
        }
    }
}
