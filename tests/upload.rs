use std::io::{Cursor, Write};
use throughput_board::metrics::Status;
use throughput_board::upload::{process, UploadError};
use throughput_board::{Dashboard, DashboardConfig, ExtractionResult, ModuleKey, MonitorMode};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="WK6" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="13" uniqueCount="13">
<si><t>TOSA Level</t></si>
<si><t>Mon</t></si><si><t>Tue</t></si><si><t>Wed</t></si><si><t>Thu</t></si>
<si><t>Fri</t></si><si><t>Sat</t></si><si><t>Sun</t></si>
<si><t>Daily Actual Input</t></si>
<si><t>Actual Output</t></si>
<si><t>1,000</t></si>
<si><t>FG Level</t></si>
<si><t>WIP</t></si>
</sst>"#;

/// TOSA section with day labels from column C, then an FG section reusing the anchor.
const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c></row>
<row r="2"><c r="C2" t="s"><v>1</v></c><c r="D2" t="s"><v>2</v></c><c r="E2" t="s"><v>3</v></c><c r="F2" t="s"><v>4</v></c><c r="G2" t="s"><v>5</v></c><c r="H2" t="s"><v>6</v></c><c r="I2" t="s"><v>7</v></c></row>
<row r="3"><c r="A3" t="s"><v>8</v></c><c r="C3"><v>710</v></c><c r="D3"><v>998</v></c><c r="E3" t="s"><v>10</v></c><c r="F3"><v>1047</v></c><c r="G3"><v>0</v></c><c r="H3"><v>0</v></c><c r="I3"><v>0</v></c></row>
<row r="4"><c r="A4" t="s"><v>9</v></c><c r="C4"><v>914</v></c><c r="D4" t="inlineStr"><is><t>1,363</t></is></c><c r="E4"><v>990</v></c><c r="F4"><v>817</v></c><c r="G4" t="inlineStr"><is><t>-</t></is></c></row>
<row r="6"><c r="A6" t="s"><v>11</v></c></row>
<row r="7"><c r="A7" t="s"><v>9</v></c><c r="C7"><v>450</v></c><c r="D7"><v>430</v></c></row>
<row r="8"><c r="A8" t="s"><v>12</v></c><c r="C8"><v>19029</v></c></row>
</sheetData>
</worksheet>"#;

fn build_workbook() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", "<Types/>"),
        ("xl/_rels/workbook.xml.rels", RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/sharedStrings.xml", SHARED_STRINGS),
        ("xl/worksheets/sheet1.xml", SHEET),
    ] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn board_workbook_yields_module_series() {
    let result = process("board.xlsx", &build_workbook()).unwrap();
    let board = result.board().unwrap();
    assert_eq!(board.keys().collect::<Vec<_>>(), vec![ModuleKey::TosaLevel, ModuleKey::FgLevel]);

    let tosa = board.get(ModuleKey::TosaLevel).unwrap();
    assert_eq!(tosa.days, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
    assert_eq!(tosa.input, vec![710.0, 998.0, 1000.0, 1047.0, 0.0, 0.0, 0.0]);
    assert_eq!(tosa.output, vec![914.0, 1363.0, 990.0, 817.0, 0.0, 0.0, 0.0]);

    let fg = board.get(ModuleKey::FgLevel).unwrap();
    assert!(fg.days.is_empty());
    assert!(fg.input.is_empty());
    assert_eq!(fg.output[..3], [450.0, 430.0, 0.0]);
    assert_eq!(fg.wip[0], 19029.0);
}

#[test]
fn dashboard_reports_uploaded_board() {
    let mut dashboard = Dashboard::new(DashboardConfig::default());
    dashboard.upload("WK6 board.XLSX", &build_workbook()).unwrap();
    assert_eq!(dashboard.active_module(), ModuleKey::TosaLevel);

    let gaps: Vec<f64> = dashboard.daily_rows().iter().map(|row| row.gap).collect();
    assert_eq!(gaps, vec![-204.0, -365.0, 10.0, 230.0, 0.0, 0.0, 0.0]);

    let tosa = dashboard.module_panel(ModuleKey::TosaLevel);
    assert_eq!(tosa.lines[0].actual, 3755.0);
    assert_eq!(tosa.lines[2].actual, -329.0);
    assert_eq!(tosa.lines[3].actual, 0.0);

    let fg = dashboard.module_panel(ModuleKey::FgLevel);
    assert_eq!(fg.lines[3].actual, 19029.0);
    // under the 20000 standing target
    assert_eq!(fg.lines[3].status, Status::Good);

    let pcba = dashboard.module_summary(ModuleKey::PcbaAssy);
    assert_eq!(pcba.totals.input, 0.0);
}

#[test]
fn weekly_report_scales_targets() {
    let config = DashboardConfig::default().with_mode("weekly").unwrap().with_period("WK7").unwrap();
    let mut dashboard = Dashboard::new(config);
    dashboard.upload("board.xlsx", &build_workbook()).unwrap();
    assert_eq!(dashboard.config().mode, MonitorMode::Weekly);

    let chart = dashboard.chart_rows();
    assert_eq!(chart.len(), 1);
    assert_eq!(chart[0].name, "WK7");
    assert_eq!(chart[0].input, 3755.0);

    let cards = dashboard.kpi_cards();
    assert_eq!(cards[0].target, 765.0 * 7.0);
}

#[test]
fn tall_csv_upload_replaces_board() {
    let mut dashboard = Dashboard::default();
    dashboard.upload("board.xlsx", &build_workbook()).unwrap();
    dashboard
        .upload("rows.csv", b"name,input,output,gap\nLine 1,10,8,2\nLine 2,12,9,3\n")
        .unwrap();

    match dashboard.result() {
        Some(ExtractionResult::Flat { records }) => assert_eq!(records.len(), 2),
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(dashboard.totals().gap, 5.0);
    assert_eq!(dashboard.module_summary(ModuleKey::TosaLevel).totals.input, 0.0);
}

#[test]
fn unreadable_upload_is_reported_once() {
    let mut dashboard = Dashboard::default();
    let error = dashboard.upload("broken.xlsx", b"PK\x03\x04 truncated").unwrap_err();
    let UploadError::Decode { file_name, .. } = &error;
    assert_eq!(file_name, "broken.xlsx");
    assert!(error.to_string().starts_with("Could not read 'broken.xlsx'."));
    assert!(dashboard.result().is_none());
    assert_eq!(dashboard.daily_rows().len(), 7);
}

#[test]
fn result_serialises_as_tagged_json() {
    let result = process("board.xlsx", &build_workbook()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["kind"], "board");
    assert_eq!(json["modules"]["TOSA Level"]["output"][1], 1363.0);
    assert_eq!(json["modules"]["FG Level"]["wip"][0], 19029.0);
}
