//! Table rendering for analysis results.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use svy_common::format_numeric;
use svy_ingest::DatasetOverview;
use svy_model::{BatteryGroup, CodedVariable, SurveyInfo, VariableRegistry};
use svy_stats::{
    AssociationTest, CategoryShare, CiTable, CrosstabCell, EffectBand, SignificanceBand,
    format_p_value,
};

use crate::types::ScanRow;

pub fn print_variables(registry: &VariableRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Role"),
        header_cell("Label"),
        header_cell("Categories"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for variable in registry.variables() {
        table.add_row(vec![
            Cell::new(&variable.name).fg(Color::Blue),
            Cell::new(variable.role.as_str()),
            Cell::new(&variable.label),
            Cell::new(variable.category_count()),
        ]);
    }
    println!("{table}");

    let mut batteries = Table::new();
    batteries.set_header(vec![
        header_cell("Battery"),
        header_cell("Title"),
        header_cell("Items"),
        header_cell("Scale"),
    ]);
    apply_table_style(&mut batteries);
    align_column(&mut batteries, 2, CellAlignment::Right);
    align_column(&mut batteries, 3, CellAlignment::Right);
    for battery in registry.batteries() {
        batteries.add_row(vec![
            Cell::new(&battery.key).fg(Color::Blue),
            Cell::new(&battery.title),
            Cell::new(battery.items().len()),
            Cell::new(battery.scale().count()),
        ]);
    }
    println!();
    println!("Batteries:");
    println!("{batteries}");
}

pub fn print_overview(info: &SurveyInfo, overview: &DatasetOverview) {
    println!("Survey: {}", info.title);
    println!("Field dates: {}", info.field_dates);
    println!("Mode: {}", info.mode);
    println!("Languages: {}", info.languages);
    println!("Respondents: {}", overview.respondents);
    println!("Weighted N: {}", format_numeric(overview.weighted_n.round()));
    println!("Weight column: {}", overview.weight_column);
}

pub fn distribution_table(shares: &[CategoryShare]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Response"),
        header_cell("Weighted %"),
        header_cell("Weighted N"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for share in shares {
        table.add_row(vec![
            Cell::new(share.code),
            Cell::new(&share.label),
            Cell::new(format!("{:.1}", share.percent)),
            Cell::new(format!("{:.1}", share.weighted_count)),
        ]);
    }
    table
}

/// Item × response matrix for a battery block.
pub fn battery_table(battery: &BatteryGroup, rows: &[(String, Vec<CategoryShare>)]) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Item")];
    for (_, label) in battery.scale().filter(|(code, _)| *code != battery.refused_code) {
        header.push(header_cell(label));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for (item_label, shares) in rows {
        let mut cells = vec![Cell::new(item_label)];
        for share in shares {
            cells.push(Cell::new(format!("{:.1}", share.percent)));
        }
        table.add_row(cells);
    }
    table
}

/// Pivot the flat cross-tab relation into question rows × demographic columns.
pub fn crosstab_table(cells: &[CrosstabCell]) -> Table {
    let mut demo_labels: Vec<&str> = Vec::new();
    let mut q_labels: Vec<&str> = Vec::new();
    for cell in cells {
        if !demo_labels.contains(&cell.demo_label.as_str()) {
            demo_labels.push(&cell.demo_label);
        }
        if !q_labels.contains(&cell.q_label.as_str()) {
            q_labels.push(&cell.q_label);
        }
    }

    let mut table = Table::new();
    let mut header = vec![header_cell("Response")];
    for demo in &demo_labels {
        header.push(header_cell(demo));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for q in &q_labels {
        let mut row = vec![Cell::new(q)];
        for demo in &demo_labels {
            let percent = cells
                .iter()
                .find(|c| c.q_label == *q && c.demo_label == *demo)
                .map(|c| c.percent)
                .unwrap_or(0.0);
            row.push(Cell::new(format!("{percent:.1}")));
        }
        table.add_row(row);
    }
    table
}

pub fn print_association(
    result: &AssociationTest,
    question: &CodedVariable,
    demographic: &CodedVariable,
    show_expected: bool,
) {
    println!("Question:           {}", question.label);
    println!("Demographic:        {}", demographic.label);
    println!("Chi-square:         {:.2}", result.chi2);
    println!("Degrees of freedom: {}", result.dof);
    println!("p-value:            {}", format_p_value(result.p_value));
    println!(
        "Cramér's V:         {:.3} ({})",
        result.cramers_v, result.effect
    );
    println!("Significance:       {}", result.significance);
    println!("Note: computed on unweighted counts; illustrative, not a design-based test.");

    println!();
    println!("Observed counts:");
    let observed = contingency_table(result, question, demographic, false);
    println!("{observed}");
    if show_expected {
        println!("Expected frequencies:");
        let expected = contingency_table(result, question, demographic, true);
        println!("{expected}");
    }
}

fn contingency_table(
    result: &AssociationTest,
    question: &CodedVariable,
    demographic: &CodedVariable,
    expected: bool,
) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell(&question.label)];
    for code in result.observed.col_codes() {
        header.push(header_cell(&code_label(demographic, *code)));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for (r, code) in result.observed.row_codes().iter().enumerate() {
        let mut row = vec![Cell::new(code_label(question, *code))];
        for c in 0..result.observed.cols() {
            if expected {
                row.push(Cell::new(format!("{:.1}", result.expected[r][c])));
            } else {
                row.push(Cell::new(result.observed.observed()[r][c]));
            }
        }
        table.add_row(row);
    }
    table
}

fn code_label(variable: &CodedVariable, code: i64) -> String {
    variable
        .label_for(code)
        .map_or_else(|| code.to_string(), ToString::to_string)
}

pub fn ci_table(result: &CiTable) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Response"),
        header_cell("Weighted %"),
        header_cell("SE"),
        header_cell("95% CI Lower"),
        header_cell("95% CI Upper"),
    ]);
    apply_table_style(&mut table);
    for index in 1..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in &result.rows {
        table.add_row(vec![
            Cell::new(&row.label),
            Cell::new(format!("{:.2}", row.percent)),
            Cell::new(format!("{:.2}", row.se)),
            Cell::new(format!("{:.2}", row.ci_lower)),
            Cell::new(format!("{:.2}", row.ci_upper)),
        ]);
    }
    table
}

pub fn scan_table(rows: &[ScanRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Question"),
        header_cell("Demographic"),
        header_cell("Chi-sq"),
        header_cell("df"),
        header_cell("p-value"),
        header_cell("Cramér's V"),
        header_cell("Effect"),
        header_cell("Sig."),
    ]);
    apply_scan_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 7, CellAlignment::Center);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.question),
            Cell::new(&row.demographic),
            Cell::new(format!("{:.2}", row.chi2)),
            Cell::new(row.dof),
            Cell::new(&row.p_display),
            Cell::new(format!("{:.3}", row.cramers_v)),
            effect_cell(row.effect),
            significance_cell(row.significance),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_scan_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn effect_cell(effect: EffectBand) -> Cell {
    match effect {
        EffectBand::Large => Cell::new("Large").fg(Color::Red).add_attribute(Attribute::Bold),
        EffectBand::Medium => Cell::new("Medium").fg(Color::Yellow),
        EffectBand::Small => Cell::new("Small").fg(Color::Green),
        EffectBand::Negligible => Cell::new("Negligible").fg(Color::DarkGrey),
    }
}

fn significance_cell(significance: SignificanceBand) -> Cell {
    match significance {
        SignificanceBand::ThreeStars => Cell::new("★★★")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        SignificanceBand::TwoStars => Cell::new("★★")
            .fg(Color::Yellow)
            .add_attribute(Attribute::Bold),
        SignificanceBand::OneStar => Cell::new("★").fg(Color::Green),
        SignificanceBand::NotSignificant => Cell::new("n.s.").fg(Color::DarkGrey),
    }
}
