//! Request translation: caller parameters to Sheets and Drive request bodies.
//!
//! Everything here is pure. Indices are 0-based with exclusive ends, negative
//! ids and indices mean "not given", and every structural tool produces
//! exactly one [`Request`].

use std::ops::Range;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    error::{Result, SheetsError, ensure_input},
    types::{
        AddChartRequest, AddSheetRequest, BasicChartDomain, BasicChartSeries, BasicChartSpec,
        CellData, CellFormat, CellValue, ChartData, ChartSpec, ChartType, Color,
        DeleteDimensionRequest, DeleteEmbeddedObjectRequest, DeleteSheetRequest, Dimension,
        DimensionProperties, DimensionRange, DuplicateSheetRequest, EmbeddedChart,
        EmbeddedObjectPosition, FindReplaceRequest, GridCoordinate, GridProperties, GridRange,
        HorizontalAlignment, InsertDimensionRequest, MergeCellsRequest, MergeType,
        OverlayPosition, PermissionRequest, PermissionRole, PermissionType, PieChartSpec,
        RepeatCellRequest, Request, SheetProperties, SortOrder, SortRangeRequest, SortSpec,
        TextFormat, UpdateDimensionPropertiesRequest, UpdateSheetPropertiesRequest,
    },
};

pub const CHART_WIDTH_PIXELS: u32 = 600;
pub const CHART_HEIGHT_PIXELS: u32 = 400;

// ============================================================================
// Loosely-typed parameters
// ============================================================================

/// A list given either as a JSON array or as one comma-separated string.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ListParam {
    Items(Vec<String>),
    Joined(String),
}

impl ListParam {
    /// Trimmed, non-empty items in caller order.
    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Items(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            Self::Joined(joined) => split_list(&joined),
        }
    }
}

/// Column offsets given either as integers or as `"1,2,3"`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ColumnsParam {
    Items(Vec<u32>),
    Joined(String),
}

impl ColumnsParam {
    /// # Errors
    ///
    /// Returns a validation error when a joined item is not a non-negative
    /// integer.
    pub fn into_offsets(self) -> Result<Vec<u32>> {
        match self {
            Self::Items(items) => Ok(items),
            Self::Joined(joined) => split_list(&joined)
                .iter()
                .map(|item| {
                    item.parse::<u32>().map_err(|_| {
                        SheetsError::validation(format!(
                            "series column '{item}' is not a non-negative integer"
                        ))
                    })
                })
                .collect(),
        }
    }
}

/// A cell matrix given either directly or as a JSON-encoded string.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MatrixParam {
    Rows(Vec<Vec<CellValue>>),
    Encoded(String),
}

impl MatrixParam {
    /// # Errors
    ///
    /// Returns a validation error when an encoded matrix is not a JSON array
    /// of arrays of scalars.
    pub fn into_rows(self) -> Result<Vec<Vec<CellValue>>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Encoded(encoded) => serde_json::from_str(&encoded).map_err(|err| {
                SheetsError::validation(format!("values must be a JSON 2D array: {err}"))
            }),
        }
    }
}

/// A sheet addressed by numeric id or by title.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SheetSelector {
    /// Stable numeric sheet id (`gid` in the sheet URL).
    Id(i64),
    /// Current sheet title; resolved through a metadata lookup.
    Title(String),
}

/// Splits a comma-separated string into trimmed, non-empty items.
pub fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Maps the "negative means absent" convention onto `Option`.
pub fn non_negative(value: Option<i64>) -> Option<i64> {
    value.filter(|value| *value >= 0)
}

// ============================================================================
// Colors and cell formats
// ============================================================================

/// Converts `#RRGGBB` (or `RRGGBB`) into a color with channels in `[0, 1]`.
///
/// Anything else yields `None`; callers leave the field out rather than
/// failing or substituting a default.
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| -> Option<f64> {
        let value = u8::from_str_radix(digits.get(range)?, 16).ok()?;
        Some(f64::from(value) / 255.0)
    };
    Some(Color {
        red: channel(0..2)?,
        green: channel(2..4)?,
        blue: channel(4..6)?,
    })
}

/// Requested text and cell formatting; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatSpec {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub font_size: Option<u32>,
    pub font_color: Option<String>,
    pub background_color: Option<String>,
    pub horizontal_alignment: Option<HorizontalAlignment>,
}

/// Builds the cell format and its field mask together.
///
/// A path is appended to the mask exactly when its value is set, so the mask
/// never names a field the body leaves empty.
pub fn cell_format(spec: &FormatSpec) -> (CellFormat, Vec<&'static str>) {
    let mut fields = Vec::new();
    let mut text = TextFormat::default();
    let mut format = CellFormat::default();

    if let Some(bold) = spec.bold {
        text.bold = Some(bold);
        fields.push("userEnteredFormat.textFormat.bold");
    }
    if let Some(italic) = spec.italic {
        text.italic = Some(italic);
        fields.push("userEnteredFormat.textFormat.italic");
    }
    if let Some(size) = spec.font_size.filter(|size| *size > 0) {
        text.font_size = Some(size);
        fields.push("userEnteredFormat.textFormat.fontSize");
    }
    if let Some(color) = spec.font_color.as_deref().and_then(hex_to_color) {
        text.foreground_color = Some(color);
        fields.push("userEnteredFormat.textFormat.foregroundColor");
    }
    if let Some(color) = spec.background_color.as_deref().and_then(hex_to_color) {
        format.background_color = Some(color);
        fields.push("userEnteredFormat.backgroundColor");
    }
    if let Some(alignment) = spec.horizontal_alignment {
        format.horizontal_alignment = Some(alignment);
        fields.push("userEnteredFormat.horizontalAlignment");
    }

    if text != TextFormat::default() {
        format.text_format = Some(text);
    }
    (format, fields)
}

/// `repeatCell` for the recognized format fields, or `None` when nothing
/// would change.
pub fn repeat_cell(range: GridRange, spec: &FormatSpec) -> Option<(Request, Vec<&'static str>)> {
    let (format, fields) = cell_format(spec);
    if fields.is_empty() {
        return None;
    }
    let request = Request::RepeatCell(RepeatCellRequest {
        range,
        cell: CellData {
            user_entered_format: format,
        },
        fields: fields.join(","),
    });
    Some((request, fields))
}

// ============================================================================
// Ranges and dimensions
// ============================================================================

/// A validated rectangle not yet bound to a sheet; ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub start_row: u32,
    pub end_row: u32,
    pub start_column: u32,
    pub end_column: u32,
}

impl CellSpan {
    /// # Errors
    ///
    /// Returns a validation error unless `end_row > start_row` and
    /// `end_column > start_column`.
    pub fn new(start_row: u32, end_row: u32, start_column: u32, end_column: u32) -> Result<Self> {
        ensure_input!(
            end_row > start_row,
            "end_row ({end_row}) must be greater than start_row ({start_row})"
        );
        ensure_input!(
            end_column > start_column,
            "end_col ({end_column}) must be greater than start_col ({start_column})"
        );
        Ok(Self {
            start_row,
            end_row,
            start_column,
            end_column,
        })
    }

    pub fn on_sheet(self, sheet_id: i64) -> GridRange {
        GridRange {
            sheet_id,
            start_row_index: Some(self.start_row),
            end_row_index: Some(self.end_row),
            start_column_index: Some(self.start_column),
            end_column_index: Some(self.end_column),
        }
    }
}

/// Index span of `count` rows or columns starting at `start`.
///
/// # Errors
///
/// Returns a validation error when `count` is zero or the span overflows.
pub fn dimension_span(start: u32, count: u32) -> Result<Range<u32>> {
    ensure_input!(count > 0, "count must be greater than zero");
    let end = start
        .checked_add(count)
        .ok_or_else(|| SheetsError::validation("dimension range overflows"))?;
    Ok(start..end)
}

pub fn dimension_range(
    sheet_id: i64,
    dimension: Dimension,
    Range { start, end }: Range<u32>,
) -> DimensionRange {
    DimensionRange {
        sheet_id,
        dimension,
        start_index: start,
        end_index: end,
    }
}

/// New rows or columns inherit formatting from the neighbor before them,
/// except at index 0 where there is none.
pub fn insert_dimension(range: DimensionRange) -> Request {
    Request::InsertDimension(InsertDimensionRequest {
        inherit_from_before: range.start_index > 0,
        range,
    })
}

pub fn delete_dimension(range: DimensionRange) -> Request {
    Request::DeleteDimension(DeleteDimensionRequest { range })
}

/// Pixel width for the columns `[start_column, end_column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWidth {
    pub columns: Range<u32>,
    pub width: u32,
}

impl ColumnWidth {
    /// # Errors
    ///
    /// Returns a validation error for an empty column span or a zero width.
    pub fn new(start_column: u32, end_column: u32, width: u32) -> Result<Self> {
        ensure_input!(width > 0, "width must be greater than zero");
        ensure_input!(
            end_column > start_column,
            "end_col ({end_column}) must be greater than start_col ({start_column})"
        );
        Ok(Self {
            columns: start_column..end_column,
            width,
        })
    }

    pub fn into_request(self, sheet_id: i64) -> Request {
        Request::UpdateDimensionProperties(UpdateDimensionPropertiesRequest {
            range: dimension_range(sheet_id, Dimension::Columns, self.columns),
            properties: DimensionProperties {
                pixel_size: self.width,
            },
            fields: "pixelSize".to_string(),
        })
    }
}

pub fn merge_cells(range: GridRange, merge_type: MergeType) -> Request {
    Request::MergeCells(MergeCellsRequest { range, merge_type })
}

/// Sort key on the absolute column `sort_column`, checked against `span`.
///
/// # Errors
///
/// Returns a validation error when the column lies outside the span.
pub fn sort_spec(span: &CellSpan, sort_column: u32, order: SortOrder) -> Result<SortSpec> {
    ensure_input!(
        (span.start_column..span.end_column).contains(&sort_column),
        "sort_column ({sort_column}) must lie inside the sorted columns"
    );
    Ok(SortSpec {
        dimension_index: sort_column,
        sort_order: order,
    })
}

pub fn sort_range(range: GridRange, spec: SortSpec) -> Request {
    Request::SortRange(SortRangeRequest {
        range,
        sort_specs: vec![spec],
    })
}

/// Find/replace limited to one sheet, or across all sheets when
/// `sheet_id` is absent.
#[derive(Debug, Clone, Default)]
pub struct FindReplace {
    pub find: String,
    pub replacement: String,
    pub sheet_id: Option<i64>,
    pub match_case: bool,
    pub match_entire_cell: bool,
    pub search_by_regex: bool,
    pub include_formulas: bool,
}

/// # Errors
///
/// Returns a validation error when the search text is empty.
pub fn find_replace(params: FindReplace) -> Result<Request> {
    ensure_input!(!params.find.is_empty(), "find must not be empty");
    let (sheet_id, all_sheets) = match params.sheet_id {
        Some(id) => (Some(id), None),
        None => (None, Some(true)),
    };
    Ok(Request::FindReplace(FindReplaceRequest {
        find: params.find,
        replacement: params.replacement,
        match_case: params.match_case,
        match_entire_cell: params.match_entire_cell,
        search_by_regex: params.search_by_regex,
        include_formulas: params.include_formulas,
        sheet_id,
        all_sheets,
    }))
}

// ============================================================================
// Sheets
// ============================================================================

/// # Errors
///
/// Returns a validation error for an empty title or zero grid dimensions.
pub fn add_sheet(
    title: &str,
    index: Option<i64>,
    row_count: Option<u32>,
    column_count: Option<u32>,
) -> Result<Request> {
    let title = sheet_title(title, "title")?;
    ensure_input!(
        row_count != Some(0) && column_count != Some(0),
        "row_count and column_count must be greater than zero"
    );
    let grid_properties = (row_count.is_some() || column_count.is_some()).then(|| GridProperties {
        row_count: row_count.map(i64::from),
        column_count: column_count.map(i64::from),
    });
    Ok(Request::AddSheet(AddSheetRequest {
        properties: SheetProperties {
            sheet_id: None,
            title: Some(title.to_string()),
            index: non_negative(index),
            grid_properties,
        },
    }))
}

pub fn delete_sheet(sheet_id: i64) -> Request {
    Request::DeleteSheet(DeleteSheetRequest { sheet_id })
}

/// Trimmed, non-empty sheet title.
///
/// # Errors
///
/// Returns a validation error naming `field` when the title is blank.
pub fn sheet_title<'a>(title: &'a str, field: &str) -> Result<&'a str> {
    let title = title.trim();
    ensure_input!(!title.is_empty(), "{field} must not be empty");
    Ok(title)
}

pub fn rename_sheet(sheet_id: i64, new_title: &str) -> Request {
    Request::UpdateSheetProperties(UpdateSheetPropertiesRequest {
        properties: SheetProperties {
            sheet_id: Some(sheet_id),
            title: Some(new_title.to_string()),
            ..SheetProperties::default()
        },
        fields: "title".to_string(),
    })
}

pub fn duplicate_sheet(
    source_sheet_id: i64,
    insert_index: Option<i64>,
    new_title: Option<&str>,
) -> Request {
    Request::DuplicateSheet(DuplicateSheetRequest {
        source_sheet_id,
        insert_sheet_index: non_negative(insert_index),
        new_sheet_name: new_title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(ToString::to_string),
    })
}

// ============================================================================
// Charts
// ============================================================================

/// Chart shape chosen from the chart type.
///
/// Pie charts take one series; every other type takes one or more series
/// sharing the domain column.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartRequest {
    SingleSeries {
        domain: GridRange,
        series: GridRange,
    },
    MultiSeries {
        chart_type: ChartType,
        domain: GridRange,
        series: Vec<GridRange>,
    },
}

impl ChartRequest {
    /// Plans the source ranges for a chart over `data`.
    ///
    /// Offsets are relative to the first column of `data`. Without explicit
    /// series, every column after the domain column up to the end of the data
    /// range becomes a series.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `data` has no bounded columns, an
    /// offset lies outside it, or no series remain.
    pub fn plan(
        chart_type: ChartType,
        data: &GridRange,
        domain_column: u32,
        series_columns: Option<Vec<u32>>,
    ) -> Result<Self> {
        let start = data.start_column_index.unwrap_or(0);
        let end = data.end_column_index.ok_or_else(|| {
            SheetsError::validation("data_range must have a bounded last column")
        })?;
        let width = end.saturating_sub(start);
        ensure_input!(
            domain_column < width,
            "domain_column ({domain_column}) is outside the {width}-column data range"
        );

        let offsets = match series_columns {
            Some(offsets) if !offsets.is_empty() => offsets,
            _ => (domain_column + 1..width).collect(),
        };
        if let Some(offset) = offsets.iter().find(|offset| **offset >= width) {
            return Err(SheetsError::validation(format!(
                "series column {offset} is outside the {width}-column data range"
            )));
        }
        ensure_input!(
            !offsets.is_empty(),
            "data range has no columns after the domain column to chart"
        );

        let column = |offset: u32| GridRange {
            start_column_index: Some(start + offset),
            end_column_index: Some(start + offset + 1),
            ..data.clone()
        };
        let domain = column(domain_column);
        Ok(match chart_type {
            ChartType::Pie => Self::SingleSeries {
                domain,
                series: column(offsets[0]),
            },
            chart_type => Self::MultiSeries {
                chart_type,
                domain,
                series: offsets.into_iter().map(column).collect(),
            },
        })
    }

    pub fn series_count(&self) -> usize {
        match self {
            Self::SingleSeries { .. } => 1,
            Self::MultiSeries { series, .. } => series.len(),
        }
    }

    /// `addChart` anchored at `anchor`, using the fixed overlay size.
    pub fn into_request(self, title: Option<String>, anchor: GridCoordinate) -> Request {
        let spec = match self {
            Self::SingleSeries { domain, series } => ChartSpec {
                title,
                pie_chart: Some(PieChartSpec {
                    legend_position: "RIGHT_LEGEND".to_string(),
                    domain: ChartData::from_range(domain),
                    series: ChartData::from_range(series),
                }),
                ..ChartSpec::default()
            },
            Self::MultiSeries {
                chart_type,
                domain,
                series,
            } => {
                let target_axis = if chart_type == ChartType::Bar {
                    "BOTTOM_AXIS"
                } else {
                    "LEFT_AXIS"
                };
                ChartSpec {
                    title,
                    basic_chart: Some(BasicChartSpec {
                        chart_type,
                        legend_position: "BOTTOM_LEGEND".to_string(),
                        domains: vec![BasicChartDomain {
                            domain: ChartData::from_range(domain),
                        }],
                        series: series
                            .into_iter()
                            .map(|range| BasicChartSeries {
                                series: ChartData::from_range(range),
                                target_axis: target_axis.to_string(),
                            })
                            .collect(),
                        header_count: 1,
                    }),
                    ..ChartSpec::default()
                }
            }
        };
        Request::AddChart(AddChartRequest {
            chart: EmbeddedChart {
                spec,
                position: EmbeddedObjectPosition {
                    overlay_position: OverlayPosition {
                        anchor_cell: anchor,
                        offset_x_pixels: 0,
                        offset_y_pixels: 0,
                        width_pixels: CHART_WIDTH_PIXELS,
                        height_pixels: CHART_HEIGHT_PIXELS,
                    },
                },
            },
        })
    }
}

pub fn delete_chart(chart_id: i64) -> Request {
    Request::DeleteEmbeddedObject(DeleteEmbeddedObjectRequest { object_id: chart_id })
}

// ============================================================================
// Sharing
// ============================================================================

/// A Drive permission plus whether the grantee should be emailed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePlan {
    pub permission: PermissionRequest,
    pub send_notification_email: bool,
}

/// Public link sharing wins over a named grantee; one of the two is required.
/// A notification email goes out only when an address was given.
///
/// # Errors
///
/// Returns a validation error when neither an email nor `make_public` is
/// given.
pub fn share_plan(email: Option<&str>, make_public: bool, role: PermissionRole) -> Result<SharePlan> {
    let email = email.map(str::trim).filter(|email| !email.is_empty());
    let permission = if make_public {
        PermissionRequest {
            permission_type: PermissionType::Anyone,
            role,
            email_address: None,
        }
    } else if let Some(email) = email {
        PermissionRequest {
            permission_type: PermissionType::User,
            role,
            email_address: Some(email.to_string()),
        }
    } else {
        return Err(SheetsError::validation(
            "either email or make_public=true must be provided",
        ));
    };
    Ok(SharePlan {
        permission,
        send_notification_email: email.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data_range(start_column: u32, end_column: u32) -> GridRange {
        GridRange {
            sheet_id: 7,
            start_row_index: Some(0),
            end_row_index: Some(20),
            start_column_index: Some(start_column),
            end_column_index: Some(end_column),
        }
    }

    #[test]
    fn test_hex_to_color_scales_channels() {
        let color = hex_to_color("#FF8000").unwrap();
        assert!((color.red - 1.0).abs() < f64::EPSILON);
        assert!((color.green - 128.0 / 255.0).abs() < f64::EPSILON);
        assert!(color.blue.abs() < f64::EPSILON);
        assert_eq!(hex_to_color("ff8000"), Some(color));
    }

    #[test]
    fn test_hex_to_color_rejects_malformed_input() {
        for input in [
            "", "#", "#FFF", "#GG0000", "#FF00001", "red", "##FF0000", " FF0000", "#FF0000 ",
        ] {
            assert!(hex_to_color(input).is_none(), "{input} should be rejected");
        }
    }

    #[test]
    fn test_cell_format_mask_tracks_present_fields_in_order() {
        let spec = FormatSpec {
            bold: Some(true),
            font_size: Some(14),
            background_color: Some("#00FF00".to_string()),
            horizontal_alignment: Some(HorizontalAlignment::Center),
            ..FormatSpec::default()
        };

        let (format, fields) = cell_format(&spec);

        assert_eq!(
            fields,
            vec![
                "userEnteredFormat.textFormat.bold",
                "userEnteredFormat.textFormat.fontSize",
                "userEnteredFormat.backgroundColor",
                "userEnteredFormat.horizontalAlignment",
            ]
        );
        assert_eq!(
            serde_json::to_value(format).unwrap(),
            json!({
                "textFormat": {"bold": true, "fontSize": 14},
                "backgroundColor": {"red": 0.0, "green": 1.0, "blue": 0.0},
                "horizontalAlignment": "CENTER"
            })
        );
    }

    #[test]
    fn test_cell_format_drops_invalid_color_and_zero_font_size() {
        let spec = FormatSpec {
            font_size: Some(0),
            font_color: Some("#12345".to_string()),
            ..FormatSpec::default()
        };

        let (format, fields) = cell_format(&spec);

        assert!(fields.is_empty());
        assert_eq!(format, CellFormat::default());
        assert!(repeat_cell(data_range(0, 1), &spec).is_none());
    }

    #[test]
    fn test_cell_format_keeps_explicit_false() {
        let spec = FormatSpec {
            bold: Some(false),
            ..FormatSpec::default()
        };
        let (request, fields) = repeat_cell(data_range(0, 2), &spec).unwrap();
        assert_eq!(fields, vec!["userEnteredFormat.textFormat.bold"]);
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(
            body["repeatCell"]["cell"]["userEnteredFormat"]["textFormat"]["bold"],
            json!(false)
        );
        assert_eq!(
            body["repeatCell"]["fields"],
            json!("userEnteredFormat.textFormat.bold")
        );
    }

    #[test]
    fn test_insert_dimension_inherits_except_at_zero() {
        let at_zero = insert_dimension(dimension_range(
            3,
            Dimension::Rows,
            dimension_span(0, 3).unwrap(),
        ));
        let after = insert_dimension(dimension_range(
            3,
            Dimension::Rows,
            dimension_span(5, 3).unwrap(),
        ));

        assert_eq!(
            serde_json::to_value(at_zero).unwrap(),
            json!({"insertDimension": {
                "range": {"sheetId": 3, "dimension": "ROWS", "startIndex": 0, "endIndex": 3},
                "inheritFromBefore": false
            }})
        );
        let after = serde_json::to_value(after).unwrap();
        assert_eq!(after["insertDimension"]["inheritFromBefore"], json!(true));
        assert_eq!(after["insertDimension"]["range"]["endIndex"], json!(8));
    }

    #[test]
    fn test_dimension_span_rejects_zero_count() {
        assert_eq!(dimension_span(2, 3).unwrap(), 2..5);
        assert!(dimension_span(2, 0).is_err());
        assert!(dimension_span(u32::MAX, 1).is_err());
    }

    #[test]
    fn test_cell_span_requires_increasing_bounds() {
        let span = CellSpan::new(0, 1, 0, 1).unwrap();
        assert_eq!(span.on_sheet(9).sheet_id, 9);
        assert!(CellSpan::new(2, 2, 0, 1).is_err());
        assert!(CellSpan::new(0, 1, 3, 1).is_err());
    }

    #[test]
    fn test_column_width_checks_span_and_width() {
        let body = serde_json::to_value(ColumnWidth::new(1, 3, 120).unwrap().into_request(4))
            .unwrap();
        assert_eq!(
            body,
            json!({"updateDimensionProperties": {
                "range": {"sheetId": 4, "dimension": "COLUMNS", "startIndex": 1, "endIndex": 3},
                "properties": {"pixelSize": 120},
                "fields": "pixelSize"
            }})
        );
        assert!(ColumnWidth::new(1, 3, 0).is_err());
        assert!(ColumnWidth::new(3, 3, 100).is_err());
    }

    #[test]
    fn test_sheet_title_trims_and_rejects_blank() {
        assert_eq!(sheet_title("  Summary ", "new_title").unwrap(), "Summary");
        let err = sheet_title("   ", "new_title").unwrap_err();
        assert!(err.to_string().contains("new_title must not be empty"));
    }

    #[test]
    fn test_chart_defaults_series_to_columns_after_domain() {
        let plan = ChartRequest::plan(ChartType::Line, &data_range(0, 5), 0, None).unwrap();

        let ChartRequest::MultiSeries { domain, series, .. } = &plan else {
            panic!("expected multi-series chart");
        };
        assert_eq!(domain.start_column_index, Some(0));
        let columns: Vec<_> = series
            .iter()
            .map(|range| range.start_column_index.unwrap())
            .collect();
        assert_eq!(columns, vec![1, 2, 3, 4]);
        assert_eq!(plan.series_count(), 4);
    }

    #[test]
    fn test_chart_offsets_are_relative_to_data_range() {
        let plan =
            ChartRequest::plan(ChartType::Column, &data_range(2, 6), 1, Some(vec![0, 3])).unwrap();

        let ChartRequest::MultiSeries { domain, series, .. } = plan else {
            panic!("expected multi-series chart");
        };
        assert_eq!(domain.start_column_index, Some(3));
        assert_eq!(series[0].start_column_index, Some(2));
        assert_eq!(series[1].end_column_index, Some(6));
    }

    #[test]
    fn test_pie_chart_uses_single_series() {
        let plan = ChartRequest::plan(ChartType::Pie, &data_range(0, 4), 0, None).unwrap();
        assert!(matches!(plan, ChartRequest::SingleSeries { .. }));

        let request = plan.into_request(
            Some("Share".to_string()),
            GridCoordinate {
                sheet_id: 7,
                row_index: 0,
                column_index: 5,
            },
        );
        let body = serde_json::to_value(request).unwrap();
        let spec = &body["addChart"]["chart"]["spec"];
        assert_eq!(spec["pieChart"]["legendPosition"], json!("RIGHT_LEGEND"));
        assert_eq!(
            spec["pieChart"]["series"]["sourceRange"]["sources"][0]["startColumnIndex"],
            json!(1)
        );
        assert!(spec.get("basicChart").is_none());
        let overlay = &body["addChart"]["chart"]["position"]["overlayPosition"];
        assert_eq!(overlay["widthPixels"], json!(600));
        assert_eq!(overlay["heightPixels"], json!(400));
        assert_eq!(overlay["anchorCell"]["columnIndex"], json!(5));
    }

    #[test]
    fn test_basic_chart_body_shape() {
        let request = ChartRequest::plan(ChartType::Bar, &data_range(0, 3), 0, None)
            .unwrap()
            .into_request(None, GridCoordinate::default());
        let body = serde_json::to_value(request).unwrap();
        let basic = &body["addChart"]["chart"]["spec"]["basicChart"];
        assert_eq!(basic["chartType"], json!("BAR"));
        assert_eq!(basic["legendPosition"], json!("BOTTOM_LEGEND"));
        assert_eq!(basic["headerCount"], json!(1));
        assert_eq!(basic["series"].as_array().unwrap().len(), 2);
        assert_eq!(basic["series"][0]["targetAxis"], json!("BOTTOM_AXIS"));
    }

    #[test]
    fn test_chart_rejects_out_of_range_offsets() {
        assert!(ChartRequest::plan(ChartType::Line, &data_range(0, 3), 3, None).is_err());
        assert!(ChartRequest::plan(ChartType::Line, &data_range(0, 3), 0, Some(vec![5])).is_err());
        assert!(ChartRequest::plan(ChartType::Line, &data_range(0, 1), 0, None).is_err());
        let unbounded = GridRange {
            end_column_index: None,
            ..data_range(0, 1)
        };
        assert!(ChartRequest::plan(ChartType::Line, &unbounded, 0, None).is_err());
    }

    #[test]
    fn test_share_plan_branches() {
        let public = share_plan(Some("a@example.com"), true, PermissionRole::Reader).unwrap();
        assert_eq!(public.permission.permission_type, PermissionType::Anyone);
        assert!(public.permission.email_address.is_none());
        assert!(public.send_notification_email);

        let user = share_plan(Some(" a@example.com "), false, PermissionRole::Writer).unwrap();
        assert_eq!(user.permission.permission_type, PermissionType::User);
        assert_eq!(
            user.permission.email_address.as_deref(),
            Some("a@example.com")
        );

        let err = share_plan(None, false, PermissionRole::Reader).unwrap_err();
        assert!(matches!(err, SheetsError::Validation(_)));
        assert!(share_plan(Some("  "), false, PermissionRole::Reader).is_err());
    }

    #[test]
    fn test_find_replace_scopes_to_sheet_or_all() {
        let scoped = find_replace(FindReplace {
            find: "old".to_string(),
            replacement: "new".to_string(),
            sheet_id: Some(4),
            ..FindReplace::default()
        })
        .unwrap();
        let scoped = serde_json::to_value(scoped).unwrap();
        assert_eq!(scoped["findReplace"]["sheetId"], json!(4));
        assert!(scoped["findReplace"].get("allSheets").is_none());

        let global = find_replace(FindReplace {
            find: "old".to_string(),
            ..FindReplace::default()
        })
        .unwrap();
        let global = serde_json::to_value(global).unwrap();
        assert_eq!(global["findReplace"]["allSheets"], json!(true));
    }

    #[test]
    fn test_sort_spec_requires_column_inside_span() {
        let span = CellSpan::new(0, 10, 1, 4).unwrap();
        assert!(sort_spec(&span, 2, SortOrder::Descending).is_ok());
        assert!(sort_spec(&span, 0, SortOrder::Ascending).is_err());
        assert!(sort_spec(&span, 4, SortOrder::Ascending).is_err());
    }

    #[test]
    fn test_loose_params_parse() {
        let list: ListParam = serde_json::from_value(json!("Data, Summary ,,Notes")).unwrap();
        assert_eq!(list.into_items(), vec!["Data", "Summary", "Notes"]);

        let columns: ColumnsParam = serde_json::from_value(json!("1, 3")).unwrap();
        assert_eq!(columns.into_offsets().unwrap(), vec![1, 3]);
        let bad: ColumnsParam = serde_json::from_value(json!("1,x")).unwrap();
        assert!(bad.into_offsets().is_err());

        let matrix: MatrixParam =
            serde_json::from_value(json!(r#"[["Name","Age"],["Alice",30]]"#)).unwrap();
        let rows = matrix.into_rows().unwrap();
        assert_eq!(rows[1][1], CellValue::from(30));

        let selector: SheetSelector = serde_json::from_value(json!(12)).unwrap();
        assert_eq!(selector, SheetSelector::Id(12));
        let selector: SheetSelector = serde_json::from_value(json!("Data")).unwrap();
        assert_eq!(selector, SheetSelector::Title("Data".to_string()));
    }

    #[test]
    fn test_add_sheet_drops_negative_index() {
        let request = add_sheet("Data", Some(-1), None, None).unwrap();
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"addSheet": {"properties": {"title": "Data"}}})
        );
        let request = add_sheet("Data", Some(0), Some(10), None).unwrap();
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({"addSheet": {"properties": {
                "title": "Data", "index": 0, "gridProperties": {"rowCount": 10}
            }}})
        );
    }
}
