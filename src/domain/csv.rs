//! Reader for the order-item CSV accepted by the import endpoint.
//!
//! The first record is the header. The delimiter is whichever of `,` `;` or
//! tab occurs most often (outside quotes) in the header line. Short rows are
//! accepted and their missing cells read as empty.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::dto::orders::OrderItemInput;
use crate::errors::ServiceError;

pub const REQUIRED_COLUMNS: [&str; 5] = ["itemName", "quantity", "dimension", "material", "position"];

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let mut best = (b',', 0usize);
    for candidate in CANDIDATE_DELIMITERS {
        let mut in_quotes = false;
        let count = header
            .bytes()
            .filter(|&b| {
                if b == b'"' {
                    in_quotes = !in_quotes;
                }
                !in_quotes && b == candidate
            })
            .count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

fn no_items() -> ServiceError {
    ServiceError::BadRequest("CSV contains no items".to_string())
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Parses CSV text into order items.
///
/// Row numbers in errors are file lines: the first data row is row 2.
pub fn parse_order_items(input: &str) -> Result<Vec<OrderItemInput>, ServiceError> {
    let text = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = reader
        .headers()
        .map_err(|e| ServiceError::BadRequest(format!("Invalid CSV header: {}", e)))?
        .clone();
    if is_blank(&header) {
        return Err(no_items());
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !header.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::BadRequest(format!(
            "CSV missing columns: {}",
            missing.join(", ")
        )));
    }

    let column = |name: &str| header.iter().position(|h| h == name).unwrap_or(0);
    let (name_col, qty_col, dim_col, mat_col, pos_col) = (
        column("itemName"),
        column("quantity"),
        column("dimension"),
        column("material"),
        column("position"),
    );

    let mut items = Vec::new();
    let mut index = 0usize;
    for record in reader.records() {
        let line = index + 2;
        let row = record.map_err(|e| ServiceError::BadRequest(format!("Row {}: {}", line, e)))?;
        if is_blank(&row) {
            continue;
        }
        index += 1;

        let cell = |col: usize| row.get(col).unwrap_or_default();
        let optional = |col: usize| Some(cell(col).to_string()).filter(|v| !v.is_empty());

        let raw_quantity = cell(qty_col);
        let quantity = raw_quantity
            .parse::<i32>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                ServiceError::BadRequest(format!("Row {}: invalid quantity \"{}\"", line, raw_quantity))
            })?;

        let item_name = cell(name_col);
        if item_name.is_empty() {
            return Err(ServiceError::BadRequest(format!("Row {}: missing item name", line)));
        }

        items.push(OrderItemInput {
            item_name: item_name.to_string(),
            quantity,
            dimension: optional(dim_col),
            material: optional(mat_col),
            position: optional(pos_col),
        });
    }

    if items.is_empty() {
        return Err(no_items());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn message(err: ServiceError) -> String {
        err.response_message()
    }

    #[test]
    fn parses_semicolon_file_with_bom() {
        let csv = "\u{feff}itemName;quantity;dimension;material;position\r\n\
                   Plate;4;1000x500;S235;A-01\r\n\
                   \r\n\
                   Tube;2;;;\r\n";
        let items = parse_order_items(csv).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_name, "Plate");
        assert_eq!(items[0].position.as_deref(), Some("A-01"));
        assert_eq!(items[1].quantity, 2);
        assert_eq!(items[1].dimension, None);
    }

    #[test]
    fn detects_tab_and_comma_delimiters() {
        let tab = "itemName\tquantity\tdimension\tmaterial\tposition\nBolt\t10\tM8\tsteel\tB-2";
        assert_eq!(parse_order_items(tab).unwrap()[0].material.as_deref(), Some("steel"));

        let comma = "position,material,dimension,quantity,itemName\nC-3,alu,20x20, 7 , Profile ";
        let item = &parse_order_items(comma).unwrap()[0];
        assert_eq!(item.item_name, "Profile");
        assert_eq!(item.quantity, 7);
        assert_eq!(item.position.as_deref(), Some("C-3"));
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_quotes() {
        let csv = "itemName,quantity,dimension,material,position\n\"Plate, \"\"thick\"\"\",3,\"10,5\",S355,A";
        let item = &parse_order_items(csv).unwrap()[0];
        assert_eq!(item.item_name, "Plate, \"thick\"");
        assert_eq!(item.dimension.as_deref(), Some("10,5"));
    }

    #[test]
    fn short_rows_are_padded() {
        let csv = "itemName;quantity;dimension;material;position\nPlate;1";
        let item = &parse_order_items(csv).unwrap()[0];
        assert_eq!(item.position, None);
    }

    #[test]
    fn missing_columns_are_listed() {
        let err = parse_order_items("itemName;quantity;position\nA;1;B").unwrap_err();
        assert_eq!(message(err), "CSV missing columns: dimension, material");
    }

    #[test]
    fn row_errors_use_file_line_numbers() {
        let csv = "itemName;quantity;dimension;material;position\nA;1;;;\nB;abc;;;";
        assert_eq!(
            message(parse_order_items(csv).unwrap_err()),
            "Row 3: invalid quantity \"abc\""
        );

        let csv = "itemName;quantity;dimension;material;position\n;5;;;";
        assert_eq!(
            message(parse_order_items(csv).unwrap_err()),
            "Row 2: missing item name"
        );

        let csv = "itemName;quantity;dimension;material;position\nA;0;;;";
        assert!(message(parse_order_items(csv).unwrap_err()).starts_with("Row 2: invalid quantity"));
    }

    #[test]
    fn delimiter_only_rows_are_skipped() {
        let csv = "itemName;quantity;dimension;material;position\n;;;;\nPlate;2;;;";
        let items = parse_order_items(csv).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_name, "Plate");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_matches!(parse_order_items(""), Err(ServiceError::BadRequest(_)));
        assert_matches!(
            parse_order_items("itemName;quantity;dimension;material;position\n\n"),
            Err(ServiceError::BadRequest(_))
        );
    }
}
