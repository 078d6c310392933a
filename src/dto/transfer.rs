//! CSV import and export payloads.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{not_blank, orders::validate_sap_number};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportCsvRequest {
    #[validate(custom = "validate_sap_number")]
    pub sap_number: String,
    #[validate(length(min = 1, max = 255), custom = "not_blank")]
    pub supplier: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Raw CSV text with a header row
    #[validate(length(min = 1, message = "csvData is required"))]
    #[schema(example = "itemName;quantity;dimension;material;position\nPlate;4;1000x500;S235;A-01")]
    pub csv_data: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    pub status: Option<String>,
    pub result: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomExportRequest {
    /// `production`, `subProducts` or `quality`
    #[validate(length(min = 1, message = "resource is required"))]
    pub resource: String,
    #[serde(default)]
    pub filters: Option<ExportFilters>,
}

/// A rendered CSV attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}
