use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::{StringRecord, Trim};
use serde::Deserialize;
use validator::Validate;

use crate::domain::material::MaterialDraft;
use crate::domain::money::{MAX_AMOUNT, MAX_QUANTITY, cents_from_amount};
use crate::forms::{
    FormError, FormResult, empty_string_as_none, field_errors, finite_number, optional_multiline,
    required_text,
};

const MAX_STOCK: f64 = MAX_QUANTITY as f64;

const NAME_MAX_LEN: u64 = 128;
const LABEL_MAX_LEN: u64 = 64;

/// Columns every materials upload must carry.
const REQUIRED_HEADERS: [&str; 7] = [
    "name",
    "type",
    "unit",
    "current_stock",
    "reorder_level",
    "price",
    "supplier_id",
];

/// Form payload used to create a material or replace an existing one.
#[derive(Debug, Deserialize, Validate)]
pub struct MaterialForm {
    #[validate(length(min = 3, max = NAME_MAX_LEN, message = "name must be at least 3 characters"))]
    pub name: String,
    #[serde(alias = "type")]
    #[validate(length(min = 1, max = LABEL_MAX_LEN, message = "type is required"))]
    pub material_type: String,
    #[validate(length(min = 1, max = LABEL_MAX_LEN, message = "unit is required"))]
    pub unit: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = MAX_STOCK, message = "stock is out of range"))]
    pub current_stock: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = MAX_STOCK, message = "reorder level is out of range"))]
    pub reorder_level: f64,
    /// Price per unit as a decimal amount.
    #[validate(range(min = 0.01, max = MAX_AMOUNT, message = "price is out of range"))]
    pub price: f64,
    #[validate(range(min = 1, message = "supplier is required"))]
    pub supplier_id: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
}

impl MaterialForm {
    /// Validates and sanitizes the payload into a `MaterialDraft`.
    pub fn into_draft(self) -> FormResult<MaterialDraft> {
        self.validate()?;

        let name = required_text(&self.name, "name")?;
        if name.chars().count() < 3 {
            return Err(FormError::Invalid {
                field: "name",
                message: "name must be at least 3 characters".to_string(),
            });
        }
        let material_type = required_text(&self.material_type, "material_type")?;
        let unit = required_text(&self.unit, "unit")?;

        let mut draft = MaterialDraft::new(
            name,
            material_type,
            unit,
            cents_from_amount(finite_number(self.price, "price")?),
            self.supplier_id,
        )
        .with_stock(
            finite_number(self.current_stock, "current_stock")?,
            finite_number(self.reorder_level, "reorder_level")?,
        );

        if let Some(description) = optional_multiline(self.description.as_deref()) {
            draft = draft.with_description(description);
        }

        Ok(draft)
    }
}

/// Multipart payload carrying a CSV file of materials.
#[derive(Debug, MultipartForm)]
pub struct UploadMaterialsForm {
    #[multipart(limit = "5MB")]
    pub csv: TempFile,
}

impl UploadMaterialsForm {
    /// Parse the uploaded CSV into material drafts.
    ///
    /// The first failing row aborts the import; row numbers count the header as row 1.
    pub fn into_drafts(self) -> FormResult<Vec<MaterialDraft>> {
        let mut contents = Vec::with_capacity(self.csv.size);
        self.csv.file.reopen()?.read_to_end(&mut contents)?;
        parse_materials_csv(&contents)
    }
}

/// Parse CSV bytes with the materials upload layout.
pub fn parse_materials_csv(bytes: &[u8]) -> FormResult<Vec<MaterialDraft>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|name| locate_header(&headers, name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(FormError::MissingHeaders(missing.join(", ")));
    }

    let column = |name: &str| locate_header(&headers, name);
    let description_index = column("description");

    let mut drafts = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2; // account for header row
        let record = row?;

        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let text = |name: &str| -> String {
            column(name)
                .and_then(|idx| record.get(idx))
                .unwrap_or_default()
                .to_string()
        };

        let form = MaterialForm {
            name: text("name"),
            material_type: text("type"),
            unit: text("unit"),
            current_stock: parse_number(&text("current_stock"), "current_stock", row_number)?,
            reorder_level: parse_number(&text("reorder_level"), "reorder_level", row_number)?,
            price: parse_number(&text("price"), "price", row_number)?,
            supplier_id: parse_number(&text("supplier_id"), "supplier_id", row_number)?,
            description: description_index
                .and_then(|idx| record.get(idx))
                .map(str::to_string),
        };

        let draft = form.into_draft().map_err(|err| FormError::UploadRow {
            row: row_number,
            message: describe(&err),
        })?;
        drafts.push(draft);
    }

    if drafts.is_empty() {
        return Err(FormError::EmptyUpload);
    }

    Ok(drafts)
}

fn parse_number<T: std::str::FromStr>(value: &str, column: &str, row: usize) -> FormResult<T> {
    value.trim().parse::<T>().map_err(|_| FormError::UploadRow {
        row,
        message: format!("`{column}` must be a number, got `{value}`"),
    })
}

fn describe(err: &FormError) -> String {
    match err {
        FormError::Validation(errors) => field_errors(errors)
            .into_iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn locate_header(headers: &StringRecord, expected: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(expected))
}
