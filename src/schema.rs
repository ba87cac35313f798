//! Normalized, vendor-agnostic document schema.
//!
//! Every provider adapter produces these records. Optional fields serialize
//! as `null` rather than being skipped so callers see a stable shape.

use serde::{Deserialize, Serialize};

/// Raw vendor response paired with its normalized form.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderCallResult<T> {
    original_response: serde_json::Value,
    standardized_response: T,
}

impl<T> ProviderCallResult<T> {
    pub fn new(original_response: serde_json::Value, standardized_response: T) -> Self {
        Self {
            original_response,
            standardized_response,
        }
    }

    /// The untouched vendor JSON.
    pub fn original_response(&self) -> &serde_json::Value {
        &self.original_response
    }

    pub fn standardized_response(&self) -> &T {
        &self.standardized_response
    }
}

// ── Shared line items ───────────────────────────────────────────────────────

/// One row of a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Option<i64>,
    pub amount: Option<f64>,
    pub unit_price: Option<f64>,
}

/// One row of an invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub description: String,
    pub quantity: Option<i64>,
    pub amount: Option<f64>,
    pub unit_price: Option<f64>,
    pub product_code: Option<String>,
    pub tax_rate: Option<f64>,
}

impl From<LineItem> for InvoiceLineItem {
    fn from(item: LineItem) -> Self {
        Self {
            description: item.description,
            quantity: item.quantity,
            amount: item.amount,
            unit_price: item.unit_price,
            product_code: None,
            tax_rate: None,
        }
    }
}

// ── Invoice ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleInvoice {
    pub currency: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInformationInvoice {
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub customer_email: Option<String>,
    pub customer_tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantInformationInvoice {
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
    pub merchant_phone: Option<String>,
    pub merchant_email: Option<String>,
    pub merchant_tax_id: Option<String>,
}

/// Aggregate tax line. Only one is ever emitted per invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxesInvoice {
    pub value: Option<f64>,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfosInvoiceParserDataClass {
    pub invoice_number: Option<String>,
    pub invoice_total: Option<f64>,
    pub invoice_subtotal: Option<f64>,
    pub date: Option<String>,
    pub due_date: Option<String>,
    pub locale: LocaleInvoice,
    pub customer_information: CustomerInformationInvoice,
    pub merchant_information: MerchantInformationInvoice,
    pub taxes: Vec<TaxesInvoice>,
    pub item_lines: Vec<InvoiceLineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceParserDataClass {
    pub extracted_data: Vec<InfosInvoiceParserDataClass>,
}

// ── Receipt ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    pub currency: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInformation {
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantInformation {
    pub merchant_name: Option<String>,
    pub merchant_address: Option<String>,
    pub merchant_phone: Option<String>,
    pub merchant_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxes {
    pub taxes: Option<f64>,
    pub rate: Option<f64>,
}

/// Payment details printed on a receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptInfos {
    pub payment_code: Option<String>,
    pub host: Option<String>,
    pub payment_id: Option<String>,
    pub card_type: Option<String>,
    pub receipt_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfosReceiptParserDataClass {
    pub invoice_number: Option<String>,
    pub invoice_total: Option<f64>,
    pub invoice_subtotal: Option<f64>,
    pub date: Option<String>,
    pub locale: Locale,
    pub customer_information: CustomerInformation,
    pub merchant_information: MerchantInformation,
    pub taxes: Vec<Taxes>,
    pub receipt_infos: ReceiptInfos,
    pub item_lines: Vec<LineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptParserDataClass {
    pub extracted_data: Vec<InfosReceiptParserDataClass>,
}

// ── Identity ────────────────────────────────────────────────────────────────

/// ISO 3166 country descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoCountry {
    pub name: String,
    pub alpha2: String,
    pub alpha3: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfosIdentityParserDataClass {
    pub document_type: Option<String>,
    pub last_name: Option<String>,
    pub given_names: Vec<String>,
    pub birth_date: Option<String>,
    pub country: Option<InfoCountry>,
    pub document_id: Option<String>,
    pub age: Option<i64>,
    pub nationality: Option<String>,
    pub issuing_state: Option<String>,
    pub image_id: Vec<String>,
    pub image_signature: Vec<String>,
    pub gender: Option<String>,
    pub expire_date: Option<String>,
    pub issuance_date: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityParserDataClass {
    pub extracted_data: Vec<InfosIdentityParserDataClass>,
}
