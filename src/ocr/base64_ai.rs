//! Base64.ai OCR provider.
//!
//! Sends documents as `data:` URIs and reshapes the vendor's camelCase field
//! map into the normalized invoice, receipt and identity records. Missing or
//! malformed vendor fields become nulls; only transport and vendor errors
//! are returned as errors.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::transport::Transport;
use super::{DocumentFile, OcrProvider};
use crate::config::ProviderSettings;
use crate::conversion::combine_date_with_time;
use crate::country::{get_info_country, CountryKey};
use crate::error::{ProviderError, Result};
use crate::fields::{extract_line_items, field_number, field_text, FieldMap};
use crate::schema::{
    CustomerInformation, CustomerInformationInvoice, IdentityParserDataClass,
    InfosIdentityParserDataClass, InfosInvoiceParserDataClass, InfosReceiptParserDataClass,
    InvoiceParserDataClass, Locale, LocaleInvoice, MerchantInformation,
    MerchantInformationInvoice, ProviderCallResult, ReceiptInfos, ReceiptParserDataClass, Taxes,
    TaxesInvoice,
};

pub const PROVIDER_NAME: &str = "base64";

const DEPRECATED_OCR_MESSAGE: &str =
    "This provider is deprecated. You won't be charged for your call.";

/// Finance document kinds the vendor can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinanceDocument {
    Invoice,
    Receipt,
}

impl FinanceDocument {
    /// Vendor `modelTypes` entry for this document kind.
    pub fn model_type(self) -> &'static str {
        match self {
            Self::Invoice => "finance/invoice",
            Self::Receipt => "finance/receipt",
        }
    }
}

pub struct Base64AiProvider {
    settings: ProviderSettings,
    transport: Arc<dyn Transport>,
}

impl Base64AiProvider {
    pub fn new(settings: ProviderSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Send a finance document and return the decoded vendor JSON.
    async fn send_ocr_document(&self, file: &DocumentFile, kind: FinanceDocument) -> Result<Value> {
        let body = json!({
            "modelTypes": [kind.model_type()],
            "image": file.to_data_url(),
        });

        info!(
            "Base64AiProvider: sending {} ({} bytes) as {}",
            file.filename,
            file.data.len(),
            kind.model_type()
        );

        let response = self
            .transport
            .post_json(&self.settings.endpoint, &self.settings.secret, &body)
            .await?;

        if !response.is_ok() {
            warn!(
                "Base64AiProvider: {} failed with status {}: {}",
                kind.model_type(),
                response.status,
                response.body
            );
            return Err(ProviderError::failure(response.body));
        }

        log_raw_response(&response.body);
        serde_json::from_str(&response.body).map_err(|e| {
            ProviderError::failure(format!("Invalid JSON response from provider: {}", e))
        })
    }

    async fn send_identity_document(&self, file: &DocumentFile) -> Result<Value> {
        let body = json!({ "image": file.to_data_url() });

        info!(
            "Base64AiProvider: sending {} ({} bytes) for identity parsing",
            file.filename,
            file.data.len()
        );

        let response = self
            .transport
            .post_json(&self.settings.endpoint, &self.settings.secret, &body)
            .await?;
        let parsed: Option<Value> = serde_json::from_str(&response.body).ok();

        if !response.is_ok() {
            warn!(
                "Base64AiProvider: identity parsing failed with status {}: {}",
                response.status, response.body
            );
            let message = parsed
                .as_ref()
                .and_then(|v| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(response.body);
            return Err(ProviderError::failure(message));
        }

        log_raw_response(&response.body);
        parsed.ok_or_else(|| ProviderError::failure("Invalid JSON response from provider"))
    }
}

#[async_trait::async_trait]
impl OcrProvider for Base64AiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn ocr(&self, _file: &DocumentFile, _language: Option<&str>) -> Result<Value> {
        Err(ProviderError::DeprecatedFeature(
            DEPRECATED_OCR_MESSAGE.to_string(),
        ))
    }

    async fn invoice_parser(
        &self,
        file: &DocumentFile,
        _language: Option<&str>,
    ) -> Result<ProviderCallResult<InvoiceParserDataClass>> {
        let original = self.send_ocr_document(file, FinanceDocument::Invoice).await?;
        let standardized = format_invoice_document(&original);
        Ok(ProviderCallResult::new(original, standardized))
    }

    async fn receipt_parser(
        &self,
        file: &DocumentFile,
        _language: Option<&str>,
    ) -> Result<ProviderCallResult<ReceiptParserDataClass>> {
        let original = self.send_ocr_document(file, FinanceDocument::Receipt).await?;
        let standardized = format_receipt_document(&original);
        Ok(ProviderCallResult::new(original, standardized))
    }

    async fn identity_parser(
        &self,
        file: &DocumentFile,
        _filename: Option<&str>,
    ) -> Result<ProviderCallResult<IdentityParserDataClass>> {
        let original = self.send_identity_document(file).await?;
        let standardized = format_identity_documents(&original);
        Ok(ProviderCallResult::new(original, standardized))
    }
}

fn log_raw_response(body: &str) {
    let preview: String = body.chars().take(500).collect();
    debug!(
        "Base64AiProvider: raw response ({} bytes): {}",
        body.len(),
        preview
    );
}

/// `fields` of the first document in a finance response.
fn first_document_fields(original: &Value) -> Option<&FieldMap> {
    original
        .as_array()
        .and_then(|docs| docs.first())
        .and_then(|doc| doc.get("fields"))
        .and_then(Value::as_object)
}

// ── Finance mappers ─────────────────────────────────────────────────────────

pub fn format_invoice_document(original: &Value) -> InvoiceParserDataClass {
    let empty = FieldMap::new();
    let fields = first_document_fields(original).unwrap_or(&empty);

    let date = combine_date_with_time(
        field_text(fields, "invoiceDate").as_deref(),
        field_text(fields, "invoiceTime").as_deref(),
    );
    let due_date = combine_date_with_time(
        field_text(fields, "dueDate").as_deref(),
        field_text(fields, "dueTime").as_deref(),
    );

    let invoice = InfosInvoiceParserDataClass {
        invoice_number: field_text(fields, "invoiceNumber"),
        invoice_total: field_number(fields, "total"),
        invoice_subtotal: field_number(fields, "subtotal"),
        date,
        due_date,
        locale: LocaleInvoice {
            currency: field_text(fields, "currency"),
            language: None,
        },
        customer_information: CustomerInformationInvoice {
            customer_name: field_text(fields, "billTo"),
            customer_address: field_text(fields, "billToAddress"),
            ..Default::default()
        },
        merchant_information: MerchantInformationInvoice {
            merchant_name: field_text(fields, "companyName"),
            merchant_address: field_text(fields, "companyAddress"),
            ..Default::default()
        },
        taxes: vec![TaxesInvoice {
            value: field_number(fields, "tax"),
            rate: None,
        }],
        item_lines: extract_line_items(fields)
            .into_iter()
            .map(Into::into)
            .collect(),
    };

    InvoiceParserDataClass {
        extracted_data: vec![invoice],
    }
}

pub fn format_receipt_document(original: &Value) -> ReceiptParserDataClass {
    let empty = FieldMap::new();
    let fields = first_document_fields(original).unwrap_or(&empty);

    let date = combine_date_with_time(
        field_text(fields, "date").as_deref(),
        field_text(fields, "time").as_deref(),
    );

    let receipt = InfosReceiptParserDataClass {
        invoice_number: field_text(fields, "invoiceNumber"),
        invoice_total: field_number(fields, "total"),
        invoice_subtotal: field_number(fields, "subtotal"),
        date,
        locale: Locale {
            currency: field_text(fields, "currency"),
            ..Default::default()
        },
        customer_information: CustomerInformation {
            customer_name: field_text(fields, "shipTo"),
        },
        merchant_information: MerchantInformation {
            merchant_name: field_text(fields, "companyName"),
            merchant_address: field_text(fields, "companyAddress"),
            ..Default::default()
        },
        taxes: vec![Taxes {
            taxes: field_number(fields, "tax"),
            rate: None,
        }],
        receipt_infos: ReceiptInfos {
            payment_code: field_text(fields, "paymentCode"),
            host: field_text(fields, "host"),
            payment_id: field_text(fields, "paymentId"),
            card_type: field_text(fields, "cardType"),
            receipt_number: field_text(fields, "receiptNo"),
        },
        item_lines: extract_line_items(fields),
    };

    ReceiptParserDataClass {
        extracted_data: vec![receipt],
    }
}

// ── Identity mapper ─────────────────────────────────────────────────────────

/// One record per document in the vendor response. A bare object is treated
/// as a single document.
pub fn format_identity_documents(original: &Value) -> IdentityParserDataClass {
    let documents: Vec<&Value> = match original {
        Value::Array(docs) => docs.iter().collect(),
        Value::Object(_) => vec![original],
        _ => Vec::new(),
    };

    IdentityParserDataClass {
        extracted_data: documents.into_iter().map(format_identity_document).collect(),
    }
}

fn format_identity_document(document: &Value) -> InfosIdentityParserDataClass {
    let empty = FieldMap::new();
    let fields = document
        .get("fields")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let given_names: Vec<String> = field_text(fields, "givenName")
        .map(|names| names.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    let country = field_text(fields, "countryCode")
        .and_then(|code| get_info_country(CountryKey::Alpha3, &code));

    InfosIdentityParserDataClass {
        document_type: field_text(fields, "documentType"),
        last_name: field_text(fields, "familyName"),
        given_names,
        birth_date: field_text(fields, "dateOfBirth"),
        country,
        document_id: field_text(fields, "documentNumber"),
        age: field_number(fields, "age"),
        nationality: field_text(fields, "nationality"),
        issuing_state: field_text(fields, "issuingState"),
        image_id: feature_images(document, "faces"),
        image_signature: feature_images(document, "signatures"),
        gender: field_text(fields, "sex"),
        expire_date: field_text(fields, "expirationDate"),
        issuance_date: field_text(fields, "issueDate"),
        address: field_text(fields, "address"),
    }
}

/// Flatten `features.<kind>[*].image`, skipping entries without an image.
fn feature_images(document: &Value, kind: &str) -> Vec<String> {
    document
        .get("features")
        .and_then(|features| features.get(kind))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("image").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::transport::TransportResponse;
    use crate::schema::{InfoCountry, InvoiceLineItem, LineItem};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records every request and answers with a canned response.
    struct MockTransport {
        status: u16,
        body: String,
        requests: Mutex<Vec<(String, String, Value)>>,
    }

    impl MockTransport {
        fn new(status: u16, body: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: body.into(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<(String, String, Value)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn post_json(
            &self,
            url: &str,
            api_key: &str,
            body: &Value,
        ) -> Result<TransportResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), api_key.to_string(), body.clone()));
            Ok(TransportResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn provider(transport: Arc<MockTransport>) -> Base64AiProvider {
        let settings = ProviderSettings {
            secret: "ApiKey test@example.com:secret".to_string(),
            endpoint: "https://vendor.test/api/scan".to_string(),
        };
        Base64AiProvider::new(settings, transport)
    }

    fn png() -> DocumentFile {
        DocumentFile::new("invoice.png", b"png".to_vec())
    }

    fn invoice_response() -> Value {
        json!([{
            "model": {"type": "finance/invoice"},
            "fields": {
                "invoiceNumber": {"value": "INV-001"},
                "invoiceDate": {"value": "2024-03-05"},
                "invoiceTime": {"value": "14:30"},
                "dueDate": {"value": "2024-04-05"},
                "total": {"value": "$1,210.00"},
                "subtotal": {"value": "1,000.00"},
                "tax": {"value": "210.00"},
                "billTo": {"value": "ACME Corp"},
                "companyName": {"value": "Widgets Ltd"},
                "currency": {"value": "USD"},
                "lineItem1Description": {"value": "Widget"},
                "lineItem1Quantity": {"value": "10 pcs"},
                "lineItem1UnitPrice": {"value": "100.00"},
                "lineItem1LineTotal": {"value": "1,000.00"}
            }
        }])
    }

    #[test]
    fn test_format_invoice_document() {
        let invoice = format_invoice_document(&invoice_response());
        assert_eq!(
            invoice.extracted_data,
            vec![InfosInvoiceParserDataClass {
                invoice_number: Some("INV-001".to_string()),
                invoice_total: Some(1210.0),
                invoice_subtotal: Some(1000.0),
                date: Some("2024-03-05T14:30:00".to_string()),
                due_date: Some("2024-04-05".to_string()),
                locale: LocaleInvoice {
                    currency: Some("USD".to_string()),
                    language: None,
                },
                customer_information: CustomerInformationInvoice {
                    customer_name: Some("ACME Corp".to_string()),
                    ..Default::default()
                },
                merchant_information: MerchantInformationInvoice {
                    merchant_name: Some("Widgets Ltd".to_string()),
                    ..Default::default()
                },
                taxes: vec![TaxesInvoice {
                    value: Some(210.0),
                    rate: None,
                }],
                item_lines: vec![InvoiceLineItem {
                    description: "Widget".to_string(),
                    quantity: Some(10),
                    amount: Some(1000.0),
                    unit_price: Some(100.0),
                    ..Default::default()
                }],
            }]
        );
    }

    #[test]
    fn test_format_receipt_document() {
        let original = json!([{
            "fields": {
                "date": {"value": "2023-11-02"},
                "time": {"value": "09:15:00"},
                "total": {"value": "12.40"},
                "tax": {"value": "bad"},
                "shipTo": {"value": "Jane Doe"},
                "companyName": {"value": "Corner Cafe"},
                "paymentCode": {"value": "AUTH 1234"},
                "cardType": {"value": "VISA"},
                "receiptNo": {"value": 5521},
                "lineItem1Description": {"value": "Latte"},
                "lineItem1LineTotal": {"value": 4.2}
            }
        }]);

        let receipt = format_receipt_document(&original);
        let infos = &receipt.extracted_data[0];
        assert_eq!(infos.date.as_deref(), Some("2023-11-02T09:15:00"));
        assert_eq!(infos.invoice_total, Some(12.4));
        assert_eq!(infos.invoice_subtotal, None);
        assert_eq!(infos.taxes, vec![Taxes { taxes: None, rate: None }]);
        assert_eq!(infos.customer_information.customer_name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            infos.receipt_infos,
            ReceiptInfos {
                payment_code: Some("AUTH 1234".to_string()),
                host: None,
                payment_id: None,
                card_type: Some("VISA".to_string()),
                receipt_number: Some("5521".to_string()),
            }
        );
        assert_eq!(
            infos.item_lines,
            vec![LineItem {
                description: "Latte".to_string(),
                quantity: None,
                amount: Some(4.2),
                unit_price: None,
            }]
        );
    }

    #[test]
    fn test_missing_fields_yield_nulls() {
        for original in [json!([{"fields": {}}]), json!([{}]), json!([]), json!({"oops": 1})] {
            let invoice = format_invoice_document(&original);
            let infos = &invoice.extracted_data[0];
            assert_eq!(infos.invoice_number, None);
            assert_eq!(infos.date, None);
            assert_eq!(infos.taxes, vec![TaxesInvoice::default()]);
            assert!(infos.item_lines.is_empty());

            let receipt = format_receipt_document(&original);
            assert_eq!(receipt.extracted_data.len(), 1);
            assert_eq!(receipt.extracted_data[0].receipt_infos, ReceiptInfos::default());
        }
    }

    #[tokio::test]
    async fn test_invoice_request_shape() {
        let transport = MockTransport::new(200, invoice_response().to_string());
        let provider = provider(transport.clone());

        let result = provider.invoice_parser(&png(), Some("en")).await.unwrap();
        assert_eq!(result.original_response(), &invoice_response());
        assert_eq!(
            result.standardized_response().extracted_data[0].invoice_number.as_deref(),
            Some("INV-001")
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let (url, key, body) = &requests[0];
        assert_eq!(url, "https://vendor.test/api/scan");
        assert_eq!(key, "ApiKey test@example.com:secret");
        assert_eq!(
            body,
            &json!({
                "modelTypes": ["finance/invoice"],
                "image": "data:image/png;base64,cG5n"
            })
        );
    }

    #[tokio::test]
    async fn test_receipt_uses_receipt_model() {
        let transport = MockTransport::new(200, r#"[{"fields": {}}]"#);
        let provider = provider(transport.clone());

        provider.receipt_parser(&png(), None).await.unwrap();
        assert_eq!(
            transport.requests()[0].2["modelTypes"],
            json!(["finance/receipt"])
        );
    }

    #[tokio::test]
    async fn test_non_200_is_provider_failure() {
        let transport = MockTransport::new(400, "invalid image");
        let provider = provider(transport);

        let err = provider.invoice_parser(&png(), None).await.unwrap_err();
        assert!(matches!(&err, ProviderError::ProviderFailure(msg) if msg == "invalid image"));
        assert_eq!(err.to_string(), "invalid image");
    }

    #[tokio::test]
    async fn test_non_json_success_is_provider_failure() {
        let transport = MockTransport::new(200, "<html>oops</html>");
        let provider = provider(transport);

        let err = provider.receipt_parser(&png(), None).await.unwrap_err();
        assert!(matches!(err, ProviderError::ProviderFailure(_)));
    }

    #[tokio::test]
    async fn test_ocr_is_deprecated_without_network() {
        let transport = MockTransport::new(200, "[]");
        let provider = provider(transport.clone());

        let err = provider.ocr(&png(), Some("en")).await.unwrap_err();
        assert!(matches!(err, ProviderError::DeprecatedFeature(_)));
        assert!(err.to_string().contains("You won't be charged"));
        assert!(transport.requests().is_empty());
    }

    fn identity_response() -> Value {
        json!([
            {
                "fields": {
                    "documentType": {"value": "passport"},
                    "familyName": {"value": "Smith"},
                    "givenName": {"value": "John Paul"},
                    "dateOfBirth": {"value": "1980-02-01"},
                    "countryCode": {"value": "GBR"},
                    "documentNumber": {"value": "123456789"},
                    "age": {"value": 44},
                    "sex": {"value": "M"},
                    "expirationDate": {"value": "2030-01-01"}
                },
                "features": {
                    "faces": [{"image": "data:image/png;base64,FACE"}, {"confidence": 0.2}],
                    "signatures": [{"image": "data:image/png;base64,SIG"}]
                }
            },
            {
                "fields": {
                    "givenName": {"value": ""},
                    "countryCode": {"value": ""}
                },
                "features": {}
            }
        ])
    }

    #[test]
    fn test_format_identity_documents() {
        let identity = format_identity_documents(&identity_response());
        assert_eq!(identity.extracted_data.len(), 2);

        let first = &identity.extracted_data[0];
        assert_eq!(first.given_names, vec!["John", "Paul"]);
        assert_eq!(first.last_name.as_deref(), Some("Smith"));
        assert_eq!(first.age, Some(44));
        assert_eq!(
            first.country,
            Some(InfoCountry {
                name: "United Kingdom of Great Britain and Northern Ireland".to_string(),
                alpha2: "GB".to_string(),
                alpha3: "GBR".to_string(),
            })
        );
        assert_eq!(first.image_id, vec!["data:image/png;base64,FACE"]);
        assert_eq!(first.image_signature, vec!["data:image/png;base64,SIG"]);
        assert_eq!(first.issuance_date, None);

        let second = &identity.extracted_data[1];
        assert!(second.given_names.is_empty());
        assert_eq!(second.country, None);
        assert!(second.image_id.is_empty());
        assert!(second.image_signature.is_empty());
    }

    #[test]
    fn test_identity_without_features_or_fields() {
        let identity = format_identity_documents(&json!([{}]));
        assert_eq!(
            identity.extracted_data,
            vec![InfosIdentityParserDataClass::default()]
        );
        assert!(format_identity_documents(&json!("nope")).extracted_data.is_empty());
    }

    #[tokio::test]
    async fn test_identity_request_and_result() {
        let transport = MockTransport::new(200, identity_response().to_string());
        let provider = provider(transport.clone());
        let file = DocumentFile::new("passport.jpg", b"id".to_vec());

        let result = provider
            .identity_parser(&file, Some("passport.jpg"))
            .await
            .unwrap();
        assert_eq!(result.standardized_response().extracted_data.len(), 2);
        assert_eq!(
            transport.requests()[0].2,
            json!({"image": "data:image/jpeg;base64,aWQ="})
        );
    }

    #[tokio::test]
    async fn test_identity_failure_uses_vendor_message() {
        let transport = MockTransport::new(401, r#"{"message": "Invalid API key"}"#);
        let err = provider(transport)
            .identity_parser(&png(), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid API key");

        let transport = MockTransport::new(502, "Bad Gateway");
        let err = provider(transport)
            .identity_parser(&png(), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");
    }
}
