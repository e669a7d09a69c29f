//! Priority-style OData ERP client.
//!
//! The ERP exposes purchase orders as `PORDERS` entities with a
//! `PORDERITEMS_SUBFORM` line expansion. Shipping charges travel as regular
//! lines whose part name carries the shipping prefix; they are folded into
//! the reference order's expected shipping cost instead of its goods list.
//! Write-back PATCHes each goods line's requested date (addressed by its
//! `KLINE` key) and then the order status descriptor.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{instrument, warn};

use ordermatch_core::{Money, OrderIdentifier, PartCode, ReconcileError, ReconcileResult};
use ordermatch_reconcile::{LineItemReference, OrderStatus, ReferenceOrder};

use crate::collaborators::ErpSource;

/// ERP requested dates are midnight timestamps in the ERP's local offset.
const ERP_DATE_SUFFIX: &str = "T00:00:00+03:00";

/// OData endpoint configuration.
#[derive(Debug, Clone)]
pub struct ErpConfig {
    /// Base URL of the OData service.
    pub base_url: String,
    /// Pre-encoded Basic credentials.
    pub auth_token: String,
    /// Environment path segment, e.g. `"tabula.ini/acme01"`.
    pub environment: String,
    /// Currency scale used when converting wire decimals to minor units.
    pub currency_scale: u8,
    /// Status descriptor written for a clean order.
    pub approval_status_label: String,
    /// Status descriptor written for an order sent back to the supplier.
    pub review_status_label: String,
}

impl ErpConfig {
    /// Configuration with the ERP's stock status descriptors.
    pub fn new(
        base_url: impl Into<String>,
        auth_token: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: auth_token.into(),
            environment: environment.into(),
            currency_scale: 2,
            approval_status_label: "אישור ספק".to_owned(),
            review_status_label: "נשלח לספק".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    value: Vec<OrderRecord>,
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    #[serde(rename = "ORDNAME")]
    #[allow(dead_code)]
    order_name: String,
    #[serde(rename = "TOTPRICE", default)]
    total_price: f64,
    #[serde(rename = "ED_REQDATE", default)]
    requested_date: Option<String>,
    #[serde(rename = "PORDERITEMS_SUBFORM", default)]
    items: Vec<OrderLineRecord>,
}

#[derive(Debug, Deserialize)]
struct OrderLineRecord {
    #[serde(rename = "PARTNAME")]
    part_name: String,
    #[serde(rename = "TQUANT", default)]
    quantity: f64,
    #[serde(rename = "VATPRICE", default)]
    line_total: f64,
    #[serde(rename = "KLINE", default)]
    line_key: Option<i64>,
}

/// ERP client over the OData API.
#[derive(Debug, Clone)]
pub struct ODataErpClient {
    http: reqwest::Client,
    config: ErpConfig,
}

impl ODataErpClient {
    pub fn new(config: ErpConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn orders_url(&self) -> String {
        format!(
            "{}/odata/Priority/{}/PORDERS",
            self.config.base_url.trim_end_matches('/'),
            self.config.environment
        )
    }

    fn order_query_url(&self, identifier: &OrderIdentifier) -> String {
        format!(
            "{}?$filter=ORDNAME eq '{identifier}'\
             &$select=ORDNAME,CURDATE,STATDES,TOTPRICE,ED_REQDATE\
             &$expand=PORDERITEMS_SUBFORM($select=PARTNAME,TQUANT,PRICE,VATPRICE,REQDATE,KLINE)",
            self.orders_url()
        )
    }

    async fn fetch_record(&self, identifier: &OrderIdentifier) -> ReconcileResult<OrderRecord> {
        let response = self
            .http
            .get(self.order_query_url(identifier))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", self.config.auth_token),
            )
            .send()
            .await
            .map_err(|e| ReconcileError::upstream(format!("ERP query failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ReconcileError::upstream(format!(
                "ERP query returned {}",
                response.status()
            )));
        }

        let envelope: OrdersEnvelope = response
            .json()
            .await
            .map_err(|e| ReconcileError::upstream(format!("ERP payload malformed: {e}")))?;

        envelope
            .value
            .into_iter()
            .next()
            .ok_or_else(|| ReconcileError::not_found(identifier.as_str()))
    }

    async fn patch(
        &self,
        url: String,
        body: serde_json::Value,
        what: &str,
    ) -> ReconcileResult<()> {
        let response = self
            .http
            .patch(url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", self.config.auth_token),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| ReconcileError::upstream(format!("{what} update failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ReconcileError::upstream(format!(
                "{what} update returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn status_label(&self, status: OrderStatus) -> &str {
        match status {
            OrderStatus::SupplierApproval => &self.config.approval_status_label,
            OrderStatus::SentToSupplier => &self.config.review_status_label,
        }
    }
}

#[async_trait]
impl ErpSource for ODataErpClient {
    #[instrument(skip(self), fields(identifier = %identifier))]
    async fn fetch_reference(
        &self,
        identifier: &OrderIdentifier,
    ) -> ReconcileResult<ReferenceOrder> {
        let record = self.fetch_record(identifier).await?;
        Ok(reference_from_record(
            record,
            identifier,
            self.config.currency_scale,
        ))
    }

    #[instrument(skip(self), fields(identifier = %identifier))]
    async fn update_order(
        &self,
        identifier: &OrderIdentifier,
        delivery_date: NaiveDate,
        status: OrderStatus,
    ) -> ReconcileResult<()> {
        // Line keys are wire detail, not kept on the domain record; re-read.
        let record = self.fetch_record(identifier).await?;
        let wire_date = format!("{}{ERP_DATE_SUFFIX}", delivery_date.format("%Y-%m-%d"));

        for line in &record.items {
            if PartCode::new(line.part_name.as_str()).is_shipping() {
                continue;
            }
            let Some(line_key) = line.line_key else {
                warn!(part = %line.part_name, "line without KLINE, skipping date update");
                continue;
            };
            let url = format!(
                "{}(ORDNAME='{identifier}')/PORDERITEMS_SUBFORM({line_key})",
                self.orders_url()
            );
            self.patch(
                url,
                serde_json::json!({ "REQDATE": wire_date }),
                "line delivery date",
            )
            .await?;
        }

        let url = format!("{}(ORDNAME='{identifier}')", self.orders_url());
        self.patch(
            url,
            serde_json::json!({ "STATDES": self.status_label(status) }),
            "order status",
        )
        .await?;
        Ok(())
    }
}

/// Map a wire record into the immutable domain reference.
fn reference_from_record(
    record: OrderRecord,
    identifier: &OrderIdentifier,
    scale: u8,
) -> ReferenceOrder {
    let mut line_items = Vec::new();
    let mut shipping_minor: Option<i64> = None;

    for line in record.items {
        let part_code = PartCode::new(line.part_name);
        let amount = Money::from_f64(line.line_total, scale);
        if part_code.is_shipping() {
            shipping_minor = Some(
                shipping_minor
                    .unwrap_or(0)
                    .saturating_add(amount.minor_units()),
            );
        } else {
            line_items.push(LineItemReference {
                part_code,
                expected_price: amount,
                expected_quantity: line.quantity.round() as i64,
            });
        }
    }

    ReferenceOrder {
        identifier: identifier.clone(),
        line_items,
        expected_shipping_cost: shipping_minor.map(|minor| Money::from_minor_units(minor, scale)),
        expected_total_price: Money::from_f64(record.total_price, scale),
        expected_delivery_date: record
            .requested_date
            .as_deref()
            .and_then(parse_wire_date),
        delivery_address: None,
    }
}

/// Wire dates arrive as `YYYY-MM-DDTHH:MM:SS+03:00`; only the day matters.
fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}
