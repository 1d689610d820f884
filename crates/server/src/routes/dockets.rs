//! Docket generation: JSON and a printable HTML page.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use flowrite_core::{Amount, Docket, DocketLine};

use crate::error::Result;
use crate::extract::ApiQuery;
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::services::records::DocketQuery;
use crate::state::AppState;

/// Docket line view for the print template.
#[derive(Debug, Clone)]
pub struct PrintLineView {
    pub date: String,
    pub time: String,
    pub address: String,
    pub order_details: String,
    pub rego: String,
    pub amount: String,
}

impl From<&DocketLine> for PrintLineView {
    fn from(line: &DocketLine) -> Self {
        Self {
            date: line.date.format("%d/%m/%Y").to_string(),
            time: line.time.to_string(),
            address: line.address.clone(),
            order_details: line.order_details.clone(),
            rego: line.rego.clone(),
            amount: format_amount(line.amount),
        }
    }
}

/// Printable docket page.
#[derive(Template)]
#[template(path = "docket.html")]
pub struct DocketPrintTemplate {
    pub docket_number: String,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub period: String,
    pub line_items: Vec<PrintLineView>,
    pub total: String,
    pub generated_at: String,
}

impl From<&Docket> for DocketPrintTemplate {
    fn from(docket: &Docket) -> Self {
        let contact = docket.customer_contact.as_ref();
        Self {
            docket_number: docket.docket_number.clone(),
            customer_name: docket.customer_name.clone(),
            email: contact
                .and_then(|c| c.email.as_ref())
                .map(|e| e.as_str().to_owned()),
            phone: contact.and_then(|c| c.phone.clone()),
            address: contact.and_then(|c| c.address.clone()),
            period: format!(
                "{} to {}",
                docket.period.start.format("%d/%m/%Y"),
                docket.period.end.format("%d/%m/%Y")
            ),
            line_items: docket.line_items.iter().map(PrintLineView::from).collect(),
            total: format_amount(docket.total),
            generated_at: docket.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

fn format_amount(amount: Amount) -> String {
    format!("${:.2}", amount.as_decimal())
}

/// `GET /api/dockets?customerName&startDate&endDate[&order]`
#[instrument(skip(state))]
pub async fn show(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DocketQuery>,
) -> Result<ApiResponse<Docket>> {
    Ok(ApiResponse::ok(state.records().docket(owner, query).await?))
}

/// `GET /api/dockets/print?...`
#[instrument(skip(state))]
pub async fn print(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DocketQuery>,
) -> Result<Html<String>> {
    let docket = state.records().docket(owner, query).await?;
    Ok(Html(DocketPrintTemplate::from(&docket).render()?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("350".parse().unwrap()), "$350.00");
        assert_eq!(format_amount("12.5".parse().unwrap()), "$12.50");
    }
}
