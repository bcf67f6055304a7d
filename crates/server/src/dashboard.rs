//! Stock dashboard and its CSV export.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use csv::Writer;
use serde::Serialize;

use crate::{
    ServerError, ServerState,
    page::{self, NoticeKind},
};
use inventory::{AggregateSummary, DashboardView, GroupKey, MessageKind, OptionsProvider};

const FORM_ID: &str = "dashboard";

pub(crate) async fn show(State(state): State<ServerState>) -> Result<Response, ServerError> {
    let options = state.controller.options();
    let title = options.form_title(FORM_ID)?;

    let (status, body) = match state.controller.dashboard().await {
        DashboardView::Failed { message } => (
            StatusCode::BAD_GATEWAY,
            page::notice(NoticeKind::Error, &message),
        ),
        DashboardView::Ready(summary) if summary.is_empty() => {
            let text = options.message_or(MessageKind::NoData, "no data");
            (StatusCode::OK, page::notice(NoticeKind::Warning, &text))
        }
        DashboardView::Ready(summary) => (StatusCode::OK, tables(options.as_ref(), &summary)?),
    };

    Ok((status, state.layout(&title, &body)).into_response())
}

fn tables(options: &dyn OptionsProvider, summary: &AggregateSummary) -> Result<String, ServerError> {
    let label = |field: &str| options.label_for(FORM_ID, field).map(|l| page::escape(&l));
    let animal = label("animal_type")?;
    let category = label("category")?;
    let inbound = label("inbound")?;
    let outbound = label("outbound")?;
    let net = label("net")?;
    let weight = label("weight")?;

    let mut html = format!(
        "<table><thead><tr><th>{animal}</th><th>{inbound}</th><th>{outbound}</th><th>{net}</th></tr></thead><tbody>"
    );
    for (animal_type, totals) in summary.by_animal() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><strong>{}</strong></td></tr>",
            page::escape(&animal_type),
            totals.inbound,
            totals.outbound,
            totals.net()
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        "<table><thead><tr><th>{animal}</th><th>{category}</th><th>{inbound}</th><th>{outbound}</th><th>{net}</th><th>{weight}</th></tr></thead><tbody>"
    ));
    for (key, totals) in summary.groups() {
        let kg = estimate(options, summary, key)
            .map_or_else(|| "-".to_string(), |kg| format!("{kg:.0}"));
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{kg}</td></tr>",
            page::escape(&key.animal_type),
            page::escape(&key.category),
            totals.inbound,
            totals.outbound,
            totals.net()
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        "<h2>{}</h2><table><thead><tr><th>{}</th><th>{inbound}</th><th>{outbound}</th></tr></thead><tbody>",
        label("daily")?,
        label("date")?
    ));
    for (date, totals) in summary.by_date() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            date.format("%d/%m/%Y"),
            totals.inbound,
            totals.outbound
        ));
    }
    html.push_str("</tbody></table>");

    let mut vendors = summary.by_vendor().peekable();
    if vendors.peek().is_some() {
        html.push_str(&format!(
            "<h2>{}</h2><table><thead><tr><th>{}</th><th>{animal}</th><th>{category}</th><th>{}</th><th>{}</th></tr></thead><tbody>",
            label("vendors")?,
            label("vendor")?,
            label("delivered")?,
            label("deliveries")?
        ));
        for (key, deliveries) in vendors {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                page::escape(&key.vendor),
                page::escape(&key.animal_type),
                page::escape(&key.category),
                deliveries.delivered,
                deliveries.deliveries
            ));
        }
        html.push_str("</tbody></table>");
    }

    html.push_str(&format!(
        r#"<p><a href="/dashboard.csv">{}</a></p>"#,
        label("export")?
    ));
    Ok(html)
}

/// Estimated weight of a group. `None` for animal types or categories no
/// longer configured.
fn estimate(options: &dyn OptionsProvider, summary: &AggregateSummary, key: &GroupKey) -> Option<f64> {
    let categories = options.categories_for(&key.animal_type).ok()?;
    summary.estimated_weight(key, &categories)
}

#[derive(Serialize)]
struct ExportRow<'a> {
    animal_type: &'a str,
    category: &'a str,
    inbound: u64,
    outbound: u64,
    net: i64,
    estimated_weight_kg: Option<f64>,
}

pub(crate) async fn export_csv(State(state): State<ServerState>) -> Result<Response, ServerError> {
    let summary = match state.controller.dashboard().await {
        DashboardView::Ready(summary) => summary,
        DashboardView::Failed { message } => return Err(ServerError::Remote(message)),
    };
    let options = state.controller.options();

    let mut writer = Writer::from_writer(vec![]);
    for (key, totals) in summary.groups() {
        writer
            .serialize(ExportRow {
                animal_type: &key.animal_type,
                category: &key.category,
                inbound: totals.inbound,
                outbound: totals.outbound,
                net: totals.net(),
                estimated_weight_kg: estimate(options.as_ref(), &summary, key),
            })
            .map_err(|err| {
                tracing::error!("failed to serialize export row: {err}");
                ServerError::Generic("failed to build the export".to_string())
            })?;
    }
    let data = writer.into_inner().map_err(|err| {
        tracing::error!("failed to finalize export: {err}");
        ServerError::Generic("failed to build the export".to_string())
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                r#"attachment; filename="stok_kandang.csv""#,
            ),
        ],
        data,
    )
        .into_response())
}
