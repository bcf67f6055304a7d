//! Inbound and outbound transaction forms.

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    ServerError, ServerState,
    page::{self, NoticeKind},
};
use inventory::{Direction, ReceiptFile, SubmissionState, SubmitForm};

const RECEIPT_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FormQuery {
    animal: Option<String>,
}

pub(crate) async fn inbound_form(
    State(state): State<ServerState>,
    Query(query): Query<FormQuery>,
) -> Result<Html<String>, ServerError> {
    render(&state, Direction::Inbound, query.animal.as_deref(), None, None)
}

pub(crate) async fn outbound_form(
    State(state): State<ServerState>,
    Query(query): Query<FormQuery>,
) -> Result<Html<String>, ServerError> {
    render(&state, Direction::Outbound, query.animal.as_deref(), None, None)
}

pub(crate) async fn inbound_submit(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    submit(&state, Direction::Inbound, multipart).await
}

pub(crate) async fn outbound_submit(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    submit(&state, Direction::Outbound, multipart).await
}

async fn submit(
    state: &ServerState,
    direction: Direction,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = read_form(multipart).await?;
    let outcome = state.controller.submit(direction, form.clone()).await;

    let (status, kind) = match &outcome {
        SubmissionState::Success { .. } => (StatusCode::OK, NoticeKind::Success),
        SubmissionState::Failed { .. } => (StatusCode::BAD_GATEWAY, NoticeKind::Error),
        SubmissionState::Idle { .. } | SubmissionState::Submitting => {
            (StatusCode::UNPROCESSABLE_ENTITY, NoticeKind::Warning)
        }
    };
    let notice = outcome.message().map(|text| (kind, text));

    // A successful submission starts a fresh form; otherwise keep the input.
    let html = if outcome.is_success() {
        render(state, direction, Some(&form.animal_type), None, notice)?
    } else {
        render(state, direction, Some(&form.animal_type), Some(&form), notice)?
    };
    Ok((status, html).into_response())
}

async fn read_form(mut multipart: Multipart) -> Result<SubmitForm, ServerError> {
    let mut form = SubmitForm::default();
    let mut quantity = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "receipt" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            check_receipt_name(&file_name)?;
            form.receipt = Some(ReceiptFile {
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "animal_type" => form.animal_type = value,
            "category" => form.category = value,
            "vendor" => form.vendor = Some(value),
            "quantity" => quantity = Some(value),
            "day" => form.day = value,
            "notes" => form.notes = Some(value),
            "receipt_number" => form.receipt_number = Some(value),
            other => tracing::debug!("ignoring form field {other}"),
        }
    }

    let quantity = quantity.unwrap_or_default();
    form.quantity = quantity
        .trim()
        .parse()
        .map_err(|_| ServerError::Generic(format!("quantity is not a number: {quantity:?}")))?;
    Ok(form)
}

fn check_receipt_name(file_name: &str) -> Result<(), ServerError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if RECEIPT_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ServerError::Generic(format!(
            "receipt must be one of {}: {file_name:?}",
            RECEIPT_EXTENSIONS.join(", ")
        )))
    }
}

fn render(
    state: &ServerState,
    direction: Direction,
    animal: Option<&str>,
    previous: Option<&SubmitForm>,
    notice: Option<(NoticeKind, &str)>,
) -> Result<Html<String>, ServerError> {
    let options = state.controller.options();
    let form_id = direction.as_str();
    let label = |field: &str| options.label_for(form_id, field);

    let animals = options.animal_types()?;
    let animal = animal
        .filter(|a| animals.iter().any(|known| known == a))
        .or(animals.first().map(String::as_str))
        .unwrap_or_default()
        .to_string();

    let mut body = String::new();
    if let Some((kind, text)) = notice {
        body.push_str(&page::notice(kind, text));
    }

    let animal_options: Vec<(String, String)> =
        animals.iter().map(|a| (a.clone(), a.clone())).collect();
    body.push_str(&format!(
        r#"<form method="get" action="/{direction}">{}<button type="submit">Pilih</button></form>"#,
        page::select("animal", &label("animal_type")?, &animal_options, Some(&animal)),
    ));

    let categories: Vec<(String, String)> = options
        .categories_for(&animal)?
        .into_iter()
        .map(|c| (c.name.clone(), format!("{} (~{} kg)", c.name, c.weight)))
        .collect();
    let mut vendors = vec![(String::new(), "-".to_string())];
    vendors.extend(
        options
            .vendors_for(&animal)?
            .into_iter()
            .map(|v| (v.clone(), v)),
    );
    let days: Vec<(String, String)> = options
        .day_options(direction)?
        .into_iter()
        .map(|d| (d.label.clone(), format!("{} ({})", d.label, d.date)))
        .collect();

    let kept = |f: fn(&SubmitForm) -> Option<&str>| previous.and_then(f).unwrap_or_default();
    let quantity = previous.map_or(1, |p| p.quantity);

    body.push_str(&format!(
        r#"<form method="post" action="/{direction}" enctype="multipart/form-data">
<input type="hidden" name="animal_type" value="{animal}">
{category}
{vendor}
<label for="quantity">{quantity_label}</label><input id="quantity" name="quantity" type="number" min="1" value="{quantity}">
{day}
<label for="notes">{notes_label}</label><textarea id="notes" name="notes">{notes}</textarea>
<label for="receipt_number">{number_label}</label><input id="receipt_number" name="receipt_number" type="text" value="{number}">
<label for="receipt">{receipt_label}</label><input id="receipt" name="receipt" type="file" accept=".pdf,.png,.jpg,.jpeg">
<p><button type="submit">{submit_label}</button></p>
</form>"#,
        animal = page::escape(&animal),
        category = page::select(
            "category",
            &label("category")?,
            &categories,
            previous.map(|p| p.category.as_str())
        ),
        vendor = page::select(
            "vendor",
            &label("vendor")?,
            &vendors,
            previous.and_then(|p| p.vendor.as_deref())
        ),
        quantity_label = page::escape(&label("quantity")?),
        day = page::select(
            "day",
            &label("day")?,
            &days,
            previous.map(|p| p.day.as_str()).or(Some("H"))
        ),
        notes_label = page::escape(&label("notes")?),
        notes = page::escape(kept(|p| p.notes.as_deref())),
        number_label = page::escape(&label("receipt_number")?),
        number = page::escape(kept(|p| p.receipt_number.as_deref())),
        receipt_label = page::escape(&label("receipt")?),
        submit_label = page::escape(&label("submit")?),
    ));

    Ok(state.layout(&options.form_title(form_id)?, &body))
}
