//! HTTP handlers: server-rendered pages and the `/api/v1` JSON actions.

use std::collections::HashMap;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tera::{Context, Tera, Value};

use crate::cache::PageCache;
use crate::domain::money::format_cents;
use crate::domain::order::OrderStatus;
use crate::domain::process::ProcessStatus;
use crate::domain::work_order::WorkOrderStatus;
use crate::services::ServiceError;

pub mod api;
pub mod directory;
pub mod inventory;
pub mod main;
pub mod materials;
pub mod production;
pub mod quality;
pub mod sales;

/// Flash message as exposed to templates.
#[derive(Debug, Serialize)]
struct Alert {
    level: &'static str,
    content: String,
}

fn alert_level(level: Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Template context shared by every page.
pub fn base_context(flash_messages: &IncomingFlashMessages, current_page: &str) -> Context {
    let alerts: Vec<Alert> = flash_messages
        .iter()
        .map(|message| Alert {
            level: alert_level(message.level()),
            content: message.content().to_string(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => html(body),
        Err(err) => {
            log::error!("Failed to render template {template}: {err:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Path under which the current rendering may be cached, if any.
///
/// Requests with a query string or pending flash messages are never cached.
pub fn cache_key(req: &HttpRequest, flash_messages: &IncomingFlashMessages) -> Option<String> {
    let path = req.path();
    let cacheable = req.query_string().is_empty()
        && flash_messages.iter().next().is_none()
        && PageCache::is_cacheable(path);
    cacheable.then(|| path.to_string())
}

/// Serve a cached rendering for `key` when one exists.
pub fn cached_page(cache: &PageCache, key: Option<&str>) -> Option<HttpResponse> {
    key.and_then(|key| cache.get(key)).map(html)
}

/// Render `template` and remember the result under `key`.
pub fn render_cached(
    tera: &Tera,
    template: &str,
    context: &Context,
    cache: &PageCache,
    key: Option<String>,
) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => {
            if let Some(key) = key {
                cache.insert(&key, body.clone());
            }
            html(body)
        }
        Err(err) => {
            log::error!("Failed to render template {template}: {err:?}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn not_found(tera: &Tera, flash_messages: &IncomingFlashMessages) -> HttpResponse {
    let context = base_context(flash_messages, "");
    match tera.render("errors/404.html", &context) {
        Ok(body) => HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(_) => HttpResponse::NotFound().finish(),
    }
}

/// Page response for a failed read.
pub fn page_error(
    err: ServiceError,
    action: &str,
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
) -> HttpResponse {
    match err {
        ServiceError::NotFound => not_found(tera, flash_messages),
        err => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Report a failed form submission through a flash message.
pub fn flash_service_error(err: &ServiceError, action: &str) {
    if let ServiceError::Internal(_) = err {
        log::error!("Failed to {action}: {err}");
    }

    let message = match err {
        ServiceError::Validation(errors) => errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.public_message(action),
    };

    FlashMessage::error(message).send();
}

/// Decode a query string that may repeat keys (`status=A&status=B`).
pub fn parse_query<T>(req: &HttpRequest) -> Result<T, serde::de::value::Error>
where
    T: DeserializeOwned,
{
    serde_html_form::from_str(req.query_string())
}

/// Decode a form body with nested lists (`items[0][product_id]=1`).
pub fn parse_nested_form<T>(body: &str) -> Result<T, serde_qs::Error>
where
    T: DeserializeOwned,
{
    serde_qs::Config::new(5, false).deserialize_str(body)
}

/// Register the `money` and `status_label` filters used by the templates.
pub fn register_filters(tera: &mut Tera) {
    tera.register_filter("money", money_filter);
    tera.register_filter("status_label", status_label_filter);
}

fn money_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let cents = value
        .as_i64()
        .or_else(|| value.as_f64().map(|amount| amount.round() as i64))
        .ok_or_else(|| tera::Error::msg(format!("money filter expects cents, got {value}")))?;
    Ok(Value::String(format_cents(cents)))
}

fn status_label_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("status_label filter expects a string"))?;

    let label = raw
        .parse::<OrderStatus>()
        .map(OrderStatus::label)
        .or_else(|_| raw.parse::<WorkOrderStatus>().map(WorkOrderStatus::label))
        .or_else(|_| raw.parse::<ProcessStatus>().map(ProcessStatus::label))
        .unwrap_or(raw);

    Ok(Value::String(label.to_string()))
}
