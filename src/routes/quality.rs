use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::cache::PageCache;
use crate::forms::quality::QualityCheckForm;
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, cache_key, cached_page, flash_service_error, page_error, parse_query, redirect,
    render_cached,
};
use crate::services::quality::{self, QualityChecksQuery};

#[get("/quality")]
pub async fn show_quality(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let key = cache_key(&req, &flash_messages);
    if let Some(response) = cached_page(&cache, key.as_deref()) {
        return response;
    }

    let query = parse_query::<QualityChecksQuery>(&req).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed quality query: {err}");
        QualityChecksQuery::default()
    });

    match quality::load_quality_page(repo.get_ref(), query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "quality");
            context.insert("checks", &data.checks);
            context.insert("work_orders", &data.work_orders);
            context.insert("work_order_id", &data.work_order_id);
            context.insert("passed", &data.passed);
            render_cached(&tera, "quality/index.html", &context, &cache, key)
        }
        Err(err) => page_error(err, "list quality checks", &tera, &flash_messages),
    }
}

#[post("/quality")]
pub async fn add_quality_check(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<QualityCheckForm>,
) -> impl Responder {
    match quality::create_quality_check(repo.get_ref(), form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            let outcome = if mutation.value.passed { "passed" } else { "failed" };
            FlashMessage::success(format!(
                "Checkpoint {} recorded as {outcome}.",
                mutation.value.checkpoint
            ))
            .send();
        }
        Err(err) => flash_service_error(&err, "record quality check"),
    }

    redirect("/quality")
}
