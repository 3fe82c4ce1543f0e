use actix_web::{HttpRequest, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::cache::PageCache;
use crate::repository::DieselRepository;
use crate::routes::{base_context, cache_key, cached_page, page_error, render_cached};
use crate::services::dashboard;

#[get("/")]
pub async fn show_dashboard(
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

    match dashboard::load_dashboard(repo.get_ref()) {
        Ok(snapshot) => {
            let mut context = base_context(&flash_messages, "dashboard");
            context.insert("dashboard", &snapshot);
            render_cached(&tera, "main/index.html", &context, &cache, key)
        }
        Err(err) => page_error(err, "load dashboard", &tera, &flash_messages),
    }
}
