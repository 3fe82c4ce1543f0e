use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::cache::PageCache;
use crate::domain::product::LOW_STOCK_THRESHOLD;
use crate::forms::inventory::{AddProductForm, UpdateStockForm};
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, cache_key, cached_page, flash_service_error, page_error, parse_query, redirect,
    render_cached, render_template,
};
use crate::services::inventory::{self, ProductsQuery};

#[get("/inventory")]
pub async fn show_inventory(
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

    let query = parse_query::<ProductsQuery>(&req).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed inventory query: {err}");
        ProductsQuery::default()
    });

    match inventory::load_inventory_page(repo.get_ref(), query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "inventory");
            context.insert("products", &data.products);
            context.insert("stats", &data.stats);
            context.insert("categories", &data.categories);
            context.insert("search", &data.search);
            context.insert("category", &data.category);
            context.insert("low_stock_threshold", &data.low_stock_threshold);
            render_cached(&tera, "inventory/index.html", &context, &cache, key)
        }
        Err(err) => page_error(err, "list products", &tera, &flash_messages),
    }
}

#[get("/inventory/new")]
pub async fn new_product(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, "inventory");
    render_template(&tera, "inventory/new.html", &context)
}

#[get("/inventory/{product_id}")]
pub async fn show_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match inventory::get_product(repo.get_ref(), product_id.into_inner()) {
        Ok(product) => {
            let mut context = base_context(&flash_messages, "inventory");
            context.insert("product", &product);
            context.insert("low_stock_threshold", &LOW_STOCK_THRESHOLD);
            render_template(&tera, "inventory/show.html", &context)
        }
        Err(err) => page_error(err, "load product", &tera, &flash_messages),
    }
}

#[post("/inventory")]
pub async fn add_product(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<AddProductForm>,
) -> impl Responder {
    match inventory::create_product(repo.get_ref(), form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("Product {} created.", mutation.value.name)).send();
            redirect(&format!("/inventory/{}", mutation.value.id))
        }
        Err(err) => {
            flash_service_error(&err, "create product");
            redirect("/inventory/new")
        }
    }
}

#[post("/inventory/{product_id}/stock")]
pub async fn update_stock(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<UpdateStockForm>,
) -> impl Responder {
    let product_id = product_id.into_inner();

    match inventory::update_product_stock(repo.get_ref(), product_id, form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!(
                "Stock for {} set to {}.",
                mutation.value.name, mutation.value.current_stock
            ))
            .send();
        }
        Err(err) => flash_service_error(&err, "update stock"),
    }

    redirect(&format!("/inventory/{product_id}"))
}
