use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::cache::PageCache;
use crate::domain::order::OrderStatus;
use crate::forms::sales::{AddCustomerForm, OrderForm, UpdateOrderStatusForm};
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, cache_key, cached_page, flash_service_error, page_error, parse_nested_form,
    parse_query, redirect, render_cached, render_template,
};
use crate::services::sales::{self, OrdersQuery};

#[get("/sales")]
pub async fn show_sales(
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

    let query = parse_query::<OrdersQuery>(&req).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed sales query: {err}");
        OrdersQuery::default()
    });

    match sales::load_sales_page(repo.get_ref(), query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "sales");
            context.insert("orders", &data.orders);
            context.insert("stats", &data.stats);
            context.insert("selected_statuses", &data.selected_statuses);
            context.insert("statuses", &OrderStatus::ALL);
            context.insert("search", &data.search);
            render_cached(&tera, "sales/index.html", &context, &cache, key)
        }
        Err(err) => page_error(err, "list orders", &tera, &flash_messages),
    }
}

#[get("/sales/new")]
pub async fn new_order(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match sales::load_new_order_page(repo.get_ref()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "sales");
            context.insert("customers", &data.customers);
            context.insert("products", &data.products);
            context.insert("users", &data.users);
            context.insert("statuses", &OrderStatus::ALL);
            render_template(&tera, "sales/new.html", &context)
        }
        Err(err) => page_error(err, "load order form", &tera, &flash_messages),
    }
}

#[get("/sales/{order_id}")]
pub async fn show_order(
    order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match sales::load_order_page(repo.get_ref(), order_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "sales");
            context.insert("order", &data.order);
            context.insert("transitions", &data.transitions);
            render_template(&tera, "sales/show.html", &context)
        }
        Err(err) => page_error(err, "load order", &tera, &flash_messages),
    }
}

#[post("/sales")]
pub async fn add_order(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    body: String,
) -> impl Responder {
    let form: OrderForm = match parse_nested_form(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Rejected malformed order form: {err}");
            FlashMessage::error("The order form could not be read.").send();
            return redirect("/sales/new");
        }
    };

    match sales::create_order(repo.get_ref(), form, &mut rand::thread_rng()) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("Order {} created.", mutation.value.order_number)).send();
            redirect(&format!("/sales/{}", mutation.value.id))
        }
        Err(err) => {
            flash_service_error(&err, "create order");
            redirect("/sales/new")
        }
    }
}

#[post("/sales/{order_id}/status")]
pub async fn change_order_status(
    order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<UpdateOrderStatusForm>,
) -> impl Responder {
    let order_id = order_id.into_inner();

    match sales::update_order_status(repo.get_ref(), order_id, form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!(
                "Order {} is now {}.",
                mutation.value.order_number,
                mutation.value.status.label()
            ))
            .send();
        }
        Err(err) => flash_service_error(&err, "update order status"),
    }

    redirect(&format!("/sales/{order_id}"))
}

#[get("/customers")]
pub async fn show_customers(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match sales::list_customers(repo.get_ref()) {
        Ok(customers) => {
            let mut context = base_context(&flash_messages, "customers");
            context.insert("customers", &customers);
            render_template(&tera, "sales/customers.html", &context)
        }
        Err(err) => page_error(err, "list customers", &tera, &flash_messages),
    }
}

#[post("/customers")]
pub async fn add_customer(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<AddCustomerForm>,
) -> impl Responder {
    match sales::create_customer(repo.get_ref(), form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("Customer {} added.", mutation.value.name)).send();
        }
        Err(err) => flash_service_error(&err, "add customer"),
    }

    redirect("/customers")
}
