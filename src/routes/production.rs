use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::cache::PageCache;
use crate::domain::process::ProcessStatus;
use crate::domain::work_order::WorkOrderStatus;
use crate::forms::production::{
    ConsumptionForm, OutputForm, ProcessForm, UpdateWorkOrderStatusForm, WorkOrderForm,
};
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, cache_key, cached_page, flash_service_error, page_error, parse_nested_form,
    parse_query, redirect, render_cached, render_template,
};
use crate::services::production::{self, WorkOrdersQuery};

#[get("/production")]
pub async fn show_production(
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

    let query = parse_query::<WorkOrdersQuery>(&req).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed production query: {err}");
        WorkOrdersQuery::default()
    });

    match production::load_production_page(repo.get_ref(), query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "production");
            context.insert("work_orders", &data.work_orders);
            context.insert("stats", &data.stats);
            context.insert("selected_statuses", &data.selected_statuses);
            context.insert("statuses", &WorkOrderStatus::ALL);
            context.insert("search", &data.search);
            context.insert("overdue_ids", &data.overdue_ids);
            render_cached(&tera, "production/index.html", &context, &cache, key)
        }
        Err(err) => page_error(err, "list work orders", &tera, &flash_messages),
    }
}

#[get("/production/new")]
pub async fn new_work_order(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match production::load_new_work_order_page(repo.get_ref()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "production");
            context.insert("orders", &data.orders);
            context.insert("materials", &data.materials);
            context.insert("products", &data.products);
            context.insert("users", &data.users);
            context.insert("statuses", &WorkOrderStatus::ACTIVE);
            render_template(&tera, "production/new.html", &context)
        }
        Err(err) => page_error(err, "load work order form", &tera, &flash_messages),
    }
}

#[get("/production/{work_order_id}")]
pub async fn show_work_order(
    work_order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match production::load_work_order_page(repo.get_ref(), work_order_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "production");
            context.insert("work_order", &data.work_order);
            context.insert("transitions", &data.transitions);
            context.insert("can_record_progress", &data.can_record_progress);
            context.insert("process_statuses", &ProcessStatus::ALL);
            render_template(&tera, "production/show.html", &context)
        }
        Err(err) => page_error(err, "load work order", &tera, &flash_messages),
    }
}

#[post("/production")]
pub async fn add_work_order(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    body: String,
) -> impl Responder {
    let form: WorkOrderForm = match parse_nested_form(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Rejected malformed work order form: {err}");
            FlashMessage::error("The work order form could not be read.").send();
            return redirect("/production/new");
        }
    };

    match production::create_work_order(repo.get_ref(), form, &mut rand::thread_rng()) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!(
                "Work order {} created.",
                mutation.value.work_order_number
            ))
            .send();
            redirect(&format!("/production/{}", mutation.value.id))
        }
        Err(err) => {
            flash_service_error(&err, "create work order");
            redirect("/production/new")
        }
    }
}

#[post("/production/{work_order_id}/status")]
pub async fn change_work_order_status(
    work_order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<UpdateWorkOrderStatusForm>,
) -> impl Responder {
    let work_order_id = work_order_id.into_inner();

    match production::update_work_order_status(repo.get_ref(), work_order_id, form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!(
                "Work order {} is now {}.",
                mutation.value.work_order_number,
                mutation.value.status.label()
            ))
            .send();
        }
        Err(err) => flash_service_error(&err, "update work order status"),
    }

    redirect(&format!("/production/{work_order_id}"))
}

#[post("/production/{work_order_id}/processes")]
pub async fn add_process(
    work_order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<ProcessForm>,
) -> impl Responder {
    let work_order_id = work_order_id.into_inner();

    match production::record_process(repo.get_ref(), work_order_id, form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("{} recorded.", mutation.value.process_type)).send();
        }
        Err(err) => flash_service_error(&err, "record process"),
    }

    redirect(&format!("/production/{work_order_id}"))
}

#[post("/production/{work_order_id}/materials/{line_id}/consume")]
pub async fn consume_material(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<ConsumptionForm>,
) -> impl Responder {
    let (work_order_id, line_id) = path.into_inner();

    match production::record_material_consumption(repo.get_ref(), work_order_id, line_id, form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!(
                "Consumed {} of {} planned.",
                mutation.value.consumed, mutation.value.quantity
            ))
            .send();
        }
        Err(err) => flash_service_error(&err, "record consumption"),
    }

    redirect(&format!("/production/{work_order_id}"))
}

#[post("/production/{work_order_id}/products/{line_id}/produce")]
pub async fn produce_output(
    path: web::Path<(i32, i32)>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<OutputForm>,
) -> impl Responder {
    let (work_order_id, line_id) = path.into_inner();

    match production::record_production_output(repo.get_ref(), work_order_id, line_id, form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!(
                "Produced {} of {} planned.",
                mutation.value.produced_quantity, mutation.value.planned_quantity
            ))
            .send();
        }
        Err(err) => flash_service_error(&err, "record output"),
    }

    redirect(&format!("/production/{work_order_id}"))
}
