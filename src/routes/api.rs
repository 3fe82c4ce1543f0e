//! `/api/v1` JSON actions answering with the [`ActionResponse`] envelope.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, delete, error, get, post, put, web};
use serde::Serialize;

use crate::cache::PageCache;
use crate::forms::inventory::UpdateStockForm;
use crate::forms::materials::MaterialForm;
use crate::forms::production::{UpdateWorkOrderStatusForm, WorkOrderForm};
use crate::forms::quality::QualityCheckForm;
use crate::forms::sales::{OrderForm, UpdateOrderStatusForm};
use crate::repository::DieselRepository;
use crate::routes::parse_query;
use crate::services::production::WorkOrdersQuery;
use crate::services::quality::QualityChecksQuery;
use crate::services::sales::OrdersQuery;
use crate::services::{
    ActionResponse, Mutation, ServiceError, ServiceResult, dashboard, inventory, materials,
    production, quality, sales,
};

/// HTTP status reported alongside a failed envelope.
pub fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Form(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(err: ServiceError, action: &str) -> HttpResponse {
    if let ServiceError::Internal(_) = err {
        log::error!("Failed to {action}: {err}");
    }
    HttpResponse::build(error_status(&err)).json(ActionResponse::<()>::failure(&err, action))
}

fn respond<T: Serialize>(result: ServiceResult<T>, action: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ActionResponse::ok(data)),
        Err(err) => failure(err, action),
    }
}

fn respond_mutation<T: Serialize>(
    result: ServiceResult<Mutation<T>>,
    cache: &PageCache,
    status: StatusCode,
    action: &str,
) -> HttpResponse {
    match result {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            HttpResponse::build(status).json(ActionResponse::ok(mutation.value))
        }
        Err(err) => failure(err, action),
    }
}

/// JSON extractor settings answering malformed bodies with the envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected malformed JSON body: {err}");
        let body = ActionResponse::<()>::failure(
            &ServiceError::Form("The request body could not be read.".to_string()),
            "read request",
        );
        let response = HttpResponse::BadRequest().json(body);
        error::InternalError::from_response(err, response).into()
    })
}

fn query_or_default<T>(req: &HttpRequest) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    parse_query(req).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed API query on {}: {err}", req.path());
        T::default()
    })
}

#[get("/dashboard")]
pub async fn api_dashboard(repo: web::Data<DieselRepository>) -> impl Responder {
    respond(dashboard::load_dashboard(repo.get_ref()), "load dashboard")
}

#[get("/stats")]
pub async fn api_stats(repo: web::Data<DieselRepository>) -> impl Responder {
    respond(dashboard::load_stats(repo.get_ref()), "load statistics")
}

#[get("/products")]
pub async fn api_products(repo: web::Data<DieselRepository>) -> impl Responder {
    respond(inventory::list_products(repo.get_ref()), "list products")
}

#[get("/products/{product_id}")]
pub async fn api_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        inventory::get_product(repo.get_ref(), product_id.into_inner()),
        "load product",
    )
}

#[post("/products/{product_id}/stock")]
pub async fn api_update_stock(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<UpdateStockForm>,
) -> impl Responder {
    respond_mutation(
        inventory::update_product_stock(repo.get_ref(), product_id.into_inner(), form),
        &cache,
        StatusCode::OK,
        "update stock",
    )
}

#[get("/materials")]
pub async fn api_materials(repo: web::Data<DieselRepository>) -> impl Responder {
    respond(materials::list_materials(repo.get_ref()), "list materials")
}

#[post("/materials")]
pub async fn api_create_material(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<MaterialForm>,
) -> impl Responder {
    respond_mutation(
        materials::create_material(repo.get_ref(), form),
        &cache,
        StatusCode::CREATED,
        "create material",
    )
}

#[put("/materials/{material_id}")]
pub async fn api_update_material(
    material_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<MaterialForm>,
) -> impl Responder {
    respond_mutation(
        materials::update_material(repo.get_ref(), material_id.into_inner(), form),
        &cache,
        StatusCode::OK,
        "update material",
    )
}

#[delete("/materials/{material_id}")]
pub async fn api_delete_material(
    material_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
) -> impl Responder {
    respond_mutation(
        materials::delete_material(repo.get_ref(), material_id.into_inner()),
        &cache,
        StatusCode::OK,
        "delete material",
    )
}

#[get("/orders")]
pub async fn api_orders(req: HttpRequest, repo: web::Data<DieselRepository>) -> impl Responder {
    let query: OrdersQuery = query_or_default(&req);
    respond(sales::list_orders(repo.get_ref(), query), "list orders")
}

#[get("/orders/{order_id}")]
pub async fn api_order(
    order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        sales::get_order(repo.get_ref(), order_id.into_inner()),
        "load order",
    )
}

#[post("/orders")]
pub async fn api_create_order(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<OrderForm>,
) -> impl Responder {
    let result = sales::create_order(repo.get_ref(), form, &mut rand::thread_rng());
    respond_mutation(result, &cache, StatusCode::CREATED, "create order")
}

#[post("/orders/{order_id}/status")]
pub async fn api_update_order_status(
    order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<UpdateOrderStatusForm>,
) -> impl Responder {
    respond_mutation(
        sales::update_order_status(repo.get_ref(), order_id.into_inner(), form),
        &cache,
        StatusCode::OK,
        "update order status",
    )
}

#[get("/work-orders")]
pub async fn api_work_orders(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let query: WorkOrdersQuery = query_or_default(&req);
    respond(
        production::list_work_orders(repo.get_ref(), query),
        "list work orders",
    )
}

#[get("/work-orders/{work_order_id}")]
pub async fn api_work_order(
    work_order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(
        production::get_work_order(repo.get_ref(), work_order_id.into_inner()),
        "load work order",
    )
}

#[post("/work-orders")]
pub async fn api_create_work_order(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<WorkOrderForm>,
) -> impl Responder {
    let result = production::create_work_order(repo.get_ref(), form, &mut rand::thread_rng());
    respond_mutation(result, &cache, StatusCode::CREATED, "create work order")
}

#[post("/work-orders/{work_order_id}/status")]
pub async fn api_update_work_order_status(
    work_order_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<UpdateWorkOrderStatusForm>,
) -> impl Responder {
    respond_mutation(
        production::update_work_order_status(repo.get_ref(), work_order_id.into_inner(), form),
        &cache,
        StatusCode::OK,
        "update work order status",
    )
}

#[get("/quality-checks")]
pub async fn api_quality_checks(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let query: QualityChecksQuery = query_or_default(&req);
    respond(
        quality::list_quality_checks(repo.get_ref(), query),
        "list quality checks",
    )
}

#[post("/quality-checks")]
pub async fn api_create_quality_check(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Json(form): web::Json<QualityCheckForm>,
) -> impl Responder {
    respond_mutation(
        quality::create_quality_check(repo.get_ref(), form),
        &cache,
        StatusCode::CREATED,
        "record quality check",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::forms::FieldError;

    #[test]
    fn errors_map_to_http_statuses() {
        assert_eq!(
            error_status(&ServiceError::Validation(vec![FieldError::new("name", "is required")])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(error_status(&ServiceError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            error_status(&ServiceError::InvalidTransition {
                from: OrderStatus::Delivered.to_string(),
                to: OrderStatus::Pending.to_string(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(&ServiceError::Conflict("taken".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&ServiceError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn mutations_evict_their_paths() {
        let cache = PageCache::new();
        cache.insert("/inventory", "<html>".to_string());
        cache.insert("/materials", "<html>".to_string());

        let response = respond_mutation(
            Ok(Mutation::new(3, ["/inventory"])),
            &cache,
            StatusCode::OK,
            "update stock",
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert!(cache.get("/inventory").is_none());
        assert!(cache.get("/materials").is_some());
    }

    #[test]
    fn failed_mutations_keep_the_cache() {
        let cache = PageCache::new();
        cache.insert("/sales", "<html>".to_string());

        let response = respond_mutation::<()>(
            Err(ServiceError::Conflict("taken".into())),
            &cache,
            StatusCode::CREATED,
            "create order",
        );

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(cache.get("/sales").is_some());
    }
}
