use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::cache::PageCache;
use crate::forms::materials::{MaterialForm, UploadMaterialsForm};
use crate::repository::DieselRepository;
use crate::routes::{
    base_context, cache_key, cached_page, flash_service_error, page_error, parse_query, redirect,
    render_cached, render_template,
};
use crate::services::materials::{self, MaterialsQuery};

#[get("/materials")]
pub async fn show_materials(
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

    let query = parse_query::<MaterialsQuery>(&req).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed materials query: {err}");
        MaterialsQuery::default()
    });

    match materials::load_materials_page(repo.get_ref(), query) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "materials");
            context.insert("materials", &data.materials);
            context.insert("suppliers", &data.suppliers);
            context.insert("search", &data.search);
            context.insert("supplier_id", &data.supplier_id);
            context.insert("low_stock", &data.low_stock);
            render_cached(&tera, "materials/index.html", &context, &cache, key)
        }
        Err(err) => page_error(err, "list materials", &tera, &flash_messages),
    }
}

#[get("/materials/new")]
pub async fn new_material(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match materials::load_material_form(repo.get_ref(), None) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "materials");
            context.insert("material", &data.material);
            context.insert("suppliers", &data.suppliers);
            render_template(&tera, "materials/form.html", &context)
        }
        Err(err) => page_error(err, "load material form", &tera, &flash_messages),
    }
}

#[get("/materials/{material_id}")]
pub async fn edit_material(
    material_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match materials::load_material_form(repo.get_ref(), Some(material_id.into_inner())) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "materials");
            context.insert("material", &data.material);
            context.insert("suppliers", &data.suppliers);
            render_template(&tera, "materials/form.html", &context)
        }
        Err(err) => page_error(err, "load material", &tera, &flash_messages),
    }
}

#[post("/materials")]
pub async fn add_material(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<MaterialForm>,
) -> impl Responder {
    match materials::create_material(repo.get_ref(), form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("Material {} created.", mutation.value.name)).send();
            redirect("/materials")
        }
        Err(err) => {
            flash_service_error(&err, "create material");
            redirect("/materials/new")
        }
    }
}

#[post("/materials/upload")]
pub async fn upload_materials(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    MultipartForm(form): MultipartForm<UploadMaterialsForm>,
) -> impl Responder {
    match materials::import_materials(repo.get_ref(), form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("Imported {} materials.", mutation.value)).send();
        }
        Err(err) => flash_service_error(&err, "import materials"),
    }

    redirect("/materials")
}

#[post("/materials/{material_id}")]
pub async fn update_material(
    material_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<MaterialForm>,
) -> impl Responder {
    let material_id = material_id.into_inner();

    match materials::update_material(repo.get_ref(), material_id, form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("Material {} updated.", mutation.value.name)).send();
            redirect("/materials")
        }
        Err(err) => {
            flash_service_error(&err, "update material");
            redirect(&format!("/materials/{material_id}"))
        }
    }
}

#[post("/materials/{material_id}/delete")]
pub async fn delete_material(
    material_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
) -> impl Responder {
    let material_id = material_id.into_inner();

    match materials::delete_material(repo.get_ref(), material_id) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success("Material deleted.").send();
            redirect("/materials")
        }
        Err(err) => {
            flash_service_error(&err, "delete material");
            redirect(&format!("/materials/{material_id}"))
        }
    }
}
