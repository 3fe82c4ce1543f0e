use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::cache::PageCache;
use crate::forms::directory::{AddSupplierForm, AddUserForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_service_error, page_error, redirect, render_template};
use crate::services::directory;

#[get("/directory")]
pub async fn show_directory(
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match directory::load_directory_page(repo.get_ref()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, "directory");
            context.insert("users", &data.users);
            context.insert("suppliers", &data.suppliers);
            context.insert("customers", &data.customers);
            render_template(&tera, "directory/index.html", &context)
        }
        Err(err) => page_error(err, "load directory", &tera, &flash_messages),
    }
}

#[post("/users")]
pub async fn add_user(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<AddUserForm>,
) -> impl Responder {
    match directory::create_user(repo.get_ref(), form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("User {} added.", mutation.value.name)).send();
        }
        Err(err) => flash_service_error(&err, "add user"),
    }

    redirect("/directory")
}

#[post("/suppliers")]
pub async fn add_supplier(
    repo: web::Data<DieselRepository>,
    cache: web::Data<PageCache>,
    web::Form(form): web::Form<AddSupplierForm>,
) -> impl Responder {
    match directory::create_supplier(repo.get_ref(), form) {
        Ok(mutation) => {
            cache.invalidate(&mutation.revalidate);
            FlashMessage::success(format!("Supplier {} added.", mutation.value.name)).send();
        }
        Err(err) => flash_service_error(&err, "add supplier"),
    }

    redirect("/directory")
}
