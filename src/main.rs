use actix_files::Files;
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use dotenvy::dotenv;
use tera::Tera;

use textile_erp::cache::PageCache;
use textile_erp::config::ServerConfig;
use textile_erp::db::{establish_connection_pool, run_migrations};
use textile_erp::repository::DieselRepository;
use textile_erp::routes::api::{
    api_create_material, api_create_order, api_create_quality_check, api_create_work_order,
    api_dashboard, api_delete_material, api_materials, api_order, api_orders, api_product,
    api_products, api_quality_checks, api_stats, api_update_material, api_update_order_status,
    api_update_stock, api_update_work_order_status, api_work_order, api_work_orders, json_config,
};
use textile_erp::routes::directory::{add_supplier, add_user, show_directory};
use textile_erp::routes::inventory::{
    add_product, new_product, show_inventory, show_product, update_stock,
};
use textile_erp::routes::main::show_dashboard;
use textile_erp::routes::materials::{
    add_material, delete_material, edit_material, new_material, show_materials, update_material,
    upload_materials,
};
use textile_erp::routes::production::{
    add_process, add_work_order, change_work_order_status, consume_material, new_work_order,
    produce_output, show_production, show_work_order,
};
use textile_erp::routes::quality::{add_quality_check, show_quality};
use textile_erp::routes::register_filters;
use textile_erp::routes::sales::{
    add_customer, add_order, change_order_status, new_order, show_customers, show_order,
    show_sales,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = ServerConfig::from_env();

    let secret_key = match config.secret_key.as_deref().map(str::as_bytes) {
        Some(bytes) => Key::try_from(bytes).unwrap_or_else(|err| {
            log::warn!("SECRET_KEY is unusable ({err}), generating a random key");
            Key::generate()
        }),
        None => Key::generate(),
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if config.run_migrations {
        match run_migrations(&pool) {
            Ok(applied) => log::info!("Applied {applied} pending migrations"),
            Err(e) => {
                log::error!("Failed to run migrations: {e}");
                std::process::exit(1);
            }
        }
    }

    let repo = DieselRepository::new(pool);
    let cache = PageCache::new();

    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let mut tera = match Tera::new(&config.templates_dir) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Parsing error(s): {e}");
            std::process::exit(1);
        }
    };
    register_filters(&mut tera);

    let address = config.address.clone();
    let port = config.port;
    log::info!("Listening on {address}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(
                web::scope("/api/v1")
                    .app_data(json_config())
                    .service(api_dashboard)
                    .service(api_stats)
                    .service(api_products)
                    .service(api_product)
                    .service(api_update_stock)
                    .service(api_materials)
                    .service(api_create_material)
                    .service(api_update_material)
                    .service(api_delete_material)
                    .service(api_orders)
                    .service(api_order)
                    .service(api_create_order)
                    .service(api_update_order_status)
                    .service(api_work_orders)
                    .service(api_work_order)
                    .service(api_create_work_order)
                    .service(api_update_work_order_status)
                    .service(api_quality_checks)
                    .service(api_create_quality_check),
            )
            .service(show_dashboard)
            .service(show_inventory)
            .service(new_product)
            .service(show_product)
            .service(add_product)
            .service(update_stock)
            .service(show_materials)
            .service(new_material)
            .service(upload_materials)
            .service(edit_material)
            .service(add_material)
            .service(update_material)
            .service(delete_material)
            .service(show_sales)
            .service(new_order)
            .service(show_order)
            .service(add_order)
            .service(change_order_status)
            .service(show_customers)
            .service(add_customer)
            .service(show_production)
            .service(new_work_order)
            .service(show_work_order)
            .service(add_work_order)
            .service(change_work_order_status)
            .service(add_process)
            .service(consume_material)
            .service(produce_output)
            .service(show_quality)
            .service(add_quality_check)
            .service(show_directory)
            .service(add_user)
            .service(add_supplier)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(cache.clone()))
    })
    .bind((address, port))?
    .run()
    .await
}
