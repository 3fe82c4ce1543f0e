//! Helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use textile_erp::db::{DbPool, establish_connection_pool, run_migrations};
use textile_erp::domain::customer::{Customer, NewCustomer};
use textile_erp::domain::material::{Material, MaterialDraft};
use textile_erp::domain::product::{NewProduct, Product};
use textile_erp::domain::supplier::{NewSupplier, Supplier};
use textile_erp::domain::user::{NewUser, User};
use textile_erp::repository::{
    CustomerWriter, DieselRepository, MaterialWriter, ProductWriter, SupplierWriter, UserWriter,
};

/// Temporary database used in integration tests.
///
/// The file lives in its own temporary directory, removed on drop together
/// with the WAL side files.
pub struct TestDb {
    pool: DbPool,
    path: PathBuf,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);
        let url = path.to_str().expect("Temporary path is not UTF-8.").to_string();

        let pool = establish_connection_pool(&url).expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");

        TestDb {
            pool,
            path,
            _dir: dir,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

/// Reference rows most tests need.
pub struct Seed {
    pub user: User,
    pub customer: Customer,
    pub supplier: Supplier,
    pub product: Product,
    pub material: Material,
}

pub fn seed(repo: &DieselRepository) -> Seed {
    let user = repo
        .create_user(&NewUser::new("Ada Weaver", "ada@example.com"))
        .expect("create user");
    let customer = repo
        .create_customer(&NewCustomer::new("Linen House"))
        .expect("create customer");
    let supplier = repo
        .create_supplier(&NewSupplier::new("Cotton Co"))
        .expect("create supplier");
    let product = repo
        .create_product(&NewProduct::new("Bath Towel", "TW-001", "Towels", 1000).with_stock(25))
        .expect("create product");
    let material = repo
        .create_material(
            &MaterialDraft::new("Cotton Yarn", "Yarn", "kg", 450, supplier.id).with_stock(80.0, 20.0),
        )
        .expect("create material");

    Seed {
        user,
        customer,
        supplier,
        product,
        material,
    }
}
