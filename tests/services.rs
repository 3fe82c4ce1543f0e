use std::io::Write;

use actix_multipart::form::tempfile::TempFile;
use rand::SeedableRng;
use rand::rngs::StdRng;

use textile_erp::domain::order::OrderStatus;
use textile_erp::domain::work_order::WorkOrderStatus;
use textile_erp::forms::inventory::UpdateStockForm;
use textile_erp::forms::materials::UploadMaterialsForm;
use textile_erp::forms::production::{
    ConsumptionForm, UpdateWorkOrderStatusForm, WorkOrderForm, WorkOrderMaterialForm,
    WorkOrderProductForm,
};
use textile_erp::forms::quality::QualityCheckForm;
use textile_erp::forms::sales::{OrderForm, OrderItemForm, UpdateOrderStatusForm};
use textile_erp::services::{ServiceError, dashboard, inventory, materials, production, quality, sales};

mod common;

fn order_form(customer_id: i32, created_by_id: i32, product_id: i32) -> OrderForm {
    OrderForm {
        customer_id,
        delivery_date: None,
        status: None,
        created_by_id,
        order_number: None,
        items: vec![
            OrderItemForm {
                product_id,
                quantity: 2,
                unit_price: 15.0,
            },
            OrderItemForm {
                product_id,
                quantity: 1,
                unit_price: 25.0,
            },
        ],
    }
}

fn work_order_form(seed: &common::Seed, order_id: Option<i32>) -> WorkOrderForm {
    WorkOrderForm {
        description: Some("Hemmed towels".to_string()),
        start_date: common::date(3, 1),
        due_date: common::date(3, 20),
        status: None,
        order_id,
        created_by_id: seed.user.id,
        assigned_to_id: None,
        work_order_number: None,
        materials: vec![WorkOrderMaterialForm {
            material_id: seed.material.id,
            quantity: 12.0,
        }],
        products: vec![WorkOrderProductForm {
            product_id: seed.product.id,
            planned_quantity: 40,
        }],
    }
}

#[test]
fn test_order_lifecycle() {
    let test_db = common::TestDb::new("service_orders.db");
    let repo = test_db.repo();
    let seed = common::seed(&repo);
    let mut rng = StdRng::seed_from_u64(11);

    let created = sales::create_order(
        &repo,
        order_form(seed.customer.id, seed.user.id, seed.product.id),
        &mut rng,
    )
    .unwrap();
    let order = created.value;
    assert_eq!(order.total_amount_cents, 5500);
    assert!(order.order_number.starts_with("ORD-"));
    assert!(created.revalidate.contains(&"/sales".to_string()));

    let err = sales::update_order_status(
        &repo,
        order.id,
        UpdateOrderStatusForm {
            status: OrderStatus::Delivered,
        },
    )
    .expect_err("pending orders cannot jump to delivered");
    assert!(matches!(err, ServiceError::InvalidTransition { .. }));

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::ReadyForDelivery,
        OrderStatus::Delivered,
    ] {
        let updated = sales::update_order_status(&repo, order.id, UpdateOrderStatusForm { status })
            .unwrap();
        assert_eq!(updated.value.status, status);
    }

    let page = sales::load_order_page(&repo, order.id).unwrap();
    assert!(page.transitions.is_empty());

    let stats = sales::sales_stats(&repo).unwrap();
    assert_eq!(stats.total_sales_cents, 5500);
}

#[test]
fn test_supplied_order_number_collision_is_a_conflict() {
    let test_db = common::TestDb::new("service_order_numbers.db");
    let repo = test_db.repo();
    let seed = common::seed(&repo);
    let mut rng = StdRng::seed_from_u64(3);

    let mut form = order_form(seed.customer.id, seed.user.id, seed.product.id);
    form.order_number = Some("ORD-2024-123".to_string());
    sales::create_order(&repo, form, &mut rng).unwrap();

    let mut again = order_form(seed.customer.id, seed.user.id, seed.product.id);
    again.order_number = Some("ORD-2024-123".to_string());
    let err = sales::create_order(&repo, again, &mut rng).expect_err("number taken");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn test_work_order_progress_requires_in_progress() {
    let test_db = common::TestDb::new("service_work_orders.db");
    let repo = test_db.repo();
    let seed = common::seed(&repo);
    let mut rng = StdRng::seed_from_u64(5);

    let order = sales::create_order(
        &repo,
        order_form(seed.customer.id, seed.user.id, seed.product.id),
        &mut rng,
    )
    .unwrap()
    .value;

    let created =
        production::create_work_order(&repo, work_order_form(&seed, Some(order.id)), &mut rng)
            .unwrap();
    let work_order = created.value;
    assert_eq!(work_order.status, WorkOrderStatus::Planned);
    assert!(created.revalidate.contains(&format!("/sales/{}", order.id)));

    let line_id = work_order.materials[0].id;
    let err = production::record_material_consumption(
        &repo,
        work_order.id,
        line_id,
        ConsumptionForm { amount: 2.0 },
    )
    .expect_err("planned work orders cannot consume material");
    assert!(matches!(err, ServiceError::Conflict(_)));

    production::update_work_order_status(
        &repo,
        work_order.id,
        UpdateWorkOrderStatusForm {
            status: WorkOrderStatus::InProgress,
        },
    )
    .unwrap();

    production::record_material_consumption(&repo, work_order.id, line_id, ConsumptionForm { amount: 2.0 })
        .unwrap();
    let line = production::record_material_consumption(
        &repo,
        work_order.id,
        line_id,
        ConsumptionForm { amount: 3.0 },
    )
    .unwrap()
    .value;
    assert_eq!(line.consumed, 5.0);

    production::update_work_order_status(
        &repo,
        work_order.id,
        UpdateWorkOrderStatusForm {
            status: WorkOrderStatus::OnHold,
        },
    )
    .unwrap();
    let err = production::update_work_order_status(
        &repo,
        work_order.id,
        UpdateWorkOrderStatusForm {
            status: WorkOrderStatus::Completed,
        },
    )
    .expect_err("on hold work orders must resume first");
    assert!(matches!(err, ServiceError::InvalidTransition { .. }));

    let linked = sales::get_order(&repo, order.id).unwrap();
    assert_eq!(linked.work_orders.len(), 1);
}

#[test]
fn test_quality_checks_and_dashboard() {
    let test_db = common::TestDb::new("service_quality.db");
    let repo = test_db.repo();
    let seed = common::seed(&repo);
    let mut rng = StdRng::seed_from_u64(9);

    let work_order = production::create_work_order(&repo, work_order_form(&seed, None), &mut rng)
        .unwrap()
        .value;

    for passed in [true, false] {
        quality::create_quality_check(
            &repo,
            QualityCheckForm {
                work_order_id: work_order.id,
                checkpoint: "  Stitch density ".to_string(),
                passed,
                notes: None,
                image_url: None,
            },
        )
        .unwrap();
    }

    let err = quality::create_quality_check(
        &repo,
        QualityCheckForm {
            work_order_id: 9_999,
            checkpoint: "Stitch density".to_string(),
            passed: true,
            notes: None,
            image_url: None,
        },
    )
    .expect_err("unknown work order");
    assert!(matches!(err, ServiceError::NotFound));

    let blank = quality::create_quality_check(
        &repo,
        QualityCheckForm {
            work_order_id: work_order.id,
            checkpoint: "   ".to_string(),
            passed: true,
            notes: None,
            image_url: None,
        },
    )
    .unwrap();
    assert_eq!(blank.value.checkpoint, "");

    let snapshot = dashboard::load_dashboard(&repo).unwrap();
    assert_eq!(snapshot.recent_quality_checks.len(), 3);

    let overview = dashboard::load_stats(&repo).unwrap();
    assert_eq!(overview.production.planned, 1);
    assert_eq!(overview.inventory.total_products, 1);
    assert_eq!(overview.inventory.total_stock_value_cents, 25_000);
    assert_eq!(overview.sales.total_sales_cents, 0);
    let stitch_checks = snapshot
        .recent_quality_checks
        .iter()
        .filter(|check| check.checkpoint == "Stitch density")
        .count();
    assert_eq!(stitch_checks, 2);
    assert_eq!(snapshot.counts.active_work_orders, 1);
}

#[test]
fn test_unbounded_prices_never_reach_the_database() {
    let test_db = common::TestDb::new("service_order_prices.db");
    let repo = test_db.repo();
    let seed = common::seed(&repo);
    let mut rng = StdRng::seed_from_u64(17);

    for unit_price in [f64::INFINITY, f64::NAN, 1e17] {
        let mut form = order_form(seed.customer.id, seed.user.id, seed.product.id);
        form.items[0].quantity = 1000;
        form.items[0].unit_price = unit_price;

        let err = sales::create_order(&repo, form, &mut rng)
            .expect_err("price outside the accepted range");
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    let orders = sales::list_orders(&repo, Default::default()).unwrap();
    assert!(orders.is_empty());
    assert_eq!(sales::sales_stats(&repo).unwrap().total_sales_cents, 0);
}

#[test]
fn test_repeating_a_stock_update_keeps_the_same_value() {
    let test_db = common::TestDb::new("service_stock_repeat.db");
    let repo = test_db.repo();
    let seed = common::seed(&repo);

    for target in [12, 0] {
        for _ in 0..2 {
            let updated = inventory::update_product_stock(
                &repo,
                seed.product.id,
                UpdateStockForm {
                    current_stock: target,
                },
            )
            .unwrap();
            assert_eq!(updated.value.current_stock, target);

            let stored = inventory::get_product(&repo, seed.product.id).unwrap();
            assert_eq!(stored.current_stock, target);
        }
    }
}

#[test]
fn test_stock_update_and_csv_import() {
    let test_db = common::TestDb::new("service_inventory.db");
    let repo = test_db.repo();
    let seed = common::seed(&repo);

    let updated = inventory::update_product_stock(
        &repo,
        seed.product.id,
        UpdateStockForm { current_stock: 7 },
    )
    .unwrap();
    assert_eq!(updated.value.current_stock, 7);
    assert!(updated.revalidate.contains(&format!("/inventory/{}", seed.product.id)));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name,type,unit,current_stock,reorder_level,price,supplier_id").unwrap();
    writeln!(file, "Wool Blend,Yarn,kg,12,5,7.25,{}", seed.supplier.id).unwrap();
    writeln!(file, "Madder Root,Dye,kg,3,4,18.00,{}", seed.supplier.id).unwrap();
    let size = file.as_file().metadata().unwrap().len() as usize;

    let form = UploadMaterialsForm {
        csv: TempFile {
            file,
            content_type: None,
            file_name: Some("materials.csv".to_string()),
            size,
        },
    };

    let imported = materials::import_materials(&repo, form).unwrap();
    assert_eq!(imported.value, 2);

    let all = materials::list_materials(&repo).unwrap();
    assert_eq!(all.len(), 3);
    let madder = all.iter().find(|m| m.name == "Madder Root").unwrap();
    assert_eq!(madder.price_cents, 1800);
    assert!(madder.needs_reorder());
}
