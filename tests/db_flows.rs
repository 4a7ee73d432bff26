// tests/db_flows.rs
//
// End-to-end flows against a real Postgres. Run with
//   DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use titipsini::{
    common::error::AppError,
    config::{AppState, Config},
    models::{
        auth::{Role, Session},
        finance::{InvoiceStatus, NewInvoice},
        goods::{NewDeposit, PaymentMethod},
        tier::TierName,
        vendor::{BranchStatus, NewBranch, NewVendor, VendorChanges, VendorStatus},
    },
};

fn state(pool: PgPool) -> AppState {
    let config = Config::from_lookup(|name| match name {
        "DATABASE_URL" => Some("postgres://unused".to_string()),
        "JWT_SECRET" => Some("flow-secret".to_string()),
        // The duplicate guard would trip on the deliberate repeats below
        "DUPLICATE_WINDOW_SECS" => Some("0".to_string()),
        _ => None,
    })
    .expect("config");
    AppState::from_parts(pool, config)
}

async fn user(state: &AppState, email: &str, role: Role) -> Session {
    let user = state
        .user_service
        .create_user(email, "secret-pass", email, role)
        .await
        .expect("user");
    Session { user_id: user.id, role }
}

fn new_vendor(owner: Option<Uuid>) -> NewVendor {
    NewVendor {
        owner_id: owner,
        company_name: "PT Titip Aman".into(),
        address: "Jl. Sudirman 1, Jakarta".into(),
        phone: "081234567890".into(),
        email: "mitra@titipsini.test".into(),
        tier: TierName::Bronze,
    }
}

fn new_branch(name: &str) -> NewBranch {
    NewBranch {
        name: name.into(),
        address: "Jl. Thamrin 2".into(),
        phone: "0219876543".into(),
        latitude: Some(-6.2),
        longitude: Some(106.8),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn vendor_round_trip_keeps_contact_details(pool: PgPool) {
    let state = state(pool);
    let owner = user(&state, "owner@titipsini.test", Role::Vendor).await;

    let created = state
        .vendor_service
        .create_vendor(&owner, new_vendor(None), None)
        .await
        .unwrap()
        .into_inner();
    let fetched = state.vendor_service.get_vendor(&owner, created.id).await.unwrap();

    assert_eq!(fetched.owner_id, Some(owner.user_id));
    assert_eq!(fetched.company_name, "PT Titip Aman");
    assert_eq!(fetched.address, "Jl. Sudirman 1, Jakarta");
    assert_eq!(fetched.phone, "081234567890");
    assert_eq!(fetched.email, "mitra@titipsini.test");
    assert_eq!(fetched.status, VendorStatus::Pending);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn bronze_vendor_gets_a_single_branch(pool: PgPool) {
    let state = state(pool);
    let admin = user(&state, "admin@titipsini.test", Role::Admin).await;

    let vendor = state
        .vendor_service
        .create_vendor(&admin, new_vendor(None), None)
        .await
        .unwrap()
        .into_inner();

    state.vendor_service.create_branch(&admin, vendor.id, new_branch("Pusat")).await.unwrap();
    let second = state.vendor_service.create_branch(&admin, vendor.id, new_branch("Cabang 2")).await;

    assert!(matches!(second, Err(AppError::TierLimitReached(1))));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn branch_for_unknown_vendor_is_not_found(pool: PgPool) {
    let state = state(pool);
    let admin = user(&state, "admin@titipsini.test", Role::Admin).await;

    let result = state.vendor_service.create_branch(&admin, Uuid::new_v4(), new_branch("Ghost")).await;

    assert!(matches!(result, Err(AppError::NotFound("Vendor"))));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn vendor_verification_stamps_and_blocks_regression(pool: PgPool) {
    let state = state(pool);
    let admin = user(&state, "admin@titipsini.test", Role::Admin).await;
    let vendor = state
        .vendor_service
        .create_vendor(&admin, new_vendor(None), None)
        .await
        .unwrap()
        .into_inner();

    let active = state.vendor_service.change_status(vendor.id, VendorStatus::Active).await.unwrap();
    assert!(active.verified_at.is_some());

    let back = state.vendor_service.change_status(vendor.id, VendorStatus::Pending).await;
    assert!(matches!(back, Err(AppError::InvalidStatusTransition { .. })));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn deposit_keeps_its_price_when_the_rate_changes(pool: PgPool) {
    let state = state(pool);
    let admin = user(&state, "admin@titipsini.test", Role::Admin).await;
    let customer = user(&state, "budi@titipsini.test", Role::Customer).await;

    let vendor = state
        .vendor_service
        .create_vendor(&admin, new_vendor(None), None)
        .await
        .unwrap()
        .into_inner();
    state.vendor_service.change_status(vendor.id, VendorStatus::Active).await.unwrap();
    let branch = state.vendor_service.create_branch(&admin, vendor.id, new_branch("Pusat")).await.unwrap();
    state.vendor_service.change_branch_status(branch.id, BranchStatus::Active).await.unwrap();

    let category = state.goods_service.create_category("Koper", 10_000, "").await.unwrap();

    let date_in = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    let deposit = NewDeposit {
        branch_id: branch.id,
        category_id: category.id,
        name: "Koper biru".into(),
        quantity: 1,
        date_in,
        date_out: date_in + TimeDelta::days(3),
        payment_method: PaymentMethod::Transfer,
        bank: Some("BCA".into()),
    };

    let outcome = state.goods_service.create_deposit(&customer, deposit.clone(), Some("key-1")).await.unwrap();
    assert!(outcome.is_created());
    let goods = outcome.into_inner();
    assert_eq!((goods.day_total, goods.total_price), (3, 30_000));

    // Same key: the original row comes back
    let replay = state.goods_service.create_deposit(&customer, deposit, Some("key-1")).await.unwrap();
    assert!(!replay.is_created());
    assert_eq!(replay.into_inner().id, goods.id);

    state.goods_service.update_category(category.id, None, Some(20_000), None).await.unwrap();
    let reread = state.goods_service.get_goods(&customer, goods.id).await.unwrap();
    assert_eq!(reread.total_price, 30_000);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn dashboard_partitions_this_months_invoices(pool: PgPool) {
    let state = state(pool);
    let finance = user(&state, "finance@titipsini.test", Role::Finance).await;
    let vendor = state
        .vendor_service
        .create_vendor(&finance, new_vendor(None), None)
        .await
        .unwrap()
        .into_inner();

    let due = NaiveDate::from_ymd_opt(2000, 1, 31).unwrap();
    let mut ids = Vec::new();
    for (number, amount) in [("INV-1", 100_000), ("INV-2", 50_000), ("INV-3", 25_000)] {
        let invoice = NewInvoice { vendor_id: vendor.id, invoice_number: number.into(), amount, due_date: due };
        ids.push(state.invoice_service.create_invoice(&finance, invoice, None).await.unwrap().into_inner().id);
    }

    state.invoice_service.pay_invoice(ids[0]).await.unwrap();
    // Due long ago, so exactly the two unpaid invoices turn overdue
    assert_eq!(state.invoice_service.mark_overdue(Utc::now()).await.unwrap(), 2);

    let stats = state.dashboard_service.get_stats(Utc::now() + TimeDelta::seconds(1)).await.unwrap();

    assert_eq!(stats.invoices.total_invoice_amount, 175_000);
    assert_eq!(stats.invoices.paid_amount, 100_000);
    assert_eq!(stats.invoices.outstanding_amount, 75_000);
    assert_eq!(stats.daily_transactions, 0);
    assert_eq!(stats.weekly_trend, vec![0; 7]);
    assert_eq!(stats.vendors.pending_verification, 1);

    let invoices = state.invoice_service.list_invoices().await.unwrap();
    assert!(invoices.iter().filter(|i| i.status == InvoiceStatus::Overdue).count() == 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn vendor_users_cannot_pick_a_paid_tier(pool: PgPool) {
    let state = state(pool);
    let owner = user(&state, "owner@titipsini.test", Role::Vendor).await;
    let admin = user(&state, "admin@titipsini.test", Role::Admin).await;

    let gold = NewVendor { tier: TierName::Gold, ..new_vendor(None) };
    let refused = state.vendor_service.create_vendor(&owner, gold.clone(), None).await;
    assert!(matches!(refused, Err(AppError::Forbidden)));

    let own = state.vendor_service.create_vendor(&owner, new_vendor(None), None).await.unwrap().into_inner();
    assert_eq!(own.tier, TierName::Bronze);
    state.vendor_service.create_branch(&owner, own.id, new_branch("Pusat")).await.unwrap();
    let second = state.vendor_service.create_branch(&owner, own.id, new_branch("Cabang 2")).await;
    assert!(matches!(second, Err(AppError::TierLimitReached(1))));

    // Staff still grant paid tiers
    let granted = state.vendor_service.create_vendor(&admin, gold, None).await.unwrap().into_inner();
    assert_eq!(granted.tier, TierName::Gold);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn finance_reads_every_vendor(pool: PgPool) {
    let state = state(pool);
    let owner = user(&state, "owner@titipsini.test", Role::Vendor).await;
    let finance = user(&state, "finance@titipsini.test", Role::Finance).await;

    let vendor = state.vendor_service.create_vendor(&owner, new_vendor(None), None).await.unwrap().into_inner();

    let listed = state.vendor_service.list_vendors(&finance).await.unwrap();
    assert_eq!(listed.iter().map(|v| v.id).collect::<Vec<_>>(), vec![vendor.id]);
    assert_eq!(state.vendor_service.get_vendor(&finance, vendor.id).await.unwrap().id, vendor.id);

    let edit = state
        .vendor_service
        .update_vendor(&finance, vendor.id, VendorChanges { company_name: Some("PT Lain".into()), ..Default::default() })
        .await;
    assert!(matches!(edit, Err(AppError::Forbidden)));
}

async fn open_branch(state: &AppState, admin: &Session, name: &str) -> Uuid {
    let vendor = state
        .vendor_service
        .create_vendor(admin, NewVendor { tier: TierName::Gold, ..new_vendor(None) }, None)
        .await
        .unwrap()
        .into_inner();
    state.vendor_service.change_status(vendor.id, VendorStatus::Active).await.unwrap();
    let branch = state.vendor_service.create_branch(admin, vendor.id, new_branch(name)).await.unwrap();
    state.vendor_service.change_branch_status(branch.id, BranchStatus::Active).await.unwrap();
    branch.id
}

fn deposit_at(branch_id: Uuid, category_id: Uuid) -> NewDeposit {
    let date_in = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
    NewDeposit {
        branch_id,
        category_id,
        name: "Tas ransel".into(),
        quantity: 1,
        date_in,
        date_out: date_in + TimeDelta::days(2),
        payment_method: PaymentMethod::Cash,
        bank: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn dashboard_ranks_and_counts_todays_deposits(pool: PgPool) {
    let state = state(pool);
    let admin = user(&state, "admin@titipsini.test", Role::Admin).await;
    let customer = user(&state, "budi@titipsini.test", Role::Customer).await;

    let quiet = open_branch(&state, &admin, "Sepi").await;
    let busy = open_branch(&state, &admin, "Ramai").await;

    let first = state.goods_service.create_category("first", 1_000, "").await.unwrap();
    let second = state.goods_service.create_category("second", 1_000, "").await.unwrap();
    let third = state.goods_service.create_category("third", 1_000, "").await.unwrap();

    // third: 2 deposits; first and second tie on 1, first was created earlier
    for (branch, category) in [(busy, second.id), (busy, third.id), (quiet, first.id), (busy, third.id)] {
        state.goods_service.create_deposit(&customer, deposit_at(branch, category), None).await.unwrap();
    }

    let stats = state.dashboard_service.get_stats(Utc::now() + TimeDelta::seconds(1)).await.unwrap();

    let categories: Vec<(&str, i64)> = stats.popular_categories.iter().map(|e| (e.name.as_str(), e.count)).collect();
    assert_eq!(categories, vec![("third", 2), ("first", 1), ("second", 1)]);

    let branches: Vec<(Uuid, i64)> = stats.popular_branches.iter().map(|e| (e.id, e.count)).collect();
    assert_eq!(branches, vec![(busy, 3), (quiet, 1)]);

    assert_eq!(stats.daily_transactions, 4);
    assert_eq!(stats.weekly_trend, vec![0, 0, 0, 0, 0, 0, 4]);
    // 4 deposits x 2 days x Rp1.000
    assert_eq!(stats.monthly_revenue, 8_000);
    assert_eq!(stats.total_branches, 2);
    assert_eq!(stats.new_branches_24h, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn racing_requests_with_one_key_create_once(pool: PgPool) {
    let state = state(pool);
    let admin = user(&state, "admin@titipsini.test", Role::Admin).await;
    let customer = user(&state, "budi@titipsini.test", Role::Customer).await;
    let branch = open_branch(&state, &admin, "Pusat").await;
    let category = state.goods_service.create_category("Koper", 10_000, "").await.unwrap();

    let deposit = deposit_at(branch, category.id);
    let (a, b) = tokio::join!(
        state.goods_service.create_deposit(&customer, deposit.clone(), Some("same-key")),
        state.goods_service.create_deposit(&customer, deposit, Some("same-key")),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.is_created(), b.is_created());
    assert_eq!(a.into_inner().id, b.into_inner().id);
    assert_eq!(state.goods_service.list_goods(&customer).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL"]
async fn emails_are_case_insensitive(pool: PgPool) {
    let state = state(pool);

    let created = state
        .user_service
        .create_user(" Budi@Titipsini.test", "secret-pass", "Budi", Role::Customer)
        .await
        .unwrap();
    assert_eq!(created.email, "budi@titipsini.test");

    let again = state
        .user_service
        .create_user("budi@titipsini.TEST", "secret-pass", "Budi", Role::Customer)
        .await;
    assert!(matches!(again, Err(AppError::EmailAlreadyExists)));

    let (user, _) = state.auth_service.login_user("BUDI@titipsini.test", "secret-pass").await.unwrap();
    assert_eq!(user.id, created.id);
}
