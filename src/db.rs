pub mod user_repo;
pub use user_repo::UserRepository;
pub mod vendor_repo;
pub use vendor_repo::VendorRepository;
pub mod goods_repo;
pub use goods_repo::GoodsRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod tier_repo;
pub use tier_repo::TierRepository;
pub mod idempotency_repo;
pub use idempotency_repo::{IdempotencyRepository, IdempotencyScope};
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
