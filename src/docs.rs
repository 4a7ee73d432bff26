// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Titipsini API", description = "Storage-deposit brokerage backend"),
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Vendors ---
        handlers::vendor::list_vendors,
        handlers::vendor::create_vendor,
        handlers::vendor::get_vendor,
        handlers::vendor::update_vendor,
        handlers::vendor::delete_vendor,
        handlers::vendor::change_vendor_status,
        handlers::vendor::list_vendor_invoices,

        // --- Branches ---
        handlers::vendor::list_active_branches,
        handlers::vendor::list_branches,
        handlers::vendor::create_branch,
        handlers::vendor::change_branch_status,

        // --- Categories ---
        handlers::goods::list_categories,
        handlers::goods::get_category,
        handlers::goods::create_category,
        handlers::goods::update_category,
        handlers::goods::delete_category,

        // --- Goods ---
        handlers::goods::quote,
        handlers::goods::create_deposit,
        handlers::goods::list_goods,
        handlers::goods::get_goods,
        handlers::goods::settle_goods,

        // --- Invoices ---
        handlers::invoices::list_invoices,
        handlers::invoices::create_invoice,
        handlers::invoices::pay_invoice,
        handlers::invoices::mark_overdue,

        // --- Tiers ---
        handlers::tiers::list_tiers,
        handlers::tiers::update_tier,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserStatus,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::AuthResponse,

            // --- Vendors ---
            models::vendor::VendorStatus,
            models::vendor::Vendor,
            models::vendor::BranchStatus,
            models::vendor::Branch,
            models::tier::TierName,
            models::tier::TierPlan,
            handlers::vendor::CreateVendorPayload,
            handlers::vendor::UpdateVendorPayload,
            handlers::vendor::VendorStatusPayload,
            handlers::vendor::CreateBranchPayload,
            handlers::vendor::BranchStatusPayload,
            handlers::tiers::UpdateTierPayload,

            // --- Goods ---
            models::goods::Category,
            models::goods::PaymentMethod,
            models::goods::GoodsStatus,
            models::goods::Goods,
            models::goods::PriceQuote,
            handlers::goods::CreateCategoryPayload,
            handlers::goods::UpdateCategoryPayload,
            handlers::goods::QuotePayload,
            handlers::goods::CreateDepositPayload,

            // --- Finance ---
            models::finance::InvoiceStatus,
            models::finance::Invoice,
            handlers::invoices::CreateInvoicePayload,
            handlers::invoices::OverdueSweepResponse,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::VendorCounts,
            models::dashboard::InvoiceTotals,
            models::dashboard::RankedEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and session renewal"),
        (name = "Users", description = "Account administration"),
        (name = "Vendors", description = "Storage partners (mitra) and their moderation"),
        (name = "Branches", description = "Vendor branches and branch review"),
        (name = "Categories", description = "Daily pricing per kind of goods"),
        (name = "Goods", description = "Deposits and the price calculator"),
        (name = "Invoices", description = "Vendor subscription billing"),
        (name = "Tiers", description = "Subscription tiers and branch allowances"),
        (name = "Dashboard", description = "Back-office summary figures")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
