// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::{header, request::Parts}};
use std::marker::PhantomData;

use crate::{
    common::{error::{ApiError, AppError}, i18n::I18nStore},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Role,
};

/// The single place a role is checked against an allow list.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Names the roles allowed through a `RequireRole` guard.
pub trait RolePolicy: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// Extractor that rejects the request unless the caller's role is in `P::ALLOWED`.
/// Requires `auth_guard` to have run first.
pub struct RequireRole<P>(pub PhantomData<P>);

impl<P, S> FromRequestParts<S> for RequireRole<P>
where
    P: RolePolicy,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();
        let reject = |e: AppError| e.to_api_error(&locale, I18nStore::global());

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| reject(AppError::InvalidToken))?;

        authorize(user.0.role, P::ALLOWED).map_err(reject)?;

        Ok(RequireRole(PhantomData))
    }
}

// ---
// Policies
// ---

pub struct StaffOnly;
impl RolePolicy for StaffOnly {
    const ALLOWED: &'static [Role] = &[Role::Superadmin, Role::Admin];
}

pub struct FinanceDesk;
impl RolePolicy for FinanceDesk {
    const ALLOWED: &'static [Role] = &[Role::Superadmin, Role::Finance];
}

pub struct ReportViewers;
impl RolePolicy for ReportViewers {
    const ALLOWED: &'static [Role] = &[Role::Superadmin, Role::Admin, Role::Finance];
}

pub struct VendorDesk;
impl RolePolicy for VendorDesk {
    const ALLOWED: &'static [Role] = &[Role::Superadmin, Role::Admin, Role::Vendor];
}

// Vendor profiles: back office (finance included) plus the owning vendor
pub struct VendorReaders;
impl RolePolicy for VendorReaders {
    const ALLOWED: &'static [Role] = &[Role::Superadmin, Role::Admin, Role::Finance, Role::Vendor];
}

// Vendor invoices: back office plus the owning vendor
pub struct InvoiceReaders;
impl RolePolicy for InvoiceReaders {
    const ALLOWED: &'static [Role] = &[Role::Superadmin, Role::Admin, Role::Finance, Role::Vendor];
}

pub struct CustomerDesk;
impl RolePolicy for CustomerDesk {
    const ALLOWED: &'static [Role] = &[Role::Customer];
}

pub struct SuperadminOnly;
impl RolePolicy for SuperadminOnly {
    const ALLOWED: &'static [Role] = &[Role::Superadmin];
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Role; 5] = [Role::Superadmin, Role::Admin, Role::Finance, Role::Vendor, Role::Customer];

    fn admitted<P: RolePolicy>() -> Vec<Role> {
        ALL.into_iter().filter(|r| authorize(*r, P::ALLOWED).is_ok()).collect()
    }

    #[test]
    fn dashboard_is_closed_to_customers_and_vendors() {
        assert_eq!(admitted::<ReportViewers>(), vec![Role::Superadmin, Role::Admin, Role::Finance]);
        assert!(matches!(authorize(Role::Customer, ReportViewers::ALLOWED), Err(AppError::Forbidden)));
    }

    #[test]
    fn policies_admit_exactly_their_roles() {
        assert_eq!(admitted::<StaffOnly>(), vec![Role::Superadmin, Role::Admin]);
        assert_eq!(admitted::<FinanceDesk>(), vec![Role::Superadmin, Role::Finance]);
        assert_eq!(admitted::<VendorDesk>(), vec![Role::Superadmin, Role::Admin, Role::Vendor]);
        assert_eq!(admitted::<CustomerDesk>(), vec![Role::Customer]);
        assert_eq!(admitted::<SuperadminOnly>(), vec![Role::Superadmin]);
        assert_eq!(admitted::<InvoiceReaders>().len(), 4);
        assert_eq!(
            admitted::<VendorReaders>(),
            vec![Role::Superadmin, Role::Admin, Role::Finance, Role::Vendor]
        );
    }

    #[test]
    fn empty_allow_list_denies_everyone() {
        assert!(ALL.into_iter().all(|r| authorize(r, &[]).is_err()));
    }
}
