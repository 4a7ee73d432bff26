// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Constraint violations -> AppError
// ---
// Constraint names come from migrations/20240101000000_init.sql.

fn referenced_entity(constraint: &str) -> &'static str {
    match constraint {
        "branches_vendor_id_fkey" | "invoices_vendor_id_fkey" => "Vendor",
        "goods_branch_id_fkey" => "Branch",
        "goods_category_id_fkey" => "Category",
        "goods_user_id_fkey" | "vendors_owner_id_fkey" | "idempotency_keys_user_id_fkey" => "User",
        _ => "Record",
    }
}

/// Maps errors raised by INSERT/UPDATE statements.
pub(crate) fn map_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();

        if db_err.is_unique_violation() {
            return match constraint {
                "users_email_key" => AppError::EmailAlreadyExists,
                "invoices_number_key" => AppError::InvoiceNumberExists,
                "idempotency_keys_pkey" => AppError::DuplicateSubmission,
                other => AppError::UniqueConstraintViolation(other.to_string()),
            };
        }

        // A write pointing at a row that does not exist
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(referenced_entity(constraint));
        }

        if db_err.is_check_violation() && constraint == "goods_bank_for_transfer" {
            return AppError::BankRequired;
        }
    }
    err.into()
}

/// Maps errors raised by DELETE statements: a foreign key violation means
/// other rows still point at `entity`.
pub(crate) fn map_delete_error(err: sqlx::Error, entity: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::StillReferenced(entity);
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_name_the_missing_parent() {
        assert_eq!(referenced_entity("branches_vendor_id_fkey"), "Vendor");
        assert_eq!(referenced_entity("goods_category_id_fkey"), "Category");
        assert_eq!(referenced_entity("something_else"), "Record");
    }

    #[test]
    fn non_database_errors_stay_upstream() {
        let err = map_write_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError(_)));

        let err = map_delete_error(sqlx::Error::PoolTimedOut, "Vendor");
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
