// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("email_invalid", "The e-mail address is invalid."),
    ("password_too_short", "The password must have at least 6 characters."),
    ("name_required", "Name is required."),
    ("field_required", "This field is required."),
    ("value_must_be_positive", "The value must be at least 1."),
    ("value_not_negative", "The value cannot be negative."),
    ("range", "The value is out of range."),
    ("quantity_not_positive", "Quantity must be at least 1."),
    ("date_range_invalid", "The pick-up date must be after the drop-off date."),
    ("rate_negative", "The daily rate cannot be negative."),
    ("category_unknown", "The selected category does not exist."),
    ("price_overflow", "The total price is too large."),
    ("bank_required", "A bank must be chosen for transfer payments."),
    ("invalid_status_transition", "Cannot change status from {from} to {to}."),
    ("tier_limit_reached", "The current tier allows at most {max} branches."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Authentication token is invalid or missing."),
    ("account_suspended", "This account is suspended."),
    ("access_denied", "Access denied."),
    ("not_found", "{entity} not found."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invoice_number_exists", "This invoice number is already in use."),
    ("duplicate_submission", "An identical request was just submitted."),
    ("still_referenced", "{entity} is still in use and cannot be deleted."),
    ("unique_violation", "A record with these values already exists."),
    ("idempotency_key_invalid", "The Idempotency-Key header must be plain text."),
    ("idempotency_key_too_long", "The Idempotency-Key header may have at most 255 characters."),
    ("internal_error", "An unexpected error occurred."),
];

const ID: &[(&str, &str)] = &[
    ("validation_failed", "Satu atau lebih kolom tidak valid."),
    ("email_invalid", "Alamat e-mail tidak valid."),
    ("password_too_short", "Kata sandi minimal 6 karakter."),
    ("name_required", "Nama wajib diisi."),
    ("field_required", "Kolom ini wajib diisi."),
    ("value_must_be_positive", "Nilai minimal 1."),
    ("value_not_negative", "Nilai tidak boleh negatif."),
    ("range", "Nilai di luar rentang."),
    ("quantity_not_positive", "Jumlah barang minimal 1."),
    ("date_range_invalid", "Tanggal ambil harus setelah tanggal titip."),
    ("rate_negative", "Tarif harian tidak boleh negatif."),
    ("category_unknown", "Kategori yang dipilih tidak ditemukan."),
    ("price_overflow", "Total harga terlalu besar."),
    ("bank_required", "Bank wajib dipilih untuk pembayaran transfer."),
    ("invalid_status_transition", "Status tidak dapat diubah dari {from} ke {to}."),
    ("tier_limit_reached", "Tier saat ini hanya mengizinkan maksimal {max} cabang."),
    ("invalid_credentials", "E-mail atau kata sandi salah."),
    ("invalid_token", "Token autentikasi tidak valid atau tidak ada."),
    ("account_suspended", "Akun ini sedang ditangguhkan."),
    ("access_denied", "Akses ditolak."),
    ("not_found", "{entity} tidak ditemukan."),
    ("email_already_exists", "E-mail ini sudah digunakan."),
    ("invoice_number_exists", "Nomor invoice ini sudah digunakan."),
    ("duplicate_submission", "Permintaan yang sama baru saja dikirim."),
    ("still_referenced", "{entity} masih digunakan dan tidak dapat dihapus."),
    ("unique_violation", "Data dengan nilai tersebut sudah ada."),
    ("idempotency_key_invalid", "Header Idempotency-Key harus berupa teks biasa."),
    ("idempotency_key_too_long", "Header Idempotency-Key maksimal 255 karakter."),
    ("internal_error", "Terjadi kesalahan tak terduga."),
];

static GLOBAL: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

/// Message catalogue keyed by language, then message key.
#[derive(Debug)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", EN.iter().copied().collect());
        catalogs.insert("id", ID.iter().copied().collect());
        Self { catalogs }
    }

    pub fn global() -> &'static I18nStore {
        &GLOBAL
    }

    /// Looks the key up in `lang`, falling back to English and then to the
    /// key itself. `{name}` placeholders are replaced from `args`.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        args.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs.get(lang).and_then(|c| c.get(key)).copied()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indonesian_catalog_is_used_when_requested() {
        let store = I18nStore::new();
        assert_eq!(store.translate("id", "access_denied", &[]), "Akses ditolak.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "access_denied", &[]), "Access denied.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "no_such_key", &[]), "no_such_key");
    }

    #[test]
    fn placeholders_are_substituted() {
        let store = I18nStore::new();
        let text = store.translate("en", "tier_limit_reached", &[("max", "3".to_string())]);
        assert_eq!(text, "The current tier allows at most 3 branches.");
    }

    #[test]
    fn both_catalogs_define_the_same_keys() {
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        let id: Vec<_> = ID.iter().map(|(k, _)| *k).collect();
        assert_eq!(en, id);
    }
}
