//! Order QR codes and item barcodes.
//!
//! Both embed the creation date as `YYMMDD`. Item barcodes are sequential
//! within an order (`MAT-240301-001`); when that collides with an existing
//! barcode the caller switches to [`random_barcode`].

use chrono::NaiveDate;
use rand::Rng;

const RANDOM_SUFFIX_LEN: usize = 4;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn date_stamp(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// `ORD-{sap}-{YYMMDD}`
pub fn order_qr(sap_number: &str, date: NaiveDate) -> String {
    format!("ORD-{}-{}", sap_number, date_stamp(date))
}

/// `MAT-{YYMMDD}-{index+1:03}` for the zero-based item `index`.
pub fn item_barcode(date: NaiveDate, index: usize) -> String {
    format!("MAT-{}-{:03}", date_stamp(date), index + 1)
}

/// `MAT-{YYMMDD}-XXXX` with four random upper-case alphanumerics.
pub fn random_barcode(date: NaiveDate) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    format!("MAT-{}-{}", date_stamp(date), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn order_qr_embeds_sap_and_date() {
        assert_eq!(order_qr("4500123", day()), "ORD-4500123-240307");
    }

    #[test]
    fn item_barcodes_are_one_based_and_padded() {
        assert_eq!(item_barcode(day(), 0), "MAT-240307-001");
        assert_eq!(item_barcode(day(), 41), "MAT-240307-042");
        assert_eq!(item_barcode(day(), 1233), "MAT-240307-1234");
    }

    #[test]
    fn random_barcode_shape() {
        let code = random_barcode(day());
        let suffix = code.strip_prefix("MAT-240307-").unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
