// Customer number rules and bill product routing

use proptest::prelude::*;
use skuypay::core::AppError;
use skuypay::modules::billing::services::{validate_customer_id, BillProduct};

#[test]
fn test_accepts_plain_meter_numbers() {
    assert!(validate_customer_id("12345678").is_ok());
    assert!(validate_customer_id("530000000001").is_ok());
    assert!(validate_customer_id("100000").is_ok());
    assert!(validate_customer_id("12345678901234567890").is_ok());
}

#[test]
fn test_trailing_nine_is_invalid() {
    let err = validate_customer_id("12345679").unwrap_err();

    assert!(matches!(err, AppError::Validation(ref msg) if msg == "invalid customer ID"));
}

#[test]
fn test_rejects_bad_shapes() {
    for id in ["", "12345", "123456789012345678901", "12-45678", "ABCDEF12", "1234 678"] {
        assert!(
            validate_customer_id(id).is_err(),
            "customer id {:?} should be rejected",
            id
        );
    }
}

#[test]
fn test_unknown_product_path_is_not_found() {
    let err = "gas".parse::<BillProduct>().unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_product_paths_resolve() {
    assert_eq!(
        "electricity-postpaid".parse::<BillProduct>().unwrap(),
        BillProduct::ElectricityPostpaid
    );
    assert_eq!("wifi".parse::<BillProduct>().unwrap(), BillProduct::Wifi);
    assert_eq!("pdam".parse::<BillProduct>().unwrap(), BillProduct::Pdam);
}

proptest! {
    #[test]
    fn prop_digit_ids_not_ending_in_nine_are_valid(id in "[0-9]{5,19}[0-8]") {
        prop_assert!(validate_customer_id(&id).is_ok());
    }

    #[test]
    fn prop_ids_ending_in_nine_are_invalid(id in "[0-9]{5,19}9") {
        prop_assert!(validate_customer_id(&id).is_err());
    }

    #[test]
    fn prop_ids_with_letters_are_invalid(prefix in "[0-9]{3,8}", suffix in "[a-zA-Z]{1,4}[0-8]") {
        let id = format!("{}{}", prefix, suffix);
        prop_assert!(validate_customer_id(&id).is_err());
    }
}
