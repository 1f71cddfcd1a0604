use crate::domain::CreateOrderInput;
use crate::error::{OrderError, ValidationErrors};
use std::collections::HashSet;

/// Shape checks on a create request, before anything is read from the store.
pub fn create_order_input(
    input: &CreateOrderInput,
    max_notes_len: usize,
) -> Result<(), OrderError> {
    let mut errors = ValidationErrors::new();

    if input.address_id.as_str().trim().is_empty() {
        errors.field("addressId", "is required");
    }

    if input.items.is_empty() {
        errors.field("items", "must contain at least 1 item");
    }

    let mut seen = HashSet::new();
    for (index, item) in input.items.iter().enumerate() {
        if item.quantity < 1 {
            errors.field(format!("items[{}].quantity", index), "must be at least 1");
        }
        if item.food_id.as_str().trim().is_empty() {
            errors.field(format!("items[{}].foodId", index), "is required");
        } else if !seen.insert(&item.food_id) {
            errors.field(
                format!("items[{}].foodId", index),
                format!("duplicate item {}", item.food_id),
            );
        }
    }

    if let Some(notes) = &input.notes {
        if notes.chars().count() > max_notes_len {
            errors.field("notes", format!("must be at most {} characters", max_notes_len));
        }
    }

    errors.into_result()
}

/// Checks 1-based paging parameters.
/// Checks a 1-based page request and returns the offset of its first row.
pub fn page_request(
    page: usize,
    page_size: usize,
    max_page_size: usize,
) -> Result<usize, OrderError> {
    let mut errors = ValidationErrors::new();
    let offset = page.checked_sub(1).and_then(|skipped| skipped.checked_mul(page_size));
    if page < 1 {
        errors.field("page", "must be at least 1");
    } else if offset.is_none() {
        errors.field("page", "is out of range");
    }
    if page_size < 1 || page_size > max_page_size {
        errors.field("pageSize", format!("must be between 1 and {}", max_page_size));
    }
    errors.into_result()?;
    Ok(offset.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderItemInput;

    fn field_errors<T: std::fmt::Debug>(result: Result<T, OrderError>) -> Vec<String> {
        match result {
            Err(OrderError::Validation(errors)) => errors.field_errors.into_keys().collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let input = CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 2)])
            .with_notes("ring twice");
        assert_eq!(create_order_input(&input, 500), Ok(()));
    }

    #[test]
    fn test_empty_items_and_zero_quantity() {
        let input = CreateOrderInput::new("addr-1", vec![]);
        assert_eq!(field_errors(create_order_input(&input, 500)), vec!["items"]);

        let input = CreateOrderInput::new("addr-1", vec![OrderItemInput::new("pizza-1", 0)]);
        assert_eq!(
            field_errors(create_order_input(&input, 500)),
            vec!["items[0].quantity"]
        );
    }

    #[test]
    fn test_duplicates_and_long_notes() {
        let input = CreateOrderInput::new(
            "addr-1",
            vec![OrderItemInput::new("pizza-1", 1), OrderItemInput::new("pizza-1", 1)],
        )
        .with_notes("x".repeat(501));
        assert_eq!(
            field_errors(create_order_input(&input, 500)),
            vec!["items[1].foodId", "notes"]
        );
    }

    #[test]
    fn test_paging_bounds() {
        assert_eq!(page_request(1, 20, 100), Ok(0));
        assert_eq!(page_request(3, 20, 100), Ok(40));
        assert_eq!(field_errors(page_request(0, 20, 100)), vec!["page"]);
        assert_eq!(field_errors(page_request(1, 101, 100)), vec!["pageSize"]);
        assert_eq!(field_errors(page_request(1, 0, 100)), vec!["pageSize"]);
    }

    #[test]
    fn test_page_past_addressable_rows_is_rejected() {
        assert_eq!(field_errors(page_request(usize::MAX, 20, 100)), vec!["page"]);
        assert_eq!(page_request(usize::MAX, 1, 100), Ok(usize::MAX - 1));
    }
}
