//! Explicit reordering of collection items.

use crate::collection::{Collection, Item};
use crate::config::OrderList;
use crate::error::ConvertError;

/// Reorder request items to follow `order_list`.
///
/// Entries are processed in list order; each one claims every not yet
/// claimed item whose method and path match case-insensitively, keeping
/// their original relative order. Unclaimed items follow in original order
/// unless `discard_unlisted` is set. Folders are dissolved: the collection
/// ends up with a flat list of request items.
///
/// # Errors
///
/// [`ConvertError::OrderListEmpty`] for an empty list. The collection is not
/// touched in that case.
pub fn order(
    collection: &mut Collection,
    order_list: &OrderList,
    discard_unlisted: bool,
) -> Result<(), ConvertError> {
    if order_list.order.is_empty() {
        return Err(ConvertError::OrderListEmpty);
    }

    let items = collection.take_request_items();
    let mut claimed = vec![false; items.len()];
    let mut ordered = Vec::with_capacity(items.len());

    for target in &order_list.order {
        for (index, item) in items.iter().enumerate() {
            if !claimed[index] && item.matches(target) {
                claimed[index] = true;
                ordered.push(index);
            }
        }
    }
    if !discard_unlisted {
        ordered.extend((0..items.len()).filter(|index| !claimed[*index]));
    }
    tracing::debug!(
        kept = ordered.len(),
        total = items.len(),
        "reordered collection items"
    );

    let mut slots: Vec<_> = items.into_iter().map(Some).collect();
    collection.item = ordered
        .into_iter()
        .filter_map(|index| slots[index].take())
        .map(Item::Request)
        .collect();
    Ok(())
}
