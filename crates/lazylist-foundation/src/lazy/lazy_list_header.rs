use super::lazy_list_measured_item::LazyListPositionedItem;
use super::lazy_measured_item_provider::MeasuredItemProvider;

/// Places the sticky header for the current window, if any.
///
/// The header is the last header index at or before the first positioned
/// item. With start padding that item can lie inside the padding, ahead of
/// the first visible item, so the header follows what is drawn in the padding
/// rather than the scroll anchor. It sits at its natural offset but never above the start padding
/// edge, and it is pushed up by the next header once that one reaches it.
/// The header replaces its own entry in `items` or is inserted at the front.
/// Returns its position in `items`.
pub fn find_or_compose_lazy_list_header(
    items: &mut Vec<LazyListPositionedItem>,
    provider: &mut dyn MeasuredItemProvider,
    header_indexes: &[usize],
    before_content_padding: i32,
    layout_cross_size: i32,
) -> Option<usize> {
    let first_visible = items.first()?.index;
    let position = header_indexes.partition_point(|&header| header <= first_visible);
    let current_header = header_indexes.get(position.checked_sub(1)?).copied()?;
    let next_header = header_indexes.get(position).copied();

    let mut current_offset = None;
    let mut next_offset = None;
    let mut existing = None;
    for (slot, item) in items.iter().enumerate() {
        if item.index == current_header {
            existing = Some(slot);
            current_offset = Some(item.offset);
        } else if Some(item.index) == next_header {
            next_offset = Some(item.offset);
        }
    }

    let measured = provider.get_and_measure(current_header);
    let mut offset = match current_offset {
        Some(natural) => natural.max(-before_content_padding),
        None => -before_content_padding,
    };
    if let Some(next) = next_offset {
        offset = offset.min(next - measured.size);
    }
    let mut header = measured.position(offset, layout_cross_size);
    header.is_sticky_header = true;

    match existing {
        Some(slot) => {
            items[slot] = header;
            Some(slot)
        }
        None => {
            items.insert(0, header);
            Some(0)
        }
    }
}
