use super::{Item, Pager};
use crate::document::Placement;

/// The cover takes a page to itself, ignoring the margins.
///
/// Placement offsets are measured from the top of the page; PDF measures from the bottom.
pub fn render(pager: &mut Pager<'_>, placement: &Placement) {
    pager.room(0.0);
    let y = pager.page_height() - placement.offset_y - placement.height;
    pager.push(Item::Image {
        x: placement.offset_x,
        y,
        width: placement.width,
        height: placement.height,
    });
}
