use crate::model::PriceListNode;
use crate::ordinal::OrdinalStyle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenumberStats {
    pub price_lists: usize,
    pub cloths: usize,
    pub types: usize,
}

/// Recomputes every ordinal in document order: price lists 1.., cloths A.. per
/// price list, types I.. per cloth.
pub fn renumber(price_lists: &mut [PriceListNode]) -> RenumberStats {
    let mut stats = RenumberStats::default();
    for (pl_index, price_list) in price_lists.iter_mut().enumerate() {
        price_list.set_ordinal(OrdinalStyle::Decimal.label(pl_index + 1));
        stats.price_lists += 1;
        for (cloth_index, cloth) in price_list.cloths_mut().iter_mut().enumerate() {
            cloth.set_ordinal(OrdinalStyle::Letters.label(cloth_index + 1));
            stats.cloths += 1;
            for (type_index, node) in cloth.types_mut().iter_mut().enumerate() {
                node.set_ordinal(OrdinalStyle::Roman.label(type_index + 1));
                stats.types += 1;
            }
        }
    }
    stats
}
