use std::collections::VecDeque;

use crate::canvas::TextAlign;
use crate::flowable::{Flowable, GridMetrics, Heading, SizeRateGrid, Spacer, segment_columns};
use crate::layout::LayoutConfig;
use crate::model::{ClothNode, PriceListNode, TypeNode};
use crate::types::Pt;

pub fn price_list_title(node: &PriceListNode) -> String {
    format!("PRICE LIST-({}) {}", node.ordinal(), node.display_name())
}

pub fn cloth_label(node: &ClothNode) -> String {
    format!("[{}. {}]", node.ordinal(), node.display_name())
}

pub fn type_label(node: &TypeNode) -> String {
    format!("{}. {}", node.ordinal(), node.display_name())
}

/// Flattens the tree into the block sequence the paginator lays out, in
/// document order. Expects ordinals to be current.
pub fn build_story(
    price_lists: &[PriceListNode],
    layout: &LayoutConfig,
) -> VecDeque<Box<dyn Flowable>> {
    let title_size = Pt::from_f32(layout.title_font_size);
    let title_height = Pt::from_mm(layout.title_height_mm);
    let label_size = Pt::from_f32(layout.label_font_size);
    let label_height = Pt::from_mm(layout.label_height_mm);
    let grid = GridMetrics {
        header_width: layout.header_column_width(),
        column_width: layout.column_width(),
        row_height: layout.row_height(),
        font_size: Pt::from_f32(layout.cell_font_size),
    };

    let mut story: VecDeque<Box<dyn Flowable>> = VecDeque::new();
    for (index, price_list) in price_lists.iter().enumerate() {
        if index > 0 {
            story.push_back(Box::new(Spacer::new(label_height)));
        }
        story.push_back(Box::new(
            Heading::new(price_list_title(price_list), title_size, title_height)
                .bold()
                .with_align(TextAlign::Center),
        ));
        for cloth in price_list.cloths() {
            story.push_back(Box::new(
                Heading::new(cloth_label(cloth), label_size, label_height).bold(),
            ));
            for node in cloth.types() {
                story.push_back(Box::new(Heading::new(
                    type_label(node),
                    label_size,
                    label_height,
                )));
                let columns = node.table().columns();
                for range in segment_columns(columns.len(), layout.columns_per_line) {
                    let cells = columns[range]
                        .iter()
                        .map(|column| {
                            (
                                column.size.get().to_string(),
                                column.rate.as_str().to_string(),
                            )
                        })
                        .collect();
                    story.push_back(Box::new(SizeRateGrid::new(cells, grid)));
                }
            }
        }
    }
    story
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn names(story: &VecDeque<Box<dyn Flowable>>) -> Vec<&'static str> {
        story.iter().map(|block| block.debug_name()).collect()
    }

    #[test]
    fn blocks_follow_document_order() {
        let mut doc = Document::new();
        let pl = doc.add_price_list("Spring");
        let cloth = doc.add_cloth(pl, "Cotton").expect("cloth");
        doc.add_type(cloth, "Round Neck").expect("type");
        doc.add_type(cloth, "V-Neck").expect("type");
        doc.add_price_list("");

        let story = build_story(doc.price_lists(), &LayoutConfig::default());
        assert_eq!(
            names(&story),
            vec![
                "Heading",
                "Heading",
                "Heading",
                "SizeRateGrid",
                "Heading",
                "SizeRateGrid",
                "Spacer",
                "Heading",
            ]
        );
    }

    #[test]
    fn labels_use_ordinals_and_placeholders() {
        let mut doc = Document::new();
        let pl = doc.add_price_list("Spring");
        let cloth = doc.add_cloth(pl, "Cotton").expect("cloth");
        let node = doc.add_type(cloth, "").expect("type");
        let pl_node = doc.price_list(pl).expect("pl");
        assert_eq!(price_list_title(pl_node), "PRICE LIST-(1) Spring");
        assert_eq!(cloth_label(doc.cloth(cloth).expect("cloth")), "[A. Cotton]");
        assert_eq!(type_label(doc.type_node(node).expect("type")), "I. Untitled Type");
    }

    #[test]
    fn wide_tables_become_several_segments_and_empty_ones_none() {
        let mut doc = Document::with_default_sizes(&[]).expect("doc");
        let pl = doc.add_price_list("pl");
        let cloth = doc.add_cloth(pl, "c").expect("cloth");
        let wide = doc.add_type(cloth, "wide").expect("type");
        doc.add_type(cloth, "empty").expect("type");
        for _ in 0..27 {
            doc.add_size(wide).expect("size");
        }
        let story = build_story(doc.price_lists(), &LayoutConfig::default());
        let grids = names(&story)
            .into_iter()
            .filter(|name| *name == "SizeRateGrid")
            .count();
        assert_eq!(grids, 3);
        assert_eq!(story.len(), 1 + 1 + 1 + 3 + 1);
    }
}
