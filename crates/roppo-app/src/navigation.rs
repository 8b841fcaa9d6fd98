// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::CatalogItem;

/// Items whose title contains `term`, ignoring case. An empty term keeps
/// everything in source order.
pub fn filter_items<'a>(items: &'a [CatalogItem], term: &str) -> Vec<&'a CatalogItem> {
    if term.is_empty() {
        return items.iter().collect();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup<'a> {
    pub name: &'a str,
    pub items: Vec<&'a CatalogItem>,
}

/// Groups by section name in first-occurrence order, then stable-sorts each
/// group by `section_order`. Missing orders sort last.
pub fn group_by_section<'a>(items: &[&'a CatalogItem]) -> Vec<SectionGroup<'a>> {
    let mut groups: Vec<SectionGroup<'a>> = Vec::new();
    for &item in items {
        match groups
            .iter_mut()
            .find(|group| group.name == item.section_name)
        {
            Some(group) => group.items.push(item),
            None => groups.push(SectionGroup {
                name: &item.section_name,
                items: vec![item],
            }),
        }
    }

    for group in &mut groups {
        group
            .items
            .sort_by(|left, right| compare_section_order(left.section_order, right.section_order));
    }
    groups
}

fn compare_section_order(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sidebar label, e.g. `3. 監査基準`.
pub fn item_label(item: &CatalogItem) -> String {
    format!("{}. {}", format_section_order(item.section_order), item.title)
}

pub fn format_section_order(order: Option<f64>) -> String {
    match order {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", value as i64)
        }
        Some(value) => format!("{value}"),
        None => "-".to_owned(),
    }
}

/// The grouped sidebar view for one search term.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationIndex<'a> {
    groups: Vec<SectionGroup<'a>>,
    match_count: usize,
    searching: bool,
}

impl<'a> NavigationIndex<'a> {
    pub fn build(items: &'a [CatalogItem], term: &str) -> Self {
        let filtered = filter_items(items, term);
        Self {
            match_count: filtered.len(),
            groups: group_by_section(&filtered),
            searching: !term.is_empty(),
        }
    }

    pub fn groups(&self) -> &[SectionGroup<'a>] {
        &self.groups
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn is_empty(&self) -> bool {
        self.match_count == 0
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }
}

#[cfg(test)]
mod tests {
    use super::{
        NavigationIndex, filter_items, format_section_order, group_by_section, item_label,
    };
    use crate::{CatalogItem, CatalogItemId};

    fn item(id: i64, section: &str, order: Option<f64>, title: &str, row: usize) -> CatalogItem {
        CatalogItem {
            id: Some(CatalogItemId::new(id)),
            section_name: section.to_owned(),
            section_order: order,
            title: title.to_owned(),
            url: format!("https://example.com/{id}"),
            url2: None,
            row,
        }
    }

    fn ids(items: &[&CatalogItem]) -> Vec<i64> {
        items
            .iter()
            .filter_map(|item| item.id.map(CatalogItemId::get))
            .collect()
    }

    #[test]
    fn empty_term_returns_everything() {
        let catalog = vec![
            item(1, "A", Some(1.0), "Foo", 0),
            item(2, "B", Some(1.0), "Bar", 1),
        ];
        assert_eq!(ids(&filter_items(&catalog, "")), vec![1, 2]);
    }

    #[test]
    fn filter_is_case_insensitive_substring_on_title() {
        let catalog = vec![
            item(1, "A", Some(1.0), "IFRS 第9号 Financial Instruments", 0),
            item(2, "A", Some(2.0), "収益認識基準", 1),
            item(3, "B", Some(1.0), "ifrs 第15号", 2),
        ];
        assert_eq!(ids(&filter_items(&catalog, "Ifrs")), vec![1, 3]);
        assert_eq!(ids(&filter_items(&catalog, "収益")), vec![2]);
        assert!(filter_items(&catalog, "nothing here").is_empty());
    }

    #[test]
    fn group_sorts_within_section_by_order() {
        let catalog = vec![
            item(1, "A", Some(2.0), "Foo", 0),
            item(2, "A", Some(1.0), "Bar", 1),
        ];
        let filtered = filter_items(&catalog, "");
        let groups = group_by_section(&filtered);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "A");
        assert_eq!(ids(&groups[0].items), vec![2, 1]);
    }

    #[test]
    fn group_keeps_first_occurrence_section_order() {
        let catalog = vec![
            item(1, "B", Some(1.0), "b1", 0),
            item(2, "A", Some(1.0), "a1", 1),
            item(3, "B", Some(0.0), "b0", 2),
            item(4, "C", Some(1.0), "c1", 3),
        ];
        let filtered = filter_items(&catalog, "");
        let names = group_by_section(&filtered)
            .iter()
            .map(|group| group.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn equal_orders_keep_input_order() {
        let catalog = vec![
            item(10, "A", Some(1.0), "first", 0),
            item(11, "A", Some(0.5), "zero", 1),
            item(12, "A", Some(1.0), "second", 2),
            item(13, "A", Some(1.0), "third", 3),
        ];
        let filtered = filter_items(&catalog, "");
        let groups = group_by_section(&filtered);
        assert_eq!(ids(&groups[0].items), vec![11, 10, 12, 13]);
    }

    #[test]
    fn missing_orders_sort_after_present_ones() {
        let catalog = vec![
            item(1, "A", None, "unknown", 0),
            item(2, "A", Some(5.0), "five", 1),
            item(3, "A", None, "unknown too", 2),
            item(4, "A", Some(-1.0), "negative", 3),
        ];
        let filtered = filter_items(&catalog, "");
        let groups = group_by_section(&filtered);
        assert_eq!(ids(&groups[0].items), vec![4, 2, 1, 3]);
    }

    #[test]
    fn index_without_matches_is_empty() {
        let catalog = vec![item(1, "A", Some(1.0), "Foo", 0)];
        let index = NavigationIndex::build(&catalog, "zzz");
        assert!(index.is_empty());
        assert_eq!(index.match_count(), 0);
        assert!(index.groups().is_empty());
        assert!(index.is_searching());
    }

    #[test]
    fn index_counts_matches_across_sections() {
        let catalog = vec![
            item(1, "A", Some(1.0), "Foo", 0),
            item(2, "B", Some(1.0), "Food", 1),
            item(3, "B", Some(2.0), "Bar", 2),
        ];
        let index = NavigationIndex::build(&catalog, "foo");
        assert_eq!(index.match_count(), 2);
        assert_eq!(index.groups().len(), 2);

        let all = NavigationIndex::build(&catalog, "");
        assert_eq!(all.match_count(), 3);
        assert!(!all.is_searching());
    }

    #[test]
    fn labels_print_integral_orders_without_fraction() {
        assert_eq!(item_label(&item(1, "A", Some(3.0), "監査基準", 0)), "3. 監査基準");
        assert_eq!(format_section_order(Some(2.5)), "2.5");
        assert_eq!(format_section_order(None), "-");
    }
}
