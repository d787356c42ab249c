use std::fmt;

/// Titled, append-only list of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemList {
    title: String,
    items: Vec<String>,
}

impl Default for ItemList {
    fn default() -> Self {
        Self {
            title: "My Angular Library Component".to_owned(),
            items: (1..=3).map(|n| format!("Item {n}")).collect(),
        }
    }
}

impl ItemList {
    /// Append `Item <n+1>`.
    pub fn add_item(&mut self) {
        let next = self.items.len() + 1;
        self.items.push(format!("Item {next}"));
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }
}

impl fmt::Display for ItemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for item in &self.items {
            write!(f, "\n  - {item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn starts_with_three_items() {
        assert_eq!(ItemList::default().items(), ["Item 1", "Item 2", "Item 3"]);
    }

    #[test]
    fn add_item_numbers_from_current_length() {
        let mut list = ItemList::default();
        list.add_item();
        list.add_item();
        assert_eq!(list.items().last().map(String::as_str), Some("Item 5"));
    }

    #[test]
    fn renders_title_then_items() {
        let rendered = ItemList::default().to_string();
        assert_eq!(
            rendered,
            "My Angular Library Component\n  - Item 1\n  - Item 2\n  - Item 3"
        );
    }
}
