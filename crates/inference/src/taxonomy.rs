use crate::label::ClassLabel;
use std::collections::HashMap;

pub const DEFAULT_CATEGORY: &str = "Other";

/// Maps fine-grained class labels to inventory categories.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct CategoryTaxonomy {
    entries: HashMap<String, String>,
    default_category: String,
}

impl CategoryTaxonomy {
    pub fn standard() -> Self {
        let entries = [
            (ClassLabel::Chair, "Furniture"),
            (ClassLabel::Table, "Furniture"),
            (ClassLabel::Computer, "IT Equipment"),
            (ClassLabel::Vehicle, "Transport"),
            (ClassLabel::Equipment, "Equipment"),
        ]
        .into_iter()
        .map(|(label, category)| (label.as_str().to_string(), category.to_string()))
        .collect();

        Self {
            entries,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Total lookup: labels without an entry fall back to the default category.
    pub fn categorize(&self, label: &str) -> &str {
        self.entries
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.default_category)
    }

    pub fn category_of(&self, label: ClassLabel) -> &str {
        self.categorize(label.as_str())
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_mapping() {
        let taxonomy = CategoryTaxonomy::standard();
        assert_eq!(taxonomy.category_of(ClassLabel::Chair), "Furniture");
        assert_eq!(taxonomy.category_of(ClassLabel::Table), "Furniture");
        assert_eq!(taxonomy.category_of(ClassLabel::Computer), "IT Equipment");
        assert_eq!(taxonomy.category_of(ClassLabel::Vehicle), "Transport");
        assert_eq!(taxonomy.category_of(ClassLabel::Equipment), "Equipment");
    }

    #[test]
    fn test_unknown_labels_map_to_other() {
        let taxonomy = CategoryTaxonomy::standard();
        for label in ["Sofa", "", "chair", "TABLE"] {
            assert_eq!(taxonomy.categorize(label), "Other", "label {:?}", label);
        }
        assert_eq!(taxonomy.default_category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_every_known_label_is_mapped() {
        let taxonomy = CategoryTaxonomy::standard();
        for label in ClassLabel::ALL {
            assert_ne!(taxonomy.category_of(label), DEFAULT_CATEGORY);
            assert_eq!(taxonomy.category_of(label), taxonomy.category_of(label));
        }
    }
}
