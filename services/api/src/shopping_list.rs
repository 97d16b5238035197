//! Shopping-list aggregation and export
//!
//! The grouped-sum query lives in `RelationRepository::shopping_list`; this
//! module renders the result as the downloadable line-oriented text file.

use sqlx::FromRow;

/// Download filename advertised in the Content-Disposition header
pub const ATTACHMENT_FILENAME: &str = "shopping_list.txt";

/// One aggregated shopping-list group: quantities summed across every
/// recipe in the user's cart, grouped by (name, unit)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Render aggregated entries as a newline-terminated text document, one
/// line per group. Empty input yields an empty document, not an error.
pub fn render(entries: &[ShoppingListEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{} - {} {}\n",
            entry.name, entry.amount, entry.measurement_unit
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, unit: &str, amount: i64) -> ShoppingListEntry {
        ShoppingListEntry {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_render_single_line_per_group() {
        // Flour appearing in two cart recipes arrives pre-summed as one group
        let entries = vec![entry("flour", "g", 150)];
        assert_eq!(render(&entries), "flour - 150 g\n");
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_is_deterministic_for_fixed_input() {
        let entries = vec![
            entry("flour", "g", 150),
            entry("milk", "ml", 500),
            entry("salt", "g", 5),
        ];
        let first = render(&entries);
        let second = render(&entries);
        assert_eq!(first, second);
        assert_eq!(first, "flour - 150 g\nmilk - 500 ml\nsalt - 5 g\n");
    }

    #[test]
    fn test_render_distinguishes_units() {
        // Same ingredient name with different units stays as separate groups
        let entries = vec![entry("sugar", "g", 200), entry("sugar", "tbsp", 2)];
        assert_eq!(render(&entries), "sugar - 200 g\nsugar - 2 tbsp\n");
    }
}
