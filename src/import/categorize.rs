use uuid::Uuid;

use super::repo_types::KeywordRules;
use crate::categories::repo_types::Category;

/// Built-in keyword groups, tried in order after any user rules.
pub const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "groceries",
        &["grocery", "supermarket", "food", "market", "walmart", "kroger", "target", "costco", "aldi"],
    ),
    (
        "dining",
        &["restaurant", "cafe", "coffee", "burger", "pizza", "grill", "starbucks", "mcdonald"],
    ),
    (
        "transportation",
        &["gas", "fuel", "uber", "lyft", "taxi", "transit", "train", "bus", "subway", "parking"],
    ),
    (
        "utilities",
        &["utility", "electric", "water", "gas", "power", "internet", "bill", "phone", "cable"],
    ),
    (
        "entertainment",
        &["movie", "theater", "netflix", "spotify", "disney", "amazon prime", "hulu", "ticket"],
    ),
    (
        "shopping",
        &["amazon", "store", "mall", "shop", "online", "retail", "purchase"],
    ),
    (
        "health",
        &["doctor", "pharmacy", "medical", "clinic", "hospital", "dental", "healthcare"],
    ),
    (
        "housing",
        &["rent", "mortgage", "apartment", "home", "lease", "property"],
    ),
];

/// Visible category with this name, the user's own row winning over a shared one.
pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    let name = name.trim().to_lowercase();
    let mut matches = categories.iter().filter(|c| c.name.to_lowercase() == name);
    let first = matches.next()?;
    if first.user_id.is_some() {
        return Some(first);
    }
    Some(matches.find(|c| c.user_id.is_some()).unwrap_or(first))
}

/// Picks a category for an imported line.
///
/// Income goes to the first income category. Expenses are matched by
/// lower-case substring against `rules` and then [`KEYWORDS`]; a group only
/// wins when a category of that name is visible to the user.
pub fn categorize(
    description: &str,
    is_income: bool,
    categories: &[Category],
    rules: &KeywordRules,
) -> Option<Uuid> {
    if is_income {
        return categories.iter().find(|c| c.is_income).map(|c| c.id);
    }
    let text = description.to_lowercase();
    let hit = |keywords: &[String]| {
        keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && text.contains(&k))
    };

    let user_groups = rules.iter().map(|(name, words)| (name.as_str(), hit(words.as_slice())));
    let builtin = KEYWORDS.iter().map(|(name, words)| {
        let words: Vec<String> = words.iter().map(|w| (*w).to_string()).collect();
        (*name, hit(words.as_slice()))
    });

    user_groups
        .chain(builtin)
        .filter(|(_, matched)| *matched)
        .find_map(|(name, _)| find_by_name(categories, name))
        .map(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(name: &str, owner: Option<Uuid>, is_income: bool) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: owner,
            name: name.into(),
            icon: "label".into(),
            color: "#000000".into(),
            is_income,
        }
    }

    fn defaults() -> Vec<Category> {
        ["Income", "Groceries", "Dining", "Transportation", "Utilities", "Shopping", "Housing"]
            .into_iter()
            .map(|n| cat(n, None, n == "Income"))
            .collect()
    }

    #[test]
    fn income_goes_to_income_category() {
        let cats = defaults();
        assert_eq!(
            categorize("ACME PAYROLL", true, &cats, &KeywordRules::new()),
            Some(cats[0].id)
        );
    }

    #[test]
    fn builtin_keywords_in_table_order() {
        let cats = defaults();
        let rules = KeywordRules::new();
        let id_of = |name: &str| cats.iter().find(|c| c.name == name).map(|c| c.id);

        assert_eq!(categorize("STARBUCKS #42", false, &cats, &rules), id_of("Dining"));
        assert_eq!(categorize("Whole Foods Market", false, &cats, &rules), id_of("Groceries"));
        // "gas" is listed for transportation before utilities.
        assert_eq!(categorize("Shell Gas Station", false, &cats, &rules), id_of("Transportation"));
        assert_eq!(categorize("Monthly rent", false, &cats, &rules), id_of("Housing"));
        assert_eq!(categorize("Zelle to Bob", false, &cats, &rules), None);
    }

    #[test]
    fn group_without_visible_category_falls_through() {
        let cats = defaults();
        // No "Entertainment" category, so "amazon prime" lands in Shopping via "amazon".
        let shopping = cats.iter().find(|c| c.name == "Shopping").map(|c| c.id);
        assert_eq!(
            categorize("AMAZON PRIME VIDEO", false, &cats, &KeywordRules::new()),
            shopping
        );
    }

    #[test]
    fn user_rules_win_and_own_categories_are_preferred() {
        let user = Uuid::new_v4();
        let mut cats = defaults();
        let own_dining = cat("dining", Some(user), false);
        let pets = cat("Pets", Some(user), false);
        cats.push(own_dining.clone());
        cats.push(pets.clone());

        let mut rules = KeywordRules::new();
        rules.insert("Pets".into(), vec!["PetSmart".into(), "  ".into()]);

        assert_eq!(categorize("PETSMART food", false, &cats, &rules), Some(pets.id));
        assert_eq!(
            categorize("Pizza Hut", false, &cats, &rules),
            Some(own_dining.id)
        );
    }
}
