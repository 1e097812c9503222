use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Spending/income category. `user_id == None` marks a shared default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub is_income: bool,
}

impl Category {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub is_income: bool,
}

/// Shared categories seeded for every installation: (name, icon, color, is_income).
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str, bool)] = &[
    ("Income", "trending_up", "#66BB6A", true),
    ("Groceries", "shopping_bag", "#42A5F5", false),
    ("Dining", "restaurant", "#AB47BC", false),
    ("Transportation", "directions_car", "#FFA726", false),
    ("Housing", "home", "#1976D2", false),
    ("Utilities", "power", "#EF5350", false),
    ("Entertainment", "local_movies", "#EC407A", false),
    ("Shopping", "shopping_cart", "#7E57C2", false),
    ("Health", "favorite", "#26A69A", false),
    ("Other", "more_horiz", "#78909C", false),
];

pub const UNCATEGORIZED_NAME: &str = "Other";
pub const UNCATEGORIZED_COLOR: &str = "#78909C";
