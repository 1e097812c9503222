use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{Goal, NewGoal};
use crate::{
    error::ApiError,
    extract::{nullable, required_text},
    money::{percentage, validate_amount},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoal {
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub current_amount: Decimal,
    #[serde(default)]
    pub due_date: Option<Date>,
    #[serde(default)]
    pub is_completed: bool,
}

impl CreateGoal {
    pub fn validate(self) -> Result<NewGoal, ApiError> {
        Ok(NewGoal {
            name: required_text("name", &self.name)?,
            target_amount: validate_amount("targetAmount", self.target_amount)?,
            current_amount: validate_amount("currentAmount", self.current_amount)?,
            due_date: self.due_date,
            is_completed: self.is_completed,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchGoal {
    pub name: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<Date>>,
    pub is_completed: Option<bool>,
}

impl PatchGoal {
    pub fn apply(self, g: &mut Goal) -> Result<(), ApiError> {
        if let Some(name) = self.name {
            g.name = required_text("name", &name)?;
        }
        if let Some(target) = self.target_amount {
            g.target_amount = validate_amount("targetAmount", target)?;
        }
        if let Some(current) = self.current_amount {
            g.current_amount = validate_amount("currentAmount", current)?;
        }
        if let Some(due) = self.due_date {
            g.due_date = due;
        }
        if let Some(done) = self.is_completed {
            g.is_completed = done;
        }
        Ok(())
    }
}

/// Goal plus how far along it is.
#[derive(Debug, Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub percentage: i64,
}

impl From<Goal> for GoalView {
    fn from(goal: Goal) -> Self {
        Self {
            percentage: percentage(goal.current_amount, goal.target_amount),
            goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn goal(current: i64, target: i64) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Car".into(),
            target_amount: Decimal::from(target),
            current_amount: Decimal::from(current),
            due_date: None,
            is_completed: false,
        }
    }

    #[test]
    fn current_amount_defaults_to_zero() {
        let body: CreateGoal =
            serde_json::from_str(r#"{"name":" Emergency fund ","targetAmount":"1000"}"#).unwrap();
        let new = body.validate().unwrap();
        assert_eq!(new.name, "Emergency fund");
        assert_eq!(new.current_amount, Decimal::ZERO);
    }

    #[test]
    fn rejects_negative_target() {
        let body: CreateGoal =
            serde_json::from_str(r#"{"name":"x","targetAmount":"-1"}"#).unwrap();
        assert!(matches!(body.validate(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn view_derives_percentage() {
        assert_eq!(GoalView::from(goal(250, 1000)).percentage, 25);
        assert_eq!(GoalView::from(goal(5, 0)).percentage, 0);
        let json = serde_json::to_value(GoalView::from(goal(1, 3))).unwrap();
        assert_eq!(json["percentage"], 33);
        assert_eq!(json["targetAmount"], "3");
    }

    #[test]
    fn patch_clears_due_date() {
        let mut g = goal(0, 10);
        g.due_date = Some(time::macros::date!(2025 - 01 - 01));
        let patch: PatchGoal =
            serde_json::from_str(r#"{"dueDate":null,"isCompleted":true}"#).unwrap();
        patch.apply(&mut g).unwrap();
        assert_eq!(g.due_date, None);
        assert!(g.is_completed);
    }
}
