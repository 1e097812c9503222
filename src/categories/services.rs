use uuid::Uuid;

use crate::{error::ApiError, store::Store};

/// Rejects a category reference the user cannot see.
pub async fn check_visible(
    store: &dyn Store,
    user_id: Uuid,
    category_id: Option<Uuid>,
) -> Result<(), ApiError> {
    let Some(id) = category_id else {
        return Ok(());
    };
    match store.get_category(user_id, id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::bad_request("Unknown category")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        categories::repo_types::NewCategory,
        store::{default_category_id, MemStore},
    };

    #[tokio::test]
    async fn shared_and_own_categories_are_visible() {
        let store = MemStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let own = store
            .create_category(
                alice,
                NewCategory {
                    name: "Pets".into(),
                    icon: "pets".into(),
                    color: "#123456".into(),
                    is_income: false,
                },
            )
            .await
            .unwrap();

        assert!(check_visible(&store, alice, None).await.is_ok());
        assert!(check_visible(&store, alice, Some(own.id)).await.is_ok());
        assert!(check_visible(&store, bob, Some(default_category_id(0))).await.is_ok());
        assert!(matches!(
            check_visible(&store, bob, Some(own.id)).await,
            Err(ApiError::BadRequest(_))
        ));
    }
}
