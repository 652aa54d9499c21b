use crate::jwt::SessionData;
use crate::schema::UserRole;

const ACTION_TABLE: &[(UserRole, &[ActionType])] = &[
    (
        UserRole::User,
        &[
            ActionType::CreateRecipes,
            ActionType::CreateTags,
            ActionType::CreateIngredients,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnTags,
            ActionType::ManageOwnIngredients,
        ],
    ),
    (
        UserRole::Admin,
        &[
            ActionType::CreateRecipes,
            ActionType::CreateTags,
            ActionType::CreateIngredients,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnTags,
            ActionType::ManageOwnIngredients,
            ActionType::ManageUsers,
            ActionType::ManageAllRecipes,
            ActionType::ManageAllTags,
            ActionType::ManageAllIngredients,
        ],
    ),
];

#[derive(Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    CreateRecipes,
    CreateTags,
    CreateIngredients,

    ManageOwnRecipes,
    ManageOwnTags,
    ManageOwnIngredients,

    ManageUsers,
    ManageAllRecipes,
    ManageAllTags,
    ManageAllIngredients,
}

impl ActionType {
    pub fn authenticate(self, session: &SessionData) -> bool {
        let user_uid = &session.user_uid;

        ACTION_TABLE
            .iter()
            .find_map(|(uid, actions)| {
                if user_uid != uid {
                    return None;
                }

                Some(actions.contains(&self))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: UserRole) -> SessionData {
        SessionData {
            user_id: 1,
            email: "user@example.com".to_string(),
            is_admin: role == UserRole::Admin,
            user_uid: role,
        }
    }

    #[test]
    fn users_manage_their_own_resources() {
        let session = session(UserRole::User);

        assert!(ActionType::CreateRecipes.authenticate(&session));
        assert!(ActionType::ManageOwnRecipes.authenticate(&session));
        assert!(ActionType::ManageOwnTags.authenticate(&session));
        assert!(!ActionType::ManageAllRecipes.authenticate(&session));
        assert!(!ActionType::ManageUsers.authenticate(&session));
    }

    #[test]
    fn admins_manage_everything() {
        let session = session(UserRole::Admin);

        assert!(ActionType::ManageAllRecipes.authenticate(&session));
        assert!(ActionType::ManageAllIngredients.authenticate(&session));
        assert!(ActionType::ManageUsers.authenticate(&session));
    }
}
