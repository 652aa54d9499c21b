use serde::Deserialize;

use super::error::TypeError;
use crate::constants::MIN_PASSWORD_LENGTH;

/// Name descriptor for a tag or ingredient, as it appears in request
/// bodies: `{"name": "Thai"}`. Names are matched exactly, no trimming
/// or case-folding.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NameInput {
    pub name: String,
}

impl NameInput {
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.name.is_empty() {
            return Err(TypeError::new("Name must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), TypeError> {
        if !self.email.contains('@') {
            return Err(TypeError::new("Invalid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(TypeError::new("Password is too short"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    pub fn validate(&self) -> Result<(), TypeError> {
        if let Some(password) = &self.password {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(TypeError::new("Password is too short"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    pub link: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<NameInput>,
    #[serde(default)]
    pub ingredients: Vec<NameInput>,
}

impl NewRecipe {
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.title.is_empty() {
            return Err(TypeError::new("Title must not be empty"));
        }
        if self.time_minutes < 0 {
            return Err(TypeError::new("Duration must not be negative"));
        }
        if self.price < 0.0 {
            return Err(TypeError::new("Price must not be negative"));
        }
        for name in self.tags.iter().chain(self.ingredients.iter()) {
            name.validate()?;
        }
        Ok(())
    }
}

/// Partial update payload. A `None` relation list means the key was absent
/// from the request and the association set is left alone; `Some(vec![])`
/// clears it. Ownership is not representable here, so a `user` key in the
/// body is dropped on deserialization and never reassigns the recipe.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Option<Vec<NameInput>>,
    pub ingredients: Option<Vec<NameInput>>,
}

impl RecipePatch {
    pub fn validate(&self) -> Result<(), TypeError> {
        if let Some(title) = &self.title {
            if title.is_empty() {
                return Err(TypeError::new("Title must not be empty"));
            }
        }
        if let Some(time_minutes) = self.time_minutes {
            if time_minutes < 0 {
                return Err(TypeError::new("Duration must not be negative"));
            }
        }
        if let Some(price) = self.price {
            if price < 0.0 {
                return Err(TypeError::new("Price must not be negative"));
            }
        }
        for name in self.tags.iter().flatten() {
            name.validate()?;
        }
        for name in self.ingredients.iter().flatten() {
            name.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_recipe_defaults() {
        let form: NewRecipe = serde_json::from_str(
            r#"{"title": "Sample recipe", "time_minutes": 22, "price": 5.25}"#,
        )
        .unwrap();

        assert!(form.validate().is_ok());
        assert_eq!(form.description, "");
        assert!(form.link.is_none());
        assert!(form.tags.is_empty());
        assert!(form.ingredients.is_empty());
    }

    #[test]
    fn new_recipe_rejects_bad_scalars() {
        let form: NewRecipe =
            serde_json::from_str(r#"{"title": "", "time_minutes": 5, "price": 1.0}"#).unwrap();
        assert!(form.validate().is_err());

        let form: NewRecipe =
            serde_json::from_str(r#"{"title": "x", "time_minutes": -1, "price": 1.0}"#).unwrap();
        assert!(form.validate().is_err());

        let form: NewRecipe =
            serde_json::from_str(r#"{"title": "x", "time_minutes": 5, "price": -0.5}"#).unwrap();
        assert!(form.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_absent_from_empty() {
        let patch: RecipePatch = serde_json::from_str(r#"{"title": "New title"}"#).unwrap();
        assert!(patch.tags.is_none());
        assert!(patch.ingredients.is_none());

        let patch: RecipePatch = serde_json::from_str(r#"{"tags": []}"#).unwrap();
        assert_eq!(patch.tags, Some(vec![]));
        assert!(patch.ingredients.is_none());

        let patch: RecipePatch =
            serde_json::from_str(r#"{"tags": [{"name": "Thai"}, {"name": "Dinner"}]}"#).unwrap();
        let names: Vec<&str> = patch
            .tags
            .as_deref()
            .unwrap()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, ["Thai", "Dinner"]);
    }

    #[test]
    fn patch_ignores_user_key() {
        let patch: RecipePatch =
            serde_json::from_str(r#"{"title": "New title", "user": 7}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
    }

    #[test]
    fn new_user_validation() {
        let form: NewUser =
            serde_json::from_str(r#"{"email": "user@example.com", "password": "testpass123"}"#)
                .unwrap();
        assert!(form.validate().is_ok());
        assert_eq!(form.name, "");

        let form: NewUser =
            serde_json::from_str(r#"{"email": "not-an-email", "password": "testpass123"}"#)
                .unwrap();
        assert!(form.validate().is_err());

        let form: NewUser =
            serde_json::from_str(r#"{"email": "user@example.com", "password": "pw"}"#).unwrap();
        assert!(form.validate().is_err());
    }
}
