use sqlx::{Pool, Postgres};

use crate::{
    error::{Error, HttpError, QueryError},
    form::NameInput,
    schema::Uuid,
};

/// Selects which of the two many-to-many relations of a recipe an
/// operation works on. Both relation kinds share table shape, so one
/// implementation serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Tags,
    Ingredients,
}

impl Relation {
    pub fn item_table(self) -> &'static str {
        match self {
            Relation::Tags => "tags",
            Relation::Ingredients => "ingredients",
        }
    }

    pub fn map_table(self) -> &'static str {
        match self {
            Relation::Tags => "recipe_tags_map",
            Relation::Ingredients => "recipe_ingredients_map",
        }
    }

    pub fn item_column(self) -> &'static str {
        match self {
            Relation::Tags => "tag_id",
            Relation::Ingredients => "ingredient_id",
        }
    }
}

/// Exact, case-sensitive name lookup scoped to one owner.
pub async fn find_by_name(
    owner_id: Uuid,
    name: &str,
    relation: Relation,
    pool: &Pool<Postgres>,
) -> Result<Option<Uuid>, Error> {
    let table = relation.item_table();

    let row: Option<(i32,)> =
        sqlx::query_as(&format!("SELECT id FROM {table} WHERE author_id = $1 AND name = $2"))
            .bind(owner_id)
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row.map(|r| r.0))
}

/// Attempt-insert, on uniqueness conflict re-fetch. The `(author_id, name)`
/// unique constraint makes this safe under concurrent creation of the same
/// name by the same owner.
pub async fn get_or_create(
    owner_id: Uuid,
    name: &str,
    relation: Relation,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    let table = relation.item_table();

    let inserted: Option<(i32,)> = sqlx::query_as(&format!(
        "INSERT INTO {table} (author_id, name) VALUES ($1, $2) ON CONFLICT (author_id, name) DO NOTHING RETURNING id"
    ))
    .bind(owner_id)
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    if let Some(id) = inserted {
        return Ok(id.0);
    }

    match find_by_name(owner_id, name, relation, pool).await? {
        Some(id) => Ok(id),
        None => Err(HttpError::InternalServerError.new("Lost get-or-create race twice")),
    }
}

/// Attaches an item to a recipe. Associations are set-like; re-attaching
/// an already linked item is a no-op.
pub async fn link(
    recipe_id: Uuid,
    item_id: Uuid,
    relation: Relation,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let table = relation.map_table();
    let column = relation.item_column();

    sqlx::query(&format!(
        "INSERT INTO {table} (recipe_id, {column}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
    ))
    .bind(recipe_id)
    .bind(item_id)
    .execute(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}

/// Detaches everything from one relation of a recipe. The underlying
/// tag/ingredient rows are left in place.
pub async fn clear_associations(
    recipe_id: Uuid,
    relation: Relation,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let table = relation.map_table();

    sqlx::query(&format!("DELETE FROM {table} WHERE recipe_id = $1"))
        .bind(recipe_id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}

/// Resolves the requested names into rows owned by `owner_id`, creating
/// missing ones, and attaches them to the recipe. Duplicate names resolve
/// to the same row and attach once. Callers populating an update clear the
/// relation first; this only ever adds.
pub async fn reconcile(
    owner_id: Uuid,
    recipe_id: Uuid,
    requested: &[NameInput],
    relation: Relation,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let names = unique_names(requested);

    for name in &names {
        let item_id = get_or_create(owner_id, name, relation, pool).await?;
        link(recipe_id, item_id, relation, pool).await?;
    }

    log::trace!(
        "Reconciled {} {} for recipe {recipe_id}",
        names.len(),
        relation.item_table()
    );

    Ok(())
}

/// First-occurrence order, duplicates dropped.
pub fn unique_names(requested: &[NameInput]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(requested.len());
    for input in requested {
        if !seen.contains(&input.name.as_str()) {
            seen.push(&input.name);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<NameInput> {
        values
            .iter()
            .map(|name| NameInput {
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn unique_names_drops_duplicates_in_order() {
        let requested = names(&["Thai", "Dinner", "Thai", "Dessert", "Dinner"]);
        assert_eq!(unique_names(&requested), ["Thai", "Dinner", "Dessert"]);
    }

    #[test]
    fn unique_names_is_case_sensitive() {
        let requested = names(&["Thai", "thai"]);
        assert_eq!(unique_names(&requested), ["Thai", "thai"]);
    }

    #[test]
    fn unique_names_of_empty_list() {
        assert!(unique_names(&[]).is_empty());
    }

    #[test]
    fn relation_tables() {
        assert_eq!(Relation::Tags.item_table(), "tags");
        assert_eq!(Relation::Tags.map_table(), "recipe_tags_map");
        assert_eq!(Relation::Tags.item_column(), "tag_id");
        assert_eq!(Relation::Ingredients.item_table(), "ingredients");
        assert_eq!(Relation::Ingredients.map_table(), "recipe_ingredients_map");
        assert_eq!(Relation::Ingredients.item_column(), "ingredient_id");
    }
}
