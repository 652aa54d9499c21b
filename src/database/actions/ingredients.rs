use sqlx::{Pool, Postgres};

use crate::{
    error::{Error, HttpError, QueryError},
    jwt::SessionData,
    permissions::ActionType,
    schema::{Ingredient, Uuid},
};

use super::associations::{self, Relation};

pub async fn list_ingredients(
    owner_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, Error> {
    let list: Vec<Ingredient> =
        sqlx::query_as("SELECT * FROM ingredients WHERE author_id = $1 ORDER BY name")
            .bind(owner_id)
            .fetch_all(pool)
            .await
            .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(list)
}

pub async fn get_ingredient(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

pub async fn get_ingredient_mut(
    id: Uuid,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Ingredient, Error> {
    session.authenticate(ActionType::ManageOwnIngredients)?;
    let ingredient = get_ingredient(id, pool).await?;

    match ingredient {
        Some(ingredient) => match session.authenticate(ActionType::ManageAllIngredients) {
            Ok(_) => Ok(ingredient),
            Err(_) => {
                if ingredient.author_id != session.user_id {
                    Err(HttpError::NotFound.default())
                } else {
                    Ok(ingredient)
                }
            }
        },
        None => Err(HttpError::NotFound.default()),
    }
}

pub async fn rename_ingredient(id: Uuid, name: &str, pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("UPDATE ingredients SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}

pub async fn delete_ingredient(id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_ingredients_map WHERE ingredient_id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}

pub async fn list_recipe_ingredients(
    recipe_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, Error> {
    let list: Vec<Ingredient> = sqlx::query_as(
        "
        SELECT i.id AS id, i.author_id AS author_id, i.name AS name
        FROM recipe_ingredients_map m
        INNER JOIN ingredients i ON i.id = m.ingredient_id
        WHERE m.recipe_id = $1
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(list)
}

pub async fn find_ingredient(
    owner_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Option<Uuid>, Error> {
    associations::find_by_name(owner_id, name, Relation::Ingredients, pool).await
}

pub async fn get_or_create_ingredient(
    owner_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    associations::get_or_create(owner_id, name, Relation::Ingredients, pool).await
}
