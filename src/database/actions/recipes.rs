use sqlx::{Pool, Postgres};

use crate::{
    constants::RECIPE_COUNT_PER_PAGE,
    error::{Error, HttpError, QueryError},
    form::{NewRecipe, RecipePatch},
    jwt::SessionData,
    pagination::PageContext,
    permissions::ActionType,
    schema::{Recipe, RecipeDetail, RecipeRow, Uuid},
};

use super::associations::{clear_associations, reconcile, Relation};
use super::{ingredients, tags};

pub async fn fetch_recipes(
    owner_id: Uuid,
    offset: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeRow>, Error> {
    let rows: Vec<RecipeRow> = sqlx::query_as(
        "
        SELECT id, author_id, title, time_minutes, price, link, image, COUNT(*) OVER() AS count
        FROM recipes
        WHERE author_id = $1
        ORDER BY id DESC
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(owner_id)
    .bind(RECIPE_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    let total_count = rows.get(0).map(|r| r.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, RECIPE_COUNT_PER_PAGE, offset);
    Ok(page)
}

pub async fn get_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

/// Ownership guard for read-for-mutation. Missing recipes and recipes
/// owned by someone else both surface as not-found, so existence is never
/// revealed to non-owners. Admins pass via the permission table.
pub async fn get_recipe_mut(
    id: Uuid,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    session.authenticate(ActionType::ManageOwnRecipes)?;
    let recipe = get_recipe(id, pool).await?;

    match recipe {
        Some(recipe) => match session.authenticate(ActionType::ManageAllRecipes) {
            Ok(_) => Ok(recipe),
            Err(_) => {
                if recipe.author_id != session.user_id {
                    Err(HttpError::NotFound.default())
                } else {
                    Ok(recipe)
                }
            }
        },
        None => Err(HttpError::NotFound.default()),
    }
}

/// Persists the scalar fields, then populates both association sets from
/// scratch.
pub async fn create_recipe(
    owner_id: Uuid,
    form: &NewRecipe,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    form.validate().map_err(Error::from)?;

    let id: (i32,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, title, time_minutes, price, description, link, image)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
    ",
    )
    .bind(owner_id)
    .bind(&form.title)
    .bind(form.time_minutes)
    .bind(form.price)
    .bind(&form.description)
    .bind(&form.link)
    .bind(&form.image)
    .fetch_one(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    reconcile(owner_id, id.0, &form.tags, Relation::Tags, pool).await?;
    reconcile(owner_id, id.0, &form.ingredients, Relation::Ingredients, pool).await?;

    Ok(id.0)
}

/// Partial update. Scalar fields present in the patch overwrite, absent
/// fields stay. A present relation list replaces that association set
/// wholesale (clear, then reconcile); an absent one is left untouched.
/// Ownership never changes here. The clear-then-repopulate sequence is not
/// atomic; concurrent updates of one recipe may lose associations.
pub async fn update_recipe(
    recipe: &Recipe,
    patch: &RecipePatch,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    patch.validate().map_err(Error::from)?;

    sqlx::query(
        "
        UPDATE recipes SET
        title = COALESCE($1, title),
        time_minutes = COALESCE($2, time_minutes),
        price = COALESCE($3, price),
        description = COALESCE($4, description),
        link = COALESCE($5, link),
        image = COALESCE($6, image)
        WHERE id = $7
    ",
    )
    .bind(&patch.title)
    .bind(patch.time_minutes)
    .bind(patch.price)
    .bind(&patch.description)
    .bind(&patch.link)
    .bind(&patch.image)
    .bind(recipe.id)
    .execute(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    if let Some(requested) = &patch.tags {
        clear_associations(recipe.id, Relation::Tags, pool).await?;
        reconcile(recipe.author_id, recipe.id, requested, Relation::Tags, pool).await?;
    }

    if let Some(requested) = &patch.ingredients {
        clear_associations(recipe.id, Relation::Ingredients, pool).await?;
        reconcile(
            recipe.author_id,
            recipe.id,
            requested,
            Relation::Ingredients,
            pool,
        )
        .await?;
    }

    Ok(())
}

pub async fn delete_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    clear_associations(id, Relation::Tags, pool).await?;
    clear_associations(id, Relation::Ingredients, pool).await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}

pub async fn get_recipe_detail(
    recipe: Recipe,
    pool: &Pool<Postgres>,
) -> Result<RecipeDetail, Error> {
    let tags = tags::list_recipe_tags(recipe.id, pool).await?;
    let ingredients = ingredients::list_recipe_ingredients(recipe.id, pool).await?;

    Ok(RecipeDetail::from_parts(recipe, tags, ingredients))
}
