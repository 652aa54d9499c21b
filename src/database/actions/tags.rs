use sqlx::{Pool, Postgres};

use crate::{
    error::{Error, HttpError, QueryError},
    jwt::SessionData,
    permissions::ActionType,
    schema::{Tag, Uuid},
};

use super::associations::{self, Relation};

pub async fn list_tags(owner_id: Uuid, pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags WHERE author_id = $1 ORDER BY name")
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(list)
}

pub async fn get_tag(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Tag>, Error> {
    let row: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(row)
}

/// Ownership guard for mutation. A tag that does not exist and a tag owned
/// by someone else are indistinguishable to the caller.
pub async fn get_tag_mut(
    id: Uuid,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Tag, Error> {
    session.authenticate(ActionType::ManageOwnTags)?;
    let tag = get_tag(id, pool).await?;

    match tag {
        Some(tag) => match session.authenticate(ActionType::ManageAllTags) {
            Ok(_) => Ok(tag),
            Err(_) => {
                if tag.author_id != session.user_id {
                    Err(HttpError::NotFound.default())
                } else {
                    Ok(tag)
                }
            }
        },
        None => Err(HttpError::NotFound.default()),
    }
}

pub async fn rename_tag(id: Uuid, name: &str, pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("UPDATE tags SET name = $1 WHERE id = $2")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}

/// Deletes the tag row itself; detaches it from every recipe first.
pub async fn delete_tag(id: Uuid, pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_tags_map WHERE tag_id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(())
}

pub async fn list_recipe_tags(recipe_id: Uuid, pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.id AS id, t.author_id AS author_id, t.name AS name
        FROM recipe_tags_map m
        INNER JOIN tags t ON t.id = m.tag_id
        WHERE m.recipe_id = $1
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::from(QueryError::from(e)))?;

    Ok(list)
}

pub async fn find_tag(
    owner_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Option<Uuid>, Error> {
    associations::find_by_name(owner_id, name, Relation::Tags, pool).await
}

pub async fn get_or_create_tag(
    owner_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Uuid, Error> {
    associations::get_or_create(owner_id, name, Relation::Tags, pool).await
}
