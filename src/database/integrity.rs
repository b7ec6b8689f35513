//! Explicit referential checks. The schema uses NO ACTION throughout, so a
//! write names its parents before inserting and a delete counts its
//! dependents before removing anything.

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::warn;

use crate::app::AppError;
use crate::schema::{articles, blogs, categories, comments, tags, users};

fn missing(reference: &str, id: i64) -> AppError {
    AppError::ReferentialIntegrityViolation(format!("{} {} does not exist", reference, id))
}

pub fn require_user(conn: &SqliteConnection, id: i64) -> Result<(), AppError> {
    let found: bool = diesel::select(exists(users::table.find(id))).get_result(conn)?;
    if !found {
        return Err(missing("user", id));
    }
    Ok(())
}

pub fn require_blog(conn: &SqliteConnection, id: i64) -> Result<(), AppError> {
    let found: bool = diesel::select(exists(blogs::table.find(id))).get_result(conn)?;
    if !found {
        return Err(missing("blog", id));
    }
    Ok(())
}

pub fn require_category(conn: &SqliteConnection, id: i32) -> Result<(), AppError> {
    let found: bool = diesel::select(exists(categories::table.find(id))).get_result(conn)?;
    if !found {
        return Err(missing("category", i64::from(id)));
    }
    Ok(())
}

pub fn require_tag(conn: &SqliteConnection, id: i32) -> Result<(), AppError> {
    let found: bool = diesel::select(exists(tags::table.find(id))).get_result(conn)?;
    if !found {
        return Err(missing("tag", i64::from(id)));
    }
    Ok(())
}

pub fn require_article(conn: &SqliteConnection, id: i64) -> Result<(), AppError> {
    let found: bool = diesel::select(exists(articles::table.find(id))).get_result(conn)?;
    if !found {
        return Err(missing("article", id));
    }
    Ok(())
}

pub fn require_comment(conn: &SqliteConnection, id: i64) -> Result<(), AppError> {
    let found: bool = diesel::select(exists(comments::table.find(id))).get_result(conn)?;
    if !found {
        return Err(missing("comment", id));
    }
    Ok(())
}

/// Rejects the delete of `parent` while `dependents` rows of `reference` point at it.
pub fn refuse_if_referenced(parent: &str, id: i64, reference: &str, dependents: i64) -> Result<(), AppError> {
    if dependents > 0 {
        warn!("refusing to delete {} {}: referenced by {} row(s) of {}", parent, id, dependents, reference);
        return Err(AppError::ReferentialIntegrityViolation(format!(
            "{} {} is still referenced by {} row(s) of {}",
            parent, id, dependents, reference
        )));
    }
    Ok(())
}
