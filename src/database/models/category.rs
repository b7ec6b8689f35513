use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    database::{
        db_utils::{last_insert_id, narrow_id},
        integrity::{refuse_if_referenced, require_blog},
        validate,
    },
    schema::{articles, categories},
};

pub const TITLE_MAX: usize = 32;

#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub category_title: String,
    pub blog_id: i64,
}

#[derive(Insertable)]
#[table_name = "categories"]
struct CategoryInsert<'a> {
    category_title: &'a str,
    blog_id: i64,
}

impl Category {
    /** Creates a category inside the blog specified */
    pub fn new(conn: &SqliteConnection, blog_id: i64, title: &str) -> Result<Category, AppError> {
        validate::max_length("categories.category_title", title, TITLE_MAX)?;

        conn.transaction::<Category, AppError, _>(|| {
            require_blog(conn, blog_id)?;
            diesel::insert_into(categories::table)
                .values(&CategoryInsert {
                    category_title: title,
                    blog_id,
                })
                .execute(conn)?;
            let id = narrow_id("categories", last_insert_id(conn)?)?;
            debug!("created category {} in blog {}", id, blog_id);

            Category::find_by_id(conn, id)
        })
    }

    pub fn find_by_id(conn: &SqliteConnection, category_id: i32) -> Result<Category, AppError> {
        Ok(categories::table.find(category_id).first(conn)?)
    }

    pub fn find_by_blog(conn: &SqliteConnection, blog: i64) -> Result<Vec<Category>, AppError> {
        Ok(categories::table
            .filter(categories::blog_id.eq(blog))
            .order(categories::id.asc())
            .load(conn)?)
    }

    pub fn rename(conn: &SqliteConnection, category_id: i32, title: &str) -> Result<Category, AppError> {
        validate::max_length("categories.category_title", title, TITLE_MAX)?;

        let updated = diesel::update(categories::table.find(category_id))
            .set(categories::category_title.eq(title))
            .execute(conn)?;
        if updated == 0 {
            return Err(AppError::NotFound);
        }
        Category::find_by_id(conn, category_id)
    }

    /// Deletes a category no article is filed under. Articles are not
    /// moved to "uncategorized" automatically.
    pub fn delete(conn: &SqliteConnection, category_id: i32) -> Result<(), AppError> {
        conn.transaction::<(), AppError, _>(|| {
            let filed = articles::table
                .filter(articles::category_id.eq(category_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("category", i64::from(category_id), "articles", filed)?;

            let deleted = diesel::delete(categories::table.find(category_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            Ok(())
        })
    }
}
