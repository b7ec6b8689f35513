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
    schema::{article_tags, tags},
};

pub const TITLE_MAX: usize = 32;

#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub title: String,
    pub blog_id: i64,
}

#[derive(Insertable)]
#[table_name = "tags"]
struct TagInsert<'a> {
    title: &'a str,
    blog_id: i64,
}

impl Tag {
    pub fn new(conn: &SqliteConnection, blog_id: i64, title: &str) -> Result<Tag, AppError> {
        validate::max_length("tags.title", title, TITLE_MAX)?;

        conn.transaction::<Tag, AppError, _>(|| {
            require_blog(conn, blog_id)?;
            diesel::insert_into(tags::table)
                .values(&TagInsert { title, blog_id })
                .execute(conn)?;
            let id = narrow_id("tags", last_insert_id(conn)?)?;
            debug!("created tag {} in blog {}", id, blog_id);

            Tag::find_by_id(conn, id)
        })
    }

    pub fn find_by_id(conn: &SqliteConnection, tag_id: i32) -> Result<Tag, AppError> {
        Ok(tags::table.find(tag_id).first(conn)?)
    }

    pub fn find_by_blog(conn: &SqliteConnection, blog: i64) -> Result<Vec<Tag>, AppError> {
        Ok(tags::table
            .filter(tags::blog_id.eq(blog))
            .order(tags::id.asc())
            .load(conn)?)
    }

    pub fn rename(conn: &SqliteConnection, tag_id: i32, new_title: &str) -> Result<Tag, AppError> {
        validate::max_length("tags.title", new_title, TITLE_MAX)?;

        let updated = diesel::update(tags::table.find(tag_id))
            .set(tags::title.eq(new_title))
            .execute(conn)?;
        if updated == 0 {
            return Err(AppError::NotFound);
        }
        Tag::find_by_id(conn, tag_id)
    }

    /** Deletes a tag that is no longer attached to any article */
    pub fn delete(conn: &SqliteConnection, tag_id: i32) -> Result<(), AppError> {
        conn.transaction::<(), AppError, _>(|| {
            let attached = article_tags::table
                .filter(article_tags::tag_id.eq(tag_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("tag", i64::from(tag_id), "article_tags", attached)?;

            let deleted = diesel::delete(tags::table.find(tag_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::article_tag::Article2Tag;
    use crate::database::test_utils::*;

    #[test]
    fn tags_belong_to_a_blog() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let tag = Tag::new(&conn, blog.id, "async").unwrap();

        assert_eq!(tag.blog_id, blog.id);
        assert_eq!(Tag::find_by_blog(&conn, blog.id).unwrap(), vec![tag]);
        assert!(matches!(
            Tag::new(&conn, blog.id + 1, "orphan"),
            Err(AppError::ReferentialIntegrityViolation(_))
        ));
    }

    #[test]
    fn delete_waits_for_untagging() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let article = create_article(&conn, &blog, None);
        let tag = Tag::new(&conn, blog.id, "async").unwrap();
        Article2Tag::new(&conn, article.id, tag.id).unwrap();

        assert!(matches!(
            Tag::delete(&conn, tag.id),
            Err(AppError::ReferentialIntegrityViolation(_))
        ));
        Article2Tag::delete(&conn, article.id, tag.id).unwrap();
        Tag::delete(&conn, tag.id).unwrap();
        assert!(matches!(Tag::find_by_id(&conn, tag.id), Err(AppError::NotFound)));
    }

    #[test]
    fn rename_keeps_blog() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let tag = Tag::new(&conn, blog.id, "async").unwrap();

        let renamed = Tag::rename(&conn, tag.id, "tokio").unwrap();
        assert_eq!(renamed.title, "tokio");
        assert_eq!(renamed.blog_id, blog.id);
    }
}
