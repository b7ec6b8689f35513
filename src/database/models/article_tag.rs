use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{article::Article, tag::Tag};
use crate::{
    app::AppError,
    database::{
        db_utils::last_insert_id,
        integrity::{require_article, require_tag},
    },
    schema::{article_tags, articles, tags},
};

/** Junction row tagging an article; one per (article, tag) pair */
#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article2Tag {
    pub id: i64,
    pub article_id: i64,
    pub tag_id: i32,
}

#[derive(Insertable)]
#[table_name = "article_tags"]
struct EdgeInsert {
    article_id: i64,
    tag_id: i32,
}

impl Article2Tag {
    pub fn new(conn: &SqliteConnection, article_id: i64, tag_id: i32) -> Result<Article2Tag, AppError> {
        conn.transaction::<Article2Tag, AppError, _>(|| {
            require_article(conn, article_id)?;
            require_tag(conn, tag_id)?;
            diesel::insert_into(article_tags::table)
                .values(&EdgeInsert { article_id, tag_id })
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("tagged article {} with tag {}", article_id, tag_id);

            Ok(article_tags::table.find(id).first(conn)?)
        })
    }

    /** Removes the tag from the article */
    pub fn delete(conn: &SqliteConnection, article_id: i64, tag_id: i32) -> Result<(), AppError> {
        let deleted = diesel::delete(
            article_tags::table
                .filter(article_tags::article_id.eq(article_id))
                .filter(article_tags::tag_id.eq(tag_id)),
        )
        .execute(conn)?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /** Tags attached to the article, in tag id order */
    pub fn tags_of(conn: &SqliteConnection, article_id: i64) -> Result<Vec<Tag>, AppError> {
        Ok(tags::table
            .inner_join(article_tags::table)
            .filter(article_tags::article_id.eq(article_id))
            .select(tags::all_columns)
            .order(tags::id.asc())
            .load(conn)?)
    }

    /** Articles carrying the tag, newest first */
    pub fn articles_of(conn: &SqliteConnection, tag_id: i32) -> Result<Vec<Article>, AppError> {
        Ok(articles::table
            .inner_join(article_tags::table)
            .filter(article_tags::tag_id.eq(tag_id))
            .select(articles::all_columns)
            .order((articles::create_time.desc(), articles::id.desc()))
            .load(conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::*;

    #[test]
    fn pair_is_unique() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let article = create_article(&conn, &blog, None);
        let tag = Tag::new(&conn, blog.id, "async").unwrap();

        Article2Tag::new(&conn, article.id, tag.id).unwrap();
        assert!(matches!(
            Article2Tag::new(&conn, article.id, tag.id),
            Err(AppError::UniquenessViolation(_))
        ));
    }

    #[test]
    fn both_ends_must_exist() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let article = create_article(&conn, &blog, None);
        let tag = Tag::new(&conn, blog.id, "async").unwrap();

        assert!(matches!(
            Article2Tag::new(&conn, article.id, tag.id + 1),
            Err(AppError::ReferentialIntegrityViolation(_))
        ));
        assert!(matches!(
            Article2Tag::new(&conn, article.id + 1, tag.id),
            Err(AppError::ReferentialIntegrityViolation(_))
        ));
    }

    #[test]
    fn navigates_both_directions() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let first = create_article(&conn, &blog, None);
        let second = create_article(&conn, &blog, None);
        let rust = Tag::new(&conn, blog.id, "rust").unwrap();
        let sql = Tag::new(&conn, blog.id, "sql").unwrap();

        Article2Tag::new(&conn, first.id, rust.id).unwrap();
        Article2Tag::new(&conn, first.id, sql.id).unwrap();
        Article2Tag::new(&conn, second.id, rust.id).unwrap();

        assert_eq!(Article2Tag::tags_of(&conn, first.id).unwrap(), vec![rust.clone(), sql.clone()]);
        assert_eq!(Article2Tag::tags_of(&conn, second.id).unwrap(), vec![rust.clone()]);

        let mut tagged: Vec<i64> = Article2Tag::articles_of(&conn, rust.id)
            .unwrap()
            .into_iter()
            .map(|article| article.id)
            .collect();
        tagged.sort_unstable();
        assert_eq!(tagged, vec![first.id, second.id]);

        Article2Tag::delete(&conn, first.id, sql.id).unwrap();
        assert!(Article2Tag::articles_of(&conn, sql.id).unwrap().is_empty());
        assert!(matches!(
            Article2Tag::delete(&conn, first.id, sql.id),
            Err(AppError::NotFound)
        ));
    }
}
