use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    database::{db_utils::last_insert_id, integrity::require_article},
    schema::article_details,
};

/// Long-form body of an article, kept out of the `articles` row.
/// One detail per article. It must be deleted before its article can be.
#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub id: i64,
    pub content: String,
    pub article_id: i64,
}

#[derive(Insertable)]
#[table_name = "article_details"]
struct DetailInsert<'a> {
    content: &'a str,
    article_id: i64,
}

impl ArticleDetail {
    /// Attaches the body of `article_id`. A second body for the same
    /// article is a `UniquenessViolation`.
    pub fn new(conn: &SqliteConnection, article_id: i64, content: &str) -> Result<ArticleDetail, AppError> {
        conn.transaction::<ArticleDetail, AppError, _>(|| {
            require_article(conn, article_id)?;
            diesel::insert_into(article_details::table)
                .values(&DetailInsert { content, article_id })
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("stored detail {} for article {}", id, article_id);

            Ok(article_details::table.find(id).first(conn)?)
        })
    }

    pub fn find_by_article(conn: &SqliteConnection, article: i64) -> Result<Option<ArticleDetail>, AppError> {
        Ok(article_details::table
            .filter(article_details::article_id.eq(article))
            .first(conn)
            .optional()?)
    }

    pub fn edit_content(conn: &SqliteConnection, article: i64, body: &str) -> Result<ArticleDetail, AppError> {
        let updated = diesel::update(article_details::table.filter(article_details::article_id.eq(article)))
            .set(article_details::content.eq(body))
            .execute(conn)?;
        if updated == 0 {
            return Err(AppError::NotFound);
        }
        ArticleDetail::find_by_article(conn, article)?.ok_or(AppError::NotFound)
    }

    /** Removes the body of the article specified. Nothing references a detail */
    pub fn delete(conn: &SqliteConnection, article: i64) -> Result<(), AppError> {
        let deleted = diesel::delete(article_details::table.filter(article_details::article_id.eq(article)))
            .execute(conn)?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::article::Article;
    use crate::database::test_utils::*;

    #[test]
    fn one_detail_per_article() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let article = create_article(&conn, &blog, None);

        let detail = ArticleDetail::new(&conn, article.id, "Long body").unwrap();
        assert_eq!(ArticleDetail::find_by_article(&conn, article.id).unwrap(), Some(detail));
        assert!(matches!(
            ArticleDetail::new(&conn, article.id, "Second body"),
            Err(AppError::UniquenessViolation(_))
        ));
    }

    #[test]
    fn article_must_exist() {
        let conn = conn();
        assert!(matches!(
            ArticleDetail::new(&conn, 3, "Body"),
            Err(AppError::ReferentialIntegrityViolation(_))
        ));
    }

    #[test]
    fn content_is_unbounded() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let article = create_article(&conn, &blog, None);
        let body = "lorem ipsum ".repeat(2_000);

        let detail = ArticleDetail::new(&conn, article.id, &body).unwrap();
        assert_eq!(detail.content, body);
    }

    #[test]
    fn article_delete_waits_for_detail() {
        let conn = conn();
        let blog = create_blog(&conn, &create_user(&conn, "alice"));
        let article = create_article(&conn, &blog, None);
        ArticleDetail::new(&conn, article.id, "Body").unwrap();

        assert!(matches!(
            Article::delete(&conn, article.id),
            Err(AppError::ReferentialIntegrityViolation(_))
        ));
        let edited = ArticleDetail::edit_content(&conn, article.id, "Rewritten").unwrap();
        assert_eq!(edited.content, "Rewritten");

        ArticleDetail::delete(&conn, article.id).unwrap();
        Article::delete(&conn, article.id).unwrap();
    }
}
