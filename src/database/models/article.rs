use chrono::{NaiveDateTime, Utc};
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Integer;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::io::Write;

use crate::{
    app::AppError,
    database::{
        db_utils::last_insert_id,
        integrity::{refuse_if_referenced, require_blog, require_category},
        validate,
    },
    schema::{article_details, article_tags, articles, comments, up_downs},
};

pub const TITLE_MAX: usize = 128;
pub const SUMMARY_MAX: usize = 255;

/// Closed set of article kinds, stored as its integer code.
/// No member stands for "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow, Serialize, Deserialize)]
#[sql_type = "Integer"]
pub enum ArticleType {
    Python = 1,
    Linux = 2,
    OpenStack = 3,
    GoLang = 4,
}

impl ArticleType {
    pub const ALL: [ArticleType; 4] = [
        ArticleType::Python,
        ArticleType::Linux,
        ArticleType::OpenStack,
        ArticleType::GoLang,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            ArticleType::Python => "Python",
            ArticleType::Linux => "Linux",
            ArticleType::OpenStack => "OpenStack",
            ArticleType::GoLang => "GoLang",
        }
    }
}

impl Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<i32> for ArticleType {
    type Error = AppError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ArticleType::Python),
            2 => Ok(ArticleType::Linux),
            3 => Ok(ArticleType::OpenStack),
            4 => Ok(ArticleType::GoLang),
            other => Err(AppError::DomainViolation(format!(
                "articles.article_type_id {} is not one of 1 (Python), 2 (Linux), 3 (OpenStack), 4 (GoLang)",
                other
            ))),
        }
    }
}

impl<DB: Backend> ToSql<Integer, DB> for ArticleType
where
    i32: ToSql<Integer, DB>,
{
    fn to_sql<W: Write>(&self, out: &mut Output<W, DB>) -> serialize::Result {
        self.code().to_sql(out)
    }
}

impl<DB: Backend> FromSql<Integer, DB> for ArticleType
where
    i32: FromSql<Integer, DB>,
{
    fn from_sql(bytes: Option<&DB::RawValue>) -> deserialize::Result<Self> {
        let code = i32::from_sql(bytes)?;
        ArticleType::try_from(code).map_err(|err| err.to_string().into())
    }
}

/// List-view row of an article. The body lives in
/// [`ArticleDetail`](super::article_detail::ArticleDetail).
///
/// The four counters are denormalized aggregates; nothing here keeps them
/// in step with the votes and comments they summarize.
#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub read_count: i32,
    pub comment_count: i32,
    pub up_count: i32,
    pub down_count: i32,
    pub create_time: NaiveDateTime,
    pub blog_id: i64,
    pub category_id: Option<i32>,
    pub article_type: ArticleType,
}

#[derive(Debug, Clone)]
pub struct NewArticle<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub blog_id: i64,
    pub category_id: Option<i32>,
    pub article_type: ArticleType,
}

#[derive(Insertable)]
#[table_name = "articles"]
struct ArticleInsert<'a> {
    title: &'a str,
    summary: &'a str,
    create_time: NaiveDateTime,
    blog_id: i64,
    category_id: Option<i32>,
    article_type_id: ArticleType,
}

/// Partial update. `category_id: Some(None)` clears the category.
/// Counter values are written verbatim.
#[derive(Debug, Clone, Default, AsChangeset)]
#[table_name = "articles"]
pub struct ArticleChanges<'a> {
    pub title: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub read_count: Option<i32>,
    pub comment_count: Option<i32>,
    pub up_count: Option<i32>,
    pub down_count: Option<i32>,
    pub category_id: Option<Option<i32>>,
    #[column_name = "article_type_id"]
    pub article_type: Option<ArticleType>,
}

impl NewArticle<'_> {
    fn validate(&self) -> Result<(), AppError> {
        validate::max_length("articles.title", self.title, TITLE_MAX)?;
        validate::max_length("articles.summary", self.summary, SUMMARY_MAX)
    }
}

impl ArticleChanges<'_> {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.read_count.is_none()
            && self.comment_count.is_none()
            && self.up_count.is_none()
            && self.down_count.is_none()
            && self.category_id.is_none()
            && self.article_type.is_none()
    }

    fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = self.title {
            validate::max_length("articles.title", title, TITLE_MAX)?;
        }
        if let Some(summary) = self.summary {
            validate::max_length("articles.summary", summary, SUMMARY_MAX)?;
        }
        Ok(())
    }
}

impl Article {
    /// Publishes an article in `article.blog_id`, optionally filed under a
    /// category. All counters start at zero.
    ///
    /// # Example
    /// ```
    /// use blogsite_schema::database::db_utils::establish_in_memory;
    /// use blogsite_schema::database::models::{article::*, blog::*, user::*};
    ///
    /// let conn = establish_in_memory()?;
    /// let user = User::new(&conn, &NewUser {
    ///     username: "alice",
    ///     password: "hash",
    ///     nickname: "Alice",
    ///     email: "alice@example.com",
    ///     avatar: "",
    /// })?;
    /// let blog = Blog::new(&conn, &NewBlog { title: "Notes", site: "alice", theme: "light", user_id: user.id })?;
    /// let article = Article::new(&conn, &NewArticle {
    ///     title: "Ownership",
    ///     summary: "Moves and borrows",
    ///     blog_id: blog.id,
    ///     category_id: None,
    ///     article_type: ArticleType::Linux,
    /// })?;
    /// assert_eq!(article.read_count, 0);
    /// # Ok::<(), blogsite_schema::app::AppError>(())
    /// ```
    pub fn new(conn: &SqliteConnection, article: &NewArticle) -> Result<Article, AppError> {
        article.validate()?;

        let to_insert = ArticleInsert {
            title: article.title,
            summary: article.summary,
            create_time: Utc::now().naive_utc(),
            blog_id: article.blog_id,
            category_id: article.category_id,
            article_type_id: article.article_type,
        };

        conn.transaction::<Article, AppError, _>(|| {
            require_blog(conn, article.blog_id)?;
            if let Some(category) = article.category_id {
                require_category(conn, category)?;
            }
            diesel::insert_into(articles::table)
                .values(&to_insert)
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("created article {} in blog {}", id, article.blog_id);

            Article::find_by_id(conn, id)
        })
    }

    pub fn find_by_id(conn: &SqliteConnection, article_id: i64) -> Result<Article, AppError> {
        Ok(articles::table.find(article_id).first(conn)?)
    }

    /** Returns the articles of a blog, newest first */
    pub fn find_by_blog(conn: &SqliteConnection, blog: i64) -> Result<Vec<Article>, AppError> {
        Ok(articles::table
            .filter(articles::blog_id.eq(blog))
            .order((articles::create_time.desc(), articles::id.desc()))
            .load(conn)?)
    }

    pub fn find_by_category(conn: &SqliteConnection, category: i32) -> Result<Vec<Article>, AppError> {
        Ok(articles::table
            .filter(articles::category_id.eq(category))
            .order((articles::create_time.desc(), articles::id.desc()))
            .load(conn)?)
    }

    pub fn find_by_type(conn: &SqliteConnection, kind: ArticleType) -> Result<Vec<Article>, AppError> {
        Ok(articles::table
            .filter(articles::article_type_id.eq(kind))
            .order((articles::create_time.desc(), articles::id.desc()))
            .load(conn)?)
    }

    pub fn edit(conn: &SqliteConnection, article_id: i64, changes: &ArticleChanges) -> Result<Article, AppError> {
        changes.validate()?;
        if changes.is_empty() {
            return Article::find_by_id(conn, article_id);
        }

        conn.transaction::<Article, AppError, _>(|| {
            if let Some(Some(category)) = changes.category_id {
                require_category(conn, category)?;
            }
            let updated = diesel::update(articles::table.find(article_id))
                .set(changes)
                .execute(conn)?;
            if updated == 0 {
                return Err(AppError::NotFound);
            }

            Article::find_by_id(conn, article_id)
        })
    }

    /// Deletes an article once its detail, tag edges, votes and comments
    /// have been removed.
    pub fn delete(conn: &SqliteConnection, article_id: i64) -> Result<(), AppError> {
        conn.transaction::<(), AppError, _>(|| {
            let details = article_details::table
                .filter(article_details::article_id.eq(article_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("article", article_id, "article_details", details)?;

            let tagged = article_tags::table
                .filter(article_tags::article_id.eq(article_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("article", article_id, "article_tags", tagged)?;

            let votes = up_downs::table
                .filter(up_downs::article_id.eq(article_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("article", article_id, "up_downs", votes)?;

            let replies = comments::table
                .filter(comments::article_id.eq(article_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("article", article_id, "comments", replies)?;

            let deleted = diesel::delete(articles::table.find(article_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            debug!("deleted article {}", article_id);
            Ok(())
        })
    }
}
