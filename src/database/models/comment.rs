use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    database::{
        db_utils::last_insert_id,
        integrity::{refuse_if_referenced, require_article, require_comment, require_user},
        validate,
    },
    schema::comments,
};

pub const CONTENT_MAX: usize = 255;

/// `reply_id` names the comment this one answers. Chains may be
/// arbitrarily deep and nothing checks them for cycles.
#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub create_time: NaiveDateTime,
    pub reply_id: Option<i64>,
    pub article_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewComment<'a> {
    pub content: &'a str,
    pub article_id: i64,
    pub user_id: i64,
    pub reply_id: Option<i64>,
}

#[derive(Insertable)]
#[table_name = "comments"]
struct CommentInsert<'a> {
    content: &'a str,
    create_time: NaiveDateTime,
    reply_id: Option<i64>,
    article_id: i64,
    user_id: i64,
}

impl Comment {
    /** Creates a comment on the article specified, optionally replying to another comment */
    pub fn new(conn: &SqliteConnection, comment: &NewComment) -> Result<Comment, AppError> {
        validate::max_length("comments.content", comment.content, CONTENT_MAX)?;

        let record = CommentInsert {
            content: comment.content,
            create_time: Utc::now().naive_utc(),
            reply_id: comment.reply_id,
            article_id: comment.article_id,
            user_id: comment.user_id,
        };

        conn.transaction::<Comment, AppError, _>(|| {
            require_article(conn, comment.article_id)?;
            require_user(conn, comment.user_id)?;
            if let Some(parent) = comment.reply_id {
                require_comment(conn, parent)?;
            }
            diesel::insert_into(comments::table)
                .values(&record)
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("user {} commented {} on article {}", comment.user_id, id, comment.article_id);

            Comment::find_by_id(conn, id)
        })
    }

    /** Returns comment with the id specified */
    pub fn find_by_id(conn: &SqliteConnection, the_id: i64) -> Result<Comment, AppError> {
        Ok(comments::table.find(the_id).first(conn)?)
    }

    /** Returns all comments posted on an article, oldest first */
    pub fn find_by_article(conn: &SqliteConnection, article: i64) -> Result<Vec<Comment>, AppError> {
        Ok(comments::table
            .filter(comments::article_id.eq(article))
            .order((comments::create_time.asc(), comments::id.asc()))
            .load(conn)?)
    }

    /** Returns all comments written by the user specified, newest first */
    pub fn find_by_user(conn: &SqliteConnection, author: i64) -> Result<Vec<Comment>, AppError> {
        Ok(comments::table
            .filter(comments::user_id.eq(author))
            .order((comments::create_time.desc(), comments::id.desc()))
            .load(conn)?)
    }

    /** Direct replies to a comment; deeper levels are not followed */
    pub fn replies(conn: &SqliteConnection, parent: i64) -> Result<Vec<Comment>, AppError> {
        Ok(comments::table
            .filter(comments::reply_id.eq(parent))
            .order((comments::create_time.asc(), comments::id.asc()))
            .load(conn)?)
    }

    /** Deletes a comment from database. Refused while other comments reply to it */
    pub fn delete(conn: &SqliteConnection, the_id: i64) -> Result<(), AppError> {
        conn.transaction::<(), AppError, _>(|| {
            let answers = comments::table
                .filter(comments::reply_id.eq(the_id))
                .filter(comments::id.ne(the_id))
                .count()
                .get_result(conn)?;
            refuse_if_referenced("comment", the_id, "comments.reply_id", answers)?;

            let deleted = diesel::delete(comments::table.find(the_id)).execute(conn)?;
            if deleted == 0 {
                return Err(AppError::NotFound);
            }
            Ok(())
        })
    }
}
