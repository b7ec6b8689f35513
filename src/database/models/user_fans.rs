use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use super::user::User;
use crate::{
    app::AppError,
    database::{db_utils::last_insert_id, integrity::require_user},
    schema::{user_fans, users},
};

/// Follow edge: `follower_id` follows `user_id`. Edges are directed, so
/// (A, B) and (B, A) are two independent rows.
#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFans {
    pub id: i64,
    pub user_id: i64,
    pub follower_id: i64,
}

#[derive(Insertable)]
#[table_name = "user_fans"]
struct EdgeInsert {
    user_id: i64,
    follower_id: i64,
}

impl UserFans {
    /// Records that `follower_id` follows `user_id`.
    /// Following twice is a `UniquenessViolation`.
    pub fn follow(conn: &SqliteConnection, user_id: i64, follower_id: i64) -> Result<UserFans, AppError> {
        conn.transaction::<UserFans, AppError, _>(|| {
            require_user(conn, user_id)?;
            require_user(conn, follower_id)?;
            diesel::insert_into(user_fans::table)
                .values(&EdgeInsert { user_id, follower_id })
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("user {} now follows user {}", follower_id, user_id);

            Ok(user_fans::table.find(id).first(conn)?)
        })
    }

    pub fn unfollow(conn: &SqliteConnection, user_id: i64, follower_id: i64) -> Result<(), AppError> {
        let deleted = diesel::delete(
            user_fans::table
                .filter(user_fans::user_id.eq(user_id))
                .filter(user_fans::follower_id.eq(follower_id)),
        )
        .execute(conn)?;
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /** Users following the user specified (their fans) */
    pub fn followers_of(conn: &SqliteConnection, user_id: i64) -> Result<Vec<User>, AppError> {
        let ids: Vec<i64> = user_fans::table
            .filter(user_fans::user_id.eq(user_id))
            .select(user_fans::follower_id)
            .load(conn)?;
        UserFans::users_in(conn, ids)
    }

    /** Users the follower specified follows */
    pub fn following(conn: &SqliteConnection, follower_id: i64) -> Result<Vec<User>, AppError> {
        let ids: Vec<i64> = user_fans::table
            .filter(user_fans::follower_id.eq(follower_id))
            .select(user_fans::user_id)
            .load(conn)?;
        UserFans::users_in(conn, ids)
    }

    fn users_in(conn: &SqliteConnection, ids: Vec<i64>) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(users::table
            .filter(users::id.eq_any(ids))
            .order(users::id.asc())
            .load(conn)?)
    }
}
