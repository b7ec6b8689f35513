use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    database::{
        db_utils::last_insert_id,
        integrity::{require_article, require_user},
    },
    schema::up_downs,
};

/// A user's vote on an article: `up` is true for an up-vote.
/// At most one row exists per (article, user).
#[derive(Debug, Queryable, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpDown {
    pub id: i64,
    pub article_id: i64,
    pub user_id: i64,
    pub up: bool,
}

#[derive(Insertable)]
#[table_name = "up_downs"]
struct VoteInsert {
    article_id: i64,
    user_id: i64,
    up: bool,
}

impl UpDown {
    /// Casts the first vote of `user_id` on `article_id`. Voting again is a
    /// `UniquenessViolation`; use [`UpDown::change`] to flip a vote.
    pub fn new(conn: &SqliteConnection, article_id: i64, user_id: i64, up: bool) -> Result<UpDown, AppError> {
        conn.transaction::<UpDown, AppError, _>(|| {
            require_article(conn, article_id)?;
            require_user(conn, user_id)?;
            diesel::insert_into(up_downs::table)
                .values(&VoteInsert { article_id, user_id, up })
                .execute(conn)?;
            let id = last_insert_id(conn)?;
            debug!("user {} voted {} on article {}", user_id, if up { "up" } else { "down" }, article_id);

            Ok(up_downs::table.find(id).first(conn)?)
        })
    }

    /** Rewrites the existing vote in place */
    pub fn change(conn: &SqliteConnection, article_id: i64, user_id: i64, up: bool) -> Result<UpDown, AppError> {
        conn.transaction::<UpDown, AppError, _>(|| {
            let updated = diesel::update(
                up_downs::table
                    .filter(up_downs::article_id.eq(article_id))
                    .filter(up_downs::user_id.eq(user_id)),
            )
            .set(up_downs::up.eq(up))
            .execute(conn)?;
            if updated == 0 {
                return Err(AppError::NotFound);
            }

            UpDown::find(conn, article_id, user_id)?.ok_or(AppError::NotFound)
        })
    }

    pub fn find(conn: &SqliteConnection, article_id: i64, user_id: i64) -> Result<Option<UpDown>, AppError> {
        Ok(up_downs::table
            .filter(up_downs::article_id.eq(article_id))
            .filter(up_downs::user_id.eq(user_id))
            .first(conn)
            .optional()?)
    }

    pub fn for_article(conn: &SqliteConnection, article_id: i64) -> Result<Vec<UpDown>, AppError> {
        Ok(up_downs::table
            .filter(up_downs::article_id.eq(article_id))
            .order(up_downs::id.asc())
            .load(conn)?)
    }

    /** Withdraws the vote */
    pub fn delete(conn: &SqliteConnection, article_id: i64, user_id: i64) -> Result<(), AppError> {
        let deleted = diesel::delete(
            up_downs::table
                .filter(up_downs::article_id.eq(article_id))
                .filter(up_downs::user_id.eq(user_id)),
        )
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
    use crate::database::test_utils::*;

    #[test]
    fn one_vote_per_user_and_article() {
        let conn = conn();
        let alice = create_user(&conn, "alice");
        let bob = create_user(&conn, "bob");
        let article = create_article(&conn, &create_blog(&conn, &alice), None);

        UpDown::new(&conn, article.id, bob.id, true).unwrap();
        assert!(matches!(
            UpDown::new(&conn, article.id, bob.id, false),
            Err(AppError::UniquenessViolation(_))
        ));
        UpDown::new(&conn, article.id, alice.id, false).unwrap();
        assert_eq!(UpDown::for_article(&conn, article.id).unwrap().len(), 2);
    }

    #[test]
    fn change_updates_the_existing_row() {
        let conn = conn();
        let alice = create_user(&conn, "alice");
        let article = create_article(&conn, &create_blog(&conn, &alice), None);

        let vote = UpDown::new(&conn, article.id, alice.id, true).unwrap();
        let flipped = UpDown::change(&conn, article.id, alice.id, false).unwrap();
        assert_eq!(flipped.id, vote.id);
        assert!(!flipped.up);
        assert_eq!(UpDown::for_article(&conn, article.id).unwrap(), vec![flipped]);
    }

    #[test]
    fn change_without_a_vote_is_not_found() {
        let conn = conn();
        let alice = create_user(&conn, "alice");
        let article = create_article(&conn, &create_blog(&conn, &alice), None);

        assert!(matches!(
            UpDown::change(&conn, article.id, alice.id, true),
            Err(AppError::NotFound)
        ));
    }

    #[test]
    fn voter_must_exist() {
        let conn = conn();
        let alice = create_user(&conn, "alice");
        let article = create_article(&conn, &create_blog(&conn, &alice), None);

        assert!(matches!(
            UpDown::new(&conn, article.id, alice.id + 1, true),
            Err(AppError::ReferentialIntegrityViolation(_))
        ));
    }

    #[test]
    fn withdrawn_vote_can_be_cast_again() {
        let conn = conn();
        let alice = create_user(&conn, "alice");
        let article = create_article(&conn, &create_blog(&conn, &alice), None);

        UpDown::new(&conn, article.id, alice.id, true).unwrap();
        UpDown::delete(&conn, article.id, alice.id).unwrap();
        assert!(UpDown::find(&conn, article.id, alice.id).unwrap().is_none());
        UpDown::new(&conn, article.id, alice.id, false).unwrap();
    }
}
